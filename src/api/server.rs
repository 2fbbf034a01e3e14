//! HTTP server
//!
//! Accept loop in the same shape as the rest of the stack: bind once, spawn
//! a task per connection, and drain on a broadcast shutdown signal. Each
//! connection is served by hyper's HTTP/1.1 state machine; the handler
//! itself is synchronous apart from reading the body.

use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use super::types::{ErrorResponse, TraceRequest, TraceResponse};
use crate::config::ListenConfig;
use crate::engine::Simulator;
use crate::error::ApiError;

/// Maximum accepted request body size in bytes.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// HTTP server exposing the simulation engine.
pub struct ApiServer {
    /// Listen configuration
    config: ListenConfig,

    /// Shared simulator over the immutable topology snapshot
    simulator: Arc<Simulator>,

    /// Requests served (traces computed), for shutdown stats
    requests_served: Arc<AtomicU64>,

    /// Shutdown signal sender
    shutdown_tx: broadcast::Sender<()>,
}

impl ApiServer {
    /// Create a new server.
    #[must_use]
    pub fn new(config: ListenConfig, simulator: Arc<Simulator>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            simulator,
            requests_served: Arc::new(AtomicU64::new(0)),
            shutdown_tx,
        }
    }

    /// Get a shutdown signal sender.
    pub fn shutdown_sender(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Number of trace requests served so far.
    #[must_use]
    pub fn requests_served(&self) -> u64 {
        self.requests_served.load(Ordering::Relaxed)
    }

    /// Run the accept loop until a shutdown signal arrives.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::BindError` if the listen address cannot be bound.
    /// Accept errors are logged and the loop continues.
    pub async fn run(&self) -> Result<(), ApiError> {
        let addr = self.config.address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::bind(addr, e.to_string()))?;

        info!("API server listening on {}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer)) => {
                            debug!("Connection from {}", peer);
                            let io = TokioIo::new(stream);
                            let simulator = Arc::clone(&self.simulator);
                            let counter = Arc::clone(&self.requests_served);

                            tokio::spawn(async move {
                                let service = service_fn(move |req| {
                                    handle_request(
                                        req,
                                        Arc::clone(&simulator),
                                        Arc::clone(&counter),
                                    )
                                });
                                if let Err(e) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    debug!("Connection error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            let err = ApiError::AcceptError(e.to_string());
                            if err.is_recoverable() {
                                error!("Accept error: {}", e);
                            } else {
                                return Err(err);
                            }
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("API server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for ApiServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiServer")
            .field("address", &self.config.address)
            .field("requests_served", &self.requests_served())
            .finish_non_exhaustive()
    }
}

/// Route one HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    simulator: Arc<Simulator>,
    counter: Arc<AtomicU64>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::POST, "/trace") => handle_trace(req, &simulator, &counter).await,
        (&Method::GET, "/healthz") => text_response(StatusCode::OK, "ok"),
        _ => error_response(StatusCode::NOT_FOUND, "not found"),
    };
    Ok(response)
}

/// Handle `POST /trace`: validate the shape, run the simulation, reply 200.
async fn handle_trace(
    req: Request<Incoming>,
    simulator: &Simulator,
    counter: &AtomicU64,
) -> Response<Full<Bytes>> {
    let body = match Limited::new(req.into_body(), MAX_BODY_SIZE).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("failed to read request body: {e}"),
            );
        }
    };

    let request: TraceRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            debug!("Rejected malformed trace request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, format!("invalid request: {e}"));
        }
    };

    let spec = match request.into_packet_spec() {
        Ok(spec) => spec,
        Err(e) => {
            debug!("Rejected trace request: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    let trace = simulator.simulate(&spec);
    counter.fetch_add(1, Ordering::Relaxed);
    debug!(
        destination = %spec.destination,
        entries = trace.len(),
        "Trace computed"
    );

    json_response(StatusCode::OK, &TraceResponse { trace })
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    // Serialization of our own response types cannot fail.
    let payload = serde_json::to_vec(body).unwrap_or_default();
    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(payload)))
        .expect("static response parts")
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    json_response(status, &ErrorResponse::new(message))
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "text/plain")
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .expect("static response parts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::NetworkSnapshot;

    #[test]
    fn test_server_starts_with_zero_requests() {
        let server = ApiServer::new(
            ListenConfig::default(),
            Arc::new(Simulator::new(Arc::new(NetworkSnapshot::default()))),
        );
        assert_eq!(server.requests_served(), 0);
    }

    #[test]
    fn test_error_response_is_json() {
        let resp = error_response(StatusCode::BAD_REQUEST, "nope");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers()[http::header::CONTENT_TYPE],
            "application/json"
        );
    }

    #[test]
    fn test_debug_impl() {
        let server = ApiServer::new(
            ListenConfig::default(),
            Arc::new(Simulator::new(Arc::new(NetworkSnapshot::default()))),
        );
        let debug = format!("{server:?}");
        assert!(debug.contains("ApiServer"));
    }
}
