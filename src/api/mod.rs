//! HTTP API
//!
//! A thin hyper-based layer around the simulation engine:
//!
//! - `POST /trace` — run one simulation; body is a [`TraceRequest`], reply
//!   is a [`TraceResponse`]. Any completed simulation is a 200, success or
//!   terminal failure — the trace itself encodes the outcome. Shape
//!   violations (missing/mistyped fields, unparsable source address) are
//!   rejected here with a 400 before the engine is invoked.
//! - `GET /healthz` — liveness probe.

mod server;
mod types;

pub use server::ApiServer;
pub use types::{ErrorResponse, TraceRequest, TraceResponse};
