//! HTTP request/response types
//!
//! The request DTO accepts the original camelCase wire names with
//! snake_case aliases. serde enforces field presence and types; the only
//! validation beyond that is the source address parse, since the engine's
//! CIDR math requires an already-valid dotted quad.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::engine::{PacketSpec, TraceEntry};
use crate::error::ApiError;

/// Packet descriptor submitted to `POST /trace`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceRequest {
    /// Source address, dotted quad
    #[serde(alias = "source_address")]
    pub source_address: String,

    /// Destination: dotted quad or a name to resolve
    pub destination: String,

    /// Destination port
    #[serde(alias = "destination_port", alias = "port")]
    pub destination_port: u16,

    /// Protocol token (case-insensitive)
    pub protocol: String,

    /// Hop budget
    #[serde(alias = "time_to_live", alias = "ttl")]
    pub time_to_live: u8,
}

impl TraceRequest {
    /// Validate the request and convert it into an engine packet spec.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidRequest` if the source address is not a
    /// valid dotted quad or the protocol token is empty.
    pub fn into_packet_spec(self) -> Result<PacketSpec, ApiError> {
        let source: Ipv4Addr = self.source_address.parse().map_err(|_| {
            ApiError::invalid(format!(
                "sourceAddress '{}' is not a valid IPv4 address",
                self.source_address
            ))
        })?;

        if self.protocol.trim().is_empty() {
            return Err(ApiError::invalid("protocol must not be empty"));
        }
        if self.destination.trim().is_empty() {
            return Err(ApiError::invalid("destination must not be empty"));
        }

        Ok(PacketSpec {
            source,
            destination: self.destination,
            destination_port: self.destination_port,
            protocol: self.protocol,
            time_to_live: self.time_to_live,
        })
    }
}

/// Successful reply: the ordered decision trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceResponse {
    /// Hop-by-hop decision entries, in order
    pub trace: Vec<TraceEntry>,
}

/// Error reply body for 4xx responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Human-readable rejection reason
    pub error: String,
}

impl ErrorResponse {
    /// Create an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
