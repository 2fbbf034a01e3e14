//! Error types for trace-router
//!
//! Terminal simulation outcomes (NXDOMAIN, no route, TTL exceeded, firewall
//! deny) are *not* errors — they are trace entries returned to the caller.
//! The types here cover the ambient concerns: configuration loading and the
//! HTTP serving layer.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Top-level error type for trace-router
#[derive(Debug, Error)]
pub enum TraceRouterError {
    /// Configuration errors (file loading, parsing, normalization)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// HTTP API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// I/O errors not covered by other categories
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration-related errors
///
/// All configuration errors are startup-fatal: the service must never begin
/// accepting traffic with a table it could not fully normalize.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found or inaccessible
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Normalization/validation error (bad CIDR, unknown record kind, ...)
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    /// Environment variable error
    #[error("Environment variable error: {name}: {reason}")]
    EnvError { name: String, reason: String },

    /// I/O error while reading config
    #[error("I/O error reading configuration: {0}")]
    IoError(#[from] io::Error),
}

impl ConfigError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }
}

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Failed to bind the listen address
    #[error("Failed to bind to {addr}: {reason}")]
    BindError { addr: SocketAddr, reason: String },

    /// Failed to accept a connection
    #[error("Accept error: {0}")]
    AcceptError(String),

    /// Request failed shape validation (missing/mistyped fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error
    #[error("API I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl ApiError {
    /// Check if this error is recoverable (the accept loop may continue)
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::BindError { .. } => false,
            Self::AcceptError(_) | Self::InvalidRequest(_) => true,
            Self::IoError(e) => matches!(
                e.kind(),
                io::ErrorKind::Interrupted
                    | io::ErrorKind::WouldBlock
                    | io::ErrorKind::ConnectionReset
            ),
        }
    }

    /// Create a bind error
    pub fn bind(addr: SocketAddr, reason: impl Into<String>) -> Self {
        Self::BindError {
            addr,
            reason: reason.into(),
        }
    }

    /// Create an invalid-request error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }
}

/// Type alias for Result with `TraceRouterError`
pub type Result<T> = std::result::Result<T, TraceRouterError>;
