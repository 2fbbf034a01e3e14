//! trace-router: deterministic packet-path simulator
//!
//! This crate simulates the journey of a single packet through a small
//! virtual topology and produces a hop-by-hop decision trace: hostname
//! resolution, longest-prefix-match routing, ordered firewall evaluation,
//! and TTL tracking, composed into one synchronous pipeline.
//!
//! # Architecture
//!
//! ```text
//! HTTP POST /trace → Simulator → DNS Resolver
//!                         ↓
//!                   Route Selector (longest prefix match)
//!                         ↓
//!                   TTL decrement → Firewall Evaluator
//!                         ↓
//!                   Trace (ordered decision entries)
//! ```
//!
//! All topology tables (name records, routes, firewall rules) are loaded
//! once at startup into an immutable [`engine::NetworkSnapshot`] and shared
//! read-only across requests; the simulation itself is a bounded, lock-free,
//! synchronous computation.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use trace_router::config::load_config_str;
//! use trace_router::engine::{PacketSpec, Simulator};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_str(r#"{
//!     "routes": [{ "network": "0.0.0.0/0", "next_hop": "192.168.1.1",
//!                  "interface": "eth0" }]
//! }"#)?;
//! let snapshot = Arc::new(config.compile()?);
//! let simulator = Simulator::new(snapshot);
//!
//! let packet = PacketSpec {
//!     source: "192.168.1.50".parse()?,
//!     destination: "10.0.0.10".into(),
//!     destination_port: 80,
//!     protocol: "TCP".into(),
//!     time_to_live: 4,
//! };
//! let trace = simulator.simulate(&packet);
//! assert!(!trace.is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Modules
//!
//! - [`api`]: HTTP server and request/response types
//! - [`config`]: Configuration types, normalization, and loading
//! - [`engine`]: The simulation engine (resolver, routes, firewall, trace)
//! - [`error`]: Error types

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod config;
pub mod engine;
pub mod error;

// Re-export commonly used types at the crate root
pub use config::{load_config, load_config_str, Config};
pub use engine::{FirewallAction, NetworkSnapshot, PacketSpec, Simulator, TraceEntry};
pub use error::{ApiError, ConfigError, Result, TraceRouterError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
