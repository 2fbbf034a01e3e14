//! Configuration module for trace-router
//!
//! Configuration is a single JSON document holding the listen address, log
//! settings, and the three topology tables (name records, routes, firewall
//! rules). Loading normalizes every accepted input shape into the canonical
//! engine types and fails fast on anything it cannot normalize.
//!
//! # Example
//!
//! ```no_run
//! use trace_router::config::load_config;
//!
//! let config = load_config("/etc/trace-router/config.json").unwrap();
//! let snapshot = config.compile().unwrap();
//! println!("{} routes", snapshot.routes.len());
//! ```

mod loader;
mod types;

pub use loader::{create_default_config, load_config, load_config_str, load_config_with_env};
pub use types::{
    Config, DnsRecordConfig, FirewallConfig, FirewallRuleConfig, ListenConfig, LogConfig,
    PortSpec, RouteConfig,
};
