//! The packet-path simulation engine
//!
//! Everything under this module is a pure, synchronous computation over an
//! immutable [`NetworkSnapshot`]: no I/O, no locks, no retries. The engine
//! is driven by [`Simulator::simulate`], which produces the ordered decision
//! trace for one packet.
//!
//! # Components
//!
//! - [`cidr`]: dotted-quad/prefix containment math
//! - [`resolver`]: name record chain walking (A/CNAME equivalent)
//! - [`route`]: longest-prefix-match route selection
//! - [`firewall`]: ordered first-match-wins rule evaluation
//! - [`trace`]: the trace output model
//! - [`simulator`]: the orchestrating state machine

pub mod cidr;
pub mod firewall;
pub mod resolver;
pub mod route;
pub mod simulator;
pub mod trace;

pub use firewall::{Firewall, FirewallAction, FirewallRule, PortRange, RuleProtocol};
pub use resolver::{NameRecord, RecordData};
pub use route::{Route, RouteTable};
pub use simulator::{NetworkSnapshot, PacketSpec, Simulator};
pub use trace::{Trace, TraceEntry};
