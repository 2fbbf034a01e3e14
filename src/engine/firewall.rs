//! Ordered firewall rule evaluation
//!
//! Rules are scanned in declaration order and the first structural match
//! decides the outcome, even if a later rule would also match. When no rule
//! matches, the configured default action applies (allow unless the config
//! says otherwise).

use std::fmt;
use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use super::cidr::addr_in_network;
use super::trace::Trace;
use crate::error::ConfigError;

/// Trace location label for all firewall decisions.
const LOCATION: &str = "Firewall";

/// Outcome of firewall evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirewallAction {
    /// Packet may proceed to delivery.
    Allow,

    /// Packet is dropped; the trace carries the block entry.
    Deny,
}

impl fmt::Display for FirewallAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// Inclusive destination-port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    /// Start of the range (inclusive)
    pub start: u16,
    /// End of the range (inclusive)
    pub end: u16,
}

impl PortRange {
    /// Create a new port range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if start > end.
    pub fn new(start: u16, end: u16) -> Result<Self, ConfigError> {
        if start > end {
            return Err(ConfigError::validation(format!(
                "invalid port range: {start}-{end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Create a range covering a single port.
    #[must_use]
    pub const fn single(port: u16) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Parse a port specification: `"443"` or `"80-443"`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if the spec is not a port or
    /// an ascending port pair.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let bad = || ConfigError::validation(format!("invalid port specification: {spec}"));

        match spec.split_once('-') {
            None => {
                let port: u16 = spec.trim().parse().map_err(|_| bad())?;
                Ok(Self::single(port))
            }
            Some((start, end)) => {
                let start: u16 = start.trim().parse().map_err(|_| bad())?;
                let end: u16 = end.trim().parse().map_err(|_| bad())?;
                Self::new(start, end)
            }
        }
    }

    /// Check whether `port` falls inside the range.
    #[must_use]
    pub const fn contains(&self, port: u16) -> bool {
        port >= self.start && port <= self.end
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Protocol selector of a rule: the `ANY` wildcard or a named token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleProtocol {
    /// Matches every protocol.
    Any,

    /// Matches one protocol token, case-insensitively.
    Named(String),
}

impl RuleProtocol {
    /// Parse a protocol token; `"ANY"` (any case) is the wildcard.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("any") {
            Self::Any
        } else {
            Self::Named(token.to_string())
        }
    }

    /// Check whether this selector matches a packet protocol token.
    #[must_use]
    pub fn matches(&self, protocol: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Named(name) => name.eq_ignore_ascii_case(protocol),
        }
    }
}

impl fmt::Display for RuleProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "ANY"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// One ordered firewall rule. Immutable after config load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    /// Unique, order-significant identifier.
    pub id: u32,

    /// Allow or deny on match.
    pub action: FirewallAction,

    /// Protocol selector.
    pub protocol: RuleProtocol,

    /// Source network the packet must originate from.
    pub source: Ipv4Net,

    /// Inclusive destination-port range.
    pub ports: PortRange,
}

impl FirewallRule {
    /// Check whether the rule structurally matches a packet.
    #[must_use]
    pub fn matches(&self, source: Ipv4Addr, port: u16, protocol: &str) -> bool {
        self.protocol.matches(protocol)
            && addr_in_network(source, &self.source)
            && self.ports.contains(port)
    }
}

/// Ordered rule set with a configurable default action.
#[derive(Debug, Clone)]
pub struct Firewall {
    rules: Vec<FirewallRule>,
    default_action: FirewallAction,
}

impl Firewall {
    /// Build a firewall from an ordered rule list and a default action.
    #[must_use]
    pub fn new(rules: Vec<FirewallRule>, default_action: FirewallAction) -> Self {
        Self {
            rules,
            default_action,
        }
    }

    /// Number of configured rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Action applied when no rule matches.
    #[must_use]
    pub const fn default_action(&self) -> FirewallAction {
        self.default_action
    }

    /// Evaluate a packet, tracing the deciding rule (or the default).
    ///
    /// The first matching rule decides; scan order is declaration order.
    pub fn evaluate(
        &self,
        source: Ipv4Addr,
        port: u16,
        protocol: &str,
        trace: &mut Trace,
    ) -> FirewallAction {
        for rule in &self.rules {
            if !rule.matches(source, port, protocol) {
                continue;
            }
            match rule.action {
                FirewallAction::Deny => trace.record(
                    LOCATION,
                    format!(
                        "Packet blocked by rule #{} (protocol={}, port={})",
                        rule.id, rule.protocol, rule.ports
                    ),
                ),
                FirewallAction::Allow => {
                    trace.record(LOCATION, format!("Packet allowed by rule #{}", rule.id));
                }
            }
            return rule.action;
        }

        trace.record(
            LOCATION,
            format!("No matching rule, default {}", self.default_action),
        );
        self.default_action
    }
}

impl Default for Firewall {
    fn default() -> Self {
        Self::new(Vec::new(), FirewallAction::Allow)
    }
}
