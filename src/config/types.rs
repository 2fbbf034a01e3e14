//! Configuration types and normalization
//!
//! The structs here mirror the accepted JSON input shapes, including the
//! synonymous field names the original deployments used (`address`/`ip`/
//! `value`, `network`/`cidr`, `ports`/`port`, ...), captured as serde
//! aliases. [`Config::compile`] is the single, explicit normalization step
//! that maps any accepted shape into the canonical engine types — anything
//! it cannot normalize (unknown record kind, bad CIDR, duplicate rule id)
//! fails at startup, never at request time.

use std::net::{Ipv4Addr, SocketAddr};

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

use crate::engine::{
    Firewall, FirewallAction, FirewallRule, NameRecord, NetworkSnapshot, PortRange, Route,
    RouteTable, RuleProtocol,
};
use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// HTTP listen configuration
    #[serde(default)]
    pub listen: ListenConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Name record table
    #[serde(default, alias = "dns", alias = "records")]
    pub dns_records: Vec<DnsRecordConfig>,

    /// Route table
    #[serde(default, alias = "routing_table")]
    pub routes: Vec<RouteConfig>,

    /// Firewall configuration
    #[serde(default)]
    pub firewall: FirewallConfig,
}

impl Config {
    /// Normalize the raw configuration into an immutable engine snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` naming the offending entry if
    /// any record, route, or rule cannot be normalized.
    pub fn compile(&self) -> Result<NetworkSnapshot, ConfigError> {
        let mut records = Vec::with_capacity(self.dns_records.len());
        for (i, record) in self.dns_records.iter().enumerate() {
            records.push(record.compile().map_err(|e| prefix(e, "dns record", i))?);
        }

        let mut routes = Vec::with_capacity(self.routes.len());
        for (i, route) in self.routes.iter().enumerate() {
            routes.push(route.compile().map_err(|e| prefix(e, "route", i))?);
        }

        let firewall = self.firewall.compile()?;

        Ok(NetworkSnapshot {
            records,
            routes: RouteTable::new(routes),
            firewall,
        })
    }

    /// Validate the configuration without keeping the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if normalization fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.compile().map(|_| ())
    }

    /// Create a minimal default configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            listen: ListenConfig::default(),
            log: LogConfig::default(),
            dns_records: vec![DnsRecordConfig {
                name: "web.internal".into(),
                kind: "A".into(),
                address: Some("10.0.0.10".into()),
                target: None,
            }],
            routes: vec![RouteConfig {
                network: "0.0.0.0/0".into(),
                next_hop: "192.168.1.1".into(),
                interface: "eth0".into(),
                router_label: Some("Router-1".into()),
            }],
            firewall: FirewallConfig::default(),
        }
    }
}

fn prefix(err: ConfigError, what: &str, index: usize) -> ConfigError {
    ConfigError::validation(format!("{what} {index}: {err}"))
}

/// HTTP listen configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    /// Listen address (e.g., "127.0.0.1:8089")
    #[serde(default = "default_listen_addr")]
    pub address: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8089".parse().expect("static address")
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "text" or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Include the event target in output
    #[serde(default)]
    pub target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: false,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "text".into()
}

/// One name record as it appears in the config file.
///
/// Accepted kinds: `A`/`ADDRESS` (needs `address`, or `ip`/`value`) and
/// `CNAME`/`ALIAS` (needs `target`, or `cname`/`alias`), case-insensitive.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsRecordConfig {
    /// Record name
    #[serde(alias = "host", alias = "domain")]
    pub name: String,

    /// Record kind token
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,

    /// Address payload (A records)
    #[serde(default, alias = "ip", alias = "value")]
    pub address: Option<String>,

    /// Alias payload (CNAME records)
    #[serde(default, alias = "cname", alias = "alias")]
    pub target: Option<String>,
}

impl DnsRecordConfig {
    /// Normalize into a canonical [`NameRecord`].
    pub(crate) fn compile(&self) -> Result<NameRecord, ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::validation("record name must not be empty"));
        }

        match self.kind.to_ascii_uppercase().as_str() {
            "A" | "ADDRESS" => {
                let raw = self.address.as_deref().ok_or_else(|| {
                    ConfigError::validation(format!(
                        "address record '{}' is missing an address field",
                        self.name
                    ))
                })?;
                let addr: Ipv4Addr = raw.parse().map_err(|_| {
                    ConfigError::validation(format!(
                        "record '{}': invalid IPv4 address '{raw}'",
                        self.name
                    ))
                })?;
                Ok(NameRecord::address(&self.name, addr))
            }
            "CNAME" | "ALIAS" => {
                let target = self.target.as_deref().ok_or_else(|| {
                    ConfigError::validation(format!(
                        "alias record '{}' is missing a target field",
                        self.name
                    ))
                })?;
                if target.is_empty() {
                    return Err(ConfigError::validation(format!(
                        "alias record '{}' has an empty target",
                        self.name
                    )));
                }
                Ok(NameRecord::alias(&self.name, target))
            }
            other => Err(ConfigError::validation(format!(
                "record '{}': unsupported record kind '{other}' (expected A or CNAME)",
                self.name
            ))),
        }
    }
}

/// One route as it appears in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Destination network in CIDR notation
    #[serde(alias = "cidr", alias = "destination")]
    pub network: String,

    /// Next-hop gateway address
    #[serde(alias = "gateway", alias = "via")]
    pub next_hop: String,

    /// Outgoing interface name
    #[serde(alias = "dev", alias = "out_interface")]
    pub interface: String,

    /// Router label for trace entries
    #[serde(default, alias = "router", alias = "label")]
    pub router_label: Option<String>,
}

impl RouteConfig {
    /// Normalize into a canonical [`Route`].
    pub(crate) fn compile(&self) -> Result<Route, ConfigError> {
        let network: Ipv4Net = self.network.parse().map_err(|_| {
            ConfigError::validation(format!(
                "invalid network CIDR '{}' (expected address/prefix)",
                self.network
            ))
        })?;
        let next_hop: Ipv4Addr = self.next_hop.parse().map_err(|_| {
            ConfigError::validation(format!("invalid next-hop address '{}'", self.next_hop))
        })?;
        if self.interface.is_empty() {
            return Err(ConfigError::validation("interface must not be empty"));
        }

        Ok(Route {
            network,
            next_hop,
            interface: self.interface.clone(),
            router_label: self.router_label.clone(),
        })
    }
}

/// Destination-port specification: a bare port number or a string
/// (`"22"` or `"80-443"`).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PortSpec {
    /// Single port as a JSON number
    Port(u16),

    /// Port or inclusive range as a string
    Spec(String),
}

impl PortSpec {
    fn compile(&self) -> Result<PortRange, ConfigError> {
        match self {
            Self::Port(p) => Ok(PortRange::single(*p)),
            Self::Spec(s) => PortRange::parse(s),
        }
    }
}

/// One firewall rule as it appears in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FirewallRuleConfig {
    /// Unique, order-significant identifier
    pub id: u32,

    /// "allow" or "deny" (case-insensitive)
    pub action: String,

    /// Protocol token or the "ANY" wildcard
    #[serde(default = "default_protocol", alias = "proto")]
    pub protocol: String,

    /// Source network in CIDR notation
    #[serde(alias = "src", alias = "source_cidr")]
    pub source: String,

    /// Destination port or range
    #[serde(alias = "port", alias = "port_range")]
    pub ports: PortSpec,
}

fn default_protocol() -> String {
    "ANY".into()
}

impl FirewallRuleConfig {
    /// Normalize into a canonical [`FirewallRule`].
    pub(crate) fn compile(&self) -> Result<FirewallRule, ConfigError> {
        let action = parse_action(&self.action)
            .map_err(|e| ConfigError::validation(format!("rule #{}: {e}", self.id)))?;
        let source: Ipv4Net = self.source.parse().map_err(|_| {
            ConfigError::validation(format!(
                "rule #{}: invalid source CIDR '{}'",
                self.id, self.source
            ))
        })?;
        let ports = self
            .ports
            .compile()
            .map_err(|e| ConfigError::validation(format!("rule #{}: {e}", self.id)))?;

        Ok(FirewallRule {
            id: self.id,
            action,
            protocol: RuleProtocol::parse(&self.protocol),
            source,
            ports,
        })
    }
}

/// Firewall section of the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FirewallConfig {
    /// Action when no rule matches: "allow" (default) or "deny"
    #[serde(default = "default_action")]
    pub default_action: String,

    /// Ordered rule list; evaluation order = declaration order
    #[serde(default)]
    pub rules: Vec<FirewallRuleConfig>,
}

impl Default for FirewallConfig {
    fn default() -> Self {
        Self {
            default_action: default_action(),
            rules: Vec::new(),
        }
    }
}

fn default_action() -> String {
    "allow".into()
}

impl FirewallConfig {
    /// Normalize into a canonical [`Firewall`], checking id uniqueness.
    pub(crate) fn compile(&self) -> Result<Firewall, ConfigError> {
        let default_action = parse_action(&self.default_action)
            .map_err(|e| ConfigError::validation(format!("firewall default_action: {e}")))?;

        let mut seen = std::collections::HashSet::new();
        let mut rules = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            if !seen.insert(rule.id) {
                return Err(ConfigError::validation(format!(
                    "duplicate firewall rule id #{}",
                    rule.id
                )));
            }
            rules.push(rule.compile()?);
        }

        Ok(Firewall::new(rules, default_action))
    }
}

fn parse_action(token: &str) -> Result<FirewallAction, String> {
    match token.to_ascii_lowercase().as_str() {
        "allow" | "accept" | "permit" => Ok(FirewallAction::Allow),
        "deny" | "drop" | "block" => Ok(FirewallAction::Deny),
        other => Err(format!("unknown action '{other}' (expected allow or deny)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecordData;

    #[test]
    fn test_default_config_compiles() {
        let config = Config::default_config();
        let snapshot = config.compile().unwrap();
        assert_eq!(snapshot.records.len(), 1);
        assert_eq!(snapshot.routes.len(), 1);
        assert!(snapshot.firewall.is_empty());
    }

    #[test]
    fn test_record_synonyms_normalize_identically() {
        let canonical: DnsRecordConfig = serde_json::from_str(
            r#"{ "name": "web", "type": "A", "address": "10.0.0.10" }"#,
        )
        .unwrap();
        let synonymous: DnsRecordConfig = serde_json::from_str(
            r#"{ "host": "web", "kind": "a", "ip": "10.0.0.10" }"#,
        )
        .unwrap();

        assert_eq!(canonical.compile().unwrap(), synonymous.compile().unwrap());
    }

    #[test]
    fn test_alias_record_synonyms() {
        let record: DnsRecordConfig = serde_json::from_str(
            r#"{ "domain": "www", "type": "CNAME", "cname": "web" }"#,
        )
        .unwrap();
        let compiled = record.compile().unwrap();
        assert_eq!(compiled.data, RecordData::Alias("web".into()));
    }

    #[test]
    fn test_unknown_record_kind_rejected() {
        let record: DnsRecordConfig =
            serde_json::from_str(r#"{ "name": "web", "type": "MX", "value": "mail" }"#).unwrap();
        let err = record.compile().unwrap_err();
        assert!(err.to_string().contains("unsupported record kind"));
    }

    #[test]
    fn test_address_record_requires_address_field() {
        let record: DnsRecordConfig =
            serde_json::from_str(r#"{ "name": "web", "type": "A" }"#).unwrap();
        assert!(record.compile().is_err());
    }

    #[test]
    fn test_malformed_address_rejected() {
        let record: DnsRecordConfig = serde_json::from_str(
            r#"{ "name": "web", "type": "A", "address": "10.0.0.999" }"#,
        )
        .unwrap();
        assert!(record.compile().is_err());
    }

    #[test]
    fn test_route_synonyms() {
        let route: RouteConfig = serde_json::from_str(
            r#"{ "cidr": "10.0.0.0/24", "gateway": "10.0.0.1", "dev": "eth0", "label": "R1" }"#,
        )
        .unwrap();
        let compiled = route.compile().unwrap();
        assert_eq!(compiled.network.prefix_len(), 24);
        assert_eq!(compiled.router_label.as_deref(), Some("R1"));
    }

    #[test]
    fn test_bad_cidr_rejected_at_compile() {
        let route: RouteConfig = serde_json::from_str(
            r#"{ "network": "10.0.0.0/33", "next_hop": "10.0.0.1", "interface": "eth0" }"#,
        )
        .unwrap();
        assert!(route.compile().is_err());

        // A bare address without a prefix is also not a CIDR.
        let route: RouteConfig = serde_json::from_str(
            r#"{ "network": "10.0.0.0", "next_hop": "10.0.0.1", "interface": "eth0" }"#,
        )
        .unwrap();
        assert!(route.compile().is_err());
    }

    #[test]
    fn test_firewall_rule_port_shapes() {
        let numeric: FirewallRuleConfig = serde_json::from_str(
            r#"{ "id": 1, "action": "deny", "protocol": "TCP", "source": "0.0.0.0/0", "ports": 22 }"#,
        )
        .unwrap();
        let stringy: FirewallRuleConfig = serde_json::from_str(
            r#"{ "id": 1, "action": "deny", "protocol": "TCP", "source": "0.0.0.0/0", "port": "22" }"#,
        )
        .unwrap();
        assert_eq!(
            numeric.compile().unwrap().ports,
            stringy.compile().unwrap().ports
        );

        let range: FirewallRuleConfig = serde_json::from_str(
            r#"{ "id": 2, "action": "allow", "source": "0.0.0.0/0", "port_range": "80-443" }"#,
        )
        .unwrap();
        let compiled = range.compile().unwrap();
        assert!(compiled.ports.contains(80));
        assert!(compiled.ports.contains(443));
        assert!(matches!(compiled.protocol, RuleProtocol::Any));
    }

    #[test]
    fn test_duplicate_rule_ids_rejected() {
        let firewall: FirewallConfig = serde_json::from_str(
            r#"{ "rules": [
                { "id": 1, "action": "deny", "source": "0.0.0.0/0", "ports": 22 },
                { "id": 1, "action": "allow", "source": "0.0.0.0/0", "ports": 80 }
            ] }"#,
        )
        .unwrap();
        let err = firewall.compile().unwrap_err();
        assert!(err.to_string().contains("duplicate firewall rule id"));
    }

    #[test]
    fn test_default_action_parsing() {
        let firewall: FirewallConfig =
            serde_json::from_str(r#"{ "default_action": "DENY" }"#).unwrap();
        assert_eq!(
            firewall.compile().unwrap().default_action(),
            FirewallAction::Deny
        );

        let firewall: FirewallConfig =
            serde_json::from_str(r#"{ "default_action": "reject-all" }"#).unwrap();
        assert!(firewall.compile().is_err());
    }

    #[test]
    fn test_compile_error_names_the_entry() {
        let config: Config = serde_json::from_str(
            r#"{ "routes": [
                { "network": "0.0.0.0/0", "next_hop": "192.168.1.1", "interface": "eth0" },
                { "network": "not-a-cidr", "next_hop": "10.0.0.1", "interface": "eth0" }
            ] }"#,
        )
        .unwrap();
        let err = config.compile().unwrap_err();
        assert!(err.to_string().contains("route 1"));
    }
}
