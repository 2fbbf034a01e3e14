//! The trace orchestrator
//!
//! Drives one packet through Start → Resolving → Forwarding → Terminal,
//! appending a trace entry at every decision point and stopping on the
//! first terminal condition (NXDOMAIN, CNAME loop, no route, TTL exceeded,
//! firewall deny, or delivery).
//!
//! Forwarding is a single linear hop by design: the simulated topology
//! never chains routers within one request, so there is no hop loop.

use std::net::Ipv4Addr;
use std::sync::Arc;

use super::firewall::{Firewall, FirewallAction};
use super::resolver::{resolve, NameRecord};
use super::route::RouteTable;
use super::trace::{Trace, TraceEntry};

/// Immutable, process-wide topology tables.
///
/// Built once at startup from the configuration and shared read-only (via
/// `Arc`) across all requests. Never mutated after construction, so the
/// engine needs no synchronization.
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    /// Name record table for the resolver.
    pub records: Vec<NameRecord>,

    /// Route table for forwarding decisions.
    pub routes: RouteTable,

    /// Ordered firewall rule set.
    pub firewall: Firewall,
}

/// Input descriptor for one simulated packet.
///
/// Shape validation (field presence, types, parsable source address) is the
/// HTTP layer's job; by the time a spec reaches the simulator its fields are
/// structurally sound.
#[derive(Debug, Clone)]
pub struct PacketSpec {
    /// Source address of the packet.
    pub source: Ipv4Addr,

    /// Destination: dotted-quad literal or a resolvable name.
    pub destination: String,

    /// Destination port.
    pub destination_port: u16,

    /// Protocol token, matched case-insensitively against firewall rules.
    pub protocol: String,

    /// Hop budget; the packet is dropped when it reaches zero.
    pub time_to_live: u8,
}

/// Deterministic packet-path simulator.
///
/// Stateless between calls: all per-request state (TTL, resolved address,
/// trace) is local to [`Simulator::simulate`], so one simulator can serve
/// any number of concurrent requests.
#[derive(Debug, Clone)]
pub struct Simulator {
    snapshot: Arc<NetworkSnapshot>,
}

impl Simulator {
    /// Create a simulator over an immutable topology snapshot.
    #[must_use]
    pub fn new(snapshot: Arc<NetworkSnapshot>) -> Self {
        Self { snapshot }
    }

    /// Borrow the underlying snapshot.
    #[must_use]
    pub fn snapshot(&self) -> &NetworkSnapshot {
        &self.snapshot
    }

    /// Simulate one packet and return its decision trace.
    ///
    /// The trace is never empty: even the earliest terminal (NXDOMAIN)
    /// produces one entry, and a literal destination produces the DNS-skip
    /// notice before forwarding begins.
    #[must_use]
    pub fn simulate(&self, spec: &PacketSpec) -> Vec<TraceEntry> {
        let mut trace = Trace::new();

        // Start: classify the destination as literal address or name.
        let dest = match spec.destination.parse::<Ipv4Addr>() {
            Ok(addr) => {
                trace.record("DNS", format!("Destination is already an IP: {addr}"));
                addr
            }
            Err(_) => {
                // Resolving: terminal entries are recorded by the resolver.
                match resolve(&spec.destination, &self.snapshot.records, &mut trace) {
                    Some(addr) => addr,
                    None => return trace.into_entries(),
                }
            }
        };

        // Forwarding: one simulated hop.
        let mut ttl = spec.time_to_live;
        let mut hops: u32 = 0;

        if ttl == 0 {
            trace.record(
                format!("Router-{}", hops + 1),
                "Time To Live (TTL) exceeded. Packet dropped.",
            );
            return trace.into_entries();
        }

        let Some(route) = self.snapshot.routes.select(dest) else {
            trace.record(
                format!("Router-{}", hops + 1),
                format!("No route to host {dest}. Destination unreachable."),
            );
            return trace.into_entries();
        };

        ttl -= 1;
        hops += 1;
        let label = route
            .router_label
            .clone()
            .unwrap_or_else(|| format!("Router-{hops}"));
        trace.record(
            label,
            format!(
                "Forwarded towards {dest} via next-hop {} on {}, TTL now {ttl}",
                route.next_hop, route.interface
            ),
        );

        let action = self.snapshot.firewall.evaluate(
            spec.source,
            spec.destination_port,
            &spec.protocol,
            &mut trace,
        );
        if action == FirewallAction::Deny {
            return trace.into_entries();
        }

        trace.record(
            "Destination Host",
            format!(
                "Packet delivered to {dest}:{} over {}",
                spec.destination_port, spec.protocol
            ),
        );
        trace.into_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::firewall::{FirewallRule, PortRange, RuleProtocol};
    use crate::engine::route::Route;

    fn sample_snapshot() -> Arc<NetworkSnapshot> {
        let records = vec![
            NameRecord::address("web.internal", "10.0.0.10".parse().unwrap()),
            NameRecord::alias("www.internal", "web.internal"),
        ];
        let routes = RouteTable::new(vec![
            Route {
                network: "10.0.0.0/24".parse().unwrap(),
                next_hop: "10.0.0.1".parse().unwrap(),
                interface: "eth0".into(),
                router_label: Some("Router-1".into()),
            },
            Route {
                network: "0.0.0.0/0".parse().unwrap(),
                next_hop: "192.168.1.1".parse().unwrap(),
                interface: "eth1".into(),
                router_label: Some("Router-Edge".into()),
            },
        ]);
        let firewall = Firewall::new(
            vec![
                FirewallRule {
                    id: 1,
                    action: FirewallAction::Deny,
                    protocol: RuleProtocol::parse("TCP"),
                    source: "0.0.0.0/0".parse().unwrap(),
                    ports: PortRange::single(22),
                },
                FirewallRule {
                    id: 2,
                    action: FirewallAction::Allow,
                    protocol: RuleProtocol::Any,
                    source: "0.0.0.0/0".parse().unwrap(),
                    ports: PortRange::new(1, 65535).unwrap(),
                },
            ],
            FirewallAction::Allow,
        );

        Arc::new(NetworkSnapshot {
            records,
            routes,
            firewall,
        })
    }

    fn packet(destination: &str, port: u16, ttl: u8) -> PacketSpec {
        PacketSpec {
            source: "192.168.1.50".parse().unwrap(),
            destination: destination.into(),
            destination_port: port,
            protocol: "TCP".into(),
            time_to_live: ttl,
        }
    }

    fn actions(trace: &[TraceEntry]) -> Vec<&str> {
        trace.iter().map(|e| e.action.as_str()).collect()
    }

    #[test]
    fn test_allow_path_literal_destination() {
        let sim = Simulator::new(sample_snapshot());
        let trace = sim.simulate(&packet("10.0.0.10", 80, 4));

        assert_eq!(
            actions(&trace),
            vec![
                "Destination is already an IP: 10.0.0.10",
                "Forwarded towards 10.0.0.10 via next-hop 10.0.0.1 on eth0, TTL now 3",
                "Packet allowed by rule #2",
                "Packet delivered to 10.0.0.10:80 over TCP",
            ]
        );
        assert_eq!(trace[0].location, "DNS");
        assert_eq!(trace[1].location, "Router-1");
        assert_eq!(trace[2].location, "Firewall");
        assert_eq!(trace[3].location, "Destination Host");
    }

    #[test]
    fn test_deny_path_port_22() {
        let sim = Simulator::new(sample_snapshot());
        let trace = sim.simulate(&packet("10.0.0.10", 22, 4));

        assert_eq!(
            trace.last().unwrap().action,
            "Packet blocked by rule #1 (protocol=TCP, port=22-22)"
        );
        assert_eq!(trace.len(), 3);
    }

    #[test]
    fn test_ttl_zero_drops_before_routing() {
        let sim = Simulator::new(sample_snapshot());
        let trace = sim.simulate(&packet("10.0.0.10", 80, 0));

        // DNS-skip notice, then the TTL terminal. Nothing else.
        assert_eq!(trace.len(), 2);
        assert_eq!(trace[1].location, "Router-1");
        assert_eq!(
            trace[1].action,
            "Time To Live (TTL) exceeded. Packet dropped."
        );
    }

    #[test]
    fn test_nxdomain_is_single_entry() {
        let sim = Simulator::new(sample_snapshot());
        let trace = sim.simulate(&packet("unknown.site", 80, 4));

        assert_eq!(trace.len(), 1);
        assert_eq!(trace[0].action, "NXDOMAIN: unknown.site not found");
    }

    #[test]
    fn test_name_destination_resolves_then_forwards() {
        let sim = Simulator::new(sample_snapshot());
        let trace = sim.simulate(&packet("www.internal", 443, 8));

        assert_eq!(
            actions(&trace),
            vec![
                "CNAME: www.internal → web.internal",
                "Resolved www.internal to 10.0.0.10",
                "Forwarded towards 10.0.0.10 via next-hop 10.0.0.1 on eth0, TTL now 7",
                "Packet allowed by rule #2",
                "Packet delivered to 10.0.0.10:443 over TCP",
            ]
        );
    }

    #[test]
    fn test_default_route_and_unlabeled_fallback() {
        let snapshot = Arc::new(NetworkSnapshot {
            records: Vec::new(),
            routes: RouteTable::new(vec![Route {
                network: "0.0.0.0/0".parse().unwrap(),
                next_hop: "192.168.1.1".parse().unwrap(),
                interface: "eth1".into(),
                router_label: None,
            }]),
            firewall: Firewall::default(),
        });
        let sim = Simulator::new(snapshot);
        let trace = sim.simulate(&packet("8.8.8.8", 53, 2));

        // Unlabeled route falls back to Router-<hop>.
        assert_eq!(trace[1].location, "Router-1");
        assert_eq!(
            trace[1].action,
            "Forwarded towards 8.8.8.8 via next-hop 192.168.1.1 on eth1, TTL now 1"
        );
    }

    #[test]
    fn test_no_route_without_default() {
        let snapshot = Arc::new(NetworkSnapshot {
            records: Vec::new(),
            routes: RouteTable::new(vec![Route {
                network: "10.0.0.0/24".parse().unwrap(),
                next_hop: "10.0.0.1".parse().unwrap(),
                interface: "eth0".into(),
                router_label: None,
            }]),
            firewall: Firewall::default(),
        });
        let sim = Simulator::new(snapshot);
        let trace = sim.simulate(&packet("172.16.0.1", 80, 4));

        assert_eq!(trace.len(), 2);
        assert_eq!(trace[1].location, "Router-1");
        assert_eq!(
            trace[1].action,
            "No route to host 172.16.0.1. Destination unreachable."
        );
    }

    #[test]
    fn test_trace_never_empty() {
        let sim = Simulator::new(Arc::new(NetworkSnapshot::default()));
        let trace = sim.simulate(&packet("nowhere.test", 80, 4));
        assert!(!trace.is_empty());

        let trace = sim.simulate(&packet("1.2.3.4", 80, 4));
        assert!(!trace.is_empty());
    }

    #[test]
    fn test_delivery_over_default_allow() {
        // No rules at all: the implicit default decides.
        let snapshot = Arc::new(NetworkSnapshot {
            records: Vec::new(),
            routes: RouteTable::new(vec![Route {
                network: "0.0.0.0/0".parse().unwrap(),
                next_hop: "192.168.1.1".parse().unwrap(),
                interface: "eth1".into(),
                router_label: None,
            }]),
            firewall: Firewall::default(),
        });
        let sim = Simulator::new(snapshot);
        let trace = sim.simulate(&packet("8.8.8.8", 443, 3));

        assert_eq!(trace[2].action, "No matching rule, default allow");
        assert_eq!(
            trace[3].action,
            "Packet delivered to 8.8.8.8:443 over TCP"
        );
    }
}
