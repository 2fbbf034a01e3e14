//! Route selection by longest prefix match
//!
//! The table is a plain ordered scan: candidate routes are those whose
//! network contains the destination, and the strictly greatest prefix
//! length wins. Ties keep the earliest declared route because the scan
//! only replaces the current best on a strict `>` comparison.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

use super::cidr::addr_in_network;

/// One forwarding entry. Immutable after config load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Destination network (carries the prefix length).
    pub network: Ipv4Net,

    /// Next-hop gateway address.
    pub next_hop: Ipv4Addr,

    /// Outgoing interface name.
    pub interface: String,

    /// Router label used in trace entries; falls back to `Router-<hop>`.
    pub router_label: Option<String>,
}

/// Fixed route table, scanned in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Build a table from an ordered route list.
    #[must_use]
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Number of configured routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table has no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Select the most specific route covering `dest`.
    ///
    /// Returns `None` only when no route matches, which requires that no
    /// `0.0.0.0/0` default route is configured.
    #[must_use]
    pub fn select(&self, dest: Ipv4Addr) -> Option<&Route> {
        let mut best: Option<&Route> = None;
        for route in &self.routes {
            if !addr_in_network(dest, &route.network) {
                continue;
            }
            // Strict > keeps the first-declared route on prefix ties.
            if best.map_or(true, |b| route.network.prefix_len() > b.network.prefix_len()) {
                best = Some(route);
            }
        }
        best
    }
}
