//! CIDR containment math
//!
//! Dotted-quad addresses are parsed into [`std::net::Ipv4Addr`] and CIDR
//! blocks into [`ipnet::Ipv4Net`] at config-load time, so every function
//! here operates on already-validated values. Containment is explicit
//! u32/mask arithmetic: `(addr & mask) == (network & mask)`.

use std::net::Ipv4Addr;

use ipnet::Ipv4Net;

/// Convert a dotted-quad address to its unsigned 32-bit integer form.
#[must_use]
pub fn addr_to_u32(addr: Ipv4Addr) -> u32 {
    u32::from(addr)
}

/// Build a network mask from a prefix length.
///
/// A prefix of 0 yields the all-zero mask (matches everything); otherwise
/// the top `prefix` bits are set. Callers guarantee `prefix <= 32` (the
/// `Ipv4Net` parser enforces it).
#[must_use]
pub fn prefix_to_mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

/// Check whether `addr` lies within `network`.
#[must_use]
pub fn addr_in_network(addr: Ipv4Addr, network: &Ipv4Net) -> bool {
    let mask = prefix_to_mask(network.prefix_len());
    (addr_to_u32(addr) & mask) == (addr_to_u32(network.addr()) & mask)
}
