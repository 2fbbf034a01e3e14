//! Name resolution over the configured record table
//!
//! Walks a chain of Address/Alias records (A/CNAME equivalent) to a final
//! address. Termination is guaranteed by the visited set alone: a loop is
//! detected the moment a name repeats, so no iteration cap is needed.
//!
//! Record kinds outside Address/Alias cannot occur here — the config layer
//! rejects them at startup, so [`RecordData`] is a closed two-variant enum.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use super::trace::Trace;

/// Trace location label for all resolver decisions.
const LOCATION: &str = "DNS";

/// Payload of a name record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    /// Terminal address record (A-equivalent).
    Address(Ipv4Addr),

    /// Alias to another name (CNAME-equivalent).
    Alias(String),
}

/// One entry in the name table. Immutable after config load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    /// The name this record answers for.
    pub name: String,

    /// Address or alias payload.
    pub data: RecordData,
}

impl NameRecord {
    /// Create an address record.
    pub fn address(name: impl Into<String>, addr: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            data: RecordData::Address(addr),
        }
    }

    /// Create an alias record.
    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: RecordData::Alias(target.into()),
        }
    }
}

/// Resolve `name` against the record table, tracing every step.
///
/// Returns the final address, or `None` when resolution terminated on
/// NXDOMAIN or a CNAME loop (the trace already carries the terminal entry).
/// Name comparison is ASCII case-insensitive, per DNS convention.
pub fn resolve(name: &str, records: &[NameRecord], trace: &mut Trace) -> Option<Ipv4Addr> {
    let mut visited: HashSet<String> = HashSet::new();
    let mut current = name.to_string();

    loop {
        if !visited.insert(current.to_ascii_lowercase()) {
            trace.record(LOCATION, format!("CNAME loop detected for {current}"));
            return None;
        }

        let record = records
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(&current));

        match record {
            None => {
                trace.record(LOCATION, format!("NXDOMAIN: {current} not found"));
                return None;
            }
            Some(r) => match &r.data {
                RecordData::Address(addr) => {
                    trace.record(LOCATION, format!("Resolved {name} to {addr}"));
                    return Some(*addr);
                }
                RecordData::Alias(target) => {
                    trace.record(LOCATION, format!("CNAME: {current} → {target}"));
                    current = target.clone();
                }
            },
        }
    }
}
