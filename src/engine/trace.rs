//! Trace output model
//!
//! A trace is the ordered, append-only sequence of decisions made for one
//! simulated packet. It is the sole output of a simulation: success and
//! every failure kind are encoded by the final entry's text, never by a
//! Rust error.

use serde::Serialize;

/// One decision record in a packet trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceEntry {
    /// Label identifying where the decision was made
    /// ("DNS", "Router-1", "Firewall", "Destination Host", ...).
    pub location: String,

    /// Human-readable description of the decision taken.
    pub action: String,
}

impl TraceEntry {
    /// Create a new trace entry.
    pub fn new(location: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            action: action.into(),
        }
    }
}

/// Append-only sequence of trace entries for one request.
///
/// Owned solely by the simulation that produces it; never shared across
/// requests.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    entries: Vec<TraceEntry>,
}

impl Trace {
    /// Create an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a decision record.
    pub fn record(&mut self, location: impl Into<String>, action: impl Into<String>) {
        self.entries.push(TraceEntry::new(location, action));
    }

    /// Number of entries recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the recorded entries.
    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    /// Consume the trace, yielding the ordered entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<TraceEntry> {
        self.entries
    }
}
