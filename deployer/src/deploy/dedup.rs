//! Deduplication of publish log lines across status polls
//!
//! The platform returns the whole publish log on every poll. Only lines that
//! have not been surfaced earlier in the same run are passed on.

use std::collections::HashSet;

use crate::models::customization::LogEntry;

/// Identity of a log line: upper-cased log type plus the exact message
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogIdentity {
    pub log_type: String,
    pub message: String,
}

impl From<&LogEntry> for LogIdentity {
    fn from(entry: &LogEntry) -> Self {
        Self {
            log_type: entry.log_type.to_uppercase(),
            message: entry.message.clone(),
        }
    }
}

/// Log lines already surfaced during one run
#[derive(Debug, Default)]
pub struct SeenLogSet {
    seen: HashSet<LogIdentity>,
}

impl SeenLogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a batch and return the entries not seen before, in received order.
    /// The returned entries carry the upper-cased log type.
    pub fn observe(&mut self, entries: &[LogEntry]) -> Vec<LogEntry> {
        entries
            .iter()
            .filter_map(|entry| {
                let identity = LogIdentity::from(entry);
                if self.seen.insert(identity.clone()) {
                    Some(LogEntry::new(identity.log_type, identity.message))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Number of distinct lines surfaced so far
    pub fn distinct_lines(&self) -> usize {
        self.seen.len()
    }
}
