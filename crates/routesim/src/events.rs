//! Simulation event log
//!
//! A bounded, timestamped record of what happened during a session: graph
//! edits, route requests and their results. Entries are also mirrored to
//! `tracing` so they show up in the regular log output.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single entry in the event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: DateTime<Local>,
    /// Subsystem that produced the entry ("Graph", "Sim", "UI", "Error")
    pub source: String,
    pub event: String,
    pub detail: String,
}

impl LogEntry {
    pub fn new(
        source: impl Into<String>,
        event: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            time: Local::now(),
            source: source.into(),
            event: event.into(),
            detail: detail.into(),
        }
    }

    /// "Source:Event", e.g. `Sim:Path`
    pub fn label(&self) -> String {
        format!("{}:{}", self.source, self.event)
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:<14} {}",
            self.time.format("%H:%M:%S"),
            self.label(),
            self.detail
        )
    }
}

/// Ring buffer of log entries; the oldest entry is dropped when full
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(500)
    }
}

impl EventLog {
    /// A capacity of zero is treated as one
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    pub fn record(
        &mut self,
        source: impl Into<String>,
        event: impl Into<String>,
        detail: impl Into<String>,
    ) -> &LogEntry {
        let entry = LogEntry::new(source, event, detail);
        tracing::debug!(target: "routesim::events", "{}: {}", entry.label(), entry.detail);

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
        &self.entries[self.entries.len() - 1]
    }

    /// All entries, oldest first
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// The last `n` entries, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(self.entries.len().saturating_sub(n))
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_format() {
        let mut log = EventLog::default();
        let entry = log.record("Sim", "Path", "N1 → N2");

        assert_eq!(entry.label(), "Sim:Path");
        let line = entry.to_string();
        assert!(line.ends_with("Sim:Path       N1 → N2"));
        assert_eq!(line.as_bytes()[2], b':');
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut log = EventLog::with_capacity(3);
        for i in 0..5 {
            log.record("Graph", "Add", format!("Node N{}", i));
        }

        let details: Vec<_> = log.entries().map(|e| e.detail.as_str()).collect();
        assert_eq!(details, vec!["Node N2", "Node N3", "Node N4"]);
        assert_eq!(log.capacity(), 3);
    }

    #[test]
    fn test_recent() {
        let mut log = EventLog::with_capacity(10);
        for i in 0..4 {
            log.record("UI", "Info", i.to_string());
        }

        let last_two: Vec<_> = log.recent(2).map(|e| e.detail.as_str()).collect();
        assert_eq!(last_two, vec!["2", "3"]);
        assert_eq!(log.recent(10).count(), 4);
        assert_eq!(log.last().unwrap().detail, "3");
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let mut log = EventLog::with_capacity(0);
        log.record("UI", "Info", "first");
        log.record("UI", "Info", "second");
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().detail, "second");

        log.clear();
        assert!(log.is_empty());
    }
}
