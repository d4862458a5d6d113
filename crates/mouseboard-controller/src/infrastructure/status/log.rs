//! Bounded log ring.

use std::collections::VecDeque;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::Level;

/// One captured log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Position in the stream of all entries ever pushed, starting at 0.
    pub seq: u64,
    pub level: Level,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub text: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:>5} {}", self.timestamp, self.level.to_string(), self.text)
    }
}

/// Fixed-capacity log buffer; the newest entry overwrites the oldest.
#[derive(Debug, Clone)]
pub struct LogRing {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
}

impl LogRing {
    /// Creates a ring holding up to `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    /// Appends an entry stamped with the current time.
    pub fn push(&mut self, level: Level, text: impl Into<String>) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        self.push_at(level, timestamp, text.into());
    }

    fn push_at(&mut self, level: Level, timestamp: u64, text: String) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            seq: self.next_seq,
            level,
            timestamp,
            text,
        });
        self.next_seq += 1;
    }

    /// The newest `max` entries, oldest first.
    pub fn recent(&self, max: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(max);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Retained entries with `seq >= from`, oldest first.
    pub fn since(&self, from: u64) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.seq >= from)
            .cloned()
            .collect()
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
}
