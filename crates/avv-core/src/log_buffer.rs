//! Log Buffer - ring buffer of recent log records
//!
//! Fixed-size and allocation-free, so a host can keep the last few records
//! around for an on-screen log panel.

use heapless::{Deque, String};
use log::Level;

/// Maximum number of records kept
pub const LOG_BUFFER_CAPACITY: usize = 64;

/// Maximum length of a record's message
pub const LOG_LINE_MAX_LEN: usize = 120;

/// Maximum length of a record's target
pub const LOG_TARGET_MAX_LEN: usize = 32;

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub level: Level,
    pub target: String<LOG_TARGET_MAX_LEN>,
    /// Truncated to `LOG_LINE_MAX_LEN` bytes
    pub message: String<LOG_LINE_MAX_LEN>,
}

impl LogEntry {
    pub fn new(level: Level, target: &str, message: &str) -> Self {
        Self {
            level,
            target: truncated(target),
            message: truncated(message),
        }
    }
}

fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

pub struct LogBuffer {
    entries: Deque<LogEntry, LOG_BUFFER_CAPACITY>,
}

impl LogBuffer {
    pub const fn new() -> Self {
        Self {
            entries: Deque::new(),
        }
    }

    /// Append an entry, dropping the oldest one when full.
    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.is_full() {
            self.entries.pop_front();
        }
        // room was made above
        self.entries.push_back(entry).ok();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The last `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .skip(self.entries.len().saturating_sub(count))
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}
