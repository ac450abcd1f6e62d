//! Append-only activity log kept by every node.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::name::LogicalName;

/// Capacity of the live fan-out channel. Slow subscribers lag, the log itself never drops.
const BROADCAST_CAPACITY: usize = 1024;

/// Where a logged activity originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    Local,
    Remote,
}

/// What kind of activity was logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Action,
    Event,
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Position in the owning log, starting at 1.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub source: LogSource,
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub alias: LogicalName,
    pub arg: Value,
}

#[derive(Debug, Default)]
struct LogState {
    entries: Vec<LogEntry>,
    last_seq: u64,
}

/// Totally ordered activity log for one node.
///
/// Ordering is append order; the timestamp is informational. Entries are
/// never removed or reordered.
#[derive(Debug)]
pub struct ActivityLog {
    state: Mutex<LogState>,
    sender: broadcast::Sender<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            state: Mutex::new(LogState::default()),
            sender,
        }
    }

    /// Append an entry and return its sequence number.
    pub fn append(
        &self,
        timestamp: DateTime<Utc>,
        source: LogSource,
        kind: LogKind,
        alias: LogicalName,
        arg: Value,
    ) -> u64 {
        let mut state = self.state.lock();
        state.last_seq += 1;
        let entry = LogEntry {
            seq: state.last_seq,
            timestamp,
            source,
            kind,
            alias,
            arg,
        };
        // Sent under the lock so subscribers see append order
        let _ = self.sender.send(entry.clone());
        state.entries.push(entry);
        state.last_seq
    }

    /// Snapshot of every entry in append order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state.lock().entries.clone()
    }

    /// Up to `max` entries with a sequence number greater than `seq`.
    pub fn entries_since(&self, seq: u64, max: usize) -> Vec<LogEntry> {
        let state = self.state.lock();
        // seq n lives at index n - 1
        let start = usize::try_from(seq).unwrap_or(usize::MAX).min(state.entries.len());
        state.entries[start..].iter().take(max).cloned().collect()
    }

    /// The most recent `n` entries, oldest first.
    pub fn latest(&self, n: usize) -> Vec<LogEntry> {
        let state = self.state.lock();
        let start = state.entries.len().saturating_sub(n);
        state.entries[start..].to_vec()
    }

    pub fn last_seq(&self) -> u64 {
        self.state.lock().last_seq
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive entries as they are appended.
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
