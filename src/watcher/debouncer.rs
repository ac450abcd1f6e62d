//! Settling of bursts of root changes.
//!
//! Copying or unpacking a node folder produces many events in quick
//! succession. A root is reported once it has been quiet for the settle
//! window, together with how many events it absorbed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct Burst {
    last_change: Instant,
    events: usize,
}

/// Tracks which roots changed recently and reports those that went quiet.
#[derive(Debug)]
pub struct SettleTracker {
    pending: HashMap<PathBuf, Burst>,
    window: Duration,
}

impl SettleTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            window,
        }
    }

    /// Record a change under `root`, restarting its settle window.
    pub fn record(&mut self, root: &Path) {
        let now = Instant::now();
        self.pending
            .entry(root.to_path_buf())
            .and_modify(|burst| {
                burst.last_change = now;
                burst.events += 1;
            })
            .or_insert(Burst {
                last_change: now,
                events: 1,
            });
    }

    /// Take the roots that have been quiet for the whole window.
    pub fn take_settled(&mut self) -> Vec<(PathBuf, usize)> {
        let now = Instant::now();
        let window = self.window;
        let mut settled = Vec::new();

        self.pending.retain(|root, burst| {
            if now.duration_since(burst.last_change) >= window {
                settled.push((root.clone(), burst.events));
                false
            } else {
                true
            }
        });

        settled
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
