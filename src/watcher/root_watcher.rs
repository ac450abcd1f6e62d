//! Watches root directories and nudges the maintenance loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::{Notify, mpsc};
use tokio::time::{Duration, sleep};

use super::debouncer::SettleTracker;
use super::error::WatchError;

/// Non-recursive watcher over the host's roots.
///
/// Only folders appearing, disappearing or being renamed directly under a
/// root matter, so each root is watched without recursion. Once a burst of
/// changes settles the maintenance loop is woken; the watcher never touches
/// the registry itself.
pub struct RootWatcher {
    roots: Vec<PathBuf>,
    tracker: SettleTracker,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    _watcher: notify::RecommendedWatcher,
    wake: Arc<Notify>,
}

impl RootWatcher {
    /// Start watching `roots`. Roots that cannot be watched (e.g. missing) are
    /// skipped with a warning.
    pub fn new(roots: &[PathBuf], settle: Duration, wake: Arc<Notify>) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        let roots: Vec<PathBuf> = roots
            .iter()
            .map(|root| std::path::absolute(root).unwrap_or_else(|_| root.clone()))
            .collect();

        let mut watched = 0;
        for root in &roots {
            match watch_root(&mut watcher, root) {
                Ok(()) => {
                    crate::debug_event!("watcher", "watching", "{}", root.display());
                    watched += 1;
                }
                Err(e) => tracing::warn!("[watcher] {e}"),
            }
        }
        crate::log_event!("watcher", "monitoring", "{watched} of {} root(s)", roots.len());

        Ok(Self {
            roots,
            tracker: SettleTracker::new(settle),
            event_rx: rx,
            _watcher: watcher,
            wake,
        })
    }

    /// Event loop. Runs until the task is aborted or the notify channel closes.
    pub async fn run(mut self) {
        loop {
            let timeout = sleep(Duration::from_millis(100));
            tokio::pin!(timeout);

            tokio::select! {
                received = self.event_rx.recv() => {
                    match received {
                        Some(Ok(event)) => self.handle_event(event),
                        Some(Err(e)) => tracing::error!("[watcher] root watch error: {e}"),
                        None => break,
                    }
                }

                _ = &mut timeout => {
                    let settled = self.tracker.take_settled();
                    if !settled.is_empty() {
                        for (root, events) in &settled {
                            crate::debug_event!("watcher", "settled", "{} ({events} events)", root.display());
                        }
                        self.wake.notify_one();
                    }
                }
            }
        }
        crate::debug_event!("watcher", "stopped");
    }

    fn handle_event(&mut self, event: Event) {
        if matches!(event.kind, EventKind::Access(_)) {
            return;
        }
        for path in &event.paths {
            let root = self.root_of(path).unwrap_or(path.as_path()).to_path_buf();
            self.tracker.record(&root);
        }
    }

    fn root_of(&self, path: &Path) -> Option<&Path> {
        self.roots
            .iter()
            .find(|root| path.starts_with(root))
            .map(PathBuf::as_path)
    }
}

fn watch_root(watcher: &mut notify::RecommendedWatcher, root: &Path) -> Result<(), WatchError> {
    watcher
        .watch(root, RecursiveMode::NonRecursive)
        .map_err(|e| WatchError::PathWatchFailed {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })
}
