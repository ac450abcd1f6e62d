//! Optional root watcher that triggers early maintenance ticks.
//!
//! # Architecture
//!
//! ```text
//! RootWatcher
//!   - notify::RecommendedWatcher, one non-recursive watch per root
//!   - SettleTracker (per-root quiet window)
//!   - wakes the maintenance loop through a shared Notify
//! ```
//!
//! The periodic tick keeps running regardless; the watcher only shortens
//! the time until a new or removed folder is picked up.

mod debouncer;
mod error;
mod root_watcher;

pub use debouncer::SettleTracker;
pub use error::WatchError;
pub use root_watcher::RootWatcher;
