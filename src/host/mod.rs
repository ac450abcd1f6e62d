//! The node host: keeps the set of running nodes in step with the folders
//! under its roots.
//!
//! # Architecture
//!
//! ```text
//! NodeHost
//!   - maintenance loop (tokio task, one tick at a time)
//!       scan roots  --> FolderDiff --> retire / admit
//!       (no lock)        (coarse lock held for diff + apply)
//!   - optional RootWatcher (wakes the loop early)
//!   - NodeFactory builds nodes, AddressingLayer hears about rule changes
//! ```

pub mod diff;
pub mod error;
pub mod fs;
pub mod recipes;
mod reconciler;
pub mod scan;

pub use diff::FolderDiff;
pub use error::{HostError, HostResult};
pub use recipes::Recipes;
pub use reconciler::{NodeHost, NodeHostBuilder, TickReport};

/// The layer that advertises nodes to the outside world.
///
/// It sits above the host, so the host only tells it about hosting rule
/// changes and shutdown. Faults travel the other way through
/// [`NodeHost::handle_name_registration_fault`].
pub trait AddressingLayer: Send + Sync {
    /// Called with the human-readable rule whenever the hosting filters change.
    fn hosting_rule_changed(&self, _rule: &str) {}

    /// Called once, after every node has been closed.
    fn shutdown(&self) {}
}

/// Addressing layer that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAddressing;

impl AddressingLayer for NoopAddressing {}
