//! Managed nodes and how the host creates them.
//!
//! The host never looks inside a node. It needs a way to build one for a
//! folder ([`NodeFactory`]) and a handful of lifecycle hooks ([`Node`]).
//! Whatever runs a node's own logic sits behind these traits.

mod dynamic;
mod error;

pub use dynamic::{DynamicNode, DynamicNodeFactory, NodeFault};
pub use error::{NodeError, NodeResult};

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capability::Capabilities;
use crate::name::LogicalName;

/// Lifecycle state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeState {
    Running,
    Closed,
}

/// A node instance bound to one folder.
pub trait Node: Capabilities {
    fn name(&self) -> &LogicalName;

    /// Backing folder. Fixed for the node's lifetime.
    fn folder(&self) -> &Path;

    fn state(&self) -> NodeState;

    /// Release the node's resources. Closing twice must succeed.
    fn close(&self) -> NodeResult<()>;

    /// Receive a fault detected elsewhere (e.g. a name registration clash).
    fn notify_of_error(&self, error: &(dyn Error + Send + Sync + 'static));
}

/// Builds nodes for newly discovered folders.
pub trait NodeFactory: Send + Sync {
    fn create(&self, name: LogicalName, folder: &Path) -> NodeResult<Arc<dyn Node>>;
}

impl<F> NodeFactory for F
where
    F: Fn(LogicalName, &Path) -> NodeResult<Arc<dyn Node>> + Send + Sync,
{
    fn create(&self, name: LogicalName, folder: &Path) -> NodeResult<Arc<dyn Node>> {
        self(name, folder)
    }
}
