//! Default node: a folder plus a dynamic capability registry.

use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

use super::{Node, NodeError, NodeFactory, NodeResult, NodeState};
use crate::capability::{Capabilities, CapabilityRegistry};
use crate::name::LogicalName;

/// Most recent fault reported to a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFault {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A node whose actions and events are registered at runtime.
///
/// Accepts every injection through the default [`Capabilities`] methods.
#[derive(Debug)]
pub struct DynamicNode {
    name: LogicalName,
    folder: PathBuf,
    registry: CapabilityRegistry,
    closed: AtomicBool,
    last_error: Mutex<Option<NodeFault>>,
    started: DateTime<Utc>,
}

impl DynamicNode {
    /// Open a node on an existing folder.
    pub fn open(name: LogicalName, folder: &Path) -> NodeResult<Self> {
        let metadata = fs::metadata(folder).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => NodeError::MissingFolder {
                path: folder.to_path_buf(),
            },
            _ => NodeError::Io {
                path: folder.to_path_buf(),
                source: e,
            },
        })?;
        if !metadata.is_dir() {
            return Err(NodeError::MissingFolder {
                path: folder.to_path_buf(),
            });
        }

        crate::log_event!("node", "started", "{name} ({})", folder.display());

        Ok(Self {
            registry: CapabilityRegistry::new(name.clone()),
            name,
            folder: folder.to_path_buf(),
            closed: AtomicBool::new(false),
            last_error: Mutex::new(None),
            started: Utc::now(),
        })
    }

    pub fn last_error(&self) -> Option<NodeFault> {
        self.last_error.lock().clone()
    }

    pub fn started(&self) -> DateTime<Utc> {
        self.started
    }
}

impl Capabilities for DynamicNode {
    fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }
}

impl Node for DynamicNode {
    fn name(&self) -> &LogicalName {
        &self.name
    }

    fn folder(&self) -> &Path {
        &self.folder
    }

    fn state(&self) -> NodeState {
        if self.closed.load(Ordering::Acquire) {
            NodeState::Closed
        } else {
            NodeState::Running
        }
    }

    fn close(&self) -> NodeResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        crate::log_event!("node", "closed", "{}", self.name);
        Ok(())
    }

    fn notify_of_error(&self, error: &(dyn Error + Send + Sync + 'static)) {
        tracing::warn!("[node] {} reported error: {error}", self.name);
        *self.last_error.lock() = Some(NodeFault {
            message: error.to_string(),
            timestamp: Utc::now(),
        });
    }
}

/// Factory producing [`DynamicNode`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicNodeFactory;

impl NodeFactory for DynamicNodeFactory {
    fn create(&self, name: LogicalName, folder: &Path) -> NodeResult<Arc<dyn Node>> {
        Ok(Arc::new(DynamicNode::open(name, folder)?))
    }
}
