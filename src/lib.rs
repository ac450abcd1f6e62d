//! Folder-driven node hosting.
//!
//! Every eligible subdirectory of the configured roots becomes one running
//! node. A maintenance loop rescans the roots and starts or stops nodes so
//! the live set follows the filesystem. Each node carries a dynamic set of
//! actions and events, all recorded in an ordered activity log.

pub mod capability;
pub mod cli;
pub mod config;
pub mod filter;
pub mod host;
pub mod logging;
pub mod name;
pub mod node;
pub mod watcher;

pub use capability::{
    Action, ActivityLog, Binding, Capabilities, CapabilityError, CapabilityRegistry, Event, LogEntry, LogKind,
    LogSource,
};
pub use config::Settings;
pub use filter::HostingFilters;
pub use host::{AddressingLayer, HostError, HostResult, NodeHost, NodeHostBuilder, NoopAddressing, TickReport};
pub use name::LogicalName;
pub use node::{DynamicNode, DynamicNodeFactory, Node, NodeError, NodeFactory, NodeState};
