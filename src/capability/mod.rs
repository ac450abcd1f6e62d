//! Dynamic actions, events and the audit log of a node.
//!
//! # Architecture
//!
//! ```text
//! Node ── Capabilities (override points)
//!           │  inject_log / inject_action / extract_action / inject_event / extract_event
//!           ▼
//!        CapabilityRegistry
//!           ├─ actions: alias -> Action   (handler wrapped: log, then run)
//!           ├─ events:  alias -> Event    (audit monitor attached first)
//!           └─ ActivityLog                (append-only, totally ordered)
//! ```
//!
//! A node owns its registry and can always register through it directly.
//! Other parties (the addressing layer, remote peers) go through the
//! [`Capabilities`] trait, whose default methods accept everything. A node
//! implementation overrides individual methods to decline.

mod action;
mod binding;
mod error;
mod event;
mod log;
mod registry;

pub use action::{Action, ActionHandler};
pub use binding::Binding;
pub use error::{CapabilityError, CapabilityResult};
pub use event::{Event, EventMonitor};
pub use log::{ActivityLog, LogEntry, LogKind, LogSource};
pub use registry::CapabilityRegistry;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::name::LogicalName;

/// Capability surface a node exposes to other parties.
pub trait Capabilities: Send + Sync {
    /// The node's own registry.
    fn registry(&self) -> &CapabilityRegistry;

    /// Append a log entry on behalf of someone else (e.g. a remote caller).
    fn inject_log(
        &self,
        timestamp: DateTime<Utc>,
        source: LogSource,
        kind: LogKind,
        alias: LogicalName,
        arg: Value,
    ) -> CapabilityResult<u64> {
        Ok(self.registry().append_log(timestamp, source, kind, alias, arg))
    }

    /// Register an action on behalf of someone else.
    fn inject_action(
        &self,
        alias: LogicalName,
        binding: Binding,
        handler: ActionHandler,
    ) -> CapabilityResult<Action> {
        self.registry().register_action_handler(alias, binding, handler)
    }

    /// Remove an action on behalf of someone else.
    fn extract_action(&self, action: &Action) -> CapabilityResult<bool> {
        Ok(self.registry().unregister_action(action))
    }

    /// Register an event on behalf of someone else.
    fn inject_event(&self, alias: LogicalName, binding: Binding) -> CapabilityResult<Event> {
        self.registry().register_event(alias, binding)
    }

    /// Remove an event on behalf of someone else.
    fn extract_event(&self, event: &Event) -> CapabilityResult<bool> {
        Ok(self.registry().unregister_event(event))
    }
}
