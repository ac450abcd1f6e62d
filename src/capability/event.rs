//! Observable events.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;

use super::binding::Binding;
use crate::name::LogicalName;

/// Callback observing every firing of an event.
pub type EventMonitor = Arc<dyn Fn(DateTime<Utc>, &Value) + Send + Sync>;

struct EventInner {
    node: LogicalName,
    alias: LogicalName,
    binding: Binding,
    monitors: RwLock<Vec<EventMonitor>>,
}

/// A named occurrence owned by one node.
#[derive(Clone)]
pub struct Event {
    inner: Arc<EventInner>,
}

impl Event {
    pub(crate) fn new(node: LogicalName, alias: LogicalName, binding: Binding) -> Self {
        Self {
            inner: Arc::new(EventInner {
                node,
                alias,
                binding,
                monitors: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn node(&self) -> &LogicalName {
        &self.inner.node
    }

    pub fn alias(&self) -> &LogicalName {
        &self.inner.alias
    }

    pub fn binding(&self) -> &Binding {
        &self.inner.binding
    }

    /// Attach a monitor. Monitors run in attachment order on every firing.
    pub fn attach_monitor<F>(&self, monitor: F)
    where
        F: Fn(DateTime<Utc>, &Value) + Send + Sync + 'static,
    {
        self.inner.monitors.write().push(Arc::new(monitor));
    }

    pub fn monitor_count(&self) -> usize {
        self.inner.monitors.read().len()
    }

    /// Fire the event now.
    pub fn emit(&self, arg: Value) {
        self.emit_at(Utc::now(), arg);
    }

    /// Fire the event with an explicit timestamp.
    pub fn emit_at(&self, timestamp: DateTime<Utc>, arg: Value) {
        // Monitors may attach further monitors; don't hold the lock while calling out
        let monitors = self.inner.monitors.read().clone();
        for monitor in monitors {
            monitor(timestamp, &arg);
        }
    }

    pub fn same_as(&self, other: &Event) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("node", &self.inner.node.original())
            .field("alias", &self.inner.alias.original())
            .field("monitors", &self.monitor_count())
            .finish()
    }
}
