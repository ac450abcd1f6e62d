//! Per-node store of actions and events, plus the node's activity log.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;

use super::action::{Action, ActionHandler};
use super::binding::Binding;
use super::error::{CapabilityError, CapabilityResult};
use super::event::Event;
use super::log::{ActivityLog, LogKind, LogSource};
use crate::name::LogicalName;

/// Actions, events and audit log belonging to a single node.
///
/// Registration order is preserved for listing. All state is node-local; the
/// registry is safe to share between threads invoking actions concurrently.
pub struct CapabilityRegistry {
    node: LogicalName,
    actions: RwLock<IndexMap<LogicalName, Action>>,
    events: RwLock<IndexMap<LogicalName, Event>>,
    log: Arc<ActivityLog>,
}

impl CapabilityRegistry {
    pub fn new(node: LogicalName) -> Self {
        Self {
            node,
            actions: RwLock::new(IndexMap::new()),
            events: RwLock::new(IndexMap::new()),
            log: Arc::new(ActivityLog::new()),
        }
    }

    /// Name of the owning node.
    pub fn node(&self) -> &LogicalName {
        &self.node
    }

    pub fn log(&self) -> &Arc<ActivityLog> {
        &self.log
    }

    /// Register an action whose every invocation is logged before `handler` runs.
    pub fn register_action<F>(
        &self,
        alias: impl Into<LogicalName>,
        binding: Binding,
        handler: F,
    ) -> CapabilityResult<Action>
    where
        F: Fn(&Value) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.register_action_handler(alias.into(), binding, Arc::new(handler))
    }

    /// Same as [`register_action`](Self::register_action) with a shared handler.
    pub fn register_action_handler(
        &self,
        alias: LogicalName,
        mut binding: Binding,
        handler: ActionHandler,
    ) -> CapabilityResult<Action> {
        check_alias(&alias)?;
        if binding.title.is_empty() {
            binding.title = alias.original().to_string();
        }

        let mut actions = self.actions.write();
        if actions.contains_key(&alias) {
            return Err(CapabilityError::AliasInUse {
                node: self.node.to_string(),
                kind: "action",
                alias: alias.to_string(),
            });
        }

        let log = self.log.clone();
        let logged_alias = alias.clone();
        let audited: ActionHandler = Arc::new(move |arg: &Value| {
            log.append(
                Utc::now(),
                LogSource::Local,
                LogKind::Action,
                logged_alias.clone(),
                arg.clone(),
            );
            handler(arg)
        });

        let action = Action::new(self.node.clone(), alias.clone(), binding, audited);
        actions.insert(alias, action.clone());

        crate::debug_event!("capability", "action added", "{} / {}", self.node, action.alias());
        Ok(action)
    }

    /// Remove an action. Returns false if this exact registration is not present.
    pub fn unregister_action(&self, action: &Action) -> bool {
        let mut actions = self.actions.write();
        let present = actions
            .get(action.alias())
            .is_some_and(|existing| existing.same_as(action));
        if present {
            actions.shift_remove(action.alias());
            crate::debug_event!("capability", "action removed", "{} / {}", self.node, action.alias());
        }
        present
    }

    /// Register an event whose every firing is logged.
    ///
    /// The audit monitor is attached first, so it runs before any fan-out
    /// monitors attached later.
    pub fn register_event(&self, alias: impl Into<LogicalName>, mut binding: Binding) -> CapabilityResult<Event> {
        let alias = alias.into();
        check_alias(&alias)?;
        if binding.title.is_empty() {
            binding.title = alias.original().to_string();
        }

        let mut events = self.events.write();
        if events.contains_key(&alias) {
            return Err(CapabilityError::AliasInUse {
                node: self.node.to_string(),
                kind: "event",
                alias: alias.to_string(),
            });
        }

        let event = Event::new(self.node.clone(), alias.clone(), binding);
        let log = self.log.clone();
        let logged_alias = alias.clone();
        event.attach_monitor(move |timestamp, arg| {
            log.append(
                timestamp,
                LogSource::Local,
                LogKind::Event,
                logged_alias.clone(),
                arg.clone(),
            );
        });
        events.insert(alias, event.clone());

        crate::debug_event!("capability", "event added", "{} / {}", self.node, event.alias());
        Ok(event)
    }

    /// Remove an event. Returns false if this exact registration is not present.
    pub fn unregister_event(&self, event: &Event) -> bool {
        let mut events = self.events.write();
        let present = events
            .get(event.alias())
            .is_some_and(|existing| existing.same_as(event));
        if present {
            events.shift_remove(event.alias());
            crate::debug_event!("capability", "event removed", "{} / {}", self.node, event.alias());
        }
        present
    }

    pub fn action(&self, alias: &LogicalName) -> Option<Action> {
        self.actions.read().get(alias).cloned()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.read().values().cloned().collect()
    }

    pub fn event(&self, alias: &LogicalName) -> Option<Event> {
        self.events.read().get(alias).cloned()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.read().values().cloned().collect()
    }

    /// The single append primitive shared by local and injected entries.
    pub fn append_log(
        &self,
        timestamp: DateTime<Utc>,
        source: LogSource,
        kind: LogKind,
        alias: LogicalName,
        arg: Value,
    ) -> u64 {
        self.log.append(timestamp, source, kind, alias, arg)
    }
}

fn check_alias(alias: &LogicalName) -> CapabilityResult<()> {
    if alias.is_empty() {
        return Err(CapabilityError::EmptyAlias {
            alias: alias.to_string(),
        });
    }
    Ok(())
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("node", &self.node.original())
            .field("actions", &self.actions.read().len())
            .field("events", &self.events.read().len())
            .field("log_entries", &self.log.len())
            .finish()
    }
}
