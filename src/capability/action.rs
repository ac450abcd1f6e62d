//! Invokable actions.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::binding::Binding;
use crate::name::LogicalName;

/// Handler invoked with the action's argument.
pub type ActionHandler = Arc<dyn Fn(&Value) -> anyhow::Result<()> + Send + Sync>;

struct ActionInner {
    node: LogicalName,
    alias: LogicalName,
    binding: Binding,
    handler: ActionHandler,
}

/// A named command owned by one node.
///
/// Cheap to clone; clones refer to the same registration.
#[derive(Clone)]
pub struct Action {
    inner: Arc<ActionInner>,
}

impl Action {
    pub(crate) fn new(node: LogicalName, alias: LogicalName, binding: Binding, handler: ActionHandler) -> Self {
        Self {
            inner: Arc::new(ActionInner {
                node,
                alias,
                binding,
                handler,
            }),
        }
    }

    /// Name of the owning node.
    pub fn node(&self) -> &LogicalName {
        &self.inner.node
    }

    pub fn alias(&self) -> &LogicalName {
        &self.inner.alias
    }

    pub fn binding(&self) -> &Binding {
        &self.inner.binding
    }

    /// Invoke the action.
    ///
    /// Actions created by a registry log the call before the handler runs, so
    /// a failing handler still leaves an audit record.
    pub fn call(&self, arg: Value) -> anyhow::Result<()> {
        (self.inner.handler)(&arg)
    }

    /// True if both values refer to the same registration.
    pub fn same_as(&self, other: &Action) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("node", &self.inner.node.original())
            .field("alias", &self.inner.alias.original())
            .field("binding", &self.inner.binding)
            .finish()
    }
}
