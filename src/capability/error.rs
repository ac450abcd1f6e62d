use thiserror::Error;

/// Errors from action/event registration and log injection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Node '{node}' already has an {kind} named '{alias}'")]
    AliasInUse {
        node: String,
        kind: &'static str,
        alias: String,
    },

    #[error("Alias '{alias}' has no usable characters")]
    EmptyAlias { alias: String },

    #[error("Node '{node}' declined {operation}")]
    Declined {
        node: String,
        operation: &'static str,
    },
}

pub type CapabilityResult<T> = Result<T, CapabilityError>;
