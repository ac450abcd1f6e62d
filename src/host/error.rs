//! Errors surfaced synchronously by the node host.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of create, rename and other direct host operations.
///
/// Maintenance-internal failures (node construction and close) never become a
/// `HostError`; the reconciler logs them and carries on.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("A node with the name '{name}' already exists")]
    NameConflict { name: String },

    #[error(
        "Name '{name}' rejected because this node host applies node filtering (includes: {includes}, excludes: {excludes})"
    )]
    FilterRejection {
        name: String,
        includes: String,
        excludes: String,
    },

    #[error("Failed to {operation} {path}: {source}")]
    Filesystem {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not locate base recipe - {recipe}")]
    RecipeNotFound { recipe: String },

    #[error("Invalid node name: {reason}")]
    InvalidName { reason: String },

    #[error("Node host has been shut down")]
    Closed,
}

impl HostError {
    pub(crate) fn fs(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HostError::Filesystem {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type HostResult<T> = Result<T, HostError>;
