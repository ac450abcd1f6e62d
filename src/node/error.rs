use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while constructing or closing a node.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Node folder {path} does not exist or is not a directory")]
    MissingFolder { path: PathBuf },

    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Node '{name}' failed to start: {reason}")]
    Startup { name: String, reason: String },

    #[error("Node '{name}' failed to close: {reason}")]
    Close { name: String, reason: String },

    #[error("Node '{name}' panicked during {operation}: {message}")]
    Panicked {
        name: String,
        operation: &'static str,
        message: String,
    },
}

pub type NodeResult<T> = Result<T, NodeError>;
