//! Errors raised by node operations.

use thiserror::Error;

/// Errors that can occur while building or querying a node hierarchy.
#[derive(Debug, Error)]
pub enum HsmError {
    #[error("No parent of kind '{kind}' found for {node}")]
    ParentNotFound { node: String, kind: String },

    #[error("Expected one parent of kind '{kind}' for {node}, found {count}")]
    AmbiguousParent {
        node: String,
        kind: String,
        count: usize,
    },

    #[error("Cannot attach {child} under {parent}: {reason}")]
    TopologyViolation {
        parent: String,
        child: String,
        reason: String,
    },

    #[error("Invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
}
