//! Checkpoint error types.

use crate::registry::RegistryError;
use thiserror::Error;

/// Errors that can occur during checkpoint operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckpointError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Checkpoint version is not supported by this version
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Checkpoint data failed validation
    #[error("Checkpoint validation failed: {0}")]
    ValidationFailed(String),

    /// A captured state is not known to the registry
    #[error(transparent)]
    Unresolved(#[from] RegistryError),

    /// The target tree does not have the captured shape
    #[error("Checkpoint expects {expected} but the tree has {found}")]
    ShapeMismatch { expected: String, found: String },
}
