//! Registry lookup errors.

use thiserror::Error;

/// Errors that can occur when registering or resolving states
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// No state is registered under the tag/identifier pair
    #[error("Cannot find State {id} of type {tag} in registry '{scope}'")]
    StateNotFound {
        id: String,
        tag: String,
        scope: String,
    },

    /// A state with the same tag and identifier is already registered
    #[error("State {id} of type {tag} is already registered in '{scope}'")]
    DuplicateRegistration {
        id: String,
        tag: String,
        scope: String,
    },
}
