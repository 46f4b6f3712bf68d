//! Explicit registration table for state definitions.
//!
//! The registry maps `(type tag, identifier)` pairs to state definitions so
//! that states can be rebuilt from their declared identity, for example when
//! restoring a checkpoint. It is populated by explicit `register` calls at
//! startup and is never consulted on the live transition path.
//!
//! # Example
//!
//! ```rust
//! use hsm_engine::core::{Node, StateBuilder, StateDef};
//! use hsm_engine::registry::StateRegistry;
//!
//! struct Pending;
//!
//! impl StateDef<u32> for Pending {
//!     fn id(&self) -> u32 { 1 }
//!     fn name(&self) -> &str { "Pending" }
//!     fn tag(&self) -> &str { "Payment" }
//!     fn setup(&self, _state: &mut StateBuilder<'_, u32>) {}
//! }
//!
//! let registry = StateRegistry::new("billing").with(Pending).unwrap();
//! let invoice = Node::new("Invoice", 42);
//!
//! let state = registry.restore_state(&invoice, "Payment", &1).unwrap();
//! assert_eq!(state.name(), "Pending");
//! assert!(registry.get("Payment", &2).is_err());
//! ```

pub mod error;

pub use error::RegistryError;

use crate::core::{Node, NodeKey, State, StateDef};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::warn;

/// Lookup table from `(type tag, identifier)` to state definition.
pub struct StateRegistry<K: NodeKey> {
    scope: String,
    states: HashMap<String, HashMap<K, Rc<dyn StateDef<K>>>>,
}

impl<K: NodeKey> StateRegistry<K> {
    /// Create an empty registry. The scope names it in errors and logs.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            states: HashMap::new(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Register a definition under its own tag and identifier.
    pub fn register<D: StateDef<K>>(&mut self, definition: D) -> Result<&mut Self, RegistryError> {
        self.register_def(Rc::new(definition))
    }

    /// Register a shared definition value.
    pub fn register_def(
        &mut self,
        definition: Rc<dyn StateDef<K>>,
    ) -> Result<&mut Self, RegistryError> {
        let tag = definition.tag().to_string();
        let id = definition.id();
        let by_id = self.states.entry(tag.clone()).or_default();

        if by_id.contains_key(&id) {
            return Err(RegistryError::DuplicateRegistration {
                id: id.to_string(),
                tag,
                scope: self.scope.clone(),
            });
        }

        by_id.insert(id, definition);
        Ok(self)
    }

    /// Builder-style registration.
    pub fn with<D: StateDef<K>>(mut self, definition: D) -> Result<Self, RegistryError> {
        self.register(definition)?;
        Ok(self)
    }

    /// Resolve a definition by type tag and identifier.
    pub fn get(&self, tag: &str, id: &K) -> Result<Rc<dyn StateDef<K>>, RegistryError> {
        match self.states.get(tag).and_then(|by_id| by_id.get(id)) {
            Some(definition) => Ok(Rc::clone(definition)),
            None => {
                warn!(scope = %self.scope, tag, id = %id, "state not registered");
                Err(self.not_found(tag, id))
            }
        }
    }

    pub fn contains(&self, tag: &str, id: &K) -> bool {
        self.states
            .get(tag)
            .is_some_and(|by_id| by_id.contains_key(id))
    }

    /// Construct a state bound to `node` without activating it.
    pub fn construct(
        &self,
        tag: &str,
        id: &K,
        node: &Node<K>,
    ) -> Result<Rc<State<K>>, RegistryError> {
        let definition = self.get(tag, id)?;
        Ok(State::construct(definition, node))
    }

    /// Construct a state, awaken it and make it active on `node`.
    pub fn restore_state(
        &self,
        node: &Node<K>,
        tag: &str,
        id: &K,
    ) -> Result<Rc<State<K>>, RegistryError> {
        let definition = self.get(tag, id)?;
        Ok(node.activate(definition))
    }

    /// Registered type tags, in no particular order.
    pub fn tags(&self) -> Vec<&str> {
        self.states.keys().map(String::as_str).collect()
    }

    /// Number of registered definitions across all tags.
    pub fn len(&self) -> usize {
        self.states.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn not_found(&self, tag: &str, id: &K) -> RegistryError {
        RegistryError::StateNotFound {
            id: id.to_string(),
            tag: tag.to_string(),
            scope: self.scope.clone(),
        }
    }
}

impl<K: NodeKey> fmt::Debug for StateRegistry<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateRegistry")
            .field("scope", &self.scope)
            .field("states", &self.len())
            .finish()
    }
}
