//! Checkpoint and restore of a node hierarchy's active states.
//!
//! A checkpoint captures which states are active on every node of a tree,
//! by declared identity (type tag and identifier). Restoring rebuilds those
//! states through a [`StateRegistry`], so long-running hierarchies survive
//! process restarts. Transition rules and callbacks are not serialized; they
//! come back from the registered definitions.
//!
//! Restoring awakens each rebuilt state, like `Node::add_state`. It runs no
//! entry or exit callbacks and reports nothing to the persistence sink.

use crate::core::{Node, NodeKey, StateRef};
use crate::registry::StateRegistry;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use tracing::debug;
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Captured layout of one node and its subtree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: DeserializeOwned"))]
pub struct NodeSnapshot<K> {
    pub kind: String,
    pub id: K,
    /// Active states, in activation order
    pub states: Vec<StateRef<K>>,
    pub children: Vec<NodeSnapshot<K>>,
}

impl<K: NodeKey> NodeSnapshot<K> {
    /// Capture `node` and everything below it.
    pub fn capture(node: &Node<K>) -> Self {
        Self {
            kind: node.kind().to_string(),
            id: node.id().clone(),
            states: node.states().iter().map(|state| state.reference()).collect(),
            children: node.children().iter().map(NodeSnapshot::capture).collect(),
        }
    }

    /// Number of nodes in this snapshot, including itself.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(NodeSnapshot::node_count)
            .sum::<usize>()
    }

    fn label(&self) -> String {
        format!("{} {}", self.kind, self.id)
    }

    fn state_refs(&self) -> Vec<&StateRef<K>> {
        let mut refs: Vec<&StateRef<K>> = self.states.iter().collect();
        for child in &self.children {
            refs.extend(child.state_refs());
        }
        refs
    }

    /// Children are matched by position, so siblings sharing a kind and
    /// identifier each keep their own snapshot.
    fn check_shape(&self, node: &Node<K>) -> Result<(), CheckpointError> {
        if self.kind != node.kind() || self.id != *node.id() {
            return Err(CheckpointError::ShapeMismatch {
                expected: self.label(),
                found: format!("{} {}", node.kind(), node.id()),
            });
        }
        let children = node.children();
        if children.len() != self.children.len() {
            return Err(CheckpointError::ShapeMismatch {
                expected: format!("{} children under {}", self.children.len(), self.label()),
                found: format!("{} children", children.len()),
            });
        }
        for (snapshot, child) in self.children.iter().zip(&children) {
            snapshot.check_shape(child)?;
        }
        Ok(())
    }

    fn apply(&self, node: &Node<K>, registry: &StateRegistry<K>) -> Result<(), CheckpointError> {
        node.clear_states();
        for state in &self.states {
            registry.restore_state(node, &state.tag, &state.id)?;
        }
        for (snapshot, child) in self.children.iter().zip(node.children()) {
            snapshot.apply(&child, registry)?;
        }
        debug!(node = %node.id(), states = self.states.len(), "restored node");
        Ok(())
    }
}

/// Serializable checkpoint of a node hierarchy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: DeserializeOwned"))]
pub struct Checkpoint<K> {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Captured tree, starting at the node passed to `capture`
    pub root: NodeSnapshot<K>,
}

impl<K: NodeKey> Checkpoint<K> {
    /// Capture the active states of `node` and its subtree.
    pub fn capture(node: &Node<K>) -> Self {
        let checkpoint = Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            root: NodeSnapshot::capture(node),
        };
        debug!(
            checkpoint = %checkpoint.id,
            nodes = checkpoint.root.node_count(),
            "captured checkpoint"
        );
        checkpoint
    }

    /// Check the checkpoint against a registry.
    ///
    /// Accumulates every problem instead of stopping at the first: an
    /// unsupported version and each captured state the registry cannot
    /// resolve.
    pub fn validate(
        &self,
        registry: &StateRegistry<K>,
    ) -> Validation<(), NonEmptyVec<CheckpointError>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<CheckpointError>>> = Vec::new();

        checks.push(if self.version == CHECKPOINT_VERSION {
            Validation::success(())
        } else {
            Validation::fail(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            })
        });

        for state in self.root.state_refs() {
            checks.push(if registry.contains(&state.tag, &state.id) {
                Validation::success(())
            } else {
                Validation::fail(CheckpointError::Unresolved(
                    registry.not_found(&state.tag, &state.id),
                ))
            });
        }

        Validation::all_vec(checks).map(|_| ())
    }

    /// Replace the active states of `tree` with the captured ones.
    ///
    /// The checkpoint is validated and the tree's shape checked before any
    /// node is touched, so a failed restore leaves the tree unchanged.
    pub fn restore(
        &self,
        tree: &Node<K>,
        registry: &StateRegistry<K>,
    ) -> Result<(), CheckpointError> {
        if let Validation::Failure(errors) = self.validate(registry) {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            return Err(CheckpointError::ValidationFailed(messages.join("; ")));
        }
        self.root.check_shape(tree)?;
        self.root.apply(tree, registry)
    }
}

impl<K: NodeKey + Serialize> Checkpoint<K> {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }
}

impl<K: NodeKey + DeserializeOwned> Checkpoint<K> {
    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.check_version()
    }

    fn check_version(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        Ok(self)
    }
}
