//! In-memory transition history.
//!
//! [`TransitionLog`] is a ready-made persistence sink that keeps every
//! reported transition as a serializable [`TransitionRecord`]. It is meant
//! for tests, demos and diagnostics; durable storage belongs to the
//! embedding application.

use crate::core::message::Message;
use crate::core::node::{Node, NodeKey};
use crate::core::save::SaveState;
use crate::core::state::{State, StateRef};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::time::Duration;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: DeserializeOwned"))]
pub struct TransitionRecord<K> {
    /// Identifier of the node whose state changed
    pub node: K,
    /// Kind of that node
    pub kind: String,
    /// The state being left
    pub from: StateRef<K>,
    /// The state being entered
    pub to: StateRef<K>,
    /// Acting user bound to the root that recorded the transition
    pub user: String,
    /// String form of the message that triggered it
    pub message: String,
    /// When the transition was reported
    pub timestamp: DateTime<Utc>,
}

/// Ordered, append-only log of transitions.
///
/// # Example
///
/// ```rust
/// use hsm_engine::core::{Node, StateBuilder, StateDef, TransitionLog};
/// use std::rc::Rc;
///
/// struct Low;
/// struct High;
///
/// impl StateDef<&'static str> for Low {
///     fn id(&self) -> &'static str { "low" }
///     fn name(&self) -> &str { "Low" }
///     fn setup(&self, state: &mut StateBuilder<'_, &'static str>) {
///         state.on("raise", High);
///     }
/// }
///
/// impl StateDef<&'static str> for High {
///     fn id(&self) -> &'static str { "high" }
///     fn name(&self) -> &str { "High" }
///     fn setup(&self, _state: &mut StateBuilder<'_, &'static str>) {}
/// }
///
/// let log: Rc<TransitionLog<&'static str>> = Rc::new(TransitionLog::new());
/// let root = Node::root("Gate", "g1", log.clone(), "ops");
/// root.add_state(Low);
/// root.send("raise");
///
/// let path = log.path(&"g1");
/// assert_eq!(path.len(), 2); // Low -> High
/// assert_eq!(log.records()[0].user, "ops");
/// ```
#[derive(Debug)]
pub struct TransitionLog<K: NodeKey> {
    records: RefCell<Vec<TransitionRecord<K>>>,
}

impl<K: NodeKey> Default for TransitionLog<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: NodeKey> TransitionLog<K> {
    pub fn new() -> Self {
        Self {
            records: RefCell::new(Vec::new()),
        }
    }

    /// Append a record.
    pub fn record(&self, record: TransitionRecord<K>) {
        self.records.borrow_mut().push(record);
    }

    /// Copy of every record, oldest first.
    pub fn records(&self) -> Vec<TransitionRecord<K>> {
        self.records.borrow().clone()
    }

    /// Records for one node, oldest first.
    pub fn for_node(&self, node: &K) -> Vec<TransitionRecord<K>> {
        self.records
            .borrow()
            .iter()
            .filter(|record| record.node == *node)
            .cloned()
            .collect()
    }

    /// States traversed by one node: the first `from`, then every `to`.
    pub fn path(&self, node: &K) -> Vec<StateRef<K>> {
        let records = self.for_node(node);
        let mut path = Vec::new();
        if let Some(first) = records.first() {
            path.push(first.from.clone());
        }
        path.extend(records.into_iter().map(|record| record.to));
        path
    }

    /// Time between the first and last recorded transition.
    ///
    /// Returns `None` when the log is empty.
    pub fn duration(&self) -> Option<Duration> {
        let records = self.records.borrow();
        if let (Some(first), Some(last)) = (records.first(), records.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.records.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl<K: NodeKey + Serialize> TransitionLog<K> {
    /// Serialize the whole log as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.records.borrow())
    }
}

impl<K: NodeKey> SaveState<K> for TransitionLog<K> {
    fn save(
        &self,
        record: &Node<K>,
        old_state: &State<K>,
        new_state: &State<K>,
        user: &str,
        message: &Message,
    ) {
        self.record(TransitionRecord {
            node: record.id().clone(),
            kind: record.kind().to_string(),
            from: old_state.reference(),
            to: new_state.reference(),
            user: user.to_string(),
            message: message.key().to_string(),
            timestamp: Utc::now(),
        });
    }
}
