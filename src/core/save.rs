//! Persistence sink consumed by root nodes.

use crate::core::message::Message;
use crate::core::node::{Node, NodeKey};
use crate::core::state::State;

/// Records committed state transitions.
///
/// A root node calls `save` exactly once per transition, synchronously, at
/// the moment the winning rule fires and before any of its callbacks run.
/// Calls are never retried; implementations handle their own failures.
///
/// Closures with the matching signature implement the trait:
///
/// ```rust
/// use hsm_engine::core::{Message, Node, SaveState, State};
/// use std::rc::Rc;
///
/// let sink: Rc<dyn SaveState<u32>> = Rc::new(
///     |node: &Node<u32>, old: &State<u32>, new: &State<u32>, user: &str, message: &Message| {
///         println!("{user}: {} {old} -> {new} on {message}", node.id());
///     },
/// );
/// let root = Node::root("Ledger", 1, sink, "auditor");
/// assert_eq!(root.user(), Some("auditor"));
/// ```
pub trait SaveState<K: NodeKey> {
    fn save(
        &self,
        record: &Node<K>,
        old_state: &State<K>,
        new_state: &State<K>,
        user: &str,
        message: &Message,
    );
}

impl<K, F> SaveState<K> for F
where
    K: NodeKey,
    F: Fn(&Node<K>, &State<K>, &State<K>, &str, &Message),
{
    fn save(
        &self,
        record: &Node<K>,
        old_state: &State<K>,
        new_state: &State<K>,
        user: &str,
        message: &Message,
    ) {
        self(record, old_state, new_state, user, message)
    }
}
