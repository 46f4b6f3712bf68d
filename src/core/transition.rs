//! Declarative transition rules.

use crate::core::guard::Guard;
use crate::core::message::Message;
use crate::core::node::NodeKey;
use crate::core::state::StateDef;
use std::fmt;
use std::rc::Rc;

/// A rule mapping a message (plus guards) to a destination state.
///
/// Rules are stateless: every evaluation compares the message key and runs
/// the guards afresh. Guards are only consulted once the key matches.
pub struct Transition<K: NodeKey> {
    message: String,
    guards: Vec<Guard>,
    destination: Rc<dyn StateDef<K>>,
}

impl<K: NodeKey> Transition<K> {
    /// Create an unguarded rule. The message's string form becomes the key.
    pub fn new<D: StateDef<K>>(message: impl Into<Message>, destination: D) -> Self {
        Self::to_def(message, Rc::new(destination))
    }

    /// Create an unguarded rule targeting a shared definition value.
    pub fn to_def(message: impl Into<Message>, destination: Rc<dyn StateDef<K>>) -> Self {
        Self {
            message: message.into().key().to_string(),
            guards: Vec::new(),
            destination,
        }
    }

    /// Add a guard closure (optional, repeatable).
    pub fn when<F>(self, predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        self.guard(Guard::new(predicate))
    }

    /// Add a prebuilt guard (optional, repeatable).
    pub fn guard(mut self, guard: Guard) -> Self {
        self.guards.push(guard);
        self
    }

    /// The key incoming messages are compared against.
    pub fn key(&self) -> &str {
        &self.message
    }

    pub fn destination(&self) -> &Rc<dyn StateDef<K>> {
        &self.destination
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    /// Check whether this rule fires for `message`.
    pub fn is_valid(&self, message: &Message) -> bool {
        message.matches(&self.message) && self.guards.iter().all(Guard::check)
    }
}

impl<K: NodeKey> fmt::Display for Transition<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transition to {} on {}",
            self.destination.name(),
            self.message
        )
    }
}

impl<K: NodeKey> fmt::Debug for Transition<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transition")
            .field("message", &self.message)
            .field("guards", &self.guards.len())
            .field("destination", &self.destination.name())
            .finish()
    }
}
