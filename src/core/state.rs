//! States and their definitions.
//!
//! A [`StateDef`] is the closed, compile-time description of a state: its
//! identity plus a setup function that registers transition rules and
//! lifecycle callbacks. A [`State`] is one live instance of a definition,
//! bound to the node that owns it.

use crate::core::message::Message;
use crate::core::node::{Node, NodeKey, WeakNode};
use crate::core::transition::Transition;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Zero-argument lifecycle callback.
pub type Action = Box<dyn Fn()>;

/// Definition of a state type.
///
/// Implementations are usually unit structs, or small structs carrying
/// shared handles the callbacks need. Transition rules name their
/// destination by definition value, so constructing a destination can never
/// fail at runtime.
///
/// # Example
///
/// ```rust
/// use hsm_engine::core::{StateBuilder, StateDef, Transition};
///
/// struct Draft;
/// struct Published;
///
/// impl StateDef<u32> for Draft {
///     fn id(&self) -> u32 { 1 }
///     fn name(&self) -> &str { "Draft" }
///     fn tag(&self) -> &str { "Document" }
///     fn setup(&self, state: &mut StateBuilder<'_, u32>) {
///         state.add_transition(Transition::new("publish", Published).when(|| true));
///     }
/// }
///
/// impl StateDef<u32> for Published {
///     fn id(&self) -> u32 { 2 }
///     fn name(&self) -> &str { "Published" }
///     fn tag(&self) -> &str { "Document" }
///     fn setup(&self, _state: &mut StateBuilder<'_, u32>) {}
/// }
/// ```
pub trait StateDef<K: NodeKey>: 'static {
    /// Declared identifier of the state.
    fn id(&self) -> K;

    /// Concrete type name used in diagnostics.
    fn name(&self) -> &str;

    /// Declared base type, used as the registry type tag.
    ///
    /// Default implementation returns `"State"`.
    fn tag(&self) -> &str {
        "State"
    }

    /// Register transition rules and callbacks for a new instance.
    fn setup(&self, state: &mut StateBuilder<'_, K>);
}

/// Collects rules and callbacks while a state is being constructed.
pub struct StateBuilder<'a, K: NodeKey> {
    node: &'a Node<K>,
    transitions: Vec<Transition<K>>,
    on_awake: Vec<Action>,
    on_entry: Vec<Action>,
    on_exit: Vec<Action>,
}

impl<'a, K: NodeKey> StateBuilder<'a, K> {
    fn new(node: &'a Node<K>) -> Self {
        Self {
            node,
            transitions: Vec::new(),
            on_awake: Vec::new(),
            on_entry: Vec::new(),
            on_exit: Vec::new(),
        }
    }

    /// The node the state is being built for.
    pub fn node(&self) -> &Node<K> {
        self.node
    }

    /// A weak handle to the owning node, safe to capture in callbacks.
    pub fn handle(&self) -> WeakNode<K> {
        self.node.downgrade()
    }

    /// Add a transition rule. Rules are evaluated in the order added.
    pub fn add_transition(&mut self, transition: Transition<K>) -> &mut Self {
        self.transitions.push(transition);
        self
    }

    /// Add an unguarded transition rule.
    pub fn on<D: StateDef<K>>(
        &mut self,
        message: impl Into<Message>,
        destination: D,
    ) -> &mut Self {
        self.add_transition(Transition::new(message, destination))
    }

    pub fn on_awake<F: Fn() + 'static>(&mut self, action: F) -> &mut Self {
        self.on_awake.push(Box::new(action));
        self
    }

    pub fn on_entry<F: Fn() + 'static>(&mut self, action: F) -> &mut Self {
        self.on_entry.push(Box::new(action));
        self
    }

    pub fn on_exit<F: Fn() + 'static>(&mut self, action: F) -> &mut Self {
        self.on_exit.push(Box::new(action));
        self
    }

    /// An action that sends `message` through the owning node.
    pub fn send(&self, message: impl Into<Message>) -> impl Fn() + 'static {
        let handle = self.handle();
        let message = message.into();
        move || handle.send(&message)
    }

    /// An action that broadcasts `message` from the owning node.
    pub fn broadcast(&self, message: impl Into<Message>) -> impl Fn() + 'static {
        let handle = self.handle();
        let message = message.into();
        move || handle.broadcast(&message)
    }
}

/// Serializable reference to a state: its name, type tag and identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "K: Serialize", deserialize = "K: DeserializeOwned"))]
pub struct StateRef<K> {
    pub name: String,
    pub tag: String,
    pub id: K,
}

impl<K: fmt::Display> fmt::Display for StateRef<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name, self.tag, self.id)
    }
}

/// A live state, owned by exactly one node.
pub struct State<K: NodeKey> {
    definition: Rc<dyn StateDef<K>>,
    id: K,
    node: WeakNode<K>,
    transitions: Vec<Transition<K>>,
    on_awake: Vec<Action>,
    on_entry: Vec<Action>,
    on_exit: Vec<Action>,
}

impl<K: NodeKey> State<K> {
    /// Build a fresh instance of `definition` bound to `node`.
    ///
    /// The instance is not awakened and not made active.
    pub fn construct(definition: Rc<dyn StateDef<K>>, node: &Node<K>) -> Rc<Self> {
        let mut builder = StateBuilder::new(node);
        definition.setup(&mut builder);

        let StateBuilder {
            transitions,
            on_awake,
            on_entry,
            on_exit,
            ..
        } = builder;

        Rc::new(Self {
            id: definition.id(),
            definition,
            node: node.downgrade(),
            transitions,
            on_awake,
            on_entry,
            on_exit,
        })
    }

    pub fn id(&self) -> &K {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn tag(&self) -> &str {
        self.definition.tag()
    }

    pub fn definition(&self) -> &Rc<dyn StateDef<K>> {
        &self.definition
    }

    /// The owning node, if it is still alive.
    pub fn node(&self) -> Option<Node<K>> {
        self.node.upgrade()
    }

    pub fn transitions(&self) -> &[Transition<K>] {
        &self.transitions
    }

    pub fn reference(&self) -> StateRef<K> {
        StateRef {
            name: self.name().to_string(),
            tag: self.tag().to_string(),
            id: self.id.clone(),
        }
    }

    pub(crate) fn awake(&self) {
        self.on_awake.iter().for_each(|action| action());
    }

    pub(crate) fn enter(&self) {
        self.on_entry.iter().for_each(|action| action());
    }

    pub(crate) fn exit(&self) {
        self.on_exit.iter().for_each(|action| action());
    }

    /// The rule a message would fire: the first whose key matches and whose
    /// guards all pass.
    ///
    /// Guards are evaluated, but nothing is constructed, saved or queued.
    pub fn select(&self, message: &Message) -> Option<&Transition<K>> {
        self.transitions.iter().find(|rule| rule.is_valid(message))
    }

    /// Commit the selected rule, if any, on the owning node.
    ///
    /// The destination is constructed, reported to the node's save chain,
    /// and its callbacks are queued on the node (exit of this state, then
    /// awake and entry of the new one). Only the node's drain loop calls
    /// this, since it also replaces the active-state list. Without a winner,
    /// or once the node is gone, the same instance is returned and nothing
    /// is queued.
    pub(crate) fn receive(self: &Rc<Self>, message: &Message) -> Rc<Self> {
        let Some(node) = self.node.upgrade() else {
            return Rc::clone(self);
        };
        let Some(rule) = self.select(message) else {
            return Rc::clone(self);
        };

        let next = State::construct(Rc::clone(rule.destination()), &node);
        debug!(
            node = %node.id(),
            from = %self,
            to = %next,
            message = %message,
            "state transition"
        );
        node.save(self, &next, message);

        let outgoing = Rc::clone(self);
        node.enqueue_exit(Box::new(move || outgoing.exit()));
        let incoming = Rc::clone(&next);
        node.enqueue_awake(Box::new(move || incoming.awake()));
        let incoming = Rc::clone(&next);
        node.enqueue_entry(Box::new(move || incoming.enter()));

        next
    }
}

impl<K: NodeKey> fmt::Display for State<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} {})", self.name(), self.tag(), self.id)
    }
}

impl<K: NodeKey> fmt::Debug for State<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("name", &self.name())
            .field("tag", &self.tag())
            .field("id", &self.id)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}
