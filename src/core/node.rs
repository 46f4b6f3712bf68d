//! State-machine nodes and message routing.
//!
//! A [`Node`] owns its active states, its children and three deferred
//! callback queues. Messages entering a node are drained through a single
//! FIFO queue so that callbacks which send further messages never re-enter
//! the active-state pass.
//!
//! Nodes are single-threaded handles (`Rc`-based, `!Send`). Embedding
//! applications that share a tree across threads must serialize access
//! themselves, for example by owning the tree inside one task.

use crate::config::{EngineConfig, Topology};
use crate::core::error::HsmError;
use crate::core::message::Message;
use crate::core::save::SaveState;
use crate::core::state::{State, StateDef};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Identifier type for nodes and states.
///
/// Blanket-implemented for every comparable, printable key such as
/// `&'static str`, `String` or the integer types.
pub trait NodeKey: Clone + Eq + Hash + Debug + Display + 'static {}

impl<T> NodeKey for T where T: Clone + Eq + Hash + Debug + Display + 'static {}

type Callback = Box<dyn FnOnce()>;

enum Role<K: NodeKey> {
    Branch,
    Root {
        sink: Rc<dyn SaveState<K>>,
        user: String,
    },
}

struct NodeInner<K: NodeKey> {
    id: K,
    kind: String,
    role: Role<K>,
    config: EngineConfig,
    parents: RefCell<Vec<Weak<NodeInner<K>>>>,
    children: RefCell<Vec<Node<K>>>,
    states: RefCell<Vec<Rc<State<K>>>>,
    messages: RefCell<VecDeque<Message>>,
    exit_actions: RefCell<VecDeque<Callback>>,
    awake_actions: RefCell<VecDeque<Callback>>,
    entry_actions: RefCell<VecDeque<Callback>>,
    draining: Cell<bool>,
}

/// Handle to a state-machine node.
///
/// Cloning the handle is cheap and yields another reference to the same
/// node. Children are held strongly, parents weakly, so a tree is freed once
/// the application drops its last handle to the root.
///
/// # Example
///
/// ```rust
/// use hsm_engine::core::{Node, StateBuilder, StateDef, TransitionLog};
/// use std::rc::Rc;
///
/// struct Closed;
/// struct Open;
///
/// impl StateDef<&'static str> for Closed {
///     fn id(&self) -> &'static str { "closed" }
///     fn name(&self) -> &str { "Closed" }
///     fn setup(&self, state: &mut StateBuilder<'_, &'static str>) {
///         state.on("open", Open);
///     }
/// }
///
/// impl StateDef<&'static str> for Open {
///     fn id(&self) -> &'static str { "open" }
///     fn name(&self) -> &str { "Open" }
///     fn setup(&self, state: &mut StateBuilder<'_, &'static str>) {
///         state.on("close", Closed);
///     }
/// }
///
/// let log: Rc<TransitionLog<&'static str>> = Rc::new(TransitionLog::new());
/// let building = Node::root("Building", "hq", log.clone(), "alice");
/// let door = Node::new("Door", "front");
/// door.add_state(Closed);
/// building.add_child(&door).unwrap();
///
/// door.send("open");
///
/// assert_eq!(door.states()[0].name(), "Open");
/// assert_eq!(log.len(), 1);
/// ```
pub struct Node<K: NodeKey> {
    inner: Rc<NodeInner<K>>,
}

/// Non-owning handle to a node, used by callbacks to route messages back
/// through the node that owns them.
pub struct WeakNode<K: NodeKey> {
    inner: Weak<NodeInner<K>>,
}

impl<K: NodeKey> Node<K> {
    /// Create an ordinary node with the default configuration.
    pub fn new(kind: impl Into<String>, id: K) -> Self {
        Self::with_config(kind, id, EngineConfig::default())
    }

    /// Create an ordinary node with an explicit configuration.
    pub fn with_config(kind: impl Into<String>, id: K, config: EngineConfig) -> Self {
        Self::build(kind.into(), id, Role::Branch, config)
    }

    /// Create a root node bound to a persistence sink and an acting user.
    pub fn root(
        kind: impl Into<String>,
        id: K,
        sink: Rc<dyn SaveState<K>>,
        user: impl Into<String>,
    ) -> Self {
        Self::root_with_config(kind, id, sink, user, EngineConfig::default())
    }

    /// Create a root node with an explicit configuration.
    pub fn root_with_config(
        kind: impl Into<String>,
        id: K,
        sink: Rc<dyn SaveState<K>>,
        user: impl Into<String>,
        config: EngineConfig,
    ) -> Self {
        let role = Role::Root {
            sink,
            user: user.into(),
        };
        Self::build(kind.into(), id, role, config)
    }

    fn build(kind: String, id: K, role: Role<K>, config: EngineConfig) -> Self {
        Self {
            inner: Rc::new(NodeInner {
                id,
                kind,
                role,
                config,
                parents: RefCell::new(Vec::new()),
                children: RefCell::new(Vec::new()),
                states: RefCell::new(Vec::new()),
                messages: RefCell::new(VecDeque::new()),
                exit_actions: RefCell::new(VecDeque::new()),
                awake_actions: RefCell::new(VecDeque::new()),
                entry_actions: RefCell::new(VecDeque::new()),
                draining: Cell::new(false),
            }),
        }
    }

    /// Identifier of this node.
    pub fn id(&self) -> &K {
        &self.inner.id
    }

    /// Kind label, shown by `describe` and used by typed lookups.
    pub fn kind(&self) -> &str {
        &self.inner.kind
    }

    /// Settings this node was created with.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Whether this node terminates save requests and fans out broadcasts.
    pub fn is_root(&self) -> bool {
        matches!(self.inner.role, Role::Root { .. })
    }

    /// The acting user bound to a root node.
    pub fn user(&self) -> Option<&str> {
        match &self.inner.role {
            Role::Root { user, .. } => Some(user.as_str()),
            Role::Branch => None,
        }
    }

    /// Non-owning handle to this node.
    pub fn downgrade(&self) -> WeakNode<K> {
        WeakNode {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Snapshot of the live parent handles.
    pub fn parents(&self) -> Vec<Node<K>> {
        self.inner
            .parents
            .borrow()
            .iter()
            .filter_map(|parent| parent.upgrade().map(|inner| Node { inner }))
            .collect()
    }

    /// Snapshot of the children list, duplicates included.
    pub fn children(&self) -> Vec<Node<K>> {
        self.inner.children.borrow().clone()
    }

    /// Snapshot of the currently active states.
    pub fn states(&self) -> Vec<Rc<State<K>>> {
        self.inner.states.borrow().clone()
    }

    /// Active states declared under a type tag.
    pub fn states_tagged(&self, tag: &str) -> Vec<Rc<State<K>>> {
        self.inner
            .states
            .borrow()
            .iter()
            .filter(|state| state.tag() == tag)
            .cloned()
            .collect()
    }

    /// Active states with the given type tag and identifier.
    pub fn state(&self, tag: &str, id: &K) -> Vec<Rc<State<K>>> {
        self.inner
            .states
            .borrow()
            .iter()
            .filter(|state| state.tag() == tag && state.id() == id)
            .cloned()
            .collect()
    }

    /// Children of the given kind.
    pub fn children_of(&self, kind: &str) -> Vec<Node<K>> {
        self.inner
            .children
            .borrow()
            .iter()
            .filter(|child| child.kind() == kind)
            .cloned()
            .collect()
    }

    /// First child of the given kind and identifier.
    pub fn child(&self, kind: &str, id: &K) -> Option<Node<K>> {
        self.inner
            .children
            .borrow()
            .iter()
            .find(|child| child.kind() == kind && child.id() == id)
            .cloned()
    }

    /// The single parent of the given kind.
    ///
    /// Fails when no parent, or more than one parent, has that kind.
    pub fn parent(&self, kind: &str) -> Result<Node<K>, HsmError> {
        let mut matches = self
            .parents()
            .into_iter()
            .filter(|parent| parent.kind() == kind);

        match (matches.next(), matches.next()) {
            (Some(parent), None) => Ok(parent),
            (None, _) => Err(HsmError::ParentNotFound {
                node: self.to_label(),
                kind: kind.to_string(),
            }),
            (Some(_), Some(_)) => Err(HsmError::AmbiguousParent {
                node: self.to_label(),
                kind: kind.to_string(),
                count: 2 + matches.count(),
            }),
        }
    }

    /// Construct a state from its definition, awaken it immediately and
    /// make it active.
    pub fn add_state<D: StateDef<K>>(&self, definition: D) -> &Self {
        self.add_state_def(Rc::new(definition))
    }

    /// Same as [`Node::add_state`] for a shared definition value.
    pub fn add_state_def(&self, definition: Rc<dyn StateDef<K>>) -> &Self {
        self.activate(definition);
        self
    }

    pub(crate) fn activate(&self, definition: Rc<dyn StateDef<K>>) -> Rc<State<K>> {
        let state = State::construct(definition, self);
        state.awake();
        self.inner.states.borrow_mut().push(Rc::clone(&state));
        state
    }

    pub(crate) fn clear_states(&self) {
        self.inner.states.borrow_mut().clear();
    }

    /// Attach a child, back-linking this node as its parent if needed.
    ///
    /// The children list is not deduplicated. Under [`Topology::Tree`] a
    /// child that already has a live parent, or that would close a cycle,
    /// is rejected. Links to parents that have been dropped are pruned first.
    pub fn add_child(&self, child: &Node<K>) -> Result<&Self, HsmError> {
        child
            .inner
            .parents
            .borrow_mut()
            .retain(|parent| parent.strong_count() > 0);

        if self.inner.config.topology == Topology::Tree {
            self.check_tree_invariant(child)?;
        }

        self.inner.children.borrow_mut().push(child.clone());

        let mut parents = child.inner.parents.borrow_mut();
        let linked = parents
            .iter()
            .any(|parent| Weak::as_ptr(parent) == Rc::as_ptr(&self.inner));
        if !linked {
            parents.push(Rc::downgrade(&self.inner));
        }
        Ok(self)
    }

    fn check_tree_invariant(&self, child: &Node<K>) -> Result<(), HsmError> {
        let reason = if !child.parents().is_empty() {
            Some("node already has a parent")
        } else if self.is_self_or_descendant_of(child) {
            Some("attaching it would create a cycle")
        } else {
            None
        };

        match reason {
            Some(reason) => {
                warn!(
                    parent = %self.inner.id,
                    child = %child.inner.id,
                    reason,
                    "rejected child under tree topology"
                );
                Err(HsmError::TopologyViolation {
                    parent: self.to_label(),
                    child: child.to_label(),
                    reason: reason.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    fn is_self_or_descendant_of(&self, candidate: &Node<K>) -> bool {
        self == candidate
            || self
                .parents()
                .iter()
                .any(|parent| parent.is_self_or_descendant_of(candidate))
    }

    /// Deliver a message here, then up every ancestor path and down every
    /// descendant path.
    ///
    /// A node reachable through several paths processes the message once
    /// per path.
    pub fn send(&self, message: impl Into<Message>) {
        let message = message.into();
        self.receive(message.clone());
        for parent in self.parents() {
            parent.send_upwards(&message);
        }
        for child in self.children() {
            child.send_downwards(&message);
        }
    }

    /// Ask the hierarchy to broadcast a message.
    ///
    /// Ordinary nodes forward the request to their parents. A root delivers
    /// the message to itself and every descendant.
    pub fn broadcast(&self, message: impl Into<Message>) {
        let message = message.into();
        match &self.inner.role {
            Role::Root { .. } => self.send_downwards(&message),
            Role::Branch => {
                for parent in self.parents() {
                    parent.broadcast(message.clone());
                }
            }
        }
    }

    fn send_upwards(&self, message: &Message) {
        self.receive(message.clone());
        for parent in self.parents() {
            parent.send_upwards(message);
        }
    }

    fn send_downwards(&self, message: &Message) {
        self.receive(message.clone());
        for child in self.children() {
            child.send_downwards(message);
        }
    }

    fn receive(&self, message: Message) {
        self.inner.messages.borrow_mut().push_back(message);

        if self.inner.draining.get() {
            trace!(node = %self.inner.id, "queued re-entrant message");
            return;
        }

        let _drain = DrainGuard::engage(&self.inner.draining);
        while let Some(next) = self.next_message() {
            self.process(&next);
        }
    }

    fn next_message(&self) -> Option<Message> {
        self.inner.messages.borrow_mut().pop_front()
    }

    fn process(&self, message: &Message) {
        trace!(
            node = %self.inner.id,
            kind = %self.inner.kind,
            message = %message,
            "processing message"
        );

        let current = self.states();
        let next: Vec<Rc<State<K>>> = current
            .iter()
            .map(|state| state.receive(message))
            .collect();
        *self.inner.states.borrow_mut() = next;

        run_all(&self.inner.exit_actions);
        run_all(&self.inner.awake_actions);
        run_all(&self.inner.entry_actions);
    }

    pub(crate) fn enqueue_exit(&self, action: Callback) {
        self.inner.exit_actions.borrow_mut().push_back(action);
    }

    pub(crate) fn enqueue_awake(&self, action: Callback) {
        self.inner.awake_actions.borrow_mut().push_back(action);
    }

    pub(crate) fn enqueue_entry(&self, action: Callback) {
        self.inner.entry_actions.borrow_mut().push_back(action);
    }

    /// Report a transition of one of this node's states.
    ///
    /// Ordinary nodes pass the report to every parent; a root hands it to
    /// its persistence sink together with its acting user.
    pub fn save(&self, old_state: &State<K>, new_state: &State<K>, message: &Message) {
        self.save_from(self, old_state, new_state, message);
    }

    fn save_from(
        &self,
        record: &Node<K>,
        old_state: &State<K>,
        new_state: &State<K>,
        message: &Message,
    ) {
        match &self.inner.role {
            Role::Root { sink, user } => {
                trace!(
                    root = %self.inner.id,
                    node = %record.inner.id,
                    user = %user,
                    "recording transition"
                );
                sink.save(record, old_state, new_state, user, message);
            }
            Role::Branch => {
                let parents = self.parents();
                if parents.is_empty() {
                    debug!(
                        node = %record.inner.id,
                        from = %old_state,
                        to = %new_state,
                        "no root above node, transition not recorded"
                    );
                }
                for parent in parents {
                    parent.save_from(record, old_state, new_state, message);
                }
            }
        }
    }

    /// Indented dump of this node, its active states and its subtree.
    pub fn describe(&self) -> String {
        self.describe_at(0, &self.inner.config.indent)
    }

    fn describe_at(&self, level: usize, unit: &str) -> String {
        let indent = unit.repeat(level);
        let mut result = format!("{indent}+ {} {}", self.inner.kind, self.inner.id);
        for state in self.inner.states.borrow().iter() {
            result.push('\n');
            result.push_str(&indent);
            result.push_str(unit);
            result.push_str(&state.to_string());
        }
        for child in self.children() {
            result.push('\n');
            result.push_str(&child.describe_at(level + 1, unit));
        }
        result
    }

    fn to_label(&self) -> String {
        format!("{} {}", self.inner.kind, self.inner.id)
    }
}

impl<K: NodeKey> Clone for Node<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K: NodeKey> PartialEq for Node<K> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<K: NodeKey> Eq for Node<K> {}

impl<K: NodeKey> Debug for Node<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.inner.kind)
            .field("id", &self.inner.id)
            .field("root", &self.is_root())
            .field("states", &self.inner.states.borrow().len())
            .field("children", &self.inner.children.borrow().len())
            .finish()
    }
}

impl<K: NodeKey> Display for Node<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl<K: NodeKey> WeakNode<K> {
    /// The node, if it is still alive.
    pub fn upgrade(&self) -> Option<Node<K>> {
        self.inner.upgrade().map(|inner| Node { inner })
    }

    /// [`Node::send`] through the handle; a no-op once the node is gone.
    pub fn send(&self, message: impl Into<Message>) {
        if let Some(node) = self.upgrade() {
            node.send(message);
        }
    }

    /// [`Node::broadcast`] through the handle; a no-op once the node is gone.
    pub fn broadcast(&self, message: impl Into<Message>) {
        if let Some(node) = self.upgrade() {
            node.broadcast(message);
        }
    }
}

impl<K: NodeKey> Clone for WeakNode<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<K: NodeKey> Debug for WeakNode<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(node) => write!(f, "WeakNode({} {})", node.kind(), node.id()),
            None => f.write_str("WeakNode(<dropped>)"),
        }
    }
}

/// Clears the draining flag when the drain loop exits, including by panic.
struct DrainGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> DrainGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

fn run_all(queue: &RefCell<VecDeque<Callback>>) {
    while let Some(action) = pop(queue) {
        action();
    }
}

fn pop(queue: &RefCell<VecDeque<Callback>>) -> Option<Callback> {
    queue.borrow_mut().pop_front()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::TransitionLog;
    use crate::core::state::StateBuilder;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Idle {
        log: Log,
    }

    struct Running {
        log: Log,
    }

    impl StateDef<&'static str> for Idle {
        fn id(&self) -> &'static str {
            "idle"
        }

        fn name(&self) -> &str {
            "Idle"
        }

        fn tag(&self) -> &str {
            "Motor"
        }

        fn setup(&self, state: &mut StateBuilder<'_, &'static str>) {
            let log = Rc::clone(&self.log);
            state.on_exit(move || log.borrow_mut().push("exit idle".to_string()));
            state.on(
                "start",
                Running {
                    log: Rc::clone(&self.log),
                },
            );
        }
    }

    impl StateDef<&'static str> for Running {
        fn id(&self) -> &'static str {
            "running"
        }

        fn name(&self) -> &str {
            "Running"
        }

        fn tag(&self) -> &str {
            "Motor"
        }

        fn setup(&self, state: &mut StateBuilder<'_, &'static str>) {
            let awake = Rc::clone(&self.log);
            let entry = Rc::clone(&self.log);
            state.on_awake(move || awake.borrow_mut().push("awake running".to_string()));
            state.on_entry(move || entry.borrow_mut().push("enter running".to_string()));
            state.on(
                "stop",
                Idle {
                    log: Rc::clone(&self.log),
                },
            );
        }
    }

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn names(node: &Node<&'static str>) -> Vec<String> {
        node.states()
            .iter()
            .map(|state| state.name().to_string())
            .collect()
    }

    #[test]
    fn add_state_awakens_immediately() {
        let log = log();
        let node = Node::new("Motor", "m1");
        node.add_state(Running {
            log: Rc::clone(&log),
        });

        assert_eq!(*log.borrow(), vec!["awake running"]);
        assert_eq!(names(&node), vec!["Running"]);
    }

    #[test]
    fn add_child_back_links_parent_once() {
        let parent = Node::new("Line", "l1");
        let child = Node::new("Motor", "m1");

        parent.add_child(&child).unwrap();
        parent.add_child(&child).unwrap();

        assert_eq!(parent.children().len(), 2);
        assert_eq!(child.parents(), vec![parent.clone()]);
    }

    #[test]
    fn tree_topology_rejects_second_parent() {
        let config = EngineConfig {
            topology: Topology::Tree,
            ..EngineConfig::default()
        };
        let first = Node::with_config("Line", "l1", config.clone());
        let second = Node::with_config("Line", "l2", config);
        let child = Node::new("Motor", "m1");

        first.add_child(&child).unwrap();
        let result = second.add_child(&child);

        assert!(matches!(result, Err(HsmError::TopologyViolation { .. })));
        assert!(second.children().is_empty());
    }

    #[test]
    fn tree_topology_accepts_child_of_dropped_parent() {
        let config = EngineConfig {
            topology: Topology::Tree,
            ..EngineConfig::default()
        };
        let child = Node::new("Motor", "m1");
        let first = Node::with_config("Line", "l1", config.clone());
        first.add_child(&child).unwrap();
        drop(first);
        assert!(child.parents().is_empty());

        let second = Node::with_config("Line", "l2", config);
        second.add_child(&child).unwrap();

        assert_eq!(child.parents(), vec![second.clone()]);
        assert_eq!(second.children(), vec![child]);
    }

    #[test]
    fn tree_topology_rejects_cycles() {
        let config = EngineConfig {
            topology: Topology::Tree,
            ..EngineConfig::default()
        };
        let top = Node::with_config("Line", "top", config.clone());
        let middle = Node::with_config("Line", "middle", config);

        top.add_child(&middle).unwrap();
        let result = middle.add_child(&top);

        assert!(matches!(result, Err(HsmError::TopologyViolation { .. })));
    }

    #[test]
    fn transition_replaces_state_and_runs_callbacks_in_order() {
        let log = log();
        let node = Node::new("Motor", "m1");
        node.add_state(Idle {
            log: Rc::clone(&log),
        });

        node.send("start");

        assert_eq!(names(&node), vec!["Running"]);
        assert_eq!(
            *log.borrow(),
            vec!["exit idle", "awake running", "enter running"]
        );
    }

    #[test]
    fn unmatched_message_keeps_state_instance() {
        let node = Node::new("Motor", "m1");
        node.add_state(Idle { log: log() });
        let before = node.states();

        node.send("unknown");

        let after = node.states();
        assert!(Rc::ptr_eq(&before[0], &after[0]));
    }

    #[test]
    fn parent_lookup_requires_exactly_one_match() {
        let child = Node::new("Motor", "m1");
        assert!(matches!(
            child.parent("Line"),
            Err(HsmError::ParentNotFound { .. })
        ));

        let first = Node::new("Line", "l1");
        first.add_child(&child).unwrap();
        assert_eq!(child.parent("Line").unwrap(), first);

        let second = Node::new("Line", "l2");
        second.add_child(&child).unwrap();
        assert!(matches!(
            child.parent("Line"),
            Err(HsmError::AmbiguousParent { count: 2, .. })
        ));
    }

    #[test]
    fn child_lookup_filters_by_kind_and_id() {
        let parent = Node::new("Line", 1u32);
        let motor = Node::new("Motor", 7u32);
        let sensor = Node::new("Sensor", 7u32);
        parent.add_child(&motor).unwrap();
        parent.add_child(&sensor).unwrap();

        assert_eq!(parent.children_of("Motor"), vec![motor.clone()]);
        assert_eq!(parent.child("Sensor", &7), Some(sensor));
        assert_eq!(parent.child("Motor", &8), None);
    }

    #[test]
    fn broadcast_from_leaf_is_fanned_out_by_root() {
        let log_a = log();
        let log_b = log();
        let sink: Rc<TransitionLog<&'static str>> = Rc::new(TransitionLog::new());
        let root = Node::root("Plant", "p1", sink.clone(), "operator");
        let a = Node::new("Motor", "a");
        let b = Node::new("Motor", "b");
        a.add_state(Idle {
            log: Rc::clone(&log_a),
        });
        b.add_state(Idle {
            log: Rc::clone(&log_b),
        });
        root.add_child(&a).unwrap();
        root.add_child(&b).unwrap();

        a.broadcast("start");

        assert_eq!(names(&a), vec!["Running"]);
        assert_eq!(names(&b), vec!["Running"]);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn broadcast_without_root_goes_nowhere_below() {
        let parent = Node::new("Line", "l1");
        let child = Node::new("Motor", "m1");
        child.add_state(Idle { log: log() });
        parent.add_child(&child).unwrap();

        parent.broadcast("start");

        assert_eq!(names(&child), vec!["Idle"]);
    }

    #[test]
    fn describe_renders_indented_tree() {
        let sink: Rc<TransitionLog<&'static str>> = Rc::new(TransitionLog::new());
        let root = Node::root("Plant", "p1", sink, "operator");
        let motor = Node::new("Motor", "m1");
        motor.add_state(Idle { log: log() });
        root.add_child(&motor).unwrap();

        assert_eq!(root.describe(), "+ Plant p1\n  + Motor m1\n    Idle (Motor idle)");
        assert_eq!(root.to_string(), root.describe());
    }

    #[test]
    fn describe_uses_configured_indent() {
        let config = EngineConfig {
            indent: "....".to_string(),
            ..EngineConfig::default()
        };
        let line = Node::with_config("Line", "l1", config);
        let motor = Node::new("Motor", "m1");
        motor.add_state(Idle { log: log() });
        line.add_child(&motor).unwrap();

        assert_eq!(
            line.describe(),
            "+ Line l1\n....+ Motor m1\n........Idle (Motor idle)"
        );
    }

    #[test]
    fn weak_handle_is_inert_after_drop() {
        let node = Node::new("Motor", "m1");
        let handle = node.downgrade();
        drop(node);

        assert!(handle.upgrade().is_none());
        handle.send("start");
    }
}
