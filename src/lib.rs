//! Hsm Engine: a synchronous hierarchical state machine engine
//!
//! A hierarchy is a tree of [`Node`]s. Each node owns a set of active
//! states, and each state owns declarative transition rules plus awake,
//! entry and exit callbacks. Messages can be sent through the whole
//! connected hierarchy or broadcast from the root, and every committed
//! transition is reported to a persistence sink bound to the root.
//!
//! # Core Concepts
//!
//! - **Message**: an opaque payload matched by its string form
//! - **Transition**: message key + guards -> destination state definition
//! - **State**: a live instance of a [`StateDef`] bound to one node
//! - **Node**: active states, children, parents and deferred callback queues
//! - **Root**: a node bound to a [`SaveState`] sink and an acting user
//!
//! Callbacks run after the full pass over a node's active states, in the
//! global order exit, awake, entry. Messages sent from callbacks join the
//! same node-local queue and are resolved before the original call returns.
//!
//! # Example
//!
//! ```rust
//! use hsm_engine::core::{Node, TransitionLog};
//! use hsm_engine::define_state;
//! use std::rc::Rc;
//!
//! define_state! {
//!     pub struct Open: &'static str { tag: "Ticket", id: "open" }
//!     setup(state) {
//!         state.on("resolve", Resolved);
//!     }
//! }
//!
//! define_state! {
//!     pub struct Resolved: &'static str { tag: "Ticket", id: "resolved" }
//!     setup(state) {
//!         state.on("reopen", Open);
//!     }
//! }
//!
//! let log: Rc<TransitionLog<&'static str>> = Rc::new(TransitionLog::new());
//! let desk = Node::root("Desk", "support", log.clone(), "agent-7");
//! let ticket = Node::new("Ticket", "T-100");
//! ticket.add_state(Open);
//! desk.add_child(&ticket).unwrap();
//!
//! ticket.send("resolve");
//!
//! let record = &log.records()[0];
//! assert_eq!(record.node, "T-100");
//! assert_eq!(record.to.name, "Resolved");
//! assert_eq!(record.user, "agent-7");
//! ```

mod macros;

pub mod checkpoint;
pub mod config;
pub mod core;
pub mod registry;

// Re-export commonly used types
pub use checkpoint::{Checkpoint, CheckpointError};
pub use config::{EngineConfig, Topology};
pub use crate::core::{
    HsmError, Message, Node, SaveState, State, StateBuilder, StateDef, Transition, TransitionLog,
};
pub use registry::{RegistryError, StateRegistry};
