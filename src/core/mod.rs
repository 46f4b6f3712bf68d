//! Core hierarchical state machine types.
//!
//! This module contains the message-routing and transition-evaluation core:
//! - Messages matched by their string form
//! - Guards and declarative transition rules
//! - State definitions, live states and their lifecycle callbacks
//! - Nodes, routing (send/broadcast) and the deferred callback queues
//! - The persistence sink trait and an in-memory transition log
//!
//! Everything here is synchronous and single-threaded.

mod error;
mod guard;
mod history;
mod message;
mod node;
mod save;
mod state;
mod transition;

pub use error::HsmError;
pub use guard::Guard;
pub use history::{TransitionLog, TransitionRecord};
pub use message::Message;
pub use node::{Node, NodeKey, WeakNode};
pub use save::SaveState;
pub use state::{Action, State, StateBuilder, StateDef, StateRef};
pub use transition::Transition;
