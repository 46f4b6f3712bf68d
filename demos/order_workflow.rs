//! Order Workflow Example
//!
//! This example demonstrates a small hierarchy of nodes working together.
//!
//! Key concepts:
//! - A root node bound to a transition log and an acting user
//! - Guarded transitions
//! - Entry callbacks that broadcast follow-up messages
//! - Checkpointing the hierarchy and restoring it from a registry
//!
//! Run with: RUST_LOG=hsm_engine=debug cargo run --example order_workflow

use hsm_engine::checkpoint::Checkpoint;
use hsm_engine::core::{Node, StateBuilder, StateDef, Transition, TransitionLog};
use hsm_engine::define_state;
use hsm_engine::registry::StateRegistry;
use std::cell::Cell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

type Key = &'static str;

/// Awaiting payment. Only moves on once the balance covers the total.
#[derive(Clone)]
struct Pending {
    balance: Rc<Cell<u32>>,
    total: u32,
}

impl StateDef<Key> for Pending {
    fn id(&self) -> Key {
        "pending"
    }

    fn name(&self) -> &str {
        "Pending"
    }

    fn tag(&self) -> &str {
        "Order"
    }

    fn setup(&self, state: &mut StateBuilder<'_, Key>) {
        let balance = Rc::clone(&self.balance);
        let total = self.total;
        state.add_transition(Transition::new("pay", Paid).when(move || balance.get() >= total));
    }
}

define_state! {
    /// Paid orders ask the whole shop to ship their lines.
    struct Paid: Key {
        tag: "Order",
        id: "paid",
    }
    setup(state) {
        let ship = state.broadcast("ship");
        state.on_entry(ship);
    }
}

define_state! {
    struct Reserved: Key {
        tag: "Line",
        id: "reserved",
    }
    setup(state) {
        state.on("ship", Shipped);
    }
}

define_state! {
    struct Shipped: Key {
        tag: "Line",
        id: "shipped",
    }
    setup(state) {
        let node = state.node().id().to_string();
        state.on_entry(move || println!("  line {node} left the warehouse"));
    }
}

fn build_shop(log: Rc<TransitionLog<Key>>, balance: &Rc<Cell<u32>>) -> (Node<Key>, Node<Key>) {
    let shop = Node::root("Shop", "shop", log, "clerk");
    let order = Node::new("Order", "order-1001");
    shop.add_child(&order).expect("empty shop accepts orders");
    for line in ["line-1", "line-2"] {
        let line = Node::new("Line", line);
        order.add_child(&line).expect("fresh order accepts lines");
        line.add_state(Reserved);
    }
    order.add_state(Pending {
        balance: Rc::clone(balance),
        total: 40,
    });
    (shop, order)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Order Workflow ===\n");

    let log = Rc::new(TransitionLog::new());
    let balance = Rc::new(Cell::new(25));
    let (shop, order) = build_shop(Rc::clone(&log), &balance);

    println!("Initial hierarchy:\n{}\n", shop.describe());

    println!("Paying with an insufficient balance...");
    order.send("pay");
    println!("  order is still {}\n", order.states()[0]);

    println!("Topping up and paying again...");
    balance.set(40);
    order.send("pay");
    println!();

    println!("Hierarchy after payment:\n{}\n", shop.describe());

    println!("Recorded transitions:");
    for record in log.records() {
        println!(
            "  [{}] {} {}: {} -> {} on '{}'",
            record.user, record.kind, record.node, record.from.name, record.to.name, record.message
        );
    }

    // Checkpoint, then rebuild an untouched shop and restore into it
    let checkpoint = Checkpoint::capture(&shop);
    let json = checkpoint.to_json().expect("checkpoint serializes");
    println!(
        "\nCheckpoint {} covers {} nodes ({} bytes of JSON)",
        checkpoint.id,
        checkpoint.root.node_count(),
        json.len()
    );

    let registry = StateRegistry::new("shop")
        .with(Paid)
        .and_then(|registry| registry.with(Reserved))
        .and_then(|registry| registry.with(Shipped))
        .expect("state identities are unique");

    let (fresh_shop, _) = build_shop(Rc::new(TransitionLog::new()), &Rc::new(Cell::new(0)));
    checkpoint
        .restore(&fresh_shop, &registry)
        .expect("checkpoint matches the rebuilt shop");

    println!("\nRestored hierarchy:\n{}", fresh_shop.describe());
    println!("\n=== Example Complete ===");
}
