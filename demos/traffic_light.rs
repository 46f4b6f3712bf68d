//! Traffic Light State Machine
//!
//! This example demonstrates a simple cyclic state machine on a single node.
//!
//! Key concepts:
//! - Cyclic state transitions (states repeat)
//! - States declared with `define_state!`
//! - Entry callbacks
//!
//! Run with: cargo run --example traffic_light

use hsm_engine::core::Node;
use hsm_engine::define_state;

define_state! {
    struct Red: &'static str {
        tag: "Light",
        id: "red",
    }
    setup(state) {
        state.on_entry(|| println!("  STOP"));
        state.on("tick", Green);
    }
}

define_state! {
    struct Green: &'static str {
        tag: "Light",
        id: "green",
    }
    setup(state) {
        state.on_entry(|| println!("  GO"));
        state.on("tick", Yellow);
    }
}

define_state! {
    struct Yellow: &'static str {
        tag: "Light",
        id: "yellow",
    }
    setup(state) {
        state.on_entry(|| println!("  CAUTION"));
        state.on("tick", Red);
    }
}

fn main() {
    println!("=== Traffic Light State Machine ===\n");

    let light = Node::new("Intersection", "main-and-5th");
    light.add_state(Red);
    println!("Initial state: {}\n", light.states()[0]);

    println!("Transition sequence:");
    for _ in 0..4 {
        light.send("tick");
        println!("  -> {}", light.states()[0]);
    }

    // Messages without a matching rule leave the light alone
    light.send("honk");
    println!("\nAfter an unrelated message: {}", light.states()[0]);

    println!("\n{}", light.describe());
    println!("\n=== Example Complete ===");
}
