//! Basic Example - mount, update, unmount
//!
//! This example demonstrates the core reconciliation lifecycle:
//! - Mounting a descriptor tree into an in-memory host
//! - Updating it with a second pass (only the difference is applied)
//! - Clearing the root
//!
//! Run with: cargo run --example basic

use arbor::{RenderRoot, element, text};

fn main() {
    let mut root = RenderRoot::in_memory();

    println!("=== arbor Basic Example ===\n");

    // First pass: everything is mounted fresh.
    let changes = root
        .render(
            element("section")
                .attr("class", "greeting")
                .style("color", "teal")
                .child(element("h1").child(text("Hello, arbor!")))
                .child(element("p").child(text("A tree reconciliation engine")))
                .build(),
        )
        .expect("first render");

    println!("first pass applied:  {changes:?}");
    println!("host tree:           {}", root.host().snapshot());
    println!("mutation calls:      {}\n", root.host().op_count());

    // Second pass: only the heading text differs; the rest is untouched.
    root.host_mut().clear_ops();
    let changes = root
        .render(
            element("section")
                .attr("class", "greeting")
                .style("color", "teal")
                .child(element("h1").child(text("Hello again!")))
                .child(element("p").child(text("A tree reconciliation engine")))
                .build(),
        )
        .expect("second render");

    println!("second pass applied: {changes:?}");
    println!("host tree:           {}", root.host().snapshot());
    println!("mutation calls:      {}\n", root.host().op_count());

    // Unmount.
    root.clear().expect("clear");
    println!("after clear:         {:?}", root.host().snapshot());

    println!("\n=== Example Complete ===");
}
