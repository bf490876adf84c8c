//! List Example - keyed children keep their identity
//!
//! This example demonstrates keyed child matching:
//! - Reordering a keyed list emits only moves (no rebuilds)
//! - Prepending creates exactly one new subtree
//! - A counting observer audits the decision stream
//!
//! Run with: cargo run --example list

use arbor::{CountingObserver, HostBackend, RenderRoot, element, text};

fn roster(names: &[&str]) -> arbor::Descriptor {
    element("ul")
        .children(
            names
                .iter()
                .map(|name| element("li").key(*name).child(text(*name))),
        )
        .build()
}

fn main() {
    let mut root = RenderRoot::in_memory();

    println!("=== arbor List Example ===\n");

    root.render(roster(&["Duke", "Villanova", "Gonzaga"]))
        .expect("initial render");
    let ul = root.root().expect("mounted list");
    let handles = root.host().child_nodes(ul);
    println!("mounted:   {}", root.host().snapshot());
    println!("handles:   {handles:?}\n");

    // Reorder: every <li> handle survives, only repositioning happens.
    let observer = CountingObserver::new();
    root.render_observed(roster(&["Gonzaga", "Duke", "Villanova"]), &observer)
        .expect("reorder");
    println!("reordered: {}", root.host().snapshot());
    println!("handles:   {:?}", root.host().child_nodes(ul));
    println!(
        "decisions: {} create / {} update / {} delete\n",
        observer.creates(),
        observer.updates(),
        observer.deletes()
    );

    // Prepend: one create, nothing destroyed.
    observer.reset();
    root.render_observed(
        roster(&["Connecticut", "Gonzaga", "Duke", "Villanova"]),
        &observer,
    )
    .expect("prepend");
    println!("prepended: {}", root.host().snapshot());
    println!(
        "decisions: {} create / {} update / {} delete",
        observer.creates(),
        observer.updates(),
        observer.deletes()
    );

    println!("\n=== Example Complete ===");
}
