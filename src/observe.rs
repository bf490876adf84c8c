//! Instrumentation sink.
//!
//! An observer is injected into the [`Reconciler`](crate::reconcile::Reconciler)
//! and receives one event per applied mutation decision. It observes, never
//! decides: running with [`NoopObserver`] produces byte-identical host trees.
//!
//! Event accounting is at the decision (subtree) level: a replacement
//! reports one `Delete` plus one `Create` no matter how large the subtrees
//! are; attribute patches, text swaps and moves report `Update`.

use std::cell::Cell;

// =============================================================================
// Observer
// =============================================================================

/// Coarse classification of an applied mutation decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// Sink for mutation events emitted during a pass.
pub trait ReconcileObserver {
    /// Called once per applied decision.
    fn on_mutation(&self, kind: MutationKind);
}

/// Observer that ignores everything. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {
    fn on_mutation(&self, _kind: MutationKind) {}
}

// =============================================================================
// Counting Observer
// =============================================================================

/// Observer that tallies events per kind, for verification and complexity
/// auditing. Single-threaded by design, like the reconciler itself.
#[derive(Debug, Default)]
pub struct CountingObserver {
    creates: Cell<u64>,
    updates: Cell<u64>,
    deletes: Cell<u64>,
}

impl CountingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subtree mounts observed.
    pub fn creates(&self) -> u64 {
        self.creates.get()
    }

    /// Attribute patches, text swaps and moves observed.
    pub fn updates(&self) -> u64 {
        self.updates.get()
    }

    /// Subtree destroys observed.
    pub fn deletes(&self) -> u64 {
        self.deletes.get()
    }

    /// All events observed.
    pub fn total(&self) -> u64 {
        self.creates() + self.updates() + self.deletes()
    }

    /// Zero all counters (typically between passes).
    pub fn reset(&self) {
        self.creates.set(0);
        self.updates.set(0);
        self.deletes.set(0);
    }
}

impl ReconcileObserver for CountingObserver {
    fn on_mutation(&self, kind: MutationKind) {
        let cell = match kind {
            MutationKind::Create => &self.creates,
            MutationKind::Update => &self.updates,
            MutationKind::Delete => &self.deletes,
        };
        cell.set(cell.get() + 1);
    }
}

// =============================================================================
// Tests
// =============================================================================
