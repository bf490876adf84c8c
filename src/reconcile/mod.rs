//! Reconciliation - diff two descriptor trees, apply the difference.
//!
//! The entry point compares a `(prev, next)` descriptor pair and mutates the
//! host tree in place to match `next`, reusing host nodes wherever identity
//! allows. Decisions are evaluated in a fixed precedence order:
//!
//! 1. `next` gone - unmount the subtree
//! 2. nothing previous - mount a fresh subtree
//! 3. text leaves - identical values short-circuit, changed values swap in
//!    a new text node, kind mismatches replace the subtree
//! 4. element tag changed - replace the whole subtree, no descendant reuse
//!    (different tags are assumed structurally unrelated; precision is
//!    traded for speed)
//! 5. same tag - patch attributes, then reconcile children by identity key
//!
//! One invocation is an atomic, run-to-completion unit: it walks the tree
//! synchronously, applying mutations as it goes, with no suspension points.
//! The `&mut` host borrow keeps concurrent passes over one host
//! unrepresentable; callers serialize passes and pass back the `(prev,
//! handle)` pair the last invocation produced - the core retains nothing
//! between calls.
//!
//! # Example
//!
//! ```
//! use arbor::descriptor::{element, text};
//! use arbor::host::MemoryHost;
//! use arbor::reconcile::reconcile;
//!
//! let mut host = MemoryHost::new();
//! let container = host.container();
//!
//! let first = element("p").child(text("one")).build();
//! let root = reconcile(&mut host, None, Some(&first), None, container).unwrap();
//!
//! let second = element("p").child(text("two")).build();
//! let root = reconcile(&mut host, Some(&first), Some(&second), root, container).unwrap();
//!
//! assert!(root.is_some());
//! assert_eq!(host.snapshot(), "<p>two</p>");
//! ```

use log::trace;

use crate::apply::{Applier, Mutation};
use crate::descriptor::Descriptor;
use crate::error::ReconcileError;
use crate::host::{HostBackend, HostHandle};
use crate::observe::{MutationKind, NoopObserver, ReconcileObserver};
use crate::types::ChangeFlags;

mod attrs;
mod children;

pub use attrs::{AttrOp, AttrPatch, diff_attributes, mount_attributes};

const NOOP: &NoopObserver = &NoopObserver;

// =============================================================================
// Entry Points
// =============================================================================

/// Reconcile one position of the host tree.
///
/// `prev` and `handle` must be the actual outcome of the immediately
/// preceding pass for this position (`None`/`None` on first render).
/// Returns the resulting root handle; the host tree now matches `next`.
pub fn reconcile<H: HostBackend + ?Sized>(
    host: &mut H,
    prev: Option<&Descriptor>,
    next: Option<&Descriptor>,
    handle: Option<HostHandle>,
    container: HostHandle,
) -> Result<Option<HostHandle>, ReconcileError> {
    Reconciler::new(host).run(prev, next, handle, container)
}

/// Like [`reconcile`], with an observer receiving one event per applied
/// decision.
pub fn reconcile_observed<H: HostBackend + ?Sized>(
    host: &mut H,
    prev: Option<&Descriptor>,
    next: Option<&Descriptor>,
    handle: Option<HostHandle>,
    container: HostHandle,
    observer: &dyn ReconcileObserver,
) -> Result<Option<HostHandle>, ReconcileError> {
    Reconciler::with_observer(host, observer).run(prev, next, handle, container)
}

// =============================================================================
// Reconciler
// =============================================================================

/// The differ. Borrows the host for exactly one pass and accumulates
/// [`ChangeFlags`] describing what the pass applied.
pub struct Reconciler<'a, H: HostBackend + ?Sized> {
    applier: Applier<'a, H>,
    observer: &'a dyn ReconcileObserver,
    changes: ChangeFlags,
}

impl<'a, H: HostBackend + ?Sized> Reconciler<'a, H> {
    /// Reconciler with no instrumentation.
    pub fn new(host: &'a mut H) -> Self {
        Self::with_observer(host, NOOP)
    }

    /// Reconciler reporting each applied decision to `observer`. The
    /// observer only watches; outcomes are identical with or without one.
    pub fn with_observer(host: &'a mut H, observer: &'a dyn ReconcileObserver) -> Self {
        Self {
            applier: Applier::new(host),
            observer,
            changes: ChangeFlags::NONE,
        }
    }

    /// Which decision classes this reconciler has applied so far.
    pub fn changes(&self) -> ChangeFlags {
        self.changes
    }

    /// Run one pass. See [`reconcile`] for the caller contract.
    pub fn run(
        &mut self,
        prev: Option<&Descriptor>,
        next: Option<&Descriptor>,
        handle: Option<HostHandle>,
        container: HostHandle,
    ) -> Result<Option<HostHandle>, ReconcileError> {
        let position = handle
            .and_then(|node| self.applier.host().child_position(container, node))
            .unwrap_or_else(|| self.applier.host().child_nodes(container).len());
        self.reconcile_node(prev, next, handle, container, position)
    }

    /// The `(prev, next)` state machine for one tree position.
    fn reconcile_node(
        &mut self,
        prev: Option<&Descriptor>,
        next: Option<&Descriptor>,
        handle: Option<HostHandle>,
        parent: HostHandle,
        position: usize,
    ) -> Result<Option<HostHandle>, ReconcileError> {
        // 1. Unmount.
        let Some(next) = next else {
            if let Some(node) = handle {
                trace!("reconcile: destroy at {position}");
                self.applier.apply(Mutation::Destroy { parent, node })?;
                self.observer.on_mutation(MutationKind::Delete);
                self.changes |= ChangeFlags::DESTROY;
            }
            return Ok(None);
        };

        // 2. Mount.
        let (Some(prev), Some(node)) = (prev, handle) else {
            trace!("reconcile: mount at {position}");
            let node = self.applier.apply(Mutation::Create {
                descriptor: next,
                parent,
                position,
            })?;
            self.observer.on_mutation(MutationKind::Create);
            self.changes |= ChangeFlags::CREATE;
            return Ok(node);
        };

        match (prev, next) {
            // 3. Text leaves.
            (Descriptor::Text(prev_value), Descriptor::Text(next_value)) => {
                if prev_value == next_value {
                    // Required short-circuit: identical text falls through
                    // with the handle unchanged.
                    trace!("reconcile: text unchanged at {position}");
                    return Ok(Some(node));
                }
                trace!("reconcile: text {prev_value:?} -> {next_value:?}");
                let new = self.applier.apply(Mutation::TextReplace {
                    parent,
                    old: Some(node),
                    value: next_value,
                    position,
                })?;
                self.observer.on_mutation(MutationKind::Update);
                self.changes |= ChangeFlags::TEXT_REPLACE;
                Ok(new)
            }
            (Descriptor::Text(_), Descriptor::Element(next_el)) => {
                trace!("reconcile: text -> <{}>", next_el.tag);
                self.replace(node, next, parent)
            }
            (Descriptor::Element(prev_el), Descriptor::Text(_)) => {
                trace!("reconcile: <{}> -> text", prev_el.tag);
                self.replace(node, next, parent)
            }
            (Descriptor::Element(prev_el), Descriptor::Element(next_el)) => {
                // 4. Tag change: the subtrees are assumed structurally
                // unrelated; no descendant diffing is attempted.
                if prev_el.tag != next_el.tag {
                    trace!("reconcile: <{}> -> <{}>", prev_el.tag, next_el.tag);
                    return self.replace(node, next, parent);
                }

                // 5. Incremental update on the reused handle.
                let patch = diff_attributes(&prev_el.attributes, &next_el.attributes);
                if !patch.is_empty() {
                    trace!(
                        "reconcile: {} attr op(s) on <{}>",
                        patch.len(),
                        next_el.tag
                    );
                    self.applier.apply(Mutation::UpdateAttrs { node, patch })?;
                    self.observer.on_mutation(MutationKind::Update);
                    self.changes |= ChangeFlags::UPDATE_ATTRS;
                }
                children::reconcile_children(self, &prev_el.children, &next_el.children, node)?;
                Ok(Some(node))
            }
        }
    }

    /// Destroy the previous subtree and mount a fresh one in its place.
    fn replace(
        &mut self,
        old: HostHandle,
        next: &Descriptor,
        parent: HostHandle,
    ) -> Result<Option<HostHandle>, ReconcileError> {
        let new = self.applier.apply(Mutation::Replace {
            parent,
            old,
            descriptor: next,
        })?;
        self.observer.on_mutation(MutationKind::Delete);
        self.observer.on_mutation(MutationKind::Create);
        self.changes |= ChangeFlags::REPLACE;
        Ok(new)
    }
}

// =============================================================================
// Tests
// =============================================================================
