//! Keyed child matching.
//!
//! Matches a previous ordered child list to a next ordered child list by
//! identity key: one pass to index the previous children, one pass to walk
//! the next children in order, reusing matches (moving them into place when
//! needed) and mounting the rest. Previous children nobody claimed are
//! destroyed after the walk.
//!
//! Two O(n) passes instead of an optimal edit-distance diff; the extra
//! `Move`s that can produce are accepted. Position checks consult the live
//! host child list, so every move and insert self-corrects the indices that
//! later children see.

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::Reconciler;
use crate::apply::Mutation;
use crate::descriptor::{Descriptor, IdentityKey};
use crate::error::ReconcileError;
use crate::host::{HostBackend, HostHandle};
use crate::observe::MutationKind;
use crate::types::ChangeFlags;

struct PrevEntry<'d> {
    descriptor: &'d Descriptor,
    handle: HostHandle,
    claimed: bool,
}

/// Reconcile the child lists of an element whose handle survived.
///
/// The live children of `parent` mirror `prev_children` positionally - that
/// is the caller contract threaded down from the pass entry point. Duplicate
/// identity keys in either list fail with
/// [`ReconcileError::DuplicateKey`]; silently letting the last occurrence
/// win would corrupt the host tree invisibly.
pub(super) fn reconcile_children<H: HostBackend + ?Sized>(
    r: &mut Reconciler<'_, H>,
    prev_children: &[Descriptor],
    next_children: &[Descriptor],
    parent: HostHandle,
) -> Result<(), ReconcileError> {
    let prev_handles: SmallVec<[HostHandle; 8]> = r.applier.host().child_nodes(parent);
    debug_assert_eq!(
        prev_handles.len(),
        prev_children.len(),
        "caller contract: prev descriptors must mirror the live host children"
    );

    // Pass 1: index previous children by identity key.
    let mut entries: Vec<PrevEntry<'_>> = Vec::with_capacity(prev_children.len());
    let mut by_key: FxHashMap<IdentityKey, usize> =
        FxHashMap::with_capacity_and_hasher(prev_children.len(), Default::default());
    for (index, (descriptor, handle)) in
        prev_children.iter().zip(prev_handles.iter()).enumerate()
    {
        let key = descriptor.identity_key(index);
        if by_key.insert(key.clone(), index).is_some() {
            return Err(ReconcileError::DuplicateKey { key });
        }
        entries.push(PrevEntry {
            descriptor,
            handle: *handle,
            claimed: false,
        });
    }

    // Pass 2: walk next children in order.
    let mut seen: FxHashSet<IdentityKey> = FxHashSet::default();
    for (position, next_child) in next_children.iter().enumerate() {
        let key = next_child.identity_key(position);
        if !seen.insert(key.clone()) {
            return Err(ReconcileError::DuplicateKey { key });
        }

        match by_key.get(&key).copied() {
            Some(index) => {
                entries[index].claimed = true;
                let prev_descriptor = entries[index].descriptor;
                let prev_handle = entries[index].handle;
                let node = r.reconcile_node(
                    Some(prev_descriptor),
                    Some(next_child),
                    Some(prev_handle),
                    parent,
                    position,
                )?;
                if let Some(node) = node {
                    // Siblings before `position` are already final; anything
                    // sitting elsewhere gets moved into place.
                    let live = r.applier.host().child_position(parent, node);
                    if live != Some(position) {
                        trace!("children: move {key} to {position}");
                        r.applier.apply(Mutation::Move {
                            parent,
                            node,
                            to: position,
                        })?;
                        r.observer.on_mutation(MutationKind::Update);
                        r.changes |= ChangeFlags::MOVE;
                    }
                }
            }
            None => {
                trace!("children: no match for {key}, mount at {position}");
                r.reconcile_node(None, Some(next_child), None, parent, position)?;
            }
        }
    }

    // Pass 3: every previous child nobody claimed is gone in this pass.
    for entry in entries.iter().filter(|entry| !entry.claimed) {
        r.reconcile_node(Some(entry.descriptor), None, Some(entry.handle), parent, 0)?;
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::descriptor::{element, text};
    use crate::error::ReconcileError;
    use crate::host::{HostBackend as _, MemoryHost};
    use crate::reconcile::reconcile;

    #[test]
    fn test_duplicate_keys_in_next_fail() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let before = element("ul").child(element("li").key("a")).build();
        let root = reconcile(&mut host, None, Some(&before), None, container).unwrap();

        let after = element("ul")
            .child(element("li").key("a"))
            .child(element("li").key("a"))
            .build();
        let result = reconcile(&mut host, Some(&before), Some(&after), root, container);
        assert!(matches!(result, Err(ReconcileError::DuplicateKey { .. })));
    }

    #[test]
    fn test_duplicate_keys_in_prev_fail() {
        // A malformed tree mounts unvalidated (mounting never consults the
        // identity map); the error surfaces on the next pass, when it does.
        let mut host = MemoryHost::new();
        let container = host.container();
        let before = element("ul")
            .child(element("li").key("a"))
            .child(element("li").key("a"))
            .build();
        let root = reconcile(&mut host, None, Some(&before), None, container).unwrap();

        let after = element("ul").child(element("li").key("a")).build();
        let result = reconcile(&mut host, Some(&before), Some(&after), root, container);
        assert!(matches!(result, Err(ReconcileError::DuplicateKey { .. })));
    }

    #[test]
    fn test_text_and_element_at_same_position_do_not_collide() {
        let mut host = MemoryHost::new();
        let container = host.container();
        // Unkeyed element at 0, text at 1.
        let before = element("div")
            .child(element("span").child(text("a")))
            .child(text("b"))
            .build();
        let root = reconcile(&mut host, None, Some(&before), None, container).unwrap();

        // Swapped kinds at both positions: fallback keys must not match
        // across kinds, so both children are replaced, not mis-reused.
        let after = element("div")
            .child(text("b"))
            .child(element("span").child(text("a")))
            .build();
        reconcile(&mut host, Some(&before), Some(&after), root, container).unwrap();
        assert_eq!(host.snapshot(), "<div>b<span>a</span></div>");
    }

    #[test]
    fn test_unkeyed_children_match_positionally() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let before = element("ul")
            .child(element("li").child(text("one")))
            .child(element("li").child(text("two")))
            .build();
        let root = reconcile(&mut host, None, Some(&before), None, container).unwrap();
        let lis = host.child_nodes(root.unwrap());

        let after = element("ul")
            .child(element("li").child(text("one")))
            .child(element("li").child(text("2")))
            .build();
        reconcile(&mut host, Some(&before), Some(&after), root, container).unwrap();

        // Positional matching reuses both handles and only the changed text
        // leaf was touched.
        assert_eq!(host.child_nodes(root.unwrap()).as_slice(), lis.as_slice());
        assert_eq!(host.snapshot(), "<ul><li>one</li><li>2</li></ul>");
    }
}
