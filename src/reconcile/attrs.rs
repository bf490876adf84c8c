//! Attribute diffing.
//!
//! Compares two attribute maps and produces the minimal list of per-kind
//! operations: attributes only present before are removed, new or
//! changed-value attributes are set, and untouched attributes produce
//! nothing - leaving host-side state (focus, in-flight animation) alone.
//!
//! The diff is pure; applying the ops is the
//! [`Applier`](crate::apply::Applier)'s job.

use std::collections::BTreeMap;

use crate::types::{AttrValue, EventHandler};

// =============================================================================
// Attr Ops
// =============================================================================

/// One host-level attribute operation.
///
/// Borrowed from the descriptor trees that produced it; a patch never
/// outlives the pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrOp<'d> {
    /// Write a string attribute (boolean attributes write `""`).
    SetAttr { name: &'d str, value: &'d str },
    /// Remove a string attribute.
    RemoveAttr { name: &'d str },
    /// Merge one style property.
    SetStyle { property: &'d str, value: &'d str },
    /// Remove one style property.
    RemoveStyle { property: &'d str },
    /// Register an event listener.
    Bind {
        event: &'d str,
        handler: &'d EventHandler,
    },
    /// Unregister an event listener.
    Unbind {
        event: &'d str,
        handler: &'d EventHandler,
    },
}

/// Ordered list of attribute operations for one element.
pub type AttrPatch<'d> = Vec<AttrOp<'d>>;

// =============================================================================
// Diffing
// =============================================================================

/// Diff two attribute maps.
///
/// Exhaustive over [`AttrValue`] kinds: style maps diff property-by-property
/// (merge, never wholesale), handlers rebind only when their identity
/// changed, and a kind change under one name removes the old kind's effects
/// before applying the new kind's.
pub fn diff_attributes<'d>(
    prev: &'d BTreeMap<String, AttrValue>,
    next: &'d BTreeMap<String, AttrValue>,
) -> AttrPatch<'d> {
    let mut patch = AttrPatch::new();

    for (name, old) in prev {
        if !next.contains_key(name) {
            push_removal(&mut patch, name, old);
        }
    }

    for (name, new) in next {
        match prev.get(name) {
            None => push_set(&mut patch, name, new),
            Some(old) if old == new => {}
            Some(old) => push_change(&mut patch, name, old, new),
        }
    }

    patch
}

/// Ops that apply a fresh element's attributes (mount path: diff from empty).
pub fn mount_attributes<'d>(attrs: &'d BTreeMap<String, AttrValue>) -> AttrPatch<'d> {
    let mut patch = AttrPatch::new();
    for (name, value) in attrs {
        push_set(&mut patch, name, value);
    }
    patch
}

fn push_change<'d>(patch: &mut AttrPatch<'d>, name: &'d str, old: &'d AttrValue, new: &'d AttrValue) {
    match (old, new) {
        (AttrValue::Text(_), AttrValue::Text(value)) => {
            patch.push(AttrOp::SetAttr { name, value });
        }
        (AttrValue::Flag(true), AttrValue::Flag(false)) => {
            patch.push(AttrOp::RemoveAttr { name });
        }
        (AttrValue::Flag(false), AttrValue::Flag(true)) => {
            patch.push(AttrOp::SetAttr { name, value: "" });
        }
        (AttrValue::Flag(_), AttrValue::Flag(_)) => {}
        (AttrValue::Style(old_map), AttrValue::Style(new_map)) => {
            for property in old_map.keys() {
                if !new_map.contains_key(property) {
                    patch.push(AttrOp::RemoveStyle { property });
                }
            }
            for (property, value) in new_map {
                if old_map.get(property) != Some(value) {
                    patch.push(AttrOp::SetStyle { property, value });
                }
            }
        }
        (AttrValue::Handler(old_handler), AttrValue::Handler(new_handler)) => {
            // Identity comparison: the same Rc means "unchanged", anything
            // else is unbind-then-bind.
            if old_handler != new_handler {
                patch.push(AttrOp::Unbind {
                    event: name,
                    handler: old_handler,
                });
                patch.push(AttrOp::Bind {
                    event: name,
                    handler: new_handler,
                });
            }
        }
        // Kind changed under the same name: tear down the old kind, apply
        // the new one.
        (old, new) => {
            push_removal(patch, name, old);
            push_set(patch, name, new);
        }
    }
}

fn push_set<'d>(patch: &mut AttrPatch<'d>, name: &'d str, value: &'d AttrValue) {
    match value {
        AttrValue::Text(value) => patch.push(AttrOp::SetAttr { name, value }),
        AttrValue::Flag(true) => patch.push(AttrOp::SetAttr { name, value: "" }),
        AttrValue::Flag(false) => {}
        AttrValue::Style(map) => {
            for (property, value) in map {
                patch.push(AttrOp::SetStyle { property, value });
            }
        }
        AttrValue::Handler(handler) => patch.push(AttrOp::Bind {
            event: name,
            handler,
        }),
    }
}

fn push_removal<'d>(patch: &mut AttrPatch<'d>, name: &'d str, old: &'d AttrValue) {
    match old {
        AttrValue::Text(_) => patch.push(AttrOp::RemoveAttr { name }),
        AttrValue::Flag(true) => patch.push(AttrOp::RemoveAttr { name }),
        AttrValue::Flag(false) => {}
        AttrValue::Style(map) => {
            for property in map.keys() {
                patch.push(AttrOp::RemoveStyle { property });
            }
        }
        AttrValue::Handler(handler) => patch.push(AttrOp::Unbind {
            event: name,
            handler,
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
