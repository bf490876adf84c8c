//! Host mutation applier.
//!
//! The [`Applier`] is the translation layer between [`Mutation`] decisions
//! and the concrete [`HostBackend`] primitives - and the only component that
//! can reach the mutation half of the trait. It holds the `&mut` host borrow
//! for the duration of a pass; the reconciler gets a shared view through
//! [`Applier::host`] for position queries.
//!
//! Ordering guarantee: subtrees are fully built detached and only then
//! inserted, and insert-before references are always looked up from the live
//! child list - so a reference names either an already-existing sibling or
//! end-of-parent, never a not-yet-created node.

use log::trace;

use crate::descriptor::Descriptor;
use crate::error::HostError;
use crate::host::{HostBackend, HostHandle};
use crate::reconcile::{AttrOp, AttrPatch, mount_attributes};

// =============================================================================
// Mutation Decisions
// =============================================================================

/// One decision produced by the reconciler or the child matcher.
///
/// Borrows the descriptor tree that justified it; decisions never outlive
/// the pass.
#[derive(Debug)]
pub enum Mutation<'d> {
    /// Mount a fresh subtree under `parent` at `position`.
    Create {
        descriptor: &'d Descriptor,
        parent: HostHandle,
        position: usize,
    },
    /// Swap `old`'s whole subtree for a freshly mounted one, in place.
    Replace {
        parent: HostHandle,
        old: HostHandle,
        descriptor: &'d Descriptor,
    },
    /// Patch an element's attributes in place.
    UpdateAttrs {
        node: HostHandle,
        patch: AttrPatch<'d>,
    },
    /// Swap a text leaf for a new one carrying `value`; appends at
    /// `position` when there is no old node to replace.
    TextReplace {
        parent: HostHandle,
        old: Option<HostHandle>,
        value: &'d str,
        position: usize,
    },
    /// Reposition an attached child to index `to`. The node must currently
    /// sit at a later index; earlier siblings are already final when the
    /// matcher emits this.
    Move {
        parent: HostHandle,
        node: HostHandle,
        to: usize,
    },
    /// Detach and recursively release a subtree.
    Destroy {
        parent: HostHandle,
        node: HostHandle,
    },
}

// =============================================================================
// Applier
// =============================================================================

/// Translates mutation decisions into host API calls. Holds no business
/// state.
pub struct Applier<'h, H: HostBackend + ?Sized> {
    host: &'h mut H,
}

impl<'h, H: HostBackend + ?Sized> Applier<'h, H> {
    pub fn new(host: &'h mut H) -> Self {
        Self { host }
    }

    /// Read-only view of the host, for sibling-position queries.
    #[inline]
    pub fn host(&self) -> &H {
        self.host
    }

    /// Apply one decision. Returns the resulting handle for decisions that
    /// produce a node (`Create`, `Replace`, `TextReplace`), `None` otherwise.
    ///
    /// A host failure mid-decision leaves earlier calls applied; host
    /// mutations are not generally idempotent, so nothing is rolled back or
    /// retried.
    pub fn apply(&mut self, mutation: Mutation<'_>) -> Result<Option<HostHandle>, HostError> {
        match mutation {
            Mutation::Create {
                descriptor,
                parent,
                position,
            } => {
                let node = self.build_subtree(descriptor)?;
                let reference = self.reference_at(parent, position);
                self.host.insert_before(parent, node, reference)?;
                Ok(Some(node))
            }
            Mutation::Replace {
                parent,
                old,
                descriptor,
            } => {
                let node = self.build_subtree(descriptor)?;
                self.host.insert_before(parent, node, Some(old))?;
                self.host.remove_child(parent, old)?;
                Ok(Some(node))
            }
            Mutation::UpdateAttrs { node, patch } => {
                self.apply_patch(node, &patch)?;
                Ok(None)
            }
            Mutation::TextReplace {
                parent,
                old,
                value,
                position,
            } => {
                let node = self.host.create_text_node(value)?;
                match old {
                    Some(old) => {
                        self.host.insert_before(parent, node, Some(old))?;
                        self.host.remove_child(parent, old)?;
                    }
                    None => {
                        let reference = self.reference_at(parent, position);
                        self.host.insert_before(parent, node, reference)?;
                    }
                }
                Ok(Some(node))
            }
            Mutation::Move { parent, node, to } => {
                let reference = self.reference_at(parent, to);
                self.host.insert_before(parent, node, reference)?;
                Ok(None)
            }
            Mutation::Destroy { parent, node } => {
                self.host.remove_child(parent, node)?;
                Ok(None)
            }
        }
    }

    /// Build a detached host subtree for a descriptor: create the node, set
    /// every attribute, mount children depth-first.
    fn build_subtree(&mut self, descriptor: &Descriptor) -> Result<HostHandle, HostError> {
        match descriptor {
            Descriptor::Text(value) => self.host.create_text_node(value),
            Descriptor::Element(el) => {
                trace!("applier: build <{}>", el.tag);
                let node = self.host.create_element_node(&el.tag)?;
                self.apply_patch(node, &mount_attributes(&el.attributes))?;
                for child in &el.children {
                    let child_node = self.build_subtree(child)?;
                    self.host.append_child(node, child_node)?;
                }
                Ok(node)
            }
        }
    }

    fn apply_patch(&mut self, node: HostHandle, patch: &AttrPatch<'_>) -> Result<(), HostError> {
        for op in patch {
            match op {
                AttrOp::SetAttr { name, value } => self.host.set_attribute(node, name, value)?,
                AttrOp::RemoveAttr { name } => self.host.remove_attribute(node, name)?,
                AttrOp::SetStyle { property, value } => {
                    self.host.set_style_property(node, property, value)?
                }
                AttrOp::RemoveStyle { property } => {
                    self.host.remove_style_property(node, property)?
                }
                AttrOp::Bind { event, handler } => {
                    self.host.add_event_listener(node, event, handler)?
                }
                AttrOp::Unbind { event, handler } => {
                    self.host.remove_event_listener(node, event, handler)?
                }
            }
        }
        Ok(())
    }

    /// The live node currently at `position`, or `None` for end-of-parent.
    fn reference_at(&self, parent: HostHandle, position: usize) -> Option<HostHandle> {
        self.host.child_nodes(parent).get(position).copied()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{element, text};
    use crate::host::MemoryHost;
    use crate::types::EventHandler;

    #[test]
    fn test_create_builds_whole_subtree() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let mut applier = Applier::new(&mut host);

        let tree = element("div")
            .attr("class", "panel")
            .child(element("span").child(text("hi")))
            .build();
        let node = applier
            .apply(Mutation::Create {
                descriptor: &tree,
                parent: container,
                position: 0,
            })
            .unwrap()
            .unwrap();

        assert_eq!(host.snapshot(), "<div class=\"panel\"><span>hi</span></div>");
        assert_eq!(host.child_position(container, node), Some(0));
    }

    #[test]
    fn test_create_inserts_at_position() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let first = host.create_element_node("p").unwrap();
        host.append_child(container, first).unwrap();

        let mut applier = Applier::new(&mut host);
        let tree = element("h1").build();
        applier
            .apply(Mutation::Create {
                descriptor: &tree,
                parent: container,
                position: 0,
            })
            .unwrap();

        assert_eq!(host.snapshot(), "<h1></h1><p></p>");
    }

    #[test]
    fn test_replace_swaps_in_place() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let a = host.create_element_node("a").unwrap();
        let b = host.create_element_node("b").unwrap();
        let c = host.create_element_node("c").unwrap();
        for node in [a, b, c] {
            host.append_child(container, node).unwrap();
        }

        let mut applier = Applier::new(&mut host);
        let tree = element("nav").build();
        let node = applier
            .apply(Mutation::Replace {
                parent: container,
                old: b,
                descriptor: &tree,
            })
            .unwrap()
            .unwrap();

        assert_eq!(host.snapshot(), "<a></a><nav></nav><c></c>");
        assert_eq!(host.child_position(container, node), Some(1));
        assert!(!host.exists(b));
    }

    #[test]
    fn test_text_replace_in_place_and_append() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let old = host.create_text_node("x").unwrap();
        host.append_child(container, old).unwrap();

        let mut applier = Applier::new(&mut host);
        let node = applier
            .apply(Mutation::TextReplace {
                parent: container,
                old: Some(old),
                value: "y",
                position: 0,
            })
            .unwrap()
            .unwrap();
        assert_eq!(host.text_of(node), Some("y"));
        assert!(!host.exists(old));

        let mut applier = Applier::new(&mut host);
        applier
            .apply(Mutation::TextReplace {
                parent: container,
                old: None,
                value: "tail",
                position: 5,
            })
            .unwrap();
        assert_eq!(host.snapshot(), "ytail");
    }

    #[test]
    fn test_move_repositions() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let a = host.create_element_node("a").unwrap();
        let b = host.create_element_node("b").unwrap();
        let c = host.create_element_node("c").unwrap();
        for node in [a, b, c] {
            host.append_child(container, node).unwrap();
        }

        let mut applier = Applier::new(&mut host);
        applier
            .apply(Mutation::Move {
                parent: container,
                node: c,
                to: 0,
            })
            .unwrap();
        assert_eq!(host.snapshot(), "<c></c><a></a><b></b>");
    }

    #[test]
    fn test_destroy_releases_handles() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let mut applier = Applier::new(&mut host);
        let tree = element("ul").child(element("li").child(text("x"))).build();
        let node = applier
            .apply(Mutation::Create {
                descriptor: &tree,
                parent: container,
                position: 0,
            })
            .unwrap()
            .unwrap();

        let mut applier = Applier::new(&mut host);
        applier
            .apply(Mutation::Destroy {
                parent: container,
                node,
            })
            .unwrap();
        assert!(!host.exists(node));
        assert_eq!(host.snapshot(), "");
    }

    #[test]
    fn test_update_attrs_applies_every_kind() {
        let mut host = MemoryHost::new();
        let container = host.container();
        let handler = EventHandler::new(|_| {});

        let mut applier = Applier::new(&mut host);
        let tree = element("button").build();
        let node = applier
            .apply(Mutation::Create {
                descriptor: &tree,
                parent: container,
                position: 0,
            })
            .unwrap()
            .unwrap();

        let mut applier = Applier::new(&mut host);
        applier
            .apply(Mutation::UpdateAttrs {
                node,
                patch: vec![
                    AttrOp::SetAttr {
                        name: "class",
                        value: "primary",
                    },
                    AttrOp::SetStyle {
                        property: "color",
                        value: "red",
                    },
                    AttrOp::Bind {
                        event: "click",
                        handler: &handler,
                    },
                ],
            })
            .unwrap();

        assert_eq!(host.attribute_of(node, "class"), Some("primary"));
        assert_eq!(host.style_of(node, "color"), Some("red"));
        assert_eq!(host.listener_count(node, "click"), 1);
    }
}
