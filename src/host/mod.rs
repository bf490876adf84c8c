//! Host environment surface.
//!
//! The host owns the live, mutable tree that descriptor trees are projected
//! onto. The reconciler never touches it directly: the mutation half of
//! [`HostBackend`] is reached only through the
//! [`Applier`](crate::apply::Applier), and the read half exists because the
//! core retains no state between passes - sibling positions are looked up
//! live.
//!
//! Ownership contract: the host exclusively creates and destroys the nodes
//! behind [`HostHandle`]s. The reconciler only threads handles through; a
//! handle stays valid across passes while some descriptor still claims it,
//! and is freed exactly when `remove_child` detaches its subtree.

use smallvec::SmallVec;

use crate::error::HostError;
use crate::types::EventHandler;

pub mod memory;

pub use memory::{HostOp, MemoryHost};

// =============================================================================
// Host Handle
// =============================================================================

/// Opaque reference to a node owned by the host environment.
///
/// Cheap to copy and compare; reveals nothing about the node. Identity
/// preservation across passes is observable as handle equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostHandle(u64);

impl HostHandle {
    /// Construct from a raw id. For host implementations only - the
    /// reconciler never mints handles.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

// =============================================================================
// Host Backend
// =============================================================================

/// Primitive tree operations a host environment must expose.
///
/// Mutation methods are fallible; a failure propagates out of the pass and
/// whatever was already applied stays applied. `insert_before` with
/// `reference: None` means "append at end of parent"; the applier guarantees
/// any non-`None` reference names an already-existing sibling.
pub trait HostBackend {
    /// Create a detached element node.
    fn create_element_node(&mut self, tag: &str) -> Result<HostHandle, HostError>;

    /// Create a detached text node.
    fn create_text_node(&mut self, value: &str) -> Result<HostHandle, HostError>;

    /// Append `child` at the end of `parent`'s child list. A child already
    /// attached elsewhere is detached from its old position first.
    fn append_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError>;

    /// Insert `child` before `reference` (or at the end when `None`),
    /// repositioning it if it is already attached.
    fn insert_before(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        reference: Option<HostHandle>,
    ) -> Result<(), HostError>;

    /// Detach `child` from `parent` and destroy its subtree, releasing every
    /// handle in it.
    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError>;

    /// Write a string attribute.
    fn set_attribute(&mut self, node: HostHandle, name: &str, value: &str)
    -> Result<(), HostError>;

    /// Remove a string attribute. Removing an absent attribute is a no-op.
    fn remove_attribute(&mut self, node: HostHandle, name: &str) -> Result<(), HostError>;

    /// Merge one property into the node's style representation.
    fn set_style_property(
        &mut self,
        node: HostHandle,
        name: &str,
        value: &str,
    ) -> Result<(), HostError>;

    /// Remove one property from the node's style representation.
    fn remove_style_property(&mut self, node: HostHandle, name: &str) -> Result<(), HostError>;

    /// Register a listener. Listener identity matters: the same name may be
    /// bound again with a different handler after the old one is removed.
    fn add_event_listener(
        &mut self,
        node: HostHandle,
        name: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Unregister a listener previously bound with this exact handler.
    fn remove_event_listener(
        &mut self,
        node: HostHandle,
        name: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError>;

    /// Replace a text node's content in place.
    fn set_text_content(&mut self, node: HostHandle, value: &str) -> Result<(), HostError>;

    // =========================================================================
    // Read half - no side effects
    // =========================================================================

    /// Current children of `parent`, in order. Empty for unknown handles
    /// and text nodes.
    fn child_nodes(&self, parent: HostHandle) -> SmallVec<[HostHandle; 8]>;

    /// Position of `child` among `parent`'s children, if attached there.
    fn child_position(&self, parent: HostHandle, child: HostHandle) -> Option<usize>;
}
