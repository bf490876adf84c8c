//! Core types for arbor.
//!
//! These types define the foundation that everything builds on.
//! They flow through the reconciler and define what the host applier understands.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::host::HostHandle;

// =============================================================================
// Style Map
// =============================================================================

/// Style properties as an ordered map of `property -> value`.
///
/// Ordered so that diffing two style maps visits properties deterministically.
/// Style maps are always merged property-by-property during reconciliation,
/// never replaced wholesale.
pub type StyleMap = BTreeMap<String, String>;

// =============================================================================
// Events
// =============================================================================

/// An event delivered to a bound handler.
///
/// The host constructs these when dispatching; the reconciler never does.
#[derive(Debug, Clone)]
pub struct Event {
    /// Event name as it was bound ("click", "input", ...).
    pub name: String,
    /// Host node the event fired on.
    pub target: HostHandle,
}

/// A reference to an event handler function.
///
/// Handlers are compared by identity (`Rc::ptr_eq`), not by value: passing
/// the same `EventHandler` clone across passes means "unchanged" and the
/// listener registration is left alone. A freshly created handler - even one
/// with an identical body - compares unequal and is rebound.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&Event)>);

impl EventHandler {
    /// Wrap a function as a handler reference.
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the handler.
    pub fn call(&self, event: &Event) {
        (self.0)(event)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0))
    }
}

// =============================================================================
// Attribute Values
// =============================================================================

/// A single attribute value, tagged by kind.
///
/// The attribute differ branches exhaustively on this - there is no untyped
/// props bag. Each kind has its own application semantics:
///
/// - [`AttrValue::Text`] writes through `set_attribute`
/// - [`AttrValue::Flag`] is presence-based: `true` sets an empty attribute,
///   `false` is equivalent to the attribute being absent
/// - [`AttrValue::Style`] merges into the host's style representation one
///   property at a time
/// - [`AttrValue::Handler`] binds/unbinds a listener registration and is
///   never written as a string value
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// Plain string attribute.
    Text(String),
    /// Boolean attribute (present/absent semantics).
    Flag(bool),
    /// Style map, merged per property.
    Style(StyleMap),
    /// Event handler reference.
    Handler(EventHandler),
}

impl AttrValue {
    /// Check whether this value means "attribute absent".
    ///
    /// Only `Flag(false)` qualifies; everything else renders something.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Flag(false))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<EventHandler> for AttrValue {
    fn from(handler: EventHandler) -> Self {
        Self::Handler(handler)
    }
}

// =============================================================================
// Node Kind
// =============================================================================

/// Kind of a descriptor or host node.
///
/// Part of the fallback identity key so a text leaf and an element at the
/// same sibling position never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeKind {
    Element = 0,
    Text = 1,
}

// =============================================================================
// Change Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Which decision classes a reconciliation pass applied.
    ///
    /// Accumulated by the [`Reconciler`](crate::reconcile::Reconciler) as it
    /// walks; an empty set means the pass touched nothing on the host.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ChangeFlags: u8 {
        const NONE = 0;
        /// A subtree was mounted.
        const CREATE = 1 << 0;
        /// A subtree was destroyed.
        const DESTROY = 1 << 1;
        /// A subtree was replaced (destroy + create at one position).
        const REPLACE = 1 << 2;
        /// An element's attributes were patched.
        const UPDATE_ATTRS = 1 << 3;
        /// A text leaf was swapped for a new value.
        const TEXT_REPLACE = 1 << 4;
        /// A keyed child was repositioned.
        const MOVE = 1 << 5;
    }
}

impl ChangeFlags {
    /// True if the pass applied any mutation at all.
    #[inline]
    pub fn any(self) -> bool {
        !self.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
