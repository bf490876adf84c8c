//! Descriptor model - immutable declarative description of one UI pass.
//!
//! A [`Descriptor`] tree is built fresh for every render pass, handed to the
//! reconciler, and discarded. It owns no host resources; host nodes are
//! correlated across passes purely through [`IdentityKey`]s.
//!
//! # Example
//!
//! ```
//! use arbor::descriptor::{element, text};
//!
//! let tree = element("ul")
//!     .child(element("li").key("1").child(text("Duke")))
//!     .child(element("li").key("2").child(text("Villanova")))
//!     .build();
//!
//! assert_eq!(tree.as_element().unwrap().children.len(), 2);
//! ```

use std::collections::BTreeMap;

use crate::types::{AttrValue, EventHandler, NodeKind, StyleMap};

// =============================================================================
// Descriptor
// =============================================================================

/// One node of a declarative UI description: element or text leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    /// An element with a tag, attributes and ordered children.
    Element(ElementDescriptor),
    /// A text leaf.
    Text(String),
}

/// The element variant's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDescriptor {
    /// Host tag name ("div", "li", ...). Which tags are supported is the
    /// host's decision; an unsupported tag fails loudly at mount time.
    pub tag: String,
    /// Explicit identity key, if the caller assigned one.
    pub key: Option<String>,
    /// Attributes by name. Ordered map so diff output is deterministic.
    pub attributes: BTreeMap<String, AttrValue>,
    /// Ordered child descriptors.
    pub children: Vec<Descriptor>,
}

impl Descriptor {
    /// Node kind discriminant.
    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Element(_) => NodeKind::Element,
            Self::Text(_) => NodeKind::Text,
        }
    }

    /// True for text leaves.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// The element payload, if this is an element.
    pub fn as_element(&self) -> Option<&ElementDescriptor> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) => None,
        }
    }

    /// The text value, if this is a text leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Element(_) => None,
            Self::Text(value) => Some(value),
        }
    }

    /// Identity key of this node when it sits at `index` among its siblings.
    ///
    /// Explicit keys win; otherwise the key falls back to `(kind, index)`.
    /// Fallback keys are NOT stable across sibling insertion or removal -
    /// an unkeyed child that shifts position is treated as a different node.
    /// This is an intentional limitation of positional matching, traded for
    /// the two-pass O(n) child walk.
    pub fn identity_key(&self, index: usize) -> IdentityKey {
        match self {
            Self::Element(el) => match &el.key {
                Some(key) => IdentityKey::Explicit(key.clone()),
                None => IdentityKey::Position {
                    kind: NodeKind::Element,
                    index,
                },
            },
            Self::Text(_) => IdentityKey::Position {
                kind: NodeKind::Text,
                index,
            },
        }
    }
}

// =============================================================================
// Identity Key
// =============================================================================

/// Value correlating a child descriptor across two passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    /// Caller-assigned key; stable under reordering.
    Explicit(String),
    /// Positional fallback; unstable under insertion/removal.
    Position { kind: NodeKind, index: usize },
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(key) => write!(f, "\"{key}\""),
            Self::Position { kind, index } => write!(f, "{kind:?}@{index}"),
        }
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Start building an element descriptor.
pub fn element(tag: impl Into<String>) -> ElementBuilder {
    ElementBuilder {
        tag: tag.into(),
        key: None,
        attributes: BTreeMap::new(),
        children: Vec::new(),
    }
}

/// Build a text leaf.
pub fn text(value: impl Into<String>) -> Descriptor {
    Descriptor::Text(value.into())
}

/// Chainable builder returned by [`element`].
#[derive(Debug, Clone)]
pub struct ElementBuilder {
    tag: String,
    key: Option<String>,
    attributes: BTreeMap<String, AttrValue>,
    children: Vec<Descriptor>,
}

impl ElementBuilder {
    /// Assign an explicit identity key.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set an attribute of any kind.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Merge one property into the element's style map.
    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        let entry = self
            .attributes
            .entry("style".to_string())
            .or_insert_with(|| AttrValue::Style(StyleMap::new()));
        if let AttrValue::Style(map) = entry {
            map.insert(property.into(), value.into());
        } else {
            // A non-style value was previously set under "style"; replace it.
            let mut map = StyleMap::new();
            map.insert(property.into(), value.into());
            *entry = AttrValue::Style(map);
        }
        self
    }

    /// Bind an event handler under the event's name.
    pub fn on(mut self, event: impl Into<String>, handler: EventHandler) -> Self {
        self.attributes.insert(event.into(), AttrValue::Handler(handler));
        self
    }

    /// Append one child.
    pub fn child(mut self, child: impl Into<Descriptor>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append children from an iterator.
    pub fn children<I, D>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<Descriptor>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Finish building.
    pub fn build(self) -> Descriptor {
        Descriptor::Element(ElementDescriptor {
            tag: self.tag,
            key: self.key,
            attributes: self.attributes,
            children: self.children,
        })
    }
}

impl From<ElementBuilder> for Descriptor {
    fn from(builder: ElementBuilder) -> Self {
        builder.build()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let tree = element("div")
            .key("root")
            .attr("class", "panel")
            .attr("disabled", true)
            .child(text("hello"))
            .build();

        let el = tree.as_element().unwrap();
        assert_eq!(el.tag, "div");
        assert_eq!(el.key.as_deref(), Some("root"));
        assert_eq!(
            el.attributes.get("class"),
            Some(&AttrValue::Text("panel".to_string()))
        );
        assert_eq!(el.attributes.get("disabled"), Some(&AttrValue::Flag(true)));
        assert_eq!(el.children.len(), 1);
        assert_eq!(el.children[0].as_text(), Some("hello"));
    }

    #[test]
    fn test_builder_style_merges() {
        let tree = element("div")
            .style("color", "red")
            .style("width", "10px")
            .build();

        let el = tree.as_element().unwrap();
        let Some(AttrValue::Style(map)) = el.attributes.get("style") else {
            panic!("expected style map");
        };
        assert_eq!(map.get("color").map(String::as_str), Some("red"));
        assert_eq!(map.get("width").map(String::as_str), Some("10px"));
    }

    #[test]
    fn test_builder_child_accepts_builders() {
        // .child() takes both finished descriptors and builders.
        let tree = element("ul")
            .child(element("li").key("a"))
            .child(text("tail"))
            .build();
        assert_eq!(tree.as_element().unwrap().children.len(), 2);
    }

    // =========================================================================
    // Identity key derivation
    // =========================================================================

    #[test]
    fn test_explicit_key_wins() {
        let keyed = element("li").key("a").build();
        assert_eq!(
            keyed.identity_key(3),
            IdentityKey::Explicit("a".to_string())
        );
    }

    #[test]
    fn test_fallback_key_uses_position() {
        let unkeyed = element("li").build();
        assert_eq!(
            unkeyed.identity_key(3),
            IdentityKey::Position {
                kind: NodeKind::Element,
                index: 3
            }
        );
        // Different position, different key: positional keys are unstable
        // under insertion/removal by design.
        assert_ne!(unkeyed.identity_key(3), unkeyed.identity_key(4));
    }

    #[test]
    fn test_fallback_key_discriminates_kind() {
        // A text leaf and an element at the same index must not collide.
        let el = element("li").build();
        let leaf = text("x");
        assert_ne!(el.identity_key(0), leaf.identity_key(0));
    }
}
