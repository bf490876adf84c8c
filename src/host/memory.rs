//! In-memory reference host.
//!
//! [`MemoryHost`] backs the test suite and the demos: an arena of nodes
//! addressed by [`HostHandle`], with an op log of every mutation call so
//! tests can assert exact operation counts ("an idempotent pass makes zero
//! mutation calls"), an event dispatcher for exercising listener bindings,
//! and an HTML-like [`snapshot`](MemoryHost::snapshot) for end-to-end
//! assertions.
//!
//! Structural misuse (unknown handles, attributes on text nodes, malformed
//! tags) fails with a descriptive [`HostError`] rather than being papered
//! over.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{HostBackend, HostHandle};
use crate::error::HostError;
use crate::types::{Event, EventHandler, StyleMap};

// =============================================================================
// Op Log
// =============================================================================

/// One recorded mutation call. Read operations are not logged.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    CreateElement { tag: String },
    CreateText { value: String },
    AppendChild { parent: HostHandle, child: HostHandle },
    InsertBefore { parent: HostHandle, child: HostHandle },
    RemoveChild { parent: HostHandle, child: HostHandle },
    SetAttribute { name: String, value: String },
    RemoveAttribute { name: String },
    SetStyleProperty { name: String, value: String },
    RemoveStyleProperty { name: String },
    AddEventListener { event: String },
    RemoveEventListener { event: String },
    SetTextContent { value: String },
}

// =============================================================================
// Node storage
// =============================================================================

#[derive(Debug)]
enum NodeBody {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        styles: StyleMap,
        listeners: Vec<(String, EventHandler)>,
    },
    Text {
        value: String,
    },
}

#[derive(Debug)]
struct MemoryNode {
    body: NodeBody,
    parent: Option<HostHandle>,
    children: SmallVec<[HostHandle; 8]>,
}

// =============================================================================
// MemoryHost
// =============================================================================

/// Arena-backed host tree.
pub struct MemoryHost {
    nodes: FxHashMap<HostHandle, MemoryNode>,
    next_id: u64,
    container: HostHandle,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    /// Create a host with a single empty container node.
    pub fn new() -> Self {
        let container = HostHandle::from_raw(0);
        let mut nodes = FxHashMap::default();
        nodes.insert(
            container,
            MemoryNode {
                body: NodeBody::Element {
                    tag: "#container".to_string(),
                    attributes: BTreeMap::new(),
                    styles: StyleMap::new(),
                    listeners: Vec::new(),
                },
                parent: None,
                children: SmallVec::new(),
            },
        );
        Self {
            nodes,
            next_id: 1,
            container,
            ops: Vec::new(),
        }
    }

    /// The container handle reconciliation mounts under.
    #[inline]
    pub fn container(&self) -> HostHandle {
        self.container
    }

    /// Mutation calls recorded since the last [`clear_ops`](Self::clear_ops).
    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    /// Number of recorded mutation calls.
    pub fn op_count(&self) -> usize {
        self.ops.len()
    }

    /// Forget the op log (typically between passes).
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Whether a handle names a live node.
    pub fn exists(&self, handle: HostHandle) -> bool {
        self.nodes.contains_key(&handle)
    }

    /// Number of live nodes, container included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Tag of an element node.
    pub fn tag_of(&self, handle: HostHandle) -> Option<&str> {
        match &self.nodes.get(&handle)?.body {
            NodeBody::Element { tag, .. } => Some(tag),
            NodeBody::Text { .. } => None,
        }
    }

    /// Value of a text node.
    pub fn text_of(&self, handle: HostHandle) -> Option<&str> {
        match &self.nodes.get(&handle)?.body {
            NodeBody::Element { .. } => None,
            NodeBody::Text { value } => Some(value),
        }
    }

    /// Current value of a string attribute.
    pub fn attribute_of(&self, handle: HostHandle, name: &str) -> Option<&str> {
        match &self.nodes.get(&handle)?.body {
            NodeBody::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeBody::Text { .. } => None,
        }
    }

    /// Current value of one style property.
    pub fn style_of(&self, handle: HostHandle, property: &str) -> Option<&str> {
        match &self.nodes.get(&handle)?.body {
            NodeBody::Element { styles, .. } => styles.get(property).map(String::as_str),
            NodeBody::Text { .. } => None,
        }
    }

    /// Number of listeners bound for an event name.
    pub fn listener_count(&self, handle: HostHandle, event: &str) -> usize {
        match self.nodes.get(&handle).map(|n| &n.body) {
            Some(NodeBody::Element { listeners, .. }) => {
                listeners.iter().filter(|(name, _)| name == event).count()
            }
            _ => 0,
        }
    }

    /// Fire an event at a node, invoking every listener bound under `name`.
    /// Returns how many handlers ran.
    pub fn dispatch(&self, target: HostHandle, name: &str) -> usize {
        let Some(NodeBody::Element { listeners, .. }) = self.nodes.get(&target).map(|n| &n.body)
        else {
            return 0;
        };
        let event = Event {
            name: name.to_string(),
            target,
        };
        let mut fired = 0;
        for (bound, handler) in listeners {
            if bound == name {
                handler.call(&event);
                fired += 1;
            }
        }
        fired
    }

    /// Serialize the container's content as an HTML-like string.
    ///
    /// Attributes and style properties print in sorted order, so snapshots
    /// compare stably.
    pub fn snapshot(&self) -> String {
        let mut out = String::new();
        for child in &self.node(self.container).children {
            self.write_node(*child, &mut out);
        }
        out
    }

    /// Serialize one subtree.
    pub fn snapshot_of(&self, handle: HostHandle) -> String {
        let mut out = String::new();
        self.write_node(handle, &mut out);
        out
    }

    fn write_node(&self, handle: HostHandle, out: &mut String) {
        let Some(node) = self.nodes.get(&handle) else {
            return;
        };
        match &node.body {
            NodeBody::Text { value } => out.push_str(value),
            NodeBody::Element {
                tag,
                attributes,
                styles,
                ..
            } => {
                let _ = write!(out, "<{tag}");
                for (name, value) in attributes {
                    if value.is_empty() {
                        let _ = write!(out, " {name}");
                    } else {
                        let _ = write!(out, " {name}=\"{value}\"");
                    }
                }
                if !styles.is_empty() {
                    out.push_str(" style=\"");
                    for (i, (prop, value)) in styles.iter().enumerate() {
                        if i > 0 {
                            out.push(' ');
                        }
                        let _ = write!(out, "{prop}:{value};");
                    }
                    out.push('"');
                }
                out.push('>');
                for child in &node.children {
                    self.write_node(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn node(&self, handle: HostHandle) -> &MemoryNode {
        &self.nodes[&handle]
    }

    fn get(&self, handle: HostHandle) -> Result<&MemoryNode, HostError> {
        self.nodes
            .get(&handle)
            .ok_or(HostError::UnknownHandle(handle))
    }

    fn get_mut(&mut self, handle: HostHandle) -> Result<&mut MemoryNode, HostError> {
        self.nodes
            .get_mut(&handle)
            .ok_or(HostError::UnknownHandle(handle))
    }

    fn alloc(&mut self, body: NodeBody) -> HostHandle {
        let handle = HostHandle::from_raw(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            handle,
            MemoryNode {
                body,
                parent: None,
                children: SmallVec::new(),
            },
        );
        handle
    }

    /// Pull a node out of its current parent's child list, if attached.
    /// The node itself stays alive.
    fn detach(&mut self, child: HostHandle) {
        let Some(parent) = self.nodes.get(&child).and_then(|n| n.parent) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|c| *c != child);
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = None;
        }
    }

    /// Free a subtree, releasing every handle in it.
    fn free_subtree(&mut self, handle: HostHandle) {
        if let Some(node) = self.nodes.remove(&handle) {
            for child in node.children {
                self.free_subtree(child);
            }
        }
    }

    fn validate_tag(tag: &str) -> Result<(), HostError> {
        let mut chars = tag.chars();
        let valid = match chars.next() {
            Some(first) => {
                first.is_ascii_alphabetic()
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
            }
            None => false,
        };
        if valid {
            Ok(())
        } else {
            Err(HostError::UnsupportedTag {
                tag: tag.to_string(),
            })
        }
    }

    fn validate_attr_name(name: &str) -> Result<(), HostError> {
        if name.is_empty() {
            return Err(HostError::AttributeRejected {
                name: name.to_string(),
                reason: "empty name".to_string(),
            });
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || c == '=' || c == '"' || c == '<' || c == '>')
        {
            return Err(HostError::AttributeRejected {
                name: name.to_string(),
                reason: "invalid character in name".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBackend for MemoryHost {
    fn create_element_node(&mut self, tag: &str) -> Result<HostHandle, HostError> {
        Self::validate_tag(tag)?;
        self.ops.push(HostOp::CreateElement {
            tag: tag.to_string(),
        });
        Ok(self.alloc(NodeBody::Element {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            styles: StyleMap::new(),
            listeners: Vec::new(),
        }))
    }

    fn create_text_node(&mut self, value: &str) -> Result<HostHandle, HostError> {
        self.ops.push(HostOp::CreateText {
            value: value.to_string(),
        });
        Ok(self.alloc(NodeBody::Text {
            value: value.to_string(),
        }))
    }

    fn append_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        self.get(parent)?;
        self.get(child)?;
        self.ops.push(HostOp::AppendChild { parent, child });
        self.detach(child);
        self.get_mut(parent)?.children.push(child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn insert_before(
        &mut self,
        parent: HostHandle,
        child: HostHandle,
        reference: Option<HostHandle>,
    ) -> Result<(), HostError> {
        self.get(parent)?;
        self.get(child)?;
        if reference == Some(child) {
            // Inserting a node before itself leaves the tree as it is.
            return Ok(());
        }
        if let Some(reference) = reference {
            // Validate before detaching so a failed call mutates nothing.
            if self.nodes.get(&reference).and_then(|n| n.parent) != Some(parent) {
                return Err(HostError::NotAChild {
                    parent,
                    child: reference,
                });
            }
        }
        self.ops.push(HostOp::InsertBefore { parent, child });
        // Detach first so the reference index is computed against the list
        // the child is no longer part of.
        self.detach(child);
        let parent_node = self.get_mut(parent)?;
        let index = match reference {
            None => parent_node.children.len(),
            Some(reference) => parent_node
                .children
                .iter()
                .position(|c| *c == reference)
                .ok_or(HostError::NotAChild {
                    parent,
                    child: reference,
                })?,
        };
        parent_node.children.insert(index, child);
        self.get_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: HostHandle, child: HostHandle) -> Result<(), HostError> {
        self.get(parent)?;
        if self.get(child)?.parent != Some(parent) {
            return Err(HostError::NotAChild { parent, child });
        }
        self.ops.push(HostOp::RemoveChild { parent, child });
        self.detach(child);
        self.free_subtree(child);
        Ok(())
    }

    fn set_attribute(
        &mut self,
        node: HostHandle,
        name: &str,
        value: &str,
    ) -> Result<(), HostError> {
        Self::validate_attr_name(name)?;
        match &mut self.get_mut(node)?.body {
            NodeBody::Element { attributes, .. } => {
                attributes.insert(name.to_string(), value.to_string());
            }
            NodeBody::Text { .. } => return Err(HostError::NotAnElement(node)),
        }
        self.ops.push(HostOp::SetAttribute {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: HostHandle, name: &str) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.body {
            NodeBody::Element { attributes, .. } => {
                attributes.remove(name);
            }
            NodeBody::Text { .. } => return Err(HostError::NotAnElement(node)),
        }
        self.ops.push(HostOp::RemoveAttribute {
            name: name.to_string(),
        });
        Ok(())
    }

    fn set_style_property(
        &mut self,
        node: HostHandle,
        name: &str,
        value: &str,
    ) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.body {
            NodeBody::Element { styles, .. } => {
                styles.insert(name.to_string(), value.to_string());
            }
            NodeBody::Text { .. } => return Err(HostError::NotAnElement(node)),
        }
        self.ops.push(HostOp::SetStyleProperty {
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_style_property(&mut self, node: HostHandle, name: &str) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.body {
            NodeBody::Element { styles, .. } => {
                styles.remove(name);
            }
            NodeBody::Text { .. } => return Err(HostError::NotAnElement(node)),
        }
        self.ops.push(HostOp::RemoveStyleProperty {
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_event_listener(
        &mut self,
        node: HostHandle,
        name: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.body {
            NodeBody::Element { listeners, .. } => {
                listeners.push((name.to_string(), handler.clone()));
            }
            NodeBody::Text { .. } => return Err(HostError::NotAnElement(node)),
        }
        self.ops.push(HostOp::AddEventListener {
            event: name.to_string(),
        });
        Ok(())
    }

    fn remove_event_listener(
        &mut self,
        node: HostHandle,
        name: &str,
        handler: &EventHandler,
    ) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.body {
            NodeBody::Element { listeners, .. } => {
                if let Some(index) = listeners
                    .iter()
                    .position(|(bound, h)| bound == name && h == handler)
                {
                    listeners.remove(index);
                }
            }
            NodeBody::Text { .. } => return Err(HostError::NotAnElement(node)),
        }
        self.ops.push(HostOp::RemoveEventListener {
            event: name.to_string(),
        });
        Ok(())
    }

    fn set_text_content(&mut self, node: HostHandle, value: &str) -> Result<(), HostError> {
        match &mut self.get_mut(node)?.body {
            NodeBody::Element { .. } => return Err(HostError::NotAText(node)),
            NodeBody::Text { value: current } => {
                *current = value.to_string();
            }
        }
        self.ops.push(HostOp::SetTextContent {
            value: value.to_string(),
        });
        Ok(())
    }

    fn child_nodes(&self, parent: HostHandle) -> SmallVec<[HostHandle; 8]> {
        self.nodes
            .get(&parent)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn child_position(&self, parent: HostHandle, child: HostHandle) -> Option<usize> {
        self.nodes
            .get(&parent)?
            .children
            .iter()
            .position(|c| *c == child)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_append() {
        let mut host = MemoryHost::new();
        let div = host.create_element_node("div").unwrap();
        let hello = host.create_text_node("hello").unwrap();
        host.append_child(div, hello).unwrap();
        host.append_child(host.container(), div).unwrap();

        assert_eq!(host.tag_of(div), Some("div"));
        assert_eq!(host.text_of(hello), Some("hello"));
        assert_eq!(host.snapshot(), "<div>hello</div>");
        assert_eq!(host.child_position(div, hello), Some(0));
    }

    #[test]
    fn test_unsupported_tag_fails() {
        let mut host = MemoryHost::new();
        assert_eq!(
            host.create_element_node(""),
            Err(HostError::UnsupportedTag {
                tag: String::new()
            })
        );
        assert!(host.create_element_node("1bad").is_err());
        assert!(host.create_element_node("no spaces").is_err());
        assert!(host.create_element_node("custom-tag_2").is_ok());
    }

    #[test]
    fn test_attribute_rejection() {
        let mut host = MemoryHost::new();
        let div = host.create_element_node("div").unwrap();
        assert!(matches!(
            host.set_attribute(div, "bad name", "x"),
            Err(HostError::AttributeRejected { .. })
        ));
        assert!(host.set_attribute(div, "class", "ok").is_ok());
    }

    #[test]
    fn test_attribute_on_text_node_fails() {
        let mut host = MemoryHost::new();
        let leaf = host.create_text_node("x").unwrap();
        assert_eq!(
            host.set_attribute(leaf, "class", "y"),
            Err(HostError::NotAnElement(leaf))
        );
    }

    #[test]
    fn test_insert_before_repositions() {
        let mut host = MemoryHost::new();
        let ul = host.create_element_node("ul").unwrap();
        let a = host.create_element_node("li").unwrap();
        let b = host.create_element_node("li").unwrap();
        let c = host.create_element_node("li").unwrap();
        for li in [a, b, c] {
            host.append_child(ul, li).unwrap();
        }

        // Move c to the front.
        host.insert_before(ul, c, Some(a)).unwrap();
        assert_eq!(host.child_nodes(ul).as_slice(), &[c, a, b]);

        // Move a to the end.
        host.insert_before(ul, a, None).unwrap();
        assert_eq!(host.child_nodes(ul).as_slice(), &[c, b, a]);
    }

    #[test]
    fn test_insert_before_unknown_reference_fails() {
        let mut host = MemoryHost::new();
        let ul = host.create_element_node("ul").unwrap();
        let li = host.create_element_node("li").unwrap();
        let stranger = host.create_element_node("li").unwrap();
        assert_eq!(
            host.insert_before(ul, li, Some(stranger)),
            Err(HostError::NotAChild {
                parent: ul,
                child: stranger
            })
        );
    }

    #[test]
    fn test_remove_child_frees_subtree() {
        let mut host = MemoryHost::new();
        let div = host.create_element_node("div").unwrap();
        let span = host.create_element_node("span").unwrap();
        let leaf = host.create_text_node("x").unwrap();
        host.append_child(span, leaf).unwrap();
        host.append_child(div, span).unwrap();
        host.append_child(host.container(), div).unwrap();

        host.remove_child(host.container(), div).unwrap();
        assert!(!host.exists(div));
        assert!(!host.exists(span));
        assert!(!host.exists(leaf));
        assert_eq!(host.snapshot(), "");
    }

    #[test]
    fn test_styles_merge_per_property() {
        let mut host = MemoryHost::new();
        let div = host.create_element_node("div").unwrap();
        host.set_style_property(div, "color", "red").unwrap();
        host.set_style_property(div, "width", "10px").unwrap();
        host.set_style_property(div, "color", "blue").unwrap();
        host.remove_style_property(div, "width").unwrap();

        assert_eq!(host.style_of(div, "color"), Some("blue"));
        assert_eq!(host.style_of(div, "width"), None);
    }

    #[test]
    fn test_listener_bind_unbind_dispatch() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut host = MemoryHost::new();
        let button = host.create_element_node("button").unwrap();

        let clicks = Rc::new(Cell::new(0u32));
        let clicks_clone = clicks.clone();
        let handler = EventHandler::new(move |_| clicks_clone.set(clicks_clone.get() + 1));

        host.add_event_listener(button, "click", &handler).unwrap();
        assert_eq!(host.listener_count(button, "click"), 1);
        assert_eq!(host.dispatch(button, "click"), 1);
        assert_eq!(clicks.get(), 1);

        // Unrelated event name fires nothing.
        assert_eq!(host.dispatch(button, "keydown"), 0);

        host.remove_event_listener(button, "click", &handler)
            .unwrap();
        assert_eq!(host.listener_count(button, "click"), 0);
        assert_eq!(host.dispatch(button, "click"), 0);
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_set_text_content() {
        let mut host = MemoryHost::new();
        let leaf = host.create_text_node("before").unwrap();
        host.set_text_content(leaf, "after").unwrap();
        assert_eq!(host.text_of(leaf), Some("after"));

        let div = host.create_element_node("div").unwrap();
        assert_eq!(
            host.set_text_content(div, "x"),
            Err(HostError::NotAText(div))
        );
    }

    #[test]
    fn test_op_log_counts_mutations_only() {
        let mut host = MemoryHost::new();
        let div = host.create_element_node("div").unwrap();
        host.append_child(host.container(), div).unwrap();
        assert_eq!(host.op_count(), 2);

        // Reads leave no trace.
        let _ = host.child_nodes(host.container());
        let _ = host.child_position(host.container(), div);
        let _ = host.snapshot();
        assert_eq!(host.op_count(), 2);

        host.clear_ops();
        assert_eq!(host.op_count(), 0);
    }

    #[test]
    fn test_snapshot_attributes_and_flags() {
        let mut host = MemoryHost::new();
        let input = host.create_element_node("input").unwrap();
        host.set_attribute(input, "type", "text").unwrap();
        host.set_attribute(input, "disabled", "").unwrap();
        host.append_child(host.container(), input).unwrap();

        assert_eq!(host.snapshot(), "<input disabled type=\"text\"></input>");
    }
}
