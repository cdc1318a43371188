//! sift-test: Test document tree for sift
//!
//! Provides [`TestDocument`], a small arena tree implementing
//! [`sift::Document`], so engine behavior can be exercised without a real DOM.
//! With the `fixtures` feature it also loads trees from YAML and runs the
//! conformance fixtures under `conformance/`.
//!
//! # Example
//!
//! ```
//! use sift::Document;
//! use sift_test::TestDocument;
//!
//! let mut doc = TestDocument::new();
//! let root = doc.root();
//! let size = doc.element(root, "select")
//!     .attr("data-filter-prefix", "size")
//!     .value("m")
//!     .id();
//!
//! assert_eq!(doc.attribute(&size, "data-filter-prefix"), Some("size"));
//! assert_eq!(doc.control_value(&size), "m");
//! assert_eq!(doc.descendants(&root), vec![size]);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use sift::Document;

#[cfg(feature = "fixtures")]
pub mod tree;

/// Attribute holding an element's fixture identifier.
pub const ID_ATTRIBUTE: &str = "id";

/// Handle to an element of a [`TestDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    value: String,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            value: String::new(),
            children: Vec::new(),
        }
    }
}

/// Arena-backed element tree with a single root.
#[derive(Debug, Clone)]
pub struct TestDocument {
    nodes: Vec<Node>,
}

impl TestDocument {
    /// Create a document holding only its root element.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("root")],
        }
    }

    /// The root element.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append a `tag` element under `parent` (builder pattern).
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this document.
    pub fn element(&mut self, parent: NodeId, tag: impl Into<String>) -> ElementBuilder<'_> {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(tag));
        self.nodes[parent.0].children.push(id);
        ElementBuilder { doc: self, id }
    }

    /// Set the current value of a control.
    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.value = value.into();
        }
    }

    /// Set or replace an attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.attributes.insert(name.into(), value.into());
        }
    }

    /// Remove an attribute, returning its old value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.nodes.get_mut(id.0)?.attributes.remove(name)
    }

    /// Tag name of `id`.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id.0).map(|node| node.tag.as_str())
    }

    /// First element (in document order) whose `id` attribute is `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.descendants(&self.root())
            .into_iter()
            .find(|id| self.attribute(id, ID_ATTRIBUTE) == Some(name))
    }

    /// Human-readable label: the `id` attribute, or `tag#index`.
    #[must_use]
    pub fn label(&self, id: NodeId) -> String {
        match self.nodes.get(id.0) {
            Some(node) => node
                .attributes
                .get(ID_ATTRIBUTE)
                .cloned()
                .unwrap_or_else(|| format!("{}{id}", node.tag)),
            None => id.to_string(),
        }
    }

    /// Labels of `ids`, in the given order.
    #[must_use]
    pub fn labels(&self, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|id| self.label(*id)).collect()
    }

    fn walk(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[id.0].children {
            out.push(*child);
            self.walk(*child, out);
        }
    }
}

impl Default for TestDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for TestDocument {
    type Element = NodeId;

    fn descendants(&self, root: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if root.0 < self.nodes.len() {
            self.walk(*root, &mut out);
        }
        out
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(element.0)?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    fn control_value(&self, element: &NodeId) -> String {
        self.nodes
            .get(element.0)
            .map(|node| node.value.clone())
            .unwrap_or_default()
    }
}

/// Builder returned by [`TestDocument::element`].
#[derive(Debug)]
pub struct ElementBuilder<'a> {
    doc: &'a mut TestDocument,
    id: NodeId,
}

impl ElementBuilder<'_> {
    /// Set an attribute.
    #[must_use]
    pub fn attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.doc.set_attribute(self.id, name, value);
        self
    }

    /// Set the control value.
    #[must_use]
    pub fn value(self, value: impl Into<String>) -> Self {
        self.doc.set_value(self.id, value);
        self
    }

    /// Finish and return the new element.
    #[must_use]
    pub fn id(self) -> NodeId {
        self.id
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{NodeId, TestDocument};
    pub use sift::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_attributes_and_value() {
        let mut doc = TestDocument::new();
        let root = doc.root();
        let input = doc
            .element(root, "input")
            .attr("data-filter-prefix", "color")
            .attr(ID_ATTRIBUTE, "color-picker")
            .value("red")
            .id();

        assert_eq!(doc.tag(input), Some("input"));
        assert_eq!(doc.attribute(&input, "data-filter-prefix"), Some("color"));
        assert_eq!(doc.control_value(&input), "red");
        assert_eq!(doc.find("color-picker"), Some(input));
        assert_eq!(doc.label(input), "color-picker");
    }

    #[test]
    fn descendants_are_pre_order() {
        let mut doc = TestDocument::new();
        let root = doc.root();
        let list = doc.element(root, "ul").id();
        let after = doc.element(root, "p").id();
        let first = doc.element(list, "li").id();
        let second = doc.element(list, "li").id();

        assert_eq!(doc.descendants(&root), vec![list, first, second, after]);
        assert_eq!(doc.descendants(&list), vec![first, second]);
        assert!(doc.descendants(&after).is_empty());
    }

    #[test]
    fn query_attribute_uses_default_scan() {
        let mut doc = TestDocument::new();
        let root = doc.root();
        let tagged = doc.element(root, "div").attr("data-filter-size", "m").id();
        let _ = doc.element(root, "div").attr("data-other", "x").id();

        assert_eq!(doc.query_attribute(&root, "data-filter-size"), vec![tagged]);
    }

    #[test]
    fn attribute_edits() {
        let mut doc = TestDocument::new();
        let root = doc.root();
        let el = doc.element(root, "div").id();

        doc.set_attribute(el, "data-filter-color", "red");
        assert_eq!(doc.attribute(&el, "data-filter-color"), Some("red"));
        assert_eq!(doc.remove_attribute(el, "data-filter-color").as_deref(), Some("red"));
        assert_eq!(doc.attribute(&el, "data-filter-color"), None);
    }

    #[test]
    fn unknown_handles_are_harmless() {
        let doc = TestDocument::new();
        let ghost = NodeId(99);
        assert!(doc.descendants(&ghost).is_empty());
        assert_eq!(doc.attribute(&ghost, "id"), None);
        assert_eq!(doc.control_value(&ghost), "");
        assert_eq!(doc.label(ghost), "#99");
    }

    #[test]
    fn label_falls_back_to_tag_and_index() {
        let mut doc = TestDocument::new();
        let root = doc.root();
        let el = doc.element(root, "div").id();
        assert_eq!(doc.label(el), "div#1");
    }
}
