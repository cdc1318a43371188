//! `Document` - Read-only access to a DOM-like tree
//!
//! The engine never owns or mutates the tree it filters. Hosts implement
//! [`Document`] over whatever tree they already have (a browser DOM binding,
//! a parsed HTML tree, an arena in tests) and hand element handles back and
//! forth.

use std::fmt::Debug;
use std::hash::Hash;

/// Read-only view of a document tree.
///
/// # Element handles
///
/// [`Element`](Self::Element) is an opaque handle: cheap to clone, comparable,
/// hashable. Results are reported as handles, so the host can map them back to
/// its own nodes.
///
/// # Example
///
/// ```ignore
/// use sift::Document;
///
/// impl Document for MyTree {
///     type Element = NodeId;
///
///     fn descendants(&self, root: &NodeId) -> Vec<NodeId> {
///         self.walk(*root).skip(1).collect()
///     }
///
///     fn attribute(&self, element: &NodeId, name: &str) -> Option<&str> {
///         self.node(*element).attrs.get(name).map(String::as_str)
///     }
///
///     fn control_value(&self, element: &NodeId) -> String {
///         self.node(*element).value.clone().unwrap_or_default()
///     }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Document`",
    label = "this type cannot be filtered",
    note = "implement `descendants`, `attribute` and `control_value` to expose a tree to sift"
)]
pub trait Document {
    /// Opaque handle to one element of the tree.
    type Element: Clone + Eq + Hash + Debug;

    /// All descendants of `root` in document order, excluding `root` itself.
    fn descendants(&self, root: &Self::Element) -> Vec<Self::Element>;

    /// The value of attribute `name` on `element`, or `None` when absent.
    ///
    /// An attribute that is present with an empty value returns `Some("")`.
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<&str>;

    /// The current value of a control element (an input, a select, ...).
    ///
    /// Elements without a value report an empty string.
    fn control_value(&self, element: &Self::Element) -> String;

    /// Descendants of `root` carrying attribute `name`, in document order.
    fn query_attribute(&self, root: &Self::Element, name: &str) -> Vec<Self::Element> {
        self.descendants(root)
            .into_iter()
            .filter(|element| self.attribute(element, name).is_some())
            .collect()
    }
}
