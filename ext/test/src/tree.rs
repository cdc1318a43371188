//! YAML description of a document tree.
//!
//! ```yaml
//! - tag: input
//!   id: color
//!   attrs: { data-filter-prefix: color }
//!   value: red
//! - tag: ul
//!   children:
//!     - { tag: li, id: shirt, attrs: { data-filter-color: "red,blue" } }
//! ```
//!
//! The top-level list holds the root's children. `id` is stored as the
//! element's `id` attribute.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{NodeId, TestDocument, ID_ATTRIBUTE};

/// One element and its subtree.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

fn default_tag() -> String {
    "div".into()
}

impl TestDocument {
    /// Build a document whose root holds `elements`.
    #[must_use]
    pub fn from_specs(elements: &[ElementSpec]) -> Self {
        let mut doc = Self::new();
        let root = doc.root();
        for spec in elements {
            doc.append(root, spec);
        }
        doc
    }

    /// Parse a YAML element list.
    ///
    /// # Errors
    ///
    /// Returns the YAML error when the input is not an element list.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let elements: Vec<ElementSpec> = serde_yaml::from_str(yaml)?;
        Ok(Self::from_specs(&elements))
    }

    fn append(&mut self, parent: NodeId, spec: &ElementSpec) -> NodeId {
        let mut builder = self.element(parent, spec.tag.clone());
        if let Some(id) = &spec.id {
            builder = builder.attr(ID_ATTRIBUTE, id.clone());
        }
        for (name, value) in &spec.attrs {
            builder = builder.attr(name.clone(), value.clone());
        }
        if let Some(value) = &spec.value {
            builder = builder.value(value.clone());
        }
        let id = builder.id();

        for child in &spec.children {
            self.append(id, child);
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift::Document;

    #[test]
    fn loads_nested_tree() {
        let doc = TestDocument::from_yaml(
            r#"
- tag: input
  id: color
  attrs: { data-filter-prefix: color }
  value: red
- tag: ul
  children:
    - { tag: li, id: shirt, attrs: { data-filter-color: "red,blue" } }
    - { id: hat, attrs: { data-filter-color: green } }
"#,
        )
        .unwrap();

        let color = doc.find("color").unwrap();
        let shirt = doc.find("shirt").unwrap();
        let hat = doc.find("hat").unwrap();

        assert_eq!(doc.control_value(&color), "red");
        assert_eq!(doc.attribute(&shirt, "data-filter-color"), Some("red,blue"));
        assert_eq!(doc.tag(hat), Some("div"));

        let ids = doc.labels(&doc.query_attribute(&doc.root(), "data-filter-color"));
        assert_eq!(ids, vec!["shirt", "hat"]);
    }

    #[test]
    fn rejects_non_list() {
        assert!(TestDocument::from_yaml("tag: div").is_err());
    }
}
