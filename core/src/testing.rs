//! Minimal in-crate document for unit tests.

use std::collections::HashMap;

use crate::Document;

#[derive(Debug, Default)]
struct Node {
    children: Vec<usize>,
    attrs: HashMap<String, String>,
    value: String,
}

/// Arena tree; node 0 is the root.
#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub(crate) const ROOT: usize = 0;

    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    pub(crate) fn add(&mut self, parent: usize, attrs: &[(&str, &str)]) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node {
            children: Vec::new(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            value: String::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    pub(crate) fn control(&mut self, parent: usize, attrs: &[(&str, &str)], value: &str) -> usize {
        let id = self.add(parent, attrs);
        self.set_value(id, value);
        id
    }

    pub(crate) fn set_value(&mut self, id: usize, value: &str) {
        self.nodes[id].value = value.to_string();
    }

    pub(crate) fn set_attr(&mut self, id: usize, name: &str, value: &str) {
        self.nodes[id].attrs.insert(name.to_string(), value.to_string());
    }

    fn walk(&self, id: usize, out: &mut Vec<usize>) {
        for child in &self.nodes[id].children {
            out.push(*child);
            self.walk(*child, out);
        }
    }
}

impl Document for Tree {
    type Element = usize;

    fn descendants(&self, root: &usize) -> Vec<usize> {
        let mut out = Vec::new();
        if *root < self.nodes.len() {
            self.walk(*root, &mut out);
        }
        out
    }

    fn attribute(&self, element: &usize, name: &str) -> Option<&str> {
        self.nodes.get(*element)?.attrs.get(name).map(String::as_str)
    }

    fn control_value(&self, element: &usize) -> String {
        self.nodes
            .get(*element)
            .map(|node| node.value.clone())
            .unwrap_or_default()
    }
}
