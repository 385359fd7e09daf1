//! A deliberately small tree for exercising the matcher.
//!
//! It only provides the navigation primitives, so `is_nth_child` runs
//! through the trait's default implementation.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fmt;

use thicket_selector::{PseudoMatch, Selob};

struct Entry {
    id: String,
    types: Vec<String>,
    properties: BTreeMap<String, String>,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Flat node storage, index 0 is the root.
pub struct TestTree {
    entries: Vec<Entry>,
}

impl TestTree {
    /// Tree with a single root. `types` is space separated, primary type first.
    pub fn new(types: &str, id: &str) -> Self {
        let mut tree = Self {
            entries: Vec::new(),
        };
        let _ = tree.insert(None, types, id);
        tree
    }

    /// Append a child to `parent` and return its index.
    pub fn add(&mut self, parent: usize, types: &str, id: &str) -> usize {
        let index = self.insert(Some(parent), types, id);
        self.entries[parent].children.push(index);
        index
    }

    fn insert(&mut self, parent: Option<usize>, types: &str, id: &str) -> usize {
        self.entries.push(Entry {
            id: id.to_string(),
            types: types.split_whitespace().map(str::to_string).collect(),
            properties: BTreeMap::new(),
            parent,
            children: Vec::new(),
        });
        self.entries.len() - 1
    }

    /// Set a property on `index`.
    pub fn set(&mut self, index: usize, name: &str, value: &str) {
        let _ = self.entries[index]
            .properties
            .insert(name.to_string(), value.to_string());
    }

    pub fn root(&self) -> Node<'_> {
        self.node(0)
    }

    pub fn node(&self, index: usize) -> Node<'_> {
        Node { tree: self, index }
    }

    /// Every node in pre-order.
    pub fn all(&self) -> Vec<Node<'_>> {
        (0..self.entries.len()).map(|index| self.node(index)).collect()
    }
}

/// Handle onto a node of a [`TestTree`].
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a TestTree,
    index: usize,
}

impl Node<'_> {
    fn entry(&self) -> &Entry {
        &self.tree.entries[self.index]
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.entry().id)
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Selob for Node<'_> {
    fn id(&self) -> &str {
        &self.entry().id
    }

    fn type_name(&self) -> &str {
        self.entry().types.first().map_or("", String::as_str)
    }

    fn type_list(&self) -> &[String] {
        &self.entry().types
    }

    fn has_property(&self, name: &str) -> bool {
        self.entry().properties.contains_key(name)
    }

    fn get_property(&self, name: &str) -> String {
        self.entry().properties.get(name).cloned().unwrap_or_default()
    }

    fn parent(&self) -> Option<Self> {
        self.entry().parent.map(|index| self.tree.node(index))
    }

    fn sibling(&self, offset: isize) -> Option<Self> {
        let parent = self.entry().parent?;
        let siblings = &self.tree.entries[parent].children;
        let position = siblings.iter().position(|&index| index == self.index)?;
        let target = position.checked_add_signed(offset)?;
        siblings.get(target).map(|&index| self.tree.node(index))
    }

    fn n_children(&self) -> usize {
        self.entry().children.len()
    }

    fn child(&self, index: usize) -> Option<Self> {
        self.entry()
            .children
            .get(index)
            .map(|&index| self.tree.node(index))
    }

    fn pseudo_selector(&self, ident: &str, arg: &str) -> Result<PseudoMatch<Self>, String> {
        match ident {
            ":selected" => Ok(if self.get_property("selected") == "true" {
                PseudoMatch::Matched
            } else {
                PseudoMatch::NoMatch
            }),
            "::first" => Ok(self.child(0).map_or(PseudoMatch::NoMatch, PseudoMatch::Node)),
            _ => Err(format!("test tree has no '{ident}({arg})'")),
        }
    }
}

/// Ids of `nodes`, in order.
pub fn ids<'a>(nodes: &[Node<'a>]) -> Vec<&'a str> {
    nodes.iter().map(|node| node.tree.entries[node.index].id.as_str()).collect()
}
