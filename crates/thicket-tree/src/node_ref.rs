//! Borrowed node handles.

use std::fmt;
use std::ptr;

use thicket_selector::{PseudoMatch, Selob};

use crate::pseudo;
use crate::{NodeData, NodeId, Tree};

/// A borrowed handle onto one node of a [`Tree`].
///
/// Handles are `Copy`; two handles are equal when they point at the same
/// node of the same tree.
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub(crate) const fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// The tree this handle points into.
    #[must_use]
    pub const fn tree(&self) -> &'a Tree {
        self.tree
    }

    /// The arena index of the node.
    #[must_use]
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// The node's data.
    #[must_use]
    pub fn data(&self) -> &'a NodeData {
        // Handles only exist for allocated nodes and nodes are never removed.
        &self.tree.nodes[self.id.0].data
    }

    /// Location of the node from the root, see [`Tree::path`].
    #[must_use]
    pub fn path(&self) -> String {
        self.tree.path(self.id)
    }

    fn at(&self, id: NodeId) -> Self {
        Self::new(self.tree, id)
    }

    fn position(&self) -> usize {
        self.tree.nodes[self.id.0].position
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.path()).finish()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl Selob for NodeRef<'_> {
    fn id(&self) -> &str {
        &self.data().id
    }

    fn type_name(&self) -> &str {
        self.data().type_name()
    }

    fn type_list(&self) -> &[String] {
        &self.data().types
    }

    fn has_property(&self, name: &str) -> bool {
        self.data().properties.contains_key(name)
    }

    fn get_property(&self, name: &str) -> String {
        self.data().properties.get(name).cloned().unwrap_or_default()
    }

    fn parent(&self) -> Option<Self> {
        self.tree.parent(self.id).map(|id| self.at(id))
    }

    fn sibling(&self, offset: isize) -> Option<Self> {
        self.tree.sibling(self.id, offset).map(|id| self.at(id))
    }

    fn n_children(&self) -> usize {
        self.tree.children(self.id).len()
    }

    fn child(&self, index: usize) -> Option<Self> {
        self.tree.children(self.id).get(index).map(|&id| self.at(id))
    }

    fn is_nth_child(&self, nth: isize) -> bool {
        let Some(parent) = self.tree.parent(self.id) else {
            return false;
        };
        let position = self.position();
        let count = self.tree.children(parent).len();
        match nth.unsigned_abs() {
            0 => false,
            k if nth > 0 => position + 1 == k,
            k => count - position == k,
        }
    }

    fn pseudo_selector(&self, ident: &str, arg: &str) -> Result<PseudoMatch<Self>, String> {
        pseudo::evaluate(self, ident, arg)
    }
}
