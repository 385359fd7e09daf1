//! Arena-backed object tree that the Thicket selector engine can query.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Each
//! node remembers its position among its siblings, so sibling-by-offset and
//! child-position tests are O(1) as well.
//!
//! [`NodeRef`] pairs a tree reference with a [`NodeId`] and implements
//! [`thicket_selector::Selob`], including a handful of custom
//! pseudo-selectors (see [`pseudo`]).
//!
//! Trees are built programmatically with [`Tree::alloc`] and
//! [`Tree::append_child`], or loaded from a nested JSON description with
//! [`Tree::from_json`].

use std::collections::BTreeMap;

use serde::Serialize;

/// Loading trees from JSON.
pub mod load;
/// Handles onto tree nodes and their `Selob` implementation.
pub mod node_ref;
/// Custom pseudo-selectors understood by [`NodeRef`].
pub mod pseudo;

pub use load::TreeError;
pub use node_ref::NodeRef;

/// A type-safe index into a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// What a node is: identity, types and properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeData {
    /// Identifier matched by `#id`; may be empty.
    pub id: String,
    /// Primary type name first, then every alias the node also satisfies.
    pub types: Vec<String>,
    /// Named string properties, matched by attribute selectors.
    pub properties: BTreeMap<String, String>,
}

impl NodeData {
    /// Node data with a primary type and nothing else.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            types: vec![type_name.into()],
            properties: BTreeMap::new(),
        }
    }

    /// Set the identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Add a type alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.types.push(alias.into());
        self
    }

    /// Set a property.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.properties.insert(name.into(), value.into());
        self
    }

    /// The primary type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.types.first().map_or("", String::as_str)
    }
}

/// A tree entry: node data plus its links.
#[derive(Debug, Clone)]
pub struct Node {
    /// What the node is.
    pub data: NodeData,
    /// The parent, `None` for the root and for detached nodes.
    pub parent: Option<NodeId>,
    /// Children in order.
    pub children: Vec<NodeId>,
    /// Index of this node within its parent's children.
    pub position: usize,
}

/// Arena-based object tree.
///
/// All nodes live in one vector indexed by [`NodeId`]; the root is always
/// at [`NodeId::ROOT`].
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create a tree holding just `root`.
    #[must_use]
    pub fn new(root: NodeData) -> Self {
        pseudo::register();
        Self {
            nodes: vec![Node {
                data: root,
                parent: None,
                children: Vec::new(),
                position: 0,
            }],
        }
    }

    /// The root node ID.
    #[must_use]
    pub const fn root_id(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Handle onto the root node.
    #[must_use]
    pub const fn root(&self) -> NodeRef<'_> {
        NodeRef::new(self, NodeId::ROOT)
    }

    /// Handle onto `id`, if it exists.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.get(id).map(|_| NodeRef::new(self, id))
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node's data.
    pub fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0).map(|node| &mut node.data)
    }

    /// Number of nodes, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data,
            parent: None,
            children: Vec::new(),
            position: 0,
        });
        id
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// `child` must be detached and must not be `parent` or one of its
    /// ancestors; such calls are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let attachable = parent.0 < self.nodes.len()
            && child != NodeId::ROOT
            && self.parent(child).is_none()
            && child != parent
            && !self.ancestors(parent).any(|ancestor| ancestor == child);
        if !attachable || child.0 >= self.nodes.len() {
            return;
        }
        let position = self.nodes[parent.0].children.len();
        self.nodes[parent.0].children.push(child);
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.position = position;
    }

    /// Allocate `data` and append it under `parent` in one step.
    pub fn append(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.alloc(data);
        self.append_child(parent, id);
        id
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// The sibling `offset` positions away from `id`.
    #[must_use]
    pub fn sibling(&self, id: NodeId, offset: isize) -> Option<NodeId> {
        let node = self.get(id)?;
        let position = node.position.checked_add_signed(offset)?;
        self.children(node.parent?).get(position).copied()
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Every node reachable from the root, in depth-first pre-order.
    #[must_use]
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![NodeId::ROOT];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Human-readable location of `id`: `type#id` segments from the root,
    /// joined by `" > "`.
    #[must_use]
    pub fn path(&self, id: NodeId) -> String {
        let mut segments: Vec<String> = std::iter::once(id)
            .chain(self.ancestors(id))
            .filter_map(|id| self.get(id))
            .map(|node| label(&node.data))
            .collect();
        segments.reverse();
        segments.join(" > ")
    }
}

/// `type#id`, or just `type` without an id.
pub(crate) fn label(data: &NodeData) -> String {
    if data.id.is_empty() {
        data.type_name().to_string()
    } else {
        format!("{}#{}", data.type_name(), data.id)
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a Tree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
