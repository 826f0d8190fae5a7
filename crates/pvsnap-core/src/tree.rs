//! Lazy tree adapter
//!
//! Presents an entry graph as a row/column addressable tree. Nodes live in an
//! arena and refer to each other by [`NodeId`]; parent links are plain
//! indices, so there is no ownership cycle.
//!
//! Identifier children become stand-in leaf nodes until
//! [`EntryTree::fetch_more`] resolves them. Structural mutations (`add_child`,
//! `insert_child`, ...) reshape the tree only; they do not edit the entries
//! the nodes hold. Expanding a node writes its resolved entry back into the
//! matching identifier slot of its parent's data.

use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::errors::{Result, SnapError};
use crate::model::{Child, Entry, Root};

/// Columns shown per node: name and description
pub const COLUMN_COUNT: usize = 2;

/// Handle to a node in an [`EntryTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

/// What a node wraps
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    Root(Root),
    Child(Child),
}

impl From<Root> for NodeData {
    fn from(root: Root) -> Self {
        NodeData::Root(root)
    }
}

impl From<Child> for NodeData {
    fn from(child: Child) -> Self {
        NodeData::Child(child)
    }
}

impl From<Entry> for NodeData {
    fn from(entry: Entry) -> Self {
        NodeData::Child(Child::Resolved(entry))
    }
}

impl NodeData {
    fn is_unresolved(&self) -> bool {
        matches!(self, NodeData::Child(Child::Unresolved(_)))
    }

    /// Child slots held by the wrapped data
    fn children(&self) -> &[Child] {
        match self {
            NodeData::Root(root) => &root.entries,
            NodeData::Child(Child::Resolved(entry)) => entry
                .as_nestable()
                .map(|n| n.children())
                .unwrap_or(&[]),
            NodeData::Child(Child::Unresolved(_)) => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Child>> {
        match self {
            NodeData::Root(root) => Some(&mut root.entries),
            NodeData::Child(Child::Resolved(entry)) => {
                entry.as_nestable_mut().map(|n| n.children_mut())
            }
            NodeData::Child(Child::Unresolved(_)) => None,
        }
    }
}

/// One node of the tree
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    row: usize,
}

/// Arena-backed tree over an entry graph
#[derive(Debug, Clone)]
pub struct EntryTree {
    nodes: Vec<TreeNode>,
    root: NodeId,
}

impl EntryTree {
    /// Mirror `data` and everything resolved below it
    pub fn build(data: impl Into<NodeData>) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.root = tree.build_subtree(data.into());
        tree
    }

    fn build_subtree(&mut self, data: NodeData) -> NodeId {
        let children = data.children().to_vec();
        let id = self.new_node(data);
        for child in children {
            let child_id = self.build_subtree(NodeData::Child(child));
            self.attach(id, child_id);
        }
        id
    }

    /// Allocate a detached node
    pub fn new_node(&mut self, data: impl Into<NodeData>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(TreeNode {
            data: data.into(),
            parent: None,
            children: Vec::new(),
            row: 0,
        });
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut TreeNode> {
        self.nodes.get_mut(id.0).ok_or_else(|| SnapError::InvalidInput {
            reason: format!("no tree node {}", id.0),
        })
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.node(id).map(|n| &n.data)
    }

    /// The entry wrapped by a node, if resolved
    pub fn entry(&self, id: NodeId) -> Option<&Entry> {
        match self.data(id)? {
            NodeData::Child(child) => child.entry(),
            NodeData::Root(_) => None,
        }
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.children.len())
    }

    pub fn child(&self, id: NodeId, row: usize) -> Option<NodeId> {
        self.node(id)?.children.get(row).copied()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Position of a node among its siblings
    pub fn row(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, |n| n.row)
    }

    pub fn column_count(&self) -> usize {
        COLUMN_COUNT
    }

    /// Display text: column 0 is the title or PV name, column 1 the description
    pub fn display(&self, id: NodeId, column: usize) -> Option<String> {
        let data = self.data(id)?;
        let text = match (data, column) {
            (NodeData::Root(_), 0) => "<root>".to_string(),
            (NodeData::Root(_), 1) => String::new(),
            (NodeData::Child(Child::Unresolved(uuid)), 0) => uuid.to_string(),
            (NodeData::Child(Child::Unresolved(_)), 1) => String::new(),
            (NodeData::Child(Child::Resolved(entry)), 0) => entry
                .title()
                .or_else(|| entry.pv_name())
                .unwrap_or_default()
                .to_string(),
            (NodeData::Child(Child::Resolved(entry)), 1) => entry.description().to_string(),
            _ => return None,
        };
        Some(text)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        let row = self.nodes[parent.0].children.len();
        self.nodes[parent.0].children.push(child);
        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.row = row;
    }

    /// Reassign parent links and rows after the child list changed
    fn renumber(&mut self, parent: NodeId) {
        let children = self.nodes[parent.0].children.clone();
        for (row, child) in children.into_iter().enumerate() {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.row = row;
        }
    }

    fn check(&self, ids: &[NodeId]) -> Result<()> {
        match ids.iter().find(|id| id.0 >= self.nodes.len()) {
            Some(id) => Err(SnapError::InvalidInput {
                reason: format!("no tree node {}", id.0),
            }),
            None => Ok(()),
        }
    }

    /// Append `child` as the last child of `parent`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for unknown nodes.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(&[parent, child])?;
        self.attach(parent, child);
        Ok(())
    }

    /// Insert `child` at `row`, clamped to the child count
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for unknown nodes.
    pub fn insert_child(&mut self, parent: NodeId, row: usize, child: NodeId) -> Result<()> {
        self.check(&[child])?;
        let children = &mut self.node_mut(parent)?.children;
        let row = row.min(children.len());
        children.insert(row, child);
        self.renumber(parent);
        Ok(())
    }

    /// Detach `child` from `parent`
    ///
    /// Returns `false` if `child` is not a child of `parent`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for unknown nodes.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        self.check(&[child])?;
        let children = &mut self.node_mut(parent)?.children;
        let Some(pos) = children.iter().position(|c| *c == child) else {
            tracing::debug!(parent = parent.0, child = child.0, "node is not a child of this parent");
            return Ok(false);
        };
        children.remove(pos);
        self.nodes[child.0].parent = None;
        self.renumber(parent);
        Ok(true)
    }

    /// Put `new` in the place of `old`, keeping the row
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `old` is not a child of `parent`.
    pub fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) -> Result<()> {
        self.check(&[old, new])?;
        let children = &mut self.node_mut(parent)?.children;
        let pos = children
            .iter()
            .position(|c| *c == old)
            .ok_or_else(|| SnapError::InvalidInput {
                reason: "old child not found, could not replace".to_string(),
            })?;
        children[pos] = new;
        self.nodes[old.0].parent = None;
        let node = &mut self.nodes[new.0];
        node.parent = Some(parent);
        node.row = pos;
        Ok(())
    }

    /// Detach and return the child at `row`
    pub fn take_child(&mut self, parent: NodeId, row: usize) -> Option<NodeId> {
        let children = &mut self.nodes.get_mut(parent.0)?.children;
        if row >= children.len() {
            return None;
        }
        let child = children.remove(row);
        self.nodes[child.0].parent = None;
        self.renumber(parent);
        Some(child)
    }

    /// Detach and return every child of `parent`
    pub fn take_children(&mut self, parent: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get_mut(parent.0) else {
            return Vec::new();
        };
        let children = std::mem::take(&mut node.children);
        for child in &children {
            self.nodes[child.0].parent = None;
        }
        children
    }

    /// Whether expanding `id` would resolve anything
    ///
    /// True while the node itself, a child slot in its data, or one of its
    /// child nodes is still an identifier.
    pub fn can_fetch_more(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        node.data.is_unresolved()
            || node.data.children().iter().any(|c| !c.is_resolved())
            || node
                .children
                .iter()
                .any(|c| self.nodes[c.0].data.is_unresolved())
    }

    /// Resolve `id` through `client` and reconcile its child nodes
    ///
    /// Only this node is resolved, to the client's configured tree depth.
    /// Child nodes are matched by position: resolved nodes with the same
    /// identifier are kept (and reconciled in turn), stand-ins are replaced,
    /// surplus nodes are detached. The resolved entry then replaces the
    /// identifier slot for it in the parent's data.
    ///
    /// # Errors
    ///
    /// Returns `EntryNotFound` when an identifier is missing from the store,
    /// or `InvalidInput` for an unknown node.
    pub fn fetch_more(&mut self, id: NodeId, client: &Client) -> Result<()> {
        let depth = Some(client.config().tree.fill_depth);
        match &mut self.node_mut(id)?.data {
            NodeData::Root(root) => {
                for entry in root.entries.iter_mut() {
                    client.fill_child(entry, depth)?;
                }
            }
            NodeData::Child(child) => client.fill_child(child, depth)?,
        }
        let slots = self.nodes[id.0].data.children().to_vec();
        self.reconcile(id, slots);
        self.write_back(id);
        Ok(())
    }

    fn write_back(&mut self, id: NodeId) {
        let node = &self.nodes[id.0];
        let (Some(parent), NodeData::Child(resolved)) = (node.parent, &node.data) else {
            return;
        };
        if !resolved.is_resolved() {
            return;
        }
        let resolved = resolved.clone();
        let slot = self.nodes[parent.0]
            .data
            .children_mut()
            .and_then(|slots| {
                slots
                    .iter_mut()
                    .find(|s| !s.is_resolved() && s.id() == resolved.id())
            });
        if let Some(slot) = slot {
            *slot = resolved;
        }
    }

    fn reconcile(&mut self, id: NodeId, slots: Vec<Child>) {
        let old = std::mem::take(&mut self.nodes[id.0].children);
        let mut kept = Vec::with_capacity(slots.len());

        for (row, slot) in slots.into_iter().enumerate() {
            let matching = old.get(row).copied().filter(|o| match &self.nodes[o.0].data {
                NodeData::Child(existing) => existing.is_resolved() && existing.id() == slot.id(),
                NodeData::Root(_) => false,
            });
            let node = match matching {
                Some(existing) if slot.is_resolved() => {
                    let grand = NodeData::Child(slot.clone()).children().to_vec();
                    self.nodes[existing.0].data = NodeData::Child(slot);
                    self.reconcile(existing, grand);
                    existing
                }
                Some(existing) => existing,
                None => self.build_subtree(NodeData::Child(slot)),
            };
            kept.push(node);
        }

        for stale in old.iter().filter(|o| !kept.contains(o)) {
            self.nodes[stale.0].parent = None;
        }
        self.nodes[id.0].children = kept;
        self.renumber(id);
    }
}
