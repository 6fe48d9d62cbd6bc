// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node arena: structure, content boxes, and per-node layout state.

use alloc::{string::String, vec::Vec};
use kurbo::{Affine, Point, Rect, Vec2};

use crate::error::LayoutError;
use crate::geometry::transform_box;
use crate::types::{LayoutState, NodeId};

/// A rooted, ordered tree of diagram nodes.
///
/// The tree always has exactly one root, created with the tree. Every other
/// node has exactly one parent, and children keep their insertion order. That
/// order is the order both layout passes visit siblings in.
///
/// Each node carries the box of its own content (measured by whatever renders
/// it) and a [`LayoutState`]. The passes in [`Layouter`](crate::Layouter)
/// read and write that state; this type only stores it.
///
/// ## Example
///
/// ```rust
/// use kurbo::Rect;
/// use understory_tree_layout::Tree;
///
/// let mut tree = Tree::new(Rect::new(0.0, 0.0, 80.0, 24.0));
/// let root = tree.root();
/// let topic = tree.insert(root, Rect::new(0.0, 0.0, 60.0, 20.0)).unwrap();
///
/// assert_eq!(tree.parent_of(topic), Some(root));
/// assert_eq!(tree.children_of(root), &[topic]);
/// ```
#[derive(Clone)]
pub struct Tree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("root", &self.root)
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Node {
    generation: u32,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    content_box: Rect,
    state: LayoutState,
}

impl Node {
    fn new(generation: u32, parent: Option<NodeId>, content_box: Rect) -> Self {
        Self {
            generation,
            parent,
            children: Vec::new(),
            content_box,
            state: LayoutState::default(),
        }
    }
}

impl Tree {
    /// Create a tree holding only a root whose content occupies `root_box`.
    pub fn new(root_box: Rect) -> Self {
        let root = NodeId::new(0, 1);
        Self {
            nodes: alloc::vec![Some(Node::new(1, None, root_box))],
            generations: alloc::vec![1],
            free_list: Vec::new(),
            root,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `id` is the root.
    pub fn is_root(&self, id: NodeId) -> bool {
        id == self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Always `false`: a tree owns its root for its whole life.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if `id` refers to a live node.
    ///
    /// A `NodeId` is live if its slot is occupied and the slot's generation
    /// matches the one in the identifier.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Append a new node as the last child of `parent`.
    ///
    /// The node starts with default [`LayoutState`]: no style override, no
    /// offset, and nothing applied yet.
    pub fn insert(&mut self, parent: NodeId, content_box: Rect) -> Result<NodeId, LayoutError> {
        if !self.is_alive(parent) {
            return Err(LayoutError::StaleNode(parent));
        }
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, Some(parent), content_box));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes
                .push(Some(Node::new(generation, Some(parent), content_box)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId uses 32-bit indices by design."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        let id = NodeId::new(idx, generation);
        if let Some(p) = self.node_opt_mut(parent) {
            p.children.push(id);
        }
        Ok(id)
    }

    /// Remove a node and its whole subtree.
    ///
    /// Any animation handles held by removed nodes are dropped with them; the
    /// [`Layouter`](crate::Layouter) ignores frames for nodes that are gone.
    pub fn remove(&mut self, id: NodeId) -> Result<(), LayoutError> {
        if !self.is_alive(id) {
            return Err(LayoutError::StaleNode(id));
        }
        if self.is_root(id) {
            return Err(LayoutError::RootRemoval);
        }
        if let Some(parent) = self.parent_of(id)
            && let Some(p) = self.node_opt_mut(parent)
        {
            p.children.retain(|c| *c != id);
        }
        let mut stack = alloc::vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes[next.idx()].take() {
                stack.extend(node.children);
                self.free_list.push(next.idx());
            }
        }
        Ok(())
    }

    /// Returns the parent of a node if live, or `None` for the root or stale ids.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node_opt(id).and_then(|n| n.parent)
    }

    /// Get the children of a node, or an empty slice if the node is stale.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.node_opt(id) {
            Some(n) => &n.children,
            None => &[],
        }
    }

    /// Get the next node in depth-first (pre-order) traversal order.
    ///
    /// Returns `None` after the last node or if `current` is stale.
    pub fn next_depth_first(&self, current: NodeId) -> Option<NodeId> {
        let node = self.node_opt(current)?;
        if let Some(&first_child) = node.children.first() {
            return Some(first_child);
        }

        let mut at = current;
        while let Some(parent) = self.parent_of(at) {
            if let Some(next_sibling) = self.next_sibling(at) {
                return Some(next_sibling);
            }
            at = parent;
        }
        None
    }

    /// Iterate every node of the subtree rooted at `from` in pre-order.
    ///
    /// Yields nothing if `from` is stale.
    ///
    /// ```rust
    /// use kurbo::Rect;
    /// use understory_tree_layout::Tree;
    ///
    /// let mut tree = Tree::new(Rect::ZERO);
    /// let root = tree.root();
    /// let a = tree.insert(root, Rect::ZERO).unwrap();
    /// let a1 = tree.insert(a, Rect::ZERO).unwrap();
    /// let b = tree.insert(root, Rect::ZERO).unwrap();
    ///
    /// let order: Vec<_> = tree.depth_first(root).collect();
    /// assert_eq!(order, vec![root, a, a1, b]);
    /// ```
    pub fn depth_first(&self, from: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            start: from,
            next: self.is_alive(from).then_some(from),
        }
    }

    /// The box of the node's own content, in its local space.
    pub fn content_box(&self, id: NodeId) -> Option<Rect> {
        self.node_opt(id).map(|n| n.content_box)
    }

    /// Update the node's content box after it has been re-measured.
    pub fn set_content_box(&mut self, id: NodeId, content_box: Rect) -> Result<(), LayoutError> {
        self.state_node_mut(id)?.content_box = content_box;
        Ok(())
    }

    /// Read-only view of the node's layout state.
    pub fn layout_state(&self, id: NodeId) -> Option<&LayoutState> {
        self.node_opt(id).map(|n| &n.state)
    }

    /// Local transform computed by the last layout pass, or identity.
    pub fn local_transform(&self, id: NodeId) -> Option<Affine> {
        self.layout_state(id)
            .map(LayoutState::local_transform_or_identity)
    }

    /// Direction vector attached by the node's parent layout, or zero.
    pub fn layout_vector(&self, id: NodeId) -> Option<Vec2> {
        self.layout_state(id).map(|s| s.layout_vector)
    }

    /// The user offset applied on top of the composed transform.
    pub fn layout_offset(&self, id: NodeId) -> Option<Point> {
        self.layout_state(id).map(|s| s.layout_offset)
    }

    /// Set the user offset. Takes effect on the next apply pass.
    pub fn set_layout_offset(&mut self, id: NodeId, offset: Point) -> Result<(), LayoutError> {
        self.state_mut(id)?.layout_offset = offset;
        Ok(())
    }

    /// The style set explicitly on this node, if any.
    pub fn style_override(&self, id: NodeId) -> Option<&str> {
        self.layout_state(id).and_then(|s| s.style.as_deref())
    }

    /// Set or clear (`None`) this node's explicit style.
    ///
    /// This only records the choice; see
    /// [`Layouter::set_style`](crate::Layouter::set_style) for the variant that
    /// also re-runs layout.
    pub fn set_style_override(
        &mut self,
        id: NodeId,
        style: Option<String>,
    ) -> Result<(), LayoutError> {
        self.state_mut(id)?.style = style;
        Ok(())
    }

    /// The transform most recently pushed to the scene, or identity.
    pub fn last_applied(&self, id: NodeId) -> Option<Affine> {
        self.layout_state(id)
            .map(LayoutState::last_applied_or_identity)
    }

    /// Content box as currently shown: the content box under the last
    /// applied transform.
    pub fn layout_box(&self, id: NodeId) -> Option<Rect> {
        let node = self.node_opt(id)?;
        Some(transform_box(
            node.state.last_applied_or_identity(),
            node.content_box,
        ))
    }

    /// The node's origin as currently shown.
    pub fn layout_point(&self, id: NodeId) -> Option<Point> {
        self.layout_state(id)
            .map(|s| s.last_applied_or_identity() * Point::ORIGIN)
    }

    pub(crate) fn state_mut(&mut self, id: NodeId) -> Result<&mut LayoutState, LayoutError> {
        Ok(&mut self.state_node_mut(id)?.state)
    }

    fn state_node_mut(&mut self, id: NodeId) -> Result<&mut Node, LayoutError> {
        self.node_opt_mut(id).ok_or(LayoutError::StaleNode(id))
    }

    fn node_opt(&self, id: NodeId) -> Option<&Node> {
        let n = self.nodes.get(id.idx())?.as_ref()?;
        (n.generation == id.1).then_some(n)
    }

    fn node_opt_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let n = self.nodes.get_mut(id.idx())?.as_mut()?;
        if n.generation != id.1 {
            return None;
        }
        Some(n)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent_of(node)?;
        let siblings = self.children_of(parent);
        let pos = siblings.iter().position(|&id| id == node)?;
        siblings.get(pos + 1).copied()
    }
}

/// Pre-order iterator over a subtree, created by [`Tree::depth_first`].
#[derive(Clone, Debug)]
pub struct DepthFirst<'a> {
    tree: &'a Tree,
    start: NodeId,
    next: Option<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.successor(current);
        Some(current)
    }
}

impl DepthFirst<'_> {
    /// Like [`Tree::next_depth_first`] but never climbs above `start`.
    fn successor(&self, current: NodeId) -> Option<NodeId> {
        if let Some(&first_child) = self.tree.children_of(current).first() {
            return Some(first_child);
        }
        let mut at = current;
        while at != self.start {
            if let Some(next_sibling) = self.tree.next_sibling(at) {
                return Some(next_sibling);
            }
            at = self.tree.parent_of(at)?;
        }
        None
    }
}
