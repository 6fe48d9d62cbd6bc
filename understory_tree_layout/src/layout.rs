// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout contract and the bottom-up layout pass.

use kurbo::{Affine, Rect, Vec2};
use smallvec::SmallVec;

use crate::error::LayoutError;
use crate::geometry::{BoxUnion, transform_box};
use crate::registry::LayoutRegistry;
use crate::style::effective_style;
use crate::tree::Tree;
use crate::types::NodeId;

/// A layout style.
///
/// An implementation positions the direct children of one node relative to
/// that node. It runs after every child has laid out its own children, so
/// [`LayoutCx::tree_box`] over the children already reflects their final
/// subtree geometry.
///
/// ```rust
/// use kurbo::{Affine, Vec2};
/// use understory_tree_layout::{Layout, LayoutCx, LayoutError};
///
/// /// Stacks children downwards, each one right of its parent.
/// #[derive(Default)]
/// struct Column;
///
/// impl Layout for Column {
///     fn layout(&mut self, cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
///         let parent = cx.branch_box(&[cx.node()]);
///         let mut y = 0.0;
///         for child in cx.children().to_vec() {
///             let size = cx.tree_box(&[child]);
///             cx.set_child_transform(child, Affine::translate(Vec2::new(parent.x1 + 20.0, y)))?;
///             y += size.height() + 10.0;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Layout {
    /// Set the local transform (and optionally the layout vector) of every
    /// child of [`LayoutCx::node`].
    ///
    /// Errors abort the whole layout pass and are returned to the caller.
    fn layout(&mut self, cx: &mut LayoutCx<'_>) -> Result<(), LayoutError>;
}

/// What a [`Layout`] sees while positioning one node's children.
///
/// Reads reach the whole tree; writes are limited to the direct children of
/// the node being laid out.
#[derive(Debug)]
pub struct LayoutCx<'a> {
    tree: &'a mut Tree,
    node: NodeId,
}

impl<'a> LayoutCx<'a> {
    pub(crate) fn new(tree: &'a mut Tree, node: NodeId) -> Self {
        Self { tree, node }
    }

    /// The node whose children are being positioned.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Read access to the whole tree.
    pub fn tree(&self) -> &Tree {
        self.tree
    }

    /// Children of the node being laid out, in order.
    pub fn children(&self) -> &[NodeId] {
        self.tree.children_of(self.node)
    }

    /// Content box of any node, or [`Rect::ZERO`] for stale ids.
    pub fn content_box(&self, id: NodeId) -> Rect {
        self.tree.content_box(id).unwrap_or(Rect::ZERO)
    }

    /// Local transform of any node; identity when unset or stale.
    pub fn local_transform(&self, id: NodeId) -> Affine {
        self.tree.local_transform(id).unwrap_or(Affine::IDENTITY)
    }

    /// Layout vector of any node; zero when unset or stale.
    pub fn layout_vector(&self, id: NodeId) -> Vec2 {
        self.tree.layout_vector(id).unwrap_or(Vec2::ZERO)
    }

    /// Place `child` relative to the node being laid out.
    pub fn set_child_transform(&mut self, child: NodeId, tf: Affine) -> Result<(), LayoutError> {
        self.check_child(child)?;
        self.tree.state_mut(child)?.local_transform = Some(tf);
        Ok(())
    }

    /// Attach a direction vector to `child`.
    pub fn set_child_vector(&mut self, child: NodeId, v: Vec2) -> Result<(), LayoutError> {
        self.check_child(child)?;
        self.tree.state_mut(child)?.layout_vector = v;
        Ok(())
    }

    /// See [`branch_box`].
    pub fn branch_box(&self, nodes: &[NodeId]) -> Rect {
        branch_box(self.tree, nodes)
    }

    /// See [`tree_box`].
    pub fn tree_box(&self, nodes: &[NodeId]) -> Rect {
        tree_box(self.tree, nodes)
    }

    fn check_child(&self, child: NodeId) -> Result<(), LayoutError> {
        if self.tree.parent_of(child) == Some(self.node) {
            Ok(())
        } else {
            Err(LayoutError::NotAChild {
                parent: self.node,
                node: child,
            })
        }
    }
}

/// Union of the content boxes of `nodes`, each under its own local transform.
///
/// Descendants are not included. An empty slice gives [`Rect::ZERO`]; stale
/// ids are skipped.
pub fn branch_box(tree: &Tree, nodes: &[NodeId]) -> Rect {
    nodes
        .iter()
        .filter_map(|&id| {
            let state = tree.layout_state(id)?;
            let content = tree.content_box(id)?;
            Some(transform_box(state.local_transform_or_identity(), content))
        })
        .collect::<BoxUnion>()
        .finish()
}

/// Union of the whole subtrees under `nodes`, each under its own local
/// transform.
///
/// A node's subtree box is its content box merged with the subtree boxes of
/// its children, expressed in the node's local space, then mapped through
/// the node's local transform. An empty slice gives [`Rect::ZERO`]; stale
/// ids are skipped.
pub fn tree_box(tree: &Tree, nodes: &[NodeId]) -> Rect {
    let mut union = BoxUnion::new();
    for &id in nodes {
        let Some(content) = tree.content_box(id) else {
            continue;
        };
        let mut own = BoxUnion::new();
        own.add(content);
        let children = tree.children_of(id);
        if !children.is_empty() {
            own.add(tree_box(tree, children));
        }
        let tf = tree.local_transform(id).unwrap_or(Affine::IDENTITY);
        union.add(transform_box(tf, own.finish()));
    }
    union.finish()
}

/// Run the bottom-up layout pass over the whole tree.
///
/// Every local transform is cleared first. Then each node, children before
/// parents and siblings in order, is laid out by a fresh instance of its
/// effective style. The first error stops the pass; nodes already laid out
/// keep their new transforms and the rest stay cleared.
pub fn layout_tree(tree: &mut Tree, registry: &LayoutRegistry) -> Result<(), LayoutError> {
    let root = tree.root();
    let order: SmallVec<[NodeId; 32]> = tree.depth_first(root).collect();
    for &id in &order {
        tree.state_mut(id)?.local_transform = None;
    }
    log::debug!("layout pass over {} nodes", order.len());

    // Post-order without recursion: a node is revisited (`true`) once all of
    // its children, pushed above it, have been popped.
    let mut stack: SmallVec<[(NodeId, bool); 32]> = SmallVec::new();
    stack.push((root, false));
    while let Some((id, expanded)) = stack.pop() {
        if !expanded {
            stack.push((id, true));
            for &child in tree.children_of(id).iter().rev() {
                stack.push((child, false));
            }
            continue;
        }

        let mut layout = {
            let style = effective_style(tree, registry, id)?;
            log::trace!("laying out node {} with `{style}`", id.index());
            registry.instantiate(style)?
        };
        layout.layout(&mut LayoutCx::new(tree, id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    /// Puts every child 100 units right of its parent.
    #[derive(Default)]
    struct Right;

    impl Layout for Right {
        fn layout(&mut self, cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
            for child in cx.children().to_vec() {
                cx.set_child_transform(child, Affine::translate(Vec2::new(100.0, 0.0)))?;
            }
            Ok(())
        }
    }

    /// Records visit order and checks that children were finished first.
    struct Recorder {
        log: Rc<RefCell<Vec<NodeId>>>,
    }

    impl Layout for Recorder {
        fn layout(&mut self, cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
            let seen = self.log.borrow();
            for d in cx.tree().depth_first(cx.node()).skip(1) {
                assert!(seen.contains(&d), "descendant laid out after its ancestor");
            }
            drop(seen);
            self.log.borrow_mut().push(cx.node());
            Ok(())
        }
    }

    /// Keeps state across calls; must never see a second node.
    #[derive(Default)]
    struct OneShot {
        used: bool,
    }

    impl Layout for OneShot {
        fn layout(&mut self, _cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
            assert!(!self.used, "layout instance reused across nodes");
            self.used = true;
            Ok(())
        }
    }

    fn right_registry() -> LayoutRegistry {
        let mut r = LayoutRegistry::new();
        r.register_default::<Right>("right");
        r
    }

    #[test]
    fn post_order_visits_children_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut r = LayoutRegistry::new();
        let handle = log.clone();
        r.register("record", move || {
            Box::new(Recorder {
                log: handle.clone(),
            }) as Box<dyn Layout>
        });

        let mut tree = Tree::new(Rect::ZERO);
        let root = tree.root();
        let a = tree.insert(root, Rect::ZERO).unwrap();
        let a1 = tree.insert(a, Rect::ZERO).unwrap();
        let a2 = tree.insert(a, Rect::ZERO).unwrap();
        let b = tree.insert(root, Rect::ZERO).unwrap();
        let b1 = tree.insert(b, Rect::ZERO).unwrap();

        layout_tree(&mut tree, &r).unwrap();
        assert_eq!(*log.borrow(), [a1, a2, a, b1, b, root]);
    }

    #[test]
    fn fresh_instance_per_node() {
        let mut r = LayoutRegistry::new();
        r.register_default::<OneShot>("oneshot");
        let mut tree = Tree::new(Rect::ZERO);
        let root = tree.root();
        for _ in 0..3 {
            let c = tree.insert(root, Rect::ZERO).unwrap();
            tree.insert(c, Rect::ZERO).unwrap();
        }
        layout_tree(&mut tree, &r).unwrap();
    }

    #[test]
    fn chain_gets_local_offsets() {
        let mut tree = Tree::new(Rect::ZERO);
        let root = tree.root();
        let a = tree.insert(root, Rect::ZERO).unwrap();
        let b = tree.insert(a, Rect::ZERO).unwrap();
        layout_tree(&mut tree, &right_registry()).unwrap();

        let step = Affine::translate(Vec2::new(100.0, 0.0));
        assert_eq!(tree.layout_state(root).unwrap().local_transform, None);
        assert_eq!(tree.local_transform(a), Some(step));
        assert_eq!(tree.local_transform(b), Some(step));
    }

    #[test]
    fn stale_transforms_are_cleared() {
        // A style that leaves children alone.
        #[derive(Default)]
        struct Idle;
        impl Layout for Idle {
            fn layout(&mut self, _cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
                Ok(())
            }
        }

        let mut tree = Tree::new(Rect::ZERO);
        let a = tree.insert(tree.root(), Rect::ZERO).unwrap();
        layout_tree(&mut tree, &right_registry()).unwrap();
        assert!(tree.layout_state(a).unwrap().local_transform.is_some());

        let mut idle = LayoutRegistry::new();
        idle.register_default::<Idle>("idle");
        layout_tree(&mut tree, &idle).unwrap();
        assert_eq!(tree.layout_state(a).unwrap().local_transform, None);
    }

    #[test]
    fn writing_a_grandchild_is_rejected() {
        #[derive(Default)]
        struct Reach;
        impl Layout for Reach {
            fn layout(&mut self, cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
                let grandchildren: Vec<_> = cx
                    .children()
                    .iter()
                    .flat_map(|&c| cx.tree().children_of(c).to_vec())
                    .collect();
                for g in grandchildren {
                    cx.set_child_transform(g, Affine::IDENTITY)?;
                }
                Ok(())
            }
        }

        let mut r = LayoutRegistry::new();
        r.register_default::<Reach>("reach");
        let mut tree = Tree::new(Rect::ZERO);
        let root = tree.root();
        let a = tree.insert(root, Rect::ZERO).unwrap();
        let g = tree.insert(a, Rect::ZERO).unwrap();

        assert_eq!(
            layout_tree(&mut tree, &r),
            Err(LayoutError::NotAChild {
                parent: root,
                node: g
            })
        );
    }

    #[test]
    fn unknown_override_aborts_the_pass() {
        let mut tree = Tree::new(Rect::ZERO);
        let a = tree.insert(tree.root(), Rect::ZERO).unwrap();
        tree.set_style_override(a, Some("ghost".into())).unwrap();
        assert_eq!(
            layout_tree(&mut tree, &right_registry()),
            Err(LayoutError::UnknownStyle("ghost".into()))
        );
    }

    #[test]
    fn empty_registry_aborts_the_pass() {
        let mut tree = Tree::new(Rect::ZERO);
        assert_eq!(
            layout_tree(&mut tree, &LayoutRegistry::new()),
            Err(LayoutError::NoDefaultStyle)
        );
    }

    #[test]
    fn boxes_of_nothing_are_zero() {
        let tree = Tree::new(Rect::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(branch_box(&tree, &[]), Rect::ZERO);
        assert_eq!(tree_box(&tree, &[]), Rect::ZERO);
    }

    #[test]
    fn branch_box_ignores_descendants() {
        let mut tree = Tree::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let root = tree.root();
        let a = tree.insert(root, Rect::new(0.0, 0.0, 20.0, 10.0)).unwrap();
        let _a1 = tree.insert(a, Rect::new(0.0, 0.0, 500.0, 500.0)).unwrap();
        layout_tree(&mut tree, &right_registry()).unwrap();

        assert_eq!(
            branch_box(&tree, &[a]),
            Rect::new(100.0, 0.0, 120.0, 10.0)
        );
    }

    #[test]
    fn tree_box_composes_down_the_subtree() {
        let mut tree = Tree::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let root = tree.root();
        let a = tree.insert(root, Rect::new(0.0, 0.0, 20.0, 10.0)).unwrap();
        let _a1 = tree.insert(a, Rect::new(0.0, 0.0, 30.0, 40.0)).unwrap();
        layout_tree(&mut tree, &right_registry()).unwrap();

        // a sits at x = 100; a1 sits 100 further right in a's space.
        assert_eq!(tree_box(&tree, &[a]), Rect::new(100.0, 0.0, 230.0, 40.0));
        // The root has no local transform, so its subtree box is in root space.
        assert_eq!(tree_box(&tree, &[root]), Rect::new(0.0, 0.0, 230.0, 40.0));
    }
}
