// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style inheritance.
//!
//! A node's style is its own override if it has one, otherwise its parent's
//! style; the root without an override uses the registry default. Nodes that
//! carry an override (and the root) are *layout roots*: each one heads a
//! segment of the tree that shares a single style down to the next override.

use crate::error::LayoutError;
use crate::registry::LayoutRegistry;
use crate::tree::Tree;
use crate::types::NodeId;

/// The style that lays out `id`'s children.
///
/// ```rust
/// use kurbo::Rect;
/// use understory_tree_layout::{
///     effective_style, Layout, LayoutCx, LayoutError, LayoutRegistry, Tree,
/// };
///
/// #[derive(Default)]
/// struct Flat;
/// impl Layout for Flat {
///     fn layout(&mut self, _cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
///         Ok(())
///     }
/// }
///
/// let mut registry = LayoutRegistry::new();
/// registry.register_default::<Flat>("right");
///
/// let mut tree = Tree::new(Rect::ZERO);
/// let a = tree.insert(tree.root(), Rect::ZERO).unwrap();
/// assert_eq!(effective_style(&tree, &registry, a), Ok("right"));
///
/// tree.set_style_override(a, Some("radial".into())).unwrap();
/// assert_eq!(effective_style(&tree, &registry, a), Ok("radial"));
/// ```
pub fn effective_style<'a>(
    tree: &'a Tree,
    registry: &'a LayoutRegistry,
    id: NodeId,
) -> Result<&'a str, LayoutError> {
    let root = layout_root(tree, id).ok_or(LayoutError::StaleNode(id))?;
    match tree.style_override(root) {
        Some(style) => Ok(style),
        None => registry.default_style().ok_or(LayoutError::NoDefaultStyle),
    }
}

/// Whether `id` heads a style segment: it has an override or is the root.
///
/// Stale ids are never layout roots.
pub fn is_layout_root(tree: &Tree, id: NodeId) -> bool {
    tree.is_alive(id) && (tree.is_root(id) || tree.style_override(id).is_some())
}

/// The nearest layout root at or above `id`, or `None` if `id` is stale.
pub fn layout_root(tree: &Tree, id: NodeId) -> Option<NodeId> {
    if !tree.is_alive(id) {
        return None;
    }
    let mut at = id;
    loop {
        if is_layout_root(tree, at) {
            return Some(at);
        }
        // Only the root lacks a parent, and the root is always a layout root.
        at = tree.parent_of(at)?;
    }
}
