// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_tree_layout --heading-base-level=0

//! Understory Tree Layout: pluggable layout for node diagrams such as mind maps.
//!
//! Given a rooted tree whose nodes each carry the box of their visible content,
//! this crate computes where every node goes, composes those placements down the
//! tree, and pushes the result to whatever draws the scene, optionally as an
//! interruptible animation.
//!
//! - Layout styles are pluggable: implement [`Layout`] and register it by name in
//!   a [`LayoutRegistry`].
//! - Styles are inherited: a node uses its own style override or its parent's,
//!   and the root falls back to the registry default.
//! - One [`Layouter::layout`] call runs two passes: a bottom-up layout pass and a
//!   top-down apply pass.
//!
//! ## Passes
//!
//! The *layout pass* ([`layout_tree`]) clears every node's local transform, then
//! visits nodes children-first. For each node a fresh instance of its effective
//! style positions the node's direct children relative to it. Since children are
//! finished first, a style can measure whole child subtrees with
//! [`LayoutCx::tree_box`] before placing them.
//!
//! The *apply pass* ([`Layouter::apply_layout_result`]) walks parents before
//! children and composes `translate(offset) * parent * local` for each node.
//! The user [`offset`](Tree::set_layout_offset) is a plain shift in scene
//! space, unaffected by any rotation or scale the layout gave the node, and it
//! survives relayout. The composed transform is then shown through the
//! [`Scene`] at once, or handed to the [`Animator`] as a transition from the
//! last shown transform. A [`LayoutEvent::Applied`] goes to the
//! [`LayoutListener`] for every node shown, and a single
//! [`LayoutEvent::Complete`] ends the pass.
//!
//! ## Animation
//!
//! Transitions never run on their own. The host advances them with
//! [`Layouter::tick`] from whatever clock it has. Each node holds at most one
//! transition: a new pass cancels the running one before starting its own, and
//! the new one starts from wherever the old one had got to.
//!
//! ## Not a measurement or editing layer
//!
//! Content boxes come from the caller, who measures text and shapes however it
//! draws them. The tree here only supports the structure edits that layout
//! needs to be tested and driven (insert and remove). Concrete styles such as
//! right-growing trees or radial maps live outside this crate, built on the
//! [`Layout`] contract.
//!
//! ## Example
//!
//! ```rust
//! use core::time::Duration;
//! use kurbo::{Affine, Rect, Vec2};
//! use understory_tree_layout::{
//!     Layout, LayoutCx, LayoutError, LayoutRegistry, Layouter, NodeId, Tree,
//! };
//!
//! /// Puts children in a column to the right of their parent.
//! #[derive(Default)]
//! struct RightTree;
//!
//! impl Layout for RightTree {
//!     fn layout(&mut self, cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
//!         let parent = cx.branch_box(&[cx.node()]);
//!         let mut y = 0.0;
//!         for child in cx.children().to_vec() {
//!             let subtree = cx.tree_box(&[child]);
//!             cx.set_child_transform(child, Affine::translate(Vec2::new(parent.x1 + 30.0, y)))?;
//!             y += subtree.height() + 10.0;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = LayoutRegistry::new();
//! registry.register_default::<RightTree>("right");
//! let mut layouter = Layouter::new(registry);
//!
//! let mut tree = Tree::new(Rect::new(0.0, 0.0, 100.0, 30.0));
//! let root = tree.root();
//! let first = tree.insert(root, Rect::new(0.0, 0.0, 60.0, 20.0)).unwrap();
//! let second = tree.insert(root, Rect::new(0.0, 0.0, 60.0, 20.0)).unwrap();
//!
//! // Animate over 300ms, driven by the host's frame clock.
//! let mut moved = Vec::new();
//! let mut scene = |node: NodeId, tf: Affine| moved.push((node, tf));
//! layouter.layout(&mut tree, Duration::from_millis(300), &mut scene, &mut ()).unwrap();
//! while layouter.tick(&mut tree, Duration::from_millis(16), &mut scene, &mut ()) > 0 {}
//!
//! assert_eq!(tree.layout_point(first), Some(kurbo::Point::new(130.0, 0.0)));
//! assert_eq!(tree.layout_point(second), Some(kurbo::Point::new(130.0, 30.0)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod animation;
mod easing;
mod engine;
mod error;
mod event;
mod geometry;
mod layout;
mod registry;
mod style;
mod tree;
mod types;

pub use animation::{AnimationFrame, AnimationHandle, Animator, Timeline};
pub use easing::Easing;
pub use engine::{INHERIT, Layouter};
pub use error::{AnimationError, LayoutError};
pub use event::{LayoutEvent, LayoutListener, Scene};
pub use geometry::{BoxUnion, lerp_affine, merge_boxes, transform_box};
pub use layout::{Layout, LayoutCx, branch_box, layout_tree, tree_box};
pub use registry::{LayoutFactory, LayoutRegistry};
pub use style::{effective_style, is_layout_root, layout_root};
pub use tree::{DepthFirst, Tree};
pub use types::{LayoutState, NodeId};
