// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The full pipeline: layout, top-down apply, and animation ticks.

use core::time::Duration;
use kurbo::Affine;
use smallvec::SmallVec;

use crate::animation::{Animator, Timeline};
use crate::easing::Easing;
use crate::error::LayoutError;
use crate::event::{LayoutEvent, LayoutListener, Scene};
use crate::layout::layout_tree;
use crate::registry::LayoutRegistry;
use crate::tree::Tree;
use crate::types::NodeId;

/// Style name that clears a node's override in [`Layouter::set_style`].
pub const INHERIT: &str = "inherit";

/// Runs layout over a [`Tree`] and pushes the result to a [`Scene`].
///
/// The type parameter `A` selects the animator. It defaults to the built-in
/// [`Timeline`], which the host advances through [`Layouter::tick`].
///
/// A pass is synchronous: [`Layouter::layout`] computes every local transform,
/// composes them root to leaf, and either shows the result immediately or
/// starts one transition per node. A newer pass always cancels a node's
/// running transition before starting its own, so at most one transition
/// per node is ever in flight and the last request wins.
///
/// ## Example
///
/// ```rust
/// use core::time::Duration;
/// use kurbo::{Affine, Rect, Vec2};
/// use understory_tree_layout::{
///     Layout, LayoutCx, LayoutError, LayoutEvent, LayoutRegistry, Layouter, Tree,
/// };
///
/// #[derive(Default)]
/// struct Right;
///
/// impl Layout for Right {
///     fn layout(&mut self, cx: &mut LayoutCx<'_>) -> Result<(), LayoutError> {
///         for child in cx.children().to_vec() {
///             cx.set_child_transform(child, Affine::translate(Vec2::new(100.0, 0.0)))?;
///         }
///         Ok(())
///     }
/// }
///
/// let mut registry = LayoutRegistry::new();
/// registry.register_default::<Right>("right");
/// let mut layouter = Layouter::new(registry);
///
/// let mut tree = Tree::new(Rect::new(0.0, 0.0, 50.0, 20.0));
/// let a = tree.insert(tree.root(), Rect::new(0.0, 0.0, 50.0, 20.0)).unwrap();
/// let b = tree.insert(a, Rect::new(0.0, 0.0, 50.0, 20.0)).unwrap();
///
/// let mut events: Vec<LayoutEvent> = Vec::new();
/// layouter.layout(&mut tree, Duration::ZERO, &mut (), &mut events).unwrap();
///
/// assert_eq!(tree.last_applied(b), Some(Affine::translate(Vec2::new(200.0, 0.0))));
/// assert_eq!(events.last(), Some(&LayoutEvent::Complete));
/// ```
#[derive(Debug)]
pub struct Layouter<A: Animator = Timeline> {
    registry: LayoutRegistry,
    animator: A,
    easing: Easing,
}

impl Layouter {
    /// A layouter using `registry` and the built-in [`Timeline`].
    pub fn new(registry: LayoutRegistry) -> Self {
        Self::with_animator(registry, Timeline::new())
    }
}

impl<A: Animator> Layouter<A> {
    /// A layouter using `registry` and a custom animator.
    pub fn with_animator(registry: LayoutRegistry, animator: A) -> Self {
        Self {
            registry,
            animator,
            easing: Easing::default(),
        }
    }

    /// The style registry.
    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    /// Mutable access to the style registry, for registering more styles.
    pub fn registry_mut(&mut self) -> &mut LayoutRegistry {
        &mut self.registry
    }

    /// The animator.
    pub fn animator(&self) -> &A {
        &self.animator
    }

    /// Curve used for transitions started from now on.
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Change the curve used for transitions started from now on.
    pub fn set_easing(&mut self, easing: Easing) {
        self.easing = easing;
    }

    /// The style that lays out `id`'s children.
    pub fn effective_style<'a>(&'a self, tree: &'a Tree, id: NodeId) -> Result<&'a str, LayoutError> {
        crate::style::effective_style(tree, &self.registry, id)
    }

    /// Lay out the whole tree and apply the result.
    ///
    /// With a zero `duration` every node is shown at its new place before this
    /// returns. Otherwise each node gets a transition that [`Layouter::tick`]
    /// plays out. Either way [`LayoutEvent::Complete`] is emitted once at the
    /// end.
    ///
    /// A layout error aborts before anything is applied.
    pub fn layout(
        &mut self,
        tree: &mut Tree,
        duration: Duration,
        scene: &mut impl Scene,
        listener: &mut impl LayoutListener,
    ) -> Result<(), LayoutError> {
        layout_tree(tree, &self.registry)?;
        self.apply_layout_result(tree, duration, scene, listener)
    }

    /// Set or clear a node's style, then lay out the whole tree.
    ///
    /// [`INHERIT`] clears the override. Any other name must already be
    /// registered; an unknown name is rejected before the tree is touched.
    pub fn set_style(
        &mut self,
        tree: &mut Tree,
        node: NodeId,
        style: &str,
        duration: Duration,
        scene: &mut impl Scene,
        listener: &mut impl LayoutListener,
    ) -> Result<(), LayoutError> {
        let style = if style == INHERIT {
            None
        } else if self.registry.contains(style) {
            Some(style.into())
        } else {
            return Err(LayoutError::UnknownStyle(style.into()));
        };
        tree.set_style_override(node, style)?;
        self.layout(tree, duration, scene, listener)
    }

    /// Compose the local transforms computed by the last layout pass and
    /// show them.
    ///
    /// Parents are visited before children. For each node the composed
    /// transform is `translate(offset) * parent * local`, so the offset moves
    /// the node by exactly its own amount, never rotated or scaled. Any running
    /// transition on the node is cancelled, then the new transform is either
    /// shown directly (zero `duration`) or animated from the last shown one.
    ///
    /// Every node is re-applied and re-announced on every pass, even when its
    /// transform did not change; listeners can rely on one `Applied` per node
    /// per pass.
    pub fn apply_layout_result(
        &mut self,
        tree: &mut Tree,
        duration: Duration,
        scene: &mut impl Scene,
        listener: &mut impl LayoutListener,
    ) -> Result<(), LayoutError> {
        let animate = !duration.is_zero();
        log::debug!(
            "applying layout to {} nodes ({})",
            tree.len(),
            if animate { "animated" } else { "immediate" }
        );

        // Parents are popped before their children; children are pushed in
        // reverse so they are visited in order.
        let mut stack: SmallVec<[(NodeId, Affine); 32]> = SmallVec::new();
        stack.push((tree.root(), Affine::IDENTITY));

        while let Some((id, parent_tf)) = stack.pop() {
            let state = tree.state_mut(id)?;
            let local = state.local_transform_or_identity();
            let offset = state.layout_offset.to_vec2();
            let composed = Affine::translate(offset) * parent_tf * local;
            let last = state.last_applied_or_identity();

            // Informational only: unchanged nodes are still re-applied.
            log::trace!(
                "node {}: {}",
                id.index(),
                if composed == last { "unchanged" } else { "moved" }
            );

            if let Some(handle) = state.animation.take() {
                self.animator.cancel(handle);
            }

            let started = if animate {
                match self
                    .animator
                    .start(id, last, composed, duration, self.easing)
                {
                    Ok(handle) => Some(handle),
                    Err(err) => {
                        log::warn!(
                            "node {}: {err}; applying without animation",
                            id.index()
                        );
                        None
                    }
                }
            } else {
                None
            };

            match started {
                Some(handle) => state.animation = Some(handle),
                None => {
                    state.last_applied = Some(composed);
                    scene.set_transform(id, composed);
                    listener.on_event(&LayoutEvent::Applied {
                        node: id,
                        transform: composed,
                    });
                }
            }

            for &child in tree.children_of(id).iter().rev() {
                stack.push((child, composed));
            }
        }

        listener.on_event(&LayoutEvent::Complete);
        Ok(())
    }

    /// Advance running transitions by `dt`.
    ///
    /// Each frame is shown, recorded as the node's last applied transform,
    /// and announced with [`LayoutEvent::Applied`]. A node's handle is cleared
    /// when its transition finishes. Frames for removed nodes, or for a
    /// transition a newer pass has already replaced, are dropped.
    ///
    /// Returns the number of frames applied.
    pub fn tick(
        &mut self,
        tree: &mut Tree,
        dt: Duration,
        scene: &mut impl Scene,
        listener: &mut impl LayoutListener,
    ) -> usize {
        let mut applied = 0;
        for frame in self.animator.advance(dt) {
            let Ok(state) = tree.state_mut(frame.node) else {
                log::trace!("dropping frame for removed node {}", frame.node.index());
                continue;
            };
            if state.animation != Some(frame.handle) {
                continue;
            }
            state.last_applied = Some(frame.value);
            if frame.finished {
                state.animation = None;
            }
            scene.set_transform(frame.node, frame.value);
            listener.on_event(&LayoutEvent::Applied {
                node: frame.node,
                transform: frame.value,
            });
            applied += 1;
        }
        applied
    }
}
