// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interruptible transform transitions.
//!
//! The apply pass never sleeps or spawns: it hands each transition to an
//! [`Animator`] and later drains frames from it when the host's clock says
//! time has passed (see [`Layouter::tick`](crate::Layouter::tick)).
//!
//! [`Timeline`] is the built-in animator. It keeps a flat list of tweens and
//! advances them by whatever `dt` it is given, which keeps it deterministic
//! under test and lets any frame source (a display link, `requestAnimationFrame`,
//! a fixed-step loop) drive it.

use alloc::vec::Vec;
use core::time::Duration;
use kurbo::Affine;

use crate::easing::Easing;
use crate::error::AnimationError;
use crate::geometry::lerp_affine;
use crate::types::NodeId;

/// Handle to one in-flight transition.
///
/// Handles are never reused by the animator that issued them, so a stale
/// handle cannot cancel a newer transition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationHandle(pub(crate) u64);

impl AnimationHandle {
    /// Build a handle from a raw value. Intended for custom [`Animator`]s.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value of this handle.
    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// One interpolated value produced by [`Animator::advance`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimationFrame {
    /// The transition this frame belongs to.
    pub handle: AnimationHandle,
    /// The node being animated.
    pub node: NodeId,
    /// Interpolated transform for this frame.
    pub value: Affine,
    /// Whether this is the last frame; `value` is then the target exactly.
    pub finished: bool,
}

/// Source of transform transitions consumed by the apply pass.
pub trait Animator {
    /// Begin a transition of `node` from `from` to `to` over `duration`.
    fn start(
        &mut self,
        node: NodeId,
        from: Affine,
        to: Affine,
        duration: Duration,
        easing: Easing,
    ) -> Result<AnimationHandle, AnimationError>;

    /// Stop a transition. Returns `false` if it had already finished or was
    /// cancelled before.
    fn cancel(&mut self, handle: AnimationHandle) -> bool;

    /// Move every transition forward by `dt` and return one frame per
    /// transition that was active. Finished transitions are dropped after
    /// their final frame.
    fn advance(&mut self, dt: Duration) -> Vec<AnimationFrame>;
}

#[derive(Clone, Debug)]
struct Tween {
    handle: AnimationHandle,
    node: NodeId,
    from: Affine,
    to: Affine,
    duration: Duration,
    elapsed: Duration,
    easing: Easing,
}

impl Tween {
    fn progress(&self) -> f64 {
        if self.duration.is_zero() || self.elapsed >= self.duration {
            return 1.0;
        }
        self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
    }
}

/// Built-in [`Animator`] advanced by an external clock.
///
/// ## Example
///
/// ```rust
/// use core::time::Duration;
/// use kurbo::{Affine, Vec2};
/// use understory_tree_layout::{Animator, Easing, Timeline, Tree};
///
/// let tree = Tree::new(kurbo::Rect::ZERO);
/// let mut timeline = Timeline::new();
/// let to = Affine::translate(Vec2::new(100.0, 0.0));
/// timeline
///     .start(tree.root(), Affine::IDENTITY, to, Duration::from_millis(200), Easing::Linear)
///     .unwrap();
///
/// let half = timeline.advance(Duration::from_millis(100));
/// assert_eq!(half[0].value, Affine::translate(Vec2::new(50.0, 0.0)));
/// assert!(!half[0].finished);
///
/// let end = timeline.advance(Duration::from_millis(100));
/// assert_eq!(end[0].value, to);
/// assert!(end[0].finished);
/// assert!(timeline.is_empty());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    tweens: Vec<Tween>,
    next_handle: u64,
}

impl Timeline {
    /// An idle timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of transitions in flight.
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    /// Whether no transition is in flight.
    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Whether `handle` is still in flight.
    pub fn is_active(&self, handle: AnimationHandle) -> bool {
        self.tweens.iter().any(|t| t.handle == handle)
    }

    /// Number of transitions in flight for `node`.
    pub fn active_for(&self, node: NodeId) -> usize {
        self.tweens.iter().filter(|t| t.node == node).count()
    }
}

impl Animator for Timeline {
    fn start(
        &mut self,
        node: NodeId,
        from: Affine,
        to: Affine,
        duration: Duration,
        easing: Easing,
    ) -> Result<AnimationHandle, AnimationError> {
        let handle = AnimationHandle(self.next_handle);
        self.next_handle += 1;
        self.tweens.push(Tween {
            handle,
            node,
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing,
        });
        Ok(handle)
    }

    fn cancel(&mut self, handle: AnimationHandle) -> bool {
        let before = self.tweens.len();
        self.tweens.retain(|t| t.handle != handle);
        self.tweens.len() != before
    }

    fn advance(&mut self, dt: Duration) -> Vec<AnimationFrame> {
        let mut frames = Vec::with_capacity(self.tweens.len());
        for tween in &mut self.tweens {
            tween.elapsed = tween.elapsed.saturating_add(dt);
            let p = tween.progress();
            let finished = p >= 1.0;
            let value = if finished {
                tween.to
            } else {
                lerp_affine(tween.from, tween.to, tween.easing.apply(p))
            };
            frames.push(AnimationFrame {
                handle: tween.handle,
                node: tween.node,
                value,
                finished,
            });
        }
        self.tweens.retain(|t| t.progress() < 1.0);
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    fn node(i: u32) -> NodeId {
        NodeId::new(i, 1)
    }

    #[test]
    fn handles_are_unique() {
        let mut tl = Timeline::new();
        let d = Duration::from_millis(10);
        let a = tl
            .start(node(0), Affine::IDENTITY, Affine::IDENTITY, d, Easing::Linear)
            .unwrap();
        let b = tl
            .start(node(0), Affine::IDENTITY, Affine::IDENTITY, d, Easing::Linear)
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(tl.active_for(node(0)), 2);
    }

    #[test]
    fn cancel_removes_only_that_tween() {
        let mut tl = Timeline::new();
        let d = Duration::from_millis(10);
        let a = tl
            .start(node(0), Affine::IDENTITY, Affine::IDENTITY, d, Easing::Linear)
            .unwrap();
        let b = tl
            .start(node(1), Affine::IDENTITY, Affine::IDENTITY, d, Easing::Linear)
            .unwrap();
        assert!(tl.cancel(a));
        assert!(!tl.cancel(a), "second cancel is a no-op");
        assert!(!tl.is_active(a));
        assert!(tl.is_active(b));

        let frames = tl.advance(Duration::from_millis(1));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].handle, b);
    }

    #[test]
    fn overshooting_dt_lands_on_target() {
        let mut tl = Timeline::new();
        let to = Affine::translate(Vec2::new(10.0, 20.0));
        tl.start(
            node(0),
            Affine::IDENTITY,
            to,
            Duration::from_millis(50),
            Easing::Ease,
        )
        .unwrap();
        let frames = tl.advance(Duration::from_secs(5));
        assert_eq!(frames.len(), 1);
        assert!(frames[0].finished);
        assert_eq!(frames[0].value, to);
        assert!(tl.advance(Duration::from_millis(1)).is_empty());
    }

    #[test]
    fn eased_frames_follow_the_curve() {
        let mut tl = Timeline::new();
        let to = Affine::translate(Vec2::new(100.0, 0.0));
        tl.start(
            node(0),
            Affine::IDENTITY,
            to,
            Duration::from_millis(100),
            Easing::EaseIn,
        )
        .unwrap();
        let frames = tl.advance(Duration::from_millis(50));
        let x = frames[0].value.translation().x;
        assert!(x > 0.0 && x < 50.0, "ease-in lags behind linear, got {x}");
    }
}
