// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Box and transform helpers shared by every layout style.

use kurbo::{Affine, Rect};

/// Transform an axis-aligned `Rect` by an `Affine` and return the
/// axis-aligned bounding box of the result.
///
/// For rotations and shears the box is loose: it contains every transformed
/// corner but is not the tightest fit of the rotated shape.
///
/// ```
/// use kurbo::{Affine, Rect, Vec2};
/// use understory_tree_layout::transform_box;
///
/// let moved = transform_box(
///     Affine::translate(Vec2::new(100.0, 0.0)),
///     Rect::new(0.0, 0.0, 20.0, 10.0),
/// );
/// assert_eq!(moved, Rect::new(100.0, 0.0, 120.0, 10.0));
/// ```
pub fn transform_box(affine: Affine, rect: Rect) -> Rect {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    let min_x = (a * rect.x0).min(a * rect.x1) + (c * rect.y0).min(c * rect.y1);
    let max_x = (a * rect.x0).max(a * rect.x1) + (c * rect.y0).max(c * rect.y1);
    let min_y = (b * rect.x0).min(b * rect.x1) + (d * rect.y0).min(d * rect.y1);
    let max_y = (b * rect.x0).max(b * rect.x1) + (d * rect.y0).max(d * rect.y1);
    Rect::new(min_x + e, min_y + f, max_x + e, max_y + f)
}

/// Smallest axis-aligned box covering both inputs.
#[inline]
pub fn merge_boxes(a: Rect, b: Rect) -> Rect {
    a.abs().union(b.abs())
}

/// Running union of boxes.
///
/// Nothing is merged until the first real box arrives, so the origin never
/// leaks into the result. An accumulator that saw no boxes finishes as
/// [`Rect::ZERO`].
///
/// ```
/// use kurbo::Rect;
/// use understory_tree_layout::BoxUnion;
///
/// assert_eq!(BoxUnion::new().finish(), Rect::ZERO);
///
/// let mut u = BoxUnion::new();
/// u.add(Rect::new(10.0, 10.0, 20.0, 20.0));
/// assert_eq!(u.finish(), Rect::new(10.0, 10.0, 20.0, 20.0));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxUnion {
    acc: Option<Rect>,
}

impl BoxUnion {
    /// An empty accumulator.
    pub const fn new() -> Self {
        Self { acc: None }
    }

    /// Merge `rect` into the running union.
    pub fn add(&mut self, rect: Rect) {
        self.acc = Some(match self.acc {
            Some(acc) => merge_boxes(acc, rect),
            None => rect.abs(),
        });
    }

    /// Whether no box has been added yet.
    pub fn is_empty(&self) -> bool {
        self.acc.is_none()
    }

    /// The union, or [`Rect::ZERO`] if nothing was added.
    pub fn finish(self) -> Rect {
        self.acc.unwrap_or(Rect::ZERO)
    }
}

impl Extend<Rect> for BoxUnion {
    fn extend<I: IntoIterator<Item = Rect>>(&mut self, iter: I) {
        for r in iter {
            self.add(r);
        }
    }
}

impl FromIterator<Rect> for BoxUnion {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        let mut u = Self::new();
        u.extend(iter);
        u
    }
}

/// Component-wise interpolation between two affine transforms.
///
/// `t = 0` yields `from` and `t = 1` yields `to` exactly.
pub fn lerp_affine(from: Affine, to: Affine, t: f64) -> Affine {
    if t <= 0.0 {
        return from;
    }
    if t >= 1.0 {
        return to;
    }
    let a = from.as_coeffs();
    let b = to.as_coeffs();
    let mut out = [0.0; 6];
    for (o, (x, y)) in out.iter_mut().zip(a.iter().zip(b.iter())) {
        *o = x + (y - x) * t;
    }
    Affine::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;
    use kurbo::Vec2;

    #[test]
    fn merge_covers_both() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, -5.0, 30.0, 5.0);
        assert_eq!(merge_boxes(a, b), Rect::new(0.0, -5.0, 30.0, 10.0));
    }

    #[test]
    fn union_does_not_pull_in_origin() {
        let far = Rect::new(100.0, 100.0, 110.0, 120.0);
        let u: BoxUnion = [far].into_iter().collect();
        assert_eq!(u.finish(), far, "a single box must come back unchanged");
    }

    #[test]
    fn empty_union_is_zero() {
        let u: BoxUnion = core::iter::empty().collect();
        assert!(u.is_empty());
        assert_eq!(u.finish(), Rect::ZERO);
    }

    #[test]
    fn quarter_turn_swaps_extents() {
        let r = transform_box(Affine::rotate(FRAC_PI_2), Rect::new(0.0, 0.0, 20.0, 10.0));
        assert!((r.x0 + 10.0).abs() < 1e-9);
        assert!(r.x1.abs() < 1e-9);
        assert!(r.y0.abs() < 1e-9);
        assert!((r.y1 - 20.0).abs() < 1e-9);
    }

    #[test]
    fn lerp_hits_endpoints_and_midpoint() {
        let from = Affine::IDENTITY;
        let to = Affine::translate(Vec2::new(100.0, 40.0));
        assert_eq!(lerp_affine(from, to, 0.0), from);
        assert_eq!(lerp_affine(from, to, 1.0), to);
        assert_eq!(
            lerp_affine(from, to, 0.5),
            Affine::translate(Vec2::new(50.0, 20.0))
        );
    }
}
