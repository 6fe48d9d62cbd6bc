// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timing curves for layout transitions.

/// Timing curve applied to the progress of a transition.
///
/// The named curves match the CSS keywords of the same name.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    #[default]
    Ease,
    /// `cubic-bezier(0.42, 0.0, 1.0, 1.0)`.
    EaseIn,
    /// `cubic-bezier(0.0, 0.0, 0.58, 1.0)`.
    EaseOut,
    /// `cubic-bezier(0.42, 0.0, 0.58, 1.0)`.
    EaseInOut,
}

impl Easing {
    /// Map linear progress `t` in `[0, 1]` to eased progress.
    ///
    /// Inputs outside the unit interval are clamped; the endpoints map to
    /// exactly `0.0` and `1.0`.
    ///
    /// ```
    /// use understory_tree_layout::Easing;
    ///
    /// assert_eq!(Easing::Ease.apply(0.0), 0.0);
    /// assert_eq!(Easing::Ease.apply(1.0), 1.0);
    /// assert!(Easing::EaseIn.apply(0.25) < 0.25);
    /// ```
    pub fn apply(self, t: f64) -> f64 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        match self {
            Self::Linear => t,
            Self::Ease => CubicBezier::new(0.25, 0.1, 0.25, 1.0).solve(t),
            Self::EaseIn => CubicBezier::new(0.42, 0.0, 1.0, 1.0).solve(t),
            Self::EaseOut => CubicBezier::new(0.0, 0.0, 0.58, 1.0).solve(t),
            Self::EaseInOut => CubicBezier::new(0.42, 0.0, 0.58, 1.0).solve(t),
        }
    }
}

/// Unit cubic Bézier with fixed endpoints `(0, 0)` and `(1, 1)`, in
/// polynomial form.
#[derive(Copy, Clone, Debug)]
struct CubicBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

const EPSILON: f64 = 1e-7;

impl CubicBezier {
    fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let ax = 1.0 - cx - bx;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        let ay = 1.0 - cy - by;
        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    fn sample_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn slope_x(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    /// Find the curve parameter whose x equals `x`: Newton first, bisection
    /// when the slope flattens out.
    fn param_for_x(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..8 {
            let err = self.sample_x(t) - x;
            if err.abs() < EPSILON {
                return t;
            }
            let d = self.slope_x(t);
            if d.abs() < 1e-6 {
                break;
            }
            t -= err / d;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        t = x;
        for _ in 0..64 {
            let v = self.sample_x(t);
            if (v - x).abs() < EPSILON {
                break;
            }
            if x > v {
                lo = t;
            } else {
                hi = t;
            }
            t = (lo + hi) * 0.5;
        }
        t
    }

    fn solve(&self, x: f64) -> f64 {
        self.sample_y(self.param_for_x(x))
    }
}
