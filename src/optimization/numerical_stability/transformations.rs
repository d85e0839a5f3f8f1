//! Numerical stability utilities for box-constrained optimization.
//!
//! Provides guarded logistic / logit transforms and a per-coordinate box
//! mapping between a bounded parameter space and the unconstrained space the
//! simplex solver explores.
//!
//! # Provided items
//! - [`LOGIT_EPS`]: clamp applied to unit-interval inputs before `logit`.
//! - [`safe_logistic(x)`]: `1 / (1 + exp(-x))` without overflow.
//! - [`safe_logit(p)`]: `ln(p / (1 - p))` with `p` clamped into
//!   `[LOGIT_EPS, 1 - LOGIT_EPS]`.
//! - [`BoxTransform`]: `x = lower + (upper - lower) · logistic(z)` per
//!   coordinate and its inverse.
//! - [`START_MARGIN`]: share of the box width a start keeps from either
//!   bound.

/// Unit-interval clamp for [`safe_logit`].
///
/// Keeps `logit` finite for points on (or numerically at) a bound. At this
/// margin `|logit| ≈ 20.7`.
pub const LOGIT_EPS: f64 = 1e-9;

/// Share of the box width between a start and either bound.
///
/// A start on a bound sits where the logistic is flat (`|z| ≈ 20.7` at
/// [`LOGIT_EPS`]), so a unit simplex step barely moves it. At this margin
/// `|z| ≈ 4.6`.
pub const START_MARGIN: f64 = 1e-2;

/// Numerically stable logistic function.
///
/// Branches on the sign of `x` so `exp` only ever sees a non-positive
/// argument.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Logit with the input clamped away from 0 and 1.
pub fn safe_logit(p: f64) -> f64 {
    let p = p.clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
    (p / (1.0 - p)).ln()
}

/// BoxTransform — coordinate-wise map between `[lower, upper]` and ℝ.
///
/// Every unconstrained vector maps to a point inside the box, so a solver
/// working on `z` can never propose an out-of-bounds candidate.
///
/// Invariants
/// ----------
/// - `lower.len() == upper.len()`; `lower[i] < upper[i]`, both finite.
///   Checked by the optimizer's validation layer before construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxTransform {
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl BoxTransform {
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> Self {
        BoxTransform { lower, upper }
    }

    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Map an unconstrained vector into the box.
    pub fn to_bounded(&self, z: &[f64]) -> Vec<f64> {
        z.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&zi, (&lo, &hi))| {
                let x = lo + (hi - lo) * safe_logistic(zi);
                x.clamp(lo, hi)
            })
            .collect()
    }

    /// Map a point of the box to unconstrained space. Points on or outside a
    /// bound are pulled in by [`LOGIT_EPS`] first.
    pub fn to_unbounded(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&xi, (&lo, &hi))| safe_logit((xi - lo) / (hi - lo)))
            .collect()
    }

    /// Clamp `x` into the box shrunk by `margin · (upper - lower)` on each
    /// side.
    pub fn pull_inside(&self, x: &[f64], margin: f64) -> Vec<f64> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&xi, (&lo, &hi))| {
                let pad = margin * (hi - lo);
                xi.clamp(lo + pad, hi - pad)
            })
            .collect()
    }

    /// Per-coordinate flags: `x[i]` within `rel_tol · (upper - lower)` of a
    /// bound.
    pub fn near_bounds(&self, x: &[f64], rel_tol: f64) -> Vec<bool> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&xi, (&lo, &hi))| {
                let tol = rel_tol * (hi - lo);
                xi - lo <= tol || hi - xi <= tol
            })
            .collect()
    }
}
