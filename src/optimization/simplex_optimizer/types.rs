//! simplex_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the numeric types and the Nelder–Mead solver alias used by the
//! bounded simplex optimizer so the rest of the layer stays agnostic to
//! argmin generics.
//!
//! Conventions
//! -----------
//! - `Theta` is a plain `Vec<f64>` (argmin-math's `vec` backend). Vectors
//!   are short (one entry per free parameter) and cross the objective
//!   boundary as slices.
//! - `Cost` is the scalar discrepancy being minimized.
use argmin::solver::neldermead::NelderMead;
use std::collections::HashMap;

/// Parameter vector `θ`, either in model space or in the solver's
/// unconstrained space depending on context.
pub type Theta = Vec<f64>;

/// Scalar objective value (lower is better).
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Nelder–Mead solver specialized to this crate's numeric types.
pub type SimplexSolver = NelderMead<Theta, Cost>;

/// Default edge length of the initial simplex in unconstrained space.
///
/// Near the centre of a box a unit logit step moves a coordinate by about a
/// quarter of its range.
pub const DEFAULT_SIMPLEX_STEP: f64 = 1.0;
