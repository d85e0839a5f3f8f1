//! numerical_stability — guarded transforms for bounded optimization.
//!
//! Purpose
//! -------
//! Collect the scalar transforms and the box mapping that let an
//! unconstrained simplex search operate on box-constrained parameters.
//! The rest of the optimization layer assumes these helpers keep `f64`
//! arithmetic finite.
//!
//! Key behaviors
//! -------------
//! - `safe_logistic` / `safe_logit`: overflow-free maps between ℝ and
//!   `(0, 1)`.
//! - `BoxTransform`: coordinate-wise `[lower, upper] ↔ ℝ` mapping used by
//!   the simplex adapter; every optimizer iterate maps to an in-bounds
//!   candidate.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; bounds are validated upstream (`lower < upper`).
//! - This module never logs or touches global state.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    BoxTransform, LOGIT_EPS, START_MARGIN, safe_logistic, safe_logit,
};

pub mod prelude {
    pub use super::transformations::{
        BoxTransform, LOGIT_EPS, START_MARGIN, safe_logistic, safe_logit,
    };
}
