//! optimization — bounded simplex stack, numerical helpers, and unified
//! error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer used for parameter recovery: an
//! argmin-backed Nelder–Mead optimizer over box constraints, the transforms
//! that keep its iterates inside the box, and a single error/result surface.
//! Callers implement a stochastic objective, choose tolerances and a seed
//! policy, and obtain the best vector with its stop reason.
//!
//! Key behaviors
//! -------------
//! - `simplex_optimizer`: [`minimize_bounded`](simplex_optimizer::minimize_bounded)
//!   plus its options, adapter, builders and runner.
//! - `numerical_stability`: logistic / logit transforms and `BoxTransform`.
//! - `errors`: `OptError` / `OptResult`, with conversions from argmin errors
//!   and to and from the model error type.
//!
//! Conventions
//! -----------
//! - Parameter vectors are plain `Vec<f64>` (`Theta`).
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw argmin errors.
//! - This module avoids I/O and `tracing`; the recovery layer reports
//!   progress.

pub mod errors;
pub mod numerical_stability;
pub mod simplex_optimizer;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::numerical_stability::prelude::*;
    pub use super::simplex_optimizer::prelude::*;
}
