//! simplex_optimizer — argmin-powered bounded Nelder–Mead.
//!
//! Purpose
//! -------
//! Provide a derivative-free optimization layer for **minimizing noisy,
//! simulation-based objectives** over a box. Callers implement
//! [`StochasticObjective`] and invoke [`minimize_bounded`] with a start,
//! bounds, options, and a run seed.
//!
//! Key behaviors
//! -------------
//! - [`adapter::BoundedAdapter`] exposes the objective to argmin in an
//!   unconstrained space through a logistic box transform and applies the
//!   evaluation-seeding policy ([`EvalSeeding`]).
//! - [`builders`] construct the initial simplex and the configured solver.
//! - [`run::run_nelder_mead`] executes the solver and normalizes the final
//!   state into an [`OptimOutcome`] with a [`StopReason`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The objective only ever receives in-bounds model-space vectors.
//! - Given the same start, bounds, options and seed, a run is fully
//!   reproducible.
//! - Configuration is validated before the first evaluation.
//!
//! Conventions
//! -----------
//! - Lower cost is better; no sign flips happen in this layer.
//! - Errors bubble up as [`OptResult<T>`](crate::optimization::errors::OptResult);
//!   this module never logs (apart from the optional slog observer) and never
//!   panics.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize_bounded;
pub use self::traits::{
    EvalSeeding, NMOptions, OptimOutcome, StochasticObjective, StopReason, Tolerances,
};
pub use self::types::{Cost, DEFAULT_SIMPLEX_STEP, FnEvalMap, Theta};

pub mod prelude {
    pub use super::api::minimize_bounded;
    pub use super::traits::{
        EvalSeeding, NMOptions, OptimOutcome, StochasticObjective, StopReason, Tolerances,
    };
    pub use super::types::{Cost, Theta};
}
