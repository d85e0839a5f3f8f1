//! diffusion::models — simulation-based objective and parameter recovery.
//!
//! Purpose
//! -------
//! Turn the simulator into an estimator: [`objective`] scores a candidate
//! parameter vector against a binned target, and [`recovery`] minimizes that
//! score from several random starts and reports every run.
//!
//! Key behaviors
//! -------------
//! - [`BinnedObjective`] simulates `n_sim` trials at a candidate, bins them
//!   on the target's edges and returns a [`Discrepancy`] score. Candidates
//!   that violate parameter invariants cost [`INFEASIBLE_COST`].
//! - [`recover_parameters`] runs bounded Nelder–Mead starts (optionally in
//!   parallel), selects the best run and summarizes the rest in
//!   [`RecoveryDiagnostics`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Target and simulated tables always share one set of [`BinEdges`].
//! - With a fixed global seed, recovery output is identical run to run.
//!
//! [`BinEdges`]: crate::diffusion::core::BinEdges

pub mod objective;
pub mod recovery;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::objective::{
    BinnedObjective, DEFAULT_DEVIANCE_EPSILON, Discrepancy, INFEASIBLE_COST,
};
pub use self::recovery::{
    CancelToken, ConvergenceQuality, OptimizationRun, ParameterSpace, RecoveryDiagnostics,
    RecoveryOptions, RecoveryResult, RunStatus, recover_parameters,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::objective::{BinnedObjective, Discrepancy};
    pub use super::recovery::{
        CancelToken, ConvergenceQuality, ParameterSpace, RecoveryOptions, RecoveryResult,
        RunStatus, recover_parameters,
    };
}
