//! diffusion — drift-diffusion simulation and parameter recovery.
//!
//! Purpose
//! -------
//! Provide the crate's main surface: simulate two-choice response-time
//! experiments from a drift-diffusion model with trial-to-trial variability,
//! summarize them as binned response-time proportions, and recover model
//! parameters from such summaries with a multi-start simplex search.
//!
//! Key behaviors
//! -------------
//! - [`core`]: parameters, simulator options, seeding, trials, experiments
//!   and bin tables.
//! - [`models`]: the simulation-based objective and multi-start recovery.
//! - [`errors`]: [`DDMError`] / [`ParamError`] and their result aliases.
//!
//! Invariants & assumptions
//! ------------------------
//! - Invalid configuration is rejected before any simulation runs.
//! - Randomness is always seeded through [`core::seeding`], so every public
//!   operation is reproducible given its seed.
//!
//! Conventions
//! -----------
//! - Choice codes: `1` = upper boundary, `0` = lower boundary.
//! - Errors are returned as [`DDMResult`]; nothing in this module panics on
//!   user input.

pub mod core;
pub mod errors;
pub mod models;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{
    BinEdges, Choice, DDMParams, ExperimentData, ParamName, ParamOverrides, RTBinTable, SimOpts,
    Trial, TrialOutcome, binned_proportions, simulate_conditions, simulate_experiment,
};
pub use self::errors::{DDMError, DDMResult, ParamError, ParamResult};
pub use self::models::{
    BinnedObjective, CancelToken, ConvergenceQuality, Discrepancy, OptimizationRun,
    ParameterSpace, RecoveryOptions, RecoveryResult, RunStatus, recover_parameters,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use drift_diffusion::diffusion::prelude::*;
//
// to import simulation and recovery in a single line.

pub mod prelude {
    pub use super::{
        BinEdges, CancelToken, Choice, DDMError, DDMParams, DDMResult, Discrepancy,
        ExperimentData, ParamName, ParameterSpace, RTBinTable, RecoveryOptions, RecoveryResult,
        RunStatus, SimOpts, TrialOutcome, binned_proportions, recover_parameters,
        simulate_experiment,
    };
}
