//! diffusion::core — parameters, simulation, and binned summaries.
//!
//! Purpose
//! -------
//! Hold the building blocks of the drift-diffusion stack: validated model
//! parameters, simulator options and seeding, the single-trial
//! Euler–Maruyama walk, whole-experiment simulation, and the binned
//! response-time tables used as fitting targets.
//!
//! Key behaviors
//! -------------
//! - [`params`]: [`DDMParams`], [`ParamName`] and [`ParamOverrides`].
//! - [`options`]: [`SimOpts`] (step size, step budget, seed, recording).
//! - [`seeding`]: deterministic child seeds and per-stream RNGs.
//! - [`trial`]: per-trial variability draws and the bounded random walk.
//! - [`experiment`]: [`ExperimentData`], [`simulate_experiment`] and
//!   [`simulate_conditions`].
//! - [`bins`]: [`BinEdges`], [`RTBinTable`] and [`binned_proportions`].
//! - [`validation`]: scalar validators shared by the types above.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every [`DDMParams`] value reachable through a constructor satisfies
//!   `a > 0`, `0 < mean_z < a`, `s > 0`, `mean_ter >= 0` and non-negative
//!   variabilities.
//! - Trial `i` of an experiment with seed `s` is a pure function of
//!   `(params, dt, max_steps, s, i)`.
//! - Bin tables carry all of their mass: upper + lower + timeout +
//!   out-of-range proportions sum to one.
//!
//! Conventions
//! -----------
//! - Times are in seconds; `rt` includes non-decision time.
//! - Timeouts are explicit outcomes and never carry a response time.

pub mod bins;
pub mod experiment;
pub mod options;
pub mod params;
pub mod seeding;
pub mod trial;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bins::{BinEdges, BinRow, RTBinTable, binned_proportions};
pub use self::experiment::{
    ExperimentColumns, ExperimentData, simulate_conditions, simulate_experiment,
};
pub use self::options::{DEFAULT_DT, DEFAULT_MAX_STEPS, SimOpts};
pub use self::params::{DDMParams, ParamName, ParamOverrides};
pub use self::seeding::{derive_seed, resolve_seed, stream_rng};
pub use self::trial::{
    Choice, SampledParams, Trial, TrialOutcome, sample_trial_params, simulate_trial,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use drift_diffusion::diffusion::core::prelude::*;
//
// to import the main simulation surface in a single line.

pub mod prelude {
    pub use super::bins::{BinEdges, RTBinTable, binned_proportions};
    pub use super::experiment::{ExperimentData, simulate_conditions, simulate_experiment};
    pub use super::options::SimOpts;
    pub use super::params::{DDMParams, ParamName, ParamOverrides};
    pub use super::trial::{Choice, Trial, TrialOutcome};
}
