//! Simulation options — step size, step budget, seeding, and what to retain.
//!
//! Purpose
//! -------
//! Collect the knobs of the Euler–Maruyama simulator in one validated value
//! so the experiment generator and the objective's forward model are
//! configured identically. A `dt` used to simulate a target dataset should
//! also be used when fitting it; a coarser step biases recovered thresholds
//! and drift.
//!
//! Key behaviors
//! -------------
//! - [`SimOpts::new`] validates `dt` and `max_steps`.
//! - [`SimOpts::default`] gives a reproducible fine-grained configuration.
//! - Builder-style `with_*` helpers return modified copies.
//!
//! Invariants & assumptions
//! ------------------------
//! - `dt` finite and > 0; `max_steps >= 1`.
//! - `seed = None` means "draw a seed from OS entropy once per experiment";
//!   the effective seed is recorded on the resulting dataset.
use crate::diffusion::{
    core::validation::{validate_max_steps, validate_step_size},
    errors::DDMResult,
};

/// Default Euler–Maruyama step size (seconds).
pub const DEFAULT_DT: f64 = 0.001;

/// Default step budget (10 s of simulated time at the default `dt`).
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// SimOpts — simulation-time configuration.
///
/// Fields
/// ------
/// - `dt`: step size of the discretized process.
/// - `max_steps`: steps allowed before a trial is declared a timeout.
/// - `seed`: optional experiment seed; trial `i` uses
///   `derive_seed(seed, i)`.
/// - `record_sampled`: keep per-trial sampled drift / start / ter.
/// - `record_paths`: keep the full evidence path of every trial. Memory is
///   O(n_trials × steps); intended for small diagnostic runs.
/// - `parallel`: run trials on the rayon pool.
#[derive(Debug, Clone, PartialEq)]
pub struct SimOpts {
    pub dt: f64,
    pub max_steps: usize,
    pub seed: Option<u64>,
    pub record_sampled: bool,
    pub record_paths: bool,
    pub parallel: bool,
}

impl SimOpts {
    /// Construct validated options. Retention flags default to `false`,
    /// `parallel` to `true`.
    ///
    /// Errors
    /// ------
    /// - [`DDMError::InvalidStepSize`] for non-finite or non-positive `dt`.
    /// - [`DDMError::InvalidMaxSteps`] for `max_steps == 0`.
    ///
    /// [`DDMError::InvalidStepSize`]: crate::diffusion::errors::DDMError::InvalidStepSize
    /// [`DDMError::InvalidMaxSteps`]: crate::diffusion::errors::DDMError::InvalidMaxSteps
    pub fn new(dt: f64, max_steps: usize, seed: Option<u64>) -> DDMResult<Self> {
        let opts =
            SimOpts { dt, max_steps, seed, record_sampled: false, record_paths: false, parallel: true };
        opts.validate()?;
        Ok(opts)
    }

    /// Re-check `dt` and `max_steps` (fields are public).
    pub fn validate(&self) -> DDMResult<()> {
        validate_step_size(self.dt)?;
        validate_max_steps(self.max_steps)?;
        Ok(())
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sampled(mut self, record_sampled: bool) -> Self {
        self.record_sampled = record_sampled;
        self
    }

    pub fn with_paths(mut self, record_paths: bool) -> Self {
        self.record_paths = record_paths;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for SimOpts {
    /// `dt = 0.001`, `max_steps = 10_000`, `seed = Some(42)`, nothing
    /// retained, parallel.
    fn default() -> Self {
        SimOpts {
            dt: DEFAULT_DT,
            max_steps: DEFAULT_MAX_STEPS,
            seed: Some(42),
            record_sampled: false,
            record_paths: false,
            parallel: true,
        }
    }
}
