//! Public API surface for bounded, derivative-free minimization.
//!
//! - [`StochasticObjective`]: trait users implement for a (possibly noisy)
//!   objective evaluated under an explicit seed.
//! - [`NMOptions`], [`Tolerances`], [`EvalSeeding`]: optimizer
//!   configuration.
//! - [`OptimOutcome`] / [`StopReason`]: normalized result of
//!   `minimize_bounded`.
//!
//! Convention: we *minimize* `c(θ)` over a box. The solver works in an
//! unconstrained space and the adapter maps every iterate back into the box
//! before the objective sees it, so `value` only receives in-bounds `θ`.
use crate::optimization::{
    errors::{OptError, OptResult},
    simplex_optimizer::{
        types::{Cost, DEFAULT_SIMPLEX_STEP, FnEvalMap, Theta},
        validation::{validate_theta_hat, verify_sd_tolerance, verify_simplex_step},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use std::str::FromStr;

/// User-implemented stochastic objective.
///
/// - `type Data`: payload carried into `value` / `check` (e.g. a target
///   table).
///
/// Required:
/// - `value(θ, data, seed) -> OptResult<Cost>`: evaluate the cost at a
///   model-space `θ` using randomness derived only from `seed`. Equal
///   `(θ, seed)` must give equal costs.
/// - `check(θ, data) -> OptResult<()>`: reject inconsistent `θ` / `data`
///   pairs once, before optimization.
pub trait StochasticObjective: Sync {
    type Data: Sync;

    fn value(&self, theta: &[f64], data: &Self::Data, seed: u64) -> OptResult<Cost>;
    fn check(&self, theta: &[f64], data: &Self::Data) -> OptResult<()>;
}

/// How evaluation seeds are chosen within one optimizer run.
///
/// Variants:
/// - `Common`: every evaluation reuses the run seed (common random numbers).
///   The objective is then a deterministic function of `θ` for the whole
///   run, which keeps simplex comparisons consistent.
/// - `PerEvaluation`: evaluation `k` uses `derive_seed(run_seed, k)`;
///   fresh noise on every call, still reproducible per run.
///
/// Parsing accepts `"common"` and `"per_evaluation"` (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvalSeeding {
    #[default]
    Common,
    PerEvaluation,
}

impl FromStr for EvalSeeding {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "common" => Ok(EvalSeeding::Common),
            "per_evaluation" | "perevaluation" => Ok(EvalSeeding::PerEvaluation),
            _ => Err(OptError::InvalidEvalSeeding {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'common' or 'per_evaluation'.",
            }),
        }
    }
}

/// Stopping rules for a simplex run.
///
/// - `sd_tolerance`: stop when the standard deviation of the simplex costs
///   falls below this threshold (reported as converged).
/// - `max_iter`: hard cap on iterations (reported as `MaxIterReached`).
///
/// At least one must be provided (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub sd_tolerance: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if both are `None`.
    /// - [`OptError::InvalidSdTolerance`] for a non-finite or non-positive tolerance.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(sd_tolerance: Option<f64>, max_iter: Option<usize>) -> OptResult<Self> {
        if sd_tolerance.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_sd_tolerance(sd_tolerance)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { sd_tolerance, max_iter })
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols`: stopping rules.
/// - `simplex_step`: edge length of the initial simplex in unconstrained
///   space.
/// - `eval_seeding`: evaluation-seed policy.
/// - `verbose`: attach the slog observer (behind the `obs_slog` feature).
///
/// Default: `sd_tolerance = 1e-6`, `max_iter = 200`, `simplex_step = 1.0`,
/// `Common` seeding, quiet.
#[derive(Debug, Clone, PartialEq)]
pub struct NMOptions {
    pub tols: Tolerances,
    pub simplex_step: f64,
    pub eval_seeding: EvalSeeding,
    pub verbose: bool,
}

impl NMOptions {
    pub fn new(
        tols: Tolerances, simplex_step: f64, eval_seeding: EvalSeeding, verbose: bool,
    ) -> OptResult<Self> {
        verify_simplex_step(simplex_step)?;
        Ok(Self { tols, simplex_step, eval_seeding, verbose })
    }

    /// Re-check fields (they are public).
    pub fn validate(&self) -> OptResult<()> {
        Tolerances::new(self.tols.sd_tolerance, self.tols.max_iter)?;
        verify_simplex_step(self.simplex_step)
    }
}

impl Default for NMOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { sd_tolerance: Some(1e-6), max_iter: Some(200) },
            simplex_step: DEFAULT_SIMPLEX_STEP,
            eval_seeding: EvalSeeding::Common,
            verbose: false,
        }
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// The simplex collapsed below the sd tolerance.
    Converged,
    /// The iteration cap was hit first.
    MaxIterReached,
    /// Any other termination (interrupt, target cost, not terminated).
    Other(String),
}

impl StopReason {
    pub fn from_status(status: &TerminationStatus) -> Self {
        match status {
            TerminationStatus::Terminated(TerminationReason::SolverConverged) => {
                StopReason::Converged
            }
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                StopReason::MaxIterReached
            }
            other => StopReason::Other(format!("{other:?}")),
        }
    }
}

/// Canonical result returned by `minimize_bounded`.
///
/// - `theta_hat`: best vector found, in model (bounded) space.
/// - `value`: cost at `theta_hat`.
/// - `reason`: normalized stop reason.
/// - `iterations`: optimizer iterations performed.
/// - `fn_evals`: argmin's counters (`cost_count`).
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub reason: StopReason,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl OptimOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// # Errors
    /// - Propagates `theta_hat` validation errors.
    /// - [`OptError::NonFiniteCost`] for a non-finite best cost.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, status: &TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value });
        }
        Ok(Self {
            theta_hat,
            value,
            reason: StopReason::from_status(status),
            iterations: iterations as usize,
            fn_evals,
        })
    }

    pub fn converged(&self) -> bool {
        self.reason == StopReason::Converged
    }

    /// Number of cost evaluations (0 if the counter is absent).
    pub fn cost_evals(&self) -> u64 {
        self.fn_evals.get("cost_count").copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Tolerances require at least one rule and reject degenerate values.
    fn tolerances_new_validates_rules() {
        assert_eq!(Tolerances::new(None, None), Err(OptError::NoTolerancesProvided));
        assert!(Tolerances::new(Some(-1.0), None).is_err());
        assert!(matches!(Tolerances::new(None, Some(0)), Err(OptError::InvalidMaxIter { .. })));
        let tols = Tolerances::new(Some(1e-8), Some(50)).unwrap();
        assert!(NMOptions::new(tols, 0.0, EvalSeeding::Common, false).is_err());
        assert!(NMOptions::default().validate().is_ok());
    }

    #[test]
    fn eval_seeding_parses_case_insensitively() {
        assert_eq!("Common".parse::<EvalSeeding>().unwrap(), EvalSeeding::Common);
        assert_eq!("PER_EVALUATION".parse::<EvalSeeding>().unwrap(), EvalSeeding::PerEvaluation);
        assert!("fresh".parse::<EvalSeeding>().is_err());
    }

    #[test]
    // Purpose
    // -------
    // argmin termination statuses map onto the three stop reasons.
    fn stop_reason_maps_termination_status() {
        let conv = TerminationStatus::Terminated(TerminationReason::SolverConverged);
        let cap = TerminationStatus::Terminated(TerminationReason::MaxItersReached);
        assert_eq!(StopReason::from_status(&conv), StopReason::Converged);
        assert_eq!(StopReason::from_status(&cap), StopReason::MaxIterReached);
        assert!(matches!(
            StopReason::from_status(&TerminationStatus::NotTerminated),
            StopReason::Other(_)
        ));

        let out = OptimOutcome::new(Some(vec![1.0]), 0.5, &conv, 3, FnEvalMap::new()).unwrap();
        assert!(out.converged());
        assert_eq!(out.cost_evals(), 0);
        assert!(OptimOutcome::new(Some(vec![1.0]), f64::NAN, &cap, 3, FnEvalMap::new()).is_err());
    }
}
