//! Experiment generator — batches of independent trials.
//!
//! Purpose
//! -------
//! Run the trial generator `n_trials` times and assemble an
//! [`ExperimentData`] table: trial index, outcome, and optionally the
//! per-trial sampled parameters and evidence paths.
//!
//! Key behaviors
//! -------------
//! - Trial `i` draws from its own RNG seeded by `derive_seed(seed, i)`, so
//!   the dataset is identical whether trials run sequentially or on the
//!   rayon pool, and regardless of worker count.
//! - Timeouts are counted and kept as rows; a high timeout rate marks a
//!   degenerate parameter region and is logged at `debug`, never raised.
//! - [`ExperimentData::from_observations`] wraps observed (choice, rt) data
//!   so real experiments flow through the same summarizer.
//! - [`simulate_conditions`] maps a sequence of parameter sets to a sequence
//!   of datasets.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters and options are validated once per call, before any trial.
//! - `trials[i].index == i`.
//! - `n_timeouts` equals the number of `Timeout` outcomes.
use rayon::prelude::*;
use tracing::debug;

use crate::diffusion::{
    core::{
        options::SimOpts,
        params::DDMParams,
        seeding::{derive_seed, resolve_seed, stream_rng},
        trial::{Choice, SampledParams, Trial, TrialOutcome, simulate_trial},
    },
    errors::{DDMError, DDMResult},
};

/// Timeout rate above which a debug event is emitted.
const TIMEOUT_LOG_THRESHOLD: f64 = 0.05;

/// ExperimentData — ordered trials sharing one parameter set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentData {
    /// Trials in index order.
    pub trials: Vec<Trial>,
    /// Seed the trial streams were derived from (`None` for observed data).
    pub seed: Option<u64>,
    /// Number of timeout trials.
    pub n_timeouts: usize,
}

/// Column-oriented view of an experiment, for external reporting.
///
/// `choice` uses the numeric codes (0 lower, 1 upper); `None` marks a
/// timeout. The sampled columns are `Some` only when every trial carries
/// sampled parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentColumns {
    pub trial_index: Vec<usize>,
    pub choice: Vec<Option<u8>>,
    pub rt: Vec<Option<f64>>,
    pub drift: Option<Vec<f64>>,
    pub start: Option<Vec<f64>>,
    pub ter: Option<Vec<f64>>,
}

impl ExperimentData {
    /// Wrap observed responses.
    ///
    /// Parameters
    /// ----------
    /// - `choices`: per-trial choice, `None` for a non-response.
    /// - `rts`: per-trial reaction time, `None` for a non-response.
    ///
    /// Errors
    /// ------
    /// - [`DDMError::EmptyExperiment`] for empty input.
    /// - [`DDMError::ObservationLengthMismatch`] when lengths differ.
    /// - [`DDMError::InvalidObservation`] when exactly one of choice / rt is
    ///   missing, or an rt is negative or non-finite.
    pub fn from_observations(choices: &[Option<Choice>], rts: &[Option<f64>]) -> DDMResult<Self> {
        if choices.len() != rts.len() {
            return Err(DDMError::ObservationLengthMismatch {
                choices: choices.len(),
                rts: rts.len(),
            });
        }
        if choices.is_empty() {
            return Err(DDMError::EmptyExperiment);
        }

        let mut trials = Vec::with_capacity(choices.len());
        let mut n_timeouts = 0;
        for (index, (&choice, &rt)) in choices.iter().zip(rts).enumerate() {
            let outcome = match (choice, rt) {
                (Some(choice), Some(rt)) => {
                    if !rt.is_finite() || rt < 0.0 {
                        return Err(DDMError::InvalidObservation {
                            index,
                            reason: "rt must be finite and >= 0.",
                        });
                    }
                    TrialOutcome::Response { choice, rt }
                }
                (None, None) => {
                    n_timeouts += 1;
                    TrialOutcome::Timeout
                }
                _ => {
                    return Err(DDMError::InvalidObservation {
                        index,
                        reason: "choice and rt must both be present or both be missing.",
                    });
                }
            };
            trials.push(Trial { index, outcome, sampled: None, path: None });
        }
        Ok(ExperimentData { trials, seed: None, n_timeouts })
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Fraction of trials that timed out.
    pub fn timeout_rate(&self) -> f64 {
        if self.trials.is_empty() {
            return 0.0;
        }
        self.n_timeouts as f64 / self.trials.len() as f64
    }

    /// Fraction of resolved trials that ended at the upper boundary
    /// (`None` when every trial timed out).
    pub fn upper_rate(&self) -> Option<f64> {
        let resolved = self.trials.len() - self.n_timeouts;
        if resolved == 0 {
            return None;
        }
        let upper = self.trials.iter().filter(|t| t.choice() == Some(Choice::Upper)).count();
        Some(upper as f64 / resolved as f64)
    }

    /// Mean rt over resolved trials, optionally restricted to one choice.
    pub fn mean_rt(&self, choice: Option<Choice>) -> Option<f64> {
        let (sum, count) = self
            .trials
            .iter()
            .filter_map(|t| match t.outcome {
                TrialOutcome::Response { choice: c, rt } if choice.is_none_or(|want| want == c) => {
                    Some(rt)
                }
                _ => None,
            })
            .fold((0.0, 0usize), |(s, n), rt| (s + rt, n + 1));
        if count == 0 { None } else { Some(sum / count as f64) }
    }

    /// Reaction times of resolved trials in trial order.
    pub fn valid_rts(&self) -> Vec<f64> {
        self.trials.iter().filter_map(Trial::rt).collect()
    }

    /// Column view of the dataset.
    pub fn columns(&self) -> ExperimentColumns {
        let trial_index = self.trials.iter().map(|t| t.index).collect();
        let choice = self.trials.iter().map(|t| t.choice().map(Choice::code)).collect();
        let rt = self.trials.iter().map(Trial::rt).collect();

        let sampled: Option<Vec<SampledParams>> =
            self.trials.iter().map(|t| t.sampled).collect::<Option<Vec<_>>>();
        let (drift, start, ter) = match sampled {
            Some(s) if !s.is_empty() => (
                Some(s.iter().map(|p| p.drift).collect()),
                Some(s.iter().map(|p| p.start).collect()),
                Some(s.iter().map(|p| p.ter).collect()),
            ),
            _ => (None, None, None),
        };
        ExperimentColumns { trial_index, choice, rt, drift, start, ter }
    }
}

/// Simulate an experiment of `n_trials` independent trials.
///
/// Parameters
/// ----------
/// - `params`: model parameters (re-validated here).
/// - `n_trials`: number of trials, `>= 1`.
/// - `opts`: step size, step budget, seed, retention and parallelism.
///
/// Returns
/// -------
/// `DDMResult<ExperimentData>` with `seed` set to the effective seed.
///
/// Errors
/// ------
/// - [`DDMError::EmptyExperiment`] for `n_trials == 0`.
/// - [`DDMError::Param`] for invalid parameters.
/// - [`DDMError::InvalidStepSize`] / [`DDMError::InvalidMaxSteps`].
///
/// Examples
/// --------
/// ```rust
/// # use drift_diffusion::diffusion::core::{
/// #     experiment::simulate_experiment, options::SimOpts, params::DDMParams,
/// # };
/// let params = DDMParams::new(0.15, 0.8, 0.4, 0.3, 0.12, 0.1, 0.02, 0.03).unwrap();
/// let data = simulate_experiment(&params, 200, &SimOpts::default()).unwrap();
/// assert_eq!(data.len(), 200);
/// assert_eq!(data.seed, Some(42));
/// ```
pub fn simulate_experiment(
    params: &DDMParams, n_trials: usize, opts: &SimOpts,
) -> DDMResult<ExperimentData> {
    if n_trials == 0 {
        return Err(DDMError::EmptyExperiment);
    }
    params.validate()?;
    opts.validate()?;

    let seed = resolve_seed(opts.seed);
    let run_one = |index: usize| -> Trial {
        let mut rng = stream_rng(seed, index as u64);
        let mut trial = simulate_trial(params, opts.dt, opts.max_steps, opts.record_paths, &mut rng);
        trial.index = index;
        if !opts.record_sampled {
            trial.sampled = None;
        }
        trial
    };

    let trials: Vec<Trial> = if opts.parallel {
        (0..n_trials).into_par_iter().map(run_one).collect()
    } else {
        (0..n_trials).map(run_one).collect()
    };

    let n_timeouts = trials.iter().filter(|t| t.outcome.is_timeout()).count();
    let data = ExperimentData { trials, seed: Some(seed), n_timeouts };
    if data.timeout_rate() > TIMEOUT_LOG_THRESHOLD {
        debug!(
            n_trials,
            n_timeouts,
            timeout_rate = data.timeout_rate(),
            mean_v = params.mean_v,
            a = params.a,
            "experiment produced many timeout trials"
        );
    }
    Ok(data)
}

/// Simulate one experiment per parameter set.
///
/// Condition `k` uses seed `derive_seed(seed, k)` so conditions are
/// independent yet reproducible. Fails on the first invalid condition.
pub fn simulate_conditions(
    conditions: &[DDMParams], n_trials: usize, opts: &SimOpts,
) -> DDMResult<Vec<ExperimentData>> {
    let base_seed = resolve_seed(opts.seed);
    conditions
        .iter()
        .enumerate()
        .map(|(k, params)| {
            let cond_opts = opts.clone().with_seed(Some(derive_seed(base_seed, k as u64)));
            simulate_experiment(params, n_trials, &cond_opts)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Reproducibility across seeds and across sequential / parallel runs.
    // - Retention flags and the column view.
    // - Timeout counting and observed-data construction.
    // - Basic distributional sanity (symmetry, speed-accuracy).
    // -------------------------------------------------------------------------

    fn reference() -> DDMParams {
        DDMParams::new(0.15, 0.8, 0.4, 0.3, 0.12, 0.1, 0.02, 0.03).unwrap()
    }

    fn opts(seed: u64) -> SimOpts {
        SimOpts::new(0.001, 10_000, Some(seed)).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Same seed ⇒ identical dataset; different seed ⇒ different dataset;
    // parallel and sequential execution agree.
    fn simulate_experiment_is_reproducible_and_schedule_independent() {
        let params = reference();
        let a = simulate_experiment(&params, 300, &opts(1)).unwrap();
        let b = simulate_experiment(&params, 300, &opts(1)).unwrap();
        let c = simulate_experiment(&params, 300, &opts(2)).unwrap();
        let d = simulate_experiment(&params, 300, &opts(1).with_parallel(false)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, d);
    }

    #[test]
    // Purpose
    // -------
    // Sampled columns appear only when requested; indices are sequential.
    fn simulate_experiment_respects_retention_flags() {
        let params = reference();
        let plain = simulate_experiment(&params, 50, &opts(3)).unwrap();
        assert!(plain.trials.iter().all(|t| t.sampled.is_none() && t.path.is_none()));
        assert!(plain.columns().drift.is_none());

        let rich = simulate_experiment(&params, 50, &opts(3).with_sampled(true)).unwrap();
        let cols = rich.columns();
        assert_eq!(cols.trial_index, (0..50).collect::<Vec<_>>());
        assert_eq!(cols.drift.as_ref().map(Vec::len), Some(50));
        assert_eq!(cols.choice, plain.columns().choice);
    }

    #[test]
    // Purpose
    // -------
    // An impossible step budget turns every trial into a timeout, counted
    // but not raised.
    fn simulate_experiment_counts_timeouts() {
        let params = DDMParams::without_variability(0.0, 2.0, 1.0, 0.01, 0.1).unwrap();
        let data = simulate_experiment(&params, 40, &SimOpts::new(0.001, 3, Some(4)).unwrap()).unwrap();
        assert_eq!(data.n_timeouts, 40);
        assert_eq!(data.timeout_rate(), 1.0);
        assert_eq!(data.upper_rate(), None);
        assert_eq!(data.mean_rt(None), None);
        assert!(data.columns().rt.iter().all(Option::is_none));
    }

    #[test]
    // Purpose
    // -------
    // Zero drift with a centred start yields ≈ 50 % upper choices.
    fn simulate_experiment_symmetric_process_is_balanced() {
        let params = DDMParams::without_variability(0.0, 1.0, 0.5, 1.0, 0.0).unwrap();
        let data = simulate_experiment(&params, 4_000, &opts(17)).unwrap();
        assert_relative_eq!(data.upper_rate().unwrap(), 0.5, epsilon = 0.03);
    }

    #[test]
    // Purpose
    // -------
    // Wider boundaries slow responses and do not reduce accuracy.
    //
    // Given
    // -----
    // - Positive drift, centred start, `a` ∈ {0.6, 1.2}.
    //
    // Expect
    // ------
    // - Mean rt strictly increases; upper rate does not drop beyond noise.
    fn simulate_experiment_wider_boundaries_are_slower_and_not_less_accurate() {
        let narrow = DDMParams::without_variability(0.2, 0.6, 0.3, 0.3, 0.0).unwrap();
        let wide = DDMParams::without_variability(0.2, 1.2, 0.6, 0.3, 0.0).unwrap();
        let n = simulate_experiment(&narrow, 2_000, &opts(5)).unwrap();
        let w = simulate_experiment(&wide, 2_000, &opts(5)).unwrap();
        assert!(w.mean_rt(None).unwrap() > n.mean_rt(None).unwrap());
        assert!(w.upper_rate().unwrap() + 0.02 >= n.upper_rate().unwrap());
    }

    #[test]
    // Purpose
    // -------
    // Observed data must pair choices and rts consistently.
    fn from_observations_validates_pairs() {
        let data = ExperimentData::from_observations(
            &[Some(Choice::Upper), None, Some(Choice::Lower)],
            &[Some(0.5), None, Some(0.7)],
        )
        .unwrap();
        assert_eq!(data.n_timeouts, 1);
        assert_eq!(data.valid_rts(), vec![0.5, 0.7]);
        assert_relative_eq!(data.mean_rt(Some(Choice::Lower)).unwrap(), 0.7);

        assert!(matches!(
            ExperimentData::from_observations(&[Some(Choice::Upper)], &[None]),
            Err(DDMError::InvalidObservation { index: 0, .. })
        ));
        assert!(matches!(
            ExperimentData::from_observations(&[Some(Choice::Upper)], &[Some(-1.0)]),
            Err(DDMError::InvalidObservation { index: 0, .. })
        ));
        assert_eq!(
            ExperimentData::from_observations(&[None], &[]),
            Err(DDMError::ObservationLengthMismatch { choices: 1, rts: 0 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Each condition gets its own dataset and errors are not swallowed.
    fn simulate_conditions_maps_parameter_sets() {
        let conds = [
            DDMParams::without_variability(0.1, 0.8, 0.4, 0.3, 0.1).unwrap(),
            DDMParams::without_variability(0.3, 0.8, 0.4, 0.3, 0.1).unwrap(),
        ];
        let out = simulate_conditions(&conds, 100, &opts(9)).unwrap();
        assert_eq!(out.len(), 2);
        assert_ne!(out[0].seed, out[1].seed);
        assert_eq!(simulate_experiment(&conds[0], 0, &opts(9)), Err(DDMError::EmptyExperiment));
    }
}
