//! Multi-start parameter recovery.
//!
//! Purpose
//! -------
//! Estimate a subset of drift-diffusion parameters from a target
//! [`RTBinTable`] by running several bounded Nelder–Mead searches from
//! randomly perturbed starts against the [`BinnedObjective`], then keeping
//! the best run together with every run's outcome.
//!
//! Key behaviors
//! -------------
//! - Start `i` uses `start_seed = derive_seed(global_seed, i)`. The seed
//!   drives both the start vector (Normal(mean, sd) clamped into the box)
//!   and the objective's evaluation seeds, so the same global seed yields
//!   the same [`RecoveryResult`] regardless of rayon scheduling.
//! - Non-convergence is data: each run carries a [`RunStatus`], and the
//!   result carries a [`ConvergenceQuality`]. Optimizer failures inside one
//!   start become `RunStatus::Failed` and never abort the recovery.
//! - Configuration problems (bounds, names, bin edges, option values) are
//!   rejected before any simulation.
//! - A [`CancelToken`] is checked before each start begins; in-flight starts
//!   finish, remaining starts are skipped and counted.
//!
//! Invariants & assumptions
//! ------------------------
//! - `lower[i] < upper[i]` for every free parameter; initial sds are `>= 0`.
//! - The global seed is `opts.sim.seed`, resolved once per call.
//! - `RecoveryResult::runs` is ordered by start index.
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use rand::Rng;
use rand_distr::StandardNormal;
use rayon::prelude::*;
use statrs::statistics::Statistics;
use tracing::{debug, info, warn};

use crate::{
    diffusion::{
        core::{
            bins::{BinEdges, RTBinTable},
            options::SimOpts,
            params::{DDMParams, ParamName, ParamOverrides},
            seeding::{derive_seed, resolve_seed, stream_rng},
        },
        errors::{DDMError, DDMResult},
        models::objective::{BinnedObjective, Discrepancy},
    },
    optimization::{
        numerical_stability::BoxTransform,
        simplex_optimizer::{NMOptions, StopReason, minimize_bounded},
    },
};

/// Stream index (under a start seed) reserved for drawing the start vector.
const START_STREAM: u64 = u64::MAX;

/// Relative distance to a bound (as a share of the box width) that counts
/// as a bound hit.
const BOUND_HIT_TOL: f64 = 1e-3;

/// ParameterSpace — free parameters with their start distribution and box.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpace {
    names: Vec<ParamName>,
    means: Vec<f64>,
    sds: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl ParameterSpace {
    /// Build a validated parameter space.
    ///
    /// Errors
    /// ------
    /// - [`DDMError::EmptyParameterSpace`] for no names.
    /// - [`DDMError::ParameterSpaceLengthMismatch`] when a vector's length
    ///   differs from `names`.
    /// - [`DDMError::DuplicateParameter`] for a repeated name.
    /// - [`DDMError::InvalidBounds`], [`DDMError::InvalidInitialMean`],
    ///   [`DDMError::InvalidInitialSd`] for bad per-parameter values.
    pub fn new(
        names: Vec<ParamName>, means: Vec<f64>, sds: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>,
    ) -> DDMResult<Self> {
        if names.is_empty() {
            return Err(DDMError::EmptyParameterSpace);
        }
        let expected = names.len();
        for (field, len) in
            [("means", means.len()), ("sds", sds.len()), ("lower", lower.len()), ("upper", upper.len())]
        {
            if len != expected {
                return Err(DDMError::ParameterSpaceLengthMismatch { field, expected, actual: len });
            }
        }
        for (i, &name) in names.iter().enumerate() {
            let label = name.as_str();
            if names[..i].contains(&name) {
                return Err(DDMError::DuplicateParameter { name: label });
            }
            let (lo, hi) = (lower[i], upper[i]);
            if !lo.is_finite() || !hi.is_finite() || lo >= hi {
                return Err(DDMError::InvalidBounds { name: label, lower: lo, upper: hi });
            }
            if !means[i].is_finite() {
                return Err(DDMError::InvalidInitialMean { name: label, value: means[i] });
            }
            if !sds[i].is_finite() || sds[i] < 0.0 {
                return Err(DDMError::InvalidInitialSd { name: label, value: sds[i] });
            }
        }
        Ok(Self { names, means, sds, lower, upper })
    }

    /// Same as [`ParameterSpace::new`] with names given as strings.
    pub fn from_strs(
        names: &[&str], means: Vec<f64>, sds: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>,
    ) -> DDMResult<Self> {
        let names = names.iter().map(|n| n.parse()).collect::<DDMResult<Vec<ParamName>>>()?;
        Self::new(names, means, sds, lower, upper)
    }

    /// Box of `±fraction · |value|` around the given values, with the means
    /// at the values and sds of `fraction · |value| / 2`.
    ///
    /// Errors as [`ParameterSpace::new`]; a zero value gives an empty box
    /// and is rejected.
    pub fn around(params: &DDMParams, names: &[ParamName], fraction: f64) -> DDMResult<Self> {
        let values = params.select(names);
        let half: Vec<f64> = values.iter().map(|v| fraction * v.abs()).collect();
        Self::new(
            names.to_vec(),
            values.clone(),
            half.iter().map(|h| h / 2.0).collect(),
            values.iter().zip(&half).map(|(v, h)| v - h).collect(),
            values.iter().zip(&half).map(|(v, h)| v + h).collect(),
        )
    }

    pub fn dim(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> &[ParamName] {
        &self.names
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// Draw a start: `Normal(mean, sd)` per parameter, clamped into the box.
    pub fn sample_start<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        (0..self.dim())
            .map(|i| {
                let eps: f64 = rng.sample(StandardNormal);
                (self.means[i] + self.sds[i] * eps).clamp(self.lower[i], self.upper[i])
            })
            .collect()
    }
}

/// RecoveryOptions — multi-start configuration.
///
/// Fields
/// ------
/// - `n_starts`: number of optimizer starts (`>= 1`).
/// - `n_sim`: simulated trials per objective evaluation (`>= 1`).
/// - `sim`: simulator settings for the forward model; `sim.seed` is the
///   global recovery seed (`None` draws one from entropy).
/// - `discrepancy`: objective scoring rule.
/// - `nm`: Nelder–Mead settings (`nm.tols.max_iter` is the per-start
///   iteration cap).
/// - `parallel`: run starts on the rayon pool.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryOptions {
    pub n_starts: usize,
    pub n_sim: usize,
    pub sim: SimOpts,
    pub discrepancy: Discrepancy,
    pub nm: NMOptions,
    pub parallel: bool,
}

impl RecoveryOptions {
    pub fn new(
        n_starts: usize, n_sim: usize, sim: SimOpts, discrepancy: Discrepancy, nm: NMOptions,
    ) -> DDMResult<Self> {
        let opts = Self { n_starts, n_sim, sim, discrepancy, nm, parallel: true };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> DDMResult<()> {
        if self.n_starts == 0 {
            return Err(DDMError::InvalidStarts { n_starts: self.n_starts });
        }
        if self.n_sim == 0 {
            return Err(DDMError::InvalidSimCount { n_sim: self.n_sim });
        }
        self.sim.validate()?;
        self.discrepancy.validate()?;
        self.nm.validate()?;
        Ok(())
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for RecoveryOptions {
    /// 10 starts, 1000 simulated trials, default simulator (seed 42), sum of
    /// squares, default Nelder–Mead, parallel.
    fn default() -> Self {
        Self {
            n_starts: 10,
            n_sim: 1_000,
            sim: SimOpts::default(),
            discrepancy: Discrepancy::SumSquares,
            nm: NMOptions::default(),
            parallel: true,
        }
    }
}

/// Cooperative cancellation flag shared between a caller and a recovery.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome class of one optimizer start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Converged,
    MaxIterReached,
    Failed,
}

/// One optimizer start.
///
/// `value` is `f64::INFINITY` and `estimate` equals `start` for failed runs.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRun {
    pub start_index: usize,
    pub start_seed: u64,
    pub start: Vec<f64>,
    pub estimate: Vec<f64>,
    pub value: f64,
    pub status: RunStatus,
    pub iterations: usize,
    pub evaluations: u64,
    /// Per-parameter: estimate within `1e-3 · (upper − lower)` of a bound.
    pub at_bound: Vec<bool>,
    /// Failure or unusual-termination detail.
    pub message: Option<String>,
}

/// How trustworthy the selected best run is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceQuality {
    /// Best run converged.
    Converged,
    /// No run converged; best is the lowest value among the rest.
    NoneConverged,
    /// Every completed run failed.
    AllFailed,
}

/// Landscape diagnostics over completed runs.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryDiagnostics {
    pub n_converged: usize,
    pub n_max_iter: usize,
    pub n_failed: usize,
    /// Smallest finite value (`None` when every run failed).
    pub value_min: Option<f64>,
    pub value_mean: Option<f64>,
    /// Sample sd of finite values (`None` for fewer than two).
    pub value_sd: Option<f64>,
    /// Per free parameter: share of completed runs ending at a bound.
    pub bound_hit_rate: Vec<f64>,
}

impl RecoveryDiagnostics {
    fn from_runs(runs: &[OptimizationRun], dim: usize) -> Self {
        let count = |status| runs.iter().filter(|r| r.status == status).count();
        let values: Vec<f64> = runs.iter().map(|r| r.value).filter(|v| v.is_finite()).collect();
        let (value_min, value_mean) = if values.is_empty() {
            (None, None)
        } else {
            (Some(Statistics::min(values.iter())), Some(values.iter().mean()))
        };
        let value_sd = if values.len() >= 2 { Some(values.iter().std_dev()) } else { None };
        let bound_hit_rate = (0..dim)
            .map(|i| {
                let hits = runs.iter().filter(|r| r.at_bound.get(i).copied().unwrap_or(false)).count();
                hits as f64 / runs.len().max(1) as f64
            })
            .collect();
        Self {
            n_converged: count(RunStatus::Converged),
            n_max_iter: count(RunStatus::MaxIterReached),
            n_failed: count(RunStatus::Failed),
            value_min,
            value_mean,
            value_sd,
            bound_hit_rate,
        }
    }
}

/// RecoveryResult — best run, all runs, and diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveryResult {
    pub names: Vec<ParamName>,
    pub best: OptimizationRun,
    /// Position of `best` in `runs`.
    pub best_index: usize,
    pub runs: Vec<OptimizationRun>,
    pub quality: ConvergenceQuality,
    /// Starts skipped because of cancellation.
    pub cancelled_starts: usize,
    pub global_seed: u64,
    pub diagnostics: RecoveryDiagnostics,
    fixed: DDMParams,
}

impl RecoveryResult {
    /// `(name, value)` pairs of the best estimate.
    pub fn best_estimate(&self) -> Vec<(ParamName, f64)> {
        self.names.iter().copied().zip(self.best.estimate.iter().copied()).collect()
    }

    /// Best estimate of one free parameter.
    pub fn estimate_of(&self, name: ParamName) -> Option<f64> {
        self.names.iter().position(|&n| n == name).map(|i| self.best.estimate[i])
    }

    /// Full parameter set: fixed values with the best estimate merged in.
    pub fn best_params(&self) -> DDMResult<DDMParams> {
        let overrides = ParamOverrides::from_pairs(&self.names, &self.best.estimate)?;
        Ok(overrides.apply(&self.fixed)?)
    }
}

/// Recover free parameters from a target table.
///
/// Parameters
/// ----------
/// - `target`: binned target data, built on `bin_edges`.
/// - `space`: free parameters, start distribution and bounds.
/// - `fixed`: values for every parameter not in `space` (entries for free
///   parameters are ignored but the set must be valid).
/// - `bin_edges`: edges shared by target and simulated tables.
/// - `opts`: multi-start configuration.
/// - `cancel`: optional cancellation token.
///
/// Errors
/// ------
/// - Configuration errors (options, fixed parameters, edge mismatch).
/// - [`DDMError::Cancelled`] if cancellation happened before any start ran.
///
/// Runtime trouble (timeouts, non-convergence, solver failure in a start)
/// is reported in the result, not as an error.
pub fn recover_parameters(
    target: &RTBinTable, space: &ParameterSpace, fixed: &DDMParams, bin_edges: &BinEdges,
    opts: &RecoveryOptions, cancel: Option<&CancelToken>,
) -> DDMResult<RecoveryResult> {
    opts.validate()?;
    bin_edges.ensure_same(&target.edges)?;
    target.ensure_shape()?;
    let objective = BinnedObjective::new(
        space.names.clone(),
        *fixed,
        bin_edges.clone(),
        opts.n_sim,
        opts.sim.clone(),
        opts.discrepancy,
    )?;
    let transform = BoxTransform::new(space.lower.clone(), space.upper.clone());
    let global_seed = resolve_seed(opts.sim.seed);

    info!(
        n_starts = opts.n_starts,
        n_sim = opts.n_sim,
        free = ?space.names,
        global_seed,
        "starting parameter recovery"
    );

    let run_start = |start_index: usize| -> Option<OptimizationRun> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return None;
        }
        let run = run_one_start(start_index, global_seed, target, space, &objective, &transform, opts);
        debug!(
            start_index,
            value = run.value,
            status = ?run.status,
            iterations = run.iterations,
            evaluations = run.evaluations,
            "optimizer start finished"
        );
        Some(run)
    };

    let outcomes: Vec<Option<OptimizationRun>> = if opts.parallel {
        (0..opts.n_starts).into_par_iter().map(run_start).collect()
    } else {
        (0..opts.n_starts).map(run_start).collect()
    };
    let cancelled_starts = outcomes.iter().filter(|o| o.is_none()).count();
    let runs: Vec<OptimizationRun> = outcomes.into_iter().flatten().collect();
    if cancelled_starts > 0 {
        info!(cancelled_starts, completed = runs.len(), "recovery cancelled");
    }
    if runs.is_empty() {
        return Err(DDMError::Cancelled);
    }

    let (best_index, quality) = select_best(&runs);
    let best = runs[best_index].clone();
    let diagnostics = RecoveryDiagnostics::from_runs(&runs, space.dim());

    if quality != ConvergenceQuality::Converged {
        warn!(?quality, n_runs = runs.len(), "no optimizer start converged");
    }
    info!(
        best_start = best.start_index,
        best_value = best.value,
        ?quality,
        n_converged = diagnostics.n_converged,
        "parameter recovery finished"
    );

    Ok(RecoveryResult {
        names: space.names.clone(),
        best,
        best_index,
        runs,
        quality,
        cancelled_starts,
        global_seed,
        diagnostics,
        fixed: *fixed,
    })
}

fn run_one_start(
    start_index: usize, global_seed: u64, target: &RTBinTable, space: &ParameterSpace,
    objective: &BinnedObjective, transform: &BoxTransform, opts: &RecoveryOptions,
) -> OptimizationRun {
    let start_seed = derive_seed(global_seed, start_index as u64);
    let start = space.sample_start(&mut stream_rng(start_seed, START_STREAM));

    match minimize_bounded(objective, &start, target, &space.lower, &space.upper, &opts.nm, start_seed)
    {
        Ok(out) => {
            let iterations = out.iterations;
            let evaluations = out.cost_evals();
            let (status, message) = match out.reason {
                StopReason::Converged => (RunStatus::Converged, None),
                StopReason::MaxIterReached => (RunStatus::MaxIterReached, None),
                StopReason::Other(text) => (RunStatus::Failed, Some(text)),
            };
            OptimizationRun {
                start_index,
                start_seed,
                at_bound: transform.near_bounds(&out.theta_hat, BOUND_HIT_TOL),
                start,
                estimate: out.theta_hat,
                value: out.value,
                status,
                iterations,
                evaluations,
                message,
            }
        }
        Err(err) => OptimizationRun {
            start_index,
            start_seed,
            estimate: start.clone(),
            at_bound: vec![false; start.len()],
            start,
            value: f64::INFINITY,
            status: RunStatus::Failed,
            iterations: 0,
            evaluations: 0,
            message: Some(err.to_string()),
        },
    }
}

/// Lowest value among converged runs; otherwise the lowest value over all
/// runs. Ties go to the lower start index.
fn select_best(runs: &[OptimizationRun]) -> (usize, ConvergenceQuality) {
    if let Some(i) = lowest_value(runs, |s| s == RunStatus::Converged) {
        return (i, ConvergenceQuality::Converged);
    }
    let quality = if runs.iter().any(|r| r.status != RunStatus::Failed) {
        ConvergenceQuality::NoneConverged
    } else {
        ConvergenceQuality::AllFailed
    };
    (lowest_value(runs, |_| true).unwrap_or(0), quality)
}

fn lowest_value(runs: &[OptimizationRun], keep: impl Fn(RunStatus) -> bool) -> Option<usize> {
    runs.iter()
        .enumerate()
        .filter(|(_, r)| keep(r.status))
        .min_by(|(_, a), (_, b)| a.value.total_cmp(&b.value))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::core::{bins::binned_proportions, experiment::simulate_experiment};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - ParameterSpace validation and start sampling.
    // - Best-run selection across status mixes.
    // - Small end-to-end recoveries: reproducibility, cancellation and
    //   fail-fast configuration errors.
    //
    // They intentionally DO NOT cover:
    // - Recovery accuracy on the reference set (see
    //   tests/integration_recovery_pipeline.rs).
    // -------------------------------------------------------------------------

    fn truth() -> DDMParams {
        DDMParams::without_variability(0.25, 0.6, 0.3, 0.3, 0.1).unwrap()
    }

    fn sim() -> SimOpts {
        SimOpts::new(0.01, 2_000, Some(3)).unwrap()
    }

    fn setup() -> (RTBinTable, BinEdges, ParameterSpace) {
        let data = simulate_experiment(&truth(), 400, &sim()).unwrap();
        let edges = BinEdges::from_quantiles(&data, &[0.3, 0.5, 0.7]).unwrap();
        let target = binned_proportions(&data, &edges).unwrap();
        let space = ParameterSpace::around(&truth(), &[ParamName::MeanV, ParamName::A], 0.5).unwrap();
        (target, edges, space)
    }

    fn small_opts() -> RecoveryOptions {
        let mut nm = NMOptions::default();
        nm.tols.max_iter = Some(15);
        RecoveryOptions::new(3, 200, sim(), Discrepancy::SumSquares, nm).unwrap()
    }

    fn run(status: RunStatus, value: f64) -> OptimizationRun {
        OptimizationRun {
            start_index: 0,
            start_seed: 0,
            start: vec![0.0],
            estimate: vec![0.0],
            value,
            status,
            iterations: 1,
            evaluations: 1,
            at_bound: vec![false],
            message: None,
        }
    }

    #[test]
    // Purpose
    // -------
    // ParameterSpace rejects each class of malformed input.
    fn parameter_space_new_validates_inputs() {
        let ok = ParameterSpace::from_strs(
            &["mean_v", "a"],
            vec![0.1, 1.0],
            vec![0.1, 0.1],
            vec![0.0, 0.5],
            vec![0.2, 1.5],
        );
        assert!(ok.is_ok());

        assert_eq!(
            ParameterSpace::new(vec![], vec![], vec![], vec![], vec![]),
            Err(DDMError::EmptyParameterSpace)
        );
        assert_eq!(
            ParameterSpace::new(vec![ParamName::A], vec![1.0], vec![], vec![0.5], vec![1.5]),
            Err(DDMError::ParameterSpaceLengthMismatch { field: "sds", expected: 1, actual: 0 })
        );
        assert_eq!(
            ParameterSpace::new(vec![ParamName::A], vec![1.0], vec![0.1], vec![1.5], vec![0.5]),
            Err(DDMError::InvalidBounds { name: "a", lower: 1.5, upper: 0.5 })
        );
        assert_eq!(
            ParameterSpace::new(vec![ParamName::A], vec![1.0], vec![-0.1], vec![0.5], vec![1.5]),
            Err(DDMError::InvalidInitialSd { name: "a", value: -0.1 })
        );
        assert!(matches!(
            ParameterSpace::from_strs(&["drift"], vec![1.0], vec![0.1], vec![0.0], vec![2.0]),
            Err(DDMError::UnknownParameter { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Starts always land inside the box, even with a huge sd.
    fn sample_start_is_clamped_into_box() {
        let space =
            ParameterSpace::new(vec![ParamName::A], vec![1.0], vec![10.0], vec![0.5], vec![1.5])
                .unwrap();
        let mut rng = stream_rng(1, 2);
        for _ in 0..1_000 {
            let s = space.sample_start(&mut rng);
            assert!((0.5..=1.5).contains(&s[0]));
        }
    }

    #[test]
    // Purpose
    // -------
    // Converged runs win; without them the lowest value overall wins, a
    // failed run with a finite value included; all-infinite falls back to
    // the first run.
    fn select_best_prefers_converged_runs() {
        let runs = vec![
            run(RunStatus::MaxIterReached, 0.1),
            run(RunStatus::Converged, 0.3),
            run(RunStatus::Converged, 0.2),
        ];
        assert_eq!(select_best(&runs), (2, ConvergenceQuality::Converged));

        let runs = vec![run(RunStatus::Failed, f64::INFINITY), run(RunStatus::MaxIterReached, 0.4)];
        assert_eq!(select_best(&runs), (1, ConvergenceQuality::NoneConverged));

        let runs = vec![
            run(RunStatus::MaxIterReached, 0.4),
            run(RunStatus::Failed, 0.05),
            run(RunStatus::MaxIterReached, 0.2),
        ];
        assert_eq!(select_best(&runs), (1, ConvergenceQuality::NoneConverged));

        let runs = vec![run(RunStatus::Failed, f64::INFINITY), run(RunStatus::Failed, 0.7)];
        assert_eq!(select_best(&runs), (1, ConvergenceQuality::AllFailed));

        let runs = vec![run(RunStatus::Failed, f64::INFINITY), run(RunStatus::Failed, f64::INFINITY)];
        assert_eq!(select_best(&runs), (0, ConvergenceQuality::AllFailed));

        let diag = RecoveryDiagnostics::from_runs(&runs, 1);
        assert_eq!(diag.n_failed, 2);
        assert_eq!(diag.value_min, None);
    }

    #[test]
    // Purpose
    // -------
    // Same global seed ⇒ identical result, whether starts run in parallel
    // or sequentially; every run stays inside the box.
    fn recover_parameters_is_reproducible_across_schedules() {
        let (target, edges, space) = setup();
        let opts = small_opts();
        let a = recover_parameters(&target, &space, &truth(), &edges, &opts, None).unwrap();
        let b = recover_parameters(&target, &space, &truth(), &edges, &opts.clone().with_parallel(false), None)
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.runs.len(), 3);
        assert_eq!(a.cancelled_starts, 0);
        for r in &a.runs {
            for (i, x) in r.estimate.iter().enumerate() {
                assert!(*x >= space.lower()[i] && *x <= space.upper()[i]);
            }
            assert!(r.evaluations > 0);
        }
        let params = a.best_params().unwrap();
        assert_eq!(params.mean_z, truth().mean_z);
        assert_eq!(a.estimate_of(ParamName::A), Some(a.best.estimate[1]));
    }

    #[test]
    // Purpose
    // -------
    // A token cancelled up front skips every start and reports Cancelled.
    fn recover_parameters_honours_cancellation() {
        let (target, edges, space) = setup();
        let token = CancelToken::new();
        token.cancel();
        assert_eq!(
            recover_parameters(&target, &space, &truth(), &edges, &small_opts(), Some(&token)),
            Err(DDMError::Cancelled)
        );
    }

    #[test]
    // Purpose
    // -------
    // Cancelling while a sequential recovery is running lets the start in
    // flight finish, skips the rest and returns the partial result.
    //
    // Given
    // -----
    // - 200 sequential starts; another thread cancels after 50 ms.
    //
    // Expect
    // ------
    // - At least one completed run, numbered from 0 without gaps.
    // - Every other start counted in `cancelled_starts`.
    fn recover_parameters_stops_between_starts_when_cancelled_mid_run() {
        let (target, edges, space) = setup();
        let mut opts = small_opts().with_parallel(false);
        opts.n_starts = 200;
        opts.n_sim = 400;

        let token = CancelToken::new();
        let remote = token.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            remote.cancel();
        });
        let result = recover_parameters(&target, &space, &truth(), &edges, &opts, Some(&token)).unwrap();
        canceller.join().unwrap();

        assert!(!result.runs.is_empty());
        assert!(result.cancelled_starts > 0);
        assert_eq!(result.cancelled_starts, opts.n_starts - result.runs.len());
        for (i, r) in result.runs.iter().enumerate() {
            assert_eq!(r.start_index, i);
        }
        assert!(result.best_index < result.runs.len());
    }

    #[test]
    // Purpose
    // -------
    // A start drawn exactly on a bound still leaves it.
    //
    // Given
    // -----
    // - Only `a` is free, box [0.4, 0.9], start mean 0.9 with sd 0, so the
    //   start is the upper bound; the target was simulated at `a = 0.6`.
    //
    // Expect
    // ------
    // - The recorded start is 0.9; the estimate moves well inside the box
    //   and is not flagged as a bound hit.
    fn recover_parameters_moves_starts_off_the_bound() {
        let (target, edges, _space) = setup();
        let space =
            ParameterSpace::new(vec![ParamName::A], vec![0.9], vec![0.0], vec![0.4], vec![0.9])
                .unwrap();
        let mut nm = NMOptions::default();
        nm.tols.max_iter = Some(30);
        let opts = RecoveryOptions::new(1, 400, sim(), Discrepancy::SumSquares, nm)
            .unwrap()
            .with_parallel(false);

        let result = recover_parameters(&target, &space, &truth(), &edges, &opts, None).unwrap();
        let run = &result.runs[0];
        assert_eq!(run.start, vec![0.9]);
        assert!(run.estimate[0] < 0.85, "estimate stuck near the bound: {}", run.estimate[0]);
        assert_eq!(run.at_bound, vec![false]);
    }

    #[test]
    // Purpose
    // -------
    // Mismatched edges and zero starts fail before any simulation.
    fn recover_parameters_fails_fast_on_configuration_errors() {
        let (target, _edges, space) = setup();
        let other = BinEdges::uniform(0.0, 3.0, 3).unwrap();
        assert!(matches!(
            recover_parameters(&target, &space, &truth(), &other, &small_opts(), None),
            Err(DDMError::BinEdgeMismatch { .. } | DDMError::BinEdgeValueMismatch { .. })
        ));
        let mut opts = small_opts();
        opts.n_starts = 0;
        assert_eq!(
            recover_parameters(&target, &space, &truth(), &target.edges, &opts, None),
            Err(DDMError::InvalidStarts { n_starts: 0 })
        );
    }
}
