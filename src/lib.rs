//! drift_diffusion — drift-diffusion simulation and parameter recovery with
//! Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the simulator and the recovery engine to Python via the `_drift_diffusion`
//! extension module. When the `python-bindings` feature is enabled, this module
//! defines the Python-facing classes and submodules used by the
//! `drift_diffusion` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`diffusion` and `optimization`) as the
//!   public crate surface.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_drift_diffusion` Python extension.
//! - Create and register Python submodules (`simulation`, `recovery`) under
//!   `drift_diffusion` so that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue, input conversion, and error mapping.
//! - Long-running recovery releases the GIL while it runs.
//!
//! Conventions
//! -----------
//! - Choices cross the boundary as integer codes (`1` upper, `0` lower,
//!   `-1` timeout) and response times as floats with `NaN` for timeouts.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`diffusion`] (or its prelude) and can
//!   ignore the PyO3 items guarded by the `python-bindings` feature.
//!
//! ```rust
//! use drift_diffusion::diffusion::prelude::*;
//!
//! let params = DDMParams::new(0.15, 0.8, 0.4, 0.3, 0.12, 0.1, 0.02, 0.03)?;
//! let data = simulate_experiment(&params, 500, &SimOpts::default())?;
//! let edges = BinEdges::from_quantiles(&data, &[0.1, 0.3, 0.5, 0.7, 0.9])?;
//! let table = binned_proportions(&data, &edges)?;
//! assert!((table.total_mass() - 1.0).abs() < 1e-12);
//! # Ok::<(), DDMError>(())
//! ```

pub mod diffusion;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use std::collections::HashMap;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    diffusion::{
        core::{
            bins::{BinEdges, RTBinTable, binned_proportions},
            experiment::{ExperimentData, simulate_experiment},
            params::ParamName,
        },
        errors::DDMError,
        models::recovery::{ParameterSpace, RecoveryResult, RunStatus, recover_parameters},
    },
    utils::{
        build_recovery_options, extract_discrepancy, extract_f64_vec, extract_nm_opts,
        extract_observations, extract_params, extract_sim_opts,
    },
};

/// Experiment — Python-facing simulated (or observed) dataset.
///
/// Constructed from Python via
/// `Experiment(params, n_trials, dt=None, max_steps=None, seed=None)`, where
/// `params` is a dict with at least `mean_v`, `a`, `mean_z`, `s` and
/// `mean_ter`. Observed data enter through `Experiment.from_observations`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "drift_diffusion.simulation")]
pub struct Experiment {
    pub inner: ExperimentData,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl Experiment {
    #[new]
    #[pyo3(
        signature = (params, n_trials, dt = None, max_steps = None, seed = None, parallel = None),
        text_signature = "(params, n_trials, /, dt=0.001, max_steps=10000, seed=42, parallel=True)"
    )]
    pub fn simulate(
        py: Python<'_>, params: HashMap<String, f64>, n_trials: usize, dt: Option<f64>,
        max_steps: Option<usize>, seed: Option<u64>, parallel: Option<bool>,
    ) -> PyResult<Self> {
        let params = extract_params(&params)?;
        let opts = extract_sim_opts(dt, max_steps, seed.or(Some(42)), parallel)?;
        let inner = py.allow_threads(|| simulate_experiment(&params, n_trials, &opts))?;
        Ok(Experiment { inner })
    }

    #[staticmethod]
    #[pyo3(text_signature = "(choices, rts, /)")]
    pub fn from_observations<'py>(
        py: Python<'py>, choices: Vec<i64>, rts: &Bound<'py, PyAny>,
    ) -> PyResult<Self> {
        Ok(Experiment { inner: extract_observations(py, choices, rts)? })
    }

    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    /// Choice codes: 1 upper, 0 lower, -1 timeout.
    #[getter]
    pub fn choice(&self) -> Vec<i64> {
        self.inner.trials.iter().map(|t| t.choice().map_or(-1, |c| i64::from(c.code()))).collect()
    }

    /// Response times, NaN for timeouts.
    #[getter]
    pub fn rt(&self) -> Vec<f64> {
        self.inner.trials.iter().map(|t| t.rt().unwrap_or(f64::NAN)).collect()
    }

    #[getter]
    pub fn n_timeouts(&self) -> usize {
        self.inner.n_timeouts
    }

    #[getter]
    pub fn seed(&self) -> Option<u64> {
        self.inner.seed
    }

    #[getter]
    pub fn upper_rate(&self) -> Option<f64> {
        self.inner.upper_rate()
    }

    /// Bin edges at the given quantiles of the valid response times.
    #[pyo3(signature = (probs = None))]
    pub fn quantile_edges(&self, probs: Option<Vec<f64>>) -> PyResult<Vec<f64>> {
        let probs = probs.unwrap_or_else(|| vec![0.1, 0.3, 0.5, 0.7, 0.9]);
        Ok(BinEdges::from_quantiles(&self.inner, &probs)?.as_slice().to_vec())
    }
}

/// BinnedRT — Python-facing binned response-time table.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "drift_diffusion.simulation")]
pub struct BinnedRT {
    pub inner: RTBinTable,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl BinnedRT {
    #[new]
    #[pyo3(text_signature = "(experiment, edges, /)")]
    pub fn new<'py>(
        py: Python<'py>, experiment: PyRef<'py, Experiment>, edges: &Bound<'py, PyAny>,
    ) -> PyResult<Self> {
        let edges = BinEdges::new(extract_f64_vec(py, edges, "edges")?)?;
        Ok(BinnedRT { inner: binned_proportions(&experiment.inner, &edges)? })
    }

    #[getter]
    pub fn edges(&self) -> Vec<f64> {
        self.inner.edges.as_slice().to_vec()
    }

    #[getter]
    pub fn upper(&self) -> Vec<f64> {
        self.inner.upper.to_vec()
    }

    #[getter]
    pub fn lower(&self) -> Vec<f64> {
        self.inner.lower.to_vec()
    }

    #[getter]
    pub fn timeout_fraction(&self) -> f64 {
        self.inner.timeout_fraction
    }

    #[getter]
    pub fn out_of_range_fraction(&self) -> f64 {
        self.inner.out_of_range_fraction
    }

    /// `(bin_start, choice_code, proportion)` rows.
    pub fn rows(&self) -> Vec<(f64, u8, f64)> {
        self.inner.rows().iter().map(|r| (r.bin_start, r.choice.code(), r.proportion)).collect()
    }
}

/// Recovery — Python-facing multi-start parameter recovery.
///
/// Runs on construction; the GIL is released while the starts execute.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "drift_diffusion.recovery")]
pub struct Recovery {
    pub inner: RecoveryResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl Recovery {
    #[new]
    #[pyo3(
        signature = (
            target,
            names,
            means,
            sds,
            lower,
            upper,
            fixed,
            n_starts = None,
            n_sim = None,
            dt = None,
            max_steps = None,
            seed = None,
            discrepancy = None,
            epsilon = None,
            sd_tolerance = None,
            max_iter = None,
            simplex_step = None,
            eval_seeding = None,
            parallel = None,
        ),
        text_signature = "(target, names, means, sds, lower, upper, fixed, /, n_starts=10, \
                          n_sim=1000, dt=0.001, max_steps=10000, seed=42, \
                          discrepancy='sum_squares', epsilon=None, sd_tolerance=1e-6, \
                          max_iter=200, simplex_step=1.0, eval_seeding='common', parallel=True)"
    )]
    pub fn recover(
        py: Python<'_>, target: PyRef<'_, BinnedRT>, names: Vec<String>, means: Vec<f64>,
        sds: Vec<f64>, lower: Vec<f64>, upper: Vec<f64>, fixed: HashMap<String, f64>,
        n_starts: Option<usize>, n_sim: Option<usize>, dt: Option<f64>,
        max_steps: Option<usize>, seed: Option<u64>, discrepancy: Option<&str>,
        epsilon: Option<f64>, sd_tolerance: Option<f64>, max_iter: Option<usize>,
        simplex_step: Option<f64>, eval_seeding: Option<&str>, parallel: Option<bool>,
    ) -> PyResult<Self> {
        let names = names
            .iter()
            .map(|n| n.parse::<ParamName>())
            .collect::<Result<Vec<_>, DDMError>>()?;
        let space = ParameterSpace::new(names, means, sds, lower, upper)?;
        let fixed = extract_params(&fixed)?;
        let sim = extract_sim_opts(dt, max_steps, seed.or(Some(42)), parallel)?;
        let nm = extract_nm_opts(sd_tolerance, max_iter, simplex_step, eval_seeding)?;
        let opts = build_recovery_options(
            n_starts,
            n_sim,
            sim,
            extract_discrepancy(discrepancy, epsilon)?,
            nm,
        )?;
        let target = &target.inner;
        let inner = py.allow_threads(|| {
            recover_parameters(target, &space, &fixed, &target.edges, &opts, None)
        })?;
        Ok(Recovery { inner })
    }

    /// `{name: value}` of the best run.
    #[getter]
    pub fn best_estimate(&self) -> HashMap<String, f64> {
        self.inner
            .best_estimate()
            .into_iter()
            .map(|(name, value)| (name.as_str().to_string(), value))
            .collect()
    }

    #[getter]
    pub fn value(&self) -> f64 {
        self.inner.best.value
    }

    #[getter]
    pub fn status(&self) -> &'static str {
        run_status_name(self.inner.best.status)
    }

    #[getter]
    pub fn quality(&self) -> String {
        format!("{:?}", self.inner.quality)
    }

    /// `(start_index, estimate, value, status, iterations)` per run.
    #[getter]
    pub fn runs(&self) -> Vec<(usize, Vec<f64>, f64, &'static str, usize)> {
        self.inner
            .runs
            .iter()
            .map(|r| {
                (r.start_index, r.estimate.clone(), r.value, run_status_name(r.status), r.iterations)
            })
            .collect()
    }

    #[getter]
    pub fn bound_hit_rate(&self) -> Vec<f64> {
        self.inner.diagnostics.bound_hit_rate.clone()
    }
}

#[cfg(feature = "python-bindings")]
fn run_status_name(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Converged => "converged",
        RunStatus::MaxIterReached => "max_iter_reached",
        RunStatus::Failed => "failed",
    }
}

/// _drift_diffusion — PyO3 module initializer for the Python extension.
///
/// Creates the `simulation` and `recovery` submodules, attaches them to the
/// parent module and registers them in `sys.modules` so dotted imports work.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _drift_diffusion<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let simulation_mod = PyModule::new(_py, "simulation")?;
    let recovery_mod = PyModule::new(_py, "recovery")?;
    simulation(_py, m, &simulation_mod)?;
    recovery(_py, m, &recovery_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("drift_diffusion.simulation", simulation_mod)?;

    _py.import("sys")?.getattr("modules")?.set_item("drift_diffusion.recovery", recovery_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn simulation<'py>(
    _py: Python, drift_diffusion: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<Experiment>()?;
    m.add_class::<BinnedRT>()?;
    drift_diffusion.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn recovery<'py>(
    _py: Python, drift_diffusion: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<Recovery>()?;
    drift_diffusion.add_submodule(m)?;
    Ok(())
}
