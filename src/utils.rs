//! utils — conversion helpers for the PyO3 boundary.
//!
//! Purpose
//! -------
//! Turn loosely typed Python inputs (NumPy arrays, pandas Series, lists,
//! dicts, option strings) into the validated Rust types used by the
//! simulation and recovery layers, mapping every failure to a `PyErr`.
//!
//! Conventions
//! -----------
//! - Everything here is compiled only with the `python-bindings` feature.
//! - Missing optional arguments fall back to the Rust `Default` impls.
//! - Response times arrive as floats with `NaN` marking a timeout; choices
//!   arrive as integer codes (`1` upper, `0` lower, negative for timeout).
#[cfg(feature = "python-bindings")]
use std::collections::HashMap;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
use crate::{
    diffusion::{
        core::{
            experiment::ExperimentData,
            options::{DEFAULT_DT, DEFAULT_MAX_STEPS, SimOpts},
            params::{DDMParams, ParamName, ParamOverrides},
            trial::Choice,
        },
        errors::DDMError,
        models::{objective::Discrepancy, recovery::RecoveryOptions},
    },
    optimization::simplex_optimizer::{EvalSeeding, NMOptions, Tolerances},
};

/// Borrow a 1-D float64 view of `raw_data`, copying only when needed.
///
/// Accepts contiguous NumPy arrays directly, pandas objects through
/// `to_numpy`, and any sequence of floats by extraction.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy an array-like of floats into a `Vec<f64>`.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

/// Build [`ExperimentData`] from Python choice codes and response times.
///
/// A trial is a timeout when its choice code is negative and its rt is NaN.
#[cfg(feature = "python-bindings")]
pub fn extract_observations<'py>(
    py: Python<'py>, choices: Vec<i64>, rts: &Bound<'py, PyAny>,
) -> PyResult<ExperimentData> {
    let rts = extract_f64_vec(py, rts, "rts")?;
    let choices = choices
        .iter()
        .enumerate()
        .map(|(index, &code)| match code {
            c if c < 0 => Ok(None),
            c => u8::try_from(c).ok().and_then(Choice::from_code).map(Some).ok_or_else(|| {
                PyValueError::new_err(format!(
                    "choice at index {index} must be 0, 1, or negative for a timeout; got {code}"
                ))
            }),
        })
        .collect::<PyResult<Vec<Option<Choice>>>>()?;
    let rts: Vec<Option<f64>> = rts.into_iter().map(|rt| (!rt.is_nan()).then_some(rt)).collect();
    Ok(ExperimentData::from_observations(&choices, &rts)?)
}

/// Build [`DDMParams`] from a `{name: value}` dict.
///
/// `mean_v`, `a`, `mean_z`, `s` and `mean_ter` are required; the
/// variabilities default to zero.
#[cfg(feature = "python-bindings")]
pub fn extract_params(values: &HashMap<String, f64>) -> PyResult<DDMParams> {
    let mut overrides = ParamOverrides::new();
    for (key, &value) in values {
        let name: ParamName = key.parse().map_err(DDMError::from)?;
        overrides.set(name, value);
    }
    let required = [ParamName::MeanV, ParamName::A, ParamName::MeanZ, ParamName::S, ParamName::MeanTer];
    if let Some(missing) = required.iter().find(|&&name| overrides.get(name).is_none()) {
        return Err(PyValueError::new_err(format!(
            "parameter '{}' must be provided",
            missing.as_str()
        )));
    }
    let base = DDMParams::without_variability(0.0, 1.0, 0.5, 1.0, 0.0).map_err(DDMError::from)?;
    Ok(overrides.apply(&base).map_err(DDMError::from)?)
}

/// Build [`SimOpts`], using the defaults for anything left as `None`.
#[cfg(feature = "python-bindings")]
pub fn extract_sim_opts(
    dt: Option<f64>, max_steps: Option<usize>, seed: Option<u64>, parallel: Option<bool>,
) -> PyResult<SimOpts> {
    let opts = SimOpts::new(dt.unwrap_or(DEFAULT_DT), max_steps.unwrap_or(DEFAULT_MAX_STEPS), seed)?;
    Ok(opts.with_parallel(parallel.unwrap_or(true)))
}

/// Map a discrepancy name to [`Discrepancy`].
#[cfg(feature = "python-bindings")]
pub fn extract_discrepancy(name: Option<&str>, epsilon: Option<f64>) -> PyResult<Discrepancy> {
    let discrepancy = match name.unwrap_or("sum_squares").to_lowercase().as_str() {
        "sum_squares" | "sse" => Discrepancy::SumSquares,
        "deviance" | "likelihood" => match epsilon {
            Some(epsilon) => Discrepancy::Deviance { epsilon },
            None => Discrepancy::deviance(),
        },
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid discrepancy {:?} (expected 'sum_squares' or 'deviance')",
                other
            )));
        }
    };
    discrepancy.validate()?;
    Ok(discrepancy)
}

/// Build [`NMOptions`] from optional tolerance, step and seeding arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_nm_opts(
    sd_tolerance: Option<f64>, max_iter: Option<usize>, simplex_step: Option<f64>,
    eval_seeding: Option<&str>,
) -> PyResult<NMOptions> {
    let defaults = NMOptions::default();
    let tols = Tolerances::new(
        sd_tolerance.or(defaults.tols.sd_tolerance),
        max_iter.or(defaults.tols.max_iter),
    )
    .map_err(DDMError::from)?;
    let seeding = match eval_seeding {
        Some(name) => name.parse::<EvalSeeding>().map_err(DDMError::from)?,
        None => EvalSeeding::default(),
    };
    let opts = NMOptions::new(tols, simplex_step.unwrap_or(defaults.simplex_step), seeding, false)
        .map_err(DDMError::from)?;
    Ok(opts)
}

/// Assemble validated [`RecoveryOptions`].
#[cfg(feature = "python-bindings")]
pub fn build_recovery_options(
    n_starts: Option<usize>, n_sim: Option<usize>, sim: SimOpts, discrepancy: Discrepancy,
    nm: NMOptions,
) -> PyResult<RecoveryOptions> {
    let defaults = RecoveryOptions::default();
    let parallel = sim.parallel;
    let opts = RecoveryOptions::new(
        n_starts.unwrap_or(defaults.n_starts),
        n_sim.unwrap_or(defaults.n_sim),
        sim,
        discrepancy,
        nm,
    )?;
    Ok(opts.with_parallel(parallel))
}
