//! Errors for drift-diffusion models (parameter validation, simulation
//! options, bin-table checks, recovery configuration, and optimizer failures).
//!
//! This module defines a model error type, [`DDMError`], and a parameter error
//! type, [`ParamError`], used across the Python-facing API and the internal Rust
//! core. Both implement `Display`/`Error` and convert to `PyErr` when the
//! `python-bindings` feature is enabled.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Configuration problems (bad bounds, non-monotonic bin edges, zero starts)
//!   are errors and are raised before any simulation work begins.
//! - Timeouts and non-convergent optimizer runs are **data**, not errors; they
//!   never appear in this module.
//! - Optimizer/backend errors are normalized to
//!   [`DDMError::OptimizationFailed`] with a human-readable status.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

/// Crate-wide result alias for drift-diffusion operations that may produce [`DDMError`].
pub type DDMResult<T> = Result<T, DDMError>;

/// Result alias for parameter-construction/validation paths that may produce
/// [`ParamError`].
pub type ParamResult<T> = Result<T, ParamError>;

/// Unified error type for drift-diffusion simulation and recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum DDMError {
    // ---- Simulation options ----
    /// Step size must be finite and > 0.
    InvalidStepSize { dt: f64 },

    /// Step budget must be at least one step.
    InvalidMaxSteps { max_steps: usize },

    /// An experiment needs at least one trial.
    EmptyExperiment,

    // ---- Observed data ----
    /// Choice and rt columns must have the same length.
    ObservationLengthMismatch { choices: usize, rts: usize },

    /// Observation at `index` is malformed.
    InvalidObservation { index: usize, reason: &'static str },

    // ---- Bin edges / tables ----
    /// At least two edges are needed to form one bin.
    TooFewBinEdges { len: usize },

    /// Edge is non-finite or not strictly increasing.
    InvalidBinEdge { index: usize, value: f64, reason: &'static str },

    /// Bin tables built on different edge sequences cannot be compared.
    BinEdgeMismatch { expected: usize, found: usize },

    /// Edge values differ at `index`.
    BinEdgeValueMismatch { index: usize, expected: f64, found: f64 },

    /// A table's per-choice proportions do not match its number of bins.
    BinTableShapeMismatch { choice: &'static str, expected: usize, found: usize },

    /// Quantile probabilities must lie strictly inside (0, 1) and increase.
    InvalidQuantile { index: usize, prob: f64 },

    /// No valid (non-timeout) responses to derive edges from.
    NoValidResponses,

    /// Requested uniform binning is degenerate.
    InvalidUniformBins { lower: f64, upper: f64, n_bins: usize },

    // ---- Objective ----
    /// Deviance floor must be finite and > 0.
    InvalidEpsilon { value: f64 },

    /// Candidate vector length differs from the number of free parameters.
    CandidateLengthMismatch { expected: usize, actual: usize },

    // ---- Recovery configuration ----
    /// No free parameters were supplied.
    EmptyParameterSpace,

    /// Per-parameter vectors must all have the same length as the names.
    ParameterSpaceLengthMismatch { field: &'static str, expected: usize, actual: usize },

    /// Unknown parameter name.
    UnknownParameter { name: String },

    /// The same parameter appears twice.
    DuplicateParameter { name: &'static str },

    /// Bounds must be finite with lower < upper.
    InvalidBounds { name: &'static str, lower: f64, upper: f64 },

    /// Initial mean must be finite.
    InvalidInitialMean { name: &'static str, value: f64 },

    /// Initial sd must be finite and >= 0.
    InvalidInitialSd { name: &'static str, value: f64 },

    /// At least one start is required.
    InvalidStarts { n_starts: usize },

    /// The forward model needs at least one simulated trial.
    InvalidSimCount { n_sim: usize },

    /// Recovery was cancelled before any start completed.
    Cancelled,

    // ---- Estimation / optimizer ----
    /// Optimizer failed; include a human-readable status/reason.
    OptimizationFailed { status: String },

    // ---- Parameters ----
    /// Wrapper for [`ParamError`].
    Param(ParamError),
}

impl std::error::Error for DDMError {}

impl std::fmt::Display for DDMError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Simulation options ----
            DDMError::InvalidStepSize { dt } => {
                write!(f, "Step size dt must be finite and > 0; got: {dt}")
            }
            DDMError::InvalidMaxSteps { max_steps } => {
                write!(f, "max_steps must be at least 1; got: {max_steps}")
            }
            DDMError::EmptyExperiment => {
                write!(f, "An experiment needs at least one trial.")
            }
            // ---- Observed data ----
            DDMError::ObservationLengthMismatch { choices, rts } => {
                write!(f, "Observation columns differ in length: {choices} choices, {rts} rts")
            }
            DDMError::InvalidObservation { index, reason } => {
                write!(f, "Observation at index {index} is invalid: {reason}")
            }
            // ---- Bin edges / tables ----
            DDMError::TooFewBinEdges { len } => {
                write!(f, "At least two bin edges are required; got: {len}")
            }
            DDMError::InvalidBinEdge { index, value, reason } => {
                write!(f, "Invalid bin edge at index {index}: {value}. {reason}")
            }
            DDMError::BinEdgeMismatch { expected, found } => {
                write!(
                    f,
                    "Bin tables use different edges: expected {expected} edges, found {found}"
                )
            }
            DDMError::BinEdgeValueMismatch { index, expected, found } => {
                write!(
                    f,
                    "Bin tables use different edges: edge {index} is {found}, expected {expected}"
                )
            }
            DDMError::BinTableShapeMismatch { choice, expected, found } => {
                write!(
                    f,
                    "Bin table has {found} {choice} proportions for {expected} bins"
                )
            }
            DDMError::InvalidQuantile { index, prob } => {
                write!(
                    f,
                    "Quantile probability at index {index} must lie in (0, 1) and increase; got: {prob}"
                )
            }
            DDMError::NoValidResponses => {
                write!(f, "No non-timeout responses are available to build bin edges.")
            }
            DDMError::InvalidUniformBins { lower, upper, n_bins } => {
                write!(
                    f,
                    "Uniform bins need finite lower < upper and n_bins > 0; got: [{lower}, {upper}] with {n_bins} bins"
                )
            }
            // ---- Objective ----
            DDMError::InvalidEpsilon { value } => {
                write!(f, "Deviance floor epsilon must be finite and > 0; got: {value}")
            }
            DDMError::CandidateLengthMismatch { expected, actual } => {
                write!(f, "Candidate length mismatch: expected {expected}, got {actual}")
            }
            // ---- Recovery configuration ----
            DDMError::EmptyParameterSpace => {
                write!(f, "At least one free parameter must be supplied.")
            }
            DDMError::ParameterSpaceLengthMismatch { field, expected, actual } => {
                write!(f, "Length of {field} must match parameter names: expected {expected}, got {actual}")
            }
            DDMError::UnknownParameter { name } => {
                write!(f, "Unknown parameter name '{name}'.")
            }
            DDMError::DuplicateParameter { name } => {
                write!(f, "Parameter '{name}' is listed more than once.")
            }
            DDMError::InvalidBounds { name, lower, upper } => {
                write!(
                    f,
                    "Bounds for '{name}' must be finite with lower < upper; got: [{lower}, {upper}]"
                )
            }
            DDMError::InvalidInitialMean { name, value } => {
                write!(f, "Initial mean for '{name}' must be finite; got: {value}")
            }
            DDMError::InvalidInitialSd { name, value } => {
                write!(f, "Initial sd for '{name}' must be finite and >= 0; got: {value}")
            }
            DDMError::InvalidStarts { n_starts } => {
                write!(f, "At least one optimizer start is required; got: {n_starts}")
            }
            DDMError::InvalidSimCount { n_sim } => {
                write!(f, "n_sim must be at least 1; got: {n_sim}")
            }
            DDMError::Cancelled => {
                write!(f, "Recovery was cancelled before any start completed.")
            }
            // ---- Estimation / optimizer ----
            DDMError::OptimizationFailed { status } => {
                write!(f, "Optimizer failed with status: {status}")
            }
            // ---- Parameters ----
            DDMError::Param(err) => {
                write!(f, "Invalid model parameters: {err}")
            }
        }
    }
}

/// Convert a [`DDMError`] into a Python `ValueError` with the error message.
///
/// This is used at the Rust↔Python boundary to surface domain errors cleanly.
#[cfg(feature = "python-bindings")]
impl std::convert::From<DDMError> for PyErr {
    fn from(err: DDMError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

impl From<ParamError> for DDMError {
    fn from(err: ParamError) -> DDMError {
        DDMError::Param(err)
    }
}

/// Errors specific to model-parameter construction and validation.
///
/// Typical causes include a starting point outside `(0, a)`, non-positive
/// boundary separation or noise, and negative variability widths.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Every parameter must be finite.
    NonFinite { name: &'static str, value: f64 },

    /// Boundary separation must be > 0.
    InvalidBoundary { value: f64 },

    /// Mean starting point must satisfy 0 < mean_z < a.
    StartOutsideBoundaries { mean_z: f64, a: f64 },

    /// Within-trial noise must be > 0.
    InvalidNoise { value: f64 },

    /// Mean non-decision time must be >= 0.
    NegativeNonDecisionTime { value: f64 },

    /// Variability widths must be >= 0.
    NegativeVariability { name: &'static str, value: f64 },
}

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::NonFinite { name, value } => {
                write!(f, "Parameter '{name}' must be finite, got {value}")
            }
            ParamError::InvalidBoundary { value } => {
                write!(f, "Boundary separation a must be > 0, got {value}")
            }
            ParamError::StartOutsideBoundaries { mean_z, a } => {
                write!(f, "Starting point mean_z must satisfy 0 < mean_z < a; got mean_z = {mean_z}, a = {a}")
            }
            ParamError::InvalidNoise { value } => {
                write!(f, "Noise scale s must be > 0, got {value}")
            }
            ParamError::NegativeNonDecisionTime { value } => {
                write!(f, "Mean non-decision time must be >= 0, got {value}")
            }
            ParamError::NegativeVariability { name, value } => {
                write!(f, "Variability width '{name}' must be >= 0, got {value}")
            }
        }
    }
}

/// Convert a [`ParamError`] into a Python `ValueError` with the error message.
#[cfg(feature = "python-bindings")]
impl std::convert::From<ParamError> for PyErr {
    fn from(err: ParamError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
