//! Errors for the bounded simplex optimizer.
//!
//! [`OptError`] covers optimizer configuration (tolerances, bounds, simplex
//! geometry), objective failures, and normalized argmin backend errors.
//! Model-layer errors pass through unchanged inside
//! [`OptError::Model`], so the recovery layer can tell a configuration
//! mistake from a solver failure.
use argmin::core::{ArgminError, Error};

use crate::diffusion::errors::{DDMError, ParamError};

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- NMOptions ----
    /// Standard-deviation tolerance needs to be positive and finite.
    InvalidSdTolerance {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one stopping rule must be provided.
    NoTolerancesProvided,

    /// Initial simplex step needs to be positive and finite.
    InvalidSimplexStep {
        step: f64,
        reason: &'static str,
    },

    /// Invalid evaluation-seeding policy name.
    InvalidEvalSeeding {
        name: String,
        reason: &'static str,
    },

    // ---- Bounds / start ----
    /// Lower and upper bound vectors differ in length from the start.
    BoundsDimMismatch {
        expected: usize,
        lower: usize,
        upper: usize,
    },

    /// Bounds must be finite with lower < upper.
    InvalidBounds {
        index: usize,
        lower: f64,
        upper: f64,
    },

    /// Starting vector must be finite.
    InvalidStart {
        index: usize,
        value: f64,
    },

    /// Empty starting vector.
    EmptyStart,

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Model errors ----
    /// Error raised by the objective's model layer.
    Model(DDMError),

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- NMOptions ----
            OptError::InvalidSdTolerance { tol, reason } => {
                write!(f, "Invalid simplex sd tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidSimplexStep { step, reason } => {
                write!(f, "Invalid initial simplex step {step}: {reason}")
            }
            OptError::InvalidEvalSeeding { name, reason } => {
                write!(f, "Invalid evaluation seeding '{name}': {reason}")
            }

            // ---- Bounds / start ----
            OptError::BoundsDimMismatch { expected, lower, upper } => {
                write!(
                    f,
                    "Bounds dimension mismatch: expected {expected}, got lower {lower} and upper {upper}"
                )
            }
            OptError::InvalidBounds { index, lower, upper } => {
                write!(
                    f,
                    "Invalid bounds at index {index}: [{lower}, {upper}], must be finite with lower < upper"
                )
            }
            OptError::InvalidStart { index, value } => {
                write!(f, "Invalid starting value at index {index}: {value}, must be finite")
            }
            OptError::EmptyStart => {
                write!(f, "Starting vector is empty")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Model errors ----
            OptError::Model(err) => {
                write!(f, "Model error: {err}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Errors raised by our own cost function travel through argmin as
        // `anyhow`-style boxes; recover them before trying ArgminError.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<DDMError> for OptError {
    fn from(err: DDMError) -> Self {
        OptError::Model(err)
    }
}

impl From<ParamError> for OptError {
    fn from(err: ParamError) -> Self {
        OptError::Model(DDMError::Param(err))
    }
}

impl From<OptError> for DDMError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::Model(inner) => inner,
            other => DDMError::OptimizationFailed { status: other.to_string() },
        }
    }
}
