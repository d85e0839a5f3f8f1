//! Validation helpers for bounded simplex optimization.
//!
//! - **Tolerance checks**: [`verify_sd_tolerance`], [`verify_simplex_step`].
//! - **Box checks**: [`validate_bounds`] enforces matching lengths and
//!   finite `lower < upper` per coordinate.
//! - **Start checks**: [`validate_start`] rejects empty or non-finite
//!   starting vectors.
//! - **Outcome checks**: [`validate_theta_hat`] ensures the solver returned
//!   a finite best vector.
use crate::optimization::{
    errors::{OptError, OptResult},
    simplex_optimizer::types::Theta,
};

/// Validate the optional simplex standard-deviation tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidSdTolerance`] if the value is non-finite or ≤ 0.0.
pub fn verify_sd_tolerance(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidSdTolerance { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidSdTolerance {
                tol,
                reason: "Tolerance must be positive.",
            });
        }
    }
    Ok(())
}

/// Validate the initial simplex edge length.
///
/// # Errors
/// Returns [`OptError::InvalidSimplexStep`] if the value is non-finite or ≤ 0.0.
pub fn verify_simplex_step(step: f64) -> OptResult<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(OptError::InvalidSimplexStep {
            step,
            reason: "Simplex step must be finite and positive.",
        });
    }
    Ok(())
}

/// Validate a starting vector.
///
/// # Errors
/// - [`OptError::EmptyStart`] for an empty vector.
/// - [`OptError::InvalidStart`] at the first non-finite entry.
pub fn validate_start(theta0: &[f64]) -> OptResult<()> {
    if theta0.is_empty() {
        return Err(OptError::EmptyStart);
    }
    for (index, &value) in theta0.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidStart { index, value });
        }
    }
    Ok(())
}

/// Validate a box against the problem dimension.
///
/// # Errors
/// - [`OptError::BoundsDimMismatch`] if either bound vector has the wrong length.
/// - [`OptError::InvalidBounds`] at the first non-finite or inverted pair.
pub fn validate_bounds(dim: usize, lower: &[f64], upper: &[f64]) -> OptResult<()> {
    if lower.len() != dim || upper.len() != dim {
        return Err(OptError::BoundsDimMismatch {
            expected: dim,
            lower: lower.len(),
            upper: upper.len(),
        });
    }
    for (index, (&lo, &hi)) in lower.iter().zip(upper).enumerate() {
        if !lo.is_finite() || !hi.is_finite() || lo >= hi {
            return Err(OptError::InvalidBounds { index, lower: lo, upper: hi });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector (`theta_hat`).
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    match theta_hat {
        Some(t) => {
            for (index, &value) in t.iter().enumerate() {
                if !value.is_finite() {
                    return Err(OptError::InvalidThetaHat {
                        index,
                        value,
                        reason: "Parameter estimates must be finite.",
                    });
                }
            }
            Ok(t)
        }
        None => Err(OptError::MissingThetaHat),
    }
}
