//! Validation helpers for drift-diffusion parameters, simulation options,
//! and bin edges.
//!
//! Purpose
//! -------
//! Centralize the scalar checks that guard the simulator and the fitting
//! layer so constructors ([`DDMParams::new`], [`SimOpts::new`],
//! [`BinEdges::new`]) can stay thin and report uniform errors.
//!
//! Key behaviors
//! -------------
//! - Parameter checks return [`ParamError`] with the offending field name.
//! - Option and edge checks return [`DDMError`].
//! - Every helper is pure and O(1) except [`validate_bin_edges`], which
//!   scans the edge slice once.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters are finite; `a > 0`; `0 < mean_z < a`; `s > 0`;
//!   `mean_ter >= 0`; `sv, sz, st0 >= 0`.
//! - Bin edges are finite and strictly increasing with at least two entries.
//!
//! [`DDMParams::new`]: crate::diffusion::core::params::DDMParams::new
//! [`SimOpts::new`]: crate::diffusion::core::options::SimOpts::new
//! [`BinEdges::new`]: crate::diffusion::core::bins::BinEdges::new
use crate::diffusion::errors::{DDMError, DDMResult, ParamError, ParamResult};

/// Reject NaN and ±∞ for a named parameter.
pub fn validate_finite(name: &'static str, value: f64) -> ParamResult<()> {
    if !value.is_finite() {
        return Err(ParamError::NonFinite { name, value });
    }
    Ok(())
}

/// Boundary separation must be finite and strictly positive.
pub fn validate_boundary(a: f64) -> ParamResult<()> {
    validate_finite("a", a)?;
    if a <= 0.0 {
        return Err(ParamError::InvalidBoundary { value: a });
    }
    Ok(())
}

/// Mean starting point must lie strictly between the two boundaries.
///
/// Assumes `a` has already passed [`validate_boundary`].
pub fn validate_start(mean_z: f64, a: f64) -> ParamResult<()> {
    validate_finite("mean_z", mean_z)?;
    if mean_z <= 0.0 || mean_z >= a {
        return Err(ParamError::StartOutsideBoundaries { mean_z, a });
    }
    Ok(())
}

/// Diffusion coefficient must be finite and strictly positive.
pub fn validate_noise(s: f64) -> ParamResult<()> {
    validate_finite("s", s)?;
    if s <= 0.0 {
        return Err(ParamError::InvalidNoise { value: s });
    }
    Ok(())
}

/// Mean non-decision time must be finite and non-negative.
pub fn validate_non_decision_time(mean_ter: f64) -> ParamResult<()> {
    validate_finite("mean_ter", mean_ter)?;
    if mean_ter < 0.0 {
        return Err(ParamError::NegativeNonDecisionTime { value: mean_ter });
    }
    Ok(())
}

/// Variability widths (`sv`, `sz`, `st0`) must be finite and non-negative.
pub fn validate_variability(name: &'static str, value: f64) -> ParamResult<()> {
    validate_finite(name, value)?;
    if value < 0.0 {
        return Err(ParamError::NegativeVariability { name, value });
    }
    Ok(())
}

/// Euler–Maruyama step size must be finite and strictly positive.
pub fn validate_step_size(dt: f64) -> DDMResult<()> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(DDMError::InvalidStepSize { dt });
    }
    Ok(())
}

/// The step budget must allow at least one step.
pub fn validate_max_steps(max_steps: usize) -> DDMResult<()> {
    if max_steps == 0 {
        return Err(DDMError::InvalidMaxSteps { max_steps });
    }
    Ok(())
}

/// Validate a bin-edge sequence.
///
/// Checks
/// ------
/// - At least two edges.
/// - Every edge finite.
/// - Strictly increasing (`e[i] < e[i + 1]`).
///
/// Errors
/// ------
/// - [`DDMError::TooFewBinEdges`] when fewer than two edges are given.
/// - [`DDMError::InvalidBinEdge`] at the first offending index.
pub fn validate_bin_edges(edges: &[f64]) -> DDMResult<()> {
    if edges.len() < 2 {
        return Err(DDMError::TooFewBinEdges { len: edges.len() });
    }
    for (index, &value) in edges.iter().enumerate() {
        if !value.is_finite() {
            return Err(DDMError::InvalidBinEdge {
                index,
                value,
                reason: "Bin edges must be finite.",
            });
        }
        if index > 0 && value <= edges[index - 1] {
            return Err(DDMError::InvalidBinEdge {
                index,
                value,
                reason: "Bin edges must be strictly increasing.",
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Acceptance and rejection paths of each scalar validator.
    // - Ordering and finiteness checks of `validate_bin_edges`.
    //
    // They intentionally DO NOT cover:
    // - How constructors compose these helpers (tested alongside `DDMParams`,
    //   `SimOpts`, and `BinEdges`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A starting point on either boundary is rejected.
    //
    // Given
    // -----
    // - `a = 1.0` and `mean_z` in {0.0, 1.0}.
    //
    // Expect
    // ------
    // - Both return `StartOutsideBoundaries`; an interior value passes.
    fn validate_start_rejects_boundary_values() {
        assert!(matches!(
            validate_start(0.0, 1.0),
            Err(ParamError::StartOutsideBoundaries { .. })
        ));
        assert!(matches!(
            validate_start(1.0, 1.0),
            Err(ParamError::StartOutsideBoundaries { .. })
        ));
        assert!(validate_start(0.5, 1.0).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Non-positive noise and boundary separation are rejected; NaN is
    // reported as non-finite with the parameter name.
    fn validate_noise_and_boundary_reject_non_positive() {
        assert_eq!(validate_noise(0.0), Err(ParamError::InvalidNoise { value: 0.0 }));
        assert_eq!(validate_boundary(-0.1), Err(ParamError::InvalidBoundary { value: -0.1 }));
        assert!(matches!(validate_noise(f64::NAN), Err(ParamError::NonFinite { name: "s", .. })));
    }

    #[test]
    // Purpose
    // -------
    // Zero variability is allowed, negative variability is not.
    fn validate_variability_allows_zero() {
        assert!(validate_variability("sv", 0.0).is_ok());
        assert_eq!(
            validate_variability("sz", -0.01),
            Err(ParamError::NegativeVariability { name: "sz", value: -0.01 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Step size and step budget reject degenerate values.
    fn validate_step_options_reject_degenerate_values() {
        assert!(validate_step_size(0.001).is_ok());
        assert_eq!(validate_step_size(0.0), Err(DDMError::InvalidStepSize { dt: 0.0 }));
        assert!(validate_step_size(f64::INFINITY).is_err());
        assert_eq!(validate_max_steps(0), Err(DDMError::InvalidMaxSteps { max_steps: 0 }));
    }

    #[test]
    // Purpose
    // -------
    // Verify edge-sequence validation.
    //
    // Given
    // -----
    // - A single edge, a repeated edge, a NaN edge, and a valid sequence.
    //
    // Expect
    // ------
    // - `TooFewBinEdges`, `InvalidBinEdge` at index 2, `InvalidBinEdge` at
    //   index 1, and `Ok(())` respectively.
    fn validate_bin_edges_checks_length_order_and_finiteness() {
        assert_eq!(validate_bin_edges(&[0.0]), Err(DDMError::TooFewBinEdges { len: 1 }));
        assert!(matches!(
            validate_bin_edges(&[0.0, 0.5, 0.5]),
            Err(DDMError::InvalidBinEdge { index: 2, .. })
        ));
        assert!(matches!(
            validate_bin_edges(&[0.0, f64::NAN, 1.0]),
            Err(DDMError::InvalidBinEdge { index: 1, .. })
        ));
        assert!(validate_bin_edges(&[0.0, 0.25, 0.5, 1.0]).is_ok());
    }
}
