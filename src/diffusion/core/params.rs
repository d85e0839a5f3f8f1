//! Drift-diffusion model parameters and partial overrides.
//!
//! This module provides the validated parameter container [`DDMParams`], the
//! closed set of parameter names [`ParamName`], and [`ParamOverrides`], a
//! partial parameter set merged into a base instance when only a subset of
//! parameters is being fitted.
//!
//! ## Parameters
//! - `mean_v`: mean drift rate (any finite value).
//! - `a`: boundary separation, `a > 0`. Lower boundary sits at 0.
//! - `mean_z`: mean starting point, `0 < mean_z < a`.
//! - `s`: within-trial diffusion coefficient, `s > 0`.
//! - `mean_ter`: mean non-decision time, `mean_ter >= 0`.
//! - `sv`, `sz`, `st0`: trial-to-trial variability widths, `>= 0`.
//!
//! ## Merge semantics
//! [`ParamOverrides::apply`] copies the base, replaces every field that has
//! an override, and validates the result once. Invalid merges surface as
//! [`ParamError`]; the objective layer turns those into a penalty cost.
use std::{fmt, str::FromStr};

use crate::diffusion::{
    core::validation::{
        validate_boundary, validate_finite, validate_noise, validate_non_decision_time,
        validate_start, validate_variability,
    },
    errors::{DDMError, ParamResult},
};

/// Names of the eight model parameters.
///
/// Parsing via [`FromStr`] accepts the snake-case field names
/// (`"mean_v"`, `"a"`, `"mean_z"`, `"s"`, `"mean_ter"`, `"sv"`, `"sz"`,
/// `"st0"`), case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamName {
    MeanV,
    A,
    MeanZ,
    S,
    MeanTer,
    Sv,
    Sz,
    St0,
}

impl ParamName {
    /// All names in canonical order.
    pub const ALL: [ParamName; 8] = [
        ParamName::MeanV,
        ParamName::A,
        ParamName::MeanZ,
        ParamName::S,
        ParamName::MeanTer,
        ParamName::Sv,
        ParamName::Sz,
        ParamName::St0,
    ];

    /// Canonical snake-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            ParamName::MeanV => "mean_v",
            ParamName::A => "a",
            ParamName::MeanZ => "mean_z",
            ParamName::S => "s",
            ParamName::MeanTer => "mean_ter",
            ParamName::Sv => "sv",
            ParamName::Sz => "sz",
            ParamName::St0 => "st0",
        }
    }

    fn index(self) -> usize {
        match self {
            ParamName::MeanV => 0,
            ParamName::A => 1,
            ParamName::MeanZ => 2,
            ParamName::S => 3,
            ParamName::MeanTer => 4,
            ParamName::Sv => 5,
            ParamName::Sz => 6,
            ParamName::St0 => 7,
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamName {
    type Err = DDMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DDMError::UnknownParameter { name: s.to_string() })
    }
}

/// Validated drift-diffusion model parameters.
///
/// Fields are public for read access and for building variants; call
/// [`DDMParams::validate`] after mutating a copy by hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DDMParams {
    /// Mean drift rate.
    pub mean_v: f64,
    /// Boundary separation (> 0).
    pub a: f64,
    /// Mean starting point (0 < mean_z < a).
    pub mean_z: f64,
    /// Within-trial noise scale (> 0).
    pub s: f64,
    /// Mean non-decision time (>= 0).
    pub mean_ter: f64,
    /// Drift variability (sd of a normal).
    pub sv: f64,
    /// Starting-point variability (width of a uniform).
    pub sz: f64,
    /// Non-decision-time variability (width of a uniform).
    pub st0: f64,
}

impl DDMParams {
    /// Create validated parameters.
    ///
    /// Errors
    /// ------
    /// - [`ParamError`] describing the first violated invariant, checked in
    ///   field order.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use drift_diffusion::diffusion::core::params::DDMParams;
    /// let p = DDMParams::new(0.15, 0.8, 0.4, 0.3, 0.12, 0.1, 0.02, 0.03).unwrap();
    /// assert_eq!(p.a, 0.8);
    /// assert!(DDMParams::new(0.15, 0.8, 0.9, 0.3, 0.12, 0.0, 0.0, 0.0).is_err());
    /// ```
    ///
    /// [`ParamError`]: crate::diffusion::errors::ParamError
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mean_v: f64, a: f64, mean_z: f64, s: f64, mean_ter: f64, sv: f64, sz: f64, st0: f64,
    ) -> ParamResult<Self> {
        let params = DDMParams { mean_v, a, mean_z, s, mean_ter, sv, sz, st0 };
        params.validate()?;
        Ok(params)
    }

    /// Parameters without trial-to-trial variability.
    pub fn without_variability(
        mean_v: f64, a: f64, mean_z: f64, s: f64, mean_ter: f64,
    ) -> ParamResult<Self> {
        Self::new(mean_v, a, mean_z, s, mean_ter, 0.0, 0.0, 0.0)
    }

    /// Re-check every invariant.
    pub fn validate(&self) -> ParamResult<()> {
        validate_finite("mean_v", self.mean_v)?;
        validate_boundary(self.a)?;
        validate_start(self.mean_z, self.a)?;
        validate_noise(self.s)?;
        validate_non_decision_time(self.mean_ter)?;
        validate_variability("sv", self.sv)?;
        validate_variability("sz", self.sz)?;
        validate_variability("st0", self.st0)?;
        Ok(())
    }

    /// Read a parameter by name.
    pub fn get(&self, name: ParamName) -> f64 {
        match name {
            ParamName::MeanV => self.mean_v,
            ParamName::A => self.a,
            ParamName::MeanZ => self.mean_z,
            ParamName::S => self.s,
            ParamName::MeanTer => self.mean_ter,
            ParamName::Sv => self.sv,
            ParamName::Sz => self.sz,
            ParamName::St0 => self.st0,
        }
    }

    fn set_unchecked(&mut self, name: ParamName, value: f64) {
        match name {
            ParamName::MeanV => self.mean_v = value,
            ParamName::A => self.a = value,
            ParamName::MeanZ => self.mean_z = value,
            ParamName::S => self.s = value,
            ParamName::MeanTer => self.mean_ter = value,
            ParamName::Sv => self.sv = value,
            ParamName::Sz => self.sz = value,
            ParamName::St0 => self.st0 = value,
        }
    }

    /// Values of the named parameters, in the given order.
    pub fn select(&self, names: &[ParamName]) -> Vec<f64> {
        names.iter().map(|&name| self.get(name)).collect()
    }
}

/// Partial parameter set; `None` keeps the base value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParamOverrides {
    values: [Option<f64>; 8],
}

impl ParamOverrides {
    /// Empty override set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build overrides from parallel name/value slices.
    ///
    /// Errors
    /// ------
    /// - [`DDMError::CandidateLengthMismatch`] if the slices differ in length.
    pub fn from_pairs(names: &[ParamName], values: &[f64]) -> Result<Self, DDMError> {
        if names.len() != values.len() {
            return Err(DDMError::CandidateLengthMismatch {
                expected: names.len(),
                actual: values.len(),
            });
        }
        let mut out = Self::new();
        for (&name, &value) in names.iter().zip(values) {
            out.set(name, value);
        }
        Ok(out)
    }

    /// Set (or replace) one override.
    pub fn set(&mut self, name: ParamName, value: f64) -> &mut Self {
        self.values[name.index()] = Some(value);
        self
    }

    pub fn get(&self, name: ParamName) -> Option<f64> {
        self.values[name.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Merge into `base` and validate the result once.
    pub fn apply(&self, base: &DDMParams) -> ParamResult<DDMParams> {
        let mut merged = *base;
        for name in ParamName::ALL {
            if let Some(value) = self.get(name) {
                merged.set_unchecked(name, value);
            }
        }
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diffusion::errors::ParamError;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - `DDMParams::new` acceptance and invariant violations.
    // - Name parsing and lookup.
    // - Override merging, including merges that break invariants.
    // -------------------------------------------------------------------------

    fn reference() -> DDMParams {
        DDMParams::new(0.15, 0.8, 0.4, 0.3, 0.12, 0.1, 0.02, 0.03).expect("valid reference")
    }

    #[test]
    // Purpose
    // -------
    // The reference parameter set is accepted and fields are preserved.
    fn ddm_params_new_accepts_reference_set() {
        let p = reference();
        assert_eq!(p.mean_v, 0.15);
        assert_eq!(p.st0, 0.03);
        assert_eq!(p.get(ParamName::MeanZ), 0.4);
    }

    #[test]
    // Purpose
    // -------
    // Each invariant maps to its own error variant.
    //
    // Given
    // -----
    // - Variants of the reference set with one field broken at a time.
    //
    // Expect
    // ------
    // - The matching `ParamError` variant for each.
    fn ddm_params_new_reports_each_violation() {
        assert_eq!(
            DDMParams::new(0.1, 0.0, 0.4, 0.3, 0.1, 0.0, 0.0, 0.0),
            Err(ParamError::InvalidBoundary { value: 0.0 })
        );
        assert_eq!(
            DDMParams::new(0.1, 0.8, 0.8, 0.3, 0.1, 0.0, 0.0, 0.0),
            Err(ParamError::StartOutsideBoundaries { mean_z: 0.8, a: 0.8 })
        );
        assert_eq!(
            DDMParams::new(0.1, 0.8, 0.4, -0.3, 0.1, 0.0, 0.0, 0.0),
            Err(ParamError::InvalidNoise { value: -0.3 })
        );
        assert_eq!(
            DDMParams::new(0.1, 0.8, 0.4, 0.3, -0.1, 0.0, 0.0, 0.0),
            Err(ParamError::NegativeNonDecisionTime { value: -0.1 })
        );
        assert_eq!(
            DDMParams::new(0.1, 0.8, 0.4, 0.3, 0.1, 0.0, -0.2, 0.0),
            Err(ParamError::NegativeVariability { name: "sz", value: -0.2 })
        );
        assert!(matches!(
            DDMParams::new(f64::NAN, 0.8, 0.4, 0.3, 0.1, 0.0, 0.0, 0.0),
            Err(ParamError::NonFinite { name: "mean_v", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Names round-trip through `as_str` / `FromStr`, case-insensitively.
    fn param_name_parses_canonical_names() {
        for name in ParamName::ALL {
            assert_eq!(name.as_str().parse::<ParamName>(), Ok(name));
        }
        assert_eq!("MEAN_TER".parse::<ParamName>(), Ok(ParamName::MeanTer));
        assert!(matches!("drift".parse::<ParamName>(), Err(DDMError::UnknownParameter { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Overrides replace only the named fields.
    //
    // Given
    // -----
    // - Reference base; overrides for `mean_v` and `a`.
    //
    // Expect
    // ------
    // - Merged params carry the new values; all other fields match the base.
    fn overrides_apply_replaces_only_named_fields() {
        let base = reference();
        let overrides =
            ParamOverrides::from_pairs(&[ParamName::MeanV, ParamName::A], &[0.3, 1.0]).unwrap();
        let merged = overrides.apply(&base).unwrap();
        assert_eq!(merged.mean_v, 0.3);
        assert_eq!(merged.a, 1.0);
        assert_eq!(merged.mean_z, base.mean_z);
        assert_eq!(merged.sv, base.sv);
    }

    #[test]
    // Purpose
    // -------
    // A merge that pushes `a` below the fixed `mean_z` is rejected.
    fn overrides_apply_validates_merged_result() {
        let base = reference();
        let mut overrides = ParamOverrides::new();
        overrides.set(ParamName::A, 0.3);
        assert_eq!(
            overrides.apply(&base),
            Err(ParamError::StartOutsideBoundaries { mean_z: 0.4, a: 0.3 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Mismatched slice lengths are reported, not truncated.
    fn overrides_from_pairs_rejects_length_mismatch() {
        let err = ParamOverrides::from_pairs(&[ParamName::MeanV], &[0.1, 0.2]).unwrap_err();
        assert_eq!(err, DDMError::CandidateLengthMismatch { expected: 1, actual: 2 });
        assert!(ParamOverrides::new().is_empty());
    }
}
