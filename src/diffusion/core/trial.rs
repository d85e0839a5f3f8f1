//! Trial generator — one drift-diffusion decision.
//!
//! Purpose
//! -------
//! Simulate a single two-boundary decision with trial-to-trial variability:
//! sample the per-trial drift, starting point and non-decision time, then
//! advance the Euler–Maruyama discretization
//!
//! ```text
//! x_0     = z
//! x_{t+1} = x_t + v·dt + s·√dt·ε_t,   ε_t ~ N(0, 1)
//! ```
//!
//! until `x ≥ a` (upper, choice 1) or `x ≤ 0` (lower, choice 0).
//!
//! Key behaviors
//! -------------
//! - Variability draws happen only when the corresponding width is > 0:
//!   `v ~ N(mean_v, sv)`, `z ~ U(mean_z ± sz/2)` clamped into `(0, a)`,
//!   `ter ~ U(mean_ter ± st0/2)` clamped to `>= 0`.
//! - Decision time is `steps · dt`; `rt = decision time + ter`.
//! - When `max_steps` steps pass without a crossing the outcome is
//!   [`TrialOutcome::Timeout`]; no choice or rt is invented.
//!
//! Invariants & assumptions
//! ------------------------
//! - `params` satisfy [`DDMParams::validate`]; `dt > 0`; `max_steps >= 1`.
//!   Callers ([`simulate_experiment`]) check these once per batch.
//! - The only side effect is consuming the caller's RNG, so a seeded RNG
//!   gives a reproducible trial.
//!
//! [`simulate_experiment`]: crate::diffusion::core::experiment::simulate_experiment
use rand::Rng;
use rand_distr::StandardNormal;

use crate::diffusion::core::params::DDMParams;

/// Relative margin keeping a sampled start strictly inside `(0, a)`.
const START_MARGIN: f64 = 1e-9;

/// Boundary reached by a resolved trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    /// Lower boundary (evidence ≤ 0), coded 0.
    Lower,
    /// Upper boundary (evidence ≥ a), coded 1.
    Upper,
}

impl Choice {
    /// Numeric code: 0 for lower, 1 for upper.
    pub fn code(self) -> u8 {
        match self {
            Choice::Lower => 0,
            Choice::Upper => 1,
        }
    }

    /// Inverse of [`Choice::code`]; other codes map to `None`.
    pub fn from_code(code: u8) -> Option<Choice> {
        match code {
            0 => Some(Choice::Lower),
            1 => Some(Choice::Upper),
            _ => None,
        }
    }
}

/// How a trial ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialOutcome {
    /// A boundary was crossed; `rt` includes non-decision time.
    Response { choice: Choice, rt: f64 },
    /// No boundary within the step budget.
    Timeout,
}

impl TrialOutcome {
    pub fn choice(&self) -> Option<Choice> {
        match self {
            TrialOutcome::Response { choice, .. } => Some(*choice),
            TrialOutcome::Timeout => None,
        }
    }

    pub fn rt(&self) -> Option<f64> {
        match self {
            TrialOutcome::Response { rt, .. } => Some(*rt),
            TrialOutcome::Timeout => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, TrialOutcome::Timeout)
    }
}

/// Per-trial values drawn from the variability distributions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledParams {
    pub drift: f64,
    pub start: f64,
    pub ter: f64,
}

/// One simulated (or observed) trial.
#[derive(Debug, Clone, PartialEq)]
pub struct Trial {
    /// Position within the experiment.
    pub index: usize,
    pub outcome: TrialOutcome,
    /// Present when sampled parameters were retained (or supplied).
    pub sampled: Option<SampledParams>,
    /// Evidence values `x_0, x_1, …` when paths were retained.
    pub path: Option<Vec<f64>>,
}

impl Trial {
    pub fn choice(&self) -> Option<Choice> {
        self.outcome.choice()
    }

    pub fn rt(&self) -> Option<f64> {
        self.outcome.rt()
    }
}

/// Draw the per-trial drift, start and non-decision time.
pub fn sample_trial_params<R: Rng + ?Sized>(params: &DDMParams, rng: &mut R) -> SampledParams {
    let drift = if params.sv > 0.0 {
        let eps: f64 = rng.sample(StandardNormal);
        params.mean_v + params.sv * eps
    } else {
        params.mean_v
    };

    let start = if params.sz > 0.0 {
        let u: f64 = rng.random();
        let z = params.mean_z - 0.5 * params.sz + params.sz * u;
        z.clamp(params.a * START_MARGIN, params.a * (1.0 - START_MARGIN))
    } else {
        params.mean_z
    };

    let ter = if params.st0 > 0.0 {
        let u: f64 = rng.random();
        (params.mean_ter - 0.5 * params.st0 + params.st0 * u).max(0.0)
    } else {
        params.mean_ter
    };

    SampledParams { drift, start, ter }
}

/// Simulate one trial.
///
/// Parameters
/// ----------
/// - `params`: validated model parameters.
/// - `dt`: step size (> 0).
/// - `max_steps`: step budget; exceeding it yields a timeout.
/// - `record_path`: keep every evidence value (starting point included).
/// - `rng`: caller-owned random source.
///
/// Returns
/// -------
/// A [`Trial`] with `index = 0` and `sampled` always populated; the
/// experiment generator renumbers and strips fields it was not asked to keep.
///
/// Examples
/// --------
/// ```rust
/// # use drift_diffusion::diffusion::core::{params::DDMParams, trial::simulate_trial};
/// # use rand::{SeedableRng, rngs::SmallRng};
/// let params = DDMParams::without_variability(0.0, 1.0, 0.5, 1.0, 0.3).unwrap();
/// let mut rng = SmallRng::seed_from_u64(1);
/// let trial = simulate_trial(&params, 0.001, 100_000, false, &mut rng);
/// assert!(trial.rt().unwrap() > 0.3);
/// ```
pub fn simulate_trial<R: Rng + ?Sized>(
    params: &DDMParams, dt: f64, max_steps: usize, record_path: bool, rng: &mut R,
) -> Trial {
    let sampled = sample_trial_params(params, rng);
    let drift_step = sampled.drift * dt;
    let noise_scale = params.s * dt.sqrt();

    let mut path = if record_path {
        let mut buf = Vec::with_capacity(max_steps.min(4096) + 1);
        buf.push(sampled.start);
        Some(buf)
    } else {
        None
    };

    let mut x = sampled.start;
    let mut outcome = TrialOutcome::Timeout;
    for step in 1..=max_steps {
        let eps: f64 = rng.sample(StandardNormal);
        x += drift_step + noise_scale * eps;
        if let Some(buf) = path.as_mut() {
            buf.push(x);
        }
        let choice = if x >= params.a {
            Some(Choice::Upper)
        } else if x <= 0.0 {
            Some(Choice::Lower)
        } else {
            None
        };
        if let Some(choice) = choice {
            let decision_time = step as f64 * dt;
            outcome = TrialOutcome::Response { choice, rt: decision_time + sampled.ter };
            break;
        }
    }

    Trial { index: 0, outcome, sampled: Some(sampled), path }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::SmallRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Variability sampling (switch-off at zero width, clamping).
    // - Boundary termination, rt composition and timeouts.
    // - Determinism under a seeded RNG.
    //
    // They intentionally DO NOT cover:
    // - Distributional properties over many trials (see the experiment
    //   module and tests/test_properties.rs).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // With all widths at zero the sampled values equal the means.
    fn sample_trial_params_without_variability_returns_means() {
        let params = DDMParams::without_variability(0.2, 1.0, 0.4, 0.3, 0.25).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let sampled = sample_trial_params(&params, &mut rng);
        assert_eq!(sampled, SampledParams { drift: 0.2, start: 0.4, ter: 0.25 });
    }

    #[test]
    // Purpose
    // -------
    // Wide start / ter distributions are clamped into the valid domain.
    //
    // Given
    // -----
    // - `mean_z = 0.05`, `sz = 0.5` (support reaches below 0) and
    //   `mean_ter = 0.01`, `st0 = 0.2` (support reaches below 0).
    //
    // Expect
    // ------
    // - Over many draws, `0 < start < a` and `ter >= 0` always hold.
    fn sample_trial_params_clamps_start_and_ter() {
        let params = DDMParams::new(0.0, 1.0, 0.05, 0.3, 0.01, 0.0, 0.5, 0.2).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..5_000 {
            let s = sample_trial_params(&params, &mut rng);
            assert!(s.start > 0.0 && s.start < params.a, "start = {}", s.start);
            assert!(s.ter >= 0.0, "ter = {}", s.ter);
        }
    }

    #[test]
    // Purpose
    // -------
    // A strong positive drift with no noise-driven reversals ends at the
    // upper boundary, and rt adds the non-decision time.
    //
    // Given
    // -----
    // - `mean_v = 10`, `s = 0.01`, `a = 1`, `mean_z = 0.5`, `ter = 0.2`,
    //   `dt = 0.001`.
    //
    // Expect
    // ------
    // - Choice is upper; decision time ≈ 0.5 / 10 = 0.05 s; rt ≈ 0.25 s.
    fn simulate_trial_strong_drift_hits_upper_boundary() {
        let params = DDMParams::without_variability(10.0, 1.0, 0.5, 0.01, 0.2).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let trial = simulate_trial(&params, 0.001, 10_000, false, &mut rng);
        assert_eq!(trial.choice(), Some(Choice::Upper));
        assert_relative_eq!(trial.rt().unwrap(), 0.25, epsilon = 0.005);
    }

    #[test]
    // Purpose
    // -------
    // A step budget too small to reach either boundary produces a timeout
    // with undefined choice and rt.
    //
    // Given
    // -----
    // - Zero drift, tiny noise, `max_steps = 5`.
    //
    // Expect
    // ------
    // - `TrialOutcome::Timeout`; `choice()` and `rt()` are `None`; the
    //   recorded path holds the start plus 5 steps.
    fn simulate_trial_reports_timeout_when_budget_exhausted() {
        let params = DDMParams::without_variability(0.0, 1.0, 0.5, 0.01, 0.3).unwrap();
        let mut rng = SmallRng::seed_from_u64(8);
        let trial = simulate_trial(&params, 0.001, 5, true, &mut rng);
        assert!(trial.outcome.is_timeout());
        assert_eq!(trial.choice(), None);
        assert_eq!(trial.rt(), None);
        assert_eq!(trial.path.as_ref().map(Vec::len), Some(6));
    }

    #[test]
    // Purpose
    // -------
    // Recorded paths start at the sampled start and end beyond a boundary.
    fn simulate_trial_path_ends_at_boundary() {
        let params = DDMParams::without_variability(0.0, 0.5, 0.25, 1.0, 0.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(21);
        let trial = simulate_trial(&params, 0.001, 100_000, true, &mut rng);
        let path = trial.path.as_ref().unwrap();
        assert_eq!(path[0], 0.25);
        let last = *path.last().unwrap();
        match trial.choice() {
            Some(Choice::Upper) => assert!(last >= 0.5),
            Some(Choice::Lower) => assert!(last <= 0.0),
            None => panic!("trial should resolve with a large budget"),
        }
        assert_relative_eq!(trial.rt().unwrap(), (path.len() - 1) as f64 * 0.001, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // Same seed, same trial.
    fn simulate_trial_is_deterministic_under_seed() {
        let params = DDMParams::new(0.15, 0.8, 0.4, 0.3, 0.12, 0.1, 0.02, 0.03).unwrap();
        let t1 = simulate_trial(&params, 0.001, 10_000, true, &mut SmallRng::seed_from_u64(99));
        let t2 = simulate_trial(&params, 0.001, 10_000, true, &mut SmallRng::seed_from_u64(99));
        assert_eq!(t1, t2);
    }

    #[test]
    fn choice_codes_round_trip() {
        assert_eq!(Choice::from_code(Choice::Upper.code()), Some(Choice::Upper));
        assert_eq!(Choice::from_code(Choice::Lower.code()), Some(Choice::Lower));
        assert_eq!(Choice::from_code(2), None);
    }
}
