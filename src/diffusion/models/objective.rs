//! Binned likelihood objective — simulate, summarize, score.
//!
//! Purpose
//! -------
//! Score a candidate parameter subset against a target [`RTBinTable`]: merge
//! the candidate into a fixed base parameter set, simulate `n_sim` trials,
//! summarize over the shared bin edges and return the discrepancy between
//! the two tables. This is the forward model the multi-start optimizer
//! drives.
//!
//! Key behaviors
//! -------------
//! - Candidates that break a parameter invariant (e.g. `mean_z >= a` after
//!   the merge) score [`INFEASIBLE_COST`] instead of raising, so the simplex
//!   simply moves away.
//! - Two discrepancies: [`Discrepancy::SumSquares`] (default) and
//!   [`Discrepancy::Deviance`] with an epsilon floor on simulated mass.
//!   Both compare every cell: upper bins, lower bins, the timeout cell and
//!   the out-of-range cell. Cells empty in both tables contribute zero.
//! - Every evaluation draws fresh trials from the supplied seed; the value
//!   is a deterministic function of `(candidate, seed)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The target table was built on the objective's bin edges; mismatches are
//!   configuration errors reported before any simulation.
//! - `candidate[i]` is the value of `names[i]`.
use crate::{
    diffusion::{
        core::{
            bins::{BinEdges, RTBinTable, binned_proportions},
            experiment::simulate_experiment,
            options::SimOpts,
            params::{DDMParams, ParamName, ParamOverrides},
        },
        errors::{DDMError, DDMResult},
    },
    optimization::{
        errors::OptResult,
        simplex_optimizer::{Cost, StochasticObjective},
    },
};

/// Cost returned for candidates outside the valid parameter domain.
///
/// Finite so the simplex can compare it; far above any attainable
/// discrepancy (sum of squares ≤ 2, floored deviance ≤ 2·ln(1/ε)).
pub const INFEASIBLE_COST: f64 = 1e6;

/// Default floor for simulated mass in the deviance.
pub const DEFAULT_DEVIANCE_EPSILON: f64 = 1e-5;

/// Discrepancy between a target and a simulated table.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Discrepancy {
    /// `Σ (target − simulated)²` over all cells.
    #[default]
    SumSquares,
    /// `2 Σ_{target > 0} target · ln(target / max(simulated, epsilon))`,
    /// the per-trial multinomial deviance.
    Deviance { epsilon: f64 },
}

impl Discrepancy {
    pub fn deviance() -> Self {
        Discrepancy::Deviance { epsilon: DEFAULT_DEVIANCE_EPSILON }
    }

    pub fn validate(&self) -> DDMResult<()> {
        if let Discrepancy::Deviance { epsilon } = *self {
            if !epsilon.is_finite() || epsilon <= 0.0 {
                return Err(DDMError::InvalidEpsilon { value: epsilon });
            }
        }
        Ok(())
    }

    /// Score `simulated` against `target`. Both tables must share edges.
    pub fn score(&self, target: &RTBinTable, simulated: &RTBinTable) -> f64 {
        let cells = table_cells(target).zip(table_cells(simulated));
        match *self {
            Discrepancy::SumSquares => cells.map(|(t, s)| (t - s).powi(2)).sum(),
            Discrepancy::Deviance { epsilon } => {
                2.0 * cells
                    .filter(|&(t, _)| t > 0.0)
                    .map(|(t, s)| t * (t / s.max(epsilon)).ln())
                    .sum::<f64>()
            }
        }
    }
}

/// Every cell of a table in a fixed order: upper bins, lower bins, timeout,
/// out-of-range.
fn table_cells(table: &RTBinTable) -> impl Iterator<Item = f64> + '_ {
    table
        .upper
        .iter()
        .copied()
        .chain(table.lower.iter().copied())
        .chain([table.timeout_fraction, table.out_of_range_fraction])
}

/// BinnedObjective — simulation-based discrepancy over a parameter subset.
///
/// Fields
/// ------
/// - `names`: free parameters, in candidate order.
/// - `base`: values for every parameter not being fitted.
/// - `bin_edges`: edges shared with the target table.
/// - `n_sim`: simulated trials per evaluation.
/// - `sim`: step size / step budget / parallelism (its seed is replaced per
///   evaluation).
/// - `discrepancy`: scoring rule.
#[derive(Debug, Clone, PartialEq)]
pub struct BinnedObjective {
    names: Vec<ParamName>,
    base: DDMParams,
    bin_edges: BinEdges,
    n_sim: usize,
    sim: SimOpts,
    discrepancy: Discrepancy,
}

impl BinnedObjective {
    /// Errors
    /// ------
    /// - [`DDMError::EmptyParameterSpace`] / [`DDMError::DuplicateParameter`]
    ///   for a bad name list.
    /// - [`DDMError::InvalidSimCount`] for `n_sim == 0`.
    /// - [`DDMError::Param`] for an invalid base.
    /// - Step-size, step-budget and epsilon errors.
    pub fn new(
        names: Vec<ParamName>, base: DDMParams, bin_edges: BinEdges, n_sim: usize, sim: SimOpts,
        discrepancy: Discrepancy,
    ) -> DDMResult<Self> {
        if names.is_empty() {
            return Err(DDMError::EmptyParameterSpace);
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(DDMError::DuplicateParameter { name: name.as_str() });
            }
        }
        if n_sim == 0 {
            return Err(DDMError::InvalidSimCount { n_sim });
        }
        base.validate()?;
        sim.validate()?;
        discrepancy.validate()?;
        Ok(Self { names, base, bin_edges, n_sim, sim, discrepancy })
    }

    pub fn names(&self) -> &[ParamName] {
        &self.names
    }

    pub fn bin_edges(&self) -> &BinEdges {
        &self.bin_edges
    }

    /// Merge a candidate into the base. `Err` means the merged set violates
    /// an invariant.
    pub fn candidate_params(&self, candidate: &[f64]) -> DDMResult<DDMParams> {
        let overrides = ParamOverrides::from_pairs(&self.names, candidate)?;
        Ok(overrides.apply(&self.base)?)
    }

    /// Fail unless `target` uses these edges and has one cell per bin.
    pub fn ensure_target(&self, target: &RTBinTable) -> DDMResult<()> {
        self.bin_edges.ensure_same(&target.edges)?;
        target.ensure_shape()
    }

    /// Discrepancy between `target` and a table simulated at `candidate`.
    ///
    /// Errors
    /// ------
    /// - [`DDMError::CandidateLengthMismatch`] for a wrongly sized candidate.
    /// - [`DDMError::BinEdgeMismatch`] / [`DDMError::BinEdgeValueMismatch`]
    ///   when `target` uses other edges.
    /// - [`DDMError::BinTableShapeMismatch`] when `target` has the wrong
    ///   number of cells.
    ///
    /// Infeasible candidates are not errors; they return
    /// [`INFEASIBLE_COST`].
    pub fn evaluate(&self, candidate: &[f64], target: &RTBinTable, seed: u64) -> DDMResult<f64> {
        if candidate.len() != self.names.len() {
            return Err(DDMError::CandidateLengthMismatch {
                expected: self.names.len(),
                actual: candidate.len(),
            });
        }
        self.ensure_target(target)?;
        let params = match self.candidate_params(candidate) {
            Ok(params) => params,
            Err(DDMError::Param(_)) => return Ok(INFEASIBLE_COST),
            Err(other) => return Err(other),
        };
        let opts = self.sim.clone().with_seed(Some(seed));
        let data = simulate_experiment(&params, self.n_sim, &opts)?;
        let simulated = binned_proportions(&data, &self.bin_edges)?;
        Ok(self.discrepancy.score(target, &simulated))
    }
}

impl StochasticObjective for BinnedObjective {
    type Data = RTBinTable;

    fn value(&self, theta: &[f64], data: &RTBinTable, seed: u64) -> OptResult<Cost> {
        Ok(self.evaluate(theta, data, seed)?)
    }

    /// Candidate length and target compatibility; feasibility is left to
    /// `value`.
    fn check(&self, theta: &[f64], data: &RTBinTable) -> OptResult<()> {
        if theta.len() != self.names.len() {
            return Err(DDMError::CandidateLengthMismatch {
                expected: self.names.len(),
                actual: theta.len(),
            }
            .into());
        }
        Ok(self.ensure_target(data)?)
    }
}
