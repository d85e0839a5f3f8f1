//! Binned summarizer — per-choice reaction-time histograms.
//!
//! Purpose
//! -------
//! Reduce an [`ExperimentData`] to an [`RTBinTable`]: for each choice, the
//! fraction of *all* trials whose rt falls in each bin of a shared
//! [`BinEdges`] sequence. Two tables over the same edges can then be scored
//! against each other by the objective.
//!
//! Key behaviors
//! -------------
//! - Bins are half-open `[e_i, e_{i+1})`; the last bin is closed on the right
//!   so the largest edge is counted.
//! - The denominator is the total trial count, timeouts included. Responses
//!   outside `[e_0, e_last]` are tracked as `out_of_range_fraction`, so
//!   `Σ upper + Σ lower + timeout_fraction + out_of_range_fraction = 1`.
//! - Summarizing is a pure counting pass: deterministic, idempotent and
//!   independent of trial order.
//!
//! Invariants & assumptions
//! ------------------------
//! - Edges are finite, strictly increasing, at least two of them.
//! - Tables are comparable only when their edges are identical
//!   ([`RTBinTable::ensure_compatible`]).
use ndarray::Array1;
use statrs::statistics::{Data, OrderStatistics};

use crate::diffusion::{
    core::{
        experiment::ExperimentData,
        trial::{Choice, TrialOutcome},
        validation::validate_bin_edges,
    },
    errors::{DDMError, DDMResult},
};

/// BinEdges — validated, strictly increasing rt bin boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    /// Errors
    /// ------
    /// - [`DDMError::TooFewBinEdges`] for fewer than two edges.
    /// - [`DDMError::InvalidBinEdge`] for non-finite or non-increasing edges.
    pub fn new(edges: Vec<f64>) -> DDMResult<Self> {
        validate_bin_edges(&edges)?;
        Ok(BinEdges { edges })
    }

    /// `n_bins` equal-width bins spanning `[lower, upper]`.
    pub fn uniform(lower: f64, upper: f64, n_bins: usize) -> DDMResult<Self> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper || n_bins == 0 {
            return Err(DDMError::InvalidUniformBins { lower, upper, n_bins });
        }
        let width = (upper - lower) / n_bins as f64;
        let mut edges: Vec<f64> = (0..n_bins).map(|i| lower + i as f64 * width).collect();
        edges.push(upper);
        BinEdges::new(edges)
    }

    /// Edges at the empirical rt quantiles of `data`.
    ///
    /// The outer edges are the smallest and largest valid rts; the inner
    /// edges are the quantiles at `probs` (statrs order statistics). Ties
    /// that collapse two edges surface as [`DDMError::InvalidBinEdge`].
    ///
    /// Errors
    /// ------
    /// - [`DDMError::InvalidQuantile`] when a probability is outside `(0, 1)`
    ///   or the sequence is not strictly increasing.
    /// - [`DDMError::NoValidResponses`] when every trial timed out.
    pub fn from_quantiles(data: &ExperimentData, probs: &[f64]) -> DDMResult<Self> {
        let mut prev = 0.0;
        for (index, &prob) in probs.iter().enumerate() {
            if !prob.is_finite() || prob <= prev || prob >= 1.0 {
                return Err(DDMError::InvalidQuantile { index, prob });
            }
            prev = prob;
        }

        let rts = data.valid_rts();
        if rts.is_empty() {
            return Err(DDMError::NoValidResponses);
        }
        let min = rts.iter().copied().fold(f64::INFINITY, f64::min);
        let max = rts.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut sample = Data::new(rts);
        let mut edges = Vec::with_capacity(probs.len() + 2);
        edges.push(min);
        edges.extend(probs.iter().map(|&p| sample.quantile(p)));
        edges.push(max);
        BinEdges::new(edges)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Bin index containing `rt`, or `None` outside `[e_0, e_last]`.
    pub fn locate(&self, rt: f64) -> Option<usize> {
        let first = self.edges[0];
        let last = self.edges[self.edges.len() - 1];
        if !(first..=last).contains(&rt) {
            return None;
        }
        if rt == last {
            return Some(self.n_bins() - 1);
        }
        // edges[0] <= rt, so the partition point is at least 1.
        Some(self.edges.partition_point(|&e| e <= rt) - 1)
    }

    /// Fail unless `other` has exactly the same edges.
    pub fn ensure_same(&self, other: &BinEdges) -> DDMResult<()> {
        if self.edges.len() != other.edges.len() {
            return Err(DDMError::BinEdgeMismatch {
                expected: self.edges.len(),
                found: other.edges.len(),
            });
        }
        for (index, (&expected, &found)) in self.edges.iter().zip(&other.edges).enumerate() {
            if expected != found {
                return Err(DDMError::BinEdgeValueMismatch { index, expected, found });
            }
        }
        Ok(())
    }
}

/// One row of the long-format table view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinRow {
    pub bin_start: f64,
    pub choice: Choice,
    pub proportion: f64,
}

/// RTBinTable — per-choice binned rt proportions.
///
/// Fields
/// ------
/// - `edges`: shared bin edges.
/// - `upper`, `lower`: proportion of all trials per bin, length `n_bins`.
/// - `timeout_fraction`: share of trials without a response.
/// - `out_of_range_fraction`: share of responses outside the edge span.
/// - `n_trials`: denominator.
#[derive(Debug, Clone, PartialEq)]
pub struct RTBinTable {
    pub edges: BinEdges,
    pub upper: Array1<f64>,
    pub lower: Array1<f64>,
    pub timeout_fraction: f64,
    pub out_of_range_fraction: f64,
    pub n_trials: usize,
}

impl RTBinTable {
    pub fn proportions(&self, choice: Choice) -> &Array1<f64> {
        match choice {
            Choice::Upper => &self.upper,
            Choice::Lower => &self.lower,
        }
    }

    /// Rows ordered by bin, upper before lower within a bin.
    pub fn rows(&self) -> Vec<BinRow> {
        let starts = &self.edges.as_slice()[..self.edges.n_bins()];
        starts
            .iter()
            .enumerate()
            .flat_map(|(i, &bin_start)| {
                [
                    BinRow { bin_start, choice: Choice::Upper, proportion: self.upper[i] },
                    BinRow { bin_start, choice: Choice::Lower, proportion: self.lower[i] },
                ]
            })
            .collect()
    }

    /// Total accounted mass; equals 1 up to rounding.
    pub fn total_mass(&self) -> f64 {
        self.upper.sum() + self.lower.sum() + self.timeout_fraction + self.out_of_range_fraction
    }

    pub fn ensure_compatible(&self, other: &RTBinTable) -> DDMResult<()> {
        self.edges.ensure_same(&other.edges)
    }

    /// Fail unless both proportion arrays hold one cell per bin.
    pub fn ensure_shape(&self) -> DDMResult<()> {
        let expected = self.edges.n_bins();
        for (choice, cells) in [("upper", &self.upper), ("lower", &self.lower)] {
            if cells.len() != expected {
                return Err(DDMError::BinTableShapeMismatch { choice, expected, found: cells.len() });
            }
        }
        Ok(())
    }
}

/// Summarize `data` over `edges`.
///
/// Errors
/// ------
/// - [`DDMError::EmptyExperiment`] for a dataset without trials.
///
/// Examples
/// --------
/// ```rust
/// # use drift_diffusion::diffusion::core::{
/// #     bins::{BinEdges, binned_proportions}, experiment::ExperimentData, trial::Choice,
/// # };
/// let data = ExperimentData::from_observations(
///     &[Some(Choice::Upper), Some(Choice::Lower), None, Some(Choice::Upper)],
///     &[Some(0.3), Some(0.6), None, Some(0.9)],
/// )
/// .unwrap();
/// let edges = BinEdges::new(vec![0.0, 0.5, 1.0]).unwrap();
/// let table = binned_proportions(&data, &edges).unwrap();
/// assert_eq!(table.upper.to_vec(), vec![0.25, 0.25]);
/// assert_eq!(table.lower.to_vec(), vec![0.0, 0.25]);
/// assert_eq!(table.timeout_fraction, 0.25);
/// ```
pub fn binned_proportions(data: &ExperimentData, edges: &BinEdges) -> DDMResult<RTBinTable> {
    if data.is_empty() {
        return Err(DDMError::EmptyExperiment);
    }
    let n_bins = edges.n_bins();
    let mut upper = Array1::<f64>::zeros(n_bins);
    let mut lower = Array1::<f64>::zeros(n_bins);
    let mut timeouts = 0usize;
    let mut out_of_range = 0usize;

    for trial in &data.trials {
        match trial.outcome {
            TrialOutcome::Timeout => timeouts += 1,
            TrialOutcome::Response { choice, rt } => match edges.locate(rt) {
                Some(bin) => match choice {
                    Choice::Upper => upper[bin] += 1.0,
                    Choice::Lower => lower[bin] += 1.0,
                },
                None => out_of_range += 1,
            },
        }
    }

    let n = data.len() as f64;
    upper /= n;
    lower /= n;
    Ok(RTBinTable {
        edges: edges.clone(),
        upper,
        lower,
        timeout_fraction: timeouts as f64 / n,
        out_of_range_fraction: out_of_range as f64 / n,
        n_trials: data.len(),
    })
}
