//! simplex_optimizer::builders — Nelder–Mead solver construction helpers.
//!
//! Purpose
//! -------
//! Build the initial simplex around a starting point and wrap it in a
//! configured argmin [`NelderMead`](argmin::solver::neldermead::NelderMead)
//! solver, so callers never touch argmin generics.
//!
//! Conventions
//! -----------
//! - The simplex lives in unconstrained space: vertex 0 is the start, vertex
//!   `i + 1` moves coordinate `i` by `step` towards zero (the box centre).
//!   This gives `n + 1` affinely independent vertices for `n` parameters.
//! - Builders do not set `max_iters`; the runner applies it.
use crate::optimization::{
    errors::OptResult,
    simplex_optimizer::{
        traits::NMOptions,
        types::{SimplexSolver, Theta},
    },
};

/// Axis-aligned initial simplex with `z0.len() + 1` vertices. Positive
/// coordinates step down, the rest step up.
pub fn build_simplex(z0: &[f64], step: f64) -> Vec<Theta> {
    let mut vertices = Vec::with_capacity(z0.len() + 1);
    vertices.push(z0.to_vec());
    for i in 0..z0.len() {
        let mut v = z0.to_vec();
        v[i] += if z0[i] > 0.0 { -step } else { step };
        vertices.push(v);
    }
    vertices
}

/// build_nelder_mead — construct a Nelder–Mead solver around `z0`.
///
/// Parameters
/// ----------
/// - `z0`: starting point in unconstrained space.
/// - `opts`: consults `simplex_step` and `tols.sd_tolerance`.
///
/// Errors
/// ------
/// - `OptError` (via `From<argmin::core::Error>`) when argmin rejects the
///   tolerance.
pub fn build_nelder_mead(z0: &[f64], opts: &NMOptions) -> OptResult<SimplexSolver> {
    let solver = SimplexSolver::new(build_simplex(z0, opts.simplex_step));
    match opts.tols.sd_tolerance {
        Some(tol) => Ok(solver.with_sd_tolerance(tol)?),
        None => Ok(solver),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::simplex_optimizer::traits::{EvalSeeding, Tolerances};

    #[test]
    // Purpose
    // -------
    // The simplex has n + 1 vertices, each offset along one axis towards
    // the box centre.
    fn build_simplex_offsets_one_axis_per_vertex() {
        let s = build_simplex(&[0.0, 1.0], 0.5);
        assert_eq!(s, vec![vec![0.0, 1.0], vec![0.5, 1.0], vec![0.0, 0.5]]);
        let s = build_simplex(&[-4.5], 1.0);
        assert_eq!(s, vec![vec![-4.5], vec![-3.5]]);
    }

    #[test]
    fn build_nelder_mead_accepts_valid_options() {
        let tols = Tolerances::new(Some(1e-8), Some(10)).unwrap();
        let opts = NMOptions::new(tols, 0.3, EvalSeeding::Common, false).unwrap();
        assert!(build_nelder_mead(&[0.0, 0.0], &opts).is_ok());
        let no_sd = NMOptions { tols: Tolerances::new(None, Some(5)).unwrap(), ..opts };
        assert!(build_nelder_mead(&[0.0], &no_sd).is_ok());
    }
}
