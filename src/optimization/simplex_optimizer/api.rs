//! High-level entry point for box-constrained minimization of a
//! `StochasticObjective`.
use crate::optimization::{
    errors::OptResult,
    numerical_stability::{BoxTransform, START_MARGIN},
    simplex_optimizer::{
        OptimOutcome,
        adapter::BoundedAdapter,
        builders::build_nelder_mead,
        run::run_nelder_mead,
        traits::{NMOptions, StochasticObjective},
        validation::{validate_bounds, validate_start},
    },
};

/// Minimize `c(θ)` over the box `[lower, upper]` with Nelder–Mead.
///
/// # Behavior
/// - Validates options, the start, the box, and `f.check(theta0, data)`.
/// - Clamps `theta0` into the box shrunk by [`START_MARGIN`] of its width
///   and maps it to unconstrained space.
/// - Builds the initial simplex there (`opts.simplex_step`, towards the box
///   centre) and runs
///   Nelder–Mead through a [`BoundedAdapter`], which maps every iterate back
///   into the box before calling `f.value`.
/// - `seed` is the run seed handed to the adapter's seeding policy.
///
/// # Errors
/// - Configuration errors (options, start, bounds) and errors from
///   `f.check`, before any evaluation.
/// - Runtime errors from the objective or the solver.
///
/// # Example
/// ```rust
/// use drift_diffusion::optimization::{
///     errors::OptResult,
///     simplex_optimizer::{NMOptions, StochasticObjective, minimize_bounded},
/// };
///
/// struct Bowl;
/// impl StochasticObjective for Bowl {
///     type Data = ();
///     fn value(&self, theta: &[f64], _: &(), _seed: u64) -> OptResult<f64> {
///         Ok(theta.iter().map(|t| (t - 0.3).powi(2)).sum())
///     }
///     fn check(&self, _: &[f64], _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = minimize_bounded(&Bowl, &[0.0, 0.0], &(), &[-1.0, -1.0], &[1.0, 1.0],
///     &NMOptions::default(), 0)?;
/// assert!((out.theta_hat[0] - 0.3).abs() < 1e-2);
/// # Ok::<(), drift_diffusion::optimization::errors::OptError>(())
/// ```
pub fn minimize_bounded<F: StochasticObjective>(
    f: &F, theta0: &[f64], data: &F::Data, lower: &[f64], upper: &[f64], opts: &NMOptions,
    seed: u64,
) -> OptResult<OptimOutcome> {
    opts.validate()?;
    validate_start(theta0)?;
    validate_bounds(theta0.len(), lower, upper)?;
    f.check(theta0, data)?;

    let transform = BoxTransform::new(lower.to_vec(), upper.to_vec());
    let z0 = transform.to_unbounded(&transform.pull_inside(theta0, START_MARGIN));

    let solver = build_nelder_mead(&z0, opts)?;
    let problem = BoundedAdapter::new(f, data, &transform, opts.eval_seeding, seed);
    run_nelder_mead(opts, problem, solver)
}
