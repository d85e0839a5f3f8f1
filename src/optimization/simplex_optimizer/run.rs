//! Execution helper that runs the Nelder–Mead solver on a bounded problem and
//! returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    simplex_optimizer::{
        NMOptions, OptimOutcome, StochasticObjective, adapter::BoundedAdapter,
        types::SimplexSolver,
    },
};
use argmin::core::{Executor, State};

/// Run Nelder–Mead on a [`BoundedAdapter`].
///
/// Wires the adapter and solver into an argmin `Executor`, applies
/// `max_iter`, optionally attaches the slog observer, and converts the final
/// state into an [`OptimOutcome`] whose `theta_hat` is mapped back into the
/// box.
///
/// # Feature flags
/// With `obs_slog` enabled and `opts.verbose == true`, a terminal slog
/// observer is attached with `ObserverMode::Always`.
///
/// # Errors
/// - Propagates any argmin runtime error (including errors raised by the
///   objective) through `From<argmin::core::Error>`.
/// - Propagates outcome validation errors.
pub fn run_nelder_mead<F>(
    opts: &NMOptions, problem: BoundedAdapter<'_, F>, solver: SimplexSolver,
) -> OptResult<OptimOutcome>
where
    F: StochasticObjective,
{
    let transform = problem.transform;
    let mut optimizer = Executor::new(problem, solver);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let theta_hat = result.take_best_param().map(|z| transform.to_bounded(&z));
    OptimOutcome::new(theta_hat, result.get_best_cost(), &termination, iterations, function_counts)
}
