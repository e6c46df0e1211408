//! Execution helper that runs an `argmin` solver on an [`Objective`] and
//! returns a crate-friendly [`FitOutcome`].
use crate::{
    errors::FitResult,
    optimize::{
        adapter::ArgminProblem,
        traits::{FitOptions, FitOutcome, Objective},
    },
    types::{Grad, Theta},
};
#[cfg(feature = "obs_slog")]
use argmin::core::{CostFunction, Gradient};
use argmin::core::{Executor, State};
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run an `argmin` solver on an adapted objective.
///
/// This is the shared runner used by both line-search variants. It wires
/// the adapted problem, the solver, the initial parameters, an optional
/// observer (behind the `obs_slog` feature when `opts.verbose` is set),
/// and the iteration cap, then executes and converts the result into a
/// [`FitOutcome`].
///
/// `theta0` is consumed and set on the solver state.
///
/// # Errors
/// - Propagates any `argmin` runtime error through the crate's
///   `From<argmin::core::Error>` conversion.
/// - Propagates validation errors from constructing the [`FitOutcome`].
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &FitOptions, problem: ArgminProblem<'a, F>, solver: S,
) -> FitResult<FitOutcome>
where
    F: Objective,
    S: argmin::core::Solver<
            ArgminProblem<'a, F>,
            argmin::core::IterState<Theta, Grad, (), (), (), f64>,
        > + Send
        + 'static,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem)?;
    }
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
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
    let grad = result.take_gradient();
    FitOutcome::new(
        result.take_best_param(),
        result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

// ---- Helper Methods ----

#[cfg(feature = "obs_slog")]
fn log_initial_state<F>(theta0: &Theta, problem: &ArgminProblem<'_, F>) -> FitResult<()>
where
    F: Objective,
{
    let l0 = problem.cost(theta0)?;
    let g0n = problem.gradient(theta0).ok().map(|g| g.l2_norm());

    eprintln!(
        "init: loss(theta0) = {:.6}{}",
        l0,
        g0n.map(|n| format!(", ||grad|| = {:.6}", n)).unwrap_or_default()
    );
    Ok(())
}
