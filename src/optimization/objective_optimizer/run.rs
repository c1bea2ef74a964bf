//! Execution helper that runs an `argmin` solver on an objective problem and
//! returns a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    objective_optimizer::{
        adapter::ArgMinAdapter,
        traits::{MinimizeOptions, Objective, OptimOutcome},
        types::{Cost, Theta},
    },
};
use argmin::core::{Executor, IterState, Solver, State, observers::ObserverMode};
#[cfg(feature = "obs_slog")]
use crate::optimization::errors::OptError;
#[cfg(feature = "obs_slog")]
use argmin_math::ArgminL2Norm;

/// Run an `argmin` solver on an [`ArgMinAdapter`] problem.
///
/// Shared by every method. It wires up:
/// - the initial parameter `theta0`,
/// - `max_iters` and the target cost from `opts`,
/// - the iteration counter of the run's search control,
/// - the slog observer (behind `obs_slog`, when `opts.verbose`),
///
/// then executes the solver and converts the final state into an
/// [`OptimOutcome`].
///
/// # Type Parameters
/// - `F`: the user objective.
/// - `S`: any solver over `IterState<Theta, G, (), (), (), Cost>`.
/// - `G`: the gradient slot of that state; `Grad` for L-BFGS, `()` for
///   Nelder–Mead.
///
/// # Arguments
/// - `grad_norm`: maps the final gradient, if the state holds one, to its
///   norm for the outcome.
///
/// # Errors
/// - Any `argmin` runtime error, including interruptions raised by the search
///   control, via `From<argmin::core::Error>`.
/// - Validation errors when building the [`OptimOutcome`].
pub fn run_solver<'a, F, S, G>(
    theta0: Theta, opts: &MinimizeOptions, problem: ArgMinAdapter<'a, F>, solver: S,
    grad_norm: impl Fn(&G) -> f64,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, G, (), (), (), Cost>>,
    IterState<Theta, G, (), (), (), Cost>: State<Param = Theta, Float = Cost>,
{
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        log_initial_state(&theta0, &problem);
    }
    let control = problem.control;
    let counter = control.iteration_counter();

    let mut optimizer = Executor::new(problem, solver)
        .configure(|state| state.param(theta0))
        .add_observer(counter, ObserverMode::Always);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }
    if let Some(target) = opts.target_cost {
        optimizer = optimizer.configure(|state| state.target_cost(target));
    }

    let result = optimizer.run()?;
    let state = result.state();
    OptimOutcome::new(
        state.get_best_param().cloned(),
        state.get_best_cost(),
        state.get_termination_status().clone(),
        state.get_iter(),
        state.get_func_counts().clone(),
        state.get_gradient().map(grad_norm),
        control.evaluations(),
    )
}

// ---- Helper Methods ----

/// Print `c(θ₀)` and, when available, `‖∇c(θ₀)‖`.
///
/// Calls the objective directly so the log line neither charges the budget
/// nor enters the best-so-far ledger.
#[cfg(feature = "obs_slog")]
fn log_initial_state<F: Objective>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) {
    let c0 = match problem.f.value(theta0, problem.data) {
        Ok(c0) => c0,
        Err(e) => {
            eprintln!("init: c(theta0) failed: {e}");
            return;
        }
    };
    let g0n = match problem.f.grad(theta0, problem.data) {
        Ok(g) => format!(", ||grad|| = {:.6}", g.l2_norm()),
        Err(OptError::GradientNotImplemented) => String::new(),
        Err(e) => format!(", grad failed: {e}"),
    };
    eprintln!("init: c(theta0) = {c0:.6}{g0n}");
}
