//! High-level entry point for minimizing a user-provided [`Objective`].
//!
//! This selects a solver from [`Method`], wraps the objective in an
//! [`ArgMinAdapter`] bound to a fresh [`SearchControl`], and delegates the run
//! to [`run_solver`]. Runs stopped by the evaluation budget, by cancellation,
//! or by a line search that can no longer make progress are turned into
//! best-so-far outcomes.
//!
//! argmin's Nelder–Mead cannot report errors while it sets up its simplex,
//! so the starting vertices are evaluated here first and replayed to it.
use std::sync::atomic::AtomicBool;

use crate::optimization::{
    errors::{OptError, OptResult},
    objective_optimizer::{
        adapter::ArgMinAdapter,
        builders::{
            build_optimizer_hager_zhang, build_optimizer_more_thuente, build_optimizer_nelder_mead,
            initial_simplex,
        },
        control::SearchControl,
        run::run_solver,
        traits::{Method, MinimizeOptions, Objective, OptimOutcome},
        types::{Grad, Theta},
        validation::validate_theta0,
    },
};
use argmin_math::ArgminL2Norm;

/// Minimize `c(θ)` starting from `theta0`.
///
/// # Behavior
/// - Rejects a non-finite `theta0`, then validates it via `f.check`.
/// - Builds the solver selected by `opts.method`.
/// - Polls `cancel` (if given) before every objective and gradient
///   evaluation and enforces `opts.max_evals`.
/// - For Nelder–Mead, evaluates the `n + 1` starting vertices before the
///   solver starts; they count toward the budget once.
/// - An error raised by the objective or the search control takes precedence
///   over the termination argmin reports, since L-BFGS folds line-search
///   errors into a solver exit.
/// - On budget exhaustion, cancellation, or a stalled line search, returns
///   the best evaluated point with `converged = false` and a status of
///   `"EvaluationBudgetExhausted"`, `"Cancelled"` or `"LineSearchStalled"`.
///
/// # Errors
/// - `InvalidThetaInput` for a non-finite start, and any error from `f.check`.
/// - Builder errors for tolerances argmin rejects.
/// - Errors from the objective itself (never swallowed).
/// - `Cancelled` / `EvaluationBudgetExhausted` if the run was stopped before
///   a single evaluation succeeded.
///
/// # Example
/// ```
/// use ndarray::array;
/// use skymap_harmonics::optimization::errors::OptResult;
/// use skymap_harmonics::optimization::objective_optimizer::{
///     minimize, MinimizeOptions, Objective, Theta,
/// };
///
/// struct Shifted;
/// impl Objective for Shifted {
///     type Data = f64;
///     fn value(&self, theta: &Theta, shift: &f64) -> OptResult<f64> {
///         Ok(theta.mapv(|t| (t - shift).powi(2)).sum())
///     }
///     fn check(&self, _: &Theta, _: &f64) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = minimize(&Shifted, array![0.0, 0.0], &2.0, &MinimizeOptions::default(), None)?;
/// assert!((out.theta_hat[0] - 2.0).abs() < 1e-4);
/// # Ok::<(), skymap_harmonics::optimization::errors::OptError>(())
/// ```
pub fn minimize<F: Objective>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MinimizeOptions, cancel: Option<&AtomicBool>,
) -> OptResult<OptimOutcome> {
    validate_theta0(&theta0)?;
    f.check(&theta0, data)?;
    let control = SearchControl::new(opts.max_evals, cancel);
    let problem = ArgMinAdapter::new(f, data, &control);
    let run = match opts.method {
        Method::LbfgsMoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_solver(theta0, opts, problem, solver, |g: &Grad| g.l2_norm())
        }
        Method::LbfgsHagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_solver(theta0, opts, problem, solver, |g: &Grad| g.l2_norm())
        }
        Method::NelderMead => {
            let vertices = initial_simplex(&theta0, opts.simplex_step);
            let solver = build_optimizer_nelder_mead(vertices.clone(), opts)?;
            problem
                .prime_vertices(&vertices)
                .and_then(|()| run_solver(theta0, opts, problem, solver, |_: &()| 0.0))
        }
    };
    settle(&control, run)
}

/// Resolve a finished run against the failure noted on `control`: the noted
/// error wins, interruptions and stalls become best-so-far outcomes, and
/// everything else is returned unchanged.
fn settle(control: &SearchControl<'_>, run: OptResult<OptimOutcome>) -> OptResult<OptimOutcome> {
    let run = match control.take_failure() {
        Some(err) => Err(err),
        None => run,
    };
    match run {
        Err(err) if err.is_interruption() || err.is_stall() => recover_best(control, err),
        other => other,
    }
}

/// Turn an interrupted run into an outcome from the control's ledger, or
/// return the interruption if nothing was evaluated.
fn recover_best(control: &SearchControl<'_>, err: OptError) -> OptResult<OptimOutcome> {
    match control.take_best() {
        Some((theta, cost)) => OptimOutcome::interrupted(
            theta,
            cost,
            &err,
            control.iterations(),
            control.evaluations(),
        ),
        None => Err(err),
    }
}
