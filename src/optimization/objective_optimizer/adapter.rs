//! Adapter that exposes a user [`Objective`] as an `argmin` problem.
//!
//! The cost is the objective itself, so analytic gradients pass through
//! unchanged. Every cost evaluation goes through the run's [`SearchControl`]
//! first (cancellation and budget), and successful evaluations are offered to
//! its best-so-far ledger. Errors handed to argmin are also noted on the
//! control, since argmin may fold them into a normal termination.
use std::cell::RefCell;

use crate::optimization::{
    errors::{OptError, OptResult},
    objective_optimizer::{
        control::SearchControl,
        traits::Objective,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a user [`Objective`] to `argmin`'s `CostFunction` and `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: Objective> {
    pub f: &'a F,
    pub data: &'a F::Data,
    pub control: &'a SearchControl<'a>,
}

impl<'a, F: Objective> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data, control: &'a SearchControl<'a>) -> Self {
        Self { f, data, control }
    }

    /// Evaluate every vertex ahead of the solver and prime the control with
    /// the costs, so a solver that cannot fail during setup replays them.
    ///
    /// # Errors
    /// The first error from [`evaluate`](Self::evaluate); vertices after it
    /// are not evaluated.
    pub fn prime_vertices(&self, vertices: &[Theta]) -> OptResult<()> {
        for vertex in vertices {
            let cost = self.evaluate(vertex)?;
            self.control.prime(vertex, cost);
        }
        Ok(())
    }

    /// One gated evaluation of `c(θ)`: admit, evaluate, check, record.
    ///
    /// # Errors
    /// - `Cancelled` / `EvaluationBudgetExhausted` from the search control.
    /// - Any `OptError` from the user's `value`.
    /// - `NonFiniteCost` if the value is NaN or infinite.
    pub fn evaluate(&self, theta: &Theta) -> OptResult<Cost> {
        self.control.admit()?;
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err(OptError::NonFiniteCost { value: output });
        }
        self.control.record(theta, output);
        Ok(output)
    }

    /// Gradient at `θ`, analytic when available.
    ///
    /// Behavior:
    /// - If the user implements `grad`, validate and return it.
    /// - Otherwise finite-difference the cost: central differences first,
    ///   forward differences if any cost evaluation failed or the result is
    ///   not finite. The FD closure must return `f64`, so the first error is
    ///   captured in `closure_err` and the closure returns `NaN`.
    /// - Interruptions (cancel, budget) raised inside FD are returned at once.
    ///
    /// # Errors
    /// - `Cancelled` if the flag is raised before the gradient is evaluated.
    /// - User errors from `grad` other than `GradientNotImplemented`.
    /// - Errors raised by cost evaluations performed during FD.
    /// - Validation errors for wrong dimension or non-finite entries.
    pub fn differentiate(&self, theta: &Theta) -> OptResult<Grad> {
        self.control.poll_cancel()?;
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.evaluate(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let fd_grad = theta.central_diff(&cost_func);
                let captured = closure_err.take();
                if let Some(err) = captured {
                    if err.is_interruption() {
                        return Err(err);
                    }
                    return run_fd_diff(theta, &cost_func, &closure_err);
                }
                match validate_grad(&fd_grad, dim) {
                    Ok(()) => Ok(fd_grad),
                    Err(_) => run_fd_diff(theta, &cost_func, &closure_err),
                }
            }
            Err(e) => Err(e),
        }
    }

    fn fail(&self, err: OptError) -> Error {
        self.control.note_failure(&err);
        err.into()
    }
}

impl<'a, F: Objective> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// Evaluate `c(θ)`, replaying a primed cost first if one is queued for
    /// exactly this point.
    ///
    /// # Errors
    /// As [`ArgMinAdapter::evaluate`]; the error is also noted on the control.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        if let Some(cost) = self.control.take_primed(theta) {
            return Ok(cost);
        }
        self.evaluate(theta).map_err(|e| self.fail(e))
    }
}

impl<'a, F: Objective> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Evaluate `∇c(θ)`.
    ///
    /// # Errors
    /// As [`ArgMinAdapter::differentiate`]; the error is also noted on the
    /// control.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        self.differentiate(theta).map_err(|e| self.fail(e))
    }
}

/// Forward-difference gradient of `func` at `theta`, with error capture.
///
/// # Errors
/// Any error captured during evaluation of `func`, or a validation error on
/// the resulting gradient.
fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<OptError>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}
