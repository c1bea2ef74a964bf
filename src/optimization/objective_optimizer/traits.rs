//! Public API surface for objective minimization.
//!
//! - [`Objective`]: trait users implement for the function being minimized.
//! - [`MinimizeOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`Method`]: choice of minimizer (L-BFGS with a line search, or the
//!   derivative-free Nelder–Mead simplex).
//! - [`OptimOutcome`]: normalized result returned by [`minimize`](super::minimize).
//!
//! Convention: the optimizer **minimizes** `c(θ)` exactly as returned by
//! [`Objective::value`]. An analytic gradient, if provided, is `∇c(θ)`.
use crate::optimization::{
    errors::{OptError, OptResult},
    objective_optimizer::{
        types::{Cost, DEFAULT_MAX_EVALS, DEFAULT_SIMPLEX_STEP, FnEvalMap, Grad, Theta},
        validation::{
            validate_theta_hat, validate_value, verify_max_evals, verify_simplex_step,
            verify_target_cost, verify_tol_cost, verify_tol_grad,
        },
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use std::str::FromStr;

/// User-implemented objective `c(θ)`.
///
/// - `type Data`: payload carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `c(θ)`.
/// - `check(&Theta, &Data) -> OptResult<()>`: reject an invalid starting
///   point/data pair. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic gradient `∇c(θ)`.
///   If not implemented, finite differences are used automatically.
pub trait Objective {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Minimization algorithm.
///
/// Variants:
/// - `LbfgsMoreThuente`: L-BFGS with More–Thuente line search.
/// - `LbfgsHagerZhang`: L-BFGS with Hager–Zhang line search.
/// - `NelderMead`: derivative-free downhill simplex.
///
/// Parsing is case-insensitive: `"MoreThuente"`, `"HagerZhang"`,
/// `"NelderMead"` (alias `"simplex"`). Unknown names return
/// `OptError::InvalidMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    LbfgsMoreThuente,
    LbfgsHagerZhang,
    NelderMead,
}

impl FromStr for Method {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" | "lbfgs" => Ok(Method::LbfgsMoreThuente),
            "hagerzhang" => Ok(Method::LbfgsHagerZhang),
            "neldermead" | "simplex" => Ok(Method::NelderMead),
            _ => Err(OptError::InvalidMethod {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente', 'HagerZhang' or \
                         'NelderMead'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols`: gradient/cost tolerances and the iteration cap.
/// - `method`: minimizer to run.
/// - `verbose`: attach the slog observer (behind the `obs_slog` feature).
/// - `lbfgs_mem`: L-BFGS history size, `None` for the default of 7.
/// - `max_evals`: cap on objective evaluations, `None` for unlimited.
/// - `simplex_step`: edge length of the initial Nelder–Mead simplex.
/// - `target_cost`: stop as soon as the cost falls to this value.
///
/// Default:
/// - `tols`: `tol_grad = 1e-8`, `tol_cost = 1e-12`, `max_iter = 1000`
/// - `method`: `LbfgsMoreThuente`
/// - `max_evals`: `100_000`
/// - `simplex_step`: `1.0`
/// - everything else off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeOptions {
    pub tols: Tolerances,
    pub method: Method,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
    pub max_evals: Option<u64>,
    pub simplex_step: f64,
    pub target_cost: Option<f64>,
}

impl MinimizeOptions {
    /// Create validated optimizer options. Tolerances are validated by
    /// [`Tolerances::new`].
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    /// - [`OptError::InvalidMaxEvals`] if `max_evals == Some(0)`.
    /// - [`OptError::InvalidSimplexStep`] for a non-positive or non-finite step.
    /// - [`OptError::InvalidTargetCost`] for a NaN target.
    pub fn new(
        tols: Tolerances, method: Method, verbose: bool, lbfgs_mem: Option<usize>,
        max_evals: Option<u64>, simplex_step: f64, target_cost: Option<f64>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        verify_max_evals(max_evals)?;
        verify_simplex_step(simplex_step)?;
        verify_target_cost(target_cost)?;
        Ok(Self { tols, method, verbose, lbfgs_mem, max_evals, simplex_step, target_cost })
    }
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-8), tol_cost: Some(1e-12), max_iter: Some(1000) },
            method: Method::LbfgsMoreThuente,
            verbose: false,
            lbfgs_mem: None,
            max_evals: Some(DEFAULT_MAX_EVALS),
            simplex_step: DEFAULT_SIMPLEX_STEP,
            target_cost: None,
        }
    }
}

/// Numerical tolerances and iteration limits.
///
/// - `tol_grad`: L-BFGS stops when the gradient norm falls below this.
/// - `tol_cost`: L-BFGS stops when the cost change falls below this;
///   Nelder–Mead stops when the standard deviation of the simplex costs does.
/// - `max_iter`: hard cap on the number of iterations.
///
/// Any field can be `None` but **at least one** must be provided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `minimize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: objective at `theta_hat`.
/// - `converged`: `true` only when the solver met its own convergence test or
///   the target cost was reached. Hitting `max_iter`, the evaluation budget,
///   a stalled line search, or cancellation all leave it `false`.
/// - `status`: human-readable termination status.
/// - `iterations`: optimizer iterations completed.
/// - `fn_evals`: argmin's counters (`cost_count`, `gradient_count`, ...); empty
///   when the run was interrupted.
/// - `grad_norm`: norm of the last available gradient, if any.
/// - `evaluations`: objective evaluations counted by the search control,
///   including those made inside line searches and finite differences.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
    pub evaluations: u64,
}

impl OptimOutcome {
    /// Build a validated outcome from a solver state that ran to termination.
    ///
    /// # Errors
    /// Propagates validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad_norm: Option<f64>, evaluations: u64,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(TerminationReason::SolverExit(msg))
                if msg.starts_with("Line search") =>
            {
                (false, "LineSearchStalled".to_string())
            }
            TerminationStatus::Terminated(reason) => {
                let converged = matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                );
                (converged, format!("{reason:?}"))
            }
        };
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
            evaluations,
        })
    }

    /// Build a best-so-far outcome for a run stopped by `reason`.
    ///
    /// # Errors
    /// Propagates validation errors for `theta_hat` or `value`.
    pub fn interrupted(
        theta_hat: Theta, value: f64, reason: &OptError, iterations: u64, evaluations: u64,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(Some(theta_hat))?;
        validate_value(value)?;
        let status = match reason {
            OptError::Cancelled => "Cancelled",
            OptError::EvaluationBudgetExhausted { .. } => "EvaluationBudgetExhausted",
            _ => "LineSearchStalled",
        };
        Ok(Self {
            theta_hat,
            value,
            converged: false,
            status: status.to_string(),
            iterations: iterations as usize,
            fn_evals: FnEvalMap::new(),
            grad_norm: None,
            evaluations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction rules for `Tolerances` and `MinimizeOptions`.
    // - Case-insensitive `Method` parsing.
    // - Mapping of termination statuses to `converged`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // At least one stopping rule is required and each must be sane.
    fn tolerances_new_enforces_rules() {
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(Tolerances::new(None, None, Some(10)).is_ok());
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { max_iter: 0, .. })
        ));
        assert!(matches!(
            Tolerances::new(Some(-1.0), None, None),
            Err(OptError::InvalidTolGrad { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `MinimizeOptions::new` rejects each invalid field and the default is
    // itself constructible through `new`.
    fn minimize_options_validation() {
        let d = MinimizeOptions::default();
        let rebuilt = MinimizeOptions::new(
            Tolerances::new(d.tols.tol_grad, d.tols.tol_cost, d.tols.max_iter).unwrap(),
            d.method,
            d.verbose,
            d.lbfgs_mem,
            d.max_evals,
            d.simplex_step,
            d.target_cost,
        )
        .expect("Default options should pass validation");
        assert_eq!(rebuilt, d);

        let tols = d.tols;
        assert!(matches!(
            MinimizeOptions::new(tols, Method::default(), false, Some(0), None, 1.0, None),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
        assert!(matches!(
            MinimizeOptions::new(tols, Method::default(), false, None, Some(0), 1.0, None),
            Err(OptError::InvalidMaxEvals { .. })
        ));
        assert!(matches!(
            MinimizeOptions::new(tols, Method::NelderMead, false, None, None, -2.0, None),
            Err(OptError::InvalidSimplexStep { .. })
        ));
        assert!(matches!(
            MinimizeOptions::new(tols, Method::default(), false, None, None, 1.0, Some(f64::NAN)),
            Err(OptError::InvalidTargetCost { .. })
        ));
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!("MORETHUENTE".parse::<Method>().unwrap(), Method::LbfgsMoreThuente);
        assert_eq!("hagerZhang".parse::<Method>().unwrap(), Method::LbfgsHagerZhang);
        assert_eq!("Simplex".parse::<Method>().unwrap(), Method::NelderMead);
        assert!(matches!("bfgs".parse::<Method>(), Err(OptError::InvalidMethod { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Only genuine convergence counts as converged.
    //
    // Expect
    // ------
    // - SolverConverged / TargetCostReached → converged.
    // - MaxItersReached / NotTerminated / interruption → not converged.
    fn outcome_maps_termination_to_converged() {
        let make = |status| {
            OptimOutcome::new(Some(array![1.0]), 0.5, status, 3, FnEvalMap::new(), None, 7)
                .unwrap()
        };
        assert!(make(TerminationStatus::Terminated(TerminationReason::SolverConverged)).converged);
        assert!(make(TerminationStatus::Terminated(TerminationReason::TargetCostReached)).converged);
        assert!(!make(TerminationStatus::Terminated(TerminationReason::MaxItersReached)).converged);
        assert!(!make(TerminationStatus::NotTerminated).converged);

        let stalled = make(TerminationStatus::Terminated(TerminationReason::SolverExit(
            "Line search terminated with: 'no progress'".to_string(),
        )));
        assert!(!stalled.converged);
        assert_eq!(stalled.status, "LineSearchStalled");

        let cut = OptimOutcome::interrupted(array![1.0], 0.5, &OptError::Cancelled, 2, 5).unwrap();
        assert!(!cut.converged);
        assert_eq!(cut.status, "Cancelled");
        assert_eq!(cut.evaluations, 5);

        assert!(OptimOutcome::new(None, 0.0, TerminationStatus::NotTerminated, 0, FnEvalMap::new(), None, 0)
            .is_err());
    }
}
