//! fitting::fit — least-squares spherical-harmonic fits of weighted points.
//!
//! Purpose
//! -------
//! Find coefficients `c` minimizing `Σ_p (w_p · (predict(c, θ_p, φ_p) − v_p))²`
//! over a truncated real harmonic basis, and report the result as a
//! [`FitResult`].
//!
//! Key behaviors
//! -------------
//! - [`fit`] uses [`FitOptions::default`]; [`fit_with`] takes explicit options
//!   and an optional cancellation flag; [`fit_from`] warm-starts from a given
//!   coefficient vector whose length fixes the maximum order.
//! - Points are validated first. A set without any positive weight returns the
//!   start unchanged with objective 0, without running a solver.
//! - Otherwise the weighted design is built once and handed to
//!   [`minimize`] with the analytic gradient.
//! - Running out of iterations, evaluations, or line-search progress, and
//!   cancellation after the first evaluation, all produce a `FitResult` with
//!   `converged = false` and the best coefficients seen.
//!
//! Invariants & assumptions
//! ------------------------
//! - `FitResult::objective` equals `model::objective` at the returned
//!   coefficients (up to floating-point summation order).
//! - Fits own all of their search state; concurrent fits on separate threads
//!   do not interact and are deterministic.
//!
//! Conventions
//! -----------
//! - Optimizer errors are mapped back to [`HarmonicError`]; an error raised
//!   inside the objective keeps its own kind.
use std::sync::atomic::AtomicBool;

use ndarray::Array1;
use tracing::debug;

use crate::{
    fitting::{
        model::{self, WeightedDesign, WeightedLeastSquares},
        options::FitOptions,
        point::{Point, validate_points},
    },
    harmonics::{
        basis::HarmonicBasis,
        coefficients::HarmonicCoefficients,
        errors::{HarmonicError, HarmonicResult},
        legendre::{AGREEMENT_TOL, verify_agreement},
    },
    optimization::objective_optimizer::{minimize, validation::validate_theta0},
};

/// Status reported when no point carries positive weight.
pub const STATUS_NO_DATA: &str = "NoWeightedPoints";

/// Outcome of a harmonic fit.
///
/// - `coefficients`: best coefficients found, tagged with layout and order.
/// - `objective`: weighted sum of squared residuals at `coefficients`.
/// - `converged`: the solver met its convergence test or the objective
///   reached its target.
/// - `status`: termination reason, e.g. `"SolverConverged"`,
///   `"TargetCostReached"`, `"MaxItersReached"`,
///   `"EvaluationBudgetExhausted"`, `"Cancelled"`, `"LineSearchStalled"`.
/// - `iterations`, `evaluations`: solver iterations and objective
///   evaluations spent.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub coefficients: HarmonicCoefficients,
    pub objective: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub evaluations: u64,
}

impl FitResult {
    /// Fitted model at `(θ, φ)`.
    ///
    /// # Errors
    /// Same as [`model::predict`].
    pub fn predict(&self, theta: f64, phi: f64) -> HarmonicResult<f64> {
        model::predict(&self.coefficients, theta, phi)
    }
}

/// Fit with [`FitOptions::default`] from the zero vector.
///
/// # Errors
/// See [`fit_with`].
pub fn fit(points: &[Point], max_order: i32) -> HarmonicResult<FitResult> {
    fit_with(points, max_order, &FitOptions::default(), None)
}

/// Fit coefficients for all degrees up to `max_order`, starting from zero.
///
/// # Errors
/// - [`HarmonicError::NegativeMaxOrder`] if `max_order < 0`.
/// - [`HarmonicError::NonFinitePoint`] / [`HarmonicError::NegativeWeight`]
///   for invalid points.
/// - [`HarmonicError::NumericDivergence`] when `opts.cross_check` is set and
///   the Legendre evaluators disagree.
/// - [`HarmonicError::Optimization`] for solver configuration or backend
///   failures, or a cancellation before the first evaluation.
///
/// # Example
/// ```
/// use skymap_harmonics::fitting::{Point, fit};
///
/// let points = [
///     Point::new(0.2, 0.0, 2.0, 1.0),
///     Point::new(1.4, 1.0, 2.0, 1.0),
///     Point::new(2.8, -2.0, 2.0, 1.0),
/// ];
/// let result = fit(&points, 0)?;
/// assert!(result.objective < 1e-10);
/// assert!((result.predict(0.7, 0.3)? - 2.0).abs() < 1e-4);
/// # Ok::<(), skymap_harmonics::harmonics::HarmonicError>(())
/// ```
pub fn fit_with(
    points: &[Point], max_order: i32, opts: &FitOptions, cancel: Option<&AtomicBool>,
) -> HarmonicResult<FitResult> {
    if max_order < 0 {
        return Err(HarmonicError::NegativeMaxOrder { max_order });
    }
    let start = HarmonicCoefficients::zeros(opts.layout, max_order as usize);
    run_fit(points, start, opts, cancel)
}

/// Fit starting from `start`, interpreted in `opts.layout`.
///
/// # Errors
/// - [`HarmonicError::InvalidCoefficientCount`] if `start.len()` is not a
///   coefficient count of the layout.
/// - [`HarmonicError::Optimization`] wrapping `InvalidThetaInput` for a
///   non-finite start.
/// - Everything [`fit_with`] returns.
pub fn fit_from(
    points: &[Point], start: &Array1<f64>, opts: &FitOptions, cancel: Option<&AtomicBool>,
) -> HarmonicResult<FitResult> {
    let start = HarmonicCoefficients::from_values(opts.layout, start.clone())?;
    run_fit(points, start, opts, cancel)
}

// ---- Helper Methods ----

fn run_fit(
    points: &[Point], start: HarmonicCoefficients, opts: &FitOptions, cancel: Option<&AtomicBool>,
) -> HarmonicResult<FitResult> {
    validate_points(points)?;
    validate_theta0(start.values())?;
    let (layout, max_order) = (start.layout(), start.max_order());
    debug!(
        "Harmonic fit: {} points, max order {}, {:?} layout, {:?}",
        points.len(),
        max_order,
        layout,
        opts.minimize.method
    );

    if !points.iter().any(|p| p.weight > 0.0) {
        debug!("Harmonic fit: no positively weighted points, returning start");
        return Ok(FitResult {
            coefficients: start,
            objective: 0.0,
            converged: true,
            status: STATUS_NO_DATA.to_string(),
            iterations: 0,
            evaluations: 0,
        });
    }

    if opts.cross_check {
        let xs: Vec<f64> =
            points.iter().filter(|p| p.weight > 0.0).map(|p| p.theta.cos()).collect();
        let worst = verify_agreement(max_order, &xs, AGREEMENT_TOL)?;
        debug!("Harmonic fit: Legendre cross-check passed, worst deviation {:.3e}", worst);
    }

    let basis = HarmonicBasis::new(layout, max_order);
    let design = WeightedDesign::build(&basis, points)?;
    let outcome =
        minimize(&WeightedLeastSquares, start.into_values(), &design, &opts.minimize, cancel)?;
    if !outcome.converged {
        debug!("Harmonic fit stopped before convergence: {}", outcome.status);
    }
    debug!(
        "Harmonic fit done: objective={:.6e}, status={}, iters={}, evals={}",
        outcome.value, outcome.status, outcome.iterations, outcome.evaluations
    );

    Ok(FitResult {
        coefficients: HarmonicCoefficients::new(layout, max_order, outcome.theta_hat)?,
        objective: outcome.value,
        converged: outcome.converged,
        status: outcome.status,
        iterations: outcome.iterations,
        evaluations: outcome.evaluations,
    })
}
