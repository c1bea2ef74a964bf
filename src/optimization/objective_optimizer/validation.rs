//! Validation helpers for the objective optimizer.
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`].
//! - **Budget/step checks**: [`verify_max_evals`], [`verify_simplex_step`],
//!   [`verify_target_cost`].
//! - **Start vector**: [`validate_theta0`] rejects non-finite entries.
//! - **Gradient validation**: [`validate_grad`] enforces dimension and finite
//!   entries.
//! - **Outcome checks**: [`validate_theta_hat`], [`validate_value`].
//!
//! Each helper reports a specific [`OptError`] variant so callers can tell
//! configuration mistakes apart from numerical failures.
use crate::optimization::{
    errors::{OptError, OptResult},
    objective_optimizer::types::{Grad, Theta},
};

/// Validate the optional gradient-norm tolerance.
///
/// # Errors
/// Returns [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolGrad { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// Validate the optional cost-change tolerance. For Nelder–Mead this is the
/// standard deviation of the simplex costs.
///
/// # Errors
/// Returns [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        if !tol.is_finite() {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be finite." });
        }
        if tol <= 0.0 {
            return Err(OptError::InvalidTolCost { tol, reason: "Tolerance must be positive." });
        }
    }
    Ok(())
}

/// # Errors
/// Returns [`OptError::InvalidMaxEvals`] if the budget is zero.
pub fn verify_max_evals(max_evals: Option<u64>) -> OptResult<()> {
    if let Some(0) = max_evals {
        return Err(OptError::InvalidMaxEvals {
            max_evals: 0,
            reason: "Evaluation budget must be greater than zero.",
        });
    }
    Ok(())
}

/// # Errors
/// Returns [`OptError::InvalidSimplexStep`] if the step is non-finite or ≤ 0.0.
pub fn verify_simplex_step(step: f64) -> OptResult<()> {
    if !step.is_finite() {
        return Err(OptError::InvalidSimplexStep { step, reason: "Simplex step must be finite." });
    }
    if step <= 0.0 {
        return Err(OptError::InvalidSimplexStep {
            step,
            reason: "Simplex step must be positive.",
        });
    }
    Ok(())
}

/// Target cost may be any number, including `-∞`, but not NaN.
///
/// # Errors
/// Returns [`OptError::InvalidTargetCost`] for NaN.
pub fn verify_target_cost(target: Option<f64>) -> OptResult<()> {
    if let Some(value) = target {
        if value.is_nan() {
            return Err(OptError::InvalidTargetCost { value });
        }
    }
    Ok(())
}

/// Reject a starting point with NaN or infinite entries.
///
/// # Errors
/// Returns [`OptError::InvalidThetaInput`] for the first offending entry.
pub fn validate_theta0(theta0: &Theta) -> OptResult<()> {
    match theta0.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(OptError::InvalidThetaInput { index, value: theta0[index] }),
        None => Ok(()),
    }
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let t = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some(index) = t.iter().position(|v| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value: t[index],
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(t)
}

/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}
