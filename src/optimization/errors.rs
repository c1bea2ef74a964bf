use argmin::core::{ArgminError, Error};

use crate::harmonics::errors::HarmonicError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MinimizeOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// Evaluation budget needs to be positive.
    InvalidMaxEvals {
        max_evals: u64,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid minimization method name.
    InvalidMethod {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    /// Initial simplex edge length needs to be positive and finite.
    InvalidSimplexStep {
        step: f64,
        reason: &'static str,
    },

    /// Target cost must not be NaN.
    InvalidTargetCost {
        value: f64,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    /// Starting point must have finite values.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    /// The objective rejected its input; carries the model error untouched.
    Model {
        source: Box<HarmonicError>,
    },

    // ---- Search control ----
    /// Objective evaluation budget reached before convergence.
    EvaluationBudgetExhausted {
        max_evals: u64,
    },

    /// The caller raised the cancellation flag.
    Cancelled,

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl OptError {
    /// `true` for the stop signals raised by the search control (budget or
    /// cancellation); these end a run early without invalidating it.
    pub fn is_interruption(&self) -> bool {
        matches!(self, OptError::EvaluationBudgetExhausted { .. } | OptError::Cancelled)
    }

    /// `true` when the backend solver could not make further progress, e.g. a
    /// line search that no longer finds a descent direction near the optimum.
    pub fn is_stall(&self) -> bool {
        matches!(self, OptError::ConditionViolated { .. })
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- MinimizeOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::InvalidMaxEvals { max_evals, reason } => {
                write!(f, "Invalid evaluation budget {max_evals}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidMethod { name, reason } => {
                write!(f, "Invalid minimization method '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }
            OptError::InvalidSimplexStep { step, reason } => {
                write!(f, "Invalid simplex step {step}: {reason}")
            }
            OptError::InvalidTargetCost { value } => {
                write!(f, "Invalid target cost {value}, must not be NaN")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }
            OptError::InvalidThetaInput { index, value } => {
                write!(f, "Invalid starting point at index {index}: {value}, must be finite")
            }
            OptError::Model { source } => {
                write!(f, "Objective rejected its input: {source}")
            }

            // ---- Search control ----
            OptError::EvaluationBudgetExhausted { max_evals } => {
                write!(f, "Evaluation budget of {max_evals} objective evaluations exhausted")
            }
            OptError::Cancelled => {
                write!(f, "Optimization cancelled")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Our own errors travel through argmin boxed; recover them first.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<HarmonicError> for OptError {
    fn from(err: HarmonicError) -> Self {
        match err {
            HarmonicError::Optimization(inner) => inner,
            other => OptError::Model { source: Box::new(other) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Recovery of `OptError` values that were boxed into `argmin::core::Error`.
    // - Mapping of `ArgminError` variants into the local surface.
    // - Round-tripping of model errors through `OptError::Model`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A crate error raised inside a cost function must come back out of the
    // argmin boundary as the same variant, not as a stringly `BackendError`.
    //
    // Given
    // -----
    // - `OptError::Cancelled` converted into `argmin::core::Error`.
    //
    // Expect
    // ------
    // - `OptError::from` yields `OptError::Cancelled`.
    fn from_argmin_error_recovers_local_variant() {
        let boxed: Error = OptError::Cancelled.into();

        let back = OptError::from(boxed);

        assert_eq!(back, OptError::Cancelled);
    }

    #[test]
    // Purpose
    // -------
    // Confirm that argmin's own condition errors map onto the wrapper variant
    // that `is_stall` recognizes.
    //
    // Given
    // -----
    // - `ArgminError::ConditionViolated` with a descent-direction message.
    //
    // Expect
    // ------
    // - `OptError::ConditionViolated` with the same text, flagged as a stall.
    fn from_argmin_error_maps_condition_violated() {
        let text = "Search direction must be a descent direction.".to_string();
        let boxed: Error = ArgminError::ConditionViolated { text: text.clone() }.into();

        let back = OptError::from(boxed);

        assert_eq!(back, OptError::ConditionViolated { text });
        assert!(back.is_stall());
        assert!(!back.is_interruption());
    }

    #[test]
    // Purpose
    // -------
    // Model errors wrap into `OptError::Model`, while already-wrapped
    // optimizer errors are unwrapped rather than nested twice.
    //
    // Given
    // -----
    // - A `HarmonicError::NegativeWeight` and a
    //   `HarmonicError::Optimization(OptError::Cancelled)`.
    //
    // Expect
    // ------
    // - The first becomes `Model { .. }`; the second becomes `Cancelled`.
    fn from_harmonic_error_wraps_or_unwraps() {
        let model = OptError::from(HarmonicError::NegativeWeight { index: 2, weight: -1.0 });
        let opt = OptError::from(HarmonicError::Optimization(OptError::Cancelled));

        assert!(matches!(model, OptError::Model { .. }));
        assert_eq!(opt, OptError::Cancelled);
    }
}
