//! Errors for the harmonic core (Legendre evaluation, basis slots, point
//! validation, and the fitting boundary).
//!
//! This module defines [`HarmonicError`], the error type surfaced by every
//! public operation of the crate, and [`ErrorKind`], the coarse taxonomy
//! callers match on. Optimizer failures are carried as
//! [`HarmonicError::Optimization`]; model errors raised inside the objective
//! are unwrapped back to their original variant at the fitting boundary so
//! their kind survives the trip through the solver.
//!
//! ## Conventions
//! - Degrees `l` and orders `m` are reported as the signed integers the caller
//!   passed in, so negative inputs are visible in messages.
//! - Point indices are **0-based** positions in the slice handed to `fit`.
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::optimization::errors::OptError;

/// Crate-wide result alias for operations that may produce [`HarmonicError`].
pub type HarmonicResult<T> = Result<T, HarmonicError>;

/// Coarse error classification.
///
/// - `InvalidArgument`: the caller supplied out-of-domain input.
/// - `NumericDivergence`: the fast and reference Legendre evaluators disagree;
///   this is an implementation defect, never bad input.
/// - `Optimization`: optimizer configuration or backend failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NumericDivergence,
    Optimization,
}

/// Unified error type for the harmonic fitting core.
#[derive(Debug, Clone, PartialEq)]
pub enum HarmonicError {
    // ---- Legendre / basis domain ----
    /// Degree must be non-negative.
    InvalidDegree { l: i32 },

    /// Order must satisfy 0 ≤ m ≤ l.
    InvalidOrder { l: i32, m: i32 },

    /// Legendre argument must lie in [-1, 1].
    ArgumentOutOfDomain { x: f64 },

    /// A slot outside the layout or range: a sine slot with m = 0 or in the
    /// cosine layout, or (l, m) beyond the available degrees.
    InvalidSlot { l: usize, m: usize, reason: &'static str },

    /// Unknown coefficient layout name.
    InvalidLayout { name: String },

    // ---- Fit inputs ----
    /// Maximum expansion order must be non-negative.
    NegativeMaxOrder { max_order: i32 },

    /// Point weights must be non-negative.
    NegativeWeight { index: usize, weight: f64 },

    /// Every point field must be finite.
    NonFinitePoint { index: usize, field: &'static str, value: f64 },

    /// Coefficient vector length does not match the layout and order.
    CoefficientLengthMismatch { expected: usize, actual: usize },

    /// Coefficient vector length is not a valid count for any order.
    InvalidCoefficientCount { len: usize, reason: &'static str },

    // ---- Cross-validation ----
    /// Fast and reference Legendre evaluations disagree beyond tolerance.
    NumericDivergence { l: usize, m: usize, x: f64, reference: f64, fast: f64, tol: f64 },

    // ---- Optimizer ----
    /// Wrapper for optimizer errors.
    Optimization(OptError),
}

impl HarmonicError {
    /// Classify this error into the crate's coarse taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HarmonicError::NumericDivergence { .. } => ErrorKind::NumericDivergence,
            HarmonicError::Optimization(_) => ErrorKind::Optimization,
            _ => ErrorKind::InvalidArgument,
        }
    }
}

impl std::error::Error for HarmonicError {}

impl std::fmt::Display for HarmonicError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Legendre / basis domain ----
            HarmonicError::InvalidDegree { l } => {
                write!(f, "Invalid degree l = {l}: must be non-negative")
            }
            HarmonicError::InvalidOrder { l, m } => {
                write!(f, "Invalid order m = {m} for degree l = {l}: must satisfy 0 <= m <= l")
            }
            HarmonicError::ArgumentOutOfDomain { x } => {
                write!(f, "Legendre argument {x} outside [-1, 1]")
            }
            HarmonicError::InvalidSlot { l, m, reason } => {
                write!(f, "Invalid basis slot (l = {l}, m = {m}): {reason}")
            }
            HarmonicError::InvalidLayout { name } => {
                write!(f, "Invalid layout {name:?}: expected 'cosine' or 'full'")
            }

            // ---- Fit inputs ----
            HarmonicError::NegativeMaxOrder { max_order } => {
                write!(f, "Invalid maximum order {max_order}: must be non-negative")
            }
            HarmonicError::NegativeWeight { index, weight } => {
                write!(f, "Invalid weight at point {index}: {weight}, must be non-negative")
            }
            HarmonicError::NonFinitePoint { index, field, value } => {
                write!(f, "Invalid {field} at point {index}: {value}, must be finite")
            }
            HarmonicError::CoefficientLengthMismatch { expected, actual } => {
                write!(f, "Coefficient length mismatch: expected {expected}, actual {actual}")
            }
            HarmonicError::InvalidCoefficientCount { len, reason } => {
                write!(f, "Invalid coefficient count {len}: {reason}")
            }

            // ---- Cross-validation ----
            HarmonicError::NumericDivergence { l, m, x, reference, fast, tol } => {
                write!(
                    f,
                    "Legendre divergence at (l = {l}, m = {m}, x = {x}): reference {reference}, \
                     fast {fast}, tolerance {tol}"
                )
            }

            // ---- Optimizer ----
            HarmonicError::Optimization(err) => {
                write!(f, "Optimization failed: {err}")
            }
        }
    }
}

impl From<OptError> for HarmonicError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::Model { source } => *source,
            other => HarmonicError::Optimization(other),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<HarmonicError> for PyErr {
    fn from(err: HarmonicError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
