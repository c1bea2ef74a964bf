//! optimization — objective minimization and its error surface.
//!
//! Purpose
//! -------
//! Provide the solver layer used by the harmonic fitter: an argmin-backed
//! minimizer over `ndarray` parameter vectors ([`objective_optimizer`]) and a
//! single error/result surface ([`errors::OptError`], `OptResult<T>`).
//!
//! Key behaviors
//! -------------
//! - Run L-BFGS or Nelder–Mead on any [`objective_optimizer::Objective`] with
//!   validated tolerances, evaluation budgets, and cooperative cancellation.
//! - Normalize configuration issues, numerical failures, search interruptions,
//!   and backend solver errors into `OptError`.
//!
//! Conventions
//! -----------
//! - Optimizers minimize. Objectives with domain errors report them as
//!   `OptError::Model`, which the fitting layer unwraps back to the original
//!   `HarmonicError`.
//! - The core stays silent; the `obs_slog` feature attaches argmin's slog
//!   observer when `verbose` is set.

pub mod errors;
pub mod objective_optimizer;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use skymap_harmonics::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::objective_optimizer::prelude::*;
}
