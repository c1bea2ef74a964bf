//! objective_optimizer — argmin-powered minimization of user objectives.
//!
//! Purpose
//! -------
//! Provide a small, argmin-backed optimization layer: callers implement
//! [`Objective`] and invoke [`minimize`] to run L-BFGS (More–Thuente or
//! Hager–Zhang line search) or the Nelder–Mead simplex under tolerances, an
//! iteration cap, an evaluation budget, and an optional cancellation flag.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] exposes an objective to argmin as
//!   `CostFunction` + `Gradient`, falling back to finite differences when no
//!   analytic gradient is implemented.
//! - [`control::SearchControl`] owns the per-run evaluation counter, polls the
//!   cancellation flag, and keeps the best point evaluated so far.
//! - [`builders`] construct the configured solvers; [`run::run_solver`]
//!   executes any of them and normalizes the final state into an
//!   [`OptimOutcome`].
//! - Budget exhaustion, cancellation, and stalled line searches produce a
//!   best-so-far [`OptimOutcome`] with `converged = false`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The cost is minimized exactly as returned by [`Objective::value`]; there
//!   is no sign convention to translate.
//! - [`Objective::value`] and [`Objective::grad`] report invalid inputs as
//!   [`OptError`](crate::optimization::errors::OptError) values, never
//!   panics. Those errors always abort the run.
//! - Configuration types ([`Tolerances`], [`MinimizeOptions`]) are validated
//!   on construction.
//!
//! Conventions
//! -----------
//! - Parameters are [`Theta`] (`Array1<f64>`); gradients are [`Grad`].
//! - Every run is deterministic for a fixed objective, start, and options.
//! - Errors bubble up as `OptResult<T>`; this module never uses `unsafe`.
//!
//! Downstream usage
//! ----------------
//! - `fitting::fit` implements [`Objective`] for the weighted least-squares
//!   problem and calls [`minimize`] with options taken from `FitOptions`.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover gradient pass-through and FD fallback in
//!   [`adapter`], budget/cancel/ledger logic in [`control`], solver
//!   construction in [`builders`], option and outcome invariants in
//!   [`traits`], and end-to-end behavior on toy objectives in [`api`].

pub mod adapter;
pub mod api;
pub mod builders;
pub mod control;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::minimize;
pub use self::traits::{Method, MinimizeOptions, Objective, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, DEFAULT_MAX_EVALS, FnEvalMap, Grad, Theta};

pub mod prelude {
    pub use super::api::minimize;
    pub use super::traits::{Method, MinimizeOptions, Objective, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
