//! objective_optimizer::types — numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Keep the optimizer's `ndarray`/argmin generics in one place so the rest of
//! the layer speaks in terms of [`Theta`], [`Grad`] and [`Cost`].
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are column vectors of the free parameters.
//! - `Cost` is the scalar being **minimized**; there is no sign flip anywhere
//!   in this layer.
//! - The solver aliases pair argmin's line searches and simplex with these
//!   shapes.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    neldermead::NelderMead,
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient `∇c(θ)`, same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters as reported by argmin (e.g. `"cost_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Default objective-evaluation budget.
pub const DEFAULT_MAX_EVALS: u64 = 100_000;

/// Default initial simplex edge length for Nelder–Mead.
pub const DEFAULT_SIMPLEX_STEP: f64 = 1.0;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Nelder–Mead simplex over [`Theta`].
pub type Simplex = NelderMead<Theta, Cost>;
