//! objective_optimizer::builders — solver construction helpers.
//!
//! Purpose
//! -------
//! Build configured argmin solvers from [`MinimizeOptions`] so the entry point
//! never touches argmin's generic wiring directly.
//!
//! Key behaviors
//! -------------
//! - L-BFGS with either Hager–Zhang or More–Thuente line search, with the
//!   optional gradient and cost-change tolerances applied by
//!   [`configure_lbfgs`].
//! - Nelder–Mead started from the simplex `θ₀, θ₀ + s·e₁, …, θ₀ + s·eₙ`
//!   (`s = opts.simplex_step`), stopping on the cost standard deviation
//!   `opts.tols.tol_cost`.
//!
//! Conventions
//! -----------
//! - Builders do **not** set the initial parameter, `max_iters`, or the
//!   target cost; those are applied by the runner.
//! - Invalid tolerances rejected by argmin surface as [`OptError`] through
//!   the crate's `From<argmin::core::Error>` conversion.
//!
//! [`OptError`]: crate::optimization::errors::OptError
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    objective_optimizer::{
        traits::MinimizeOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Simplex, Theta,
        },
    },
};

/// L-BFGS with Hager–Zhang line search.
///
/// # Errors
/// `OptError` if argmin rejects one of the tolerances.
pub fn build_optimizer_hager_zhang(opts: &MinimizeOptions) -> OptResult<LbfgsHagerZhang> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsHagerZhang::new(HagerZhangLS::new(), mem), opts)
}

/// L-BFGS with More–Thuente line search.
///
/// # Errors
/// `OptError` if argmin rejects one of the tolerances.
pub fn build_optimizer_more_thuente(opts: &MinimizeOptions) -> OptResult<LbfgsMoreThuente> {
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    configure_lbfgs(LbfgsMoreThuente::new(MoreThuenteLS::new(), mem), opts)
}

/// Apply the optional tolerances from `opts` to an L-BFGS solver with any
/// line search. Absent tolerances keep argmin's defaults.
///
/// # Errors
/// `OptError` if argmin rejects a tolerance.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MinimizeOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}

/// Nelder–Mead over the given starting `vertices`, usually from
/// [`initial_simplex`].
///
/// # Errors
/// `OptError` if argmin rejects the standard-deviation tolerance.
pub fn build_optimizer_nelder_mead(
    vertices: Vec<Theta>, opts: &MinimizeOptions,
) -> OptResult<Simplex> {
    let solver = Simplex::new(vertices);
    match opts.tols.tol_cost {
        Some(tol) => Ok(solver.with_sd_tolerance(tol)?),
        None => Ok(solver),
    }
}

/// `n + 1` vertices: `theta0` followed by one step along each axis.
pub fn initial_simplex(theta0: &Theta, step: f64) -> Vec<Theta> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut v = theta0.clone();
        v[i] += step;
        vertices.push(v);
    }
    vertices
}
