//! Options for a harmonic fit.
use crate::{
    harmonics::indexing::BasisLayout,
    optimization::objective_optimizer::{Method, MinimizeOptions, Tolerances},
};

/// Step of the initial simplex in the historical configuration.
pub const HISTORICAL_SIMPLEX_STEP: f64 = 100.0;
/// Iteration cap of the historical configuration.
pub const HISTORICAL_MAX_ITER: usize = 100_000;
/// Evaluation budget of the historical configuration.
pub const HISTORICAL_MAX_EVALS: u64 = 10_000_000;
/// Simplex convergence threshold of the historical configuration.
pub const HISTORICAL_TOL_COST: f64 = 0.01;

/// Configuration for [`fit_with`](crate::fitting::fit::fit_with) and
/// [`fit_from`](crate::fitting::fit::fit_from).
///
/// - `layout`: coefficient layout, and therefore the basis that is fitted.
/// - `minimize`: solver choice, tolerances, and evaluation budget.
/// - `cross_check`: when `true`, every fit first checks that the fast and
///   reference Legendre evaluators agree on the fit's own `cos θ` values and
///   fails with `NumericDivergence` if they do not. The absolute bound is
///   only attainable through max order 12.
///
/// The default fits the cosine layout with L-BFGS (More–Thuente) on the
/// analytic gradient, stops as soon as the objective reaches 0, and skips the
/// cross-check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    pub layout: BasisLayout,
    pub minimize: MinimizeOptions,
    pub cross_check: bool,
}

impl FitOptions {
    pub fn new(layout: BasisLayout, minimize: MinimizeOptions, cross_check: bool) -> Self {
        FitOptions { layout, minimize, cross_check }
    }

    /// The derivative-free configuration sky maps were originally fitted
    /// with: Nelder–Mead from a simplex of edge 100, stopping once the
    /// simplex costs spread less than 0.01, with at most 100 000 iterations
    /// and 10 000 000 evaluations.
    pub fn historical() -> Self {
        let minimize = MinimizeOptions {
            tols: Tolerances {
                tol_grad: None,
                tol_cost: Some(HISTORICAL_TOL_COST),
                max_iter: Some(HISTORICAL_MAX_ITER),
            },
            method: Method::NelderMead,
            max_evals: Some(HISTORICAL_MAX_EVALS),
            simplex_step: HISTORICAL_SIMPLEX_STEP,
            target_cost: Some(0.0),
            ..MinimizeOptions::default()
        };
        FitOptions { layout: BasisLayout::Cosine, minimize, cross_check: false }
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        let minimize = MinimizeOptions { target_cost: Some(0.0), ..MinimizeOptions::default() };
        FitOptions { layout: BasisLayout::default(), minimize, cross_check: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Both presets are valid `MinimizeOptions` and carry the documented values.
    fn presets_are_valid() {
        for opts in [FitOptions::default(), FitOptions::historical()] {
            let m = opts.minimize;
            let rebuilt = MinimizeOptions::new(
                Tolerances::new(m.tols.tol_grad, m.tols.tol_cost, m.tols.max_iter).unwrap(),
                m.method,
                m.verbose,
                m.lbfgs_mem,
                m.max_evals,
                m.simplex_step,
                m.target_cost,
            )
            .unwrap();
            assert_eq!(rebuilt, m);
            assert_eq!(opts.layout, BasisLayout::Cosine);
            assert!(!opts.cross_check);
        }

        let h = FitOptions::historical().minimize;
        assert_eq!(h.method, Method::NelderMead);
        assert_eq!(h.simplex_step, 100.0);
        assert_eq!(h.max_evals, Some(10_000_000));
        assert_eq!(FitOptions::default().minimize.method, Method::LbfgsMoreThuente);
    }
}
