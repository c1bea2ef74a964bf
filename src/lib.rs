//! skymap_harmonics — weighted spherical-harmonic fits of angular sky maps,
//! with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the Legendre evaluators, the harmonic basis, and the fitter to Python via
//! the `_skymap_harmonics` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules: [`harmonics`] (Legendre functions, basis,
//!   coefficient layout), [`fitting`] (points, residual model, fits), and
//!   [`optimization`] (argmin-backed minimizer).
//! - Define the `plgndr`, `plgndr_reference`, and `basis` Python functions
//!   and the `HarmonicFit` class when `python-bindings` is enabled.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file only converts
//!   inputs, releases the GIL around fits, and maps errors.
//! - Python-visible signatures take the same `i32` degrees and orders as the
//!   Rust functions, so negative values fail with the same errors.
//!
//! Conventions
//! -----------
//! - Angles are radians throughout; `Point::from_degrees` converts sky-map
//!   zenith/azimuth degrees.
//! - Errors are rich enums internally and become `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! ```
//! use skymap_harmonics::fitting::{Point, fit};
//! use skymap_harmonics::harmonics::{plgndr_fast, plgndr_reference};
//!
//! assert!((plgndr_fast(3, 1, 0.5)? - plgndr_reference(3, 1, 0.5)?).abs() < 1e-12);
//!
//! let points = [Point::new(0.1, 0.0, 1.0, 1.0), Point::new(2.0, 1.0, 1.0, 1.0)];
//! let result = fit(&points, 1)?;
//! assert!(result.objective < 1e-8);
//! # Ok::<(), skymap_harmonics::harmonics::HarmonicError>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to each module; tests/integration_fit_pipeline.rs
//!   covers end-to-end recovery of synthetic fields, warm starts, and
//!   concurrent fits.

pub mod fitting;
pub mod harmonics;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Array1;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    fitting::fit::{FitResult, fit_from, fit_with},
    utils::{extract_f64_vec, extract_fit_options, extract_points},
};

/// Fast associated Legendre function `P_l^m(x)`.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(text_signature = "(l, m, x, /)")]
pub fn plgndr(l: i32, m: i32, x: f64) -> PyResult<f64> {
    Ok(harmonics::plgndr_fast(l, m, x)?)
}

/// Reference associated Legendre function `P_l^m(x)` by upward recurrence.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(text_signature = "(l, m, x, /)")]
pub fn plgndr_reference(l: i32, m: i32, x: f64) -> PyResult<f64> {
    Ok(harmonics::plgndr_reference(l, m, x)?)
}

/// Real cosine-type harmonic `N(l, m) P_l^m(cos θ) cos(mφ)`.
#[cfg(feature = "python-bindings")]
#[pyfunction(name = "basis")]
#[pyo3(text_signature = "(l, m, theta, phi, /)")]
pub fn basis_py(l: i32, m: i32, theta: f64, phi: f64) -> PyResult<f64> {
    Ok(harmonics::basis::basis(l, m, theta, phi)?)
}

/// HarmonicFit — Python-facing weighted spherical-harmonic fit.
///
/// Purpose
/// -------
/// Run [`fit_with`] (or [`fit_from`] when `start` is given) on column arrays
/// and keep the [`FitResult`] for inspection and prediction.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `HarmonicFit(theta, phi, value, weight=None, max_order=2, ...)`:
/// - `theta`, `phi`, `value`, `weight`: equal-length 1-D float arrays;
///   `weight` defaults to ones.
/// - `max_order`: highest degree; ignored when `start` fixes it.
/// - `layout`: `"cosine"` (default) or `"full"`.
/// - `method`: `"lbfgs"`, `"hagerzhang"`, or `"neldermead"`.
/// - `tol_grad`, `tol_cost`, `max_iter`, `max_evals`, `simplex_step`,
///   `lbfgs_mem`: solver settings overriding the preset.
/// - `cross_check`: verify the Legendre evaluators on the data first.
/// - `historical`: start from the Nelder–Mead preset instead of the default.
/// - `start`: optional warm-start coefficients.
///
/// Notes
/// -----
/// - The GIL is released while the fit runs.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "skymap_harmonics")]
pub struct HarmonicFit {
    inner: FitResult,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl HarmonicFit {
    #[new]
    #[pyo3(
        signature = (
            theta,
            phi,
            value,
            weight = None,
            max_order = 2,
            layout = None,
            method = None,
            tol_grad = None,
            tol_cost = None,
            max_iter = None,
            max_evals = None,
            simplex_step = None,
            lbfgs_mem = None,
            cross_check = false,
            historical = false,
            start = None,
        ),
        text_signature = "(theta, phi, value, /, weight=None, max_order=2, layout='cosine', \
                          method='lbfgs', tol_grad=None, tol_cost=None, max_iter=None, \
                          max_evals=None, simplex_step=None, lbfgs_mem=None, cross_check=False, \
                          historical=False, start=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, theta: &Bound<'py, PyAny>, phi: &Bound<'py, PyAny>,
        value: &Bound<'py, PyAny>, weight: Option<&Bound<'py, PyAny>>, max_order: i32,
        layout: Option<&str>, method: Option<&str>, tol_grad: Option<f64>,
        tol_cost: Option<f64>, max_iter: Option<usize>, max_evals: Option<u64>,
        simplex_step: Option<f64>, lbfgs_mem: Option<usize>, cross_check: bool,
        historical: bool, start: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Self> {
        let points = extract_points(py, theta, phi, value, weight)?;
        let opts = extract_fit_options(
            layout,
            method,
            tol_grad,
            tol_cost,
            max_iter,
            max_evals,
            simplex_step,
            lbfgs_mem,
            cross_check,
            historical,
        )?;
        let start = match start {
            Some(s) => Some(Array1::from(extract_f64_vec(py, s, "start")?)),
            None => None,
        };

        let inner = py.allow_threads(|| match &start {
            Some(s) => fit_from(&points, s, &opts, None),
            None => fit_with(&points, max_order, &opts, None),
        })?;
        Ok(HarmonicFit { inner })
    }

    /// Fitted coefficients in layout order.
    #[getter]
    pub fn coefficients(&self) -> Vec<f64> {
        self.inner.coefficients.values().to_vec()
    }

    #[getter]
    pub fn max_order(&self) -> usize {
        self.inner.coefficients.max_order()
    }

    #[getter]
    pub fn layout(&self) -> String {
        format!("{:?}", self.inner.coefficients.layout()).to_lowercase()
    }

    #[getter]
    pub fn objective(&self) -> f64 {
        self.inner.objective
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.iterations
    }

    #[getter]
    pub fn evaluations(&self) -> u64 {
        self.inner.evaluations
    }

    /// Fitted model at `(theta, phi)`.
    #[pyo3(text_signature = "(self, theta, phi, /)")]
    pub fn predict(&self, theta: f64, phi: f64) -> PyResult<f64> {
        Ok(self.inner.predict(theta, phi)?)
    }
}

/// _skymap_harmonics — PyO3 module initializer for the Python extension.
///
/// Registers the Legendre and basis functions and the `HarmonicFit` class.
/// Invoked by Python when the compiled extension is imported.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _skymap_harmonics<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(plgndr, m)?)?;
    m.add_function(wrap_pyfunction!(plgndr_reference, m)?)?;
    m.add_function(wrap_pyfunction!(basis_py, m)?)?;
    m.add_class::<HarmonicFit>()?;
    Ok(())
}
