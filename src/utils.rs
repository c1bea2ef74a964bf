//! Conversion helpers for the Python bindings: NumPy/sequence extraction,
//! point assembly, and fit-option parsing.
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    fitting::{options::FitOptions, point::Point},
    harmonics::{errors::HarmonicError, indexing::BasisLayout},
    optimization::objective_optimizer::{Method, MinimizeOptions, Tolerances},
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

/// Accept a contiguous float64 ndarray, anything with `to_numpy()`, or a
/// plain sequence of floats.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a 1-D float input into an owned vector, naming `what` in errors.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vec<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, what: &str,
) -> PyResult<Vec<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{what} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(slice.to_vec())
}

/// Zip column arrays into points. A missing `weight` column means weight 1
/// for every point.
#[cfg(feature = "python-bindings")]
pub fn extract_points<'py>(
    py: Python<'py>, theta: &Bound<'py, PyAny>, phi: &Bound<'py, PyAny>,
    value: &Bound<'py, PyAny>, weight: Option<&Bound<'py, PyAny>>,
) -> PyResult<Vec<Point>> {
    let theta = extract_f64_vec(py, theta, "theta")?;
    let phi = extract_f64_vec(py, phi, "phi")?;
    let value = extract_f64_vec(py, value, "value")?;
    let weight = match weight {
        Some(w) => extract_f64_vec(py, w, "weight")?,
        None => vec![1.0; theta.len()],
    };

    let n = theta.len();
    for (name, len) in [("phi", phi.len()), ("value", value.len()), ("weight", weight.len())] {
        if len != n {
            return Err(PyValueError::new_err(format!(
                "{name} has length {len} but theta has length {n}"
            )));
        }
    }

    Ok((0..n).map(|i| Point::new(theta[i], phi[i], value[i], weight[i])).collect())
}

/// Build [`FitOptions`] from Python keyword arguments.
///
/// `historical = True` starts from [`FitOptions::historical`]; any other
/// explicitly given argument overrides the preset.
#[cfg(feature = "python-bindings")]
pub fn extract_fit_options(
    layout: Option<&str>, method: Option<&str>, tol_grad: Option<f64>, tol_cost: Option<f64>,
    max_iter: Option<usize>, max_evals: Option<u64>, simplex_step: Option<f64>,
    lbfgs_mem: Option<usize>, cross_check: bool, historical: bool,
) -> PyResult<FitOptions> {
    let base = if historical { FitOptions::historical() } else { FitOptions::default() };
    let m = base.minimize;

    let layout = match layout {
        Some(name) => name.parse::<BasisLayout>()?,
        None => base.layout,
    };
    let method = match method {
        Some(name) => name.parse::<Method>().map_err(HarmonicError::from)?,
        None => m.method,
    };

    // Tolerances::new -> OptResult<Tolerances> -> HarmonicError -> PyErr
    let tols = Tolerances::new(
        tol_grad.or(m.tols.tol_grad),
        tol_cost.or(m.tols.tol_cost),
        max_iter.or(m.tols.max_iter),
    )
    .map_err(HarmonicError::from)?;

    let minimize = MinimizeOptions::new(
        tols,
        method,
        false,
        lbfgs_mem.or(m.lbfgs_mem),
        max_evals.or(m.max_evals),
        simplex_step.unwrap_or(m.simplex_step),
        m.target_cost,
    )
    .map_err(HarmonicError::from)?;

    Ok(FitOptions::new(layout, minimize, cross_check))
}
