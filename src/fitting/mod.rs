//! fitting — weighted least-squares spherical-harmonic fits of sky maps.
//!
//! Purpose
//! -------
//! Turn a set of weighted angular measurements into harmonic coefficients:
//! validate the points, build the weighted design, and drive the optimizer.
//!
//! Key behaviors
//! -------------
//! - [`point`]: the measurement record and its validation.
//! - [`model`]: prediction, residuals, the objective, and its design-matrix
//!   form with analytic gradient.
//! - [`options`]: layout, solver, and cross-check settings, including the
//!   historical Nelder–Mead preset.
//! - [`fit`](mod@fit): the `fit` / `fit_with` / `fit_from` entry points.
//!
//! Downstream usage
//! ----------------
//! ```
//! use skymap_harmonics::fitting::{FitOptions, Point, fit_with};
//!
//! let points = [Point::from_degrees(10.0, 0.0, 3.0, 1.0), Point::from_degrees(80.0, 90.0, 1.0, 1.0)];
//! let result = fit_with(&points, 1, &FitOptions::default(), None)?;
//! assert_eq!(result.coefficients.len(), 3);
//! # Ok::<(), skymap_harmonics::harmonics::HarmonicError>(())
//! ```

pub mod fit;
pub mod model;
pub mod options;
pub mod point;

pub use self::fit::{FitResult, fit, fit_from, fit_with};
pub use self::model::{WeightedDesign, WeightedLeastSquares, objective, predict, residual};
pub use self::options::FitOptions;
pub use self::point::{Point, validate_points};
