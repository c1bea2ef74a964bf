//! fitting::model — prediction, weighted residuals, and the least-squares
//! objective.
//!
//! Purpose
//! -------
//! Define what the optimizer minimizes. The direct definitions ([`predict`],
//! [`residual`], [`objective`]) are the reference semantics; the
//! [`WeightedDesign`] form evaluates the same objective as `‖A c − b‖²` from a
//! design matrix built once per fit, and supplies the analytic gradient.
//!
//! Key behaviors
//! -------------
//! ```text
//! predict(c, θ, φ)   = Σ_j c_j · basis_j(θ, φ)
//! residual(c, p)     = w_p · (predict(c, θ_p, φ_p) − v_p)
//! objective(c, P)    = Σ_p residual(c, p)²
//! A[i, j]            = w_i · basis_j(θ_i, φ_i),   b_i = w_i · v_i
//! ∇ objective        = 2 Aᵀ (A c − b)
//! ```
//!
//! Invariants & assumptions
//! ------------------------
//! - Points with `weight == 0` contribute exactly 0 and are left out of the
//!   design matrix.
//! - An empty point set has objective identically 0.
//! - The coefficient vector's layout decides which basis function each entry
//!   multiplies; see `harmonics::indexing`.
use ndarray::{Array1, Array2, ArrayView1};

use crate::{
    fitting::point::{Point, validate_points},
    harmonics::{
        basis::HarmonicBasis,
        coefficients::HarmonicCoefficients,
        errors::{HarmonicError, HarmonicResult},
    },
    optimization::{
        errors::{OptError, OptResult},
        objective_optimizer::{Cost, Grad, Objective, Theta},
    },
};

/// Model value at `(θ, φ)`.
///
/// # Errors
/// [`HarmonicError::ArgumentOutOfDomain`] if `cos θ` is NaN.
pub fn predict(coefficients: &HarmonicCoefficients, theta: f64, phi: f64) -> HarmonicResult<f64> {
    let basis = HarmonicBasis::new(coefficients.layout(), coefficients.max_order());
    Ok(basis.evaluate(theta, phi)?.dot(coefficients.values()))
}

/// Weighted residual `w · (predict − value)` of one point.
///
/// # Errors
/// Same as [`predict`].
pub fn residual(coefficients: &HarmonicCoefficients, point: &Point) -> HarmonicResult<f64> {
    Ok(point.weight * (predict(coefficients, point.theta, point.phi)? - point.value))
}

/// Sum of squared weighted residuals over `points`.
///
/// # Errors
/// Point validation errors (non-finite fields, negative weights).
pub fn objective(coefficients: &HarmonicCoefficients, points: &[Point]) -> HarmonicResult<f64> {
    validate_points(points)?;
    let basis = HarmonicBasis::new(coefficients.layout(), coefficients.max_order());
    let mut row = vec![0.0; basis.len()];
    let mut total = 0.0;
    for p in points.iter().filter(|p| p.weight != 0.0) {
        basis.evaluate_into(p.theta, p.phi, &mut row)?;
        let pred: f64 = row.iter().zip(coefficients.values()).map(|(b, c)| b * c).sum();
        let r = p.weight * (pred - p.value);
        total += r * r;
    }
    Ok(total)
}

/// Weighted design matrix and target for a fixed point set.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedDesign {
    design: Array2<f64>,
    target: Array1<f64>,
}

impl WeightedDesign {
    /// Assemble `A` and `b` from the points with positive weight.
    ///
    /// Points are assumed validated (see [`validate_points`]).
    ///
    /// # Errors
    /// [`HarmonicError::ArgumentOutOfDomain`] if some `cos θ` is NaN.
    pub fn build(basis: &HarmonicBasis, points: &[Point]) -> HarmonicResult<Self> {
        let active: Vec<&Point> = points.iter().filter(|p| p.weight != 0.0).collect();
        let mut design = Array2::zeros((active.len(), basis.len()));
        let mut row = vec![0.0; basis.len()];
        for (mut dst, p) in design.rows_mut().into_iter().zip(&active) {
            basis.evaluate_into(p.theta, p.phi, &mut row)?;
            for (d, &b) in dst.iter_mut().zip(&row) {
                *d = p.weight * b;
            }
        }
        let target = active.iter().map(|p| p.weight * p.value).collect();
        Ok(WeightedDesign { design, target })
    }

    /// Number of contributing points.
    pub fn rows(&self) -> usize {
        self.design.nrows()
    }

    /// Number of coefficients.
    pub fn cols(&self) -> usize {
        self.design.ncols()
    }

    /// Weighted residual vector `A c − b`.
    pub fn residuals(&self, coefficients: ArrayView1<f64>) -> Array1<f64> {
        self.design.dot(&coefficients) - &self.target
    }

    /// `‖A c − b‖²`.
    pub fn value(&self, coefficients: ArrayView1<f64>) -> f64 {
        self.residuals(coefficients).mapv(|r| r * r).sum()
    }

    /// `2 Aᵀ (A c − b)`.
    pub fn gradient(&self, coefficients: ArrayView1<f64>) -> Array1<f64> {
        self.design.t().dot(&self.residuals(coefficients)) * 2.0
    }

    fn check_len(&self, theta: &Theta) -> OptResult<()> {
        if theta.len() != self.cols() {
            return Err(HarmonicError::CoefficientLengthMismatch {
                expected: self.cols(),
                actual: theta.len(),
            }
            .into());
        }
        Ok(())
    }
}

/// The weighted least-squares objective over a [`WeightedDesign`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedLeastSquares;

impl Objective for WeightedLeastSquares {
    type Data = WeightedDesign;

    fn value(&self, theta: &Theta, data: &WeightedDesign) -> OptResult<Cost> {
        data.check_len(theta)?;
        Ok(data.value(theta.view()))
    }

    fn check(&self, theta: &Theta, data: &WeightedDesign) -> OptResult<()> {
        data.check_len(theta)?;
        match theta.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(OptError::InvalidThetaInput { index, value: theta[index] }),
            None => Ok(()),
        }
    }

    fn grad(&self, theta: &Theta, data: &WeightedDesign) -> OptResult<Grad> {
        data.check_len(theta)?;
        Ok(data.gradient(theta.view()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmonics::indexing::BasisLayout;
    use ndarray::array;
    use std::f64::consts::PI;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the direct objective with the design-matrix form.
    // - Weight-0 invariance and the empty point set.
    // - The analytic gradient against central differences.
    // - Length mismatches surfacing as model errors.
    // -------------------------------------------------------------------------

    fn sample_points() -> Vec<Point> {
        vec![
            Point::new(0.3, 0.1, 1.5, 1.0),
            Point::new(1.2, 2.0, -0.5, 0.5),
            Point::new(2.5, -1.0, 2.0, 2.0),
            Point::new(PI / 2.0, PI, 0.0, 1.0),
            Point::new(0.9, 4.0, 3.0, 0.7),
        ]
    }

    fn sample_coefficients(layout: BasisLayout) -> HarmonicCoefficients {
        let n = layout.coefficient_count(2);
        let values = Array1::from_iter((0..n).map(|i| 0.3 * i as f64 - 0.4));
        HarmonicCoefficients::new(layout, 2, values).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The objective equals the sum of squared residuals and the design form.
    //
    // Expect
    // ------
    // - `objective == Σ residual²` and `WeightedDesign::value` agrees to 1e-10
    //   for both layouts.
    fn objective_matches_residuals_and_design() {
        let points = sample_points();
        for layout in [BasisLayout::Cosine, BasisLayout::Full] {
            let c = sample_coefficients(layout);
            let direct = objective(&c, &points).unwrap();
            let summed: f64 = points.iter().map(|p| residual(&c, p).unwrap().powi(2)).sum();
            let design = WeightedDesign::build(&HarmonicBasis::new(layout, 2), &points).unwrap();

            assert!((direct - summed).abs() < 1e-10, "{layout:?}: {direct} vs {summed}");
            assert!((direct - design.value(c.values().view())).abs() < 1e-10, "{layout:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Zero-weight points never change the objective, whatever their value.
    fn zero_weight_points_are_inert() {
        let c = sample_coefficients(BasisLayout::Cosine);
        let points = sample_points();
        let base = objective(&c, &points).unwrap();

        let mut extended = points.clone();
        extended.push(Point::new(0.4, 0.4, 1e9, 0.0));
        extended.push(Point::new(3.0, 1.0, -7.0, 0.0));
        assert_eq!(objective(&c, &extended).unwrap(), base);

        let design =
            WeightedDesign::build(&HarmonicBasis::new(BasisLayout::Cosine, 2), &extended).unwrap();
        assert_eq!(design.rows(), points.len());

        assert_eq!(objective(&c, &[]).unwrap(), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // The analytic gradient agrees with central differences of the objective.
    fn gradient_matches_central_differences() {
        let points = sample_points();
        let design =
            WeightedDesign::build(&HarmonicBasis::new(BasisLayout::Full, 2), &points).unwrap();
        let theta: Theta = sample_coefficients(BasisLayout::Full).into_values();
        let g = WeightedLeastSquares.grad(&theta, &design).unwrap();

        let h = 1e-6;
        for i in 0..theta.len() {
            let mut up = theta.clone();
            let mut down = theta.clone();
            up[i] += h;
            down[i] -= h;
            let fd = (design.value(up.view()) - design.value(down.view())) / (2.0 * h);
            assert!(
                (g[i] - fd).abs() < 1e-5 * (1.0 + fd.abs()),
                "component {i}: analytic {} vs fd {fd}",
                g[i]
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // A constant field is represented exactly by the Y00 coefficient.
    fn predict_constant_field() {
        let c = HarmonicCoefficients::new(BasisLayout::Cosine, 1, array![(4.0 * PI).sqrt(), 0.0, 0.0])
            .unwrap();
        for &(theta, phi) in &[(0.0, 0.0), (1.0, 1.0), (3.0, -2.0)] {
            assert!((predict(&c, theta, phi).unwrap() - 1.0).abs() < 1e-12);
        }
        let p = Point::new(0.5, 0.5, 3.0, 2.0);
        assert!((residual(&c, &p).unwrap() - (-4.0)).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // A coefficient vector of the wrong length is a model error that keeps
    // its harmonic kind through the optimizer error type.
    fn length_mismatch_is_a_model_error() {
        let design =
            WeightedDesign::build(&HarmonicBasis::new(BasisLayout::Cosine, 1), &sample_points())
                .unwrap();
        let err = WeightedLeastSquares.value(&array![1.0, 2.0], &design).unwrap_err();
        assert_eq!(
            HarmonicError::from(err),
            HarmonicError::CoefficientLengthMismatch { expected: 3, actual: 2 }
        );
        assert!(matches!(
            WeightedLeastSquares.check(&array![1.0, f64::NAN, 0.0], &design),
            Err(OptError::InvalidThetaInput { index: 1, .. })
        ));
    }
}
