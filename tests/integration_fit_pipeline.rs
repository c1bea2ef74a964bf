//! Integration tests for the harmonic fitting pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end path from weighted points, through the basis and
//!   weighted design, to the optimizer and back to layout-tagged
//!   coefficients.
//! - Exercise realistic sky-map shapes (dense grids, uneven weights, degree
//!   input) rather than toy edge cases only.
//!
//! Coverage
//! --------
//! - `fitting::fit`: `fit`, `fit_with`, `fit_from` with both layouts and all
//!   methods.
//! - `fitting::model`: objective of the fitted coefficients against the true
//!   field.
//! - `harmonics`: basis evaluation through `FitResult::predict`.
//!
//! Exclusions
//! ----------
//! - Argument validation and short-circuits; these are covered by unit tests.
//! - Python bindings.
use std::{f64::consts::PI, sync::atomic::AtomicBool, thread};

use ndarray::Array1;
use skymap_harmonics::{
    fitting::{FitOptions, FitResult, Point, fit, fit_from, fit_with, objective},
    harmonics::{BasisLayout, HarmonicCoefficients},
    optimization::objective_optimizer::{Method, MinimizeOptions, Tolerances},
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Purpose
/// -------
/// Deterministic coefficients for `(layout, max_order)` with entries of both
/// signs and decaying magnitude.
fn true_coefficients(layout: BasisLayout, max_order: usize) -> HarmonicCoefficients {
    let n = layout.coefficient_count(max_order);
    let values = Array1::from_iter((0..n).map(|i| {
        let sign = if i % 2 == 0 { 1.0 } else { -0.6 };
        sign / (1.0 + i as f64).sqrt()
    }));
    HarmonicCoefficients::new(layout, max_order, values).unwrap()
}

/// Purpose
/// -------
/// Sample `truth` on a 12 × 16 grid covering the sphere, with weights cycling
/// through 0.5, 1, 1.5, 2.
fn sample_grid(truth: &HarmonicCoefficients) -> Vec<Point> {
    let mut points = Vec::new();
    for i in 0..12 {
        let theta = 0.1 + (PI - 0.2) * i as f64 / 11.0;
        for j in 0..16 {
            let phi = 2.0 * PI * j as f64 / 16.0;
            let value = skymap_harmonics::fitting::predict(truth, theta, phi).unwrap();
            let weight = 0.5 * (1 + (i + j) % 4) as f64;
            points.push(Point::new(theta, phi, value, weight));
        }
    }
    points
}

fn assert_close(result: &FitResult, truth: &HarmonicCoefficients, tol: f64) {
    for (k, (a, b)) in result.coefficients.values().iter().zip(truth.values()).enumerate() {
        assert!((a - b).abs() < tol, "coefficient {k}: fitted {a} vs true {b}");
    }
}

#[test]
// Purpose
// -------
// Noise-free data generated from known coefficients is recovered by the
// default L-BFGS fit in both layouts.
//
// Expect
// ------
// - objective(fitted) ≤ objective(true) + 1e-6 (the latter is 0 up to
//   rounding).
// - coefficients within 1e-3 of the truth; predictions match the field.
fn recovers_synthetic_fields_in_both_layouts() {
    init_tracing();
    for layout in [BasisLayout::Cosine, BasisLayout::Full] {
        let truth = true_coefficients(layout, 2);
        let points = sample_grid(&truth);
        let opts = FitOptions { layout, ..FitOptions::default() };

        let result = fit_with(&points, 2, &opts, None).unwrap();
        let true_objective = objective(&truth, &points).unwrap();
        assert!(result.objective <= true_objective + 1e-6, "{layout:?}: {}", result.objective);
        assert!((result.objective - objective(&result.coefficients, &points).unwrap()).abs() < 1e-8);
        assert_close(&result, &truth, 1e-3);

        let expected = skymap_harmonics::fitting::predict(&truth, 1.1, 0.4).unwrap();
        assert!((result.predict(1.1, 0.4).unwrap() - expected).abs() < 1e-3);
    }
}

#[test]
// Purpose
// -------
// Hager–Zhang and Nelder–Mead reach the same minimum on a small problem.
fn alternative_methods_agree() {
    let truth = true_coefficients(BasisLayout::Cosine, 1);
    let points = sample_grid(&truth);

    let hz = FitOptions {
        minimize: MinimizeOptions {
            method: Method::LbfgsHagerZhang,
            ..FitOptions::default().minimize
        },
        ..FitOptions::default()
    };
    let result = fit_with(&points, 1, &hz, None).unwrap();
    assert!(result.objective <= 1e-6, "HagerZhang objective {}", result.objective);
    assert_close(&result, &truth, 1e-3);

    let tols = Tolerances::new(None, Some(1e-14), Some(5000)).unwrap();
    let nm = MinimizeOptions::new(tols, Method::NelderMead, false, None, None, 0.5, Some(0.0))
        .unwrap();
    let result =
        fit_with(&points, 1, &FitOptions::new(BasisLayout::Cosine, nm, false), None).unwrap();
    assert!(result.objective <= 1e-6, "NelderMead objective {}", result.objective);
    assert_close(&result, &truth, 1e-2);
}

#[test]
// Purpose
// -------
// A warm start near the answer converges to it and keeps the layout and
// order implied by its length.
fn warm_start_refines_a_nearby_solution() {
    let truth = true_coefficients(BasisLayout::Full, 2);
    let points = sample_grid(&truth);
    let opts = FitOptions { layout: BasisLayout::Full, ..FitOptions::default() };

    let start = truth.values().mapv(|c| c + 0.05);
    let result = fit_from(&points, &start, &opts, None).unwrap();
    assert_eq!(result.coefficients.layout(), BasisLayout::Full);
    assert_eq!(result.coefficients.max_order(), 2);
    assert!(result.objective <= 1e-6);
    assert_close(&result, &truth, 1e-3);
}

#[test]
// Purpose
// -------
// Fits on separate threads do not interact: identical inputs give identical
// results, and an unset cancellation flag changes nothing.
fn concurrent_fits_are_deterministic() {
    let truth = true_coefficients(BasisLayout::Cosine, 3);
    let points = sample_grid(&truth);
    let reference = fit(&points, 3).unwrap();

    let results: Vec<FitResult> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let points = &points;
                s.spawn(move || {
                    let flag = AtomicBool::new(false);
                    fit_with(points, 3, &FitOptions::default(), Some(&flag)).unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for r in &results {
        assert_eq!(r, &reference);
    }
}

#[test]
// Purpose
// -------
// A sky map given in degrees fits with the historical Nelder–Mead preset and
// terminates within its budget.
fn historical_preset_on_degree_sky_map() {
    let mut points = Vec::new();
    for zenith in (0..90).step_by(15) {
        for azimuth in (0..360).step_by(45) {
            let z = zenith as f64;
            let value = 100.0 * z.to_radians().cos().powi(2);
            points.push(Point::from_degrees(z, azimuth as f64, value, 1.0));
        }
    }

    let result = fit_with(&points, 2, &FitOptions::historical(), None).unwrap();
    assert!(result.objective.is_finite() && result.objective >= 0.0);
    assert!(result.evaluations <= 10_000_000);
    assert_eq!(result.coefficients.len(), 6);

    let lbfgs = fit(&points, 2).unwrap();
    assert!(lbfgs.objective <= result.objective + 1e-3);
}
