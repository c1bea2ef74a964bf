//! Associated Legendre functions P_l^m(x).
//!
//! Two evaluators are kept side by side and checked against each other:
//!
//! - [`plgndr_reference`] seeds the diagonal value P_m^m from the closed form
//!   `(-1)^m (2m-1)!! (1-x²)^{m/2}` and raises the degree with the upward
//!   recurrence in l.
//! - [`plgndr_fast`] builds the seed incrementally (one multiply per order)
//!   and runs its own copy of the recurrence, so a slip in either loop shows
//!   up as a divergence.
//!   [`LegendreTable`] extends this to every (l, m) pair at once, seeding each
//!   diagonal from the previous one; it is the path used when the design
//!   matrix is assembled.
//!
//! Both include the Condon–Shortley phase `(-1)^m`. Agreement within the
//! absolute bound [`AGREEMENT_TOL`] is an invariant enforced by
//! [`check_agreement`] and [`verify_agreement`]; disagreement raises
//! [`HarmonicError::NumericDivergence`]. |P_l^m| grows like (2l-1)!!, so in
//! double precision the absolute bound holds through degree 12; from degree
//! 13 on, rounding alone exceeds it.
//!
//! Recurrence (fixed m):
//! ```text
//! P_{m+1}^m(x) = x (2m+1) P_m^m(x)
//! (l-m) P_l^m(x) = x (2l-1) P_{l-1}^m(x) - (l+m-1) P_{l-2}^m(x)
//! ```
use crate::harmonics::errors::{HarmonicError, HarmonicResult};

/// Maximum tolerated absolute difference |fast − reference|.
pub const AGREEMENT_TOL: f64 = 1e-3;

/// Validate `(l, m, x)` and convert the indices to `usize`.
///
/// # Errors
/// - [`HarmonicError::InvalidDegree`] if `l < 0`.
/// - [`HarmonicError::InvalidOrder`] if `m < 0` or `m > l`.
/// - [`HarmonicError::ArgumentOutOfDomain`] if `x` is NaN or `|x| > 1`.
pub fn validate_legendre_args(l: i32, m: i32, x: f64) -> HarmonicResult<(usize, usize)> {
    if l < 0 {
        return Err(HarmonicError::InvalidDegree { l });
    }
    if m < 0 || m > l {
        return Err(HarmonicError::InvalidOrder { l, m });
    }
    validate_argument(x)?;
    Ok((l as usize, m as usize))
}

pub(crate) fn validate_argument(x: f64) -> HarmonicResult<()> {
    // Written so that NaN fails the comparison.
    if !(x.abs() <= 1.0) {
        return Err(HarmonicError::ArgumentOutOfDomain { x });
    }
    Ok(())
}

/// Reference evaluation of P_l^m(x).
///
/// Slow path kept as the numerical baseline for [`plgndr_fast`].
///
/// # Errors
/// Returns `InvalidArgument`-kind errors for out-of-domain `(l, m, x)`; see
/// [`validate_legendre_args`].
///
/// # Example
/// ```
/// use skymap_harmonics::harmonics::legendre::plgndr_reference;
/// // P_1^1(x) = -sqrt(1 - x²)
/// let p = plgndr_reference(1, 1, 0.5).unwrap();
/// assert!((p + (0.75f64).sqrt()).abs() < 1e-12);
/// ```
pub fn plgndr_reference(l: i32, m: i32, x: f64) -> HarmonicResult<f64> {
    let (l, m) = validate_legendre_args(l, m, x)?;

    let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
    let one_minus_x2 = (1.0 - x) * (1.0 + x);
    let pmm = sign * double_factorial(2 * m as i64 - 1) * one_minus_x2.powf(m as f64 / 2.0);

    // (P_{n-1}^m, P_n^m) pairs, starting from (0, P_m^m).
    let (_, plm) = (m + 1..=l).fold((0.0, pmm), |(below, current), n| {
        let n = n as f64;
        let m = m as f64;
        let next = ((2.0 * n - 1.0) * x * current - (n + m - 1.0) * below) / (n - m);
        (current, next)
    });
    Ok(plm)
}

/// Fast evaluation of P_l^m(x).
///
/// # Errors
/// Same domain checks as [`plgndr_reference`].
pub fn plgndr_fast(l: i32, m: i32, x: f64) -> HarmonicResult<f64> {
    let (l, m) = validate_legendre_args(l, m, x)?;
    Ok(plgndr_unchecked(l, m, x))
}

/// Fast kernel without argument validation; callers guarantee the domain.
pub(crate) fn plgndr_unchecked(l: usize, m: usize, x: f64) -> f64 {
    let mut pmm = 1.0;
    if m > 0 {
        let somx2 = ((1.0 - x) * (1.0 + x)).sqrt();
        let mut fact = 1.0;
        for _ in 0..m {
            pmm *= -fact * somx2;
            fact += 2.0;
        }
    }
    if l == m {
        return pmm;
    }
    let mut p_prev = pmm;
    let mut p_curr = x * (2 * m + 1) as f64 * pmm;
    for ll in (m + 2)..=l {
        let p_next = (x * (2 * ll - 1) as f64 * p_curr - (ll + m - 1) as f64 * p_prev)
            / (ll - m) as f64;
        p_prev = p_curr;
        p_curr = p_next;
    }
    p_curr
}

/// (n)!! as f64; (-1)!! = 0!! = 1.
fn double_factorial(n: i64) -> f64 {
    let mut acc = 1.0;
    let mut k = n;
    while k > 1 {
        acc *= k as f64;
        k -= 2;
    }
    acc
}

/// Evaluate both paths at `(l, m, x)` and fail if they disagree.
///
/// # Returns
/// The absolute difference `|fast − reference|` when it is within `tol`.
///
/// # Errors
/// - Domain errors from [`validate_legendre_args`].
/// - [`HarmonicError::NumericDivergence`] when the difference exceeds `tol`.
pub fn check_agreement(l: i32, m: i32, x: f64, tol: f64) -> HarmonicResult<f64> {
    let reference = plgndr_reference(l, m, x)?;
    let fast = plgndr_fast(l, m, x)?;
    compare(l as usize, m as usize, x, reference, fast, tol)
}

/// Sweep every (l, m) with `l ≤ max_degree` at each `x` in `xs`.
///
/// # Returns
/// The largest observed `|fast − reference|`.
///
/// # Errors
/// The first domain or divergence error encountered.
pub fn verify_agreement(max_degree: usize, xs: &[f64], tol: f64) -> HarmonicResult<f64> {
    let mut worst: f64 = 0.0;
    for &x in xs {
        validate_argument(x)?;
        let table = LegendreTable::new(max_degree, x)?;
        for l in 0..=max_degree {
            for m in 0..=l {
                let reference = plgndr_reference(l as i32, m as i32, x)?;
                let fast = plgndr_unchecked(l, m, x);
                worst = worst.max(compare(l, m, x, reference, fast, tol)?);
                worst = worst.max(compare(l, m, x, reference, table.value(l, m), tol)?);
            }
        }
    }
    Ok(worst)
}

fn compare(l: usize, m: usize, x: f64, reference: f64, fast: f64, tol: f64) -> HarmonicResult<f64> {
    let diff = (fast - reference).abs();
    // NaN on either side counts as divergence.
    if !(diff <= tol) {
        return Err(HarmonicError::NumericDivergence { l, m, x, reference, fast, tol });
    }
    Ok(diff)
}

/// All P_l^m(x) for `0 ≤ m ≤ l ≤ max_degree` at a single argument.
///
/// Values are stored in the triangular order `l(l+1)/2 + m`. The buffer can be
/// refilled for a new argument with [`LegendreTable::fill`] without
/// reallocating.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendreTable {
    max_degree: usize,
    values: Vec<f64>,
}

impl LegendreTable {
    /// Allocate and fill a table at `x`.
    ///
    /// # Errors
    /// [`HarmonicError::ArgumentOutOfDomain`] if `x` is outside [-1, 1].
    pub fn new(max_degree: usize, x: f64) -> HarmonicResult<Self> {
        let len = (max_degree + 1) * (max_degree + 2) / 2;
        let mut table = LegendreTable { max_degree, values: vec![0.0; len] };
        table.fill(x)?;
        Ok(table)
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// P_l^m at the last filled argument.
    ///
    /// # Errors
    /// [`HarmonicError::InvalidSlot`] if `l > max_degree` or `m > l`.
    pub fn get(&self, l: usize, m: usize) -> HarmonicResult<f64> {
        if l > self.max_degree {
            return Err(HarmonicError::InvalidSlot {
                l,
                m,
                reason: "Degree exceeds the table's maximum degree.",
            });
        }
        if m > l {
            return Err(HarmonicError::InvalidSlot { l, m, reason: "Order exceeds degree." });
        }
        Ok(self.values[tri(l, m)])
    }

    /// Unchecked [`get`](Self::get) for loops bounded by `max_degree`.
    #[inline]
    pub(crate) fn value(&self, l: usize, m: usize) -> f64 {
        debug_assert!(m <= l && l <= self.max_degree);
        self.values[tri(l, m)]
    }

    /// Recompute every entry at a new argument `x`.
    ///
    /// # Errors
    /// [`HarmonicError::ArgumentOutOfDomain`] if `x` is outside [-1, 1].
    pub fn fill(&mut self, x: f64) -> HarmonicResult<()> {
        validate_argument(x)?;
        let lmax = self.max_degree;
        let somx2 = ((1.0 - x) * (1.0 + x)).sqrt();
        let v = &mut self.values;

        // Diagonal: P_m^m = -(2m-1) sqrt(1-x²) P_{m-1}^{m-1}
        v[0] = 1.0;
        for m in 1..=lmax {
            v[tri(m, m)] = -((2 * m - 1) as f64) * somx2 * v[tri(m - 1, m - 1)];
        }
        // First sub-diagonal, then the upward recurrence per column.
        for m in 0..lmax {
            v[tri(m + 1, m)] = x * (2 * m + 1) as f64 * v[tri(m, m)];
        }
        for m in 0..=lmax {
            for l in (m + 2)..=lmax {
                v[tri(l, m)] = (x * (2 * l - 1) as f64 * v[tri(l - 1, m)]
                    - (l + m - 1) as f64 * v[tri(l - 2, m)])
                    / (l - m) as f64;
            }
        }
        Ok(())
    }
}

#[inline]
fn tri(l: usize, m: usize) -> usize {
    l * (l + 1) / 2 + m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harmonics::errors::ErrorKind;

    const EPSILON: f64 = 1e-12;

    /// Coefficients of the Legendre polynomial P_l, lowest power first:
    /// `P_l(x) = 2^{-l} Σ_k (-1)^k C(l, k) C(2l-2k, l) x^{l-2k}`.
    fn legendre_polynomial(l: usize) -> Vec<f64> {
        let mut coeffs = vec![0.0; l + 1];
        let scale = 0.5f64.powi(l as i32);
        for k in 0..=l / 2 {
            let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
            coeffs[l - 2 * k] = sign * scale * binomial(l, k) * binomial(2 * l - 2 * k, l);
        }
        coeffs
    }

    fn derivative(coeffs: &[f64]) -> Vec<f64> {
        coeffs.iter().enumerate().skip(1).map(|(k, &c)| k as f64 * c).collect()
    }

    /// C(n, k); every partial product is itself a binomial, so it stays exact.
    fn binomial(n: usize, k: usize) -> f64 {
        (1..=k).fold(1.0, |acc, i| acc * (n - k + i) as f64 / i as f64)
    }

    /// P_l^m(x) from the m-th derivative of the power series of P_l. Shares no
    /// arithmetic with either evaluator.
    fn power_series(l: usize, m: usize, x: f64) -> f64 {
        let mut coeffs = legendre_polynomial(l);
        for _ in 0..m {
            coeffs = derivative(&coeffs);
        }
        let poly = coeffs.iter().rev().fold(0.0, |acc, &c| acc * x + c);
        let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
        sign * ((1.0 - x) * (1.0 + x)).sqrt().powi(m as i32) * poly
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Agreement of the fast and reference evaluators (and the table) on the
    //   historical grid and on a dense grid including the endpoints.
    // - Closed-form values for low orders, and both evaluators against a
    //   recurrence-free power series.
    // - Checked and unchecked table lookups.
    // - Domain rejection for l, m and x.
    // - Detection of disagreement as `NumericDivergence`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Historical cross-check: every l < 10, m ≤ l at x = 0.5.
    //
    // Expect
    // ------
    // - |fast − reference| < 1e-3 for every pair.
    fn fast_matches_reference_at_half() {
        for l in 0..10 {
            for m in 0..=l {
                let reference = plgndr_reference(l, m, 0.5).unwrap();
                let fast = plgndr_fast(l, m, 0.5).unwrap();
                assert!(
                    (reference - fast).abs() < 0.001,
                    "P_{l}^{m}(0.5): reference {reference} vs fast {fast}"
                );
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The sweep helper must pass over the full domain, endpoints included,
    // and report a tiny worst-case difference.
    fn verify_agreement_passes_on_dense_grid() {
        let xs: Vec<f64> = (0..=40).map(|i| -1.0 + i as f64 * 0.05).collect();

        let worst = verify_agreement(9, &xs, AGREEMENT_TOL).unwrap();

        assert!(worst < 1e-6, "worst divergence {worst}");
    }

    #[test]
    fn low_order_closed_forms() {
        let x: f64 = 0.3;
        let s = (1.0 - x * x).sqrt();
        let cases = [
            (0, 0, 1.0),
            (1, 0, x),
            (1, 1, -s),
            (2, 0, 0.5 * (3.0 * x * x - 1.0)),
            (2, 1, -3.0 * x * s),
            (2, 2, 3.0 * (1.0 - x * x)),
            (3, 3, -15.0 * s * s * s),
            (3, 1, -1.5 * (5.0 * x * x - 1.0) * s),
            (4, 0, (35.0 * x.powi(4) - 30.0 * x * x + 3.0) / 8.0),
            (4, 2, 7.5 * (7.0 * x * x - 1.0) * (1.0 - x * x)),
        ];
        for (l, m, expected) in cases {
            let fast = plgndr_fast(l, m, x).unwrap();
            let reference = plgndr_reference(l, m, x).unwrap();
            assert!((fast - expected).abs() < EPSILON, "fast P_{l}^{m} = {fast} != {expected}");
            assert!(
                (reference - expected).abs() < EPSILON,
                "reference P_{l}^{m} = {reference} != {expected}"
            );
        }
    }

    #[test]
    fn legendre_at_endpoints() {
        // P_l(1) = 1, P_l(-1) = (-1)^l, P_l^m(±1) = 0 for m > 0
        for l in 0..8 {
            assert!((plgndr_fast(l, 0, 1.0).unwrap() - 1.0).abs() < EPSILON);
            let expected = if l % 2 == 0 { 1.0 } else { -1.0 };
            assert!((plgndr_fast(l, 0, -1.0).unwrap() - expected).abs() < EPSILON);
            for m in 1..=l {
                assert!(plgndr_fast(l, m, 1.0).unwrap().abs() < EPSILON);
                assert!(plgndr_reference(l, m, -1.0).unwrap().abs() < EPSILON);
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Out-of-domain arguments are rejected by both evaluators, never clamped.
    //
    // Given
    // -----
    // - m > l, l < 0, m < 0, |x| > 1 and NaN.
    //
    // Expect
    // ------
    // - Every call fails with an `InvalidArgument`-kind error.
    fn invalid_arguments_are_rejected() {
        let bad: [(i32, i32, f64); 6] =
            [(2, 3, 0.5), (-1, 0, 0.5), (3, -1, 0.5), (2, 1, 1.5), (2, 1, -1.0001), (2, 1, f64::NAN)];
        for (l, m, x) in bad {
            for result in [plgndr_reference(l, m, x), plgndr_fast(l, m, x)] {
                let err = result.expect_err("out-of-domain input must fail");
                assert_eq!(err.kind(), ErrorKind::InvalidArgument, "({l}, {m}, {x}): {err}");
            }
        }
        assert_eq!(
            plgndr_fast(2, 3, 0.5).unwrap_err(),
            HarmonicError::InvalidOrder { l: 2, m: 3 }
        );
        assert_eq!(plgndr_reference(-1, 0, 0.5).unwrap_err(), HarmonicError::InvalidDegree { l: -1 });
    }

    #[test]
    // Purpose
    // -------
    // A disagreement beyond tolerance must surface as `NumericDivergence`,
    // distinct from bad input.
    //
    // Given
    // -----
    // - Fabricated values differing by 0.01 with a 1e-3 tolerance.
    // - A NaN fast value.
    // - A fast value 100 off a reference of magnitude ~9.4e6 (P_9^9(0.5)).
    //
    // Expect
    // ------
    // - All three comparisons fail with the divergence kind; the bound does
    //   not scale with the magnitude of the reference.
    fn compare_reports_divergence() {
        let err = compare(4, 2, 0.5, 1.0, 1.01, AGREEMENT_TOL).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericDivergence);

        let err = compare(4, 2, 0.5, 1.0, f64::NAN, AGREEMENT_TOL).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NumericDivergence);

        let reference = plgndr_reference(9, 9, 0.5).unwrap();
        assert!(reference.abs() > 9.0e6);
        let err = compare(9, 9, 0.5, reference, reference + 100.0, AGREEMENT_TOL).unwrap_err();
        assert!(matches!(err, HarmonicError::NumericDivergence { l: 9, m: 9, .. }));

        let ok = compare(4, 2, 0.5, 1.0, 1.0005, AGREEMENT_TOL).unwrap();
        assert!((ok - 0.0005).abs() < 1e-12);
    }

    #[test]
    fn check_agreement_forwards_domain_errors() {
        let err = check_agreement(1, 2, 0.0, AGREEMENT_TOL).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(check_agreement(7, 3, -0.4, AGREEMENT_TOL).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // The table must reproduce the single-value fast path exactly after a
    // refill at a new argument.
    fn table_matches_single_evaluations() {
        let mut table = LegendreTable::new(9, 0.2).unwrap();
        for x in [0.2, -0.73, 1.0] {
            table.fill(x).unwrap();
            for l in 0..=9 {
                for m in 0..=l {
                    let single = plgndr_fast(l as i32, m as i32, x).unwrap();
                    let value = table.get(l, m).unwrap();
                    assert!(
                        (value - single).abs() < 1e-10 * single.abs().max(1.0),
                        "table P_{l}^{m}({x}) = {value} vs {single}"
                    );
                }
            }
        }
        assert_eq!(table.max_degree(), 9);
        assert!(table.fill(2.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range table lookups are errors, not panics.
    fn table_rejects_out_of_range_lookups() {
        let table = LegendreTable::new(3, 0.4).unwrap();
        assert!(matches!(table.get(4, 0), Err(HarmonicError::InvalidSlot { l: 4, m: 0, .. })));
        assert!(matches!(table.get(2, 3), Err(HarmonicError::InvalidSlot { l: 2, m: 3, .. })));
        assert_eq!(table.get(3, 3).unwrap(), table.value(3, 3));
    }

    #[test]
    // Purpose
    // -------
    // Both recurrences must match an evaluation that does not use a
    // recurrence at all, so a defect common to both still fails.
    //
    // Given
    // -----
    // - Every l ≤ 9, m ≤ l on a grid over [-1, 1].
    // - P_l^m from differentiating the power series of P_l.
    //
    // Expect
    // ------
    // - Both evaluators within 1e-6 of the power series.
    fn evaluators_match_power_series() {
        assert_eq!(legendre_polynomial(3), vec![0.0, -1.5, 0.0, 2.5]);
        for i in 0..=20 {
            let x = -1.0 + i as f64 * 0.1;
            for l in 0..=9 {
                for m in 0..=l {
                    let expected = power_series(l, m, x);
                    let reference = plgndr_reference(l as i32, m as i32, x).unwrap();
                    let fast = plgndr_fast(l as i32, m as i32, x).unwrap();
                    assert!((reference - expected).abs() < 1e-6, "reference P_{l}^{m}({x})");
                    assert!((fast - expected).abs() < 1e-6, "fast P_{l}^{m}({x})");
                }
            }
        }
    }

    #[test]
    fn double_factorial_values() {
        assert_eq!(double_factorial(-1), 1.0);
        assert_eq!(double_factorial(0), 1.0);
        assert_eq!(double_factorial(5), 15.0);
        assert_eq!(double_factorial(7), 105.0);
    }
}
