//! harmonics::basis — real and complex spherical-harmonic basis functions.
//!
//! Purpose
//! -------
//! Evaluate the basis functions a coefficient vector is expanded in. The real
//! basis is what the fitter uses; the complex harmonic is provided for callers
//! that want the textbook `Y_l^m` directly.
//!
//! Key behaviors
//! -------------
//! - [`basis`] evaluates the cosine slot `(l, m)` at a direction `(θ, φ)`.
//! - [`basis_slot`] evaluates any [`BasisSlot`], including sine slots.
//! - [`spherical_complex`] evaluates `Y_l^m(θ, φ)` for `-l ≤ m ≤ l`.
//! - [`HarmonicBasis`] caches the slot list and scale factors for one
//!   `(layout, max_order)` pair and evaluates every slot at a direction from a
//!   single [`LegendreTable`] sweep.
//!
//! Conventions
//! -----------
//! ```text
//! N(l, m)        = sqrt((2l+1)/(4π) · (l−m)!/(l+m)!)
//! cos slot, m=0  = N(l,0) P_l^0(cos θ)
//! cos slot, m>0  = √2 N(l,m) P_l^m(cos θ) cos(mφ)
//! sin slot, m>0  = √2 N(l,m) P_l^m(cos θ) sin(mφ)
//! Y_l^m          = N(l,|m|) P_l^|m|(cos θ) e^{i m φ},  Y_l^{-m} = (-1)^m conj(Y_l^m)
//! ```
//! P_l^m carries the Condon–Shortley phase, so the real slots equal
//! `√2 Re Y_l^m` and `√2 Im Y_l^m` for `m > 0`. With these factors the real
//! basis is orthonormal on the unit sphere.
//!
//! Invariants & assumptions
//! ------------------------
//! - θ is the polar angle and φ the azimuth, both in radians. θ is not
//!   range-checked; only `cos θ` is validated (so a NaN θ is rejected).
//! - A non-finite φ yields a NaN value; point validation in the fitting layer
//!   rejects such inputs before they reach this module.
use std::f64::consts::{PI, SQRT_2};

use ndarray::Array1;
use num_complex::Complex64;

use crate::harmonics::{
    errors::{HarmonicError, HarmonicResult},
    indexing::{BasisLayout, BasisSlot, Parity},
    legendre::{LegendreTable, plgndr_unchecked, validate_argument, validate_legendre_args},
};

/// Orthonormalization constant `N(l, m)`.
///
/// The factorial ratio is accumulated in log space so it stays finite for
/// large `l + m`. Panics in debug builds if `m > l`.
pub fn normalization(l: usize, m: usize) -> f64 {
    debug_assert!(m <= l);
    let mut log_ratio = 0.0;
    for k in (l - m + 1)..=(l + m) {
        log_ratio -= (k as f64).ln();
    }
    ((2 * l + 1) as f64 / (4.0 * PI) * log_ratio.exp()).sqrt()
}

/// Scale applied to `P_l^m(cos θ) · trig(mφ)` for a real slot.
fn slot_scale(l: usize, m: usize) -> f64 {
    if m == 0 { normalization(l, 0) } else { SQRT_2 * normalization(l, m) }
}

/// Real cosine basis function for `(l, m)` at `(θ, φ)`.
///
/// # Errors
/// - [`HarmonicError::InvalidDegree`] / [`HarmonicError::InvalidOrder`] for
///   `l < 0`, `m < 0` or `m > l`.
/// - [`HarmonicError::ArgumentOutOfDomain`] if `cos θ` is NaN.
///
/// # Example
/// ```
/// use skymap_harmonics::harmonics::basis::basis;
/// let y00 = basis(0, 0, 0.3, 1.2).unwrap();
/// assert!((y00 - 0.5 / std::f64::consts::PI.sqrt()).abs() < 1e-12);
/// ```
pub fn basis(l: i32, m: i32, theta: f64, phi: f64) -> HarmonicResult<f64> {
    let (l, m) = validate_legendre_args(l, m, theta.cos())?;
    Ok(real_slot_value(BasisSlot::cos(l, m), theta, phi))
}

/// Real basis function for an arbitrary slot.
///
/// # Errors
/// - [`HarmonicError::InvalidOrder`] if `slot.m > slot.l`.
/// - [`HarmonicError::InvalidSlot`] for a sine slot with `m = 0`.
/// - [`HarmonicError::ArgumentOutOfDomain`] if `cos θ` is NaN.
pub fn basis_slot(slot: BasisSlot, theta: f64, phi: f64) -> HarmonicResult<f64> {
    if slot.m > slot.l {
        return Err(HarmonicError::InvalidOrder { l: slot.l as i32, m: slot.m as i32 });
    }
    if slot.parity == Parity::Sin && slot.m == 0 {
        return Err(HarmonicError::InvalidSlot {
            l: slot.l,
            m: slot.m,
            reason: "sin(0·φ) vanishes; m = 0 has only a cosine slot.",
        });
    }
    validate_argument(theta.cos())?;
    Ok(real_slot_value(slot, theta, phi))
}

fn real_slot_value(slot: BasisSlot, theta: f64, phi: f64) -> f64 {
    let BasisSlot { l, m, parity } = slot;
    let p = plgndr_unchecked(l, m, theta.cos());
    let trig = match parity {
        Parity::Cos => (m as f64 * phi).cos(),
        Parity::Sin => (m as f64 * phi).sin(),
    };
    slot_scale(l, m) * p * trig
}

/// Complex spherical harmonic `Y_l^m(θ, φ)` for `-l ≤ m ≤ l`.
///
/// # Errors
/// - [`HarmonicError::InvalidDegree`] if `l < 0`.
/// - [`HarmonicError::InvalidOrder`] if `|m| > l`.
/// - [`HarmonicError::ArgumentOutOfDomain`] if `cos θ` is NaN.
pub fn spherical_complex(l: i32, m: i32, theta: f64, phi: f64) -> HarmonicResult<Complex64> {
    if l < 0 {
        return Err(HarmonicError::InvalidDegree { l });
    }
    if m.unsigned_abs() > l as u32 {
        return Err(HarmonicError::InvalidOrder { l, m });
    }
    let (lu, mu) = validate_legendre_args(l, m.unsigned_abs() as i32, theta.cos())?;
    let magnitude = normalization(lu, mu) * plgndr_unchecked(lu, mu, theta.cos());
    let positive = Complex64::from_polar(1.0, mu as f64 * phi) * magnitude;
    if m >= 0 {
        Ok(positive)
    } else if mu % 2 == 0 {
        Ok(positive.conj())
    } else {
        Ok(-positive.conj())
    }
}

/// Every real basis function of one `(layout, max_order)` expansion.
///
/// Evaluation fills the whole Legendre triangle once per direction and then
/// combines it with `cos(mφ)`/`sin(mφ)` for each slot, so the cost per
/// direction is O(L²) regardless of layout.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicBasis {
    layout: BasisLayout,
    max_order: usize,
    slots: Vec<BasisSlot>,
    scales: Vec<f64>,
}

impl HarmonicBasis {
    pub fn new(layout: BasisLayout, max_order: usize) -> Self {
        let slots = layout.slots(max_order);
        let scales = slots.iter().map(|s| slot_scale(s.l, s.m)).collect();
        HarmonicBasis { layout, max_order, slots, scales }
    }

    /// Like [`HarmonicBasis::new`] for a caller-supplied signed order.
    ///
    /// # Errors
    /// [`HarmonicError::NegativeMaxOrder`] if `max_order < 0`.
    pub fn with_order(layout: BasisLayout, max_order: i32) -> HarmonicResult<Self> {
        if max_order < 0 {
            return Err(HarmonicError::NegativeMaxOrder { max_order });
        }
        Ok(Self::new(layout, max_order as usize))
    }

    pub fn layout(&self) -> BasisLayout {
        self.layout
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Number of slots, i.e. the coefficient vector length.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[BasisSlot] {
        &self.slots
    }

    /// Write every slot's value at `(θ, φ)` into `out`, in storage order.
    ///
    /// # Errors
    /// - [`HarmonicError::CoefficientLengthMismatch`] if `out.len() != self.len()`.
    /// - [`HarmonicError::ArgumentOutOfDomain`] if `cos θ` is NaN.
    pub fn evaluate_into(&self, theta: f64, phi: f64, out: &mut [f64]) -> HarmonicResult<()> {
        if out.len() != self.len() {
            return Err(HarmonicError::CoefficientLengthMismatch {
                expected: self.len(),
                actual: out.len(),
            });
        }
        let table = LegendreTable::new(self.max_order, theta.cos())?;
        let (cos_m, sin_m): (Vec<f64>, Vec<f64>) =
            (0..=self.max_order).map(|m| (m as f64 * phi).sin_cos()).map(|(s, c)| (c, s)).unzip();

        for ((value, slot), scale) in out.iter_mut().zip(&self.slots).zip(&self.scales) {
            let trig = match slot.parity {
                Parity::Cos => cos_m[slot.m],
                Parity::Sin => sin_m[slot.m],
            };
            *value = scale * table.value(slot.l, slot.m) * trig;
        }
        Ok(())
    }

    /// Allocating form of [`HarmonicBasis::evaluate_into`].
    pub fn evaluate(&self, theta: f64, phi: f64) -> HarmonicResult<Array1<f64>> {
        let mut out = vec![0.0; self.len()];
        self.evaluate_into(theta, phi, &mut out)?;
        Ok(Array1::from(out))
    }
}
