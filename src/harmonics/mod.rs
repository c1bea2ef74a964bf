//! harmonics — Legendre functions, spherical-harmonic bases, and coefficient
//! layout.
//!
//! Purpose
//! -------
//! Hold every pure numerical building block the fitter needs: associated
//! Legendre evaluation (with its cross-validated reference path), the real and
//! complex spherical-harmonic basis, the slot layout of coefficient vectors,
//! and the crate's error type.
//!
//! Key behaviors
//! -------------
//! - [`legendre`]: reference vs fast `P_l^m(x)` plus the all-orders table.
//! - [`basis`]: `N(l,m) P_l^m(cos θ) trig(mφ)` and `Y_l^m`.
//! - [`indexing`]: the slot ↔ index bijection for both layouts.
//! - [`coefficients`]: layout-tagged coefficient vectors.
//! - [`errors`]: [`HarmonicError`] and its [`ErrorKind`] taxonomy.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything here is a pure function of its inputs; no module holds shared
//!   mutable state, so all types are `Send + Sync`.
//! - Out-of-domain inputs are rejected with `InvalidArgument`-kind errors,
//!   never clamped.

pub mod basis;
pub mod coefficients;
pub mod errors;
pub mod indexing;
pub mod legendre;

pub use self::basis::{HarmonicBasis, basis, basis_slot, normalization, spherical_complex};
pub use self::coefficients::HarmonicCoefficients;
pub use self::errors::{ErrorKind, HarmonicError, HarmonicResult};
pub use self::indexing::{BasisLayout, BasisSlot, Parity};
pub use self::legendre::{
    AGREEMENT_TOL, LegendreTable, check_agreement, plgndr_fast, plgndr_reference,
    verify_agreement,
};
