//! harmonics::indexing — coefficient slot layout for truncated expansions.
//!
//! Purpose
//! -------
//! Fix, once and for all, which basis function each position of a coefficient
//! vector refers to. Every other module (basis evaluation, design-matrix
//! assembly, coefficient accessors, Python getters) goes through the mapping
//! defined here instead of re-deriving offsets.
//!
//! Key behaviors
//! -------------
//! - [`BasisLayout::Cosine`] stores one real coefficient per `(l, m)` with
//!   `0 ≤ m ≤ l`, using the `cos(mφ)` basis only.
//! - [`BasisLayout::Full`] adds a `sin(mφ)` companion for every `m > 0`, which
//!   gives the complete real basis of dimension `(L+1)²`.
//! - [`BasisLayout::slot_index`] and [`BasisLayout::slot_at`] form an explicit
//!   bijection between [`BasisSlot`] values and vector positions.
//!
//! Conventions
//! -----------
//! ```text
//! Cosine:  index(l, m)       = l(l+1)/2 + m
//! Full:    index(l, 0)       = l²
//!          index(l, m, cos)  = l² + 2m − 1      (m > 0)
//!          index(l, m, sin)  = l² + 2m          (m > 0)
//! ```
//! Slots are ordered by degree first, so a vector for order `L` is a prefix of
//! the vector for order `L + 1` in both layouts.
//!
//! Testing notes
//! -------------
//! - Unit tests check the bijection in both directions, the counts, and the
//!   rejection of slots that do not exist in a layout.
use std::str::FromStr;

use crate::harmonics::errors::{HarmonicError, HarmonicResult};

/// Which trigonometric factor in φ a slot carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parity {
    Cos,
    Sin,
}

/// One real basis function `(l, m, parity)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BasisSlot {
    pub l: usize,
    pub m: usize,
    pub parity: Parity,
}

impl BasisSlot {
    /// Cosine slot `(l, m)`.
    pub fn cos(l: usize, m: usize) -> Self {
        BasisSlot { l, m, parity: Parity::Cos }
    }

    /// Sine slot `(l, m)`. Only meaningful for `m > 0` in the full layout.
    pub fn sin(l: usize, m: usize) -> Self {
        BasisSlot { l, m, parity: Parity::Sin }
    }
}

/// Coefficient vector layout.
///
/// Parsing accepts case-insensitive `"cosine"`/`"cos"` and `"full"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasisLayout {
    #[default]
    Cosine,
    Full,
}

impl FromStr for BasisLayout {
    type Err = HarmonicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" | "cos" => Ok(BasisLayout::Cosine),
            "full" => Ok(BasisLayout::Full),
            _ => Err(HarmonicError::InvalidLayout { name: s.to_string() }),
        }
    }
}

impl BasisLayout {
    /// Number of coefficients for expansions up to degree `max_order`.
    pub fn coefficient_count(self, max_order: usize) -> usize {
        match self {
            BasisLayout::Cosine => (max_order + 1) * (max_order + 2) / 2,
            BasisLayout::Full => (max_order + 1) * (max_order + 1),
        }
    }

    /// Inverse of [`BasisLayout::coefficient_count`].
    ///
    /// # Errors
    /// [`HarmonicError::InvalidCoefficientCount`] if `len` is not the count of
    /// any order (including `len == 0`).
    pub fn max_order_for(self, len: usize) -> HarmonicResult<usize> {
        let mut order = 0;
        loop {
            let count = self.coefficient_count(order);
            if count == len {
                return Ok(order);
            }
            if count > len {
                return Err(HarmonicError::InvalidCoefficientCount {
                    len,
                    reason: match self {
                        BasisLayout::Cosine => {
                            "Cosine layout needs (L+1)(L+2)/2 coefficients for some L ≥ 0."
                        }
                        BasisLayout::Full => "Full layout needs (L+1)² coefficients for some L ≥ 0.",
                    },
                });
            }
            order += 1;
        }
    }

    /// Position of `slot` in a coefficient vector of this layout.
    ///
    /// # Errors
    /// - [`HarmonicError::InvalidOrder`] if `slot.m > slot.l`.
    /// - [`HarmonicError::InvalidSlot`] for a sine slot with `m = 0` or any
    ///   sine slot in the cosine layout.
    pub fn slot_index(self, slot: BasisSlot) -> HarmonicResult<usize> {
        let BasisSlot { l, m, parity } = slot;
        if m > l {
            return Err(HarmonicError::InvalidOrder { l: l as i32, m: m as i32 });
        }
        match (self, parity) {
            (BasisLayout::Cosine, Parity::Cos) => Ok(l * (l + 1) / 2 + m),
            (BasisLayout::Cosine, Parity::Sin) => Err(HarmonicError::InvalidSlot {
                l,
                m,
                reason: "The cosine layout has no sine slots.",
            }),
            (BasisLayout::Full, Parity::Cos) if m == 0 => Ok(l * l),
            (BasisLayout::Full, Parity::Cos) => Ok(l * l + 2 * m - 1),
            (BasisLayout::Full, Parity::Sin) if m == 0 => Err(HarmonicError::InvalidSlot {
                l,
                m,
                reason: "sin(0·φ) vanishes; m = 0 has only a cosine slot.",
            }),
            (BasisLayout::Full, Parity::Sin) => Ok(l * l + 2 * m),
        }
    }

    /// Slot stored at `index`. Every index maps to a slot since the sequence
    /// of slots is unbounded in `l`.
    pub fn slot_at(self, index: usize) -> BasisSlot {
        match self {
            BasisLayout::Cosine => {
                let mut l = 0;
                while (l + 1) * (l + 2) / 2 <= index {
                    l += 1;
                }
                BasisSlot::cos(l, index - l * (l + 1) / 2)
            }
            BasisLayout::Full => {
                let mut l = 0;
                while (l + 1) * (l + 1) <= index {
                    l += 1;
                }
                let r = index - l * l;
                if r == 0 {
                    BasisSlot::cos(l, 0)
                } else if r % 2 == 1 {
                    BasisSlot::cos(l, r.div_ceil(2))
                } else {
                    BasisSlot::sin(l, r / 2)
                }
            }
        }
    }

    /// All slots up to `max_order`, in storage order.
    pub fn slots(self, max_order: usize) -> Vec<BasisSlot> {
        (0..self.coefficient_count(max_order)).map(|i| self.slot_at(i)).collect()
    }
}
