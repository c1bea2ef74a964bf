//! Coefficient vectors tagged with their layout and maximum order.
use ndarray::Array1;

use crate::harmonics::{
    errors::{HarmonicError, HarmonicResult},
    indexing::{BasisLayout, BasisSlot},
};

/// Expansion coefficients, one per basis slot for `l ∈ [0, max_order]`.
///
/// The layout and order travel with the values so a vector is never
/// interpreted with the wrong slot mapping. Length always equals
/// `layout.coefficient_count(max_order)`.
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicCoefficients {
    layout: BasisLayout,
    max_order: usize,
    values: Array1<f64>,
}

impl HarmonicCoefficients {
    /// All-zero coefficients; the default optimizer start.
    pub fn zeros(layout: BasisLayout, max_order: usize) -> Self {
        let values = Array1::zeros(layout.coefficient_count(max_order));
        HarmonicCoefficients { layout, max_order, values }
    }

    /// Wrap `values` for an explicit `(layout, max_order)`.
    ///
    /// # Errors
    /// [`HarmonicError::CoefficientLengthMismatch`] if the length does not
    /// match the layout's count for `max_order`.
    pub fn new(layout: BasisLayout, max_order: usize, values: Array1<f64>) -> HarmonicResult<Self> {
        let expected = layout.coefficient_count(max_order);
        if values.len() != expected {
            return Err(HarmonicError::CoefficientLengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(HarmonicCoefficients { layout, max_order, values })
    }

    /// Wrap `values`, inferring the maximum order from the length.
    ///
    /// # Errors
    /// [`HarmonicError::InvalidCoefficientCount`] if the length is not a
    /// valid count for `layout`.
    pub fn from_values(layout: BasisLayout, values: Array1<f64>) -> HarmonicResult<Self> {
        let max_order = layout.max_order_for(values.len())?;
        Ok(HarmonicCoefficients { layout, max_order, values })
    }

    pub fn layout(&self) -> BasisLayout {
        self.layout
    }

    pub fn max_order(&self) -> usize {
        self.max_order
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn into_values(self) -> Array1<f64> {
        self.values
    }

    /// Coefficient of `slot`.
    ///
    /// # Errors
    /// - Slot errors from [`BasisLayout::slot_index`].
    /// - [`HarmonicError::InvalidSlot`] if `slot.l > max_order`.
    pub fn get(&self, slot: BasisSlot) -> HarmonicResult<f64> {
        if slot.l > self.max_order {
            return Err(HarmonicError::InvalidSlot {
                l: slot.l,
                m: slot.m,
                reason: "Degree exceeds the expansion's maximum order.",
            });
        }
        let index = self.layout.slot_index(slot)?;
        Ok(self.values[index])
    }
}
