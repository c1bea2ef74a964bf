//! Weighted angular measurements.
use crate::harmonics::errors::{HarmonicError, HarmonicResult};

/// One measurement at a direction on the sphere.
///
/// - `theta`: polar angle in radians (conceptually `[0, π]`, not enforced).
/// - `phi`: azimuth in radians.
/// - `value`: observed quantity.
/// - `weight`: non-negative multiplier of the residual; `0` drops the point
///   from the objective without being an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub theta: f64,
    pub phi: f64,
    pub value: f64,
    pub weight: f64,
}

impl Point {
    pub fn new(theta: f64, phi: f64, value: f64, weight: f64) -> Self {
        Point { theta, phi, value, weight }
    }

    /// Build a point from sky-map coordinates in degrees: zenith angle and
    /// azimuth.
    pub fn from_degrees(zenith_deg: f64, azimuth_deg: f64, value: f64, weight: f64) -> Self {
        Point::new(zenith_deg.to_radians(), azimuth_deg.to_radians(), value, weight)
    }
}

/// Check every point before it reaches the objective.
///
/// # Errors
/// - [`HarmonicError::NonFinitePoint`] for the first NaN or infinite field.
/// - [`HarmonicError::NegativeWeight`] for the first negative weight.
pub fn validate_points(points: &[Point]) -> HarmonicResult<()> {
    for (index, p) in points.iter().enumerate() {
        for (field, value) in
            [("theta", p.theta), ("phi", p.phi), ("value", p.value), ("weight", p.weight)]
        {
            if !value.is_finite() {
                return Err(HarmonicError::NonFinitePoint { index, field, value });
            }
        }
        if p.weight < 0.0 {
            return Err(HarmonicError::NegativeWeight { index, weight: p.weight });
        }
    }
    Ok(())
}
