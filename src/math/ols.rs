//! Least squares through the origin.
//!
//! After log-linearization the first-order model has no intercept:
//!
//! ```text
//! y_i = ln(C_i / C0) = -k * t_i
//! ```
//!
//! so the ordinary least squares estimate of the slope has the closed form
//!
//! ```text
//! slope = Σ x_i y_i / Σ x_i^2
//! ```
//!
//! No iterative solver is involved.

use nalgebra::DVector;

/// Why a slope could not be estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeError {
    /// `Σ x_i^2 = 0`: every `x` is zero.
    ZeroDesign,
    /// `Σ x_i^2` overflowed.
    DesignOverflow,
    /// `Σ x_i y_i` (or the quotient) is not finite.
    NonFiniteSlope,
}

/// Fit `y = slope * x` by ordinary least squares.
pub fn slope_through_origin(x: &DVector<f64>, y: &DVector<f64>) -> Result<f64, SlopeError> {
    debug_assert_eq!(x.len(), y.len());

    let sxx = x.dot(x);
    if sxx == 0.0 {
        return Err(SlopeError::ZeroDesign);
    }
    if !sxx.is_finite() {
        return Err(SlopeError::DesignOverflow);
    }

    let slope = x.dot(y) / sxx;
    if slope.is_finite() {
        Ok(slope)
    } else {
        Err(SlopeError::NonFiniteSlope)
    }
}
