//! Goodness-of-fit statistics on paired observed/predicted vectors.

use nalgebra::DVector;

/// Sum of squared residuals `Σ (obs - pred)^2`.
pub fn sse(observed: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    (observed - predicted).norm_squared()
}

/// Root-mean-square error `sqrt(SSE / n)`.
pub fn rmse(observed: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    if observed.is_empty() {
        return f64::NAN;
    }
    (sse(observed, predicted) / observed.len() as f64).sqrt()
}

/// Mean absolute error.
pub fn mae(observed: &DVector<f64>, predicted: &DVector<f64>) -> f64 {
    if observed.is_empty() {
        return f64::NAN;
    }
    (observed - predicted).map(f64::abs).sum() / observed.len() as f64
}

/// Total sum of squares around the mean, `Σ (obs - mean)^2`.
pub fn total_sum_of_squares(observed: &DVector<f64>) -> f64 {
    if observed.is_empty() {
        return 0.0;
    }
    let mean = observed.mean();
    observed.map(|v| v - mean).norm_squared()
}

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// Returns `None` when `SS_tot = 0` (all observed values identical), where R²
/// is undefined. The value is not clamped; a poor fit can be negative.
pub fn r_squared(observed: &DVector<f64>, predicted: &DVector<f64>) -> Option<f64> {
    let ss_tot = total_sum_of_squares(observed);
    if ss_tot == 0.0 {
        return None;
    }
    Some(1.0 - sse(observed, predicted) / ss_tot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction() {
        let obs = DVector::from_row_slice(&[3.0, 2.0, 1.0]);
        assert_eq!(sse(&obs, &obs), 0.0);
        assert_eq!(rmse(&obs, &obs), 0.0);
        assert_eq!(r_squared(&obs, &obs), Some(1.0));
    }

    #[test]
    fn known_residuals() {
        let obs = DVector::from_row_slice(&[1.0, 2.0, 3.0, 4.0]);
        let pred = DVector::from_row_slice(&[1.0, 3.0, 3.0, 2.0]);
        // residuals: 0, -1, 0, 2
        assert!((sse(&obs, &pred) - 5.0).abs() < 1e-12);
        assert!((rmse(&obs, &pred) - (5.0_f64 / 4.0).sqrt()).abs() < 1e-12);
        assert!((mae(&obs, &pred) - 0.75).abs() < 1e-12);
        // SS_tot = 2.25 + 0.25 + 0.25 + 2.25 = 5
        assert!(r_squared(&obs, &pred).unwrap().abs() < 1e-12);
    }

    #[test]
    fn r_squared_can_be_negative() {
        let obs = DVector::from_row_slice(&[1.0, 2.0]);
        let pred = DVector::from_row_slice(&[5.0, 5.0]);
        assert!(r_squared(&obs, &pred).unwrap() < 0.0);
    }

    #[test]
    fn r_squared_undefined_for_constant_data() {
        let obs = DVector::from_row_slice(&[4.0, 4.0, 4.0]);
        let pred = DVector::from_row_slice(&[3.0, 4.0, 5.0]);
        assert!(r_squared(&obs, &pred).is_none());
    }
}
