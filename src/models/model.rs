//! Pseudo-first-order decay law.
//!
//! `C(t) = C0 * exp(-k * t)`
//!
//! Kept as small, pure functions so the fitter, plots and exports all evaluate
//! the curve the same way.

use std::f64::consts::LN_2;

/// Name used in saved fit files.
pub const MODEL_NAME: &str = "first_order";

/// Predict the concentration at time `t`.
pub fn predict(t: f64, k: f64, c0: f64) -> f64 {
    c0 * (-k * t).exp()
}

/// Half-life `ln(2) / k`.
///
/// Only defined for decay (`k > 0`); a zero or negative rate has no half-life.
pub fn half_life(k: f64) -> Option<f64> {
    (k > 0.0 && k.is_finite()).then(|| LN_2 / k)
}

/// Evaluate the model on `n` evenly spaced times in `[t_min, t_max]`.
pub fn sample_curve(k: f64, c0: f64, t_min: f64, t_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let t = t_min + u * (t_max - t_min);
            (t, predict(t, k, c0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_matches_closed_form() {
        assert_eq!(predict(0.0, 0.3, 10.0), 10.0);
        let c = predict(2.0, 0.5, 10.0);
        assert!((c - 10.0 * (-1.0_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn half_life_defined_only_for_decay() {
        let h = half_life(0.5).unwrap();
        assert!((h - LN_2 / 0.5).abs() < 1e-15);
        assert!(half_life(0.0).is_none());
        assert!(half_life(-0.1).is_none());
    }

    #[test]
    fn concentration_halves_after_half_life() {
        let k = 0.2;
        let h = half_life(k).unwrap();
        assert!((predict(h, k, 8.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn sample_curve_spans_range() {
        let curve = sample_curve(0.1, 5.0, 0.0, 10.0, 11);
        assert_eq!(curve.len(), 11);
        assert_eq!(curve[0], (0.0, 5.0));
        assert!((curve[10].0 - 10.0).abs() < 1e-12);
    }
}
