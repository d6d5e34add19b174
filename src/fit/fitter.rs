//! First-order fit by log-linear least squares.
//!
//! Given observations `(t_i, C_i)` and an initial concentration `C0`:
//!
//! - transform to `y_i = ln(C_i / C0)`, which is linear in time: `y = -k t`
//! - regress `y` on `t` through the origin: `k = -Σ t_i y_i / Σ t_i^2`
//! - evaluate fit quality on the original concentration scale
//!
//! The whole computation is closed form and O(n). Nothing here logs, retries or
//! substitutes defaults; failures are returned to the caller.

use nalgebra::DVector;

use crate::domain::{FitResult, Observation};
use crate::error::FitError;
use crate::fit::validation::{validate_c0, validate_observations};
use crate::math::{SlopeError, r_squared, rmse, slope_through_origin};
use crate::models::{half_life, predict};

/// Fit the pseudo-first-order law `C(t) = C0 * exp(-k t)`.
///
/// # Errors
/// - [`FitError::InvalidInput`] for fewer than two points, a negative time, a
///   concentration `<= 0`, or `C0 <= 0`.
/// - [`FitError::DegenerateFit`] when every time is identical (zero time
///   variance, which includes the all-zero case), when every concentration is
///   identical (R² is undefined), or when the log-linear sums leave the `f64`
///   range.
///
/// A negative `k` (concentration growth) is returned as-is.
pub fn fit(observations: &[Observation], c0: f64) -> Result<FitResult, FitError> {
    validate_observations(observations)?;
    validate_c0(c0)?;

    let t0 = observations[0].time;
    if observations.iter().all(|o| o.time == t0) {
        return Err(if t0 == 0.0 {
            FitError::degenerate("all observation times are zero")
        } else {
            FitError::degenerate(format!("all observation times are identical (t = {t0})"))
        });
    }

    let n = observations.len();
    let t = DVector::from_iterator(n, observations.iter().map(|o| o.time));
    let c = DVector::from_iterator(n, observations.iter().map(|o| o.concentration));
    let y = c.map(|ci| (ci / c0).ln());

    let slope = slope_through_origin(&t, &y).map_err(|e| match e {
        SlopeError::ZeroDesign => FitError::degenerate("all observation times are zero"),
        SlopeError::DesignOverflow => FitError::degenerate("sum of squared times overflows"),
        SlopeError::NonFiniteSlope => {
            FitError::degenerate("ln(C / C0) is not finite for these concentrations")
        }
    })?;
    // Avoid reporting -0.0 when the data carries no decay signal.
    let k = if slope == 0.0 { 0.0 } else { -slope };

    let predicted = t.map(|ti| predict(ti, k, c0));
    let r_squared = r_squared(&c, &predicted).ok_or_else(|| {
        FitError::degenerate("all observed concentrations are identical (R² is undefined)")
    })?;
    let rmse = rmse(&c, &predicted);

    Ok(FitResult {
        k,
        r_squared,
        rmse,
        half_life: half_life(k),
        c0,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::LN_2;

    fn obs(pairs: &[(f64, f64)]) -> Vec<Observation> {
        pairs.iter().map(|&(t, c)| Observation::new(t, c)).collect()
    }

    #[test]
    fn recovers_rate_from_noiseless_data() {
        let k_true = 0.35;
        let c0 = 12.0;
        let data: Vec<Observation> = [0.0, 0.5, 1.5, 3.0, 6.0]
            .iter()
            .map(|&t| Observation::new(t, predict(t, k_true, c0)))
            .collect();

        let fit = fit(&data, c0).unwrap();
        assert_relative_eq!(fit.k, k_true, epsilon = 1e-12);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-12);
        assert!(fit.rmse < 1e-12);
        assert_eq!(fit.n, 5);
    }

    #[test]
    fn worked_example() {
        let data = obs(&[(0.0, 10.0), (1.0, 6.07), (2.0, 3.68), (3.0, 2.23)]);
        let fit = fit(&data, 10.0).unwrap();
        assert_relative_eq!(fit.k, 0.5, epsilon = 1e-3);
        assert_relative_eq!(fit.half_life.unwrap(), 1.386, epsilon = 1e-2);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-2);
    }

    #[test]
    fn half_life_is_ln2_over_k() {
        let data = obs(&[(0.0, 10.0), (2.0, 7.0), (4.0, 5.1), (8.0, 2.4)]);
        let fit = fit(&data, 10.0).unwrap();
        assert!(fit.k > 0.0);
        assert_eq!(fit.half_life, Some(LN_2 / fit.k));
    }

    #[test]
    fn growth_keeps_negative_rate() {
        let data = obs(&[(0.0, 10.0), (1.0, 11.0), (2.0, 12.5)]);
        let fit = fit(&data, 10.0).unwrap();
        assert!(fit.k < 0.0);
        assert!(fit.half_life.is_none());
    }

    #[test]
    fn zero_rate_is_valid_without_half_life() {
        // Only the t = 0 row departs from C0, so Σ t y = 0.
        let data = obs(&[(0.0, 5.0), (2.0, 10.0), (3.0, 10.0)]);
        let fit = fit(&data, 10.0).unwrap();
        assert_eq!(fit.k, 0.0);
        assert!(fit.half_life.is_none());
    }

    #[test]
    fn too_few_points_is_invalid() {
        let err = fit(&obs(&[(1.0, 5.0)]), 10.0).unwrap_err();
        assert!(matches!(err, FitError::InvalidInput { .. }));
        let err = fit(&[], 10.0).unwrap_err();
        assert!(matches!(err, FitError::InvalidInput { .. }));
    }

    #[test]
    fn non_positive_values_are_invalid() {
        let data = obs(&[(0.0, 10.0), (1.0, 0.0)]);
        assert!(matches!(fit(&data, 10.0), Err(FitError::InvalidInput { .. })));

        let data = obs(&[(0.0, 10.0), (1.0, 5.0)]);
        assert!(matches!(fit(&data, 0.0), Err(FitError::InvalidInput { .. })));
        assert!(matches!(fit(&data, -3.0), Err(FitError::InvalidInput { .. })));

        let data = obs(&[(-1.0, 10.0), (1.0, 5.0)]);
        assert!(matches!(fit(&data, 10.0), Err(FitError::InvalidInput { .. })));
    }

    #[test]
    fn all_zero_times_are_degenerate() {
        let data = obs(&[(0.0, 10.0), (0.0, 9.0), (0.0, 8.0)]);
        assert!(matches!(fit(&data, 10.0), Err(FitError::DegenerateFit { .. })));
    }

    #[test]
    fn identical_nonzero_times_are_degenerate() {
        let data = obs(&[(5.0, 4.0), (5.0, 3.0), (5.0, 2.0)]);
        let err = fit(&data, 10.0).unwrap_err();
        assert!(matches!(&err, FitError::DegenerateFit { reason } if reason.contains("identical")));
    }

    #[test]
    fn underflowing_ratio_is_not_reported_as_zero_times() {
        // 1e-300 / 1e300 underflows to 0, so ln(C / C0) is -inf.
        let data = obs(&[(1.0, 1e-300), (2.0, 2e-300)]);
        let err = fit(&data, 1e300).unwrap_err();
        match err {
            FitError::DegenerateFit { reason } => {
                assert!(reason.contains("not finite"));
                assert!(!reason.contains("zero"));
            }
            other => panic!("expected DegenerateFit, got {other:?}"),
        }
    }

    #[test]
    fn identical_concentrations_are_degenerate() {
        let data = obs(&[(1.0, 5.0), (2.0, 5.0), (3.0, 5.0)]);
        assert!(matches!(fit(&data, 10.0), Err(FitError::DegenerateFit { .. })));
    }

    #[test]
    fn fit_is_deterministic() {
        let data = obs(&[(0.0, 10.0), (5.0, 8.5), (10.0, 7.2), (15.0, 6.1)]);
        assert_eq!(fit(&data, 10.0), fit(&data, 10.0));
    }
}
