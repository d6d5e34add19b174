//! Synthetic first-order degradation data.
//!
//! Points are generated as `C_i = C0 * exp(-k t_i) + ε_i` with Gaussian noise
//! `ε_i ~ N(0, noise_sd)` on evenly spaced times `t_i ∈ [0, t_max]`.
//! A fixed seed makes the output reproducible.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Observation;
use crate::error::AppError;
use crate::models::predict;

/// Smallest concentration emitted; noise can otherwise push late points to
/// zero or below, which the log-linear fit rejects.
const MIN_CONCENTRATION: f64 = 1e-6;

/// Settings for the synthetic generator.
#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub k: f64,
    pub c0: f64,
    pub t_max: f64,
    pub points: usize,
    /// Standard deviation of the additive noise (concentration units).
    pub noise_sd: f64,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            k: 0.2,
            c0: 10.0,
            t_max: 10.0,
            points: 11,
            noise_sd: 0.1,
            seed: 42,
        }
    }
}

/// Generate a noisy first-order decay series.
pub fn generate_sample(spec: &SampleSpec) -> Result<Vec<Observation>, AppError> {
    if spec.points < 2 {
        return Err(AppError::new(2, "Sample needs at least 2 points."));
    }
    if !(spec.t_max.is_finite() && spec.t_max > 0.0) {
        return Err(AppError::new(2, "Sample t-max must be finite and > 0."));
    }
    if !(spec.c0.is_finite() && spec.c0 > 0.0) {
        return Err(AppError::new(2, "Sample C0 must be finite and > 0."));
    }
    if !spec.k.is_finite() {
        return Err(AppError::new(2, "Sample rate constant must be finite."));
    }
    // `Normal::new` accepts a negative standard deviation.
    if !(spec.noise_sd.is_finite() && spec.noise_sd >= 0.0) {
        return Err(AppError::new(2, "Sample noise must be finite and >= 0."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.noise_sd)
        .map_err(|e| AppError::new(2, format!("Noise distribution error: {e}")))?;

    let step = spec.t_max / (spec.points as f64 - 1.0);
    let out = (0..spec.points)
        .map(|i| {
            let t = i as f64 * step;
            let c = predict(t, spec.k, spec.c0) + normal.sample(&mut rng);
            Observation::new(t, c.max(MIN_CONCENTRATION))
        })
        .collect();

    Ok(out)
}

/// Demonstration data set: time in minutes, concentration in mg/L.
pub fn default_observations() -> Vec<Observation> {
    const TIME: [f64; 8] = [0.0, 5.0, 10.0, 15.0, 20.0, 30.0, 45.0, 60.0];
    const CONC: [f64; 8] = [10.0, 8.5, 7.2, 6.1, 5.2, 4.1, 3.3, 2.7];
    TIME.iter()
        .zip(CONC.iter())
        .map(|(&t, &c)| Observation::new(t, c))
        .collect()
}

/// Initial concentration paired with [`default_observations`].
pub const DEFAULT_C0: f64 = 10.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noiseless_sample_matches_model() {
        let spec = SampleSpec {
            noise_sd: 0.0,
            ..SampleSpec::default()
        };
        let data = generate_sample(&spec).unwrap();
        assert_eq!(data.len(), 11);
        for o in &data {
            assert!((o.concentration - predict(o.time, spec.k, spec.c0)).abs() < 1e-12);
        }
        assert_eq!(data[0].time, 0.0);
        assert!((data[10].time - 10.0).abs() < 1e-12);
    }

    #[test]
    fn same_seed_same_data() {
        let spec = SampleSpec::default();
        assert_eq!(generate_sample(&spec).unwrap(), generate_sample(&spec).unwrap());

        let other = SampleSpec { seed: 7, ..SampleSpec::default() };
        assert_ne!(generate_sample(&spec).unwrap(), generate_sample(&other).unwrap());
    }

    #[test]
    fn concentrations_stay_positive_under_heavy_noise() {
        let spec = SampleSpec {
            noise_sd: 50.0,
            ..SampleSpec::default()
        };
        let data = generate_sample(&spec).unwrap();
        assert!(data.iter().all(|o| o.concentration > 0.0));
    }

    #[test]
    fn rejects_bad_settings() {
        assert!(generate_sample(&SampleSpec { points: 1, ..SampleSpec::default() }).is_err());
        let err = generate_sample(&SampleSpec { noise_sd: -1.0, ..SampleSpec::default() }).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(generate_sample(&SampleSpec { noise_sd: f64::NAN, ..SampleSpec::default() }).is_err());
        assert!(generate_sample(&SampleSpec { c0: 0.0, ..SampleSpec::default() }).is_err());
    }

    #[test]
    fn default_data_is_time_ordered() {
        let data = default_observations();
        assert!(data.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(data[0].concentration, DEFAULT_C0);
    }
}
