//! Input checks shared by the fitter and the ingest layer.

use crate::domain::{C0Source, Observation};
use crate::error::FitError;

/// Minimum number of observations for a fit.
pub const MIN_OBSERVATIONS: usize = 2;

/// Check an observation sequence for the first-order fit.
///
/// Rejects:
/// - fewer than [`MIN_OBSERVATIONS`] points
/// - negative or non-finite times
/// - zero, negative or non-finite concentrations (the log-transform needs `C > 0`)
pub fn validate_observations(observations: &[Observation]) -> Result<(), FitError> {
    if observations.len() < MIN_OBSERVATIONS {
        return Err(FitError::invalid(format!(
            "at least {MIN_OBSERVATIONS} observations are required, got {}",
            observations.len()
        )));
    }

    for (idx, obs) in observations.iter().enumerate() {
        if !obs.time.is_finite() || obs.time < 0.0 {
            return Err(FitError::invalid(format!(
                "observation {}: time must be finite and >= 0, got {}",
                idx + 1,
                obs.time
            )));
        }
        if !obs.concentration.is_finite() || obs.concentration <= 0.0 {
            return Err(FitError::invalid(format!(
                "observation {}: concentration must be finite and > 0, got {}",
                idx + 1,
                obs.concentration
            )));
        }
    }

    Ok(())
}

/// Check the initial concentration.
pub fn validate_c0(c0: f64) -> Result<(), FitError> {
    if !c0.is_finite() || c0 <= 0.0 {
        return Err(FitError::invalid(format!(
            "initial concentration C0 must be finite and > 0, got {c0}"
        )));
    }
    Ok(())
}

/// Resolve `C0` from its source.
///
/// `FirstObservation` takes the concentration of the first point in the sequence
/// (sequences are ordered by increasing time).
pub fn resolve_c0(source: C0Source, observations: &[Observation]) -> Result<f64, FitError> {
    let c0 = match source {
        C0Source::Explicit(v) => v,
        C0Source::FirstObservation => observations
            .first()
            .map(|o| o.concentration)
            .ok_or_else(|| FitError::invalid("no observations to take C0 from"))?,
    };
    validate_c0(c0)?;
    Ok(c0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(pairs: &[(f64, f64)]) -> Vec<Observation> {
        pairs.iter().map(|&(t, c)| Observation::new(t, c)).collect()
    }

    #[test]
    fn accepts_valid_sequence_with_duplicate_times() {
        let data = obs(&[(0.0, 10.0), (1.0, 8.0), (1.0, 7.9)]);
        assert!(validate_observations(&data).is_ok());
    }

    #[test]
    fn rejects_single_point() {
        let err = validate_observations(&obs(&[(0.0, 10.0)])).unwrap_err();
        assert!(matches!(err, FitError::InvalidInput { .. }));
    }

    #[test]
    fn rejects_negative_time_and_non_positive_concentration() {
        assert!(validate_observations(&obs(&[(-1.0, 10.0), (1.0, 5.0)])).is_err());
        assert!(validate_observations(&obs(&[(0.0, 10.0), (1.0, 0.0)])).is_err());
        assert!(validate_observations(&obs(&[(0.0, 10.0), (1.0, -2.0)])).is_err());
        assert!(validate_observations(&obs(&[(0.0, f64::NAN), (1.0, 2.0)])).is_err());
    }

    #[test]
    fn resolve_c0_sources() {
        let data = obs(&[(0.0, 9.5), (1.0, 5.0)]);
        assert_eq!(resolve_c0(C0Source::Explicit(10.0), &data), Ok(10.0));
        assert_eq!(resolve_c0(C0Source::FirstObservation, &data), Ok(9.5));
        assert!(resolve_c0(C0Source::FirstObservation, &[]).is_err());
        assert!(resolve_c0(C0Source::Explicit(0.0), &data).is_err());
    }
}
