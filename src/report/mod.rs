//! Reporting utilities: residuals, extended statistics and formatted output.

pub mod format;

pub use format::*;

use nalgebra::DVector;

use crate::domain::{FitResult, FitStatistics, Observation, ResidualPoint};
use crate::error::AppError;
use crate::math::{mae, r_squared, sse};
use crate::models::predict;

/// Compute fitted values and residuals (`observed - predicted`) for each observation.
pub fn compute_residuals(observations: &[Observation], fit: &FitResult) -> Result<Vec<ResidualPoint>, AppError> {
    let mut out = Vec::with_capacity(observations.len());
    for o in observations {
        let predicted = predict(o.time, fit.k, fit.c0);
        if !predicted.is_finite() {
            return Err(AppError::new(4, "Non-finite model prediction during residual computation."));
        }
        out.push(ResidualPoint {
            observation: *o,
            predicted,
            residual: o.concentration - predicted,
        });
    }
    Ok(out)
}

/// Extended statistics over the residuals (adds MAE/MSE/SSE to the fit's R²/RMSE).
pub fn compute_statistics(residuals: &[ResidualPoint], fit: &FitResult) -> FitStatistics {
    let n = residuals.len();
    let observed = DVector::from_iterator(n, residuals.iter().map(|r| r.observation.concentration));
    let predicted = DVector::from_iterator(n, residuals.iter().map(|r| r.predicted));

    let sse = sse(&observed, &predicted);
    let mse = if n > 0 { sse / n as f64 } else { f64::NAN };

    FitStatistics {
        r_squared: r_squared(&observed, &predicted).unwrap_or(fit.r_squared),
        rmse: fit.rmse,
        mae: mae(&observed, &predicted),
        mse,
        sse,
    }
}
