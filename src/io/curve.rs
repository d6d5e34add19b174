//! Read/write fit JSON files.
//!
//! A fit file is the portable representation of one run:
//! - the fitted parameters and statistics
//! - the observations the fit was computed from
//! - a precomputed fitted grid for quick plotting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{FitFile, FitGrid, FitResult, Observation};
use crate::error::AppError;
use crate::models::{MODEL_NAME, sample_curve};

/// Assemble a fit file for the given run.
pub fn build_fit_file(fit: &FitResult, observations: &[Observation], grid_points: usize) -> FitFile {
    let t_max = observations
        .iter()
        .map(|o| o.time)
        .fold(0.0_f64, f64::max);
    let t_max = if t_max > 0.0 { t_max } else { 1.0 };

    let (time, concentration) = sample_curve(fit.k, fit.c0, 0.0, t_max, grid_points)
        .into_iter()
        .unzip();

    FitFile {
        tool: "dk".to_string(),
        generated_at: Utc::now(),
        model: MODEL_NAME.to_string(),
        fit: fit.clone(),
        observations: observations.to_vec(),
        grid: FitGrid { time, concentration },
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, fit_file: &FitFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, fit_file)
        .map_err(|e| AppError::new(2, format!("Failed to write fit JSON: {e}")))?;

    log::info!("wrote fit file {}", path.display());
    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let fit_file: FitFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid fit JSON: {e}")))?;

    if fit_file.model != MODEL_NAME {
        return Err(AppError::new(
            2,
            format!("Unsupported model '{}' in fit JSON (expected '{MODEL_NAME}').", fit_file.model),
        ));
    }
    if fit_file.grid.time.len() != fit_file.grid.concentration.len() {
        return Err(AppError::new(2, "Fit JSON grid columns have different lengths."));
    }
    Ok(fit_file)
}
