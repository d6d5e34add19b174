//! Export per-observation results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ResidualPoint;
use crate::error::AppError;

/// Write observed vs predicted concentrations to a CSV file.
pub fn write_results_csv(path: &Path, residuals: &[ResidualPoint]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(&mut file, residuals)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV: {e}")))?;
    log::info!("wrote {} rows to {}", residuals.len(), path.display());
    Ok(())
}

/// Write the CSV body to any writer.
pub fn write_results<W: Write>(out: &mut W, residuals: &[ResidualPoint]) -> std::io::Result<()> {
    writeln!(out, "time,experimental_concentration,predicted_concentration,residual")?;
    for r in residuals {
        writeln!(
            out,
            "{},{},{:.10},{:.10}",
            r.observation.time, r.observation.concentration, r.predicted, r.residual
        )?;
    }
    Ok(())
}
