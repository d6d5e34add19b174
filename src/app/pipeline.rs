//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> resolve C0 -> fit -> residuals -> statistics
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::domain::{C0Source, FitConfig, FitResult, FitStatistics, Observation, ResidualPoint};
use crate::error::AppError;
use crate::fit::{fit, resolve_c0};
use crate::io::ingest::{IngestedData, load_observations};
use crate::report::{compute_residuals, compute_statistics};

/// All computed outputs of a single fit run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub fit: FitResult,
    pub residuals: Vec<ResidualPoint>,
    pub stats: FitStatistics,
}

/// Execute the full pipeline from the configured data source.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let ingest = load_observations(&config.source)?;
    run_fit_with_data(ingest, config.c0)
}

/// Execute the pipeline on an in-memory observation list.
///
/// This is useful for the TUI where observations are edited in place.
pub fn run_fit_on_observations(observations: Vec<Observation>, c0: C0Source) -> Result<RunOutput, AppError> {
    let ingest = IngestedData::from_observations(observations)?;
    run_fit_with_data(ingest, c0)
}

fn run_fit_with_data(ingest: IngestedData, c0: C0Source) -> Result<RunOutput, AppError> {
    let c0 = resolve_c0(c0, &ingest.observations)?;
    let fit = fit(&ingest.observations, c0)?;
    log::debug!(
        "fit n={} c0={} -> k={:.6} r2={:.4} rmse={:.4}",
        fit.n,
        fit.c0,
        fit.k,
        fit.r_squared,
        fit.rmse
    );

    let residuals = compute_residuals(&ingest.observations, &fit)?;
    let stats = compute_statistics(&residuals, &fit);

    Ok(RunOutput {
        ingest,
        fit,
        residuals,
        stats,
    })
}
