//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single measurement: concentration observed at a point in time.
///
/// Time is in the user's unit (typically minutes) and concentration in the
/// user's unit (typically mg/L). The fit is unit-agnostic; `k` comes out in
/// inverse time units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: f64,
    pub concentration: f64,
}

impl Observation {
    pub fn new(time: f64, concentration: f64) -> Self {
        Self { time, concentration }
    }
}

/// Where the initial concentration `C0` comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum C0Source {
    /// A value supplied by the user.
    Explicit(f64),
    /// The concentration of the first (earliest) observation.
    FirstObservation,
}

/// Output of a first-order fit.
///
/// `r_squared` is reported as computed: a fit worse than the mean model yields a
/// negative value rather than being clamped to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Rate constant (1/time). Negative values indicate concentration growth.
    pub k: f64,
    pub r_squared: f64,
    pub rmse: f64,
    /// `ln(2) / k`, present only when `k > 0`.
    pub half_life: Option<f64>,
    /// Initial concentration the model was anchored to.
    pub c0: f64,
    /// Number of observations used.
    pub n: usize,
}

/// Goodness-of-fit summary on the original concentration scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    pub r_squared: f64,
    pub rmse: f64,
    pub mae: f64,
    pub mse: f64,
    pub sse: f64,
}

/// A per-observation fitted value (used for residual tables, plots and exports).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidualPoint {
    pub observation: Observation,
    pub predicted: f64,
    pub residual: f64,
}

/// How observations are supplied to a run.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// CSV file with `time` and `concentration` columns.
    Csv(PathBuf),
    /// Two whitespace-separated lists of equal length.
    Lists { time: String, concentration: String },
    /// `t,c` pairs separated by newlines or `;`.
    Pairs(String),
    /// The built-in demonstration data set.
    Default,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub source: DataSource,
    pub c0: C0Source,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    /// Number of points in the exported fitted grid.
    pub grid_points: usize,

    pub export_data: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
    pub export_report: Option<PathBuf>,
    /// SVG figure of the fit with a residual panel.
    pub export_plot: Option<PathBuf>,
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub fit: FitResult,
    pub observations: Vec<Observation>,
    pub grid: FitGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitGrid {
    pub time: Vec<f64>,
    pub concentration: Vec<f64>,
}
