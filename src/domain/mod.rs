//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - measurement points (`Observation`) and the `C0` source
//! - fit outputs (`FitResult`, `FitStatistics`, `ResidualPoint`)
//! - run configuration (`FitConfig`, `DataSource`) and the saved `FitFile`

pub mod types;

pub use types::*;
