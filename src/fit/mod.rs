//! First-order kinetic fitting.
//!
//! Responsibilities:
//!
//! - validate observations and resolve `C0`
//! - estimate `k` by log-linear least squares
//! - derive R², RMSE and half-life

pub mod fitter;
pub mod validation;

pub use fitter::*;
pub use validation::*;
