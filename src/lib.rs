//! `degradation-kinetics` library crate.
//!
//! Fits the pseudo-first-order decay law `C(t) = C0 * exp(-k t)` to
//! (time, concentration) data and reports the rate constant, R², RMSE and
//! half-life.
//!
//! The binary (`dk`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fit can be reused from other front-ends
//!
//! The entry point for callers is [`fit::fit`].

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;

pub use domain::{FitResult, Observation};
pub use error::FitError;
pub use fit::fit;
