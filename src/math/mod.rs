//! Mathematical utilities: least squares through the origin and fit statistics.

pub mod ols;
pub mod stats;

pub use ols::*;
pub use stats::*;
