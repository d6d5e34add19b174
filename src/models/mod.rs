//! Kinetic model implementation.
//!
//! Only the pseudo-first-order law is supported.

pub mod model;

pub use model::*;
