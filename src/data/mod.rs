//! Built-in and synthetic data sets.

pub mod sample;

pub use sample::*;
