//! Input/output helpers.
//!
//! - observation ingest + validation (`ingest`)
//! - result exports (CSV) (`export`)
//! - fit JSON read/write (`curve`)

pub mod curve;
pub mod export;
pub mod ingest;

pub use curve::*;
pub use export::*;
pub use ingest::*;
