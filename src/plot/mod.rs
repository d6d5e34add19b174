//! Terminal plots and the exported SVG figure.

pub mod ascii;
pub mod figure;

pub use ascii::*;
pub use figure::write_fit_svg;
