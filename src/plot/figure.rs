//! SVG figure: observations with the fitted curve, and a residual panel below.

use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::{FitResult, ResidualPoint};
use crate::error::AppError;
use crate::models::sample_curve;

/// Figure size in pixels.
pub const FIGURE_SIZE: (u32, u32) = (1000, 750);

const CURVE_POINTS: usize = 200;

/// Write the fit figure as SVG.
pub fn write_fit_svg(path: &Path, residuals: &[ResidualPoint], fit: &FitResult) -> Result<(), AppError> {
    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    draw_fit_figure(&root, residuals, fit)
        .map_err(|e| AppError::new(2, format!("Failed to write plot '{}': {e}", path.display())))?;
    log::info!("wrote plot {}", path.display());
    Ok(())
}

fn draw_fit_figure(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    residuals: &[ResidualPoint],
    fit: &FitResult,
) -> Result<(), Box<dyn Error>> {
    let mut t_max = residuals
        .iter()
        .map(|r| r.observation.time)
        .fold(0.0_f64, f64::max);
    if !t_max.is_finite() || t_max <= 0.0 {
        t_max = 1.0;
    }

    let curve = sample_curve(fit.k, fit.c0, 0.0, t_max, CURVE_POINTS);
    let mut c_max = residuals
        .iter()
        .map(|r| r.observation.concentration)
        .chain(curve.iter().map(|&(_, c)| c))
        .fold(0.0_f64, f64::max);
    if !c_max.is_finite() || c_max <= 0.0 {
        c_max = 1.0;
    }

    let mut r_max = residuals
        .iter()
        .map(|r| r.residual.abs())
        .fold(0.0_f64, f64::max);
    if !r_max.is_finite() || r_max <= 0.0 {
        r_max = 1.0;
    }

    root.fill(&WHITE)?;
    let (upper, lower) = root.split_vertically(FIGURE_SIZE.1 * 2 / 3);

    let mut chart = ChartBuilder::on(&upper)
        .caption(
            format!("First-order fit: k = {:.5}, R² = {:.4}", fit.k, fit.r_squared),
            ("sans-serif", 22),
        )
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..t_max, 0.0..(c_max * 1.1))?;

    chart
        .configure_mesh()
        .x_desc("time")
        .y_desc("concentration")
        .draw()?;

    chart.draw_series(LineSeries::new(curve, &BLUE))?;
    chart.draw_series(
        residuals
            .iter()
            .map(|r| Circle::new((r.observation.time, r.observation.concentration), 4, RED.filled())),
    )?;

    let mut resid_chart = ChartBuilder::on(&lower)
        .margin(15)
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(0.0..t_max, (-r_max * 1.2)..(r_max * 1.2))?;

    resid_chart
        .configure_mesh()
        .x_desc("time")
        .y_desc("residual")
        .draw()?;

    resid_chart.draw_series(LineSeries::new([(0.0, 0.0), (t_max, 0.0)], &BLACK))?;
    resid_chart.draw_series(
        residuals
            .iter()
            .map(|r| Circle::new((r.observation.time, r.residual), 4, GREEN.filled())),
    )?;

    root.present()?;
    Ok(())
}
