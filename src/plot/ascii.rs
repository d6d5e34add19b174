//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - fitted curve: `-` line
//! - residual plot zero line: `.`

use crate::domain::{FitFile, FitResult, ResidualPoint};
use crate::models::sample_curve;

/// Render observed points and the fitted curve for an in-memory fit.
///
/// The time axis starts at 0 so the curve is anchored at `C0`.
pub fn render_ascii_plot(residuals: &[ResidualPoint], fit: &FitResult, width: usize, height: usize) -> String {
    let t_max = time_max(residuals.iter().map(|r| r.observation.time)).unwrap_or(1.0);
    let curve = sample_curve(fit.k, fit.c0, 0.0, t_max, width.max(2));
    let points: Vec<(f64, f64)> = residuals
        .iter()
        .map(|r| (r.observation.time, r.observation.concentration))
        .collect();
    render_plot(&points, Some(&curve), 0.0, t_max, width, height)
}

/// Render a plot from a saved fit file (grid curve plus stored observations).
pub fn render_ascii_plot_from_fit_file(fit_file: &FitFile, width: usize, height: usize) -> String {
    let curve: Vec<(f64, f64)> = fit_file
        .grid
        .time
        .iter()
        .zip(fit_file.grid.concentration.iter())
        .map(|(&t, &c)| (t, c))
        .collect();
    let points: Vec<(f64, f64)> = fit_file
        .observations
        .iter()
        .map(|o| (o.time, o.concentration))
        .collect();

    let t_max = time_max(curve.iter().map(|&(t, _)| t).chain(points.iter().map(|&(t, _)| t))).unwrap_or(1.0);
    render_plot(&points, Some(&curve), 0.0, t_max, width, height)
}

/// Render residuals (`observed - predicted`) against time around a zero line.
pub fn render_residual_plot(residuals: &[ResidualPoint], width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(3);
    let t_max = time_max(residuals.iter().map(|r| r.observation.time)).unwrap_or(1.0);

    let max_abs = residuals
        .iter()
        .map(|r| r.residual.abs())
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let bound = if max_abs > 0.0 { max_abs * 1.05 } else { 1.0 };

    let mut grid = vec![vec![' '; width]; height];
    let zero_row = map_y(0.0, -bound, bound, height);
    for cell in grid[zero_row].iter_mut() {
        *cell = '.';
    }
    for r in residuals {
        let x = map_x(r.observation.time, 0.0, t_max, width);
        let y = map_y(r.residual, -bound, bound, height);
        grid[y][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!("Residuals: t=[0.000, {t_max:.3}] | r=[{:.4}, {:.4}]\n", -bound, bound));
    push_rows(&mut out, grid);
    out
}

fn render_plot(
    points: &[(f64, f64)],
    curve_points: Option<&[(f64, f64)]>,
    t_min: f64,
    t_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Determine y-range from observed points and curve points.
    let (y_min, y_max) = y_range(points, curve_points).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    if let Some(curve) = curve_points {
        draw_curve(&mut grid, curve, t_min, t_max, y_min, y_max);
    }

    for &(t, c) in points {
        let x = map_x(t, t_min, t_max, width);
        let y = map_y(c, y_min, y_max, height);
        grid[y][x] = 'o';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[{t_min:.3}, {t_max:.3}] | C=[{y_min:.4}, {y_max:.4}]\n"
    ));
    push_rows(&mut out, grid);
    out
}

fn push_rows(out: &mut String, grid: Vec<Vec<char>>) {
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
}

fn time_max(times: impl Iterator<Item = f64>) -> Option<f64> {
    let max_t = times.filter(|t| t.is_finite()).fold(f64::NEG_INFINITY, f64::max);
    (max_t.is_finite() && max_t > 0.0).then_some(max_t)
}

fn y_range(points: &[(f64, f64)], curve: Option<&[(f64, f64)]>) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if let Some(curve) = curve {
        for &(_, y) in curve {
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
