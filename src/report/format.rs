//! Formatted terminal output and the plain-text analysis report.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use chrono::{DateTime, Utc};

use crate::domain::{FitResult, FitStatistics, ResidualPoint};
use crate::io::ingest::IngestedData;

/// Format the run summary (dataset stats + fitted parameters + statistics).
pub fn format_run_summary(ingest: &IngestedData, fit: &FitResult, stats: &FitStatistics) -> String {
    let mut out = String::new();

    out.push_str("=== dk - First-Order Degradation Fit ===\n");
    out.push_str(&format!(
        "Points: n={} (rows read={}, skipped={}) | t=[{:.3}, {:.3}] | C=[{:.4}, {:.4}]\n",
        ingest.stats.n_points,
        ingest.rows_read,
        ingest.row_errors.len(),
        ingest.stats.time_min,
        ingest.stats.time_max,
        ingest.stats.conc_min,
        ingest.stats.conc_max,
    ));
    for err in &ingest.row_errors {
        out.push_str(&format!("  (skipped row {}) {}\n", err.line, err.message));
    }

    out.push_str("\nModel: C(t) = C0 * exp(-k t)\n");
    out.push_str(&format!("- C0        : {:.4}\n", fit.c0));
    out.push_str(&format!("- k         : {:.6} 1/time\n", fit.k));
    out.push_str(&format!("- half-life : {}\n", fmt_half_life(fit.half_life)));
    if fit.k < 0.0 {
        out.push_str("  note: k < 0 means concentration increased over time\n");
    }

    out.push_str("\nFit statistics:\n");
    out.push_str(&format!("- R²   : {:.4}\n", stats.r_squared));
    out.push_str(&format!("- RMSE : {:.4}\n", stats.rmse));
    out.push_str(&format!("- MAE  : {:.4}\n", stats.mae));
    out.push_str(&format!("- MSE  : {:.4}\n", stats.mse));
    out.push('\n');

    out
}

/// Format the per-observation residual table.
pub fn format_residual_table(rows: &[ResidualPoint]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>10} {:>12} {:>12} {:>12}", "time", "observed", "predicted", "residual").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<10} {:-<12} {:-<12} {:-<12}", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:>10.3} {:>12.4} {:>12.4} {:>12.4}",
                r.observation.time, r.observation.concentration, r.predicted, r.residual
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Plain-text analysis report suitable for saving alongside exports.
pub fn format_analysis_report(fit: &FitResult, stats: &FitStatistics, generated_at: DateTime<Utc>) -> String {
    let mut lines = Vec::new();
    lines.push("Pollutant Degradation Kinetics Analysis Report".to_string());
    lines.push("=".repeat(50));
    lines.push(format!("Generated: {}", generated_at.to_rfc3339()));
    lines.push("Model: pseudo-first-order, C(t) = C0 * exp(-k t)".to_string());

    lines.push(String::new());
    lines.push("Model Parameters:".to_string());
    lines.push(format!("C0: {:.4}", fit.c0));
    lines.push(format!("k: {:.4}", fit.k));
    lines.push(format!("half_life: {}", fmt_half_life(fit.half_life)));

    lines.push(String::new());
    lines.push("Fit Statistics:".to_string());
    lines.push(format!("n: {}", fit.n));
    lines.push(format!("r2: {:.4}", stats.r_squared));
    lines.push(format!("rmse: {:.4}", stats.rmse));
    lines.push(format!("mae: {:.4}", stats.mae));
    lines.push(format!("mse: {:.4}", stats.mse));

    lines.join("\n")
}

/// Render a half-life, or "n/a" when the rate constant is not positive.
pub fn fmt_half_life(half_life: Option<f64>) -> String {
    match half_life {
        Some(h) => format!("{h:.4}"),
        None => "n/a (k <= 0)".to_string(),
    }
}
