//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - ingests observations
//! - runs the first-order fit
//! - prints reports/plots
//! - writes optional exports

use std::fs::File;
use std::io::{self, Write};

use chrono::Utc;
use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs, SampleArgs};
use crate::data::{SampleSpec, generate_sample};
use crate::domain::FitConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `dk` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is normal; anything else is worth a warning.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            log::warn!("failed to load .env: {e}");
        }
    }

    // We want `dk` and `dk --csv data.csv` to behave like `dk tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Sample(args) => handle_sample(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.fit, &run.stats)
    );
    println!("{}", crate::report::format_residual_table(&run.residuals));

    if config.plot {
        println!(
            "{}",
            crate::plot::render_ascii_plot(&run.residuals, &run.fit, config.plot_width, config.plot_height)
        );
        println!(
            "{}",
            crate::plot::render_residual_plot(&run.residuals, config.plot_width, (config.plot_height / 2).max(3))
        );
    }

    // Optional exports.
    if let Some(path) = &config.export_data {
        crate::io::export::write_results_csv(path, &run.residuals)?;
    }
    if let Some(path) = &config.export_fit {
        let fit_file = crate::io::curve::build_fit_file(&run.fit, &run.ingest.observations, config.grid_points);
        crate::io::curve::write_fit_json(path, &fit_file)?;
    }
    if let Some(path) = &config.export_report {
        let report = crate::report::format_analysis_report(&run.fit, &run.stats, Utc::now());
        std::fs::write(path, report)
            .map_err(|e| AppError::new(2, format!("Failed to write report '{}': {e}", path.display())))?;
        log::info!("wrote report {}", path.display());
    }
    if let Some(path) = &config.export_plot {
        crate::plot::write_fit_svg(path, &run.residuals, &run.fit)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let fit_file = crate::io::curve::read_fit_json(&args.fit)?;
    let plot = crate::plot::render_ascii_plot_from_fit_file(&fit_file, args.width, args.height);

    println!("{plot}");
    println!(
        "k={:.6} | half-life={} | R²={:.4} | RMSE={:.4}",
        fit_file.fit.k,
        crate::report::fmt_half_life(fit_file.fit.half_life),
        fit_file.fit.r_squared,
        fit_file.fit.rmse
    );
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let spec = SampleSpec {
        k: args.k,
        c0: args.c0,
        t_max: args.t_max,
        points: args.points,
        noise_sd: args.noise,
        seed: args.seed,
    };
    let data = generate_sample(&spec)?;

    let write_err = |e: io::Error| AppError::new(2, format!("Failed to write sample CSV: {e}"));
    match &args.out {
        Some(path) => {
            let mut file = File::create(path)
                .map_err(|e| AppError::new(2, format!("Failed to create '{}': {e}", path.display())))?;
            write_sample_csv(&mut file, &data).map_err(write_err)?;
            log::info!("wrote {} synthetic rows to {}", data.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            write_sample_csv(&mut stdout.lock(), &data).map_err(write_err)?;
        }
    }
    Ok(())
}

fn write_sample_csv<W: Write>(out: &mut W, data: &[crate::domain::Observation]) -> io::Result<()> {
    writeln!(out, "time,concentration")?;
    for o in data {
        writeln!(out, "{},{:.6}", o.time, o.concentration)?;
    }
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        source: args.input.data_source(),
        c0: args.input.c0_source(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        grid_points: args.grid_points,
        export_data: args.export.clone(),
        export_fit: args.export_fit.clone(),
        export_report: args.report.clone(),
        export_plot: args.export_plot.clone(),
    }
}

/// Rewrite argv so `dk` defaults to `dk tui`.
///
/// Rules:
/// - `dk`                      -> `dk tui`
/// - `dk --csv data.csv ...`   -> `dk tui --csv data.csv ...`
/// - `dk --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "plot" | "sample" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rewrite_defaults_to_tui() {
        assert_eq!(rewrite_args(args(&["dk"])), args(&["dk", "tui"]));
        assert_eq!(
            rewrite_args(args(&["dk", "--csv", "a.csv"])),
            args(&["dk", "tui", "--csv", "a.csv"])
        );
        assert_eq!(rewrite_args(args(&["dk", "--help"])), args(&["dk", "--help"]));
        assert_eq!(rewrite_args(args(&["dk", "fit"])), args(&["dk", "fit"]));
    }

    #[test]
    fn sample_csv_layout() {
        let data = vec![
            crate::domain::Observation::new(0.0, 10.0),
            crate::domain::Observation::new(1.0, 8.1873),
        ];
        let mut buf = Vec::new();
        write_sample_csv(&mut buf, &data).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "time,concentration\n0,10.000000\n1,8.187300\n");
    }
}
