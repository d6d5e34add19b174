//! Command-line parsing for the degradation kinetics fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{C0Source, DataSource};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dk", version, about = "Pseudo-first-order degradation kinetics fitter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit C(t) = C0 exp(-k t), print statistics, and optionally plot/export.
    Fit(FitArgs),
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
    /// Generate synthetic first-order decay data as CSV.
    Sample(SampleArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying fit pipeline as `dk fit`, but lets you
    /// edit C0 and the observations and refits on every change.
    Tui(InputArgs),
}

/// Where observations and C0 come from.
#[derive(Debug, Args, Clone, Default)]
pub struct InputArgs {
    /// CSV file with `time` and `concentration` columns.
    #[arg(short = 'f', long, value_name = "CSV", conflicts_with_all = ["time", "pairs"])]
    pub csv: Option<PathBuf>,

    /// Whitespace-separated time values (use with --conc).
    #[arg(long, requires = "conc", allow_hyphen_values = true)]
    pub time: Option<String>,

    /// Whitespace-separated concentration values (use with --time).
    #[arg(long, requires = "time", allow_hyphen_values = true)]
    pub conc: Option<String>,

    /// `t,c` pairs separated by `;` or newlines, e.g. "0,10;5,8.5;10,7.2".
    #[arg(long, conflicts_with = "time", allow_hyphen_values = true)]
    pub pairs: Option<String>,

    /// Initial concentration C0. Defaults to the first observation's concentration.
    #[arg(long, env = "DK_C0", allow_hyphen_values = true)]
    pub c0: Option<f64>,
}

impl InputArgs {
    pub fn data_source(&self) -> DataSource {
        if let Some(path) = &self.csv {
            return DataSource::Csv(path.clone());
        }
        if let (Some(time), Some(conc)) = (&self.time, &self.conc) {
            return DataSource::Lists {
                time: time.clone(),
                concentration: conc.clone(),
            };
        }
        if let Some(pairs) = &self.pairs {
            return DataSource::Pairs(pairs.clone());
        }
        DataSource::Default
    }

    pub fn c0_source(&self) -> C0Source {
        match self.c0 {
            Some(v) => C0Source::Explicit(v),
            None => C0Source::FirstObservation,
        }
    }
}

/// Options for fitting.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Number of points in the exported fitted grid.
    #[arg(long, default_value_t = 101)]
    pub grid_points: usize,

    /// Export observed/predicted/residual rows to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fit (parameters + statistics + fitted grid) to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,

    /// Write the plain-text analysis report to a file.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Save the fit and residual figure as SVG.
    #[arg(long = "export-plot", value_name = "SVG")]
    pub export_plot: Option<PathBuf>,
}

/// Options for plotting a saved fit.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Fit JSON file produced by `dk fit --export-fit`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// Options for synthetic data generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// True rate constant.
    #[arg(long, default_value_t = 0.2, allow_hyphen_values = true)]
    pub k: f64,

    /// Initial concentration.
    #[arg(long, default_value_t = 10.0)]
    pub c0: f64,

    /// Last sample time (first is 0).
    #[arg(long, default_value_t = 10.0)]
    pub t_max: f64,

    /// Number of evenly spaced samples.
    #[arg(long, default_value_t = 11)]
    pub points: usize,

    /// Standard deviation of additive Gaussian noise.
    #[arg(long, default_value_t = 0.1)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV (stdout when omitted).
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fit_with_pairs_and_c0() {
        let cli = Cli::parse_from(["dk", "fit", "--pairs", "0,10;1,6", "--c0", "10", "--no-plot"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.input.data_source(), DataSource::Pairs("0,10;1,6".to_string()));
        assert_eq!(args.input.c0_source(), C0Source::Explicit(10.0));
        assert!(args.no_plot);
    }

    #[test]
    fn parses_export_plot_path() {
        let cli = Cli::parse_from(["dk", "fit", "--export-plot", "fit.svg"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.export_plot, Some(PathBuf::from("fit.svg")));
        assert_eq!(args.export, None);
    }

    #[test]
    fn defaults_to_builtin_data() {
        let args = InputArgs::default();
        assert_eq!(args.data_source(), DataSource::Default);
        assert_eq!(args.c0_source(), C0Source::FirstObservation);
    }

    #[test]
    fn csv_conflicts_with_pairs() {
        let res = Cli::try_parse_from(["dk", "fit", "--csv", "a.csv", "--pairs", "0,1;1,2"]);
        assert!(res.is_err());
    }
}
