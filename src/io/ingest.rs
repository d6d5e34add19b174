//! Observation ingest and normalization.
//!
//! This module is responsible for turning user input (a CSV file, two pasted
//! value lists, or `t,c` pairs) into a clean, time-ordered `Observation`
//! sequence that is safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **No coercion**: a value that cannot be used is reported, never replaced
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;

use csv::StringRecord;

use crate::data::default_observations;
use crate::domain::{DataSource, Observation};
use crate::error::AppError;

/// Summary stats about the observations actually used for fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_points: usize,
    pub time_min: f64,
    pub time_max: f64,
    pub conc_min: f64,
    pub conc_max: f64,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized observations + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

impl IngestedData {
    /// Wrap an already-validated sequence (e.g. edited in the TUI).
    pub fn from_observations(observations: Vec<Observation>) -> Result<Self, AppError> {
        let mut builder = Builder::default();
        for (idx, obs) in observations.iter().enumerate() {
            builder.push(idx + 1, Ok((obs.time, obs.concentration)));
        }
        builder.finish()
    }
}

/// Load observations from the configured source.
pub fn load_observations(source: &DataSource) -> Result<IngestedData, AppError> {
    let data = match source {
        DataSource::Csv(path) => {
            let file = File::open(path).map_err(|e| {
                AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display()))
            })?;
            read_csv(file)?
        }
        DataSource::Lists { time, concentration } => parse_lists(time, concentration)?,
        DataSource::Pairs(text) => parse_pairs(text)?,
        DataSource::Default => IngestedData::from_observations(default_observations())?,
    };

    for err in &data.row_errors {
        log::warn!("skipped row {}: {}", err.line, err.message);
    }
    log::info!(
        "ingested {} of {} rows (t=[{}, {}])",
        data.rows_used,
        data.rows_read,
        data.stats.time_min,
        data.stats.time_max
    );

    Ok(data)
}

/// Read a CSV with `time` and `concentration` columns.
///
/// Header names are matched case-insensitively; extra columns are ignored.
pub fn read_csv<R: Read>(reader: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    let time_idx = *header_map
        .get("time")
        .ok_or_else(|| AppError::new(2, "Missing required column: `time`"))?;
    let conc_idx = *header_map
        .get("concentration")
        .ok_or_else(|| AppError::new(2, "Missing required column: `concentration`"))?;

    let mut builder = Builder::default();
    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;

        let row = match result {
            Ok(record) => parse_record(&record, time_idx, conc_idx),
            Err(e) => Err(format!("CSV parse error: {e}")),
        };
        builder.push(line, row);
    }

    builder.finish()
}

/// Parse two whitespace-separated value lists of equal length.
pub fn parse_lists(time: &str, concentration: &str) -> Result<IngestedData, AppError> {
    let times: Vec<&str> = time.split_whitespace().collect();
    let concs: Vec<&str> = concentration.split_whitespace().collect();
    if times.len() != concs.len() {
        return Err(AppError::new(
            2,
            format!(
                "Number of time points ({}) must match number of concentration points ({}).",
                times.len(),
                concs.len()
            ),
        ));
    }

    let mut builder = Builder::default();
    for (idx, (t, c)) in times.iter().zip(concs.iter()).enumerate() {
        builder.push(idx + 1, parse_pair(t, c));
    }
    builder.finish()
}

/// Parse `t,c` pairs separated by newlines or `;`. Blank entries are ignored.
pub fn parse_pairs(text: &str) -> Result<IngestedData, AppError> {
    let mut builder = Builder::default();
    let entries = text
        .split(['\n', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty());

    for (idx, entry) in entries.enumerate() {
        let row = match entry.split_once(',') {
            Some((t, c)) => parse_pair(t, c),
            None => Err(format!("Expected `time,concentration`, got '{entry}'.")),
        };
        builder.push(idx + 1, row);
    }
    builder.finish()
}

/// Accumulates rows, enforcing per-row rules and time ordering.
#[derive(Default)]
struct Builder {
    observations: Vec<Observation>,
    row_errors: Vec<RowError>,
    rows_read: usize,
}

impl Builder {
    fn push(&mut self, line: usize, row: Result<(f64, f64), String>) {
        self.rows_read += 1;
        let checked = row.and_then(|(t, c)| self.check(t, c));
        match checked {
            Ok(obs) => self.observations.push(obs),
            Err(message) => self.row_errors.push(RowError { line, message }),
        }
    }

    fn check(&self, time: f64, concentration: f64) -> Result<Observation, String> {
        if time < 0.0 {
            return Err(format!("Time must be non-negative, got {time}."));
        }
        if concentration <= 0.0 {
            return Err(format!(
                "Concentration must be > 0 for the log-linear fit, got {concentration}."
            ));
        }
        if let Some(prev) = self.observations.last() {
            if time < prev.time {
                return Err(format!(
                    "Time {time} is earlier than the previous row ({}); rows must be ordered by time.",
                    prev.time
                ));
            }
        }
        Ok(Observation::new(time, concentration))
    }

    fn finish(self) -> Result<IngestedData, AppError> {
        let rows_used = self.observations.len();
        let stats = compute_stats(&self.observations).ok_or_else(|| {
            AppError::new(3, "No valid rows remain after normalization.")
        })?;

        Ok(IngestedData {
            observations: self.observations,
            stats,
            row_errors: self.row_errors,
            rows_read: self.rows_read,
            rows_used,
        })
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn parse_record(record: &StringRecord, time_idx: usize, conc_idx: usize) -> Result<(f64, f64), String> {
    let t = get_required(record, time_idx, "time")?;
    let c = get_required(record, conc_idx, "concentration")?;
    parse_pair(t, c)
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_pair(t: &str, c: &str) -> Result<(f64, f64), String> {
    let t = parse_f64(t).ok_or_else(|| format!("Invalid time value '{}'.", t.trim()))?;
    let c = parse_f64(c).ok_or_else(|| format!("Invalid concentration value '{}'.", c.trim()))?;
    Ok((t, c))
}

fn parse_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

fn compute_stats(observations: &[Observation]) -> Option<DatasetStats> {
    let mut time_min = f64::INFINITY;
    let mut time_max = f64::NEG_INFINITY;
    let mut conc_min = f64::INFINITY;
    let mut conc_max = f64::NEG_INFINITY;

    for o in observations {
        time_min = time_min.min(o.time);
        time_max = time_max.max(o.time);
        conc_min = conc_min.min(o.concentration);
        conc_max = conc_max.max(o.concentration);
    }

    if !time_min.is_finite() || !time_max.is_finite() || !conc_min.is_finite() || !conc_max.is_finite() {
        return None;
    }

    Some(DatasetStats {
        n_points: observations.len(),
        time_min,
        time_max,
        conc_min,
        conc_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_csv_basic_with_bom_and_extra_columns() {
        let csv = "\u{feff}Time,Concentration,note\n0,10,start\n5,8.5,\n10,7.2,end\n";
        let data = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 3);
        assert_eq!(data.rows_used, 3);
        assert!(data.row_errors.is_empty());
        assert_eq!(data.observations[1], Observation::new(5.0, 8.5));
        assert_eq!(data.stats.time_max, 10.0);
        assert_eq!(data.stats.conc_min, 7.2);
    }

    #[test]
    fn read_csv_requires_columns() {
        let err = read_csv("t,c\n0,1\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("time"));
    }

    #[test]
    fn read_csv_reports_bad_rows() {
        let csv = "time,concentration\n0,10\n1,abc\n2,0\n3,-1\n-4,5\n5,6\n4,7\n";
        let data = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(data.rows_read, 7);
        assert_eq!(data.rows_used, 2);
        let lines: Vec<usize> = data.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6, 8]);
        assert!(data.row_errors[4].message.contains("ordered by time"));
    }

    #[test]
    fn no_valid_rows_is_an_error() {
        let err = read_csv("time,concentration\n0,0\n".as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn parse_lists_checks_lengths() {
        let data = parse_lists("0\n5\n10", "10 8.5 7.2").unwrap();
        assert_eq!(data.rows_used, 3);
        assert!(parse_lists("0 5", "10").is_err());
    }

    #[test]
    fn parse_pairs_accepts_newlines_and_semicolons() {
        let data = parse_pairs("0,10\n5,8.5; 10,7.2;\n\n").unwrap();
        assert_eq!(data.observations.len(), 3);
        assert_eq!(data.observations[2], Observation::new(10.0, 7.2));

        let data = parse_pairs("0,10\n5 8.5\n10,7.2").unwrap();
        assert_eq!(data.rows_used, 2);
        assert_eq!(data.row_errors[0].line, 2);
    }

    #[test]
    fn duplicate_times_are_kept() {
        let data = parse_pairs("0,10;1,8;1,8.2").unwrap();
        assert_eq!(data.rows_used, 3);
    }
}
