//! Raw case records to a daily time series.
//!
//! Raw exports come with heterogeneous schemas, so the date and case
//! columns are either given explicitly or detected from the header. Rows
//! are summed per calendar day and the result is sorted by date.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

use super::loader::{parse_date, read_csv, LoaderError};
use super::types::{Observation, SeriesError, TimeSeries};

/// Date column names tried before falling back to a fuzzy match.
pub const COMMON_DATE_COLUMNS: &[&str] = &["date", "Date", "report_date", "reported_on"];

/// Case column names tried before falling back to a fuzzy match.
pub const COMMON_CASE_COLUMNS: &[&str] = &[
    "new_cases",
    "cases",
    "confirmed",
    "case_count",
    "total_cases",
    "cumulative_cases",
];

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Raw data directory not found: {0}")]
    RawDirNotFound(String),

    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("{path}: required columns not present (date: '{date_column}', cases: '{cases_column}')")]
    MissingColumns {
        path: String,
        date_column: String,
        cases_column: String,
    },

    #[error("Could not detect date/cases columns. Detected date: {date:?}, cases: {cases:?}")]
    ColumnDetection {
        date: Option<String>,
        cases: Option<String>,
    },

    #[error("No valid frames to build the time series from")]
    NoFrames,

    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Column names found in a raw file.
#[derive(Debug, Clone)]
pub struct FileColumns {
    pub path: PathBuf,
    pub columns: Vec<String>,
}

/// List `*.csv` files in a directory, sorted by path.
pub fn find_raw_csvs(raw_dir: &Path) -> Result<Vec<PathBuf>, PreprocessError> {
    if !raw_dir.exists() {
        return Err(PreprocessError::RawDirNotFound(raw_dir.display().to_string()));
    }

    let mut csvs = Vec::new();
    for entry in fs::read_dir(raw_dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv && path.is_file() {
            csvs.push(path);
        }
    }
    csvs.sort();
    Ok(csvs)
}

/// Read the header of each file. Files that fail to parse are skipped.
pub fn inspect_columns(paths: &[PathBuf]) -> Vec<FileColumns> {
    let mut info = Vec::with_capacity(paths.len());
    for path in paths {
        let head = CsvReadOptions::default()
            .with_has_header(true)
            .with_n_rows(Some(3))
            .try_into_reader_with_file_path(Some(path.clone()))
            .and_then(|reader| reader.finish());

        match head {
            Ok(df) => info.push(FileColumns {
                path: path.clone(),
                columns: df
                    .get_column_names()
                    .into_iter()
                    .map(|name| name.to_string())
                    .collect(),
            }),
            Err(e) => warn!(path = %path.display(), error = %e, "could not read file header"),
        }
    }
    info
}

/// Pick the date column: a well-known name, else any column containing "date".
pub fn detect_date_column(columns: &[String]) -> Option<String> {
    COMMON_DATE_COLUMNS
        .iter()
        .find(|name| columns.iter().any(|c| c == *name))
        .map(|name| name.to_string())
        .or_else(|| {
            columns
                .iter()
                .find(|c| c.to_lowercase().contains("date"))
                .cloned()
        })
}

/// Pick the case column: a well-known name, else any column mentioning cases
/// or confirmations.
pub fn detect_cases_column(columns: &[String]) -> Option<String> {
    COMMON_CASE_COLUMNS
        .iter()
        .find(|name| columns.iter().any(|c| c == *name))
        .map(|name| name.to_string())
        .or_else(|| {
            columns
                .iter()
                .find(|c| {
                    let low = c.to_lowercase();
                    low.contains("case") || low.contains("confirm")
                })
                .cloned()
        })
}

/// Resolve the date and case columns, preferring explicit names.
///
/// Files are scanned in order until both columns are known.
pub fn resolve_columns(
    files: &[FileColumns],
    date_column: Option<&str>,
    cases_column: Option<&str>,
) -> Result<(String, String), PreprocessError> {
    let mut date = date_column.map(str::to_string);
    let mut cases = cases_column.map(str::to_string);

    for file in files {
        if date.is_none() {
            date = detect_date_column(&file.columns);
        }
        if cases.is_none() {
            cases = detect_cases_column(&file.columns);
        }
        if date.is_some() && cases.is_some() {
            break;
        }
    }

    match (date, cases) {
        (Some(date), Some(cases)) => Ok((date, cases)),
        (date, cases) => Err(PreprocessError::ColumnDetection { date, cases }),
    }
}

/// Read one raw file as `(date, cases)` observations.
///
/// Rows with unparsable dates are dropped; missing or non-numeric case
/// values count as zero.
pub fn read_raw_file(
    path: &Path,
    date_column: &str,
    cases_column: &str,
) -> Result<Vec<Observation>, PreprocessError> {
    let df = read_csv(path)?;

    if df.column(date_column).is_err() || df.column(cases_column).is_err() {
        return Err(PreprocessError::MissingColumns {
            path: path.display().to_string(),
            date_column: date_column.to_string(),
            cases_column: cases_column.to_string(),
        });
    }

    let df = df
        .lazy()
        .select([
            col(date_column).cast(DataType::String).alias("date"),
            col(cases_column)
                .cast(DataType::Float64)
                .fill_null(lit(0.0))
                .alias("cases"),
        ])
        .collect()?;

    let dates = df.column("date")?.str()?;
    let cases = df.column("cases")?.f64()?;

    let mut dropped = 0usize;
    let mut observations = Vec::with_capacity(df.height());
    for (date, count) in dates.into_iter().zip(cases.into_iter()) {
        match date.and_then(parse_date) {
            Some(date) => {
                let count = count.filter(|c| c.is_finite()).unwrap_or(0.0);
                observations.push(Observation::new(date, count));
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!(path = %path.display(), dropped, "dropped rows with unparsable dates");
    }

    Ok(observations)
}

/// Sums observations from several files into one count per calendar day.
#[derive(Debug, Default)]
pub struct DailyAggregator {
    totals: BTreeMap<NaiveDate, f64>,
    files_used: usize,
}

impl DailyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add all observations from one file.
    pub fn add_file(&mut self, observations: &[Observation]) {
        for obs in observations {
            *self.totals.entry(obs.date).or_insert(0.0) += obs.count;
        }
        self.files_used += 1;
    }

    pub fn files_used(&self) -> usize {
        self.files_used
    }

    /// Produce the date-sorted daily series.
    pub fn finish(self) -> Result<TimeSeries, PreprocessError> {
        if self.files_used == 0 {
            return Err(PreprocessError::NoFrames);
        }

        let observations = self
            .totals
            .into_iter()
            .map(|(date, count)| Observation::new(date, count))
            .collect();
        Ok(TimeSeries::new(observations)?)
    }
}

/// Read every file, skipping unusable ones, and aggregate into a daily series.
pub fn build_daily_series(
    paths: &[PathBuf],
    date_column: &str,
    cases_column: &str,
) -> Result<TimeSeries, PreprocessError> {
    let mut aggregator = DailyAggregator::new();

    for path in paths {
        match read_raw_file(path, date_column, cases_column) {
            Ok(observations) => aggregator.add_file(&observations),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping file"),
        }
    }

    let files_used = aggregator.files_used();
    let series = aggregator.finish()?;
    info!(
        files = files_used,
        days = series.len(),
        "built daily series"
    );
    Ok(series)
}
