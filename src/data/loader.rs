//! Loader for the daily case time series file.
//!
//! The file is a CSV whose first column (or a named column) holds the date
//! of each row and whose count column holds the number of cases reported
//! that day:
//! - date (index column, `YYYY-MM-DD` or a common day/month variant)
//! - daily_cases (configurable name)
//! - cumulative_cases (optional, never consumed)

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::types::{Observation, SeriesError, TimeSeries};

/// Default name of the count column.
pub const DEFAULT_COUNT_COLUMN: &str = "daily_cases";

/// Name of the running-total column written next to the daily counts.
pub const CUMULATIVE_COLUMN: &str = "cumulative_cases";

/// Date formats tried in order. Month-first wins over day-first for
/// ambiguous slash dates.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("{path}: unparsable timestamp {value:?} in column '{column}' (row {row})")]
    InvalidTimestamp {
        path: String,
        column: String,
        row: usize,
        value: String,
    },

    #[error("{path}: missing or non-numeric value in column '{column}' (row {row})")]
    InvalidCount {
        path: String,
        column: String,
        row: usize,
    },

    #[error("{path}: {source}")]
    Series { path: String, source: SeriesError },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse a date string in any of the accepted formats.
///
/// Timestamps with a time-of-day component are truncated to their date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Read a CSV file with a header row into a DataFrame.
pub fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::FileNotFound(path.display().to_string()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    Ok(df)
}

/// Reads a date-indexed count column into a `TimeSeries`.
#[derive(Debug, Clone)]
pub struct TimeSeriesLoader {
    count_column: String,
    date_column: Option<String>,
}

impl Default for TimeSeriesLoader {
    fn default() -> Self {
        Self::new(DEFAULT_COUNT_COLUMN)
    }
}

impl TimeSeriesLoader {
    /// Create a loader reading the given count column and the first column as date.
    pub fn new(count_column: &str) -> Self {
        Self {
            count_column: count_column.to_string(),
            date_column: None,
        }
    }

    /// Use a named date column instead of the first column.
    pub fn with_date_column(mut self, date_column: Option<&str>) -> Self {
        self.date_column = date_column.map(str::to_string);
        self
    }

    pub fn count_column(&self) -> &str {
        &self.count_column
    }

    /// Load a time series file, sorting it by date.
    pub fn load(&self, path: &Path) -> Result<TimeSeries, LoaderError> {
        let df = read_csv(path)?;
        let series = self.series_from_dataframe(&df, path)?;
        debug!(
            path = %path.display(),
            rows = series.len(),
            "loaded time series"
        );
        Ok(series)
    }

    /// Convert an already-read frame. `source` is only used in error messages.
    pub fn series_from_dataframe(
        &self,
        df: &DataFrame,
        source: &Path,
    ) -> Result<TimeSeries, LoaderError> {
        let path = source.display().to_string();

        let date_col = match &self.date_column {
            Some(name) => df.column(name).map_err(|_| LoaderError::MissingColumn {
                path: path.clone(),
                column: name.clone(),
            })?,
            None => df.get_columns().first().ok_or_else(|| LoaderError::MissingColumn {
                path: path.clone(),
                column: "date".to_string(),
            })?,
        };
        let date_name = date_col.name().to_string();

        let count_col = df
            .column(&self.count_column)
            .map_err(|_| LoaderError::MissingColumn {
                path: path.clone(),
                column: self.count_column.clone(),
            })?;

        let dates = date_col.cast(&DataType::String)?;
        let counts = count_col.cast(&DataType::Float64)?;

        let mut observations = Vec::with_capacity(df.height());
        for (row, (date, count)) in dates
            .str()?
            .into_iter()
            .zip(counts.f64()?.into_iter())
            .enumerate()
        {
            let raw = date.unwrap_or_default();
            let date = parse_date(raw).ok_or_else(|| LoaderError::InvalidTimestamp {
                path: path.clone(),
                column: date_name.clone(),
                row,
                value: raw.to_string(),
            })?;
            let count = count.ok_or_else(|| LoaderError::InvalidCount {
                path: path.clone(),
                column: self.count_column.clone(),
                row,
            })?;
            observations.push(Observation::new(date, count));
        }

        TimeSeries::from_unsorted(observations)
            .map_err(|source| LoaderError::Series { path, source })
    }
}
