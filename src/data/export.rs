//! CSV writers for the processed time series and the supervised tables.

use std::fs;
use std::path::Path;

use polars::prelude::*;
use tracing::info;

use super::loader::{LoaderError, CUMULATIVE_COLUMN};
use super::types::TimeSeries;

/// Write a DataFrame as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<(), LoaderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = fs::File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;

    info!(path = %path.display(), rows = df.height(), "wrote csv");
    Ok(())
}

/// Convert a series into `date, <count_column>, cumulative_cases` columns.
pub fn timeseries_to_dataframe(
    series: &TimeSeries,
    count_column: &str,
) -> Result<DataFrame, LoaderError> {
    let dates: Vec<String> = series.dates().iter().map(|d| d.to_string()).collect();

    let df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new(count_column.into(), series.counts()).into(),
        Series::new(CUMULATIVE_COLUMN.into(), series.cumulative()).into(),
    ])?;

    Ok(df)
}

/// Persist a daily series in the layout the loader reads back.
pub fn write_timeseries(
    series: &TimeSeries,
    count_column: &str,
    path: &Path,
) -> Result<(), LoaderError> {
    let mut df = timeseries_to_dataframe(series, count_column)?;
    write_csv(&mut df, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::TimeSeriesLoader;
    use chrono::NaiveDate;

    #[test]
    fn test_timeseries_written_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed").join("ts.csv");

        let series = TimeSeries::from_pairs(&[
            (NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(), 2.0),
            (NaiveDate::from_ymd_opt(2020, 3, 2).unwrap(), 5.0),
            (NaiveDate::from_ymd_opt(2020, 3, 4).unwrap(), 1.0),
        ])
        .unwrap();

        write_timeseries(&series, "daily_cases", &path).unwrap();

        let body = fs::read_to_string(&path).unwrap();
        assert!(body.starts_with("date,daily_cases,cumulative_cases"));

        let loaded = TimeSeriesLoader::default().load(&path).unwrap();
        assert_eq!(loaded, series);
    }
}
