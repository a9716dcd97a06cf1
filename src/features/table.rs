//! Supervised rows and tables.

use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Trailing-window statistics for one window size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingStats {
    pub window: usize,
    pub mean: f64,
    pub std: f64,
}

/// One supervised example, derived from the series at `position`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Index of the row's day in the source series.
    pub position: usize,
    /// Date of the row's day.
    pub date: NaiveDate,
    /// `lags[k - 1]` is lag_k.
    pub lags: Vec<f64>,
    /// One entry per configured window, in configured order.
    pub rolling: Vec<RollingStats>,
    pub pct_change_1: f64,
    pub target: f64,
    /// Date of the observation the target was taken from.
    pub target_date: NaiveDate,
}

impl FeatureRow {
    /// lag_k for k >= 1.
    pub fn lag(&self, k: usize) -> Option<f64> {
        k.checked_sub(1).and_then(|i| self.lags.get(i).copied())
    }

    pub fn rolling(&self, window: usize) -> Option<&RollingStats> {
        self.rolling.iter().find(|r| r.window == window)
    }

    /// Feature values in column order (target excluded).
    pub fn features(&self) -> Vec<f64> {
        let mut values = self.lags.clone();
        for stats in &self.rolling {
            values.push(stats.mean);
            values.push(stats.std);
        }
        values.push(self.pct_change_1);
        values
    }
}

/// Ordered supervised rows with their feature column names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupervisedTable {
    columns: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl SupervisedTable {
    pub fn new(columns: Vec<String>, rows: Vec<FeatureRow>) -> Self {
        Self { columns, rows }
    }

    /// A table with the same columns and the given rows.
    pub fn with_rows(&self, rows: Vec<FeatureRow>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    pub fn targets(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.target).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }

    /// Rows `[start, end)` as a new table.
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.rows.len());
        let start = start.min(end);
        self.with_rows(self.rows[start..end].to_vec())
    }

    /// Convert to a frame with the feature columns followed by `target`.
    ///
    /// With `with_dates`, `date` and `target_date` columns come first.
    pub fn to_dataframe(&self, with_dates: bool) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len() + 3);

        if with_dates {
            let dates: Vec<String> = self.rows.iter().map(|r| r.date.to_string()).collect();
            let target_dates: Vec<String> = self
                .rows
                .iter()
                .map(|r| r.target_date.to_string())
                .collect();
            columns.push(Series::new("date".into(), dates).into());
            columns.push(Series::new("target_date".into(), target_dates).into());
        }

        let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(self.rows.len()); self.columns.len()];
        for row in &self.rows {
            for (column, value) in values.iter_mut().zip(row.features()) {
                column.push(value);
            }
        }
        for (name, column) in self.columns.iter().zip(values) {
            columns.push(Series::new(name.as_str().into(), column).into());
        }
        columns.push(Series::new("target".into(), self.targets()).into());

        DataFrame::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(position: usize, target: f64) -> FeatureRow {
        let date = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap() + chrono::Duration::days(position as i64);
        FeatureRow {
            position,
            date,
            lags: vec![1.0, 2.0],
            rolling: vec![RollingStats {
                window: 3,
                mean: 1.5,
                std: 0.5,
            }],
            pct_change_1: 0.25,
            target,
            target_date: date + chrono::Duration::days(1),
        }
    }

    fn table() -> SupervisedTable {
        SupervisedTable::new(
            vec![
                "lag_1".into(),
                "lag_2".into(),
                "roll_mean_3".into(),
                "roll_std_3".into(),
                "pct_change_1".into(),
            ],
            vec![row(2, 9.0), row(3, 20.0), row(4, 25.0)],
        )
    }

    #[test]
    fn test_row_accessors() {
        let r = row(2, 9.0);
        assert_eq!(r.lag(1), Some(1.0));
        assert_eq!(r.lag(2), Some(2.0));
        assert_eq!(r.lag(0), None);
        assert_eq!(r.lag(3), None);
        assert_eq!(r.rolling(3).map(|s| s.mean), Some(1.5));
        assert!(r.rolling(7).is_none());
        assert_eq!(r.features(), vec![1.0, 2.0, 1.5, 0.5, 0.25]);
    }

    #[test]
    fn test_slice_clamps() {
        let t = table();
        assert_eq!(t.slice(1, 10).len(), 2);
        assert_eq!(t.slice(5, 10).len(), 0);
        assert_eq!(t.slice(0, 1).rows()[0].position, 2);
    }

    #[test]
    fn test_to_dataframe_schema() {
        let df = table().to_dataframe(false).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(
            names,
            vec!["lag_1", "lag_2", "roll_mean_3", "roll_std_3", "pct_change_1", "target"]
        );
        assert_eq!(df.height(), 3);

        let targets: Vec<Option<f64>> = df.column("target").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(targets, vec![Some(9.0), Some(20.0), Some(25.0)]);
    }

    #[test]
    fn test_to_dataframe_with_dates() {
        let df = table().to_dataframe(true).unwrap();
        assert_eq!(df.width(), 8);
        let first = df.column("date").unwrap().str().unwrap().get(0);
        assert_eq!(first, Some("2020-05-03"));
    }

    #[test]
    fn test_empty_table_keeps_schema() {
        let t = table().with_rows(vec![]);
        let df = t.to_dataframe(false).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 6);
    }
}
