//! Integrity checks for a daily case series.
//!
//! Validates:
//! - Non-empty series
//! - Calendar continuity (missing days are reported, never filled)
//! - Count validity (no negative daily counts)
//! - Length sufficient for the configured lags and horizon

use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::data::{LoaderError, TimeSeries, TimeSeriesLoader};
use crate::features::FeatureParams;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result of a single validation check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    pub fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    pub fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// A run of consecutive missing calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateGap {
    /// Last observed day before the gap.
    pub after: NaiveDate,
    /// First observed day after the gap.
    pub before: NaiveDate,
}

impl DateGap {
    pub fn missing_days(&self) -> i64 {
        (self.before - self.after).num_days() - 1
    }
}

/// Complete integrity report for one series.
#[derive(Debug)]
pub struct SeriesIntegrityReport {
    pub observations: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub checks: Vec<CheckResult>,
}

impl SeriesIntegrityReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    pub fn summary(&self) -> String {
        let passed = self.checks.iter().filter(|c| c.passed).count();
        let range = match (self.first_date, self.last_date) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "no dates".to_string(),
        };
        format!(
            "{} observations ({}): {}/{} checks passed",
            self.observations,
            range,
            passed,
            self.checks.len()
        )
    }
}

/// Validator for daily case series.
#[derive(Debug, Clone, Default)]
pub struct SeriesValidator {
    params: Option<FeatureParams>,
}

impl SeriesValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also check that the series is long enough for these parameters.
    pub fn with_params(mut self, params: FeatureParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Load a series file and validate it.
    pub fn validate_file(
        &self,
        loader: &TimeSeriesLoader,
        path: &Path,
    ) -> ValidationResult<SeriesIntegrityReport> {
        let series = loader.load(path)?;
        Ok(self.validate(&series))
    }

    /// Run all checks on a series.
    pub fn validate(&self, series: &TimeSeries) -> SeriesIntegrityReport {
        let mut checks = vec![
            check_non_empty(series),
            check_continuity(series),
            check_counts(series),
        ];

        if let Some(params) = &self.params {
            checks.push(check_length(series, params));
        }

        SeriesIntegrityReport {
            observations: series.len(),
            first_date: series.first_date(),
            last_date: series.last_date(),
            checks,
        }
    }
}

/// Gaps between consecutive observations.
pub fn find_gaps(series: &TimeSeries) -> Vec<DateGap> {
    series
        .observations()
        .windows(2)
        .filter(|pair| (pair[1].date - pair[0].date).num_days() > 1)
        .map(|pair| DateGap {
            after: pair[0].date,
            before: pair[1].date,
        })
        .collect()
}

fn check_non_empty(series: &TimeSeries) -> CheckResult {
    if series.is_empty() {
        CheckResult::fail("non_empty", "Series has no observations", None)
    } else {
        CheckResult::pass(
            "non_empty",
            &format!("{} observations", series.len()),
        )
    }
}

fn check_continuity(series: &TimeSeries) -> CheckResult {
    let gaps = find_gaps(series);
    if gaps.is_empty() {
        return CheckResult::pass("date_continuity", "No missing calendar days");
    }

    let largest = gaps
        .iter()
        .max_by_key(|g| g.missing_days())
        .map(|g| format!("largest gap: {} days after {}", g.missing_days(), g.after))
        .unwrap_or_default();

    CheckResult::fail(
        "date_continuity",
        &format!(
            "{} missing days in {} gaps",
            series.missing_days(),
            gaps.len()
        ),
        Some(largest),
    )
}

fn check_counts(series: &TimeSeries) -> CheckResult {
    let negative: Vec<String> = series
        .observations()
        .iter()
        .filter(|o| o.count < 0.0)
        .take(5)
        .map(|o| format!("{}: {}", o.date, o.count))
        .collect();

    if negative.is_empty() {
        CheckResult::pass("count_validity", "All daily counts are non-negative")
    } else {
        CheckResult::fail(
            "count_validity",
            "Negative daily counts found",
            Some(negative.join(", ")),
        )
    }
}

fn check_length(series: &TimeSeries, params: &FeatureParams) -> CheckResult {
    let required = params.min_observations();
    if series.len() >= required {
        CheckResult::pass(
            "sufficient_length",
            &format!(
                "{} observations, {} supervised rows",
                series.len(),
                series.len() + 1 - required
            ),
        )
    } else {
        CheckResult::fail(
            "sufficient_length",
            "Series too short: supervised table will be empty",
            Some(format!(
                "{} observations, at least {} required (lags {} + horizon {} + 1)",
                series.len(),
                required,
                params.lags,
                params.horizon
            )),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureConfig;
    use chrono::Duration;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 3, 1).unwrap() + Duration::days(offset)
    }

    fn series(points: &[(i64, f64)]) -> TimeSeries {
        let pairs: Vec<_> = points.iter().map(|&(d, c)| (day(d), c)).collect();
        TimeSeries::from_pairs(&pairs).unwrap()
    }

    #[test]
    fn test_clean_series_passes() {
        let s = series(&[(0, 1.0), (1, 0.0), (2, 3.0)]);
        let report = SeriesValidator::new().validate(&s);
        assert!(report.all_passed());
        assert_eq!(report.checks.len(), 3);
        assert!(report.summary().contains("3/3 checks passed"));
    }

    #[test]
    fn test_gaps_reported() {
        let s = series(&[(0, 1.0), (1, 1.0), (4, 1.0), (10, 1.0)]);
        let gaps = find_gaps(&s);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].missing_days(), 2);
        assert_eq!(gaps[1].missing_days(), 5);

        let report = SeriesValidator::new().validate(&s);
        let failed = report.failed_checks();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "date_continuity");
        assert_eq!(failed[0].message, "7 missing days in 2 gaps");
    }

    #[test]
    fn test_negative_counts() {
        let s = series(&[(0, 1.0), (1, -4.0)]);
        let report = SeriesValidator::new().validate(&s);
        assert!(!report.all_passed());
        assert_eq!(report.failed_checks()[0].name, "count_validity");
    }

    #[test]
    fn test_length_check() {
        let params = FeatureConfig::default().validate().unwrap();
        let short = series(&[(0, 1.0), (1, 2.0), (2, 3.0)]);
        let report = SeriesValidator::new().with_params(params.clone()).validate(&short);
        assert_eq!(report.failed_checks()[0].name, "sufficient_length");

        let points: Vec<(i64, f64)> = (0..16).map(|d| (d, 1.0)).collect();
        let report = SeriesValidator::new().with_params(params).validate(&series(&points));
        assert!(report.all_passed());
    }

    #[test]
    fn test_empty_series() {
        let report = SeriesValidator::new().validate(&TimeSeries::default());
        assert_eq!(report.failed_checks().len(), 1);
        assert!(report.summary().contains("no dates"));
    }
}
