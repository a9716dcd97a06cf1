//! Time series to supervised learning rows.
//!
//! Every feature of the row at position `i` is computed from observations
//! strictly before `i`; only the target looks ahead, at `i + horizon`:
//! - lag_k = count(i - k), k = 1..L
//! - roll_mean_w / roll_std_w over count[i - w .. i) (partial windows allowed)
//! - pct_change_1 = (count(i-1) - count(i-2)) / count(i-2), 0 when undefined
//! - target = count(i + H)
//!
//! A row exists iff all lags and the target are defined, that is
//! `L <= i < len - H`. Rolling and pct-change features fall back to
//! defaults and never exclude a row.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, info, warn};

use crate::data::TimeSeries;
use crate::split::{HoldoutSplit, TrainTestSplit};

use super::config::{FeatureConfig, FeatureError, FeatureParams};
use super::table::{FeatureRow, RollingStats, SupervisedTable};

/// Non-fatal conditions found while building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildWarning {
    /// No row survived trimming; both tables are empty.
    EmptyResult {
        observations: usize,
        required: usize,
    },
    /// The requested test size covered every row; train is empty.
    TestSizeExceedsRows { requested: usize, available: usize },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyResult {
                observations,
                required,
            } => write!(
                f,
                "supervised table is empty: {} observations, at least {} required",
                observations, required
            ),
            Self::TestSizeExceedsRows {
                requested,
                available,
            } => write!(
                f,
                "test size {} exceeds the {} available rows; all rows are test",
                requested, available
            ),
        }
    }
}

/// Result of a full build: the time-ordered split plus any warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    pub split: TrainTestSplit,
    pub warnings: Vec<BuildWarning>,
}

impl BuildOutput {
    pub fn is_empty(&self) -> bool {
        self.split.train.is_empty() && self.split.test.is_empty()
    }

    pub fn has_empty_result(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, BuildWarning::EmptyResult { .. }))
    }
}

/// Builds supervised tables from a daily series.
#[derive(Debug, Clone)]
pub struct SupervisedBuilder {
    params: FeatureParams,
}

impl SupervisedBuilder {
    /// Validate the configuration and create a builder.
    pub fn new(config: &FeatureConfig) -> Result<Self, FeatureError> {
        Ok(Self {
            params: config.validate()?,
        })
    }

    pub fn params(&self) -> &FeatureParams {
        &self.params
    }

    /// Build every row whose lags and target are defined, in date order.
    pub fn build_table(&self, series: &TimeSeries) -> SupervisedTable {
        let observations = series.observations();
        let counts = series.counts();
        let n = counts.len();
        let FeatureParams {
            lags,
            ref windows,
            horizon,
            ..
        } = self.params;

        let end = n.saturating_sub(horizon);
        let mut rows = Vec::with_capacity(end.saturating_sub(lags));

        for i in lags..end {
            let target_position = i + horizon;
            rows.push(FeatureRow {
                position: i,
                date: observations[i].date,
                lags: lag_values(&counts, i, lags),
                rolling: windows
                    .iter()
                    .map(|&w| rolling_stats(&counts, i, w))
                    .collect(),
                pct_change_1: pct_change(&counts, i),
                target: counts[target_position],
                target_date: observations[target_position].date,
            });
        }

        debug!(
            observations = n,
            rows = rows.len(),
            dropped = n - rows.len(),
            "built supervised table"
        );

        SupervisedTable::new(self.params.feature_columns(), rows)
    }

    /// Build the table and split off the chronologically last rows as test.
    pub fn build(&self, series: &TimeSeries) -> BuildOutput {
        let table = self.build_table(series);
        let mut warnings = Vec::new();

        if table.is_empty() {
            let warning = BuildWarning::EmptyResult {
                observations: series.len(),
                required: self.params.min_observations(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        } else if self.params.test_size > table.len() {
            let warning = BuildWarning::TestSizeExceedsRows {
                requested: self.params.test_size,
                available: table.len(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        let split = HoldoutSplit::new(self.params.test_size).split(&table);
        info!(
            train = split.train.len(),
            test = split.test.len(),
            "split supervised table"
        );

        BuildOutput { split, warnings }
    }
}

/// lag_1..lag_L at position i. Callers guarantee `i >= lags`.
fn lag_values(counts: &[f64], i: usize, lags: usize) -> Vec<f64> {
    (1..=lags).map(|k| counts[i - k]).collect()
}

/// Mean and sample std over the trailing window `[i - w, i)`.
///
/// Windows shorter than `w` at the start of the series use what is
/// available. Std is 0 with fewer than two observations; mean is 0 only
/// for an empty window.
fn rolling_stats(counts: &[f64], i: usize, window: usize) -> RollingStats {
    let slice = &counts[i.saturating_sub(window)..i];

    let mean = if slice.is_empty() { 0.0 } else { slice.iter().mean() };
    let std = if slice.len() < 2 {
        0.0
    } else {
        slice.iter().std_dev()
    };

    RollingStats { window, mean, std }
}

/// Fractional change from day i-2 to day i-1.
fn pct_change(counts: &[f64], i: usize) -> f64 {
    if i < 2 {
        return 0.0;
    }
    let (before, last) = (counts[i - 2], counts[i - 1]);
    if before == 0.0 {
        0.0
    } else {
        (last - before) / before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    const SCENARIO: [f64; 16] = [
        10.0, 12.0, 15.0, 9.0, 20.0, 25.0, 30.0, 18.0, 22.0, 19.0, 21.0, 17.0, 16.0, 14.0, 23.0,
        28.0,
    ];

    fn series(counts: &[f64]) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 3, 12).unwrap();
        let pairs: Vec<_> = counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (start + Duration::days(i as i64), c))
            .collect();
        TimeSeries::from_pairs(&pairs).unwrap()
    }

    fn builder(lags: i64, windows: Vec<i64>, horizon: i64, test_size: i64) -> SupervisedBuilder {
        SupervisedBuilder::new(&FeatureConfig {
            lags,
            rolling_windows: windows,
            horizon,
            test_size,
        })
        .unwrap()
    }

    #[test]
    fn test_scenario_table_bounds() {
        let table = builder(2, vec![3], 1, 2).build_table(&series(&SCENARIO));

        assert_eq!(table.len(), 13);
        assert_eq!(table.rows().first().unwrap().position, 2);
        assert_eq!(table.rows().last().unwrap().position, 14);
    }

    #[test]
    fn test_scenario_first_row_values() {
        let table = builder(2, vec![3], 1, 2).build_table(&series(&SCENARIO));
        let first = &table.rows()[0];

        assert_eq!(first.lag(1), Some(12.0));
        assert_eq!(first.lag(2), Some(10.0));
        assert_relative_eq!(first.rolling(3).unwrap().mean, 11.0);
        assert_eq!(first.target, 9.0);
        assert_relative_eq!(first.pct_change_1, 0.2);
    }

    #[test]
    fn test_scenario_split_sizes() {
        let output = builder(2, vec![3], 1, 2).build(&series(&SCENARIO));

        assert_eq!(output.split.train.len(), 11);
        assert_eq!(output.split.test.len(), 2);
        assert_eq!(output.split.test.rows()[0].position, 13);
        assert_eq!(output.split.test.rows()[1].position, 14);
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_empty_result_is_a_warning() {
        let output = builder(5, vec![3], 1, 2).build(&series(&[1.0, 2.0, 3.0]));

        assert!(output.is_empty());
        assert!(output.has_empty_result());
        assert_eq!(
            output.warnings,
            vec![BuildWarning::EmptyResult {
                observations: 3,
                required: 7
            }]
        );
    }

    #[test]
    fn test_series_shorter_than_horizon() {
        let table = builder(1, vec![], 5, 0).build_table(&series(&[1.0, 2.0]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_row_inclusion_rule() {
        let counts: Vec<f64> = (0..20).map(|v| v as f64).collect();
        for (lags, horizon) in [(1, 1), (3, 2), (5, 4), (19, 1), (1, 19)] {
            let table = builder(lags, vec![2], horizon, 0).build_table(&series(&counts));
            let positions: Vec<usize> = table.rows().iter().map(|r| r.position).collect();
            let expected: Vec<usize> = (0..counts.len())
                .filter(|&i| i >= lags as usize && i + (horizon as usize) < counts.len())
                .collect();
            assert_eq!(positions, expected, "lags={} horizon={}", lags, horizon);
        }
    }

    #[test]
    fn test_full_window_mean_matches_arithmetic_mean() {
        let table = builder(7, vec![7], 1, 0).build_table(&series(&SCENARIO));
        for row in table.rows() {
            let i = row.position;
            let expected: f64 = SCENARIO[i - 7..i].iter().sum::<f64>() / 7.0;
            assert_relative_eq!(row.rolling(7).unwrap().mean, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_rolling_excludes_current_day() {
        let mut counts = vec![1.0; 10];
        counts[5] = 1000.0;
        let table = builder(1, vec![3], 1, 0).build_table(&series(&counts));
        let row = table.rows().iter().find(|r| r.position == 5).unwrap();
        assert_relative_eq!(row.rolling(3).unwrap().mean, 1.0);
        assert_relative_eq!(row.rolling(3).unwrap().std, 0.0);
    }

    #[test]
    fn test_rolling_std_is_sample_std() {
        let stats = rolling_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0, 0.0], 8, 8);
        assert_relative_eq!(stats.mean, 5.0, epsilon = 1e-12);
        assert_relative_eq!(stats.std, (32.0f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rolling_std_single_observation_is_zero() {
        let stats = rolling_stats(&[10.0, 12.0], 1, 7);
        assert_relative_eq!(stats.mean, 10.0);
        assert_eq!(stats.std, 0.0);
    }

    #[test]
    fn test_pct_change_defaults() {
        assert_eq!(pct_change(&[5.0, 6.0], 1), 0.0);
        assert_eq!(pct_change(&[0.0, 6.0, 1.0], 2), 0.0);
        assert_relative_eq!(pct_change(&[4.0, 6.0, 1.0], 2), 0.5);
        // Only days before i are used.
        assert_relative_eq!(pct_change(&[4.0, 6.0, 1000.0], 2), 0.5);
    }

    #[test]
    fn test_lag_row_with_gap_uses_positions() {
        // Missing calendar days are not filled: lags follow row positions.
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let s = TimeSeries::from_pairs(&[
            (start, 1.0),
            (start + Duration::days(1), 2.0),
            (start + Duration::days(5), 3.0),
            (start + Duration::days(6), 4.0),
        ])
        .unwrap();
        let table = builder(1, vec![], 1, 0).build_table(&s);
        let row = &table.rows()[0];
        assert_eq!(row.position, 1);
        assert_eq!(row.date, start + Duration::days(1));
        assert_eq!(row.lag(1), Some(1.0));
        assert_eq!(row.target_date, start + Duration::days(5));
        assert_eq!(row.target, 3.0);
    }

    #[test]
    fn test_horizon_target() {
        let table = builder(1, vec![], 3, 0).build_table(&series(&SCENARIO));
        for row in table.rows() {
            assert_eq!(row.target, SCENARIO[row.position + 3]);
        }
        assert_eq!(table.rows().last().unwrap().position, SCENARIO.len() - 4);
    }

    #[test]
    fn test_build_is_deterministic() {
        let b = builder(3, vec![2, 5], 2, 4);
        let s = series(&SCENARIO);
        assert_eq!(b.build(&s), b.build(&s));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = SupervisedBuilder::new(&FeatureConfig {
            horizon: 0,
            ..Default::default()
        });
        assert!(matches!(result, Err(FeatureError::Configuration(_))));
    }
}
