//! Feature construction parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Feature parameters as they appear in config files and on the command line.
///
/// Values are signed so that negative input reaches `validate` instead of
/// failing at parse time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Number of lag features (lag_1 ... lag_n).
    pub lags: i64,
    /// Trailing window sizes for rolling mean/std.
    pub rolling_windows: Vec<i64>,
    /// Prediction horizon in days (1 = next day).
    pub horizon: i64,
    /// Number of most recent rows held out as test.
    pub test_size: i64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            lags: 14,
            rolling_windows: vec![7, 14],
            horizon: 1,
            test_size: 14,
        }
    }
}

impl FeatureConfig {
    /// Check every parameter and convert to `FeatureParams`.
    pub fn validate(&self) -> Result<FeatureParams, FeatureError> {
        if self.lags < 1 {
            return Err(FeatureError::Configuration(format!(
                "lags must be at least 1, got {}",
                self.lags
            )));
        }
        if self.horizon < 1 {
            return Err(FeatureError::Configuration(format!(
                "horizon must be at least 1, got {}",
                self.horizon
            )));
        }
        if self.test_size < 0 {
            return Err(FeatureError::Configuration(format!(
                "test_size must not be negative, got {}",
                self.test_size
            )));
        }
        if let Some(bad) = self.rolling_windows.iter().find(|&&w| w < 1) {
            return Err(FeatureError::Configuration(format!(
                "rolling window sizes must be at least 1, got {}",
                bad
            )));
        }

        let mut windows: Vec<usize> = Vec::with_capacity(self.rolling_windows.len());
        for &w in &self.rolling_windows {
            let w = w as usize;
            if !windows.contains(&w) {
                windows.push(w);
            }
        }

        Ok(FeatureParams {
            lags: self.lags as usize,
            windows,
            horizon: self.horizon as usize,
            test_size: self.test_size as usize,
        })
    }
}

/// Validated feature parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureParams {
    pub lags: usize,
    /// Distinct window sizes in configured order.
    pub windows: Vec<usize>,
    pub horizon: usize,
    pub test_size: usize,
}

impl FeatureParams {
    /// Feature column names in output order (target excluded).
    pub fn feature_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = (1..=self.lags).map(|k| format!("lag_{}", k)).collect();
        for w in &self.windows {
            columns.push(format!("roll_mean_{}", w));
            columns.push(format!("roll_std_{}", w));
        }
        columns.push("pct_change_1".to_string());
        columns
    }

    /// Shortest series that yields at least one supervised row.
    pub fn min_observations(&self) -> usize {
        self.lags + self.horizon + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = FeatureConfig::default().validate().unwrap();
        assert_eq!(params.lags, 14);
        assert_eq!(params.windows, vec![7, 14]);
        assert_eq!(params.horizon, 1);
        assert_eq!(params.test_size, 14);
        assert_eq!(params.min_observations(), 16);
    }

    #[test]
    fn test_rejects_invalid_values() {
        let cases = [
            FeatureConfig {
                lags: 0,
                ..Default::default()
            },
            FeatureConfig {
                horizon: 0,
                ..Default::default()
            },
            FeatureConfig {
                test_size: -1,
                ..Default::default()
            },
            FeatureConfig {
                rolling_windows: vec![7, 0],
                ..Default::default()
            },
        ];

        for config in cases {
            assert!(matches!(
                config.validate(),
                Err(FeatureError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_zero_test_size_and_no_windows_allowed() {
        let params = FeatureConfig {
            lags: 1,
            rolling_windows: vec![],
            horizon: 1,
            test_size: 0,
        }
        .validate()
        .unwrap();
        assert_eq!(params.feature_columns(), vec!["lag_1", "pct_change_1"]);
    }

    #[test]
    fn test_duplicate_windows_collapse() {
        let params = FeatureConfig {
            rolling_windows: vec![14, 7, 14],
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(params.windows, vec![14, 7]);
    }

    #[test]
    fn test_feature_columns_order() {
        let params = FeatureConfig {
            lags: 2,
            rolling_windows: vec![3],
            horizon: 1,
            test_size: 2,
        }
        .validate()
        .unwrap();
        assert_eq!(
            params.feature_columns(),
            vec!["lag_1", "lag_2", "roll_mean_3", "roll_std_3", "pct_change_1"]
        );
    }
}
