//! Reference forecasters built directly from supervised features.
//!
//! | Name             | Prediction            |
//! |------------------|-----------------------|
//! | persistence      | lag_1                 |
//! | rolling_mean_<w> | roll_mean_<w>         |
//! | seasonal_<k>     | lag_<k>               |
//! | train_mean       | mean training target  |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::features::{FeatureRow, SupervisedTable};

use super::EvaluationError;

/// A baseline forecaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Baseline {
    Persistence,
    RollingMean(usize),
    Seasonal(usize),
    TrainMean,
}

impl Baseline {
    /// Parse a baseline name such as `persistence` or `rolling_mean_7`.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        match name.as_str() {
            "persistence" | "naive" => Some(Self::Persistence),
            "train_mean" | "mean" => Some(Self::TrainMean),
            _ => {
                if let Some(w) = name.strip_prefix("rolling_mean_") {
                    w.parse().ok().filter(|&w| w > 0).map(Self::RollingMean)
                } else if let Some(k) = name.strip_prefix("seasonal_") {
                    k.parse().ok().filter(|&k| k > 0).map(Self::Seasonal)
                } else {
                    None
                }
            }
        }
    }

    /// Column the baseline reads its prediction from, if any.
    fn source_column(&self) -> Option<String> {
        match self {
            Self::Persistence => Some("lag_1".to_string()),
            Self::RollingMean(w) => Some(format!("roll_mean_{}", w)),
            Self::Seasonal(k) => Some(format!("lag_{}", k)),
            Self::TrainMean => None,
        }
    }

    /// Check the baseline against the table's columns and fit it on `train`.
    pub fn fit(&self, train: &SupervisedTable) -> Result<FittedBaseline, EvaluationError> {
        if let Some(column) = self.source_column() {
            if !train.feature_columns().iter().any(|c| *c == column) {
                return Err(EvaluationError::UnsupportedBaseline {
                    baseline: self.to_string(),
                    reason: format!("feature '{}' is not configured", column),
                });
            }
        }

        let train_mean = match self {
            Self::TrainMean => {
                if train.is_empty() {
                    return Err(EvaluationError::EmptyTrain);
                }
                train.targets().iter().sum::<f64>() / train.len() as f64
            }
            _ => 0.0,
        };

        Ok(FittedBaseline {
            baseline: *self,
            train_mean,
        })
    }
}

impl fmt::Display for Baseline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistence => write!(f, "persistence"),
            Self::RollingMean(w) => write!(f, "rolling_mean_{}", w),
            Self::Seasonal(k) => write!(f, "seasonal_{}", k),
            Self::TrainMean => write!(f, "train_mean"),
        }
    }
}

/// A baseline ready to predict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FittedBaseline {
    baseline: Baseline,
    train_mean: f64,
}

impl FittedBaseline {
    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn predict(&self, row: &FeatureRow) -> f64 {
        match self.baseline {
            Baseline::Persistence => row.lag(1).unwrap_or(self.train_mean),
            Baseline::RollingMean(w) => row.rolling(w).map(|s| s.mean).unwrap_or(self.train_mean),
            Baseline::Seasonal(k) => row.lag(k).unwrap_or(self.train_mean),
            Baseline::TrainMean => self.train_mean,
        }
    }

    pub fn predict_table(&self, table: &SupervisedTable) -> Vec<f64> {
        table.rows().iter().map(|row| self.predict(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::RollingStats;
    use chrono::NaiveDate;

    fn table() -> SupervisedTable {
        let date = NaiveDate::from_ymd_opt(2020, 6, 1).unwrap();
        let row = |target: f64| FeatureRow {
            position: 3,
            date,
            lags: vec![5.0, 6.0, 7.0],
            rolling: vec![RollingStats {
                window: 3,
                mean: 6.0,
                std: 1.0,
            }],
            pct_change_1: 0.0,
            target,
            target_date: date,
        };
        SupervisedTable::new(
            vec![
                "lag_1".into(),
                "lag_2".into(),
                "lag_3".into(),
                "roll_mean_3".into(),
                "roll_std_3".into(),
                "pct_change_1".into(),
            ],
            vec![row(4.0), row(8.0)],
        )
    }

    #[test]
    fn test_parse_and_display_roundtrip_names() {
        for name in ["persistence", "rolling_mean_7", "seasonal_7", "train_mean"] {
            let baseline = Baseline::parse(name).unwrap();
            assert_eq!(baseline.to_string(), name);
        }
        assert_eq!(Baseline::parse("naive"), Some(Baseline::Persistence));
        assert_eq!(Baseline::parse("rolling_mean_0"), None);
        assert_eq!(Baseline::parse("arima"), None);
    }

    #[test]
    fn test_predictions() {
        let t = table();
        let row = &t.rows()[0];

        let predict = |b: Baseline| b.fit(&t).unwrap().predict(row);
        assert_eq!(predict(Baseline::Persistence), 5.0);
        assert_eq!(predict(Baseline::RollingMean(3)), 6.0);
        assert_eq!(predict(Baseline::Seasonal(3)), 7.0);
        assert_eq!(predict(Baseline::TrainMean), 6.0);
    }

    #[test]
    fn test_unconfigured_feature_rejected() {
        let t = table();
        assert!(matches!(
            Baseline::RollingMean(7).fit(&t),
            Err(EvaluationError::UnsupportedBaseline { .. })
        ));
        assert!(matches!(
            Baseline::Seasonal(7).fit(&t),
            Err(EvaluationError::UnsupportedBaseline { .. })
        ));
    }

    #[test]
    fn test_train_mean_needs_rows() {
        let t = table().with_rows(vec![]);
        assert!(matches!(
            Baseline::TrainMean.fit(&t),
            Err(EvaluationError::EmptyTrain)
        ));
        assert!(Baseline::Persistence.fit(&t).is_ok());
    }
}
