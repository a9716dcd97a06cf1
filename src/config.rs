//! Pipeline configuration.
//!
//! Loaded from a TOML file with `[data]`, `[features]` and `[evaluation]`
//! sections. Every field has a default, so an empty file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{TimeSeriesLoader, DEFAULT_COUNT_COLUMN};
use crate::evaluation::EvaluationConfig;
use crate::features::{FeatureConfig, FeatureError, FeatureParams};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// File locations and column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding raw case CSVs.
    pub raw_dir: PathBuf,
    /// Daily time series file (input of `build`, output of `preprocess`).
    pub timeseries_path: PathBuf,
    /// Directory for train.csv and test.csv.
    pub output_dir: PathBuf,
    /// Directory for evaluation reports.
    pub reports_dir: PathBuf,
    /// Count column in the time series file.
    pub count_column: String,
    /// Date column in the time series file; first column when unset.
    pub date_column: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("data/raw"),
            timeseries_path: PathBuf::from("data/processed/cases_timeseries.csv"),
            output_dir: PathBuf::from("data/processed"),
            reports_dir: PathBuf::from("reports"),
            count_column: DEFAULT_COUNT_COLUMN.to_string(),
            date_column: None,
        }
    }
}

/// Master configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub features: FeatureConfig,
    pub evaluation: EvaluationConfig,
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate and return the feature parameters.
    pub fn validate(&self) -> Result<FeatureParams, ConfigError> {
        if self.data.count_column.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "data.count_column must not be empty".into(),
            ));
        }
        Ok(self.features.validate()?)
    }

    pub fn loader(&self) -> TimeSeriesLoader {
        TimeSeriesLoader::new(&self.data.count_column)
            .with_date_column(self.data.date_column.as_deref())
    }

    pub fn train_path(&self) -> PathBuf {
        self.data.output_dir.join("train.csv")
    }

    pub fn test_path(&self) -> PathBuf {
        self.data.output_dir.join("test.csv")
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.data.reports_dir.join("metrics.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.features.lags, 14);
        assert_eq!(config.features.rolling_windows, vec![7, 14]);
        assert_eq!(config.data.count_column, "daily_cases");
        assert_eq!(config.train_path(), PathBuf::from("data/processed/train.csv"));
    }

    #[test]
    fn test_partial_sections() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [data]
            output_dir = "out"
            date_column = "day"

            [features]
            lags = 3
            rolling_windows = [3]

            [evaluation]
            folds = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.test_path(), PathBuf::from("out/test.csv"));
        assert_eq!(config.data.date_column.as_deref(), Some("day"));
        assert_eq!(config.features.lags, 3);
        assert_eq!(config.features.horizon, 1);
        assert_eq!(config.evaluation.folds, 2);
        assert_eq!(config.evaluation.baselines.len(), 3);
    }

    #[test]
    fn test_negative_values_fail_validation_not_parsing() {
        let config = PipelineConfig::from_toml_str("[features]\ntest_size = -3\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Feature(FeatureError::Configuration(_)))
        ));
    }

    #[test]
    fn test_empty_count_column_rejected() {
        let config = PipelineConfig::from_toml_str("[data]\ncount_column = \"\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            PipelineConfig::from_toml_str("[features]\nlags = \"many\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_file(Path::new("/nonexistent/caseflow.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
