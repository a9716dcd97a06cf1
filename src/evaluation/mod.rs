//! Baseline forecast evaluation.
//!
//! Provides reference scores for the supervised tables:
//! - Baselines: persistence, rolling mean, seasonal lag, train mean
//! - Metrics: MAE, RMSE, MAPE
//! - Holdout scoring on the test table
//! - Walk-forward scoring on expanding folds of the train table

pub mod baselines;
pub mod evaluator;
pub mod metrics;

use thiserror::Error;

use crate::split::SplitError;

pub use baselines::{Baseline, FittedBaseline};
pub use evaluator::{
    BaselineScore, EvaluationConfig, EvaluationReport, Evaluator, FoldScore, WalkForwardSummary,
};
pub use metrics::RegressionMetrics;

#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Unknown baseline: {0}")]
    UnknownBaseline(String),

    #[error("Baseline {baseline} cannot be used: {reason}")]
    UnsupportedBaseline { baseline: String, reason: String },

    #[error("Training table is empty")]
    EmptyTrain,

    #[error("Split error: {0}")]
    Split(#[from] SplitError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
