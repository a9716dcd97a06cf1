pub mod config;
pub mod data;
pub mod evaluation;
pub mod features;
pub mod pipeline;
pub mod split;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigError, DataConfig, PipelineConfig};
pub use data::{LoaderError, Observation, PreprocessError, TimeSeries, TimeSeriesLoader};
pub use evaluation::{Baseline, EvaluationConfig, EvaluationReport, Evaluator, RegressionMetrics};
pub use features::{
    BuildOutput, BuildWarning, FeatureConfig, FeatureError, FeatureRow, SupervisedBuilder,
    SupervisedTable,
};
pub use pipeline::{build_supervised, write_supervised, BuildSummary, PipelineError};
pub use split::{ExpandingFolds, HoldoutSplit, TrainTestSplit};
pub use validation::{SeriesIntegrityReport, SeriesValidator};
