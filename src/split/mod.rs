//! Time-ordered splitting of supervised tables.
//!
//! - Holdout: last N rows as test, everything before as train
//! - Expanding folds: walk-forward validation blocks over the train rows

pub mod folds;
pub mod holdout;

pub use folds::{ExpandingFolds, ExpandingFoldsConfig, Fold, SplitError};
pub use holdout::{HoldoutSplit, TrainTestSplit};
