//! Expanding-window folds for time-ordered validation.
//!
//! Fold k trains on rows `[0, validate_start)` and validates on the next
//! contiguous block. Validation blocks do not overlap and move forward in
//! time; training always ends before validation starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::SupervisedTable;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SplitError {
    #[error("{rows} rows cannot form {folds} folds with at least {min_train} training rows")]
    NotEnoughRows {
        rows: usize,
        folds: usize,
        min_train: usize,
    },
}

/// A single fold, as row index ranges into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    /// Fold number (1-indexed).
    pub fold_num: usize,
    /// Training end (exclusive). Training always starts at row 0.
    pub train_end: usize,
    /// Validation start (inclusive).
    pub validate_start: usize,
    /// Validation end (exclusive).
    pub validate_end: usize,
}

impl Fold {
    pub fn train_len(&self) -> usize {
        self.train_end
    }

    pub fn validate_len(&self) -> usize {
        self.validate_end - self.validate_start
    }

    /// Slice a table into this fold's training and validation tables.
    pub fn apply(&self, table: &SupervisedTable) -> (SupervisedTable, SupervisedTable) {
        (
            table.slice(0, self.train_end),
            table.slice(self.validate_start, self.validate_end),
        )
    }
}

/// Configuration for expanding folds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpandingFoldsConfig {
    /// Number of validation blocks.
    pub folds: usize,
    /// Minimum rows in the first training window.
    pub min_train: usize,
}

impl Default for ExpandingFoldsConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            min_train: 1,
        }
    }
}

/// Generator for expanding folds over `n_rows` rows.
pub struct ExpandingFolds {
    config: ExpandingFoldsConfig,
}

impl ExpandingFolds {
    pub fn new(config: ExpandingFoldsConfig) -> Self {
        Self { config }
    }

    /// Generate all folds.
    ///
    /// The rows are cut into `folds + 1` equal blocks (remainder goes to the
    /// first training window); each later block is validated in turn.
    pub fn generate(&self, n_rows: usize) -> Result<Vec<Fold>, SplitError> {
        let folds = self.config.folds;
        let min_train = self.config.min_train.max(1);
        let not_enough = SplitError::NotEnoughRows {
            rows: n_rows,
            folds,
            min_train,
        };

        if folds == 0 {
            return Err(not_enough);
        }

        let block = n_rows / (folds + 1);
        if block == 0 {
            return Err(not_enough);
        }

        let first_validate = n_rows - folds * block;
        if first_validate < min_train {
            return Err(not_enough);
        }

        Ok((0..folds)
            .map(|k| {
                let validate_start = first_validate + k * block;
                Fold {
                    fold_num: k + 1,
                    train_end: validate_start,
                    validate_start,
                    validate_end: validate_start + block,
                }
            })
            .collect())
    }
}
