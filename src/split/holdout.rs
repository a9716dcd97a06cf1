//! Chronological train/test holdout.
//!
//! The test table is the last `test_size` rows of the supervised table and
//! the train table is everything before it, so every train date precedes
//! every test date.

use serde::{Deserialize, Serialize};

use crate::features::SupervisedTable;

/// Train rows followed by held-out test rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainTestSplit {
    pub train: SupervisedTable,
    pub test: SupervisedTable,
}

impl TrainTestSplit {
    /// Train rows then test rows, reconstructing the source table.
    pub fn concat(&self) -> SupervisedTable {
        let mut rows = self.train.rows().to_vec();
        rows.extend_from_slice(self.test.rows());
        self.train.with_rows(rows)
    }

    /// True when the latest train row is strictly earlier than the earliest test row.
    pub fn is_time_ordered(&self) -> bool {
        match (self.train.last_date(), self.test.first_date()) {
            (Some(train_end), Some(test_start)) => train_end < test_start,
            _ => true,
        }
    }
}

/// Splits off the chronologically last rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldoutSplit {
    test_size: usize,
}

impl HoldoutSplit {
    pub fn new(test_size: usize) -> Self {
        Self { test_size }
    }

    pub fn test_size(&self) -> usize {
        self.test_size
    }

    /// Split a date-ordered table.
    ///
    /// `test_size == 0` leaves test empty; a test size larger than the table
    /// makes every row test.
    pub fn split(&self, table: &SupervisedTable) -> TrainTestSplit {
        let boundary = table.len().saturating_sub(self.test_size);
        TrainTestSplit {
            train: table.slice(0, boundary),
            test: table.slice(boundary, table.len()),
        }
    }
}
