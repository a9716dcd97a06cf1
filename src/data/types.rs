//! Core time series types.
//!
//! A `TimeSeries` is an explicit ordered sequence of `(date, count)` pairs,
//! one per calendar day that was observed. Missing calendar days are simply
//! absent; nothing is ever filled in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Duplicate date {date} at position {position}")]
    DuplicateDate { date: NaiveDate, position: usize },

    #[error("Date {date} at position {position} precedes the previous date {previous}")]
    NonMonotonic {
        date: NaiveDate,
        previous: NaiveDate,
        position: usize,
    },

    #[error("Non-finite count on {date}")]
    NonFiniteCount { date: NaiveDate },
}

/// A single daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub count: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, count: f64) -> Self {
        Self { date, count }
    }
}

/// Date-indexed daily counts with strictly increasing dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Build a series from observations that are already in ascending order.
    ///
    /// Fails on the first duplicate or out-of-order date.
    pub fn new(observations: Vec<Observation>) -> Result<Self, SeriesError> {
        for (position, pair) in observations.windows(2).enumerate() {
            let (previous, current) = (pair[0].date, pair[1].date);
            if current == previous {
                return Err(SeriesError::DuplicateDate {
                    date: current,
                    position: position + 1,
                });
            }
            if current < previous {
                return Err(SeriesError::NonMonotonic {
                    date: current,
                    previous,
                    position: position + 1,
                });
            }
        }

        if let Some(bad) = observations.iter().find(|o| !o.count.is_finite()) {
            return Err(SeriesError::NonFiniteCount { date: bad.date });
        }

        Ok(Self { observations })
    }

    /// Sort observations by date, then validate.
    ///
    /// Sorting is the only normalisation applied; duplicate dates are still
    /// rejected afterwards.
    pub fn from_unsorted(mut observations: Vec<Observation>) -> Result<Self, SeriesError> {
        observations.sort_by_key(|o| o.date);
        Self::new(observations)
    }

    /// Build from parallel date and count slices (test and fixture helper).
    pub fn from_pairs(pairs: &[(NaiveDate, f64)]) -> Result<Self, SeriesError> {
        Self::new(
            pairs
                .iter()
                .map(|&(date, count)| Observation::new(date, count))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn get(&self, position: usize) -> Option<&Observation> {
        self.observations.get(position)
    }

    pub fn counts(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.count).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.observations.iter().map(|o| o.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Running total of the counts, aligned with the observations.
    pub fn cumulative(&self) -> Vec<f64> {
        self.observations
            .iter()
            .scan(0.0, |total, o| {
                *total += o.count;
                Some(*total)
            })
            .collect()
    }

    /// Calendar days between the first and last observation that have no row.
    pub fn missing_days(&self) -> i64 {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => {
                let span = (last - first).num_days() + 1;
                span - self.len() as i64
            }
            _ => 0,
        }
    }
}
