//! Validation of the daily case series before feature construction.

pub mod integrity;

pub use integrity::{
    find_gaps, CheckResult, DateGap, SeriesIntegrityReport, SeriesValidator, ValidationError,
    ValidationResult,
};
