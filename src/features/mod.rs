//! Supervised feature construction.
//!
//! Turns a daily series into lag, rolling-window and pct-change features
//! with a future target, then splits the rows by time.

pub mod builder;
pub mod config;
pub mod table;

pub use builder::{BuildOutput, BuildWarning, SupervisedBuilder};
pub use config::{FeatureConfig, FeatureError, FeatureParams};
pub use table::{FeatureRow, RollingStats, SupervisedTable};
