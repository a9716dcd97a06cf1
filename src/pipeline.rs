//! File-level stages: time series file in, train/test CSVs out.
//!
//! The feature computation itself is pure; this module only surrounds it
//! with reading the series and writing the two tables. Both frames are
//! built before either file is written.

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::config::{ConfigError, PipelineConfig};
use crate::data::{write_csv, LoaderError, TimeSeries};
use crate::features::{BuildOutput, SupervisedBuilder};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Loader(#[from] LoaderError),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Where the tables went and what was built.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub output: BuildOutput,
}

/// Build train/test tables from an in-memory series and write them.
pub fn write_supervised(
    config: &PipelineConfig,
    series: &TimeSeries,
    with_dates: bool,
) -> Result<BuildSummary, PipelineError> {
    config.validate()?;
    let builder = SupervisedBuilder::new(&config.features).map_err(ConfigError::from)?;
    let output = builder.build(series);

    let mut train_df = output.split.train.to_dataframe(with_dates)?;
    let mut test_df = output.split.test.to_dataframe(with_dates)?;

    let train_path = config.train_path();
    let test_path = config.test_path();
    write_csv(&mut train_df, &train_path)?;
    write_csv(&mut test_df, &test_path)?;

    info!(
        train = %train_path.display(),
        test = %test_path.display(),
        "saved supervised train/test"
    );

    Ok(BuildSummary {
        train_path,
        test_path,
        output,
    })
}

/// Load the configured time series file, build and write the tables.
pub fn build_supervised(
    config: &PipelineConfig,
    with_dates: bool,
) -> Result<BuildSummary, PipelineError> {
    config.validate()?;
    let series = config.loader().load(&config.data.timeseries_path)?;
    write_supervised(config, &series, with_dates)
}
