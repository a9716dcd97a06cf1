pub mod export;
pub mod loader;
pub mod preprocess;
pub mod types;

pub use export::{timeseries_to_dataframe, write_csv, write_timeseries};
pub use loader::{
    parse_date, read_csv, LoaderError, TimeSeriesLoader, CUMULATIVE_COLUMN, DEFAULT_COUNT_COLUMN,
};
pub use preprocess::{
    build_daily_series, detect_cases_column, detect_date_column, find_raw_csvs, inspect_columns,
    read_raw_file, resolve_columns, DailyAggregator, FileColumns, PreprocessError,
};
pub use types::{Observation, SeriesError, TimeSeries};
