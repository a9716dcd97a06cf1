//! caseflow CLI
//!
//! # Usage
//!
//! ```bash
//! # Inspect raw CSVs and suggest date/case columns
//! caseflow preprocess --inspect
//!
//! # Build the daily time series from data/raw
//! caseflow preprocess
//!
//! # Check the series before building features
//! caseflow validate
//!
//! # Build train.csv / test.csv
//! caseflow build --lags 14 --windows 7,14 --horizon 1 --test-size 14
//!
//! # Score baseline forecasts on the holdout and walk-forward folds
//! caseflow evaluate --config config/default.toml
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use caseflow::data::{
    find_raw_csvs, inspect_columns, read_raw_file, resolve_columns, write_timeseries,
    DailyAggregator,
};
use caseflow::{
    build_supervised, Evaluator, PipelineConfig, SeriesValidator, SupervisedBuilder,
};

const SEPARATOR: &str = "============================================================";

#[derive(Parser)]
#[command(name = "caseflow")]
#[command(about = "Daily case series to leakage-safe supervised train/test tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate raw case CSVs into a daily time series
    Preprocess {
        /// Directory with raw CSV files
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        /// Output time series file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Date column in the raw files (auto-detected when omitted)
        #[arg(long)]
        date_col: Option<String>,

        /// Case column in the raw files (auto-detected when omitted)
        #[arg(long)]
        cases_col: Option<String>,

        /// Only list files, columns and suggested columns
        #[arg(long)]
        inspect: bool,
    },

    /// Build supervised train/test tables from the time series
    Build {
        #[command(flatten)]
        features: FeatureArgs,

        /// Output directory for train.csv and test.csv
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Also write date and target_date columns
        #[arg(long)]
        with_dates: bool,

        /// Fail when the supervised table is empty
        #[arg(long)]
        strict_empty: bool,
    },

    /// Check the time series for gaps, bad counts and sufficient length
    Validate {
        #[command(flatten)]
        features: FeatureArgs,
    },

    /// Score baseline forecasts on the test rows and on walk-forward folds
    Evaluate {
        #[command(flatten)]
        features: FeatureArgs,

        /// Number of walk-forward folds
        #[arg(long)]
        folds: Option<usize>,

        /// Comma-separated baselines (persistence, rolling_mean_<w>, seasonal_<k>, train_mean)
        #[arg(long, value_delimiter = ',')]
        baselines: Option<Vec<String>>,

        /// Output directory for metrics.json
        #[arg(long)]
        reports_dir: Option<PathBuf>,
    },
}

/// Overrides shared by every command that reads the time series.
#[derive(clap::Args)]
struct FeatureArgs {
    /// Time series file
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Count column in the time series file
    #[arg(long)]
    count_column: Option<String>,

    /// Number of lag features
    #[arg(long, allow_negative_numbers = true)]
    lags: Option<i64>,

    /// Comma-separated rolling window sizes
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    windows: Option<Vec<i64>>,

    /// Prediction horizon in days
    #[arg(long, allow_negative_numbers = true)]
    horizon: Option<i64>,

    /// Number of most recent rows held out as test
    #[arg(long, allow_negative_numbers = true)]
    test_size: Option<i64>,
}

impl FeatureArgs {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(input) = self.input {
            config.data.timeseries_path = input;
        }
        if let Some(column) = self.count_column {
            config.data.count_column = column;
        }
        if let Some(lags) = self.lags {
            config.features.lags = lags;
        }
        if let Some(windows) = self.windows {
            config.features.rolling_windows = windows;
        }
        if let Some(horizon) = self.horizon {
            config.features.horizon = horizon;
        }
        if let Some(test_size) = self.test_size {
            config.features.test_size = test_size;
        }
    }
}

fn cmd_preprocess(
    config: &PipelineConfig,
    date_col: Option<String>,
    cases_col: Option<String>,
    inspect: bool,
) -> Result<()> {
    let raw_dir = &config.data.raw_dir;
    let csvs = find_raw_csvs(raw_dir)?;
    if csvs.is_empty() {
        println!(
            "No CSV files found in {}. Copy or download the raw data first.",
            raw_dir.display()
        );
        return Ok(());
    }

    let info = inspect_columns(&csvs);
    let resolved = resolve_columns(&info, date_col.as_deref(), cases_col.as_deref());

    if inspect {
        println!("{}", SEPARATOR);
        println!("Raw files in {}", raw_dir.display());
        println!("{}", SEPARATOR);
        for file in &info {
            println!("\n{}", file.path.display());
            println!("  Columns: {:?}", file.columns);
        }
        println!();
        match &resolved {
            Ok((date, cases)) => {
                println!("Suggested date column: {}", date);
                println!("Suggested case column: {}", cases);
            }
            Err(e) => println!("{}", e),
        }
        println!("\nRe-run without --inspect (optionally with --date-col/--cases-col) to build.");
        return Ok(());
    }

    let (date_col, cases_col) = resolved?;
    println!("Using date column '{}', case column '{}'", date_col, cases_col);

    let pb = ProgressBar::new(csvs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    let mut aggregator = DailyAggregator::new();
    for path in &csvs {
        pb.set_message(path.display().to_string());
        match read_raw_file(path, &date_col, &cases_col) {
            Ok(observations) => aggregator.add_file(&observations),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping file"),
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} of {} files used", aggregator.files_used(), csvs.len()));

    let series = aggregator.finish()?;
    let out = &config.data.timeseries_path;
    write_timeseries(&series, &config.data.count_column, out)
        .with_context(|| format!("Failed to write {}", out.display()))?;

    println!("\nSaved time series to {}", out.display());
    println!(
        "  Days: {} ({} to {})",
        series.len(),
        series.first_date().map(|d| d.to_string()).unwrap_or_default(),
        series.last_date().map(|d| d.to_string()).unwrap_or_default()
    );
    println!("  Total cases: {}", series.cumulative().last().copied().unwrap_or(0.0));

    Ok(())
}

fn cmd_build(config: &PipelineConfig, with_dates: bool, strict_empty: bool) -> Result<()> {
    let summary = build_supervised(config, with_dates)?;
    let split = &summary.output.split;

    for warning in &summary.output.warnings {
        println!("Warning: {}", warning);
    }

    println!("Saved supervised train/test:");
    println!("  {} ({} rows)", summary.train_path.display(), split.train.len());
    println!("  {} ({} rows)", summary.test_path.display(), split.test.len());
    if let (Some(train_end), Some(test_start)) = (split.train.last_date(), split.test.first_date()) {
        println!("  Train ends {}, test starts {}", train_end, test_start);
    }

    if strict_empty && summary.output.has_empty_result() {
        bail!("supervised table is empty");
    }

    Ok(())
}

fn cmd_validate(config: &PipelineConfig) -> Result<()> {
    let params = config.validate()?;
    let path = &config.data.timeseries_path;

    let report = SeriesValidator::new()
        .with_params(params)
        .validate_file(&config.loader(), path)?;

    println!("{}", SEPARATOR);
    println!("{}", path.display());
    println!("{}", report.summary());
    println!("{}", SEPARATOR);
    for check in &report.checks {
        let status = if check.passed { "PASS" } else { "FAIL" };
        println!("  [{}] {}: {}", status, check.name, check.message);
        if let Some(details) = &check.details {
            println!("         {}", details);
        }
    }

    Ok(())
}

fn cmd_evaluate(config: &PipelineConfig) -> Result<()> {
    config.validate()?;
    let evaluator = Evaluator::new(&config.evaluation)?;
    let builder = SupervisedBuilder::new(&config.features)?;

    let path = &config.data.timeseries_path;
    let series = config
        .loader()
        .load(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let output = builder.build(&series);
    if output.has_empty_result() {
        bail!("supervised table is empty; nothing to evaluate");
    }

    let report = evaluator.evaluate(&output.split)?;
    println!("{}", report.summary());
    if let Some(best) = report.best_holdout() {
        println!("Best holdout baseline: {}", best.baseline);
    }

    let metrics_path = config.metrics_path();
    report.write_json(&metrics_path)?;
    println!("\nSaved metrics to {}", metrics_path.display());

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("caseflow=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Preprocess {
            raw_dir,
            output,
            date_col,
            cases_col,
            inspect,
        } => {
            if let Some(raw_dir) = raw_dir {
                config.data.raw_dir = raw_dir;
            }
            if let Some(output) = output {
                config.data.timeseries_path = output;
            }
            cmd_preprocess(&config, date_col, cases_col, inspect)?;
        }
        Commands::Build {
            features,
            output_dir,
            with_dates,
            strict_empty,
        } => {
            features.apply(&mut config);
            if let Some(output_dir) = output_dir {
                config.data.output_dir = output_dir;
            }
            cmd_build(&config, with_dates, strict_empty)?;
        }
        Commands::Validate { features } => {
            features.apply(&mut config);
            cmd_validate(&config)?;
        }
        Commands::Evaluate {
            features,
            folds,
            baselines,
            reports_dir,
        } => {
            features.apply(&mut config);
            if let Some(folds) = folds {
                config.evaluation.folds = folds;
            }
            if let Some(baselines) = baselines {
                config.evaluation.baselines = baselines;
            }
            if let Some(reports_dir) = reports_dir {
                config.data.reports_dir = reports_dir;
            }
            cmd_evaluate(&config)?;
        }
    }

    Ok(())
}
