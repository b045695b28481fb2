//! Command-line parsing for the recession signal tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the indicator/statistics code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{
    DEFAULT_ACCURACY_TIME_RANGE, DEFAULT_ALPHA_THRESHOLD, DEFAULT_COMMITTEE_TIME_RANGE, DEFAULT_K, DEFAULT_M,
    DEFAULT_TIME_PERIOD, MissingMode,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sahm", version, about = "Sahm-rule recession signal from unemployment series")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute the indicator for one series, print a report, and optionally export.
    Compute(ComputeArgs),
    /// Compute the indicator for every region in a list and write CSV files.
    Regions(RegionsArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct ComputeArgs {
    /// Series whose short moving average is measured.
    #[arg(long, default_value = "UNRATE")]
    pub base: String,

    /// Series whose rolling minimum is the reference level (defaults to `--base`).
    #[arg(long)]
    pub relative: Option<String>,

    /// Recession flag series (1 = recession).
    #[arg(long, default_value = "USREC")]
    pub recession: String,

    /// Export the per-date series to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Write the run summary (params, periods, triggers, statistics) as JSON.
    #[arg(long = "summary-json", value_name = "JSON")]
    pub summary_json: Option<PathBuf>,

    #[command(flatten)]
    pub indicator: IndicatorArgs,

    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct RegionsArgs {
    /// CSV with a region name column and a `SeriesId` column.
    #[arg(long, value_name = "CSV")]
    pub regions: PathBuf,

    /// Directory for per-region and aggregated CSV files.
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Recession flag series (1 = recession).
    #[arg(long, default_value = "USREC")]
    pub recession: String,

    /// Only process the first N regions.
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub indicator: IndicatorArgs,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Indicator and statistics parameters shared by both commands.
#[derive(Debug, Args, Clone)]
pub struct IndicatorArgs {
    /// Window of the base moving average.
    #[arg(short = 'k', default_value_t = DEFAULT_K)]
    pub k: usize,

    /// Window of the relative moving average.
    #[arg(short = 'm', default_value_t = DEFAULT_M)]
    pub m: usize,

    /// Window of the rolling minimum over the relative average.
    #[arg(long, default_value_t = DEFAULT_TIME_PERIOD)]
    pub time_period: usize,

    /// Use the seasonally adjusted field instead of the raw value (CSV sources only).
    #[arg(long)]
    pub seasonal: bool,

    /// Threshold at which the indicator signals.
    #[arg(long, default_value_t = DEFAULT_ALPHA_THRESHOLD)]
    pub alpha: f64,

    /// Days either side of a recession start that count as a hit.
    #[arg(long, default_value_t = DEFAULT_ACCURACY_TIME_RANGE)]
    pub accuracy_range: i64,

    /// Days either side of a committee announcement that count as a match.
    #[arg(long, default_value_t = DEFAULT_COMMITTEE_TIME_RANGE)]
    pub committee_range: i64,

    /// Committee announcement date (repeatable; replaces the built-in list).
    #[arg(long = "committee-date", value_name = "YYYY-MM-DD")]
    pub committee_dates: Vec<NaiveDate>,

    /// How missing samples are treated.
    #[arg(long, value_enum, default_value_t = MissingMode::Propagate)]
    pub on_missing: MissingMode,

    /// Value used for missing samples with `--on-missing substitute`.
    #[arg(long, default_value_t = 0.0)]
    pub missing_default: f64,
}

/// Where series are loaded from.
#[derive(Debug, Args, Clone)]
pub struct SourceArgs {
    /// Read `<DIR>/<SERIES_ID>.csv` files instead of calling FRED.
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// First observation date requested from FRED.
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub observation_start: Option<NaiveDate>,

    /// Delay between FRED requests (milliseconds).
    #[arg(long, default_value_t = crate::data::DEFAULT_REQUEST_DELAY_MS)]
    pub request_delay_ms: u64,
}
