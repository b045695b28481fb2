//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads series from FRED or a local directory
//! - runs the indicator pipeline
//! - prints reports and writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::{Command, ComputeArgs, IndicatorArgs, RegionsArgs, SourceArgs};
use crate::data::default_observation_start;
use crate::domain::{
    BatchConfig, EventWindows, IndicatorParams, MissingMode, MissingPolicy, RunConfig, SourceSpec, ValueField,
    default_committee_dates,
};
use crate::error::AppError;
use crate::io::RegionSummaryRow;

pub mod pipeline;

/// File name of the per-region summary written by `sahm regions`.
pub const AGGREGATED_FILE: &str = "map-data-aggregated.csv";

/// Entry point for the `sahm` binary.
pub fn run() -> Result<(), AppError> {
    // `sahm --base UNRATE` behaves like `sahm compute --base UNRATE`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Compute(args) => handle_compute(&args),
        Command::Regions(args) => handle_regions(&args),
    }
}

fn handle_compute(args: &ComputeArgs) -> Result<(), AppError> {
    let config = run_config_from_args(args)?;
    let run = pipeline::run_compute(&config)?;

    println!("{}", crate::report::format_run_summary(&config, &run));

    if let Some(path) = &config.export_series {
        crate::io::write_indicator_csv(path, &config.base_id, &run.rates, &run.indicator)?;
        log::info!("wrote {}", path.display());
    }
    if let Some(path) = &config.summary_json {
        crate::io::write_json(path, &pipeline::RunSummary::new(&config, &run))?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}

fn handle_regions(args: &RegionsArgs) -> Result<(), AppError> {
    let config = batch_config_from_args(args)?;
    std::fs::create_dir_all(&config.out_dir).map_err(|e| {
        AppError::new(
            4,
            format!("Failed to create output directory '{}': {e}", config.out_dir.display()),
        )
    })?;

    let batch = pipeline::run_batch(&config)?;
    if batch.regions.is_empty() {
        return Err(AppError::new(3, "No region could be computed."));
    }

    let rows = write_batch_outputs(&config.out_dir, &batch)?;
    println!("{}", crate::report::format_region_table(&rows));
    if !batch.skipped.is_empty() {
        println!("Skipped {} region(s); see log for details.", batch.skipped.len());
    }
    Ok(())
}

/// Write `<SERIES_ID>.csv` per region plus the aggregated summary; returns the summary rows.
pub fn write_batch_outputs(out_dir: &Path, batch: &pipeline::BatchOutput) -> Result<Vec<RegionSummaryRow>, AppError> {
    let mut rows = Vec::with_capacity(batch.regions.len());
    for out in &batch.regions {
        let path = out_dir.join(format!("{}.csv", out.region.series_id));
        crate::io::write_indicator_csv(&path, &out.region.name, &out.run.rates, &out.run.indicator)?;
        rows.push(RegionSummaryRow::new(&out.region.name, &out.region.series_id, &out.run.stats));
    }

    let aggregated = out_dir.join(AGGREGATED_FILE);
    crate::io::write_summary_csv(&aggregated, &rows)?;
    log::info!("wrote {} region files and {}", rows.len(), aggregated.display());
    Ok(rows)
}

pub fn run_config_from_args(args: &ComputeArgs) -> Result<RunConfig, AppError> {
    let params = indicator_params_from_args(&args.indicator)?;
    let source = source_from_args(&args.source);
    ensure_field_available(&params, &source)?;
    Ok(RunConfig {
        base_id: args.base.clone(),
        relative_id: args.relative.clone().unwrap_or_else(|| args.base.clone()),
        recession_id: args.recession.clone(),
        params,
        windows: event_windows_from_args(&args.indicator)?,
        source,
        export_series: args.export.clone(),
        summary_json: args.summary_json.clone(),
    })
}

pub fn batch_config_from_args(args: &RegionsArgs) -> Result<BatchConfig, AppError> {
    if args.limit == Some(0) {
        return Err(AppError::new(2, "`--limit` must be > 0."));
    }
    let params = indicator_params_from_args(&args.indicator)?;
    let source = source_from_args(&args.source);
    ensure_field_available(&params, &source)?;
    Ok(BatchConfig {
        regions_path: args.regions.clone(),
        recession_id: args.recession.clone(),
        params,
        windows: event_windows_from_args(&args.indicator)?,
        source,
        out_dir: args.out_dir.clone(),
        limit: args.limit,
    })
}

fn indicator_params_from_args(args: &IndicatorArgs) -> Result<IndicatorParams, AppError> {
    let on_missing = match args.on_missing {
        MissingMode::Propagate => MissingPolicy::Propagate,
        MissingMode::Substitute => MissingPolicy::Substitute(args.missing_default),
    };
    IndicatorParams::new(args.k, args.m, args.time_period, args.alpha, args.seasonal, on_missing)
}

fn event_windows_from_args(args: &IndicatorArgs) -> Result<EventWindows, AppError> {
    let dates = if args.committee_dates.is_empty() {
        default_committee_dates()
    } else {
        args.committee_dates.clone()
    };
    EventWindows::new(args.accuracy_range, args.committee_range, dates)
}

/// FRED publishes only the raw value; the adjusted field comes from CSV files.
fn ensure_field_available(params: &IndicatorParams, source: &SourceSpec) -> Result<(), AppError> {
    if params.field == ValueField::SeasonallyAdjusted && matches!(source, SourceSpec::Fred { .. }) {
        return Err(AppError::new(
            2,
            "`--seasonal` needs a `deseasonalized_value` column; use `--data-dir` with CSV files.",
        ));
    }
    Ok(())
}

fn source_from_args(args: &SourceArgs) -> SourceSpec {
    match &args.data_dir {
        Some(dir) => SourceSpec::CsvDir(dir.clone()),
        None => SourceSpec::Fred {
            observation_start: args.observation_start.unwrap_or_else(default_observation_start),
            request_delay_ms: args.request_delay_ms,
        },
    }
}

/// Rewrite argv so `sahm` defaults to `sahm compute`.
///
/// Rules:
/// - `sahm`                      -> `sahm compute`
/// - `sahm --base X ...`         -> `sahm compute --base X ...`
/// - `sahm --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("compute".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "compute" | "regions");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "compute flags".
    if arg1.starts_with('-') {
        argv.insert(1, "compute".to_string());
        return argv;
    }

    argv
}
