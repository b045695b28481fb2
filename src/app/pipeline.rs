//! Shared indicator pipeline used by the single-series and batch commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load series -> align -> indicator -> trigger statistics
//!
//! The front-ends can then focus on presentation (printing vs files).

use rayon::prelude::*;
use serde::Serialize;

use crate::data::{SeriesSource, open_source};
use crate::domain::{
    BatchConfig, BinarySeries, DateRange, EventWindows, IndicatorParams, ObservationSeries, RunConfig,
    TimeSeries,
};
use crate::error::AppError;
use crate::io::ingest::{Region, load_regions};
use crate::signal::{IndicatorSeries, align_inputs, compute_from_observations};
use crate::stats::{TriggerStats, compute_trigger_stats};

/// All computed outputs of a single indicator run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub range: DateRange,
    /// The selected base field over the aligned range (what the indicator was built from).
    pub rates: TimeSeries,
    pub indicator: IndicatorSeries,
    pub stats: TriggerStats,
}

/// Serializable view of a run for `--summary-json`.
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub base_id: &'a str,
    pub relative_id: &'a str,
    pub recession_id: &'a str,
    pub params: &'a IndicatorParams,
    pub windows: &'a EventWindows,
    pub range: DateRange,
    pub defined_records: usize,
    pub diagnostics: crate::signal::WindowDiagnostics,
    pub stats: &'a TriggerStats,
}

impl<'a> RunSummary<'a> {
    pub fn new(config: &'a RunConfig, run: &'a RunOutput) -> Self {
        Self {
            base_id: &config.base_id,
            relative_id: &config.relative_id,
            recession_id: &config.recession_id,
            params: &config.params,
            windows: &config.windows,
            range: run.range,
            defined_records: run.indicator.defined().count(),
            diagnostics: run.indicator.diagnostics,
            stats: &run.stats,
        }
    }
}

/// One region of a batch run that computed successfully.
#[derive(Debug, Clone)]
pub struct RegionOutput {
    pub region: Region,
    pub run: RunOutput,
}

/// Batch results; failed regions are reported, not fatal.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub regions: Vec<RegionOutput>,
    pub skipped: Vec<(Region, AppError)>,
}

/// Load the configured series and run the full pipeline.
pub fn run_compute(config: &RunConfig) -> Result<RunOutput, AppError> {
    let source = open_source(&config.source)?;
    run_with_source(source.as_ref(), config)
}

/// Same as [`run_compute`] with an explicit source.
pub fn run_with_source(source: &dyn SeriesSource, config: &RunConfig) -> Result<RunOutput, AppError> {
    let base = source.observations(&config.base_id)?;
    // The common case compares a series against itself; fetch it once.
    let relative = if config.relative_id == config.base_id {
        base.clone()
    } else {
        source.observations(&config.relative_id)?
    };
    let recession = source.flags(&config.recession_id)?;

    run_with_inputs(&base, &relative, &recession, &config.params, &config.windows)
}

/// Execute the pipeline on already loaded series.
pub fn run_with_inputs(
    base: &ObservationSeries,
    relative: &ObservationSeries,
    recession: &BinarySeries,
    params: &IndicatorParams,
    windows: &EventWindows,
) -> Result<RunOutput, AppError> {
    let aligned = align_inputs(base, relative, recession)?;
    let indicator = compute_from_observations(&aligned.base, &aligned.relative, Some(&aligned.recession), params)?;

    let diag = indicator.diagnostics;
    if diag.missing_samples > 0 {
        log::warn!(
            "{} records undefined because of missing samples ({} more in warm-up)",
            diag.missing_samples,
            diag.insufficient_history
        );
    } else {
        log::debug!("{} warm-up records undefined", diag.insufficient_history);
    }

    let stats = compute_trigger_stats(&indicator, &aligned.recession, windows);
    log::info!(
        "{}..{}: {} defined records, {} triggers",
        aligned.range.start,
        aligned.range.end,
        indicator.defined().count(),
        stats.triggers.len()
    );

    Ok(RunOutput {
        range: aligned.range,
        rates: aligned.base.select(params.field, params.on_missing),
        indicator,
        stats,
    })
}

/// Run every region of a batch.
///
/// Series are fetched one at a time (the source may be rate limited); the
/// per-region computations are independent and run in parallel.
pub fn run_batch(config: &BatchConfig) -> Result<BatchOutput, AppError> {
    let source = open_source(&config.source)?;
    let regions = load_regions(&config.regions_path)?;
    run_batch_with_source(source.as_ref(), regions, config)
}

pub fn run_batch_with_source(
    source: &dyn SeriesSource,
    mut regions: Vec<Region>,
    config: &BatchConfig,
) -> Result<BatchOutput, AppError> {
    if let Some(limit) = config.limit {
        regions.truncate(limit);
    }
    let recession = source.flags(&config.recession_id)?;
    log::info!("processing {} regions against {}", regions.len(), config.recession_id);

    let mut output = BatchOutput::default();
    let mut loaded = Vec::with_capacity(regions.len());
    for region in regions {
        match source.observations(&region.series_id) {
            Ok(series) => loaded.push((region, series)),
            Err(err) => {
                log::warn!("skipping {} ({}): {err}", region.name, region.series_id);
                output.skipped.push((region, err));
            }
        }
    }

    // Evaluate each region independently (parallel).
    let results: Vec<(Region, Result<RunOutput, AppError>)> = loaded
        .into_par_iter()
        .map(|(region, series)| {
            let run = run_with_inputs(&series, &series, &recession, &config.params, &config.windows);
            (region, run)
        })
        .collect();

    for (region, result) in results {
        match result {
            Ok(run) => output.regions.push(RegionOutput { region, run }),
            Err(err) => {
                log::warn!("skipping {} ({}): {err}", region.name, region.series_id);
                output.skipped.push((region, err));
            }
        }
    }

    log::info!(
        "batch finished: {} computed, {} skipped",
        output.regions.len(),
        output.skipped.len()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{Months, NaiveDate};

    use super::*;
    use crate::domain::{Sample, Series, SourceSpec, observations_from_values};

    struct MemorySource {
        series: HashMap<String, ObservationSeries>,
    }

    impl SeriesSource for MemorySource {
        fn observations(&self, series_id: &str) -> Result<ObservationSeries, AppError> {
            self.series
                .get(series_id)
                .cloned()
                .ok_or_else(|| AppError::new(3, format!("unknown series {series_id}")))
        }
    }

    fn month(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Months::new(i as u32)
    }

    fn rising_rates() -> ObservationSeries {
        observations_from_values(
            (0..24)
                .map(|i| {
                    let v = if i < 18 { 4.0 } else { 4.0 + (i - 17) as f64 * 2.0 / 6.0 };
                    (month(i), Some(v))
                })
                .collect(),
        )
        .unwrap()
    }

    fn recession_flags() -> ObservationSeries {
        observations_from_values((0..24).map(|i| (month(i), Some(if i >= 21 { 1.0 } else { 0.0 }))).collect())
            .unwrap()
    }

    fn source() -> MemorySource {
        let mut series = HashMap::new();
        series.insert("RATE".to_string(), rising_rates());
        series.insert("USREC".to_string(), recession_flags());
        MemorySource { series }
    }

    fn batch_config() -> BatchConfig {
        BatchConfig {
            regions_path: "regions.csv".into(),
            recession_id: "USREC".to_string(),
            params: IndicatorParams::new(3, 3, 12, 0.5, false, Default::default()).unwrap(),
            windows: EventWindows::default(),
            source: SourceSpec::CsvDir(".".into()),
            out_dir: "out".into(),
            limit: None,
        }
    }

    #[test]
    fn single_run_finds_trigger_before_recession() {
        let config = RunConfig {
            base_id: "RATE".to_string(),
            relative_id: "RATE".to_string(),
            recession_id: "USREC".to_string(),
            params: IndicatorParams::new(3, 3, 12, 0.5, false, Default::default()).unwrap(),
            windows: EventWindows::default(),
            source: SourceSpec::CsvDir(".".into()),
            export_series: None,
            summary_json: None,
        };
        let run = run_with_source(&source(), &config).unwrap();

        assert_eq!(run.range.start, month(0));
        assert_eq!(run.stats.triggers, vec![month(20)]);
        assert_eq!(run.stats.recession_starts, vec![month(21)]);
        assert_eq!(run.stats.accuracy, Some(100.0));
        assert_eq!(run.rates.len(), 24);

        let json = serde_json::to_value(RunSummary::new(&config, &run)).unwrap();
        assert_eq!(json["stats"]["accuracy"], 100.0);
        assert_eq!(json["defined_records"], 11);
    }

    #[test]
    fn batch_skips_unknown_regions() {
        let regions = vec![
            Region {
                name: "Good".to_string(),
                series_id: "RATE".to_string(),
            },
            Region {
                name: "Missing".to_string(),
                series_id: "NOPE".to_string(),
            },
        ];
        let out = run_batch_with_source(&source(), regions, &batch_config()).unwrap();
        assert_eq!(out.regions.len(), 1);
        assert_eq!(out.regions[0].region.name, "Good");
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].0.series_id, "NOPE");
    }

    #[test]
    fn batch_respects_limit_and_skips_non_overlapping_series() {
        let mut src = source();
        let later = Series::new(vec![Sample::new(
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            crate::domain::Observation::raw(Some(5.0)),
        )])
        .unwrap();
        src.series.insert("LATER".to_string(), later);

        let regions = vec![
            Region {
                name: "Later".to_string(),
                series_id: "LATER".to_string(),
            },
            Region {
                name: "Good".to_string(),
                series_id: "RATE".to_string(),
            },
        ];

        let mut config = batch_config();
        config.limit = Some(1);
        let out = run_batch_with_source(&src, regions, &config).unwrap();
        assert!(out.regions.is_empty());
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].1.exit_code(), 3);
    }
}
