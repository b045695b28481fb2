//! Indicator synthesis.
//!
//! For each date:
//!
//! ```text
//! indicator = MA(base, k) - rolling_min(MA(relative, m), time_period)
//! binary    = indicator >= alpha_threshold
//! ```
//!
//! Base and relative must already share identical dates (see [`super::align`]).
//! The rolling minimum only starts once the relative average is defined, so it
//! always spans `time_period` averages: the first defined record is at
//! `max(k - 1, (m - 1) + (time_period - 1))`. Undefined inputs give an
//! undefined indicator and an undefined flag; they are counted in
//! [`WindowDiagnostics`] rather than dropped.

use serde::Serialize;

use crate::domain::{
    BinarySeries, IndicatorParams, IndicatorRecord, ObservationSeries, Sample, Series, TimeSeries,
};
use crate::error::AlignmentError;
use crate::math::{moving_average, rolling_min};

use super::align::ensure_same_dates;

/// Why records came out undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WindowDiagnostics {
    /// Records before the longest window has filled.
    pub insufficient_history: usize,
    /// Records past warm-up that are undefined because of missing samples.
    pub missing_samples: usize,
}

/// Indicator output for one base/relative pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSeries {
    pub records: Vec<IndicatorRecord>,
    pub diagnostics: WindowDiagnostics,
}

impl IndicatorSeries {
    /// Records with a defined indicator value.
    pub fn defined(&self) -> impl Iterator<Item = &IndicatorRecord> + '_ {
        self.records.iter().filter(|r| r.is_defined())
    }

    pub fn last_defined(&self) -> Option<&IndicatorRecord> {
        self.records.iter().rev().find(|r| r.is_defined())
    }

    /// The threshold flag as a binary series (undefined where the indicator is).
    pub fn binary_series(&self) -> BinarySeries {
        Series::from_ordered(
            self.records
                .iter()
                .map(|r| Sample::new(r.date, r.binary))
                .collect(),
        )
    }
}

/// Compute the indicator from two numeric series with identical dates.
///
/// `recession` is joined by date and copied into each record; it has no effect
/// on the indicator itself. Dates absent from it follow `params.on_missing`.
pub fn compute_indicator(
    base: &TimeSeries,
    relative: &TimeSeries,
    recession: Option<&BinarySeries>,
    params: &IndicatorParams,
) -> Result<IndicatorSeries, AlignmentError> {
    ensure_same_dates(base, relative)?;

    let base_avg = moving_average(&base.values(), params.k);
    let relative_avg = moving_average(&relative.values(), params.m);

    // The minimum runs over the averages only, skipping the `m - 1` warm-up slots.
    let avg_start = params.m.get() - 1;
    let relative_min = rolling_min(relative_avg.get(avg_start..).unwrap_or(&[]), params.time_period);

    let warm_up = (params.k.get() - 1).max(avg_start.saturating_add(params.time_period.get() - 1));

    let mut diagnostics = WindowDiagnostics::default();
    let mut records = Vec::with_capacity(base.len());

    for (i, sample) in base.iter().enumerate() {
        let min = i
            .checked_sub(avg_start)
            .and_then(|j| relative_min.get(j).copied().flatten());
        let value = match (base_avg[i], min) {
            (Some(avg), Some(min)) => Some(avg - min),
            _ => None,
        };

        if value.is_none() {
            if i < warm_up {
                diagnostics.insufficient_history += 1;
            } else {
                diagnostics.missing_samples += 1;
            }
        }

        let recession_reference = recession.and_then(|rec| {
            params.on_missing.apply_flag(rec.get(sample.date).copied().flatten())
        });

        records.push(IndicatorRecord {
            date: sample.date,
            value,
            binary: value.map(|v| v >= params.alpha_threshold),
            recession_reference,
        });
    }

    Ok(IndicatorSeries {
        records,
        diagnostics,
    })
}

/// Resolve the configured field on both inputs, then compute the indicator.
pub fn compute_from_observations(
    base: &ObservationSeries,
    relative: &ObservationSeries,
    recession: Option<&BinarySeries>,
    params: &IndicatorParams,
) -> Result<IndicatorSeries, AlignmentError> {
    let base = base.select(params.field, params.on_missing);
    let relative = relative.select(params.field, params.on_missing);
    compute_indicator(&base, &relative, recession, params)
}
