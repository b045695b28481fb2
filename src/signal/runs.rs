//! Contiguous-run extraction over binary series.
//!
//! A run opens on the first set flag after an unset or undefined sample and
//! closes on the next unset or undefined sample. Undefined samples never
//! start or extend a run. A run still open when the series ends is closed at
//! the last sample's date rather than dropped.

use chrono::NaiveDate;

use crate::domain::{BinarySeries, Period};

/// Maximal runs of set flags, in date order. Periods are inclusive.
pub fn extract_runs(series: &BinarySeries) -> Vec<Period> {
    let mut periods = Vec::new();
    let mut open: Option<Period> = None;

    for sample in series {
        if sample.value == Some(true) {
            let period = open.get_or_insert(Period {
                start: sample.date,
                end: sample.date,
            });
            period.end = sample.date;
        } else if let Some(period) = open.take() {
            periods.push(period);
        }
    }

    periods.extend(open);
    periods
}

/// Start date of every run; the trigger events for event statistics.
pub fn run_starts(series: &BinarySeries) -> Vec<NaiveDate> {
    extract_runs(series).into_iter().map(|p| p.start).collect()
}
