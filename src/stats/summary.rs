//! Per-series trigger statistics.
//!
//! Combines the run extractor with event matching the way a region report
//! needs it:
//!
//! - triggers are the starts of indicator runs
//! - recession starts only count from a few months before the first trigger
//! - accuracy and recession lead time use `accuracy_time_range`
//! - committee lead time uses `committee_time_range` and only leading matches

use chrono::{Months, NaiveDate};
use serde::Serialize;

use crate::domain::{BinarySeries, DateRange, EventWindows, LeadLagSummary, Period};
use crate::signal::{IndicatorSeries, extract_runs, run_starts};

use super::events::{accuracy_percent, lead_lag_summary};

/// Trigger statistics for one indicator series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerStats {
    pub triggers: Vec<NaiveDate>,
    pub recession_periods: Vec<Period>,
    pub recession_starts: Vec<NaiveDate>,
    /// `None` when the indicator never triggered.
    pub accuracy: Option<f64>,
    pub recession_lead_lag: LeadLagSummary,
    pub committee_lead_lag: LeadLagSummary,
    pub last_indicator_value: Option<f64>,
}

impl TriggerStats {
    /// Mean signed offset to the nearest recession start.
    pub fn recession_lead_time(&self) -> Option<f64> {
        self.recession_lead_lag.overall_average_days
    }

    /// Mean lead ahead of committee announcements.
    pub fn committee_lead_time(&self) -> Option<f64> {
        self.committee_lead_lag.average_days_leading
    }
}

/// Compute trigger statistics against recession flags and committee dates.
pub fn compute_trigger_stats(
    indicator: &IndicatorSeries,
    recession: &BinarySeries,
    windows: &EventWindows,
) -> TriggerStats {
    let triggers = run_starts(&indicator.binary_series());

    let reference = match triggers.first() {
        Some(&first) => clip_from(recession, lookback_start(first, windows.reference_lookback_months)),
        None => recession.clone(),
    };
    let recession_periods = extract_runs(&reference);
    let recession_starts: Vec<NaiveDate> = recession_periods.iter().map(|p| p.start).collect();

    TriggerStats {
        accuracy: accuracy_percent(&triggers, &recession_starts, windows.accuracy_time_range),
        recession_lead_lag: lead_lag_summary(&triggers, &recession_starts, windows.accuracy_time_range),
        committee_lead_lag: lead_lag_summary(&triggers, &windows.committee_dates, windows.committee_time_range),
        last_indicator_value: indicator.last_defined().and_then(|r| r.value),
        triggers,
        recession_periods,
        recession_starts,
    }
}

fn lookback_start(first_trigger: NaiveDate, months: u32) -> NaiveDate {
    first_trigger
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

fn clip_from(series: &BinarySeries, start: NaiveDate) -> BinarySeries {
    match series.last_date().and_then(|end| DateRange::new(start, end)) {
        Some(range) => series.clip(range),
        None => BinarySeries::empty(),
    }
}
