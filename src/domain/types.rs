//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - passed by value into the pure computation functions
//! - exported to CSV/JSON
//! - built from CLI flags without the core knowing about clap

use std::num::NonZeroUsize;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::series::{Series, Sample, TimeSeries};
use crate::error::AppError;

/// Which field of an [`Observation`] feeds the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueField {
    /// The value as published.
    Raw,
    /// The caller-supplied seasonally adjusted value.
    SeasonallyAdjusted,
}

impl ValueField {
    pub fn from_seasonal(seasonal: bool) -> Self {
        if seasonal {
            ValueField::SeasonallyAdjusted
        } else {
            ValueField::Raw
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValueField::Raw => "value",
            ValueField::SeasonallyAdjusted => "deseasonalized_value",
        }
    }
}

/// What to do with a missing sample before it reaches the numeric pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Keep it missing; every window that contains it is undefined.
    #[default]
    Propagate,
    /// Replace it with a fixed default.
    Substitute(f64),
}

impl MissingPolicy {
    pub fn apply(self, value: Option<f64>) -> Option<f64> {
        match (value, self) {
            (Some(v), _) => Some(v),
            (None, MissingPolicy::Propagate) => None,
            (None, MissingPolicy::Substitute(default)) => Some(default),
        }
    }

    /// Flag variant: a substituted default counts as set when non-zero.
    pub fn apply_flag(self, flag: Option<bool>) -> Option<bool> {
        match (flag, self) {
            (Some(f), _) => Some(f),
            (None, MissingPolicy::Propagate) => None,
            (None, MissingPolicy::Substitute(default)) => Some(default != 0.0),
        }
    }
}

/// CLI spelling of [`MissingPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingMode {
    Propagate,
    Substitute,
}

/// A published sample: raw value plus an optional seasonally adjusted value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Observation {
    pub value: Option<f64>,
    pub deseasonalized_value: Option<f64>,
}

impl Observation {
    pub fn raw(value: Option<f64>) -> Self {
        Self {
            value,
            deseasonalized_value: None,
        }
    }

    pub fn field(&self, field: ValueField) -> Option<f64> {
        match field {
            ValueField::Raw => self.value,
            ValueField::SeasonallyAdjusted => self.deseasonalized_value,
        }
    }
}

pub type ObservationSeries = Series<Observation>;

impl ObservationSeries {
    /// Resolve one field into a numeric series, applying the missing policy once.
    pub fn select(&self, field: ValueField, on_missing: MissingPolicy) -> TimeSeries {
        self.map(|obs| on_missing.apply(obs.field(field).filter(|v| v.is_finite())))
    }
}

/// Maximal run of set flags, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One synthesized indicator sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRecord {
    pub date: NaiveDate,
    /// `None` until both windows are filled, or when a window holds a missing sample.
    pub value: Option<f64>,
    /// `value >= alpha_threshold`; `None` whenever `value` is `None`.
    pub binary: Option<bool>,
    /// Recession flag joined by date; display/statistics only.
    pub recession_reference: Option<bool>,
}

impl IndicatorRecord {
    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }
}

/// Mean signed day offsets to the nearest reference event.
///
/// Positive offsets mean the trigger came before the reference (leading).
/// Same-day matches (offset `0`) are neither leading nor lagging but count
/// towards `overall_average_days`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LeadLagSummary {
    pub average_days_leading: Option<f64>,
    pub average_days_lagging: Option<f64>,
    pub overall_average_days: Option<f64>,
}

pub const DEFAULT_K: usize = 3;
pub const DEFAULT_M: usize = 3;
pub const DEFAULT_TIME_PERIOD: usize = 13;
pub const DEFAULT_ALPHA_THRESHOLD: f64 = 0.5;
pub const DEFAULT_ACCURACY_TIME_RANGE: i64 = 200;
pub const DEFAULT_COMMITTEE_TIME_RANGE: i64 = 250;
pub const DEFAULT_REFERENCE_LOOKBACK_MONTHS: u32 = 3;

/// Recession announcement dates used for committee lead time.
pub const DEFAULT_COMMITTEE_DATES: [(i32, u32, u32); 6] = [
    (2020, 6, 8),
    (2008, 12, 1),
    (2001, 11, 26),
    (1991, 4, 25),
    (1982, 1, 6),
    (1980, 6, 3),
];

pub fn default_committee_dates() -> Vec<NaiveDate> {
    DEFAULT_COMMITTEE_DATES
        .iter()
        .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

/// Indicator parameters; immutable for the duration of one computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    /// Base moving-average window.
    pub k: NonZeroUsize,
    /// Relative moving-average window.
    pub m: NonZeroUsize,
    /// Rolling-minimum window over the relative average.
    pub time_period: NonZeroUsize,
    pub alpha_threshold: f64,
    pub field: ValueField,
    pub on_missing: MissingPolicy,
}

impl IndicatorParams {
    pub fn new(
        k: usize,
        m: usize,
        time_period: usize,
        alpha_threshold: f64,
        seasonal: bool,
        on_missing: MissingPolicy,
    ) -> Result<Self, AppError> {
        let window = |name: &str, v: usize| {
            NonZeroUsize::new(v).ok_or_else(|| AppError::new(2, format!("`{name}` must be > 0.")))
        };
        if !alpha_threshold.is_finite() {
            return Err(AppError::new(2, "Alpha threshold must be finite."));
        }
        if let MissingPolicy::Substitute(v) = on_missing {
            if !v.is_finite() {
                return Err(AppError::new(2, "Missing-value default must be finite."));
            }
        }
        Ok(Self {
            k: window("k", k)?,
            m: window("m", m)?,
            time_period: window("time_period", time_period)?,
            alpha_threshold,
            field: ValueField::from_seasonal(seasonal),
            on_missing,
        })
    }
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            k: NonZeroUsize::MIN.saturating_add(DEFAULT_K - 1),
            m: NonZeroUsize::MIN.saturating_add(DEFAULT_M - 1),
            time_period: NonZeroUsize::MIN.saturating_add(DEFAULT_TIME_PERIOD - 1),
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            field: ValueField::Raw,
            on_missing: MissingPolicy::Propagate,
        }
    }
}

/// Tolerance windows and reference events for trigger statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventWindows {
    /// Days either side of a recession start that count as a hit.
    pub accuracy_time_range: i64,
    /// Days either side of a committee announcement that count as a match.
    pub committee_time_range: i64,
    /// Recession starts earlier than the first trigger minus this many months are ignored.
    pub reference_lookback_months: u32,
    pub committee_dates: Vec<NaiveDate>,
}

impl EventWindows {
    pub fn new(
        accuracy_time_range: i64,
        committee_time_range: i64,
        committee_dates: Vec<NaiveDate>,
    ) -> Result<Self, AppError> {
        if accuracy_time_range <= 0 || committee_time_range <= 0 {
            return Err(AppError::new(2, "Tolerance windows must be > 0 days."));
        }
        let mut committee_dates = committee_dates;
        committee_dates.sort();
        committee_dates.dedup();
        Ok(Self {
            accuracy_time_range,
            committee_time_range,
            reference_lookback_months: DEFAULT_REFERENCE_LOOKBACK_MONTHS,
            committee_dates,
        })
    }
}

impl Default for EventWindows {
    fn default() -> Self {
        let mut committee_dates = default_committee_dates();
        committee_dates.sort();
        Self {
            accuracy_time_range: DEFAULT_ACCURACY_TIME_RANGE,
            committee_time_range: DEFAULT_COMMITTEE_TIME_RANGE,
            reference_lookback_months: DEFAULT_REFERENCE_LOOKBACK_MONTHS,
            committee_dates,
        }
    }
}

/// Where series come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    /// FRED `series/observations`, starting at the given date.
    Fred {
        observation_start: NaiveDate,
        request_delay_ms: u64,
    },
    /// `<dir>/<SERIES_ID>.csv` files.
    CsvDir(PathBuf),
}

/// A single `sahm compute` run as understood by the pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub base_id: String,
    pub relative_id: String,
    pub recession_id: String,
    pub params: IndicatorParams,
    pub windows: EventWindows,
    pub source: SourceSpec,
    pub export_series: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
}

/// A `sahm regions` batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub regions_path: PathBuf,
    pub recession_id: String,
    pub params: IndicatorParams,
    pub windows: EventWindows,
    pub source: SourceSpec,
    pub out_dir: PathBuf,
    pub limit: Option<usize>,
}

/// Convenience for building a raw-only observation series in tests and tools.
pub fn observations_from_values(points: Vec<(NaiveDate, Option<f64>)>) -> Result<ObservationSeries, AppError> {
    Ok(Series::new(
        points
            .into_iter()
            .map(|(date, v)| Sample::new(date, Observation::raw(v)))
            .collect(),
    )?)
}
