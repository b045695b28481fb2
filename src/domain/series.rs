//! Date-ordered series.
//!
//! `Series<T>` owns samples sorted strictly ascending by date. The invariant is
//! checked once in the constructors; every derived series (clipping, mapping)
//! preserves it, so downstream code can rely on it without re-checking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SeriesError;

/// One dated sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample<T> {
    pub date: NaiveDate,
    pub value: T,
}

impl<T> Sample<T> {
    pub fn new(date: NaiveDate, value: T) -> Self {
        Self { date, value }
    }
}

/// Closed calendar interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns `None` when `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Samples sorted strictly ascending by date (unique dates).
#[derive(Debug, Clone, PartialEq)]
pub struct Series<T> {
    samples: Vec<Sample<T>>,
}

/// Real-valued series; `None` marks a missing sample.
pub type TimeSeries = Series<Option<f64>>;

/// `{0, 1}` series; `None` marks an undefined sample.
pub type BinarySeries = Series<Option<bool>>;

impl<T> Series<T> {
    /// Build a series from samples that are already in ascending date order.
    pub fn new(samples: Vec<Sample<T>>) -> Result<Self, SeriesError> {
        for (index, pair) in samples.windows(2).enumerate() {
            let (previous, date) = (pair[0].date, pair[1].date);
            if previous == date {
                return Err(SeriesError::DuplicateDate { date });
            }
            if previous > date {
                return Err(SeriesError::OutOfOrder {
                    index: index + 1,
                    previous,
                    date,
                });
            }
        }
        Ok(Self { samples })
    }

    /// Sort samples by date first; duplicate dates are still rejected.
    pub fn from_unsorted(mut samples: Vec<Sample<T>>) -> Result<Self, SeriesError> {
        samples.sort_by_key(|s| s.date);
        Self::new(samples)
    }

    /// For samples derived from an existing series, whose dates are already ordered.
    pub(crate) fn from_ordered(samples: Vec<Sample<T>>) -> Self {
        debug_assert!(samples.windows(2).all(|p| p[0].date < p[1].date));
        Self { samples }
    }

    pub fn empty() -> Self {
        Self { samples: Vec::new() }
    }

    pub fn samples(&self) -> &[Sample<T>] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample<T>> {
        self.samples.iter()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.samples.iter().map(|s| s.date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.samples.first().map(|s| s.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.samples.last().map(|s| s.date)
    }

    /// `[first, last]`, or `None` for an empty series.
    pub fn date_range(&self) -> Option<DateRange> {
        DateRange::new(self.first_date()?, self.last_date()?)
    }

    /// Value at an exact date.
    pub fn get(&self, date: NaiveDate) -> Option<&T> {
        self.samples
            .binary_search_by_key(&date, |s| s.date)
            .ok()
            .map(|idx| &self.samples[idx].value)
    }

    /// New series restricted to `range` (inclusive on both ends).
    pub fn clip(&self, range: DateRange) -> Self
    where
        T: Clone,
    {
        let samples = self
            .samples
            .iter()
            .filter(|s| range.contains(s.date))
            .cloned()
            .collect();
        Self { samples }
    }

    /// New series with the same dates and transformed values.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Series<U> {
        Series {
            samples: self
                .samples
                .iter()
                .map(|s| Sample::new(s.date, f(&s.value)))
                .collect(),
        }
    }
}

impl<T> Default for Series<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<'a, T> IntoIterator for &'a Series<T> {
    type Item = &'a Sample<T>;
    type IntoIter = std::slice::Iter<'a, Sample<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl TimeSeries {
    /// Build from raw floats; non-finite values become missing samples.
    pub fn from_values(points: Vec<(NaiveDate, f64)>) -> Result<Self, SeriesError> {
        Self::new(
            points
                .into_iter()
                .map(|(date, v)| Sample::new(date, v.is_finite().then_some(v)))
                .collect(),
        )
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.value).collect()
    }
}

impl BinarySeries {
    /// Build from `0`/`1` style flags; anything other than `0` or `1` is undefined.
    pub fn from_flags(points: Vec<(NaiveDate, f64)>) -> Result<Self, SeriesError> {
        Self::new(
            points
                .into_iter()
                .map(|(date, v)| Sample::new(date, flag_from_value(v)))
                .collect(),
        )
    }
}

/// Interpret a numeric `{0, 1}` flag.
pub fn flag_from_value(v: f64) -> Option<bool> {
    if v == 1.0 {
        Some(true)
    } else if v == 0.0 {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn constructor_rejects_unsorted_and_duplicates() {
        let unsorted = vec![Sample::new(d(2020, 2, 1), 1.0), Sample::new(d(2020, 1, 1), 2.0)];
        assert!(matches!(
            Series::new(unsorted.clone()),
            Err(SeriesError::OutOfOrder { index: 1, .. })
        ));
        assert_eq!(Series::from_unsorted(unsorted).unwrap().first_date(), Some(d(2020, 1, 1)));

        let dup = vec![Sample::new(d(2020, 1, 1), 1.0), Sample::new(d(2020, 1, 1), 2.0)];
        assert_eq!(
            Series::from_unsorted(dup),
            Err(SeriesError::DuplicateDate { date: d(2020, 1, 1) })
        );
    }

    #[test]
    fn non_finite_values_become_missing() {
        let s = TimeSeries::from_values(vec![(d(2020, 1, 1), f64::NAN), (d(2020, 2, 1), 4.0)]).unwrap();
        assert_eq!(s.values(), vec![None, Some(4.0)]);
    }

    #[test]
    fn clip_keeps_closed_interval() {
        let s = TimeSeries::from_values((1..=5).map(|m| (d(2020, m, 1), m as f64)).collect()).unwrap();
        let range = DateRange::new(d(2020, 2, 1), d(2020, 4, 1)).unwrap();
        let clipped = s.clip(range);
        assert_eq!(clipped.values(), vec![Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(clipped.get(d(2020, 3, 1)), Some(&Some(3.0)));
        assert_eq!(clipped.get(d(2020, 5, 1)), None);
    }

    #[test]
    fn flags_outside_zero_one_are_undefined() {
        let s = BinarySeries::from_flags(vec![
            (d(2020, 1, 1), 1.0),
            (d(2020, 2, 1), 0.0),
            (d(2020, 3, 1), 0.5),
        ])
        .unwrap();
        let flags: Vec<_> = s.iter().map(|x| x.value).collect();
        assert_eq!(flags, vec![Some(true), Some(false), None]);
    }
}
