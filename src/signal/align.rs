//! Date-range alignment.
//!
//! Independently sourced series rarely cover the same dates. Before any
//! windowed computation every input is clipped to the intersection of their
//! ranges: `[max(first dates), min(last dates)]`.

use crate::domain::{BinarySeries, DateRange, ObservationSeries, Series};
use crate::error::AlignmentError;

/// Intersection of the given ranges; `None` marks an empty series.
pub fn common_range<I>(ranges: I) -> Result<DateRange, AlignmentError>
where
    I: IntoIterator<Item = Option<DateRange>>,
{
    let mut bounds: Option<(chrono::NaiveDate, chrono::NaiveDate)> = None;

    for (position, range) in ranges.into_iter().enumerate() {
        let range = range.ok_or(AlignmentError::EmptySeries { position })?;
        bounds = Some(match bounds {
            None => (range.start, range.end),
            Some((start, end)) => (start.max(range.start), end.min(range.end)),
        });
    }

    let (start, end) = bounds.ok_or(AlignmentError::EmptySeries { position: 0 })?;
    DateRange::new(start, end).ok_or(AlignmentError::NoOverlap { start, end })
}

/// Clip every series to their common date range, preserving order.
pub fn align<T: Clone>(series: &[&Series<T>]) -> Result<Vec<Series<T>>, AlignmentError> {
    let range = common_range(series.iter().map(|s| s.date_range()))?;
    Ok(series.iter().map(|s| s.clip(range)).collect())
}

/// Fail unless both series carry exactly the same dates.
pub fn ensure_same_dates<A, B>(left: &Series<A>, right: &Series<B>) -> Result<(), AlignmentError> {
    let mut l = left.dates();
    let mut r = right.dates();
    let mut index = 0;
    loop {
        match (l.next(), r.next()) {
            (None, None) => return Ok(()),
            (a, b) if a == b => index += 1,
            (a, b) => {
                return Err(AlignmentError::DateMismatch {
                    index,
                    left: a,
                    right: b,
                });
            }
        }
    }
}

/// Base, relative and recession inputs restricted to their common range.
#[derive(Debug, Clone)]
pub struct AlignedInputs {
    pub range: DateRange,
    pub base: ObservationSeries,
    pub relative: ObservationSeries,
    pub recession: BinarySeries,
}

/// Align the three inputs of one indicator run.
pub fn align_inputs(
    base: &ObservationSeries,
    relative: &ObservationSeries,
    recession: &BinarySeries,
) -> Result<AlignedInputs, AlignmentError> {
    let range = common_range([base.date_range(), relative.date_range(), recession.date_range()])?;
    let aligned = AlignedInputs {
        range,
        base: base.clip(range),
        relative: relative.clip(range),
        recession: recession.clip(range),
    };
    log::debug!(
        "aligned inputs to {}..{} (base={}, relative={}, recession={})",
        range.start,
        range.end,
        aligned.base.len(),
        aligned.relative.len(),
        aligned.recession.len()
    );
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::TimeSeries;

    fn monthly(year: i32, from: u32, to: u32) -> TimeSeries {
        TimeSeries::from_values(
            (from..=to)
                .map(|m| (NaiveDate::from_ymd_opt(year, m, 1).unwrap(), m as f64))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn overlapping_series_are_clipped_to_intersection() {
        let a = monthly(2020, 1, 9);
        let b = monthly(2020, 4, 12);
        let aligned = align(&[&a, &b]).unwrap();
        assert_eq!(aligned[0].first_date(), b.first_date());
        assert_eq!(aligned[0].last_date(), a.last_date());
        assert_eq!(aligned[0], aligned[1]);
    }

    #[test]
    fn empty_input_names_its_position() {
        let a = monthly(2020, 1, 3);
        let empty = TimeSeries::empty();
        assert_eq!(
            align(&[&a, &empty]).unwrap_err(),
            AlignmentError::EmptySeries { position: 1 }
        );
    }

    #[test]
    fn date_mismatch_reports_first_divergence() {
        let a = monthly(2020, 1, 3);
        let b = monthly(2020, 1, 2);
        let err = ensure_same_dates(&a, &b).unwrap_err();
        assert!(matches!(err, AlignmentError::DateMismatch { index: 2, right: None, .. }));
        assert!(ensure_same_dates(&a, &a).is_ok());
    }
}
