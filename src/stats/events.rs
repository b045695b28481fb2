//! Event matching within a day tolerance.
//!
//! Offsets are signed `reference - candidate` in days: positive means the
//! candidate came first (leading), negative means it came after (lagging).
//! Candidates with no reference inside the tolerance contribute nothing; they
//! are not same-day matches.

use chrono::NaiveDate;

use crate::domain::LeadLagSummary;

/// Signed day difference `reference - candidate`.
pub fn day_offset(candidate: NaiveDate, reference: NaiveDate) -> i64 {
    (reference - candidate).num_days()
}

/// Percentage (0–100) of candidates with some reference within `±tolerance_days`.
///
/// `None` when there are no candidates.
pub fn accuracy_percent(candidates: &[NaiveDate], references: &[NaiveDate], tolerance_days: i64) -> Option<f64> {
    if candidates.is_empty() {
        return None;
    }
    let hits = candidates
        .iter()
        .filter(|&&c| {
            references
                .iter()
                .any(|&r| day_offset(c, r).abs() <= tolerance_days)
        })
        .count();
    Some(hits as f64 / candidates.len() as f64 * 100.0)
}

/// Offset to the closest reference within `±tolerance_days`.
///
/// Equal distances on both sides resolve to the earlier reference date.
pub fn nearest_offset(candidate: NaiveDate, references: &[NaiveDate], tolerance_days: i64) -> Option<i64> {
    references
        .iter()
        .map(|&r| (day_offset(candidate, r), r))
        .filter(|(offset, _)| offset.abs() <= tolerance_days)
        .min_by_key(|&(offset, r)| (offset.abs(), r))
        .map(|(offset, _)| offset)
}

/// [`nearest_offset`] for every candidate, in candidate order.
pub fn nearest_offsets(candidates: &[NaiveDate], references: &[NaiveDate], tolerance_days: i64) -> Vec<Option<i64>> {
    candidates
        .iter()
        .map(|&c| nearest_offset(c, references, tolerance_days))
        .collect()
}

/// Mean leading, mean lagging and overall mean offset of the matched candidates.
pub fn lead_lag_summary(candidates: &[NaiveDate], references: &[NaiveDate], tolerance_days: i64) -> LeadLagSummary {
    let observed: Vec<i64> = nearest_offsets(candidates, references, tolerance_days)
        .into_iter()
        .flatten()
        .collect();

    LeadLagSummary {
        average_days_leading: mean(observed.iter().copied().filter(|&d| d > 0)),
        average_days_lagging: mean(observed.iter().copied().filter(|&d| d < 0)),
        overall_average_days: mean(observed.iter().copied()),
    }
}

fn mean(days: impl Iterator<Item = i64>) -> Option<f64> {
    let (sum, n) = days.fold((0i64, 0usize), |(sum, n), d| (sum + d, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn accuracy_counts_hits_within_tolerance() {
        let candidates = [d(2008, 1, 1), d(2015, 1, 1)];
        let references = [d(2007, 12, 1)];
        assert_eq!(accuracy_percent(&candidates, &references, 31), Some(50.0));
        assert_eq!(accuracy_percent(&candidates, &references, 30), Some(0.0));
        assert_eq!(accuracy_percent(&[], &references, 30), None);
    }

    #[test]
    fn nearest_prefers_smallest_distance_then_earliest_date() {
        let c = d(2020, 1, 11);
        let refs = [d(2020, 1, 21), d(2020, 1, 1), d(2020, 1, 15)];
        assert_eq!(nearest_offset(c, &refs, 30), Some(4));

        let tie = [d(2020, 1, 21), d(2020, 1, 1)];
        assert_eq!(nearest_offset(c, &tie, 30), Some(-10));
        assert_eq!(nearest_offset(c, &tie, 5), None);
    }

    #[test]
    fn summary_partitions_lead_lag_and_keeps_zero_in_overall() {
        let refs = [d(2020, 3, 1), d(2021, 3, 1), d(2022, 3, 1)];
        let candidates = [
            d(2020, 2, 20), // leads by 10
            d(2021, 3, 1),  // same day
            d(2022, 3, 5),  // lags by 4
            d(2010, 1, 1),  // unmatched
        ];
        let s = lead_lag_summary(&candidates, &refs, 30);
        assert_eq!(s.average_days_leading, Some(10.0));
        assert_eq!(s.average_days_lagging, Some(-4.0));
        assert_eq!(s.overall_average_days, Some(2.0));
    }

    #[test]
    fn no_matches_is_undefined_not_zero() {
        let s = lead_lag_summary(&[d(2000, 1, 1)], &[d(2020, 1, 1)], 30);
        assert_eq!(s, LeadLagSummary::default());
        assert_eq!(s.overall_average_days, None);
    }
}
