//! Trailing simple moving average.
//!
//! Keeps a running sum of the present samples in the window plus a count of
//! missing ones. Each step adds the incoming sample and subtracts the one
//! leaving the window, so the whole pass is O(n) regardless of window size.

use std::num::NonZeroUsize;

use super::present;

/// `means[i]` is the mean of `values[i + 1 - window ..= i]`.
///
/// `None` for `i < window - 1` (not enough history) and for any window that
/// contains a missing sample.
pub fn moving_average(values: &[Option<f64>], window: NonZeroUsize) -> Vec<Option<f64>> {
    let n = window.get();
    let mut means = vec![None; values.len()];
    let mut sum = 0.0;
    let mut missing = 0usize;

    for (i, value) in values.iter().enumerate() {
        match present(*value) {
            Some(v) => sum += v,
            None => missing += 1,
        }

        if i + 1 < n {
            continue;
        }

        if missing == 0 {
            means[i] = Some(sum / n as f64);
        }

        // Drop the oldest sample so the next step sees exactly `n` entries.
        match present(values[i + 1 - n]) {
            Some(v) => sum -= v,
            None => missing -= 1,
        }
    }

    means
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn warm_up_is_undefined() {
        let values = [Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
        let means = moving_average(&values, w(3));
        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_eq!(means[2], Some(2.0));
        assert_eq!(means[3], Some(3.0));
    }

    #[test]
    fn window_of_one_is_identity() {
        let values = [Some(4.2), Some(-1.0), Some(0.0)];
        assert_eq!(moving_average(&values, w(1)), values.to_vec());
    }

    #[test]
    fn window_longer_than_input_is_all_undefined() {
        let values = [Some(1.0), Some(2.0)];
        assert_eq!(moving_average(&values, w(5)), vec![None, None]);
        assert_eq!(moving_average(&values, NonZeroUsize::MAX), vec![None, None]);
    }

    #[test]
    fn missing_sample_poisons_every_window_it_sits_in() {
        let values = [Some(1.0), Some(2.0), None, Some(4.0), Some(5.0), Some(6.0), Some(7.0)];
        let means = moving_average(&values, w(3));
        assert_eq!(means[..5], [None, None, None, None, None]);
        assert_eq!(means[5], Some(5.0));
        assert_eq!(means[6], Some(6.0));
    }

    #[test]
    fn nan_counts_as_missing() {
        let values = [Some(1.0), Some(f64::NAN), Some(3.0)];
        assert_eq!(moving_average(&values, w(2)), vec![None, None, None]);
    }
}
