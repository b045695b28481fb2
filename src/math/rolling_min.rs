//! Sliding-window minimum with a monotonic deque.
//!
//! The deque holds `(index, value)` candidates with increasing indices and
//! non-decreasing values; the front is the minimum of the current window.
//! Every index is pushed and popped at most once, giving O(n) overall.
//!
//! Missing samples are never pushed, so they can never be reported as a
//! minimum. A window made up only of missing samples yields `None`.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use super::present;

/// `mins[i]` is the minimum of the present samples in `values[i + 1 - window ..= i]`.
///
/// `None` for `i < window - 1` and for windows with no present sample. Among
/// equal minima the earliest index stays at the front of the deque.
pub fn rolling_min(values: &[Option<f64>], window: NonZeroUsize) -> Vec<Option<f64>> {
    let n = window.get();
    let mut mins = vec![None; values.len()];
    let mut deque: VecDeque<(usize, f64)> = VecDeque::with_capacity(n.min(values.len()));

    for (i, value) in values.iter().enumerate() {
        // Evict indices that fell out of `[i + 1 - n, i]`.
        while deque.front().is_some_and(|&(idx, _)| i - idx >= n) {
            deque.pop_front();
        }

        if let Some(v) = present(*value) {
            // Larger values behind `v` can never be the minimum again.
            while deque.back().is_some_and(|&(_, back)| back > v) {
                deque.pop_back();
            }
            deque.push_back((i, v));
        }

        if i + 1 >= n {
            mins[i] = deque.front().map(|&(_, v)| v);
        }
    }

    mins
}
