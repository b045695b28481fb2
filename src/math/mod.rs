//! Sliding-window aggregates over `Option<f64>` samples.
//!
//! Both aggregates run in O(n), leave the first `window - 1` outputs undefined,
//! and never treat a missing sample as zero.

pub mod moving_average;
pub mod rolling_min;

pub use moving_average::*;
pub use rolling_min::*;

/// A sample usable in arithmetic: present and finite.
#[inline]
pub(crate) fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
