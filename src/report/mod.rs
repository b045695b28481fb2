//! Plain-text terminal reports.

pub mod format;

pub use format::*;
