//! Series sources: the FRED API and local CSV files.

pub mod fred;
pub mod source;

pub use fred::*;
pub use source::*;
