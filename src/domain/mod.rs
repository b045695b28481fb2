//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - date-ordered series (`Series<T>`, `TimeSeries`, `BinarySeries`, `DateRange`)
//! - inputs and parameters (`Observation`, `ValueField`, `MissingPolicy`, `IndicatorParams`)
//! - outputs (`IndicatorRecord`, `Period`, `LeadLagSummary`)

pub mod series;
pub mod types;

pub use series::*;
pub use types::*;
