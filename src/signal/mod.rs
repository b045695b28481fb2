//! Indicator pipeline stages.
//!
//! Aligner → moving average / rolling minimum → synthesizer → run extractor.
//! Every stage is a pure function over borrowed inputs and returns new series.

pub mod align;
pub mod indicator;
pub mod runs;

pub use align::*;
pub use indicator::*;
pub use runs::*;
