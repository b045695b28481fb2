//! Input/output helpers.
//!
//! - CSV ingest of series files and region lists (`ingest`)
//! - CSV/JSON exports of indicator series and statistics (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
