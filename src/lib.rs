//! `sahm-signal` library crate.
//!
//! The binary (`sahm`) is a thin wrapper around this library so that:
//!
//! - the indicator and statistics are testable without spawning processes
//! - the pipeline can be driven from other tools (batch jobs, notebooks)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
pub mod signal;
pub mod stats;
