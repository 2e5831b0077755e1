//! # grim-io: experiment files in, result tables out
//!
//! - [`paths`]: the `inputs/` / `outputs/` experiment convention plus overrides
//! - [`csv_tables`]: readers for parameter, topology and hourly tables
//! - [`inputs`]: load every table a run needs into [`grim_core::InputTables`]
//! - [`sink`]: write capacity tables and the run summary

pub mod csv_tables;
pub mod inputs;
pub mod paths;
pub mod sink;

pub use inputs::{load_inputs, RequiredTables};
pub use paths::{renew_pct, ExperimentPaths, PathOverrides};
pub use sink::{CsvSink, OutputSink};
