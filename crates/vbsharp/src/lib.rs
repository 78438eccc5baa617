//! Batch driver and configuration for the `vbsharp` command.
//!
//! The conversion itself lives in `vbsharp-convert`; this crate adds the
//! filesystem, configuration files and the command line.

pub mod batch;
pub mod config;

pub use batch::{BatchError, BatchReport, FileOutcome, FileResult, convert_dir};
pub use config::VbsharpConfig;
