//! Batch execution
//!
//! This module drives ordered worklists through the operation protocols:
//! - `worklist`: CSV rows with normalized field names
//! - `output`: append-only result records and the resume set
//! - `runner`: per-row isolation, resume skipping, fixed-rate throttling
//! - `flows`: the wired-up generate / recordings / ungenerate runs

pub mod flows;
pub mod output;
pub mod runner;
pub mod worklist;

pub use output::{OutputSink, OutputTarget, ResumeSet, ERROR_MARKER};
pub use runner::{BatchRunner, RowOperation, RowOutcome, RunSummary};
pub use worklist::Row;
