//! Results aggregation module
//!
//! Writes the log files of a run and the optional JSON run report.

mod diff;
mod report;
mod storage;

pub use report::{format_finished, LogWriter};
pub use storage::RunReport;
