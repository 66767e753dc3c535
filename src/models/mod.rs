//! Data models for test orchestration
//!
//! This module contains all data structures used throughout the application.

mod entry;
pub mod outcome;
mod run_result;

pub use entry::{Suite, TestEntry, TestRoot};
pub use run_result::{ErrorExcerpt, RunResult, RunSummary};
