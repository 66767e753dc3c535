//! Test catalog
//!
//! Discovers test targets from the test Makefiles and builds the suites a
//! task selects.

mod exclusions;
mod makefile;
mod suite;
mod task;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use exclusions::Exclusions;
pub use suite::{builtin_suites, Catalog, Member, SuiteDefinition};
pub use task::{resolve_task, TaskRequest};

/// Catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No target named {0} in Makefile")]
    TargetNotFound(String),

    #[error("Unknown suite: {0}")]
    UnknownSuite(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
