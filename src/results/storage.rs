//! JSON run reports
//!
//! A machine-readable record of one run: what was selected, how it ran,
//! per-test timings and the collected error excerpts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::{ErrorExcerpt, RunResult, RunSummary};

/// Stored record of a run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run ID
    pub id: String,

    /// Task name given on the command line
    pub task: String,

    /// make or direct
    pub mode: String,

    /// serial, parallel or CI node
    pub strategy: String,

    /// Installation root
    pub amberhome: PathBuf,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,

    /// Number of tests selected
    pub total_tests: usize,

    pub summary: RunSummary,

    /// Tests ordered by duration, longest first
    pub timings: Vec<TimedTest>,

    pub errors: Vec<ErrorExcerpt>,

    /// Tool version
    pub tool_version: String,
}

/// Elapsed time of a single test
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimedTest {
    pub name: String,
    pub secs: f64,
}

impl RunReport {
    pub fn new(
        task: impl Into<String>,
        mode: impl Into<String>,
        strategy: impl Into<String>,
        amberhome: impl Into<PathBuf>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: generate_run_id(&started_at),
            task: task.into(),
            mode: mode.into(),
            strategy: strategy.into(),
            amberhome: amberhome.into(),
            started_at,
            completed_at: started_at,
            total_tests: 0,
            summary: RunSummary::default(),
            timings: Vec::new(),
            errors: Vec::new(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Fill in the outcome of the run
    pub fn complete(mut self, total_tests: usize, result: &RunResult) -> Self {
        self.completed_at = Utc::now();
        self.total_tests = total_tests;
        self.summary = result.summary();
        self.timings = result
            .sorted_timings()
            .into_iter()
            .map(|(name, secs)| TimedTest {
                name: name.to_string(),
                secs,
            })
            .collect();
        self.errors = result.errors.clone();
        self
    }

    pub fn duration_secs(&self) -> f64 {
        (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Save the report as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let file = File::create(path).context("Failed to create report file")?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context("Failed to write report")?;

        info!("Saved run report to {}", path.display());
        Ok(())
    }

    #[cfg(test)]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).context("Failed to open report file")?;
        let report: RunReport =
            serde_json::from_reader(std::io::BufReader::new(file)).context("Failed to parse report")?;

        debug!("Loaded run report from {}", path.display());
        Ok(report)
    }
}

fn generate_run_id(started_at: &DateTime<Utc>) -> String {
    let timestamp = started_at.format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}
