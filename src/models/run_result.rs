//! Run result models
//!
//! Defines per-worker results, error excerpts and the pass/fail summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::outcome;

/// A failing line plus the command that produced it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExcerpt {
    pub command: String,
    pub context: String,
}

impl ErrorExcerpt {
    /// Build an excerpt from the output lines and the index of the failing
    /// line; the preceding line is included when there is one
    pub fn from_lines(command: impl Into<String>, lines: &[String], index: usize) -> Self {
        let start = index.saturating_sub(1);
        let end = (index + 1).min(lines.len());
        Self {
            command: command.into(),
            context: lines[start..end].join(" "),
        }
    }
}

impl fmt::Display for ErrorExcerpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==> {}", self.command)?;
        write!(f, "{}", self.context)
    }
}

/// Everything one worker (or a whole run) produced
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// Elapsed seconds per test identifier
    pub timings: BTreeMap<String, f64>,
    /// Output lines in execution order
    pub output: Vec<String>,
    pub errors: Vec<ErrorExcerpt>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another worker's result into this one
    pub fn merge(&mut self, other: RunResult) {
        self.timings.extend(other.timings);
        self.output.extend(other.output);
        self.errors.extend(other.errors);
    }

    /// Merge results in the order given
    pub fn merge_all(results: impl IntoIterator<Item = RunResult>) -> RunResult {
        results.into_iter().fold(RunResult::new(), |mut acc, r| {
            acc.merge(r);
            acc
        })
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Timings sorted by duration, longest first; ties by name
    pub fn sorted_timings(&self) -> Vec<(&str, f64)> {
        let mut timings: Vec<_> = self
            .timings
            .iter()
            .map(|(name, secs)| (name.as_str(), *secs))
            .collect();
        timings.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        timings
    }

    pub fn total_secs(&self) -> f64 {
        self.timings.values().sum()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_lines(&self.output)
    }
}

/// Pass/fail/error line counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub program_errors: usize,
}

impl RunSummary {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut summary = RunSummary::default();
        for line in lines {
            summary.count_line(line.as_ref());
        }
        summary
    }

    pub fn count_line(&mut self, line: &str) {
        if outcome::is_pass(line) {
            self.passed += 1;
        }
        if outcome::is_program_error(line) {
            self.program_errors += 1;
        }
        if outcome::is_comparison_failure(line) {
            self.failed += 1;
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.program_errors == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{} file comparisons passed", self.passed)?;
        writeln!(f, "{} file comparisons failed", self.failed)?;
        writeln!(f, "{} tests experienced errors", self.program_errors)
    }
}
