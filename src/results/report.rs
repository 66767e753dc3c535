//! Log file generation
//!
//! Writes the raw output, timing, summary and diff logs of a run.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use super::diff;
use crate::config::LogFiles;
use crate::models::{RunResult, RunSummary};

/// Timing table, longest test first
pub fn format_timing(result: &RunResult) -> String {
    let mut output = String::new();
    for (name, secs) in result.sorted_timings() {
        output.push_str(&format!("{name:<32}: {secs:06.2} (s)\n"));
    }
    output
}

/// Line appended to the summary once a run finishes
pub fn format_finished(label: &str, minutes: f64) -> String {
    format!("Finished {label} in {minutes:04.2} (minutes)")
}

/// Writes a run's log files into one directory
pub struct LogWriter {
    dir: PathBuf,
    files: LogFiles,
}

impl LogWriter {
    pub fn new(dir: impl Into<PathBuf>, files: LogFiles) -> Self {
        Self {
            dir: dir.into(),
            files,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn create(&self, name: &str) -> Result<BufWriter<File>> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;
        let path = self.path(name);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(BufWriter::new(file))
    }

    /// Every output line, newline-terminated
    pub fn write_output(&self, lines: &[String]) -> Result<PathBuf> {
        let mut out = self.create(&self.files.output)?;
        for line in lines {
            writeln!(out, "{line}")?;
        }
        out.flush()?;
        Ok(self.path(&self.files.output))
    }

    pub fn write_timing(&self, result: &RunResult) -> Result<PathBuf> {
        let mut out = self.create(&self.files.timing)?;
        out.write_all(format_timing(result).as_bytes())?;
        out.flush()?;
        Ok(self.path(&self.files.timing))
    }

    pub fn write_summary(&self, summary: &RunSummary) -> Result<PathBuf> {
        let mut out = self.create(&self.files.summary)?;
        write!(out, "{summary}")?;
        out.flush()?;
        Ok(self.path(&self.files.summary))
    }

    /// Append one line to the summary log
    pub fn append_summary(&self, line: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(&self.files.summary);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Concatenate every diff under `root` into the diff log
    pub fn write_diffs(&self, root: &Path) -> Result<usize> {
        info!("Writing diff files to {}", self.files.diff);
        let mut out = self.create(&self.files.diff)?;
        let count = diff::write_dif_files(root, &mut out)?;
        out.flush()?;
        Ok(count)
    }

    /// Write the output, diff, timing and summary logs; returns the summary
    pub fn write_all(&self, result: &RunResult, diff_root: &Path) -> Result<RunSummary> {
        let summary = result.summary();

        self.write_output(&result.output)?;
        self.write_diffs(diff_root)?;
        self.write_timing(result)?;
        self.write_summary(&summary)?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorExcerpt;
    use tempfile::tempdir;

    fn sample_result() -> RunResult {
        let mut result = RunResult::new();
        result.timings.insert("test.leap".into(), 3.5);
        result.timings.insert("test.sqm".into(), 12.25);
        result.timings.insert("test.antechamber".into(), 3.5);
        result.output = vec![
            "diffing leap.out with saved: PASSED".into(),
            "diffing sqm.out with saved: possible FAILURE".into(),
            "  Program error".into(),
            "FAILED: 1 test".into(),
        ];
        result.errors.push(ErrorExcerpt {
            command: "cd /t && make test.sqm".into(),
            context: "diffing sqm.out with saved: possible FAILURE".into(),
        });
        result
    }

    #[test]
    fn test_format_timing() {
        let timing = format_timing(&sample_result());
        let lines: Vec<_> = timing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], format!("{:<32}: 012.25 (s)", "test.sqm"));
        assert_eq!(lines[1], format!("{:<32}: 003.50 (s)", "test.antechamber"));
        assert_eq!(lines[2], format!("{:<32}: 003.50 (s)", "test.leap"));
    }

    #[test]
    fn test_format_finished() {
        assert_eq!(
            format_finished("testing AmberTools", 0.5),
            "Finished testing AmberTools in 0.50 (minutes)"
        );
    }

    #[test]
    fn test_write_all() {
        let out = tempdir().unwrap();
        let home = tempdir().unwrap();
        fs::write(home.path().join("sqm.out.dif"), "< 1\n> 2\n").unwrap();

        let writer = LogWriter::new(out.path(), LogFiles::default());
        let summary = writer.write_all(&sample_result(), home.path()).unwrap();

        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.program_errors, 1);

        let output = fs::read_to_string(out.path().join("test_out.log")).unwrap();
        assert_eq!(output.lines().count(), 4);
        assert!(output.ends_with("FAILED: 1 test\n"));

        let diffs = fs::read_to_string(out.path().join("test_dif.log")).unwrap();
        assert!(diffs.starts_with("FILENAME: ./sqm.out.dif\n"));

        let text = fs::read_to_string(out.path().join("test_summary.log")).unwrap();
        assert_eq!(
            text,
            "\n1 file comparisons passed\n2 file comparisons failed\n1 tests experienced errors\n"
        );
    }

    #[test]
    fn test_write_is_idempotent() {
        let out = tempdir().unwrap();
        let home = tempdir().unwrap();
        let writer = LogWriter::new(out.path(), LogFiles::default());
        let result = sample_result();

        writer.write_all(&result, home.path()).unwrap();
        let summary = fs::read(out.path().join("test_summary.log")).unwrap();
        let timing = fs::read(out.path().join("test_timing.log")).unwrap();

        writer.write_all(&result, home.path()).unwrap();
        assert_eq!(fs::read(out.path().join("test_summary.log")).unwrap(), summary);
        assert_eq!(fs::read(out.path().join("test_timing.log")).unwrap(), timing);
    }

    #[test]
    fn test_append_summary() {
        let out = tempdir().unwrap();
        let writer = LogWriter::new(out.path().join("logs"), LogFiles::default());
        writer.write_summary(&RunSummary::default()).unwrap();
        writer
            .append_summary(&format_finished("testing AmberTools", 1.25))
            .unwrap();

        let text = fs::read_to_string(out.path().join("logs/test_summary.log")).unwrap();
        assert!(text.ends_with("Finished testing AmberTools in 1.25 (minutes)\n"));
        assert!(text.contains("0 file comparisons passed"));
    }
}
