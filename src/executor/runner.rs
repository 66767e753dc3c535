//! Test execution runner
//!
//! Runs individual test commands through the shell and collects their
//! output one chunk of the suite at a time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::Stdio;
use indicatif::ProgressBar;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::ExecError;
use crate::models::{outcome, ErrorExcerpt, RunResult, TestEntry};
use crate::output::Console;
use crate::utils::Timer;

/// How an entry becomes a shell command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// `cd <dir> && make <target>`
    Make,
    /// `cd <dir> && <recipe line>`
    Direct,
}

impl ExecutionMode {
    pub fn from_make_flag(make: bool) -> Self {
        if make {
            ExecutionMode::Make
        } else {
            ExecutionMode::Direct
        }
    }

    pub fn command(&self, entry: &TestEntry) -> String {
        match self {
            ExecutionMode::Make => format!("cd {} && make {}", entry.dir.display(), entry.name),
            ExecutionMode::Direct => format!("cd {} && {}", entry.dir.display(), entry.name),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Make => write!(f, "make"),
            ExecutionMode::Direct => write!(f, "direct"),
        }
    }
}

/// Captured output of one command
#[derive(Clone, Debug, Default)]
pub struct CommandOutput {
    pub command: String,
    /// Combined stdout and stderr, one entry per line
    pub lines: Vec<String>,
    pub elapsed_secs: f64,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Whether any line carries a failure marker
    pub fn failed(&self) -> bool {
        self.lines.iter().any(|line| outcome::is_failure(line))
    }

    /// Excerpts for every failing line
    pub fn error_excerpts(&self) -> Vec<ErrorExcerpt> {
        self.lines
            .iter()
            .enumerate()
            .filter(|(_, line)| outcome::is_failure(line))
            .map(|(index, _)| ErrorExcerpt::from_lines(&self.command, &self.lines, index))
            .collect()
    }
}

/// Read merged output until EOF, ticking `progress` once per line
async fn read_lines<R>(reader: R, progress: &ProgressBar) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        lines.push(line.trim_end_matches(&['\n', '\r'][..]).to_string());
        progress.inc(1);
    }
    Ok(lines)
}

/// Run a shell command, streaming its merged output line by line
pub async fn execute(command: &str, console: &Console) -> Result<CommandOutput, ExecError> {
    debug!("Executing: {}", command);
    let timer = Timer::start(command);
    let progress = console.test_progress(command);

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(format!("exec 2>&1; {command}"))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| {
            progress.finish_and_clear();
            ExecError::Spawn {
                command: command.to_string(),
                source,
            }
        })?;

    let read = match child.stdout.take() {
        Some(stdout) => read_lines(stdout, &progress).await,
        None => Ok(Vec::new()),
    };
    let lines = match read {
        Ok(lines) => lines,
        Err(e) => {
            // dropping `child` kills it
            progress.finish_and_clear();
            return Err(e.into());
        }
    };

    let status = child.wait().await;
    progress.finish_and_clear();

    Ok(CommandOutput {
        command: command.to_string(),
        lines,
        elapsed_secs: timer.elapsed_secs(),
        exit_code: status?.code(),
    })
}

/// Runs the entries of one chunk in order
#[derive(Clone)]
pub struct TestRunner {
    mode: ExecutionMode,
    console: Console,
}

impl TestRunner {
    pub fn new(mode: ExecutionMode, console: Console) -> Self {
        Self { mode, console }
    }

    /// Run a single entry
    pub async fn run_test(&self, entry: &TestEntry) -> Result<CommandOutput, ExecError> {
        let command = self.mode.command(entry);
        let output = execute(&command, &self.console).await?;

        debug!("{} exited with {:?}", command, output.exit_code);
        self.console.suspend(|| {
            if output.failed() {
                warn!("{}: {:.1} (s), FAILURE", command, output.elapsed_secs);
            } else {
                info!("{}: {:.1} (s), PASSED", command, output.elapsed_secs);
            }
        });

        Ok(output)
    }

    /// Run every entry of a chunk; a failing test never stops the rest
    pub async fn run_chunk(
        &self,
        worker: usize,
        entries: Vec<TestEntry>,
    ) -> Result<RunResult, ExecError> {
        debug!("worker={}, tests={}", worker, entries.len());
        let mut result = RunResult::new();

        for entry in &entries {
            let output = self.run_test(entry).await?;
            result.errors.extend(output.error_excerpts());
            result.timings.insert(entry.name.clone(), output.elapsed_secs);
            result.output.extend(output.lines);
        }

        Ok(result)
    }
}
