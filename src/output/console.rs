//! Console progress display
//!
//! One spinner per running test command, all drawn through a shared
//! `MultiProgress` so parallel workers do not tear each other's lines.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Progress context handed to the test runners
#[derive(Clone)]
pub struct Console {
    progress: MultiProgress,
    enabled: bool,
}

impl Console {
    pub fn new(enabled: bool) -> Self {
        let progress = if enabled {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };
        Self { progress, enabled }
    }

    /// A console that draws nothing
    pub fn hidden() -> Self {
        Self::new(false)
    }

    /// Draw only when stderr is a terminal
    pub fn detect() -> Self {
        Self::new(std::io::stderr().is_terminal())
    }

    /// Spinner for one test command; ticks once per output line
    pub fn test_progress(&self, label: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.progress.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} lines {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Run `f` with every spinner cleared, so lines it prints stay whole
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.progress.suspend(f)
    }
}
