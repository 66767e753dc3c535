//! Configuration module
//!
//! Handles loading and managing configuration.

mod env;
mod file;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub use env::{print_env_help, EnvConfig, NodePartition};
pub use file::ConfigFile;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Must set {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("CI node index {index} is out of range for {total} nodes")]
    NodeOutOfRange { index: usize, total: usize },
}

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Task run when none is given
    pub default_task: String,

    /// Worker count; 1 runs serially, below 1 uses every CPU
    pub num_cpus: i32,

    /// Directory the log files are written to
    pub output_dir: PathBuf,

    /// Log file names
    pub logs: LogFiles,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_task: "fast".to_string(),
            num_cpus: -1,
            output_dir: PathBuf::from("."),
            logs: LogFiles::default(),
        }
    }
}

/// Names of the files a run writes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogFiles {
    pub output: String,
    pub diff: String,
    pub timing: String,
    pub summary: String,
}

impl Default for LogFiles {
    fn default() -> Self {
        Self {
            output: "test_out.log".to_string(),
            diff: "test_dif.log".to_string(),
            timing: "test_timing.log".to_string(),
            summary: "test_summary.log".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.default_task, "fast");
        assert_eq!(config.num_cpus, -1);
        assert_eq!(config.logs.summary, "test_summary.log");
    }

    #[test]
    fn test_partial_config() {
        let config: AppConfig = serde_yaml::from_str("num_cpus: 2\nlogs:\n  output: out.txt\n").unwrap();
        assert_eq!(config.num_cpus, 2);
        assert_eq!(config.logs.output, "out.txt");
        assert_eq!(config.logs.timing, "test_timing.log");
        assert_eq!(config.default_task, "fast");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ConfigError::MissingEnv("AMBERHOME").to_string(), "Must set AMBERHOME");
        assert_eq!(
            ConfigError::NodeOutOfRange { index: 4, total: 4 }.to_string(),
            "CI node index 4 is out of range for 4 nodes"
        );
    }
}
