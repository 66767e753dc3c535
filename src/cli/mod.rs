//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Test-suite orchestrator for AmberTools and Amber builds
#[derive(Parser, Debug)]
#[command(name = "amber-test-runner")]
#[command(version)]
#[command(about = "Collect, run and summarize the AmberTools test suites")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a task
    Run(RunArgs),

    /// List suite definitions
    List(ListArgs),

    /// Show the environment variables the tool reads
    Env,

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Task: a suite name, a suite half (e.g. serial.MM.0), `all`, or a
    /// test name to run as-is
    #[arg(short, long)]
    pub task: Option<String>,

    /// JSON file with `test_name` and `test_line` exclusions
    #[arg(short = 'x', long)]
    pub exclude: Option<PathBuf>,

    /// Number of workers; 1 runs serially, -1 uses every CPU
    #[arg(short, long, allow_negative_numbers = true)]
    pub num_cpus: Option<i32>,

    /// Run tests from $AMBERHOME/test instead of $AMBERHOME/AmberTools/test
    #[arg(short = 'd', long)]
    pub use_amber_test_dir: bool,

    /// Partition the suite across CircleCI nodes
    #[arg(short, long)]
    pub circleci: bool,

    /// Run `make <target>` instead of the target's recipe lines
    #[arg(long)]
    pub make: bool,

    /// Print the collected tests without running them
    #[arg(long)]
    pub collect_only: bool,

    /// Directory for the log files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Save a JSON run report
    #[arg(long)]
    pub json_report: Option<PathBuf>,
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Resolve each suite's members against $AMBERHOME
    #[arg(short, long)]
    pub detailed: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "./amber-test.yaml")]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// File to validate (default: first standard location found)
        file: Option<PathBuf>,
    },
}
