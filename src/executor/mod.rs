//! Test execution engine
//!
//! Provides sequential, local-parallel and distributed-CI execution.

mod parallel;
mod runner;

use std::fmt;
use std::io;
use thiserror::Error;
use tracing::info;

pub use parallel::partition;
pub use runner::{ExecutionMode, TestRunner};

use parallel::{node_entries, worker_count, ParallelExecutor};

use crate::config::NodePartition;
use crate::models::{RunResult, Suite};

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while reading test output: {0}")]
    Io(#[from] io::Error),

    #[error("Worker failed: {0}")]
    Join(String),
}

/// Where a suite runs
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// One worker, suite order preserved
    Serial,
    /// Local pool of `workers`
    Local { workers: usize },
    /// This node's share of a distributed CI run
    Node(NodePartition),
}

impl Strategy {
    /// Pick a strategy from the requested CPU count (`1` is serial, below
    /// one means every CPU) or a CI node partition
    pub fn select(num_cpus: i32, node: Option<NodePartition>) -> Self {
        match node {
            Some(node) => Strategy::Node(node),
            None if num_cpus == 1 => Strategy::Serial,
            None => Strategy::Local {
                workers: worker_count(num_cpus, usize::MAX),
            },
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Serial => write!(f, "serial"),
            Strategy::Local { workers } => write!(f, "parallel ({workers} workers)"),
            Strategy::Node(node) => write!(f, "CI node {}/{}", node.index, node.total),
        }
    }
}

/// Runs a suite with the chosen strategy
pub struct Dispatcher {
    runner: TestRunner,
    strategy: Strategy,
}

impl Dispatcher {
    pub fn new(runner: TestRunner, strategy: Strategy) -> Self {
        Self { runner, strategy }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub async fn dispatch(&self, suite: &Suite) -> Result<RunResult, ExecError> {
        match self.strategy {
            Strategy::Serial => {
                info!("Run test in serial");
                self.runner.run_chunk(0, suite.entries.clone()).await
            }
            Strategy::Local { workers } => {
                info!("Run test in parallel");
                ParallelExecutor::new(self.runner.clone(), workers)
                    .run_suite(suite)
                    .await
            }
            Strategy::Node(node) => {
                info!("Running on CI node {} of {}", node.index, node.total);
                let entries = node_entries(suite, node);
                info!("This node runs {} of {} tests", entries.len(), suite.len());
                self.runner.run_chunk(node.index, entries).await
            }
        }
    }
}
