//! Parallel test execution
//!
//! Splits a suite into balanced chunks and runs them concurrently, either
//! on a local worker pool or, for distributed CI, by selecting the chunk
//! that belongs to this node.

use futures::future::join_all;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use super::runner::TestRunner;
use super::ExecError;
use crate::config::NodePartition;
use crate::models::{RunResult, Suite, TestEntry};

/// Split `items` into exactly `parts` chunks of balanced size. The first
/// `len % parts` chunks hold one extra item; input order is preserved.
pub fn partition<T: Clone>(items: &[T], parts: usize) -> Vec<Vec<T>> {
    if parts == 0 {
        return Vec::new();
    }

    let base = items.len() / parts;
    let extra = items.len() % parts;

    let mut chunks = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let size = base + usize::from(i < extra);
        chunks.push(items[start..start + size].to_vec());
        start += size;
    }
    chunks
}

/// Entries with duplicates removed, keeping first occurrences
pub fn unique(entries: &[TestEntry]) -> Vec<TestEntry> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert(*entry))
        .cloned()
        .collect()
}

/// Number of workers for a requested CPU count. Values below one mean
/// "every available CPU"; the count never exceeds the number of tests.
pub fn worker_count(requested: i32, tests: usize) -> usize {
    let cpus = if requested < 1 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        requested as usize
    };
    cpus.min(tests)
}

/// Local worker pool
pub struct ParallelExecutor {
    runner: TestRunner,
    max_concurrent: usize,
}

impl ParallelExecutor {
    pub fn new(runner: TestRunner, max_concurrent: usize) -> Self {
        Self {
            runner,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Run each chunk on its own task; at most `max_concurrent` chunks run
    /// at once. Results come back in chunk order.
    pub async fn run_chunks(&self, chunks: Vec<Vec<TestEntry>>) -> Result<Vec<RunResult>, ExecError> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::new();

        for (worker, chunk) in chunks.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let runner = self.runner.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ExecError::Join(e.to_string()))?;
                debug!("Worker {} starting {} tests", worker, chunk.len());
                runner.run_chunk(worker, chunk).await
            });

            handles.push(handle);
        }

        let mut results = Vec::new();
        for joined in join_all(handles).await {
            let result = joined.map_err(|e| ExecError::Join(e.to_string()))??;
            results.push(result);
        }
        Ok(results)
    }

    /// Shuffle and deduplicate the suite, split it across the pool and
    /// merge what the workers return
    pub async fn run_suite(&self, suite: &Suite) -> Result<RunResult, ExecError> {
        let mut entries = unique(&suite.entries);
        entries.shuffle(&mut rand::rng());

        let workers = self.max_concurrent.min(entries.len());
        if workers == 0 {
            return Ok(RunResult::new());
        }

        info!("Running {} tests on {} workers", entries.len(), workers);
        let start = Instant::now();

        let results = self.run_chunks(partition(&entries, workers)).await?;
        let merged = RunResult::merge_all(results);

        info!(
            "Parallel execution completed in {:.1}s",
            start.elapsed().as_secs_f64()
        );
        Ok(merged)
    }
}

/// Entries assigned to one distributed CI node: the deduplicated, sorted
/// suite split into `total` chunks, of which chunk `index` is taken
pub fn node_entries(suite: &Suite, node: NodePartition) -> Vec<TestEntry> {
    let mut entries = unique(&suite.entries);
    entries.sort();
    partition(&entries, node.total)
        .into_iter()
        .nth(node.index)
        .unwrap_or_default()
}
