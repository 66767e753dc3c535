//! Run orchestration
//!
//! Collects the suite a task selects, hands it to a dispatcher unless only
//! collection was asked for, and decides whether the run failed.

use anyhow::{bail, Result};
use tracing::warn;

use crate::catalog::{resolve_task, Catalog, TaskRequest};
use crate::executor::{Dispatcher, Strategy};
use crate::models::{RunResult, Suite};

/// What a run produced
#[derive(Debug)]
pub enum RunOutcome {
    /// The suite that would have run; nothing was executed
    Collected(Suite),
    Completed {
        suite: Suite,
        strategy: Strategy,
        result: RunResult,
    },
}

/// Collect the suite for `request` and, unless `collect_only`, run it.
///
/// `dispatcher` is only called once there is something to execute, so a
/// collect-only run never needs the CI node variables.
pub async fn run_task<F>(
    catalog: &mut Catalog,
    request: &TaskRequest,
    collect_only: bool,
    dispatcher: F,
) -> Result<RunOutcome>
where
    F: FnOnce(&Suite) -> Result<Dispatcher>,
{
    let suite = resolve_task(catalog, request)?;
    if suite.is_empty() {
        warn!("Task {} selects no tests", request.task);
    }

    if collect_only {
        return Ok(RunOutcome::Collected(suite));
    }

    let dispatcher = dispatcher(&suite)?;
    let result = dispatcher.dispatch(&suite).await?;

    Ok(RunOutcome::Completed {
        suite,
        strategy: dispatcher.strategy(),
        result,
    })
}

/// Fail the process when any test left an error excerpt behind
pub fn finish(result: &RunResult) -> Result<()> {
    if result.has_errors() {
        bail!("{} test error(s) collected", result.errors.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{ExecutionMode, TestRunner};
    use crate::output::Console;
    use std::fs;
    use tempfile::TempDir;

    const MAKEFILE: &str = "\
test.marker:
\tcd . && touch marker.txt

test.broken:
\tcd . && echo possible FAILURE

test.clean:
\tcd . && echo PASSED
";

    fn amberhome() -> TempDir {
        let home = tempfile::tempdir().unwrap();
        fs::create_dir_all(home.path().join("AmberTools/test")).unwrap();
        fs::write(home.path().join("AmberTools/test/Makefile"), MAKEFILE).unwrap();
        home
    }

    fn serial() -> Result<Dispatcher> {
        Ok(Dispatcher::new(
            TestRunner::new(ExecutionMode::Direct, Console::hidden()),
            Strategy::Serial,
        ))
    }

    async fn run(home: &TempDir, task: &str, collect_only: bool) -> RunOutcome {
        let mut catalog = Catalog::builtin(home.path());
        run_task(&mut catalog, &TaskRequest::new(task), collect_only, |_| serial())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_collect_only_runs_nothing() {
        let home = amberhome();
        let mut catalog = Catalog::builtin(home.path());
        let mut built = false;

        let outcome = run_task(&mut catalog, &TaskRequest::new("test.marker"), true, |_| {
            built = true;
            serial()
        })
        .await
        .unwrap();

        let RunOutcome::Collected(suite) = outcome else {
            panic!("expected a collected suite");
        };
        assert_eq!(suite.len(), 1);
        assert_eq!(suite.entries[0].name, "cd . && touch marker.txt");
        assert!(!built);
        assert!(!home.path().join("AmberTools/test/marker.txt").exists());
    }

    #[tokio::test]
    async fn test_run_executes_suite() {
        let home = amberhome();

        let RunOutcome::Completed { suite, strategy, result } =
            run(&home, "test.marker", false).await
        else {
            panic!("expected a completed run");
        };
        assert_eq!(suite.len(), 1);
        assert_eq!(strategy, Strategy::Serial);
        assert_eq!(result.timings.len(), 1);
        assert!(home.path().join("AmberTools/test/marker.txt").exists());
        assert!(finish(&result).is_ok());
    }

    #[tokio::test]
    async fn test_collected_errors_fail_the_run() {
        let home = amberhome();

        let RunOutcome::Completed { result, .. } = run(&home, "test.broken", false).await else {
            panic!("expected a completed run");
        };
        let err = finish(&result).unwrap_err();
        assert_eq!(err.to_string(), "1 test error(s) collected");
    }

    #[tokio::test]
    async fn test_clean_run_succeeds() {
        let home = amberhome();

        let RunOutcome::Completed { result, .. } = run(&home, "test.clean", false).await else {
            panic!("expected a completed run");
        };
        assert_eq!(result.output, vec!["PASSED"]);
        assert!(finish(&result).is_ok());
    }

    #[test]
    fn test_finish_counts_every_excerpt() {
        let mut result = RunResult::new();
        for command in ["cd a && ./Run.a", "cd b && ./Run.b"] {
            result.errors.push(crate::models::ErrorExcerpt {
                command: command.into(),
                context: "possible FAILURE".into(),
            });
        }
        assert_eq!(
            finish(&result).unwrap_err().to_string(),
            "2 test error(s) collected"
        );
    }
}
