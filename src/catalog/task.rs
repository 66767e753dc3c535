//! Task resolution
//!
//! Turns a task name from the command line into the list of entries to
//! execute.

use std::fmt;
use tracing::{debug, info};

use super::suite::Catalog;
use super::CatalogError;
use crate::models::{Suite, TestEntry, TestRoot};

/// What a task name refers to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    /// Every suite
    All,
    /// A known suite and the suites it includes
    Suite(String),
    /// One half (`.0` or `.1`) of a known suite
    Half { suite: String, index: usize },
    /// A single target not described by any suite
    Adhoc(String),
}

impl Task {
    pub fn parse(name: &str, catalog: &Catalog) -> Task {
        if name == "all" {
            return Task::All;
        }
        if catalog.contains(name) {
            return Task::Suite(name.to_string());
        }
        if let Some((base, suffix)) = name.rsplit_once('.') {
            if let Ok(index @ 0..=1) = suffix.parse::<usize>() {
                if catalog.contains(base) {
                    return Task::Half {
                        suite: base.to_string(),
                        index,
                    };
                }
            }
        }
        Task::Adhoc(name.to_string())
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::All => write!(f, "all suites"),
            Task::Suite(name) => write!(f, "suite {name}"),
            Task::Half { suite, index } => write!(f, "suite {suite} (half {index})"),
            Task::Adhoc(name) => write!(f, "target {name}"),
        }
    }
}

/// Options that shape how a task becomes a suite
#[derive(Clone, Debug, Default)]
pub struct TaskRequest {
    pub task: String,
    /// Keep make targets instead of expanding them to recipe lines
    pub make: bool,
    /// Run ad hoc targets from `$AMBERHOME/test`
    pub use_amber_test_dir: bool,
    /// Substrings of entries to drop
    pub excluded_lines: Vec<String>,
}

impl TaskRequest {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            ..Default::default()
        }
    }

    pub fn make(mut self, make: bool) -> Self {
        self.make = make;
        self
    }

    pub fn use_amber_test_dir(mut self, yes: bool) -> Self {
        self.use_amber_test_dir = yes;
        self
    }

    pub fn excluded_lines(mut self, lines: Vec<String>) -> Self {
        self.excluded_lines = lines;
        self
    }
}

/// Build the suite a task selects
pub fn resolve_task(catalog: &mut Catalog, request: &TaskRequest) -> Result<Suite, CatalogError> {
    let task = Task::parse(&request.task, catalog);
    info!("Collecting {}", task);

    let mut suite = match &task {
        Task::All => catalog.all()?,
        Task::Suite(name) => catalog.selected(name)?,
        Task::Half { suite, .. } => catalog.suite(suite)?,
        Task::Adhoc(name) => {
            let root = if request.use_amber_test_dir {
                TestRoot::Amber
            } else {
                TestRoot::AmberTools
            };
            Suite::new(
                name.clone(),
                vec![TestEntry::new(name.clone(), catalog.test_dir(root))],
            )
        }
    };

    if !request.make {
        suite = catalog.expand(suite)?;
        if let Task::Half { index, .. } = task {
            suite = suite.half(index);
        }
    }

    suite.remove_matching_lines(&request.excluded_lines);
    suite.name = request.task.clone();

    info!("Number of tests = {}", suite.len());
    for entry in suite.sorted() {
        debug!("{}", entry);
    }

    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::super::suite::tests::fake_amberhome;
    use super::*;

    fn names(suite: &Suite) -> Vec<&str> {
        suite.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_parse() {
        let home = fake_amberhome();
        let catalog = Catalog::builtin(home.path());

        assert_eq!(Task::parse("all", &catalog), Task::All);
        assert_eq!(Task::parse("fast", &catalog), Task::Suite("fast".into()));
        assert_eq!(
            Task::parse("serial.MM.1", &catalog),
            Task::Half {
                suite: "serial.MM".into(),
                index: 1
            }
        );
        assert_eq!(
            Task::parse("fast.1", &catalog),
            Task::Half {
                suite: "fast".into(),
                index: 1
            }
        );
        assert_eq!(
            Task::parse("serial.MM.2", &catalog),
            Task::Adhoc("serial.MM.2".into())
        );
        assert_eq!(
            Task::parse("test.leap", &catalog),
            Task::Adhoc("test.leap".into())
        );
    }

    #[test]
    fn test_make_mode_keeps_targets() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let suite = resolve_task(&mut catalog, &TaskRequest::new("rism").make(true)).unwrap();
        assert_eq!(names(&suite), vec!["test.rism1d", "test.rism3d.periodic"]);
    }

    #[test]
    fn test_direct_mode_expands() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let suite = resolve_task(&mut catalog, &TaskRequest::new("rism")).unwrap();
        assert_eq!(suite.len(), 3);
        assert_eq!(suite.name, "rism");
    }

    #[test]
    fn test_halves_cover_suite() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let whole = resolve_task(&mut catalog, &TaskRequest::new("serial.MM")).unwrap();
        let first = resolve_task(&mut catalog, &TaskRequest::new("serial.MM.0")).unwrap();
        let second = resolve_task(&mut catalog, &TaskRequest::new("serial.MM.1")).unwrap();

        assert_eq!(whole.len(), 4);
        assert_eq!(first.len() + second.len(), whole.len());
        let mut rejoined = first.entries.clone();
        rejoined.extend(second.entries.clone());
        assert_eq!(rejoined, whole.entries);
    }

    #[test]
    fn test_halves_of_any_suite() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let whole = resolve_task(&mut catalog, &TaskRequest::new("rism")).unwrap();
        let first = resolve_task(&mut catalog, &TaskRequest::new("rism.0")).unwrap();
        let second = resolve_task(&mut catalog, &TaskRequest::new("rism.1")).unwrap();

        assert!(first.len() < whole.len());
        let mut rejoined = first.entries.clone();
        rejoined.extend(second.entries.clone());
        assert_eq!(rejoined, whole.entries);
    }

    #[test]
    fn test_half_ignored_in_make_mode() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let suite =
            resolve_task(&mut catalog, &TaskRequest::new("serial.QMMM.0").make(true)).unwrap();
        assert_eq!(
            names(&suite),
            vec!["test.serial.qmmm.dhfr", "test.serial.qmmm.crambin"]
        );
    }

    #[test]
    fn test_adhoc_dir_choice() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let tools = resolve_task(&mut catalog, &TaskRequest::new("test.pymsmt").make(true)).unwrap();
        assert_eq!(tools.entries[0].dir, home.path().join("AmberTools/test"));

        let amber = resolve_task(
            &mut catalog,
            &TaskRequest::new("test.nmode").make(true).use_amber_test_dir(true),
        )
        .unwrap();
        assert_eq!(amber.entries[0].dir, home.path().join("test"));
    }

    #[test]
    fn test_adhoc_expanded_against_its_makefile() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let suite = resolve_task(
            &mut catalog,
            &TaskRequest::new("test.nmode").use_amber_test_dir(true),
        )
        .unwrap();
        assert_eq!(names(&suite), vec!["cd nmode && ./Run.nmode"]);
    }

    #[test]
    fn test_unknown_adhoc_target_fails() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let err = resolve_task(&mut catalog, &TaskRequest::new("test.gpu")).unwrap_err();
        assert!(matches!(err, CatalogError::TargetNotFound(_)));
    }

    #[test]
    fn test_excluded_lines() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path());

        let request = TaskRequest::new("rism").excluded_lines(vec!["rism3d".into()]);
        let suite = resolve_task(&mut catalog, &request).unwrap();
        assert_eq!(names(&suite), vec!["cd rism1d && ./Run.rism1d"]);
    }

    #[test]
    fn test_exclusions_cover_names_and_lines() {
        let home = fake_amberhome();
        let mut catalog = Catalog::builtin(home.path())
            .with_excluded_names(vec!["test.pytraj".into()]);

        let request = TaskRequest::new("python").excluded_lines(vec!["pymsmt".into()]);
        let suite = resolve_task(&mut catalog, &request).unwrap();

        for entry in &suite.entries {
            assert!(!entry.name.contains("pytraj"));
            assert!(!entry.name.contains("pymsmt"));
        }
        assert!(suite.entries.iter().any(|e| e.name.contains("sanderapi")));
    }
}
