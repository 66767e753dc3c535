//! Test entry models
//!
//! Defines the two test-directory roots and the (test, directory) pairs
//! that make up a suite.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Test-directory roots under `$AMBERHOME`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestRoot {
    /// `$AMBERHOME/test`
    Amber,
    /// `$AMBERHOME/AmberTools/test`
    AmberTools,
}

impl TestRoot {
    /// Path of this root relative to `$AMBERHOME`
    pub fn relative_path(&self) -> &'static str {
        match self {
            TestRoot::Amber => "test",
            TestRoot::AmberTools => "AmberTools/test",
        }
    }

    /// Absolute test directory for a given installation
    pub fn dir(&self, amberhome: &Path) -> PathBuf {
        amberhome.join(self.relative_path())
    }

    /// The Makefile that describes this root's test targets
    pub fn makefile(&self, amberhome: &Path) -> PathBuf {
        self.dir(amberhome).join("Makefile")
    }

    /// Guess the root a test directory belongs to
    pub fn for_dir(dir: &Path) -> TestRoot {
        if dir.ends_with(TestRoot::Amber.relative_path())
            && !dir.ends_with(TestRoot::AmberTools.relative_path())
        {
            TestRoot::Amber
        } else if dir.to_string_lossy().contains("AmberTools") {
            TestRoot::AmberTools
        } else {
            TestRoot::Amber
        }
    }
}

impl fmt::Display for TestRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestRoot::Amber => write!(f, "Amber"),
            TestRoot::AmberTools => write!(f, "AmberTools"),
        }
    }
}

/// A single unit of execution: a make target or recipe line plus the
/// directory it runs in
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TestEntry {
    pub name: String,
    pub dir: PathBuf,
}

impl TestEntry {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
        }
    }

    pub fn root(&self) -> TestRoot {
        TestRoot::for_dir(&self.dir)
    }
}

impl fmt::Display for TestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.dir.display())
    }
}

/// A named, ordered collection of test entries
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,
    pub entries: Vec<TestEntry>,
}

impl Suite {
    pub fn new(name: impl Into<String>, entries: Vec<TestEntry>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the entries of another suite
    pub fn extend(&mut self, other: Suite) {
        self.entries.extend(other.entries);
    }

    /// Drop every entry whose name contains one of the given substrings
    pub fn remove_matching_lines(&mut self, lines: &[String]) {
        self.entries
            .retain(|entry| !lines.iter().any(|line| entry.name.contains(line.as_str())));
    }

    /// Keep one half of the suite (`index` 0 or 1)
    pub fn half(self, index: usize) -> Suite {
        let chunks = crate::executor::partition(&self.entries, 2);
        let entries = chunks.into_iter().nth(index).unwrap_or_default();
        Suite {
            name: self.name,
            entries,
        }
    }

    /// Entries sorted by name, for display
    pub fn sorted(&self) -> Vec<&TestEntry> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_dirs() {
        let home = Path::new("/opt/amber");
        assert_eq!(TestRoot::Amber.dir(home), PathBuf::from("/opt/amber/test"));
        assert_eq!(
            TestRoot::AmberTools.makefile(home),
            PathBuf::from("/opt/amber/AmberTools/test/Makefile")
        );
    }

    #[test]
    fn test_root_for_dir() {
        assert_eq!(
            TestRoot::for_dir(Path::new("/opt/amber/AmberTools/test")),
            TestRoot::AmberTools
        );
        assert_eq!(
            TestRoot::for_dir(Path::new("/opt/amber/test")),
            TestRoot::Amber
        );
    }

    #[test]
    fn test_remove_matching_lines() {
        let mut suite = Suite::new(
            "fast",
            vec![
                TestEntry::new("cd antechamber && ./Run.tp", "/t"),
                TestEntry::new("cd leap && ./Run.leap", "/t"),
                TestEntry::new("cd leap/glycam && ./Run.glycam", "/t"),
            ],
        );
        suite.remove_matching_lines(&["leap".to_string()]);
        assert_eq!(suite.len(), 1);
        assert_eq!(suite.entries[0].name, "cd antechamber && ./Run.tp");
    }

    #[test]
    fn test_half_split() {
        let entries: Vec<_> = (0..5)
            .map(|i| TestEntry::new(format!("t{i}"), "/t"))
            .collect();
        let suite = Suite::new("serial.MM", entries);

        let first = suite.clone().half(0);
        let second = suite.half(1);
        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        assert_eq!(first.entries[0].name, "t0");
        assert_eq!(second.entries[0].name, "t3");
    }
}
