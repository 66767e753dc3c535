//! Exclusion lists
//!
//! Loaded from a JSON file of the form
//! `{"test_name": ["test.pymsmt"], "test_line": ["Run.rem"]}`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tests to leave out of a run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusions {
    /// Suite members removed by exact name
    #[serde(default)]
    pub test_name: Vec<String>,

    /// Substrings; any entry whose name contains one is removed
    #[serde(default)]
    pub test_line: Vec<String>,
}

impl Exclusions {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read exclusion file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse exclusion file: {}", path.display()))
    }

    pub fn is_empty(&self) -> bool {
        self.test_name.is_empty() && self.test_line.is_empty()
    }
}
