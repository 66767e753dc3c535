//! Makefile test-target parsing
//!
//! Recovers named test groups from the test `Makefile`s. A block starts at
//! a `name:` label and runs until the next line carrying the `test.`
//! prefix; its first line lists dependencies, the following lines are the
//! recipe.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::CatalogError;

/// Prefix shared by every test target label
pub const TARGET_PREFIX: &str = "test.";

/// Values substituted into Makefile lines before parsing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Substitutions {
    pub amber_source: String,
}

impl Substitutions {
    pub fn new(amber_source: impl Into<String>) -> Self {
        Self {
            amber_source: amber_source.into(),
        }
    }

    /// Resolve substitutions for an installation. `AMBER_SOURCE` comes from
    /// `config.h`, falling back to the installation root itself.
    pub fn for_amberhome(amberhome: &Path) -> Self {
        match read_amber_source(amberhome) {
            Some(source) => Self::new(source),
            None => {
                debug!(
                    "AMBER_SOURCE not found in {}/config.h, using AMBERHOME",
                    amberhome.display()
                );
                Self::new(amberhome.to_string_lossy())
            }
        }
    }

    fn apply(&self, line: &str) -> String {
        let line = line
            .replace("$(BINDIR)", "$AMBERHOME/bin")
            .replace("$(MAKE)", "make")
            .replace("$(AMBER_SOURCE)", &self.amber_source)
            .replace("$(NETCDF)", "$AMBERHOME/include/netcdf.mod");

        // make's ignore-errors marker
        if line.trim().starts_with('-') {
            line.replacen('-', "", 1)
        } else {
            line
        }
    }
}

/// Read `AMBER_SOURCE=...` from `$AMBERHOME/config.h`
pub fn read_amber_source(amberhome: &Path) -> Option<String> {
    let content = fs::read_to_string(amberhome.join("config.h")).ok()?;
    env_value("AMBER_SOURCE", &content)
}

/// Value of the first `NAME=value` assignment in `text`
fn env_value(name: &str, text: &str) -> Option<String> {
    let prefix = format!("{name}=");
    text.lines()
        .find(|line| line.starts_with(&prefix))
        .and_then(|line| line.rsplit('=').next())
        .map(|value| value.trim().to_string())
}

/// A preprocessed test Makefile
#[derive(Clone, Debug)]
pub struct Makefile {
    lines: Vec<String>,
}

impl Makefile {
    pub fn parse(text: &str, substitutions: &Substitutions) -> Self {
        Self {
            lines: text.lines().map(|line| substitutions.apply(line)).collect(),
        }
    }

    pub fn load(path: &Path, substitutions: &Substitutions) -> Result<Self, CatalogError> {
        let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded {}", path.display());
        Ok(Self::parse(&text, substitutions))
    }

    /// Line range `[start, end)` of the block labelled `name`
    fn block(&self, name: &str) -> Result<(usize, usize), CatalogError> {
        let label = format!("{name}:");
        let start = self
            .lines
            .iter()
            .position(|line| line.starts_with(&label))
            .ok_or_else(|| CatalogError::TargetNotFound(name.to_string()))?;

        let end = self.lines[start + 1..]
            .iter()
            .position(|line| line.starts_with(TARGET_PREFIX))
            .map(|offset| start + 1 + offset)
            .unwrap_or(self.lines.len());

        Ok((start, end))
    }

    /// Whitespace-separated words of the block, without the label and
    /// continuation markers
    pub fn dependencies(&self, name: &str) -> Result<Vec<String>, CatalogError> {
        let (start, end) = self.block(name)?;
        let text = self.lines[start..end].join("\n");

        Ok(text
            .split_whitespace()
            .filter(|word| *word != "\\")
            .skip(1)
            .map(str::to_string)
            .collect())
    }

    /// Recipe lines of the block, trimmed, without comments or blanks
    pub fn recipe(&self, name: &str) -> Result<Vec<String>, CatalogError> {
        let (start, end) = self.block(name)?;

        Ok(self.lines[start + 1..end]
            .iter()
            .filter(|line| !line.starts_with('#') && !line.trim().is_empty())
            .map(|line| line.trim().replace("make k", "make -k"))
            .collect())
    }

    /// Expand a target into the individual commands that make it up.
    ///
    /// A target whose own body is a directory change is returned as its
    /// recipe. Otherwise each dependency is expanded one level deeper;
    /// dependencies without a block of their own are skipped.
    pub fn individual_tests(&self, name: &str) -> Result<Vec<String>, CatalogError> {
        let dependencies = self.dependencies(name)?;

        match dependencies.first() {
            None => return self.recipe(name),
            Some(first) if first.starts_with("cd") => return self.recipe(name),
            Some(_) => {}
        }

        let mut tests = Vec::new();
        for dependency in &dependencies {
            match self.recipe(dependency) {
                Ok(lines) => tests.extend(lines.into_iter().filter(|line| !line.is_empty())),
                Err(CatalogError::TargetNotFound(missing)) => {
                    warn!("{}: dependency {} has no target, skipping", name, missing);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(tests)
    }
}
