//! Suite definitions and the catalog that resolves them
//!
//! A suite definition names its test root and its members. Members are
//! either test names used as-is or Makefile targets replaced by their
//! dependency list. Targets are resolved lazily so a task only reads the
//! Makefiles it needs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::debug;

use super::makefile::{Makefile, Substitutions};
use super::CatalogError;
use crate::models::{Suite, TestEntry, TestRoot};

/// A suite member
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Member {
    /// Used verbatim
    Fixed(String),
    /// Replaced by the dependencies of a Makefile target
    Target { target: String },
}

impl Member {
    pub fn target(name: impl Into<String>) -> Self {
        Member::Target {
            target: name.into(),
        }
    }
}

impl From<&str> for Member {
    fn from(name: &str) -> Self {
        Member::Fixed(name.to_string())
    }
}

/// Definition of a named suite
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteDefinition {
    pub name: String,
    pub root: TestRoot,
    pub members: Vec<Member>,

    /// Member names dropped after target expansion
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Other suites appended when this one is selected by name
    #[serde(default)]
    pub include: Vec<String>,
}

impl SuiteDefinition {
    pub fn new(name: impl Into<String>, root: TestRoot) -> Self {
        Self {
            name: name.into(),
            root,
            members: Vec::new(),
            exclude: Vec::new(),
            include: Vec::new(),
        }
    }

    pub fn fixed(mut self, names: &[&str]) -> Self {
        self.members.extend(names.iter().map(|n| Member::from(*n)));
        self
    }

    pub fn target(mut self, name: impl Into<String>) -> Self {
        self.members.push(Member::target(name));
        self
    }

    pub fn exclude(mut self, name: impl Into<String>) -> Self {
        self.exclude.push(name.into());
        self
    }

    pub fn include(mut self, suite: impl Into<String>) -> Self {
        self.include.push(suite.into());
        self
    }
}

/// The suites shipped with the tool
pub fn builtin_suites() -> Vec<SuiteDefinition> {
    vec![
        SuiteDefinition::new("serial.MM", TestRoot::Amber)
            .target("test.serial.sander.MM")
            .fixed(&["test.nmode"])
            .exclude("test.serial.sander.emap"),
        SuiteDefinition::new("serial.QMMM", TestRoot::Amber).target("test.serial.QMMM"),
        SuiteDefinition::new("serial.sander.SEBOMD", TestRoot::Amber)
            .fixed(&["test.serial.sander.SEBOMD"]),
        SuiteDefinition::new("sanderapi", TestRoot::Amber).fixed(&["test.serial.sanderapi"]),
        SuiteDefinition::new("fast", TestRoot::AmberTools).fixed(&[
            "test.cpptraj",
            "test.pytraj",
            "test.parmed",
            "test.pdb4amber",
            "test.leap",
            "test.antechamber",
            "test.unitcell",
            "test.reduce",
            "test.nab",
            "test.mdgx",
            "test.resp",
            "test.sqm",
            "test.gbnsr6",
            "test.elsize",
            "test.paramfit",
            "test.FEW",
            "test.cphstats",
            "test.cpinutil",
        ]),
        SuiteDefinition::new("mmpbsa", TestRoot::AmberTools)
            .fixed(&["test.mmpbsa", "test.mm_pbsa"]),
        SuiteDefinition::new("pbsa", TestRoot::AmberTools).fixed(&["test.pbsa"]),
        SuiteDefinition::new("rism", TestRoot::AmberTools)
            .fixed(&["test.rism1d", "test.rism3d.periodic"]),
        SuiteDefinition::new("python", TestRoot::AmberTools)
            .fixed(&["test.pytraj", "test.parmed", "test.pdb4amber", "test.pymsmt"])
            .include("sanderapi"),
    ]
}

/// Resolves suite definitions against an installation
pub struct Catalog {
    amberhome: PathBuf,
    definitions: Vec<SuiteDefinition>,
    excluded_names: Vec<String>,
    substitutions: Substitutions,
    makefiles: HashMap<TestRoot, Makefile>,
}

impl Catalog {
    pub fn new(amberhome: impl Into<PathBuf>, definitions: Vec<SuiteDefinition>) -> Self {
        let amberhome = amberhome.into();
        let substitutions = Substitutions::for_amberhome(&amberhome);
        Self {
            amberhome,
            definitions,
            excluded_names: Vec::new(),
            substitutions,
            makefiles: HashMap::new(),
        }
    }

    /// Catalog with the built-in suites
    #[cfg(test)]
    pub fn builtin(amberhome: impl Into<PathBuf>) -> Self {
        Self::new(amberhome, builtin_suites())
    }

    /// Names removed from every suite
    pub fn with_excluded_names(mut self, names: Vec<String>) -> Self {
        self.excluded_names = names;
        self
    }

    pub fn test_dir(&self, root: TestRoot) -> PathBuf {
        root.dir(&self.amberhome)
    }

    pub fn definitions(&self) -> &[SuiteDefinition] {
        &self.definitions
    }

    pub fn definition(&self, name: &str) -> Option<&SuiteDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definition(name).is_some()
    }

    /// The Makefile of a test root, loaded on first use
    pub fn makefile(&mut self, root: TestRoot) -> Result<&Makefile, CatalogError> {
        if !self.makefiles.contains_key(&root) {
            let makefile = Makefile::load(&root.makefile(&self.amberhome), &self.substitutions)?;
            self.makefiles.insert(root, makefile);
        }
        Ok(&self.makefiles[&root])
    }

    /// Member names of a suite with targets expanded and exclusions applied
    pub fn member_names(&mut self, name: &str) -> Result<Vec<String>, CatalogError> {
        let definition = self
            .definition(name)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownSuite(name.to_string()))?;

        let mut names = Vec::new();
        for member in &definition.members {
            match member {
                Member::Fixed(test) => names.push(test.clone()),
                Member::Target { target } => {
                    let makefile = self.makefile(definition.root)?;
                    names.extend(makefile.dependencies(target)?);
                }
            }
        }

        names.retain(|n| !definition.exclude.contains(n) && !self.excluded_names.contains(n));
        debug!("Suite {} has {} members", name, names.len());
        Ok(names)
    }

    /// A single suite, without the suites it includes
    pub fn suite(&mut self, name: &str) -> Result<Suite, CatalogError> {
        let names = self.member_names(name)?;
        let root = self
            .definition(name)
            .map(|d| d.root)
            .ok_or_else(|| CatalogError::UnknownSuite(name.to_string()))?;
        let dir = self.test_dir(root);

        Ok(Suite::new(
            name,
            names
                .into_iter()
                .map(|test| TestEntry::new(test, dir.clone()))
                .collect(),
        ))
    }

    /// A suite as selected by name: its own members followed by those of
    /// every included suite
    pub fn selected(&mut self, name: &str) -> Result<Suite, CatalogError> {
        let mut suite = self.suite(name)?;
        let includes = self
            .definition(name)
            .map(|d| d.include.clone())
            .unwrap_or_default();

        for include in includes {
            suite.extend(self.suite(&include)?);
        }
        Ok(suite)
    }

    /// Every suite concatenated in definition order
    pub fn all(&mut self) -> Result<Suite, CatalogError> {
        let names: Vec<String> = self.definitions.iter().map(|d| d.name.clone()).collect();
        let mut all = Suite::new("all", Vec::new());
        for name in names {
            all.extend(self.suite(&name)?);
        }
        Ok(all)
    }

    /// Replace each entry with the individual recipe lines of its target
    pub fn expand(&mut self, suite: Suite) -> Result<Suite, CatalogError> {
        let mut entries = Vec::new();
        for entry in suite.entries {
            let makefile = self.makefile(entry.root())?;
            entries.extend(
                makefile
                    .individual_tests(&entry.name)?
                    .into_iter()
                    .map(|test| TestEntry::new(test, entry.dir.clone())),
            );
        }
        Ok(Suite::new(suite.name, entries))
    }
}
