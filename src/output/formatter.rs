//! Console formatters
//!
//! Renders suite listings, collected suites and run outcomes as text or
//! JSON.

use serde::Serialize;

use crate::catalog::{Member, SuiteDefinition};
use crate::models::{ErrorExcerpt, RunSummary, Suite};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// A suite definition with its members resolved against an installation
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedSuite {
    pub name: String,
    pub members: Vec<String>,
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// Suite definitions as shipped or configured
    pub fn format_definitions(&self, definitions: &[SuiteDefinition]) -> String {
        if self.format == OutputFormat::Json {
            return serde_json::to_string_pretty(definitions).unwrap_or_default();
        }

        let mut output = String::new();
        output.push_str(&format!("\nTest Suites ({} total)\n", definitions.len()));
        output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

        for definition in definitions {
            output.push_str(&format!(
                "  {:22} [{}]\n",
                definition.name, definition.root
            ));
            for member in &definition.members {
                match member {
                    Member::Fixed(name) => output.push_str(&format!("      {name}\n")),
                    Member::Target { target } => {
                        output.push_str(&format!("      {target} (expanded)\n"))
                    }
                }
            }
            if !definition.exclude.is_empty() {
                output.push_str(&format!("    exclude: {}\n", definition.exclude.join(", ")));
            }
            if !definition.include.is_empty() {
                output.push_str(&format!("    include: {}\n", definition.include.join(", ")));
            }
        }

        output
    }

    /// Suites with their members resolved
    pub fn format_resolved(&self, suites: &[ResolvedSuite]) -> String {
        if self.format == OutputFormat::Json {
            return serde_json::to_string_pretty(suites).unwrap_or_default();
        }

        let mut output = String::new();
        for suite in suites {
            output.push_str(&format!("\n{} ({} tests):\n", suite.name, suite.members.len()));
            output.push_str("──────────────────────────────────────────────────────────────\n");
            for member in &suite.members {
                output.push_str(&format!("  {member}\n"));
            }
        }
        output
    }

    /// A collected suite, entries sorted
    pub fn format_suite(&self, suite: &Suite) -> String {
        if self.format == OutputFormat::Json {
            return serde_json::to_string_pretty(suite).unwrap_or_default();
        }

        let mut output = format!("Number of tests = {}\n", suite.len());
        for entry in suite.sorted() {
            output.push_str(&format!("{entry}\n"));
        }
        output
    }

    /// Collected error excerpts, one block each
    pub fn format_errors(&self, errors: &[ErrorExcerpt]) -> String {
        let mut output = String::new();
        if errors.is_empty() {
            return output;
        }

        output.push_str(&self.paint(
            &format!("\n{} test error(s) collected:\n", errors.len()),
            "31",
        ));
        for error in errors {
            output.push_str(&format!("{error}\n"));
        }
        output
    }

    /// One-line run summary for the console
    pub fn format_summary(&self, summary: &RunSummary, minutes: f64) -> String {
        let passed = self.paint(&summary.passed.to_string(), "32");
        let failed = if summary.failed > 0 {
            self.paint(&summary.failed.to_string(), "31")
        } else {
            summary.failed.to_string()
        };
        let errors = if summary.program_errors > 0 {
            self.paint(&summary.program_errors.to_string(), "31")
        } else {
            summary.program_errors.to_string()
        };

        format!(
            "Passed: {passed} | Failed: {failed} | Errors: {errors} | {minutes:.2} (minutes)"
        )
    }
}

#[cfg(test)]
impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Text)
    }
}
