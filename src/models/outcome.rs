//! Output classification
//!
//! Test programs report results as free text. Each line is matched against
//! an ordered list of substring rules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category a rule assigns to a matching line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputCategory {
    Passed,
    ProgramError,
    MissingRule,
    CommandNotFound,
    PossibleFailure,
    Failed,
}

impl OutputCategory {
    /// Errors raised by the program or the build system rather than by a
    /// file comparison
    pub fn is_program_error(&self) -> bool {
        matches!(
            self,
            OutputCategory::ProgramError
                | OutputCategory::MissingRule
                | OutputCategory::CommandNotFound
        )
    }

    /// A file comparison that did not match
    pub fn is_comparison_failure(&self) -> bool {
        matches!(
            self,
            OutputCategory::PossibleFailure | OutputCategory::Failed
        )
    }

    pub fn is_failure(&self) -> bool {
        self.is_program_error() || self.is_comparison_failure()
    }
}

impl fmt::Display for OutputCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputCategory::Passed => write!(f, "PASSED"),
            OutputCategory::ProgramError => write!(f, "PROGRAM ERROR"),
            OutputCategory::MissingRule => write!(f, "MISSING RULE"),
            OutputCategory::CommandNotFound => write!(f, "COMMAND NOT FOUND"),
            OutputCategory::PossibleFailure => write!(f, "POSSIBLE FAILURE"),
            OutputCategory::Failed => write!(f, "FAILED"),
        }
    }
}

/// A single (pattern, category) rule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub pattern: &'static str,
    pub category: OutputCategory,
}

/// Rules in evaluation order
pub const RULES: &[Rule] = &[
    Rule {
        pattern: "Program error",
        category: OutputCategory::ProgramError,
    },
    Rule {
        pattern: "No rule to make target",
        category: OutputCategory::MissingRule,
    },
    Rule {
        pattern: "command not found",
        category: OutputCategory::CommandNotFound,
    },
    Rule {
        pattern: "possible FAILURE",
        category: OutputCategory::PossibleFailure,
    },
    Rule {
        pattern: "FAILED",
        category: OutputCategory::Failed,
    },
    Rule {
        pattern: "PASSED",
        category: OutputCategory::Passed,
    },
];

/// Every category whose rule matches `text`, in rule order
pub fn classify(text: &str) -> Vec<OutputCategory> {
    RULES
        .iter()
        .filter(|rule| text.contains(rule.pattern))
        .map(|rule| rule.category)
        .collect()
}

/// First failure category matching `text`, if any
pub fn first_failure(text: &str) -> Option<OutputCategory> {
    RULES
        .iter()
        .find(|rule| rule.category.is_failure() && text.contains(rule.pattern))
        .map(|rule| rule.category)
}

pub fn is_failure(text: &str) -> bool {
    first_failure(text).is_some()
}

pub fn is_program_error(text: &str) -> bool {
    classify(text).iter().any(|c| c.is_program_error())
}

pub fn is_comparison_failure(text: &str) -> bool {
    classify(text).iter().any(|c| c.is_comparison_failure())
}

pub fn is_pass(text: &str) -> bool {
    classify(text).contains(&OutputCategory::Passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order() {
        let categories: Vec<_> = RULES.iter().map(|r| r.category).collect();
        assert_eq!(categories[0], OutputCategory::ProgramError);
        assert_eq!(categories[RULES.len() - 1], OutputCategory::Passed);
    }

    #[test]
    fn test_failure_markers() {
        assert!(is_failure("  diffing mdout.tip3p with saved: possible FAILURE"));
        assert!(is_failure("make: *** No rule to make target 'test.foo'.  Stop."));
        assert!(is_failure("sh: 1: sander: command not found"));
        assert!(is_failure("  Program error"));
        assert!(is_failure("FAILED: rism1d"));
        assert!(!is_failure("diffing mdout.tip3p: PASSED"));
    }

    #[test]
    fn test_program_error_vs_comparison() {
        assert!(is_program_error("Program error"));
        assert!(!is_comparison_failure("Program error"));
        assert!(is_comparison_failure("possible FAILURE: check mdout.dif"));
        assert!(!is_program_error("possible FAILURE: check mdout.dif"));
    }

    #[test]
    fn test_first_failure_skips_pass() {
        assert_eq!(first_failure("PASSED"), None);
        assert_eq!(
            first_failure("FAILED after Program error"),
            Some(OutputCategory::ProgramError)
        );
    }

    #[test]
    fn test_classify_multiple() {
        let categories = classify("1 PASSED, 1 FAILED");
        assert_eq!(
            categories,
            vec![OutputCategory::Failed, OutputCategory::Passed]
        );
    }
}
