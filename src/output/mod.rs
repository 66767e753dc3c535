//! Output formatting module
//!
//! Console progress and text/JSON rendering of suites and run outcomes.

mod console;
mod formatter;

pub use console::Console;
pub use formatter::{OutputFormat, ResolvedSuite, ResultFormatter};
