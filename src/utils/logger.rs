//! Logging utilities
//!
//! The log level is resolved once at startup and handed to
//! `init_logger`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// `--debug` wins, then the environment override, then info
    pub fn resolve(debug: bool, env_level: Option<&str>) -> Self {
        if debug {
            return LogLevel::Debug;
        }
        env_level.and_then(LogLevel::from_str).unwrap_or_default()
    }
}

/// Initialize the logger with specified level
pub fn init_logger(level: LogLevel) {
    let filter = EnvFilter::new(format!(
        "amber_test_runner={}",
        level.to_tracing_level()
    ));

    // A subscriber may already be installed when running under a test harness
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("unknown"), None);
    }

    #[test]
    fn test_resolve() {
        assert_eq!(LogLevel::resolve(true, Some("error")), LogLevel::Debug);
        assert_eq!(LogLevel::resolve(false, Some("warn")), LogLevel::Warn);
        assert_eq!(LogLevel::resolve(false, Some("bogus")), LogLevel::Info);
        assert_eq!(LogLevel::resolve(false, None), LogLevel::Info);
    }

    #[test]
    fn test_init_twice() {
        init_logger(LogLevel::Warn);
        init_logger(LogLevel::Debug);
    }
}
