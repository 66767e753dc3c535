//! Environment variable configuration
//!
//! Reads the installation root, the distributed CI node slot and the
//! tool's own overrides from the environment.

use std::env;
use std::path::PathBuf;

use super::ConfigError;

/// Environment variable prefix
const ENV_PREFIX: &str = "AMBER_TEST";

const AMBERHOME: &str = "AMBERHOME";
const NODE_INDEX: &str = "CIRCLE_NODE_INDEX";
const NODE_TOTAL: &str = "CIRCLE_NODE_TOTAL";

/// This node's slot in a distributed CI run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodePartition {
    pub index: usize,
    pub total: usize,
}

impl NodePartition {
    pub fn new(index: usize, total: usize) -> Result<Self, ConfigError> {
        if total == 0 || index >= total {
            return Err(ConfigError::NodeOutOfRange { index, total });
        }
        Ok(Self { index, total })
    }
}

/// Configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Installation root from AMBERHOME
    pub amberhome: Option<PathBuf>,
    /// Raw CIRCLE_NODE_INDEX
    pub node_index: Option<String>,
    /// Raw CIRCLE_NODE_TOTAL
    pub node_total: Option<String>,
    /// Config file from AMBER_TEST_CONFIG
    pub config_file: Option<PathBuf>,
    /// Log level from AMBER_TEST_LOG
    pub log_level: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let prefixed = |name: &str| lookup(&format!("{ENV_PREFIX}_{name}"));
        Self {
            amberhome: lookup(AMBERHOME).filter(|v| !v.is_empty()).map(PathBuf::from),
            node_index: lookup(NODE_INDEX),
            node_total: lookup(NODE_TOTAL),
            config_file: prefixed("CONFIG").map(PathBuf::from),
            log_level: prefixed("LOG"),
        }
    }

    /// The installation root; a run cannot start without it
    pub fn require_amberhome(&self) -> Result<PathBuf, ConfigError> {
        self.amberhome
            .clone()
            .ok_or(ConfigError::MissingEnv(AMBERHOME))
    }

    /// The CI node slot; both variables must be set and consistent
    pub fn node_partition(&self) -> Result<NodePartition, ConfigError> {
        let index = parse_required(NODE_INDEX, self.node_index.as_deref())?;
        let total = parse_required(NODE_TOTAL, self.node_total.as_deref())?;
        NodePartition::new(index, total)
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {AMBERHOME}:            {:?}", self.amberhome);
        println!("  {NODE_INDEX}:    {:?}", self.node_index);
        println!("  {NODE_TOTAL}:    {:?}", self.node_total);
        println!("  {ENV_PREFIX}_CONFIG:    {:?}", self.config_file);
        println!("  {ENV_PREFIX}_LOG:       {:?}", self.log_level);
    }
}

fn parse_required(name: &'static str, value: Option<&str>) -> Result<usize, ConfigError> {
    let value = value.ok_or(ConfigError::MissingEnv(name))?;
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        name,
        value: value.to_string(),
    })
}

/// Print every environment variable the tool reads
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {AMBERHOME}            Installation root (required)");
    println!("  {NODE_INDEX}    Index of this CI node (with --circleci)");
    println!("  {NODE_TOTAL}    Number of CI nodes (with --circleci)");
    println!("  {ENV_PREFIX}_CONFIG    Path to configuration file");
    println!("  {ENV_PREFIX}_LOG       Log level (trace, debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {AMBERHOME}=$HOME/amber22");
    println!("  amber-test-runner run --task fast -n 4");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(vars: &[(&str, &str)]) -> EnvConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_env_config_default() {
        let config = EnvConfig::default();
        assert!(config.amberhome.is_none());
        assert!(matches!(
            config.require_amberhome(),
            Err(ConfigError::MissingEnv("AMBERHOME"))
        ));
    }

    #[test]
    fn test_from_lookup() {
        let config = env_from(&[
            ("AMBERHOME", "/opt/amber"),
            ("AMBER_TEST_CONFIG", "ci.yaml"),
            ("AMBER_TEST_LOG", "debug"),
        ]);
        assert_eq!(config.require_amberhome().unwrap(), PathBuf::from("/opt/amber"));
        assert_eq!(config.config_file, Some(PathBuf::from("ci.yaml")));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_empty_amberhome_is_missing() {
        let config = env_from(&[("AMBERHOME", "")]);
        assert!(config.require_amberhome().is_err());
    }

    #[test]
    fn test_node_partition() {
        let config = env_from(&[("CIRCLE_NODE_INDEX", "2"), ("CIRCLE_NODE_TOTAL", "4")]);
        assert_eq!(
            config.node_partition().unwrap(),
            NodePartition { index: 2, total: 4 }
        );
    }

    #[test]
    fn test_node_partition_missing() {
        let config = env_from(&[("CIRCLE_NODE_TOTAL", "4")]);
        assert!(matches!(
            config.node_partition(),
            Err(ConfigError::MissingEnv("CIRCLE_NODE_INDEX"))
        ));
    }

    #[test]
    fn test_node_partition_invalid() {
        let config = env_from(&[("CIRCLE_NODE_INDEX", "one"), ("CIRCLE_NODE_TOTAL", "4")]);
        assert!(matches!(
            config.node_partition(),
            Err(ConfigError::InvalidEnv { .. })
        ));

        let config = env_from(&[("CIRCLE_NODE_INDEX", "4"), ("CIRCLE_NODE_TOTAL", "4")]);
        assert!(matches!(
            config.node_partition(),
            Err(ConfigError::NodeOutOfRange { index: 4, total: 4 })
        ));
    }
}
