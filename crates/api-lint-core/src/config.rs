//! Runtime configuration for api-lint.

use crate::rule_name::{normalize_path, RuleName, WILDCARD};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration for api-lint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Linter configuration.
    #[serde(default)]
    pub linter: LinterConfig,

    /// Path-scoped rule entries, applied in order.
    #[serde(default)]
    pub configs: Vec<RuleConfig>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid, a path pattern is not a
    /// valid glob, or a rule entry is not a valid rule path.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.configs {
            for pattern in entry.included_paths.iter().chain(&entry.excluded_paths) {
                glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?;
            }
            for rule in entry.enabled_rules.iter().chain(&entry.disabled_rules) {
                if rule != WILDCARD && normalize_path(rule).is_none() {
                    return Err(ConfigError::InvalidRule { rule: rule.clone() });
                }
            }
        }
        Ok(())
    }

    /// Checks if a rule is enabled for a file path.
    ///
    /// Rules start enabled. Every entry whose paths match the file can
    /// enable or disable the rule by prefix; the last matching entry wins.
    #[must_use]
    pub fn is_rule_enabled(&self, rule: &RuleName, path: &str) -> bool {
        let mut enabled = true;
        for entry in self.configs.iter().filter(|e| e.applies_to(path)) {
            if entry.enabled_rules.iter().any(|p| rule.matches_prefix(p)) {
                enabled = true;
            } else if entry.disabled_rules.iter().any(|p| rule.matches_prefix(p)) {
                enabled = false;
            }
        }
        enabled
    }

    /// Appends an entry disabling a rule (or group) for every path.
    pub fn disable_rule(&mut self, rule: impl Into<String>) {
        self.configs.push(RuleConfig {
            disabled_rules: vec![rule.into()],
            ..RuleConfig::default()
        });
    }
}

/// Linter-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinterConfig {
    /// Maximum number of worker threads (1 = sequential, unset = all cores).
    #[serde(default)]
    pub parallelism: Option<usize>,
}

/// One path-scoped rule entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Glob patterns of files this entry applies to (empty = all).
    #[serde(default)]
    pub included_paths: Vec<String>,

    /// Glob patterns of files this entry never applies to.
    #[serde(default)]
    pub excluded_paths: Vec<String>,

    /// Rule names or prefixes to enable.
    #[serde(default)]
    pub enabled_rules: Vec<String>,

    /// Rule names or prefixes to disable.
    #[serde(default)]
    pub disabled_rules: Vec<String>,
}

impl RuleConfig {
    /// Returns true if this entry applies to a file path.
    #[must_use]
    pub fn applies_to(&self, path: &str) -> bool {
        let matches = |pattern: &String| {
            glob::Pattern::new(pattern).is_ok_and(|p| p.matches(path))
        };
        (self.included_paths.is_empty() || self.included_paths.iter().any(matches))
            && !self.excluded_paths.iter().any(matches)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// A path pattern is not a valid glob.
    #[error("Invalid path pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Glob error message.
        message: String,
    },

    /// A rule entry is not a valid rule path.
    #[error("Invalid rule `{rule}` in config")]
    InvalidRule {
        /// The offending entry.
        rule: String,
    },
}
