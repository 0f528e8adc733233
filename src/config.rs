//! Configuration for the conversion driver.

use std::path::PathBuf;

/// Driver configuration: where to look for metadata files and the rule set.
///
/// Mirrors the two interactive prompts of the CLI surface ("base path for
/// metadata", "rule-set path"); both fall back to a platform default
/// (the current directory) when left blank.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Directory walked recursively for files named `meta.xml`.
    pub base_path: PathBuf,

    /// Path to the rule-set file (parsed by an external loader; the core
    /// only consumes the resulting [`crate::ruleset::RuleSet`]).
    pub rule_set_path: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverConfig {
    /// Create a new configuration with platform defaults (current directory).
    pub fn new() -> Self {
        Self {
            base_path: PathBuf::from("."),
            rule_set_path: PathBuf::from("ruleset.xml"),
        }
    }

    /// Set the base metadata path.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = path.into();
        self
    }

    /// Set the rule-set path.
    pub fn with_rule_set_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rule_set_path = path.into();
        self
    }

    /// Build a configuration from the two prompt answers, substituting the
    /// platform default for a blank answer.
    pub fn from_prompts(base_path_answer: &str, rule_set_answer: &str) -> Self {
        let defaults = Self::new();
        Self {
            base_path: if base_path_answer.trim().is_empty() {
                defaults.base_path
            } else {
                PathBuf::from(base_path_answer.trim())
            },
            rule_set_path: if rule_set_answer.trim().is_empty() {
                defaults.rule_set_path
            } else {
                PathBuf::from(rule_set_answer.trim())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_prompts_fall_back_to_defaults() {
        let cfg = DriverConfig::from_prompts("", "");
        assert_eq!(cfg.base_path, PathBuf::from("."));
        assert_eq!(cfg.rule_set_path, PathBuf::from("ruleset.xml"));
    }

    #[test]
    fn non_blank_prompts_are_used_verbatim() {
        let cfg = DriverConfig::from_prompts("  /data/meta  ", "/etc/rules.xml");
        assert_eq!(cfg.base_path, PathBuf::from("/data/meta"));
        assert_eq!(cfg.rule_set_path, PathBuf::from("/etc/rules.xml"));
    }
}
