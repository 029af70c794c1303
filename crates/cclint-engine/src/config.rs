//! Analysis configuration.
//!
//! Loaded by an external configuration reader (JSON/YAML) and handed to the
//! engine as a validated struct; every field has a default so partial
//! configurations deserialize cleanly.

use cclint_diagnostics::Severity;
use cclint_rules::RuleParams;
use serde::Deserialize;

/// Per-rule configuration, merged into the registry by name.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    pub name: String,
    pub enabled: bool,
    pub severity: Severity,
    pub parameters: RuleParams,
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            name: String::new(),
            enabled: true,
            severity: Severity::Warning,
            parameters: RuleParams::new(),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Informational configuration version
    pub version: String,
    /// Informational hint for rules, e.g. `c++17`
    pub cpp_standard: String,

    /// Glob filters over file paths; empty means analyze everything
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,

    pub rules: Vec<RuleConfig>,

    /// Stop scheduling new files once this many errors were found
    /// (0 = unlimited)
    pub max_errors: usize,
    /// Per-rule wall-clock budget in milliseconds (0 = unlimited)
    pub rule_timeout_ms: u64,

    pub enable_semantic_analysis: bool,

    pub enable_cache: bool,
    pub cache_directory: String,

    /// Command-line style macro definitions (`FOO=1`, `BAR`)
    pub defines: Vec<String>,
    pub undefines: Vec<String>,
    pub include_paths: Vec<String>,

    pub output_format: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            version: "1.0".to_string(),
            cpp_standard: "auto".to_string(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            rules: Vec::new(),
            max_errors: 0,
            rule_timeout_ms: 0,
            enable_semantic_analysis: true,
            enable_cache: false,
            cache_directory: ".cclint_cache".to_string(),
            defines: Vec::new(),
            undefines: Vec::new(),
            include_paths: Vec::new(),
            output_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Whether `path` passes the include/exclude glob filters.
    pub fn should_analyze(&self, path: &str) -> bool {
        let matches_any = |patterns: &[String]| {
            patterns.iter().any(|pattern| {
                glob::Pattern::new(pattern).is_ok_and(|p| p.matches(path))
            })
        };

        if !self.include_patterns.is_empty() && !matches_any(&self.include_patterns) {
            return false;
        }
        !matches_any(&self.exclude_patterns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_errors, 0);
        assert!(!config.enable_cache);
        assert_eq!(config.cache_directory, ".cclint_cache");
        assert!(config.should_analyze("any/file.cpp"));
    }

    #[test]
    fn test_include_exclude_globs() {
        let config = Config {
            include_patterns: vec!["src/**/*.cpp".to_string(), "src/**/*.hpp".to_string()],
            exclude_patterns: vec!["src/generated/**".to_string()],
            ..Config::default()
        };
        assert!(config.should_analyze("src/core/lexer.cpp"));
        assert!(config.should_analyze("src/api.hpp"));
        assert!(!config.should_analyze("tests/lexer.cpp"));
        assert!(!config.should_analyze("src/generated/proto.cpp"));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let json = r#"{
            "max_errors": 5,
            "rules": [
                {"name": "max-line-length", "severity": "error",
                 "parameters": {"max_length": 100, "ignore_urls": true}}
            ]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_errors, 5);
        assert_eq!(config.rules.len(), 1);
        let rule = &config.rules[0];
        assert_eq!(rule.name, "max-line-length");
        assert!(rule.enabled);
        assert_eq!(rule.severity, Severity::Error);
        assert_eq!(rule.parameters.int_or("max_length", 80), 100);
        assert!(rule.parameters.bool_or("ignore_urls", false));
    }
}
