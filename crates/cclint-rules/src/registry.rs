//! Rule registry with an init-then-freeze lifecycle.
//!
//! All rules are registered (and configured) before the executor starts;
//! during analysis the registry is only read. Tests construct a fresh
//! registry instead of resetting shared state.

use cclint_diagnostics::Severity;
use tracing::{debug, warn};

use crate::{Rule, RuleParams};

/// A registered rule plus its runtime configuration.
pub struct RuleEntry {
    pub rule: Box<dyn Rule>,
    pub enabled: bool,
    pub severity: Severity,
}

/// Ordered rule collection. Registration order is execution order;
/// re-registering a name replaces the earlier rule in place (latest wins).
#[derive(Default)]
pub struct RuleRegistry {
    entries: Vec<RuleEntry>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in rules.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::builtin::MaxLineLength::new()));
        registry.register(Box::new(crate::builtin::HeaderGuard::new()));
        registry.register(Box::new(crate::builtin::NamingConvention::new()));
        registry.register(Box::new(crate::builtin::FunctionComplexity::new()));
        registry
    }

    /// Register a rule, enabled at warning severity. A rule with the same
    /// name replaces the previous registration, keeping its position.
    pub fn register(&mut self, rule: Box<dyn Rule>) {
        let name = rule.name();
        debug!(rule = name, "registering rule");
        let entry = RuleEntry { rule, enabled: true, severity: Severity::Warning };
        match self.entries.iter_mut().find(|e| e.rule.name() == name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    /// Apply configuration to a rule by name: enabled flag, severity, and
    /// parameters. Returns false (and logs) when the name is unknown.
    pub fn configure(
        &mut self,
        name: &str,
        enabled: bool,
        severity: Severity,
        params: &RuleParams,
    ) -> bool {
        match self.entries.iter_mut().find(|e| e.rule.name() == name) {
            Some(entry) => {
                entry.enabled = enabled;
                entry.severity = severity;
                entry.rule.configure(params);
                true
            }
            None => {
                warn!(rule = name, "rule not found in registry");
                false
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&RuleEntry> {
        self.entries.iter().find(|e| e.rule.name() == name)
    }

    /// All entries, in registration order.
    pub fn entries(&self) -> &[RuleEntry] {
        &self.entries
    }

    /// Enabled entries, in registration order.
    pub fn enabled(&self) -> impl Iterator<Item = &RuleEntry> {
        self.entries.iter().filter(|e| e.enabled)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.rule.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleContext;

    struct Dummy(&'static str);

    impl Rule for Dummy {
        fn name(&self) -> &'static str {
            self.0
        }
        fn description(&self) -> &'static str {
            "dummy"
        }
        fn category(&self) -> &'static str {
            "test"
        }
        fn check_text(&self, ctx: &mut RuleContext<'_>, _source: &str) {
            ctx.report(1, 1, "dummy finding");
        }
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Dummy("b-rule")));
        registry.register(Box::new(Dummy("a-rule")));
        assert_eq!(registry.names(), ["b-rule", "a-rule"]);
    }

    #[test]
    fn test_latest_registration_wins_in_place() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Dummy("x")));
        registry.register(Box::new(Dummy("y")));
        registry.register(Box::new(Dummy("x")));
        assert_eq!(registry.names(), ["x", "y"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_configure_unknown_rule() {
        let mut registry = RuleRegistry::new();
        let ok = registry.configure("nope", true, Severity::Error, &RuleParams::new());
        assert!(!ok);
    }

    #[test]
    fn test_disabled_rules_are_filtered() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Dummy("x")));
        registry.register(Box::new(Dummy("y")));
        registry.configure("x", false, Severity::Warning, &RuleParams::new());
        let enabled: Vec<_> = registry.enabled().map(|e| e.rule.name()).collect();
        assert_eq!(enabled, ["y"]);
    }

    #[test]
    fn test_builtins_are_registered() {
        let registry = RuleRegistry::with_builtins();
        assert!(registry.get("max-line-length").is_some());
        assert!(registry.get("header-guard").is_some());
        assert!(registry.get("naming-convention").is_some());
        assert!(registry.get("function-complexity").is_some());
    }
}
