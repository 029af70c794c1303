//! Rule interface, registry, and executor for cclint.
//!
//! A rule is a value implementing [`Rule`]; the three checking channels
//! (`check_text`, `check_tokens`, `check_ast`) all default to no-ops, so a
//! rule implements only the subset it needs. Rules report through a
//! [`RuleContext`], which stamps the configured rule name and severity onto
//! every diagnostic.
//!
//! The [`RuleRegistry`] is populated before analysis starts and read-only
//! afterwards; the [`RuleExecutor`] drives enabled rules in registration
//! order, timing each rule, catching panics at the boundary, and recording
//! per-rule statistics.

use std::collections::BTreeMap;

use cclint_diagnostics::{Diagnostic, DiagnosticEngine, FixItHint, Location, Severity};
use serde::{Deserialize, Serialize};

pub mod builtin;
mod executor;
mod registry;

pub use executor::{RuleExecutionStats, RuleExecutor};
pub use registry::{RuleEntry, RuleRegistry};

use cclint_ast::Node;
use cclint_token::Token;

/// One configuration parameter value, as loaded from the configuration
/// file: an integer, a boolean, or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl ParamValue {
    /// Coerce to an integer: booleans map to 0/1, strings are parsed.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParamValue::Int(value) => Some(*value),
            ParamValue::Bool(value) => Some(i64::from(*value)),
            ParamValue::Str(text) => text.parse().ok(),
        }
    }

    /// Coerce to a boolean: integers are true when non-zero, strings must
    /// spell `true` or `false`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(value) => Some(*value),
            ParamValue::Int(value) => Some(*value != 0),
            ParamValue::Str(text) => match text.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(text) => Some(text),
            _ => None,
        }
    }
}

/// String-keyed rule parameters with typed, defaulted accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleParams(pub BTreeMap<String, ParamValue>);

impl RuleParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: ParamValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(ParamValue::as_int).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(ParamValue::as_bool).unwrap_or(default)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).and_then(ParamValue::as_str).unwrap_or(default)
    }
}

/// Reporting handle passed to rules: carries the file path and the
/// configured severity, and appends to the per-file diagnostic engine.
pub struct RuleContext<'a> {
    pub path: &'a str,
    pub severity: Severity,
    rule_name: &'a str,
    engine: &'a mut DiagnosticEngine,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        path: &'a str,
        rule_name: &'a str,
        severity: Severity,
        engine: &'a mut DiagnosticEngine,
    ) -> Self {
        RuleContext { path, severity, rule_name, engine }
    }

    /// Report a finding at `line:column` in the current file.
    pub fn report(&mut self, line: u32, column: u32, message: impl Into<String>) {
        let location = Location::new(self.path, line, column);
        self.engine.report(Diagnostic::new(self.severity, self.rule_name, message, location));
    }

    /// Report a finding with an attached fix hint.
    pub fn report_with_fix(
        &mut self,
        line: u32,
        column: u32,
        message: impl Into<String>,
        fix: FixItHint,
    ) {
        let location = Location::new(self.path, line, column);
        self.engine.report(
            Diagnostic::new(self.severity, self.rule_name, message, location).with_fix(fix),
        );
    }

    /// Report a fully-built diagnostic; severity and rule name are
    /// overwritten with the configured values.
    pub fn report_diagnostic(&mut self, mut diagnostic: Diagnostic) {
        diagnostic.severity = self.severity;
        diagnostic.rule_name = self.rule_name.to_string();
        self.engine.report(diagnostic);
    }
}

/// A lint rule. Implement any subset of the three channels.
pub trait Rule: Send + Sync {
    /// Stable rule identifier, e.g. `max-line-length`.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Grouping label, e.g. `style`, `naming`, `complexity`.
    fn category(&self) -> &'static str;

    /// Apply configured parameters. Called once, before analysis begins.
    fn configure(&mut self, params: &RuleParams) {
        let _ = params;
    }

    /// Raw file content channel.
    fn check_text(&self, ctx: &mut RuleContext<'_>, source: &str) {
        let _ = (ctx, source);
    }

    /// Token stream channel.
    fn check_tokens(&self, ctx: &mut RuleContext<'_>, tokens: &[Token]) {
        let _ = (ctx, tokens);
    }

    /// AST channel, handed the translation-unit root.
    fn check_ast(&self, ctx: &mut RuleContext<'_>, root: &Node) {
        let _ = (ctx, root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_coercions() {
        assert_eq!(ParamValue::Int(80).as_int(), Some(80));
        assert_eq!(ParamValue::Str("80".into()).as_int(), Some(80));
        assert_eq!(ParamValue::Bool(true).as_int(), Some(1));
        assert_eq!(ParamValue::Bool(true).as_bool(), Some(true));
        assert_eq!(ParamValue::Str("true".into()).as_bool(), Some(true));
        assert_eq!(ParamValue::Str("maybe".into()).as_bool(), None);
        assert_eq!(ParamValue::Int(2).as_bool(), Some(true));
    }

    #[test]
    fn test_params_defaults() {
        let mut params = RuleParams::new();
        params.set("max_length", ParamValue::Int(100));
        assert_eq!(params.int_or("max_length", 80), 100);
        assert_eq!(params.int_or("missing", 80), 80);
        assert!(params.bool_or("missing", true));
        assert_eq!(params.str_or("missing", "x"), "x");
    }

    #[test]
    fn test_context_stamps_rule_and_severity() {
        let mut engine = DiagnosticEngine::new();
        let mut ctx = RuleContext::new("a.cpp", "demo-rule", Severity::Info, &mut engine);
        ctx.report(3, 7, "something");
        let diag = &engine.diagnostics()[0];
        assert_eq!(diag.rule_name, "demo-rule");
        assert_eq!(diag.severity, Severity::Info);
        assert_eq!(diag.location, Location::new("a.cpp", 3, 7));
    }
}
