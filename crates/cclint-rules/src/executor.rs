//! Drives enabled rules over one file and records per-rule statistics.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use cclint_ast::Node;
use cclint_diagnostics::DiagnosticEngine;
use cclint_token::Token;
use tracing::{debug, warn};

use crate::{RuleContext, RuleRegistry};

/// Outcome of one rule's run over one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleExecutionStats {
    pub rule_name: String,
    pub duration: Duration,
    pub diagnostics_count: usize,
    /// Wall-clock budget exceeded; checked after the rule returns, so the
    /// partial diagnostics are retained
    pub timed_out: bool,
    pub failed: bool,
    pub error_message: String,
}

/// Runs enabled rules in registration order across the three channels.
#[derive(Debug, Clone)]
pub struct RuleExecutor {
    /// Per-rule wall-clock budget; zero means unlimited
    timeout: Duration,
}

impl Default for RuleExecutor {
    fn default() -> Self {
        RuleExecutor { timeout: Duration::ZERO }
    }
}

impl RuleExecutor {
    pub fn new(timeout: Duration) -> Self {
        RuleExecutor { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run every enabled rule against `(path, source, tokens, ast)`.
    ///
    /// A panic escaping a rule is caught and turned into a failure record;
    /// the remaining rules still run. Diagnostics are appended to `engine`
    /// in the order the rules produced them.
    pub fn execute(
        &self,
        registry: &RuleRegistry,
        path: &str,
        source: &str,
        tokens: &[Token],
        ast: &Node,
        engine: &mut DiagnosticEngine,
    ) -> Vec<RuleExecutionStats> {
        let mut stats = Vec::new();

        for entry in registry.enabled() {
            let rule_name = entry.rule.name();
            let before = engine.len();
            let started = Instant::now();

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                let mut ctx = RuleContext::new(path, rule_name, entry.severity, engine);
                entry.rule.check_text(&mut ctx, source);
                entry.rule.check_tokens(&mut ctx, tokens);
                entry.rule.check_ast(&mut ctx, ast);
            }));

            let duration = started.elapsed();
            let timed_out = !self.timeout.is_zero() && duration > self.timeout;
            if timed_out {
                warn!(rule = rule_name, ?duration, "rule exceeded its time budget");
            }

            let (failed, error_message) = match outcome {
                Ok(()) => (false, String::new()),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    warn!(rule = rule_name, message, "rule panicked; continuing");
                    (true, message)
                }
            };

            let diagnostics_count = engine.len() - before;
            debug!(rule = rule_name, diagnostics = diagnostics_count, ?duration, "rule finished");

            stats.push(RuleExecutionStats {
                rule_name: rule_name.to_string(),
                duration,
                diagnostics_count,
                timed_out,
                failed,
                error_message,
            });
        }

        stats
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "rule panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Rule, RuleParams};
    use cclint_diagnostics::Severity;
    use cclint_token::SourcePos;

    struct Reporter;

    impl Rule for Reporter {
        fn name(&self) -> &'static str {
            "reporter"
        }
        fn description(&self) -> &'static str {
            "reports one finding"
        }
        fn category(&self) -> &'static str {
            "test"
        }
        fn check_text(&self, ctx: &mut RuleContext<'_>, _source: &str) {
            ctx.report(1, 1, "found it");
        }
    }

    struct Panicker;

    impl Rule for Panicker {
        fn name(&self) -> &'static str {
            "panicker"
        }
        fn description(&self) -> &'static str {
            "always fails"
        }
        fn category(&self) -> &'static str {
            "test"
        }
        fn check_text(&self, ctx: &mut RuleContext<'_>, _source: &str) {
            ctx.report(1, 1, "partial finding before the failure");
            #[allow(clippy::panic)]
            {
                panic!("boom");
            }
        }
    }

    fn empty_ast() -> Node {
        Node::new(cclint_ast::NodeKind::TranslationUnit, "t.cpp", SourcePos::start("t.cpp"))
    }

    #[test]
    fn test_stats_count_diagnostics_per_rule() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Reporter));
        let mut engine = DiagnosticEngine::new();

        let stats = RuleExecutor::default()
            .execute(&registry, "t.cpp", "", &[], &empty_ast(), &mut engine);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].rule_name, "reporter");
        assert_eq!(stats[0].diagnostics_count, 1);
        assert!(!stats[0].failed);
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn test_panicking_rule_is_captured_and_others_continue() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Panicker));
        registry.register(Box::new(Reporter));
        let mut engine = DiagnosticEngine::new();

        let stats = RuleExecutor::default()
            .execute(&registry, "t.cpp", "", &[], &empty_ast(), &mut engine);

        assert!(stats[0].failed);
        assert_eq!(stats[0].error_message, "boom");
        // Partial diagnostics from the failed rule are retained
        assert_eq!(stats[0].diagnostics_count, 1);

        assert!(!stats[1].failed);
        assert_eq!(stats[1].diagnostics_count, 1);
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_disabled_rule_does_not_run() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Reporter));
        registry.configure("reporter", false, Severity::Warning, &RuleParams::new());
        let mut engine = DiagnosticEngine::new();

        let stats = RuleExecutor::default()
            .execute(&registry, "t.cpp", "", &[], &empty_ast(), &mut engine);

        assert!(stats.is_empty());
        assert!(engine.is_empty());
    }

    #[test]
    fn test_severity_from_configuration() {
        let mut registry = RuleRegistry::new();
        registry.register(Box::new(Reporter));
        registry.configure("reporter", true, Severity::Error, &RuleParams::new());
        let mut engine = DiagnosticEngine::new();

        RuleExecutor::default().execute(&registry, "t.cpp", "", &[], &empty_ast(), &mut engine);
        assert_eq!(engine.diagnostics()[0].severity, Severity::Error);
        assert!(engine.has_errors());
    }
}
