//! `function-complexity`: flags functions whose cyclomatic complexity
//! (computed by the parser: 1 + branch constructs) exceeds the limit.

use cclint_ast::{Node, NodeKind};

use crate::{Rule, RuleContext, RuleParams};

const DEFAULT_MAX_COMPLEXITY: i64 = 10;

pub struct FunctionComplexity {
    max_complexity: u32,
}

impl FunctionComplexity {
    pub fn new() -> Self {
        FunctionComplexity { max_complexity: DEFAULT_MAX_COMPLEXITY as u32 }
    }
}

impl Default for FunctionComplexity {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for FunctionComplexity {
    fn name(&self) -> &'static str {
        "function-complexity"
    }

    fn description(&self) -> &'static str {
        "Check that functions stay below the cyclomatic complexity limit"
    }

    fn category(&self) -> &'static str {
        "complexity"
    }

    fn configure(&mut self, params: &RuleParams) {
        self.max_complexity =
            params.int_or("max_complexity", DEFAULT_MAX_COMPLEXITY).max(1) as u32;
    }

    fn check_ast(&self, ctx: &mut RuleContext<'_>, root: &Node) {
        let mut findings = Vec::new();
        root.walk(&mut |node| {
            if let NodeKind::Function { complexity, .. } = node.kind {
                if complexity > self.max_complexity {
                    findings.push((node.pos.clone(), node.name.clone(), complexity));
                }
            }
        });
        for (pos, name, complexity) in findings {
            ctx.report(
                pos.line,
                pos.column,
                format!(
                    "Function '{}' has cyclomatic complexity of {} (max allowed is {})",
                    name, complexity, self.max_complexity
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParamValue, RuleContext};
    use cclint_diagnostics::{Diagnostic, DiagnosticEngine, Severity};
    use cclint_parser::Parser;

    fn run(rule: &FunctionComplexity, source: &str) -> Vec<Diagnostic> {
        let root = Parser::new(source, "t.cpp").parse().root;
        let mut engine = DiagnosticEngine::new();
        let mut ctx = RuleContext::new("t.cpp", rule.name(), Severity::Warning, &mut engine);
        rule.check_ast(&mut ctx, &root);
        engine.into_diagnostics()
    }

    #[test]
    fn test_simple_function_passes() {
        let diags = run(&FunctionComplexity::new(), "void f() { g(); return; }");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_branchy_function_flagged_at_low_limit() {
        let mut rule = FunctionComplexity::new();
        let mut params = RuleParams::new();
        params.set("max_complexity", ParamValue::Int(3));
        rule.configure(&params);

        // 1 + if + && + || = 4
        let diags = run(&rule, "void f() { if (a && b || c) { return; } }");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("complexity of 4"));
        assert!(diags[0].message.contains("'f'"));
    }

    #[test]
    fn test_loops_and_cases_add_up() {
        let mut rule = FunctionComplexity::new();
        let mut params = RuleParams::new();
        params.set("max_complexity", ParamValue::Int(4));
        rule.configure(&params);

        // 1 + for + while + 2 cases = 5
        let source = "void f() { for (int i = 0; i < n; ++i) {} while (x) {} switch (y) { case 1: break; case 2: break; } }";
        let diags = run(&rule, source);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("complexity of 5"));
    }

    #[test]
    fn test_methods_are_checked_too() {
        let mut rule = FunctionComplexity::new();
        let mut params = RuleParams::new();
        params.set("max_complexity", ParamValue::Int(1));
        rule.configure(&params);

        let diags = run(&rule, "class C { public: void busy() { if (x) { y(); } } };");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'busy'"));
    }
}
