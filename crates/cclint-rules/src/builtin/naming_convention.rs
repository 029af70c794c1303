//! `naming-convention`: identifier style checks over the AST.
//!
//! Defaults: functions and variables snake_case, classes PascalCase,
//! constants UPPER_CASE. When configured, public/protected/private method
//! patterns are validated per access specifier.

use cclint_ast::{Access, Node, NodeKind};
use regex::Regex;
use tracing::warn;

use crate::{Rule, RuleContext, RuleParams};

pub struct NamingConvention {
    function_pattern: Option<Regex>,
    class_pattern: Option<Regex>,
    variable_pattern: Option<Regex>,
    constant_pattern: Option<Regex>,
    public_method_pattern: Option<Regex>,
    protected_method_pattern: Option<Regex>,
    private_method_pattern: Option<Regex>,
    check_functions: bool,
    check_classes: bool,
    check_variables: bool,
    check_constants: bool,
}

impl NamingConvention {
    pub fn new() -> Self {
        NamingConvention {
            function_pattern: Regex::new(r"^[a-z][a-z0-9_]*$").ok(),
            class_pattern: Regex::new(r"^[A-Z][a-zA-Z0-9]*$").ok(),
            variable_pattern: Regex::new(r"^[a-z][a-z0-9_]*$").ok(),
            constant_pattern: Regex::new(r"^[A-Z][A-Z0-9_]*$").ok(),
            public_method_pattern: None,
            protected_method_pattern: None,
            private_method_pattern: None,
            check_functions: true,
            check_classes: true,
            check_variables: true,
            check_constants: true,
        }
    }

    fn compile(params: &RuleParams, key: &str) -> Option<Regex> {
        let pattern = params.get(key)?.as_str()?;
        match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(err) => {
                warn!(key, pattern, %err, "invalid naming pattern; keeping default");
                None
            }
        }
    }

    fn matches(pattern: &Option<Regex>, name: &str) -> bool {
        pattern.as_ref().is_none_or(|p| p.is_match(name))
    }

    fn check_node(&self, ctx: &mut RuleContext<'_>, node: &Node) {
        match &node.kind {
            NodeKind::Class { .. } => {
                if self.check_classes && !Self::matches(&self.class_pattern, &node.name) {
                    ctx.report(
                        node.pos.line,
                        node.pos.column,
                        format!(
                            "{} name '{}' does not follow the configured convention",
                            if matches!(node.kind, NodeKind::Class { is_struct: true, .. }) {
                                "Struct"
                            } else {
                                "Class"
                            },
                            node.name
                        ),
                    );
                }
            }
            NodeKind::Function { access, .. } => {
                if !self.check_functions || is_exempt_function(&node.name) {
                    return;
                }
                // Method patterns take precedence inside class bodies
                let method_pattern = match access {
                    Access::Public => &self.public_method_pattern,
                    Access::Protected => &self.protected_method_pattern,
                    Access::Private => &self.private_method_pattern,
                    Access::None => &None,
                };
                if let Some(pattern) = method_pattern {
                    if !pattern.is_match(&node.name) {
                        ctx.report(
                            node.pos.line,
                            node.pos.column,
                            format!(
                                "{} method name '{}' does not follow the configured convention",
                                access.as_str(),
                                node.name
                            ),
                        );
                    }
                    return;
                }
                if !Self::matches(&self.function_pattern, &node.name) {
                    ctx.report(
                        node.pos.line,
                        node.pos.column,
                        format!(
                            "Function name '{}' does not follow the configured convention",
                            node.name
                        ),
                    );
                }
            }
            NodeKind::Variable { is_const, is_constexpr, .. } => {
                self.check_value_name(ctx, node, *is_const || *is_constexpr, "Variable");
            }
            NodeKind::Field { is_const, .. } => {
                self.check_value_name(ctx, node, *is_const, "Field");
            }
            _ => {}
        }
    }

    fn check_value_name(
        &self,
        ctx: &mut RuleContext<'_>,
        node: &Node,
        is_constant: bool,
        what: &str,
    ) {
        if node.name.is_empty() {
            return;
        }
        if is_constant {
            if self.check_constants && !Self::matches(&self.constant_pattern, &node.name) {
                ctx.report(
                    node.pos.line,
                    node.pos.column,
                    format!(
                        "Constant name '{}' does not follow the configured convention",
                        node.name
                    ),
                );
            }
        } else if self.check_variables && !Self::matches(&self.variable_pattern, &node.name) {
            ctx.report(
                node.pos.line,
                node.pos.column,
                format!(
                    "{} name '{}' does not follow the configured convention",
                    what, node.name
                ),
            );
        }
    }
}

fn is_exempt_function(name: &str) -> bool {
    name.is_empty() || name == "main" || name.starts_with('~') || name.starts_with("operator")
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for NamingConvention {
    fn name(&self) -> &'static str {
        "naming-convention"
    }

    fn description(&self) -> &'static str {
        "Check naming conventions for functions, variables, and classes"
    }

    fn category(&self) -> &'static str {
        "naming"
    }

    fn configure(&mut self, params: &RuleParams) {
        self.check_functions = params.bool_or("check_functions", true);
        self.check_classes = params.bool_or("check_classes", true);
        self.check_variables = params.bool_or("check_variables", true);
        self.check_constants = params.bool_or("check_constants", true);

        if let Some(regex) = Self::compile(params, "function_pattern") {
            self.function_pattern = Some(regex);
        }
        if let Some(regex) = Self::compile(params, "class_pattern") {
            self.class_pattern = Some(regex);
        }
        if let Some(regex) = Self::compile(params, "variable_pattern") {
            self.variable_pattern = Some(regex);
        }
        if let Some(regex) = Self::compile(params, "constant_pattern") {
            self.constant_pattern = Some(regex);
        }
        self.public_method_pattern = Self::compile(params, "public_method_pattern");
        self.protected_method_pattern = Self::compile(params, "protected_method_pattern");
        self.private_method_pattern = Self::compile(params, "private_method_pattern");
    }

    fn check_ast(&self, ctx: &mut RuleContext<'_>, root: &Node) {
        let mut nodes = Vec::new();
        root.walk(&mut |node| nodes.push(node));
        for node in nodes {
            self.check_node(ctx, node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParamValue, RuleContext};
    use cclint_diagnostics::{Diagnostic, DiagnosticEngine, Severity};
    use cclint_parser::Parser;

    fn run(rule: &NamingConvention, source: &str) -> Vec<Diagnostic> {
        let root = Parser::new(source, "t.cpp").parse().root;
        let mut engine = DiagnosticEngine::new();
        let mut ctx = RuleContext::new("t.cpp", rule.name(), Severity::Warning, &mut engine);
        rule.check_ast(&mut ctx, &root);
        engine.into_diagnostics()
    }

    #[test]
    fn test_default_conventions() {
        let source = "class widget {};\nclass Widget {};\nvoid GoodNot();\nvoid good_name();\nint BadVar = 1;\nint good_var = 2;\n";
        let diags = run(&NamingConvention::new(), source);
        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages.len(), 3, "{messages:?}");
        assert!(messages[0].contains("'widget'"));
        assert!(messages[1].contains("'GoodNot'"));
        assert!(messages[2].contains("'BadVar'"));
    }

    #[test]
    fn test_constants_use_upper_case() {
        let source = "const int MAX_SIZE = 10;\nconst int lower_const = 2;\nconstexpr int KLIMIT = 3;\n";
        let diags = run(&NamingConvention::new(), source);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'lower_const'"));
    }

    #[test]
    fn test_special_functions_exempt() {
        let source = "class C { public: C(); ~C(); C& operator=(const C&); };\nint main() { return 0; }\n";
        let diags = run(&NamingConvention::new(), source);
        assert!(diags.is_empty(), "{diags:?}");
    }

    #[test]
    fn test_access_specific_method_patterns() {
        let mut rule = NamingConvention::new();
        let mut params = RuleParams::new();
        params.set("public_method_pattern", ParamValue::Str("^[a-z][a-zA-Z0-9]*$".into()));
        params.set("private_method_pattern", ParamValue::Str("^[a-z][a-z0-9_]*_$".into()));
        rule.configure(&params);

        let source =
            "class C { public: void goodCamel(); void bad_snake(); private: void helper_(); void wrong(); };";
        let diags = run(&rule, source);
        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages.len(), 2, "{messages:?}");
        assert!(messages[0].contains("'bad_snake'"));
        assert!(messages[1].contains("'wrong'"));
    }

    #[test]
    fn test_custom_class_pattern() {
        let mut rule = NamingConvention::new();
        let mut params = RuleParams::new();
        params.set("class_pattern", ParamValue::Str("^C[A-Z][a-zA-Z0-9]*$".into()));
        rule.configure(&params);

        let diags = run(&rule, "class CWidget {};\nclass Widget {};\n");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'Widget'"));
    }

    #[test]
    fn test_toggles_disable_checks() {
        let mut rule = NamingConvention::new();
        let mut params = RuleParams::new();
        params.set("check_classes", ParamValue::Bool(false));
        params.set("check_variables", ParamValue::Bool(false));
        rule.configure(&params);

        let diags = run(&rule, "class widget {};\nint BadVar = 1;\n");
        assert!(diags.is_empty());
    }
}
