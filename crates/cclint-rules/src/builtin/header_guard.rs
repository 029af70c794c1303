//! `header-guard`: header files must carry `#pragma once` or a classic
//! `#ifndef` / `#define` / `#endif` guard.

use cclint_diagnostics::{FixItHint, Location, Range};
use regex::Regex;

use crate::{Rule, RuleContext, RuleParams};

const HEADER_EXTENSIONS: [&str; 4] = [".h", ".hpp", ".hh", ".hxx"];

pub struct HeaderGuard {
    require_pragma_once: bool,
    ifndef_pattern: Option<Regex>,
    define_pattern: Option<Regex>,
    endif_pattern: Option<Regex>,
}

impl HeaderGuard {
    pub fn new() -> Self {
        HeaderGuard {
            require_pragma_once: false,
            ifndef_pattern: Regex::new(r"#\s*ifndef\s+[A-Za-z_][A-Za-z0-9_]*").ok(),
            define_pattern: Regex::new(r"#\s*define\s+[A-Za-z_][A-Za-z0-9_]*").ok(),
            endif_pattern: Regex::new(r"#\s*endif").ok(),
        }
    }

    fn is_header(path: &str) -> bool {
        HEADER_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }

    fn has_pragma_once(content: &str) -> bool {
        content.contains("#pragma once")
    }

    fn has_guard(&self, content: &str) -> bool {
        let matches = |pattern: &Option<Regex>| {
            pattern.as_ref().is_some_and(|p| p.is_match(content))
        };
        matches(&self.ifndef_pattern)
            && matches(&self.define_pattern)
            && matches(&self.endif_pattern)
    }
}

impl Default for HeaderGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for HeaderGuard {
    fn name(&self) -> &'static str {
        "header-guard"
    }

    fn description(&self) -> &'static str {
        "Check that header files have an include guard or #pragma once"
    }

    fn category(&self) -> &'static str {
        "style"
    }

    fn configure(&mut self, params: &RuleParams) {
        self.require_pragma_once = params.bool_or("require_pragma_once", false);
    }

    fn check_text(&self, ctx: &mut RuleContext<'_>, source: &str) {
        if !Self::is_header(ctx.path) {
            return;
        }

        let pragma = Self::has_pragma_once(source);
        let (missing, message) = if self.require_pragma_once {
            (!pragma, "Header file should use #pragma once")
        } else {
            (
                !pragma && !self.has_guard(source),
                "Header file missing header guard or #pragma once",
            )
        };

        if missing {
            let insert_at = Range::new(Location::new(ctx.path, 1, 1), Location::new(ctx.path, 1, 1));
            ctx.report_with_fix(1, 1, message, FixItHint::new(insert_at, "#pragma once\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParamValue, RuleContext};
    use cclint_diagnostics::{DiagnosticEngine, Severity};

    fn run(rule: &HeaderGuard, path: &str, source: &str) -> Vec<cclint_diagnostics::Diagnostic> {
        let mut engine = DiagnosticEngine::new();
        let mut ctx = RuleContext::new(path, rule.name(), Severity::Warning, &mut engine);
        rule.check_text(&mut ctx, source);
        engine.into_diagnostics()
    }

    #[test]
    fn test_unguarded_header_flagged_at_line_one() {
        let diags = run(&HeaderGuard::new(), "foo.hpp", "int x;\n");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].location.line, 1);
        assert_eq!(diags[0].location.column, 1);
        assert!(!diags[0].fix_hints.is_empty());
        assert_eq!(diags[0].fix_hints[0].replacement_text, "#pragma once\n");
    }

    #[test]
    fn test_pragma_once_accepted() {
        let diags = run(&HeaderGuard::new(), "foo.hpp", "#pragma once\nint x;\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_classic_guard_accepted() {
        let source = "#ifndef FOO_HPP\n#define FOO_HPP\nint x;\n#endif\n";
        let diags = run(&HeaderGuard::new(), "foo.hpp", source);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_source_files_ignored() {
        let diags = run(&HeaderGuard::new(), "foo.cpp", "int x;\n");
        assert!(diags.is_empty());
    }

    #[test]
    fn test_require_pragma_once_rejects_classic_guard() {
        let mut rule = HeaderGuard::new();
        let mut params = RuleParams::new();
        params.set("require_pragma_once", ParamValue::Bool(true));
        rule.configure(&params);

        let source = "#ifndef FOO_HPP\n#define FOO_HPP\nint x;\n#endif\n";
        let diags = run(&rule, "foo.hpp", source);
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_all_header_extensions() {
        for path in ["a.h", "a.hpp", "a.hh", "a.hxx"] {
            let diags = run(&HeaderGuard::new(), path, "int x;\n");
            assert_eq!(diags.len(), 1, "{path} should be treated as a header");
        }
    }
}
