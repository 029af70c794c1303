//! `max-line-length`: flags lines wider than the configured limit.

use regex::Regex;

use crate::{Rule, RuleContext, RuleParams};

const DEFAULT_MAX_LENGTH: i64 = 80;

pub struct MaxLineLength {
    max_length: usize,
    ignore_comments: bool,
    ignore_urls: bool,
    url_pattern: Option<Regex>,
}

impl MaxLineLength {
    pub fn new() -> Self {
        MaxLineLength {
            max_length: DEFAULT_MAX_LENGTH as usize,
            ignore_comments: false,
            ignore_urls: false,
            url_pattern: Regex::new(r"https?://\S+").ok(),
        }
    }
}

impl Default for MaxLineLength {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for MaxLineLength {
    fn name(&self) -> &'static str {
        "max-line-length"
    }

    fn description(&self) -> &'static str {
        "Check that lines do not exceed the maximum length"
    }

    fn category(&self) -> &'static str {
        "style"
    }

    fn configure(&mut self, params: &RuleParams) {
        self.max_length = params.int_or("max_length", DEFAULT_MAX_LENGTH).max(0) as usize;
        self.ignore_comments = params.bool_or("ignore_comments", false);
        self.ignore_urls = params.bool_or("ignore_urls", false);
    }

    fn check_text(&self, ctx: &mut RuleContext<'_>, source: &str) {
        for (index, line) in source.lines().enumerate() {
            let line_number = index as u32 + 1;

            if self.ignore_urls {
                if let Some(pattern) = &self.url_pattern {
                    if pattern.is_match(line) {
                        continue;
                    }
                }
            }

            if self.ignore_comments {
                let trimmed = line.trim_start();
                if trimmed.starts_with("//")
                    || trimmed.starts_with("/*")
                    || trimmed.starts_with('*')
                {
                    continue;
                }
            }

            let width = line.chars().count();
            if width > self.max_length {
                ctx.report(
                    line_number,
                    1,
                    format!(
                        "Line exceeds maximum length of {} characters (current: {})",
                        self.max_length, width
                    ),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParamValue, RuleContext};
    use cclint_diagnostics::{DiagnosticEngine, Severity};

    fn run(rule: &MaxLineLength, source: &str) -> usize {
        let mut engine = DiagnosticEngine::new();
        let mut ctx = RuleContext::new("t.cpp", rule.name(), Severity::Warning, &mut engine);
        rule.check_text(&mut ctx, source);
        engine.len()
    }

    #[test]
    fn test_default_threshold_is_80() {
        let rule = MaxLineLength::new();
        let exactly_80 = "x".repeat(80);
        let over = "x".repeat(81);
        assert_eq!(run(&rule, &exactly_80), 0);
        assert_eq!(run(&rule, &over), 1);
    }

    #[test]
    fn test_wide_file_boundary() {
        // 1000 lines of exactly 80 characters: clean at the default
        // threshold, all flagged at 79.
        let source: String =
            std::iter::repeat_n(format!("{}\n", "y".repeat(80)), 1000).collect();

        let rule = MaxLineLength::new();
        assert_eq!(run(&rule, &source), 0);

        let mut strict = MaxLineLength::new();
        let mut params = RuleParams::new();
        params.set("max_length", ParamValue::Int(79));
        strict.configure(&params);
        assert_eq!(run(&strict, &source), 1000);
    }

    #[test]
    fn test_ignore_comments() {
        let mut rule = MaxLineLength::new();
        let mut params = RuleParams::new();
        params.set("max_length", ParamValue::Int(10));
        params.set("ignore_comments", ParamValue::Bool(true));
        rule.configure(&params);

        let source = "// a very long comment line that would otherwise trip\nint a_long_name_x;\n";
        assert_eq!(run(&rule, source), 1);
    }

    #[test]
    fn test_ignore_urls() {
        let mut rule = MaxLineLength::new();
        let mut params = RuleParams::new();
        params.set("max_length", ParamValue::Int(20));
        params.set("ignore_urls", ParamValue::Bool(true));
        rule.configure(&params);

        let source = "// see https://example.com/very/long/path/to/docs\n";
        assert_eq!(run(&rule, source), 0);
    }

    #[test]
    fn test_report_location() {
        let rule = MaxLineLength::new();
        let mut engine = DiagnosticEngine::new();
        let mut ctx = RuleContext::new("t.cpp", rule.name(), Severity::Warning, &mut engine);
        let source = format!("short\n{}\n", "z".repeat(100));
        rule.check_text(&mut ctx, &source);
        assert_eq!(engine.diagnostics()[0].location.line, 2);
        assert_eq!(engine.diagnostics()[0].location.column, 1);
    }
}
