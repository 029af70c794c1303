//! Plain-text diagnostic output.

use std::io::{self, Write};

use cclint_diagnostics::{Diagnostic, Severity};

use crate::{Formatter, Summary};

/// `path:line:col: severity [rule]: message` lines with indented `fix-it:`
/// and `note:` children, then a summary footer. Colors are ANSI and off by
/// default so piped output stays clean.
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        TextFormatter { use_color: false }
    }

    pub fn with_color(use_color: bool) -> Self {
        TextFormatter { use_color }
    }

    fn severity_text(&self, severity: Severity) -> String {
        if !self.use_color {
            return severity.to_string();
        }
        let color = match severity {
            Severity::Error => "\x1b[1;31m",
            Severity::Warning => "\x1b[1;33m",
            Severity::Info => "\x1b[1;36m",
            Severity::Note => "\x1b[1;37m",
        };
        format!("{color}{severity}\x1b[0m")
    }

    fn write_diagnostic(
        &self,
        diag: &Diagnostic,
        indent: usize,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let pad = "  ".repeat(indent);
        write!(out, "{pad}")?;
        if diag.location.is_valid() {
            write!(out, "{}: ", diag.location)?;
        }
        write!(out, "{}", self.severity_text(diag.severity))?;
        if !diag.rule_name.is_empty() {
            write!(out, " [{}]", diag.rule_name)?;
        }
        writeln!(out, ": {}", diag.message)?;

        for hint in &diag.fix_hints {
            writeln!(
                out,
                "{pad}  fix-it: {} -> '{}'",
                hint.range, hint.replacement_text
            )?;
        }
        for note in &diag.notes {
            write!(out, "{pad}  note: ")?;
            self.write_diagnostic(note, 0, out)?;
        }
        Ok(())
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for TextFormatter {
    fn format(&self, diagnostics: &[Diagnostic], out: &mut dyn Write) -> io::Result<()> {
        for diag in diagnostics {
            self.write_diagnostic(diag, 0, out)?;
        }

        let summary = Summary::of(diagnostics);
        if summary.total == 0 {
            writeln!(out, "No issues found.")?;
        } else {
            writeln!(
                out,
                "\n{} error(s), {} warning(s), {} info message(s) generated.",
                summary.errors, summary.warnings, summary.info
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cclint_diagnostics::{FixItHint, Location, Range};
    use pretty_assertions::assert_eq;

    fn render(diags: &[Diagnostic]) -> String {
        let mut buffer = Vec::new();
        TextFormatter::new().format(diags, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_single_line_shape() {
        let diags = vec![Diagnostic::new(
            Severity::Warning,
            "max-line-length",
            "line too long",
            Location::new("src/a.cpp", 12, 81),
        )];
        let text = render(&diags);
        assert!(text.starts_with("src/a.cpp:12:81: warning [max-line-length]: line too long\n"));
        assert!(text.contains("0 error(s), 1 warning(s), 0 info message(s) generated."));
    }

    #[test]
    fn test_fixit_and_note_children_are_indented() {
        let fix = FixItHint::new(
            Range::new(Location::new("a.hpp", 1, 1), Location::new("a.hpp", 1, 1)),
            "#pragma once\n",
        );
        let note = Diagnostic::new(
            Severity::Note,
            "",
            "guards prevent double inclusion",
            Location::invalid(),
        );
        let diags = vec![
            Diagnostic::new(
                Severity::Warning,
                "header-guard",
                "missing guard",
                Location::new("a.hpp", 1, 1),
            )
            .with_fix(fix)
            .with_note(note),
        ];
        let text = render(&diags);
        assert!(text.contains("\n  fix-it: a.hpp:1:1-1:1 -> '#pragma once\n'"));
        assert!(text.contains("  note: note: guards prevent double inclusion"));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(render(&[]), "No issues found.\n");
    }
}
