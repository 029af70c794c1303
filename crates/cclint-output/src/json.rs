//! JSON diagnostic output.

use std::io::{self, Write};

use cclint_diagnostics::Diagnostic;
use serde_json::json;

use crate::{Formatter, Summary};

/// `{"diagnostics": [...], "summary": {...}}`; each diagnostic serializes
/// with its schema field names (`rule`, `fixits`, ...).
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        JsonFormatter { pretty: true }
    }

    pub fn compact() -> Self {
        JsonFormatter { pretty: false }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, diagnostics: &[Diagnostic], out: &mut dyn Write) -> io::Result<()> {
        let summary = Summary::of(diagnostics);
        let document = json!({
            "diagnostics": diagnostics,
            "summary": {
                "total": summary.total,
                "errors": summary.errors,
                "warnings": summary.warnings,
                "info": summary.info,
            },
        });

        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &document)?;
        } else {
            serde_json::to_writer(&mut *out, &document)?;
        }
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cclint_diagnostics::{FixItHint, Location, Range, Severity};

    fn render(diags: &[Diagnostic]) -> serde_json::Value {
        let mut buffer = Vec::new();
        JsonFormatter::new().format(diags, &mut buffer).unwrap();
        serde_json::from_slice(&buffer).unwrap()
    }

    #[test]
    fn test_schema_shape() {
        let fix = FixItHint::new(
            Range::new(Location::new("a.cpp", 2, 1), Location::new("a.cpp", 2, 4)),
            "fixed",
        );
        let diags = vec![
            Diagnostic::new(
                Severity::Error,
                "naming-convention",
                "bad name",
                Location::new("a.cpp", 2, 1),
            )
            .with_fix(fix),
        ];

        let value = render(&diags);
        let diag = &value["diagnostics"][0];
        assert_eq!(diag["severity"], "error");
        assert_eq!(diag["rule"], "naming-convention");
        assert_eq!(diag["message"], "bad name");
        assert_eq!(diag["location"]["file"], "a.cpp");
        assert_eq!(diag["location"]["line"], 2);
        assert_eq!(diag["location"]["column"], 1);
        assert_eq!(diag["fixits"][0]["replacement"], "fixed");
        assert_eq!(diag["fixits"][0]["range"]["begin"]["column"], 1);
        assert!(diag["notes"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_summary_block() {
        let diags = vec![
            Diagnostic::new(Severity::Error, "r", "e", Location::new("a", 1, 1)),
            Diagnostic::new(Severity::Warning, "r", "w", Location::new("a", 2, 1)),
        ];
        let value = render(&diags);
        assert_eq!(value["summary"]["total"], 2);
        assert_eq!(value["summary"]["errors"], 1);
        assert_eq!(value["summary"]["warnings"], 1);
        assert_eq!(value["summary"]["info"], 0);
    }

    #[test]
    fn test_empty_list_is_valid_json() {
        let value = render(&[]);
        assert!(value["diagnostics"].as_array().unwrap().is_empty());
        assert_eq!(value["summary"]["total"], 0);
    }
}
