//! XML diagnostic output, mirroring the JSON structure.

use std::io::{self, Write};

use cclint_diagnostics::Diagnostic;

use crate::{Formatter, Summary};

pub struct XmlFormatter;

impl XmlFormatter {
    pub fn new() -> Self {
        XmlFormatter
    }

    fn write_diagnostic(
        &self,
        diag: &Diagnostic,
        indent: usize,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        let pad = "  ".repeat(indent);
        writeln!(
            out,
            "{pad}<diagnostic severity=\"{}\" rule=\"{}\">",
            diag.severity,
            escape(&diag.rule_name)
        )?;
        writeln!(out, "{pad}  <message>{}</message>", escape(&diag.message))?;
        if diag.location.is_valid() {
            writeln!(
                out,
                "{pad}  <location file=\"{}\" line=\"{}\" column=\"{}\"/>",
                escape(&diag.location.file),
                diag.location.line,
                diag.location.column
            )?;
        }
        for range in &diag.ranges {
            writeln!(
                out,
                "{pad}  <range begin-line=\"{}\" begin-column=\"{}\" end-line=\"{}\" end-column=\"{}\"/>",
                range.begin.line, range.begin.column, range.end.line, range.end.column
            )?;
        }
        for hint in &diag.fix_hints {
            writeln!(
                out,
                "{pad}  <fixit begin-line=\"{}\" begin-column=\"{}\" end-line=\"{}\" end-column=\"{}\">{}</fixit>",
                hint.range.begin.line,
                hint.range.begin.column,
                hint.range.end.line,
                hint.range.end.column,
                escape(&hint.replacement_text)
            )?;
        }
        for note in &diag.notes {
            self.write_diagnostic(note, indent + 1, out)?;
        }
        writeln!(out, "{pad}</diagnostic>")
    }
}

impl Default for XmlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for XmlFormatter {
    fn format(&self, diagnostics: &[Diagnostic], out: &mut dyn Write) -> io::Result<()> {
        let summary = Summary::of(diagnostics);

        writeln!(out, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
        writeln!(out, "<cclint>")?;
        writeln!(out, "  <diagnostics>")?;
        for diag in diagnostics {
            self.write_diagnostic(diag, 2, out)?;
        }
        writeln!(out, "  </diagnostics>")?;
        writeln!(
            out,
            "  <summary total=\"{}\" errors=\"{}\" warnings=\"{}\" info=\"{}\"/>",
            summary.total, summary.errors, summary.warnings, summary.info
        )?;
        writeln!(out, "</cclint>")
    }
}

/// Minimal XML escaping for text content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
