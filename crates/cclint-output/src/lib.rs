//! Diagnostic output formatters.
//!
//! Three interchangeable serializations of a diagnostic list:
//!
//! - text: `path:line:col: severity [rule]: message`, one per line, with
//!   indented `fix-it:` and `note:` children and a summary footer;
//! - JSON: `{diagnostics: [...], summary: {total, errors, warnings, info}}`;
//! - XML: `<cclint><diagnostics>...` mirroring the JSON structure.
//!
//! [`create_formatter`] picks one by [`OutputFormat`].

use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use cclint_diagnostics::{Diagnostic, Severity};

mod json;
mod text;
mod xml;

pub use json::JsonFormatter;
pub use text::TextFormatter;
pub use xml::XmlFormatter;

/// The serialization to use for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Xml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "xml" => Ok(OutputFormat::Xml),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        })
    }
}

/// Severity counts over a diagnostic list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl Summary {
    pub fn of(diagnostics: &[Diagnostic]) -> Self {
        let mut summary = Summary { total: diagnostics.len(), ..Summary::default() };
        for diag in diagnostics {
            match diag.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.info += 1,
                Severity::Note => {}
            }
        }
        summary
    }
}

/// Serializes a diagnostic list to a writer.
pub trait Formatter {
    fn format(&self, diagnostics: &[Diagnostic], out: &mut dyn Write) -> io::Result<()>;
}

/// Formatter factory keyed by output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new()),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
        OutputFormat::Xml => Box::new(XmlFormatter::new()),
    }
}

/// Render to a string; convenience for tests and the CLI.
pub fn format_to_string(format: OutputFormat, diagnostics: &[Diagnostic]) -> String {
    let mut buffer = Vec::new();
    // Writing to a Vec cannot fail
    let _ = create_formatter(format).format(diagnostics, &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}
