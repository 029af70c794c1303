//! Diagnostic model and collection engine for cclint.
//!
//! A [`Diagnostic`] carries a severity, the reporting rule, a message, a
//! primary location, optional highlighted ranges, machine-applicable
//! [`FixItHint`]s, and attached notes. The [`DiagnosticEngine`] is the
//! append-only per-file collector rules report into; the [`Fixer`] turns
//! collected fix hints into new file contents.

use std::fmt;
use std::str::FromStr;

use cclint_token::{SourcePos, SourceSpan};
use serde::{Deserialize, Serialize};

mod fixer;

pub use fixer::{FixOutcome, Fixer, FixerError};

/// Diagnostic severity, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Note,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Note => "note",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            "note" => Ok(Severity::Note),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

/// A point in a file as reported to users: filename plus 1-based line and
/// column. `line == 0` marks the invalid sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        Location { file: file.into(), line, column }
    }

    pub fn invalid() -> Self {
        Location { file: String::new(), line: 0, column: 0 }
    }

    pub fn is_valid(&self) -> bool {
        !self.file.is_empty() && self.line >= 1 && self.column >= 1
    }
}

impl From<&SourcePos> for Location {
    fn from(pos: &SourcePos) -> Self {
        Location { file: pos.file.to_string(), line: pos.line, column: pos.column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A half-open range `[begin, end)` within one file, ordered by
/// `(line, column)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub begin: Location,
    pub end: Location,
}

impl Range {
    pub fn new(begin: Location, end: Location) -> Self {
        Range { begin, end }
    }

    /// Both endpoints valid, same file, and `begin <= end`.
    pub fn is_valid(&self) -> bool {
        self.begin.is_valid()
            && self.end.is_valid()
            && self.begin.file == self.end.file
            && (self.begin.line, self.begin.column) <= (self.end.line, self.end.column)
    }
}

impl From<&SourceSpan> for Range {
    fn from(span: &SourceSpan) -> Self {
        Range { begin: (&span.begin).into(), end: (&span.end).into() }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.begin.file, self.begin.line, self.begin.column, self.end.line, self.end.column
        )
    }
}

/// A machine-applicable edit: replace `range` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixItHint {
    pub range: Range,
    #[serde(rename = "replacement")]
    pub replacement_text: String,
}

impl FixItHint {
    pub fn new(range: Range, replacement: impl Into<String>) -> Self {
        FixItHint { range, replacement_text: replacement.into() }
    }
}

/// One reported finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(rename = "rule")]
    pub rule_name: String,
    pub message: String,
    pub location: Location,
    pub ranges: Vec<Range>,
    #[serde(rename = "fixits")]
    pub fix_hints: Vec<FixItHint>,
    pub notes: Vec<Diagnostic>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        rule_name: impl Into<String>,
        message: impl Into<String>,
        location: Location,
    ) -> Self {
        Diagnostic {
            severity,
            rule_name: rule_name.into(),
            message: message.into(),
            location,
            ranges: Vec::new(),
            fix_hints: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Attach a fix hint, builder-style.
    pub fn with_fix(mut self, hint: FixItHint) -> Self {
        self.fix_hints.push(hint);
        self
    }

    /// Attach a note, builder-style.
    pub fn with_note(mut self, note: Diagnostic) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_valid() {
            write!(f, "{}: ", self.location)?;
        }
        write!(f, "{}", self.severity)?;
        if !self.rule_name.is_empty() {
            write!(f, " [{}]", self.rule_name)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Append-only diagnostic collector for one file's analysis.
///
/// Diagnostics keep the order rules produced them in; counts by severity are
/// derived on demand.
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a diagnostic.
    pub fn report(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    /// Append an error at `location`.
    pub fn error(&mut self, rule: &str, message: impl Into<String>, location: Location) {
        self.report(Diagnostic::new(Severity::Error, rule, message, location));
    }

    /// Append a warning at `location`.
    pub fn warning(&mut self, rule: &str, message: impl Into<String>, location: Location) {
        self.report(Diagnostic::new(Severity::Warning, rule, message, location));
    }

    /// Append an informational diagnostic at `location`.
    pub fn info(&mut self, rule: &str, message: impl Into<String>, location: Location) {
        self.report(Diagnostic::new(Severity::Info, rule, message, location));
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the engine, yielding the collected diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn count_of(&self, severity: Severity) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == severity).count()
    }

    pub fn error_count(&self) -> usize {
        self.count_of(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count_of(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_severity_round_trip() {
        for s in [Severity::Error, Severity::Warning, Severity::Info, Severity::Note] {
            assert_eq!(s.as_str().parse::<Severity>(), Ok(s));
        }
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_engine_counts_and_order() {
        let mut engine = DiagnosticEngine::new();
        engine.warning("r1", "first", Location::new("a.cpp", 1, 1));
        engine.error("r2", "second", Location::new("a.cpp", 2, 1));
        engine.info("r1", "third", Location::new("a.cpp", 3, 1));

        assert_eq!(engine.len(), 3);
        assert_eq!(engine.error_count(), 1);
        assert_eq!(engine.warning_count(), 1);
        assert!(engine.has_errors());

        let messages: Vec<_> =
            engine.diagnostics().iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, ["first", "second", "third"]);
    }

    #[test]
    fn test_display_format() {
        let diag = Diagnostic::new(
            Severity::Warning,
            "max-line-length",
            "line too long",
            Location::new("a.cpp", 10, 81),
        );
        assert_eq!(diag.to_string(), "a.cpp:10:81: warning [max-line-length]: line too long");
    }

    #[test]
    fn test_range_validity() {
        let ok = Range::new(Location::new("a.cpp", 1, 1), Location::new("a.cpp", 1, 4));
        assert!(ok.is_valid());
        let backwards = Range::new(Location::new("a.cpp", 2, 1), Location::new("a.cpp", 1, 4));
        assert!(!backwards.is_valid());
        let sentinel = Range::new(Location::invalid(), Location::new("a.cpp", 1, 4));
        assert!(!sentinel.is_valid());
    }
}
