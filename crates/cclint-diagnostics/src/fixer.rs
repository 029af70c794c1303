//! Applies fix-it hints to file contents.
//!
//! Hints are grouped by file, mapped from line/column to byte offsets with a
//! single linear scan, sorted by begin offset in descending order, and
//! applied back to front so earlier offsets stay valid. Overlapping hints
//! are detected; the overlapped hint is skipped and reported.

use std::collections::BTreeMap;
use std::fs;
use std::io;

use thiserror::Error;

use crate::{Diagnostic, FixItHint};

/// Problems encountered while applying fixes.
#[derive(Debug, Error)]
pub enum FixerError {
    #[error("failed to read {file}: {source}")]
    Read {
        file: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {file}: {source}")]
    Write {
        file: String,
        #[source]
        source: io::Error,
    },

    #[error("{file}:{line}:{column}: overlapping fix hints; hint skipped")]
    Overlap { file: String, line: u32, column: u32 },
}

/// Result of one fixer run.
#[derive(Debug, Default)]
pub struct FixOutcome {
    /// File path → new content, for every file that had applicable hints
    pub fixed: BTreeMap<String, String>,
    /// Overlaps and I/O problems, in the order found
    pub errors: Vec<FixerError>,
}

impl FixOutcome {
    /// Number of files with rewritten content.
    pub fn fixed_file_count(&self) -> usize {
        self.fixed.len()
    }
}

/// Applies the fix hints attached to diagnostics.
///
/// In preview mode the new contents are produced in memory only and
/// [`Fixer::write`] refuses to touch the filesystem.
#[derive(Debug)]
pub struct Fixer {
    preview: bool,
}

impl Fixer {
    pub fn new(preview: bool) -> Self {
        Fixer { preview }
    }

    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// Collect hints per file, read each file once, and apply the hints.
    pub fn apply(&self, diagnostics: &[Diagnostic]) -> FixOutcome {
        let mut by_file: BTreeMap<String, Vec<FixItHint>> = BTreeMap::new();
        for diag in diagnostics {
            for hint in &diag.fix_hints {
                if hint.range.is_valid() {
                    by_file
                        .entry(hint.range.begin.file.clone())
                        .or_default()
                        .push(hint.clone());
                }
            }
        }

        let mut outcome = FixOutcome::default();
        for (file, hints) in by_file {
            let content = match fs::read_to_string(&file) {
                Ok(content) => content,
                Err(source) => {
                    outcome.errors.push(FixerError::Read { file, source });
                    continue;
                }
            };
            let fixed = apply_to_content(&content, &hints, &mut outcome.errors);
            outcome.fixed.insert(file, fixed);
        }
        outcome
    }

    /// Write the fixed contents back to disk. A no-op in preview mode.
    pub fn write(&self, outcome: &mut FixOutcome) -> usize {
        if self.preview {
            return 0;
        }
        let mut written = 0;
        let mut errors = Vec::new();
        for (file, content) in &outcome.fixed {
            match fs::write(file, content) {
                Ok(()) => written += 1,
                Err(source) => errors.push(FixerError::Write { file: file.clone(), source }),
            }
        }
        outcome.errors.extend(errors);
        written
    }
}

/// Apply `hints` to `content`, appending overlap reports to `errors`.
///
/// Ranges are half-open `[begin, end)` with 1-based columns.
pub fn apply_to_content(
    content: &str,
    hints: &[FixItHint],
    errors: &mut Vec<FixerError>,
) -> String {
    let mut resolved: Vec<(usize, usize, &FixItHint)> = hints
        .iter()
        .map(|hint| {
            let begin =
                location_to_offset(content, hint.range.begin.line, hint.range.begin.column);
            let end = location_to_offset(content, hint.range.end.line, hint.range.end.column);
            (begin, end.max(begin), hint)
        })
        .collect();

    // Descending begin offset so applying one hint leaves the offsets of the
    // remaining (earlier) hints untouched.
    resolved.sort_by(|a, b| b.0.cmp(&a.0));

    let mut result = content.to_string();
    let mut last_applied_begin = usize::MAX;
    for (begin, end, hint) in resolved {
        if end > last_applied_begin {
            errors.push(FixerError::Overlap {
                file: hint.range.begin.file.clone(),
                line: hint.range.begin.line,
                column: hint.range.begin.column,
            });
            continue;
        }
        if end <= result.len() {
            result.replace_range(begin..end, &hint.replacement_text);
            last_applied_begin = begin;
        }
    }
    result
}

/// Map a 1-based `(line, column)` to a byte offset with one scan counting
/// newlines. Columns past the end of the line clamp to the newline.
fn location_to_offset(content: &str, line: u32, column: u32) -> usize {
    if line == 0 {
        return 0;
    }

    let bytes = content.as_bytes();
    let mut offset = 0;
    let mut current_line = 1;
    while current_line < line && offset < bytes.len() {
        if bytes[offset] == b'\n' {
            current_line += 1;
        }
        offset += 1;
    }

    let mut current_column = 1;
    while current_column < column && offset < bytes.len() && bytes[offset] != b'\n' {
        offset += 1;
        current_column += 1;
    }

    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Location, Range, Severity};
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    fn hint(file: &str, line: u32, begin_col: u32, end_col: u32, replacement: &str) -> FixItHint {
        FixItHint::new(
            Range::new(Location::new(file, line, begin_col), Location::new(file, line, end_col)),
            replacement,
        )
    }

    #[test]
    fn test_descending_offset_application() {
        // Two hints on one line; the later range is applied first so the
        // earlier one's offsets stay valid.
        let hints =
            vec![hint("m.cpp", 1, 9, 12, "bar"), hint("m.cpp", 1, 1, 4, "qux")];
        let mut errors = Vec::new();
        let fixed = apply_to_content("abc def ghi", &hints, &mut errors);
        assert_eq!(fixed, "qux def bar");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_multiline_offsets() {
        let hints = vec![hint("m.cpp", 2, 1, 4, "yyy")];
        let mut errors = Vec::new();
        let fixed = apply_to_content("aaa\nbbb\nccc", &hints, &mut errors);
        assert_eq!(fixed, "aaa\nyyy\nccc");
        assert!(errors.is_empty());
    }

    #[test]
    fn test_overlap_detected_and_skipped() {
        let hints =
            vec![hint("m.cpp", 1, 1, 6, "XXXX"), hint("m.cpp", 1, 4, 9, "YYYY")];
        let mut errors = Vec::new();
        let fixed = apply_to_content("abcdefghij", &hints, &mut errors);
        // The later-offset hint is applied; the overlapping one is skipped.
        assert_eq!(fixed, "abcYYYYij");
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], FixerError::Overlap { line: 1, column: 1, .. }));
    }

    #[test]
    fn test_identity_replacement_is_idempotent() {
        // Replacing a range with the text it already holds is a no-op, so a
        // second application of the same hints changes nothing.
        let hints = vec![hint("m.cpp", 1, 5, 8, "def")];
        let mut errors = Vec::new();
        let once = apply_to_content("abc def ghi", &hints, &mut errors);
        let twice = apply_to_content(&once, &hints, &mut errors);
        assert_eq!(once, "abc def ghi");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preview_mode_never_writes() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "abc def ghi").unwrap();
        let path = tmp.path().to_string_lossy().to_string();

        let diag = Diagnostic::new(
            Severity::Warning,
            "demo",
            "msg",
            Location::new(&path, 1, 1),
        )
        .with_fix(hint(&path, 1, 1, 4, "qux"));

        let fixer = Fixer::new(true);
        let mut outcome = fixer.apply(&[diag]);
        assert_eq!(outcome.fixed.get(&path).map(String::as_str), Some("qux def ghi"));
        assert_eq!(fixer.write(&mut outcome), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "abc def ghi");
    }

    #[test]
    fn test_write_back() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "abc def ghi").unwrap();
        let path = tmp.path().to_string_lossy().to_string();

        let diag = Diagnostic::new(
            Severity::Warning,
            "demo",
            "msg",
            Location::new(&path, 1, 1),
        )
        .with_fix(hint(&path, 1, 9, 12, "bar"));

        let fixer = Fixer::new(false);
        let mut outcome = fixer.apply(&[diag]);
        assert_eq!(fixer.write(&mut outcome), 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "abc def bar");
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let diag = Diagnostic::new(
            Severity::Warning,
            "demo",
            "msg",
            Location::new("/nonexistent/cclint/x.cpp", 1, 1),
        )
        .with_fix(hint("/nonexistent/cclint/x.cpp", 1, 1, 2, "y"));

        let outcome = Fixer::new(true).apply(&[diag]);
        assert!(outcome.fixed.is_empty());
        assert!(matches!(outcome.errors[0], FixerError::Read { .. }));
    }
}
