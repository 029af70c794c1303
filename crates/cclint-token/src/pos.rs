//! Source positions and spans.
//!
//! Lines and columns are 1-based; byte offsets are 0-based. The invalid
//! sentinel uses `line == 0` so it can never collide with a real position.

use std::fmt;
use std::sync::Arc;

/// A position in a source file: filename, 1-based line and column, and the
/// 0-based byte offset from the start of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePos {
    /// File the position refers to (shared, cheap to clone)
    pub file: Arc<str>,
    /// 1-based line number; 0 marks the invalid sentinel
    pub line: u32,
    /// 1-based column number
    pub column: u32,
    /// Byte offset from the start of the file
    pub offset: u32,
}

impl SourcePos {
    /// Position of the first byte of a file.
    pub fn start(file: impl Into<Arc<str>>) -> Self {
        SourcePos { file: file.into(), line: 1, column: 1, offset: 0 }
    }

    /// Create a position at an explicit line/column/offset.
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32, offset: u32) -> Self {
        SourcePos { file: file.into(), line, column, offset }
    }

    /// The invalid sentinel (`line == 0`).
    pub fn invalid() -> Self {
        SourcePos { file: Arc::from(""), line: 0, column: 0, offset: 0 }
    }

    /// True unless this is the invalid sentinel.
    pub fn is_valid(&self) -> bool {
        self.line >= 1 && self.column >= 1
    }
}

impl fmt::Display for SourcePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// An ordered pair of positions with `begin <= end` in `(line, column)`
/// order. Construction does not enforce the ordering; `is_valid` checks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub begin: SourcePos,
    pub end: SourcePos,
}

impl SourceSpan {
    pub fn new(begin: SourcePos, end: SourcePos) -> Self {
        SourceSpan { begin, end }
    }

    /// Both endpoints valid and `begin <= end` lexicographically.
    pub fn is_valid(&self) -> bool {
        self.begin.is_valid()
            && self.end.is_valid()
            && (self.begin.line, self.begin.column) <= (self.end.line, self.end.column)
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.begin.file, self.begin.line, self.begin.column, self.end.line, self.end.column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sentinel() {
        assert!(!SourcePos::invalid().is_valid());
        assert!(SourcePos::start("a.cpp").is_valid());
    }

    #[test]
    fn test_span_ordering() {
        let file: Arc<str> = Arc::from("a.cpp");
        let begin = SourcePos::new(Arc::clone(&file), 2, 5, 20);
        let end = SourcePos::new(Arc::clone(&file), 2, 9, 24);
        assert!(SourceSpan::new(begin.clone(), end.clone()).is_valid());
        assert!(!SourceSpan::new(end, begin).is_valid());
    }

    #[test]
    fn test_display() {
        let pos = SourcePos::new("x.hpp", 3, 7, 0);
        assert_eq!(pos.to_string(), "x.hpp:3:7");
    }
}
