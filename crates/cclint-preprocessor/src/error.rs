//! Preprocessor error types.
//!
//! Nothing here aborts preprocessing; every error is recorded on the
//! preprocessor's list and processing continues to EOF.

use cclint_token::SourcePos;
use thiserror::Error;

/// Problems recorded while preprocessing.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PreprocessError {
    /// Directive line that could not be parsed
    #[error("{pos}: {message}")]
    MalformedDirective { pos: SourcePos, message: String },

    /// `#elif` with no open `#if`
    #[error("{pos}: #elif without #if")]
    ElifWithoutIf { pos: SourcePos },

    /// `#elif` after the conditional's `#else`
    #[error("{pos}: #elif after #else")]
    ElifAfterElse { pos: SourcePos },

    /// `#else` with no open `#if`
    #[error("{pos}: #else without #if")]
    ElseWithoutIf { pos: SourcePos },

    /// Second `#else` for the same conditional
    #[error("{pos}: multiple #else directives")]
    MultipleElse { pos: SourcePos },

    /// `#endif` with no open `#if`
    #[error("{pos}: #endif without #if")]
    EndifWithoutIf { pos: SourcePos },

    /// Conditional still open at end of file; `line` is where it started
    #[error("{file}:{line}: unterminated conditional directive")]
    UnterminatedConditional { file: String, line: u32 },

    /// Constant expression after `#if`/`#elif` could not be evaluated
    #[error("{pos}: cannot evaluate conditional expression: {message}")]
    BadConditionalExpression { pos: SourcePos, message: String },

    /// `#error` directive in an active branch
    #[error("{pos}: #error: {message}")]
    UserError { pos: SourcePos, message: String },

    /// `#warning` directive in an active branch
    #[error("{pos}: #warning: {message}")]
    UserWarning { pos: SourcePos, message: String },

    /// `#include` target not found on any search path
    #[error("{pos}: cannot find include file: {name}")]
    IncludeNotFound { pos: SourcePos, name: String },

    /// `#include` target found but unreadable
    #[error("{pos}: cannot read include file: {path}")]
    IncludeReadFailure { pos: SourcePos, path: String },

    /// Macro invoked with the wrong number of arguments
    #[error("{pos}: macro '{name}' expects {expected} arguments, got {actual}")]
    MacroArityMismatch { pos: SourcePos, name: String, expected: usize, actual: usize },

    /// `##` with nothing to paste on one side
    #[error("{pos}: '##' requires tokens on both sides")]
    BadTokenPaste { pos: SourcePos },
}

impl PreprocessError {
    /// True for conditions reported at warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            PreprocessError::UserWarning { .. } | PreprocessError::IncludeNotFound { .. }
        )
    }

    /// Position the error was recorded at, when one is known.
    pub fn pos(&self) -> Option<&SourcePos> {
        match self {
            PreprocessError::MalformedDirective { pos, .. }
            | PreprocessError::ElifWithoutIf { pos }
            | PreprocessError::ElifAfterElse { pos }
            | PreprocessError::ElseWithoutIf { pos }
            | PreprocessError::MultipleElse { pos }
            | PreprocessError::EndifWithoutIf { pos }
            | PreprocessError::BadConditionalExpression { pos, .. }
            | PreprocessError::UserError { pos, .. }
            | PreprocessError::UserWarning { pos, .. }
            | PreprocessError::IncludeNotFound { pos, .. }
            | PreprocessError::IncludeReadFailure { pos, .. }
            | PreprocessError::MacroArityMismatch { pos, .. }
            | PreprocessError::BadTokenPaste { pos } => Some(pos),
            PreprocessError::UnterminatedConditional { .. } => None,
        }
    }

    /// `(file, line)` of the opening directive for unterminated
    /// conditionals.
    pub fn opening_site(&self) -> Option<(&str, u32)> {
        match self {
            PreprocessError::UnterminatedConditional { file, line } => {
                Some((file.as_str(), *line))
            }
            _ => None,
        }
    }
}
