//! Error types for the C++ lexer

use cclint_token::SourcePos;
use thiserror::Error;

/// Errors recorded while lexing. Lexing never aborts; every error is pushed
/// onto the lexer's error list and scanning continues.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LexError {
    /// String literal left open at end of line or file
    #[error("{pos}: unterminated string literal")]
    UnterminatedString { pos: SourcePos },

    /// Character literal left open at end of line or file
    #[error("{pos}: unterminated character literal")]
    UnterminatedChar { pos: SourcePos },

    /// `/*` without a matching `*/`
    #[error("{pos}: unterminated block comment")]
    UnterminatedComment { pos: SourcePos },

    /// Raw string literal without its `)delim"` end marker
    #[error("{pos}: unterminated raw string literal")]
    UnterminatedRawString { pos: SourcePos },

    /// Raw string delimiter over 16 characters or containing a forbidden byte
    #[error("{pos}: invalid raw string delimiter")]
    InvalidRawDelimiter { pos: SourcePos },

    /// Byte the lexer could not classify
    #[error("{pos}: unknown character '{ch}'")]
    UnknownChar { ch: char, pos: SourcePos },
}

impl LexError {
    /// Position the error was recorded at.
    pub fn pos(&self) -> &SourcePos {
        match self {
            LexError::UnterminatedString { pos }
            | LexError::UnterminatedChar { pos }
            | LexError::UnterminatedComment { pos }
            | LexError::UnterminatedRawString { pos }
            | LexError::InvalidRawDelimiter { pos }
            | LexError::UnknownChar { pos, .. } => pos,
        }
    }
}
