//! C++ lexer for the cclint analysis pipeline
//!
//! Converts a byte buffer and filename into a finite token sequence ending in
//! EOF. The lexer is a single left-to-right pass with maximal-munch operator
//! recognition and bounded lookahead for literal encoding prefixes.
//!
//! # What the lexer recognizes
//!
//! - All C++17 keywords (plus contextual `concept`), identifiers.
//! - Numeric literals in every base (`0x`, `0b`, leading-zero octal,
//!   decimal), digit separators (`1'000'000`), decimal and hex floats
//!   (`1e-5`, `0x1.2p3`), integer and floating suffixes, and user-defined
//!   literal suffixes.
//! - Character and string literals with `L`, `u`, `u8`, `U` encoding
//!   prefixes, escape-sequence decoding into [`Token::value`], and raw
//!   strings `R"delim(...)delim"` with user-chosen delimiters.
//! - All operator multigraphs (`<=>`, `<<=`, `->*`, `...`, `::`, `##`).
//! - `[[` / `]]` attribute brackets.
//! - Line comments, block comments (nested `/*` tolerated), and
//!   preprocessor directives, which are captured as single tokens holding
//!   the whole directive line for the preprocessor to re-parse.
//!
//! Whitespace and newlines are consumed internally; following tokens carry
//! the `has_space_before` and `at_line_start` adjacency flags instead.
//!
//! # Errors
//!
//! Lexing never fails. Unterminated literals and comments, bad raw-string
//! delimiters, and unclassifiable bytes are recorded on the error list and
//! scanning continues to EOF.
//!
//! ```
//! use cclint_lexer::Lexer;
//! use cclint_token::TokenKind;
//!
//! let tokens = Lexer::new("int x = 0x1p4;", "demo.cpp").tokenize();
//! assert_eq!(tokens[3].kind, TokenKind::FloatingLiteral);
//! assert_eq!(&*tokens[3].text, "0x1p4");
//! ```

use std::sync::Arc;

use cclint_token::{Token, TokenKind, SourcePos, keyword_from_str};
use memchr::memchr;

mod error;

pub use error::LexError;

/// Longest raw-string delimiter the standard allows.
const MAX_RAW_DELIM_LEN: usize = 16;

/// Single-pass C++ lexer.
///
/// Produces the full token stream via [`Lexer::tokenize`]; recoverable
/// problems are collected and exposed through [`Lexer::errors`].
pub struct Lexer<'a> {
    input: &'a str,
    /// Cached input bytes for faster access
    bytes: &'a [u8],
    file: Arc<str>,
    pos: usize,
    line: u32,
    column: u32,
    /// No token emitted yet on the current line
    at_line_start: bool,
    /// Trivia was consumed since the previous token
    had_space: bool,
    errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over `input`, attributing positions to `file`.
    pub fn new(input: &'a str, file: impl Into<Arc<str>>) -> Self {
        Lexer {
            input,
            bytes: input.as_bytes(),
            file: file.into(),
            pos: 0,
            line: 1,
            column: 1,
            at_line_start: true,
            had_space: false,
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire input. The returned sequence always ends with a
    /// single EOF token; whitespace and newlines are filtered out, with the
    /// adjacency flags of the following tokens set accordingly.
    pub fn tokenize(self) -> Vec<Token> {
        self.tokenize_with_errors().0
    }

    /// Tokenize and hand back the collected errors alongside the tokens.
    pub fn tokenize_with_errors(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();

        loop {
            self.skip_trivia();
            let at_line_start = self.at_line_start;
            let had_space = self.had_space;

            if self.is_eof() {
                let mut eof = Token::eof(self.here());
                eof.at_line_start = at_line_start;
                eof.has_space_before = had_space;
                tokens.push(eof);
                break;
            }

            let mut token = self.lex_token(at_line_start);
            token.at_line_start = at_line_start;
            token.has_space_before = had_space;
            let was_comment = token.is_comment();
            tokens.push(token);

            self.at_line_start = false;
            // A comment separates tokens the same way whitespace does.
            self.had_space = was_comment;
        }

        (tokens, self.errors)
    }

    // ========== Character access ==========

    fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn cur(&self) -> u8 {
        if self.pos < self.bytes.len() { self.bytes[self.pos] } else { 0 }
    }

    fn peek(&self, offset: usize) -> u8 {
        let p = self.pos + offset;
        if p < self.bytes.len() { self.bytes[p] } else { 0 }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    fn bump(&mut self) {
        if self.pos < self.bytes.len() {
            if self.bytes[self.pos] == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.pos += 1;
        }
    }

    fn bump_n(&mut self, n: usize) {
        for _ in 0..n {
            self.bump();
        }
    }

    fn here(&self) -> SourcePos {
        SourcePos::new(Arc::clone(&self.file), self.line, self.column, self.pos as u32)
    }

    fn text_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }

    fn token_from(&self, kind: TokenKind, start: usize, pos: SourcePos) -> Token {
        Token::new(kind, self.text_from(start), pos)
    }

    // ========== Trivia ==========

    fn skip_trivia(&mut self) {
        while !self.is_eof() {
            match self.cur() {
                b' ' | b'\t' | b'\r' => {
                    self.had_space = true;
                    self.bump();
                }
                b'\n' => {
                    self.had_space = true;
                    self.at_line_start = true;
                    self.bump();
                }
                _ => break,
            }
        }
    }

    // ========== Dispatch ==========

    fn lex_token(&mut self, at_line_start: bool) -> Token {
        let c = self.cur();

        if c == b'/' && self.peek(1) == b'/' {
            return self.lex_line_comment();
        }
        if c == b'/' && self.peek(1) == b'*' {
            return self.lex_block_comment();
        }

        if c == b'#' {
            if at_line_start {
                return self.lex_directive();
            }
            let pos = self.here();
            let start = self.pos;
            if self.peek(1) == b'#' {
                self.bump_n(2);
                return self.token_from(TokenKind::MacroConcat, start, pos);
            }
            self.bump();
            return self.token_from(TokenKind::MacroStringify, start, pos);
        }

        if c == b'"' || c == b'\'' {
            return self.lex_quoted(0, encoding_kinds(""));
        }

        if c.is_ascii_digit() || (c == b'.' && self.peek(1).is_ascii_digit()) {
            return self.lex_number();
        }

        if is_ident_start(c) {
            if let Some(prefix) = self.literal_prefix() {
                return match prefix {
                    LiteralPrefix::Raw(len) => self.lex_raw_string(len),
                    LiteralPrefix::Encoded(len, kinds) => self.lex_quoted(len, kinds),
                };
            }
            return self.lex_identifier();
        }

        self.lex_operator()
    }

    // ========== Identifiers and literal prefixes ==========

    fn lex_identifier(&mut self) -> Token {
        let pos = self.here();
        let start = self.pos;
        while is_ident_continue(self.cur()) {
            self.bump();
        }
        let text = self.text_from(start);
        Token::new(keyword_from_str(text), text, pos)
    }

    /// Detect a literal encoding prefix at the current position. Longest
    /// prefixes are tried first so `u8"` wins over `u"`.
    fn literal_prefix(&self) -> Option<LiteralPrefix> {
        for raw in ["u8R\"", "uR\"", "UR\"", "LR\"", "R\""] {
            if self.starts_with(raw) {
                return Some(LiteralPrefix::Raw(raw.len() - 1));
            }
        }
        for enc in ["u8", "u", "U", "L"] {
            if self.starts_with(enc) {
                let next = self.peek(enc.len());
                if next == b'"' || next == b'\'' {
                    return Some(LiteralPrefix::Encoded(enc.len(), encoding_kinds(enc)));
                }
            }
        }
        None
    }

    // ========== Numeric literals ==========

    fn lex_number(&mut self) -> Token {
        let pos = self.here();
        let start = self.pos;
        let mut is_float = false;

        if self.cur() == b'0' && matches!(self.peek(1), b'x' | b'X') {
            self.bump_n(2);
            self.consume_digits(|c| c.is_ascii_hexdigit());
            if self.cur() == b'.' {
                is_float = true;
                self.bump();
                self.consume_digits(|c| c.is_ascii_hexdigit());
            }
            if matches!(self.cur(), b'p' | b'P') {
                is_float = true;
                self.bump();
                if matches!(self.cur(), b'+' | b'-') {
                    self.bump();
                }
                self.consume_digits(|c| c.is_ascii_digit());
            }
        } else if self.cur() == b'0' && matches!(self.peek(1), b'b' | b'B') {
            self.bump_n(2);
            self.consume_digits(|c| matches!(c, b'0' | b'1'));
        } else {
            // Decimal, octal, or a float starting with '.'
            self.consume_digits(|c| c.is_ascii_digit());
            if self.cur() == b'.' && !matches!(self.peek(1), b'.') {
                is_float = true;
                self.bump();
                self.consume_digits(|c| c.is_ascii_digit());
            }
            if matches!(self.cur(), b'e' | b'E')
                && (self.peek(1).is_ascii_digit()
                    || (matches!(self.peek(1), b'+' | b'-') && self.peek(2).is_ascii_digit()))
            {
                is_float = true;
                self.bump();
                if matches!(self.cur(), b'+' | b'-') {
                    self.bump();
                }
                self.consume_digits(|c| c.is_ascii_digit());
            }
        }

        // Suffix: u/l combinations on integers, one of f/F/l/L on floats
        if is_float {
            if matches!(self.cur(), b'f' | b'F' | b'l' | b'L') && !is_ident_continue(self.peek(1)) {
                self.bump();
            }
        } else {
            while matches!(self.cur(), b'u' | b'U' | b'l' | b'L') {
                self.bump();
            }
        }

        // A following identifier start turns the whole token into a
        // user-defined literal; the suffix identifier is kept in the text.
        let kind = if is_ident_start(self.cur()) {
            while is_ident_continue(self.cur()) {
                self.bump();
            }
            TokenKind::UserDefinedLiteral
        } else if is_float {
            TokenKind::FloatingLiteral
        } else {
            TokenKind::IntegerLiteral
        };

        self.token_from(kind, start, pos)
    }

    fn consume_digits(&mut self, digit: impl Fn(u8) -> bool) {
        loop {
            let c = self.cur();
            if digit(c) {
                self.bump();
            } else if c == b'\'' && digit(self.peek(1)) {
                // C++14 digit separator, only valid between digits
                self.bump();
            } else {
                break;
            }
        }
    }

    // ========== Character and string literals ==========

    fn lex_quoted(&mut self, prefix_len: usize, kinds: (TokenKind, TokenKind)) -> Token {
        let pos = self.here();
        let start = self.pos;
        self.bump_n(prefix_len);

        let quote = self.cur();
        let base_kind = if quote == b'\'' { kinds.0 } else { kinds.1 };
        self.bump();

        let mut value = String::new();
        let mut terminated = false;
        while !self.is_eof() {
            let c = self.cur();
            if c == quote {
                self.bump();
                terminated = true;
                break;
            }
            if c == b'\n' {
                break;
            }
            if c == b'\\' {
                self.bump();
                self.decode_escape(&mut value);
            } else {
                let ch = self.cur_char();
                value.push(ch);
                self.bump_n(ch.len_utf8());
            }
        }

        if !terminated {
            let err = if quote == b'\'' {
                LexError::UnterminatedChar { pos: pos.clone() }
            } else {
                LexError::UnterminatedString { pos: pos.clone() }
            };
            self.errors.push(err);
        }

        let kind = self.maybe_udl_suffix(base_kind, terminated);
        Token::with_value(kind, self.text_from(start), value, pos)
    }

    fn cur_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\u{FFFD}')
    }

    /// Decode the escape sequence following a consumed backslash, pushing the
    /// decoded character(s) onto `value`.
    fn decode_escape(&mut self, value: &mut String) {
        let c = self.cur();
        match c {
            b'n' => {
                value.push('\n');
                self.bump();
            }
            b't' => {
                value.push('\t');
                self.bump();
            }
            b'r' => {
                value.push('\r');
                self.bump();
            }
            b'b' => {
                value.push('\u{0008}');
                self.bump();
            }
            b'f' => {
                value.push('\u{000C}');
                self.bump();
            }
            b'v' => {
                value.push('\u{000B}');
                self.bump();
            }
            b'a' => {
                value.push('\u{0007}');
                self.bump();
            }
            b'\\' => {
                value.push('\\');
                self.bump();
            }
            b'\'' => {
                value.push('\'');
                self.bump();
            }
            b'"' => {
                value.push('"');
                self.bump();
            }
            b'?' => {
                value.push('?');
                self.bump();
            }
            b'0'..=b'7' => {
                let mut code: u32 = 0;
                let mut digits = 0;
                while digits < 3 && matches!(self.cur(), b'0'..=b'7') {
                    code = code * 8 + u32::from(self.cur() - b'0');
                    digits += 1;
                    self.bump();
                }
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            b'x' => {
                self.bump();
                let mut code: u32 = 0;
                while self.cur().is_ascii_hexdigit() {
                    code = code.wrapping_mul(16) + hex_value(self.cur());
                    self.bump();
                }
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            b'u' => {
                self.bump();
                self.decode_unicode_escape(4, value);
            }
            b'U' => {
                self.bump();
                self.decode_unicode_escape(8, value);
            }
            _ => {
                // Unknown escape: keep the character as-is
                if !self.is_eof() {
                    let ch = self.cur_char();
                    value.push(ch);
                    self.bump_n(ch.len_utf8());
                }
            }
        }
    }

    fn decode_unicode_escape(&mut self, max_digits: usize, value: &mut String) {
        let mut code: u32 = 0;
        let mut digits = 0;
        while digits < max_digits && self.cur().is_ascii_hexdigit() {
            code = code.wrapping_mul(16) + hex_value(self.cur());
            digits += 1;
            self.bump();
        }
        value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
    }

    /// Absorb a user-defined-literal suffix after a terminated literal.
    fn maybe_udl_suffix(&mut self, base_kind: TokenKind, terminated: bool) -> TokenKind {
        if terminated && is_ident_start(self.cur()) {
            while is_ident_continue(self.cur()) {
                self.bump();
            }
            TokenKind::UserDefinedLiteral
        } else {
            base_kind
        }
    }

    // ========== Raw string literals ==========

    fn lex_raw_string(&mut self, prefix_len: usize) -> Token {
        let pos = self.here();
        let start = self.pos;
        // prefix (if any) + R + opening quote
        self.bump_n(prefix_len + 1);

        // Delimiter: up to 16 chars, no parentheses, backslash, or whitespace
        let delim_start = self.pos;
        while self.cur() != b'(' && !self.is_eof() {
            let c = self.cur();
            if self.pos - delim_start >= MAX_RAW_DELIM_LEN
                || matches!(c, b')' | b'\\' | b' ' | b'\t' | b'\n' | b'\r')
            {
                self.errors.push(LexError::InvalidRawDelimiter { pos: pos.clone() });
                // Give up on raw parsing; consume the rest of the line
                while !self.is_eof() && self.cur() != b'\n' {
                    self.bump();
                }
                return self.token_from(TokenKind::Unknown, start, pos);
            }
            self.bump();
        }
        let delim = self.input[delim_start..self.pos].to_string();
        if self.is_eof() {
            self.errors.push(LexError::UnterminatedRawString { pos: pos.clone() });
            return self.token_from(TokenKind::RawStringLiteral, start, pos);
        }
        self.bump(); // (

        // The end marker is `)delim"`
        let marker = format!("){delim}\"");
        let content_start = self.pos;
        let mut content_end = None;
        while let Some(rel) = memchr(b')', &self.bytes[self.pos..]) {
            let candidate = self.pos + rel;
            if self.bytes[candidate..].starts_with(marker.as_bytes()) {
                content_end = Some(candidate);
                // Consume up to and including the closing quote
                while self.pos < candidate + marker.len() {
                    self.bump();
                }
                break;
            }
            while self.pos <= candidate {
                self.bump();
            }
        }

        let kind = match content_end {
            Some(_) => self.maybe_udl_suffix(TokenKind::RawStringLiteral, true),
            None => {
                self.errors.push(LexError::UnterminatedRawString { pos: pos.clone() });
                while !self.is_eof() {
                    self.bump();
                }
                TokenKind::RawStringLiteral
            }
        };

        let value = match content_end {
            Some(end) => &self.input[content_start..end],
            None => &self.input[content_start..self.pos],
        };
        Token::with_value(kind, self.text_from(start), value, pos)
    }

    // ========== Comments ==========

    fn lex_line_comment(&mut self) -> Token {
        let pos = self.here();
        let start = self.pos;
        while !self.is_eof() && self.cur() != b'\n' {
            self.bump();
        }
        self.token_from(TokenKind::LineComment, start, pos)
    }

    fn lex_block_comment(&mut self) -> Token {
        let pos = self.here();
        let start = self.pos;
        self.bump_n(2); // /*

        // Inner `/*` markers increment the depth; real C++ does not nest
        // block comments, but tolerating them avoids runaway spans.
        let mut depth = 1usize;
        let mut terminated = false;
        while !self.is_eof() {
            if self.cur() == b'/' && self.peek(1) == b'*' {
                depth += 1;
                self.bump_n(2);
            } else if self.cur() == b'*' && self.peek(1) == b'/' {
                depth -= 1;
                self.bump_n(2);
                if depth == 0 {
                    terminated = true;
                    break;
                }
            } else {
                self.bump();
            }
        }

        if !terminated {
            self.errors.push(LexError::UnterminatedComment { pos: pos.clone() });
        }
        self.token_from(TokenKind::BlockComment, start, pos)
    }

    // ========== Preprocessor directives ==========

    /// A `#` first on its line starts a directive; the whole line is captured
    /// unmodified as a single token for the preprocessor to re-parse.
    fn lex_directive(&mut self) -> Token {
        let pos = self.here();
        let start = self.pos;
        self.bump(); // #

        // The directive keyword may be separated from '#' by spaces
        let mut word_at = self.pos;
        while word_at < self.bytes.len() && matches!(self.bytes[word_at], b' ' | b'\t') {
            word_at += 1;
        }
        let word_end = {
            let mut e = word_at;
            while e < self.bytes.len() && is_ident_continue(self.bytes[e]) {
                e += 1;
            }
            e
        };
        let kind = directive_kind(&self.input[word_at..word_end]);

        while !self.is_eof() && self.cur() != b'\n' {
            self.bump();
        }
        self.token_from(kind, start, pos)
    }

    // ========== Operators ==========

    fn lex_operator(&mut self) -> Token {
        let pos = self.here();
        let start = self.pos;
        let c = self.cur();

        // Longest-match over the fixed multigraph set
        let (kind, len) = match c {
            b'<' => {
                if self.starts_with("<=>") {
                    (TokenKind::Spaceship, 3)
                } else if self.starts_with("<<=") {
                    (TokenKind::LessLessEqual, 3)
                } else if self.starts_with("<<") {
                    (TokenKind::LessLess, 2)
                } else if self.starts_with("<=") {
                    (TokenKind::LessEqual, 2)
                } else {
                    (TokenKind::Less, 1)
                }
            }
            b'>' => {
                if self.starts_with(">>=") {
                    (TokenKind::GreaterGreaterEqual, 3)
                } else if self.starts_with(">>") {
                    (TokenKind::GreaterGreater, 2)
                } else if self.starts_with(">=") {
                    (TokenKind::GreaterEqual, 2)
                } else {
                    (TokenKind::Greater, 1)
                }
            }
            b'-' => {
                if self.starts_with("->*") {
                    (TokenKind::ArrowStar, 3)
                } else if self.starts_with("->") {
                    (TokenKind::Arrow, 2)
                } else if self.starts_with("--") {
                    (TokenKind::MinusMinus, 2)
                } else if self.starts_with("-=") {
                    (TokenKind::MinusEqual, 2)
                } else {
                    (TokenKind::Minus, 1)
                }
            }
            b'+' => {
                if self.starts_with("++") {
                    (TokenKind::PlusPlus, 2)
                } else if self.starts_with("+=") {
                    (TokenKind::PlusEqual, 2)
                } else {
                    (TokenKind::Plus, 1)
                }
            }
            b'.' => {
                if self.starts_with("...") {
                    (TokenKind::Ellipsis, 3)
                } else if self.starts_with(".*") {
                    (TokenKind::DotStar, 2)
                } else {
                    (TokenKind::Dot, 1)
                }
            }
            b':' => {
                if self.starts_with("::") {
                    (TokenKind::ColonColon, 2)
                } else {
                    (TokenKind::Colon, 1)
                }
            }
            b'&' => {
                if self.starts_with("&&") {
                    (TokenKind::AmpAmp, 2)
                } else if self.starts_with("&=") {
                    (TokenKind::AmpEqual, 2)
                } else {
                    (TokenKind::Amp, 1)
                }
            }
            b'|' => {
                if self.starts_with("||") {
                    (TokenKind::PipePipe, 2)
                } else if self.starts_with("|=") {
                    (TokenKind::PipeEqual, 2)
                } else {
                    (TokenKind::Pipe, 1)
                }
            }
            b'=' => {
                if self.starts_with("==") {
                    (TokenKind::EqualEqual, 2)
                } else {
                    (TokenKind::Equal, 1)
                }
            }
            b'!' => {
                if self.starts_with("!=") {
                    (TokenKind::NotEqual, 2)
                } else {
                    (TokenKind::Bang, 1)
                }
            }
            b'*' => {
                if self.starts_with("*=") {
                    (TokenKind::StarEqual, 2)
                } else {
                    (TokenKind::Star, 1)
                }
            }
            b'/' => {
                if self.starts_with("/=") {
                    (TokenKind::SlashEqual, 2)
                } else {
                    (TokenKind::Slash, 1)
                }
            }
            b'%' => {
                if self.starts_with("%=") {
                    (TokenKind::PercentEqual, 2)
                } else {
                    (TokenKind::Percent, 1)
                }
            }
            b'^' => {
                if self.starts_with("^=") {
                    (TokenKind::CaretEqual, 2)
                } else {
                    (TokenKind::Caret, 1)
                }
            }
            b'[' => {
                if self.starts_with("[[") {
                    (TokenKind::AttributeStart, 2)
                } else {
                    (TokenKind::LeftBracket, 1)
                }
            }
            b']' => {
                if self.starts_with("]]") {
                    (TokenKind::AttributeEnd, 2)
                } else {
                    (TokenKind::RightBracket, 1)
                }
            }
            b'~' => (TokenKind::Tilde, 1),
            b'?' => (TokenKind::Question, 1),
            b';' => (TokenKind::Semicolon, 1),
            b',' => (TokenKind::Comma, 1),
            b'(' => (TokenKind::LeftParen, 1),
            b')' => (TokenKind::RightParen, 1),
            b'{' => (TokenKind::LeftBrace, 1),
            b'}' => (TokenKind::RightBrace, 1),
            _ => {
                let ch = self.cur_char();
                self.errors.push(LexError::UnknownChar { ch, pos: pos.clone() });
                (TokenKind::Unknown, ch.len_utf8())
            }
        };

        self.bump_n(len);
        self.token_from(kind, start, pos)
    }
}

/// Classify a directive keyword.
fn directive_kind(word: &str) -> TokenKind {
    match word {
        "include" => TokenKind::PpInclude,
        "define" => TokenKind::PpDefine,
        "undef" => TokenKind::PpUndef,
        "if" => TokenKind::PpIf,
        "ifdef" => TokenKind::PpIfdef,
        "ifndef" => TokenKind::PpIfndef,
        "elif" => TokenKind::PpElif,
        "else" => TokenKind::PpElse,
        "endif" => TokenKind::PpEndif,
        "pragma" => TokenKind::PpPragma,
        "error" => TokenKind::PpError,
        "warning" => TokenKind::PpWarning,
        "line" => TokenKind::PpLine,
        _ => TokenKind::PpDirective,
    }
}

/// Char/string literal kinds for an encoding prefix.
fn encoding_kinds(prefix: &str) -> (TokenKind, TokenKind) {
    match prefix {
        "L" => (TokenKind::WideCharLiteral, TokenKind::WideStringLiteral),
        "u8" => (TokenKind::Utf8CharLiteral, TokenKind::Utf8StringLiteral),
        "u" => (TokenKind::Utf16CharLiteral, TokenKind::Utf16StringLiteral),
        "U" => (TokenKind::Utf32CharLiteral, TokenKind::Utf32StringLiteral),
        _ => (TokenKind::CharLiteral, TokenKind::StringLiteral),
    }
}

enum LiteralPrefix {
    /// Byte length of the prefix before the opening quote (includes `R`)
    Raw(usize),
    /// Byte length of the encoding prefix, plus the char/string kind pair
    Encoded(usize, (TokenKind, TokenKind)),
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continue(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn hex_value(c: u8) -> u32 {
    match c {
        b'0'..=b'9' => u32::from(c - b'0'),
        b'a'..=b'f' => u32::from(c - b'a') + 10,
        b'A'..=b'F' => u32::from(c - b'A') + 10,
        _ => 0,
    }
}
