//! Recursive-descent C++ parser for the cclint analysis pipeline.
//!
//! Consumes the preprocessed token stream and produces a
//! [`cclint_ast::Node`] tree rooted at a translation unit. Declarations and
//! statements are parsed by recursive descent; expressions by precedence
//! climbing. One-token lookahead suffices almost everywhere; lambda
//! detection in expression position uses mark/restore backtracking.
//!
//! The parser records every problem as a [`ParseError`] and resynchronizes
//! (to the next `;`, past the matching `}`, or by a single token), so a
//! malformed file still yields a partial AST. It never consumes past EOF.
//!
//! ```
//! use cclint_parser::Parser;
//!
//! let output = Parser::new("namespace n { class C {}; }", "demo.cpp").parse();
//! assert!(!output.has_errors());
//! assert_eq!(output.root.children[0].name, "n");
//! ```

use std::sync::Arc;

use cclint_ast::{Access, Node, NodeKind};
use cclint_preprocessor::Preprocessor;
use cclint_token::{SourcePos, Token, TokenKind};
use tracing::debug;

mod decl;
mod error;
mod expr;
mod stmt;

pub use error::{ParseError, Recovery};

/// Expression nesting bound; prevents stack overflow on adversarial input.
const MAX_EXPR_DEPTH: u32 = 256;

/// Result of a parse: the (possibly partial) tree plus everything that went
/// wrong while building it.
#[derive(Debug)]
pub struct ParseOutput {
    /// Root translation-unit node; present even when errors were recorded
    pub root: Node,
    /// Syntax errors in the order they were found
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// The C++ parser.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) pos: usize,
    pub(crate) file: Arc<str>,
    pub(crate) errors: Vec<ParseError>,
    /// Access specifier in effect inside the innermost class body
    pub(crate) current_access: Access,
    /// Name of the function whose body is being parsed; tags call sites
    pub(crate) current_function: String,
    pub(crate) expr_depth: u32,
}

impl Parser {
    /// Parse `source` directly: lex and preprocess in linter mode, then
    /// consume the resulting stream.
    pub fn new(source: &str, file: impl Into<Arc<str>>) -> Self {
        let file = file.into();
        let mut preprocessor = Preprocessor::new(source, Arc::clone(&file));
        let tokens = preprocessor.preprocess();
        Self::from_tokens(tokens, file)
    }

    /// Parse an already-preprocessed token stream.
    pub fn from_tokens(mut tokens: Vec<Token>, file: impl Into<Arc<str>>) -> Self {
        let file = file.into();
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            tokens.push(Token::eof(SourcePos::new(Arc::clone(&file), 1, 1, 0)));
        }
        Parser {
            tokens,
            pos: 0,
            file,
            errors: Vec::new(),
            current_access: Access::None,
            current_function: String::new(),
            expr_depth: 0,
        }
    }

    /// Parse the whole stream into a translation unit.
    pub fn parse(mut self) -> ParseOutput {
        debug!(file = %self.file, tokens = self.tokens.len(), "parsing");

        let first_pos = self
            .tokens
            .first()
            .map(|t| t.pos.clone())
            .unwrap_or_else(|| SourcePos::start(Arc::clone(&self.file)));
        let mut root = Node::new(NodeKind::TranslationUnit, self.file.to_string(), first_pos);

        while !self.at_eof() {
            let before = self.pos;
            if let Some(node) = self.parse_declaration() {
                root.push(node);
            }
            // Hard guarantee against infinite loops: always make progress
            if self.pos == before && !self.at_eof() {
                self.error_unexpected("a declaration");
                self.bump();
            }
        }

        ParseOutput { root, errors: self.errors }
    }

    // ========== Token access ==========

    pub(crate) fn current(&self) -> &Token {
        // The stream always ends in EOF, so `pos` is clamped to the sentinel
        let index = self.pos.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(crate) fn kind(&self) -> TokenKind {
        self.current().kind
    }

    pub(crate) fn peek(&self, offset: usize) -> &Token {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> TokenKind {
        self.peek(offset).kind
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    pub(crate) fn here(&self) -> SourcePos {
        self.current().pos.clone()
    }

    /// Consume and return the current token; at EOF returns the sentinel
    /// without moving.
    pub(crate) fn bump(&mut self) -> Token {
        let token = self.current().clone();
        if !token.is_eof() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `kind` or record an error naming `what`. Returns whether the
    /// token matched.
    pub(crate) fn expect(&mut self, kind: TokenKind, what: &str) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error_unexpected(what);
            false
        }
    }

    pub(crate) fn mark(&self) -> usize {
        self.pos
    }

    pub(crate) fn restore(&mut self, mark: usize) {
        self.pos = mark;
    }

    // ========== Trivia ==========

    /// Skip comment and directive tokens; they carry no grammar.
    pub(crate) fn skip_trivia(&mut self) {
        while self.current().is_comment() || self.current().is_directive() {
            self.pos += 1;
        }
    }

    /// Skip one or more `[[...]]` attribute groups.
    pub(crate) fn skip_attributes(&mut self) {
        while self.eat(TokenKind::AttributeStart) {
            while !self.check(TokenKind::AttributeEnd) && !self.at_eof() {
                self.pos += 1;
            }
            self.eat(TokenKind::AttributeEnd);
        }
    }

    // ========== Errors and recovery ==========

    pub(crate) fn error_unexpected(&mut self, expected: &str) {
        let token = self.current();
        let found =
            if token.is_eof() { "<eof>".to_string() } else { token.text.to_string() };
        if token.is_eof() {
            self.errors.push(ParseError::UnexpectedEof { pos: token.pos.clone() });
        } else {
            self.errors.push(ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found,
                pos: token.pos.clone(),
            });
        }
    }

    /// Resynchronize after an error.
    pub(crate) fn recover(&mut self, strategy: Recovery) {
        match strategy {
            Recovery::SkipToSemicolon => self.skip_to_semicolon(),
            Recovery::SkipToCloseBrace => self.skip_balanced_braces(),
            Recovery::SkipToNextStatement => {
                if !self.at_eof() {
                    self.pos += 1;
                }
            }
        }
    }

    /// Advance to and consume the next `;`, stepping over whole brace
    /// blocks so a `;` inside a nested body is not mistaken for the end.
    /// Stops (without consuming) at a `}` closing the enclosing scope.
    pub(crate) fn skip_to_semicolon(&mut self) {
        while !self.at_eof() {
            match self.kind() {
                TokenKind::Semicolon => {
                    self.pos += 1;
                    return;
                }
                TokenKind::LeftBrace => self.skip_balanced_braces(),
                TokenKind::RightBrace => return,
                _ => self.pos += 1,
            }
        }
    }

    /// Consume a `{ ... }` block, tracking nesting. No-op if the current
    /// token is not `{`.
    pub(crate) fn skip_balanced_braces(&mut self) {
        if !self.eat(TokenKind::LeftBrace) {
            return;
        }
        let mut depth = 1usize;
        while depth > 0 && !self.at_eof() {
            match self.kind() {
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Consume a balanced `( ... )` group. No-op if not at `(`.
    pub(crate) fn skip_balanced_parens(&mut self) {
        if !self.eat(TokenKind::LeftParen) {
            return;
        }
        let mut depth = 1usize;
        while depth > 0 && !self.at_eof() {
            match self.kind() {
                TokenKind::LeftParen => depth += 1,
                TokenKind::RightParen => depth -= 1,
                _ => {}
            }
            self.pos += 1;
        }
    }

    /// Consume a balanced template argument list starting at `<`, returning
    /// the consumed tokens (including the angle brackets). `>>` closes two
    /// levels.
    pub(crate) fn consume_template_args(&mut self) -> Vec<Token> {
        let mut consumed = Vec::new();
        if !self.check(TokenKind::Less) {
            return consumed;
        }
        let mut depth = 0i32;
        while !self.at_eof() {
            let token = self.bump();
            match token.kind {
                TokenKind::Less => depth += 1,
                TokenKind::Greater => depth -= 1,
                TokenKind::GreaterGreater => depth -= 2,
                _ => {}
            }
            consumed.push(token);
            if depth <= 0 {
                break;
            }
        }
        consumed
    }

    /// Consume `]`, tolerating the lexer's `]]` attribute token when two
    /// subscripts close back to back: the first consumption rewrites `]]`
    /// into a single `]` left in the stream.
    pub(crate) fn eat_right_bracket(&mut self) -> bool {
        if self.eat(TokenKind::RightBracket) {
            return true;
        }
        if self.check(TokenKind::AttributeEnd) {
            let index = self.pos.min(self.tokens.len() - 1);
            let pos = self.tokens[index].pos.clone();
            self.tokens[index] = Token::new(TokenKind::RightBracket, "]", pos);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_empty_unit() {
        let output = Parser::new("", "t.cpp").parse();
        assert!(!output.has_errors());
        assert!(matches!(output.root.kind, NodeKind::TranslationUnit));
        assert!(output.root.children.is_empty());
    }

    #[test]
    fn test_parser_never_loops_on_garbage() {
        let output = Parser::new("} ) ] @ ;;; } }", "t.cpp").parse();
        // Some errors recorded, but parsing terminated
        assert!(output.has_errors());
    }

    #[test]
    fn test_comments_and_directives_are_skipped() {
        let source = "// banner\n#include <vector>\n/* block */\nint x;\n";
        let output = Parser::new(source, "t.cpp").parse();
        assert_eq!(output.root.children.len(), 1);
        assert_eq!(output.root.children[0].name, "x");
    }
}
