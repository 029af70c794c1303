//! C/C++ preprocessor layered on the cclint lexer.
//!
//! Two orthogonal modes drive what happens to the token stream:
//!
//! - **Linter mode** (the default: `expand_macros` and `expand_includes`
//!   both false): directives stay in the stream as inert tokens so rules
//!   can inspect macro invocations and `#include`s, but conditional
//!   compilation is still evaluated, so tokens in inactive branches are
//!   dropped and the conditional stack is kept balanced.
//! - **Expanding mode**: `#define`/`#undef` maintain the macro table and
//!   macro uses are rewritten by the [`MacroExpander`]; with
//!   `expand_includes` set, `#include` directives are resolved, lexed, and
//!   spliced into the stream (system headers only when
//!   `expand_system_includes` is also set).
//!
//! The macro table is seeded with the predefined macros (`__FILE__`,
//! `__LINE__`, `__DATE__`, `__TIME__`, `__cplusplus`, `__STDC_HOSTED__`);
//! `__LINE__` is re-evaluated lazily at each use. Command-line style
//! definitions (`-D`/`-U`) are supported through
//! [`Preprocessor::define_macro`] and [`Preprocessor::undefine_macro`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cclint_lexer::{LexError, Lexer};
use cclint_token::{SourcePos, Token, TokenKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, warn};

mod cond;
mod error;
mod expand;

pub use cond::CondError;
pub use error::PreprocessError;
pub use expand::MacroExpander;

/// A preprocessor macro definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroDef {
    pub name: String,
    pub is_function_like: bool,
    /// Ordered, unique parameter names; ends with `__VA_ARGS__` iff variadic
    pub params: Vec<String>,
    pub is_variadic: bool,
    /// Replacement tokens; `#` and `##` appear as `MacroStringify` and
    /// `MacroConcat` tokens
    pub replacement: Vec<Token>,
    /// Definition site
    pub file: Arc<str>,
    pub line: u32,
}

/// What kind of directive opened (or last updated) a conditional frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionalKind {
    If,
    Ifdef,
    Ifndef,
    Elif,
    Else,
}

/// One entry of the nested-conditional stack.
#[derive(Debug, Clone)]
pub struct ConditionalFrame {
    pub kind: ConditionalKind,
    /// The branch currently being read emits tokens
    pub active: bool,
    /// Some branch of this conditional has already emitted tokens
    pub any_taken: bool,
    pub has_else: bool,
    /// Line of the opening directive
    pub opening_line: u32,
}

/// The preprocessor. Construct per translation unit, configure, then call
/// [`Preprocessor::preprocess`] once.
pub struct Preprocessor {
    source: String,
    file: Arc<str>,
    include_paths: Vec<PathBuf>,
    macros: FxHashMap<String, MacroDef>,
    /// Files already spliced in; guards against multiple inclusion
    included: FxHashSet<PathBuf>,
    stack: Vec<ConditionalFrame>,
    expand_macros: bool,
    expand_includes: bool,
    expand_system_includes: bool,
    errors: Vec<PreprocessError>,
    lex_errors: Vec<LexError>,
}

impl Preprocessor {
    pub fn new(source: impl Into<String>, file: impl Into<Arc<str>>) -> Self {
        let file = file.into();
        let mut pp = Preprocessor {
            source: source.into(),
            file,
            include_paths: Vec::new(),
            macros: FxHashMap::default(),
            included: FxHashSet::default(),
            stack: Vec::new(),
            expand_macros: false,
            expand_includes: false,
            expand_system_includes: false,
            errors: Vec::new(),
            lex_errors: Vec::new(),
        };
        pp.define_predefined_macros();
        pp
    }

    /// Expand macro uses (default false: linter mode preserves them).
    pub fn set_expand_macros(&mut self, expand: bool) {
        self.expand_macros = expand;
    }

    /// Resolve and splice `#include` directives (default false).
    pub fn set_expand_includes(&mut self, expand: bool) {
        self.expand_includes = expand;
    }

    /// Also expand `<...>` includes and search system paths (default false).
    pub fn set_expand_system_includes(&mut self, expand: bool) {
        self.expand_system_includes = expand;
    }

    pub fn add_include_path(&mut self, path: impl Into<PathBuf>) {
        self.include_paths.push(path.into());
    }

    /// Define a macro from a command-line style string: `FOO=1` or `BAR`.
    pub fn define_macro(&mut self, definition: &str) {
        let (name, value) = match definition.split_once('=') {
            Some((name, value)) => (name, value),
            None => (definition, ""),
        };
        let def = MacroDef {
            name: name.to_string(),
            is_function_like: false,
            params: Vec::new(),
            is_variadic: false,
            replacement: lex_replacement(value, &Arc::from("<command-line>"), 0),
            file: Arc::from("<command-line>"),
            line: 0,
        };
        self.macros.insert(def.name.clone(), def);
    }

    /// Remove a macro definition, command-line `-U` style.
    pub fn undefine_macro(&mut self, name: &str) {
        self.macros.remove(name);
    }

    /// The current macro table.
    pub fn macros(&self) -> &FxHashMap<String, MacroDef> {
        &self.macros
    }

    /// Errors recorded so far (preprocessor level).
    pub fn errors(&self) -> &[PreprocessError] {
        &self.errors
    }

    /// Lexer errors from the main file and any spliced includes.
    pub fn lex_errors(&self) -> &[LexError] {
        &self.lex_errors
    }

    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(|e| !e.is_warning()) || !self.lex_errors.is_empty()
    }

    /// Depth of the conditional stack; zero after a balanced run.
    pub fn conditional_depth(&self) -> usize {
        self.stack.len()
    }

    /// Run the pipeline: lex, process directives, and (in expanding mode)
    /// expand macros. Always returns a stream ending in EOF.
    pub fn preprocess(&mut self) -> Vec<Token> {
        debug!(file = %self.file, expand_macros = self.expand_macros,
               expand_includes = self.expand_includes, "preprocessing");

        let source = std::mem::take(&mut self.source);
        let (mut tokens, lex_errors) =
            Lexer::new(&source, Arc::clone(&self.file)).tokenize_with_errors();
        self.source = source;
        self.lex_errors.extend(lex_errors);

        let full_mode = self.expand_macros || self.expand_includes;
        let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i].clone();

            if token.kind.is_conditional_directive() {
                self.handle_conditional(&token, full_mode, &mut out);
                i += 1;
                continue;
            }

            if self.skipping() {
                i += 1;
                continue;
            }

            match token.kind {
                TokenKind::PpInclude => {
                    if self.expand_includes {
                        if let Some(spliced) = self.handle_include(&token) {
                            tokens.splice(i + 1..i + 1, spliced);
                        }
                    } else {
                        out.push(token);
                    }
                    i += 1;
                }
                TokenKind::PpDefine => {
                    self.handle_define(&token);
                    if !self.expand_macros {
                        out.push(token);
                    }
                    i += 1;
                }
                TokenKind::PpUndef => {
                    self.handle_undef(&token);
                    if !self.expand_macros {
                        out.push(token);
                    }
                    i += 1;
                }
                TokenKind::PpError => {
                    let message = directive_rest(&token.text, "error").to_string();
                    self.errors
                        .push(PreprocessError::UserError { pos: token.pos.clone(), message });
                    if !full_mode {
                        out.push(token);
                    }
                    i += 1;
                }
                TokenKind::PpWarning => {
                    let message = directive_rest(&token.text, "warning").to_string();
                    self.errors
                        .push(PreprocessError::UserWarning { pos: token.pos.clone(), message });
                    if !full_mode {
                        out.push(token);
                    }
                    i += 1;
                }
                // `#pragma` and `#line` are accepted and ignored
                TokenKind::PpPragma | TokenKind::PpLine | TokenKind::PpDirective => {
                    if !full_mode {
                        out.push(token);
                    }
                    i += 1;
                }
                TokenKind::Eof => {
                    out.push(token);
                    break;
                }
                _ => {
                    out.push(token);
                    i += 1;
                }
            }
        }

        // A non-empty residual stack is a diagnostic, not a crash
        for frame in std::mem::take(&mut self.stack) {
            self.errors.push(PreprocessError::UnterminatedConditional {
                file: self.file.to_string(),
                line: frame.opening_line,
            });
        }

        if out.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            out.push(Token::eof(SourcePos::new(Arc::clone(&self.file), 1, 1, 0)));
        }

        if self.expand_macros {
            let mut expander = MacroExpander::new(&self.macros);
            let expanded = expander.expand(&out);
            let expand_errors = expander.take_errors();
            self.errors.extend(expand_errors);
            return expanded;
        }

        out
    }

    // ========== Conditionals ==========

    fn skipping(&self) -> bool {
        self.stack.iter().any(|frame| !frame.active)
    }

    /// Frames below the top are all active.
    fn enclosing_active(&self) -> bool {
        self.stack.iter().rev().skip(1).all(|frame| frame.active)
    }

    fn handle_conditional(&mut self, token: &Token, full_mode: bool, out: &mut Vec<Token>) {
        match token.kind {
            TokenKind::PpIf => {
                let outer_active = !self.skipping();
                let active =
                    outer_active && self.eval_condition(directive_rest(&token.text, "if"), token);
                self.stack.push(ConditionalFrame {
                    kind: ConditionalKind::If,
                    active,
                    any_taken: active,
                    has_else: false,
                    opening_line: token.pos.line,
                });
                if !full_mode && outer_active {
                    out.push(token.clone());
                }
            }
            TokenKind::PpIfdef | TokenKind::PpIfndef => {
                let negate = token.kind == TokenKind::PpIfndef;
                let keyword = if negate { "ifndef" } else { "ifdef" };
                let outer_active = !self.skipping();
                let name = first_word(directive_rest(&token.text, keyword));
                let defined = match name {
                    Some(name) => self.macros.contains_key(name),
                    None => {
                        self.errors.push(PreprocessError::MalformedDirective {
                            pos: token.pos.clone(),
                            message: format!("expected identifier after #{keyword}"),
                        });
                        false
                    }
                };
                let active = outer_active && (defined != negate);
                self.stack.push(ConditionalFrame {
                    kind: if negate { ConditionalKind::Ifndef } else { ConditionalKind::Ifdef },
                    active,
                    any_taken: active,
                    has_else: false,
                    opening_line: token.pos.line,
                });
                if !full_mode && outer_active {
                    out.push(token.clone());
                }
            }
            TokenKind::PpElif => {
                if self.stack.is_empty() {
                    self.errors.push(PreprocessError::ElifWithoutIf { pos: token.pos.clone() });
                    return;
                }
                let enclosing_active = self.enclosing_active();
                let rest = directive_rest(&token.text, "elif").to_string();
                let top_has_else = self.stack.last().is_some_and(|f| f.has_else);
                if top_has_else {
                    self.errors.push(PreprocessError::ElifAfterElse { pos: token.pos.clone() });
                    return;
                }
                let top_any_taken = self.stack.last().is_some_and(|f| f.any_taken);
                let active = if !top_any_taken && enclosing_active {
                    self.eval_condition(&rest, token)
                } else {
                    false
                };
                if let Some(top) = self.stack.last_mut() {
                    top.active = active;
                    if active {
                        top.any_taken = true;
                    }
                    top.kind = ConditionalKind::Elif;
                }
                if !full_mode && enclosing_active {
                    out.push(token.clone());
                }
            }
            TokenKind::PpElse => {
                if self.stack.is_empty() {
                    self.errors.push(PreprocessError::ElseWithoutIf { pos: token.pos.clone() });
                    return;
                }
                let enclosing_active = self.enclosing_active();
                if let Some(top) = self.stack.last_mut() {
                    if top.has_else {
                        self.errors
                            .push(PreprocessError::MultipleElse { pos: token.pos.clone() });
                        return;
                    }
                    // `#else` activates iff no branch has been taken
                    top.active = !top.any_taken;
                    top.any_taken = true;
                    top.has_else = true;
                    top.kind = ConditionalKind::Else;
                }
                if !full_mode && enclosing_active {
                    out.push(token.clone());
                }
            }
            TokenKind::PpEndif => {
                if self.stack.pop().is_none() {
                    self.errors.push(PreprocessError::EndifWithoutIf { pos: token.pos.clone() });
                    return;
                }
                if !full_mode && !self.skipping() {
                    out.push(token.clone());
                }
            }
            _ => {}
        }
    }

    /// Evaluate an `#if`/`#elif` condition: fold `defined`, macro-expand,
    /// then run the constant evaluator.
    fn eval_condition(&mut self, condition: &str, directive: &Token) -> bool {
        let mut tokens = Lexer::new(condition, Arc::clone(&self.file)).tokenize();
        tokens.pop(); // EOF
        for token in &mut tokens {
            token.pos =
                SourcePos::new(Arc::clone(&self.file), directive.pos.line, token.pos.column, 0);
        }

        let folded = self.fold_defined(&tokens);

        let mut expander = MacroExpander::new(&self.macros);
        let expanded = expander.expand(&folded);
        let expand_errors = expander.take_errors();
        self.errors.extend(expand_errors);

        match cond::evaluate(&expanded) {
            Ok(value) => value != 0,
            Err(err) => {
                self.errors.push(PreprocessError::BadConditionalExpression {
                    pos: directive.pos.clone(),
                    message: err.to_string(),
                });
                false
            }
        }
    }

    /// Replace `defined(X)` and `defined X` with `1`/`0` before macro
    /// expansion, so the operand itself is not expanded.
    fn fold_defined(&self, tokens: &[Token]) -> Vec<Token> {
        let mut result = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if token.kind == TokenKind::Identifier && &*token.text == "defined" {
                let (name, consumed) = if tokens.get(i + 1).map(|t| t.kind)
                    == Some(TokenKind::LeftParen)
                    && tokens.get(i + 2).map(|t| t.kind) == Some(TokenKind::Identifier)
                    && tokens.get(i + 3).map(|t| t.kind) == Some(TokenKind::RightParen)
                {
                    (Some(tokens[i + 2].text.to_string()), 4)
                } else if tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::Identifier) {
                    (Some(tokens[i + 1].text.to_string()), 2)
                } else {
                    (None, 1)
                };

                match name {
                    Some(name) => {
                        let value = if self.macros.contains_key(&name) { "1" } else { "0" };
                        result.push(Token::new(
                            TokenKind::IntegerLiteral,
                            value,
                            token.pos.clone(),
                        ));
                        i += consumed;
                    }
                    None => {
                        result.push(token.clone());
                        i += 1;
                    }
                }
            } else {
                result.push(token.clone());
                i += 1;
            }
        }
        result
    }

    // ========== #define / #undef ==========

    fn handle_define(&mut self, token: &Token) {
        let rest = directive_rest(&token.text, "define");
        let bytes = rest.as_bytes();
        let mut pos = 0;

        let name_start = pos;
        while pos < bytes.len() && is_macro_name_byte(bytes[pos]) {
            pos += 1;
        }
        let name = &rest[name_start..pos];
        if name.is_empty() {
            self.errors.push(PreprocessError::MalformedDirective {
                pos: token.pos.clone(),
                message: "expected identifier after #define".to_string(),
            });
            return;
        }

        let mut def = MacroDef {
            name: name.to_string(),
            is_function_like: false,
            params: Vec::new(),
            is_variadic: false,
            replacement: Vec::new(),
            file: Arc::clone(&self.file),
            line: token.pos.line,
        };

        // A '(' immediately after the name (no whitespace) makes the macro
        // function-like.
        if pos < bytes.len() && bytes[pos] == b'(' {
            def.is_function_like = true;
            pos += 1;
            loop {
                while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                if pos >= bytes.len() || bytes[pos] == b')' {
                    break;
                }
                if rest[pos..].starts_with("...") {
                    def.is_variadic = true;
                    def.params.push("__VA_ARGS__".to_string());
                    pos += 3;
                    break;
                }
                let param_start = pos;
                while pos < bytes.len() && is_macro_name_byte(bytes[pos]) {
                    pos += 1;
                }
                if pos > param_start {
                    def.params.push(rest[param_start..pos].to_string());
                }
                while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                    pos += 1;
                }
                if pos < bytes.len() && bytes[pos] == b',' {
                    pos += 1;
                }
            }
            while pos < bytes.len() && bytes[pos] != b')' {
                pos += 1;
            }
            if pos < bytes.len() {
                pos += 1; // )
            }
        }

        let replacement = rest[pos..].trim_start();
        def.replacement = lex_replacement(replacement, &self.file, token.pos.line);

        debug!(name = %def.name, function_like = def.is_function_like, "defined macro");
        self.macros.insert(def.name.clone(), def);
    }

    fn handle_undef(&mut self, token: &Token) {
        let rest = directive_rest(&token.text, "undef");
        match first_word(rest) {
            Some(name) => {
                self.macros.remove(name);
            }
            None => {
                self.errors.push(PreprocessError::MalformedDirective {
                    pos: token.pos.clone(),
                    message: "expected identifier after #undef".to_string(),
                });
            }
        }
    }

    // ========== #include ==========

    fn handle_include(&mut self, token: &Token) -> Option<Vec<Token>> {
        let rest = directive_rest(&token.text, "include");
        let rest = rest.trim_start();

        let parsed = if let Some(inner) = rest.strip_prefix('<') {
            inner.find('>').map(|end| (&inner[..end], true))
        } else if let Some(inner) = rest.strip_prefix('"') {
            inner.find('"').map(|end| (&inner[..end], false))
        } else {
            None
        };
        let Some((name, is_system)) = parsed else {
            self.errors.push(PreprocessError::MalformedDirective {
                pos: token.pos.clone(),
                message: "expected \"...\" or <...> after #include".to_string(),
            });
            return None;
        };

        // Skip system headers unless explicitly enabled
        if is_system && !self.expand_system_includes {
            return None;
        }

        let Some(path) = self.resolve_include(name, is_system) else {
            warn!(name, "include file not found");
            self.errors.push(PreprocessError::IncludeNotFound {
                pos: token.pos.clone(),
                name: name.to_string(),
            });
            return None;
        };

        // Second inclusion of the same file in this translation unit is a
        // no-op.
        if !self.included.insert(path.clone()) {
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => {
                self.errors.push(PreprocessError::IncludeReadFailure {
                    pos: token.pos.clone(),
                    path: path.display().to_string(),
                });
                return None;
            }
        };

        debug!(path = %path.display(), "splicing include");
        let (mut tokens, lex_errors) =
            Lexer::new(&content, path.display().to_string()).tokenize_with_errors();
        self.lex_errors.extend(lex_errors);
        if tokens.last().map(|t| t.kind) == Some(TokenKind::Eof) {
            tokens.pop();
        }
        Some(tokens)
    }

    fn resolve_include(&self, name: &str, is_system: bool) -> Option<PathBuf> {
        if !is_system {
            if let Some(dir) = Path::new(&*self.file).parent() {
                let candidate = dir.join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }

        for include_path in &self.include_paths {
            let candidate = include_path.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }

        if self.expand_system_includes {
            for system_path in ["/usr/include", "/usr/local/include"] {
                let candidate = Path::new(system_path).join(name);
                if candidate.exists() {
                    return Some(candidate);
                }
            }
        }

        None
    }

    // ========== Predefined macros ==========

    fn define_predefined_macros(&mut self) {
        let file_literal = format!("\"{}\"", self.file);
        let predefined: [(&str, TokenKind, String); 6] = [
            ("__FILE__", TokenKind::StringLiteral, file_literal),
            // Placeholder; uses are re-evaluated lazily by the expander
            ("__LINE__", TokenKind::IntegerLiteral, "1".to_string()),
            ("__DATE__", TokenKind::StringLiteral, "\"??? ?? ????\"".to_string()),
            ("__TIME__", TokenKind::StringLiteral, "\"??:??:??\"".to_string()),
            ("__cplusplus", TokenKind::IntegerLiteral, "201703L".to_string()),
            ("__STDC_HOSTED__", TokenKind::IntegerLiteral, "1".to_string()),
        ];

        for (name, kind, text) in predefined {
            let def = MacroDef {
                name: name.to_string(),
                is_function_like: false,
                params: Vec::new(),
                is_variadic: false,
                replacement: vec![Token::new(
                    kind,
                    text,
                    SourcePos::new(Arc::clone(&self.file), 0, 0, 0),
                )],
                file: Arc::clone(&self.file),
                line: 0,
            };
            self.macros.insert(def.name.clone(), def);
        }
    }
}

/// Lex a macro replacement text into replacement tokens, turning top-level
/// `#` and `##` into `MacroStringify` / `MacroConcat` markers. Quoted
/// sections are respected so a `#` inside a string literal stays literal.
pub fn lex_replacement(text: &str, file: &Arc<str>, line: u32) -> Vec<Token> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        if bytes[i] == b'#' {
            let pos = SourcePos::new(Arc::clone(file), line, i as u32 + 1, i as u32);
            if i + 1 < bytes.len() && bytes[i + 1] == b'#' {
                tokens.push(Token::new(TokenKind::MacroConcat, "##", pos));
                i += 2;
            } else {
                tokens.push(Token::new(TokenKind::MacroStringify, "#", pos));
                i += 1;
            }
            continue;
        }

        // Chunk until the next top-level '#'
        let start = i;
        let mut quote: Option<u8> = None;
        while i < bytes.len() {
            let c = bytes[i];
            if let Some(q) = quote {
                if c == b'\\' {
                    i += 2;
                    continue;
                }
                if c == q {
                    quote = None;
                }
            } else if c == b'"' || c == b'\'' {
                quote = Some(c);
            } else if c == b'#' {
                break;
            }
            i += 1;
        }

        let chunk = &text[start..i.min(text.len())];
        let mut chunk_tokens = Lexer::new(chunk, Arc::clone(file)).tokenize();
        chunk_tokens.pop(); // EOF
        for mut token in chunk_tokens {
            token.pos = SourcePos::new(
                Arc::clone(file),
                line,
                start as u32 + token.pos.column,
                start as u32 + token.pos.offset,
            );
            tokens.push(token);
        }
    }

    tokens
}

/// The directive text after `#`, optional whitespace, and `keyword`.
fn directive_rest<'t>(text: &'t str, keyword: &str) -> &'t str {
    let Some(at) = text.find(keyword) else { return "" };
    text[at + keyword.len()..].trim_start()
}

fn first_word(text: &str) -> Option<&str> {
    let trimmed = text.trim_start();
    let end = trimmed
        .as_bytes()
        .iter()
        .position(|&b| !is_macro_name_byte(b))
        .unwrap_or(trimmed.len());
    if end == 0 { None } else { Some(&trimmed[..end]) }
}

fn is_macro_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
