//! Macro expansion.
//!
//! Expands object-like and function-like macro uses against a macro table,
//! handling argument substitution, stringification (`#`), token pasting
//! (`##`), `__VA_ARGS__`, and self-reference suppression: a macro name on
//! the currently-expanding stack is never expanded again, so `#define X X`
//! leaves `X` untouched and expansion terminates on any input.

use std::sync::Arc;

use cclint_token::{Token, TokenKind, keyword_from_str};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{MacroDef, PreprocessError};

/// Expands macro uses in a token sequence.
pub struct MacroExpander<'a> {
    macros: &'a FxHashMap<String, MacroDef>,
    /// Names currently being expanded; suppresses recursive expansion
    expanding: FxHashSet<String>,
    errors: Vec<PreprocessError>,
}

impl<'a> MacroExpander<'a> {
    pub fn new(macros: &'a FxHashMap<String, MacroDef>) -> Self {
        MacroExpander { macros, expanding: FxHashSet::default(), errors: Vec::new() }
    }

    /// Errors recorded across all `expand` calls on this expander.
    pub fn errors(&self) -> &[PreprocessError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<PreprocessError> {
        std::mem::take(&mut self.errors)
    }

    /// Expand every macro use in `tokens`.
    pub fn expand(&mut self, tokens: &[Token]) -> Vec<Token> {
        let mut result = Vec::with_capacity(tokens.len());
        let mut index = 0;

        while index < tokens.len() {
            let token = &tokens[index];
            if self.is_expandable(token) {
                let expanded = self.expand_macro(token, tokens, &mut index);
                result.extend(expanded);
            } else {
                result.push(token.clone());
                index += 1;
            }
        }

        result
    }

    fn is_expandable(&self, token: &Token) -> bool {
        token.kind == TokenKind::Identifier
            && !self.expanding.contains(&*token.text)
            && (self.macros.contains_key(&*token.text) || &*token.text == "__LINE__")
    }

    fn expand_macro(
        &mut self,
        macro_token: &Token,
        tokens: &[Token],
        index: &mut usize,
    ) -> Vec<Token> {
        // `__LINE__` re-evaluates lazily at the invocation site, overriding
        // the placeholder table entry that exists for `defined()`
        if &*macro_token.text == "__LINE__" {
            *index += 1;
            let line = macro_token.pos.line.to_string();
            return vec![Token::new(
                TokenKind::IntegerLiteral,
                line,
                macro_token.pos.clone(),
            )];
        }

        let Some(def) = self.macros.get(&*macro_token.text) else {
            *index += 1;
            return vec![macro_token.clone()];
        };

        self.expanding.insert(def.name.clone());
        let result = if def.is_function_like {
            self.expand_function_like(def, macro_token, tokens, index)
        } else {
            *index += 1;
            let substituted = def.replacement.clone();
            self.rescan(&substituted)
        };
        self.expanding.remove(&*macro_token.text);

        result
    }

    fn expand_function_like(
        &mut self,
        def: &MacroDef,
        macro_token: &Token,
        tokens: &[Token],
        index: &mut usize,
    ) -> Vec<Token> {
        // Skip the macro name; a use without '(' is a plain identifier
        let mut cursor = *index + 1;
        if tokens.get(cursor).map(|t| t.kind) != Some(TokenKind::LeftParen) {
            *index += 1;
            return vec![macro_token.clone()];
        }

        let arguments = parse_arguments(tokens, &mut cursor);
        *index = cursor;

        let min_args = if def.is_variadic { def.params.len() - 1 } else { def.params.len() };
        let arity_ok = if def.is_variadic {
            arguments.len() >= min_args
        } else {
            arguments.len() == def.params.len()
        };
        if !arity_ok {
            self.errors.push(PreprocessError::MacroArityMismatch {
                pos: macro_token.pos.clone(),
                name: def.name.clone(),
                expected: min_args,
                actual: arguments.len(),
            });
            return vec![macro_token.clone()];
        }

        let substituted = self.substitute(def, &arguments);
        self.rescan(&substituted)
    }

    /// Replace parameters with their (pre-expanded) arguments, apply `#`
    /// stringification, and paste around `##`.
    fn substitute(&mut self, def: &MacroDef, arguments: &[Vec<Token>]) -> Vec<Token> {
        let mut arg_map: FxHashMap<&str, Vec<Token>> = FxHashMap::default();
        for (param, arg) in def.params.iter().zip(arguments.iter()) {
            arg_map.insert(param.as_str(), arg.clone());
        }

        // Trailing arguments of a variadic use are re-joined with commas
        // and bound to `__VA_ARGS__`.
        if def.is_variadic && arguments.len() >= def.params.len() {
            let first_variadic = def.params.len() - 1;
            let mut va_args = Vec::new();
            for (i, arg) in arguments.iter().enumerate().skip(first_variadic) {
                if i > first_variadic {
                    va_args.push(Token::new(
                        TokenKind::Comma,
                        ",",
                        arg.first().map_or_else(
                            || cclint_token::SourcePos::invalid(),
                            |t| t.pos.clone(),
                        ),
                    ));
                }
                va_args.extend(arg.iter().cloned());
            }
            arg_map.insert("__VA_ARGS__", va_args);
        }

        let mut result = Vec::new();
        let mut i = 0;
        while i < def.replacement.len() {
            let token = &def.replacement[i];

            // `#param` stringifies the raw argument tokens
            if token.kind == TokenKind::MacroStringify {
                if let Some(next) = def.replacement.get(i + 1) {
                    if let Some(arg) = arg_map.get(&*next.text) {
                        result.push(stringify(arg, &token.pos));
                        i += 2;
                        continue;
                    }
                }
                result.push(token.clone());
                i += 1;
                continue;
            }

            // `##` markers survive substitution and are resolved below
            if token.kind == TokenKind::MacroConcat {
                result.push(token.clone());
                i += 1;
                continue;
            }

            if token.kind == TokenKind::Identifier {
                if let Some(arg) = arg_map.get(&*token.text) {
                    let arg = arg.clone();
                    let expanded = self.rescan(&arg);
                    result.extend(expanded);
                    i += 1;
                    continue;
                }
            }

            result.push(token.clone());
            i += 1;
        }

        self.paste(&result)
    }

    /// Resolve `##` by textually pasting the neighboring tokens.
    fn paste(&mut self, tokens: &[Token]) -> Vec<Token> {
        let mut result: Vec<Token> = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if token.kind == TokenKind::MacroConcat {
                let Some(left) = result.pop() else {
                    self.errors
                        .push(PreprocessError::BadTokenPaste { pos: token.pos.clone() });
                    i += 1;
                    continue;
                };
                let Some(right) = tokens.get(i + 1) else {
                    self.errors
                        .push(PreprocessError::BadTokenPaste { pos: token.pos.clone() });
                    result.push(left);
                    i += 1;
                    continue;
                };
                result.push(paste_two(&left, right));
                i += 2;
            } else {
                result.push(token.clone());
                i += 1;
            }
        }
        result
    }

    /// Re-scan substituted tokens for further expansion; the expanding set
    /// carried on `self` prevents cycles.
    fn rescan(&mut self, tokens: &[Token]) -> Vec<Token> {
        let mut result = Vec::with_capacity(tokens.len());
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            if self.is_expandable(token) {
                let expanded = self.expand_macro(token, tokens, &mut index);
                result.extend(expanded);
            } else {
                result.push(token.clone());
                index += 1;
            }
        }
        result
    }
}

/// Parse the parenthesized argument list at `cursor` (which points at the
/// opening parenthesis). Boundaries are top-level commas; nested
/// parentheses are tracked by depth. Leaves `cursor` past the closing `)`.
fn parse_arguments(tokens: &[Token], cursor: &mut usize) -> Vec<Vec<Token>> {
    let mut arguments: Vec<Vec<Token>> = Vec::new();
    let mut current: Vec<Token> = Vec::new();
    let mut depth = 0usize;

    *cursor += 1; // (
    while *cursor < tokens.len() {
        let token = &tokens[*cursor];
        match token.kind {
            TokenKind::LeftParen => {
                depth += 1;
                current.push(token.clone());
            }
            TokenKind::RightParen => {
                if depth == 0 {
                    if !current.is_empty() || !arguments.is_empty() {
                        arguments.push(current);
                    }
                    *cursor += 1;
                    return arguments;
                }
                depth -= 1;
                current.push(token.clone());
            }
            TokenKind::Comma if depth == 0 => {
                arguments.push(std::mem::take(&mut current));
            }
            TokenKind::Eof => break,
            _ => current.push(token.clone()),
        }
        *cursor += 1;
    }

    // Unbalanced call; return what was collected
    if !current.is_empty() {
        arguments.push(current);
    }
    arguments
}

/// Build the string literal for `#arg`: token texts joined by single
/// spaces, with `"` and `\` escaped.
fn stringify(tokens: &[Token], pos: &cclint_token::SourcePos) -> Token {
    let mut inner = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            inner.push(' ');
        }
        for c in token.text.chars() {
            if c == '"' || c == '\\' {
                inner.push('\\');
            }
            inner.push(c);
        }
    }

    let value: String = tokens
        .iter()
        .map(|t| t.text.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let mut text = String::with_capacity(inner.len() + 2);
    text.push('"');
    text.push_str(&inner);
    text.push('"');

    Token::with_value(TokenKind::StringLiteral, text, value, pos.clone())
}

/// Paste two tokens into one, re-classifying the result: an identifier on
/// either side makes the paste an identifier (or keyword, if the spelling
/// now matches one); two integers stay an integer; anything else keeps the
/// left kind.
fn paste_two(left: &Token, right: &Token) -> Token {
    let text: Arc<str> = Arc::from(format!("{}{}", left.text, right.text));

    let kind = if left.kind == TokenKind::Identifier || right.kind == TokenKind::Identifier {
        keyword_from_str(&text)
    } else if left.kind == TokenKind::IntegerLiteral && right.kind == TokenKind::IntegerLiteral {
        TokenKind::IntegerLiteral
    } else {
        left.kind
    };

    let mut token = Token::new(kind, text, left.pos.clone());
    token.has_space_before = left.has_space_before;
    token.at_line_start = left.at_line_start;
    token
}

#[cfg(test)]
mod tests {
    use super::*;
    use cclint_lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn lex(src: &str) -> Vec<Token> {
        let mut tokens = Lexer::new(src, "<test>").tokenize();
        tokens.pop(); // EOF
        tokens
    }

    fn replacement(body: &str) -> Vec<Token> {
        crate::lex_replacement(body, &Arc::from("<test>"), 1)
    }

    fn table(defs: &[(&str, &str)]) -> FxHashMap<String, MacroDef> {
        let mut macros = FxHashMap::default();
        for (name, body) in defs {
            macros.insert(
                (*name).to_string(),
                MacroDef {
                    name: (*name).to_string(),
                    is_function_like: false,
                    params: Vec::new(),
                    is_variadic: false,
                    replacement: replacement(body),
                    file: "<test>".into(),
                    line: 1,
                },
            );
        }
        macros
    }

    fn fn_macro(name: &str, params: &[&str], variadic: bool, body: &str) -> MacroDef {
        MacroDef {
            name: name.to_string(),
            is_function_like: true,
            params: params.iter().map(|p| (*p).to_string()).collect(),
            is_variadic: variadic,
            replacement: replacement(body),
            file: "<test>".into(),
            line: 1,
        }
    }

    fn texts(tokens: &[Token]) -> Vec<String> {
        tokens.iter().map(|t| t.text.to_string()).collect()
    }

    #[test]
    fn test_object_like_expansion() {
        let macros = table(&[("MAX", "100")]);
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("int x = MAX;"));
        assert_eq!(texts(&out), ["int", "x", "=", "100", ";"]);
    }

    #[test]
    fn test_self_reference_stays_put() {
        let macros = table(&[("X", "X")]);
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("X"));
        assert_eq!(texts(&out), ["X"]);
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let macros = table(&[("A", "B"), ("B", "A")]);
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("A"));
        // A -> B -> A (suppressed): the cycle stops at the re-entry
        assert_eq!(texts(&out), ["A"]);
    }

    #[test]
    fn test_nested_function_like_expansion() {
        let mut macros = FxHashMap::default();
        macros.insert("SQUARE".to_string(), fn_macro("SQUARE", &["x"], false, "((x)*(x))"));
        macros.insert(
            "CUBE".to_string(),
            fn_macro("CUBE", &["x"], false, "((x) * SQUARE(x))"),
        );
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("CUBE(3)"));
        let threes = out.iter().filter(|t| &*t.text == "3").count();
        assert_eq!(threes, 3, "expected exactly three '3' tokens in {:?}", texts(&out));
    }

    #[test]
    fn test_function_like_without_parens_is_identifier() {
        let mut macros = FxHashMap::default();
        macros.insert("F".to_string(), fn_macro("F", &["a"], false, "a + 1"));
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("int F ;"));
        assert_eq!(texts(&out), ["int", "F", ";"]);
    }

    #[test]
    fn test_arity_mismatch_reported() {
        let mut macros = FxHashMap::default();
        macros.insert("PAIR".to_string(), fn_macro("PAIR", &["a", "b"], false, "a b"));
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("PAIR(1)"));
        assert_eq!(texts(&out), ["PAIR"]);
        assert!(matches!(
            expander.errors()[0],
            PreprocessError::MacroArityMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn test_stringify() {
        let mut macros = FxHashMap::default();
        macros.insert("STR".to_string(), fn_macro("STR", &["x"], false, "#x"));
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("STR(a + b)"));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind, TokenKind::StringLiteral);
        assert_eq!(&*out[0].text, "\"a + b\"");
    }

    #[test]
    fn test_stringify_escapes_quotes_and_backslashes() {
        let mut macros = FxHashMap::default();
        macros.insert("STR".to_string(), fn_macro("STR", &["x"], false, "#x"));
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("STR(\"hi\")"));
        assert_eq!(&*out[0].text, "\"\\\"hi\\\"\"");
    }

    #[test]
    fn test_token_paste_makes_identifier() {
        let mut macros = FxHashMap::default();
        macros.insert("GLUE".to_string(), fn_macro("GLUE", &["a", "b"], false, "a##b"));
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("int GLUE(x,1) = 2;"));
        assert_eq!(texts(&out), ["int", "x1", "=", "2", ";"]);
        assert_eq!(out[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_variadic_va_args() {
        let mut macros = FxHashMap::default();
        macros.insert(
            "LOG".to_string(),
            fn_macro("LOG", &["fmt", "__VA_ARGS__"], true, "printf(fmt, __VA_ARGS__)"),
        );
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("LOG(\"%d %d\", 1, 2)"));
        assert_eq!(
            texts(&out),
            ["printf", "(", "\"%d %d\"", ",", "1", ",", "2", ")"]
        );
    }

    #[test]
    fn test_argument_with_nested_parens() {
        let mut macros = FxHashMap::default();
        macros.insert("ID".to_string(), fn_macro("ID", &["x"], false, "x"));
        let mut expander = MacroExpander::new(&macros);
        let out = expander.expand(&lex("ID(f(a, b))"));
        assert_eq!(texts(&out), ["f", "(", "a", ",", "b", ")"]);
    }
}
