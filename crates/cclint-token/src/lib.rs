//! C++ Token Definitions
//!
//! This crate provides the shared token definitions used by the cclint lexer,
//! preprocessor, and parser.

use std::sync::Arc;

mod pos;

pub use pos::{SourcePos, SourceSpan};

/// Token produced by the lexer and consumed by the preprocessor and parser.
///
/// Stores the token kind, original source text, the decoded value (escape
/// sequences resolved for string and character literals), and the source
/// position. Text is kept in an `Arc<str>` so macro-argument buffering and
/// lookahead can clone tokens cheaply.
///
/// The two adjacency flags are what the preprocessor needs to re-parse
/// directive lines and to distinguish `MACRO (x)` from `MACRO(x)`:
/// `has_space_before` records that skipped whitespace preceded the token and
/// `at_line_start` records that the token is the first on its physical line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token classification for parser decision making
    pub kind: TokenKind,
    /// Original source text for precise reconstruction
    pub text: Arc<str>,
    /// Decoded value (escape-processed literal content); equals `text` otherwise
    pub value: Arc<str>,
    /// Position of the first byte of the token
    pub pos: SourcePos,
    /// Whitespace (or a comment) immediately precedes this token
    pub has_space_before: bool,
    /// This token is the first non-whitespace token on its line
    pub at_line_start: bool,
}

impl Token {
    /// Create a new token whose value equals its text.
    pub fn new(kind: TokenKind, text: impl Into<Arc<str>>, pos: SourcePos) -> Self {
        let text = text.into();
        Token {
            kind,
            value: Arc::clone(&text),
            text,
            pos,
            has_space_before: false,
            at_line_start: false,
        }
    }

    /// Create a token with a decoded value distinct from its source text.
    pub fn with_value(
        kind: TokenKind,
        text: impl Into<Arc<str>>,
        value: impl Into<Arc<str>>,
        pos: SourcePos,
    ) -> Self {
        Token {
            kind,
            text: text.into(),
            value: value.into(),
            pos,
            has_space_before: false,
            at_line_start: false,
        }
    }

    /// The EOF sentinel for the given position.
    pub fn eof(pos: SourcePos) -> Self {
        Token {
            kind: TokenKind::Eof,
            text: Arc::from(""),
            value: Arc::from(""),
            pos,
            has_space_before: false,
            at_line_start: false,
        }
    }

    /// True for the EOF sentinel.
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// True for any preprocessor directive token (`#include` through
    /// `#line`, plus the catch-all `PpDirective`).
    pub fn is_directive(&self) -> bool {
        self.kind.is_directive()
    }

    /// True for line and block comments.
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

/// Token classification covering the full C++17 surface plus the
/// preprocessor-level kinds the linter needs (`#`/`##` markers, directive
/// kinds, attribute brackets, comments).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of file sentinel
    Eof,

    // ===== Keywords =====
    Alignas,
    Alignof,
    Asm,
    Auto,
    Bool,
    Break,
    Case,
    Catch,
    Char,
    Char8T,
    Char16T,
    Char32T,
    Class,
    Const,
    Consteval,
    Constexpr,
    Constinit,
    ConstCast,
    Continue,
    CoAwait,
    CoReturn,
    CoYield,
    Decltype,
    Default,
    Delete,
    Do,
    Double,
    DynamicCast,
    Else,
    Enum,
    Explicit,
    Export,
    Extern,
    False,
    Float,
    For,
    Friend,
    Goto,
    If,
    Inline,
    Int,
    Long,
    Mutable,
    Namespace,
    New,
    Noexcept,
    Nullptr,
    Operator,
    Private,
    Protected,
    Public,
    Register,
    ReinterpretCast,
    Requires,
    Return,
    Short,
    Signed,
    Sizeof,
    Static,
    StaticAssert,
    StaticCast,
    Struct,
    Switch,
    Template,
    This,
    ThreadLocal,
    Throw,
    True,
    Try,
    Typedef,
    Typeid,
    Typename,
    Union,
    Unsigned,
    Using,
    Virtual,
    Void,
    Volatile,
    WcharT,
    While,
    /// Contextual keyword `concept` (C++20)
    Concept,

    // ===== Operators =====
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `++`
    PlusPlus,
    /// `--`
    MinusMinus,
    /// `==`
    EqualEqual,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<=>` (C++20)
    Spaceship,
    /// `&&`
    AmpAmp,
    /// `||`
    PipePipe,
    /// `!`
    Bang,
    /// `&`
    Amp,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `~`
    Tilde,
    /// `<<`
    LessLess,
    /// `>>`
    GreaterGreater,
    /// `=`
    Equal,
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    StarEqual,
    /// `/=`
    SlashEqual,
    /// `%=`
    PercentEqual,
    /// `&=`
    AmpEqual,
    /// `|=`
    PipeEqual,
    /// `^=`
    CaretEqual,
    /// `<<=`
    LessLessEqual,
    /// `>>=`
    GreaterGreaterEqual,
    /// `.`
    Dot,
    /// `->`
    Arrow,
    /// `.*`
    DotStar,
    /// `->*`
    ArrowStar,
    /// `::`
    ColonColon,
    /// `?`
    Question,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `...`
    Ellipsis,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,

    // ===== Identifiers and literals =====
    Identifier,
    /// `123`, `0x7F`, `0b1010`, `042`, `1'000'000`
    IntegerLiteral,
    /// `3.14`, `1e-5`, `0x1.2p3`
    FloatingLiteral,
    /// `'a'`, `'\n'`
    CharLiteral,
    /// `L'a'`
    WideCharLiteral,
    /// `u8'a'` (C++17)
    Utf8CharLiteral,
    /// `u'a'`
    Utf16CharLiteral,
    /// `U'a'`
    Utf32CharLiteral,
    /// `"hello"`
    StringLiteral,
    /// `L"hello"`
    WideStringLiteral,
    /// `u8"hello"`
    Utf8StringLiteral,
    /// `u"hello"`
    Utf16StringLiteral,
    /// `U"hello"`
    Utf32StringLiteral,
    /// `R"(raw)"` with any encoding prefix
    RawStringLiteral,
    /// `123_km`, `"hello"_s`
    UserDefinedLiteral,

    // ===== Preprocessor =====
    /// Unclassified `#...` directive
    PpDirective,
    PpInclude,
    PpDefine,
    PpUndef,
    PpIf,
    PpIfdef,
    PpIfndef,
    PpElif,
    PpElse,
    PpEndif,
    PpPragma,
    PpError,
    PpWarning,
    PpLine,
    /// `#` inside a macro replacement list (stringification)
    MacroStringify,
    /// `##` inside a macro replacement list (token pasting)
    MacroConcat,

    // ===== Comments =====
    LineComment,
    BlockComment,

    // ===== Attributes =====
    /// `[[`
    AttributeStart,
    /// `]]`
    AttributeEnd,

    // ===== Special =====
    /// Space or tab run (filtered from the public stream)
    Whitespace,
    /// `\n` (filtered from the public stream)
    Newline,
    /// Byte the lexer could not classify
    Unknown,
}

impl TokenKind {
    /// True for every C++ keyword (including contextual `concept`).
    pub fn is_keyword(self) -> bool {
        keyword_text(self).is_some()
    }

    /// True for operators and punctuation.
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Star
                | TokenKind::Slash
                | TokenKind::Percent
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::EqualEqual
                | TokenKind::NotEqual
                | TokenKind::Less
                | TokenKind::Greater
                | TokenKind::LessEqual
                | TokenKind::GreaterEqual
                | TokenKind::Spaceship
                | TokenKind::AmpAmp
                | TokenKind::PipePipe
                | TokenKind::Bang
                | TokenKind::Amp
                | TokenKind::Pipe
                | TokenKind::Caret
                | TokenKind::Tilde
                | TokenKind::LessLess
                | TokenKind::GreaterGreater
                | TokenKind::Equal
                | TokenKind::PlusEqual
                | TokenKind::MinusEqual
                | TokenKind::StarEqual
                | TokenKind::SlashEqual
                | TokenKind::PercentEqual
                | TokenKind::AmpEqual
                | TokenKind::PipeEqual
                | TokenKind::CaretEqual
                | TokenKind::LessLessEqual
                | TokenKind::GreaterGreaterEqual
                | TokenKind::Dot
                | TokenKind::Arrow
                | TokenKind::DotStar
                | TokenKind::ArrowStar
                | TokenKind::ColonColon
                | TokenKind::Question
                | TokenKind::Colon
                | TokenKind::Semicolon
                | TokenKind::Comma
                | TokenKind::Ellipsis
                | TokenKind::LeftParen
                | TokenKind::RightParen
                | TokenKind::LeftBrace
                | TokenKind::RightBrace
                | TokenKind::LeftBracket
                | TokenKind::RightBracket
        )
    }

    /// True for every literal kind, including user-defined literals.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntegerLiteral
                | TokenKind::FloatingLiteral
                | TokenKind::CharLiteral
                | TokenKind::WideCharLiteral
                | TokenKind::Utf8CharLiteral
                | TokenKind::Utf16CharLiteral
                | TokenKind::Utf32CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::WideStringLiteral
                | TokenKind::Utf8StringLiteral
                | TokenKind::Utf16StringLiteral
                | TokenKind::Utf32StringLiteral
                | TokenKind::RawStringLiteral
                | TokenKind::UserDefinedLiteral
        )
    }

    /// True for any string-literal kind (every encoding, raw included).
    pub fn is_string_literal(self) -> bool {
        matches!(
            self,
            TokenKind::StringLiteral
                | TokenKind::WideStringLiteral
                | TokenKind::Utf8StringLiteral
                | TokenKind::Utf16StringLiteral
                | TokenKind::Utf32StringLiteral
                | TokenKind::RawStringLiteral
        )
    }

    /// True for keywords that can begin or continue a type name.
    pub fn is_type_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Bool
                | TokenKind::Char
                | TokenKind::Char8T
                | TokenKind::Char16T
                | TokenKind::Char32T
                | TokenKind::Double
                | TokenKind::Float
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Short
                | TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::Void
                | TokenKind::WcharT
                | TokenKind::Auto
                | TokenKind::Decltype
        )
    }

    /// True for `static` / `extern` / `thread_local` / `register` / `mutable`.
    pub fn is_storage_class(self) -> bool {
        matches!(
            self,
            TokenKind::Static
                | TokenKind::Extern
                | TokenKind::ThreadLocal
                | TokenKind::Register
                | TokenKind::Mutable
        )
    }

    /// True for `const` / `volatile`.
    pub fn is_cv_qualifier(self) -> bool {
        matches!(self, TokenKind::Const | TokenKind::Volatile)
    }

    /// True for the classified directive kinds and the `PpDirective` catch-all.
    pub fn is_directive(self) -> bool {
        matches!(
            self,
            TokenKind::PpDirective
                | TokenKind::PpInclude
                | TokenKind::PpDefine
                | TokenKind::PpUndef
                | TokenKind::PpIf
                | TokenKind::PpIfdef
                | TokenKind::PpIfndef
                | TokenKind::PpElif
                | TokenKind::PpElse
                | TokenKind::PpEndif
                | TokenKind::PpPragma
                | TokenKind::PpError
                | TokenKind::PpWarning
                | TokenKind::PpLine
        )
    }

    /// True for the conditional-compilation directive kinds.
    pub fn is_conditional_directive(self) -> bool {
        matches!(
            self,
            TokenKind::PpIf
                | TokenKind::PpIfdef
                | TokenKind::PpIfndef
                | TokenKind::PpElif
                | TokenKind::PpElse
                | TokenKind::PpEndif
        )
    }

    /// True for the named cast keywords.
    pub fn is_named_cast(self) -> bool {
        matches!(
            self,
            TokenKind::StaticCast
                | TokenKind::DynamicCast
                | TokenKind::ConstCast
                | TokenKind::ReinterpretCast
        )
    }
}

/// Map an identifier spelling to its keyword kind, or `Identifier` if the
/// word is not a keyword.
pub fn keyword_from_str(word: &str) -> TokenKind {
    match word {
        "alignas" => TokenKind::Alignas,
        "alignof" => TokenKind::Alignof,
        "asm" => TokenKind::Asm,
        "auto" => TokenKind::Auto,
        "bool" => TokenKind::Bool,
        "break" => TokenKind::Break,
        "case" => TokenKind::Case,
        "catch" => TokenKind::Catch,
        "char" => TokenKind::Char,
        "char8_t" => TokenKind::Char8T,
        "char16_t" => TokenKind::Char16T,
        "char32_t" => TokenKind::Char32T,
        "class" => TokenKind::Class,
        "const" => TokenKind::Const,
        "consteval" => TokenKind::Consteval,
        "constexpr" => TokenKind::Constexpr,
        "constinit" => TokenKind::Constinit,
        "const_cast" => TokenKind::ConstCast,
        "continue" => TokenKind::Continue,
        "co_await" => TokenKind::CoAwait,
        "co_return" => TokenKind::CoReturn,
        "co_yield" => TokenKind::CoYield,
        "decltype" => TokenKind::Decltype,
        "default" => TokenKind::Default,
        "delete" => TokenKind::Delete,
        "do" => TokenKind::Do,
        "double" => TokenKind::Double,
        "dynamic_cast" => TokenKind::DynamicCast,
        "else" => TokenKind::Else,
        "enum" => TokenKind::Enum,
        "explicit" => TokenKind::Explicit,
        "export" => TokenKind::Export,
        "extern" => TokenKind::Extern,
        "false" => TokenKind::False,
        "float" => TokenKind::Float,
        "for" => TokenKind::For,
        "friend" => TokenKind::Friend,
        "goto" => TokenKind::Goto,
        "if" => TokenKind::If,
        "inline" => TokenKind::Inline,
        "int" => TokenKind::Int,
        "long" => TokenKind::Long,
        "mutable" => TokenKind::Mutable,
        "namespace" => TokenKind::Namespace,
        "new" => TokenKind::New,
        "noexcept" => TokenKind::Noexcept,
        "nullptr" => TokenKind::Nullptr,
        "operator" => TokenKind::Operator,
        "private" => TokenKind::Private,
        "protected" => TokenKind::Protected,
        "public" => TokenKind::Public,
        "register" => TokenKind::Register,
        "reinterpret_cast" => TokenKind::ReinterpretCast,
        "requires" => TokenKind::Requires,
        "return" => TokenKind::Return,
        "short" => TokenKind::Short,
        "signed" => TokenKind::Signed,
        "sizeof" => TokenKind::Sizeof,
        "static" => TokenKind::Static,
        "static_assert" => TokenKind::StaticAssert,
        "static_cast" => TokenKind::StaticCast,
        "struct" => TokenKind::Struct,
        "switch" => TokenKind::Switch,
        "template" => TokenKind::Template,
        "this" => TokenKind::This,
        "thread_local" => TokenKind::ThreadLocal,
        "throw" => TokenKind::Throw,
        "true" => TokenKind::True,
        "try" => TokenKind::Try,
        "typedef" => TokenKind::Typedef,
        "typeid" => TokenKind::Typeid,
        "typename" => TokenKind::Typename,
        "union" => TokenKind::Union,
        "unsigned" => TokenKind::Unsigned,
        "using" => TokenKind::Using,
        "virtual" => TokenKind::Virtual,
        "void" => TokenKind::Void,
        "volatile" => TokenKind::Volatile,
        "wchar_t" => TokenKind::WcharT,
        "while" => TokenKind::While,
        "concept" => TokenKind::Concept,
        _ => TokenKind::Identifier,
    }
}

/// The spelling of a keyword kind, or `None` for non-keywords.
pub fn keyword_text(kind: TokenKind) -> Option<&'static str> {
    let text = match kind {
        TokenKind::Alignas => "alignas",
        TokenKind::Alignof => "alignof",
        TokenKind::Asm => "asm",
        TokenKind::Auto => "auto",
        TokenKind::Bool => "bool",
        TokenKind::Break => "break",
        TokenKind::Case => "case",
        TokenKind::Catch => "catch",
        TokenKind::Char => "char",
        TokenKind::Char8T => "char8_t",
        TokenKind::Char16T => "char16_t",
        TokenKind::Char32T => "char32_t",
        TokenKind::Class => "class",
        TokenKind::Const => "const",
        TokenKind::Consteval => "consteval",
        TokenKind::Constexpr => "constexpr",
        TokenKind::Constinit => "constinit",
        TokenKind::ConstCast => "const_cast",
        TokenKind::Continue => "continue",
        TokenKind::CoAwait => "co_await",
        TokenKind::CoReturn => "co_return",
        TokenKind::CoYield => "co_yield",
        TokenKind::Decltype => "decltype",
        TokenKind::Default => "default",
        TokenKind::Delete => "delete",
        TokenKind::Do => "do",
        TokenKind::Double => "double",
        TokenKind::DynamicCast => "dynamic_cast",
        TokenKind::Else => "else",
        TokenKind::Enum => "enum",
        TokenKind::Explicit => "explicit",
        TokenKind::Export => "export",
        TokenKind::Extern => "extern",
        TokenKind::False => "false",
        TokenKind::Float => "float",
        TokenKind::For => "for",
        TokenKind::Friend => "friend",
        TokenKind::Goto => "goto",
        TokenKind::If => "if",
        TokenKind::Inline => "inline",
        TokenKind::Int => "int",
        TokenKind::Long => "long",
        TokenKind::Mutable => "mutable",
        TokenKind::Namespace => "namespace",
        TokenKind::New => "new",
        TokenKind::Noexcept => "noexcept",
        TokenKind::Nullptr => "nullptr",
        TokenKind::Operator => "operator",
        TokenKind::Private => "private",
        TokenKind::Protected => "protected",
        TokenKind::Public => "public",
        TokenKind::Register => "register",
        TokenKind::ReinterpretCast => "reinterpret_cast",
        TokenKind::Requires => "requires",
        TokenKind::Return => "return",
        TokenKind::Short => "short",
        TokenKind::Signed => "signed",
        TokenKind::Sizeof => "sizeof",
        TokenKind::Static => "static",
        TokenKind::StaticAssert => "static_assert",
        TokenKind::StaticCast => "static_cast",
        TokenKind::Struct => "struct",
        TokenKind::Switch => "switch",
        TokenKind::Template => "template",
        TokenKind::This => "this",
        TokenKind::ThreadLocal => "thread_local",
        TokenKind::Throw => "throw",
        TokenKind::True => "true",
        TokenKind::Try => "try",
        TokenKind::Typedef => "typedef",
        TokenKind::Typeid => "typeid",
        TokenKind::Typename => "typename",
        TokenKind::Union => "union",
        TokenKind::Unsigned => "unsigned",
        TokenKind::Using => "using",
        TokenKind::Virtual => "virtual",
        TokenKind::Void => "void",
        TokenKind::Volatile => "volatile",
        TokenKind::WcharT => "wchar_t",
        TokenKind::While => "while",
        TokenKind::Concept => "concept",
        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_round_trip() {
        for word in ["class", "constexpr", "co_await", "wchar_t", "concept"] {
            let kind = keyword_from_str(word);
            assert_ne!(kind, TokenKind::Identifier, "{word} should be a keyword");
            assert_eq!(keyword_text(kind), Some(word));
        }
    }

    #[test]
    fn test_non_keyword_is_identifier() {
        assert_eq!(keyword_from_str("classy"), TokenKind::Identifier);
        assert_eq!(keyword_from_str("Overriding"), TokenKind::Identifier);
        // `override` and `final` are contextual identifiers, not keywords
        assert_eq!(keyword_from_str("override"), TokenKind::Identifier);
        assert_eq!(keyword_from_str("final"), TokenKind::Identifier);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(TokenKind::Constexpr.is_keyword());
        assert!(!TokenKind::Identifier.is_keyword());
        assert!(TokenKind::Spaceship.is_operator());
        assert!(TokenKind::RawStringLiteral.is_literal());
        assert!(TokenKind::RawStringLiteral.is_string_literal());
        assert!(!TokenKind::CharLiteral.is_string_literal());
        assert!(TokenKind::Decltype.is_type_keyword());
        assert!(TokenKind::ThreadLocal.is_storage_class());
        assert!(TokenKind::Volatile.is_cv_qualifier());
        assert!(TokenKind::PpIfdef.is_directive());
        assert!(TokenKind::PpIfdef.is_conditional_directive());
        assert!(TokenKind::PpInclude.is_directive());
        assert!(!TokenKind::PpInclude.is_conditional_directive());
        assert!(TokenKind::ReinterpretCast.is_named_cast());
    }

    #[test]
    fn test_eof_sentinel() {
        let eof = Token::eof(SourcePos::invalid());
        assert!(eof.is_eof());
        assert_eq!(&*eof.text, "");
        assert!(!eof.pos.is_valid());
    }
}
