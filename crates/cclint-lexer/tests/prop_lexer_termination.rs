use cclint_lexer::Lexer;
use cclint_token::TokenKind;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn lexer_terminates_without_panics(s in ".{0,300}") {
        // This test ensures:
        // 1. The lexer never panics (no underflows, no slice bounds errors)
        // 2. The lexer always terminates with exactly one trailing EOF

        let tokens = Lexer::new(&s, "fuzz.cpp").tokenize();

        prop_assert!(!tokens.is_empty());
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        let eof_count = tokens.iter().filter(|t| t.kind == TokenKind::Eof).count();
        prop_assert_eq!(eof_count, 1);
    }

    #[test]
    fn all_tokens_have_valid_positions(s in "[ -~\\n]{0,200}") {
        let tokens = Lexer::new(&s, "fuzz.cpp").tokenize();

        for token in &tokens {
            if token.kind == TokenKind::Eof {
                continue;
            }
            prop_assert!(token.pos.line >= 1, "token {:?} has line 0", token.text);
            prop_assert!(token.pos.column >= 1, "token {:?} has column 0", token.text);
        }
    }

    #[test]
    fn token_texts_cover_non_whitespace_input(s in "[a-z0-9+*();{} \\n]{0,200}") {
        // Concatenating token texts reproduces the input modulo whitespace
        let tokens = Lexer::new(&s, "fuzz.cpp").tokenize();
        let mut rebuilt = String::new();
        for token in &tokens {
            rebuilt.push_str(&token.text);
        }
        let stripped: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        prop_assert_eq!(rebuilt, stripped);
    }
}
