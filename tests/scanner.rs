#[cfg(test)]
mod scanner_tests {
    use rox::error::LoxError;
    use rox::scanner::*;
    use rox::token::*;

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_symbols() {
        assert_token_sequence(
            "({*.,+*})",
            &[
                (TokenType::LEFT_PAREN, "("),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::STAR, "*"),
                (TokenType::DOT, "."),
                (TokenType::COMMA, ","),
                (TokenType::PLUS, "+"),
                (TokenType::STAR, "*"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators_and_comments() {
        assert_token_sequence(
            "!= == <= >= < > = ! / // trailing comment\n-",
            &[
                (TokenType::BANG_EQUAL, "!="),
                (TokenType::EQUAL_EQUAL, "=="),
                (TokenType::LESS_EQUAL, "<="),
                (TokenType::GREATER_EQUAL, ">="),
                (TokenType::LESS, "<"),
                (TokenType::GREATER, ">"),
                (TokenType::EQUAL, "="),
                (TokenType::BANG, "!"),
                (TokenType::SLASH, "/"),
                (TokenType::MINUS, "-"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_03_keywords_and_identifiers() {
        assert_token_sequence(
            "class Foo < Bar { init() { this.x = super.y; } }",
            &[
                (TokenType::CLASS, "class"),
                (TokenType::IDENTIFIER, "Foo"),
                (TokenType::LESS, "<"),
                (TokenType::IDENTIFIER, "Bar"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::IDENTIFIER, "init"),
                (TokenType::LEFT_PAREN, "("),
                (TokenType::RIGHT_PAREN, ")"),
                (TokenType::LEFT_BRACE, "{"),
                (TokenType::THIS, "this"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "x"),
                (TokenType::EQUAL, "="),
                (TokenType::SUPER, "super"),
                (TokenType::DOT, "."),
                (TokenType::IDENTIFIER, "y"),
                (TokenType::SEMICOLON, ";"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::RIGHT_BRACE, "}"),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_literals_carry_typed_values() {
        let tokens: Vec<_> = Scanner::new("12.5 \"hi there\" 7")
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(matches!(tokens[0].token_type, TokenType::NUMBER(n) if n == 12.5));
        assert!(matches!(&tokens[1].token_type, TokenType::STRING(s) if s == "hi there"));
        assert_eq!(tokens[1].lexeme, "\"hi there\"");
        assert_eq!(tokens[2].to_string(), "NUMBER 7 7.0");
        assert_eq!(tokens[3].token_type, TokenType::EOF);
    }

    #[test]
    fn test_multiline_string_tracks_lines() {
        let tokens: Vec<_> = Scanner::new("\"a\nb\"\nx")
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(tokens[1].lexeme, "x");
        assert_eq!(tokens[1].line, 3);
    }

    #[test]
    fn test_unterminated_string() {
        let results: Vec<_> = Scanner::new("\"never closed").collect();

        assert!(matches!(
            &results[0],
            Err(LoxError::Lex { message, line: 1 }) if message == "Unterminated string."
        ));
        assert!(matches!(&results[1], Ok(t) if t.token_type == TokenType::EOF));
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new(",.$(#é").collect();

        // COMMA, DOT, error '$', LEFT_PAREN, error '#', error 'é', EOF
        assert_eq!(results.len(), 7, "Expected 7 items in result");

        let errors: Vec<String> = results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .map(|e| e.to_string())
            .collect();

        assert_eq!(
            errors,
            vec![
                "[line 1] Error: Unexpected character: $",
                "[line 1] Error: Unexpected character: #",
                "[line 1] Error: Unexpected character: é",
            ]
        );

        assert!(matches!(&results[6], Ok(t) if t.token_type == TokenType::EOF));
    }
}
