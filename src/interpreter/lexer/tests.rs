use super::*;

fn scan_all(source: &str) -> LexerResult<Vec<Token>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    loop {
        lexer.advance()?;
        let token = lexer.peek().cloned().expect("token after advance");
        let eof = token.token_type() == TokenType::Eof;
        tokens.push(token);

        if eof {
            return Ok(tokens);
        }
    }
}

fn types(source: &str) -> Vec<TokenType> {
    scan_all(source).unwrap().iter().map(Token::token_type).collect()
}

mod tokens {
    use super::*;

    #[test]
    fn test_operators() {
        assert_eq!(types("+ - * / ( ) . := : ; ,"), vec![
            TokenType::Plus, TokenType::Minus, TokenType::Multiply, TokenType::RealDivide,
            TokenType::ParenthesisLeft, TokenType::ParenthesisRight, TokenType::Dot,
            TokenType::Assign, TokenType::Colon, TokenType::Semicolon, TokenType::Comma,
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(types("PROGRAM program DIV div BEGIN END"), vec![
            TokenType::Program, TokenType::Identifier,
            TokenType::IntegerDivide, TokenType::Identifier,
            TokenType::Begin, TokenType::End,
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_numbers() {
        let tokens = scan_all("12 3.25 7.").unwrap();

        assert_eq!(tokens[0].token_type(), TokenType::IntegerConst);
        assert_eq!(tokens[0].source(), "12");
        assert_eq!(tokens[1].token_type(), TokenType::RealConst);
        assert_eq!(tokens[1].source(), "3.25");
        // trailing '.' is not part of the number
        assert_eq!(tokens[2].token_type(), TokenType::IntegerConst);
        assert_eq!(tokens[2].source(), "7");
        assert_eq!(tokens[3].token_type(), TokenType::Dot);
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(types("a { a comment := 1 } b"), vec![
            TokenType::Identifier, TokenType::Identifier, TokenType::Eof,
        ]);
    }

    #[test]
    fn test_identifier_with_digits() {
        let tokens = scan_all("number2_x").unwrap();
        assert_eq!(tokens[0].token_type(), TokenType::Identifier);
        assert_eq!(tokens[0].source(), "number2_x");
    }
}

mod state {
    use super::*;

    #[test]
    fn test_peek_before_advance() {
        let lexer = Lexer::new("BEGIN");
        assert!(lexer.peek().is_none());
    }

    #[test]
    fn test_eof_is_stable() {
        let mut lexer = Lexer::new("x");
        lexer.advance().unwrap();
        lexer.advance().unwrap();
        assert_eq!(lexer.peek().unwrap().token_type(), TokenType::Eof);

        lexer.advance().unwrap();
        lexer.advance().unwrap();
        assert_eq!(lexer.peek().unwrap().token_type(), TokenType::Eof);
        assert_eq!(lexer.peek().unwrap().token_type(), TokenType::Eof);
    }

    #[test]
    fn test_locations() {
        let tokens = scan_all("BEGIN\n  a := 1\nEND").unwrap();

        assert_eq!(*tokens[0].start(), TokenPos::new(1, 1));
        assert_eq!(*tokens[1].start(), TokenPos::new(2, 3));
        assert_eq!(*tokens[2].start(), TokenPos::new(2, 5));
        assert_eq!(*tokens[3].start(), TokenPos::new(2, 8));
        assert_eq!(*tokens[4].start(), TokenPos::new(3, 1));
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_unknown_character() {
        let error = scan_all("BEGIN\n  a := 1 # 2\nEND").unwrap_err();

        assert_eq!(error.get_pos(), TokenPos::new(2, 10));

        let LexerError::UnexpectedCharacter { character, context, .. } = error;
        assert_eq!(character, '#');
        assert!(context.contains("     2|  a := 1 # 2\n"));
        assert!(context.contains(&format!("{}^", "-".repeat(7 + 9))));
    }

    #[test]
    fn test_error_keeps_current_token() {
        let mut lexer = Lexer::new("a := ?");

        assert_eq!(lexer.advance().map(Token::token_type), Ok(TokenType::Identifier));
        assert_eq!(lexer.advance().map(Token::token_type), Ok(TokenType::Assign));
        assert!(lexer.advance().is_err());

        assert_eq!(lexer.peek().map(Token::token_type), Some(TokenType::Assign));
        assert_eq!(lexer.peek().map(Token::source), Some(":="));
    }
}
