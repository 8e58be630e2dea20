use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::Chars;
use lazy_static::lazy_static;
use thiserror::Error;
use crate::util;

#[cfg(test)]
mod tests;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenPos {
    pub line: i32,
    pub column: i32,
}

impl TokenPos {
    pub fn new(line: i32, column: i32) -> TokenPos {
        TokenPos { line, column }
    }

    pub fn begin() -> TokenPos {
        TokenPos::new(1, 1)
    }
}

impl Display for TokenPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[line {} column {}]", self.line, self.column)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenType {
    ParenthesisLeft, ParenthesisRight,
    Dot, Comma, Semicolon, Colon,
    Assign,

    Plus, Minus, Multiply,
    IntegerDivide, RealDivide,

    Identifier,
    IntegerConst, RealConst,

    // Keywords
    Program, Var, Procedure,
    Begin, End,
    Integer, Real,

    // EOF
    Eof,
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TokenType::ParenthesisLeft => "LPAREN",
            TokenType::ParenthesisRight => "RPAREN",
            TokenType::Dot => "DOT",
            TokenType::Comma => "COMMA",
            TokenType::Semicolon => "SEMI",
            TokenType::Colon => "COLON",
            TokenType::Assign => "ASSIGN",
            TokenType::Plus => "PLUS",
            TokenType::Minus => "MINUS",
            TokenType::Multiply => "MUL",
            TokenType::IntegerDivide => "DIV",
            TokenType::RealDivide => "REALDIV",
            TokenType::Identifier => "ID",
            TokenType::IntegerConst => "INT_CONST",
            TokenType::RealConst => "REAL_CONST",
            TokenType::Program => "PROGRAM",
            TokenType::Var => "VAR",
            TokenType::Procedure => "PROCEDURE",
            TokenType::Begin => "BEGIN",
            TokenType::End => "END",
            TokenType::Integer => "INTEGER",
            TokenType::Real => "REAL",
            TokenType::Eof => "EOF",
        })
    }
}

lazy_static! {
    static ref RESERVED_KEYWORDS: HashMap<&'static str, TokenType> = HashMap::from([
        ("PROGRAM", TokenType::Program),
        ("VAR", TokenType::Var),
        ("DIV", TokenType::IntegerDivide),
        ("INTEGER", TokenType::Integer),
        ("REAL", TokenType::Real),
        ("BEGIN", TokenType::Begin),
        ("END", TokenType::End),
        ("PROCEDURE", TokenType::Procedure),
    ]);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    token_type: TokenType,
    source: String,
    start: TokenPos,
}

impl Token {
    pub fn new(token_type: TokenType, source: String, start: TokenPos) -> Token {
        Token { token_type, source, start }
    }

    pub fn empty() -> Token {
        Token {
            token_type: TokenType::Eof,
            source: String::new(),
            start: TokenPos::begin(),
        }
    }

    pub fn token_type(&self) -> TokenType { self.token_type }
    pub fn source(&self) -> &str { &self.source }
    pub fn start(&self) -> &TokenPos { &self.start }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.token_type {
            TokenType::Eof => f.write_str("end of file"),
            _ => write!(f, "`{}`", self.source),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexerError {
    #[error("{pos} Unknown character '{character}'\n{context}")]
    UnexpectedCharacter {
        pos: TokenPos,
        character: char,
        context: String,
    },
}

impl LexerError {
    pub fn get_pos(&self) -> TokenPos {
        match self {
            LexerError::UnexpectedCharacter { pos, .. } => *pos,
        }
    }
}

pub type LexerResult<T> = Result<T, LexerError>;

/// Turns program text into tokens, one per [`Lexer::advance`].
///
/// Whitespace and `{ ... }` comments are skipped. Once the input is exhausted every further
/// `advance` keeps yielding the same end-of-file token.
pub struct Lexer<'source> {
    input: &'source str,

    chars: Chars<'source>,
    peek_1: Option<char>,
    peek_2: Option<char>,

    start_index: usize,
    current_index: usize,

    start_pos: TokenPos,
    current_pos: TokenPos,

    current: Option<Token>,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Lexer<'source> {
        Lexer {
            input: source,

            chars: source.chars(),
            peek_1: None,
            peek_2: None,

            start_index: 0,
            current_index: 0,

            start_pos: TokenPos::begin(),
            current_pos: TokenPos::begin(),

            current: None,
        }
    }

    pub fn input(&self) -> &'source str {
        self.input
    }

    /// Scans the next token and makes it available through [`Lexer::peek`].
    pub fn advance(&mut self) -> LexerResult<&Token> {
        let token = match self.current.take() {
            Some(token) if token.token_type() == TokenType::Eof => token,
            previous => match self.scan_token() {
                Ok(token) => {
                    log::trace!("{} {:?} {}", token.start(), token.token_type(), token);
                    token
                },
                Err(error) => {
                    // A failed scan leaves the last good token in place
                    self.current = previous;
                    return Err(error);
                },
            },
        };

        Ok(&*self.current.insert(token))
    }

    /// The most recently scanned token, `None` before the first [`Lexer::advance`].
    pub fn peek(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    fn scan_token(&mut self) -> LexerResult<Token> {
        loop {
            self.skip_whitespace();
            self.start_index = self.current_index;
            self.start_pos = self.current_pos;

            let c = match self.consume() {
                Some(c) => c,
                None => return Ok(self.make_token(TokenType::Eof)),
            };

            return match c {
                '{' => {
                    self.skip_comment();
                    continue;
                },

                '(' => Ok(self.make_token(TokenType::ParenthesisLeft)),
                ')' => Ok(self.make_token(TokenType::ParenthesisRight)),
                '.' => Ok(self.make_token(TokenType::Dot)),
                ',' => Ok(self.make_token(TokenType::Comma)),
                ';' => Ok(self.make_token(TokenType::Semicolon)),
                ':' => Ok(if self.expect('=') { self.make_token(TokenType::Assign) } else {
                    self.make_token(TokenType::Colon)
                }),

                '+' => Ok(self.make_token(TokenType::Plus)),
                '-' => Ok(self.make_token(TokenType::Minus)),
                '*' => Ok(self.make_token(TokenType::Multiply)),
                '/' => Ok(self.make_token(TokenType::RealDivide)),

                c if util::is_numeric(c) => Ok(self.scan_number()),
                c if util::is_alphabetic(c) => Ok(self.scan_identifier()),

                _ => Err(LexerError::UnexpectedCharacter {
                    pos: self.start_pos,
                    character: c,
                    context: util::source_context(self.input, self.start_pos),
                }),
            };
        }
    }

    fn scan_number(&mut self) -> Token {
        while let Some('0'..='9') = self.peek_char() {
            self.consume();
        }

        let mut real = false;

        // A bare trailing '.' belongs to whatever follows, e.g. the program's final DOT
        if let Some('.') = self.peek_char() {
            if let Some('0'..='9') = self.peek_next_char() {
                self.consume();
                real = true;

                while let Some('0'..='9') = self.peek_char() {
                    self.consume();
                }
            }
        }

        self.make_token(if real { TokenType::RealConst } else { TokenType::IntegerConst })
    }

    fn scan_identifier(&mut self) -> Token {
        while let Some(c) = self.peek_char() {
            if !util::is_alphanumeric(c) {
                break;
            }

            self.consume();
        }

        let name = &self.input[self.start_index..self.current_index];
        let token_type = RESERVED_KEYWORDS.get(name).copied().unwrap_or(TokenType::Identifier);

        Token { source: name.to_owned(), token_type, start: self.start_pos }
    }

    fn make_token(&self, token_type: TokenType) -> Token {
        Token {
            token_type,
            source: self.input[self.start_index..self.current_index].to_owned(),
            start: self.start_pos,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = if let Some(c) = self.peek_1.take() {
            self.peek_1 = self.peek_2.take();
            Some(c)
        } else {
            self.chars.next()
        }?;

        self.current_index += c.len_utf8();

        if c == '\n' {
            self.current_pos.line += 1;
            self.current_pos.column = 1;
        } else {
            self.current_pos.column += 1;
        }

        Some(c)
    }

    fn peek_char(&mut self) -> Option<char> {
        if self.peek_1.is_none() {
            self.peek_1 = self.chars.next();
        }

        self.peek_1
    }

    fn peek_next_char(&mut self) -> Option<char> {
        self.peek_char()?;

        if self.peek_2.is_none() {
            self.peek_2 = self.chars.next();
        }

        self.peek_2
    }

    fn expect(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.consume();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                return;
            }

            self.consume();
        }
    }

    fn skip_comment(&mut self) {
        while let Some(c) = self.consume() {
            if c == '}' {
                return;
            }
        }
    }
}
