use std::collections::HashSet;
use thiserror::Error;
use crate::interpreter::ast::{AssignmentStatement, BinOp, BinaryOperator, Block, CompoundStatement, DataType, Empty, Expr, NodeIdGenerator, Num, Param, ProcedureCall, ProcedureDecl, Program, Statement, TypeSpec, UnaryOp, UnaryOperator, VarDecl, Variable};
use crate::interpreter::lexer::{Lexer, LexerError, Token, TokenPos, TokenType};
use crate::interpreter::value::Number;
use crate::util;


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lexer(#[from] LexerError),

    #[error("{} Expected {expected}, got {got}\n{context}", .got.start())]
    UnexpectedToken {
        expected: String,
        got: Token,
        context: String,
    },

    #[error("{pos} Invalid literal '{literal}': {message}\n{context}")]
    InvalidLiteral {
        pos: TokenPos,
        literal: String,
        message: String,
        context: String,
    },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over the token stream of a [`Lexer`].
///
/// ```text
/// program   := PROGRAM ident SEMI block DOT
/// block     := [VAR (vardecl SEMI)+] (PROCEDURE ident [LPAREN paramlist RPAREN] SEMI block SEMI)* compound
/// vardecl   := ident (COMMA ident)* COLON type
/// paramlist := params (SEMI params)*
/// params    := ident (COMMA ident)* COLON type
/// type      := INTEGER | REAL
/// compound  := BEGIN stmtlist END
/// stmtlist  := stmt (SEMI stmt)*
/// stmt      := compound | ident LPAREN expr (COMMA expr)* RPAREN | ident ASSIGN expr | empty
/// expr      := term ((PLUS | MINUS) term)*
/// term      := factor ((MUL | DIV | REALDIV) factor)*
/// factor    := (PLUS | MINUS) factor | INT_CONST | REAL_CONST | LPAREN expr RPAREN | ident
/// ```
///
/// A bare `ident` statement is only accepted when it names a procedure whose header has already
/// been parsed, and then means a call without arguments.
///
/// The first error aborts the parse. Nothing after the program's final `.` is consumed.
pub struct Parser<'source> {
    lexer: Lexer<'source>,
    previous: Token, current: Token,
    next: Option<Token>,

    ids: NodeIdGenerator,
    procedure_names: HashSet<String>,
}

impl<'source> Parser<'source> {
    pub fn new(lexer: Lexer<'source>) -> Parser<'source> {
        Parser {
            lexer,
            previous: Token::empty(), current: Token::empty(),
            next: None,
            ids: NodeIdGenerator::new(),
            procedure_names: HashSet::new(),
        }
    }

    pub fn parse(&mut self) -> ParseResult<Program> {
        self.consume()?;
        self.parse_program()
    }

    /// Scans past the program's final `.` and fails unless the input ends there.
    pub fn expect_eof(&mut self) -> ParseResult<()> {
        self.consume()?;

        if self.check(TokenType::Eof) {
            Ok(())
        } else {
            Err(self.error_at_current(&TokenType::Eof.to_string()))
        }
    }

    /// Number of AST nodes created so far.
    pub fn node_count(&self) -> usize {
        self.ids.count()
    }

    // Declaration parsing

    fn parse_program(&mut self) -> ParseResult<Program> {
        self.expect(TokenType::Program)?;
        let name = self.expect_identifier()?;
        self.expect(TokenType::Semicolon)?;

        let block = self.parse_block()?;

        // The final DOT is checked but not consumed
        if !self.check(TokenType::Dot) {
            return Err(self.error_at_current(&TokenType::Dot.to_string()));
        }

        Ok(Program { id: self.ids.next(), name: name.source().to_owned(), block })
    }

    fn parse_block(&mut self) -> ParseResult<Block> {
        let mut variable_declarations = Vec::new();
        let mut procedure_declarations = Vec::new();

        if self.matches(TokenType::Var)? {
            loop {
                variable_declarations.push(self.parse_variable_declaration()?);
                self.expect(TokenType::Semicolon)?;

                if !self.check(TokenType::Identifier) {
                    break;
                }
            }
        }

        while self.matches(TokenType::Procedure)? {
            procedure_declarations.push(self.parse_procedure_declaration()?);
        }

        let compound_statement = self.parse_compound_statement()?;

        Ok(Block { id: self.ids.next(), variable_declarations, procedure_declarations, compound_statement })
    }

    fn parse_variable_declaration(&mut self) -> ParseResult<VarDecl> {
        let variables = self.parse_identifier_list()?;
        self.expect(TokenType::Colon)?;
        let type_spec = self.parse_type()?;

        Ok(VarDecl { id: self.ids.next(), variables, type_spec })
    }

    fn parse_procedure_declaration(&mut self) -> ParseResult<ProcedureDecl> {
        let name = self.expect_identifier()?;
        self.procedure_names.insert(name.source().to_owned());

        let mut params = Vec::new();

        if self.matches(TokenType::ParenthesisLeft)? {
            params.extend(self.parse_formal_parameters()?);

            while self.matches(TokenType::Semicolon)? {
                params.extend(self.parse_formal_parameters()?);
            }

            self.expect(TokenType::ParenthesisRight)?;
        }

        self.expect(TokenType::Semicolon)?;
        let block = self.parse_block()?;
        self.expect(TokenType::Semicolon)?;

        Ok(ProcedureDecl { id: self.ids.next(), name: name.source().to_owned(), pos: *name.start(), params, block })
    }

    fn parse_formal_parameters(&mut self) -> ParseResult<Vec<Param>> {
        let variables = self.parse_identifier_list()?;
        self.expect(TokenType::Colon)?;
        let (data_type, pos) = self.parse_data_type()?;

        Ok(variables.into_iter().map(|variable| {
            let type_spec = TypeSpec { id: self.ids.next(), data_type, pos };
            Param { id: self.ids.next(), variable, type_spec }
        }).collect())
    }

    fn parse_identifier_list(&mut self) -> ParseResult<Vec<Variable>> {
        let mut variables = vec![self.parse_variable()?];

        while self.matches(TokenType::Comma)? {
            variables.push(self.parse_variable()?);
        }

        Ok(variables)
    }

    fn parse_type(&mut self) -> ParseResult<TypeSpec> {
        let (data_type, pos) = self.parse_data_type()?;
        Ok(TypeSpec { id: self.ids.next(), data_type, pos })
    }

    fn parse_data_type(&mut self) -> ParseResult<(DataType, TokenPos)> {
        let pos = *self.current.start();

        if self.matches(TokenType::Integer)? {
            Ok((DataType::Integer, pos))
        } else if self.matches(TokenType::Real)? {
            Ok((DataType::Real, pos))
        } else {
            Err(self.error_at_current("INTEGER or REAL"))
        }
    }

    // Statement parsing

    fn parse_compound_statement(&mut self) -> ParseResult<CompoundStatement> {
        self.expect(TokenType::Begin)?;

        let mut statements = vec![self.parse_statement()?];

        while self.matches(TokenType::Semicolon)? {
            statements.push(self.parse_statement()?);
        }

        self.expect(TokenType::End)?;
        Ok(CompoundStatement { id: self.ids.next(), statements })
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        if self.check(TokenType::Begin) {
            return Ok(Statement::Compound(self.parse_compound_statement()?));
        }

        if self.check(TokenType::Identifier) {
            if self.check_next(TokenType::ParenthesisLeft)? {
                return self.parse_procedure_call();
            }

            if !self.check_next(TokenType::Assign)? && self.procedure_names.contains(self.current.source()) {
                let name = self.expect_identifier()?;

                return Ok(Statement::ProcedureCall(ProcedureCall {
                    id: self.ids.next(), name: name.source().to_owned(), pos: *name.start(), args: Vec::new(),
                }));
            }

            return self.parse_assignment_statement();
        }

        Ok(Statement::Empty(Empty { id: self.ids.next() }))
    }

    fn parse_procedure_call(&mut self) -> ParseResult<Statement> {
        let name = self.expect_identifier()?;
        self.expect(TokenType::ParenthesisLeft)?;

        let mut args = vec![self.parse_expression()?];

        while self.matches(TokenType::Comma)? {
            args.push(self.parse_expression()?);
        }

        self.expect(TokenType::ParenthesisRight)?;

        Ok(Statement::ProcedureCall(ProcedureCall {
            id: self.ids.next(), name: name.source().to_owned(), pos: *name.start(), args,
        }))
    }

    fn parse_assignment_statement(&mut self) -> ParseResult<Statement> {
        let variable = self.parse_variable()?;
        self.expect(TokenType::Assign)?;
        let expr = self.parse_expression()?;

        Ok(Statement::Assignment(AssignmentStatement { id: self.ids.next(), variable, expr }))
    }

    // Expression parsing

    fn parse_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_term()?;

        loop {
            let operator = match self.current.token_type() {
                TokenType::Plus => BinaryOperator::Plus,
                TokenType::Minus => BinaryOperator::Minus,
                _ => break,
            };

            let pos = *self.current.start();
            self.consume()?;
            let right = self.parse_term()?;

            expr = Expr::BinOp(BinOp { id: self.ids.next(), left: Box::new(expr), operator, right: Box::new(right), pos });
        }

        Ok(expr)
    }

    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_factor()?;

        loop {
            let operator = match self.current.token_type() {
                TokenType::Multiply => BinaryOperator::Multiply,
                TokenType::IntegerDivide => BinaryOperator::IntegerDivide,
                TokenType::RealDivide => BinaryOperator::RealDivide,
                _ => break,
            };

            let pos = *self.current.start();
            self.consume()?;
            let right = self.parse_factor()?;

            expr = Expr::BinOp(BinOp { id: self.ids.next(), left: Box::new(expr), operator, right: Box::new(right), pos });
        }

        Ok(expr)
    }

    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let unary = match self.current.token_type() {
            TokenType::Plus => Some(UnaryOperator::Plus),
            TokenType::Minus => Some(UnaryOperator::Minus),
            _ => None,
        };

        if let Some(operator) = unary {
            let pos = *self.current.start();
            self.consume()?;
            let expr = self.parse_factor()?;

            return Ok(Expr::UnaryOp(UnaryOp { id: self.ids.next(), operator, expr: Box::new(expr), pos }));
        }

        if self.matches(TokenType::IntegerConst)? {
            let number = self.previous.clone();

            return match number.source().parse::<i64>() {
                Ok(value) => Ok(Expr::Num(Num { id: self.ids.next(), value: Number::Integer(value) })),
                Err(err) => Err(self.invalid_literal(&number, &err.to_string())),
            };
        } else if self.matches(TokenType::RealConst)? {
            let number = self.previous.clone();

            return match number.source().parse::<f64>() {
                Ok(value) => Ok(Expr::Num(Num { id: self.ids.next(), value: Number::Real(value) })),
                Err(err) => Err(self.invalid_literal(&number, &err.to_string())),
            };
        } else if self.matches(TokenType::ParenthesisLeft)? {
            let expr = self.parse_expression()?;
            self.expect(TokenType::ParenthesisRight)?;

            return Ok(expr);
        } else if self.check(TokenType::Identifier) {
            return Ok(Expr::Variable(self.parse_variable()?));
        }

        Err(self.error_at_current("expression"))
    }

    fn parse_variable(&mut self) -> ParseResult<Variable> {
        let name = self.expect_identifier()?;
        Ok(Variable { id: self.ids.next(), name: name.source().to_owned(), pos: *name.start() })
    }

    // Token handling

    fn consume(&mut self) -> ParseResult<()> {
        let next = match self.next.take() {
            Some(token) => token,
            None => self.lexer.advance()?.clone(),
        };

        self.previous = std::mem::replace(&mut self.current, next);
        Ok(())
    }

    fn expect(&mut self, token_type: TokenType) -> ParseResult<()> {
        if self.check(token_type) {
            return self.consume();
        }

        Err(self.error_at_current(&token_type.to_string()))
    }

    fn expect_identifier(&mut self) -> ParseResult<Token> {
        self.expect(TokenType::Identifier)?;
        Ok(self.previous.clone())
    }

    fn matches(&mut self, token_type: TokenType) -> ParseResult<bool> {
        if !self.check(token_type) {
            return Ok(false);
        }

        self.consume()?;
        Ok(true)
    }

    #[inline]
    fn check(&self, token_type: TokenType) -> bool {
        self.current.token_type() == token_type
    }

    fn check_next(&mut self, token_type: TokenType) -> ParseResult<bool> {
        if self.next.is_none() {
            self.next = Some(self.lexer.advance()?.clone());
        }

        Ok(self.next.as_ref().map(Token::token_type) == Some(token_type))
    }

    // Error handling

    fn error_at_current(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            expected: expected.to_owned(),
            got: self.current.clone(),
            context: util::source_context(self.lexer.input(), *self.current.start()),
        }
    }

    fn invalid_literal(&self, token: &Token, message: &str) -> ParseError {
        ParseError::InvalidLiteral {
            pos: *token.start(),
            literal: token.source().to_owned(),
            message: message.to_owned(),
            context: util::source_context(self.lexer.input(), *token.start()),
        }
    }
}
