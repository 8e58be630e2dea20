use thiserror::Error;
use crate::interpreter::evaluator::RuntimeError;
use crate::interpreter::lexer::LexerError;
use crate::interpreter::parser::ParseError;
use crate::interpreter::semantic_analyser::SemanticError;

/// Failure of any stage of the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexerError),
    #[error(transparent)]
    Parse(ParseError),
    #[error("{}", .0.iter().map(|error| error.to_string()).collect::<Vec<String>>().join("\n"))]
    Semantic(Vec<SemanticError>),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Lexer(error) => Error::Lex(error),
            error => Error::Parse(error),
        }
    }
}

impl From<Vec<SemanticError>> for Error {
    fn from(errors: Vec<SemanticError>) -> Self {
        Error::Semantic(errors)
    }
}
