pub mod ast;
pub mod lexer;
pub mod parser;
pub mod symbol_table;
pub mod semantic_analyser;
pub mod value;
pub mod evaluator;
pub mod writer;
