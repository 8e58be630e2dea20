pub mod util;
pub mod interpreter;
pub mod error;

use std::io::Write;
use std::path::PathBuf;
use clap::Parser as ClapParser;
use crate::error::Error;
use crate::interpreter::ast::Program;
use crate::interpreter::evaluator::{Interpreter, ProgramState};
use crate::interpreter::lexer::Lexer;
use crate::interpreter::parser::Parser;
use crate::interpreter::semantic_analyser::SemanticAnalyser;
use crate::interpreter::writer::DotWriter;

#[derive(ClapParser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Config {
    #[clap(default_value = "main.pas", help = "Main input file")]
    pub input: PathBuf,
    #[clap(long, help = "Print the AST as a Graphviz digraph instead of running the program")]
    pub dot: bool,
    #[clap(long, help = "Print the symbol table of every scope after running")]
    pub symbols: bool,

    #[clap(short, long, help = "Print verbose log output")]
    pub verbose: bool,
}

/// Lexes and parses `source`. Input after the program's final `.` is ignored with a warning.
pub fn parse(source: &str) -> Result<Program, Error> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse()?;

    if let Err(error) = parser.expect_eof() {
        log::warn!("Ignoring input after the end of the program: {}", error);
    }

    log::debug!("Parsed program '{}' ({} nodes)", program.name, parser.node_count());
    Ok(program)
}

/// Runs every stage on `source`. Interpretation only starts if semantic analysis found no errors.
pub fn interpret(source: &str) -> Result<ProgramState, Error> {
    let program = parse(source)?;

    let scopes = SemanticAnalyser::new().analyse(&program)?;
    log::debug!("Analysed {} scope(s)", scopes.tables().count());

    let state = Interpreter::new(&program, &scopes).run()?;
    log::info!("Program '{}' finished", program.name);

    Ok(state)
}

pub fn run(config: Config) -> Result<(), Error> {
    let source = std::fs::read_to_string(&config.input)?;
    let mut out = std::io::stdout().lock();

    if config.dot {
        let program = parse(&source)?;
        DotWriter::new().write_program(&program, &mut out)?;
        return Ok(());
    }

    let state = interpret(&source)?;

    for frame in state.completed_frames() {
        write!(out, "{}", frame)?;
    }

    if config.symbols {
        write!(out, "\n{}", state.scopes())?;
    }

    Ok(())
}
