use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use thiserror::Error;
use crate::interpreter::ast::{BinaryOperator, Block, CompoundStatement, Expr, NodeId, ProcedureCall, ProcedureDecl, Program, Statement, UnaryOperator};
use crate::interpreter::lexer::TokenPos;
use crate::interpreter::symbol_table::ScopeTree;
use crate::interpreter::value::{ArithmeticError, Number};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("{pos} Invalid division by zero")]
    DivisionByZero {
        pos: TokenPos,
    },
    #[error("{pos} Unknown value for variable '{name}' in scope '{scope}'")]
    UninitializedVariable {
        name: String,
        scope: String,
        pos: TokenPos,
    },
    #[error("{pos} Integer overflow")]
    Overflow {
        pos: TokenPos,
    },
    #[error("Internal interpreter error: {0}")]
    Internal(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Variable bindings of one activation of a procedure, or of the program itself.
#[derive(Clone, Debug, PartialEq)]
pub struct StackFrame {
    scope_name: String,
    variables: BTreeMap<String, Number>,
}

impl StackFrame {
    pub fn new(scope_name: &str) -> StackFrame {
        StackFrame { scope_name: scope_name.to_owned(), variables: BTreeMap::new() }
    }

    pub fn scope_name(&self) -> &str {
        &self.scope_name
    }

    pub fn get(&self, name: &str) -> Option<Number> {
        self.variables.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: Number) {
        self.variables.insert(name.to_owned(), value);
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, Number)> {
        self.variables.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl Display for StackFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "StackFrame({})", self.scope_name)?;

        for (name, value) in &self.variables {
            writeln!(f, "  {} = {}", name, value)?;
        }

        Ok(())
    }
}

/// Everything observed during a successful run.
#[derive(Clone, Debug)]
pub struct ProgramState {
    frame: StackFrame,
    completed_frames: Vec<StackFrame>,
    evaluations: HashMap<NodeId, Number>,
    scopes: ScopeTree,
}

impl ProgramState {
    /// Final bindings of the program's own frame.
    pub fn frame(&self) -> &StackFrame {
        &self.frame
    }

    /// Every frame in the order it was popped. The program frame comes last.
    pub fn completed_frames(&self) -> &[StackFrame] {
        &self.completed_frames
    }

    /// Last value computed for the expression node `id`, if it was ever evaluated.
    pub fn evaluation(&self, id: NodeId) -> Option<Number> {
        self.evaluations.get(&id).copied()
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }
}

/// Tree-walking interpreter for a program that passed semantic analysis.
///
/// Statements and expressions are evaluated by direct recursion. Every procedure call pushes
/// a fresh [`StackFrame`] that only holds the callee's parameters and the variables it assigns,
/// and pops it again when the call returns, whether or not it failed.
pub struct Interpreter<'ast> {
    program: &'ast Program,
    scopes: &'ast ScopeTree,
    procedures: HashMap<&'ast str, &'ast ProcedureDecl>,

    call_stack: Vec<StackFrame>,
    completed_frames: Vec<StackFrame>,
    evaluations: HashMap<NodeId, Number>,
}

impl<'ast> Interpreter<'ast> {
    pub fn new(program: &'ast Program, scopes: &'ast ScopeTree) -> Interpreter<'ast> {
        let mut procedures = HashMap::new();
        Self::index_procedures(&program.block, &mut procedures);

        Interpreter {
            program, scopes, procedures,
            call_stack: Vec::new(),
            completed_frames: Vec::new(),
            evaluations: HashMap::new(),
        }
    }

    fn index_procedures(block: &'ast Block, procedures: &mut HashMap<&'ast str, &'ast ProcedureDecl>) {
        for procedure in &block.procedure_declarations {
            procedures.insert(procedure.name.as_str(), procedure);
            Self::index_procedures(&procedure.block, procedures);
        }
    }

    pub fn run(&mut self) -> RuntimeResult<ProgramState> {
        let program = self.program;
        log::info!("Running program '{}'", program.name);

        self.completed_frames.clear();
        self.evaluations.clear();

        self.push_frame(StackFrame::new(&program.name));
        let result = self.execute_compound(&program.block.compound_statement);
        let frame = self.pop_frame();
        result?;

        let frame = frame.ok_or_else(|| RuntimeError::Internal(String::from("program frame missing at end of run")))?;

        Ok(ProgramState {
            frame,
            completed_frames: std::mem::take(&mut self.completed_frames),
            evaluations: std::mem::take(&mut self.evaluations),
            scopes: self.scopes.clone(),
        })
    }

    /// Number of frames currently on the call stack. Zero outside of [`Interpreter::run`].
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    // Call stack

    fn push_frame(&mut self, frame: StackFrame) {
        log::debug!("Entering scope '{}' (depth {})", frame.scope_name(), self.call_stack.len() + 1);
        self.call_stack.push(frame);
    }

    fn pop_frame(&mut self) -> Option<StackFrame> {
        let frame = self.call_stack.pop()?;
        log::debug!("Leaving {}", frame);

        self.completed_frames.push(frame.clone());
        Some(frame)
    }

    fn current_frame(&self) -> RuntimeResult<&StackFrame> {
        self.call_stack.last().ok_or_else(|| RuntimeError::Internal(String::from("empty call stack")))
    }

    fn current_frame_mut(&mut self) -> RuntimeResult<&mut StackFrame> {
        self.call_stack.last_mut().ok_or_else(|| RuntimeError::Internal(String::from("empty call stack")))
    }

    // Statements

    fn execute_compound(&mut self, compound: &CompoundStatement) -> RuntimeResult<()> {
        for statement in &compound.statements {
            self.execute(statement)?;
        }

        Ok(())
    }

    fn execute(&mut self, statement: &Statement) -> RuntimeResult<()> {
        if !matches!(statement, Statement::Compound(_) | Statement::Empty(_)) {
            log::trace!("Executing {}", statement);
        }

        match statement {
            Statement::Compound(compound) => self.execute_compound(compound),
            Statement::Assignment(assignment) => {
                let value = self.evaluate(&assignment.expr)?;
                log::trace!("{} := {} ({})", assignment.variable.name, value, value.data_type());

                self.current_frame_mut()?.set(&assignment.variable.name, value);
                Ok(())
            },
            Statement::ProcedureCall(call) => self.call_procedure(call),
            Statement::Empty(_) => Ok(()),
        }
    }

    fn call_procedure(&mut self, call: &ProcedureCall) -> RuntimeResult<()> {
        let scopes = self.scopes;
        let (name, params) = scopes.find_procedure(self.current_frame()?.scope_name(), &call.name)
            .ok_or_else(|| RuntimeError::Internal(format!("procedure '{}' not found", call.name)))?;
        let procedure = self.procedures.get(name).copied()
            .ok_or_else(|| RuntimeError::Internal(format!("no declaration for procedure '{}'", name)))?;

        if params.len() != call.args.len() {
            return Err(RuntimeError::Internal(format!("procedure '{}' called with {} argument(s), expected {}",
                name, call.args.len(), params.len())));
        }

        // Arguments are evaluated in the caller's frame
        let mut frame = StackFrame::new(name);

        for (param, arg) in params.iter().zip(&call.args) {
            let value = self.evaluate(arg)?;
            frame.set(&param.name, value);
        }

        self.push_frame(frame);
        let result = self.execute_compound(&procedure.block.compound_statement);
        self.pop_frame();

        result
    }

    // Expressions

    fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Number> {
        let value = match expr {
            Expr::Num(num) => num.value,
            Expr::Variable(variable) => {
                let frame = self.current_frame()?;

                frame.get(&variable.name).ok_or_else(|| RuntimeError::UninitializedVariable {
                    name: variable.name.clone(),
                    scope: frame.scope_name().to_owned(),
                    pos: variable.pos,
                })?
            },
            Expr::UnaryOp(unary_op) => {
                let operand = self.evaluate(&unary_op.expr)?;

                match unary_op.operator {
                    UnaryOperator::Plus => operand,
                    UnaryOperator::Minus => operand.negate().map_err(|err| Self::arithmetic_error(err, unary_op.pos))?,
                }
            },
            Expr::BinOp(bin_op) => {
                let left = self.evaluate(&bin_op.left)?;
                let right = self.evaluate(&bin_op.right)?;

                match bin_op.operator {
                    BinaryOperator::Plus => left.add(right),
                    BinaryOperator::Minus => left.subtract(right),
                    BinaryOperator::Multiply => left.multiply(right),
                    BinaryOperator::IntegerDivide => left.integer_divide(right),
                    BinaryOperator::RealDivide => left.real_divide(right),
                }.map_err(|err| Self::arithmetic_error(err, bin_op.pos))?
            },
        };

        self.evaluations.insert(expr.id(), value);
        Ok(value)
    }

    fn arithmetic_error(error: ArithmeticError, pos: TokenPos) -> RuntimeError {
        match error {
            ArithmeticError::DivisionByZero => RuntimeError::DivisionByZero { pos },
            ArithmeticError::Overflow => RuntimeError::Overflow { pos },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::lexer::Lexer;
    use crate::interpreter::parser::Parser;
    use crate::interpreter::semantic_analyser::SemanticAnalyser;

    fn run(source: &str) -> (RuntimeResult<ProgramState>, usize) {
        let program = Parser::new(Lexer::new(source)).parse().unwrap();
        let scopes = SemanticAnalyser::new().analyse(&program).unwrap();

        let mut interpreter = Interpreter::new(&program, &scopes);
        let result = interpreter.run();
        (result, interpreter.call_depth())
    }

    #[test]
    fn test_frame_display() {
        let mut frame = StackFrame::new("Main");
        frame.set("b", Number::Real(2.0));
        frame.set("a", Number::Integer(1));

        assert_eq!(frame.to_string(), "StackFrame(Main)\n  a = 1\n  b = 2.0\n");
    }

    #[test]
    fn test_arguments_are_copied() {
        let (result, depth) = run(r#"
            PROGRAM Main;
            VAR a : INTEGER;
            PROCEDURE P(n : INTEGER);
            BEGIN
                n := n + 1
            END;
            BEGIN
                a := 1;
                P(a)
            END.
        "#);
        let state = result.unwrap();

        assert_eq!(depth, 0);
        assert_eq!(state.frame().get("a"), Some(Number::Integer(1)));
        assert_eq!(state.completed_frames()[0].scope_name(), "P");
        assert_eq!(state.completed_frames()[0].get("n"), Some(Number::Integer(2)));
    }

    #[test]
    fn test_frames_are_popped_on_error() {
        let (result, depth) = run(r#"
            PROGRAM Main;
            PROCEDURE P(n : INTEGER);
            BEGIN
                n := n DIV 0
            END;
            BEGIN
                P(1)
            END.
        "#);

        assert!(matches!(result, Err(RuntimeError::DivisionByZero { .. })));
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_statements_after_error_do_not_run() {
        let program = Parser::new(Lexer::new("PROGRAM Main; VAR a, b : INTEGER; BEGIN a := 1 DIV 0; b := 2 END.")).parse().unwrap();
        let scopes = SemanticAnalyser::new().analyse(&program).unwrap();
        let mut interpreter = Interpreter::new(&program, &scopes);

        assert!(interpreter.run().is_err());
        // the program frame was still popped and logged
        assert_eq!(interpreter.completed_frames.len(), 1);
        assert_eq!(interpreter.completed_frames[0].get("b"), None);
    }

    #[test]
    fn test_overflow() {
        let (result, _) = run("PROGRAM Main; VAR a : INTEGER; BEGIN a := 9223372036854775807 + 1 END.");
        assert_eq!(result.unwrap_err(), RuntimeError::Overflow { pos: TokenPos::new(1, 63) });
    }

    #[test]
    fn test_evaluation_cache() {
        let program = Parser::new(Lexer::new("PROGRAM Main; VAR a : INTEGER; BEGIN a := 2 * 3 + 1 END.")).parse().unwrap();
        let scopes = SemanticAnalyser::new().analyse(&program).unwrap();
        let state = Interpreter::new(&program, &scopes).run().unwrap();

        let expr = match &program.block.compound_statement.statements[0] {
            Statement::Assignment(assignment) => &assignment.expr,
            other => panic!("expected assignment, got {:?}", other),
        };

        assert_eq!(state.evaluation(expr.id()), Some(Number::Integer(7)));

        if let Expr::BinOp(bin_op) = expr {
            assert_eq!(state.evaluation(bin_op.left.id()), Some(Number::Integer(6)));
            assert_eq!(state.evaluation(bin_op.right.id()), Some(Number::Integer(1)));
        }

        assert_eq!(state.evaluation(program.id), None);
    }
}
