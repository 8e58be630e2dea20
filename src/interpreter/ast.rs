use std::fmt::{Display, Formatter};
use crate::interpreter::lexer::TokenPos;
use crate::interpreter::value::Number;

pub mod visitor;

/// Identifies a node within one parsed program. Assigned by the parser, children before parents.
pub type NodeId = u32;

#[derive(Debug, Default)]
pub struct NodeIdGenerator {
    next: NodeId,
}

impl NodeIdGenerator {
    pub fn new() -> NodeIdGenerator {
        NodeIdGenerator { next: 0 }
    }

    pub fn next(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of ids handed out so far.
    pub fn count(&self) -> usize {
        self.next as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataType {
    Integer,
    Real,
}

impl DataType {
    pub const ALL: [DataType; 2] = [DataType::Integer, DataType::Real];

    /// Name of the type symbol registered in every scope.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub id: NodeId,
    pub name: String,
    pub block: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub id: NodeId,
    pub variable_declarations: Vec<VarDecl>,
    pub procedure_declarations: Vec<ProcedureDecl>,
    pub compound_statement: CompoundStatement,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureDecl {
    pub id: NodeId,
    pub name: String,
    pub pos: TokenPos,
    pub params: Vec<Param>,
    pub block: Block,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDecl {
    pub id: NodeId,
    pub variables: Vec<Variable>,
    pub type_spec: TypeSpec,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub variable: Variable,
    pub type_spec: TypeSpec,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypeSpec {
    pub id: NodeId,
    pub data_type: DataType,
    pub pos: TokenPos,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Compound(CompoundStatement),
    Assignment(AssignmentStatement),
    ProcedureCall(ProcedureCall),
    Empty(Empty),
}

impl Statement {
    pub fn id(&self) -> NodeId {
        match self {
            Statement::Compound(statement) => statement.id,
            Statement::Assignment(statement) => statement.id,
            Statement::ProcedureCall(statement) => statement.id,
            Statement::Empty(statement) => statement.id,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompoundStatement {
    pub id: NodeId,
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentStatement {
    pub id: NodeId,
    pub variable: Variable,
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureCall {
    pub id: NodeId,
    pub name: String,
    pub pos: TokenPos,
    pub args: Vec<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Empty {
    pub id: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    IntegerDivide,
    RealDivide,
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::IntegerDivide => "DIV",
            BinaryOperator::RealDivide => "/",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Minus => "-",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    BinOp(BinOp),
    UnaryOp(UnaryOp),
    Variable(Variable),
    Num(Num),
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::BinOp(expr) => expr.id,
            Expr::UnaryOp(expr) => expr.id,
            Expr::Variable(expr) => expr.id,
            Expr::Num(expr) => expr.id,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinOp {
    pub id: NodeId,
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
    pub pos: TokenPos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryOp {
    pub id: NodeId,
    pub operator: UnaryOperator,
    pub expr: Box<Expr>,
    pub pos: TokenPos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub id: NodeId,
    pub name: String,
    pub pos: TokenPos,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Num {
    pub id: NodeId,
    pub value: Number,
}

// Source-like rendering, used in trace output
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::BinOp(BinOp { left, operator, right, .. }) => write!(f, "({} {} {})", left, operator, right),
            Expr::UnaryOp(UnaryOp { operator, expr, .. }) => write!(f, "({}{})", operator, expr),
            Expr::Variable(variable) => f.write_str(&variable.name),
            Expr::Num(num) => write!(f, "{}", num.value),
        }
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Compound(compound) => write!(f, "BEGIN {} END", compound.statements.iter()
                .map(|statement| statement.to_string())
                .collect::<Vec<String>>().join("; ")),
            Statement::Assignment(assignment) => write!(f, "{} := {}", assignment.variable.name, assignment.expr),
            Statement::ProcedureCall(call) => write!(f, "{}({})", call.name, call.args.iter()
                .map(|arg| arg.to_string())
                .collect::<Vec<String>>().join(", ")),
            Statement::Empty(_) => Ok(()),
        }
    }
}
