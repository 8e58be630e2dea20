use std::io::Write;
use crate::interpreter::ast::{AssignmentStatement, BinOp, Block, CompoundStatement, Empty, NodeId, Num, Param, ProcedureCall, ProcedureDecl, Program, Statement, TypeSpec, UnaryOp, VarDecl, Variable};
use crate::interpreter::ast::visitor::{walk_program, AstVisitor};

const HEADER: &str = r#"digraph astgraph {
  node [shape=circle, fontsize=12, fontname="Courier", height=.1];
  ranksep=.3;
  edge [arrowsize=.5]
"#;

/// Renders a program's AST as a Graphviz digraph. Every node is named after its node id.
pub struct DotWriter {
    nodes: Vec<String>,
    edges: Vec<String>,
}

impl DotWriter {
    pub fn new() -> DotWriter {
        DotWriter {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn write_program(&mut self, program: &Program, out: &mut impl Write) -> Result<(), std::io::Error> {
        self.nodes.clear();
        self.edges.clear();
        walk_program(self, program);

        out.write_all(HEADER.as_bytes())?;

        for node in &self.nodes {
            writeln!(out, "  {}", node)?;
        }

        writeln!(out)?;

        for edge in &self.edges {
            writeln!(out, "  {}", edge)?;
        }

        writeln!(out, "}}")
    }

    pub fn to_dot(&mut self, program: &Program) -> Result<String, std::io::Error> {
        let mut out = Vec::new();
        self.write_program(program, &mut out)?;

        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    fn node(&mut self, id: NodeId, label: &str) {
        self.nodes.push(format!("node{} [label=\"{}\"]", id, label));
    }

    fn edges(&mut self, parent: NodeId, children: impl IntoIterator<Item = NodeId>) {
        for child in children {
            self.edges.push(format!("node{} -> node{}", parent, child));
        }
    }
}

impl Default for DotWriter {
    fn default() -> Self {
        DotWriter::new()
    }
}

impl AstVisitor for DotWriter {
    fn program_pre(&mut self, program: &Program) {
        self.node(program.id, &format!("Program:{}", program.name));
        self.edges(program.id, [program.block.id]);
    }

    fn block_pre(&mut self, block: &Block) {
        self.node(block.id, "Block");
        self.edges(block.id, block.variable_declarations.iter().map(|declaration| declaration.id)
            .chain(block.procedure_declarations.iter().map(|procedure| procedure.id))
            .chain(std::iter::once(block.compound_statement.id)));
    }

    fn var_decl_pre(&mut self, var_decl: &VarDecl) {
        self.node(var_decl.id, "VarDecl");
        self.edges(var_decl.id, var_decl.variables.iter().map(|variable| variable.id)
            .chain(std::iter::once(var_decl.type_spec.id)));
    }

    fn procedure_decl_pre(&mut self, procedure: &ProcedureDecl) {
        self.node(procedure.id, &format!("ProcDecl:{}", procedure.name));
        self.edges(procedure.id, procedure.params.iter().map(|param| param.id)
            .chain(std::iter::once(procedure.block.id)));
    }

    fn param(&mut self, param: &Param) {
        self.node(param.id, "Param");
        self.edges(param.id, [param.variable.id, param.type_spec.id]);
    }

    fn declared_variable(&mut self, variable: &Variable) {
        self.node(variable.id, &variable.name);
    }

    fn type_spec(&mut self, type_spec: &TypeSpec) {
        self.node(type_spec.id, type_spec.data_type.name());
    }

    fn compound_statement_pre(&mut self, compound: &CompoundStatement) {
        self.node(compound.id, "Compound");
        self.edges(compound.id, compound.statements.iter().map(Statement::id));
    }

    fn assignment_statement(&mut self, assignment: &AssignmentStatement) {
        self.node(assignment.id, ":=");
        self.edges(assignment.id, [assignment.variable.id, assignment.expr.id()]);
    }

    fn procedure_call(&mut self, call: &ProcedureCall) {
        self.node(call.id, &format!("ProcCall:{}", call.name));
        self.edges(call.id, call.args.iter().map(|arg| arg.id()));
    }

    fn empty(&mut self, empty: &Empty) {
        self.node(empty.id, "NoOp");
    }

    fn bin_op(&mut self, bin_op: &BinOp) {
        self.node(bin_op.id, &bin_op.operator.to_string());
        self.edges(bin_op.id, [bin_op.left.id(), bin_op.right.id()]);
    }

    fn unary_op(&mut self, unary_op: &UnaryOp) {
        self.node(unary_op.id, &format!("unary {}", unary_op.operator));
        self.edges(unary_op.id, [unary_op.expr.id()]);
    }

    fn variable(&mut self, variable: &Variable) {
        self.node(variable.id, &variable.name);
    }

    fn num(&mut self, num: &Num) {
        self.node(num.id, &num.value.to_string());
    }
}
