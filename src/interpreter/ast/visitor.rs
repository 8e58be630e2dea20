//! Depth-first traversal of a [`Program`] with per-node-kind hooks.
//!
//! Declarations are visited before the compound statement of their block, and every nested
//! procedure is visited completely (parameters, block) between its `_pre` and `_post` hooks.
//! Expressions are visited children first, so a hook for an operator always runs after the
//! hooks of its operands.

use crate::interpreter::ast::{AssignmentStatement, BinOp, Block, CompoundStatement, Empty, Expr, Num, Param, ProcedureCall, ProcedureDecl, Program, Statement, TypeSpec, UnaryOp, VarDecl, Variable};

#[allow(unused_variables)]
pub trait AstVisitor {
    fn program_pre(&mut self, program: &Program) {}
    fn program_post(&mut self, program: &Program) {}

    fn block_pre(&mut self, block: &Block) {}
    fn block_post(&mut self, block: &Block) {}

    fn var_decl_pre(&mut self, var_decl: &VarDecl) {}
    fn var_decl_post(&mut self, var_decl: &VarDecl) {}

    fn procedure_decl_pre(&mut self, procedure: &ProcedureDecl) {}
    fn procedure_decl_post(&mut self, procedure: &ProcedureDecl) {}

    fn param(&mut self, param: &Param) {}

    /// A variable name being declared, in a `VAR` section or a parameter list.
    fn declared_variable(&mut self, variable: &Variable) {}
    fn type_spec(&mut self, type_spec: &TypeSpec) {}

    fn compound_statement_pre(&mut self, compound: &CompoundStatement) {}
    fn compound_statement_post(&mut self, compound: &CompoundStatement) {}
    fn assignment_statement(&mut self, assignment: &AssignmentStatement) {}
    fn procedure_call(&mut self, call: &ProcedureCall) {}
    fn empty(&mut self, empty: &Empty) {}

    fn bin_op(&mut self, bin_op: &BinOp) {}
    fn unary_op(&mut self, unary_op: &UnaryOp) {}
    /// A variable being read or assigned.
    fn variable(&mut self, variable: &Variable) {}
    fn num(&mut self, num: &Num) {}
}

pub fn walk_program<V: AstVisitor + ?Sized>(visitor: &mut V, program: &Program) {
    visitor.program_pre(program);
    walk_block(visitor, &program.block);
    visitor.program_post(program);
}

pub fn walk_block<V: AstVisitor + ?Sized>(visitor: &mut V, block: &Block) {
    visitor.block_pre(block);

    for var_decl in &block.variable_declarations {
        visitor.var_decl_pre(var_decl);

        for variable in &var_decl.variables {
            visitor.declared_variable(variable);
        }

        visitor.type_spec(&var_decl.type_spec);
        visitor.var_decl_post(var_decl);
    }

    for procedure in &block.procedure_declarations {
        walk_procedure_decl(visitor, procedure);
    }

    walk_compound_statement(visitor, &block.compound_statement);
    visitor.block_post(block);
}

pub fn walk_procedure_decl<V: AstVisitor + ?Sized>(visitor: &mut V, procedure: &ProcedureDecl) {
    visitor.procedure_decl_pre(procedure);

    for param in &procedure.params {
        visitor.param(param);
        visitor.declared_variable(&param.variable);
        visitor.type_spec(&param.type_spec);
    }

    walk_block(visitor, &procedure.block);
    visitor.procedure_decl_post(procedure);
}

pub fn walk_compound_statement<V: AstVisitor + ?Sized>(visitor: &mut V, compound: &CompoundStatement) {
    visitor.compound_statement_pre(compound);

    for statement in &compound.statements {
        walk_statement(visitor, statement);
    }

    visitor.compound_statement_post(compound);
}

pub fn walk_statement<V: AstVisitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::Compound(compound) => walk_compound_statement(visitor, compound),
        Statement::Assignment(assignment) => {
            visitor.variable(&assignment.variable);
            walk_expr(visitor, &assignment.expr);
            visitor.assignment_statement(assignment);
        },
        Statement::ProcedureCall(call) => {
            for arg in &call.args {
                walk_expr(visitor, arg);
            }

            visitor.procedure_call(call);
        },
        Statement::Empty(empty) => visitor.empty(empty),
    }
}

pub fn walk_expr<V: AstVisitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::BinOp(bin_op) => {
            walk_expr(visitor, &bin_op.left);
            walk_expr(visitor, &bin_op.right);
            visitor.bin_op(bin_op);
        },
        Expr::UnaryOp(unary_op) => {
            walk_expr(visitor, &unary_op.expr);
            visitor.unary_op(unary_op);
        },
        Expr::Variable(variable) => visitor.variable(variable),
        Expr::Num(num) => visitor.num(num),
    }
}
