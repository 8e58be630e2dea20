use thiserror::Error;
use crate::interpreter::ast::{Param, ProcedureCall, ProcedureDecl, Program, TypeSpec, VarDecl, Variable};
use crate::interpreter::ast::visitor::{walk_program, AstVisitor};
use crate::interpreter::lexer::TokenPos;
use crate::interpreter::symbol_table::{FormalParameter, ScopeTree, Symbol, SymbolTable};

#[cfg(test)]
mod tests;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("{pos} Duplicate scope name: '{name}'")]
    DuplicateScope {
        name: String,
        pos: TokenPos,
    },
    #[error("Already defined symbols in scope '{scope}': [{}]", .names.join(", "))]
    AlreadyDefined {
        scope: String,
        names: Vec<String>,
    },
    #[error("{pos} Unknown type symbol: '{name}'")]
    UnknownType {
        name: String,
        pos: TokenPos,
    },
    #[error("{pos} Undefined symbol '{name}' in scope '{scope}'")]
    UndefinedVariable {
        name: String,
        scope: String,
        pos: TokenPos,
    },
    #[error("{pos} '{name}' is not a variable")]
    NotAVariable {
        name: String,
        pos: TokenPos,
    },
    #[error("{pos} Undefined procedure: '{name}'")]
    UndefinedProcedure {
        name: String,
        pos: TokenPos,
    },
    #[error("{pos} Procedure '{name}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        got: usize,
        pos: TokenPos,
    },
}

/// Builds the symbol table of every scope in a program and checks declarations and references.
///
/// Unlike the other stages, analysis does not stop at the first problem: every error found in the
/// program is collected and returned together, in the order the program was traversed.
#[derive(Debug, Default)]
pub struct SemanticAnalyser;

impl SemanticAnalyser {
    pub fn new() -> SemanticAnalyser {
        SemanticAnalyser
    }

    pub fn analyse(&self, program: &Program) -> Result<ScopeTree, Vec<SemanticError>> {
        log::debug!("Analysing program '{}'", program.name);

        let mut context = AnalysisContext::new(&program.name);
        walk_program(&mut context, program);

        if context.errors.is_empty() {
            Ok(context.scopes)
        } else {
            Err(context.errors)
        }
    }
}

/// State threaded through one analysis pass.
struct AnalysisContext {
    scopes: ScopeTree,
    /// Innermost scope last.
    scope_stack: Vec<String>,
    errors: Vec<SemanticError>,
}

impl AnalysisContext {
    fn new(program_name: &str) -> AnalysisContext {
        AnalysisContext {
            scopes: ScopeTree::new(program_name),
            scope_stack: vec![program_name.to_owned()],
            errors: Vec::new(),
        }
    }

    fn current_scope(&self) -> &str {
        self.scope_stack.last().map(String::as_str).unwrap_or_else(|| self.scopes.root())
    }

    fn current_table(&self) -> Option<&SymbolTable> {
        self.scopes.get(self.current_scope())
    }

    /// Defines every name in the current scope, reporting the ones that already exist.
    fn define_all<'a>(&mut self, names: impl Iterator<Item = &'a str>, symbol: Symbol) {
        let scope = self.current_scope().to_owned();
        let mut already_defined = Vec::new();

        if let Some(table) = self.scopes.get_mut(&scope) {
            for name in names {
                if !table.define(name, symbol.clone()) {
                    already_defined.push(name.to_owned());
                }
            }
        }

        if !already_defined.is_empty() {
            self.errors.push(SemanticError::AlreadyDefined { scope, names: already_defined });
        }
    }

    fn check_type(&mut self, type_spec: &TypeSpec) {
        let name = type_spec.data_type.name();

        let known = matches!(self.current_table().and_then(|table| table.find(name)), Some(Symbol::TypeSpecification(_)));

        if !known {
            self.errors.push(SemanticError::UnknownType { name: name.to_owned(), pos: type_spec.pos });
        }
    }
}

impl AstVisitor for AnalysisContext {
    fn var_decl_pre(&mut self, var_decl: &VarDecl) {
        self.check_type(&var_decl.type_spec);
        self.define_all(var_decl.variables.iter().map(|variable| variable.name.as_str()),
            Symbol::Variable(var_decl.type_spec.data_type));
    }

    fn procedure_decl_pre(&mut self, procedure: &ProcedureDecl) {
        let enclosing = self.current_scope().to_owned();
        let header = Symbol::ProcedureHeader {
            name: procedure.name.clone(),
            params: procedure.params.iter().map(|param| FormalParameter {
                name: param.variable.name.clone(),
                data_type: param.type_spec.data_type,
            }).collect(),
        };

        let defined = self.scopes.get_mut(&enclosing).map(|table| table.define(&procedure.name, header)).unwrap_or(false);

        if !self.scopes.add_scope(&procedure.name, &enclosing) {
            // Keep walking inside the existing scope of that name
            self.errors.push(SemanticError::DuplicateScope { name: procedure.name.clone(), pos: procedure.pos });
        } else if !defined {
            self.errors.push(SemanticError::AlreadyDefined { scope: enclosing, names: vec![procedure.name.clone()] });
        }

        log::trace!("Entering scope '{}'", procedure.name);
        self.scope_stack.push(procedure.name.clone());
    }

    fn procedure_decl_post(&mut self, procedure: &ProcedureDecl) {
        log::trace!("Leaving scope '{}'", procedure.name);
        self.scope_stack.pop();
    }

    fn param(&mut self, param: &Param) {
        self.check_type(&param.type_spec);
        self.define_all(std::iter::once(param.variable.name.as_str()), Symbol::Variable(param.type_spec.data_type));
    }

    fn procedure_call(&mut self, call: &ProcedureCall) {
        match self.scopes.find_procedure(self.current_scope(), &call.name) {
            Some((_, params)) => {
                if params.len() != call.args.len() {
                    let error = SemanticError::ArgumentCountMismatch {
                        name: call.name.clone(),
                        expected: params.len(),
                        got: call.args.len(),
                        pos: call.pos,
                    };

                    self.errors.push(error);
                }
            },
            None => self.errors.push(SemanticError::UndefinedProcedure { name: call.name.clone(), pos: call.pos }),
        }
    }

    // Variables are only looked up in the current scope; enclosing scopes are not visible
    fn variable(&mut self, variable: &Variable) {
        let error = match self.current_table().and_then(|table| table.find(&variable.name)) {
            Some(Symbol::Variable(_)) => return,
            Some(_) => SemanticError::NotAVariable { name: variable.name.clone(), pos: variable.pos },
            None => SemanticError::UndefinedVariable {
                name: variable.name.clone(),
                scope: self.current_scope().to_owned(),
                pos: variable.pos,
            },
        };

        self.errors.push(error);
    }
}
