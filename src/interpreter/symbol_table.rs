use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use crate::interpreter::ast::DataType;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormalParameter {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    Variable(DataType),
    TypeSpecification(DataType),
    ProcedureHeader {
        name: String,
        params: Vec<FormalParameter>,
    },
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Variable(data_type) => write!(f, "VARIABLE: {}", data_type),
            Symbol::TypeSpecification(data_type) => write!(f, "TYPE_SPECIFICATION: {}", data_type),
            Symbol::ProcedureHeader { name, params } => write!(f, "PROCEDURE: {}({})", name, params.iter()
                .map(|param| format!("{}: {}", param.name, param.data_type))
                .collect::<Vec<String>>().join("; ")),
        }
    }
}

/// Symbols declared directly in one scope. Starts out with the built-in types.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    name: String,
    symbols: BTreeMap<String, Symbol>,
}

impl SymbolTable {
    pub fn new(name: String) -> SymbolTable {
        let symbols = DataType::ALL.iter()
            .map(|data_type| (data_type.name().to_owned(), Symbol::TypeSpecification(*data_type)))
            .collect();

        SymbolTable { name, symbols }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `false` and leaves the table untouched if `name` is already defined.
    pub fn define(&mut self, name: &str, symbol: Symbol) -> bool {
        if self.symbols.contains_key(name) {
            return false;
        }

        self.symbols.insert(name.to_owned(), symbol);
        true
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn symbols(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.symbols.iter().map(|(name, symbol)| (name.as_str(), symbol))
    }
}

impl Display for SymbolTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Scope({})", self.name)?;

        for (name, symbol) in self.symbols() {
            writeln!(f, "  {} -> {}", name, symbol)?;
        }

        Ok(())
    }
}

/// Every scope of a program by name, together with each scope's lexically enclosing scope.
///
/// Scope names are unique across the whole program, so a procedure name identifies its scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScopeTree {
    root: String,
    tables: BTreeMap<String, SymbolTable>,
    parents: BTreeMap<String, String>,
}

impl ScopeTree {
    pub fn new(root: &str) -> ScopeTree {
        let mut tables = BTreeMap::new();
        tables.insert(root.to_owned(), SymbolTable::new(root.to_owned()));

        ScopeTree { root: root.to_owned(), tables, parents: BTreeMap::new() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns `false` if a scope with this name already exists.
    pub fn add_scope(&mut self, name: &str, parent: &str) -> bool {
        if self.tables.contains_key(name) {
            return false;
        }

        self.tables.insert(name.to_owned(), SymbolTable::new(name.to_owned()));
        self.parents.insert(name.to_owned(), parent.to_owned());
        true
    }

    pub fn get(&self, name: &str) -> Option<&SymbolTable> {
        self.tables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut SymbolTable> {
        self.tables.get_mut(name)
    }

    pub fn parent(&self, name: &str) -> Option<&str> {
        self.parents.get(name).map(String::as_str)
    }

    pub fn tables(&self) -> impl Iterator<Item = &SymbolTable> {
        self.tables.values()
    }

    /// Searches `scope` and then its enclosing scopes for a procedure header named `name`.
    /// Other kinds of symbols with that name are skipped.
    pub fn find_procedure(&self, scope: &str, name: &str) -> Option<(&str, &[FormalParameter])> {
        let mut current = Some(scope);

        while let Some(scope) = current {
            if let Some(Symbol::ProcedureHeader { name: header, params }) = self.get(scope).and_then(|table| table.find(name)) {
                return Some((header.as_str(), params.as_slice()));
            }

            current = self.parent(scope);
        }

        None
    }
}

impl Display for ScopeTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for table in self.tables.values() {
            write!(f, "{}", table)?;

            if let Some(parent) = self.parent(table.name()) {
                writeln!(f, "  (enclosed by {})", parent)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_types() {
        let table = SymbolTable::new(String::from("main"));

        assert_eq!(table.find("INTEGER"), Some(&Symbol::TypeSpecification(DataType::Integer)));
        assert_eq!(table.find("REAL"), Some(&Symbol::TypeSpecification(DataType::Real)));
        assert_eq!(table.find("x"), None);
    }

    #[test]
    fn test_define_twice() {
        let mut table = SymbolTable::new(String::from("main"));

        assert!(table.define("x", Symbol::Variable(DataType::Integer)));
        assert!(!table.define("x", Symbol::Variable(DataType::Real)));
        assert_eq!(table.find("x"), Some(&Symbol::Variable(DataType::Integer)));
    }

    #[test]
    fn test_find_procedure_walks_parents() {
        let mut scopes = ScopeTree::new("main");
        scopes.add_scope("alpha", "main");
        scopes.add_scope("beta", "alpha");

        scopes.get_mut("main").unwrap().define("alpha", Symbol::ProcedureHeader {
            name: String::from("alpha"),
            params: vec![FormalParameter { name: String::from("a"), data_type: DataType::Integer }],
        });
        // a variable with the same name in between does not hide the procedure
        scopes.get_mut("alpha").unwrap().define("alpha", Symbol::Variable(DataType::Real));

        let (name, params) = scopes.find_procedure("beta", "alpha").unwrap();
        assert_eq!(name, "alpha");
        assert_eq!(params.len(), 1);

        assert!(scopes.find_procedure("beta", "gamma").is_none());
    }

    #[test]
    fn test_table_display() {
        let mut table = SymbolTable::new(String::from("Alpha"));
        table.define("x", Symbol::Variable(DataType::Real));
        table.define("Beta", Symbol::ProcedureHeader {
            name: String::from("Beta"),
            params: vec![
                FormalParameter { name: String::from("a"), data_type: DataType::Integer },
                FormalParameter { name: String::from("b"), data_type: DataType::Real },
            ],
        });

        assert_eq!(table.symbols().map(|(name, _)| name).collect::<Vec<_>>(), vec!["Beta", "INTEGER", "REAL", "x"]);
        assert_eq!(table.to_string(), "Scope(Alpha)\n  Beta -> PROCEDURE: Beta(a: INTEGER; b: REAL)\n  \
            INTEGER -> TYPE_SPECIFICATION: INTEGER\n  REAL -> TYPE_SPECIFICATION: REAL\n  x -> VARIABLE: REAL\n");
    }

    #[test]
    fn test_duplicate_scope() {
        let mut scopes = ScopeTree::new("main");

        assert!(scopes.add_scope("alpha", "main"));
        assert!(!scopes.add_scope("alpha", "main"));
        assert!(!scopes.add_scope("main", "alpha"));
        assert_eq!(scopes.parent("alpha"), Some("main"));
        assert_eq!(scopes.parent("main"), None);
    }
}
