use super::*;
use crate::interpreter::ast::DataType;
use crate::interpreter::lexer::Lexer;
use crate::interpreter::parser::Parser;

fn parse(source: &str) -> Program {
    Parser::new(Lexer::new(source)).parse().expect("test program should parse")
}

fn analyse(source: &str) -> Result<ScopeTree, Vec<SemanticError>> {
    SemanticAnalyser::new().analyse(&parse(source))
}

mod scopes {
    use super::*;

    #[test]
    fn test_scope_per_procedure() {
        let scopes = analyse(r#"
            PROGRAM Main;
            VAR x, y : REAL;
            PROCEDURE Alpha(a : INTEGER);
                VAR y : INTEGER;
                PROCEDURE Beta;
                BEGIN END;
            BEGIN
                y := a
            END;
            BEGIN
                x := y
            END.
        "#).unwrap();

        assert_eq!(scopes.root(), "Main");
        assert_eq!(scopes.parent("Alpha"), Some("Main"));
        assert_eq!(scopes.parent("Beta"), Some("Alpha"));

        let main = scopes.get("Main").unwrap();
        assert_eq!(main.find("x"), Some(&Symbol::Variable(DataType::Real)));
        assert!(matches!(main.find("Alpha"), Some(Symbol::ProcedureHeader { params, .. }) if params.len() == 1));

        let alpha = scopes.get("Alpha").unwrap();
        assert_eq!(alpha.find("a"), Some(&Symbol::Variable(DataType::Integer)));
        assert_eq!(alpha.find("y"), Some(&Symbol::Variable(DataType::Integer)));
        assert_eq!(alpha.find("INTEGER"), Some(&Symbol::TypeSpecification(DataType::Integer)));
        assert_eq!(alpha.find("x"), None);

        assert!(matches!(alpha.find("Beta"), Some(Symbol::ProcedureHeader { .. })));
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let program = parse(r#"
            PROGRAM Main;
            VAR a : INTEGER;
            PROCEDURE P(n : INTEGER); BEGIN END;
            BEGIN a := 1; P(a) END.
        "#);
        let analyser = SemanticAnalyser::new();

        assert_eq!(analyser.analyse(&program), analyser.analyse(&program));
    }

    #[test]
    fn test_duplicate_scope_name() {
        let errors = analyse(r#"
            PROGRAM Main;
            PROCEDURE Alpha;
                PROCEDURE Beta; BEGIN END;
            BEGIN END;
            PROCEDURE Gamma;
                PROCEDURE Beta; BEGIN END;
            BEGIN END;
            BEGIN END.
        "#).unwrap_err();

        assert_eq!(errors, vec![SemanticError::DuplicateScope { name: String::from("Beta"), pos: TokenPos::new(7, 27) }]);
    }

    #[test]
    fn test_procedure_named_like_program() {
        let errors = analyse("PROGRAM Main; PROCEDURE Main; BEGIN END; BEGIN END.").unwrap_err();
        assert!(matches!(&errors[..], [SemanticError::DuplicateScope { name, .. }] if name == "Main"));
    }
}

mod declarations {
    use super::*;

    #[test]
    fn test_redeclared_variables() {
        let errors = analyse(r#"
            PROGRAM Main;
            VAR a, b : INTEGER;
                b, c, a : REAL;
            BEGIN END.
        "#).unwrap_err();

        assert_eq!(errors, vec![SemanticError::AlreadyDefined {
            scope: String::from("Main"),
            names: vec![String::from("b"), String::from("a")],
        }]);
        assert_eq!(errors[0].to_string(), "Already defined symbols in scope 'Main': [b, a]");
    }

    #[test]
    fn test_same_name_in_different_scopes() {
        assert!(analyse(r#"
            PROGRAM P;
            VAR a : INTEGER;
            PROCEDURE Q; VAR a : INTEGER; BEGIN a := 5 END;
            BEGIN a := 1; Q END.
        "#).is_ok());
    }

    #[test]
    fn test_duplicate_parameter() {
        let errors = analyse("PROGRAM Main; PROCEDURE P(a : INTEGER; a : REAL); BEGIN END; BEGIN END.").unwrap_err();

        assert_eq!(errors, vec![SemanticError::AlreadyDefined { scope: String::from("P"), names: vec![String::from("a")] }]);
    }

    #[test]
    fn test_variable_clashing_with_procedure() {
        let errors = analyse("PROGRAM Main; VAR P : INTEGER; PROCEDURE P; BEGIN END; BEGIN END.").unwrap_err();

        assert_eq!(errors, vec![SemanticError::AlreadyDefined { scope: String::from("Main"), names: vec![String::from("P")] }]);
    }
}

mod references {
    use super::*;

    #[test]
    fn test_undefined_variables_are_all_collected() {
        let errors = analyse(r#"
            PROGRAM Main;
            VAR a : INTEGER;
            BEGIN
                a := b + 1;
                c := a
            END.
        "#).unwrap_err();

        let names: Vec<&str> = errors.iter().map(|error| match error {
            SemanticError::UndefinedVariable { name, scope, .. } => {
                assert_eq!(scope, "Main");
                name.as_str()
            },
            other => panic!("unexpected error {:?}", other),
        }).collect();

        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_enclosing_variables_are_not_visible() {
        let errors = analyse(r#"
            PROGRAM Main;
            VAR x : INTEGER;
            PROCEDURE P;
            BEGIN
                x := 1
            END;
            BEGIN x := 2 END.
        "#).unwrap_err();

        assert!(matches!(&errors[..], [SemanticError::UndefinedVariable { name, scope, .. }] if name == "x" && scope == "P"));
    }

    #[test]
    fn test_procedure_used_as_variable() {
        let errors = analyse("PROGRAM Main; VAR a : INTEGER; PROCEDURE P; BEGIN END; BEGIN a := P END.").unwrap_err();
        assert!(matches!(&errors[..], [SemanticError::NotAVariable { name, .. }] if name == "P"));
    }
}

mod calls {
    use super::*;

    #[test]
    fn test_arity_mismatch() {
        let errors = analyse(r#"
            PROGRAM Main;
            PROCEDURE Alpha(a : INTEGER; b : INTEGER); BEGIN END;
            BEGIN
                Alpha(1)
            END.
        "#).unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(&errors[0], SemanticError::ArgumentCountMismatch { name, expected: 2, got: 1, .. } if name == "Alpha"));
    }

    #[test]
    fn test_undefined_procedure() {
        let errors = analyse("PROGRAM Main; BEGIN Missing(1) END.").unwrap_err();
        assert!(matches!(&errors[..], [SemanticError::UndefinedProcedure { name, .. }] if name == "Missing"));
    }

    #[test]
    fn test_calls_resolve_through_enclosing_scopes() {
        assert!(analyse(r#"
            PROGRAM Main;
            PROCEDURE Outer(n : INTEGER);
                PROCEDURE Inner(m : INTEGER);
                BEGIN
                    Outer(m);
                    Inner(m)
                END;
            BEGIN
                Inner(n)
            END;
            BEGIN Outer(3) END.
        "#).is_ok());
    }

    #[test]
    fn test_nested_procedure_not_visible_outside() {
        let errors = analyse(r#"
            PROGRAM Main;
            PROCEDURE Outer;
                PROCEDURE Inner(m : INTEGER); BEGIN END;
            BEGIN END;
            BEGIN Inner(1) END.
        "#).unwrap_err();

        assert!(matches!(&errors[..], [SemanticError::UndefinedProcedure { name, .. }] if name == "Inner"));
    }

    #[test]
    fn test_arguments_are_checked() {
        let errors = analyse(r#"
            PROGRAM Main;
            PROCEDURE P(n : INTEGER); BEGIN END;
            BEGIN P(undefined) END.
        "#).unwrap_err();

        assert!(matches!(&errors[..], [SemanticError::UndefinedVariable { name, .. }] if name == "undefined"));
    }
}
