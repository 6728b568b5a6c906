mod common;

#[cfg(test)]
mod resolver_tests {
    use std::io;

    use rox::ast::{Expr, ExprId, Stmt};
    use rox::error::LoxError;
    use rox::interpreter::Interpreter;
    use rox::parser::Parser;
    use rox::resolver::Resolver;

    use crate::common;

    /// First `print` operand found in a depth‑first walk.
    fn first_print<'s, 'a>(statements: &'s [Stmt<'a>]) -> Option<&'s Expr<'a>> {
        statements.iter().find_map(|stmt| match stmt {
            Stmt::Print(expr) => Some(expr),
            Stmt::Block(inner) => first_print(inner),
            Stmt::Function(decl) => first_print(&decl.body),
            Stmt::Class { methods, .. } => methods.iter().find_map(|m| first_print(&m.body)),
            Stmt::If {
                then_branch,
                else_branch,
                ..
            } => first_print(std::slice::from_ref(then_branch.as_ref())).or_else(|| {
                else_branch
                    .as_deref()
                    .and_then(|e| first_print(std::slice::from_ref(e)))
            }),
            Stmt::While { body, .. } => first_print(std::slice::from_ref(body.as_ref())),
            _ => None,
        })
    }

    fn site_id(expr: &Expr<'_>) -> ExprId {
        match expr {
            Expr::Variable { id, .. } | Expr::This { id, .. } | Expr::Super { id, .. } => *id,
            Expr::Call { callee, .. } => site_id(callee),
            Expr::Get { object, .. } => site_id(object),
            other => panic!("no resolvable site in {:?}", other),
        }
    }

    /// Resolves `source` and returns the distance recorded for the operand of
    /// its first `print` statement.
    fn distance_of_printed(source: &str) -> Option<usize> {
        let tokens = rox::scan(source).expect("scans");
        let statements = Parser::new(&tokens).parse().expect("parses");

        let mut interpreter = Interpreter::with_output(Box::new(io::sink()));
        Resolver::new(&mut interpreter)
            .resolve(&statements)
            .expect("resolves");

        let printed = first_print(&statements).expect("program has a print");
        interpreter.resolved_distance(site_id(printed))
    }

    fn messages(errors: &[LoxError]) -> Vec<String> {
        errors.iter().map(LoxError::to_string).collect()
    }

    #[test]
    fn test_shadowed_read_binds_innermost_at_blocks_crossed() {
        for depth in 0..6 {
            let source = format!(
                "{{ var a = \"outer\"; {{ var a = \"inner\"; {} print a; {} }} }}",
                "{ ".repeat(depth),
                "} ".repeat(depth)
            );

            assert_eq!(
                distance_of_printed(&source),
                Some(depth),
                "source: {}",
                source
            );
        }
    }

    #[test]
    fn test_globals_are_left_unresolved() {
        assert_eq!(distance_of_printed("var a = 1; print a;"), None);
        assert_eq!(distance_of_printed("{ print a; } var a = 1;"), None);
    }

    #[test]
    fn test_closure_and_parameter_distances() {
        assert_eq!(distance_of_printed("fun f(x) { print x; }"), Some(0));
        assert_eq!(
            distance_of_printed("fun outer() { var v = 1; fun inner() { print v; } }"),
            Some(1)
        );
    }

    #[test]
    fn test_this_and_super_distances() {
        assert_eq!(
            distance_of_printed("class A { m() { print this; } }"),
            Some(1)
        );
        assert_eq!(
            distance_of_printed("class A {} class B < A { m() { print super.m; } }"),
            Some(2)
        );
    }

    #[test]
    fn test_duplicate_local_is_an_error() {
        let errors = common::static_errors("{ var a = 1; var a = 2; }");

        assert_eq!(
            messages(&errors),
            vec!["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_duplicate_global_and_cross_scope_shadowing_are_fine() {
        assert_eq!(
            common::output_of("var a = 1; var a = 2; print a; { var a = 3; print a; }"),
            vec!["2", "3"]
        );
    }

    #[test]
    fn test_duplicate_parameter_is_an_error() {
        let errors = common::static_errors("fun f(a, a) {}");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_self_referential_initializer() {
        let errors = common::static_errors("var a = 1; { var a = a; }");

        assert_eq!(
            messages(&errors),
            vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_invalid_return_contexts() {
        let errors = common::static_errors("return 1;");
        assert_eq!(
            messages(&errors),
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );

        let errors = common::static_errors("class A { init() { return 1; } }");
        assert_eq!(
            messages(&errors),
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
    }

    #[test]
    fn test_bare_return_in_initializer_is_allowed() {
        assert_eq!(
            common::output_of("class A { init() { return; } } print A();"),
            vec!["A instance"]
        );
    }

    #[test]
    fn test_invalid_this_and_super_contexts() {
        let cases = [
            ("print this;", "Can't use 'this' outside of a class."),
            ("fun f() { return this; }", "Can't use 'this' outside of a class."),
            ("super.m();", "Can't use 'super' outside of a class."),
            (
                "class A { m() { super.m(); } }",
                "Can't use 'super' in a class with no superclass.",
            ),
        ];

        for (source, expected) in cases {
            let errors = common::static_errors(source);
            assert_eq!(errors.len(), 1, "source: {}", source);
            assert!(
                errors[0].to_string().ends_with(expected),
                "source: {} gave {}",
                source,
                errors[0]
            );
        }
    }

    #[test]
    fn test_class_inheriting_from_itself() {
        let errors = common::static_errors("class Oops < Oops {}");

        assert_eq!(
            messages(&errors),
            vec!["[line 1] Error at 'Oops': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_all_diagnostics_are_collected() {
        let errors = common::static_errors("return 1;\nprint this;\n{ var b = 1; var b = 2; }");

        let lines: Vec<usize> = errors
            .iter()
            .map(|e| match e {
                LoxError::Resolve { line, .. } => *line,
                other => panic!("unexpected {:?}", other),
            })
            .collect();

        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn test_static_error_prevents_execution() {
        let (out, result) = common::run("print \"should not run\";\nreturn;");

        assert!(out.is_empty());
        assert!(result.is_err());
    }
}
