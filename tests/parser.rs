#[cfg(test)]
mod parser_tests {
    use rox::ast::{Expr, LiteralValue, Stmt};
    use rox::ast_printer::AstPrinter;
    use rox::error::LoxError;
    use rox::parser::Parser;

    fn print_expression(source: &str) -> String {
        let tokens = rox::scan(source).expect("scans");
        let expr = Parser::new(&tokens).parse_expression().expect("parses");
        AstPrinter::print(&expr)
    }

    fn parse_errors(source: &str) -> Vec<String> {
        let tokens = rox::scan(source).expect("scans");
        Parser::new(&tokens)
            .parse()
            .expect_err("should not parse")
            .iter()
            .map(LoxError::to_string)
            .collect()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(print_expression("1 + 2 * 3"), "(+ 1.0 (* 2.0 3.0))");
        assert_eq!(print_expression("-(1.5 - 2) < 3"), "(< (- (group (- 1.5 2.0))) 3.0)");
        assert_eq!(
            print_expression("a or b and !c == nil"),
            "(or a (and b (== (! c) nil)))"
        );
    }

    #[test]
    fn test_calls_properties_and_assignment() {
        assert_eq!(
            print_expression("a.b(1, \"x\").c = true"),
            "(= (. (call (. a b) 1.0 x) c) true)"
        );
        assert_eq!(print_expression("x = y = 2"), "(= x (= y 2.0))");
        assert_eq!(print_expression("super.m(this)"), "(call (super m) this)");
    }

    #[test]
    fn test_for_is_desugared() {
        let tokens = rox::scan("for (var i = 0; i < 3; i = i + 1) print i;").unwrap();
        let statements = Parser::new(&tokens).parse().unwrap();

        assert_eq!(statements.len(), 1);

        let Stmt::Block(outer) = &statements[0] else {
            panic!("expected block, got {:?}", statements[0]);
        };
        assert!(matches!(outer[0], Stmt::Var { .. }));

        let Stmt::While { body, .. } = &outer[1] else {
            panic!("expected while, got {:?}", outer[1]);
        };
        let Stmt::Block(inner) = body.as_ref() else {
            panic!("expected body block");
        };
        assert!(matches!(inner[0], Stmt::Print(_)));
        assert!(matches!(inner[1], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn test_for_without_condition_loops_on_true() {
        let tokens = rox::scan("for (;;) {}").unwrap();
        let statements = Parser::new(&tokens).parse().unwrap();

        let Stmt::While { condition, .. } = &statements[0] else {
            panic!("expected bare while");
        };
        assert_eq!(*condition, Expr::Literal(LiteralValue::Bool(true)));
    }

    #[test]
    fn test_class_declaration_with_superclass() {
        let tokens = rox::scan("class B < A { init(n) {} get() { return 1; } }").unwrap();
        let statements = Parser::new(&tokens).parse().unwrap();

        let Stmt::Class {
            name,
            superclass,
            methods,
        } = &statements[0]
        else {
            panic!("expected class");
        };

        assert_eq!(name.lexeme, "B");
        assert!(matches!(superclass, Some(Expr::Variable { name, .. }) if name.lexeme == "A"));
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].params.len(), 1);
        assert_eq!(methods[1].name.lexeme, "get");
    }

    #[test]
    fn test_resolvable_sites_get_distinct_ids() {
        let tokens = rox::scan("a = a;").unwrap();
        let statements = Parser::new(&tokens).parse().unwrap();

        let Stmt::Expression(Expr::Assign { id, value, .. }) = &statements[0] else {
            panic!("expected assignment");
        };
        let Expr::Variable { id: read_id, .. } = value.as_ref() else {
            panic!("expected variable");
        };

        assert_ne!(id, read_id);
    }

    #[test]
    fn test_collects_errors_and_recovers() {
        let errors = parse_errors("var = 1;\nprint 2\nvar ok = 3;\n(1 + 2) = 4;");

        assert_eq!(
            errors,
            vec![
                "[line 1] Error at '=': Expected variable name",
                "[line 3] Error at 'var': Expected ';' after value",
                "[line 4] Error at '=': Invalid assignment target",
            ]
        );
    }

    #[test]
    fn test_error_at_end() {
        let errors = parse_errors("print 1");
        assert_eq!(errors, vec!["[line 1] Error at end: Expected ';' after value"]);
    }

    #[test]
    fn test_too_many_arguments() {
        let args = vec!["1"; 256].join(", ");
        let errors = parse_errors(&format!("f({});", args));

        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with("Can't have more than 255 arguments"));
    }
}
