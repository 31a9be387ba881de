//! Parser tests: statements, expression precedence, arrow lookahead,
//! for-loop variants, spans, error recovery, and determinism.

use tally_parser::{parse_source, ParseResult};
use tally_types::ast::*;
use tally_types::{Span, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.js", source);
    parse_source(&sf)
}

/// Parse and return the program body, panicking on any error.
fn parse_ok(source: &str) -> Vec<Node> {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({})", e.message, e.code);
        }
        panic!("unexpected parse errors (see above)");
    }
    let program = result.program.expect("no program returned");
    match program.kind {
        NodeKind::Program { body } => body,
        other => panic!("expected Program, got {}", other.name()),
    }
}

fn parse_one(source: &str) -> Node {
    let mut body = parse_ok(source);
    assert_eq!(body.len(), 1, "expected exactly one statement");
    body.remove(0)
}

/// The expression inside a single `ExpressionStatement` program.
fn parse_expr(source: &str) -> Node {
    match parse_one(source).kind {
        NodeKind::ExpressionStatement { expression } => *expression,
        other => panic!("expected ExpressionStatement, got {}", other.name()),
    }
}

fn error_count(source: &str) -> usize {
    parse(source).errors.total_errors
}

// ─────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_variable_declaration_kinds() {
    for (src, want) in [
        ("var x = 1;", DeclKind::Var),
        ("let x = 1;", DeclKind::Let),
        ("const x = 1;", DeclKind::Const),
    ] {
        match parse_one(src).kind {
            NodeKind::VariableDeclaration {
                decl_kind,
                declarations,
            } => {
                assert_eq!(decl_kind, want);
                assert_eq!(declarations.len(), 1);
            }
            other => panic!("expected VariableDeclaration, got {}", other.name()),
        }
    }
}

#[test]
fn test_multiple_declarators() {
    match parse_one("var a = 1, b, c = 3;").kind {
        NodeKind::VariableDeclaration { declarations, .. } => {
            assert_eq!(declarations.len(), 3);
            match &declarations[1].kind {
                NodeKind::VariableDeclarator { init, .. } => assert!(init.is_none()),
                other => panic!("expected VariableDeclarator, got {}", other.name()),
            }
        }
        other => panic!("expected VariableDeclaration, got {}", other.name()),
    }
}

#[test]
fn test_array_destructuring_declaration() {
    match parse_one("var [a, , b] = pair;").kind {
        NodeKind::VariableDeclaration { declarations, .. } => {
            match &declarations[0].kind {
                NodeKind::VariableDeclarator { id, .. } => match &id.kind {
                    NodeKind::ArrayPattern { elements } => {
                        assert_eq!(elements.len(), 3);
                        assert!(elements[0].is_some());
                        assert!(elements[1].is_none());
                        assert!(elements[2].is_some());
                    }
                    other => panic!("expected ArrayPattern, got {}", other.name()),
                },
                other => panic!("expected VariableDeclarator, got {}", other.name()),
            }
        }
        other => panic!("expected VariableDeclaration, got {}", other.name()),
    }
}

#[test]
fn test_declaration_span_includes_semicolon() {
    let src = "var x = 1;";
    let stmt = parse_one(src);
    assert_eq!(stmt.span, Span::new(0, src.len() as u32));
}

#[test]
fn test_function_declaration() {
    match parse_one("function add(a, b) { return a + b; }").kind {
        NodeKind::FunctionDeclaration {
            id,
            params,
            generator,
            ..
        } => {
            assert!(matches!(&id.kind, NodeKind::Identifier { name } if name == "add"));
            assert_eq!(params.len(), 2);
            assert!(!generator);
        }
        other => panic!("expected FunctionDeclaration, got {}", other.name()),
    }
}

#[test]
fn test_generator_declaration() {
    match parse_one("function* gen() { yield 1; }").kind {
        NodeKind::FunctionDeclaration { generator, .. } => assert!(generator),
        other => panic!("expected FunctionDeclaration, got {}", other.name()),
    }
}

#[test]
fn test_if_else_chain() {
    let stmt = parse_one("if (a) { b(); } else if (c) { d(); } else { e(); }");
    match stmt.kind {
        NodeKind::IfStatement { alternate, .. } => {
            let alt = alternate.expect("missing else branch");
            assert!(matches!(alt.kind, NodeKind::IfStatement { .. }));
        }
        other => panic!("expected IfStatement, got {}", other.name()),
    }
}

#[test]
fn test_if_without_block() {
    match parse_one("if (a) b();").kind {
        NodeKind::IfStatement { consequent, .. } => {
            assert!(matches!(
                consequent.kind,
                NodeKind::ExpressionStatement { .. }
            ));
        }
        other => panic!("expected IfStatement, got {}", other.name()),
    }
}

#[test]
fn test_classic_for() {
    match parse_one("for (var i = 0; i < 10; i++) { work(); }").kind {
        NodeKind::ForStatement {
            init,
            test,
            update,
            ..
        } => {
            assert!(init.is_some());
            assert!(test.is_some());
            assert!(update.is_some());
        }
        other => panic!("expected ForStatement, got {}", other.name()),
    }
}

#[test]
fn test_for_with_empty_clauses() {
    match parse_one("for (;;) { break; }").kind {
        NodeKind::ForStatement {
            init,
            test,
            update,
            ..
        } => {
            assert!(init.is_none());
            assert!(test.is_none());
            assert!(update.is_none());
        }
        other => panic!("expected ForStatement, got {}", other.name()),
    }
}

#[test]
fn test_for_in() {
    match parse_one("for (var k in obj) { use(k); }").kind {
        NodeKind::ForInStatement { left, .. } => {
            assert!(matches!(left.kind, NodeKind::VariableDeclaration { .. }));
        }
        other => panic!("expected ForInStatement, got {}", other.name()),
    }
}

#[test]
fn test_for_of() {
    match parse_one("for (var v of list) { use(v); }").kind {
        NodeKind::ForOfStatement { right, .. } => {
            assert!(matches!(&right.kind, NodeKind::Identifier { name } if name == "list"));
        }
        other => panic!("expected ForOfStatement, got {}", other.name()),
    }
}

#[test]
fn test_of_is_a_plain_identifier_elsewhere() {
    let expr = parse_expr("of + 1;");
    assert!(matches!(expr.kind, NodeKind::BinaryExpression { .. }));
}

#[test]
fn test_while_and_do_while() {
    assert!(matches!(
        parse_one("while (x) { x--; }").kind,
        NodeKind::WhileStatement { .. }
    ));
    assert!(matches!(
        parse_one("do { x--; } while (x);").kind,
        NodeKind::DoWhileStatement { .. }
    ));
}

#[test]
fn test_with_statement() {
    match parse_one("with (obj) { f(); }").kind {
        NodeKind::WithStatement { object, .. } => {
            assert!(matches!(&object.kind, NodeKind::Identifier { name } if name == "obj"));
        }
        other => panic!("expected WithStatement, got {}", other.name()),
    }
}

#[test]
fn test_switch_cases_and_default() {
    match parse_one("switch (x) { case 1: a(); break; case 2: default: b(); }").kind {
        NodeKind::SwitchStatement { cases, .. } => {
            assert_eq!(cases.len(), 3);
            match &cases[0].kind {
                NodeKind::SwitchCase { test, consequent } => {
                    assert!(test.is_some());
                    assert_eq!(consequent.len(), 2);
                }
                other => panic!("expected SwitchCase, got {}", other.name()),
            }
            match &cases[1].kind {
                NodeKind::SwitchCase { consequent, .. } => assert!(consequent.is_empty()),
                other => panic!("expected SwitchCase, got {}", other.name()),
            }
            match &cases[2].kind {
                NodeKind::SwitchCase { test, .. } => assert!(test.is_none()),
                other => panic!("expected SwitchCase, got {}", other.name()),
            }
        }
        other => panic!("expected SwitchStatement, got {}", other.name()),
    }
}

#[test]
fn test_duplicate_default_is_an_error() {
    assert!(error_count("switch (x) { default: a(); default: b(); }") > 0);
}

#[test]
fn test_throw_statement() {
    assert!(matches!(
        parse_one("throw new Error('boom');").kind,
        NodeKind::ThrowStatement { .. }
    ));
}

#[test]
fn test_return_without_argument() {
    let body = parse_ok("function f() { return; }");
    match &body[0].kind {
        NodeKind::FunctionDeclaration { body, .. } => match &body.kind {
            NodeKind::BlockStatement { body } => match &body[0].kind {
                NodeKind::ReturnStatement { argument } => assert!(argument.is_none()),
                other => panic!("expected ReturnStatement, got {}", other.name()),
            },
            other => panic!("expected BlockStatement, got {}", other.name()),
        },
        other => panic!("expected FunctionDeclaration, got {}", other.name()),
    }
}

// ─────────────────────────────────────────────────────────────────────
// Expressions
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_precedence_mul_over_add() {
    match parse_expr("1 + 2 * 3;").kind {
        NodeKind::BinaryExpression { op, right, .. } => {
            assert_eq!(op, BinaryOp::Add);
            assert!(matches!(
                right.kind,
                NodeKind::BinaryExpression {
                    op: BinaryOp::Mul,
                    ..
                }
            ));
        }
        other => panic!("expected BinaryExpression, got {}", other.name()),
    }
}

#[test]
fn test_parens_override_precedence() {
    match parse_expr("(1 + 2) * 3;").kind {
        NodeKind::BinaryExpression { op, left, .. } => {
            assert_eq!(op, BinaryOp::Mul);
            assert!(matches!(
                left.kind,
                NodeKind::BinaryExpression {
                    op: BinaryOp::Add,
                    ..
                }
            ));
        }
        other => panic!("expected BinaryExpression, got {}", other.name()),
    }
}

#[test]
fn test_logical_or_binds_looser_than_and() {
    match parse_expr("a && b || c;").kind {
        NodeKind::LogicalExpression { op, left, .. } => {
            assert_eq!(op, LogicalOp::Or);
            assert!(matches!(
                left.kind,
                NodeKind::LogicalExpression {
                    op: LogicalOp::And,
                    ..
                }
            ));
        }
        other => panic!("expected LogicalExpression, got {}", other.name()),
    }
}

#[test]
fn test_assignment_is_right_associative() {
    match parse_expr("a = b = 1;").kind {
        NodeKind::AssignmentExpression { right, .. } => {
            assert!(matches!(right.kind, NodeKind::AssignmentExpression { .. }));
        }
        other => panic!("expected AssignmentExpression, got {}", other.name()),
    }
}

#[test]
fn test_compound_assignment() {
    match parse_expr("x += 2;").kind {
        NodeKind::AssignmentExpression { op, .. } => assert_eq!(op, AssignOp::AddAssign),
        other => panic!("expected AssignmentExpression, got {}", other.name()),
    }
}

#[test]
fn test_invalid_assignment_target() {
    assert!(error_count("1 = 2;") > 0);
    assert!(error_count("(a + b) = 2;") > 0);
}

#[test]
fn test_conditional_expression() {
    match parse_expr("a ? b : c ? d : e;").kind {
        NodeKind::ConditionalExpression { alternate, .. } => {
            assert!(matches!(
                alternate.kind,
                NodeKind::ConditionalExpression { .. }
            ));
        }
        other => panic!("expected ConditionalExpression, got {}", other.name()),
    }
}

#[test]
fn test_update_expressions() {
    match parse_expr("i++;").kind {
        NodeKind::UpdateExpression { op, prefix, .. } => {
            assert_eq!(op, UpdateOp::Incr);
            assert!(!prefix);
        }
        other => panic!("expected UpdateExpression, got {}", other.name()),
    }
    match parse_expr("--i;").kind {
        NodeKind::UpdateExpression { op, prefix, .. } => {
            assert_eq!(op, UpdateOp::Decr);
            assert!(prefix);
        }
        other => panic!("expected UpdateExpression, got {}", other.name()),
    }
}

#[test]
fn test_unary_chain() {
    match parse_expr("!!x;").kind {
        NodeKind::UnaryExpression { op, argument } => {
            assert_eq!(op, UnaryOp::Not);
            assert!(matches!(argument.kind, NodeKind::UnaryExpression { .. }));
        }
        other => panic!("expected UnaryExpression, got {}", other.name()),
    }
}

#[test]
fn test_member_chain() {
    match parse_expr("a.b[c].d;").kind {
        NodeKind::MemberExpression {
            computed, object, ..
        } => {
            assert!(!computed);
            assert!(matches!(
                object.kind,
                NodeKind::MemberExpression { computed: true, .. }
            ));
        }
        other => panic!("expected MemberExpression, got {}", other.name()),
    }
}

#[test]
fn test_keyword_after_dot() {
    match parse_expr("obj.delete;").kind {
        NodeKind::MemberExpression { property, .. } => {
            assert!(matches!(&property.kind, NodeKind::Identifier { name } if name == "delete"));
        }
        other => panic!("expected MemberExpression, got {}", other.name()),
    }
}

#[test]
fn test_call_with_arguments() {
    match parse_expr("f(1, g(2), 3);").kind {
        NodeKind::CallExpression { arguments, .. } => {
            assert_eq!(arguments.len(), 3);
            assert!(matches!(arguments[1].kind, NodeKind::CallExpression { .. }));
        }
        other => panic!("expected CallExpression, got {}", other.name()),
    }
}

#[test]
fn test_new_expression_binds_member_not_call() {
    // `new a.b()` news a.b, it does not call a.b first.
    match parse_expr("new a.b(1);").kind {
        NodeKind::NewExpression { callee, arguments } => {
            assert!(matches!(callee.kind, NodeKind::MemberExpression { .. }));
            assert_eq!(arguments.len(), 1);
        }
        other => panic!("expected NewExpression, got {}", other.name()),
    }
}

#[test]
fn test_new_without_arguments() {
    match parse_expr("new Thing;").kind {
        NodeKind::NewExpression { arguments, .. } => assert!(arguments.is_empty()),
        other => panic!("expected NewExpression, got {}", other.name()),
    }
}

#[test]
fn test_new_target_meta_property() {
    let body = parse_ok("function f() { return new.target; }");
    match &body[0].kind {
        NodeKind::FunctionDeclaration { body, .. } => match &body.kind {
            NodeKind::BlockStatement { body } => match &body[0].kind {
                NodeKind::ReturnStatement { argument } => {
                    let arg = argument.as_ref().expect("missing argument");
                    assert!(matches!(arg.kind, NodeKind::MetaProperty { .. }));
                }
                other => panic!("expected ReturnStatement, got {}", other.name()),
            },
            other => panic!("expected BlockStatement, got {}", other.name()),
        },
        other => panic!("expected FunctionDeclaration, got {}", other.name()),
    }
}

#[test]
fn test_new_dot_other_name_is_an_error() {
    assert!(error_count("var x = new.caller;") > 0);
}

#[test]
fn test_array_and_object_literals() {
    match parse_expr("[1, , 'two'];").kind {
        NodeKind::ArrayExpression { elements } => {
            assert_eq!(elements.len(), 3);
            assert!(elements[1].is_none());
        }
        other => panic!("expected ArrayExpression, got {}", other.name()),
    }
    match parse_expr("({a: 1, 'b': 2, 3: c});").kind {
        NodeKind::ObjectExpression { properties } => assert_eq!(properties.len(), 3),
        other => panic!("expected ObjectExpression, got {}", other.name()),
    }
}

#[test]
fn test_function_expression() {
    match parse_expr("(function named(x) { return x; });").kind {
        NodeKind::FunctionExpression { id, .. } => assert!(id.is_some()),
        other => panic!("expected FunctionExpression, got {}", other.name()),
    }
}

#[test]
fn test_arrow_with_block_body() {
    match parse_expr("(a, b) => { return a + b; };").kind {
        NodeKind::ArrowFunctionExpression {
            params, expression, ..
        } => {
            assert_eq!(params.len(), 2);
            assert!(!expression);
        }
        other => panic!("expected ArrowFunctionExpression, got {}", other.name()),
    }
}

#[test]
fn test_arrow_with_expression_body() {
    match parse_expr("x => x * 2;").kind {
        NodeKind::ArrowFunctionExpression {
            params,
            expression,
            body,
        } => {
            assert_eq!(params.len(), 1);
            assert!(expression);
            assert!(matches!(body.kind, NodeKind::BinaryExpression { .. }));
        }
        other => panic!("expected ArrowFunctionExpression, got {}", other.name()),
    }
}

#[test]
fn test_parenthesized_expression_is_not_an_arrow() {
    // Lookahead must not mistake a plain parenthesized expression.
    assert!(matches!(
        parse_expr("(a + b) * c;").kind,
        NodeKind::BinaryExpression { .. }
    ));
}

#[test]
fn test_yield_forms() {
    let body = parse_ok("function* g() { yield; yield 1; yield* inner(); }");
    let stmts = match &body[0].kind {
        NodeKind::FunctionDeclaration { body, .. } => match &body.kind {
            NodeKind::BlockStatement { body } => body,
            other => panic!("expected BlockStatement, got {}", other.name()),
        },
        other => panic!("expected FunctionDeclaration, got {}", other.name()),
    };
    let yields: Vec<(bool, bool)> = stmts
        .iter()
        .map(|s| match &s.kind {
            NodeKind::ExpressionStatement { expression } => match &expression.kind {
                NodeKind::YieldExpression { argument, delegate } => {
                    (argument.is_some(), *delegate)
                }
                other => panic!("expected YieldExpression, got {}", other.name()),
            },
            other => panic!("expected ExpressionStatement, got {}", other.name()),
        })
        .collect();
    assert_eq!(yields, vec![(false, false), (true, false), (true, true)]);
}

// ─────────────────────────────────────────────────────────────────────
// Spans
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_expression_spans_are_byte_offsets() {
    let src = "var x = a + b;";
    let stmt = parse_one(src);
    match stmt.kind {
        NodeKind::VariableDeclaration { declarations, .. } => {
            let init = match &declarations[0].kind {
                NodeKind::VariableDeclarator { init, .. } => {
                    init.as_ref().expect("missing initializer")
                }
                other => panic!("expected VariableDeclarator, got {}", other.name()),
            };
            assert_eq!(init.span, Span::new(8, 13));
        }
        other => panic!("expected VariableDeclaration, got {}", other.name()),
    }
}

#[test]
fn test_program_span_covers_source() {
    let src = "f();\ng();\n";
    let result = parse(src);
    let program = result.program.expect("no program");
    assert_eq!(program.span, Span::new(0, src.len() as u32));
}

// ─────────────────────────────────────────────────────────────────────
// Errors and recovery
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_missing_semicolon_is_an_error() {
    assert!(error_count("var x = 1 var y = 2;") > 0);
}

#[test]
fn test_semicolon_optional_before_closing_brace() {
    parse_ok("function f() { return 1 }");
}

#[test]
fn test_recovery_continues_after_bad_statement() {
    let result = parse("var = 1; var ok = 2;");
    assert!(result.errors.has_errors());
    let program = result.program.expect("no program");
    match program.kind {
        NodeKind::Program { body } => {
            assert!(body
                .iter()
                .any(|s| matches!(s.kind, NodeKind::VariableDeclaration { .. })));
        }
        other => panic!("expected Program, got {}", other.name()),
    }
}

#[test]
fn test_lexer_errors_suppress_the_program() {
    let result = parse("var s = 'unterminated");
    assert!(result.errors.has_errors());
    assert!(result.program.is_none());
}

#[test]
fn test_deep_nesting_is_rejected() {
    let mut src = String::from("var x = ");
    for _ in 0..100 {
        src.push('(');
    }
    src.push('1');
    for _ in 0..100 {
        src.push(')');
    }
    src.push(';');
    assert!(error_count(&src) > 0);
}

#[test]
fn test_parse_is_deterministic() {
    let src = "function f(a) { for (var i = 0; i < a; i++) { g(i); } return i; }";
    let a = format!("{:?}", parse(src).program);
    let b = format!("{:?}", parse(src).program);
    assert_eq!(a, b);
}
