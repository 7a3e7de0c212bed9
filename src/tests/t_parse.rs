use super::*;
use crate::ast::{Declaration, Expression, Operator, Statement, TopLevel};
use indoc::indoc;

fn parse_ok(source: &str) -> Program {
    parse(source, "test.vcl").expect("failed to parse")
}

fn first_subroutine(program: &Program) -> &crate::ast::SubroutineDeclaration {
    program.subroutines().next().expect("no subroutine")
}

fn body_statement<'a>(program: &'a Program, index: usize) -> &'a Statement {
    &first_subroutine(program).block.statements[index]
}

#[test]
fn test_parse_function_call_statement() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            h2.disable_header_compression("Authorization", req.http.Secret);
        }
    "#});

    let stmt = match body_statement(&program, 0) {
        Statement::FunctionCall(stmt) => stmt,
        other => panic!("expected function call statement, got {:?}", other),
    };
    assert_eq!(stmt.call.function.value, "h2.disable_header_compression");
    assert_eq!(stmt.call.arguments.len(), 2);
}

#[test]
fn test_parse_acl_declaration() {
    let program = parse_ok(indoc! {r#"
        acl purge_allowed {
            "192.168.0.1";
            "192.168.1.0"/24;
            !"10.0.0.5";
            !"10.1.0.0"/16;
        }
    "#});

    let decl = match &program.body[0] {
        TopLevel::Declaration(Declaration::Acl(acl)) => acl,
        other => panic!("expected acl declaration, got {:?}", other),
    };
    assert_eq!(decl.name.value, "purge_allowed");
    assert_eq!(decl.entries.len(), 4);

    assert_eq!(decl.entries[0].ip.value, "192.168.0.1");
    assert!(decl.entries[0].mask.is_none());
    assert!(!decl.entries[0].inverse);

    assert_eq!(decl.entries[1].mask.as_ref().map(|m| m.value), Some(24));

    assert!(decl.entries[2].inverse);
    assert!(decl.entries[2].mask.is_none());

    assert!(decl.entries[3].inverse);
    assert_eq!(decl.entries[3].mask.as_ref().map(|m| m.value), Some(16));
}

#[test]
fn test_parse_backend_with_probe() {
    let program = parse_ok(indoc! {r#"
        backend origin {
            .host = "origin.example.com";
            .port = "443";
            .probe = {
                .request = "HEAD / HTTP/1.1";
                .timeout = 2s;
            }
        }
    "#});

    let decl = match &program.body[0] {
        TopLevel::Declaration(Declaration::Backend(b)) => b,
        other => panic!("expected backend declaration, got {:?}", other),
    };
    assert_eq!(decl.name.value, "origin");
    assert_eq!(decl.properties.len(), 3);
    assert_eq!(decl.properties[0].key.value, "host");

    match &decl.properties[2].value {
        crate::ast::BackendValue::Object(inner) => {
            assert_eq!(inner.len(), 2);
            assert_eq!(inner[0].key.value, "request");
        }
        other => panic!("expected nested probe object, got {:?}", other),
    }
}

#[test]
fn test_parse_table_with_value_type() {
    let program = parse_ok(indoc! {r#"
        table redirects BACKEND {
            "/old": origin_a,
            "/new": origin_b,
        }
    "#});

    let decl = match &program.body[0] {
        TopLevel::Declaration(Declaration::Table(t)) => t,
        other => panic!("expected table declaration, got {:?}", other),
    };
    assert_eq!(decl.value_type.as_ref().map(|t| t.value.as_str()), Some("BACKEND"));
    assert_eq!(decl.entries.len(), 2);
    assert_eq!(decl.entries[0].key.value, "/old");
}

#[test]
fn test_parse_subroutine_body() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            set req.http.Host = "example.com";
            unset req.http.Cookie;
            return(lookup);
        }
    "#});

    let sub = first_subroutine(&program);
    assert_eq!(sub.name.value, "vcl_recv");
    assert!(sub.return_type.is_none());
    assert_eq!(sub.block.statements.len(), 3);

    match body_statement(&program, 0) {
        Statement::Set(set) => {
            assert_eq!(set.ident.value, "req.http.Host");
            assert_eq!(set.operator, Operator::Assign);
            match &set.value {
                Expression::String(s) => assert_eq!(s.value, "example.com"),
                other => panic!("expected string value, got {:?}", other),
            }
        }
        other => panic!("expected set statement, got {:?}", other),
    }

    match body_statement(&program, 2) {
        Statement::Return(ret) => {
            assert!(ret.has_parenthesis);
            match ret.expression.as_ref() {
                Some(Expression::Ident(state)) => assert_eq!(state.value, "lookup"),
                other => panic!("expected return state, got {:?}", other),
            }
        }
        other => panic!("expected return statement, got {:?}", other),
    }
}

#[test]
fn test_parse_functional_subroutine() {
    let program = parse_ok(indoc! {r#"
        sub pick_host STRING {
            return "fallback.example.com";
        }
    "#});

    let sub = first_subroutine(&program);
    assert_eq!(sub.return_type.as_ref().map(|t| t.value.as_str()), Some("STRING"));

    match &sub.block.statements[0] {
        Statement::Return(ret) => {
            assert!(!ret.has_parenthesis);
            assert!(ret.expression.is_some());
        }
        other => panic!("expected return statement, got {:?}", other),
    }
}

#[test]
fn test_parse_operator_precedence() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            if (req.http.A == "x" && req.http.B != "y" || req.http.C ~ "z") {
                restart;
            }
        }
    "#});

    let stmt = body_statement(&program, 0);
    let cond = match stmt {
        Statement::If(ifs) => &ifs.condition,
        other => panic!("expected if statement, got {:?}", other),
    };

    // `||` binds loosest, so it is the root of the condition tree.
    let root = match cond {
        Expression::Infix(infix) => infix,
        other => panic!("expected infix condition, got {:?}", other),
    };
    assert_eq!(root.operator, Operator::Or);
    match &root.left {
        Expression::Infix(and) => assert_eq!(and.operator, Operator::And),
        other => panic!("expected && under ||, got {:?}", other),
    }
    match &root.right {
        Expression::Infix(m) => assert_eq!(m.operator, Operator::Match),
        other => panic!("expected ~ under ||, got {:?}", other),
    }
}

#[test]
fn test_parse_else_if_spellings_preserved() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            if (req.http.A) {
                restart;
            } else if (req.http.B) {
                restart;
            } elseif (req.http.C) {
                restart;
            } elsif (req.http.D) {
                restart;
            } else {
                restart;
            }
        }
    "#});

    let ifs = match body_statement(&program, 0) {
        Statement::If(ifs) => ifs,
        other => panic!("expected if statement, got {:?}", other),
    };
    assert_eq!(ifs.another.len(), 3);
    assert_eq!(ifs.another[0].keyword, "else if");
    assert_eq!(ifs.another[1].keyword, "elseif");
    assert_eq!(ifs.another[2].keyword, "elsif");
    assert!(ifs.alternative.is_some());
}

#[test]
fn test_parse_switch_default_and_fallthrough() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            switch (req.http.Host) {
            case "a.example.com":
                set req.http.X = "a";
                fallthrough;
            case ~"^b\..*":
                set req.http.X = "b";
                break;
            default:
                set req.http.X = "none";
                break;
            }
        }
    "#});

    let switch = match body_statement(&program, 0) {
        Statement::Switch(s) => s,
        other => panic!("expected switch statement, got {:?}", other),
    };
    assert_eq!(switch.cases.len(), 3);
    assert_eq!(switch.default_index, 2);

    let first = &switch.cases[0];
    assert!(first.fallthrough);
    assert_eq!(first.label.as_ref().map(|l| l.operator), Some(Operator::Equal));

    let second = &switch.cases[1];
    assert!(!second.fallthrough);
    assert_eq!(second.label.as_ref().map(|l| l.operator), Some(Operator::Match));

    let default = &switch.cases[2];
    assert!(default.label.is_none());
    assert_eq!(default.statements.len(), 1);
}

#[test]
fn test_parse_duplicate_default_rejected() {
    let err = parse(
        indoc! {r#"
            sub vcl_recv {
                switch (req.http.Host) {
                default:
                    break;
                default:
                    break;
                }
            }
        "#},
        "test.vcl",
    )
    .unwrap_err();

    assert_eq!(err.token().kind, TokenKind::Default);
}

#[test]
fn test_parse_goto_and_destination() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            goto done;
            set req.http.X = "skipped";
            done:
            restart;
        }
    "#});

    match body_statement(&program, 0) {
        Statement::Goto(goto) => assert_eq!(goto.destination.value, "done"),
        other => panic!("expected goto, got {:?}", other),
    }
    match body_statement(&program, 2) {
        Statement::GotoDestination(dest) => assert_eq!(dest.name.value, "done"),
        other => panic!("expected goto destination, got {:?}", other),
    }
}

#[test]
fn test_parse_ternary_if_expression() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            set req.http.X = if(req.http.A == "1", "yes", "no");
        }
    "#});

    let set = match body_statement(&program, 0) {
        Statement::Set(set) => set,
        other => panic!("expected set statement, got {:?}", other),
    };
    match &set.value {
        Expression::IfExpr(ternary) => {
            assert!(matches!(ternary.condition, Expression::Infix(_)));
            assert!(matches!(ternary.consequence, Expression::String(_)));
            assert!(matches!(ternary.alternative, Expression::String(_)));
        }
        other => panic!("expected ternary expression, got {:?}", other),
    }
}

#[test]
fn test_leading_comment_attaches_to_next_statement() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            # strip tracking cookies
            unset req.http.Cookie;
        }
    "#});

    let meta = body_statement(&program, 0).meta();
    assert_eq!(meta.leading.len(), 1);
    assert_eq!(meta.leading[0].text(), " strip tracking cookies");
    assert_eq!(
        meta.leading[0].delimiter(),
        crate::ast::CommentDelimiter::Hash
    );
}

#[test]
fn test_trailing_comment_attaches_on_same_line() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            unset req.http.Cookie;  // no cookies past here
            restart;
        }
    "#});

    let unset_meta = body_statement(&program, 0).meta();
    assert_eq!(unset_meta.trailing.len(), 1);
    assert_eq!(unset_meta.trailing[0].text(), " no cookies past here");

    let restart_meta = body_statement(&program, 1).meta();
    assert!(restart_meta.leading.is_empty());
}

#[test]
fn test_infix_comment_attaches_to_block() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            restart;
            # dangling before close
        }
    "#});

    let sub = first_subroutine(&program);
    assert_eq!(sub.block.meta.infix.len(), 1);
    assert_eq!(sub.block.meta.infix[0].text(), " dangling before close");
}

#[test]
fn test_blank_lines_counted() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            restart;


            esi;
        }
    "#});

    let esi_meta = body_statement(&program, 1).meta();
    assert_eq!(esi_meta.previous_empty_lines, 2);
}

#[test]
fn test_statement_end_position_covers_semicolon() {
    let program = parse_ok("sub vcl_recv {\n    restart;\n}\n");

    let meta = body_statement(&program, 0).meta();
    assert_eq!(meta.token.line, 2);
    assert_eq!(meta.token.position, 5);
    assert_eq!(meta.end_line, 2);
    // One past the `;` that closes the statement.
    assert_eq!(meta.end_position, 13);
}

#[test]
fn test_nest_level_tracks_brace_depth() {
    let program = parse_ok(indoc! {r#"
        sub vcl_recv {
            if (req.http.A) {
                restart;
            }
        }
    "#});

    let sub = first_subroutine(&program);
    assert_eq!(sub.meta.nest_level, 0);

    let ifs = match &sub.block.statements[0] {
        Statement::If(ifs) => ifs,
        other => panic!("expected if statement, got {:?}", other),
    };
    assert_eq!(ifs.meta.nest_level, 1);
    assert_eq!(ifs.consequence.statements[0].meta().nest_level, 2);
}

#[test]
fn test_parse_snippet_statement_sequence() {
    let statements = parse_snippet(
        "set req.http.X = \"1\";\nunset req.http.Y;\n",
        "snippet",
    )
    .expect("failed to parse snippet");

    assert_eq!(statements.len(), 2);
    assert!(matches!(statements[0], Statement::Set(_)));
    assert!(matches!(statements[1], Statement::Unset(_)));
}

#[test]
fn test_parse_error_reports_offending_token() {
    let err = parse("sub vcl_recv {\n    set = \"x\";\n}\n", "test.vcl").unwrap_err();
    let token = err.token();
    assert_eq!(token.line, 2);
    assert_eq!(token.kind, TokenKind::Assign);
}

#[test]
fn test_parse_unterminated_block_is_eof_error() {
    let err = parse("sub vcl_recv {\n    restart;\n", "test.vcl").unwrap_err();
    assert!(matches!(err, ParseError::UnexpectedEof(_)));
}
