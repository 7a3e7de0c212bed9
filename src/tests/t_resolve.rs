use super::*;
use crate::ast::{Declaration, Statement, TopLevel};
use indoc::indoc;
use std::fs;
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, source: &str) {
    fs::write(dir.path().join(name), source).expect("failed to write fixture");
}

fn resolve_with(
    source: &str,
    include_paths: &[PathBuf],
    snippets: &SnippetStore,
) -> Result<Program, ResolveError> {
    let program = parse::parse(source, "main.vcl")?;
    Resolver::new(include_paths, snippets).resolve_program(program)
}

fn recv_statements(program: &Program) -> &[Statement] {
    let sub = program
        .subroutines()
        .find(|sub| sub.name.value == "vcl_recv")
        .expect("no vcl_recv");
    &sub.block.statements
}

#[test]
fn test_top_level_include_splices_declarations() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "backends.vcl",
        indoc! {r#"
            backend origin {
                .host = "origin.example.com";
            }
        "#},
    );

    let program = resolve_with(
        indoc! {r#"
            include "backends";

            sub vcl_recv {
                set req.backend = origin;
            }
        "#},
        &[dir.path().to_path_buf()],
        &SnippetStore::new(),
    )
    .expect("failed to resolve");

    assert_eq!(program.body.len(), 2);
    match &program.body[0] {
        TopLevel::Declaration(Declaration::Backend(b)) => {
            assert_eq!(b.name.value, "origin")
        }
        other => panic!("expected spliced backend, got {:?}", other),
    }
    // No include statements survive resolution.
    assert!(!program
        .body
        .iter()
        .any(|item| matches!(item, TopLevel::Statement(Statement::Include(_)))));
}

#[test]
fn test_nested_include_inside_subroutine() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "strip.vcl", "unset req.http.Cookie;\n");

    let program = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                include "strip";
                set req.http.Done = "1";
            }
        "#},
        &[dir.path().to_path_buf()],
        &SnippetStore::new(),
    )
    .expect("failed to resolve");

    let statements = recv_statements(&program);
    assert_eq!(statements.len(), 2);
    assert!(matches!(statements[0], Statement::Unset(_)));
    assert!(matches!(statements[1], Statement::Set(_)));
}

#[test]
fn test_include_keeps_literal_extension() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "extra.inc", "esi;\n");

    let program = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                include "extra.inc";
            }
        "#},
        &[dir.path().to_path_buf()],
        &SnippetStore::new(),
    )
    .expect("failed to resolve");

    assert!(matches!(recv_statements(&program)[0], Statement::Esi(_)));
}

#[test]
fn test_include_searches_paths_in_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    write_file(&first, "shared.vcl", "restart;\n");
    write_file(&second, "shared.vcl", "esi;\n");

    let program = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                include "shared";
            }
        "#},
        &[first.path().to_path_buf(), second.path().to_path_buf()],
        &SnippetStore::new(),
    )
    .expect("failed to resolve");

    assert!(matches!(recv_statements(&program)[0], Statement::Restart(_)));
}

#[test]
fn test_include_not_found() {
    let err = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                include "missing";
            }
        "#},
        &[],
        &SnippetStore::new(),
    )
    .unwrap_err();

    match err {
        ResolveError::IncludeNotFound { name, .. } => assert_eq!(name, "missing"),
        other => panic!("expected include-not-found, got {:?}", other),
    }
}

#[test]
fn test_include_cycle_detected() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "a.vcl", "include \"b\";\n");
    write_file(&dir, "b.vcl", "include \"a\";\n");

    let err = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                include "a";
            }
        "#},
        &[dir.path().to_path_buf()],
        &SnippetStore::new(),
    )
    .unwrap_err();

    assert!(matches!(err, ResolveError::IncludeCycle { .. }));
}

#[test]
fn test_named_snippet_splice() {
    let mut snippets = SnippetStore::new();
    snippets.push("auth", None, "set req.http.X-Auth = \"1\";\n");

    let program = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                include "snippet::auth";
            }
        "#},
        &[],
        &snippets,
    )
    .expect("failed to resolve");

    let statements = recv_statements(&program);
    assert_eq!(statements.len(), 1);
    match &statements[0] {
        Statement::Set(set) => {
            assert_eq!(set.ident.value, "req.http.X-Auth");
            assert_eq!(&*set.ident.meta.token.file, "snippet::auth");
        }
        other => panic!("expected spliced set, got {:?}", other),
    }
}

#[test]
fn test_undefined_snippet() {
    let err = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                include "snippet::nope";
            }
        "#},
        &[],
        &SnippetStore::new(),
    )
    .unwrap_err();

    match err {
        ResolveError::UndefinedSnippet { name, .. } => assert_eq!(name, "nope"),
        other => panic!("expected undefined-snippet, got {:?}", other),
    }
}

#[test]
fn test_marker_in_leading_trivia_injects_before_statement() {
    let mut snippets = SnippetStore::new();
    snippets.push("edge_recv", Some("recv"), "set req.http.Injected = \"1\";\n");

    let program = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                #FASTLY recv
                set req.http.Own = "1";
            }
        "#},
        &[],
        &snippets,
    )
    .expect("failed to resolve");

    let statements = recv_statements(&program);
    assert_eq!(statements.len(), 2);
    match &statements[0] {
        Statement::Set(set) => assert_eq!(set.ident.value, "req.http.Injected"),
        other => panic!("expected injected statement first, got {:?}", other),
    }
    match &statements[1] {
        Statement::Set(set) => assert_eq!(set.ident.value, "req.http.Own"),
        other => panic!("expected original statement second, got {:?}", other),
    }
}

#[test]
fn test_marker_in_empty_block_injects_into_body() {
    let mut snippets = SnippetStore::new();
    snippets.push("edge_deliver", Some("deliver"), "esi;\n");

    let program = resolve_with(
        indoc! {r#"
            sub vcl_deliver {
                #FASTLY deliver
            }
        "#},
        &[],
        &snippets,
    )
    .expect("failed to resolve");

    let sub = program.subroutines().next().unwrap();
    assert_eq!(sub.block.statements.len(), 1);
    assert!(matches!(sub.block.statements[0], Statement::Esi(_)));
}

#[test]
fn test_marker_ignored_in_custom_subroutine_block() {
    let mut snippets = SnippetStore::new();
    snippets.push("edge_recv", Some("recv"), "esi;\n");

    let program = resolve_with(
        indoc! {r#"
            sub helper {
                #FASTLY recv
            }
        "#},
        &[],
        &snippets,
    )
    .expect("failed to resolve");

    let sub = program.subroutines().next().unwrap();
    assert!(sub.block.statements.is_empty());
}

#[test]
fn test_marker_without_snippets_is_noop() {
    let program = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                #FASTLY recv
                restart;
            }
        "#},
        &[],
        &SnippetStore::new(),
    )
    .expect("failed to resolve");

    assert_eq!(recv_statements(&program).len(), 1);
}

#[test]
fn test_phase_snippets_concatenate_in_push_order() {
    let mut snippets = SnippetStore::new();
    snippets.push("one", Some("recv"), "restart;\n");
    snippets.push("two", Some("RECV"), "esi;\n");

    let program = resolve_with(
        indoc! {r#"
            sub vcl_recv {
                #FASTLY recv
                set req.http.X = "1";
            }
        "#},
        &[],
        &snippets,
    )
    .expect("failed to resolve");

    let statements = recv_statements(&program);
    assert_eq!(statements.len(), 3);
    assert!(matches!(statements[0], Statement::Restart(_)));
    assert!(matches!(statements[1], Statement::Esi(_)));
}

#[test]
fn test_marker_spellings() {
    let hash = Comment {
        token: comment_token("FASTLY recv", 1),
        prefixed_lf: true,
    };
    assert_eq!(marker_in(&hash), Some(Scope::RECV));

    let spaced = Comment {
        token: comment_token("  fastly DELIVER  ", 2),
        prefixed_lf: true,
    };
    assert_eq!(marker_in(&spaced), Some(Scope::DELIVER));

    let block = Comment {
        token: comment_token(" FASTLY fetch ", 4),
        prefixed_lf: false,
    };
    assert_eq!(marker_in(&block), Some(Scope::FETCH));

    let not_marker = Comment {
        token: comment_token(" FASTLY is great", 1),
        prefixed_lf: true,
    };
    assert_eq!(marker_in(&not_marker), None);

    let prose = Comment {
        token: comment_token(" ordinary comment", 1),
        prefixed_lf: true,
    };
    assert_eq!(marker_in(&prose), None);
}

fn comment_token(text: &str, offset: usize) -> crate::token::Token {
    let mut token = crate::token::Token::new(crate::token::TokenKind::Comment, text, 1, 1);
    token.offset = offset;
    token
}

#[test]
fn test_resolution_is_idempotent_without_includes() {
    let source = indoc! {r#"
        sub vcl_recv {
            if (req.http.A) {
                restart;
            }
            set req.http.B = "1";
        }
    "#};

    let once = resolve_with(source, &[], &SnippetStore::new()).unwrap();
    let twice = Resolver::new(&[], &SnippetStore::new())
        .resolve_program(once.clone())
        .unwrap();

    assert_eq!(recv_statements(&once).len(), recv_statements(&twice).len());
}
