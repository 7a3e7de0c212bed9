use super::*;
use crate::token::{Token, TokenKind};

fn ident(name: &str) -> Token {
    Token::new(TokenKind::Ident, name, 1, 1)
}

fn recv_context() -> Context {
    let mut context = Context::new();
    context.enter_subroutine("vcl_recv", Scope::RECV, None);
    context
}

#[test]
fn test_get_builtin_in_scope() {
    let mut context = recv_context();
    let token = ident("req.url");
    assert!(matches!(
        context.get("req.url", &token),
        Ok(VclType::String)
    ));
}

#[test]
fn test_get_out_of_scope() {
    let mut context = recv_context();
    let token = ident("beresp.ttl");
    match context.get("beresp.ttl", &token) {
        Err(ContextError::OutOfScope { name, allowed, .. }) => {
            assert_eq!(name, "beresp.ttl");
            assert!(allowed.contains("fetch"));
        }
        other => panic!("expected out-of-scope error, got {:?}", other),
    }
}

#[test]
fn test_set_read_only() {
    let mut context = recv_context();
    let token = ident("client.ip");
    match context.set("client.ip", &token) {
        Err(ContextError::ReadOnly { name, .. }) => assert_eq!(name, "client.ip"),
        other => panic!("expected read-only error, got {:?}", other),
    }
}

#[test]
fn test_get_undefined_variable() {
    let mut context = recv_context();
    let token = ident("req.nonsense");
    assert!(matches!(
        context.get("req.nonsense", &token),
        Err(ContextError::UndefinedVariable { .. })
    ));
}

#[test]
fn test_header_wildcard_materialises_case_folded() {
    let mut context = recv_context();
    let token = ident("req.http.X-Custom");

    assert!(matches!(
        context.get("req.http.X-Custom", &token),
        Ok(VclType::String)
    ));
    // Both spellings resolve to the same materialised leaf.
    assert!(matches!(
        context.get("req.http.x-custom", &token),
        Ok(VclType::String)
    ));

    let http = context
        .variables
        .lookup("req.http")
        .expect("req.http exists");
    assert_eq!(http.children.len(), 1);
    assert!(http.children.contains_key("x-custom"));
}

#[test]
fn test_unset_header_allowed_but_not_plain_variable() {
    let mut context = recv_context();

    assert!(context.unset("req.http.Cookie", &ident("req.http.Cookie")).is_ok());

    match context.unset("req.url", &ident("req.url")) {
        Err(ContextError::CannotUnset { name, .. }) => assert_eq!(name, "req.url"),
        other => panic!("expected cannot-unset error, got {:?}", other),
    }
}

#[test]
fn test_declare_local_requires_var_prefix() {
    let mut context = recv_context();

    assert!(matches!(
        context.declare_local("count", VclType::Integer, ident("count")),
        Err(ContextError::BadLocalName { .. })
    ));

    assert!(context
        .declare_local("var.count", VclType::Integer, ident("var.count"))
        .is_ok());

    assert!(matches!(
        context.declare_local("var.count", VclType::Integer, ident("var.count")),
        Err(ContextError::Duplicate { .. })
    ));

    assert!(matches!(
        context.get("var.count", &ident("var.count")),
        Ok(VclType::Integer)
    ));
}

#[test]
fn test_leave_subroutine_reports_unused_locals() {
    let mut context = recv_context();
    context
        .declare_local("var.used", VclType::String, ident("var.used"))
        .unwrap();
    context
        .declare_local("var.idle", VclType::String, ident("var.idle"))
        .unwrap();
    context.get("var.used", &ident("var.used")).unwrap();

    let unused = context.leave_subroutine();
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].0, "var.idle");
}

#[test]
fn test_locals_cleared_between_subroutines() {
    let mut context = recv_context();
    context
        .declare_local("var.x", VclType::String, ident("var.x"))
        .unwrap();
    context.leave_subroutine();

    context.enter_subroutine("vcl_deliver", Scope::DELIVER, None);
    assert!(matches!(
        context.get("var.x", &ident("var.x")),
        Err(ContextError::UndefinedVariable { .. })
    ));
}

#[test]
fn test_registries_duplicate_and_shared_backend_namespace() {
    let mut context = Context::new();

    context.register_backend("origin", ident("origin")).unwrap();
    assert!(matches!(
        context.register_backend("origin", ident("origin")),
        Err(ContextError::Duplicate { .. })
    ));
    // Directors share the backend namespace.
    assert!(matches!(
        context.register_director("origin", ident("origin")),
        Err(ContextError::Duplicate { .. })
    ));

    context.register_acl("office", ident("office")).unwrap();
    assert!(matches!(
        context.register_acl("office", ident("office")),
        Err(ContextError::Duplicate { .. })
    ));
}

#[test]
fn test_get_marks_declared_names_used() {
    let mut context = Context::new();
    context.register_acl("office", ident("office")).unwrap();
    context.enter_subroutine("vcl_recv", Scope::RECV, None);

    assert!(matches!(
        context.get("office", &ident("office")),
        Ok(VclType::Acl)
    ));
    assert!(context.acls["office"].used);
}

#[test]
fn test_reserved_return_states_are_ids() {
    let mut context = recv_context();
    assert!(matches!(
        context.get("lookup", &ident("lookup")),
        Ok(VclType::Id)
    ));
    assert!(matches!(
        context.get("deliver_stale", &ident("deliver_stale")),
        Ok(VclType::Id)
    ));
}

#[test]
fn test_lifecycle_subroutines_start_used() {
    let mut context = Context::new();
    context
        .register_subroutine("vcl_recv", ident("vcl_recv"), None)
        .unwrap();
    context
        .register_subroutine("helper", ident("helper"), None)
        .unwrap();

    assert!(context.subroutines["vcl_recv"].used);
    assert!(!context.subroutines["helper"].used);
}

#[test]
fn test_get_function_scope_check() {
    let mut context = recv_context();
    let token = ident("std.tolower");

    let function = context.get_function("std.tolower", &token).unwrap();
    assert_eq!(function.return_type, Some(VclType::String));

    assert!(matches!(
        context.get_function("std.no_such_fn", &token),
        Err(ContextError::UndefinedFunction { .. })
    ));
}

#[test]
fn test_regex_capture_overwrite_detection() {
    let mut context = recv_context();

    // First push never overwrites.
    assert!(!context.push_regex_captures());
    // Every later push in the same subroutine does, whether or not the
    // groups were read in between.
    assert!(context.push_regex_captures());
    context.get("re.group.1", &ident("re.group.1")).unwrap();
    assert!(context.push_regex_captures());
}

#[test]
fn test_regex_state_snapshot_restore() {
    let mut context = recv_context();

    let saved = context.snapshot_regex();
    context.push_regex_captures();
    context.restore_regex(saved);

    // Restored to unpushed, so the next push is the first again.
    assert!(!context.push_regex_captures());
    assert!(context.push_regex_captures());
}

#[test]
fn test_enter_subroutine_resets_regex_state() {
    let mut context = recv_context();
    context.push_regex_captures();

    context.enter_subroutine("vcl_deliver", Scope::DELIVER, None);
    assert!(!context.push_regex_captures());
}
