use super::*;

#[test]
fn test_lookup_keyword_hits() {
    assert_eq!(lookup_keyword("sub"), TokenKind::Sub);
    assert_eq!(lookup_keyword("acl"), TokenKind::Acl);
    assert_eq!(lookup_keyword("elseif"), TokenKind::ElseIf);
    assert_eq!(lookup_keyword("elsif"), TokenKind::Elsif);
    assert_eq!(lookup_keyword("synthetic.base64"), TokenKind::SyntheticBase64);
    assert_eq!(lookup_keyword("penaltybox"), TokenKind::Penaltybox);
}

#[test]
fn test_lookup_keyword_misses_are_idents() {
    assert_eq!(lookup_keyword("req.http.Host"), TokenKind::Ident);
    assert_eq!(lookup_keyword("Sub"), TokenKind::Ident);
    assert_eq!(lookup_keyword(""), TokenKind::Ident);
}

#[test]
fn test_is_assignment() {
    assert!(TokenKind::Assign.is_assignment());
    assert!(TokenKind::AdditionAssign.is_assignment());
    assert!(TokenKind::LeftShiftAssign.is_assignment());
    assert!(TokenKind::BitwiseXorAssign.is_assignment());

    assert!(!TokenKind::Equal.is_assignment());
    assert!(!TokenKind::Addition.is_assignment());
    assert!(!TokenKind::Match.is_assignment());
}

#[test]
fn test_token_display() {
    let ident = Token::new(TokenKind::Ident, "req.backend", 1, 1);
    assert_eq!(ident.to_string(), "IDENT(req.backend)");

    let string = Token::new(TokenKind::String, "hello", 2, 5);
    assert_eq!(string.to_string(), "STRING(hello)");

    let keyword = Token::new(TokenKind::Set, "set", 3, 3);
    assert_eq!(keyword.to_string(), "set");

    let op = Token::new(TokenKind::NotMatch, "!~", 4, 9);
    assert_eq!(op.to_string(), "!~");
}

#[test]
fn test_kind_as_str_round_trips_keywords() {
    for kind in [
        TokenKind::Acl,
        TokenKind::Backend,
        TokenKind::Director,
        TokenKind::Table,
        TokenKind::Declare,
        TokenKind::Fallthrough,
        TokenKind::Restart,
    ] {
        assert_eq!(lookup_keyword(kind.as_str()), kind);
    }
}
