use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).tokenize().map(|t| t.kind).collect()
}

fn assert_pos(token: &Token, line: usize, position: usize) {
    assert_eq!(token.line, line, "line of {}", token);
    assert_eq!(token.position, position, "position of {}", token);
}

#[test]
fn test_lex_identifier_with_dots_and_dashes() {
    let mut lexer = Lexer::new("req.http.X-Forwarded-For");
    let token = lexer.next_token();

    assert_eq!(token.kind, TokenKind::Ident);
    assert_eq!(token.literal, "req.http.X-Forwarded-For");
    assert_pos(&token, 1, 1);
}

#[test]
fn test_lex_keywords() {
    let mut lexer = Lexer::new("sub acl backend declare set unset");
    let expected = [
        TokenKind::Sub,
        TokenKind::Acl,
        TokenKind::Backend,
        TokenKind::Declare,
        TokenKind::Set,
        TokenKind::Unset,
        TokenKind::Eof,
    ];
    for kind in expected {
        assert_eq!(lexer.next_token().kind, kind);
    }
}

#[test]
fn test_lex_backend_property_key() {
    // A leading dot lexes as part of the identifier.
    let mut lexer = Lexer::new(".host");
    let token = lexer.next_token();

    assert_eq!(token.kind, TokenKind::Ident);
    assert_eq!(token.literal, ".host");
}

#[test]
fn test_lex_numbers() {
    let mut lexer = Lexer::new("42 3.14 0");

    let t1 = lexer.next_token();
    assert_eq!(t1.kind, TokenKind::Integer);
    assert_eq!(t1.literal, "42");

    let t2 = lexer.next_token();
    assert_eq!(t2.kind, TokenKind::Float);
    assert_eq!(t2.literal, "3.14");

    let t3 = lexer.next_token();
    assert_eq!(t3.kind, TokenKind::Integer);
    assert_eq!(t3.literal, "0");
}

#[test]
fn test_lex_rtime_units() {
    for source in ["250ms", "30s", "5m", "2h", "1d", "1y"] {
        let token = Lexer::new(source).next_token();
        assert_eq!(token.kind, TokenKind::Rtime, "unit in {}", source);
        assert_eq!(token.literal, source);
    }

    let bad = Lexer::new("10q").next_token();
    assert_eq!(bad.kind, TokenKind::Illegal);
}

#[test]
fn test_lex_string_offset() {
    let mut lexer = Lexer::new(r#""hello world""#);
    let token = lexer.next_token();

    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.literal, "hello world");
    assert_eq!(token.offset, 2);
    assert_pos(&token, 1, 1);
}

#[test]
fn test_lex_brace_string() {
    let mut lexer = Lexer::new("{\"multi \"quoted\"\nline\"}");
    let token = lexer.next_token();

    assert_eq!(token.kind, TokenKind::String);
    assert_eq!(token.literal, "multi \"quoted\"\nline");
    assert_eq!(token.offset, 4);
}

#[test]
fn test_lex_unterminated_string_is_illegal() {
    let mut lexer = Lexer::new("\"dangling");
    let token = lexer.next_token();
    assert_eq!(token.kind, TokenKind::Illegal);
}

#[test]
fn test_lex_comments_carry_offsets() {
    let mut lexer = Lexer::new("# hash\n// slashes\n/* block */");

    let hash = lexer.next_token();
    assert_eq!(hash.kind, TokenKind::Comment);
    assert_eq!(hash.literal, " hash");
    assert_eq!(hash.offset, 1);

    assert_eq!(lexer.next_token().kind, TokenKind::Lf);

    let slashes = lexer.next_token();
    assert_eq!(slashes.kind, TokenKind::Comment);
    assert_eq!(slashes.literal, " slashes");
    assert_eq!(slashes.offset, 2);

    assert_eq!(lexer.next_token().kind, TokenKind::Lf);

    let block = lexer.next_token();
    assert_eq!(block.kind, TokenKind::Comment);
    assert_eq!(block.literal, " block ");
    assert_eq!(block.offset, 4);
}

#[test]
fn test_lex_line_feeds_are_tokens() {
    assert_eq!(
        kinds("set\n\nunset\n"),
        vec![
            TokenKind::Set,
            TokenKind::Lf,
            TokenKind::Lf,
            TokenKind::Unset,
            TokenKind::Lf,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn test_lex_multichar_operators() {
    let mut lexer = Lexer::new("== != ~ !~ >= <= && || += -= *= /= %= |= &= ^= <<= >>=");
    let expected = [
        TokenKind::Equal,
        TokenKind::NotEqual,
        TokenKind::Match,
        TokenKind::NotMatch,
        TokenKind::GreaterThanEqual,
        TokenKind::LessThanEqual,
        TokenKind::And,
        TokenKind::Or,
        TokenKind::AdditionAssign,
        TokenKind::SubtractionAssign,
        TokenKind::MultiplicationAssign,
        TokenKind::DivisionAssign,
        TokenKind::RemainderAssign,
        TokenKind::BitwiseOrAssign,
        TokenKind::BitwiseAndAssign,
        TokenKind::BitwiseXorAssign,
        TokenKind::LeftShiftAssign,
        TokenKind::RightShiftAssign,
        TokenKind::Eof,
    ];
    for kind in expected {
        assert_eq!(lexer.next_token().kind, kind);
    }
}

#[test]
fn test_lex_bare_star_and_ampersand_are_illegal() {
    assert_eq!(Lexer::new("*").next_token().kind, TokenKind::Illegal);
    assert_eq!(Lexer::new("&").next_token().kind, TokenKind::Illegal);
    assert_eq!(Lexer::new("^").next_token().kind, TokenKind::Illegal);
}

#[test]
fn test_lex_positions_across_lines() {
    let mut lexer = Lexer::new("set a;\n  set b;");

    let set1 = lexer.next_token();
    assert_pos(&set1, 1, 1);
    let a = lexer.next_token();
    assert_pos(&a, 1, 5);
    lexer.next_token(); // ;
    lexer.next_token(); // LF

    let set2 = lexer.next_token();
    assert_pos(&set2, 2, 3);
}

#[test]
fn test_lex_file_is_shared() {
    let mut lexer = Lexer::with_file("set x;", "main.vcl");
    let t1 = lexer.next_token();
    let t2 = lexer.next_token();
    assert_eq!(&*t1.file, "main.vcl");
    assert!(Rc::ptr_eq(&t1.file, &t2.file));
}

#[test]
fn test_line_text() {
    let mut lexer = Lexer::new("first\nsecond line\nthird");
    assert_eq!(lexer.line_text(2), Some("second line"));
    assert_eq!(lexer.line_text(1), Some("first"));
    assert_eq!(lexer.line_text(4), None);
    assert_eq!(lexer.line_text(0), None);
}

#[test]
fn test_tokenize_iterator_stops_after_eof() {
    let tokens: Vec<Token> = Lexer::new("x").tokenize().collect();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].kind, TokenKind::Ident);
    assert_eq!(tokens[1].kind, TokenKind::Eof);
}
