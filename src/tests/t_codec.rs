use super::*;
use crate::ast::{
    Expression, FloatLiteral, IntegerLiteral, Meta, Program, Statement, StringLiteral,
};
use indoc::indoc;

fn codec() -> Codec {
    Codec::new()
}

fn encode_expression(expression: &Expression) -> Vec<u8> {
    let mut buf = Vec::new();
    codec()
        .encode_expression(&mut buf, expression)
        .expect("failed to encode");
    buf
}

fn decode_expression(bytes: &[u8]) -> Expression {
    let mut reader = FrameReader::new(bytes);
    codec()
        .decode_expression(&mut reader)
        .expect("failed to decode")
}

fn encode_program(program: &Program) -> Vec<u8> {
    let mut buf = Vec::new();
    codec()
        .encode_program(&mut buf, program)
        .expect("failed to encode");
    buf
}

fn parse_program(source: &str) -> Program {
    crate::parse::parse(source, "test.vcl").expect("failed to parse")
}

/// Round-trips a program and asserts the re-encoded bytes are identical.
/// Trivia is not encoded, so byte equality is exactly structural equality.
fn assert_program_round_trip(source: &str) {
    let program = parse_program(source);
    let encoded = encode_program(&program);

    let mut reader = FrameReader::new(encoded.as_slice());
    let decoded = codec()
        .decode_program(&mut reader)
        .expect("failed to decode");

    let re_encoded = encode_program(&decoded);
    assert_eq!(encoded, re_encoded);
}

#[test]
fn test_integer_round_trip_full_range() {
    for value in [i64::MIN, -99, 0, 9999, i64::MAX] {
        let original = Expression::Integer(IntegerLiteral {
            meta: Meta::detached(),
            value,
        });
        match decode_expression(&encode_expression(&original)) {
            Expression::Integer(decoded) => assert_eq!(decoded.value, value),
            other => panic!("expected integer, got {:?}", other),
        }
    }
}

#[test]
fn test_float_round_trip_is_bitwise() {
    for value in [0.0f64, -0.0, 1.5, f64::INFINITY, f64::NEG_INFINITY, f64::MIN] {
        let original = Expression::Float(FloatLiteral {
            meta: Meta::detached(),
            value,
        });
        match decode_expression(&encode_expression(&original)) {
            Expression::Float(decoded) => {
                assert_eq!(decoded.value.to_be_bytes(), value.to_be_bytes())
            }
            other => panic!("expected float, got {:?}", other),
        }
    }
}

#[test]
fn test_string_round_trip_multibyte() {
    let value = "café — \u{1F980} straße";
    let original = Expression::String(StringLiteral {
        meta: Meta::detached(),
        value: value.to_string(),
    });
    match decode_expression(&encode_expression(&original)) {
        Expression::String(decoded) => assert_eq!(decoded.value, value),
        other => panic!("expected string, got {:?}", other),
    }
}

#[test]
fn test_string_at_frame_limit() {
    let value = "x".repeat(65535);
    let original = Expression::String(StringLiteral {
        meta: Meta::detached(),
        value: value.clone(),
    });
    match decode_expression(&encode_expression(&original)) {
        Expression::String(decoded) => assert_eq!(decoded.value.len(), 65535),
        other => panic!("expected string, got {:?}", other),
    }
}

#[test]
fn test_string_over_frame_limit_is_oversize() {
    let original = Expression::String(StringLiteral {
        meta: Meta::detached(),
        value: "x".repeat(65536),
    });
    let mut buf = Vec::new();
    match codec().encode_expression(&mut buf, &original) {
        Err(CodecError::Oversize) => {}
        other => panic!("expected oversize error, got {:?}", other),
    }
}

#[test]
fn test_expression_tree_round_trip() {
    let program = parse_program(indoc! {r#"
        sub vcl_recv {
            set req.http.X = if(req.restarts > 0 && !req.http.Done, "retry", req.http.Mode + "-suffix");
        }
    "#});
    let encoded = encode_program(&program);

    let mut reader = FrameReader::new(encoded.as_slice());
    let decoded = codec().decode_program(&mut reader).unwrap();

    assert_eq!(encoded, encode_program(&decoded));
}

#[test]
fn test_acl_round_trip() {
    assert_program_round_trip(indoc! {r#"
        acl office {
            "192.168.0.1";
            "10.0.0.0"/8;
            !"10.1.2.3";
        }
    "#});
}

#[test]
fn test_backend_and_director_round_trip() {
    assert_program_round_trip(indoc! {r#"
        backend origin {
            .host = "origin.example.com";
            .port = "443";
            .probe = {
                .request = "HEAD / HTTP/1.1";
                .timeout = 2s;
            }
        }

        director pool random {
            .quorum = 50;
            { .backend = origin; .weight = 2; }
        }
    "#});
}

#[test]
fn test_table_round_trip() {
    assert_program_round_trip(indoc! {r#"
        table redirects {
            "/old": "/new",
        }

        table weights INTEGER {
            "a": 1,
        }
    "#});
}

#[test]
fn test_control_flow_round_trip() {
    assert_program_round_trip(indoc! {r#"
        sub vcl_recv {
            if (req.http.A == "1") {
                restart;
            } else if (req.http.B == "1") {
                esi;
            } else {
                error 503 "down";
            }

            switch (req.http.Host) {
            case "a":
                set req.http.X = "a";
                fallthrough;
            case ~"^b":
                break;
            default:
                break;
            }

            goto done;
            done:
            return(lookup);
        }
    "#});
}

#[test]
fn test_subroutine_shapes_round_trip() {
    assert_program_round_trip(indoc! {r#"
        sub helper STRING {
            declare local var.out STRING;
            set var.out = "x";
            return var.out;
        }

        penaltybox abusers {
        }

        ratecounter hits {
        }

        sub vcl_recv {
            call other;
            unset req.http.Cookie;
            log "hello";
            synthetic {"<html></html>"};
        }
    "#});
}

#[test]
fn test_return_parenthesis_survives_round_trip() {
    let program = parse_program(indoc! {r#"
        sub pick STRING {
            return "bare";
        }

        sub vcl_recv {
            return(lookup);
        }
    "#});
    let encoded = encode_program(&program);

    let mut reader = FrameReader::new(encoded.as_slice());
    let decoded = codec().decode_program(&mut reader).unwrap();

    let returns: Vec<_> = decoded
        .subroutines()
        .map(|sub| match &sub.block.statements[0] {
            Statement::Return(stmt) => stmt,
            other => panic!("expected return statement, got {:?}", other),
        })
        .collect();
    assert!(!returns[0].has_parenthesis);
    assert!(returns[0].expression.is_some());
    assert!(returns[1].has_parenthesis);
}

#[test]
fn test_decoded_trivia_is_detached() {
    let program = parse_program(indoc! {r#"
        sub vcl_recv {
            # leading comment survives parsing but not encoding
            restart;
        }
    "#});
    let encoded = encode_program(&program);

    let mut reader = FrameReader::new(encoded.as_slice());
    let decoded = codec().decode_program(&mut reader).unwrap();

    let sub = decoded.subroutines().next().unwrap();
    let meta = sub.block.statements[0].meta();
    assert!(meta.leading.is_empty());
    assert_eq!(meta.token.line, 0);
}

#[test]
fn test_empty_stream_decodes_to_empty_program() {
    let mut reader = FrameReader::new(&[][..]);
    let program = codec().decode_program(&mut reader).unwrap();
    assert!(program.body.is_empty());
}

#[test]
fn test_truncated_stream() {
    let program = parse_program("sub vcl_recv {\n    restart;\n}\n");
    let mut encoded = encode_program(&program);
    encoded.truncate(encoded.len() - 2);

    let mut reader = FrameReader::new(encoded.as_slice());
    match codec().decode_program(&mut reader) {
        Err(CodecError::Truncated) | Err(CodecError::UnexpectedEof) => {}
        other => panic!("expected truncation error, got {:?}", other),
    }
}

#[test]
fn test_unknown_tag_rejected() {
    let bytes = [0xffu8, 0x00, 0x00];
    let mut reader = FrameReader::new(&bytes[..]);
    match codec().decode_program(&mut reader) {
        Err(CodecError::UnknownTag(0xff)) => {}
        other => panic!("expected unknown-tag error, got {:?}", other),
    }
}

#[test]
fn test_unexpected_fin_rejected() {
    // A FIN frame in node position is a protocol error.
    let bytes = [Tag::Fin as u8, 0x00, 0x00];
    let mut reader = FrameReader::new(&bytes[..]);
    match codec().decode_program(&mut reader) {
        Err(CodecError::UnexpectedFin) => {}
        other => panic!("expected unexpected-fin error, got {:?}", other),
    }
}

#[test]
fn test_tag_mismatch_reports_names() {
    // An ACL must open with its name; a BOOL child in that slot is a
    // mismatch.
    let bytes = [
        Tag::Acl as u8,
        0x00,
        0x00,
        Tag::Bool as u8,
        0x00,
        0x01,
        0x01,
    ];
    let mut reader = FrameReader::new(&bytes[..]);
    match codec().decode_program(&mut reader) {
        Err(CodecError::TagMismatch { expected, found }) => {
            assert_eq!(expected, "IDENT");
            assert_eq!(found, "BOOL");
        }
        other => panic!("expected tag mismatch, got {:?}", other),
    }
}

#[test]
fn test_frame_reader_peek_does_not_consume() {
    let value = Expression::Integer(IntegerLiteral {
        meta: Meta::detached(),
        value: 7,
    });
    let bytes = encode_expression(&value);

    let mut reader = FrameReader::new(bytes.as_slice());
    assert_eq!(reader.peek_tag().unwrap(), Some(Tag::Integer));
    assert_eq!(reader.peek_tag().unwrap(), Some(Tag::Integer));

    let frame = reader.next_frame().unwrap().unwrap();
    assert_eq!(frame.tag, Tag::Integer);
    assert_eq!(frame.payload, 7i64.to_be_bytes());
    assert!(reader.next_frame().unwrap().is_none());
}
