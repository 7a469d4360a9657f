// SPDX-License-Identifier: Apache-2.0

// End-to-end exercises of the public API: parse, query, extract.

use flatjson::{Document, Node, NodeKind, Parser, Status};

#[test]
fn example_document_end_to_end() {
    let input = br#"[null,{"x":1.5,"y":["Test",0x4048f5c3]},[1,-9223372036854775808]]"#;
    let mut nodes = [Node::EMPTY; 32];
    let mut parser = Parser::new(&input[..]);

    assert_eq!(parser.parse(&mut nodes), Status::Valid);
    assert_eq!(parser.node_count(), 13);
    let doc = Document::new(input, &nodes[..parser.node_count()]);

    let greeting = doc.resolve("[1].y[0]").unwrap();
    assert_eq!(greeting.kind(), NodeKind::String);
    let mut buf = [0u8; 16];
    let n = greeting.as_string(Some(&mut buf)).unwrap();
    assert_eq!(&buf[..n], b"Test");

    assert_eq!(doc.resolve("[1].y[1]").unwrap().as_float(), Ok(3.14f32));
    assert_eq!(doc.resolve("[2][-1]").unwrap().as_s64(), Ok(i64::MIN));
    assert!(doc.resolve("[0]").unwrap().is_null());
}

#[test]
fn boundary_integers() {
    let input = br#"{"umax": 18446744073709551615, "uover": 18446744073709551616,
                    "smin": -9223372036854775808, "sover": 9223372036854775808}"#;
    let mut nodes = [Node::EMPTY; 16];
    let mut parser = Parser::new(&input[..]);
    assert_eq!(parser.parse(&mut nodes), Status::Valid);
    let doc = Document::new(input, &nodes[..parser.node_count()]);

    assert_eq!(doc.resolve(".umax").unwrap().as_u64(), Ok(u64::MAX));
    assert!(doc.resolve(".uover").unwrap().as_u64().is_err());
    assert_eq!(doc.resolve(".smin").unwrap().as_s64(), Ok(i64::MIN));
    assert!(doc.resolve(".sover").unwrap().as_s64().is_err());
}

#[test]
fn unicode_escape_round_trip() {
    let input = br#"["\u0054\u0065\u0073\u0074", "sm\u00f8rrebr\u00f8d", "\ud83d\ude00"]"#;
    let mut nodes = [Node::EMPTY; 8];
    let mut parser = Parser::new(&input[..]);
    assert_eq!(parser.parse(&mut nodes), Status::Valid);
    let doc = Document::new(input, &nodes[..parser.node_count()]);

    let mut buf = [0u8; 32];
    let n = doc.resolve("[0]").unwrap().as_string(Some(&mut buf)).unwrap();
    assert_eq!(std::str::from_utf8(&buf[..n]), Ok("Test"));

    let n = doc.resolve("[1]").unwrap().as_string(Some(&mut buf)).unwrap();
    assert_eq!(std::str::from_utf8(&buf[..n]), Ok("smørrebrød"));

    let n = doc.resolve("[2]").unwrap().as_string(Some(&mut buf)).unwrap();
    assert_eq!(std::str::from_utf8(&buf[..n]), Ok("😀"));
}

#[test]
fn double_hex_is_bit_exact() {
    // -0.0, a subnormal, and an ordinary value, all as 16-digit
    // bit patterns.
    let values = [-0.0f64, f64::from_bits(1), 6.02214076e23];
    for value in values {
        let text = format!("[0x{:016x}]", value.to_bits());
        let mut nodes = [Node::EMPTY; 4];
        let mut parser = Parser::new(text.as_bytes());
        assert_eq!(parser.parse(&mut nodes), Status::Valid);
        let doc = Document::new(text.as_bytes(), &nodes[..parser.node_count()]);
        let decoded = doc.resolve("[0]").unwrap().as_double().unwrap();
        assert_eq!(decoded.to_bits(), value.to_bits());
    }
}

#[test]
fn grow_and_retry_loop() {
    let input = br#"{"a": [1, 2, 3], "b": {"c": [4, 5], "d": null}}"#;
    let mut parser = Parser::new(&input[..]);

    // The caller-driven recovery loop: double the buffer until the
    // parse fits. The engine itself never grows anything.
    let mut capacity = 1;
    let nodes = loop {
        let mut nodes = vec![Node::EMPTY; capacity];
        match parser.parse(&mut nodes) {
            Status::Valid => break nodes,
            Status::CapacityExceeded => capacity *= 2,
            other => panic!("unexpected status: {:?}", other),
        }
    };

    assert_eq!(parser.status(), Status::Valid);
    let doc = Document::new(input, &nodes[..parser.node_count()]);
    assert_eq!(doc.resolve(".b.c[1]").unwrap().as_u64(), Ok(5));
}

#[test]
fn error_message_shows_source_context() {
    let input = b"{\n  \"a\": 1,\n  \"b\" 2\n}\n";
    let mut nodes = [Node::EMPTY; 16];
    let mut parser = Parser::new(&input[..]);
    assert_eq!(parser.parse(&mut nodes), Status::SyntacticError);

    let message = parser.error_message();
    assert!(message.contains("colon expected"), "got: {message}");
    assert!(message.contains(">>> 2 <<<"), "got: {message}");
}
