// SPDX-License-Identifier: Apache-2.0

//! Path-expression resolver: walks the flattened document along the
//! sibling chains instead of scanning the whole buffer.
//!
//! A path is a sequence of steps. `.key` (or `."key"`) selects a key's
//! value in an object; `[i]` selects an array element, where `i` is an
//! unsigned decimal with an optional `-` prefix. Indices wrap modulo
//! the element count rather than erroring, and negative indices count
//! from the end, so `[-1]` is the last element.

use crate::codec;
use crate::node::NodeRef;

/// Resolves `path` starting at `start`, which must already match the
/// first step's kind (object for `.`, array for `[`). Returns `None`
/// when any step fails to match. The result may itself be a container,
/// usable as the start of a later resolution.
pub fn resolve<'a, 'b>(start: NodeRef<'a, 'b>, path: &str) -> Option<NodeRef<'a, 'b>> {
    let bytes = path.as_bytes();
    let mut pos = 0usize;
    let mut current = start;

    while pos < bytes.len() && !current.is_end_of_input() {
        match bytes[pos] {
            b'[' if current.is_array() => {
                let count = current.count().ok()?;
                pos += 1;
                if count == 0 {
                    return None;
                }

                let negative = bytes.get(pos) == Some(&b'-');
                if negative {
                    pos += 1;
                }
                let (magnitude, len) = codec::parse_u64(&bytes[pos..])?;
                pos += len;
                if bytes.get(pos) != Some(&b']') {
                    return None;
                }
                pos += 1;

                // Indices wrap instead of erroring; a negative index
                // counts back from the end (`-0` behaves as `0`).
                let count = count as u64;
                let mut index = if magnitude >= count {
                    magnitude % count
                } else {
                    magnitude
                };
                if negative && index != 0 {
                    index = count - index;
                }

                let mut node = current.first_child()?;
                for _ in 0..index {
                    node = node.next()?;
                }
                current = node;
            }
            b'.' if current.is_object() => {
                let count = current.count().ok()?;
                pos += 1;
                if count == 0 {
                    return None;
                }

                let mut node = current.first_child()?;
                loop {
                    if !node.is_key() {
                        return None;
                    }
                    // Stored key text includes the quotes; a quoted
                    // path step matches it verbatim, an unquoted one
                    // matches the interior.
                    let stored = node.as_string_view().ok()?;
                    if stored.len() < 2 {
                        return None;
                    }
                    let rest = &bytes[pos..];
                    let wanted = if rest.first() == Some(&b'"') {
                        stored
                    } else {
                        &stored[1..stored.len() - 1]
                    };
                    if rest.len() >= wanted.len() && &rest[..wanted.len()] == wanted {
                        pos += wanted.len();
                        current = node.value()?;
                        break;
                    }
                    node = node.next()?;
                }
            }
            _ => return None,
        }
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Document, Node};
    use crate::parser::{Parser, Status};

    fn parse_into<'a>(input: &'a [u8], nodes: &mut [Node]) -> usize {
        let mut parser = Parser::new(input);
        assert_eq!(parser.parse(nodes), Status::Valid);
        parser.node_count()
    }

    #[test]
    fn index_steps_and_wraparound() {
        let input = b"[10, 20]";
        let mut nodes = [Node::EMPTY; 8];
        let count = parse_into(input, &mut nodes);
        let doc = Document::new(input, &nodes[..count]);

        assert_eq!(doc.resolve("[0]").unwrap().as_u64(), Ok(10));
        assert_eq!(doc.resolve("[1]").unwrap().as_u64(), Ok(20));
        // Out-of-range indices wrap...
        assert_eq!(doc.resolve("[2]").unwrap().as_u64(), Ok(10));
        assert_eq!(doc.resolve("[5]").unwrap().as_u64(), Ok(20));
        // ...and negative indices count from the end.
        assert_eq!(
            doc.resolve("[-1]").unwrap().index(),
            doc.resolve("[1]").unwrap().index()
        );
        assert_eq!(doc.resolve("[-2]").unwrap().as_u64(), Ok(10));
        assert_eq!(doc.resolve("[-0]").unwrap().as_u64(), Ok(10));
    }

    #[test]
    fn key_steps_quoted_and_bare() {
        let input = br#"{"x": 1, "y": 2}"#;
        let mut nodes = [Node::EMPTY; 8];
        let count = parse_into(input, &mut nodes);
        let doc = Document::new(input, &nodes[..count]);

        assert_eq!(doc.resolve(".x").unwrap().as_u64(), Ok(1));
        assert_eq!(doc.resolve(".y").unwrap().as_u64(), Ok(2));
        assert_eq!(doc.resolve(".\"y\"").unwrap().as_u64(), Ok(2));
        assert!(doc.resolve(".z").is_none());
    }

    #[test]
    fn key_order_does_not_matter() {
        let mut nodes = [Node::EMPTY; 16];
        for input in [
            &br#"{"x": 1, "y": 2, "z": 3}"#[..],
            &br#"{"z": 3, "x": 1, "y": 2}"#[..],
            &br#"{"y": 2, "z": 3, "x": 1}"#[..],
        ] {
            let count = parse_into(input, &mut nodes);
            let doc = Document::new(input, &nodes[..count]);
            assert_eq!(doc.resolve(".x").unwrap().as_u64(), Ok(1));
            assert_eq!(doc.resolve(".y").unwrap().as_u64(), Ok(2));
            assert_eq!(doc.resolve(".z").unwrap().as_u64(), Ok(3));
        }
    }

    #[test]
    fn steps_compose_left_to_right() {
        let input = br#"[null, {"x": 1.5, "y": ["Test", 0x4048f5c3]}, [1, 2]]"#;
        let mut nodes = [Node::EMPTY; 16];
        let count = parse_into(input, &mut nodes);
        let doc = Document::new(input, &nodes[..count]);

        let test_string = doc.resolve("[1].y[0]").unwrap();
        let mut buf = [0u8; 8];
        let n = test_string.as_string(Some(&mut buf)).unwrap();
        assert_eq!(&buf[..n], b"Test");

        assert_eq!(doc.resolve("[1].y[1]").unwrap().as_float(), Ok(3.14f32));
        assert_eq!(doc.resolve("[2][-1]").unwrap().as_u64(), Ok(2));
    }

    #[test]
    fn result_may_be_a_container() {
        let input = br#"{"list": [7, 8, 9]}"#;
        let mut nodes = [Node::EMPTY; 16];
        let count = parse_into(input, &mut nodes);
        let doc = Document::new(input, &nodes[..count]);

        let list = doc.resolve(".list").unwrap();
        assert!(list.is_array());
        assert_eq!(list.count(), Ok(3));
        // Sub-resolution from the container continues where we left off.
        assert_eq!(list.resolve("[2]").unwrap().as_u64(), Ok(9));
    }

    #[test]
    fn kind_mismatches_are_not_found() {
        let input = br#"{"a": [1]}"#;
        let mut nodes = [Node::EMPTY; 8];
        let count = parse_into(input, &mut nodes);
        let doc = Document::new(input, &nodes[..count]);

        // `[` on an object, `.` on an array.
        assert!(doc.resolve("[0]").is_none());
        assert!(doc.resolve(".a.b").is_none());
        // Malformed index.
        assert!(doc.resolve(".a[x]").is_none());
        assert!(doc.resolve(".a[0").is_none());
    }

    #[test]
    fn empty_containers_resolve_to_nothing() {
        let input = br#"{"a": [], "b": {}}"#;
        let mut nodes = [Node::EMPTY; 8];
        let count = parse_into(input, &mut nodes);
        let doc = Document::new(input, &nodes[..count]);

        assert!(doc.resolve(".a[0]").is_none());
        assert!(doc.resolve(".b.k").is_none());
    }
}
