// SPDX-License-Identifier: Apache-2.0

//! A non-allocating JSON parser and query engine.
//!
//! The parser flattens a document into a caller-supplied buffer of
//! [`Node`]s stored in pre-order: a container is immediately followed
//! by its first child's entire subtree, and lightweight index-based
//! `next` links connect array elements, object keys, and the values
//! bound to keys. The engine itself never allocates; when the buffer
//! is too small the parse reports [`Status::CapacityExceeded`] and the
//! caller retries with a larger one.
//!
//! Beyond standard JSON, the input dialect accepts hex bit-pattern
//! float literals (`0x` plus exactly 8 or 16 hex digits) so IEEE-754
//! values survive text serialization without decimal rounding.
//!
//! ```
//! use flatjson::{Document, Node, Parser, Status};
//!
//! let input = br#"{"pi": 0x4048f5c3, "tags": ["a", "b"]}"#;
//! let mut nodes = [Node::EMPTY; 16];
//! let mut parser = Parser::new(input);
//! assert_eq!(parser.parse(&mut nodes), Status::Valid);
//!
//! let doc = Document::new(input, &nodes[..parser.node_count()]);
//! assert_eq!(doc.resolve(".pi").unwrap().as_float(), Ok(3.14));
//! assert_eq!(doc.resolve(".tags[-1]").unwrap().as_string(None), Ok(1));
//! ```

#![cfg_attr(not(test), no_std)]

mod codec;
mod error_log;
mod node;
mod parser;
mod path;
mod scanner;

pub use codec::{
    codepoint_at, hex_to_f32, hex_to_f64, parse_s64, parse_u64, unescape, utf8_len, CodecError,
};
pub use error_log::{ErrorLog, ERROR_LOG_CAPACITY};
pub use node::{AccessError, Document, Node, NodeKind, NodeRef, Payload};
pub use parser::{Parser, Status, MAX_DEPTH};
pub use path::resolve;
pub use scanner::{Scanner, Span, Token, TokenKind};
