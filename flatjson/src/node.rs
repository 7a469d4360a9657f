// SPDX-License-Identifier: Apache-2.0

//! The flattened document representation: nodes stored in pre-order in
//! a caller-owned buffer, linked by index-based `next` relations, plus
//! the read-only accessors defined over them.
//!
//! A container node is immediately followed in buffer order by its
//! first child's entire subtree, so "first child" is always "the very
//! next slot" and `next` hops over arbitrarily deep subtrees in O(1).

use crate::codec::{self, CodecError};
use crate::scanner::{Span, Token, TokenKind};

/// Kind of a persisted node. Mirrors the token kinds that survive
/// parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Invalid,
    Array,
    Object,
    True,
    False,
    Null,
    Number,
    FloatHex,
    DoubleHex,
    String,
    Key,
    EndOfInput,
    SyntacticError,
}

/// Per-node storage: scalar values and keys keep a view into the input
/// text, containers keep their direct child count. Which variant is
/// valid is fully determined by the node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Text(Span),
    Count(usize),
}

/// One persisted element of a parsed document. Plain `Copy` data with
/// index-based links, so a node buffer is trivially relocatable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub(crate) kind: NodeKind,
    pub(crate) payload: Payload,
    /// Next array element, next key in the same object, or value of
    /// the following key, depending on this node's role. `None` for
    /// the last link of a chain and for nodes outside any container.
    pub(crate) next: Option<usize>,
}

impl Node {
    /// Placeholder entry for pre-sizing node buffers.
    pub const EMPTY: Node = Node {
        kind: NodeKind::Invalid,
        payload: Payload::Count(0),
        next: None,
    };

    pub(crate) fn from_token(token: &Token) -> Node {
        let kind = match token.kind {
            TokenKind::ArrayBegin => {
                return Node {
                    kind: NodeKind::Array,
                    payload: Payload::Count(0),
                    next: None,
                }
            }
            TokenKind::ObjectBegin => {
                return Node {
                    kind: NodeKind::Object,
                    payload: Payload::Count(0),
                    next: None,
                }
            }
            TokenKind::True => NodeKind::True,
            TokenKind::False => NodeKind::False,
            TokenKind::Null => NodeKind::Null,
            TokenKind::Number => NodeKind::Number,
            TokenKind::FloatHex => NodeKind::FloatHex,
            TokenKind::DoubleHex => NodeKind::DoubleHex,
            TokenKind::String => NodeKind::String,
            TokenKind::Key => NodeKind::Key,
            TokenKind::EndOfInput => NodeKind::EndOfInput,
            TokenKind::SyntacticError => NodeKind::SyntacticError,
            TokenKind::Invalid => NodeKind::Invalid,
            // Structural punctuation never reaches the node buffer.
            TokenKind::ArrayEnd | TokenKind::ObjectEnd | TokenKind::Colon | TokenKind::Comma => {
                debug_assert!(false, "structural token pushed as node");
                NodeKind::Invalid
            }
        };
        Node {
            kind,
            payload: Payload::Text(token.span),
            next: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }
}

/// Failure modes of the typed accessors. A `KindMismatch` is a caller
/// contract violation (wrong node kind for the requested type) and is
/// reported as an error rather than a fabricated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The node kind is incompatible with the requested type.
    KindMismatch,
    /// The literal text does not produce a value of the requested type,
    /// including integer overflow.
    Malformed,
    /// Decimal floating point support is compiled out (`float` feature).
    FloatDisabled,
    /// String transcoding failed.
    Codec(CodecError),
}

impl From<CodecError> for AccessError {
    fn from(err: CodecError) -> Self {
        AccessError::Codec(err)
    }
}

/// Read-only view over one parse result: the original input bytes and
/// the filled prefix of the node buffer.
#[derive(Clone, Copy)]
pub struct Document<'a, 'b> {
    input: &'a [u8],
    nodes: &'b [Node],
}

impl<'a, 'b> Document<'a, 'b> {
    /// Wraps the input and the first `node_count` entries of the buffer
    /// a parser filled. Nothing is copied.
    pub fn new(input: &'a [u8], nodes: &'b [Node]) -> Self {
        Document { input, nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<NodeRef<'a, 'b>> {
        if index < self.nodes.len() {
            Some(NodeRef { doc: *self, index })
        } else {
            None
        }
    }

    /// The root container of a valid document.
    pub fn root(&self) -> Option<NodeRef<'a, 'b>> {
        self.node(0)
    }

    /// Resolves a path expression starting at the root.
    pub fn resolve(&self, path: &str) -> Option<NodeRef<'a, 'b>> {
        crate::path::resolve(self.root()?, path)
    }
}

/// A node plus the document it lives in. Cheap to copy; all reads go
/// back through the document's buffers.
#[derive(Clone, Copy)]
pub struct NodeRef<'a, 'b> {
    doc: Document<'a, 'b>,
    index: usize,
}

impl<'a, 'b> NodeRef<'a, 'b> {
    fn node(&self) -> &'b Node {
        // Index validity is established at construction and the slice
        // is immutable for our lifetime.
        &self.doc.nodes[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind
    }

    /// First item of an array or first key of an object: the very next
    /// slot, by the pre-order invariant. `None` for empty containers
    /// and non-containers.
    pub fn first_child(&self) -> Option<NodeRef<'a, 'b>> {
        match self.node().payload {
            Payload::Count(count) if self.is_container() && count > 0 => {
                self.doc.node(self.index + 1)
            }
            _ => None,
        }
    }

    /// The value a key is bound to (the slot after the key), the node
    /// itself if it already is a value, `None` otherwise.
    pub fn value(&self) -> Option<NodeRef<'a, 'b>> {
        if self.is_key() {
            self.doc.node(self.index + 1)
        } else if self.is_value() {
            Some(*self)
        } else {
            None
        }
    }

    /// The stored `next` relation, verbatim: next array element, next
    /// key, or next key's value. Skips whole subtrees in one hop.
    pub fn next(&self) -> Option<NodeRef<'a, 'b>> {
        self.node().next.and_then(|index| self.doc.node(index))
    }

    /// Direct child count of a container node.
    pub fn count(&self) -> Result<usize, AccessError> {
        match self.node().payload {
            Payload::Count(count) if self.is_container() => Ok(count),
            _ => Err(AccessError::KindMismatch),
        }
    }

    pub fn is_key(&self) -> bool {
        self.kind() == NodeKind::Key
    }

    pub fn is_value(&self) -> bool {
        !self.is_key() && !self.is_invalid()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind(), NodeKind::Array | NodeKind::Object)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.kind(), NodeKind::Invalid | NodeKind::SyntacticError)
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self.kind(),
            NodeKind::Number | NodeKind::FloatHex | NodeKind::DoubleHex
        )
    }

    pub fn is_bool(&self) -> bool {
        matches!(self.kind(), NodeKind::True | NodeKind::False)
    }

    pub fn is_string(&self) -> bool {
        matches!(self.kind(), NodeKind::String | NodeKind::Key)
    }

    pub fn is_null(&self) -> bool {
        self.kind() == NodeKind::Null
    }

    pub fn is_array(&self) -> bool {
        self.kind() == NodeKind::Array
    }

    pub fn is_object(&self) -> bool {
        self.kind() == NodeKind::Object
    }

    pub fn is_end_of_input(&self) -> bool {
        self.kind() == NodeKind::EndOfInput
    }

    /// The literal input text behind this node. Containers hold a
    /// count, not text, so they fail here.
    fn text(&self) -> Result<&'a [u8], AccessError> {
        match self.node().payload {
            Payload::Text(span) => Ok(span.slice(self.doc.input)),
            Payload::Count(_) => Err(AccessError::KindMismatch),
        }
    }

    pub fn as_bool(&self) -> Result<bool, AccessError> {
        match self.kind() {
            NodeKind::True => Ok(true),
            NodeKind::False => Ok(false),
            _ => Err(AccessError::KindMismatch),
        }
    }

    /// Single-precision read: a `FloatHex` bit pattern directly, or a
    /// plain number / `DoubleHex` narrowed through `f64`.
    pub fn as_float(&self) -> Result<f32, AccessError> {
        match self.kind() {
            NodeKind::FloatHex => Ok(codec::hex_to_f32(self.text()?)?),
            NodeKind::Number | NodeKind::DoubleHex => Ok(self.as_double()? as f32),
            _ => Err(AccessError::KindMismatch),
        }
    }

    /// Double-precision read: a plain decimal number (with the `float`
    /// feature), a `DoubleHex` bit pattern, or a `FloatHex` pattern
    /// widened to the nearest double.
    pub fn as_double(&self) -> Result<f64, AccessError> {
        match self.kind() {
            NodeKind::Number => self.decimal_as_double(),
            NodeKind::DoubleHex => Ok(codec::hex_to_f64(self.text()?)?),
            NodeKind::FloatHex => Ok(codec::hex_to_f32(self.text()?)? as f64),
            _ => Err(AccessError::KindMismatch),
        }
    }

    #[cfg(feature = "float")]
    fn decimal_as_double(&self) -> Result<f64, AccessError> {
        let text = core::str::from_utf8(self.text()?).map_err(|_| AccessError::Malformed)?;
        text.parse::<f64>().map_err(|_| AccessError::Malformed)
    }

    #[cfg(not(feature = "float"))]
    fn decimal_as_double(&self) -> Result<f64, AccessError> {
        Err(AccessError::FloatDisabled)
    }

    pub fn as_u64(&self) -> Result<u64, AccessError> {
        if self.kind() != NodeKind::Number {
            return Err(AccessError::KindMismatch);
        }
        codec::parse_u64(self.text()?)
            .map(|(value, _)| value)
            .ok_or(AccessError::Malformed)
    }

    pub fn as_s64(&self) -> Result<i64, AccessError> {
        if self.kind() != NodeKind::Number {
            return Err(AccessError::KindMismatch);
        }
        codec::parse_s64(self.text()?)
            .map(|(value, _)| value)
            .ok_or(AccessError::Malformed)
    }

    /// Unescapes a string or key node into `dest` and returns the byte
    /// count written. With `dest == None` nothing is written and the
    /// count that a filling call would produce is returned instead, for
    /// the measure-then-fill pattern.
    pub fn as_string(&self, dest: Option<&mut [u8]>) -> Result<usize, AccessError> {
        if !self.is_string() {
            return Err(AccessError::KindMismatch);
        }
        let raw = self.text()?;
        if raw.len() < 2 {
            return Err(AccessError::Malformed);
        }
        // Quotation marks are part of the stored span; skip them.
        Ok(codec::unescape(&raw[1..raw.len() - 1], dest)?)
    }

    /// The raw literal text of any non-container node, quotes and all.
    /// Containers hold a count instead of text, so asking for their
    /// view is a usage error.
    pub fn as_string_view(&self) -> Result<&'a [u8], AccessError> {
        if self.is_container() {
            return Err(AccessError::KindMismatch);
        }
        self.text()
    }

    /// Resolves a path expression with this node as the starting point.
    pub fn resolve(&self, path: &str) -> Option<NodeRef<'a, 'b>> {
        crate::path::resolve(*self, path)
    }
}

impl core::fmt::Debug for NodeRef<'_, '_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodeRef({}, {:?})", self.index, self.kind())
    }
}
