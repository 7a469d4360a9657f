// SPDX-License-Identifier: Apache-2.0

//! Recursive-descent builder: drives the scanner token by token,
//! validates the grammar, and appends nodes into the caller-supplied
//! buffer, threading the sibling chains as it goes.

use core::fmt::Write;

use log::debug;

use crate::error_log::ErrorLog;
use crate::node::{Node, Payload};
use crate::scanner::{Scanner, Token, TokenKind};

/// Hard bound on array/object nesting so pathological input cannot
/// exhaust the call stack.
pub const MAX_DEPTH: usize = 128;

/// Outcome of a parse attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No parse has run yet.
    NotRun,
    /// The document parsed completely.
    Valid,
    /// The scanner produced a malformed token.
    InvalidTokens,
    /// A well-formed token appeared in the wrong grammar position.
    SyntacticError,
    /// The node buffer filled up; re-parse into a larger one.
    CapacityExceeded,
}

/// Private abort marker; the reason lives in `Parser::status`.
struct Failed;

type Step = Result<(), Failed>;

/// Parses one input buffer into a flat node representation.
///
/// The parser borrows the input only; the destination buffer is handed
/// to each [`Parser::parse`] call, so a failed attempt can be retried
/// with a larger buffer on the same instance. The first lexical or
/// grammar error ends the attempt; exactly one diagnostic (with source
/// context) is produced per attempt.
pub struct Parser<'a> {
    input: &'a [u8],
    scanner: Scanner<'a>,
    status: Status,
    node_count: usize,
    capacity: usize,
    depth: usize,
    current: Token,
    log: ErrorLog,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Parser {
            input,
            scanner: Scanner::new(input),
            status: Status::NotRun,
            node_count: 0,
            capacity: 0,
            depth: 0,
            current: Token::end_of_input(0),
            log: ErrorLog::new(),
        }
    }

    /// Runs the parse from the beginning of the input into `nodes`.
    ///
    /// Re-pointing at a fresh, larger buffer and calling again is the
    /// recovery path for [`Status::CapacityExceeded`]. Once a run has
    /// returned [`Status::Valid`] further calls are no-ops.
    pub fn parse(&mut self, nodes: &mut [Node]) -> Status {
        if self.status == Status::Valid {
            return self.status;
        }
        self.scanner.reset();
        self.log.clear();
        self.status = Status::NotRun;
        self.node_count = 0;
        self.capacity = nodes.len();
        self.depth = 0;

        debug!(
            "parse: {} input bytes into {} node slots",
            self.input.len(),
            nodes.len()
        );

        if self.parse_document(nodes).is_ok() {
            self.status = Status::Valid;
        } else {
            self.log_source_context();
        }
        debug!("parse done: {:?}, {} nodes", self.status, self.node_count);
        self.status
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_valid(&self) -> bool {
        self.status == Status::Valid
    }

    /// Nodes written by the last parse attempt.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Capacity of the buffer the last parse attempt used.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Diagnostic text for the last failed attempt, empty on success.
    pub fn error_message(&self) -> &str {
        self.log.as_str()
    }

    fn advance(&mut self) {
        self.current = self.scanner.next_token();
    }

    fn parse_document(&mut self, nodes: &mut [Node]) -> Step {
        self.advance();
        let is_array = self.current.kind == TokenKind::ArrayBegin;
        let is_object = self.current.kind == TokenKind::ObjectBegin;
        // Bare scalars are not valid at top level.
        self.expect(nodes, is_array || is_object, "array or object expected")?;
        let root = self.push_node(nodes)?;
        if is_array {
            self.parse_array(nodes, root)?;
        } else {
            self.parse_object(nodes, root)?;
        }

        self.advance();
        self.expect(
            nodes,
            self.current.kind == TokenKind::EndOfInput,
            "end of input expected",
        )?;
        self.push_node(nodes)?;
        Ok(())
    }

    /// `array → '[' (value (',' value)*)? ']'`. The opening bracket has
    /// already been pushed as `container`.
    fn parse_array(&mut self, nodes: &mut [Node], container: usize) -> Step {
        self.enter()?;
        self.advance();
        if self.current.kind == TokenKind::ArrayEnd {
            self.depth -= 1;
            return Ok(());
        }

        let mut previous: Option<usize> = None;
        loop {
            let is_primitive = self.current.kind.is_primitive_value();
            let is_array = self.current.kind == TokenKind::ArrayBegin;
            let is_object = self.current.kind == TokenKind::ObjectBegin;
            let message = if previous.is_none() {
                "value or array end expected"
            } else {
                "value expected"
            };
            self.expect(nodes, is_primitive || is_array || is_object, message)?;

            let element = self.push_node(nodes)?;
            bump_count(nodes, container);
            if let Some(prev) = previous {
                nodes[prev].next = Some(element);
            }
            previous = Some(element);

            if is_array {
                self.parse_array(nodes, element)?;
            } else if is_object {
                self.parse_object(nodes, element)?;
            }

            self.advance();
            if self.current.kind == TokenKind::ArrayEnd {
                break;
            }
            self.expect(
                nodes,
                self.current.kind == TokenKind::Comma,
                "comma or array end expected",
            )?;
            self.advance();
        }
        self.depth -= 1;
        Ok(())
    }

    /// `object → '{' (string ':' value (',' string ':' value)*)? '}'`.
    /// Keys and values get their own parallel sibling chains.
    fn parse_object(&mut self, nodes: &mut [Node], container: usize) -> Step {
        self.enter()?;
        self.advance();
        if self.current.kind == TokenKind::ObjectEnd {
            self.depth -= 1;
            return Ok(());
        }

        let mut previous_key: Option<usize> = None;
        let mut previous_value: Option<usize> = None;
        loop {
            let message = if previous_value.is_none() {
                "string (key) or object end expected"
            } else {
                "string (key) expected"
            };
            self.expect(nodes, self.current.kind == TokenKind::String, message)?;
            self.current.kind = TokenKind::Key;

            let key = self.push_node(nodes)?;
            if let Some(prev) = previous_key {
                nodes[prev].next = Some(key);
            }
            previous_key = Some(key);

            self.advance();
            self.expect(
                nodes,
                self.current.kind == TokenKind::Colon,
                "colon expected",
            )?;

            self.advance();
            let is_primitive = self.current.kind.is_primitive_value();
            let is_array = self.current.kind == TokenKind::ArrayBegin;
            let is_object = self.current.kind == TokenKind::ObjectBegin;
            self.expect(nodes, is_primitive || is_array || is_object, "value expected")?;

            let value = self.push_node(nodes)?;
            bump_count(nodes, container);
            if let Some(prev) = previous_value {
                nodes[prev].next = Some(value);
            }
            previous_value = Some(value);

            if is_array {
                self.parse_array(nodes, value)?;
            } else if is_object {
                self.parse_object(nodes, value)?;
            }

            self.advance();
            if self.current.kind == TokenKind::ObjectEnd {
                break;
            }
            self.expect(
                nodes,
                self.current.kind == TokenKind::Comma,
                "comma or object end expected",
            )?;
            self.advance();
        }
        self.depth -= 1;
        Ok(())
    }

    /// Validates a grammar expectation. On a mismatch the current token
    /// becomes a syntactic-error node (or keeps its invalid kind), one
    /// diagnostic line is logged, the offending token is recorded in
    /// the buffer when room remains, and the parse unwinds.
    fn expect(&mut self, nodes: &mut [Node], expected: bool, message: &'static str) -> Step {
        if expected {
            return Ok(());
        }
        if self.current.kind == TokenKind::Invalid {
            self.status = Status::InvalidTokens;
            let reason = self.current.error.unwrap_or("invalid token");
            let _ = writeln!(
                self.log,
                "invalid token at line {}: {}",
                self.scanner.line(),
                reason
            );
        } else {
            self.current.kind = TokenKind::SyntacticError;
            self.status = Status::SyntacticError;
            let _ = writeln!(
                self.log,
                "syntactic error at line {}: {}",
                self.scanner.line(),
                message
            );
        }
        if self.node_count < self.capacity {
            nodes[self.node_count] = Node::from_token(&self.current);
            self.node_count += 1;
        }
        Err(Failed)
    }

    fn push_node(&mut self, nodes: &mut [Node]) -> Result<usize, Failed> {
        if self.node_count >= nodes.len() {
            self.status = Status::CapacityExceeded;
            let _ = writeln!(
                self.log,
                "node buffer capacity ({}) exceeded",
                nodes.len()
            );
            return Err(Failed);
        }
        nodes[self.node_count] = Node::from_token(&self.current);
        let index = self.node_count;
        self.node_count += 1;
        Ok(index)
    }

    fn enter(&mut self) -> Step {
        if self.depth >= MAX_DEPTH {
            self.status = Status::SyntacticError;
            let _ = writeln!(
                self.log,
                "syntactic error at line {}: nesting deeper than {} levels",
                self.scanner.line(),
                MAX_DEPTH
            );
            return Err(Failed);
        }
        self.depth += 1;
        Ok(())
    }

    /// Appends up to three source lines on either side of the offending
    /// token so the error can be located in the input.
    fn log_source_context(&mut self) {
        const CONTEXT_LINES: usize = 3;

        let start = self.current.span.start.min(self.input.len());
        let end = (start + self.current.span.len).min(self.input.len());

        let mut before = start;
        let mut newlines = 0;
        while before > 0 && newlines < CONTEXT_LINES {
            before -= 1;
            if self.input[before] == b'\n' {
                newlines += 1;
            }
        }
        if newlines == CONTEXT_LINES {
            before += 1;
        }

        let mut after = end;
        newlines = 0;
        while after < self.input.len() && newlines < CONTEXT_LINES {
            if self.input[after] == b'\n' {
                newlines += 1;
            }
            after += 1;
        }

        let before_text = core::str::from_utf8(&self.input[before..start]).unwrap_or("");
        let token_text = core::str::from_utf8(&self.input[start..end]).unwrap_or("");
        let after_text = core::str::from_utf8(&self.input[end..after]).unwrap_or("");
        let _ = write!(
            self.log,
            "...\n{} >>> {} <<< {}\n...\n",
            before_text, token_text, after_text
        );
    }
}

fn bump_count(nodes: &mut [Node], index: usize) {
    if let Payload::Count(count) = &mut nodes[index].payload {
        *count += 1;
    }
}
