// SPDX-License-Identifier: Apache-2.0

//! Lexical scanner: classifies raw input bytes into transient tokens,
//! one at a time. Tokens borrow the input through byte spans and are
//! never retained across scan steps.

use crate::codec;
use log::trace;

/// A byte range into the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    /// The bytes this span covers, or an empty slice if the span is out
    /// of range for `input`.
    pub fn slice(self, input: &[u8]) -> &[u8] {
        input.get(self.start..self.start + self.len).unwrap_or(&[])
    }
}

/// Lexical classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A malformed token; the scanner resynchronizes after producing one.
    Invalid,
    ArrayBegin,
    ObjectBegin,
    ArrayEnd,
    ObjectEnd,
    Colon,
    Comma,
    True,
    False,
    Null,
    Number,
    String,
    /// 8 hex digits carrying the bit pattern of an `f32`.
    FloatHex,
    /// 16 hex digits carrying the bit pattern of an `f64`.
    DoubleHex,
    /// A string in object-key position; assigned by the parser, never
    /// produced by the scanner.
    Key,
    EndOfInput,
    /// A grammar violation; assigned by the parser, never produced by
    /// the scanner.
    SyntacticError,
}

impl TokenKind {
    /// True for tokens that stand on their own as JSON values.
    pub(crate) fn is_primitive_value(self) -> bool {
        matches!(
            self,
            TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::FloatHex
                | TokenKind::DoubleHex
        )
    }
}

/// One lexical unit: a kind, the input bytes it covers, and a short
/// reason string when the kind is [`TokenKind::Invalid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub error: Option<&'static str>,
}

impl Token {
    pub(crate) const fn end_of_input(at: usize) -> Self {
        Token {
            kind: TokenKind::EndOfInput,
            span: Span { start: at, len: 0 },
            error: None,
        }
    }
}

/// Single-pass scanner over a byte buffer.
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Scanner {
            input,
            pos: 0,
            line: 1,
        }
    }

    /// Rewinds to the start of the input for a fresh scan.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.line = 1;
    }

    /// 1-based line of the current position, for diagnostics.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Produces the next token, skipping leading whitespace. After an
    /// [`TokenKind::Invalid`] token the scanner has already advanced to
    /// the next byte that could legally start a token, so one bad token
    /// does not desynchronize the rest of the scan.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.pos;

        let Some(&byte) = self.input.get(self.pos) else {
            return Token::end_of_input(start);
        };

        let (kind, error) = match byte {
            b'0'..=b'9' | b'-' => {
                if self.input.get(self.pos + 1) == Some(&b'x') {
                    self.pos += 2;
                    match self.match_hex_digits() {
                        8 => (TokenKind::FloatHex, None),
                        16 => (TokenKind::DoubleHex, None),
                        _ => (
                            TokenKind::Invalid,
                            Some("floating point number in hexadecimal expected"),
                        ),
                    }
                } else if self.match_number() {
                    (TokenKind::Number, None)
                } else {
                    (TokenKind::Invalid, Some("number expected"))
                }
            }
            b'"' => {
                if self.match_string() {
                    (TokenKind::String, None)
                } else {
                    (TokenKind::Invalid, Some("string expected"))
                }
            }
            b't' => {
                if self.match_literal(b"rue") {
                    (TokenKind::True, None)
                } else {
                    (TokenKind::Invalid, Some("true expected"))
                }
            }
            b'f' => {
                if self.match_literal(b"alse") {
                    (TokenKind::False, None)
                } else {
                    (TokenKind::Invalid, Some("false expected"))
                }
            }
            b'n' => {
                if self.match_literal(b"ull") {
                    (TokenKind::Null, None)
                } else {
                    (TokenKind::Invalid, Some("null expected"))
                }
            }
            b'{' => self.structural(TokenKind::ObjectBegin),
            b'[' => self.structural(TokenKind::ArrayBegin),
            b'}' => self.structural(TokenKind::ObjectEnd),
            b']' => self.structural(TokenKind::ArrayEnd),
            b':' => self.structural(TokenKind::Colon),
            b',' => self.structural(TokenKind::Comma),
            _ => (TokenKind::Invalid, Some("invalid character")),
        };

        if kind == TokenKind::Invalid {
            self.resync();
        }

        let token = Token {
            kind,
            span: Span {
                start,
                len: self.pos - start,
            },
            error,
        };
        trace!(
            "token {:?} at {}..{}",
            token.kind,
            token.span.start,
            token.span.start + token.span.len
        );
        token
    }

    fn structural(&mut self, kind: TokenKind) -> (TokenKind, Option<&'static str>) {
        self.pos += 1;
        (kind, None)
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.input.get(self.pos) {
            match b {
                b'\n' => {
                    self.line += 1;
                    self.pos += 1;
                }
                b' ' | b'\t' | b'\r' => self.pos += 1,
                _ => break,
            }
        }
    }

    /// Skips past the offending byte, then forward to the next byte
    /// that can begin a token.
    fn resync(&mut self) {
        self.pos = (self.pos + 1).min(self.input.len());
        while let Some(&b) = self.input.get(self.pos) {
            if Self::can_start_token(b) {
                break;
            }
            self.pos += 1;
        }
    }

    fn can_start_token(byte: u8) -> bool {
        matches!(
            byte,
            b' ' | b'\t'
                | b'\n'
                | b'\r'
                | b'{'
                | b'['
                | b'}'
                | b']'
                | b':'
                | b','
                | b'0'..=b'9'
                | b't'
                | b'f'
                | b'n'
        )
    }

    fn match_hex_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(&b) = self.input.get(self.pos) {
            if !b.is_ascii_hexdigit() {
                break;
            }
            count += 1;
            self.pos += 1;
        }
        count
    }

    fn match_number(&mut self) -> bool {
        if self.input.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        match self.input.get(self.pos) {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => {
                self.pos += 1;
                while matches!(self.input.get(self.pos), Some(b) if b.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
            _ => return false,
        }
        if self.input.get(self.pos) == Some(&b'.') {
            self.pos += 1;
            if !self.match_digit_run() {
                return false;
            }
        }
        if matches!(self.input.get(self.pos), Some(b'e') | Some(b'E')) {
            self.pos += 1;
            if matches!(self.input.get(self.pos), Some(b'+') | Some(b'-')) {
                self.pos += 1;
            }
            if !self.match_digit_run() {
                return false;
            }
        }
        true
    }

    fn match_digit_run(&mut self) -> bool {
        let mut seen = false;
        while matches!(self.input.get(self.pos), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
            seen = true;
        }
        seen
    }

    /// Consumes a string token starting at the opening quote. On
    /// failure the position is left at the offending byte, not the
    /// closing quote.
    fn match_string(&mut self) -> bool {
        self.pos += 1;
        while let Some(&byte) = self.input.get(self.pos) {
            match byte {
                b'"' => {
                    self.pos += 1;
                    return true;
                }
                b'\\' => {
                    self.pos += 1;
                    match self.input.get(self.pos) {
                        Some(
                            b'\\' | b'/' | b'"' | b'0' | b'a' | b'b' | b't' | b'v' | b'f'
                            | b'r' | b'n',
                        ) => self.pos += 1,
                        Some(b'u') => {
                            self.pos += 1;
                            for _ in 0..4 {
                                match self.input.get(self.pos) {
                                    Some(h) if h.is_ascii_hexdigit() => self.pos += 1,
                                    _ => return false,
                                }
                            }
                        }
                        _ => return false,
                    }
                }
                // Raw control bytes must be escaped; so must `/` in
                // this dialect.
                0x00..=0x1F | b'/' => return false,
                0x20..=0x7F => self.pos += 1,
                _ => {
                    let len = codec::utf8_len(byte);
                    if len == 0 {
                        return false;
                    }
                    self.pos += len;
                }
            }
        }
        false // unterminated
    }

    /// Matches the tail of `true`/`false`/`null`; the first byte was
    /// already inspected by the caller.
    fn match_literal(&mut self, rest: &[u8]) -> bool {
        self.pos += 1;
        for &expected in rest {
            if self.input.get(self.pos) != Some(&expected) {
                return false;
            }
            self.pos += 1;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        let mut scanner = Scanner::new(input);
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token();
            let done = token.kind == TokenKind::EndOfInput;
            out.push(token.kind);
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn structural_and_literals() {
        use TokenKind::*;
        assert_eq!(
            kinds(b"[true, false, null]"),
            vec![ArrayBegin, True, Comma, False, Comma, Null, ArrayEnd, EndOfInput]
        );
        assert_eq!(
            kinds(b"{\"a\": 1}"),
            vec![ObjectBegin, String, Colon, Number, ObjectEnd, EndOfInput]
        );
    }

    #[test]
    fn numbers() {
        use TokenKind::*;
        assert_eq!(kinds(b"0"), vec![Number, EndOfInput]);
        assert_eq!(kinds(b"-12.5e+3"), vec![Number, EndOfInput]);
        // Leading zero ends the integer part: "01" is two tokens.
        assert_eq!(kinds(b"01"), vec![Number, Number, EndOfInput]);
        assert_eq!(kinds(b"-"), vec![Invalid, EndOfInput]);
        assert_eq!(kinds(b"1."), vec![Invalid, EndOfInput]);
        assert_eq!(kinds(b"1e"), vec![Invalid, EndOfInput]);
    }

    #[test]
    fn hex_float_tokens() {
        use TokenKind::*;
        assert_eq!(kinds(b"0x4048f5c3"), vec![FloatHex, EndOfInput]);
        assert_eq!(kinds(b"0x40091eb851eb851f"), vec![DoubleHex, EndOfInput]);
        // 7 digits: neither width.
        assert_eq!(kinds(b"0x4048f5c"), vec![Invalid, EndOfInput]);
    }

    #[test]
    fn string_tokens() {
        use TokenKind::*;
        assert_eq!(kinds(b"\"plain\""), vec![String, EndOfInput]);
        assert_eq!(kinds(br#""es\tcA""#), vec![String, EndOfInput]);
        assert_eq!(kinds(b"\"unterminated"), vec![Invalid, EndOfInput]);
        // Truncated unicode escape stops the scan at the bad byte; the
        // resync then swallows the rest of the would-be string.
        assert_eq!(kinds(br#""a\u12g""#), vec![Invalid, EndOfInput]);
        // Raw control byte inside a string.
        assert_eq!(kinds(b"\"a\x01b\""), vec![Invalid, EndOfInput]);
    }

    #[test]
    fn token_spans_cover_literal_text() {
        let input = b"  [ \"ab\" ]";
        let mut scanner = Scanner::new(input);
        assert_eq!(scanner.next_token().span, Span { start: 2, len: 1 });
        let string = scanner.next_token();
        assert_eq!(string.span.slice(input), b"\"ab\"");
    }

    #[test]
    fn resync_after_invalid() {
        use TokenKind::*;
        // The junk run is consumed as one invalid token, then scanning
        // picks back up at the comma.
        assert_eq!(
            kinds(b"[1, @@@ , 2]"),
            vec![ArrayBegin, Number, Comma, Invalid, Comma, Number, ArrayEnd, EndOfInput]
        );
        let mut scanner = Scanner::new(b"troo null");
        let bad = scanner.next_token();
        assert_eq!(bad.kind, Invalid);
        assert_eq!(bad.error, Some("true expected"));
        assert_eq!(scanner.next_token().kind, Null);
    }

    #[test]
    fn line_tracking() {
        let mut scanner = Scanner::new(b"[\n1,\n2\n]");
        assert_eq!(scanner.line(), 1);
        scanner.next_token(); // [
        scanner.next_token(); // 1
        assert_eq!(scanner.line(), 2);
        scanner.next_token(); // ,
        scanner.next_token(); // 2
        assert_eq!(scanner.line(), 3);
    }
}
