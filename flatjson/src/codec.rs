// SPDX-License-Identifier: Apache-2.0

//! Conversions between JSON literal text and native values: string
//! unescaping to UTF-8, hex bit-pattern floats, and bounded 64-bit
//! decimal integer parsing.

/// Errors produced while transcoding JSON string content or decoding
/// hex bit-pattern floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// A byte outside `0-9a-fA-F` where a hex digit was required.
    InvalidHexDigit,
    /// A `\u` sequence produced a value that is not a Unicode scalar,
    /// including unpaired surrogates.
    InvalidCodepoint,
    /// Input ended in the middle of an escape sequence.
    TruncatedEscape,
    /// The character after a backslash is not part of the escape set.
    InvalidEscape,
    /// A raw byte sequence is not valid UTF-8.
    InvalidUtf8,
    /// The destination buffer has no room for the next output bytes.
    DestinationTooSmall,
    /// A hex float literal does not carry exactly 8 or 16 hex digits.
    BadHexFloatLength,
}

// UTF-8 sequence length keyed on the five most significant bits of the
// first byte. Zero marks continuation bytes and the 0xF8..0xFF range,
// which can never start a sequence.
const UTF8_LEN_FROM_MSB: [usize; 32] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, // 0xxxxxxx
    0, 0, 0, 0, 0, 0, 0, 0, // 10xxxxxx
    2, 2, 2, 2, // 110xxxxx
    3, 3, // 1110xxxx
    4, // 11110xxx
    0, // 11111xxx
];

/// Returns the length of the UTF-8 sequence introduced by `first`, or
/// zero if `first` cannot start a sequence.
pub fn utf8_len(first: u8) -> usize {
    UTF8_LEN_FROM_MSB[(first >> 3) as usize]
}

/// Numeric value of an ASCII hex digit.
pub fn hex_digit(byte: u8) -> Result<u32, CodecError> {
    match byte {
        b'0'..=b'9' => Ok((byte - b'0') as u32),
        b'a'..=b'f' => Ok((byte - b'a' + 10) as u32),
        b'A'..=b'F' => Ok((byte - b'A' + 10) as u32),
        _ => Err(CodecError::InvalidHexDigit),
    }
}

/// Decodes a single-precision float from its literal text, e.g.
/// `0x4048f5c3`. The first two bytes are the prefix; exactly 8 hex
/// digits must follow. The accumulated bits are reinterpreted in
/// native order, so producer and consumer must agree on it.
pub fn hex_to_f32(text: &[u8]) -> Result<f32, CodecError> {
    let digits = text.get(2..).ok_or(CodecError::BadHexFloatLength)?;
    if digits.len() != 8 {
        return Err(CodecError::BadHexFloatLength);
    }
    let mut bits = 0u32;
    for &b in digits {
        bits = (bits << 4) | hex_digit(b)?;
    }
    Ok(f32::from_bits(bits))
}

/// Double-precision variant of [`hex_to_f32`]: 16 hex digits after the
/// two-byte prefix.
pub fn hex_to_f64(text: &[u8]) -> Result<f64, CodecError> {
    let digits = text.get(2..).ok_or(CodecError::BadHexFloatLength)?;
    if digits.len() != 16 {
        return Err(CodecError::BadHexFloatLength);
    }
    let mut bits = 0u64;
    for &b in digits {
        bits = (bits << 4) | hex_digit(b)? as u64;
    }
    Ok(f64::from_bits(bits))
}

const U64_MAX_TEXT: &[u8] = b"18446744073709551615";
const S64_MAX_TEXT: &[u8] = b"9223372036854775807";
const S64_MIN_TEXT: &[u8] = b"-9223372036854775808";

/// Parses a maximal run of decimal digits as a `u64`.
///
/// Returns the value and the number of bytes consumed. `None` means no
/// value was produced: either the text does not start with a digit, or
/// the run does not fit in a `u64`. Overflow is detected by digit count
/// and, on a length tie, a byte comparison against the decimal text of
/// `u64::MAX`, so no wider arithmetic is needed.
pub fn parse_u64(text: &[u8]) -> Option<(u64, usize)> {
    let mut value = 0u64;
    let mut consumed = 0usize;
    while let Some(&b) = text.get(consumed) {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as u64);
        consumed += 1;
    }
    if consumed == 0 || consumed > U64_MAX_TEXT.len() {
        return None;
    }
    if consumed == U64_MAX_TEXT.len() && &text[..consumed] > U64_MAX_TEXT {
        return None;
    }
    Some((value, consumed))
}

/// Signed variant of [`parse_u64`]: an optional leading `-`, then a
/// maximal digit run. Bounds are checked against the decimal text of
/// `i64::MAX` / `i64::MIN`. A sign with no digits yields `None`.
pub fn parse_s64(text: &[u8]) -> Option<(i64, usize)> {
    let negative = text.first() == Some(&b'-');
    let digits = if negative { &text[1..] } else { text };

    let mut value = 0i64;
    let mut digit_count = 0usize;
    while let Some(&b) = digits.get(digit_count) {
        if !b.is_ascii_digit() {
            break;
        }
        // Wrapping on purpose: "9223372036854775808" lands on i64::MIN,
        // which the negative branch needs.
        value = value.wrapping_mul(10).wrapping_add((b - b'0') as i64);
        digit_count += 1;
    }
    if digit_count == 0 {
        return None;
    }
    let consumed = digit_count + usize::from(negative);
    let run = &text[..consumed];
    let bound = if negative { S64_MIN_TEXT } else { S64_MAX_TEXT };
    if consumed > bound.len() || (consumed == bound.len() && run > bound) {
        return None;
    }
    let value = if negative { value.wrapping_neg() } else { value };
    Some((value, consumed))
}

fn simple_escape(byte: u8) -> Result<u8, CodecError> {
    match byte {
        b'0' => Ok(0x00),
        b'a' => Ok(0x07),
        b'b' => Ok(0x08),
        b't' => Ok(b'\t'),
        b'v' => Ok(0x0B),
        b'f' => Ok(0x0C),
        b'r' => Ok(b'\r'),
        b'n' => Ok(b'\n'),
        _ => Err(CodecError::InvalidEscape),
    }
}

fn is_high_surrogate(codepoint: u32) -> bool {
    (0xD800..=0xDBFF).contains(&codepoint)
}

fn is_low_surrogate(codepoint: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&codepoint)
}

fn hex4(src: &[u8], at: usize) -> Result<u32, CodecError> {
    let quad = src.get(at..at + 4).ok_or(CodecError::TruncatedEscape)?;
    let mut value = 0u32;
    for &b in quad {
        value = (value << 4) | hex_digit(b)?;
    }
    Ok(value)
}

/// Decodes the `XXXX` hex quad of a `\uXXXX` escape starting at `at`
/// (just past the `u`). A high surrogate pulls in the following
/// `\uXXXX` low surrogate and combines the pair. Returns the scalar
/// codepoint and the bytes consumed from `at`.
fn unicode_escape(src: &[u8], at: usize) -> Result<(u32, usize), CodecError> {
    let first = hex4(src, at)?;
    if is_low_surrogate(first) {
        return Err(CodecError::InvalidCodepoint);
    }
    if !is_high_surrogate(first) {
        return Ok((first, 4));
    }
    if src.get(at + 4) != Some(&b'\\') || src.get(at + 5) != Some(&b'u') {
        return Err(CodecError::InvalidCodepoint);
    }
    let second = hex4(src, at + 6)?;
    if !is_low_surrogate(second) {
        return Err(CodecError::InvalidCodepoint);
    }
    let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
    Ok((combined, 10))
}

fn put(
    dest: &mut Option<&mut [u8]>,
    written: &mut usize,
    bytes: &[u8],
) -> Result<(), CodecError> {
    if let Some(out) = dest.as_deref_mut() {
        let slot = out
            .get_mut(*written..*written + bytes.len())
            .ok_or(CodecError::DestinationTooSmall)?;
        slot.copy_from_slice(bytes);
    }
    *written += bytes.len();
    Ok(())
}

/// Transcodes the interior of a JSON string token (quotes excluded)
/// into UTF-8, resolving the escape set `\\ / " 0 a b t v f r n` and
/// `\uXXXX` with surrogate-pair combination. Raw UTF-8 sequences pass
/// through unchanged.
///
/// With `dest == None` nothing is written and the return value is the
/// byte count a subsequent filling call needs, which enables the usual
/// measure-then-fill pattern.
pub fn unescape(src: &[u8], mut dest: Option<&mut [u8]>) -> Result<usize, CodecError> {
    let mut read = 0usize;
    let mut written = 0usize;

    while read < src.len() {
        let byte = src[read];
        if byte == b'\\' {
            let escape = *src.get(read + 1).ok_or(CodecError::TruncatedEscape)?;
            match escape {
                b'\\' | b'/' | b'"' => {
                    put(&mut dest, &mut written, &[escape])?;
                    read += 2;
                }
                b'u' => {
                    let (codepoint, len) = unicode_escape(src, read + 2)?;
                    let ch = char::from_u32(codepoint).ok_or(CodecError::InvalidCodepoint)?;
                    let mut utf8 = [0u8; 4];
                    put(&mut dest, &mut written, ch.encode_utf8(&mut utf8).as_bytes())?;
                    read += 2 + len;
                }
                _ => {
                    put(&mut dest, &mut written, &[simple_escape(escape)?])?;
                    read += 2;
                }
            }
        } else {
            let len = utf8_len(byte);
            if len == 0 {
                return Err(CodecError::InvalidUtf8);
            }
            let seq = src.get(read..read + len).ok_or(CodecError::InvalidUtf8)?;
            put(&mut dest, &mut written, seq)?;
            read += len;
        }
    }

    Ok(written)
}

/// Decodes one JSON-string character at `idx`, escaped or raw, to its
/// Unicode codepoint. Returns the codepoint and the source bytes it
/// occupied, for cursor-style iteration over string content.
pub fn codepoint_at(src: &[u8], idx: usize) -> Result<(u32, usize), CodecError> {
    let byte = *src.get(idx).ok_or(CodecError::TruncatedEscape)?;
    if byte == b'\\' {
        let escape = *src.get(idx + 1).ok_or(CodecError::TruncatedEscape)?;
        match escape {
            b'\\' | b'/' | b'"' => Ok((escape as u32, 2)),
            b'u' => {
                let (codepoint, len) = unicode_escape(src, idx + 2)?;
                Ok((codepoint, 2 + len))
            }
            _ => Ok((simple_escape(escape)? as u32, 2)),
        }
    } else {
        let len = utf8_len(byte);
        if len == 0 {
            return Err(CodecError::InvalidUtf8);
        }
        let seq = src.get(idx..idx + len).ok_or(CodecError::InvalidUtf8)?;
        let text = core::str::from_utf8(seq).map_err(|_| CodecError::InvalidUtf8)?;
        let ch = text.chars().next().ok_or(CodecError::InvalidUtf8)?;
        Ok((ch as u32, len))
    }
}
