// SPDX-License-Identifier: Apache-2.0

//! Bounded diagnostic log: a fixed buffer that collects formatted
//! error text without allocating.

/// Capacity of an [`ErrorLog`] in bytes. Sized to hold one diagnostic
/// line plus the surrounding source-context dump.
pub const ERROR_LOG_CAPACITY: usize = 512;

/// Accumulates human-readable diagnostics through `core::fmt::Write`.
/// Appends past the capacity truncate at a character boundary; the
/// engine treats that as an internal contract violation and flags it
/// in debug builds.
pub struct ErrorLog {
    buf: [u8; ERROR_LOG_CAPACITY],
    len: usize,
}

impl ErrorLog {
    pub const fn new() -> Self {
        ErrorLog {
            buf: [0; ERROR_LOG_CAPACITY],
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Everything logged so far.
    pub fn as_str(&self) -> &str {
        // Only &str data is ever appended and truncation respects
        // character boundaries, so this cannot fail.
        core::str::from_utf8(&self.buf[..self.len]).unwrap_or("")
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Write for ErrorLog {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        let room = ERROR_LOG_CAPACITY - self.len;
        let mut take = bytes.len().min(room);
        debug_assert!(take == bytes.len(), "error log capacity exceeded");
        // Do not split a UTF-8 sequence when truncating.
        while take > 0 && take < bytes.len() && (bytes[take] & 0xC0) == 0x80 {
            take -= 1;
        }
        self.buf[self.len..self.len + take].copy_from_slice(&bytes[..take]);
        self.len += take;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn formatted_appends_accumulate() {
        let mut log = ErrorLog::new();
        assert!(log.is_empty());
        let _ = writeln!(log, "syntactic error at line {}: {}", 3, "comma expected");
        let _ = write!(log, "context");
        assert_eq!(
            log.as_str(),
            "syntactic error at line 3: comma expected\ncontext"
        );
        log.clear();
        assert_eq!(log.as_str(), "");
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn overflow_truncates() {
        let mut log = ErrorLog::new();
        for _ in 0..ERROR_LOG_CAPACITY {
            let _ = write!(log, "x");
        }
        let _ = write!(log, "overflow");
        assert_eq!(log.len(), ERROR_LOG_CAPACITY);
    }
}
