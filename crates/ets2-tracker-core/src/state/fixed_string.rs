//! Fixed-capacity, NUL-terminated string storage.

use std::fmt;

/// Size of the backing buffer, terminator included
pub const FIXED_STRING_BUF: usize = 64;

/// Maximum number of content bytes a [`FixedString`] holds
pub const FIXED_STRING_MAX: usize = FIXED_STRING_BUF - 1;

/// Inline string truncated to [`FIXED_STRING_MAX`] bytes.
///
/// Content stops at the first NUL byte of the input, like `strncpy`. Truncation
/// backs off to the previous UTF-8 character boundary, so the stored value is
/// always valid UTF-8 and `buf[len]` is always a terminator.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FixedString {
    buf: [u8; FIXED_STRING_BUF],
    len: usize,
}

impl FixedString {
    pub const fn new() -> Self {
        Self {
            buf: [0; FIXED_STRING_BUF],
            len: 0,
        }
    }

    /// Replace the contents with `value`, truncating as needed
    pub fn set(&mut self, value: &str) {
        let value = match value.find('\0') {
            Some(nul) => &value[..nul],
            None => value,
        };

        let mut end = value.len().min(FIXED_STRING_MAX);
        while !value.is_char_boundary(end) {
            end -= 1;
        }

        self.buf = [0; FIXED_STRING_BUF];
        self.buf[..end].copy_from_slice(&value.as_bytes()[..end]);
        self.len = end;
    }

    pub fn clear(&mut self) {
        self.buf = [0; FIXED_STRING_BUF];
        self.len = 0;
    }

    pub fn as_str(&self) -> &str {
        // Only ever filled from `&str` cut on a char boundary
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for FixedString {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for FixedString {
    fn from(value: &str) -> Self {
        let mut s = Self::new();
        s.set(value);
        s
    }
}

impl fmt::Debug for FixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for FixedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for FixedString {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for FixedString {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}
