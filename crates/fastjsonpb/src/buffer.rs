//! Output buffer for generated marshalers.
//!
//! Sequences are written with a `,` after every item; [`Buffer::fix_symbol`]
//! drops the last one before the closing bracket is written.

use alloc::vec::Vec;
use core::fmt::{self, Write as _};

use base64::{display::Base64Display, prelude::BASE64_STANDARD};

use crate::{map_key::MapKey, pool::Pool};

/// A [`Pool`] of reusable output buffers.
pub type BufferPool = Pool<Buffer>;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// `SAFE[b]` holds when ASCII byte `b` can appear in a JSON string as is.
static SAFE: [bool; 128] = {
    let mut table = [false; 128];
    let mut b = 0x20;
    while b < 128 {
        table[b] = b != b'"' as usize && b != b'\\' as usize;
        b += 1;
    }
    table
};

/// Growable byte buffer with JSON writers.
///
/// Growth reallocates to exactly twice the required length, so a buffer
/// taken from a [`BufferPool`] settles at the size of the largest document it
/// has written.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Buffer {
    buf: Vec<u8>,
}

impl Buffer {
    /// Creates an empty buffer without allocating.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Ensures room for `n` more bytes, reallocating to `2 * (len + n)`.
    fn reserve(&mut self, n: usize) {
        let len = self.buf.len();
        if len + n <= self.buf.capacity() {
            return;
        }
        let mut grown = Vec::with_capacity(2 * (len + n));
        grown.extend_from_slice(&self.buf);
        self.buf = grown;
    }

    /// Appends raw bytes.
    pub fn write(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a single raw byte.
    pub fn write_byte(&mut self, b: u8) {
        self.reserve(1);
        self.buf.push(b);
    }

    /// Appends `s` without escaping.
    pub fn write_raw(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Writes `true` or `false`.
    pub fn write_bool(&mut self, v: bool) {
        self.write(if v { b"true" } else { b"false" });
    }

    /// Writes a decimal integer.
    pub fn write_int32(&mut self, v: i32) {
        self.write_display(v);
    }

    /// Writes a decimal integer.
    pub fn write_int64(&mut self, v: i64) {
        self.write_display(v);
    }

    /// Writes a decimal integer.
    pub fn write_uint32(&mut self, v: u32) {
        self.write_display(v);
    }

    /// Writes a decimal integer.
    pub fn write_uint64(&mut self, v: u64) {
        self.write_display(v);
    }

    /// Writes the shortest decimal that reads back as `v`, never in exponent
    /// form. Non-finite values are written as `NaN`, `inf` and `-inf`, which
    /// are not valid JSON.
    pub fn write_float32(&mut self, v: f32) {
        self.write_display(v);
    }

    /// See [`Buffer::write_float32`].
    pub fn write_float64(&mut self, v: f64) {
        self.write_display(v);
    }

    fn write_display(&mut self, v: impl fmt::Display) {
        // Writing into a `Buffer` cannot fail.
        let _ = write!(self, "{v}");
    }

    /// Writes `bytes` as a quoted standard base64 string.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len().div_ceil(3) * 4 + 2);
        self.buf.push(b'"');
        self.write_display(Base64Display::new(bytes, &BASE64_STANDARD));
        self.buf.push(b'"');
    }

    /// Writes the JSON-escaped form of `s`, without quotes.
    ///
    /// `"` and `\` are backslash-escaped, newline, carriage return and tab
    /// use their short escapes, other control characters become `\u00XX`.
    /// U+2028 and U+2029 are escaped as well.
    pub fn write_string(&mut self, s: &str) {
        let bytes = s.as_bytes();
        self.reserve(bytes.len());
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b < 0x80 {
                if SAFE[usize::from(b)] {
                    i += 1;
                    continue;
                }
                self.write(&bytes[start..i]);
                match b {
                    b'"' | b'\\' => self.write(&[b'\\', b]),
                    b'\n' => self.write(b"\\n"),
                    b'\r' => self.write(b"\\r"),
                    b'\t' => self.write(b"\\t"),
                    _ => self.write(&[
                        b'\\',
                        b'u',
                        b'0',
                        b'0',
                        HEX[usize::from(b >> 4)],
                        HEX[usize::from(b & 0xf)],
                    ]),
                }
                i += 1;
                start = i;
                continue;
            }
            // U+2028 LINE SEPARATOR and U+2029 PARAGRAPH SEPARATOR
            if b == 0xe2 && bytes.get(i + 1) == Some(&0x80) && matches!(bytes.get(i + 2), Some(0xa8 | 0xa9)) {
                self.write(&bytes[start..i]);
                self.write(b"\\u202");
                self.write_byte(if bytes[i + 2] == 0xa8 { b'8' } else { b'9' });
                i += 3;
                start = i;
                continue;
            }
            i += 1;
        }
        self.write(&bytes[start..]);
    }

    /// Like [`Buffer::write_string`], but for input that may not be UTF-8.
    /// Every byte that is not part of a valid sequence is written as
    /// `\ufffd`.
    pub fn write_string_bytes(&mut self, bytes: &[u8]) {
        for chunk in bytes.utf8_chunks() {
            self.write_string(chunk.valid());
            for _ in chunk.invalid() {
                self.write(b"\\ufffd");
            }
        }
    }

    /// Writes `s` escaped and surrounded by quotes.
    pub fn write_string_quoted(&mut self, s: &str) {
        self.write_byte(b'"');
        self.write_string(s);
        self.write_byte(b'"');
    }

    /// Writes an object key (always quoted) followed by `:`.
    pub fn write_map_key<K: MapKey>(&mut self, key: &K) {
        key.write_key(self);
        self.write_byte(b':');
    }

    /// Drops a trailing `,` left behind by the last item of a sequence.
    pub fn fix_symbol(&mut self) {
        if self.buf.len() >= 2 && self.buf.last() == Some(&b',') {
            self.buf.pop();
        }
    }

    /// Clears the contents, keeping the allocation.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// The bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the buffer, returning its bytes.
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    /// Number of bytes written.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Bytes the buffer can hold before growing.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

impl fmt::Write for Buffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use rstest::rstest;

    use super::*;

    fn escaped(s: &str) -> alloc::string::String {
        let mut buf = Buffer::new();
        buf.write_string(s);
        alloc::string::String::from_utf8(buf.into_vec()).unwrap()
    }

    #[rstest]
    #[case::plain("string", "string")]
    #[case::quote("st\"ring", r#"st\"ring"#)]
    #[case::backslash(r"a\b", r"a\\b")]
    #[case::newline("a\nb", r"a\nb")]
    #[case::carriage_return("a\rb", r"a\rb")]
    #[case::tab("a\tb", r"a\tb")]
    #[case::control("\u{1}\u{1f}", r"\u0001\u001f")]
    #[case::delete("\u{7f}", "\u{7f}")]
    #[case::non_ascii("héllo ✓", "héllo ✓")]
    #[case::line_separators("a\u{2028}b\u{2029}", r"a\u2028b\u2029")]
    fn escapes_strings(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(escaped(input), expected);
    }

    #[test]
    fn invalid_utf8_becomes_replacement_escapes() {
        let mut buf = Buffer::new();
        buf.write_string_bytes(b"a\xffb\xc3");
        assert_eq!(buf.as_bytes(), br"a\ufffdb\ufffd");

        let mut buf = Buffer::new();
        buf.write_string_bytes(b"\xfe\xff");
        assert_eq!(buf.as_bytes(), br"\ufffd\ufffd");
    }

    #[test]
    fn growth_doubles_required_length() {
        let mut buf = Buffer::new();
        assert_eq!(buf.capacity(), 0);
        buf.write(b"abc");
        assert_eq!(buf.capacity(), 6);
        buf.write(b"defg");
        assert_eq!(buf.capacity(), 14);
        buf.write(b"h");
        assert_eq!(buf.capacity(), 14);
        assert_eq!(buf.as_bytes(), b"abcdefgh");
    }

    #[test]
    fn fix_symbol_drops_only_a_trailing_comma() {
        let mut buf = Buffer::new();
        buf.write(b"[1,");
        buf.fix_symbol();
        buf.write_byte(b']');
        assert_eq!(buf.as_bytes(), b"[1]");

        let mut buf = Buffer::new();
        buf.write_byte(b'{');
        buf.fix_symbol();
        buf.write_byte(b'}');
        assert_eq!(buf.as_bytes(), b"{}");

        let mut buf = Buffer::new();
        buf.write_byte(b',');
        buf.fix_symbol();
        assert_eq!(buf.as_bytes(), b",");
    }

    #[test]
    fn scalars() {
        let mut buf = Buffer::new();
        buf.write_bool(true);
        buf.write_byte(b' ');
        buf.write_int32(i32::MIN);
        buf.write_byte(b' ');
        buf.write_uint64(u64::MAX);
        buf.write_byte(b' ');
        buf.write_float64(1.0);
        buf.write_byte(b' ');
        buf.write_float64(0.1);
        buf.write_byte(b' ');
        buf.write_float64(1e21);
        buf.write_byte(b' ');
        buf.write_float32(0.3);
        assert_eq!(
            buf.as_bytes(),
            b"true -2147483648 18446744073709551615 1 0.1 1000000000000000000000 0.3"
        );
    }

    #[test]
    fn bytes_are_quoted_base64() {
        let mut buf = Buffer::new();
        buf.write_bytes(b"hi");
        buf.write_bytes(b"");
        buf.write_bytes(&[0xff, 0xfe, 0xfd]);
        assert_eq!(buf.as_bytes(), br#""aGk=""""//79""#);
    }

    #[test]
    fn bytes_encode_in_one_reservation() {
        use base64::Engine as _;

        let payload: alloc::vec::Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut buf = Buffer::new();
        buf.write_bytes(&payload);
        let expected = alloc::format!("\"{}\"", BASE64_STANDARD.encode(&payload));
        assert_eq!(buf.as_bytes(), expected.as_bytes());
        assert_eq!(buf.capacity(), 2 * expected.len());
    }

    #[test]
    fn map_keys_are_quoted() {
        let mut buf = Buffer::new();
        buf.write_map_key(&alloc::string::String::from("k\""));
        buf.write_map_key(&7i32);
        buf.write_map_key(&true);
        assert_eq!(buf.as_bytes(), br#""k\"":"7":"true":"#);
    }

    #[test]
    fn reset_keeps_allocation() {
        let mut buf = Buffer::with_capacity(32);
        buf.write_string_quoted("x");
        buf.reset();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 32);
    }
}
