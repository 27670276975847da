//! Decoding of backslash escapes inside string tokens.
//!
//! The scanner only records that a string token contains a backslash; the
//! payload stays a borrowed view of the input. This module turns such a view
//! into its decoded text when [`ParserOptions::decode_escapes`] is enabled.
//!
//! `\uXXXX` escapes are combined into surrogate pairs where possible. A high
//! surrogate without a following low surrogate, or a low surrogate on its own,
//! decodes to U+FFFD.
//!
//! [`ParserOptions::decode_escapes`]: crate::ParserOptions::decode_escapes

use alloc::string::String;

const REPLACEMENT: char = '\u{FFFD}';

/// Decodes every escape sequence in `raw`. Returns `None` on an unknown
/// escape character, a truncated escape, or non-hex digits after `\u`.
pub(crate) fn unescape(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        out.push_str(&raw[start..i]);
        let escape = *bytes.get(i + 1)?;
        i += 2;
        let ch = match escape {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let unit = hex4(bytes.get(i..i + 4)?)?;
                i += 4;
                decode_unit(unit, bytes, &mut i)
            }
            _ => return None,
        };
        out.push(ch);
        start = i;
    }
    out.push_str(&raw[start..]);
    Some(out)
}

/// Resolves one UTF-16 code unit, consuming a trailing `\uXXXX` low
/// surrogate from `bytes[*i..]` when `unit` is a high surrogate.
fn decode_unit(unit: u16, bytes: &[u8], i: &mut usize) -> char {
    match unit {
        0xD800..=0xDBFF => {
            if bytes.get(*i..*i + 2) != Some(&b"\\u"[..]) {
                return REPLACEMENT;
            }
            match bytes.get(*i + 2..*i + 6).and_then(hex4) {
                Some(low @ 0xDC00..=0xDFFF) => {
                    *i += 6;
                    let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    char::from_u32(code).unwrap_or(REPLACEMENT)
                }
                _ => REPLACEMENT,
            }
        }
        0xDC00..=0xDFFF => REPLACEMENT,
        _ => char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT),
    }
}

fn hex4(digits: &[u8]) -> Option<u16> {
    if digits.len() != 4 || !digits.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }
    let text = core::str::from_utf8(digits).ok()?;
    u16::from_str_radix(text, 16).ok()
}
