/// Configuration options for [`Parser`](crate::Parser).
///
/// By default the parser hands out string and bytes payloads exactly as they
/// appear between the quotes. Both decoding steps below are opt-in.
///
/// # Examples
///
/// ```rust
/// use fastjsonpb::{Parser, ParserOptions};
///
/// let options = ParserOptions {
///     decode_escapes: true,
///     ..Default::default()
/// };
/// let mut p = Parser::with_options(br#""a\nb""#, options);
/// assert_eq!(p.str().unwrap(), "a\nb");
/// ```
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    /// Whether to translate backslash escapes in string tokens.
    ///
    /// When `false`, a string containing `\"` is returned with the backslash
    /// still in place. When `true`, the short escapes and `\uXXXX` (including
    /// surrogate pairs) are decoded; an unpaired surrogate decodes to U+FFFD.
    ///
    /// # Default
    ///
    /// `false`
    pub decode_escapes: bool,

    /// Whether [`Parser::bytes`](crate::Parser::bytes) decodes standard
    /// base64.
    ///
    /// The writer always base64-encodes bytes fields. When this is `false`
    /// the parser returns the encoded text untouched, so bytes fields do not
    /// survive a round trip.
    ///
    /// # Default
    ///
    /// `false`
    pub decode_base64_bytes: bool,
}
