//! Pull tokenizer over a complete JSON document.
//!
//! Overview
//! - `Parser` borrows the whole input and hands out one token at a time
//!   through typed extraction calls (`str`, `int32`, `symbol`, ...). Generated
//!   codecs drive it directly; no document tree is built on the hot path.
//! - String payloads are returned as views into the input. An owned copy is
//!   made only when escape decoding is enabled and the string contains a
//!   backslash.
//!
//! Deferred separators
//! - Callers never consume `,` or `:` themselves. They call
//!   [`Parser::assert_symbol`] after a key or an item, which records the
//!   separator the next scan must see. The following scan consumes it before
//!   producing the next token.
//! - A closing `}` or `]` is accepted in place of a pending `,`. This is what
//!   lets a loop assert `,` after every item, including the last one.
//! - Any other token while a separator is pending is a
//!   [`SyntaxErrorKind::MissingSeparator`].
//!
//! Fallback parsing
//! - [`Parser::parse`] reads any JSON value into a [`Value`]. Generated code
//!   uses it to skip keys the schema does not know. A malformed value is
//!   logged and skipped up to the next separator of the enclosing container,
//!   so one bad unknown field does not abort the surrounding message.

mod error;
mod options;


use alloc::{borrow::Cow, string::ToString, vec::Vec};

use base64::{Engine, prelude::BASE64_STANDARD};

pub use self::{
    error::{SyntaxError, SyntaxErrorKind},
    options::ParserOptions,
};
use crate::{
    Error,
    codec::Enumeration,
    escape::unescape,
    map_key::MapKey,
    value::{Array, Map, Value},
};

/// Containers nested deeper than this are rejected, whether they are opened
/// through [`Parser::symbol`] or read by [`Parser::parse`].
pub const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Symbol(u8),
    Bool(bool),
    String { escaped: bool },
    Number,
    Null,
}

impl TokenKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Symbol(b) => symbol_name(b),
            Self::Bool(_) => "bool",
            Self::String { .. } => "string",
            Self::Number => "number",
            Self::Null => "null",
        }
    }
}

fn symbol_name(b: u8) -> &'static str {
    match b {
        b'{' => "'{'",
        b'}' => "'}'",
        b'[' => "'['",
        b']' => "']'",
        b',' => "','",
        b':' => "':'",
        _ => "symbol",
    }
}

/// A scanned token. `raw` is the payload between the quotes for strings and
/// the full text otherwise.
#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    raw: &'a [u8],
    start: usize,
}

/// Result of [`Parser::enum_token`]: enums are accepted either by name or by
/// ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumToken<'a> {
    /// A JSON string, to be resolved against the enum's name table.
    Name(Cow<'a, str>),
    /// A JSON number, to be resolved against the enum's ordinals.
    Number(i32),
}

/// Single-token-lookahead JSON tokenizer.
///
/// See the [module documentation](self) for the separator protocol.
///
/// ```rust
/// use fastjsonpb::Parser;
///
/// let mut p = Parser::new(br#"{"name": "ada", "age": 36}"#);
/// p.symbol(b'{').unwrap();
/// while !p.is_symbol(b'}') {
///     let key = p.str().unwrap();
///     p.assert_symbol(b':');
///     match &*key {
///         "name" => assert_eq!(p.str().unwrap(), "ada"),
///         "age" => assert_eq!(p.int32().unwrap(), 36),
///         _ => p.skip_value(),
///     }
///     p.assert_symbol(b',');
/// }
/// p.assert_symbol(b',');
/// p.symbol(b'}').unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Parser<'a> {
    data: &'a [u8],
    off: usize,
    token: Option<Token<'a>>,
    assert: Option<u8>,
    depth: usize,
    options: ParserOptions,
}

impl<'a> Parser<'a> {
    /// Creates a parser over `data` with default options.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, ParserOptions::default())
    }

    /// Creates a parser over `data`.
    #[must_use]
    pub fn with_options(data: &'a [u8], options: ParserOptions) -> Self {
        Self {
            data,
            off: 0,
            token: None,
            assert: None,
            depth: 0,
            options,
        }
    }

    /// Byte offset of the scan cursor. A cached token has already been
    /// consumed from the input.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.off
    }

    /// Records the separator that the next scan must consume.
    ///
    /// Only `,` and `:` are meaningful. A pending `,` is also satisfied by a
    /// closing bracket, which is then returned as the next token.
    pub fn assert_symbol(&mut self, symbol: u8) {
        self.assert = Some(symbol);
    }

    /// Reports whether the next token is `symbol` without consuming anything.
    ///
    /// Returns `false` at end of input.
    #[must_use]
    pub fn is_symbol(&self, symbol: u8) -> bool {
        match &self.token {
            Some(token) => token.kind == TokenKind::Symbol(symbol),
            None => self.peek_byte() == Some(symbol),
        }
    }

    /// Consumes the structural character `symbol`.
    ///
    /// Opening brackets count towards the nesting limit and closing brackets
    /// release it, so recursive decoders cannot exhaust the stack.
    ///
    /// # Errors
    ///
    /// Fails if the next token is anything else, or with
    /// [`SyntaxErrorKind::TooDeep`] if `symbol` opens one container too many.
    pub fn symbol(&mut self, symbol: u8) -> Result<(), SyntaxError> {
        let token = self.expect(symbol_name(symbol), |kind| {
            kind == TokenKind::Symbol(symbol)
        })?;
        match symbol {
            b'{' | b'[' => self.enter(token.start),
            b'}' | b']' => {
                self.depth = self.depth.saturating_sub(1);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Current container nesting.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Consumes a `null` literal.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not `null`.
    pub fn null(&mut self) -> Result<(), SyntaxError> {
        self.expect("null", |kind| kind == TokenKind::Null)?;
        Ok(())
    }

    /// Consumes a `true` or `false` literal.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not a boolean.
    pub fn bool(&mut self) -> Result<bool, SyntaxError> {
        let token = self.expect("bool", |kind| matches!(kind, TokenKind::Bool(_)))?;
        Ok(token.kind == TokenKind::Bool(true))
    }

    /// Consumes a string token.
    ///
    /// The result borrows from the input unless
    /// [`ParserOptions::decode_escapes`] is set and the string contains
    /// escapes.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not a string, or its payload is not valid
    /// UTF-8, or (with escape decoding) it holds a malformed escape.
    pub fn str(&mut self) -> Result<Cow<'a, str>, SyntaxError> {
        let token = self.expect("string", |kind| matches!(kind, TokenKind::String { .. }))?;
        self.decode_str(token)
    }

    /// Consumes a string token holding a bytes field.
    ///
    /// Without [`ParserOptions::decode_base64_bytes`] this is the raw text
    /// between the quotes.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not a string, or (with base64 decoding) the
    /// payload is not standard base64.
    pub fn bytes(&mut self) -> Result<Cow<'a, [u8]>, SyntaxError> {
        let token = self.expect("string", |kind| matches!(kind, TokenKind::String { .. }))?;
        if !self.options.decode_base64_bytes {
            return Ok(Cow::Borrowed(token.raw));
        }
        BASE64_STANDARD
            .decode(token.raw)
            .map(Cow::Owned)
            .map_err(|_| self.error(token.start, SyntaxErrorKind::InvalidBase64))
    }

    /// Consumes a number token as `f64`.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not a number or does not parse as `f64`.
    pub fn number(&mut self) -> Result<f64, SyntaxError> {
        self.float64()
    }

    /// Consumes a number token as `i32`.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not a number, or is fractional, or out of
    /// range.
    pub fn int32(&mut self) -> Result<i32, SyntaxError> {
        self.parse_number("int32")
    }

    /// Consumes a number token as `i64`.
    ///
    /// # Errors
    ///
    /// See [`Parser::int32`].
    pub fn int64(&mut self) -> Result<i64, SyntaxError> {
        self.parse_number("int64")
    }

    /// Consumes a number token as `u32`.
    ///
    /// # Errors
    ///
    /// See [`Parser::int32`]. Negative numbers are rejected.
    pub fn uint32(&mut self) -> Result<u32, SyntaxError> {
        self.parse_number("uint32")
    }

    /// Consumes a number token as `u64`.
    ///
    /// # Errors
    ///
    /// See [`Parser::uint32`].
    pub fn uint64(&mut self) -> Result<u64, SyntaxError> {
        self.parse_number("uint64")
    }

    /// Consumes a number token as `f32`.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not a number or does not parse as `f32`.
    pub fn float32(&mut self) -> Result<f32, SyntaxError> {
        self.parse_number("float32")
    }

    /// Consumes a number token as `f64`.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not a number or does not parse as `f64`.
    pub fn float64(&mut self) -> Result<f64, SyntaxError> {
        self.parse_number("float64")
    }

    /// Consumes an enum value in either of its JSON forms.
    ///
    /// # Errors
    ///
    /// Fails if the next token is neither a string nor an `i32` number.
    pub fn enum_token(&mut self) -> Result<EnumToken<'a>, SyntaxError> {
        let token = self.expect("enum name or number", |kind| {
            matches!(kind, TokenKind::String { .. } | TokenKind::Number)
        })?;
        if token.kind == TokenKind::Number {
            return self.convert(token, "int32").map(EnumToken::Number);
        }
        self.decode_str(token).map(EnumToken::Name)
    }

    /// Consumes an enum value and resolves it against `E`'s tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownEnumValue`] if neither the name nor the ordinal
    /// is declared, or a syntax error from [`Parser::enum_token`].
    pub fn enumeration<E: Enumeration>(&mut self) -> Result<E, Error> {
        match self.enum_token()? {
            EnumToken::Name(name) => {
                E::from_str_name(&name).ok_or_else(|| Error::UnknownEnumValue {
                    enum_name: E::NAME,
                    value: name.into_owned(),
                })
            }
            EnumToken::Number(number) => {
                E::from_i32(number).ok_or_else(|| Error::UnknownEnumValue {
                    enum_name: E::NAME,
                    value: number.to_string(),
                })
            }
        }
    }

    /// Consumes an object key and converts it to the map's key type.
    ///
    /// # Errors
    ///
    /// Fails if the next token is not a string or the text does not parse as
    /// `K`.
    pub fn map_key<K: MapKey>(&mut self) -> Result<K, SyntaxError> {
        let token = self.expect("string", |kind| matches!(kind, TokenKind::String { .. }))?;
        let text = self.decode_str(token)?;
        K::parse_key(&text).ok_or_else(|| self.error(token.start, SyntaxErrorKind::InvalidMapKey(K::KIND)))
    }

    /// Reads one JSON value of any shape.
    ///
    /// Never fails: a malformed value is logged at `warn` level, the cursor
    /// is moved to the next `,`, `}` or `]` of the enclosing container, and
    /// [`Value::Null`] takes its place.
    pub fn parse(&mut self) -> Value {
        let start = self.off;
        let depth = self.depth;
        match self.try_parse() {
            Ok(value) => value,
            Err(err) => {
                log::warn!("skipping malformed value: {err}");
                self.depth = depth;
                self.recover(start);
                Value::Null
            }
        }
    }

    /// Reads and discards one JSON value. See [`Parser::parse`].
    pub fn skip_value(&mut self) {
        let _ = self.parse();
    }

    fn try_parse(&mut self) -> Result<Value, SyntaxError> {
        let token = self.next_token()?;
        match token.kind {
            TokenKind::Null => Ok(Value::Null),
            TokenKind::Bool(b) => Ok(Value::Boolean(b)),
            TokenKind::Number => self.convert(token, "float64").map(Value::Number),
            TokenKind::String { .. } => self
                .decode_str(token)
                .map(|s| Value::String(s.into_owned())),
            TokenKind::Symbol(open @ (b'{' | b'[')) => {
                self.enter(token.start)?;
                if open == b'{' {
                    self.object_body().map(Value::Object)
                } else {
                    self.array_body().map(Value::Array)
                }
            }
            TokenKind::Symbol(_) => Err(self.error(
                token.start,
                SyntaxErrorKind::UnexpectedToken {
                    expected: "value",
                    found: token.kind.describe(),
                },
            )),
        }
    }

    fn object_body(&mut self) -> Result<Map, SyntaxError> {
        let mut map = Map::new();
        while !self.is_symbol(b'}') {
            let key = self.str()?.into_owned();
            self.assert_symbol(b':');
            let value = self.parse();
            map.insert(key, value);
            self.assert_symbol(b',');
        }
        self.assert_symbol(b',');
        self.symbol(b'}')?;
        Ok(map)
    }

    fn array_body(&mut self) -> Result<Array, SyntaxError> {
        let mut items = Vec::new();
        while !self.is_symbol(b']') {
            if self.peek_byte().is_none() {
                return Err(self.error(self.data.len(), SyntaxErrorKind::UnexpectedEnd));
            }
            items.push(self.parse());
            self.assert_symbol(b',');
        }
        self.assert_symbol(b',');
        self.symbol(b']')?;
        Ok(items)
    }

    /// Opens one container level at `start`.
    fn enter(&mut self, start: usize) -> Result<(), SyntaxError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(start, SyntaxErrorKind::TooDeep(MAX_DEPTH)));
        }
        self.depth += 1;
        Ok(())
    }

    /// Moves the cursor past a malformed value that started at `start`.
    ///
    /// Brackets opened since `start` are closed first; the cursor then stops
    /// in front of the next `,` or closing bracket at the original level.
    fn recover(&mut self, start: usize) {
        let consumed = self.data.get(start..self.off).unwrap_or_default();
        let mut depth = open_depth(consumed);
        let mut in_string = false;
        let mut i = self.off;
        while let Some(&b) = self.data.get(i) {
            if in_string {
                match b {
                    b'\\' => i += 1,
                    b'"' => in_string = false,
                    _ => {}
                }
            } else {
                match b {
                    b'"' => in_string = true,
                    b'{' | b'[' => depth += 1,
                    b'}' | b']' if depth == 0 => break,
                    b'}' | b']' => depth -= 1,
                    b',' if depth == 0 => break,
                    _ => {}
                }
            }
            i += 1;
        }
        self.off = i.min(self.data.len());
        self.token = None;
        self.assert = None;
    }

    /// Takes the next token of the expected shape. A token of any other
    /// shape stays cached and an error is returned.
    fn expect(
        &mut self,
        expected: &'static str,
        accept: impl FnOnce(TokenKind) -> bool,
    ) -> Result<Token<'a>, SyntaxError> {
        let token = self.next_token()?;
        if accept(token.kind) {
            return Ok(token);
        }
        self.token = Some(token);
        Err(self.error(
            token.start,
            SyntaxErrorKind::UnexpectedToken {
                expected,
                found: token.kind.describe(),
            },
        ))
    }

    fn next_token(&mut self) -> Result<Token<'a>, SyntaxError> {
        match self.token.take() {
            Some(token) => Ok(token),
            None => self.scan(),
        }
    }

    fn parse_number<T: core::str::FromStr>(&mut self, what: &'static str) -> Result<T, SyntaxError> {
        let token = self.expect("number", |kind| kind == TokenKind::Number)?;
        self.convert(token, what)
    }

    fn convert<T: core::str::FromStr>(&self, token: Token<'a>, what: &'static str) -> Result<T, SyntaxError> {
        core::str::from_utf8(token.raw)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| self.error(token.start, SyntaxErrorKind::InvalidNumber(what)))
    }

    fn decode_str(&self, token: Token<'a>) -> Result<Cow<'a, str>, SyntaxError> {
        let text = core::str::from_utf8(token.raw)
            .map_err(|_| self.error(token.start, SyntaxErrorKind::InvalidUtf8))?;
        let escaped = token.kind == TokenKind::String { escaped: true };
        if !escaped || !self.options.decode_escapes {
            return Ok(Cow::Borrowed(text));
        }
        unescape(text)
            .map(Cow::Owned)
            .ok_or_else(|| self.error(token.start, SyntaxErrorKind::InvalidEscape))
    }

    fn peek_byte(&self) -> Option<u8> {
        self.data
            .get(self.off..)
            .unwrap_or_default()
            .iter()
            .copied()
            .find(|b| !is_whitespace(*b))
    }

    fn skip_whitespace(&mut self) {
        while self.data.get(self.off).copied().is_some_and(is_whitespace) {
            self.off += 1;
        }
    }

    /// Scans the next token, consuming a pending separator on the way.
    ///
    /// The cursor is left on the offending byte when scanning fails.
    fn scan(&mut self) -> Result<Token<'a>, SyntaxError> {
        loop {
            self.skip_whitespace();
            let start = self.off;
            let Some(&b) = self.data.get(start) else {
                return Err(self.error(start, SyntaxErrorKind::UnexpectedEnd));
            };
            match (b, self.assert) {
                (b',' | b':', Some(expected)) if expected == b => {
                    self.assert = None;
                    self.off += 1;
                }
                (b',' | b':', _) | (b'}' | b']', None) => {
                    return Err(self.error(start, SyntaxErrorKind::UnexpectedCharacter(char::from(b))));
                }
                (b'}' | b']', Some(b',')) | (_, None) => {
                    self.assert = None;
                    return self.scan_token(start, b);
                }
                (_, Some(expected)) => {
                    return Err(self.error(
                        start,
                        SyntaxErrorKind::MissingSeparator {
                            expected: char::from(expected),
                            found: char::from(b),
                        },
                    ));
                }
            }
        }
    }

    fn scan_token(&mut self, start: usize, b: u8) -> Result<Token<'a>, SyntaxError> {
        let (kind, raw, end) = match b {
            b'{' | b'}' | b'[' | b']' => (TokenKind::Symbol(b), &self.data[start..=start], start + 1),
            b'"' => {
                let mut i = start + 1;
                let mut escaped = false;
                loop {
                    match self.data.get(i) {
                        None => return Err(self.error(start, SyntaxErrorKind::UnexpectedEnd)),
                        Some(b'"') => break,
                        Some(b'\\') => {
                            escaped = true;
                            i += 2;
                        }
                        Some(_) => i += 1,
                    }
                }
                (TokenKind::String { escaped }, &self.data[start + 1..i], i + 1)
            }
            b'-' | b'0'..=b'9' => {
                let mut i = start + 1;
                while matches!(
                    self.data.get(i),
                    Some(b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-')
                ) {
                    i += 1;
                }
                (TokenKind::Number, &self.data[start..i], i)
            }
            b't' => self.literal(start, b"true", TokenKind::Bool(true))?,
            b'f' => self.literal(start, b"false", TokenKind::Bool(false))?,
            b'n' => self.literal(start, b"null", TokenKind::Null)?,
            _ => {
                return Err(self.error(start, SyntaxErrorKind::UnexpectedCharacter(char::from(b))));
            }
        };
        self.off = end;
        Ok(Token { kind, raw, start })
    }

    fn literal(
        &self,
        start: usize,
        text: &'static [u8],
        kind: TokenKind,
    ) -> Result<(TokenKind, &'a [u8], usize), SyntaxError> {
        let end = start + text.len();
        match self.data.get(start..end) {
            Some(raw) if raw == text => Ok((kind, raw, end)),
            _ => Err(self.error(start, SyntaxErrorKind::InvalidLiteral)),
        }
    }

    fn error(&self, offset: usize, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(self.data, offset, kind)
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Number of brackets left open in `data`, which starts at a value boundary.
/// Closers that do not match the innermost opener are ignored.
fn open_depth(data: &[u8]) -> usize {
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escape = false;
    for &b in data {
        if in_string {
            if escape {
                escape = false;
            } else if b == b'\\' {
                escape = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => open.push(b'}'),
            b'[' => open.push(b']'),
            b'}' | b']' if open.last() == Some(&b) => {
                open.pop();
            }
            _ => {}
        }
    }
    open.len()
}
