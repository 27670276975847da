//! Document model produced by the fallback parser.
//!
//! Generated codecs never build a [`Value`] on their own; it only appears
//! when [`Parser::parse`](crate::Parser::parse) reads a value whose schema
//! is unknown.

use alloc::{collections::BTreeMap, string::String, vec::Vec};
use core::fmt;

use crate::buffer::Buffer;

/// Object members, ordered by key.
pub type Map = BTreeMap<String, Value>;
/// Array items.
pub type Array = Vec<Value>;

/// Any JSON value.
///
/// # Examples
///
/// ```
/// use fastjsonpb::{Map, Parser, Value};
///
/// let mut p = Parser::new(br#"{"key": ["value", 1.5, null]}"#);
/// let v = p.parse();
/// assert_eq!(v.to_string(), r#"{"key":["value",1.5,null]}"#);
///
/// let mut map = Map::new();
/// map.insert("k".into(), Value::Boolean(true));
/// assert_eq!(Value::Object(map).to_string(), r#"{"k":true}"#);
/// ```
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
#[allow(missing_docs)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Map),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Self::Array(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Self::Object(v)
    }
}

impl Value {
    /// Returns `true` if the value is [`Null`].
    ///
    /// [`Null`]: Value::Null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The number, if this is one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The string, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up `key` if this is an object.
    ///
    /// ```
    /// use fastjsonpb::Parser;
    ///
    /// let v = Parser::new(br#"{"a": {"b": 2}}"#).parse();
    /// assert_eq!(v.get("a").and_then(|a| a.get("b")).and_then(|b| b.as_f64()), Some(2.0));
    /// assert!(v.get("z").is_none());
    /// ```
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Writes the value as compact JSON.
    pub fn write_json(&self, buf: &mut Buffer) {
        match self {
            Self::Null => buf.write(b"null"),
            Self::Boolean(b) => buf.write_bool(*b),
            Self::Number(n) => buf.write_float64(*n),
            Self::String(s) => buf.write_string_quoted(s),
            Self::Array(items) => {
                buf.write_byte(b'[');
                for item in items {
                    item.write_json(buf);
                    buf.write_byte(b',');
                }
                buf.fix_symbol();
                buf.write_byte(b']');
            }
            Self::Object(map) => {
                buf.write_byte(b'{');
                for (key, value) in map {
                    buf.write_map_key(key);
                    value.write_json(buf);
                    buf.write_byte(b',');
                }
                buf.fix_symbol();
                buf.write_byte(b'}');
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Buffer::new();
        self.write_json(&mut buf);
        let text = core::str::from_utf8(buf.as_bytes()).map_err(|_| fmt::Error)?;
        f.write_str(text)
    }
}
