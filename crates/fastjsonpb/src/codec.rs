use alloc::{boxed::Box, vec::Vec};

use crate::{
    Error,
    buffer::{Buffer, BufferPool},
    parser::{Parser, ParserOptions},
};

/// JSON encoding of a message type, implemented by generated code.
pub trait Codec {
    /// The pool set that `unmarshal_json` draws nested messages from and
    /// `destruct` returns them to.
    type Pools;

    /// Writes the message as a JSON object.
    fn marshal_json(&self, buf: &mut Buffer);

    /// Reads a JSON object into `self`, overwriting every field that
    /// appears in the input. Unknown keys are skipped.
    ///
    /// # Errors
    ///
    /// On failure `self` may be partially updated.
    fn unmarshal_json(&mut self, p: &mut Parser<'_>, pools: &Self::Pools) -> Result<(), Error>;

    /// Resets the message and every owned nested message to their zero
    /// state and returns them to `pools`.
    fn destruct(self: Box<Self>, pools: &Self::Pools);
}

/// A protobuf enum, implemented by generated code.
pub trait Enumeration: Copy + Default + 'static {
    /// Fully qualified schema name.
    const NAME: &'static str;

    /// Looks a value up by ordinal.
    fn from_i32(value: i32) -> Option<Self>;

    /// Looks a value up by declared name.
    fn from_str_name(name: &str) -> Option<Self>;

    /// The declared name, as written to JSON.
    fn as_str_name(&self) -> &'static str;
}

/// Encodes `obj` using a buffer borrowed from `pool`.
#[must_use]
pub fn marshal<T: Codec + ?Sized>(obj: &T, pool: &BufferPool) -> Vec<u8> {
    let mut buf = pool.acquire();
    buf.reset();
    obj.marshal_json(&mut buf);
    let out = buf.as_bytes().to_vec();
    pool.release(buf);
    out
}

/// Appends the encoding of `obj` to `buf`.
pub fn marshal_into<T: Codec + ?Sized>(obj: &T, buf: &mut Buffer) {
    obj.marshal_json(buf);
}

/// Decodes `data` into `obj` with default parser options.
///
/// Input after the closing `}` of the top-level object is not inspected.
///
/// # Errors
///
/// See [`Codec::unmarshal_json`].
pub fn unmarshal<T: Codec + ?Sized>(data: &[u8], obj: &mut T, pools: &T::Pools) -> Result<(), Error> {
    unmarshal_with_options(data, obj, pools, ParserOptions::default())
}

/// Decodes `data` into `obj`.
///
/// # Errors
///
/// See [`Codec::unmarshal_json`].
pub fn unmarshal_with_options<T: Codec + ?Sized>(
    data: &[u8],
    obj: &mut T,
    pools: &T::Pools,
    options: ParserOptions,
) -> Result<(), Error> {
    let mut p = Parser::with_options(data, options);
    obj.unmarshal_json(&mut p, pools)
}

#[cfg(test)]
mod tests {
    use alloc::{
        string::{String, ToString},
        vec,
    };

    use super::*;
    use crate::{Pool, SyntaxErrorKind};

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    enum Shade {
        #[default]
        Light,
        Dark,
    }

    impl Enumeration for Shade {
        const NAME: &'static str = "test.Shade";

        fn from_i32(value: i32) -> Option<Self> {
            match value {
                0 => Some(Self::Light),
                1 => Some(Self::Dark),
                _ => None,
            }
        }

        fn from_str_name(name: &str) -> Option<Self> {
            match name {
                "LIGHT" => Some(Self::Light),
                "DARK" => Some(Self::Dark),
                _ => None,
            }
        }

        fn as_str_name(&self) -> &'static str {
            match self {
                Self::Light => "LIGHT",
                Self::Dark => "DARK",
            }
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Swatch {
        name: String,
        shade: Shade,
        weights: Option<Vec<i32>>,
    }

    #[derive(Debug, Default)]
    struct Pools {
        swatch: Pool<Swatch>,
    }

    impl Codec for Swatch {
        type Pools = Pools;

        fn marshal_json(&self, buf: &mut Buffer) {
            buf.write_byte(b'{');
            if !self.name.is_empty() {
                buf.write(br#""name":"#);
                buf.write_string_quoted(&self.name);
                buf.write_byte(b',');
            }
            if self.shade != Shade::Light {
                buf.write(br#""shade":"#);
                buf.write_string_quoted(self.shade.as_str_name());
                buf.write_byte(b',');
            }
            if let Some(weights) = &self.weights {
                buf.write(br#""weights":["#);
                for w in weights {
                    buf.write_int32(*w);
                    buf.write_byte(b',');
                }
                buf.fix_symbol();
                buf.write(b"],");
            }
            buf.fix_symbol();
            buf.write_byte(b'}');
        }

        fn unmarshal_json(&mut self, p: &mut Parser<'_>, _: &Pools) -> Result<(), Error> {
            p.symbol(b'{')?;
            while !p.is_symbol(b'}') {
                let key = p.str()?;
                p.assert_symbol(b':');
                match &*key {
                    "name" => self.name = p.str()?.into_owned(),
                    "shade" => self.shade = p.enumeration()?,
                    "weights" => {
                        let weights = self.weights.get_or_insert_with(Vec::new);
                        weights.clear();
                        p.symbol(b'[')?;
                        while !p.is_symbol(b']') {
                            weights.push(p.int32()?);
                            p.assert_symbol(b',');
                        }
                        p.assert_symbol(b',');
                        p.symbol(b']')?;
                    }
                    _ => p.skip_value(),
                }
                p.assert_symbol(b',');
            }
            p.assert_symbol(b',');
            p.symbol(b'}')?;
            Ok(())
        }

        fn destruct(mut self: Box<Self>, pools: &Pools) {
            self.name.clear();
            self.shade = Shade::Light;
            self.weights = None;
            pools.swatch.release(self);
        }
    }

    #[test]
    fn marshal_then_unmarshal() {
        let buffers = BufferPool::new();
        let pools = Pools::default();
        let swatch = Swatch {
            name: "slate".into(),
            shade: Shade::Dark,
            weights: Some(vec![1, 2]),
        };
        let json = marshal(&swatch, &buffers);
        assert_eq!(json, br#"{"name":"slate","shade":"DARK","weights":[1,2]}"#);
        assert_eq!(buffers.len(), 1);

        let mut decoded = pools.swatch.acquire();
        unmarshal(&json, &mut *decoded, &pools).unwrap();
        assert_eq!(*decoded, swatch);
        decoded.destruct(&pools);
        assert_eq!(pools.swatch.len(), 1);
        assert_eq!(*pools.swatch.acquire(), Swatch::default());
    }

    #[test]
    fn empty_fields_are_omitted() {
        let mut buf = Buffer::new();
        marshal_into(&Swatch::default(), &mut buf);
        assert_eq!(buf.as_bytes(), b"{}");

        let swatch = Swatch {
            weights: Some(Vec::new()),
            ..Default::default()
        };
        buf.reset();
        marshal_into(&swatch, &mut buf);
        assert_eq!(buf.as_bytes(), br#"{"weights":[]}"#);
    }

    #[test]
    fn enum_by_ordinal_and_unknown_keys() {
        let pools = Pools::default();
        let mut swatch = Swatch::default();
        unmarshal(
            br#"{"extra": {"deep": [1, {"x": null}]}, "shade": 1, "more": "x"}"#,
            &mut swatch,
            &pools,
        )
        .unwrap();
        assert_eq!(swatch.shade, Shade::Dark);
    }

    #[test]
    fn unknown_enum_value() {
        let pools = Pools::default();
        let mut swatch = Swatch::default();
        let err = unmarshal(br#"{"shade": "DIM"}"#, &mut swatch, &pools).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownEnumValue {
                enum_name: "test.Shade",
                value: "DIM".into()
            }
        );

        let err = unmarshal(br#"{"shade": 7}"#, &mut swatch, &pools).unwrap_err();
        assert_eq!(err.to_string(), "unknown value 7 for enum test.Shade");
    }

    #[test]
    fn syntax_errors_propagate() {
        let pools = Pools::default();
        let mut swatch = Swatch::default();
        let err = unmarshal(br#"{"weights": [1 2]}"#, &mut swatch, &pools).unwrap_err();
        let Error::Syntax(err) = err else {
            panic!("expected syntax error, got {err:?}");
        };
        assert_eq!(
            err.kind,
            SyntaxErrorKind::MissingSeparator {
                expected: ',',
                found: '2'
            }
        );
    }
}
