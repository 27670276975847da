use alloc::string::String;

use crate::buffer::Buffer;

/// A type usable as a protobuf map key.
///
/// JSON object keys are always strings, so integral and boolean keys are
/// written in quotes and parsed back from the key text.
pub trait MapKey: Sized {
    /// Protobuf name of the key type, used in error messages.
    const KIND: &'static str;

    /// Writes the key as a quoted JSON string.
    fn write_key(&self, buf: &mut Buffer);

    /// Converts key text back to a key.
    fn parse_key(text: &str) -> Option<Self>;
}

impl MapKey for String {
    const KIND: &'static str = "string";

    fn write_key(&self, buf: &mut Buffer) {
        buf.write_string_quoted(self);
    }

    fn parse_key(text: &str) -> Option<Self> {
        Some(Self::from(text))
    }
}

macro_rules! display_keys {
    ($($ty:ty => $kind:literal,)*) => {$(
        impl MapKey for $ty {
            const KIND: &'static str = $kind;

            fn write_key(&self, buf: &mut Buffer) {
                buf.write_byte(b'"');
                let _ = core::fmt::Write::write_fmt(buf, format_args!("{self}"));
                buf.write_byte(b'"');
            }

            fn parse_key(text: &str) -> Option<Self> {
                text.parse().ok()
            }
        }
    )*};
}

display_keys! {
    bool => "bool",
    i32 => "int32",
    i64 => "int64",
    u32 => "uint32",
    u64 => "uint64",
}
