//! Runtime support for generated protobuf JSON codecs.
//!
//! Code emitted by `fastjsonpb-gen` converts typed messages to and from JSON
//! without an intermediate document model. It relies on three pieces that
//! live here:
//!
//! - [`Parser`], a single-token-lookahead tokenizer over a complete input
//!   buffer. Separators are asserted lazily: callers request `,` after every
//!   item and the parser accepts a closing bracket in its place.
//! - [`Buffer`], the output writer with JSON string escaping. Sequences are
//!   written with an unconditional trailing `,` that [`Buffer::fix_symbol`]
//!   retracts before the closer.
//! - [`Pool`], an explicit free list for buffers and message instances.
//!
//! ```rust
//! use fastjsonpb::{Buffer, Parser};
//!
//! let mut buf = Buffer::new();
//! buf.write_byte(b'[');
//! for n in [1, 2, 3] {
//!     buf.write_int32(n);
//!     buf.write_byte(b',');
//! }
//! buf.fix_symbol();
//! buf.write_byte(b']');
//! assert_eq!(buf.as_bytes(), b"[1,2,3]");
//!
//! let mut p = Parser::new(buf.as_bytes());
//! let mut total = 0;
//! p.symbol(b'[').unwrap();
//! while !p.is_symbol(b']') {
//!     total += p.int32().unwrap();
//!     p.assert_symbol(b',');
//! }
//! p.assert_symbol(b',');
//! p.symbol(b']').unwrap();
//! assert_eq!(total, 6);
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod buffer;
mod codec;
mod error;
mod escape;
mod map_key;
mod parser;
mod pool;
mod value;


pub use buffer::{Buffer, BufferPool};
pub use codec::{Codec, Enumeration, marshal, marshal_into, unmarshal, unmarshal_with_options};
pub use error::Error;
pub use map_key::MapKey;
pub use parser::{EnumToken, MAX_DEPTH, Parser, ParserOptions, SyntaxError, SyntaxErrorKind};
pub use pool::{DEFAULT_POOL_CAPACITY, Pool};
pub use value::{Array, Map, Value};
