use alloc::string::String;

use thiserror::Error;

use crate::parser::SyntaxError;

/// Failure of a generated `unmarshal_json` call.
///
/// Every variant is fatal for the enclosing call: the object being decoded
/// may hold a partial result and should be destructed or discarded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed or unexpected input.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    /// An enum name or ordinal that the enum's tables do not contain.
    #[error("unknown value {value} for enum {enum_name}")]
    UnknownEnumValue {
        /// Fully qualified schema name of the enum.
        enum_name: &'static str,
        /// The rejected input, either the name or the decimal ordinal.
        value: String,
    },
}
