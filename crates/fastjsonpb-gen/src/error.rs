use thiserror::Error;

/// Errors raised while turning descriptors into codec source.
#[derive(Debug, Error)]
pub enum GenError {
    /// The schema uses a shape the codecs cannot represent.
    #[error("unsupported schema shape in {context}: {reason}")]
    UnsupportedSchemaShape {
        /// Fully qualified name of the offending type or field.
        context: String,
        /// What is unsupported.
        reason: &'static str,
    },

    /// A field refers to a type that none of the supplied files declares.
    #[error("unresolved type {type_name} referenced by {context}")]
    UnresolvedType {
        /// The reference as written in the descriptor.
        type_name: String,
        /// Fully qualified name of the referencing field.
        context: String,
    },

    /// Two schema types would be emitted under the same Rust name.
    #[error("{name} would be generated for both {first} and {second}")]
    DuplicateName {
        /// The colliding Rust name.
        name: String,
        /// Fully qualified name of the first type.
        first: String,
        /// Fully qualified name of the second type.
        second: String,
    },

    /// The request `parameter` string could not be understood.
    #[error("invalid parameter {0:?}")]
    InvalidParameter(String),

    /// The request could not be decoded or the response encoded.
    #[error("invalid request: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading the request or writing the response failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
