use alloc::string::String;

use thiserror::Error;

/// Number of input bytes quoted in a [`SyntaxError`].
const NEAR_LEN: usize = 32;

/// A violated grammar expectation, located by byte offset.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("syntax error: {kind} near offset {offset} {near:?}")]
pub struct SyntaxError {
    /// What went wrong.
    pub kind: SyntaxErrorKind,
    /// Byte offset into the input where the problem was detected.
    pub offset: usize,
    /// Input remaining at `offset`, truncated.
    pub near: String,
}

impl SyntaxError {
    pub(crate) fn new(data: &[u8], offset: usize, kind: SyntaxErrorKind) -> Self {
        let rest = data.get(offset..).unwrap_or_default();
        let rest = &rest[..rest.len().min(NEAR_LEN)];
        Self {
            kind,
            offset,
            near: String::from_utf8_lossy(rest).into_owned(),
        }
    }
}

#[allow(missing_docs)]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("expected '{expected}' before '{found}'")]
    MissingSeparator { expected: char, found: char },
    #[error("invalid literal")]
    InvalidLiteral,
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid {0} number")]
    InvalidNumber(&'static str),
    #[error("invalid {0} map key")]
    InvalidMapKey(&'static str),
    #[error("invalid UTF-8 in string")]
    InvalidUtf8,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid base64 payload")]
    InvalidBase64,
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),
}
