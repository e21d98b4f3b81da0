use std::fmt;
use std::io;

use thiserror::Error;

/// A byte offset and the corresponding line and column number.
///
/// Lines and columns both start at 0. Columns count characters, not bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub byte_offset: u64,
    pub line: u64,
    pub col: u64,
}

impl Location {
    pub(crate) fn advance_by_char(&mut self, c: char) {
        if c == '\n' {
            self.col = 0;
            self.line += 1;
        } else {
            self.col += 1;
        }
        self.byte_offset += c.len_utf8() as u64;
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line:{}, col:{}", self.line, self.col)
    }
}

/// What went wrong during a decode call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorCode {
    /// The source ran out in the middle of a value.
    #[error("unexpected end of input while parsing {context}")]
    UnexpectedEof { context: &'static str },

    #[error("unexpected character {found:?} while parsing {context}")]
    UnexpectedCharacter { found: char, context: &'static str },

    #[error("integer part of number must not start with 0 except for '0'")]
    LeadingZero,

    #[error("expected a digit in {context} but found {found:?}")]
    ExpectedDigit { found: char, context: &'static str },

    #[error("key of object must be a string but found {found:?}")]
    InvalidKey { found: char },

    #[error("':' is expected after key of object but found {found:?}")]
    ExpectedColon { found: char },

    #[error("unexpected ',' before '{closing}'")]
    TrailingComma { closing: char },

    #[error("expected end of input but found {found:?}")]
    TrailingCharacters { found: char },

    #[error("{0}: identifier not recognized")]
    UnknownIdentifier(String),

    #[error("'\\{0}' is invalid escaped character")]
    UnknownEscape(char),

    #[error("{0:?} not a hex character")]
    NotHex(char),

    /// A `\uXXXX` escape that does not form a Unicode scalar value on its own
    /// or as part of a surrogate pair.
    #[error("\\u{0:04X} is not a valid unicode escape")]
    InvalidUnicodeEscape(u32),

    #[error("invalid number literal '{0}'")]
    InvalidNumber(String),

    #[error("invalid UTF-8 in input")]
    InvalidUtf8,

    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

/// The error type used in this crate. Comes with [`Location`] information.
#[derive(Debug, Error)]
#[error("Decode error at {location}: {code}")]
pub struct DecodeError {
    #[source]
    code: ErrorCode,
    location: Location,
}

impl DecodeError {
    /// Creates a new [`DecodeError`].
    pub fn new(code: ErrorCode, location: Location) -> DecodeError {
        DecodeError { code, location }
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn into_code(self) -> ErrorCode {
        self.code
    }

    /// The location in the source at which the error was encountered.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Whether the source ended in the middle of a value.
    pub fn is_eof(&self) -> bool {
        matches!(self.code, ErrorCode::UnexpectedEof { .. })
    }
}

/// A type alias for `Result<T, DecodeError>`.
pub type DecodeResult<T> = Result<T, DecodeError>;
