use std::io;

use bstr::BString;
use thiserror::Error;

/// Failure of a single lookup call.
///
/// A missing element is not an error: it is reported as
/// [`Lookup::NotFound`](crate::Lookup::NotFound).
#[derive(Error, Debug)]
pub enum LookupError {
    /// The caller broke the call contract (zero capacity, bad options).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The query string is not a valid absolute element path.
    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryError),
    /// The document could not be opened or read.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    /// The document is not well-formed enough to be tokenized.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl LookupError {
    /// The coarse classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidQuery(_) => ErrorKind::InvalidQuery,
            Self::Io(_) => ErrorKind::Io,
            Self::Parse(_) => ErrorKind::Parse,
        }
    }
}

/// Coarse classification of a [`LookupError`].
///
/// The discriminants are stable and double as the error codes reported at
/// the C boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    /// See [`LookupError::InvalidArgument`].
    InvalidArgument = 1,
    /// See [`LookupError::InvalidQuery`].
    InvalidQuery = 2,
    /// See [`LookupError::Io`].
    Io = 3,
    /// See [`LookupError::Parse`].
    Parse = 4,
}

impl ErrorKind {
    /// Stable numeric code of this kind; `0` is reserved for "no error".
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Rejection reason for a query string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The query string has no characters at all.
    #[error("query is empty")]
    Empty,
    /// Queries are absolute and begin with `/`.
    #[error("query must start with '/'")]
    MissingLeadingSlash,
    /// `//`, a trailing `/`, or the lone `/`.
    #[error("empty segment at position {position}")]
    EmptySegment {
        /// Zero-based index of the empty segment.
        position: usize,
    },
}

/// A document syntax error together with where it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source} at {line}:{column}")]
pub struct ParseError {
    pub(crate) source: SyntaxError,
    /// 1-based line of the offending byte.
    pub line: usize,
    /// 1-based byte column of the offending byte.
    pub column: usize,
}

impl ParseError {
    /// The syntax violation that was detected.
    #[must_use]
    pub fn syntax(&self) -> &SyntaxError {
        &self.source
    }
}

/// Tag syntax and nesting violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// End of input inside `<...>`.
    #[error("unterminated tag")]
    UnterminatedTag,
    /// `<>`, `</>` or whitespace right after `<`.
    #[error("empty tag name")]
    EmptyTagName,
    /// A byte that cannot appear at this point of a tag.
    #[error("unexpected byte '{}' in tag", .0.escape_ascii())]
    UnexpectedByte(u8),
    /// End of input inside a comment, processing instruction, CDATA section
    /// or declaration.
    #[error("unterminated {0}")]
    UnterminatedMarkup(&'static str),
    /// A close tag whose name differs from the innermost open element.
    #[error("close tag </{found}> does not match open tag <{expected}>")]
    MismatchedCloseTag {
        /// Name of the innermost open element.
        expected: BString,
        /// Name found in the close tag.
        found: BString,
    },
    /// A close tag while no element is open.
    #[error("close tag </{0}> has no open element")]
    UnexpectedCloseTag(BString),
    /// An element opened after the root element was closed.
    #[error("element <{0}> is a second root element")]
    MultipleRoots(BString),
    /// End of input while this element was still open.
    #[error("unexpected end of input inside <{0}>")]
    UnclosedElement(BString),
}
