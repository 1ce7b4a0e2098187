//! Parse errors.
//!
//! Every malformed-input condition aborts the parse. Errors carry the line
//! (1-based) and column (0-based) of the character that triggered them.

use thiserror::Error;

use crate::charset::Charset;
use crate::parser::ParserState;

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The document does not start with `<?xml` followed by whitespace.
    #[error("document must start with '<?xml' followed by whitespace, found {found:?}")]
    MissingXmlDeclaration {
        /// The bytes actually found at the start of the document.
        found: String,
    },
    /// A named entity other than `lt`, `gt`, `amp`, `quot` or `apos`.
    #[error("unknown entity '&{0};'")]
    UnknownEntity(String),
    /// A numeric reference that is malformed or names no character.
    #[error("invalid character reference '&{0};'")]
    InvalidCharacterReference(String),
    /// A numeric reference above 255 in a single-byte charset.
    #[error("character reference '&{reference};' does not fit in {charset}")]
    CharacterOutOfRange {
        /// The reference text between `&` and `;`.
        reference: String,
        /// The document charset.
        charset: Charset,
    },
    /// An attribute value that does not start with a quote.
    #[error("value of attribute '{0}' must be quoted")]
    UnquotedAttributeValue(String),
    /// A character that is not allowed in the current state.
    #[error("unexpected character {found:?} in {state} state")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// The parser state it was read in.
        state: ParserState,
    },
    /// Input ended inside a tag, comment, entity or declaration.
    #[error("unexpected end of input in {0} state")]
    UnexpectedEof(ParserState),
    /// Input ended while elements were still open.
    #[error("missing end tag for <{0}>")]
    MissingEndTag(String),
    /// An end tag that does not close the innermost open element.
    #[error("end tag </{found}> does not match open element <{expected}>")]
    MismatchedEndTag {
        /// The innermost open element.
        expected: String,
        /// The end tag that was read.
        found: String,
    },
    /// An end tag with no open element at all.
    #[error("end tag </{0}> has no matching start tag")]
    UnexpectedEndTag(String),
    /// Non-whitespace text before the root element.
    #[error("text outside the root element")]
    TextOutsideRoot,
    /// The document ended without any element.
    #[error("document has no root element")]
    MissingRootElement,
    /// A resume state was requested with an empty state stack.
    #[error("state stack underflow in {0} state")]
    StateStackUnderflow(ParserState),
    /// Text is not valid in the document charset.
    #[error("text is not valid {0}")]
    InvalidEncoding(Charset),
    /// The handler does not know this element.
    #[error("unknown start-tag <{0}>")]
    UnknownStartTag(String),
    /// The handler does not know this end tag.
    #[error("unknown end-tag </{0}>")]
    UnknownEndTag(String),
    /// The handler rejected an event for a semantic reason.
    #[error("{0}")]
    Handler(String),
    /// Reading the input stream failed.
    #[error("read error: {0}")]
    Io(String),
}

/// A fatal parse error with its position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}, column {column}: {kind}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// 1-based line of the offending character.
    pub line: usize,
    /// 0-based column of the offending character.
    pub column: usize,
}

impl ParseError {
    /// Create an error at the given position.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}
