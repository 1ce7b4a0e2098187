//! Errors raised while turning markup into a document.

use std::io;

use quire_markup::{ParseError, ParseErrorKind};
use thiserror::Error;

/// A semantic error detected by the tree builder.
///
/// The parser guarantees that tags are balanced; these cover the cases where
/// balanced markup still makes no sense to the builder. They reach the caller
/// as [`ParseErrorKind::Handler`] so that the position is attached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// More style end tags than style start tags.
    #[error("style stack underflow at </{0}>")]
    StyleStackUnderflow(String),
    /// `</a>` without an open anchor.
    #[error("link stack underflow")]
    LinkStackUnderflow,
    /// A form control outside of `<form>`.
    #[error("<{0}> outside of a form")]
    MissingFormContext(String),
    /// `<option>` outside of `<select>`.
    #[error("<option> outside of a select element")]
    OptionOutsideSelect,
    /// `<form>` inside another form.
    #[error("<form> inside another form")]
    NestedForm,
    /// A control, or an `<option>`, opened before the previous one closed.
    #[error("<{0}> inside another form control")]
    NestedControl(String),
    /// The builder's stacks were not empty when the document ended.
    #[error("unbalanced {0} stack at end of document")]
    UnbalancedStacks(&'static str),
    /// An end tag tried to close the root container.
    #[error("</{0}> would close the root container")]
    CloseRootContainer(String),
    /// `<tr>`, `<td>` or `<th>` outside of `<table>`.
    #[error("<{0}> outside of a table")]
    TableMarkupOutsideTable(String),
    /// Content placed directly in a table or list instead of one of its
    /// cells or items.
    #[error("<{0}> directly inside a table or list")]
    MisplacedContent(String),
    /// `<li>` outside of `<ul>` or `<ol>`.
    #[error("list item outside of a list")]
    ListItemOutsideList,
    /// An end tag closed a block opened by a different tag.
    #[error("</{found}> closes a block opened by <{expected}>")]
    BlockMismatch {
        /// Tag that opened the innermost block.
        expected: String,
        /// Tag being closed.
        found: String,
    },
}

impl From<BuildError> for ParseErrorKind {
    fn from(error: BuildError) -> Self {
        Self::Handler(error.to_string())
    }
}

/// Failure to produce a document from markup.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The markup is malformed or the builder rejected it.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// The document could not be read.
    #[error("cannot read '{location}': {source}")]
    Io {
        /// Location that failed to open.
        location: String,
        /// Underlying error.
        source: io::Error,
    },
}

impl DocumentError {
    /// The parse error, if this is one.
    #[must_use]
    pub const fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(error) => Some(error),
            Self::Io { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_becomes_handler_kind() {
        let kind: ParseErrorKind = BuildError::ListItemOutsideList.into();
        assert_eq!(
            kind,
            ParseErrorKind::Handler("list item outside of a list".to_string())
        );
    }
}
