use strum_macros::Display;

/// The states of the markup parser.
///
/// `Display` renders the state name, which error messages use to say where
/// the input went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ParserState {
    /// Character data between tags.
    Text,
    /// Inside `&...;`. Resumes the pushed state.
    Entity,
    /// Accumulating a start tag name, or one of the `<!` prefixes.
    OpenTag,
    /// Accumulating an end tag name after `</`.
    CloseTag,
    /// Just after `<`.
    StartTag,
    /// Accumulating an attribute name.
    AttributeLvalue,
    /// Whitespace between an attribute name and `=`.
    AttributeEqual,
    /// After `=`, waiting for the opening quote.
    AttributeRvalue,
    /// Inside a quoted attribute value. Resumes the pushed state.
    Quote,
    /// Inside a start tag, between attributes.
    InTag,
    /// After the `/` of a self-closing tag, waiting for `>`.
    SingleTag,
    /// Inside `<!-- ... -->`.
    Comment,
    /// Inside `<!DOCTYPE ...>`, including an internal subset.
    Doctype,
    /// Reading the attributes of the XML declaration.
    InXmlDeclaration,
    /// Matching the leading `<?xml` of the document.
    BeforeXmlDeclaration,
    /// After the `?` that closes the XML declaration, waiting for `>`.
    OpenXmlDeclaration,
    /// Inside `<![CDATA[ ... ]]>`.
    Cdata,
    /// The root element has been closed.
    Done,
}
