use std::io::Read;

use crate::buffer::{InputBuffer, REFILL_BLOCK};
use crate::charset::Charset;
use crate::entity::{MAX_ENTITY_LENGTH, decode_entity};
use crate::error::{ParseError, ParseErrorKind};
use crate::handler::{Attributes, DocumentHandler};

use super::helpers::{is_name_char, is_name_start, is_whitespace};
use super::state::ParserState;

/// Every document starts with this, followed by whitespace.
const XML_DECLARATION_PREFIX: &[u8] = b"<?xml";

/// UTF-8 byte-order mark, skipped before the declaration.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A streaming parser for the quire markup dialect.
///
/// One parser runs one document at a time: [`MarkupParser::parse`] takes
/// `&mut self`, resets all state, and reads the stream to the close of the
/// root element. Bytes after the root element are never read into events.
///
/// ```
/// use quire_markup::{EventCollector, MarkupParser};
///
/// let mut parser = MarkupParser::new();
/// let mut events = EventCollector::new();
/// parser
///     .parse_str(&mut events, "<?xml version=\"1.0\"?><p>a &amp; b</p>")
///     .unwrap();
/// assert_eq!(events.text_content(), "a & b");
/// ```
#[derive(Debug)]
pub struct MarkupParser {
    pub(super) state: ParserState,
    /// Resume points for states entered from several places.
    pub(super) state_stack: Vec<ParserState>,
    pub(super) charset: Charset,
    pub(super) block_size: usize,

    /// Position of the next character to read.
    pub(super) line: usize,
    pub(super) column: usize,
    /// Position of the character being processed; errors report this.
    pub(super) char_line: usize,
    pub(super) char_column: usize,

    /// Pending character data, in document charset bytes.
    pub(super) text: Vec<u8>,
    pub(super) tag_name: String,
    pub(super) attribute_name: String,
    pub(super) attribute_value: Vec<u8>,
    pub(super) attributes: Attributes,
    /// The quote character that opened the current attribute value.
    pub(super) quote: u8,
    pub(super) entity: String,
    pub(super) entity_position: (usize, usize),
    /// Body of a comment, CDATA section or declaration prefix.
    pub(super) markup: Vec<u8>,
    /// Whitespace after an end tag name has been seen.
    pub(super) close_name_done: bool,
    /// Nesting of `[` in a DOCTYPE internal subset.
    pub(super) doctype_depth: usize,

    /// Names of the open elements; its length is the nesting depth.
    pub(super) open_elements: Vec<String>,
    pub(super) seen_root: bool,
    pub(super) consumed: usize,
}

impl Default for MarkupParser {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupParser {
    /// Create a parser that refills its buffer in [`REFILL_BLOCK`] blocks.
    #[must_use]
    pub fn new() -> Self {
        Self::with_block_size(REFILL_BLOCK)
    }

    /// Create a parser with a custom refill block size.
    #[must_use]
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            state: ParserState::BeforeXmlDeclaration,
            state_stack: Vec::new(),
            charset: Charset::Utf8,
            block_size,
            line: 1,
            column: 0,
            char_line: 1,
            char_column: 0,
            text: Vec::new(),
            tag_name: String::new(),
            attribute_name: String::new(),
            attribute_value: Vec::new(),
            attributes: Attributes::new(),
            quote: b'"',
            entity: String::new(),
            entity_position: (1, 0),
            markup: Vec::new(),
            close_name_done: false,
            doctype_depth: 0,
            open_elements: Vec::new(),
            seen_root: false,
            consumed: 0,
        }
    }

    /// The charset selected by the last document's XML declaration.
    #[must_use]
    pub const fn charset(&self) -> Charset {
        self.charset
    }

    /// Number of input bytes consumed by the last parse.
    ///
    /// Parsing stops at the `>` that closes the root element, so this is the
    /// offset just past it for a successful parse.
    #[must_use]
    pub const fn bytes_consumed(&self) -> usize {
        self.consumed
    }

    /// Line and column of the next unread character.
    #[must_use]
    pub const fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Parse a whole document from `input`, driving `handler`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`], either detected by the parser or
    /// reported by the handler. No recovery is attempted.
    pub fn parse<H: DocumentHandler, R: Read>(
        &mut self,
        handler: &mut H,
        input: R,
    ) -> Result<(), ParseError> {
        *self = Self::with_block_size(self.block_size);
        let mut input = InputBuffer::with_block_size(input, self.block_size);
        self.event(handler.start_document())?;

        while self.state != ParserState::Done {
            let next = self.next_char(&mut input);
            self.consumed = input.consumed();
            let Some(c) = next? else {
                return Err(self.end_of_input_error());
            };
            self.step(c, handler)?;
        }

        log::debug!(
            target: "quire.markup",
            "parsed {} bytes, {} left unread",
            self.consumed,
            input.buffered()
        );
        self.event(handler.end_document())
    }

    /// Parse a document held in memory.
    ///
    /// # Errors
    ///
    /// See [`MarkupParser::parse`].
    pub fn parse_str<H: DocumentHandler>(
        &mut self,
        handler: &mut H,
        input: &str,
    ) -> Result<(), ParseError> {
        self.parse(handler, input.as_bytes())
    }

    /// Dispatch one normalised character to the current state.
    fn step(&mut self, c: u8, handler: &mut dyn DocumentHandler) -> Result<(), ParseError> {
        match self.state {
            ParserState::BeforeXmlDeclaration => self.handle_before_xml_declaration_state(c),
            ParserState::InXmlDeclaration => self.handle_in_xml_declaration_state(c),
            ParserState::OpenXmlDeclaration => self.handle_open_xml_declaration_state(c),
            ParserState::Text => self.handle_text_state(c, handler),
            ParserState::Entity => self.handle_entity_state(c),
            ParserState::StartTag => self.handle_start_tag_state(c),
            ParserState::OpenTag => self.handle_open_tag_state(c, handler),
            ParserState::CloseTag => self.handle_close_tag_state(c, handler),
            ParserState::InTag => self.handle_in_tag_state(c, handler),
            ParserState::AttributeLvalue => self.handle_attribute_lvalue_state(c),
            ParserState::AttributeEqual => self.handle_attribute_equal_state(c),
            ParserState::AttributeRvalue => self.handle_attribute_rvalue_state(c),
            ParserState::Quote => self.handle_quote_state(c),
            ParserState::SingleTag => self.handle_single_tag_state(c, handler),
            ParserState::Comment => self.handle_comment_state(c, handler),
            ParserState::Cdata => {
                self.handle_cdata_state(c);
                Ok(())
            }
            ParserState::Doctype => {
                self.handle_doctype_state(c);
                Ok(())
            }
            ParserState::Done => Ok(()),
        }
    }

    // =========================================================================
    // XML declaration
    // =========================================================================

    fn handle_before_xml_declaration_state(&mut self, c: u8) -> Result<(), ParseError> {
        self.markup.push(c);
        if UTF8_BOM.starts_with(&self.markup) {
            if self.markup.len() == UTF8_BOM.len() {
                self.markup.clear();
            }
            return Ok(());
        }

        if self.markup.len() <= XML_DECLARATION_PREFIX.len() {
            if XML_DECLARATION_PREFIX.starts_with(&self.markup) {
                return Ok(());
            }
        } else if is_whitespace(c) {
            self.markup.clear();
            self.switch_to(ParserState::InXmlDeclaration);
            return Ok(());
        }

        Err(self.error(ParseErrorKind::MissingXmlDeclaration {
            found: String::from_utf8_lossy(&self.markup).into_owned(),
        }))
    }

    fn handle_in_xml_declaration_state(&mut self, c: u8) -> Result<(), ParseError> {
        match c {
            c if is_whitespace(c) => Ok(()),
            b'?' => {
                self.switch_to(ParserState::OpenXmlDeclaration);
                Ok(())
            }
            c if is_name_start(c) => {
                self.push_state(ParserState::InXmlDeclaration);
                self.begin_attribute(c);
                Ok(())
            }
            _ => self.unexpected(c),
        }
    }

    fn handle_open_xml_declaration_state(&mut self, c: u8) -> Result<(), ParseError> {
        if c != b'>' {
            return self.unexpected(c);
        }
        if let Some(encoding) = self.attributes.get("encoding") {
            self.charset = Charset::resolve(encoding);
        }
        self.attributes.clear();
        self.switch_to(ParserState::Text);
        Ok(())
    }

    // =========================================================================
    // Character data
    // =========================================================================

    fn handle_text_state(
        &mut self,
        c: u8,
        handler: &mut dyn DocumentHandler,
    ) -> Result<(), ParseError> {
        match c {
            b'&' => self.begin_entity(ParserState::Text),
            b'<' => {
                self.flush_text(handler)?;
                self.switch_to(ParserState::StartTag);
            }
            _ => self.text.push(c),
        }
        Ok(())
    }

    fn handle_entity_state(&mut self, c: u8) -> Result<(), ParseError> {
        match c {
            b';' => {
                let resume = self.pop_state()?;
                let mut decoded = Vec::new();
                if let Err(kind) = decode_entity(&self.entity, self.charset, &mut decoded) {
                    return Err(self.error_at(kind, self.entity_position));
                }
                match resume {
                    ParserState::Quote => self.attribute_value.extend_from_slice(&decoded),
                    _ => self.text.extend_from_slice(&decoded),
                }
                self.switch_to(resume);
                Ok(())
            }
            c if (c.is_ascii_alphanumeric() || c == b'#') && self.entity.len() < MAX_ENTITY_LENGTH => {
                self.entity.push(char::from(c));
                Ok(())
            }
            c if c.is_ascii_alphanumeric() => Err(self.error_at(
                ParseErrorKind::UnknownEntity(self.entity.clone()),
                self.entity_position,
            )),
            _ => self.unexpected(c),
        }
    }

    fn handle_cdata_state(&mut self, c: u8) {
        self.markup.push(c);
        if self.markup.ends_with(b"]]>") {
            let body = self.markup.len() - 3;
            self.text.extend_from_slice(&self.markup[..body]);
            self.markup.clear();
            self.switch_to(ParserState::Text);
        }
    }

    // =========================================================================
    // Tags
    // =========================================================================

    fn handle_start_tag_state(&mut self, c: u8) -> Result<(), ParseError> {
        self.tag_name.clear();
        match c {
            b'/' => {
                self.close_name_done = false;
                self.switch_to(ParserState::CloseTag);
                Ok(())
            }
            b'!' => {
                self.tag_name.push('!');
                self.switch_to(ParserState::OpenTag);
                Ok(())
            }
            c if is_name_start(c) => {
                self.tag_name.push(char::from(c));
                self.switch_to(ParserState::OpenTag);
                Ok(())
            }
            _ => self.unexpected(c),
        }
    }

    fn handle_open_tag_state(
        &mut self,
        c: u8,
        handler: &mut dyn DocumentHandler,
    ) -> Result<(), ParseError> {
        if self.tag_name.starts_with('!') {
            return self.match_markup_declaration(c);
        }
        match c {
            c if is_name_char(c) => {
                self.tag_name.push(char::from(c));
                Ok(())
            }
            c if is_whitespace(c) => {
                self.switch_to(ParserState::InTag);
                Ok(())
            }
            b'>' => self.emit_start(handler, false),
            b'/' => {
                self.switch_to(ParserState::SingleTag);
                Ok(())
            }
            _ => self.unexpected(c),
        }
    }

    /// Match `<!--`, `<![CDATA[` and `<!DOCTYPE` incrementally against the
    /// name read so far.
    fn match_markup_declaration(&mut self, c: u8) -> Result<(), ParseError> {
        self.tag_name.push(char::from(c));
        let name = self.tag_name.as_str();
        if name == "!--" {
            self.markup.clear();
            self.switch_to(ParserState::Comment);
        } else if name == "![CDATA[" {
            self.markup.clear();
            self.switch_to(ParserState::Cdata);
        } else if name.eq_ignore_ascii_case("!DOCTYPE") {
            self.markup.clear();
            self.doctype_depth = 0;
            self.switch_to(ParserState::Doctype);
        } else {
            let is_prefix = "!--".starts_with(name)
                || "![CDATA[".starts_with(name)
                || "!DOCTYPE"
                    .get(..name.len())
                    .is_some_and(|prefix| prefix.eq_ignore_ascii_case(name));
            if !is_prefix {
                return self.unexpected(c);
            }
        }
        Ok(())
    }

    fn handle_in_tag_state(
        &mut self,
        c: u8,
        handler: &mut dyn DocumentHandler,
    ) -> Result<(), ParseError> {
        match c {
            c if is_whitespace(c) => Ok(()),
            b'>' => self.emit_start(handler, false),
            b'/' => {
                self.switch_to(ParserState::SingleTag);
                Ok(())
            }
            c if is_name_start(c) => {
                self.push_state(ParserState::InTag);
                self.begin_attribute(c);
                Ok(())
            }
            _ => self.unexpected(c),
        }
    }

    fn handle_single_tag_state(
        &mut self,
        c: u8,
        handler: &mut dyn DocumentHandler,
    ) -> Result<(), ParseError> {
        if c == b'>' {
            self.emit_start(handler, true)
        } else {
            self.unexpected(c)
        }
    }

    fn handle_close_tag_state(
        &mut self,
        c: u8,
        handler: &mut dyn DocumentHandler,
    ) -> Result<(), ParseError> {
        match c {
            c if is_name_char(c) && !self.close_name_done => {
                if self.tag_name.is_empty() && !is_name_start(c) {
                    return self.unexpected(c);
                }
                self.tag_name.push(char::from(c));
                Ok(())
            }
            c if is_whitespace(c) && !self.tag_name.is_empty() => {
                self.close_name_done = true;
                Ok(())
            }
            b'>' if !self.tag_name.is_empty() => self.emit_end(handler),
            _ => self.unexpected(c),
        }
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    fn handle_attribute_lvalue_state(&mut self, c: u8) -> Result<(), ParseError> {
        match c {
            c if is_name_char(c) => {
                self.attribute_name.push(char::from(c.to_ascii_lowercase()));
                Ok(())
            }
            b'=' => {
                self.switch_to(ParserState::AttributeRvalue);
                Ok(())
            }
            c if is_whitespace(c) => {
                self.switch_to(ParserState::AttributeEqual);
                Ok(())
            }
            _ => self.unexpected(c),
        }
    }

    fn handle_attribute_equal_state(&mut self, c: u8) -> Result<(), ParseError> {
        match c {
            c if is_whitespace(c) => Ok(()),
            b'=' => {
                self.switch_to(ParserState::AttributeRvalue);
                Ok(())
            }
            _ => self.unexpected(c),
        }
    }

    fn handle_attribute_rvalue_state(&mut self, c: u8) -> Result<(), ParseError> {
        match c {
            c if is_whitespace(c) => Ok(()),
            b'"' | b'\'' => {
                self.quote = c;
                self.attribute_value.clear();
                self.switch_to(ParserState::Quote);
                Ok(())
            }
            _ => Err(self.error(ParseErrorKind::UnquotedAttributeValue(
                self.attribute_name.clone(),
            ))),
        }
    }

    fn handle_quote_state(&mut self, c: u8) -> Result<(), ParseError> {
        if c == self.quote {
            self.store_attribute()?;
            let resume = self.pop_state()?;
            self.switch_to(resume);
            return Ok(());
        }
        match c {
            b'&' => self.begin_entity(ParserState::Quote),
            b'\t' | b'\n' | b'\r' => self.attribute_value.push(b' '),
            _ => self.attribute_value.push(c),
        }
        Ok(())
    }

    // =========================================================================
    // Comments and declarations
    // =========================================================================

    fn handle_comment_state(
        &mut self,
        c: u8,
        handler: &mut dyn DocumentHandler,
    ) -> Result<(), ParseError> {
        self.markup.push(c);
        if !self.markup.ends_with(b"-->") {
            return Ok(());
        }

        // Comments inside a DOCTYPE internal subset are skipped silently.
        if self.state_stack.last() == Some(&ParserState::Doctype) {
            self.markup.clear();
            let resume = self.pop_state()?;
            self.switch_to(resume);
            return Ok(());
        }

        let body = self.markup.len() - 3;
        let comment = match self.charset.decode(&self.markup[..body]) {
            Ok(comment) => comment.into_owned(),
            Err(_) => return Err(self.error(ParseErrorKind::InvalidEncoding(self.charset))),
        };
        self.markup.clear();
        self.event(handler.comment(&comment))?;
        self.switch_to(ParserState::Text);
        Ok(())
    }

    fn handle_doctype_state(&mut self, c: u8) {
        match c {
            b'[' => self.doctype_depth += 1,
            b']' => self.doctype_depth = self.doctype_depth.saturating_sub(1),
            b'>' if self.doctype_depth == 0 => {
                self.markup.clear();
                self.switch_to(ParserState::Text);
                return;
            }
            _ => {}
        }

        if self.doctype_depth > 0 {
            // Sliding window over the last four bytes to spot `<!--`.
            self.markup.push(c);
            if self.markup.len() > 4 {
                let _ = self.markup.remove(0);
            }
            if self.markup == b"<!--" {
                self.markup.clear();
                self.push_state(ParserState::Doctype);
                self.switch_to(ParserState::Comment);
            }
        }
    }

    // =========================================================================
    // End of input
    // =========================================================================

    fn end_of_input_error(&self) -> ParseError {
        let kind = match self.state {
            ParserState::BeforeXmlDeclaration => ParseErrorKind::MissingXmlDeclaration {
                found: String::from_utf8_lossy(&self.markup).into_owned(),
            },
            ParserState::Text => self.open_elements.last().map_or(
                ParseErrorKind::MissingRootElement,
                |name| ParseErrorKind::MissingEndTag(name.clone()),
            ),
            state => ParseErrorKind::UnexpectedEof(state),
        };
        self.error(kind)
    }
}
