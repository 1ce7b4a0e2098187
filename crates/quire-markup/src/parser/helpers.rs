//! Helper functions for the markup parser.
//!
//! This module contains utility functions used throughout the state machine:
//! - State transitions and the resume-state stack
//! - Input handling with line-ending normalisation and position tracking
//! - Event emission to the [`DocumentHandler`]
//! - Error construction

use std::io::Read;

use crate::buffer::InputBuffer;
use crate::error::{ParseError, ParseErrorKind};
use crate::handler::{DocumentHandler, HandlerResult};

use super::machine::MarkupParser;
use super::state::ParserState;

/// Whitespace as the dialect defines it: space, tab, newline, carriage return.
#[must_use]
pub const fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r')
}

/// Characters that may start a tag or attribute name.
#[must_use]
pub const fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b':'
}

/// Characters that may continue a tag or attribute name.
#[must_use]
pub const fn is_name_char(c: u8) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == b'-' || c == b'.'
}

// =============================================================================
// State Transition Helpers
// =============================================================================

impl MarkupParser {
    /// Switch to `new_state` for the next character.
    pub(super) fn switch_to(&mut self, new_state: ParserState) {
        log::trace!(target: "quire.markup", "{} -> {}", self.state, new_state);
        self.state = new_state;
    }

    /// Save the state to return to once a sub-state finishes.
    pub(super) fn push_state(&mut self, resume: ParserState) {
        self.state_stack.push(resume);
    }

    /// Take the most recent resume state.
    ///
    /// An empty stack means the state machine itself is inconsistent; this is
    /// reported as a fatal error rather than ignored.
    pub(super) fn pop_state(&mut self) -> Result<ParserState, ParseError> {
        self.state_stack
            .pop()
            .ok_or_else(|| self.error(ParseErrorKind::StateStackUnderflow(self.state)))
    }

    /// Start an attribute whose name begins with `c`; resumes the pushed state
    /// once its quoted value is stored.
    pub(super) fn begin_attribute(&mut self, c: u8) {
        self.attribute_name.clear();
        self.attribute_name.push(char::from(c.to_ascii_lowercase()));
        self.switch_to(ParserState::AttributeLvalue);
    }

    /// Start an entity reference that resumes `resume` after its `;`.
    pub(super) fn begin_entity(&mut self, resume: ParserState) {
        self.push_state(resume);
        self.entity.clear();
        self.entity_position = (self.char_line, self.char_column);
        self.switch_to(ParserState::Entity);
    }
}

// =============================================================================
// Input Helpers
// =============================================================================

impl MarkupParser {
    /// Consume the next character, folding `\r\n` and `\r` into `\n`.
    ///
    /// Lines are 1-based and columns 0-based. With a UTF-8 charset, UTF-8
    /// continuation bytes do not advance the column, so columns count
    /// characters rather than bytes.
    pub(super) fn next_char<R: Read>(
        &mut self,
        input: &mut InputBuffer<R>,
    ) -> Result<Option<u8>, ParseError> {
        self.char_line = self.line;
        self.char_column = self.column;

        let Some(c) = input.next_byte().map_err(|e| self.io_error(&e))? else {
            return Ok(None);
        };

        match c {
            b'\r' => {
                if input.peek().map_err(|e| self.io_error(&e))? == Some(b'\n') {
                    let _ = input.next_byte().map_err(|e| self.io_error(&e))?;
                }
                self.new_line();
                Ok(Some(b'\n'))
            }
            b'\n' => {
                self.new_line();
                Ok(Some(c))
            }
            _ => {
                if !(self.charset.is_multibyte() && c & 0xC0 == 0x80) {
                    self.column += 1;
                }
                Ok(Some(c))
            }
        }
    }

    const fn new_line(&mut self) {
        self.line += 1;
        self.column = 0;
    }

    fn io_error(&self, error: &std::io::Error) -> ParseError {
        self.error(ParseErrorKind::Io(error.to_string()))
    }
}

// =============================================================================
// Event Emission Helpers
// =============================================================================

impl MarkupParser {
    /// Deliver pending character data.
    ///
    /// Whitespace outside the root element is dropped; any other text there
    /// is an error.
    pub(super) fn flush_text(&mut self, handler: &mut dyn DocumentHandler) -> Result<(), ParseError> {
        if self.text.is_empty() {
            return Ok(());
        }
        let bytes = std::mem::take(&mut self.text);
        let Ok(text) = self.charset.decode(&bytes) else {
            return Err(self.error(ParseErrorKind::InvalidEncoding(self.charset)));
        };

        if self.open_elements.is_empty() {
            if text.bytes().all(is_whitespace) {
                return Ok(());
            }
            return Err(self.error(ParseErrorKind::TextOutsideRoot));
        }
        self.event(handler.text(&text))
    }

    /// Store the attribute whose closing quote was just read.
    pub(super) fn store_attribute(&mut self) -> Result<(), ParseError> {
        let value = match self.charset.decode(&self.attribute_value) {
            Ok(value) => value.into_owned(),
            Err(_) => return Err(self.error(ParseErrorKind::InvalidEncoding(self.charset))),
        };
        let name = std::mem::take(&mut self.attribute_name);
        let _ = self.attributes.insert(name, value);
        Ok(())
    }

    /// Emit a start tag; a self-closing tag also emits its end tag.
    ///
    /// The attribute map is cleared after the callback.
    pub(super) fn emit_start(
        &mut self,
        handler: &mut dyn DocumentHandler,
        self_closing: bool,
    ) -> Result<(), ParseError> {
        let name = self.tag_name.to_ascii_lowercase();
        self.event(handler.start_element(&name, &self.attributes))?;
        self.attributes.clear();
        self.seen_root = true;

        if self_closing {
            self.event(handler.end_element(&name))?;
            if self.open_elements.is_empty() {
                self.switch_to(ParserState::Done);
                return Ok(());
            }
        } else {
            self.open_elements.push(name);
        }
        self.switch_to(ParserState::Text);
        Ok(())
    }

    /// Emit an end tag. Closing the root element finishes the document.
    pub(super) fn emit_end(&mut self, handler: &mut dyn DocumentHandler) -> Result<(), ParseError> {
        let name = self.tag_name.to_ascii_lowercase();
        match self.open_elements.last() {
            None => return Err(self.error(ParseErrorKind::UnexpectedEndTag(name))),
            Some(open) if *open != name => {
                return Err(self.error(ParseErrorKind::MismatchedEndTag {
                    expected: open.clone(),
                    found: name,
                }));
            }
            Some(_) => {}
        }
        let _ = self.open_elements.pop();
        self.event(handler.end_element(&name))?;

        if self.open_elements.is_empty() {
            self.switch_to(ParserState::Done);
        } else {
            self.switch_to(ParserState::Text);
        }
        Ok(())
    }
}

// =============================================================================
// Error Helpers
// =============================================================================

impl MarkupParser {
    /// An error at the position of the character being processed.
    pub(super) const fn error(&self, kind: ParseErrorKind) -> ParseError {
        ParseError::new(kind, self.char_line, self.char_column)
    }

    /// An error at an earlier, remembered position.
    pub(super) const fn error_at(&self, kind: ParseErrorKind, position: (usize, usize)) -> ParseError {
        ParseError::new(kind, position.0, position.1)
    }

    /// Attach the current position to a handler result.
    pub(super) fn event(&self, result: HandlerResult) -> Result<(), ParseError> {
        result.map_err(|kind| self.error(kind))
    }

    /// Reject `c` in the current state.
    pub(super) fn unexpected(&self, c: u8) -> Result<(), ParseError> {
        Err(self.error(ParseErrorKind::UnexpectedCharacter {
            found: char::from(c),
            state: self.state,
        }))
    }
}
