//! The callback contract between the parser and its consumer.

use std::collections::HashMap;

use crate::error::ParseErrorKind;

/// Attributes of one start tag, keyed by lower-cased name.
///
/// Values are fully decoded: entities are resolved and embedded tabs and
/// newlines are already folded to spaces.
pub type Attributes = HashMap<String, String>;

/// Result of a handler callback. An error aborts the parse; the parser adds
/// the current line and column.
pub type HandlerResult = Result<(), ParseErrorKind>;

/// Receives the event sequence produced by [`crate::MarkupParser`].
///
/// The parser drives its consumer exclusively through this trait. Events
/// arrive in document order: `start_document`, then a balanced sequence of
/// element, text and comment events, then `end_document`.
pub trait DocumentHandler {
    /// Called once before any other event.
    fn start_document(&mut self) -> HandlerResult {
        Ok(())
    }

    /// Called once after the root element has been closed.
    fn end_document(&mut self) -> HandlerResult {
        Ok(())
    }

    /// An element was opened. Self-closing tags produce a start immediately
    /// followed by an end.
    fn start_element(&mut self, name: &str, attributes: &Attributes) -> HandlerResult;

    /// An element was closed.
    fn end_element(&mut self, name: &str) -> HandlerResult;

    /// A run of character data inside the root element.
    fn text(&mut self, text: &str) -> HandlerResult;

    /// A comment, without its `<!--` and `-->` delimiters.
    fn comment(&mut self, _text: &str) -> HandlerResult {
        Ok(())
    }
}

/// One event recorded by [`EventCollector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    /// An element was opened.
    StartElement {
        /// Lower-cased element name.
        name: String,
        /// Attributes sorted by name.
        attributes: Vec<(String, String)>,
    },
    /// An element was closed.
    EndElement(String),
    /// Character data.
    Text(String),
    /// Comment body.
    Comment(String),
}

/// A handler that records every event, for debugging and tests.
///
/// Adjacent text events are merged so that the recorded stream does not
/// depend on where the parser happened to flush.
#[derive(Debug, Default)]
pub struct EventCollector {
    /// The recorded events.
    pub events: Vec<MarkupEvent>,
    /// Whether `end_document` was seen.
    pub finished: bool,
}

impl EventCollector {
    /// Create an empty collector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            finished: false,
        }
    }

    /// Concatenation of all text events.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                MarkupEvent::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DocumentHandler for EventCollector {
    fn end_document(&mut self) -> HandlerResult {
        self.finished = true;
        Ok(())
    }

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> HandlerResult {
        let mut attributes: Vec<(String, String)> = attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        attributes.sort();
        self.events.push(MarkupEvent::StartElement {
            name: name.to_string(),
            attributes,
        });
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> HandlerResult {
        self.events.push(MarkupEvent::EndElement(name.to_string()));
        Ok(())
    }

    fn text(&mut self, text: &str) -> HandlerResult {
        if let Some(MarkupEvent::Text(previous)) = self.events.last_mut() {
            previous.push_str(text);
        } else {
            self.events.push(MarkupEvent::Text(text.to_string()));
        }
        Ok(())
    }

    fn comment(&mut self, text: &str) -> HandlerResult {
        self.events.push(MarkupEvent::Comment(text.to_string()));
        Ok(())
    }
}
