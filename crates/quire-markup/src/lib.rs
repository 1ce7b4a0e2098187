//! Streaming markup parser for the quire document dialect.
//!
//! # Scope
//!
//! This crate provides:
//! - **Charset resolution** - the fixed table of supported document charsets
//! - **Input buffering** - a growable read-ahead buffer refilled in blocks
//! - **Entity decoding** - the five XML named entities plus numeric references
//! - **Parsing** - a finite-state machine that drives a [`DocumentHandler`]
//!   with start-element, end-element, text and comment events
//!
//! The dialect is XML-like: a document starts with an `<?xml ...?>`
//! declaration, every element is closed, and attribute values are quoted.
//! Any malformed input aborts the parse with a [`ParseError`] carrying the
//! line and column of the offending character.

pub mod buffer;
pub mod charset;
pub mod entity;
pub mod error;
pub mod handler;
pub mod parser;

pub use buffer::{InputBuffer, REFILL_BLOCK};
pub use charset::Charset;
pub use error::{ParseError, ParseErrorKind};
pub use handler::{Attributes, DocumentHandler, EventCollector, HandlerResult, MarkupEvent};
pub use parser::{MarkupParser, ParserState};
