//! The markup parser state machine.
//!
//! The parser reads bytes from an [`crate::InputBuffer`], normalises line
//! endings, and dispatches each character to the handler for the current
//! [`ParserState`]. States that are entered from more than one place (entities,
//! quoted values, attributes of the XML declaration) push their resume state
//! onto an explicit state stack and pop it when they finish.

/// State transition, input and event emission helpers.
pub mod helpers;
/// Parser struct, parse loop and per-state handlers.
pub mod machine;
/// The parser states.
pub mod state;

pub use machine::MarkupParser;
pub use state::ParserState;
