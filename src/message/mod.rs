//! Tokenized IRC messages.
//!
//! A [`Message`] is the unit the session core consumes: slot 0 holds the
//! sender prefix (empty when the server omitted it), slot 1 the command or
//! numeric, and the remaining slots the parameters.

mod nom_parser;
mod types;

pub use self::nom_parser::{parse_line, ParsedLine};
pub use self::types::{Message, MAX_ARGS};
