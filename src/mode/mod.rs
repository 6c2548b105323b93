//! Channel mode expansion.
//!
//! Turns a compact mode change such as `+ov-k alice bob secret` into one
//! [`ModeChange`] per mode letter, pairing each letter with its argument
//! according to the server's `CHANMODES` and `PREFIX` announcements.

mod parse;
mod types;

pub use self::parse::{expand_chanmodes, expand_mode_message, MISSING_ARG};
pub use self::types::{ModeChange, ModeClass};
