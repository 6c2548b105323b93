//! IRC message prefix (source) helpers.

mod types;

pub use self::types::{extract_host, extract_nick, extract_user, PrefixRef};
