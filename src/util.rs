//! Length limits and string helpers for session state.
//!
//! Session fields filled from server data are bounded. Values longer than
//! a field's limit are silently cut at the last UTF-8 boundary that fits;
//! nothing is rejected.

/// Maximum stored length of our nickname, in bytes.
pub const MAX_NICK_LEN: usize = 63;

/// Maximum stored length of our host / server name, in bytes.
pub const MAX_HOST_LEN: usize = 127;

/// Maximum stored length of the user and channel mode strings, in bytes.
pub const MAX_MODES_LEN: usize = 63;

/// Maximum stored length of the server version, in bytes.
pub const MAX_VERSION_LEN: usize = 127;

/// Maximum stored length of each `CHANMODES` class, in bytes.
pub const MAX_CHANMODE_CLASS_LEN: usize = 63;

/// Truncates a string to at most `max_bytes` bytes without breaking
/// a multi-byte UTF-8 codepoint at the end.
///
/// # Examples
///
/// ```
/// use slirc_session::util::truncate_utf8_safe;
///
/// assert_eq!(truncate_utf8_safe("hello world", 5), "hello");
/// assert_eq!(truncate_utf8_safe("Hello 👋 World", 8), "Hello ");
/// assert_eq!(truncate_utf8_safe("hi", 10), "hi");
/// ```
#[inline]
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    &s[..end]
}

/// Replace `dest` with `src`, truncated to `max_bytes`.
///
/// Reuses `dest`'s allocation.
#[inline]
pub fn assign_bounded(dest: &mut String, src: &str, max_bytes: usize) {
    dest.clear();
    dest.push_str(truncate_utf8_safe(src, max_bytes));
}

/// Cut `s` at the first `@`, then at the first `!`.
///
/// Numerics 001 and 383 sometimes carry `nick!user@host` where a bare nick
/// belongs.
pub fn strip_user_host(s: &str) -> &str {
    let s = s.split('@').next().unwrap_or(s);
    s.split('!').next().unwrap_or(s)
}

/// First character that would break a protocol line, if any.
pub fn find_line_breaker(s: &str) -> Option<char> {
    s.chars().find(|&c| matches!(c, '\0' | '\r' | '\n'))
}
