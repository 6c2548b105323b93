//! Decomposition of `nick!user@host` message sources.

/// A message source split into its parts.
///
/// Parts absent from the source are empty strings. A server name such as
/// `irc.example.net` ends up entirely in `nick`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrefixRef<'a> {
    /// Nickname (or server name).
    pub nick: &'a str,
    /// Username, between `!` and `@`.
    pub user: &'a str,
    /// Hostname, after `@`.
    pub host: &'a str,
    /// The unsplit source.
    pub raw: &'a str,
}

impl<'a> PrefixRef<'a> {
    /// Split a raw source string.
    pub fn parse(raw: &'a str) -> Self {
        PrefixRef {
            nick: extract_nick(raw),
            user: extract_user(raw),
            host: extract_host(raw),
            raw,
        }
    }

    /// True when the source carries neither a user nor a host part.
    pub fn is_bare(&self) -> bool {
        self.user.is_empty() && self.host.is_empty()
    }
}

/// Everything before the first `!` or `@`, whichever comes first.
pub fn extract_nick(prefix: &str) -> &str {
    match prefix.find(['!', '@']) {
        Some(end) => &prefix[..end],
        None => prefix,
    }
}

/// The part between `!` and `@`, or empty without a `!` before the `@`.
pub fn extract_user(prefix: &str) -> &str {
    let before_host = match prefix.find('@') {
        Some(at) => &prefix[..at],
        None => prefix,
    };
    match before_host.find('!') {
        Some(bang) => &before_host[bang + 1..],
        None => "",
    }
}

/// Everything after the first `@`, or empty.
pub fn extract_host(prefix: &str) -> &str {
    match prefix.find('@') {
        Some(at) => &prefix[at + 1..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_prefix() {
        assert_eq!(extract_nick("a!b@c"), "a");
        assert_eq!(extract_user("a!b@c"), "b");
        assert_eq!(extract_host("a!b@c"), "c");
    }

    #[test]
    fn test_partial_prefix() {
        assert_eq!(extract_nick("a@c"), "a");
        assert_eq!(extract_user("a@c"), "");
        assert_eq!(extract_host("a@c"), "c");

        assert_eq!(extract_nick("a!b"), "a");
        assert_eq!(extract_user("a!b"), "b");
        assert_eq!(extract_host("a!b"), "");

        assert_eq!(extract_nick("a"), "a");
        assert_eq!(extract_user("a"), "");
        assert_eq!(extract_host("a"), "");
    }

    #[test]
    fn test_empty_prefix() {
        let p = PrefixRef::parse("");
        assert_eq!(p, PrefixRef::default());
        assert!(p.is_bare());
    }

    #[test]
    fn test_at_before_bang() {
        // The host part swallows any later '!'.
        assert_eq!(extract_nick("a@h!x"), "a");
        assert_eq!(extract_user("a@h!x"), "");
        assert_eq!(extract_host("a@h!x"), "h!x");
    }

    #[test]
    fn test_server_source() {
        let p = PrefixRef::parse("irc.example.net");
        assert_eq!(p.nick, "irc.example.net");
        assert!(p.is_bare());
    }
}
