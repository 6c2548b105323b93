//! IRC case-mapping functions.
//!
//! IRC uses a special case-insensitive comparison where some characters
//! are considered equivalent (e.g., `[` and `{`). Servers announce which
//! variant they use through the `CASEMAPPING` ISUPPORT token; until one is
//! announced, `rfc1459` applies.

use std::cmp::Ordering;

use tracing::warn;

/// Case-folding rule announced by a server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CaseMapping {
    /// Only `A`-`Z` fold.
    Ascii,
    /// `A`-`Z` plus `[`, `\`, `]` and `^`.
    #[default]
    Rfc1459,
    /// `A`-`Z` plus `[`, `\` and `]`.
    StrictRfc1459,
}

impl CaseMapping {
    /// Map an ISUPPORT `CASEMAPPING` value to a variant.
    ///
    /// Unrecognized values fall back to [`CaseMapping::Rfc1459`].
    pub fn from_isupport(value: &str) -> Self {
        if value.eq_ignore_ascii_case("ascii") {
            Self::Ascii
        } else if value.eq_ignore_ascii_case("strict-rfc1459") {
            Self::StrictRfc1459
        } else {
            if !value.eq_ignore_ascii_case("rfc1459") {
                warn!("unknown 005 casemapping: '{}'", value);
            }
            Self::Rfc1459
        }
    }

    /// The ISUPPORT name of this mapping.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Rfc1459 => "rfc1459",
            Self::StrictRfc1459 => "strict-rfc1459",
        }
    }

    /// Number of code points past `Z` that fold along with the letters.
    fn extra_range(self) -> u8 {
        match self {
            Self::Ascii => 0,
            Self::Rfc1459 => 4,
            Self::StrictRfc1459 => 3,
        }
    }

    /// Fold a single character.
    ///
    /// `Rfc1459` maps `[`→`{`, `\`→`|`, `]`→`}`, `^`→`~` in addition to
    /// ASCII letters; `StrictRfc1459` leaves `^` alone.
    #[inline]
    pub fn fold(self, c: char) -> char {
        let upper = b'Z' + self.extra_range();
        if c.is_ascii() && (b'A'..=upper).contains(&(c as u8)) {
            (c as u8 + (b'a' - b'A')) as char
        } else {
            c
        }
    }

    /// Fold a whole string.
    pub fn to_lower(self, s: &str) -> String {
        s.chars().map(|c| self.fold(c)).collect()
    }

    /// Compare two strings under this mapping.
    ///
    /// The comparison covers `min(len) + 1` characters, so the end of the
    /// shorter string takes part: `"nick"` and `"nicks"` differ.
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        let mut left = a.chars().map(|c| self.fold(c));
        let mut right = b.chars().map(|c| self.fold(c));
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(l), Some(r)) => match l.cmp(&r) {
                    Ordering::Equal => continue,
                    other => return other,
                },
            }
        }
    }

    /// Whether two strings are equal under this mapping.
    pub fn equals(self, a: &str, b: &str) -> bool {
        self.compare(a, b) == Ordering::Equal
    }
}

impl std::fmt::Display for CaseMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Convert a string to IRC lowercase using RFC 1459 case mapping.
pub fn irc_to_lower(s: &str) -> String {
    CaseMapping::Rfc1459.to_lower(s)
}

/// Compare two strings using RFC 1459 case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    CaseMapping::Rfc1459.equals(a, b)
}
