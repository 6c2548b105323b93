//! ISUPPORT (`RPL_ISUPPORT`, numeric 005) negotiation.
//!
//! Servers advertise their capabilities as `KEY=VALUE` tokens spread over
//! one or more 005 lines. A session tracks three of them: `CASEMAPPING`,
//! `PREFIX` and `CHANMODES`. Everything else is ignored, since servers send
//! many tokens and keep adding new ones.
//!
//! The generic [`Isupport`] view is available for callers that want to
//! look at other tokens themselves.

use tracing::warn;

use crate::casemap::CaseMapping;
use crate::error::MessageParseError;
use crate::message::Message;
use crate::mode::ModeClass;
use crate::util::{assign_bounded, MAX_CHANMODE_CLASS_LEN};

/// Index of the first ISUPPORT token in a 005 message
/// (after prefix, numeric and target nick).
const FIRST_TOKEN: usize = 3;

/// One `KEY` or `KEY=VALUE` token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsupportEntry<'a> {
    pub key: &'a str,
    pub value: Option<&'a str>,
}

/// Borrowed view over the tokens of a single 005 message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Isupport<'a> {
    entries: Vec<IsupportEntry<'a>>,
}

impl<'a> Isupport<'a> {
    pub fn parse_params<S: AsRef<str>>(params: &'a [S]) -> Self {
        let mut entries = Vec::with_capacity(params.len());
        for p in params {
            let p = p.as_ref();
            // The human-readable trailer ("are supported by this server").
            if p.contains(' ') {
                continue;
            }
            if p.is_empty() {
                continue;
            }
            let (key, value) = match p.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (p, None),
            };
            entries.push(IsupportEntry { key, value });
        }
        Isupport { entries }
    }

    /// Tokens of `msg`, or `None` if it is not a 005.
    pub fn from_message(msg: &'a Message) -> Option<Self> {
        if msg.command() != "005" {
            return None;
        }
        let tokens = msg.args().get(FIRST_TOKEN..).unwrap_or(&[]);
        Some(Self::parse_params(tokens))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IsupportEntry<'a>> {
        self.entries.iter()
    }

    /// Last value given for `key`, compared case-insensitively.
    pub fn get(&self, key: &str) -> Option<Option<&'a str>> {
        self.entries
            .iter()
            .rfind(|e| e.key.eq_ignore_ascii_case(key))
            .map(|e| e.value)
    }

    pub fn casemapping(&self) -> Option<&'a str> {
        self.get("CASEMAPPING").flatten()
    }

    pub fn network(&self) -> Option<&'a str> {
        self.get("NETWORK").flatten()
    }
}

/// Channel status modes and their display symbols, from `PREFIX=`.
///
/// `modes` and `symbols` are parallel: the n-th mode letter is shown as the
/// n-th symbol. Both always have the same, non-zero length.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct PrefixSpec {
    modes: String,
    symbols: String,
}

impl Default for PrefixSpec {
    fn default() -> Self {
        PrefixSpec {
            modes: "ov".to_owned(),
            symbols: "@+".to_owned(),
        }
    }
}

impl PrefixSpec {
    /// Parse a `PREFIX` value such as `(ov)@+`.
    ///
    /// The value must open with `(`, contain `)`, and have equally long,
    /// non-empty mode and symbol segments.
    pub fn parse(value: &str) -> Result<Self, MessageParseError> {
        let invalid = || MessageParseError::InvalidIsupport {
            key: "PREFIX",
            value: value.to_owned(),
        };

        let inner = value.strip_prefix('(').ok_or_else(invalid)?;
        let (modes, symbols) = inner.split_once(')').ok_or_else(invalid)?;
        let count = modes.chars().count();
        if count == 0 || count != symbols.chars().count() {
            return Err(invalid());
        }

        Ok(PrefixSpec {
            modes: modes.to_owned(),
            symbols: symbols.to_owned(),
        })
    }

    /// Status mode letters, highest rank first (e.g. `ov`).
    pub fn modes(&self) -> &str {
        &self.modes
    }

    /// Display symbols, parallel to [`modes`](Self::modes) (e.g. `@+`).
    pub fn symbols(&self) -> &str {
        &self.symbols
    }

    /// Number of distinguished status levels.
    pub fn len(&self) -> usize {
        self.modes.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn is_status_mode(&self, mode: char) -> bool {
        self.modes.contains(mode)
    }

    /// Display symbol for a status mode letter.
    pub fn symbol_for(&self, mode: char) -> Option<char> {
        let idx = self.modes.chars().position(|m| m == mode)?;
        self.symbols.chars().nth(idx)
    }

    /// Status mode letter for a display symbol.
    pub fn mode_for(&self, symbol: char) -> Option<char> {
        let idx = self.symbols.chars().position(|s| s == symbol)?;
        self.modes.chars().nth(idx)
    }
}

impl TryFrom<String> for PrefixSpec {
    type Error = MessageParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PrefixSpec::parse(&value)
    }
}

/// The `PREFIX` value form, e.g. `(ov)@+`.
impl From<PrefixSpec> for String {
    fn from(spec: PrefixSpec) -> Self {
        format!("({}){}", spec.modes, spec.symbols)
    }
}

/// The four `CHANMODES` classes.
///
/// Index 0 is class A (list modes), 1 is B (always parameterized),
/// 2 is C (parameterized when set), 3 is D (flags).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChanModes {
    classes: [String; 4],
}

impl Default for ChanModes {
    fn default() -> Self {
        ChanModes::new("b", "k", "l", "psitnm")
    }
}

impl ChanModes {
    pub fn new(a: &str, b: &str, c: &str, d: &str) -> Self {
        ChanModes {
            classes: [a.to_owned(), b.to_owned(), c.to_owned(), d.to_owned()],
        }
    }

    /// Parse a `CHANMODES` value.
    ///
    /// Never fails: groups past the fourth are dropped and missing ones are
    /// left blank. Returns the number of groups actually present so callers
    /// can complain about malformed values.
    ///
    /// Groups are positional. An empty group keeps its place rather than
    /// being skipped, so `b,,l,imnpst` leaves class B empty and counts as
    /// 4 groups.
    ///
    /// ```
    /// use slirc_session::ChanModes;
    ///
    /// let (modes, groups) = ChanModes::parse("b,,l,imnpst");
    /// assert_eq!(groups, 4);
    /// assert_eq!(modes.b(), "");
    /// assert_eq!(modes.c(), "l");
    /// ```
    pub fn parse(value: &str) -> (Self, usize) {
        let mut classes: [String; 4] = Default::default();
        let mut count = 0;
        for group in value.split(',') {
            if let Some(slot) = classes.get_mut(count) {
                assign_bounded(slot, group, MAX_CHANMODE_CLASS_LEN);
            }
            count += 1;
        }
        (ChanModes { classes }, count)
    }

    pub fn a(&self) -> &str {
        &self.classes[0]
    }

    pub fn b(&self) -> &str {
        &self.classes[1]
    }

    pub fn c(&self) -> &str {
        &self.classes[2]
    }

    pub fn d(&self) -> &str {
        &self.classes[3]
    }

    pub fn classes(&self) -> &[String; 4] {
        &self.classes
    }

    /// Class of `mode`, searching A through D in order.
    pub fn classify(&self, mode: char) -> Option<ModeClass> {
        const ORDER: [ModeClass; 4] = [ModeClass::A, ModeClass::B, ModeClass::C, ModeClass::D];
        self.classes
            .iter()
            .zip(ORDER)
            .find(|(letters, _)| letters.contains(mode))
            .map(|(_, class)| class)
    }
}

/// Server capabilities negotiated through 005.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServerSupport {
    pub casemapping: CaseMapping,
    pub prefix: PrefixSpec,
    pub chanmodes: ChanModes,
}

impl ServerSupport {
    /// Fold the tokens of one 005 message into this state.
    ///
    /// Only a malformed `PREFIX` is an error; it stops processing of the
    /// remaining tokens. Tokens seen before it stay applied.
    pub fn apply_isupport(&mut self, msg: &Message) -> Result<(), MessageParseError> {
        for token in msg.args().iter().skip(FIRST_TOKEN) {
            if let Some(value) = strip_key(token, "CASEMAPPING=") {
                self.casemapping = CaseMapping::from_isupport(value);
            } else if let Some(value) = strip_key(token, "PREFIX=") {
                self.prefix = PrefixSpec::parse(value)?;
            } else if let Some(value) = strip_key(token, "CHANMODES=") {
                let (chanmodes, groups) = ChanModes::parse(value);
                if groups != 4 {
                    warn!(
                        "005 chanmodes: expected 4 params, got {}. arg: \"{}\"",
                        groups, value
                    );
                }
                self.chanmodes = chanmodes;
            }
        }
        Ok(())
    }
}

/// Case-insensitive `key` prefix match, returning the rest.
fn strip_key<'a>(token: &'a str, key: &str) -> Option<&'a str> {
    let head = token.get(..key.len())?;
    if head.eq_ignore_ascii_case(key) {
        Some(&token[key.len()..])
    } else {
        None
    }
}
