//! Owned tokenized message type.

use std::fmt;
use std::str::FromStr;

use crate::error::MessageParseError;

use super::nom_parser::parse_line;

/// Maximum number of slots in a tokenized message (prefix and command included).
pub const MAX_ARGS: usize = 15;

/// An already-tokenized IRC message.
///
/// Always holds at least the prefix and command slots. Numerics are kept as
/// their literal three-digit text.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<String>", into = "Vec<String>")
)]
pub struct Message {
    args: Vec<String>,
}

impl Message {
    /// Build a message from a prefix, a command and its parameters.
    ///
    /// Parameters past [`MAX_ARGS`] are folded into the last slot,
    /// space-separated, the way an over-long line would tokenize.
    pub fn new<I, S>(prefix: &str, command: &str, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = Vec::with_capacity(MAX_ARGS);
        args.push(prefix.to_owned());
        args.push(command.to_owned());
        for param in params {
            let param = param.into();
            if args.len() < MAX_ARGS {
                args.push(param);
            } else if let Some(last) = args.last_mut() {
                last.push(' ');
                last.push_str(&param);
            }
        }
        Message { args }
    }

    /// Tokenize one raw line, with or without its CRLF terminator.
    pub fn parse(line: &str) -> Result<Self, MessageParseError> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.trim().is_empty() {
            return Err(MessageParseError::EmptyMessage);
        }
        let (_, parsed) = parse_line(trimmed).map_err(|_| MessageParseError::InvalidCommand)?;
        Ok(Message::new(
            parsed.prefix.unwrap_or(""),
            parsed.command,
            parsed.params,
        ))
    }

    /// Sender prefix; empty when the server sent none.
    pub fn prefix(&self) -> &str {
        &self.args[0]
    }

    /// Command name or numeric.
    pub fn command(&self) -> &str {
        &self.args[1]
    }

    /// Slot `index`, counting the prefix as 0 and the command as 1.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Parameters only (slots 2 and up).
    pub fn params(&self) -> &[String] {
        &self.args[2..]
    }

    /// All slots.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Logical length: number of filled slots, never below 2.
    pub fn argc(&self) -> usize {
        self.args.len()
    }

    /// Fail with [`MessageParseError::NotEnoughArguments`] unless at least
    /// `expected` slots are filled.
    pub fn require(&self, expected: usize) -> Result<(), MessageParseError> {
        if self.argc() < expected {
            return Err(MessageParseError::NotEnoughArguments {
                command: self.command().to_owned(),
                expected,
                got: self.argc(),
            });
        }
        Ok(())
    }

    /// Diagnostic rendering: every slot quoted, e.g. `'srv' '001' 'me'`.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Message::parse(s)
    }
}

/// Rebuild a message from its slots, as produced by [`Message::args`].
///
/// Fails with [`MessageParseError::InvalidCommand`] unless both the prefix
/// and the command slot are present. Slots past [`MAX_ARGS`] are folded
/// like in [`Message::new`].
impl TryFrom<Vec<String>> for Message {
    type Error = MessageParseError;

    fn try_from(args: Vec<String>) -> Result<Self, Self::Error> {
        if args.len() < 2 {
            return Err(MessageParseError::InvalidCommand);
        }
        if args.len() <= MAX_ARGS {
            return Ok(Message { args });
        }
        let mut slots = args.into_iter();
        let prefix = slots.next().unwrap_or_default();
        let command = slots.next().unwrap_or_default();
        Ok(Message::new(&prefix, &command, slots))
    }
}

impl From<Message> for Vec<String> {
    fn from(msg: Message) -> Self {
        msg.args
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "'{}'", arg)?;
        }
        Ok(())
    }
}
