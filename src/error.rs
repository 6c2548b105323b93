//! Error types for session establishment.
//!
//! This module defines the failure taxonomy of the registration handshake,
//! message tokenizing errors, and configuration validation errors.

use thiserror::Error;

/// Convenience type alias for Results using [`SessionError`].
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Attempt-fatal errors raised while establishing or running a session.
///
/// Any of these returned from a handler means the current connection
/// cannot proceed; the session resets its transport and reports failure.
/// Advisory conditions (ban notices, restricted connections) are recorded
/// as flags on the session state instead.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Malformed or under-length message for the command received.
    #[error("protocol error: {0}")]
    Protocol(#[from] MessageParseError),

    /// Read or write failure at the transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport could not establish a connection.
    #[error("connect failed: {0}")]
    Connect(#[source] std::io::Error),

    /// Server rejected our password (464).
    #[error("server password rejected")]
    Auth,

    /// No nick-collision policy is set, or it produced an empty nick.
    #[error("out of nicks")]
    OutOfNicks,

    /// The registration deadline passed before 004/383 arrived.
    #[error("timed out awaiting registration")]
    Timeout,

    /// The read observer vetoed further registration.
    #[error("logon rejected by read observer")]
    Rejected,

    /// Server sent ERROR while we were registering.
    #[error("server error: {0}")]
    ServerError(String),

    /// The configuration cannot be sent as a logon line.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Cause tag of a [`SessionError`], without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorKind {
    /// See [`SessionError::Protocol`].
    Protocol,
    /// See [`SessionError::Io`].
    Io,
    /// See [`SessionError::Connect`].
    Connect,
    /// See [`SessionError::Auth`].
    Auth,
    /// See [`SessionError::OutOfNicks`].
    OutOfNicks,
    /// See [`SessionError::Timeout`].
    Timeout,
    /// See [`SessionError::Rejected`].
    Rejected,
    /// See [`SessionError::ServerError`].
    Server,
    /// See [`SessionError::Config`].
    Config,
}

impl SessionError {
    /// The cause tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(_) => ErrorKind::Protocol,
            Self::Io(_) => ErrorKind::Io,
            Self::Connect(_) => ErrorKind::Connect,
            Self::Auth => ErrorKind::Auth,
            Self::OutOfNicks => ErrorKind::OutOfNicks,
            Self::Timeout => ErrorKind::Timeout,
            Self::Rejected => ErrorKind::Rejected,
            Self::ServerError(_) => ErrorKind::Server,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

/// Errors encountered when tokenizing or interpreting IRC messages.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MessageParseError {
    /// Message was empty.
    #[error("empty message")]
    EmptyMessage,

    /// Command was invalid or missing.
    #[error("invalid command")]
    InvalidCommand,

    /// Line exceeded the maximum accepted length.
    #[error("message too long: {0} bytes")]
    MessageTooLong(usize),

    /// Not enough arguments for command.
    #[error("{command}: not enough arguments: expected {expected}, got {got}")]
    NotEnoughArguments {
        /// Command or numeric the message carried.
        command: String,
        /// Expected number of fields (prefix and command included).
        expected: usize,
        /// Actual number of fields.
        got: usize,
    },

    /// An ISUPPORT token could not be parsed.
    #[error("invalid ISUPPORT token {key}: {value:?}")]
    InvalidIsupport {
        /// Token key, e.g. `PREFIX`.
        key: &'static str,
        /// Raw token value.
        value: String,
    },
}

/// Errors from validating [`SessionConfig`](crate::config::SessionConfig) values.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    /// Value was empty where one is required.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the rejected field.
        field: &'static str,
    },

    /// Value contains a character that would break the logon line.
    #[error("{field} contains illegal character {ch:?}")]
    IllegalChar {
        /// Name of the rejected field.
        field: &'static str,
        /// The offending character.
        ch: char,
    },

    /// Value contains a space where the protocol forbids one.
    #[error("{field} must not contain spaces")]
    Whitespace {
        /// Name of the rejected field.
        field: &'static str,
    },
}
