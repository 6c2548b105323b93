//! Transport abstraction consumed by [`Session`](crate::Session).
//!
//! The session core never touches sockets. It drives any type implementing
//! [`Transport`]: something that can connect within a deadline, hand back
//! one tokenized message per read, write raw lines, and be torn down.
//!
//! [`TcpTransport`] is a plain blocking TCP implementation (feature `tcp`).

mod error;
#[cfg(feature = "tcp")]
mod tcp;

use std::io;
use std::time::Duration;

use crate::message::Message;

pub use self::error::TransportReadError;
#[cfg(feature = "tcp")]
pub use self::tcp::TcpTransport;

/// Longest line a transport should accept, CRLF included.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Connection-level collaborator of a session.
///
/// A `None` timeout means no limit.
pub trait Transport {
    /// Establish the connection.
    ///
    /// `soft` bounds each individual connection attempt (e.g. per resolved
    /// address), `hard` bounds the whole call.
    fn connect(&mut self, soft: Option<Duration>, hard: Option<Duration>) -> io::Result<()>;

    /// Read one message.
    ///
    /// `Ok(None)` means nothing usable arrived (e.g. an empty line) and the
    /// caller should simply read again.
    fn read(&mut self, timeout: Option<Duration>) -> Result<Option<Message>, TransportReadError>;

    /// Write a raw line, which must already end in CRLF.
    fn write(&mut self, line: &str) -> io::Result<()>;

    /// Drop the connection and any buffered input.
    fn reset(&mut self);

    fn is_online(&self) -> bool;

    /// Host name the transport connects to.
    fn host(&self) -> &str;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self, soft: Option<Duration>, hard: Option<Duration>) -> io::Result<()> {
        (**self).connect(soft, hard)
    }

    fn read(&mut self, timeout: Option<Duration>) -> Result<Option<Message>, TransportReadError> {
        (**self).read(timeout)
    }

    fn write(&mut self, line: &str) -> io::Result<()> {
        (**self).write(line)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn is_online(&self) -> bool {
        (**self).is_online()
    }

    fn host(&self) -> &str {
        (**self).host()
    }
}
