//! Transport error types.

use thiserror::Error;

use crate::error::MessageParseError;

/// Errors that can occur when reading from a transport.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransportReadError {
    /// No complete message arrived within the allotted time.
    #[error("read timed out")]
    Timeout,
    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A line arrived that could not be tokenized.
    #[error("unparseable line: {0}")]
    Protocol(#[from] MessageParseError),
}
