//! Blocking TCP transport.

use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use socket2::{Domain, Protocol, SockAddr, Socket, TcpKeepalive, Type};
use tracing::{debug, warn};

use crate::config::parse_hostspec;
use crate::error::MessageParseError;
use crate::message::Message;

use super::{Transport, TransportReadError, MAX_IRC_LINE_LEN};

/// Port used when a host spec names none.
pub const DEFAULT_PORT: u16 = 6667;

/// Plain-text IRC over a blocking `TcpStream`.
///
/// Partial lines survive read timeouts: bytes received before the timeout
/// stay buffered and are completed by the next read. At most
/// [`MAX_IRC_LINE_LEN`] bytes are buffered; a longer line is reported as
/// [`MessageParseError::MessageTooLong`] and its remainder is skipped.
#[derive(Debug)]
pub struct TcpTransport {
    host: String,
    port: u16,
    stream: Option<BufReader<TcpStream>>,
    pending: Vec<u8>,
    /// Inside an over-long line; drop input up to the next newline.
    discarding: bool,
}

impl TcpTransport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        TcpTransport {
            host: host.into(),
            port,
            stream: None,
            pending: Vec::new(),
            discarding: false,
        }
    }

    /// Build from `host[:port]`, `[v6addr]:port` style specs.
    pub fn from_hostspec(spec: &str) -> Self {
        let (host, port) = parse_hostspec(spec);
        let port = if port == 0 { DEFAULT_PORT } else { port };
        Self::new(host, port)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn enable_keepalive(sock: &Socket) -> io::Result<()> {
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));
        sock.set_tcp_keepalive(&keepalive)
    }

    fn connect_addr(addr: SocketAddr, timeout: Option<Duration>) -> io::Result<TcpStream> {
        let sock = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        let sockaddr = SockAddr::from(addr);
        match timeout {
            Some(t) => sock.connect_timeout(&sockaddr, t)?,
            None => sock.connect(&sockaddr)?,
        }
        if let Err(e) = Self::enable_keepalive(&sock) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        Ok(sock.into())
    }

    /// Take one complete line out of the pending buffer.
    fn take_line(&mut self) -> Result<Option<Message>, TransportReadError> {
        let raw = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        if raw.trim_end_matches(['\r', '\n']).trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Message::parse(&raw)?))
    }
}

/// Shortest of two optional limits.
fn min_timeout(a: Option<Duration>, b: Option<Duration>) -> Option<Duration> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, None) => a,
        (None, b) => b,
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, soft: Option<Duration>, hard: Option<Duration>) -> io::Result<()> {
        self.reset();
        let deadline = hard.map(|d| Instant::now() + d);

        let mut last_err =
            io::Error::new(io::ErrorKind::NotFound, format!("no addresses for {}", self.host));
        for addr in (self.host.as_str(), self.port).to_socket_addrs()? {
            let remaining = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(io::ErrorKind::TimedOut.into());
                    }
                    Some(left)
                }
                None => None,
            };

            debug!("connecting to {} (timeout: {:?})", addr, min_timeout(soft, remaining));
            match Self::connect_addr(addr, min_timeout(soft, remaining)) {
                Ok(stream) => {
                    self.stream = Some(BufReader::new(stream));
                    return Ok(());
                }
                Err(e) => {
                    warn!("connect to {} failed: {}", addr, e);
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    fn read(&mut self, timeout: Option<Duration>) -> Result<Option<Message>, TransportReadError> {
        if timeout.map_or(false, |t| t.is_zero()) {
            return Err(TransportReadError::Timeout);
        }
        let reader = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        reader.get_ref().set_read_timeout(timeout)?;

        loop {
            let room = (MAX_IRC_LINE_LEN + 1).saturating_sub(self.pending.len()) as u64;
            match reader.by_ref().take(room).read_until(b'\n', &mut self.pending) {
                Ok(0) => {
                    self.reset();
                    return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
                }
                Ok(_) if self.pending.ends_with(b"\n") => {
                    if self.discarding {
                        self.pending.clear();
                        self.discarding = false;
                        continue;
                    }
                    return self.take_line();
                }
                Ok(_) if self.pending.len() > MAX_IRC_LINE_LEN => {
                    let len = self.pending.len();
                    self.pending.clear();
                    if self.discarding {
                        continue;
                    }
                    self.discarding = true;
                    return Err(MessageParseError::MessageTooLong(len).into());
                }
                // Stream ended in the middle of a line.
                Ok(_) => {
                    self.reset();
                    return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    if self.discarding {
                        self.pending.clear();
                    }
                    return Err(TransportReadError::Timeout);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn write(&mut self, line: &str) -> io::Result<()> {
        let reader = self
            .stream
            .as_mut()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        let stream = reader.get_mut();
        stream.write_all(line.as_bytes())?;
        stream.flush()
    }

    fn reset(&mut self) {
        if let Some(reader) = self.stream.take() {
            debug!("closing connection to {}:{}", self.host, self.port);
            let _ = reader.get_ref().shutdown(Shutdown::Both);
        }
        self.pending.clear();
        self.discarding = false;
    }

    fn is_online(&self) -> bool {
        self.stream.is_some()
    }

    fn host(&self) -> &str {
        &self.host
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hostspec() {
        let t = TcpTransport::from_hostspec("irc.example.net:7000");
        assert_eq!(t.host(), "irc.example.net");
        assert_eq!(t.port(), 7000);

        let t = TcpTransport::from_hostspec("irc.example.net");
        assert_eq!(t.port(), DEFAULT_PORT);

        let t = TcpTransport::from_hostspec("[::1]:6697");
        assert_eq!(t.host(), "::1");
        assert_eq!(t.port(), 6697);
    }

    #[test]
    fn test_min_timeout() {
        let s = Some(Duration::from_secs(1));
        let l = Some(Duration::from_secs(5));
        assert_eq!(min_timeout(s, l), s);
        assert_eq!(min_timeout(None, l), l);
        assert_eq!(min_timeout(s, None), s);
        assert_eq!(min_timeout(None, None), None);
    }

    #[test]
    fn test_offline_io_fails() {
        let mut t = TcpTransport::new("localhost", 6667);
        assert!(!t.is_online());
        assert!(t.write("PING :x\r\n").is_err());
        assert!(matches!(
            t.read(Some(Duration::from_millis(10))),
            Err(TransportReadError::Io(_))
        ));
    }
}
