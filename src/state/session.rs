//! Registration state machine.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::casemap::CaseMapping;
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::isupport::{ChanModes, PrefixSpec, ServerSupport};
use crate::message::Message;
use crate::nick::{mutilate_nick, NickMutator};
use crate::transport::{Transport, TransportReadError};
use crate::util::{assign_bounded, MAX_NICK_LEN};

use super::dispatch::{dispatch, Context, DispatchScope, Flow};
use super::{ConnectionState, SessionState};

type ReadObserver = Box<dyn FnMut(&Message) -> bool + Send>;

/// An IRC client session over a transport.
///
/// Owns the transport, the configuration and everything learned from the
/// server. [`connect`](Self::connect) performs the whole logon and returns
/// once the server has welcomed us; afterwards [`read`](Self::read) keeps
/// the tracked state (nick, casemapping, 005 data) current.
pub struct Session<T: Transport> {
    transport: T,
    config: SessionConfig,
    state: SessionState,
    conn_state: ConnectionState,
    observer: Option<ReadObserver>,
    mutator: Option<Box<dyn NickMutator + Send>>,
}

impl<T: Transport> fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("conn_state", &self.conn_state)
            .field("observer", &self.observer.is_some())
            .field("mutator", &self.mutator.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Session<T> {
    /// Create a session. The default nick mutator is
    /// [`mutilate_nick`](crate::nick::mutilate_nick).
    pub fn new(transport: T, config: SessionConfig) -> Self {
        let mut state = SessionState::new();
        assign_bounded(&mut state.nick, &config.nick, MAX_NICK_LEN);
        Session {
            transport,
            config,
            state,
            conn_state: ConnectionState::Disconnected,
            observer: None,
            mutator: Some(Box::new(mutilate_nick)),
        }
    }

    /// Connect and register.
    ///
    /// On failure the transport is reset and the session is left in
    /// [`ConnectionState::Failed`]; `last_error` and `ban_message` stay
    /// available for inspection.
    pub fn connect(&mut self) -> Result<()> {
        match self.try_connect() {
            Ok(()) => {
                self.conn_state = ConnectionState::Registered;
                info!(
                    "logged on to {} as {}",
                    self.state.host, self.state.nick
                );
                Ok(())
            }
            Err(e) => {
                self.transport.reset();
                self.conn_state = ConnectionState::Failed;
                warn!("logon failed: {}", e);
                Err(e)
            }
        }
    }

    fn try_connect(&mut self) -> Result<()> {
        self.conn_state = ConnectionState::Connecting;
        self.state.reset_transient();
        let logon = self.config.logon_line()?;

        let deadline = self.config.hard().map(|hard| Instant::now() + hard);
        debug!(
            "connecting to {} (soft: {:?}, hard: {:?})",
            self.transport.host(),
            self.config.soft(),
            self.config.hard()
        );
        self.transport
            .connect(self.config.soft(), self.config.hard())
            .map_err(SessionError::Connect)?;

        debug!("connected, sending logon");
        self.transport.write(&logon)?;
        assign_bounded(&mut self.state.nick, &self.config.nick, MAX_NICK_LEN);
        self.conn_state = ConnectionState::AwaitingWelcome;

        loop {
            let remaining = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(SessionError::Timeout);
                    }
                    Some(left)
                }
                None => None,
            };

            let msg = match self.transport.read(remaining) {
                Ok(Some(msg)) => msg,
                Ok(None) => continue,
                Err(TransportReadError::Timeout) => return Err(SessionError::Timeout),
                Err(TransportReadError::Io(e)) => return Err(SessionError::Io(e)),
                Err(TransportReadError::Protocol(e)) => return Err(SessionError::Protocol(e)),
            };

            if let Some(observer) = self.observer.as_mut() {
                if !observer(&msg) {
                    debug!("read observer vetoed {}", msg.dump());
                    return Err(SessionError::Rejected);
                }
            }

            match self.dispatch(&msg, DispatchScope::Registration) {
                Ok(Flow::LogonComplete) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => {
                    error!("choked on {}", msg.dump());
                    return Err(e);
                }
            }
        }
    }

    fn dispatch(&mut self, msg: &Message, scope: DispatchScope) -> Result<Flow> {
        let mutator = self
            .mutator
            .as_deref_mut()
            .map(|m| m as &mut dyn NickMutator);
        let mut ctx = Context::new(&mut self.state, &mut self.transport, mutator);
        dispatch(&mut ctx, msg, scope)
    }

    /// Read one message and keep session state current.
    ///
    /// Timeouts and empty reads give `Ok(None)`. A read error or a failed
    /// handler resets the transport and is returned.
    pub fn read(&mut self, timeout: Option<Duration>) -> Result<Option<Message>> {
        let msg = match self.transport.read(timeout) {
            Ok(Some(msg)) => msg,
            Ok(None) | Err(TransportReadError::Timeout) => return Ok(None),
            Err(e) => {
                self.reset();
                return Err(match e {
                    TransportReadError::Io(e) => SessionError::Io(e),
                    TransportReadError::Protocol(e) => SessionError::Protocol(e),
                    TransportReadError::Timeout => SessionError::Timeout,
                });
            }
        };

        if let Err(e) = self.dispatch(&msg, DispatchScope::Session) {
            error!("choked on {}", msg.dump());
            self.reset();
            return Err(e);
        }
        Ok(Some(msg))
    }

    /// Write a raw, CRLF-terminated line.
    pub fn write(&mut self, line: &str) -> Result<()> {
        if let Err(e) = self.transport.write(line) {
            self.reset();
            return Err(e.into());
        }
        Ok(())
    }

    /// Drop the connection. A failed session stays failed.
    pub fn reset(&mut self) {
        self.transport.reset();
        if self.conn_state != ConnectionState::Failed {
            self.conn_state = ConnectionState::Disconnected;
        }
    }

    pub fn is_online(&self) -> bool {
        self.transport.is_online()
    }

    /// Observe every message read during registration. Returning `false`
    /// aborts the logon with [`SessionError::Rejected`].
    ///
    /// The observer gets the whole message; its argument count, prefix and
    /// command slots included, is [`Message::argc`].
    pub fn set_read_observer<F>(&mut self, observer: F)
    where
        F: FnMut(&Message) -> bool + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_read_observer(&mut self) {
        self.observer = None;
    }

    pub fn set_nick_mutator<M>(&mut self, mutator: M)
    where
        M: NickMutator + Send + 'static,
    {
        self.mutator = Some(Box::new(mutator));
    }

    /// Without a mutator, any nick collision during logon is fatal.
    pub fn clear_nick_mutator(&mut self) {
        self.mutator = None;
    }

    pub fn state(&self) -> ConnectionState {
        self.conn_state
    }

    pub fn session_state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Configuration changes take effect on the next connect.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn nick(&self) -> &str {
        self.state.nick()
    }

    pub fn host(&self) -> &str {
        self.state.host()
    }

    pub fn is_service(&self) -> bool {
        self.state.is_service()
    }

    pub fn user_modes(&self) -> &str {
        self.state.user_modes()
    }

    pub fn chan_modes(&self) -> &str {
        self.state.chan_modes()
    }

    pub fn version(&self) -> &str {
        self.state.version()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error()
    }

    pub fn is_banned(&self) -> bool {
        self.state.is_banned()
    }

    pub fn ban_message(&self) -> Option<&str> {
        self.state.ban_message()
    }

    pub fn is_restricted(&self) -> bool {
        self.state.is_restricted()
    }

    pub fn casemapping(&self) -> CaseMapping {
        self.state.casemapping()
    }

    /// See [`SessionState::logon_replies`].
    pub fn logon_replies(&self) -> &[Option<Message>; 4] {
        self.state.logon_replies()
    }

    pub fn support(&self) -> &ServerSupport {
        self.state.support()
    }

    pub fn chanmodes(&self) -> &ChanModes {
        self.state.chanmodes()
    }

    pub fn prefix_spec(&self) -> &PrefixSpec {
        self.state.prefix_spec()
    }
}
