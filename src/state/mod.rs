//! Session state and the registration state machine.
//!
//! [`SessionState`] is everything the server told us about this connection.
//! [`dispatch`] maps incoming messages onto it, and [`Session`] drives a
//! [`Transport`](crate::transport::Transport) through connect, logon and
//! the wait for the welcome burst.
//!
//! # Example
//!
//! ```no_run
//! use slirc_session::{Session, SessionConfig, TcpTransport};
//!
//! let transport = TcpTransport::from_hostspec("irc.example.net:6667");
//! let mut session = Session::new(transport, SessionConfig::default());
//! session.connect()?;
//! println!("registered as {} on {}", session.nick(), session.host());
//! # Ok::<(), slirc_session::SessionError>(())
//! ```

pub mod dispatch;
mod session;

pub use self::dispatch::{dispatch, handler_for, Context, DispatchScope, Flow, Handler, HandlerResult};
pub use self::session::Session;

use crate::casemap::CaseMapping;
use crate::isupport::{ChanModes, PrefixSpec, ServerSupport};
use crate::message::Message;
use crate::util::{assign_bounded, MAX_MODES_LEN};

/// User modes assumed until 004 says otherwise.
pub const DEFAULT_USER_MODES: &str = "iswo";
/// Channel modes assumed until 004 says otherwise.
pub const DEFAULT_CHAN_MODES: &str = "opsitnml";

/// Where a session is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConnectionState {
    /// Never connected, or reset.
    #[default]
    Disconnected,
    /// Transport connect in progress.
    Connecting,
    /// Logon sent, waiting for 004 or 383.
    AwaitingWelcome,
    /// Welcome burst complete.
    Registered,
    /// Last attempt failed; stays here until the next connect.
    Failed,
}

/// Per-connection knowledge about the server and ourselves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) nick: String,
    pub(crate) host: String,
    pub(crate) service: bool,
    pub(crate) user_modes: String,
    pub(crate) chan_modes: String,
    pub(crate) version: String,
    pub(crate) last_error: Option<String>,
    pub(crate) ban_message: Option<String>,
    pub(crate) banned: bool,
    pub(crate) restricted: bool,
    pub(crate) logon_replies: [Option<Message>; 4],
    pub(crate) support: ServerSupport,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            nick: String::new(),
            host: String::new(),
            service: false,
            user_modes: DEFAULT_USER_MODES.to_owned(),
            chan_modes: DEFAULT_CHAN_MODES.to_owned(),
            version: String::new(),
            last_error: None,
            ban_message: None,
            banned: false,
            restricted: false,
            logon_replies: Default::default(),
            support: ServerSupport::default(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what the previous connection left behind.
    ///
    /// Identity fields (nick, host, modes) are kept until the next welcome
    /// overwrites them.
    pub fn reset_transient(&mut self) {
        self.last_error = None;
        self.ban_message = None;
        self.banned = false;
        self.restricted = false;
        self.logon_replies = Default::default();
        self.support = ServerSupport::default();
    }

    /// Apply 001/383 defaults: modes back to their assumed values and the
    /// version forgotten.
    pub(crate) fn reset_modes(&mut self) {
        assign_bounded(&mut self.user_modes, DEFAULT_USER_MODES, MAX_MODES_LEN);
        assign_bounded(&mut self.chan_modes, DEFAULT_CHAN_MODES, MAX_MODES_LEN);
        self.version.clear();
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_service(&self) -> bool {
        self.service
    }

    pub fn user_modes(&self) -> &str {
        &self.user_modes
    }

    pub fn chan_modes(&self) -> &str {
        &self.chan_modes
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Text of the last `ERROR` received.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn ban_message(&self) -> Option<&str> {
        self.ban_message.as_deref()
    }

    pub fn is_banned(&self) -> bool {
        self.banned
    }

    pub fn is_restricted(&self) -> bool {
        self.restricted
    }

    pub fn casemapping(&self) -> CaseMapping {
        self.support.casemapping
    }

    /// Verbatim 001 to 004 replies of the current connection.
    ///
    /// A service logon stores its 383 in slot 0 and leaves the rest empty.
    pub fn logon_replies(&self) -> &[Option<Message>; 4] {
        &self.logon_replies
    }

    pub fn support(&self) -> &ServerSupport {
        &self.support
    }

    pub fn chanmodes(&self) -> &ChanModes {
        &self.support.chanmodes
    }

    pub fn prefix_spec(&self) -> &PrefixSpec {
        &self.support.prefix
    }
}
