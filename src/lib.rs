//! # slirc-session
//!
//! Client-side IRC session establishment: connect, log on, survive nick
//! collisions and learn what the server supports.
//!
//! ## Features
//!
//! - Registration state machine with soft and hard timeouts
//! - Nick-collision handling through a pluggable mutator
//! - RFC 1459 / strict-RFC 1459 / ASCII casemapping
//! - ISUPPORT (RPL_ISUPPORT) negotiation of `CASEMAPPING`, `PREFIX` and `CHANMODES`
//! - Channel mode expansion driven by the negotiated mode classes
//! - Pluggable transport, with a blocking TCP implementation
//!   (feature `tcp`, enabled by default)

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ### Logging on
//!
//! ```no_run
//! use slirc_session::{Session, SessionConfig, TcpTransport};
//!
//! let mut config = SessionConfig::default();
//! config.set_nick("mybot").unwrap();
//!
//! let mut session = Session::new(TcpTransport::from_hostspec("irc.libera.chat:6667"), config);
//! session.connect().expect("logon failed");
//!
//! while let Ok(msg) = session.read(None) {
//!     if let Some(msg) = msg {
//!         println!("{}", msg.dump());
//!     }
//! }
//! ```
//!
//! ### Expanding channel modes
//!
//! ```rust
//! use slirc_session::{expand_chanmodes, ChanModes, PrefixSpec};
//!
//! let changes = expand_chanmodes(
//!     "+tmnk-l",
//!     &["secret"],
//!     &ChanModes::default(),
//!     &PrefixSpec::default(),
//! );
//! assert_eq!(changes.len(), 5);
//! assert_eq!(changes[3].to_string(), "+k secret");
//! ```

pub mod casemap;
pub mod config;
pub mod error;
pub mod isupport;
pub mod message;
pub mod mode;
pub mod nick;
pub mod prefix;
pub mod state;
pub mod transport;
pub mod util;

pub use self::casemap::{irc_eq, irc_to_lower, CaseMapping};
pub use self::config::SessionConfig;
pub use self::error::{ConfigError, ErrorKind, MessageParseError, Result, SessionError};
pub use self::isupport::{ChanModes, Isupport, IsupportEntry, PrefixSpec, ServerSupport};
pub use self::message::{Message, MAX_ARGS};
pub use self::mode::{expand_chanmodes, expand_mode_message, ModeChange, ModeClass};
pub use self::nick::{mutilate_nick, NickMutator, NICK_ATTEMPTS};
pub use self::prefix::{extract_host, extract_nick, extract_user, PrefixRef};
pub use self::state::{ConnectionState, DispatchScope, Flow, Session, SessionState};
#[cfg(feature = "tcp")]
pub use self::transport::TcpTransport;
pub use self::transport::{Transport, TransportReadError, MAX_IRC_LINE_LEN};
