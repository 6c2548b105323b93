//! Session configuration.
//!
//! [`SessionConfig`] carries everything the logon sequence sends plus the
//! connection timeouts. Fields are public for struct-literal construction;
//! the `set_*` methods validate values that end up on the wire, and
//! [`SessionConfig::logon_line`] checks them again, so a logon line can never
//! be split by an embedded CR, LF or NUL.

use std::time::Duration;

use crate::error::ConfigError;
use crate::util::find_line_breaker;

/// Nickname used when none is configured.
pub const DEFAULT_NICK: &str = "srsirc";
/// Username used when none is configured.
pub const DEFAULT_USERNAME: &str = "bsnsirc";
/// Real name used when none is configured.
pub const DEFAULT_REALNAME: &str = "serious business irc";
/// Service distribution mask used when none is configured.
pub const DEFAULT_SERVICE_DIST: &str = "*";
/// Service description used when none is configured.
pub const DEFAULT_SERVICE_INFO: &str = "serious business irc service";
/// Per-attempt connect timeout.
pub const DEFAULT_SOFT_TIMEOUT: Duration = Duration::from_secs(15);
/// Whole-registration deadline.
pub const DEFAULT_HARD_TIMEOUT: Duration = Duration::from_secs(120);

/// Identity and timing of a session.
///
/// A zero timeout means "no limit".
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Server password, sent as `PASS` when non-empty.
    pub password: Option<String>,
    /// Desired nickname (or service name in service mode).
    pub nick: String,
    /// Username (ident).
    pub username: String,
    /// Real name / GECOS.
    pub realname: String,
    /// Numeric mode flags sent in `USER`.
    pub flags: u32,
    /// Register as a service (`SERVICE`) rather than a user.
    pub service: bool,
    /// Service distribution mask.
    pub service_dist: String,
    /// Service type.
    pub service_type: i64,
    /// Service description.
    pub service_info: String,
    /// Bound on each individual connection attempt.
    pub soft_timeout: Duration,
    /// Bound on the whole connect-and-register sequence.
    pub hard_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            password: None,
            nick: DEFAULT_NICK.to_owned(),
            username: DEFAULT_USERNAME.to_owned(),
            realname: DEFAULT_REALNAME.to_owned(),
            flags: 0,
            service: false,
            service_dist: DEFAULT_SERVICE_DIST.to_owned(),
            service_type: 0,
            service_info: DEFAULT_SERVICE_INFO.to_owned(),
            soft_timeout: DEFAULT_SOFT_TIMEOUT,
            hard_timeout: DEFAULT_HARD_TIMEOUT,
        }
    }
}

fn check_line(field: &'static str, value: &str) -> Result<(), ConfigError> {
    match find_line_breaker(value) {
        Some(ch) => Err(ConfigError::IllegalChar { field, ch }),
        None => Ok(()),
    }
}

fn check_word(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Empty { field });
    }
    check_line(field, value)?;
    if value.contains(' ') {
        return Err(ConfigError::Whitespace { field });
    }
    Ok(())
}

fn nonzero(d: Duration) -> Option<Duration> {
    if d.is_zero() {
        None
    } else {
        Some(d)
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the server password.
    pub fn set_password(&mut self, password: Option<&str>) -> Result<(), ConfigError> {
        if let Some(pass) = password {
            check_line("password", pass)?;
        }
        self.password = password.map(str::to_owned);
        Ok(())
    }

    pub fn set_nick(&mut self, nick: &str) -> Result<(), ConfigError> {
        check_word("nick", nick)?;
        self.nick = nick.to_owned();
        Ok(())
    }

    pub fn set_username(&mut self, username: &str) -> Result<(), ConfigError> {
        check_word("username", username)?;
        self.username = username.to_owned();
        Ok(())
    }

    pub fn set_realname(&mut self, realname: &str) -> Result<(), ConfigError> {
        check_line("realname", realname)?;
        self.realname = realname.to_owned();
        Ok(())
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
    }

    pub fn set_service(&mut self, service: bool) {
        self.service = service;
    }

    pub fn set_service_dist(&mut self, dist: &str) -> Result<(), ConfigError> {
        check_word("service_dist", dist)?;
        self.service_dist = dist.to_owned();
        Ok(())
    }

    pub fn set_service_type(&mut self, service_type: i64) {
        self.service_type = service_type;
    }

    pub fn set_service_info(&mut self, info: &str) -> Result<(), ConfigError> {
        check_line("service_info", info)?;
        self.service_info = info.to_owned();
        Ok(())
    }

    /// Set soft and hard timeouts; zero disables either.
    pub fn set_timeouts(&mut self, soft: Duration, hard: Duration) {
        self.soft_timeout = soft;
        self.hard_timeout = hard;
    }

    /// Soft timeout, `None` when unbounded.
    pub fn soft(&self) -> Option<Duration> {
        nonzero(self.soft_timeout)
    }

    /// Hard timeout, `None` when unbounded.
    pub fn hard(&self) -> Option<Duration> {
        nonzero(self.hard_timeout)
    }

    /// Check every field the logon sequence would send.
    ///
    /// Catches values assigned directly to the public fields, bypassing the
    /// setters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pass) = &self.password {
            check_line("password", pass)?;
        }
        check_word("nick", &self.nick)?;
        if self.service {
            check_word("service_dist", &self.service_dist)?;
            check_line("service_info", &self.service_info)
        } else {
            check_word("username", &self.username)?;
            check_line("realname", &self.realname)
        }
    }

    /// The complete logon sequence, CRLF-terminated, ready for one write.
    ///
    /// Fails if a field would break the line; see [`validate`](Self::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use slirc_session::SessionConfig;
    ///
    /// let mut config = SessionConfig::default();
    /// assert_eq!(
    ///     config.logon_line().unwrap(),
    ///     "NICK srsirc\r\nUSER bsnsirc 0 * :serious business irc\r\n"
    /// );
    ///
    /// config.nick = "srsirc\r\nQUIT".to_owned();
    /// assert!(config.logon_line().is_err());
    /// ```
    pub fn logon_line(&self) -> Result<String, ConfigError> {
        self.validate()?;
        let mut line = String::with_capacity(128);
        if let Some(pass) = self.password.as_deref().filter(|p| !p.is_empty()) {
            line.push_str("PASS :");
            line.push_str(pass);
            line.push_str("\r\n");
        }
        if self.service {
            line.push_str(&format!(
                "SERVICE {} 0 {} {} 0 :{}\r\n",
                self.nick, self.service_dist, self.service_type, self.service_info
            ));
        } else {
            line.push_str(&format!(
                "NICK {}\r\nUSER {} {} * :{}\r\n",
                self.nick, self.username, self.flags, self.realname
            ));
        }
        Ok(line)
    }
}

/// Split an identity spec `nick!user realname` into its parts.
///
/// Returns `None` unless both the `!` and the space are present.
///
/// ```
/// use slirc_session::config::parse_identity;
///
/// assert_eq!(
///     parse_identity("bot!ident Some Bot"),
///     Some(("bot", "ident", "Some Bot"))
/// );
/// assert_eq!(parse_identity("bot ident"), None);
/// ```
pub fn parse_identity(spec: &str) -> Option<(&str, &str, &str)> {
    let (ident, realname) = spec.split_once(' ')?;
    let (nick, user) = ident.split_once('!')?;
    Some((nick, user, realname))
}

/// Split `host[:port]` into host and port.
///
/// IPv6 literals are given in brackets (`[::1]:6667`); the brackets are
/// removed. A missing or unparsable port yields 0.
pub fn parse_hostspec(spec: &str) -> (&str, u16) {
    if let Some(rest) = spec.strip_prefix('[') {
        if let Some((host, tail)) = rest.split_once(']') {
            let port = tail
                .strip_prefix(':')
                .and_then(|p| p.parse().ok())
                .unwrap_or(0);
            return (host, port);
        }
    }
    match spec.split_once(':') {
        Some((host, port)) => (host, port.parse().unwrap_or(0)),
        None => (spec, 0),
    }
}
