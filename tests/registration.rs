//! Integration tests for the registration state machine
//!
//! These tests drive a `Session` over a scripted transport: each read pops
//! the next canned server line, and everything the session writes is kept
//! for inspection.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use slirc_session::{
    CaseMapping, ConfigError, ConnectionState, ErrorKind, Message, Session, SessionConfig,
    SessionError, Transport, TransportReadError,
};

type Scripted = Result<Option<Message>, TransportReadError>;

#[derive(Default)]
struct ScriptedTransport {
    script: VecDeque<Scripted>,
    written: Vec<String>,
    online: bool,
    resets: usize,
    refuse_connect: bool,
    connect_delay: Option<Duration>,
}

impl ScriptedTransport {
    fn new(lines: &[&str]) -> Self {
        let script = lines
            .iter()
            .map(|line| Ok(Some(Message::parse(line).expect("test line must tokenize"))))
            .collect();
        ScriptedTransport {
            script,
            ..Default::default()
        }
    }

    fn push(&mut self, item: Scripted) {
        self.script.push_back(item);
    }
}

impl Transport for ScriptedTransport {
    fn connect(&mut self, _soft: Option<Duration>, _hard: Option<Duration>) -> io::Result<()> {
        if let Some(delay) = self.connect_delay {
            std::thread::sleep(delay);
        }
        if self.refuse_connect {
            return Err(io::ErrorKind::ConnectionRefused.into());
        }
        self.online = true;
        Ok(())
    }

    fn read(&mut self, _timeout: Option<Duration>) -> Result<Option<Message>, TransportReadError> {
        self.script
            .pop_front()
            .unwrap_or(Err(TransportReadError::Timeout))
    }

    fn write(&mut self, line: &str) -> io::Result<()> {
        if !self.online {
            return Err(io::ErrorKind::NotConnected.into());
        }
        self.written.push(line.to_owned());
        Ok(())
    }

    fn reset(&mut self) {
        self.online = false;
        self.resets += 1;
    }

    fn is_online(&self) -> bool {
        self.online
    }

    fn host(&self) -> &str {
        "irc.example.net"
    }
}

const WELCOME: &[&str] = &[
    ":irc.example.net 001 tester :Welcome to the Example IRC Network tester!u@h",
    ":irc.example.net 002 tester :Your host is irc.example.net, running version ircd-9.1",
    ":irc.example.net 003 tester :This server was created Mon Jan 1 2024",
    ":irc.example.net 004 tester irc.example.net ircd-9.1 DOQRSZaghilopswz CFILMPQSbcefgijklmnopqrstvz",
];

fn config(nick: &str) -> SessionConfig {
    let mut config = SessionConfig::default();
    config.set_nick(nick).unwrap();
    config.set_username("tester").unwrap();
    config.set_realname("Test User").unwrap();
    config
}

#[test]
fn test_registration_end_to_end() {
    let transport = ScriptedTransport::new(WELCOME);
    let mut session = Session::new(transport, config("tester"));

    session.connect().expect("registration should succeed");

    assert_eq!(session.state(), ConnectionState::Registered);
    assert_eq!(session.nick(), "tester");
    assert_eq!(session.host(), "irc.example.net");
    assert_eq!(session.version(), "ircd-9.1");
    assert_eq!(session.user_modes(), "DOQRSZaghilopswz");
    assert_eq!(session.chan_modes(), "CFILMPQSbcefgijklmnopqrstvz");
    assert!(!session.is_service());
    assert!(session.logon_replies().iter().all(Option::is_some));
    assert_eq!(
        session.transport().written,
        vec!["NICK tester\r\nUSER tester 0 * :Test User\r\n"]
    );
    assert!(session.is_online());
}

#[test]
fn test_password_sent_first() {
    let mut config = config("tester");
    config.set_password(Some("sekrit")).unwrap();
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config);

    session.connect().unwrap();
    assert!(session.transport().written[0].starts_with("PASS :sekrit\r\nNICK tester\r\n"));
}

#[test]
fn test_ping_answered_during_registration() {
    let mut lines = vec!["PING :1234567"];
    lines.extend_from_slice(WELCOME);
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));

    session.connect().unwrap();
    assert_eq!(session.transport().written[1], "PONG :1234567\r\n");
}

#[test]
fn test_nick_collision_retries_with_mutator() {
    let mut lines = vec![":irc.example.net 433 * tester :Nickname is already in use"];
    lines.extend_from_slice(&[
        ":irc.example.net 001 tester_ :Welcome",
        ":irc.example.net 004 tester_ irc.example.net ircd-9.1 iow bklnt",
    ]);
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));

    session.connect().unwrap();
    assert_eq!(session.transport().written[1], "NICK tester_\r\n");
    assert_eq!(session.nick(), "tester_");
}

#[test]
fn test_custom_nick_mutator() {
    let lines = [
        ":irc.example.net 433 * tester :Nickname is already in use",
        ":irc.example.net 433 * tester` :Nickname is already in use",
        ":irc.example.net 001 tester`` :Welcome",
        ":irc.example.net 004 tester`` irc.example.net ircd-9.1 iow bklnt",
    ];
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));
    session.set_nick_mutator(|nick: &mut String, _: usize| nick.push('`'));

    session.connect().unwrap();
    assert_eq!(
        &session.transport().written[1..],
        &["NICK tester`\r\n", "NICK tester``\r\n"]
    );
    assert_eq!(session.nick(), "tester``");
}

#[test]
fn test_nick_collision_without_mutator_fails() {
    let lines = [":irc.example.net 433 * tester :Nickname is already in use"];
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));
    session.clear_nick_mutator();

    let err = session.connect().unwrap_err();
    assert!(matches!(err, SessionError::OutOfNicks));
    assert_eq!(session.state(), ConnectionState::Failed);
    assert!(!session.is_online());
    assert_eq!(session.transport().resets, 1);
}

#[test]
fn test_hard_timeout() {
    let mut transport = ScriptedTransport::new(&[]);
    transport.connect_delay = Some(Duration::from_millis(2));
    let mut config = config("tester");
    config.set_timeouts(Duration::ZERO, Duration::from_micros(1));
    let mut session = Session::new(transport, config);

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(session.state(), ConnectionState::Failed);
    assert!(!session.is_online());
}

#[test]
fn test_read_timeout_while_registering() {
    // Server never completes the burst; the script runs dry and reads time out.
    let lines = [":irc.example.net 001 tester :Welcome"];
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(session.logon_replies()[0].is_some());
}

#[test]
fn test_empty_read_continues_registration() {
    let mut transport = ScriptedTransport::new(&[]);
    transport.push(Ok(None));
    for line in WELCOME {
        transport.push(Ok(Some(Message::parse(line).unwrap())));
        transport.push(Ok(None));
    }
    let mut session = Session::new(transport, config("tester"));

    session.connect().unwrap();
    assert_eq!(session.state(), ConnectionState::Registered);
    assert_eq!(session.version(), "ircd-9.1");
}

#[test]
fn test_io_error_mid_burst_fails() {
    let mut transport = ScriptedTransport::new(&WELCOME[..1]);
    transport.push(Err(TransportReadError::Io(
        io::ErrorKind::ConnectionReset.into(),
    )));
    for line in &WELCOME[1..] {
        transport.push(Ok(Some(Message::parse(line).unwrap())));
    }
    let mut session = Session::new(transport, config("tester"));

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(session.state(), ConnectionState::Failed);
    assert!(!session.is_online());
    assert_eq!(session.transport().resets, 1);
    assert!(session.logon_replies()[0].is_some());
    assert!(session.logon_replies()[1].is_none());
}

#[test]
fn test_invalid_config_fails_before_connecting() {
    let mut config = config("tester");
    config.realname = "Test\r\nQUIT :bye".to_owned();
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config);

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(matches!(
        err,
        SessionError::Config(ConfigError::IllegalChar {
            field: "realname",
            ch: '\r'
        })
    ));
    assert_eq!(session.state(), ConnectionState::Failed);
    assert!(!session.is_online());
    assert!(session.transport().written.is_empty());
}

#[test]
fn test_connect_refused() {
    let mut transport = ScriptedTransport::new(WELCOME);
    transport.refuse_connect = true;
    let mut session = Session::new(transport, config("tester"));

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connect);
    assert!(session.transport().written.is_empty());
}

#[test]
fn test_wrong_password() {
    let lines = [":irc.example.net 464 * :Password incorrect"];
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));

    let err = session.connect().unwrap_err();
    assert!(matches!(err, SessionError::Auth));
}

#[test]
fn test_server_error_during_registration() {
    let lines = [
        ":irc.example.net 465 * :You are banned from this server",
        "ERROR :Closing Link: tester[127.0.0.1] (K-lined)",
    ];
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
    assert!(session.is_banned());
    assert_eq!(session.ban_message(), Some("You are banned from this server"));
    assert_eq!(
        session.last_error(),
        Some("Closing Link: tester[127.0.0.1] (K-lined)")
    );
}

#[test]
fn test_ban_state_cleared_on_reconnect() {
    let lines = [
        ":irc.example.net 465 * :You are banned from this server",
        "ERROR :Closing Link",
    ];
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));
    assert!(session.connect().is_err());
    assert!(session.is_banned());

    for line in WELCOME {
        let msg = Message::parse(line).unwrap();
        session.transport_mut().push(Ok(Some(msg)));
    }
    session.connect().unwrap();
    assert!(!session.is_banned());
    assert_eq!(session.ban_message(), None);
    assert_eq!(session.last_error(), None);
}

#[test]
fn test_read_observer_veto() {
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config("tester"));
    session.set_read_observer(move |msg| {
        counter.fetch_add(1, Ordering::SeqCst);
        msg.command() != "002"
    });

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
    assert_eq!(seen.load(Ordering::SeqCst), 2);
    assert!(session.logon_replies()[1].is_none());
}

#[test]
fn test_read_observer_sees_arg_count() {
    let counts = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&counts);
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config("tester"));
    session.set_read_observer(move |msg| {
        sink.lock().unwrap().push((msg.command().to_owned(), msg.argc()));
        true
    });

    session.connect().unwrap();
    let counts = counts.lock().unwrap();
    assert_eq!(counts.len(), 4);
    assert_eq!(counts[0], ("001".to_owned(), 4));
    assert_eq!(counts[3], ("004".to_owned(), 7));
}

#[test]
fn test_service_logon() {
    let lines = [":irc.example.net 383 svc :You are service svc"];
    let mut config = config("svc");
    config.set_service(true);
    let mut session = Session::new(ScriptedTransport::new(&lines), config);

    session.connect().unwrap();
    assert!(session.is_service());
    assert_eq!(session.nick(), "svc");
    assert_eq!(session.host(), "irc.example.net");
    assert_eq!(session.user_modes(), "iswo");
    assert_eq!(session.chan_modes(), "opsitnml");
    assert_eq!(
        session.logon_replies()[0].as_ref().map(Message::command),
        Some("383")
    );
    assert!(session.transport().written[0].starts_with("SERVICE svc 0 * 0 0 :"));
}

#[test]
fn test_underlength_welcome_is_fatal() {
    let lines = [":irc.example.net 004 tester irc.example.net"];
    let mut session = Session::new(ScriptedTransport::new(&lines), config("tester"));

    let err = session.connect().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
}

#[test]
fn test_session_read_tracks_state() {
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config("tester"));
    session.connect().unwrap();

    let script = [
        ":irc.example.net 005 tester CASEMAPPING=ascii PREFIX=(qov)~@+ CHANMODES=beI,k,l,imnpst :are supported by this server",
        ":Tester!u@h NICK :renamed",
        ":someone!u@h PRIVMSG #chan :hi",
    ];
    for line in script {
        session
            .transport_mut()
            .push(Ok(Some(Message::parse(line).unwrap())));
    }

    let msg = session.read(None).unwrap().unwrap();
    assert_eq!(msg.command(), "005");
    assert_eq!(session.casemapping(), CaseMapping::Ascii);
    assert_eq!(session.prefix_spec().modes(), "qov");
    assert_eq!(session.chanmodes().a(), "beI");

    // ASCII casemapping still folds A-Z.
    session.read(None).unwrap();
    assert_eq!(session.nick(), "renamed");

    let msg = session.read(None).unwrap().unwrap();
    assert_eq!(msg.arg(3), Some("hi"));

    // Script exhausted: timeouts read as nothing.
    assert!(session.read(Some(Duration::from_millis(1))).unwrap().is_none());
    assert!(session.is_online());
}

#[test]
fn test_session_read_bad_prefix_resets() {
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config("tester"));
    session.connect().unwrap();

    let line = ":irc.example.net 005 tester PREFIX=(ov)@ :are supported by this server";
    session
        .transport_mut()
        .push(Ok(Some(Message::parse(line).unwrap())));

    let err = session.read(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(!session.is_online());
    assert_eq!(session.prefix_spec().modes(), "ov");
}

#[test]
fn test_session_error_is_informational() {
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config("tester"));
    session.connect().unwrap();

    session
        .transport_mut()
        .push(Ok(Some(Message::parse("ERROR :Closing Link").unwrap())));
    session.read(None).unwrap();
    assert_eq!(session.last_error(), Some("Closing Link"));
    assert!(session.is_online());
}

#[test]
fn test_session_read_io_error_resets() {
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config("tester"));
    session.connect().unwrap();

    session.transport_mut().push(Err(TransportReadError::Io(
        io::ErrorKind::ConnectionReset.into(),
    )));
    let err = session.read(None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!session.is_online());
    assert_eq!(session.state(), ConnectionState::Disconnected);
}

#[test]
fn test_write_goes_through_transport() {
    let mut session = Session::new(ScriptedTransport::new(WELCOME), config("tester"));
    session.connect().unwrap();

    session.write("JOIN #rust\r\n").unwrap();
    assert_eq!(session.transport().written.last().unwrap(), "JOIN #rust\r\n");

    session.reset();
    assert!(session.write("JOIN #rust\r\n").is_err());
}
