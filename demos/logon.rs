//! Log on to an IRC server and print what arrives
//!
//! Usage: `cargo run --example logon -- irc.libera.chat:6667 'nick!user Real Name'`
//!
//! Set `RUST_LOG=slirc_session=debug` to watch the handshake.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use slirc_session::config::parse_identity;
use slirc_session::{Session, SessionConfig, TcpTransport};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let mut args = env::args().skip(1);
    let hostspec = args.next().unwrap_or_else(|| "irc.libera.chat:6667".to_string());

    let mut config = SessionConfig::default();
    if let Some(identity) = args.next() {
        let Some((nick, user, realname)) = parse_identity(&identity) else {
            eprintln!("identity must look like 'nick!user Real Name'");
            return ExitCode::FAILURE;
        };
        if let Err(e) = config
            .set_nick(nick)
            .and_then(|_| config.set_username(user))
            .and_then(|_| config.set_realname(realname))
        {
            eprintln!("bad identity: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let mut session = Session::new(TcpTransport::from_hostspec(&hostspec), config);
    if let Err(e) = session.connect() {
        eprintln!("logon failed: {}", e);
        if let Some(reason) = session.ban_message() {
            eprintln!("banned: {}", reason);
        }
        return ExitCode::FAILURE;
    }

    println!(
        "logged on as {} to {} ({})",
        session.nick(),
        session.host(),
        session.version()
    );
    for reply in session.logon_replies().iter().flatten() {
        println!("  {}", reply.dump());
    }

    loop {
        match session.read(Some(Duration::from_secs(300))) {
            Ok(Some(msg)) => {
                if msg.command() == "PING" {
                    let token = msg.arg(2).unwrap_or_default();
                    if let Err(e) = session.write(&format!("PONG :{}\r\n", token)) {
                        eprintln!("write failed: {}", e);
                        return ExitCode::FAILURE;
                    }
                    continue;
                }
                println!("{}", msg.dump());
            }
            Ok(None) => {}
            Err(e) => {
                eprintln!("connection lost: {}", e);
                return ExitCode::SUCCESS;
            }
        }
    }
}
