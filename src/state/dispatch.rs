//! Message dispatcher.
//!
//! Every message read from the server is routed to at most one handler by
//! its command text. Handlers mutate [`SessionState`], may write replies
//! through the transport, and report whether registration just completed.
//! Which commands are handled depends on the [`DispatchScope`]: the logon
//! burst and an established session react to different things.

use tracing::{debug, error, warn};

use crate::error::SessionError;
use crate::message::Message;
use crate::nick::{NickMutator, NICK_ATTEMPTS};
use crate::prefix::extract_nick;
use crate::transport::Transport;
use crate::util::{
    assign_bounded, strip_user_host, MAX_HOST_LEN, MAX_MODES_LEN, MAX_NICK_LEN, MAX_VERSION_LEN,
};

use super::SessionState;

/// What the caller should do after a handler succeeded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading.
    Continue,
    /// 004 or 383 arrived; registration is complete.
    LogonComplete,
}

/// Outcome of handling one message. Any `Err` is fatal to the attempt.
pub type HandlerResult = Result<Flow, SessionError>;

/// Signature shared by all handlers.
pub type Handler = fn(&mut Context<'_>, &Message) -> HandlerResult;

/// Which set of handlers is active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DispatchScope {
    /// Waiting for the welcome burst.
    Registration,
    /// Registered; only state-tracking handlers run.
    #[default]
    Session,
}

impl DispatchScope {
    /// Whether `command` is handled in this scope.
    pub fn allows(self, command: &str) -> bool {
        match self {
            Self::Registration => matches!(
                command,
                "001"
                    | "002"
                    | "003"
                    | "004"
                    | "PING"
                    | "432"
                    | "433"
                    | "436"
                    | "437"
                    | "464"
                    | "383"
                    | "484"
                    | "465"
                    | "466"
                    | "ERROR"
            ),
            Self::Session => matches!(command, "NICK" | "ERROR" | "005"),
        }
    }
}

/// Everything a handler may touch.
pub struct Context<'a> {
    pub state: &'a mut SessionState,
    pub transport: &'a mut dyn Transport,
    pub mutator: Option<&'a mut dyn NickMutator>,
    scope: DispatchScope,
}

impl<'a> Context<'a> {
    pub fn new(
        state: &'a mut SessionState,
        transport: &'a mut dyn Transport,
        mutator: Option<&'a mut dyn NickMutator>,
    ) -> Self {
        Context {
            state,
            transport,
            mutator,
            scope: DispatchScope::default(),
        }
    }

    /// Scope of the dispatch currently running.
    pub fn scope(&self) -> DispatchScope {
        self.scope
    }
}

/// Route `msg` to its handler if `scope` allows it.
///
/// Unhandled commands are `Ok(Flow::Continue)`.
pub fn dispatch(ctx: &mut Context<'_>, msg: &Message, scope: DispatchScope) -> HandlerResult {
    if !scope.allows(msg.command()) {
        return Ok(Flow::Continue);
    }
    match handler_for(msg.command()) {
        Some(handler) => {
            ctx.scope = scope;
            handler(ctx, msg)
        }
        None => Ok(Flow::Continue),
    }
}

/// Handler for a command, regardless of scope.
pub fn handler_for(command: &str) -> Option<Handler> {
    let handler: Handler = match command {
        "001" => handle_001,
        "002" | "003" => handle_cached,
        "004" => handle_004,
        "383" => handle_383,
        "PING" => handle_ping,
        "432" | "433" | "436" | "437" => handle_nick_collision,
        "464" => handle_464,
        "465" => handle_465,
        "466" => handle_466,
        "484" => handle_484,
        "ERROR" => handle_error,
        "NICK" => handle_nick,
        "005" => handle_005,
        _ => return None,
    };
    Some(handler)
}

fn cache_reply(state: &mut SessionState, msg: &Message) {
    let slot = match msg.command() {
        "001" | "383" => 0,
        "002" => 1,
        "003" => 2,
        "004" => 3,
        _ => return,
    };
    state.logon_replies[slot] = Some(msg.clone());
}

fn set_nick_from_welcome(state: &mut SessionState, msg: &Message) {
    let nick = strip_user_host(msg.arg(2).unwrap_or_default());
    assign_bounded(&mut state.nick, nick, MAX_NICK_LEN);
}

fn handle_001(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    msg.require(3)?;
    cache_reply(ctx.state, msg);
    set_nick_from_welcome(ctx.state, msg);
    ctx.state.reset_modes();
    ctx.state.service = false;
    Ok(Flow::Continue)
}

fn handle_cached(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    cache_reply(ctx.state, msg);
    Ok(Flow::Continue)
}

fn handle_004(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    msg.require(7)?;
    debug!("got 004");
    cache_reply(ctx.state, msg);
    let state = &mut *ctx.state;
    let args = msg.args();
    assign_bounded(&mut state.host, &args[3], MAX_HOST_LEN);
    assign_bounded(&mut state.version, &args[4], MAX_VERSION_LEN);
    assign_bounded(&mut state.user_modes, &args[5], MAX_MODES_LEN);
    assign_bounded(&mut state.chan_modes, &args[6], MAX_MODES_LEN);
    Ok(Flow::LogonComplete)
}

fn handle_383(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    msg.require(3)?;
    cache_reply(ctx.state, msg);
    set_nick_from_welcome(ctx.state, msg);
    let host = if msg.prefix().is_empty() {
        ctx.transport.host()
    } else {
        msg.prefix()
    };
    assign_bounded(&mut ctx.state.host, host, MAX_HOST_LEN);
    ctx.state.reset_modes();
    ctx.state.service = true;
    Ok(Flow::LogonComplete)
}

fn handle_ping(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    msg.require(3)?;
    let token = msg.arg(2).unwrap_or_default();
    ctx.transport.write(&format!("PONG :{}\r\n", token))?;
    Ok(Flow::Continue)
}

fn handle_nick_collision(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    let mutator = match ctx.mutator.as_mut() {
        Some(mutator) => mutator,
        None => {
            warn!("nick '{}' refused ({}) and no mutator set", ctx.state.nick, msg.command());
            return Err(SessionError::OutOfNicks);
        }
    };

    let mut nick = ctx.state.nick.clone();
    mutator.mutate(&mut nick, NICK_ATTEMPTS);
    if nick.is_empty() {
        return Err(SessionError::OutOfNicks);
    }

    debug!("nick '{}' refused ({}), trying '{}'", ctx.state.nick, msg.command(), nick);
    assign_bounded(&mut ctx.state.nick, &nick, MAX_NICK_LEN);
    ctx.transport.write(&format!("NICK {}\r\n", ctx.state.nick))?;
    Ok(Flow::Continue)
}

fn handle_464(_ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
    error!("wrong server password");
    Err(SessionError::Auth)
}

fn handle_465(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    let reason = msg.arg(3).unwrap_or_default();
    error!("we're banned: {}", reason);
    ctx.state.banned = true;
    ctx.state.ban_message = Some(reason.to_owned());
    Ok(Flow::Continue)
}

fn handle_466(_ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
    warn!("we will be banned");
    Ok(Flow::Continue)
}

fn handle_484(ctx: &mut Context<'_>, _msg: &Message) -> HandlerResult {
    warn!("connection is restricted");
    ctx.state.restricted = true;
    Ok(Flow::Continue)
}

fn handle_error(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    let text = msg.arg(2).unwrap_or_default().to_owned();
    ctx.state.last_error = Some(text.clone());
    match ctx.scope {
        DispatchScope::Registration => Err(SessionError::ServerError(text)),
        DispatchScope::Session => {
            warn!("server sent ERROR: {}", text);
            Ok(Flow::Continue)
        }
    }
}

fn handle_nick(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    msg.require(3)?;
    let source = extract_nick(msg.prefix());
    if ctx.state.casemapping().equals(source, &ctx.state.nick) {
        let new_nick = msg.arg(2).unwrap_or_default();
        debug!("our nick changed: '{}' -> '{}'", ctx.state.nick, new_nick);
        assign_bounded(&mut ctx.state.nick, new_nick, MAX_NICK_LEN);
    }
    Ok(Flow::Continue)
}

fn handle_005(ctx: &mut Context<'_>, msg: &Message) -> HandlerResult {
    ctx.state.support.apply_isupport(msg)?;
    Ok(Flow::Continue)
}
