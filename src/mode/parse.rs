//! IRC channel mode expansion.

use tracing::{trace, warn};

use crate::isupport::{ChanModes, PrefixSpec, ServerSupport};
use crate::message::Message;

use super::types::{ModeChange, ModeClass};

/// Argument substituted when a letter needs one but none are left.
///
/// Happens for example with `324` replies for channels we are not in,
/// where servers send `+tnk` without the key.
pub const MISSING_ARG: &str = "*";

/// Expand a mode string and its arguments into individual changes.
///
/// `+` and `-` switch the sign for the letters that follow them and produce
/// no entry. Letters found in neither `chanmodes` nor `prefix` are logged
/// and skipped.
pub fn expand_chanmodes<S: AsRef<str>>(
    modes: &str,
    args: &[S],
    chanmodes: &ChanModes,
    prefix: &PrefixSpec,
) -> Vec<ModeChange> {
    let mut res = Vec::with_capacity(modes.len());
    let mut args = args.iter().map(AsRef::as_ref);
    let mut enabled = true;

    for c in modes.chars() {
        match c {
            '+' => enabled = true,
            '-' => enabled = false,
            _ => {
                let class = match chanmodes.classify(c) {
                    Some(class) => class,
                    None if prefix.is_status_mode(c) => ModeClass::Status,
                    None => {
                        warn!("unknown chanmode '{}' (0x{:X})", c, c as u32);
                        continue;
                    }
                };
                trace!("classified mode '{}' as {:?}, enabled: {}", c, class, enabled);

                let arg = if class.takes_arg(enabled) {
                    Some(args.next().unwrap_or(MISSING_ARG))
                } else {
                    None
                };
                res.push(ModeChange::new(enabled, c, arg));
            }
        }
    }

    res
}

/// Expand the mode change carried by a `MODE` message or a `324` reply.
///
/// Returns `None` for other messages and for messages without a mode string.
pub fn expand_mode_message(msg: &Message, support: &ServerSupport) -> Option<Vec<ModeChange>> {
    let modes_at = match msg.command() {
        "MODE" => 3,
        "324" => 4,
        _ => return None,
    };
    let modes = msg.arg(modes_at)?;
    let args = msg.args().get(modes_at + 1..).unwrap_or(&[]);
    Some(expand_chanmodes(
        modes,
        args,
        &support.chanmodes,
        &support.prefix,
    ))
}
