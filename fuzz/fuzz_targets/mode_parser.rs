//! Fuzz target for channel mode expansion
//!
//! The first line of the input is a `CHANMODES` value, the second a
//! `PREFIX` value, the third the mode string and the rest its arguments.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

use slirc_session::{expand_chanmodes, ChanModes, PrefixSpec};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = str::from_utf8(data) else {
        return;
    };
    let mut lines = input.lines();
    let (chanmodes, _) = ChanModes::parse(lines.next().unwrap_or_default());
    let prefix = PrefixSpec::parse(lines.next().unwrap_or_default()).unwrap_or_default();
    let modes = lines.next().unwrap_or_default();
    let args: Vec<&str> = lines.collect();

    let changes = expand_chanmodes(modes, &args, &chanmodes, &prefix);
    assert!(changes.len() <= modes.chars().count());
});
