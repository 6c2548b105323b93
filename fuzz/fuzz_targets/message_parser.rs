//! Fuzz target for IRC line tokenizing
//!
//! Feeds arbitrary lines to the tokenizer and, when they tokenize, through
//! the ISUPPORT negotiator and prefix helpers. None of it may panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

use slirc_session::{Message, PrefixRef, ServerSupport, MAX_ARGS};

fuzz_target!(|data: &[u8]| {
    // Only fuzz valid UTF-8; transports decode lossily before tokenizing
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 8191 {
            return;
        }

        if let Ok(msg) = Message::parse(input) {
            assert!(msg.argc() >= 2 && msg.argc() <= MAX_ARGS);
            let _ = PrefixRef::parse(msg.prefix());
            let _ = ServerSupport::default().apply_isupport(&msg);
            let _ = msg.dump();
        }
    }
});
