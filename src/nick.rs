//! Nick-collision policy.
//!
//! When the server refuses our nickname (432, 433, 436, 437) during
//! registration, the session asks a [`NickMutator`] for a replacement and
//! retries with `NICK`. Without a mutator the attempt fails with
//! [`SessionError::OutOfNicks`](crate::SessionError::OutOfNicks).

use rand::Rng;

/// Attempt budget handed to the mutator on every collision.
pub const NICK_ATTEMPTS: usize = 10;

/// Produces a replacement nickname after a collision.
///
/// The mutator edits `nick` in place. Leaving it empty gives up.
pub trait NickMutator {
    fn mutate(&mut self, nick: &mut String, max_attempts: usize);
}

impl<F> NickMutator for F
where
    F: FnMut(&mut String, usize),
{
    fn mutate(&mut self, nick: &mut String, max_attempts: usize) {
        self(nick, max_attempts)
    }
}

/// Default mutator.
///
/// Short nicks (under 9 characters) get a `_` appended. Longer ones cycle
/// their last character through the digits; once it reaches `9`, a random
/// position after the first character is replaced with a random digit.
pub fn mutilate_nick(nick: &mut String, _max_attempts: usize) {
    let mut chars: Vec<char> = nick.chars().collect();
    let len = chars.len();

    if len < 9 {
        nick.push('_');
        return;
    }

    let last = chars[len - 1];
    match last {
        '9' => {
            let mut rng = rand::thread_rng();
            let pos = rng.gen_range(1..len);
            chars[pos] = char::from(b'0' + rng.gen_range(0..10u8));
        }
        '0'..='8' => chars[len - 1] = char::from(last as u8 + 1),
        _ => chars[len - 1] = '0',
    }
    *nick = chars.into_iter().collect();
}
