//! Benchmarks for line tokenizing, ISUPPORT negotiation and mode expansion.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_session::{expand_chanmodes, ChanModes, Message, PrefixSpec, ServerSupport};

/// Simple PING message
const SIMPLE_MESSAGE: &str = "PING :irc.example.com";

/// Message with prefix
const PREFIX_MESSAGE: &str = ":nick!user@host PRIVMSG #channel :Hello, world!";

/// Welcome numeric
const NUMERIC_RESPONSE: &str =
    ":irc.server.net 001 nickname :Welcome to the IRC Network nickname!user@host";

/// Typical 005 line
const ISUPPORT_LINE: &str = ":irc.server.net 005 nickname AWAYLEN=200 CASEMAPPING=rfc1459 \
     CHANMODES=beI,k,l,BCMNORScimnpstz CHANTYPES=# MODES=4 NETWORK=Example \
     PREFIX=(qaohv)~&@%+ STATUSMSG=~&@%+ :are supported by this server";

fn benchmark_tokenizing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Message Tokenizing");

    for (name, line) in [
        ("simple_ping", SIMPLE_MESSAGE),
        ("with_prefix", PREFIX_MESSAGE),
        ("numeric_response", NUMERIC_RESPONSE),
        ("isupport", ISUPPORT_LINE),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let msg = Message::parse(black_box(line)).unwrap();
                black_box(msg)
            })
        });
    }

    group.finish();
}

fn benchmark_isupport(c: &mut Criterion) {
    let msg = Message::parse(ISUPPORT_LINE).unwrap();
    c.bench_function("apply_isupport", |b| {
        b.iter(|| {
            let mut support = ServerSupport::default();
            support.apply_isupport(black_box(&msg)).unwrap();
            black_box(support)
        })
    });
}

fn benchmark_mode_expansion(c: &mut Criterion) {
    let mut group = c.benchmark_group("Mode Expansion");
    let chanmodes = ChanModes::new("beI", "k", "l", "BCMNORScimnpstz");
    let prefix = PrefixSpec::parse("(qaohv)~&@%+").unwrap();

    for n in [1usize, 4, 12] {
        let modes: String = std::iter::once('+')
            .chain("ovbk".chars().cycle().take(n))
            .collect();
        let args: Vec<String> = (0..n).map(|i| format!("arg{}", i)).collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                black_box(expand_chanmodes(
                    black_box(&modes),
                    black_box(&args),
                    &chanmodes,
                    &prefix,
                ))
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_tokenizing,
    benchmark_isupport,
    benchmark_mode_expansion
);
criterion_main!(benches);
