//! Benchmark – `jsonsl::Lexer` throughput
#![allow(missing_docs)]

use std::{fmt::Write, time::Duration};

use criterion::{
    BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use jsonsl::{Callbacks, Context, JsonPointer, LexError, Lexer, Match, Recovery, TypeSet};

/// Produce a deterministic document of `records` objects, each with a nested
/// list, a string and a few literals, roughly 100 bytes per record.
fn make_json_payload(records: usize) -> String {
    let mut s = String::from("{\"records\": [");
    for i in 0..records {
        if i > 0 {
            s.push_str(", ");
        }
        write!(
            s,
            r#"{{"id": {i}, "name": "record {i}", "active": {}, "scores": [{}, -{}.5, 1e{}], "note": null}}"#,
            i % 2 == 0,
            i * 7,
            i % 13,
            i % 9
        )
        .expect("writing to a String");
    }
    s.push_str("]}");
    s
}

/// Counts callbacks so that the work cannot be optimised away.
#[derive(Default)]
struct Counter {
    events: usize,
    matches: usize,
}

impl Callbacks for Counter {
    fn action(&mut self, cx: &mut Context<'_, ()>) {
        self.events += 1;
        if cx.path_match().0 == Match::Complete {
            self.matches += 1;
        }
    }

    fn error(&mut self, err: LexError, _cx: &mut Context<'_, ()>) -> Recovery {
        panic!("benchmark payload is invalid: {err}");
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    /// No callbacks at all.
    Silent,
    /// Push and pop for every frame.
    AllCallbacks,
    /// Every callback, with a pointer session attached.
    Pointers,
}

fn run_lexer(payload: &[u8], parts: usize, mode: Mode) -> usize {
    let chunk_size = payload.len().div_ceil(parts);

    let mut lexer: Lexer = Lexer::new(32);
    match mode {
        Mode::Silent => lexer.options_mut().callback_types = TypeSet::EMPTY,
        Mode::AllCallbacks => lexer.enable_all_callbacks(),
        Mode::Pointers => {
            lexer.enable_all_callbacks();
            lexer.attach_paths(
                ["/records/^/name", "/records/^/scores/2", "/records/10"]
                    .map(|p| JsonPointer::parse(p).expect("valid pointer")),
            );
        }
    }

    let mut counter = Counter::default();
    for chunk in payload.chunks(chunk_size) {
        lexer.feed(chunk, &mut counter).expect("valid payload");
    }
    assert!(lexer.is_complete());
    counter.events + counter.matches
}

fn bench_lexer(c: &mut Criterion) {
    let payload = make_json_payload(1_000);

    let mut group = c.benchmark_group("lexer_split");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    for &parts in &[1usize, 100, 10_000] {
        for &mode in &[Mode::Silent, Mode::AllCallbacks, Mode::Pointers] {
            let name = format!("{mode:?}").to_lowercase();
            group.bench_with_input(BenchmarkId::new(parts.to_string(), name), &mode, |b, &m| {
                b.iter(|| {
                    let count = run_lexer(black_box(payload.as_bytes()), parts, m);
                    black_box(count);
                });
            });
        }
    }
    group.finish();
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(5))
            .measurement_time(Duration::from_secs(10));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_lexer }
criterion_main!(benches);
