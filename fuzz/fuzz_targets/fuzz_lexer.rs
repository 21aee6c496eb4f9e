#![no_main]
use arbitrary::Arbitrary;
use jsonsl::{
    Callbacks, Context, Feed, FrameType, JsonPointer, LexError, Lexer, LexerOptions, Match,
    Recovery, TypeSet,
};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

const LEVELS: usize = 256;

#[derive(Debug, Arbitrary)]
struct Input {
    /// Bit 0: multiple values, bit 1: return after `\u`, bits 4..8: callback
    /// depth limit (0 means unlimited).
    flags: u8,
    split_seed: u64,
    /// Answer to the first error; later errors stop.
    retry: Option<u8>,
    pointers: Vec<String>,
    data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Action(char, FrameType, usize, usize, Match, Option<usize>),
    Error(LexError, usize, usize),
}

#[derive(Default)]
struct Recorder {
    events: Vec<Event>,
    retry: Option<u8>,
}

impl Callbacks for Recorder {
    fn action(&mut self, cx: &mut Context<'_, ()>) {
        let frame = cx.frame();
        let (state, index) = frame.path_match();
        self.events.push(Event::Action(
            cx.action().as_char(),
            frame.ty(),
            frame.level(),
            cx.pos(),
            state,
            index,
        ));
    }

    fn error(&mut self, err: LexError, cx: &mut Context<'_, ()>) -> Recovery {
        self.events.push(Event::Error(err, cx.pos(), cx.level()));
        self.retry.take().map_or(Recovery::Stop, Recovery::Retry)
    }
}

fn options(flags: u8) -> LexerOptions {
    LexerOptions {
        callback_types: TypeSet::ALL.with(FrameType::UEscape),
        max_callback_level: match flags >> 4 {
            0 => usize::MAX,
            n => usize::from(n),
        },
        return_uescape: flags & 2 != 0,
        allow_multiple_values: flags & 1 != 0,
    }
}

/// Feeds `chunks` in order, resuming after every early return. Returns the
/// recorded events, the first error and the final level.
fn run<'a>(
    input: &Input,
    chunks: impl Iterator<Item = &'a [u8]>,
) -> (Vec<Event>, Option<LexError>, usize) {
    let mut lexer: Lexer = Lexer::with_options(LEVELS, options(input.flags));
    let pointers: Vec<JsonPointer> = input
        .pointers
        .iter()
        .filter_map(|p| JsonPointer::parse(p).ok())
        .collect();
    if !pointers.is_empty() {
        lexer.attach_paths(pointers);
    }

    let mut recorder = Recorder {
        events: Vec::new(),
        retry: input.retry,
    };
    for mut chunk in chunks {
        loop {
            match lexer.feed(chunk, &mut recorder) {
                Ok(Feed::Complete) => break,
                Ok(Feed::UnicodeEscape { consumed }) => chunk = &chunk[consumed..],
                Err(err) => return (recorder.events, Some(err), lexer.level()),
            }
        }
    }
    (recorder.events, None, lexer.level())
}

/// Split `data` into chunks of at least one byte using a deterministic value
/// to pick the sizes.
fn split_into_chunks(data: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut seed = split_seed;
    let mut rest = data;
    while !rest.is_empty() {
        let size = (seed % rest.len() as u64) as usize + 1;
        let (chunk, tail) = rest.split_at(size);
        chunks.push(chunk);
        rest = tail;
        seed = seed.rotate_left(7) ^ 0x9e37_79b9_7f4a_7c15;
    }
    chunks
}

fn lexer(input: &Input) {
    let whole = run(input, std::iter::once(input.data.as_slice()));
    let chunked = run(input, split_into_chunks(&input.data, input.split_seed).into_iter());
    assert_eq!(whole, chunked, "chunking changed the callbacks");

    // Any container document serde_json accepts must lex cleanly to the end.
    if input.retry.is_none() {
        if let Ok(Value::Array(_) | Value::Object(_)) = serde_json::from_slice(&input.data) {
            let (_, error, level) = whole;
            assert_eq!(error, None);
            assert_eq!(level, 0);
        }
    }
}

fuzz_target!(|input: Input| lexer(&input));
