use alloc::{format, string::String, vec::Vec};

use crate::{Callbacks, Context, Feed, LexError, Lexer, LexerOptions, Recovery, TypeSet};

/// Records every reported action as `+OBJECT L1 @0` and every error with its
/// position.
#[derive(Debug, Default)]
pub(crate) struct Trace {
    pub(crate) events: Vec<String>,
    pub(crate) errors: Vec<(LexError, usize)>,
    /// Answer to the next error; later errors stop.
    pub(crate) retry: Option<u8>,
}

impl<T> Callbacks<T> for Trace {
    fn action(&mut self, cx: &mut Context<'_, T>) {
        let frame = cx.frame();
        self.events.push(format!(
            "{}{} L{} @{}",
            cx.action().as_char(),
            frame.ty().as_str(),
            frame.level(),
            cx.pos()
        ));
    }

    fn error(&mut self, err: LexError, cx: &mut Context<'_, T>) -> Recovery {
        self.errors.push((err, cx.pos()));
        self.retry.take().map_or(Recovery::Stop, Recovery::Retry)
    }
}

pub(crate) fn traced_lexer(levels: usize) -> Lexer {
    Lexer::with_options(
        levels,
        LexerOptions {
            callback_types: TypeSet::ALL,
            ..Default::default()
        },
    )
}

/// Feeds `input` in one chunk to a fresh lexer with every callback enabled.
pub(crate) fn trace(input: &[u8]) -> (Trace, Result<Feed, LexError>) {
    let mut lexer = traced_lexer(64);
    let mut trace = Trace::default();
    let result = lexer.feed(input, &mut trace);
    (trace, result)
}

/// Feeds `input` split at every offset in `splits`.
pub(crate) fn trace_chunked(input: &[u8], splits: &[usize]) -> (Trace, Result<Feed, LexError>) {
    let mut lexer = traced_lexer(64);
    let mut trace = Trace::default();
    let mut start = 0;
    for &end in splits.iter().chain([input.len()].iter()) {
        let end = end.clamp(start, input.len());
        if let Err(err) = lexer.feed(&input[start..end], &mut trace) {
            return (trace, Err(err));
        }
        start = end;
    }
    (trace, Ok(Feed::Complete))
}
