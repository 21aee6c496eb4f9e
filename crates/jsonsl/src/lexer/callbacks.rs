use crate::{
    error::LexError,
    frame::{Action, Frame},
    pointer::Match,
};

/// What [`Lexer::feed`](crate::Lexer::feed) does after a grammar error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Stop; `feed` returns the error and consumes nothing further.
    Stop,
    /// Process this byte in place of the offending one.
    Retry(u8),
}

/// Receives the lexer's structural events.
///
/// Only [`error`](Callbacks::error) is required. The per-action methods
/// default to [`action`](Callbacks::action), which does nothing, so a handler
/// can either override `action` for every event or only the ones it cares
/// about.
///
/// Whether a push or pop is reported at all is decided by
/// [`LexerOptions`](crate::LexerOptions) and the frame's
/// [`ignore_callback`](crate::Frame::ignore_callback) flag; errors are always
/// reported.
pub trait Callbacks<T = ()> {
    /// Fallback for every action without its own override.
    fn action(&mut self, cx: &mut Context<'_, T>) {
        let _ = cx;
    }

    /// A frame was pushed. It is already on the stack: `cx.frame()` is the new
    /// frame and `cx.parent()` its container.
    fn push(&mut self, cx: &mut Context<'_, T>) {
        self.action(cx);
    }

    /// A frame is about to be popped. `cx.frame()` is the finished frame with
    /// its final [`pos_cur`](Frame::pos_cur).
    fn pop(&mut self, cx: &mut Context<'_, T>) {
        self.action(cx);
    }

    /// The `u` of a `\u` escape. `cx.frame()` is the enclosing string or key.
    fn uescape(&mut self, cx: &mut Context<'_, T>) {
        self.action(cx);
    }

    /// A grammar error at `cx.byte()`. `cx.frame()` is the innermost open
    /// frame.
    fn error(&mut self, err: LexError, cx: &mut Context<'_, T>) -> Recovery;
}

/// Position of the lexer within the chunk being fed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'a> {
    pub(crate) chunk: &'a [u8],
    pub(crate) offset: usize,
    pub(crate) byte: u8,
}

/// The lexer's state as seen from inside a callback.
pub struct Context<'a, T> {
    pub(crate) action: Action,
    pub(crate) cursor: Cursor<'a>,
    pub(crate) pos: usize,
    pub(crate) level: usize,
    pub(crate) stack: &'a mut [Frame<T>],
}

impl<'a, T> Context<'a, T> {
    /// Which event this callback reports.
    #[must_use]
    pub fn action(&self) -> Action {
        self.action
    }

    /// The byte being processed: the opening or closing byte of the frame,
    /// the `u` of an escape, or the offending byte of an error.
    #[must_use]
    pub fn byte(&self) -> u8 {
        self.cursor.byte
    }

    /// Absolute position of [`byte`](Self::byte) in the stream.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Position of [`byte`](Self::byte) within [`chunk`](Self::chunk).
    #[must_use]
    pub fn offset(&self) -> usize {
        self.cursor.offset
    }

    /// The chunk passed to the current `feed` call.
    #[must_use]
    pub fn chunk(&self) -> &'a [u8] {
        self.cursor.chunk
    }

    /// Level of [`frame`](Self::frame).
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The frame this callback is about.
    #[must_use]
    pub fn frame(&self) -> &Frame<T> {
        &self.stack[self.level]
    }

    /// Mutable access to [`frame`](Self::frame), for its payload and
    /// [`ignore_callback`](Frame::ignore_callback).
    pub fn frame_mut(&mut self) -> &mut Frame<T> {
        &mut self.stack[self.level]
    }

    /// The container of [`frame`](Self::frame); `None` for the sentinel.
    #[must_use]
    pub fn parent(&self) -> Option<&Frame<T>> {
        self.level.checked_sub(1).map(|level| &self.stack[level])
    }

    /// An open frame by level, from the sentinel at 0 to
    /// [`level`](Self::level).
    #[must_use]
    pub fn frame_at(&self, level: usize) -> Option<&Frame<T>> {
        self.frames().get(level)
    }

    /// Mutable form of [`frame_at`](Self::frame_at).
    pub fn frame_at_mut(&mut self, level: usize) -> Option<&mut Frame<T>> {
        self.stack[..=self.level].get_mut(level)
    }

    /// Every open frame, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[Frame<T>] {
        &self.stack[..=self.level]
    }

    /// Match result of the attached session for [`frame`](Self::frame).
    #[must_use]
    pub fn path_match(&self) -> (Match, Option<usize>) {
        self.frame().path_match()
    }

    /// The bytes of a frame being popped, as given by
    /// [`Frame::content_span`], when it started in the current chunk.
    ///
    /// `None` for other actions or when the frame began in an earlier chunk.
    #[must_use]
    pub fn popped_bytes(&self) -> Option<&'a [u8]> {
        if self.action != Action::Pop {
            return None;
        }
        let chunk_start = self.pos - self.cursor.offset;
        let span = self.frame().content_span();
        let start = span.start.checked_sub(chunk_start)?;
        self.cursor.chunk.get(start..span.end - chunk_start)
    }
}
