//! The streaming structural lexer.
//!
//! The lexer keeps one [`Frame`] per nesting level in an array allocated once
//! at construction. Level 0 is a sentinel that stands for "outside of any
//! value"; the document's root value lives at level 1. Every byte is examined
//! exactly once (twice when an error handler asks for a retry) and no state
//! lives outside the lexer, so a document can be split at any byte and fed in
//! pieces with the same result as feeding it whole.
//!
//! Grammar checks run before the stack is changed. The one exception is an
//! in-flight literal: a `:`, `,`, closing bracket or whitespace ends it first,
//! which is why an error raised by the `:` in `[1:2]` reports a list frame.

#![expect(clippy::inline_always)]

mod callbacks;


use alloc::{boxed::Box, vec::Vec};

use bstr::BString;
pub use callbacks::{Callbacks, Context, Recovery};
use callbacks::Cursor;

use crate::{
    error::LexError,
    frame::{Action, Frame, FrameType},
    options::{LexerOptions, TypeSet},
    pointer::{JsonPointer, Key, MatchSession},
    special::{self, Special},
};

/// How a call to [`Lexer::feed`] ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// The whole chunk was consumed.
    Complete,
    /// Returned right after the `u` of a `\u` escape when
    /// [`LexerOptions::return_uescape`] is set. The first `consumed` bytes of
    /// the chunk were processed; feed the rest (or the caller's own handling
    /// of the four hex digits) to continue.
    UnicodeEscape { consumed: usize },
}

/// A streaming JSON lexer with a fixed nesting capacity.
///
/// `T` is a caller-owned payload stored in every [`Frame`].
///
/// ```rust
/// use jsonsl::{Callbacks, Context, LexError, Lexer, Recovery};
///
/// #[derive(Default)]
/// struct Count(usize);
///
/// impl Callbacks for Count {
///     fn push(&mut self, _cx: &mut Context<'_, ()>) {
///         self.0 += 1;
///     }
///
///     fn error(&mut self, _err: LexError, _cx: &mut Context<'_, ()>) -> Recovery {
///         Recovery::Stop
///     }
/// }
///
/// let mut lexer: Lexer = Lexer::new(16);
/// lexer.enable_all_callbacks();
/// let mut count = Count::default();
/// lexer.feed(br#"{"a": [1, "tw"#, &mut count).unwrap();
/// lexer.feed(br#"o", null]}"#, &mut count).unwrap();
/// assert_eq!(count.0, 6);
/// assert!(lexer.is_complete());
/// ```
#[derive(Debug)]
pub struct Lexer<T = ()> {
    stack: Box<[Frame<T>]>,
    levels: usize,
    level: usize,
    pos: usize,
    in_escape: bool,
    /// `b'"'` for a key, `b':'`, `b','` or 0 for no particular token.
    expecting: u8,
    /// The last `:` or `,` since the current element was pushed, or 0.
    tok_last: u8,
    can_insert: bool,
    options: LexerOptions,
    session: Option<MatchSession>,
    key: BString,
}

impl<T: Default> Lexer<T> {
    /// Creates a lexer that accepts up to `levels` levels of nesting.
    ///
    /// Literals and strings occupy a level of their own, so `[1]` needs two.
    ///
    /// # Panics
    ///
    /// If `levels` is `usize::MAX`: the stack also holds the sentinel frame.
    #[must_use]
    pub fn new(levels: usize) -> Self {
        Self::with_options(levels, LexerOptions::default())
    }

    /// Like [`new`](Self::new), with `options` in place of the defaults.
    ///
    /// # Panics
    ///
    /// If `levels` is `usize::MAX`.
    #[must_use]
    pub fn with_options(levels: usize, options: LexerOptions) -> Self {
        assert!(levels < usize::MAX, "no room for the sentinel frame below {levels} levels");
        let stack: Vec<Frame<T>> = (0..=levels).map(|_| Frame::default()).collect();
        Self {
            stack: stack.into_boxed_slice(),
            levels,
            level: 0,
            pos: 0,
            in_escape: false,
            expecting: 0,
            tok_last: 0,
            can_insert: true,
            options,
            session: None,
            key: BString::default(),
        }
    }

    /// Returns the lexer to its initial state for a new stream.
    ///
    /// Every frame is cleared, payloads included. Options and the attached
    /// session are kept.
    pub fn reset(&mut self) {
        self.stack.fill_with(Frame::default);
        self.level = 0;
        self.pos = 0;
        self.in_escape = false;
        self.expecting = 0;
        self.tok_last = 0;
        self.can_insert = true;
        self.key.clear();
        if let Some(session) = &mut self.session {
            session.reset();
        }
    }
}

impl<T> Lexer<T> {
    /// Lexes `chunk`, invoking `callbacks` as structure is recognised.
    ///
    /// Positions continue from the previous call.
    ///
    /// # Errors
    ///
    /// The [`LexError`] that the error callback answered with
    /// [`Recovery::Stop`]. [`LexError::LevelsExceeded`] always stops.
    pub fn feed<C>(&mut self, chunk: &[u8], callbacks: &mut C) -> Result<Feed, LexError>
    where
        C: Callbacks<T> + ?Sized,
    {
        for (offset, &byte) in chunk.iter().enumerate() {
            let mut cur = Cursor { chunk, offset, byte };

            if self.in_escape {
                self.in_escape = false;
                if byte >= 0x80 {
                    self.stack[self.level].special |= Special::NONASCII;
                }
                self.capture_key(byte);
                if byte == b'u' {
                    self.dispatch(Action::UEscape, FrameType::UEscape, cur, callbacks);
                    if self.options.return_uescape {
                        self.pos += 1;
                        log::trace!("returning after \\u at byte {}", self.pos - 1);
                        return Ok(Feed::UnicodeEscape { consumed: offset + 1 });
                    }
                }
                self.pos += 1;
                continue;
            }

            while let Err(err) = self.step(cur, callbacks) {
                match self.report(err, cur, callbacks) {
                    Recovery::Retry(byte) => cur.byte = byte,
                    Recovery::Stop => return Err(err),
                }
            }
            self.pos += 1;
        }
        Ok(Feed::Complete)
    }

    #[inline(always)]
    fn step<C>(&mut self, cur: Cursor<'_>, callbacks: &mut C) -> Result<(), LexError>
    where
        C: Callbacks<T> + ?Sized,
    {
        if self.top().ty.is_stringy() {
            return self.string_byte(cur, callbacks);
        }

        match cur.byte {
            0..=0x20 => {
                self.close_literal(cur, callbacks);
                Ok(())
            }
            0x80.. => Err(LexError::GarbageTrailing),
            b'\\' => Err(LexError::EscapeOutsideString),
            b'"' => self.open_string(cur, callbacks),
            b':' => {
                self.close_literal(cur, callbacks);
                self.colon()
            }
            b',' => {
                self.close_literal(cur, callbacks);
                self.comma()
            }
            b'{' | b'[' => self.open_container(cur, callbacks),
            b'}' | b']' => self.close_container(cur, callbacks),
            _ => self.literal_byte(cur, callbacks),
        }
    }

    fn string_byte<C>(&mut self, cur: Cursor<'_>, callbacks: &mut C) -> Result<(), LexError>
    where
        C: Callbacks<T> + ?Sized,
    {
        match cur.byte {
            0 => return Err(LexError::FoundNullByte),
            b'"' => {
                let ty = self.top().ty;
                self.stack[self.level].pos_cur = self.pos;
                self.dispatch(Action::Pop, ty, cur, callbacks);
                self.pop_frame();
                if ty == FrameType::HKey {
                    self.expecting = b':';
                } else {
                    self.finish_value();
                }
                return Ok(());
            }
            b'\\' => self.in_escape = true,
            0x80.. => self.stack[self.level].special |= Special::NONASCII,
            _ => {}
        }
        self.capture_key(cur.byte);
        Ok(())
    }

    fn open_string<C>(&mut self, cur: Cursor<'_>, callbacks: &mut C) -> Result<(), LexError>
    where
        C: Callbacks<T> + ?Sized,
    {
        let top = self.top();
        let ty = match top.ty {
            FrameType::Special => return Err(LexError::StrayToken),
            FrameType::Object if top.nelem % 2 == 0 => {
                if self.expecting != b'"' {
                    return Err(LexError::StrayToken);
                }
                FrameType::HKey
            }
            FrameType::Object => {
                if self.tok_last != b':' {
                    return Err(LexError::MissingToken);
                }
                FrameType::String
            }
            FrameType::List => {
                if !self.can_insert {
                    return Err(LexError::MissingToken);
                }
                FrameType::String
            }
            _ => return Err(LexError::StringOutsideContainer),
        };

        self.push_frame(ty, Special::NONE, cur, callbacks)?;
        self.expecting = 0;
        self.can_insert = false;
        Ok(())
    }

    fn colon(&mut self) -> Result<(), LexError> {
        if self.top().ty != FrameType::Object {
            return Err(LexError::KeyOutsideObject);
        }
        if self.expecting != b':' {
            return Err(LexError::StrayToken);
        }
        self.tok_last = b':';
        self.expecting = 0;
        self.can_insert = true;
        Ok(())
    }

    fn comma(&mut self) -> Result<(), LexError> {
        if self.level == 0 || self.expecting != b',' {
            return Err(LexError::StrayToken);
        }
        self.tok_last = b',';
        if self.top().ty == FrameType::Object {
            self.expecting = b'"';
            self.can_insert = false;
        } else {
            self.expecting = 0;
            self.can_insert = true;
        }
        Ok(())
    }

    fn open_container<C>(&mut self, cur: Cursor<'_>, callbacks: &mut C) -> Result<(), LexError>
    where
        C: Callbacks<T> + ?Sized,
    {
        if !self.can_insert {
            return Err(LexError::CantInsert);
        }
        if cur.byte == b'{' {
            self.push_frame(FrameType::Object, Special::NONE, cur, callbacks)?;
            self.expecting = b'"';
            self.can_insert = false;
        } else {
            self.push_frame(FrameType::List, Special::NONE, cur, callbacks)?;
            self.expecting = 0;
            self.can_insert = true;
        }
        Ok(())
    }

    fn close_container<C>(&mut self, cur: Cursor<'_>, callbacks: &mut C) -> Result<(), LexError>
    where
        C: Callbacks<T> + ?Sized,
    {
        self.close_literal(cur, callbacks);

        let top = self.top();
        let ty = if cur.byte == b'}' { FrameType::Object } else { FrameType::List };
        if top.ty != ty {
            return Err(LexError::BracketMismatch);
        }
        if self.expecting != b',' && !(self.tok_last == 0 && top.nelem == 0) {
            return Err(LexError::StrayToken);
        }

        self.stack[self.level].pos_cur = self.pos;
        self.dispatch(Action::Pop, ty, cur, callbacks);
        self.pop_frame();
        self.finish_value();
        Ok(())
    }

    fn literal_byte<C>(&mut self, cur: Cursor<'_>, callbacks: &mut C) -> Result<(), LexError>
    where
        C: Callbacks<T> + ?Sized,
    {
        let top = self.top();
        if top.ty == FrameType::Special {
            return Ok(());
        }

        let flags = special::classify(cur.byte);
        if flags.is_empty() {
            return Err(LexError::SpecialExpected);
        }
        match top.ty {
            FrameType::Object if top.nelem % 2 == 0 => return Err(LexError::StrayToken),
            FrameType::Object if self.tok_last != b':' => return Err(LexError::MissingToken),
            FrameType::List if !self.can_insert => return Err(LexError::MissingToken),
            FrameType::Object | FrameType::List => {}
            _ if !self.can_insert => return Err(LexError::CantInsert),
            _ => {}
        }

        self.push_frame(FrameType::Special, flags, cur, callbacks)?;
        self.expecting = 0;
        self.can_insert = false;
        Ok(())
    }

    /// Ends an in-flight literal at the current byte.
    fn close_literal<C>(&mut self, cur: Cursor<'_>, callbacks: &mut C)
    where
        C: Callbacks<T> + ?Sized,
    {
        if self.top().ty != FrameType::Special {
            return;
        }
        self.stack[self.level].pos_cur = self.pos;
        self.dispatch(Action::Pop, FrameType::Special, cur, callbacks);
        self.pop_frame();
        self.finish_value();
    }

    fn finish_value(&mut self) {
        self.tok_last = 0;
        if self.level == 0 && self.options.allow_multiple_values {
            self.expecting = 0;
            self.can_insert = true;
        } else {
            self.expecting = b',';
            self.can_insert = false;
        }
    }

    fn push_frame<C>(
        &mut self,
        ty: FrameType,
        special: Special,
        cur: Cursor<'_>,
        callbacks: &mut C,
    ) -> Result<(), LexError>
    where
        C: Callbacks<T> + ?Sized,
    {
        if self.level == self.levels {
            return Err(LexError::LevelsExceeded);
        }

        let parent = &mut self.stack[self.level];
        parent.nelem += 1;
        let (parent_ty, parent_nelem, ignore) = (parent.ty, parent.nelem, parent.ignore_callback);

        self.level += 1;
        let frame = &mut self.stack[self.level];
        frame.ty = ty;
        frame.level = self.level;
        frame.pos_begin = self.pos;
        frame.pos_cur = self.pos;
        frame.nelem = 0;
        frame.special = special;
        frame.ignore_callback = ignore;
        frame.path_match = Default::default();
        frame.path_index = None;
        self.tok_last = 0;

        if ty == FrameType::HKey {
            self.key.clear();
        } else if let Some(session) = &mut self.session {
            let key = match parent_ty {
                FrameType::List => Key::Index(parent_nelem - 1),
                FrameType::Object => Key::Name(self.key.as_slice()),
                _ => Key::Name(b""),
            };
            (frame.path_match, frame.path_index) = session.match_state(self.level, parent_ty, key);
        }

        self.dispatch(Action::Push, ty, cur, callbacks);
        Ok(())
    }

    fn pop_frame(&mut self) {
        self.level -= 1;
        self.stack[self.level].pos_cur = self.pos;
    }

    #[inline(always)]
    fn capture_key(&mut self, byte: u8) {
        if self.session.is_some() && self.top().ty == FrameType::HKey {
            self.key.push(byte);
        }
    }

    /// Invokes the callback for `action` on the top frame if `gate` is
    /// enabled, the frame is shallow enough and not ignored.
    #[inline(always)]
    fn dispatch<C>(&mut self, action: Action, gate: FrameType, cur: Cursor<'_>, callbacks: &mut C)
    where
        C: Callbacks<T> + ?Sized,
    {
        let frame = self.top();
        if !self.options.callback_types.contains(gate)
            || frame.level > self.options.max_callback_level
            || frame.ignore_callback
        {
            return;
        }

        let mut cx = self.context(action, cur);
        match action {
            Action::Push => callbacks.push(&mut cx),
            Action::Pop => callbacks.pop(&mut cx),
            Action::UEscape => callbacks.uescape(&mut cx),
            Action::Error => callbacks.action(&mut cx),
        }
    }

    #[cold]
    fn report<C>(&mut self, err: LexError, cur: Cursor<'_>, callbacks: &mut C) -> Recovery
    where
        C: Callbacks<T> + ?Sized,
    {
        log::trace!(
            "{} at byte {} ({:#04x}), level {}",
            err.as_str(),
            self.pos,
            cur.byte,
            self.level
        );
        let recovery = callbacks.error(err, &mut self.context(Action::Error, cur));
        if err == LexError::LevelsExceeded {
            Recovery::Stop
        } else {
            recovery
        }
    }

    fn context<'a>(&'a mut self, action: Action, cursor: Cursor<'a>) -> Context<'a, T> {
        Context {
            action,
            cursor,
            pos: self.pos,
            level: self.level,
            stack: &mut self.stack,
        }
    }

    #[inline(always)]
    fn top(&self) -> &Frame<T> {
        &self.stack[self.level]
    }

    /// Absolute position of the next byte to be fed.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Current nesting depth; 0 outside of any value.
    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// The nesting capacity this lexer was built with.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// The innermost open frame, or the sentinel.
    #[must_use]
    pub fn frame(&self) -> &Frame<T> {
        self.top()
    }

    /// Every open frame, from the sentinel outwards in.
    #[must_use]
    pub fn stack(&self) -> &[Frame<T>] {
        &self.stack[..=self.level]
    }

    /// Whether at least one root value has been closed and nothing is open.
    ///
    /// A root literal is only closed by the byte after it, so `12` is not
    /// complete until something like a newline follows.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.level == 0 && self.stack[0].nelem > 0
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &LexerOptions {
        &self.options
    }

    /// Options may be changed between calls to [`feed`](Self::feed); they
    /// apply from the next byte on.
    pub fn options_mut(&mut self) -> &mut LexerOptions {
        &mut self.options
    }

    /// Enables push and pop callbacks for every frame type. The `\u` callback
    /// is left as it was.
    pub fn enable_all_callbacks(&mut self) {
        let uescape = self.options.callback_types.contains(FrameType::UEscape);
        self.options.callback_types = if uescape {
            TypeSet::ALL.with(FrameType::UEscape)
        } else {
            TypeSet::ALL
        };
    }

    /// Compiles a [`MatchSession`] for `paths` sized to this lexer and
    /// attaches it, returning the session it replaces.
    ///
    /// Attach before the first [`feed`](Self::feed) or right after a
    /// [`reset`](Self::reset); frames already open are not evaluated.
    pub fn attach_paths<I>(&mut self, paths: I) -> Option<MatchSession>
    where
        I: IntoIterator,
        I::Item: Into<alloc::sync::Arc<JsonPointer>>,
    {
        self.attach_session(MatchSession::new(paths, self.levels))
    }

    /// Attaches `session`, returning the session it replaces.
    pub fn attach_session(&mut self, session: MatchSession) -> Option<MatchSession> {
        log::debug!(
            "attaching match session with {} pointers at byte {}",
            session.paths().len(),
            self.pos
        );
        self.key.clear();
        self.session.replace(session)
    }

    /// Removes the attached session; frames pushed afterwards are not
    /// matched.
    pub fn detach_session(&mut self) -> Option<MatchSession> {
        self.session.take()
    }

    /// The attached session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&MatchSession> {
        self.session.as_ref()
    }
}
