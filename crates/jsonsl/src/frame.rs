//! Nesting frames: one entry of the lexer's stack per open level.

use core::ops::Range;

use crate::{pointer::Match, special::Special};

const STRINGY: u8 = 0x80;

/// The kind of structure a frame represents.
///
/// The discriminants are the bytes that open each structure, with the high bit
/// set for the two string-like kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum FrameType {
    /// A string value.
    String = b'"' | STRINGY,
    /// An object key.
    HKey = b'#' | STRINGY,
    Object = b'{',
    List = b'[',
    /// A literal: `true`, `false`, `null` or a number.
    Special = b'^',
    /// Never the type of a frame; selects the `\u` escape callback in a
    /// [`TypeSet`](crate::TypeSet).
    UEscape = b'u',
    /// The level-0 sentinel below every document.
    #[default]
    Unknown = b'?',
}

impl FrameType {
    pub const ALL: [FrameType; 7] = [
        FrameType::String,
        FrameType::HKey,
        FrameType::Object,
        FrameType::List,
        FrameType::Special,
        FrameType::UEscape,
        FrameType::Unknown,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FrameType::String => "STRING",
            FrameType::HKey => "HKEY",
            FrameType::Object => "OBJECT",
            FrameType::List => "LIST",
            FrameType::Special => "SPECIAL",
            FrameType::UEscape => "UESCAPE",
            FrameType::Unknown => "UNKNOWN",
        }
    }

    /// Strings and keys: frames whose bytes are content, not structure.
    #[inline(always)]
    #[must_use]
    pub const fn is_stringy(self) -> bool {
        self as u8 & STRINGY != 0
    }

    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, FrameType::Object | FrameType::List)
    }

    #[must_use]
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| *ty as u8 == raw)
    }
}

/// Name of a raw frame type code, with a fallback for unknown codes.
#[must_use]
pub fn type_name(raw: u8) -> &'static str {
    FrameType::from_u8(raw).map_or("UNKNOWN TYPE", FrameType::as_str)
}

/// What happened to the frame a callback is invoked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum Action {
    Push = b'+',
    Pop = b'-',
    UEscape = b'U',
    Error = b'!',
}

impl Action {
    #[must_use]
    pub const fn as_char(self) -> char {
        self as u8 as char
    }
}

/// One level of nesting.
///
/// Frames live in a fixed array indexed by level and are overwritten in place
/// when a level is re-entered; `data` is the only field the lexer never
/// touches after construction, so it keeps whatever the caller last stored at
/// this level until the caller changes it or the lexer is reset.
#[derive(Debug, Clone, Default)]
pub struct Frame<T = ()> {
    pub(crate) pos_begin: usize,
    pub(crate) pos_cur: usize,
    pub(crate) ty: FrameType,
    pub(crate) level: usize,
    pub(crate) nelem: usize,
    pub(crate) special: Special,
    pub(crate) path_match: Match,
    pub(crate) path_index: Option<usize>,
    /// Suppresses callbacks for this frame and every frame pushed below it.
    pub ignore_callback: bool,
    /// Caller-owned payload.
    pub data: T,
}

impl<T> Frame<T> {
    /// Absolute position of the byte that opened the frame: the quote,
    /// bracket or first literal byte.
    #[must_use]
    pub fn pos_begin(&self) -> usize {
        self.pos_begin
    }

    /// Absolute position at which control last returned to this frame. On pop
    /// this is the terminating byte: the closing quote or bracket, or the byte
    /// after a literal.
    #[must_use]
    pub fn pos_cur(&self) -> usize {
        self.pos_cur
    }

    #[must_use]
    pub fn ty(&self) -> FrameType {
        self.ty
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.level
    }

    /// Element count. Objects count keys and values separately, so the count
    /// is even between complete pairs.
    #[must_use]
    pub fn nelem(&self) -> usize {
        self.nelem
    }

    /// Index of the newest element of a list, `None` for other frames or an
    /// empty list.
    #[must_use]
    pub fn child_index(&self) -> Option<usize> {
        match self.ty {
            FrameType::List => self.nelem.checked_sub(1),
            _ => None,
        }
    }

    /// Literal classification for [`FrameType::Special`] frames, and
    /// [`Special::NONASCII`] for strings and keys.
    #[must_use]
    pub fn special_flags(&self) -> Special {
        self.special
    }

    /// Result of evaluating the attached match session when this frame was
    /// pushed, with the index of the completed pointer if any.
    #[must_use]
    pub fn path_match(&self) -> (Match, Option<usize>) {
        (self.path_match, self.path_index)
    }

    /// `pos_begin..pos_cur`.
    #[must_use]
    pub fn span(&self) -> Range<usize> {
        self.pos_begin..self.pos_cur
    }

    /// The bytes that make up the element once it has been popped: string
    /// content without quotes, the literal text, or a container including both
    /// brackets.
    #[must_use]
    pub fn content_span(&self) -> Range<usize> {
        match self.ty {
            FrameType::String | FrameType::HKey => self.pos_begin + 1..self.pos_cur,
            FrameType::Object | FrameType::List => self.pos_begin..self.pos_cur + 1,
            _ => self.pos_begin..self.pos_cur,
        }
    }
}
