use thiserror::Error;

/// Grammar violations reported by the lexer through
/// [`Callbacks::error`](crate::Callbacks::error).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum LexError {
    /// A byte above `0x7F` outside of a string.
    #[error("trailing garbage outside of a string")]
    GarbageTrailing = 0,
    /// A token that cannot appear at this point of the grammar.
    #[error("stray token")]
    StrayToken = 1,
    /// A separator was required before this token.
    #[error("missing separator before this token")]
    MissingToken = 2,
    /// A container was opened where no value may be inserted.
    #[error("cannot insert a value here")]
    CantInsert = 3,
    /// A `\` outside of a string.
    #[error("escape outside of a string")]
    EscapeOutsideString = 4,
    /// A `:` outside of an object.
    #[error("':' outside of an object")]
    KeyOutsideObject = 5,
    /// A string outside of any object or array.
    #[error("string outside of a container")]
    StringOutsideContainer = 6,
    /// A NUL byte inside a string.
    #[error("NUL byte inside a string")]
    FoundNullByte = 7,
    /// Nesting would exceed the number of levels the lexer was built with.
    #[error("nesting exceeds the configured number of levels")]
    LevelsExceeded = 8,
    /// A `}` closing a `[`, or a `]` closing a `{`.
    #[error("closing bracket does not match the open container")]
    BracketMismatch = 9,
    /// The byte cannot start a literal (`true`, `false`, `null` or a number).
    #[error("expected the start of a literal")]
    SpecialExpected = 10,
}

impl LexError {
    pub const ALL: [LexError; 11] = [
        LexError::GarbageTrailing,
        LexError::StrayToken,
        LexError::MissingToken,
        LexError::CantInsert,
        LexError::EscapeOutsideString,
        LexError::KeyOutsideObject,
        LexError::StringOutsideContainer,
        LexError::FoundNullByte,
        LexError::LevelsExceeded,
        LexError::BracketMismatch,
        LexError::SpecialExpected,
    ];

    /// The canonical upper-case name of the error kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            LexError::GarbageTrailing => "GARBAGE_TRAILING",
            LexError::StrayToken => "STRAY_TOKEN",
            LexError::MissingToken => "MISSING_TOKEN",
            LexError::CantInsert => "CANT_INSERT",
            LexError::EscapeOutsideString => "ESCAPE_OUTSIDE_STRING",
            LexError::KeyOutsideObject => "KEY_OUTSIDE_OBJECT",
            LexError::StringOutsideContainer => "STRING_OUTSIDE_CONTAINER",
            LexError::FoundNullByte => "FOUND_NULL_BYTE",
            LexError::LevelsExceeded => "LEVELS_EXCEEDED",
            LexError::BracketMismatch => "BRACKET_MISMATCH",
            LexError::SpecialExpected => "SPECIAL_EXPECTED",
        }
    }

    #[must_use]
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }
}

/// Name of a raw lexer error code, with a fallback for unknown codes.
#[must_use]
pub fn error_name(raw: u8) -> &'static str {
    LexError::from_u8(raw).map_or("<UNKNOWN_ERROR>", LexError::as_str)
}

/// Errors from compiling a [`JsonPointer`](crate::JsonPointer).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PointerError {
    #[error("pointer does not start with '/'")]
    NoRoot,
    #[error("pointer contains an empty component ('//')")]
    DupSlash,
    #[error("malformed percent escape")]
    PercentBadHex,
}

impl PointerError {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PointerError::NoRoot => "JPR_NOROOT",
            PointerError::DupSlash => "JPR_DUPSLASH",
            PointerError::PercentBadHex => "PERCENT_BADHEX",
        }
    }
}

/// Errors from [`unescape`](crate::unescape()).
///
/// `offset` is the position of the offending backslash in the input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UnescapeError {
    #[error("invalid escape sequence at offset {offset}")]
    InvalidEscape { offset: usize },
    #[error("invalid unicode code point at offset {offset}")]
    InvalidCodepoint { offset: usize },
}

impl UnescapeError {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            UnescapeError::InvalidEscape { .. } => "ESCAPE_INVALID",
            UnescapeError::InvalidCodepoint { .. } => "INVALID_CODEPOINT",
        }
    }

    #[must_use]
    pub const fn offset(self) -> usize {
        match self {
            UnescapeError::InvalidEscape { offset } | UnescapeError::InvalidCodepoint { offset } => {
                offset
            }
        }
    }
}
