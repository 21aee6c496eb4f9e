use core::fmt;

use crate::frame::FrameType;

/// A set of frame types, used to choose which frames produce callbacks.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TypeSet(u8);

impl TypeSet {
    pub const EMPTY: Self = Self(0);
    /// Every structural type. Does not include [`FrameType::UEscape`].
    pub const ALL: Self = Self::EMPTY
        .with(FrameType::String)
        .with(FrameType::HKey)
        .with(FrameType::Object)
        .with(FrameType::List)
        .with(FrameType::Special);

    const fn bit(ty: FrameType) -> u8 {
        match ty {
            FrameType::String => 1,
            FrameType::HKey => 1 << 1,
            FrameType::Object => 1 << 2,
            FrameType::List => 1 << 3,
            FrameType::Special => 1 << 4,
            FrameType::UEscape => 1 << 5,
            FrameType::Unknown => 0,
        }
    }

    #[must_use]
    pub const fn with(self, ty: FrameType) -> Self {
        Self(self.0 | Self::bit(ty))
    }

    #[must_use]
    pub const fn without(self, ty: FrameType) -> Self {
        Self(self.0 & !Self::bit(ty))
    }

    #[inline(always)]
    #[must_use]
    pub const fn contains(self, ty: FrameType) -> bool {
        self.0 & Self::bit(ty) != 0
    }

    pub fn insert(&mut self, ty: FrameType) {
        *self = self.with(ty);
    }

    pub fn remove(&mut self, ty: FrameType) {
        *self = self.without(ty);
    }
}

impl FromIterator<FrameType> for TypeSet {
    fn from_iter<I: IntoIterator<Item = FrameType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl fmt::Debug for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(FrameType::ALL.into_iter().filter(|ty| self.contains(*ty)))
            .finish()
    }
}

/// Configuration options for the lexer.
///
/// # Default
///
/// No callback types are enabled, callbacks fire at every depth and all
/// boolean options are `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexerOptions {
    /// Frame types whose push and pop produce callbacks. Include
    /// [`FrameType::UEscape`] to be called for each `\u` escape.
    ///
    /// # Default
    ///
    /// [`TypeSet::EMPTY`]
    pub callback_types: TypeSet,

    /// The deepest level that produces callbacks. Deeper frames are still
    /// lexed and validated.
    ///
    /// # Default
    ///
    /// `usize::MAX`
    pub max_callback_level: usize,

    /// Whether [`Lexer::feed`](crate::Lexer::feed) returns right after the `u`
    /// of a `\u` escape, so the caller can consume the four hex digits itself.
    ///
    /// # Default
    ///
    /// `false`
    pub return_uescape: bool,

    /// Whether a new top-level value may follow a completed one.
    ///
    /// When `true`, whitespace-separated (or adjacent) roots such as JSON
    /// Lines are accepted:
    ///
    /// ```json
    /// {"a":1}
    /// [2] 3
    /// ```
    ///
    /// # Default
    ///
    /// `false`
    pub allow_multiple_values: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            callback_types: TypeSet::EMPTY,
            max_callback_level: usize::MAX,
            return_uescape: false,
            allow_multiple_values: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_excludes_uescape() {
        assert!(TypeSet::ALL.contains(FrameType::Object));
        assert!(TypeSet::ALL.contains(FrameType::Special));
        assert!(!TypeSet::ALL.contains(FrameType::UEscape));
        assert!(!TypeSet::ALL.contains(FrameType::Unknown));
    }

    #[test]
    fn insert_and_remove() {
        let mut set: TypeSet = [FrameType::List, FrameType::HKey].into_iter().collect();
        assert!(set.contains(FrameType::List));
        set.remove(FrameType::List);
        assert!(!set.contains(FrameType::List));
        set.insert(FrameType::UEscape);
        assert_eq!(alloc::format!("{set:?}"), "{HKey, UEscape}");
    }
}
