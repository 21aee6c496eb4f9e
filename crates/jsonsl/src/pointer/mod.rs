//! JSON Pointer style selectors, compiled once and matched level by level
//! against the lexer's stack.
//!
//! A pointer such as `/users/^/name` is a `/`-separated list of components.
//! Each component is one of:
//! - a literal key, percent-decoded (`/a%2Fb` selects the key `a/b`),
//! - a non-negative array index (`/items/0`),
//! - the wildcard `^`, which matches any key or index at its level.
//!
//! Component 0 is always the root. Matching never looks at more than one
//! level at a time: [`JsonPointer::matches`] is asked whether the child of a
//! frame at `parent_level`, reached through `key`, is still on the pointer's
//! path, and [`MatchSession`] keeps the answers for many pointers at once.

mod session;


use alloc::{boxed::Box, string::String, vec::Vec};
use core::{fmt, str::FromStr};

use bstr::BStr;
pub use session::MatchSession;

use crate::{error::PointerError, frame::FrameType};

/// The component that matches any key or index.
pub const WILDCARD: u8 = b'^';

/// One step of a compiled pointer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Component {
    /// The document itself; always the first component.
    Root,
    /// A decoded object key.
    Literal(Box<[u8]>),
    /// An array index.
    Index(usize),
    /// `^`: any key or index.
    Wildcard,
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Root => f.write_str("Root"),
            Component::Literal(key) => f.debug_tuple("Literal").field(&BStr::new(key)).finish(),
            Component::Index(i) => f.debug_tuple("Index").field(i).finish(),
            Component::Wildcard => f.write_str("Wildcard"),
        }
    }
}

/// How a child element is reached from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// The raw bytes of the key, for children of objects.
    Name(&'a [u8]),
    /// The element index, for children of lists.
    Index(usize),
}

/// Outcome of matching one level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Match {
    #[default]
    NoMatch,
    /// Matches so far; more components remain.
    Possible,
    /// Matches, and this was the last component.
    Complete,
}

impl Match {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Match::NoMatch => "NOMATCH",
            Match::Possible => "POSSIBLE",
            Match::Complete => "COMPLETE",
        }
    }
}

/// A compiled pointer expression.
///
/// Owns its decoded keys and the text it was compiled from; clones share
/// nothing with the original.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsonPointer {
    text: String,
    components: Vec<Component>,
}

impl JsonPointer {
    /// Compiles `text`.
    ///
    /// # Errors
    ///
    /// [`PointerError::NoRoot`] if `text` does not start with `/`,
    /// [`PointerError::DupSlash`] if it contains `//`, and
    /// [`PointerError::PercentBadHex`] for a `%` not followed by two hex
    /// digits.
    ///
    /// ```rust
    /// use jsonsl::{Component, JsonPointer};
    ///
    /// let ptr = JsonPointer::parse("/store/0/^").unwrap();
    /// assert_eq!(ptr.components()[2], Component::Index(0));
    /// assert_eq!(ptr.components()[3], Component::Wildcard);
    /// ```
    pub fn parse(text: &str) -> Result<Self, PointerError> {
        let result = Self::compile(text);
        match &result {
            Ok(ptr) => log::debug!("compiled pointer {text:?} into {} components", ptr.len()),
            Err(err) => log::debug!("rejected pointer {text:?}: {err}"),
        }
        result
    }

    fn compile(text: &str) -> Result<Self, PointerError> {
        let Some(body) = text.strip_prefix('/') else {
            return Err(PointerError::NoRoot);
        };
        if text.contains("//") {
            return Err(PointerError::DupSlash);
        }
        let body = body.strip_suffix('/').unwrap_or(body);

        let mut components = Vec::with_capacity(body.split('/').count() + 1);
        components.push(Component::Root);
        if !body.is_empty() {
            for segment in body.split('/') {
                components.push(Self::component(segment)?);
            }
        }

        Ok(Self {
            text: String::from(text),
            components,
        })
    }

    fn component(segment: &str) -> Result<Component, PointerError> {
        if matches!(segment.as_bytes(), [WILDCARD]) {
            return Ok(Component::Wildcard);
        }
        if segment.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = segment.parse() {
                return Ok(Component::Index(index));
            }
        }
        percent_decode(segment.as_bytes()).map(Component::Literal)
    }

    /// The text this pointer was compiled from.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Number of components, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Never true: every pointer has a root component.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Whether this pointer selects the whole document.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.components.len() == 1
    }

    /// Matches the child of a frame of type `parent_type` at `parent_level`,
    /// reached through `key`.
    ///
    /// Level 0 is the sentinel below the document, so the document's root
    /// value is matched with `parent_level == 0`.
    #[must_use]
    pub fn matches(&self, parent_type: FrameType, parent_level: usize, key: Key<'_>) -> Match {
        let Some(component) = self.components.get(parent_level) else {
            return Match::NoMatch;
        };

        let hit = match component {
            Component::Root | Component::Wildcard => true,
            Component::Index(index) => {
                parent_type == FrameType::List && key == Key::Index(*index)
            }
            Component::Literal(name) => key == Key::Name(name),
        };

        if !hit {
            Match::NoMatch
        } else if parent_level + 1 == self.components.len() {
            Match::Complete
        } else {
            Match::Possible
        }
    }
}

fn percent_decode(segment: &[u8]) -> Result<Box<[u8]>, PointerError> {
    fn hex(b: u8) -> Result<u8, PointerError> {
        match b {
            b'0'..=b'9' => Ok(b - b'0'),
            b'a'..=b'f' => Ok(b - b'a' + 10),
            b'A'..=b'F' => Ok(b - b'A' + 10),
            _ => Err(PointerError::PercentBadHex),
        }
    }

    let mut out = Vec::with_capacity(segment.len());
    let mut bytes = segment.iter().copied();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hi = bytes.next().ok_or(PointerError::PercentBadHex)?;
            let lo = bytes.next().ok_or(PointerError::PercentBadHex)?;
            out.push((hex(hi)? << 4) | hex(lo)?);
        } else {
            out.push(b);
        }
    }
    Ok(out.into_boxed_slice())
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonPointer")
            .field("text", &self.text)
            .field("components", &self.components)
            .finish()
    }
}
