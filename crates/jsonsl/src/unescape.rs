//! Decoding of escape sequences in raw string spans.
//!
//! The lexer reports strings as byte spans of the input, escapes included.
//! [`unescape`] turns such a span into its decoded bytes, decoding only the
//! escape letters the caller enables in an [`EscapeTable`].

use alloc::vec::Vec;

use crate::error::UnescapeError;

/// The letters that may follow a `\` in JSON.
const JSON_ESCAPES: [u8; 9] = [b'"', b'\\', b'/', b'b', b'f', b'n', b'r', b't', b'u'];

/// Which escape letters [`unescape`] decodes. Escapes whose letter is not
/// enabled are copied through unchanged.
///
/// # Default
///
/// Every JSON escape letter is enabled.
#[derive(Clone, PartialEq, Eq)]
pub struct EscapeTable([bool; 256]);

impl EscapeTable {
    /// A table that decodes nothing.
    #[must_use]
    pub const fn none() -> Self {
        Self([false; 256])
    }

    /// A table that decodes every JSON escape.
    #[must_use]
    pub const fn json() -> Self {
        let mut table = Self::none();
        let mut i = 0;
        while i < JSON_ESCAPES.len() {
            table.0[JSON_ESCAPES[i] as usize] = true;
            i += 1;
        }
        table
    }

    #[must_use]
    pub const fn with(mut self, letter: u8) -> Self {
        self.0[letter as usize] = true;
        self
    }

    pub fn enable(&mut self, letter: u8) {
        self.0[usize::from(letter)] = true;
    }

    pub fn disable(&mut self, letter: u8) {
        self.0[usize::from(letter)] = false;
    }

    #[must_use]
    pub fn is_enabled(&self, letter: u8) -> bool {
        self.0[usize::from(letter)]
    }
}

impl Default for EscapeTable {
    fn default() -> Self {
        Self::json()
    }
}

impl core::fmt::Debug for EscapeTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let letters = (0..=u8::MAX).filter(|b| self.is_enabled(*b)).map(char::from);
        f.debug_set().entries(letters).finish()
    }
}

/// Summary of a successful [`unescape`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Unescaped {
    /// Number of bytes appended to the output.
    pub len: usize,
    /// Whether any appended byte is above `0x7F`.
    pub non_ascii: bool,
}

/// Appends the decoded form of `input` to `out`.
///
/// Each `\` must be followed by a JSON escape letter. Letters enabled in
/// `table` are decoded, `\uXXXX` to UTF-8 with surrogate pairs combined;
/// the others are copied as they are.
///
/// # Errors
///
/// [`UnescapeError::InvalidEscape`] for an unknown letter, a trailing `\` or
/// a `\u` without four hex digits, and [`UnescapeError::InvalidCodepoint`]
/// for an unpaired surrogate. Nothing is appended to `out` on error.
///
/// ```rust
/// use jsonsl::{EscapeTable, unescape};
///
/// let mut out = Vec::new();
/// let done = unescape(br"caf\u00e9\n", &mut out, &EscapeTable::json()).unwrap();
/// assert_eq!(out, "café\n".as_bytes());
/// assert_eq!(done.len, 6);
/// assert!(done.non_ascii);
/// ```
pub fn unescape(input: &[u8], out: &mut Vec<u8>, table: &EscapeTable) -> Result<Unescaped, UnescapeError> {
    let start = out.len();
    if let Err(err) = decode(input, out, table) {
        log::trace!("unescape failed: {err}");
        out.truncate(start);
        return Err(err);
    }
    let appended = &out[start..];
    Ok(Unescaped {
        len: appended.len(),
        non_ascii: !appended.is_ascii(),
    })
}

fn decode(input: &[u8], out: &mut Vec<u8>, table: &EscapeTable) -> Result<(), UnescapeError> {
    out.reserve(input.len());
    let mut i = 0;
    while let Some(rest) = input.get(i..).filter(|rest| !rest.is_empty()) {
        let Some(backslash) = rest.iter().position(|b| *b == b'\\') else {
            out.extend_from_slice(rest);
            break;
        };
        out.extend_from_slice(&rest[..backslash]);
        i += backslash;

        let letter = match input.get(i + 1) {
            Some(letter) if JSON_ESCAPES.contains(letter) => *letter,
            _ => return Err(UnescapeError::InvalidEscape { offset: i }),
        };
        if !table.is_enabled(letter) {
            out.extend_from_slice(&input[i..i + 2]);
            i += 2;
            continue;
        }

        let decoded = match letter {
            b'b' => 0x08,
            b'f' => 0x0c,
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'u' => {
                let (ch, used) = decode_unicode(input, i)?;
                let mut buf = [0; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                i += used;
                continue;
            }
            other => other,
        };
        out.push(decoded);
        i += 2;
    }
    Ok(())
}

/// Decodes the `\uXXXX` (or surrogate pair) at `at`, returning the character
/// and the number of input bytes it used.
fn decode_unicode(input: &[u8], at: usize) -> Result<(char, usize), UnescapeError> {
    let first = hex4(input, at + 2).ok_or(UnescapeError::InvalidEscape { offset: at })?;
    let unpaired = UnescapeError::InvalidCodepoint { offset: at };

    let (code, used) = match first {
        0xD800..=0xDBFF => {
            if input.get(at + 6..at + 8) != Some(&b"\\u"[..]) {
                return Err(unpaired);
            }
            let second = hex4(input, at + 8).ok_or(UnescapeError::InvalidEscape { offset: at + 6 })?;
            if !(0xDC00..=0xDFFF).contains(&second) {
                return Err(unpaired);
            }
            (0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00), 12)
        }
        0xDC00..=0xDFFF => return Err(unpaired),
        _ => (first, 6),
    };
    char::from_u32(code).map(|ch| (ch, used)).ok_or(unpaired)
}

fn hex4(input: &[u8], at: usize) -> Option<u32> {
    input
        .get(at..at + 4)?
        .iter()
        .try_fold(0, |acc, b| Some((acc << 4) | char::from(*b).to_digit(16)?))
}
