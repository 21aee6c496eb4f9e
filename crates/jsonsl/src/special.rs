//! Classification of the bytes that may open a literal.
//!
//! Literals (`true`, `false`, `null` and numbers) have no opening delimiter, so
//! the lexer decides whether a byte may start one by looking it up in a
//! constant 256-entry table. The same flag type doubles as the per-frame
//! classification reported to callbacks.

use core::{
    fmt,
    ops::{BitOr, BitOrAssign},
};

/// Bitmask of literal families a frame (or a byte) may belong to.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Special(u8);

impl Special {
    pub const NONE: Self = Self(0);
    /// A digit: the literal is a non-negative number.
    pub const UNSIGNED: Self = Self(1);
    /// A leading `-`: the literal is a negative number.
    pub const SIGNED: Self = Self(1 << 1);
    pub const TRUE: Self = Self(1 << 2);
    pub const FALSE: Self = Self(1 << 3);
    pub const NULL: Self = Self(1 << 4);
    /// Set on string and key frames whose content contains a byte above
    /// `0x7F`.
    pub const NONASCII: Self = Self(1 << 5);

    pub const NUMERIC: Self = Self(Self::UNSIGNED.0 | Self::SIGNED.0);
    pub const BOOLEAN: Self = Self(Self::TRUE.0 | Self::FALSE.0);

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any flag in `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Special {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Special {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Special {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Special, &str); 6] = [
            (Special::UNSIGNED, "UNSIGNED"),
            (Special::SIGNED, "SIGNED"),
            (Special::TRUE, "TRUE"),
            (Special::FALSE, "FALSE"),
            (Special::NULL, "NULL"),
            (Special::NONASCII, "NONASCII"),
        ];
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

static SPECIAL_TABLE: [Special; 256] = build_table();

const fn build_table() -> [Special; 256] {
    let mut table = [Special::NONE; 256];
    let mut digit = b'0';
    while digit <= b'9' {
        table[digit as usize] = Special::UNSIGNED;
        digit += 1;
    }
    table[b'-' as usize] = Special::SIGNED;
    table[b't' as usize] = Special::TRUE;
    table[b'f' as usize] = Special::FALSE;
    table[b'n' as usize] = Special::NULL;
    table
}

/// Returns the literal families `byte` may start; empty if it cannot start a
/// literal at all.
#[inline(always)]
#[must_use]
pub fn classify(byte: u8) -> Special {
    SPECIAL_TABLE[byte as usize]
}
