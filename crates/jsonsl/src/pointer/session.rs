use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};

use super::{JsonPointer, Key, Match};
use crate::frame::FrameType;

/// Matches many pointers at once, one nesting level at a time.
///
/// The session keeps a row of candidate slots per level. Row 0 lists every
/// pointer; the row for level `L` lists the pointers that were still
/// [`Match::Possible`] for the most recently visited element at that level.
/// Each slot holds `1 + index` of a pointer, and a `0` ends the row.
///
/// Rows are only rebuilt when their level is visited. Every rebuild stamps
/// the row with a fresh serial and records the serial of the parent row it
/// was built from, so a deeper row left over from an earlier sibling is
/// recognised as stale instead of being cleared eagerly.
#[derive(Debug, Clone)]
pub struct MatchSession {
    paths: Vec<Arc<JsonPointer>>,
    levels: usize,
    table: Box<[usize]>,
    serials: Box<[u64]>,
    built_from: Box<[u64]>,
    next_serial: u64,
}

impl MatchSession {
    /// Builds a session for `paths` on a lexer with `levels` levels.
    ///
    /// ```rust
    /// use jsonsl::{FrameType, JsonPointer, Key, Match, MatchSession};
    ///
    /// let paths = ["/a", "/a/b"].map(|p| JsonPointer::parse(p).unwrap());
    /// let mut session = MatchSession::new(paths, 4);
    ///
    /// assert_eq!(session.match_state(1, FrameType::Unknown, Key::Name(b"")), (Match::Possible, None));
    /// assert_eq!(session.match_state(2, FrameType::Object, Key::Name(b"a")), (Match::Complete, Some(0)));
    /// assert_eq!(session.match_state(3, FrameType::Object, Key::Name(b"b")), (Match::Complete, Some(1)));
    /// ```
    ///
    /// # Panics
    ///
    /// If the table for `levels + 1` rows of `paths.len() + 1` slots does not
    /// fit in a `usize`.
    pub fn new<I>(paths: I, levels: usize) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Arc<JsonPointer>>,
    {
        let paths: Vec<Arc<JsonPointer>> = paths.into_iter().map(Into::into).collect();
        let width = paths.len() + 1;
        let Some(size) = levels.checked_add(1).and_then(|rows| rows.checked_mul(width)) else {
            panic!("match table for {} pointers over {levels} levels is too large", paths.len());
        };
        let mut table = vec![0; size].into_boxed_slice();
        for (slot, index) in table.iter_mut().zip(0..paths.len()) {
            *slot = index + 1;
        }
        log::debug!("match session: {} pointers over {levels} levels", paths.len());
        Self {
            paths,
            levels,
            table,
            serials: vec![0; levels + 1].into_boxed_slice(),
            built_from: vec![0; levels + 1].into_boxed_slice(),
            next_serial: 1,
        }
    }

    #[must_use]
    pub fn paths(&self) -> &[Arc<JsonPointer>] {
        &self.paths
    }

    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels
    }

    fn width(&self) -> usize {
        self.paths.len() + 1
    }

    /// Evaluates the element at `level`, a child of a `parent_type` frame
    /// reached through `key`.
    ///
    /// Rebuilds the row for `level` from the row for `level - 1` and returns
    /// the first pointer that completes here, if any. Pointers that complete
    /// do not stop the row from being filled: a longer pointer sharing the
    /// prefix stays live below this element. An empty parent row empties this
    /// row without evaluating anything.
    pub fn match_state(&mut self, level: usize, parent_type: FrameType, key: Key<'_>) -> (Match, Option<usize>) {
        if level == 0 || level > self.levels {
            return (Match::NoMatch, None);
        }

        let width = self.width();
        self.serials[level] = self.next_serial;
        self.built_from[level] = self.serials[level - 1];
        self.next_serial += 1;

        let (above, below) = self.table.split_at_mut(level * width);
        let parent = &above[(level - 1) * width..];
        let row = &mut below[..width];

        if parent[0] == 0 {
            row[0] = 0;
            return (Match::NoMatch, None);
        }

        let mut live = 0;
        let mut complete = None;
        for &slot in parent.iter().take_while(|slot| **slot != 0) {
            let index = slot - 1;
            match self.paths[index].matches(parent_type, level - 1, key) {
                Match::Possible => {
                    row[live] = slot;
                    live += 1;
                }
                Match::Complete if complete.is_none() => complete = Some(index),
                Match::Complete | Match::NoMatch => {}
            }
        }
        row[live] = 0;

        match complete {
            Some(index) => (Match::Complete, Some(index)),
            None if live > 0 => (Match::Possible, None),
            None => (Match::NoMatch, None),
        }
    }

    /// Indices of the pointers still live at `level`, for the element most
    /// recently evaluated there. Empty if the row is stale: a shallower level
    /// has been revisited since it was built.
    pub fn candidates(&self, level: usize) -> impl Iterator<Item = usize> + '_ {
        let width = self.width();
        let rows: &[usize] = if self.is_current(level) {
            &self.table[level * width..(level + 1) * width]
        } else {
            &[]
        };
        rows.iter().take_while(|slot| **slot != 0).map(|slot| slot - 1)
    }

    fn is_current(&self, level: usize) -> bool {
        if level > self.levels {
            return false;
        }
        (1..=level).all(|l| self.serials[l] != 0 && self.built_from[l] == self.serials[l - 1])
    }

    /// Forgets every row but the root one.
    pub fn reset(&mut self) {
        self.serials.fill(0);
        self.built_from.fill(0);
        self.next_serial = 1;
    }
}
