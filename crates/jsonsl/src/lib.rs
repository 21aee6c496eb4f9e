//! A stacked, streaming JSON lexer.
//!
//! [`Lexer`] reads JSON text one byte at a time, in chunks of any size, and
//! reports structure through [`Callbacks`]: every object, list, key, string
//! and literal produces a push when it opens and a pop when it closes, with
//! absolute byte positions. Nothing is decoded or allocated per value; the
//! caller reads whatever it needs from its own buffers using the reported
//! spans.
//!
//! [`JsonPointer`]s select elements by path (`/store/book/0/title`, with `^`
//! as a wildcard). Attach them to a lexer through a [`MatchSession`] and each
//! pushed frame carries its [`Match`] state, so selected elements can be
//! picked out of a stream without building a tree.
//!
//! ```rust
//! use jsonsl::{Callbacks, Context, JsonPointer, LexError, Lexer, Match, Recovery};
//!
//! #[derive(Default)]
//! struct Titles(Vec<String>);
//!
//! impl Callbacks for Titles {
//!     fn pop(&mut self, cx: &mut Context<'_, ()>) {
//!         if cx.path_match().0 == Match::Complete {
//!             let text = cx.popped_bytes().unwrap();
//!             self.0.push(String::from_utf8_lossy(text).into_owned());
//!         }
//!     }
//!
//!     fn error(&mut self, err: LexError, _cx: &mut Context<'_, ()>) -> Recovery {
//!         panic!("malformed input: {err}");
//!     }
//! }
//!
//! let mut lexer: Lexer = Lexer::new(32);
//! lexer.enable_all_callbacks();
//! lexer.attach_paths([JsonPointer::parse("/books/^/title")?]);
//!
//! let mut titles = Titles::default();
//! lexer.feed(br#"{"books": [{"title": "Dune"}, {"title": "Emma", "year": 1815}]}"#, &mut titles)?;
//! assert_eq!(titles.0, ["Dune", "Emma"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod error;
mod frame;
mod lexer;
mod options;
mod pointer;
pub mod special;
mod unescape;

#[cfg(test)]
mod tests;

pub use error::{LexError, PointerError, UnescapeError, error_name};
pub use frame::{Action, Frame, FrameType, type_name};
pub use lexer::{Callbacks, Context, Feed, Lexer, Recovery};
pub use options::{LexerOptions, TypeSet};
pub use pointer::{Component, JsonPointer, Key, Match, MatchSession, WILDCARD};
pub use special::Special;
pub use unescape::{EscapeTable, Unescaped, unescape};
