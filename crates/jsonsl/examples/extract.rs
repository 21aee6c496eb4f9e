//! Prints the elements of a JSON document selected by one or more pointers.
//!
//! ```text
//! cargo run --example extract -- data.json /store/book/^/title /store/bicycle
//! cat data.json | cargo run --example extract -- - /store/book/0
//! ```
//!
//! The input is read and lexed in fixed-size chunks; only the bytes of
//! elements being extracted are kept.
#![allow(missing_docs)]

use std::{
    env,
    error::Error,
    fs::File,
    io::{self, Read, Write},
    ops::Range,
    process::ExitCode,
};

use jsonsl::{Callbacks, Context, Feed, JsonPointer, LexError, Lexer, Match, Recovery};

const CHUNK: usize = 64 * 1024;

struct Found {
    pointer: usize,
    span: Range<usize>,
    text: Vec<u8>,
}

/// Bytes of a selected element that began in an earlier chunk.
struct Capture {
    level: usize,
    start: usize,
    bytes: Vec<u8>,
}

impl Capture {
    fn end(&self) -> usize {
        self.start + self.bytes.len()
    }

    /// Appends the bytes of `chunk`, which begins at `chunk_start`, that are
    /// not yet captured and lie before `until`.
    fn extend(&mut self, chunk: &[u8], chunk_start: usize, until: usize) {
        if until > self.end() {
            let from = self.end() - chunk_start;
            self.bytes.extend_from_slice(&chunk[from..until - chunk_start]);
        }
    }
}

#[derive(Default)]
struct Extractor {
    capture: Option<Capture>,
    found: Vec<Found>,
}

impl Extractor {
    /// Keeps the rest of `chunk` if an element is still being captured.
    fn after_chunk(&mut self, chunk: &[u8], chunk_start: usize) {
        if let Some(capture) = &mut self.capture {
            capture.extend(chunk, chunk_start, chunk_start + chunk.len());
        }
    }
}

impl Callbacks for Extractor {
    fn push(&mut self, cx: &mut Context<'_, ()>) {
        if self.capture.is_none() && cx.path_match().0 == Match::Complete {
            self.capture = Some(Capture {
                level: cx.level(),
                start: cx.pos(),
                bytes: Vec::new(),
            });
        }
    }

    fn pop(&mut self, cx: &mut Context<'_, ()>) {
        let (Match::Complete, Some(pointer)) = cx.path_match() else {
            return;
        };
        let span = cx.frame().content_span();

        let text = match (cx.popped_bytes(), &mut self.capture) {
            (Some(bytes), _) => bytes.to_vec(),
            (None, Some(capture)) => {
                capture.extend(cx.chunk(), cx.pos() - cx.offset(), span.end);
                capture.bytes[span.start - capture.start..span.end - capture.start].to_vec()
            }
            (None, None) => Vec::new(),
        };

        if self.capture.as_ref().is_some_and(|c| c.level == cx.level()) {
            self.capture = None;
        }
        self.found.push(Found { pointer, span, text });
    }

    fn error(&mut self, _err: LexError, _cx: &mut Context<'_, ()>) -> Recovery {
        Recovery::Stop
    }
}

/// Lexes `input` in chunks of `chunk_size` bytes and writes one line per
/// element selected by `pointers` to `out`.
fn extract<R: Read, W: Write>(
    mut input: R,
    pointers: &[String],
    chunk_size: usize,
    mut out: W,
) -> Result<(), Box<dyn Error>> {
    let compiled = pointers
        .iter()
        .map(|p| JsonPointer::parse(p).map_err(|err| format!("{p}: {err}")))
        .collect::<Result<Vec<_>, _>>()?;

    let mut lexer: Lexer = Lexer::new(512);
    lexer.enable_all_callbacks();
    lexer.options_mut().allow_multiple_values = true;
    lexer.attach_paths(compiled);

    let mut extractor = Extractor::default();
    let mut buf = vec![0; chunk_size];
    let mut at_end = false;
    while !at_end {
        let mut n = input.read(&mut buf)?;
        if n == 0 {
            // A root literal is only closed by the byte after it.
            buf[0] = b'\n';
            n = 1;
            at_end = true;
        }
        let chunk = &buf[..n];
        match lexer.feed(chunk, &mut extractor) {
            Ok(Feed::Complete) => {}
            Ok(Feed::UnicodeEscape { .. }) => unreachable!("early return is disabled"),
            Err(err) => return Err(format!("{err} at byte {}", lexer.pos()).into()),
        }
        extractor.after_chunk(chunk, lexer.pos() - n);

        for found in extractor.found.drain(..) {
            write!(
                out,
                "{}\t{}..{}\t",
                pointers[found.pointer], found.span.start, found.span.end
            )?;
            out.write_all(&found.text)?;
            out.write_all(b"\n")?;
        }
    }

    if lexer.level() > 0 {
        return Err(format!("document ends inside {} open values", lexer.level()).into());
    }
    Ok(())
}

fn run(path: &str, pointers: &[String]) -> Result<(), Box<dyn Error>> {
    let input: Box<dyn Read> = if path == "-" {
        Box::new(io::stdin().lock())
    } else {
        Box::new(File::open(path)?)
    };
    extract(input, pointers, CHUNK, io::stdout().lock())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let [path, pointers @ ..] = args.as_slice() else {
        eprintln!("usage: extract <FILE|-> <POINTER>...");
        return ExitCode::FAILURE;
    };
    if pointers.is_empty() {
        eprintln!("usage: extract <FILE|-> <POINTER>...");
        return ExitCode::FAILURE;
    }

    match run(path, pointers) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("extract: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(input: &str, pointers: &[&str], chunk_size: usize) -> String {
        let pointers: Vec<String> = pointers.iter().map(|p| (*p).to_owned()).collect();
        let mut out = Vec::new();
        extract(input.as_bytes(), &pointers, chunk_size, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn root_literal_without_trailing_newline() {
        assert_eq!(lines("42", &["/"], CHUNK), "/\t0..2\t42\n");
        assert_eq!(lines("42", &["/"], 1), "/\t0..2\t42\n");
    }

    #[test]
    fn captures_span_chunks() {
        let doc = r#"{"a": [1, "xyz"]}"#;
        assert_eq!(lines(doc, &["/a"], 3), "/a\t6..16\t[1, \"xyz\"]\n");
        assert_eq!(lines(doc, &["/a/1"], 4), "/a/1\t11..14\txyz\n");
    }

    #[test]
    fn unterminated_documents_are_reported() {
        let pointers = ["/a".to_owned()];
        let err = extract(&b"{\"a\": ["[..], &pointers, CHUNK, Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "document ends inside 2 open values");
    }
}
