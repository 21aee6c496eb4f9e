#![expect(missing_docs)]

use std::sync::Arc;

use jsonsl::{Callbacks, Context, FrameType, JsonPointer, LexError, Lexer, Match, Recovery};
use rstest::rstest;

const STORE: &str = r#"{"store": {"book": [{"title": "Dune", "price": 9}, {"title": "Emma", "price": 12}], "bicycle": {"color": "red"}}}"#;

/// Collects the text of every element that completes a pointer, with the
/// pointer's index.
struct Extract<'a> {
    input: &'a [u8],
    found: Vec<(usize, String)>,
}

impl Callbacks for Extract<'_> {
    fn pop(&mut self, cx: &mut Context<'_, ()>) {
        if let (Match::Complete, Some(index)) = cx.path_match() {
            let text = &self.input[cx.frame().content_span()];
            self.found.push((index, String::from_utf8_lossy(text).into_owned()));
        }
    }

    fn error(&mut self, err: LexError, cx: &mut Context<'_, ()>) -> Recovery {
        panic!("{err} at byte {}", cx.pos());
    }
}

fn lexer_for(pointers: &[&str]) -> Lexer {
    let mut lexer: Lexer = Lexer::new(16);
    lexer.enable_all_callbacks();
    let compiled = pointers.iter().map(|p| JsonPointer::parse(p).expect("valid pointer"));
    lexer.attach_paths(compiled);
    lexer
}

fn extract(input: &str, pointers: &[&str], chunk: usize) -> Vec<(usize, String)> {
    let mut lexer = lexer_for(pointers);
    let mut extract = Extract {
        input: input.as_bytes(),
        found: Vec::new(),
    };
    for part in input.as_bytes().chunks(chunk) {
        lexer.feed(part, &mut extract).expect("lexes");
    }
    extract.found
}

fn found(items: &[(usize, &str)]) -> Vec<(usize, String)> {
    items.iter().map(|(i, s)| (*i, (*s).to_owned())).collect()
}

#[rstest]
fn extracts_in_any_chunking(#[values(1, 2, 5, 13, usize::MAX)] chunk: usize) {
    let pointers = ["/store/book/^/title", "/store/book/1", "/store/bicycle/color"];
    assert_eq!(
        extract(STORE, &pointers, chunk),
        found(&[
            (0, "Dune"),
            (0, "Emma"),
            (1, r#"{"title": "Emma", "price": 12}"#),
            (2, "red"),
        ])
    );
}

#[rstest]
#[case::root("/", "[1, 2]", &[(0, "[1, 2]")])]
#[case::index_of_each_list("/^/0", "[[1, 2], [3], []]", &[(0, "1"), (0, "3")])]
#[case::index_is_not_a_key("/0", r#"{"0": 1}"#, &[])]
#[case::percent_decoded_key("/a%2Fb", r#"{"a/b": true, "a": {"b": false}}"#, &[(0, "true")])]
#[case::trailing_slash("/a/", r#"{"a": null}"#, &[(0, "null")])]
#[case::every_key("/^", r#"{"x": "1", "y": [2]}"#, &[(0, "1"), (0, "[2]")])]
#[case::too_deep("/a/b/c", r#"{"a": {"b": 1}}"#, &[])]
#[case::escaped_key_is_raw("/a\\n", r#"{"a\n": 1, "a\\n": 2}"#, &[(0, "1")])]
fn single_pointer(#[case] pointer: &str, #[case] input: &str, #[case] expected: &[(usize, &str)]) {
    assert_eq!(extract(input, &[pointer], usize::MAX), found(expected));
    assert_eq!(extract(input, &[pointer], 1), found(expected));
}

#[test]
fn frames_on_the_path_are_possible() {
    #[derive(Default)]
    struct States(Vec<(usize, Match)>);

    impl Callbacks for States {
        fn push(&mut self, cx: &mut Context<'_, ()>) {
            if cx.frame().ty() != FrameType::HKey {
                self.0.push((cx.level(), cx.path_match().0));
            }
        }

        fn error(&mut self, err: LexError, _cx: &mut Context<'_, ()>) -> Recovery {
            panic!("{err}");
        }
    }

    let mut lexer = lexer_for(&["/a/b"]);
    let mut states = States::default();
    lexer
        .feed(br#"{"a": {"b": 1, "c": 2}, "d": 3}"#, &mut states)
        .expect("lexes");
    assert_eq!(
        states.0,
        [
            (1, Match::Possible),
            (2, Match::Possible),
            (3, Match::Complete),
            (3, Match::NoMatch),
            (2, Match::NoMatch),
        ]
    );
}

#[test]
fn candidates_follow_the_stream() {
    let mut lexer = lexer_for(&["/a/b", "/^/c", "/d"]);
    let doc = br#"{"a": {"b": 1}, "d": {"#;
    let (head, tail) = doc.split_at(7);
    let mut extract = Extract {
        input: doc,
        found: Vec::new(),
    };

    lexer.feed(head, &mut extract).expect("lexes");
    let session = lexer.session().expect("attached");
    assert_eq!(session.candidates(1).collect::<Vec<_>>(), [0, 1, 2]);
    assert_eq!(session.candidates(2).collect::<Vec<_>>(), [0, 1]);

    lexer.feed(tail, &mut extract).expect("lexes");
    assert_eq!(extract.found, found(&[(0, "1")]));
    let session = lexer.session().expect("attached");
    assert_eq!(session.candidates(2).collect::<Vec<_>>(), [1]);
    assert_eq!(session.candidates(3).count(), 0);
}

#[test]
fn pointers_are_shared_between_lexers() {
    let titles = Arc::new(JsonPointer::parse("/store/book/^/title").expect("valid pointer"));

    let mut results = Vec::new();
    for _ in 0..2 {
        let mut lexer: Lexer = Lexer::new(16);
        lexer.enable_all_callbacks();
        lexer.attach_paths([Arc::clone(&titles)]);
        let mut extract = Extract {
            input: STORE.as_bytes(),
            found: Vec::new(),
        };
        lexer.feed(STORE.as_bytes(), &mut extract).expect("lexes");
        results.push(extract.found);
    }
    assert_eq!(results[0], results[1]);
    assert_eq!(Arc::strong_count(&titles), 1);
}

#[test]
fn sessions_survive_reset() {
    let mut lexer = lexer_for(&["/k"]);
    for doc in [r#"{"k": "first"}"#, r#"{"j": 0, "k": "second"}"#] {
        let mut extract = Extract {
            input: doc.as_bytes(),
            found: Vec::new(),
        };
        lexer.feed(doc.as_bytes(), &mut extract).expect("lexes");
        assert!(lexer.is_complete());
        assert_eq!(extract.found.len(), 1);
        lexer.reset();
    }
    assert!(lexer.session().is_some());
}

#[test]
fn replacing_the_session() {
    let mut lexer = lexer_for(&["/old"]);
    let previous = lexer.attach_paths([JsonPointer::parse("/new").expect("valid pointer")]);
    assert_eq!(previous.expect("was attached").paths()[0].as_str(), "/old");

    let doc = r#"{"old": 1, "new": 2}"#;
    let mut extract = Extract {
        input: doc.as_bytes(),
        found: Vec::new(),
    };
    lexer.feed(doc.as_bytes(), &mut extract).expect("lexes");
    assert_eq!(extract.found, found(&[(0, "2")]));
}
