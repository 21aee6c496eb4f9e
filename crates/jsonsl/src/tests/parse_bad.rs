use rstest::rstest;

use super::utils::{trace, trace_chunked};
use crate::LexError;

#[rstest]
#[case::value_missing(br#"{"a":}"#, LexError::StrayToken, 5)]
#[case::colon_missing(br#"{"a" 1}"#, LexError::MissingToken, 5)]
#[case::trailing_comma_list(b"[1,]", LexError::StrayToken, 3)]
#[case::trailing_comma_object(br#"{"a":1,}"#, LexError::StrayToken, 7)]
#[case::leading_comma(b"[,1]", LexError::StrayToken, 1)]
#[case::double_colon(br#"{"a"::1}"#, LexError::StrayToken, 5)]
#[case::key_without_value(br#"{"a"}"#, LexError::StrayToken, 4)]
#[case::number_key(b"{1:2}", LexError::StrayToken, 1)]
#[case::comma_missing_object(br#"{"a":1 "b":2}"#, LexError::StrayToken, 7)]
#[case::string_after_literal(br#"[1"a"]"#, LexError::StrayToken, 2)]
#[case::root_separator(b"1,2", LexError::StrayToken, 1)]
#[case::comma_missing_list(b"[1 2]", LexError::MissingToken, 3)]
#[case::object_closed_by_bracket(b"{]", LexError::BracketMismatch, 1)]
#[case::list_closed_by_brace(b"[}", LexError::BracketMismatch, 1)]
#[case::key_closed_by_bracket(br#"{"a"]"#, LexError::BracketMismatch, 4)]
#[case::close_at_root(b"]", LexError::BracketMismatch, 0)]
#[case::extra_close(br#"{"a":1}]"#, LexError::BracketMismatch, 7)]
#[case::root_string(br#""abc""#, LexError::StringOutsideContainer, 0)]
#[case::backslash_outside(b"[\\", LexError::EscapeOutsideString, 1)]
#[case::colon_in_list(b"[1:2]", LexError::KeyOutsideObject, 2)]
#[case::colon_at_root(b":", LexError::KeyOutsideObject, 0)]
#[case::bare_word(b"[x]", LexError::SpecialExpected, 1)]
#[case::plus_sign(b"[+1]", LexError::SpecialExpected, 1)]
#[case::second_root(b"{}{}", LexError::CantInsert, 2)]
#[case::second_root_literal(b"[1]2", LexError::CantInsert, 3)]
#[case::container_as_key(b"{{}}", LexError::CantInsert, 1)]
#[case::high_byte_outside(b"[\xc3\xa9]", LexError::GarbageTrailing, 1)]
#[case::nul_in_string(b"[\"a\0\"]", LexError::FoundNullByte, 3)]
fn rejects(#[case] input: &[u8], #[case] expected: LexError, #[case] pos: usize) {
    let (whole, result) = trace(input);
    assert_eq!(result, Err(expected));
    assert_eq!(whole.errors, [(expected, pos)]);

    let bytewise: alloc::vec::Vec<usize> = (0..input.len()).collect();
    let (chunked, result) = trace_chunked(input, &bytewise);
    assert_eq!(result, Err(expected));
    assert_eq!(chunked.errors, whole.errors);
}

#[test]
fn error_names_are_stable() {
    let names: alloc::vec::Vec<_> = LexError::ALL.iter().map(|e| e.as_str()).collect();
    assert_eq!(
        names,
        [
            "GARBAGE_TRAILING",
            "STRAY_TOKEN",
            "MISSING_TOKEN",
            "CANT_INSERT",
            "ESCAPE_OUTSIDE_STRING",
            "KEY_OUTSIDE_OBJECT",
            "STRING_OUTSIDE_CONTAINER",
            "FOUND_NULL_BYTE",
            "LEVELS_EXCEEDED",
            "BRACKET_MISMATCH",
            "SPECIAL_EXPECTED",
        ]
    );
}
