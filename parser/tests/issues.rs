mod common;

use common::{run_parser, run_parser_to_tree, run_parser_with_spans};
use yarrow_parser::Event;

#[test]
fn test_nested_flow_sequence_in_single_pair() {
    // The closing `]` of the inner sequence must not be taken for the end of the outer one, where
    // the single pair mapping starts.
    assert_eq!(
        run_parser_to_tree("[a: [42]]").unwrap(),
        [
            "+STR", "+DOC", "+SEQ []", "+MAP {}", "=VAL :a", "+SEQ []", "=VAL :42", "-SEQ",
            "-MAP", "-SEQ", "-DOC", "-STR"
        ]
    );
    assert_eq!(
        run_parser_to_tree("[{a: [42]}]").unwrap(),
        [
            "+STR", "+DOC", "+SEQ []", "+MAP {}", "=VAL :a", "+SEQ []", "=VAL :42", "-SEQ",
            "-MAP", "-SEQ", "-DOC", "-STR"
        ]
    );
    assert_eq!(
        run_parser_to_tree("- a:\n  - 42\n").unwrap(),
        [
            "+STR", "+DOC", "+SEQ", "+MAP", "=VAL :a", "+SEQ", "=VAL :42", "-SEQ", "-MAP",
            "-SEQ", "-DOC", "-STR"
        ]
    );
}

#[test]
fn test_quoted_key_without_space_before_value() {
    assert_eq!(
        run_parser_to_tree(r#"["a":[]]"#).unwrap(),
        [
            "+STR", "+DOC", "+SEQ []", "+MAP {}", "=VAL \"a", "+SEQ []", "-SEQ", "-MAP",
            "-SEQ", "-DOC", "-STR"
        ]
    );
}

#[test]
fn test_unterminated_literal_in_sequence() {
    assert_eq!(
        run_parser_to_tree("---\n- |\n  a").unwrap(),
        ["+STR", "+DOC ---", "+SEQ", "=VAL |a", "-SEQ", "-DOC", "-STR"]
    );
}

#[test]
fn test_document_indicator_inside_flow_mapping() {
    // Both used to loop forever.
    let error = run_parser("{---").unwrap_err();
    assert_eq!(error.info(), "did not find expected ',' or '}'");
    assert_eq!(
        error.to_string(),
        "did not find expected ',' or '}' at char 4 line 1 column 5 \
         (while parsing a flow mapping at char 0 line 1 column 1)"
    );

    let error = run_parser("{...").unwrap_err();
    assert_eq!(error.info(), "did not find expected ',' or '}'");
    assert!(error
        .to_string()
        .starts_with("did not find expected ',' or '}' at char 4 line 1 column 5"));
}

#[test]
fn test_deeply_nested_folded_scalar() {
    let s = r"---
array:
  - object:
      array:
        - object:
            array:
              - text: >-
                  Line 1
                  Line 2
...";

    assert_eq!(
        run_parser_to_tree(s).unwrap(),
        [
            "+STR",
            "+DOC ---",
            "+MAP",
            "=VAL :array",
            "+SEQ",
            "+MAP",
            "=VAL :object",
            "+MAP",
            "=VAL :array",
            "+SEQ",
            "+MAP",
            "=VAL :object",
            "+MAP",
            "=VAL :array",
            "+SEQ",
            "+MAP",
            "=VAL :text",
            "=VAL >Line 1 Line 2",
            "-MAP",
            "-SEQ",
            "-MAP",
            "-MAP",
            "-SEQ",
            "-MAP",
            "-MAP",
            "-SEQ",
            "-MAP",
            "-DOC ...",
            "-STR"
        ]
    );
}

#[test]
fn test_ellipsis_inside_plain_scalar() {
    assert_eq!(
        run_parser_to_tree("comment: hello ... world").unwrap(),
        [
            "+STR",
            "+DOC",
            "+MAP",
            "=VAL :comment",
            "=VAL :hello ... world",
            "-MAP",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn test_fuzzed_inputs_do_not_panic() {
    // Lookahead requirements of line breaks inside plain scalars.
    let _ = run_parser("\u{1}'null\"\r\r\r\r\r\n\r\r\r\r");
    // Unbalanced implicit flow mappings.
    let raw_input: &[u8] = &[
        91, 91, 32, 101, 58, 9, 123, 63, 32, 45, 106, 101, 58, 9, 123, 63, 32, 44, 117, 101, 58, 9,
        123, 63, 32, 44, 9, 26, 58, 32, 126, 93, 8, 58, 32, 58, 10, 29, 58, 58, 58, 32, 58, 29, 63,
        32, 44, 9, 26, 58, 32, 126, 93, 8, 58, 32, 58, 10, 78, 32,
    ];
    let _ = run_parser(std::str::from_utf8(raw_input).unwrap());
    // Char and byte counts must not be mixed up in block scalars.
    let _ = run_parser("|\r \u{4b4}A");
}

/// The values of the scalars in `input`, in order.
fn scalars(input: &str) -> Vec<String> {
    run_parser(input)
        .unwrap()
        .into_iter()
        .filter_map(|ev| match ev {
            Event::Scalar { value, .. } => Some(value),
            _ => None,
        })
        .collect()
}

#[test]
fn test_top_level_block_scalar_with_crlf() {
    assert_eq!(scalars("|\nab\r\n\n"), ["ab\n"]);
    assert_eq!(scalars("|+\nab\r\n\r\n"), ["ab\n\n"]);
    assert_eq!(scalars(">\n- \r\n\n"), ["- \n"]);
    assert_eq!(scalars(">\n! \r\n\n"), ["! \n"]);
    assert_eq!(scalars("--- |\r\n  a\r\n  b\r\n"), ["a\nb\n"]);
}

#[test]
fn test_tab_after_detected_block_indentation() {
    assert_eq!(scalars("|\n \ta\n"), ["\ta\n"]);
    assert_eq!(scalars("- |\n   \ta\n   b\n"), ["\ta\nb\n"]);

    let error = run_parser("- |\n  a\n \tb\n").unwrap_err();
    assert_eq!(
        error.info(),
        "found a tab character where an indentation space is expected"
    );
}

#[test]
fn test_unicode_line_breaks() {
    assert_eq!(scalars("a: 1\u{85}b: 2"), ["a", "1", "b", "2"]);
    assert_eq!(scalars("a: 1\u{2028}b: 2\u{2029}"), ["a", "1", "b", "2"]);
    assert_eq!(scalars("- a # note\u{85}- b"), ["a", "b"]);

    let events = run_parser_with_spans("a: 1\u{85}b: 2").unwrap();
    let (_, span) = events
        .iter()
        .find(|(ev, _)| matches!(ev, Event::Scalar { value, .. } if value == "b"))
        .unwrap();
    assert_eq!(
        (span.start.index(), span.start.line(), span.start.col()),
        (5, 1, 0)
    );
}

#[test]
fn test_unicode_line_breaks_in_scalars() {
    // NEL folds like `\n`. LS and PS are kept.
    assert_eq!(scalars("'a\u{85}b'"), ["a b"]);
    assert_eq!(scalars("\"a\u{85}\u{85}b\""), ["a\nb"]);
    assert_eq!(scalars("[a\u{2028}  b]"), ["a\u{2028}b"]);
    assert_eq!(scalars("'a\u{2029}b'"), ["a\u{2029}b"]);
    assert_eq!(scalars("|\n a\u{2028} b\n"), ["a\u{2028}b\n"]);
    assert_eq!(scalars(">\n a\u{2028} b\n"), ["a\u{2028}b\n"]);
    assert_eq!(scalars(">\n a\u{85} b\n"), ["a b\n"]);
}
