#![allow(clippy::bool_assert_comparison)]

mod common;

use common::{run_parser, run_parser_to_tree};
use yarrow_parser::{ErrorKind, Event, Implicit, Parser, ScalarStyle};

#[test]
fn test_fail() {
    let s = "
# syntax error
scalar
key: [1, 2]]
key1:a2
";
    let Err(error) = run_parser(s) else { panic!() };
    assert_eq!(
        error.info(),
        "mapping values are not allowed in this context"
    );
    assert_eq!(
        error.to_string(),
        "mapping values are not allowed in this context at char 26 line 4 column 4"
    );
    assert_eq!(error.kind(), ErrorKind::Scanner);
}

#[test]
fn test_empty_doc() {
    assert_eq!(run_parser_to_tree("").unwrap(), ["+STR", "-STR"]);

    assert_eq!(
        run_parser_to_tree("---").unwrap(),
        ["+STR", "+DOC ---", "=VAL :", "-DOC", "-STR"]
    );
}

#[test]
fn test_utf() {
    assert_eq!(
        run_parser_to_tree("a: 你好").unwrap(),
        ["+STR", "+DOC", "+MAP", "=VAL :a", "=VAL :你好", "-MAP", "-DOC", "-STR"]
    );
}

#[test]
fn test_comments() {
    let s = "
# This is a comment
a: b # This is another comment
##
  #
";

    assert_eq!(
        run_parser_to_tree(s).unwrap(),
        ["+STR", "+DOC", "+MAP", "=VAL :a", "=VAL :b", "-MAP", "-DOC", "-STR"]
    );
}

#[test]
fn test_quoting() {
    let s = "
- plain
- 'squote'
- \"dquote\"
";

    assert_eq!(
        run_parser_to_tree(s).unwrap(),
        [
            "+STR",
            "+DOC",
            "+SEQ",
            "=VAL :plain",
            "=VAL 'squote",
            "=VAL \"dquote",
            "-SEQ",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn test_multi_doc() {
    let s = "
a scalar
---
a scalar
---
a scalar
";
    assert_eq!(
        run_parser_to_tree(s).unwrap(),
        [
            "+STR",
            "+DOC",
            "=VAL :a scalar",
            "-DOC",
            "+DOC ---",
            "=VAL :a scalar",
            "-DOC",
            "+DOC ---",
            "=VAL :a scalar",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn test_github_27() {
    // https://github.com/chyh1990/yaml-rust/issues/27
    assert_eq!(
        run_parser_to_tree("&a").unwrap(),
        ["+STR", "+DOC", "=VAL &a :", "-DOC", "-STR"]
    );
}

#[test]
fn test_bad_hyphen() {
    // See: https://github.com/chyh1990/yaml-rust/issues/23
    assert!(run_parser("{-").is_err());
}

#[test]
fn test_issue_65() {
    // See: https://github.com/chyh1990/yaml-rust/issues/65
    let b = "\n\"ll\\\"ll\\\r\n\"ll\\\"ll\\\r\r\r\rU\r\r\rU";
    assert!(run_parser(b).is_err());
}

#[test]
fn test_issue_65_mwe() {
    // The error over there is that there is invalid trailing content after a double quoted
    // string.
    let b = r#""foo" l"#;
    let err = run_parser(b).unwrap_err();
    assert_eq!(err.info(), "invalid trailing content after quoted scalar");
}

#[test]
fn test_comment_after_tag() {
    let s = "
%YAML 1.1
# This is a comment
--- #-------
foobar";

    let events = run_parser(s).unwrap();
    assert_eq!(
        events[1],
        Event::DocumentStart {
            explicit: true,
            version: Some((1, 1)),
            tags: yarrow_parser::TagDirectives::new(),
        }
    );
    assert_eq!(
        run_parser_to_tree(s).unwrap(),
        ["+STR", "+DOC ---", "=VAL :foobar", "-DOC", "-STR"]
    );
}

#[test]
fn test_large_block_scalar_indent() {
    // Tests the `loop` fallback of `skip_block_scalar_indent`. The indent in the YAML string must
    // be greater than the size of the lookahead buffer. The second line is further indented with
    // spaces, and the resulting string should be "a\n    b".
    let s = "
a: |-
                  a
                      b
";

    assert_eq!(
        run_parser_to_tree(s).unwrap(),
        [
            "+STR",
            "+DOC",
            "+MAP",
            "=VAL :a",
            "=VAL |a\\n    b",
            "-MAP",
            "-DOC",
            "-STR"
        ]
    );
}

#[test]
fn test_bad_docstart() {
    run_parser("---This used to cause an infinite loop").unwrap();
    assert_eq!(
        run_parser_to_tree("----").unwrap(),
        ["+STR", "+DOC", "=VAL :----", "-DOC", "-STR"]
    );

    assert_eq!(
        run_parser_to_tree("--- #comment").unwrap(),
        ["+STR", "+DOC ---", "=VAL :", "-DOC", "-STR"]
    );

    assert_eq!(
        run_parser_to_tree("---- #comment").unwrap(),
        ["+STR", "+DOC", "=VAL :----", "-DOC", "-STR"]
    );
}

#[test]
fn test_indentation_equality() {
    let four_spaces = run_parser(
        r"
hash:
    with:
        indentations
",
    )
    .unwrap();

    let two_spaces = run_parser(
        r"
hash:
  with:
    indentations
",
    )
    .unwrap();

    let one_space = run_parser(
        r"
hash:
 with:
  indentations
",
    )
    .unwrap();

    let mixed_spaces = run_parser(
        r"
hash:
     with:
               indentations
",
    )
    .unwrap();

    assert_eq!(four_spaces, two_spaces);
    assert_eq!(four_spaces, one_space);
    assert_eq!(four_spaces, mixed_spaces);
}

#[test]
fn test_recursion_depth_check_objects() {
    let s = "{a:".repeat(10_000) + &"}".repeat(10_000);
    let err = run_parser(&s).unwrap_err();
    assert_eq!(err.info(), "recursion limit exceeded");
}

#[test]
fn test_recursion_depth_check_arrays() {
    let s = "[".repeat(10_000) + &"]".repeat(10_000);
    let err = run_parser(&s).unwrap_err();
    assert_eq!(err.info(), "recursion limit exceeded");
}

#[test]
fn test_crlf_line_breaks() {
    assert_eq!(
        run_parser("a: 1\r\nb: 2\r\n").unwrap(),
        run_parser("a: 1\nb: 2\n").unwrap()
    );
}

#[test]
fn test_leading_bom() {
    assert_eq!(
        run_parser_to_tree("\u{feff}a: 1").unwrap(),
        ["+STR", "+DOC", "+MAP", "=VAL :a", "=VAL :1", "-MAP", "-DOC", "-STR"]
    );
}

#[test]
fn test_implicit_flags() {
    let events = run_parser("- a\n- 'b'\n- !!str c\n- ! d\n").unwrap();
    let flags: Vec<_> = events
        .iter()
        .filter_map(|ev| match ev {
            Event::Scalar { implicit, .. } => Some((implicit.plain, implicit.quoted)),
            _ => None,
        })
        .collect();
    assert_eq!(
        flags,
        [(true, false), (false, true), (false, false), (true, false)]
    );
    assert_eq!(
        Implicit::for_scalar(None, ScalarStyle::Literal),
        Implicit {
            plain: false,
            quoted: true
        }
    );
}

#[test]
fn test_incompatible_version() {
    let err = run_parser("%YAML 2.0\n--- a").unwrap_err();
    assert_eq!(
        err.info(),
        "found incompatible YAML document (version 1.* is required, got 2.0)"
    );
    assert!(run_parser("%YAML 1.2\n--- a").is_ok());
}

#[test]
fn test_reserved_directive_is_ignored() {
    assert_eq!(
        run_parser_to_tree("%FOO bar baz\n--- a").unwrap(),
        ["+STR", "+DOC ---", "=VAL :a", "-DOC", "-STR"]
    );
}

#[test]
fn test_directive_needs_document_end() {
    let err = run_parser("a: 1\n%YAML 1.1\n---\nb\n").unwrap_err();
    assert_eq!(
        err.info(),
        "missing explicit document end marker before directive"
    );
    assert_eq!(err.kind(), ErrorKind::Parser);

    assert!(run_parser("a: 1\n...\n%YAML 1.1\n---\nb\n").is_ok());
}

#[test]
fn test_tag_directives_are_scoped_to_their_document() {
    let s = "%TAG !e! tag:example.com,2000:\n--- !e!a x\n...\n--- !e!b y\n";
    let err = run_parser(s).unwrap_err();
    assert_eq!(err.info(), "found undefined tag handle");
    assert_eq!(err.context().unwrap().0, "while parsing a node");

    let events: Vec<_> = Parser::new_from_str(s)
        .keep_tags(true)
        .map(|ev| ev.map(|(ev, _)| ev))
        .collect::<Result<_, _>>()
        .unwrap();
    let tags: Vec<_> = events
        .iter()
        .filter_map(|ev| match ev {
            Event::Scalar { tag: Some(tag), .. } => Some(tag.to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(tags, ["tag:example.com,2000:a", "tag:example.com,2000:b"]);
}

#[test]
fn test_nul_character() {
    let err = run_parser("key: va\0lue").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Encoding);
    assert_eq!(err.info(), "special characters are not allowed");
}

#[test]
fn test_anchor_and_tag_on_collection() {
    assert_eq!(
        run_parser_to_tree("--- &a !!seq\n- x\n").unwrap(),
        [
            "+STR",
            "+DOC ---",
            "+SEQ &a <tag:yaml.org,2002:seq>",
            "=VAL :x",
            "-SEQ",
            "-DOC",
            "-STR"
        ]
    );
}
