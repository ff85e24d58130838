//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::fmt::Write;

use yarrow_parser::{Event, Parser, ScalarStyle, ScanError, Span, Tag};

/// Run the parser through the string.
///
/// The parser is run through both the `StrInput` and `BufferedInput` variants. The resulting
/// events are then compared and must match.
///
/// # Returns
/// The events and their spans if parsing succeeds, the error the parser returned otherwise.
///
/// # Panics
/// This function panics if there is a mismatch between the 2 parser invocations with the different
/// input traits.
pub fn run_parser_with_spans(input: &str) -> Result<Vec<(Event, Span)>, ScanError> {
    let (str_events, str_error) = drain(Parser::new_from_str(input));
    let (iter_events, iter_error) = drain(Parser::new_from_iter(input.chars()));

    assert_eq!(str_events, iter_events);
    assert_eq!(str_error, iter_error);

    match str_error {
        Some(err) => Err(err),
        None => Ok(str_events),
    }
}

/// Same as [`run_parser_with_spans`], without the spans.
pub fn run_parser(input: &str) -> Result<Vec<Event>, ScanError> {
    run_parser_with_spans(input).map(|events| events.into_iter().map(|(ev, _)| ev).collect())
}

/// Run the parser and render its events in the tree notation of the YAML test suite.
pub fn run_parser_to_tree(input: &str) -> Result<Vec<String>, ScanError> {
    run_parser(input).map(|events| events.iter().map(to_tree_line).collect())
}

/// Collect the events of `parser` until the end of the stream or an error.
///
/// Events emitted before the error are kept.
pub fn drain<I: Iterator<Item = Result<(Event, Span), ScanError>>>(
    parser: I,
) -> (Vec<(Event, Span)>, Option<ScanError>) {
    let mut events = vec![];
    for x in parser {
        match x {
            Ok(event) => events.push(event),
            Err(e) => return (events, Some(e)),
        }
    }
    (events, None)
}

/// Render one event as a line of the YAML test suite tree notation.
///
/// ```text
/// +STR
/// +DOC ---
/// +MAP {} &anchor <tag:yaml.org,2002:map>
/// =VAL :plain
/// =VAL "double
/// =ALI *anchor
/// ```
pub fn to_tree_line(ev: &Event) -> String {
    match ev {
        Event::StreamStart => "+STR".into(),
        Event::StreamEnd => "-STR".into(),
        Event::DocumentStart { explicit, .. } => {
            if *explicit {
                "+DOC ---".into()
            } else {
                "+DOC".into()
            }
        }
        Event::DocumentEnd { explicit } => {
            if *explicit {
                "-DOC ...".into()
            } else {
                "-DOC".into()
            }
        }
        Event::Alias(name) => format!("=ALI *{name}"),
        Event::Scalar {
            value,
            style,
            anchor,
            tag,
            ..
        } => {
            let indicator = match style {
                ScalarStyle::Plain => ':',
                ScalarStyle::SingleQuoted => '\'',
                ScalarStyle::DoubleQuoted => '"',
                ScalarStyle::Literal => '|',
                ScalarStyle::Folded => '>',
            };
            format!(
                "=VAL{}{} {indicator}{}",
                format_anchor(anchor.as_deref()),
                format_tag(tag.as_ref()),
                escape_text(value)
            )
        }
        Event::SequenceStart { anchor, tag, flow } => format!(
            "+SEQ{}{}{}",
            if *flow { " []" } else { "" },
            format_anchor(anchor.as_deref()),
            format_tag(tag.as_ref())
        ),
        Event::SequenceEnd => "-SEQ".into(),
        Event::MappingStart { anchor, tag, flow } => format!(
            "+MAP{}{}{}",
            if *flow { " {}" } else { "" },
            format_anchor(anchor.as_deref()),
            format_tag(tag.as_ref())
        ),
        Event::MappingEnd => "-MAP".into(),
    }
}

fn format_anchor(anchor: Option<&str>) -> String {
    anchor.map_or_else(String::new, |name| format!(" &{name}"))
}

fn format_tag(tag: Option<&Tag>) -> String {
    tag.map_or_else(String::new, |tag| format!(" <{tag}>"))
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x08' => out.push_str("\\b"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

/// Check that the start and end events seen so far nest properly.
///
/// When `complete` is set, the stream must also be closed.
pub fn is_well_nested(events: &[Event], complete: bool) -> bool {
    let mut stack = vec![];
    for ev in events {
        match ev {
            Event::StreamStart => stack.push('S'),
            Event::DocumentStart { .. } => stack.push('D'),
            Event::SequenceStart { .. } => stack.push('['),
            Event::MappingStart { .. } => stack.push('{'),
            Event::StreamEnd
            | Event::DocumentEnd { .. }
            | Event::SequenceEnd
            | Event::MappingEnd => {
                let expected = match ev {
                    Event::StreamEnd => 'S',
                    Event::DocumentEnd { .. } => 'D',
                    Event::SequenceEnd => '[',
                    _ => '{',
                };
                if stack.pop() != Some(expected) {
                    return false;
                }
            }
            Event::Alias(_) | Event::Scalar { .. } => {
                if !matches!(stack.last(), Some('D' | '[' | '{')) {
                    return false;
                }
            }
        }
    }
    !complete || stack.is_empty()
}
