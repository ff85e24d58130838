//! Character sources for the scanner.
//!
//! The scanner never reads from a `&str` or an iterator directly. It goes through the [`Input`]
//! trait, which exposes a small lookahead window over the remaining characters. Two
//! implementations are provided: [`StrInput`](str::StrInput) for in-memory strings and
//! [`BufferedInput`] for arbitrary iterators of `char`.

pub mod buffered;
pub mod str;

#[allow(clippy::module_name_repetitions)]
pub use buffered::BufferedInput;

use crate::char_traits::{is_blank_or_breakz, is_breakz, is_flow};

/// A source of characters for the scanner.
///
/// The scanner asks for a window of characters with [`Input::lookahead`] and then inspects it
/// with [`Input::peek`] and [`Input::peek_nth`]. Implementations that already hold the whole
/// input, like `StrInput`, can make the window free.
pub trait Input {
    /// Make sure the next `count` characters can be peeked.
    ///
    /// Past the end of the input, the window is padded with `\0`. An implementation must not
    /// buffer more than `count` characters: the scanner relies on [`Input::buflen`] to know
    /// whether it may bypass the window with [`Input::raw_read_ch`].
    fn lookahead(&mut self, count: usize);

    /// The number of characters currently in the window.
    #[must_use]
    fn buflen(&self) -> usize;

    /// The largest window the scanner may request.
    #[must_use]
    fn bufmaxlen(&self) -> usize;

    /// Whether the window is empty. The stream itself may have more characters.
    #[inline]
    #[must_use]
    fn buf_is_empty(&self) -> bool {
        self.buflen() == 0
    }

    /// Read the next character past the window, which must be empty.
    #[must_use]
    fn raw_read_ch(&mut self) -> char;

    /// Undo the last [`Input::raw_read_ch`]. `c` is the character it returned.
    fn push_back(&mut self, c: char);

    /// Consume one character.
    fn skip(&mut self);

    /// Consume `count` characters.
    fn skip_n(&mut self, count: usize);

    /// The next character, or `\0` past the end. It must be in the window.
    #[must_use]
    fn peek(&self) -> char;

    /// The character `n` positions ahead, or `\0` past the end. It must be in the window.
    #[must_use]
    fn peek_nth(&self, n: usize) -> char;

    /// Whether the next character is a `\0` read from the input rather than the end padding.
    #[must_use]
    fn next_is_nul_char(&self) -> bool;

    /// Fill a window of one character and return it.
    #[inline]
    #[must_use]
    fn look_ch(&mut self) -> char {
        self.lookahead(1);
        self.peek()
    }

    /// Needs a window of 1.
    #[inline]
    #[must_use]
    fn next_char_is(&self, c: char) -> bool {
        self.peek() == c
    }

    /// Needs a window of `n + 1`.
    #[inline]
    #[must_use]
    fn nth_char_is(&self, n: usize, c: char) -> bool {
        self.peek_nth(n) == c
    }

    /// Needs a window of 2.
    #[inline]
    #[must_use]
    fn next_2_are(&self, c1: char, c2: char) -> bool {
        debug_assert!(self.buflen() >= 2);
        self.peek() == c1 && self.peek_nth(1) == c2
    }

    /// Needs a window of 3.
    #[inline]
    #[must_use]
    fn next_3_are(&self, c1: char, c2: char, c3: char) -> bool {
        debug_assert!(self.buflen() >= 3);
        [c1, c2, c3]
            .iter()
            .enumerate()
            .all(|(n, &c)| self.peek_nth(n) == c)
    }

    /// Whether a `---` or `...` marker follows. Needs a window of 4.
    #[inline]
    #[must_use]
    fn next_is_document_indicator(&self) -> bool {
        self.next_is_document_start() || self.next_is_document_end()
    }

    /// Whether a `---` marker follows. Needs a window of 4.
    #[inline]
    #[must_use]
    fn next_is_document_start(&self) -> bool {
        debug_assert!(self.buflen() >= 4);
        self.next_3_are('-', '-', '-') && is_blank_or_breakz(self.peek_nth(3))
    }

    /// Whether a `...` marker follows. Needs a window of 4.
    #[inline]
    #[must_use]
    fn next_is_document_end(&self) -> bool {
        debug_assert!(self.buflen() >= 4);
        self.next_3_are('.', '.', '.') && is_blank_or_breakz(self.peek_nth(3))
    }

    /// Consume blanks and a trailing comment, stopping before the line break.
    ///
    /// Returns how many characters were consumed, so that the caller can move its marker, along
    /// with what was found (see [`SkipTabs::found_tabs`] and [`SkipTabs::has_valid_yaml_ws`]).
    /// Tabs are left in place with [`SkipTabs::No`].
    ///
    /// # Errors
    /// A `#` right after the previous token is not a comment. The count then stops before it.
    fn skip_ws_to_eol(&mut self, skip_tabs: SkipTabs) -> (usize, Result<SkipTabs, &'static str>) {
        let mut tabs = false;
        let mut spaces = false;
        let mut consumed = 0;
        loop {
            match self.look_ch() {
                ' ' => spaces = true,
                '\t' if skip_tabs != SkipTabs::No => tabs = true,
                '#' if !(tabs || spaces) => {
                    return (
                        consumed,
                        Err("comments must be separated from other tokens by whitespace"),
                    );
                }
                '#' => {
                    while !is_breakz(self.look_ch()) {
                        self.skip();
                        consumed += 1;
                    }
                    break;
                }
                _ => break,
            }
            self.skip();
            consumed += 1;
        }
        (consumed, Ok(SkipTabs::Result(tabs, spaces)))
    }

    /// Whether the next character continues a plain scalar. Needs a window of 2, and the next
    /// character must not be blank.
    #[allow(clippy::inline_always)]
    #[inline(always)]
    fn next_can_be_plain_scalar(&self, in_flow: bool) -> bool {
        let next = self.peek_nth(1);
        match self.peek() {
            ':' => !(is_blank_or_breakz(next) || (in_flow && is_flow(next))),
            c => !(in_flow && is_flow(c)),
        }
    }
}

/// How [`Input::skip_ws_to_eol`] treats tabs, and what it found.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SkipTabs {
    /// Skip tabs like spaces.
    Yes,
    /// Stop at the first tab.
    No,
    /// What was skipped: (tabs, spaces).
    Result(bool, bool),
}

impl SkipTabs {
    /// Whether tabs were skipped. Only meaningful on a returned value.
    #[must_use]
    pub fn found_tabs(self) -> bool {
        matches!(self, SkipTabs::Result(true, _))
    }

    /// Whether spaces were skipped. Only meaningful on a returned value.
    #[must_use]
    pub fn has_valid_yaml_ws(self) -> bool {
        matches!(self, SkipTabs::Result(_, true))
    }
}

#[cfg(test)]
mod test {
    use super::{str::StrInput, BufferedInput, Input, SkipTabs};

    #[test]
    fn skip_ws_counts_comment_characters() {
        let mut input = StrInput::new("  # hi\nnext");
        let (n, result) = input.skip_ws_to_eol(SkipTabs::Yes);
        assert_eq!(n, 6);
        assert!(result.unwrap().has_valid_yaml_ws());
        assert_eq!(input.look_ch(), '\n');
    }

    #[test]
    fn skip_ws_rejects_glued_comment() {
        let mut input = BufferedInput::new("#x".chars());
        let (n, result) = input.skip_ws_to_eol(SkipTabs::Yes);
        assert_eq!(n, 0);
        assert!(result.is_err());
    }

    #[test]
    fn skip_ws_stops_on_tabs_when_asked() {
        let mut input = StrInput::new("\t a");
        let (n, result) = input.skip_ws_to_eol(SkipTabs::No);
        assert_eq!(n, 0);
        assert!(!result.unwrap().found_tabs());
        assert_eq!(input.look_ch(), '\t');
    }

    #[test]
    fn document_markers_end_at_any_break() {
        for source in ["---", "--- a", "---\n", "...\u{85}", "---\u{2028}"] {
            let mut input = StrInput::new(source);
            input.lookahead(4);
            assert!(input.next_is_document_indicator(), "{source:?}");
            let mut input = BufferedInput::new(source.chars());
            input.lookahead(4);
            assert!(input.next_is_document_indicator(), "{source:?}");
        }
        let mut input = StrInput::new("---a");
        input.lookahead(4);
        assert!(!input.next_is_document_indicator());
    }

    #[test]
    fn plain_scalar_continuation() {
        let mut input = StrInput::new(":x");
        input.lookahead(2);
        assert!(input.next_can_be_plain_scalar(false));
        let mut input = StrInput::new(": x");
        input.lookahead(2);
        assert!(!input.next_can_be_plain_scalar(false));
        let mut input = StrInput::new(":]");
        input.lookahead(2);
        assert!(input.next_can_be_plain_scalar(false));
        assert!(!input.next_can_be_plain_scalar(true));
    }
}
