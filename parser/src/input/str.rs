//! An [`Input`](crate::input::Input) over an in-memory `&str`.

use crate::{char_traits::is_blank_or_breakz, input::Input};

/// An [`Input`] over an in-memory string.
///
/// Since the whole input is available, there is no actual buffering going on: the lookahead
/// window is a view over the remaining part of the string.
#[allow(clippy::module_name_repetitions)]
pub struct StrInput<'a> {
    /// The whole input.
    source: &'a str,
    /// Byte offset of the next character to be read.
    pos: usize,
    /// The number of characters the scanner asked us to look ahead for.
    ///
    /// Nothing is actually buffered, but [`Input::buflen`] must report what [`Input::lookahead`]
    /// was called with.
    lookahead: usize,
    /// Length in bytes of the last character returned by [`Input::raw_read_ch`].
    last_read_len: usize,
}

impl<'a> StrInput<'a> {
    /// Create a new [`StrInput`] with the given str.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            source: input,
            pos: 0,
            lookahead: 0,
            last_read_len: 0,
        }
    }

    /// The part of the input that has not been consumed yet.
    #[inline]
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    #[inline]
    fn starts_with_indicator(&self, indicator: &str) -> bool {
        self.rest()
            .strip_prefix(indicator)
            .is_some_and(|after| after.chars().next().map_or(true, is_blank_or_breakz))
    }
}

impl Input for StrInput<'_> {
    #[inline]
    fn lookahead(&mut self, x: usize) {
        self.lookahead = self.lookahead.max(x);
    }

    #[inline]
    fn buflen(&self) -> usize {
        self.lookahead
    }

    #[inline]
    fn bufmaxlen(&self) -> usize {
        BUFFER_LEN
    }

    #[inline]
    fn raw_read_ch(&mut self) -> char {
        if let Some(c) = self.rest().chars().next() {
            self.last_read_len = c.len_utf8();
            self.pos += self.last_read_len;
            c
        } else {
            self.last_read_len = 0;
            '\0'
        }
    }

    #[inline]
    fn push_back(&mut self, _c: char) {
        self.pos -= self.last_read_len;
        self.last_read_len = 0;
    }

    #[inline]
    fn skip(&mut self) {
        if let Some(c) = self.rest().chars().next() {
            self.pos += c.len_utf8();
        }
        self.lookahead = self.lookahead.saturating_sub(1);
    }

    #[inline]
    fn skip_n(&mut self, count: usize) {
        let consumed: usize = self.rest().chars().take(count).map(char::len_utf8).sum();
        self.pos += consumed;
        self.lookahead = self.lookahead.saturating_sub(count);
    }

    #[inline]
    fn peek(&self) -> char {
        self.rest().chars().next().unwrap_or('\0')
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> char {
        self.rest().chars().nth(n).unwrap_or('\0')
    }

    #[inline]
    fn next_is_nul_char(&self) -> bool {
        self.rest().starts_with('\0')
    }

    #[inline]
    fn next_2_are(&self, c1: char, c2: char) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some(c1) && chars.next() == Some(c2)
    }

    #[inline]
    fn next_3_are(&self, c1: char, c2: char, c3: char) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some(c1) && chars.next() == Some(c2) && chars.next() == Some(c3)
    }

    #[inline]
    fn next_is_document_indicator(&self) -> bool {
        self.starts_with_indicator("---") || self.starts_with_indicator("...")
    }

    #[inline]
    fn next_is_document_start(&self) -> bool {
        self.starts_with_indicator("---")
    }

    #[inline]
    fn next_is_document_end(&self) -> bool {
        self.starts_with_indicator("...")
    }
}

/// The buffer size we report to the scanner.
///
/// This does not correspond to any allocated buffer. The scanner may look at any character it
/// wants; the value only bounds the size of the lookahead requests the scanner makes at once.
const BUFFER_LEN: usize = 128;

#[cfg(test)]
mod test {
    use crate::input::Input;

    use super::StrInput;

    #[test]
    pub fn is_document_start() {
        let input = StrInput::new("---\n");
        assert!(input.next_is_document_start());
        assert!(input.next_is_document_indicator());
        let input = StrInput::new("---");
        assert!(input.next_is_document_start());
        assert!(input.next_is_document_indicator());
        let input = StrInput::new("...\n");
        assert!(!input.next_is_document_start());
        assert!(input.next_is_document_indicator());
        let input = StrInput::new("---a");
        assert!(!input.next_is_document_start());
        assert!(!input.next_is_document_indicator());
    }

    #[test]
    pub fn is_document_end() {
        let input = StrInput::new("...\n");
        assert!(input.next_is_document_end());
        let input = StrInput::new("...");
        assert!(input.next_is_document_end());
        let input = StrInput::new("---\n");
        assert!(!input.next_is_document_end());
        let input = StrInput::new("... ");
        assert!(input.next_is_document_end());
    }

    #[test]
    pub fn raw_read_and_push_back() {
        let mut input = StrInput::new("éa");
        assert_eq!(input.raw_read_ch(), 'é');
        assert_eq!(input.raw_read_ch(), 'a');
        input.push_back('a');
        assert_eq!(input.raw_read_ch(), 'a');
        assert_eq!(input.raw_read_ch(), '\0');
        input.push_back('\0');
        assert_eq!(input.peek(), '\0');
        assert!(!input.next_is_nul_char());
    }

    #[test]
    pub fn skipping_keeps_lookahead_consistent() {
        let mut input = StrInput::new("a\0bc");
        input.lookahead(3);
        assert_eq!(input.buflen(), 3);
        input.skip();
        assert!(input.next_is_nul_char());
        assert_eq!(input.buflen(), 2);
        input.skip_n(2);
        assert_eq!(input.buflen(), 0);
        assert_eq!(input.peek(), 'c');
        assert_eq!(input.peek_nth(1), '\0');
    }
}
