//! An [`Input`](crate::input::Input) over any iterator of `char`, with a fixed-size lookahead
//! buffer.

use crate::input::Input;

use arraydeque::ArrayDeque;

/// The size of the [`BufferedInput`] buffer.
///
/// The buffer is statically allocated to avoid reallocations each time we consume or push a
/// character. Almost all lookaheads are 4 characters maximum, except escape sequences in
/// double-quoted scalars which need up to 10 (`\UXXXXXXXX`).
const BUFFER_LEN: usize = 16;

/// A wrapper around an [`Iterator`] of [`char`]s with a buffer.
///
/// The YAML scanner often needs some lookahead. With fully allocated buffers such as `String` or
/// `&str`, this is not an issue. With streams, we need a way of peeking multiple characters at a
/// time and sometimes pushing one back into the stream.
pub struct BufferedInput<T: Iterator<Item = char>> {
    /// The iterator source.
    input: T,
    /// Buffer for the next characters to consume.
    buffer: ArrayDeque<char, BUFFER_LEN>,
    /// Whether `input` returned `None` once. Iterators are not required to be fused.
    exhausted: bool,
    /// How many of the trailing characters in `buffer` are `\0` padding past the end of `input`.
    padding: usize,
}

impl<T: Iterator<Item = char>> BufferedInput<T> {
    /// Create a new [`BufferedInput`] with the given input.
    pub fn new(input: T) -> Self {
        Self {
            input,
            buffer: ArrayDeque::default(),
            exhausted: false,
            padding: 0,
        }
    }

    /// Pull the next character out of the source.
    fn next_source_char(&mut self) -> Option<char> {
        if self.exhausted {
            return None;
        }
        let c = self.input.next();
        self.exhausted = c.is_none();
        c
    }

    /// Pull one character from the source into the buffer, or `\0` padding if it is exhausted.
    fn fill_one(&mut self) {
        let c = self.next_source_char().unwrap_or_else(|| {
            self.padding += 1;
            '\0'
        });
        // `lookahead` never asks for more than `BUFFER_LEN` characters.
        let _ = self.buffer.push_back(c);
    }
}

impl<T: Iterator<Item = char>> Input for BufferedInput<T> {
    #[inline]
    fn lookahead(&mut self, count: usize) {
        while self.buffer.len() < count.min(BUFFER_LEN) {
            self.fill_one();
        }
    }

    #[inline]
    fn buflen(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    fn bufmaxlen(&self) -> usize {
        BUFFER_LEN
    }

    #[inline]
    fn raw_read_ch(&mut self) -> char {
        self.next_source_char().unwrap_or('\0')
    }

    #[inline]
    fn push_back(&mut self, c: char) {
        if c == '\0' && self.exhausted {
            self.padding += 1;
        }
        let _ = self.buffer.push_front(c);
    }

    #[inline]
    fn skip(&mut self) {
        self.buffer.pop_front();
        self.padding = self.padding.min(self.buffer.len());
    }

    #[inline]
    fn skip_n(&mut self, count: usize) {
        let count = count.min(self.buffer.len());
        self.buffer.drain(0..count);
        self.padding = self.padding.min(self.buffer.len());
    }

    #[inline]
    fn peek(&self) -> char {
        self.buffer.front().copied().unwrap_or('\0')
    }

    #[inline]
    fn peek_nth(&self, n: usize) -> char {
        self.buffer.get(n).copied().unwrap_or('\0')
    }

    #[inline]
    fn next_is_nul_char(&self) -> bool {
        self.buffer.front() == Some(&'\0') && self.buffer.len() > self.padding
    }
}

#[cfg(test)]
mod test {
    use crate::input::Input;

    use super::BufferedInput;

    #[test]
    fn pads_past_the_end() {
        let mut input = BufferedInput::new("ab".chars());
        input.lookahead(4);
        assert_eq!(input.buflen(), 4);
        assert_eq!(input.peek(), 'a');
        assert_eq!(input.peek_nth(1), 'b');
        assert_eq!(input.peek_nth(2), '\0');
        input.skip_n(2);
        assert_eq!(input.peek(), '\0');
        assert!(!input.next_is_nul_char());
    }

    #[test]
    fn distinguishes_nul_characters() {
        let mut input = BufferedInput::new("\0x".chars());
        input.lookahead(3);
        assert!(input.next_is_nul_char());
        input.skip();
        assert_eq!(input.peek(), 'x');
        input.skip();
        assert!(!input.next_is_nul_char());
    }

    #[test]
    fn raw_reads_bypass_buffer() {
        let mut input = BufferedInput::new("xyz".chars());
        assert_eq!(input.raw_read_ch(), 'x');
        let c = input.raw_read_ch();
        input.push_back(c);
        assert_eq!(input.look_ch(), 'y');
        input.skip();
        assert_eq!(input.raw_read_ch(), 'z');
        let c = input.raw_read_ch();
        input.push_back(c);
        assert_eq!(input.peek(), '\0');
        assert!(!input.next_is_nul_char());
    }
}
