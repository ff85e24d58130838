//! Home to the YAML Scanner.
//!
//! The scanner is the lowest-level parsing utility. It is the lexer / tokenizer, reading input a
//! character at a time and emitting tokens that can later be interpreted by the [`crate::parser`]
//! to check for more context and validity.
//!
//! Due to the grammar of YAML, the scanner has to have some context and is not error-free.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

use std::{char, collections::VecDeque, fmt};

use crate::{
    char_traits::{
        as_hex, is_alpha, is_anchor_char, is_blank, is_blank_or_breakz, is_bom, is_break,
        is_breakz, is_digit, is_flow, is_hex, is_indicator, is_printable, is_tag_char,
        is_uri_char, is_z,
    },
    error::{ErrorKind, ScanError},
    input::{Input, SkipTabs},
};

/// The style as which the scalar was written in the YAML document.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Hash)]
pub enum ScalarStyle {
    /// A YAML plain scalar.
    Plain,
    /// A YAML single quoted scalar.
    SingleQuoted,
    /// A YAML double quoted scalar.
    DoubleQuoted,

    /// A YAML literal block (`|` block).
    Literal,
    /// A YAML folded block (`>` block).
    Folded,
}

/// A location in a yaml document.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Default, Hash)]
pub struct Marker {
    /// The index (in chars) in the input string.
    index: usize,
    /// The line (0-indexed).
    line: usize,
    /// The column (0-indexed).
    col: usize,
}

impl Marker {
    /// Create a new [`Marker`] at the given position.
    #[must_use]
    pub fn new(index: usize, line: usize, col: usize) -> Marker {
        Marker { index, line, col }
    }

    /// Return the index (in chars) of the marker in the source.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Return the line of the marker in the source, starting at 0.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Return the column of the marker in the source, starting at 0.
    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "char {} line {} column {}",
            self.index,
            self.line + 1,
            self.col + 1
        )
    }
}

/// A range of locations in a Yaml document.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Default, Hash)]
pub struct Span {
    /// The start (inclusive) of the range.
    pub start: Marker,
    /// The end (exclusive) of the range.
    pub end: Marker,
}

impl Span {
    /// Create a new [`Span`] for the given range.
    #[must_use]
    pub fn new(start: Marker, end: Marker) -> Span {
        Span { start, end }
    }

    /// Create a empty [`Span`] at a given location.
    ///
    /// An empty span doesn't contain any characters, but its position may still be meaningful.
    /// For example, for an indented sequence [`SequenceEnd`] has a location but an empty span.
    ///
    /// [`SequenceEnd`]: crate::Event::SequenceEnd
    #[must_use]
    pub fn empty(mark: Marker) -> Span {
        Span {
            start: mark,
            end: mark,
        }
    }

    /// Return the length of the span (in characters).
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.index - self.start.index
    }

    /// Return whether the [`Span`] has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The contents of a scanner token.
#[derive(Clone, PartialEq, Debug, Eq)]
pub enum TokenType {
    /// The start of the stream. Sent first, before even [`TokenType::DocumentStart`].
    StreamStart,
    /// The end of the stream, EOF.
    StreamEnd,
    /// A YAML version directive.
    VersionDirective(
        /// Major
        u32,
        /// Minor
        u32,
    ),
    /// A YAML tag directive (e.g.: `%TAG !e! tag:example.com,2000:`).
    TagDirective(
        /// Handle
        String,
        /// Prefix
        String,
    ),
    /// A directive with a name that is neither `YAML` nor `TAG`.
    ///
    /// Such directives are reserved for future use. They are reported and otherwise ignored.
    ReservedDirective(
        /// Name
        String,
        /// Parameters
        Vec<String>,
    ),
    /// The start of a YAML document (`---`).
    DocumentStart,
    /// The end of a YAML document (`...`).
    DocumentEnd,
    /// The start of a sequence block.
    ///
    /// Sequence blocks are arrays starting with a `-`.
    BlockSequenceStart,
    /// The start of a sequence mapping.
    ///
    /// Sequence mappings are "dictionaries" with "key: value" entries.
    BlockMappingStart,
    /// End of the corresponding `BlockSequenceStart` or `BlockMappingStart`.
    BlockEnd,
    /// Start of an inline array (`[ a, b ]`).
    FlowSequenceStart,
    /// End of an inline array.
    FlowSequenceEnd,
    /// Start of an inline mapping (`{ a: b, c: d }`).
    FlowMappingStart,
    /// End of an inline mapping.
    FlowMappingEnd,
    /// An entry in a block sequence (c.f.: [`TokenType::BlockSequenceStart`]).
    BlockEntry,
    /// An entry in a flow sequence (c.f.: [`TokenType::FlowSequenceStart`]).
    FlowEntry,
    /// A key in a mapping.
    Key,
    /// A value in a mapping.
    Value,
    /// A reference to an anchor.
    Alias(String),
    /// A YAML anchor (`&`/`*`).
    Anchor(String),
    /// A YAML tag (starting with bangs `!`).
    Tag(
        /// The handle of the tag.
        String,
        /// The suffix of the tag.
        String,
    ),
    /// A regular YAML scalar.
    Scalar(ScalarStyle, String),
}

/// A scanner token.
#[derive(Clone, PartialEq, Debug, Eq)]
pub struct Token(pub Span, pub TokenType);

/// A scalar that was parsed and may correspond to a simple key.
///
/// Upon scanning the following yaml:
/// ```yaml
/// a: b
/// ```
/// We do not know that `a` is a key for a map until we have reached the following `:`. For this
/// YAML, we would store `a` as a scalar token in the [`Scanner`], but not emit it yet. It would be
/// kept inside the scanner until more context is fetched and we are able to know whether it is a
/// plain scalar or a key.
///
/// Upon reaching the `:`, the [`SimpleKey`] is inspected and, since our scalar is a possible key,
/// a [`TokenType::Key`] is inserted in front of the scalar token. If instead the end of the line
/// or of the stream is reached first, the [`SimpleKey`] is staled and no [`TokenType::Key`] is
/// emitted.
#[derive(Clone, PartialEq, Debug, Eq, Default)]
struct SimpleKey {
    /// Whether the token this [`SimpleKey`] refers to may still be a key.
    possible: bool,
    /// Whether the token this [`SimpleKey`] refers to is required to be a key.
    ///
    /// This is the case for a token starting at the column of the current block mapping: it
    /// cannot be anything but the next key of that mapping.
    required: bool,
    /// The index of the token referred to by the [`SimpleKey`].
    ///
    /// This is the index in the scanner, which takes into account both the tokens that have been
    /// emitted and those about to be emitted. See [`Scanner::tokens_parsed`] and
    /// [`Scanner::tokens`] for more details.
    token_number: usize,
    /// The position at which the token the [`SimpleKey`] refers to is.
    mark: Marker,
}

/// The maximum number of nested flow collections.
const MAX_FLOW_LEVEL: usize = 1000;

/// The maximum length, in characters, of a simple key in block context.
const MAX_SIMPLE_KEY_LENGTH: usize = 1024;

/// The YAML scanner.
///
/// This corresponds to the low-level interface when reading YAML. The scanner emits token as they
/// are read (akin to a lexer), but it also holds sufficient context to be able to disambiguate
/// some of the constructs. It has understanding of indentation and whitespace and is able to
/// generate error messages for some invalid YAML constructs.
///
/// It is however not a full parser and needs [`crate::parser::Parser`] to fully detect invalid
/// YAML documents.
#[derive(Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct Scanner<T> {
    /// The input source.
    input: T,
    /// The position of the cursor within the reader.
    mark: Marker,
    /// Buffer for tokens to be returned.
    ///
    /// This buffer can hold some temporary tokens that are not yet ready to be returned. For
    /// instance, if we just read a scalar, it can be a value or a key if an implicit mapping
    /// follows. In this case, the token stays in the `VecDeque` but cannot be returned from
    /// [`Self::next`] until we have more context.
    tokens: VecDeque<Token>,
    /// The first error that happened. Once set, the scanner is done.
    error: Option<ScanError>,

    /// Whether we have already emitted the `StreamStart` token.
    stream_start_produced: bool,
    /// Whether we have already emitted the `StreamEnd` token.
    stream_end_produced: bool,
    /// Whether a simple key could potentially start at the current position.
    ///
    /// Simple keys are the opposite of complex keys which are keys starting with `?`.
    simple_key_allowed: bool,
    /// A stack of potential simple keys, one per flow level.
    ///
    /// The bottom slot is for the block context. Refer to the documentation of [`SimpleKey`] for
    /// a more in-depth explanation of what they are.
    simple_keys: Vec<SimpleKey>,
    /// The current indentation level.
    indent: isize,
    /// List of all block indentation levels we are in (except the current one).
    ///
    /// Together with [`Self::indent`], the levels are strictly increasing.
    indents: Vec<isize>,
    /// Level of nesting of flow collections.
    flow_level: usize,
    /// The number of tokens that have been returned from the scanner.
    ///
    /// This excludes the tokens from [`Self::tokens`].
    tokens_parsed: usize,
    /// Whether a token is ready to be taken from [`Self::tokens`].
    token_available: bool,
    /// Whether all characters encountered since the last newline were whitespace.
    leading_whitespace: bool,
}

impl<T: Input> Iterator for Scanner<T> {
    type Item = Token;
    fn next(&mut self) -> Option<Token> {
        if self.error.is_some() {
            return None;
        }
        match self.next_token() {
            Ok(Some(tok)) => {
                debug_print!(
                    "    \x1B[;32m\u{21B3} {:?} \x1B[;36m{:?}\x1B[;m",
                    tok.1,
                    tok.0
                );
                Some(tok)
            }
            Ok(None) | Err(_) => None,
        }
    }
}

/// A convenience alias for scanner functions that may fail without returning a value.
pub type ScanResult = Result<(), ScanError>;

impl<T: Input> Scanner<T> {
    /// Creates the YAML tokenizer.
    pub fn new(input: T) -> Scanner<T> {
        Scanner {
            input,
            mark: Marker::new(0, 0, 0),
            tokens: VecDeque::new(),
            error: None,

            stream_start_produced: false,
            stream_end_produced: false,
            simple_key_allowed: true,
            simple_keys: Vec::new(),
            indent: -1,
            indents: Vec::new(),
            flow_level: 0,
            tokens_parsed: 0,
            token_available: false,
            leading_whitespace: true,
        }
    }

    /// Get a copy of the last error that was encountered, if any.
    ///
    /// This does not clear the error state and further calls to [`Self::get_error`] will return (a
    /// clone of) the same error.
    #[inline]
    pub fn get_error(&self) -> Option<ScanError> {
        self.error.clone()
    }

    /// Return whether the [`TokenType::StreamStart`] event has been emitted.
    #[inline]
    pub fn stream_started(&self) -> bool {
        self.stream_start_produced
    }

    /// Return whether the [`TokenType::StreamEnd`] event has been emitted.
    #[inline]
    pub fn stream_ended(&self) -> bool {
        self.stream_end_produced
    }

    /// Get the current position in the input stream.
    #[inline]
    pub fn mark(&self) -> Marker {
        self.mark
    }

    /// Consume the next character. It is assumed the next character is a blank.
    #[inline]
    fn skip_blank(&mut self) {
        self.input.skip();

        self.mark.index += 1;
        self.mark.col += 1;
    }

    /// Consume the next character. It is assumed the next character is not a blank.
    #[inline]
    fn skip_non_blank(&mut self) {
        self.input.skip();

        self.mark.index += 1;
        self.mark.col += 1;
        self.leading_whitespace = false;
    }

    /// Consume the next characters. It is assumed none of the next characters are blanks.
    #[inline]
    fn skip_n_non_blank(&mut self, count: usize) {
        self.input.skip_n(count);

        self.mark.index += count;
        self.mark.col += count;
        self.leading_whitespace = false;
    }

    /// Consume the next character. It is assumed the next character is a newline.
    #[inline]
    fn skip_nl(&mut self) {
        self.input.skip();

        self.mark.index += 1;
        self.mark.col = 0;
        self.mark.line += 1;
        self.leading_whitespace = true;
    }

    /// Consume a linebreak (either CR, LF or CRLF), if any. Do nothing if there's none.
    #[inline]
    fn skip_linebreak(&mut self) {
        self.input.lookahead(2);
        if self.input.next_2_are('\r', '\n') {
            // While technically not a blank, this does not matter as `self.leading_whitespace`
            // will be reset by `skip_nl`.
            self.skip_blank();
            self.skip_nl();
        } else if is_break(self.input.peek()) {
            self.skip_nl();
        }
    }

    /// Read and consume a line break.
    ///
    /// `\r`, `\n`, `\r\n` and NEL are pushed into `s` as `\n`. LS and PS are kept as is, and
    /// are not folded into spaces.
    #[inline]
    fn read_break(&mut self, s: &mut String) {
        let c = self.input.peek();
        debug_assert!(is_break(c));
        self.skip_linebreak();
        s.push(if matches!(c, '\u{2028}' | '\u{2029}') { c } else { '\n' });
    }

    /// Skip whitespace up to the end of the line, keeping `self.mark` in sync.
    fn skip_ws_to_eol(&mut self, skip_tabs: SkipTabs) -> Result<SkipTabs, ScanError> {
        let (n_chars, result) = self.input.skip_ws_to_eol(skip_tabs);
        self.mark.col += n_chars;
        self.mark.index += n_chars;
        result.map_err(|msg| ScanError::new_str(self.mark, msg))
    }

    /// Check that `c` may appear in the content of a node.
    fn check_printable(&self, c: char) -> ScanResult {
        if is_printable(c) && !is_bom(c) {
            Ok(())
        } else {
            Err(self.special_character_error())
        }
    }

    fn special_character_error(&self) -> ScanError {
        ScanError::with_kind(
            ErrorKind::Encoding,
            self.mark,
            "special characters are not allowed",
        )
    }

    /// Fetch the next token in the stream.
    ///
    /// # Errors
    /// Returns `ScanError` when the scanner does not find the next expected token.
    pub fn fetch_next_token(&mut self) -> ScanResult {
        self.input.lookahead(1);

        if !self.stream_start_produced {
            self.fetch_stream_start();
            return Ok(());
        }
        self.skip_to_next_token()?;

        debug_print!(
            "  \x1B[38;5;244m\u{2192} fetch_next_token after whitespace {:?} {:?}\x1B[m",
            self.mark,
            self.input.peek()
        );

        self.stale_simple_keys()?;

        let mark = self.mark;
        self.unroll_indent(mark.col as isize);

        self.input.lookahead(4);

        let c = self.input.peek();
        if is_z(c) {
            if self.input.next_is_nul_char() {
                return Err(self.special_character_error());
            }
            return self.fetch_stream_end();
        }
        self.check_printable(c)?;

        if self.mark.col == 0 {
            if c == '%' {
                return self.fetch_directive();
            }
            if self.input.next_is_document_start() {
                return self.fetch_document_indicator(TokenType::DocumentStart);
            }
            if self.input.next_is_document_end() {
                self.fetch_document_indicator(TokenType::DocumentEnd)?;
                self.skip_ws_to_eol(SkipTabs::Yes)?;
                if !is_breakz(self.input.peek()) {
                    return Err(ScanError::new_str(
                        self.mark,
                        "invalid content after document end marker",
                    ));
                }
                return Ok(());
            }
        }

        let nc = self.input.peek_nth(1);
        match c {
            '[' => self.fetch_flow_collection_start(TokenType::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenType::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenType::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenType::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if is_blank_or_breakz(nc) => self.fetch_block_entry(),
            '?' if self.flow_level > 0 || is_blank_or_breakz(nc) => self.fetch_key(),
            ':' if self.flow_level > 0 || is_blank_or_breakz(nc) => self.fetch_value(),
            // Is it an alias?
            '*' => self.fetch_anchor(true),
            // Is it an anchor?
            '&' => self.fetch_anchor(false),
            '!' => self.fetch_tag(),
            // Is it a literal scalar?
            '|' if self.flow_level == 0 => self.fetch_block_scalar(true),
            // Is it a folded scalar?
            '>' if self.flow_level == 0 => self.fetch_block_scalar(false),
            '\'' => self.fetch_flow_scalar(true),
            '"' => self.fetch_flow_scalar(false),
            c if is_indicator(c) => Err(ScanError::new(
                self.mark,
                format!("found character `{c}' that cannot start any token"),
            )),
            _ => self.fetch_plain_scalar(),
        }
    }

    /// Return the next token in the stream.
    ///
    /// # Errors
    /// Returns `ScanError` when scanning fails to find an expected next token. The error is
    /// kept and returned again by subsequent calls.
    pub fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.stream_end_produced {
            return Ok(None);
        }

        if !self.token_available {
            if let Err(err) = self.fetch_more_tokens() {
                self.error = Some(err.clone());
                return Err(err);
            }
        }
        let Some(t) = self.tokens.pop_front() else {
            let err = ScanError::new_str(self.mark, "did not find expected next token");
            self.error = Some(err.clone());
            return Err(err);
        };
        self.token_available = false;
        self.tokens_parsed += 1;

        if let TokenType::StreamEnd = t.1 {
            self.stream_end_produced = true;
        }
        Ok(Some(t))
    }

    /// Fetch tokens from the token stream.
    ///
    /// Tokens are fetched until the first token in the queue can no longer become a simple key.
    ///
    /// # Errors
    /// Returns `ScanError` when loading fails.
    pub fn fetch_more_tokens(&mut self) -> ScanResult {
        let mut need_more;
        loop {
            if self.tokens.is_empty() {
                need_more = true;
            } else {
                need_more = false;
                // Stale potential keys that we know won't be keys.
                self.stale_simple_keys()?;
                // If our next token to be emitted may be a key, fetch more context.
                for sk in &self.simple_keys {
                    if sk.possible && sk.token_number == self.tokens_parsed {
                        need_more = true;
                        break;
                    }
                }
            }

            if !need_more {
                break;
            }
            self.fetch_next_token()?;
        }
        self.token_available = true;

        Ok(())
    }

    /// Mark simple keys that can no longer be keys as such.
    ///
    /// Only the block context slot is affected: a simple key in block context must fit on a
    /// single line and be at most [`MAX_SIMPLE_KEY_LENGTH`] characters long. Flow context keys
    /// are only closed by the flow indicators.
    ///
    /// # Errors
    /// This function returns an error if the key we would stale was required to be a key.
    fn stale_simple_keys(&mut self) -> ScanResult {
        let mark = self.mark;
        if let Some(sk) = self.simple_keys.first_mut() {
            if sk.possible
                && (sk.mark.line < mark.line || sk.mark.index + MAX_SIMPLE_KEY_LENGTH < mark.index)
            {
                if sk.required {
                    return Err(ScanError::new_str(mark, "could not find expected ':'")
                        .with_context("while scanning a simple key", sk.mark));
                }
                sk.possible = false;
            }
        }
        Ok(())
    }

    /// Skip over all whitespace and comments until the next token.
    ///
    /// # Errors
    /// This function returns an error if a tabulation is used as block indentation or if a
    /// comment contains characters that may not appear in a YAML stream.
    fn skip_to_next_token(&mut self) -> ScanResult {
        loop {
            match self.input.look_ch() {
                // A byte order mark is allowed at the very start of the stream.
                c if is_bom(c) && self.mark.index == 0 => {
                    self.input.skip();
                    self.mark.index += 1;
                }
                // Tabs may not be used as indentation. A line that only holds tabs, spaces and
                // possibly a comment is fine though.
                '\t' if self.flow_level == 0 && self.leading_whitespace => {
                    let tab_mark = self.mark;
                    self.skip_ws_to_eol(SkipTabs::Yes)?;
                    if !is_breakz(self.input.peek()) {
                        return Err(ScanError::new_str(
                            tab_mark,
                            "tabs disallowed within this context (block indentation)",
                        ));
                    }
                }
                '\t' | ' ' => self.skip_blank(),
                c if is_break(c) => {
                    self.skip_linebreak();
                    if self.flow_level == 0 {
                        self.simple_key_allowed = true;
                    }
                }
                '#' => {
                    while !is_breakz(self.input.look_ch()) {
                        self.check_printable(self.input.peek())?;
                        self.skip_non_blank();
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn fetch_stream_start(&mut self) {
        let mark = self.mark;
        self.indent = -1;
        self.stream_start_produced = true;
        self.simple_key_allowed = true;
        self.tokens
            .push_back(Token(Span::empty(mark), TokenType::StreamStart));
        self.simple_keys.push(SimpleKey::default());
    }

    fn fetch_stream_end(&mut self) -> ScanResult {
        // If the stream ended, we won't have more context. We can stall all the simple keys we
        // had. If one was required, however, that was an error and we must propagate it.
        for sk in &mut self.simple_keys {
            if sk.required && sk.possible {
                return Err(ScanError::new_str(self.mark, "could not find expected ':'")
                    .with_context("while scanning a simple key", sk.mark));
            }
            sk.possible = false;
        }

        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;

        self.tokens
            .push_back(Token(Span::empty(self.mark), TokenType::StreamEnd));
        Ok(())
    }

    fn fetch_directive(&mut self) -> ScanResult {
        self.unroll_indent(-1);
        self.remove_simple_key()?;

        self.simple_key_allowed = false;

        let tok = self.scan_directive()?;
        self.tokens.push_back(tok);

        Ok(())
    }

    fn scan_directive(&mut self) -> Result<Token, ScanError> {
        let start_mark = self.mark;
        self.skip_non_blank();

        let name = self.scan_directive_name(start_mark)?;
        let tok = match name.as_ref() {
            "YAML" => self.scan_version_directive_value(start_mark)?,
            "TAG" => self.scan_tag_directive_value(start_mark)?,
            _ => self.scan_reserved_directive_value(name, start_mark)?,
        };

        self.skip_ws_to_eol(SkipTabs::Yes)?;

        if is_breakz(self.input.peek()) {
            self.skip_linebreak();
            Ok(tok)
        } else {
            Err(
                ScanError::new_str(self.mark, "did not find expected comment or line break")
                    .with_context("while scanning a directive", start_mark),
            )
        }
    }

    fn scan_directive_name(&mut self, start_mark: Marker) -> Result<String, ScanError> {
        let mut string = String::new();
        while is_alpha(self.input.look_ch()) {
            string.push(self.input.peek());
            self.skip_non_blank();
        }

        if string.is_empty() {
            return Err(
                ScanError::new_str(self.mark, "could not find expected directive name")
                    .with_context("while scanning a directive", start_mark),
            );
        }

        if !is_blank_or_breakz(self.input.peek()) {
            return Err(ScanError::new_str(
                self.mark,
                "found unexpected non-alphabetical character",
            )
            .with_context("while scanning a directive", start_mark));
        }

        Ok(string)
    }

    fn scan_version_directive_value(&mut self, mark: Marker) -> Result<Token, ScanError> {
        while is_blank(self.input.look_ch()) {
            self.skip_blank();
        }

        let major = self.scan_version_directive_number(mark)?;

        if self.input.peek() != '.' {
            return Err(ScanError::new_str(
                self.mark,
                "did not find expected digit or '.' character",
            )
            .with_context("while scanning a %YAML directive", mark));
        }
        self.skip_non_blank();

        let minor = self.scan_version_directive_number(mark)?;

        if major != 1 {
            return Err(ScanError::new(
                mark,
                format!("found incompatible YAML document (version 1.* is required, got {major}.{minor})"),
            ));
        }

        Ok(Token(
            Span::new(mark, self.mark),
            TokenType::VersionDirective(major, minor),
        ))
    }

    fn scan_version_directive_number(&mut self, mark: Marker) -> Result<u32, ScanError> {
        let mut val = 0u32;
        let mut length = 0usize;
        while let Some(digit) = self.input.look_ch().to_digit(10) {
            if length + 1 > 9 {
                return Err(
                    ScanError::new_str(self.mark, "found extremely long version number")
                        .with_context("while scanning a %YAML directive", mark),
                );
            }
            length += 1;
            val = val * 10 + digit;
            self.skip_non_blank();
        }

        if length == 0 {
            return Err(
                ScanError::new_str(self.mark, "did not find expected version number")
                    .with_context("while scanning a %YAML directive", mark),
            );
        }

        Ok(val)
    }

    fn scan_tag_directive_value(&mut self, mark: Marker) -> Result<Token, ScanError> {
        while is_blank(self.input.look_ch()) {
            self.skip_blank();
        }
        let handle = self.scan_tag_handle(true, mark)?;

        if !is_blank(self.input.look_ch()) {
            return Err(
                ScanError::new_str(self.mark, "did not find expected whitespace")
                    .with_context("while scanning a %TAG directive", mark),
            );
        }
        while is_blank(self.input.look_ch()) {
            self.skip_blank();
        }

        let prefix = self.scan_tag_prefix(mark)?;

        self.input.lookahead(1);

        if is_blank_or_breakz(self.input.peek()) {
            Ok(Token(
                Span::new(mark, self.mark),
                TokenType::TagDirective(handle, prefix),
            ))
        } else {
            Err(ScanError::new_str(
                self.mark,
                "did not find expected whitespace or line break",
            )
            .with_context("while scanning a %TAG directive", mark))
        }
    }

    /// Scan the parameters of a directive that is neither `%YAML` nor `%TAG`.
    fn scan_reserved_directive_value(
        &mut self,
        name: String,
        mark: Marker,
    ) -> Result<Token, ScanError> {
        let mut params = Vec::new();
        loop {
            while is_blank(self.input.look_ch()) {
                self.skip_blank();
            }
            if is_breakz(self.input.peek()) || self.input.peek() == '#' {
                break;
            }
            let mut param = String::new();
            while !is_blank_or_breakz(self.input.look_ch()) {
                let c = self.input.peek();
                self.check_printable(c)?;
                param.push(c);
                self.skip_non_blank();
            }
            params.push(param);
        }
        debug_print!("ignoring reserved directive %{name} {params:?}");
        Ok(Token(
            Span::new(mark, self.mark),
            TokenType::ReservedDirective(name, params),
        ))
    }

    fn fetch_tag(&mut self) -> ScanResult {
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let tok = self.scan_tag()?;
        self.tokens.push_back(tok);
        Ok(())
    }

    fn scan_tag(&mut self) -> Result<Token, ScanError> {
        let start_mark = self.mark;
        let mut handle = String::new();
        let mut suffix;

        // Check if the tag is in the canonical form (verbatim).
        self.input.lookahead(2);

        if self.input.nth_char_is(1, '<') {
            suffix = self.scan_verbatim_tag(start_mark)?;
        } else {
            // The tag has either the '!suffix' or the '!handle!suffix'
            handle = self.scan_tag_handle(false, start_mark)?;
            // Check if it is, indeed, handle.
            if handle.len() >= 2 && handle.starts_with('!') && handle.ends_with('!') {
                suffix = self.scan_tag_shorthand_suffix("", start_mark)?;
            } else {
                suffix = self.scan_tag_shorthand_suffix(&handle, start_mark)?;
                "!".clone_into(&mut handle);
                // A special case: the '!' tag. Set the handle to '' and the suffix to '!'.
                if suffix.is_empty() {
                    handle.clear();
                    suffix = "!".to_owned();
                }
            }
        }

        let c = self.input.look_ch();
        if is_blank_or_breakz(c) || (self.flow_level > 0 && is_flow(c)) {
            Ok(Token(
                Span::new(start_mark, self.mark),
                TokenType::Tag(handle, suffix),
            ))
        } else {
            Err(ScanError::new_str(
                self.mark,
                "did not find expected whitespace or line break",
            )
            .with_context("while scanning a tag", start_mark))
        }
    }

    fn scan_tag_handle(&mut self, directive: bool, mark: Marker) -> Result<String, ScanError> {
        let context = if directive {
            "while scanning a %TAG directive"
        } else {
            "while scanning a tag"
        };
        let mut string = String::new();
        if self.input.look_ch() != '!' {
            return Err(ScanError::new_str(self.mark, "did not find expected '!'")
                .with_context(context, mark));
        }

        string.push(self.input.peek());
        self.skip_non_blank();

        while is_alpha(self.input.look_ch()) {
            string.push(self.input.peek());
            self.skip_non_blank();
        }

        // Check if the trailing character is '!' and copy it.
        if self.input.peek() == '!' {
            string.push('!');
            self.skip_non_blank();
        } else if directive && string != "!" {
            // It's either the '!' tag or not really a tag handle. If it's a %TAG directive, it's
            // an error. If it's a tag token, it must be a part of the URI.
            return Err(ScanError::new_str(self.mark, "did not find expected '!'")
                .with_context(context, mark));
        }
        Ok(string)
    }

    /// Scan for a tag prefix.
    ///
    /// There are 2 kinds of tag prefixes:
    ///   - Local: Starts with a `!`, contains only URI chars (`!foo`)
    ///   - Global: Starts with a tag char, contains then URI chars (`!foo,2000:app/`)
    fn scan_tag_prefix(&mut self, start_mark: Marker) -> Result<String, ScanError> {
        let mut string = String::new();

        if self.input.look_ch() == '!' {
            // If we have a local tag, insert and skip `!`.
            string.push('!');
            self.skip_non_blank();
        } else if !is_tag_char(self.input.peek()) {
            // Otherwise, check if the first global tag character is valid.
            return Err(
                ScanError::new_str(self.mark, "invalid global tag character")
                    .with_context("while scanning a %TAG directive", start_mark),
            );
        }

        while is_uri_char(self.input.look_ch()) {
            if self.input.peek() == '%' {
                string.push(self.scan_uri_escapes(start_mark)?);
            } else {
                string.push(self.input.peek());
                self.skip_non_blank();
            }
        }

        Ok(string)
    }

    /// Scan for a verbatim tag.
    ///
    /// The prefixing `!<` must _not_ have been skipped.
    fn scan_verbatim_tag(&mut self, start_mark: Marker) -> Result<String, ScanError> {
        // Eat `!<`
        self.skip_n_non_blank(2);

        let mut string = String::new();
        while is_uri_char(self.input.look_ch()) {
            if self.input.peek() == '%' {
                string.push(self.scan_uri_escapes(start_mark)?);
            } else {
                string.push(self.input.peek());
                self.skip_non_blank();
            }
        }

        if self.input.peek() != '>' {
            return Err(
                ScanError::new_str(self.mark, "did not find the expected '>'")
                    .with_context("while scanning a verbatim tag", start_mark),
            );
        }
        self.skip_non_blank();

        if string.is_empty() {
            return Err(
                ScanError::new_str(self.mark, "did not find expected tag URI")
                    .with_context("while scanning a verbatim tag", start_mark),
            );
        }

        Ok(string)
    }

    fn scan_tag_shorthand_suffix(&mut self, head: &str, mark: Marker) -> Result<String, ScanError> {
        let mut length = head.len();
        let mut string = String::new();

        // Copy the head if needed.
        // Note that we don't copy the leading '!' character.
        if length > 1 {
            string.extend(head.chars().skip(1));
        }

        while is_tag_char(self.input.look_ch()) {
            // Check if it is a URI-escape sequence.
            if self.input.peek() == '%' {
                string.push(self.scan_uri_escapes(mark)?);
            } else {
                string.push(self.input.peek());
                self.skip_non_blank();
            }

            length += 1;
        }

        if length == 0 {
            return Err(
                ScanError::new_str(self.mark, "did not find expected tag URI")
                    .with_context("while scanning a tag", mark),
            );
        }

        Ok(string)
    }

    /// Decode a sequence of `%XX` escapes forming one UTF-8 encoded character.
    fn scan_uri_escapes(&mut self, mark: Marker) -> Result<char, ScanError> {
        let mut width = 0usize;
        let mut code = 0u32;
        loop {
            self.input.lookahead(3);

            if !(self.input.peek() == '%'
                && is_hex(self.input.peek_nth(1))
                && is_hex(self.input.peek_nth(2)))
            {
                return Err(
                    ScanError::new_str(self.mark, "did not find URI escaped octet")
                        .with_context("while scanning a tag", mark),
                );
            }

            let octet = (as_hex(self.input.peek_nth(1)) << 4) + as_hex(self.input.peek_nth(2));
            if width == 0 {
                width = match octet {
                    _ if octet & 0x80 == 0x00 => 1,
                    _ if octet & 0xE0 == 0xC0 => 2,
                    _ if octet & 0xF0 == 0xE0 => 3,
                    _ if octet & 0xF8 == 0xF0 => 4,
                    _ => {
                        return Err(ScanError::new_str(
                            self.mark,
                            "found an incorrect leading UTF-8 octet",
                        )
                        .with_context("while scanning a tag", mark));
                    }
                };
                code = match width {
                    1 => octet,
                    2 => octet & 0x1F,
                    3 => octet & 0x0F,
                    _ => octet & 0x07,
                };
            } else {
                if octet & 0xc0 != 0x80 {
                    return Err(ScanError::new_str(
                        self.mark,
                        "found an incorrect trailing UTF-8 octet",
                    )
                    .with_context("while scanning a tag", mark));
                }
                code = (code << 6) + (octet & 0x3F);
            }

            self.skip_n_non_blank(3);

            width -= 1;
            if width == 0 {
                break;
            }
        }

        match char::from_u32(code) {
            Some(ch) => Ok(ch),
            None => Err(
                ScanError::new_str(self.mark, "found an invalid UTF-8 codepoint")
                    .with_context("while scanning a tag", mark),
            ),
        }
    }

    fn fetch_anchor(&mut self, alias: bool) -> ScanResult {
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let tok = self.scan_anchor(alias)?;

        self.tokens.push_back(tok);

        Ok(())
    }

    fn scan_anchor(&mut self, alias: bool) -> Result<Token, ScanError> {
        let mut string = String::new();
        let start_mark = self.mark;
        let context = if alias {
            "while scanning an alias"
        } else {
            "while scanning an anchor"
        };

        self.skip_non_blank();
        while is_anchor_char(self.input.look_ch()) {
            string.push(self.input.peek());
            self.skip_non_blank();
        }

        let c = self.input.peek();
        if !is_blank_or_breakz(c) && !is_flow(c) {
            self.check_printable(c)?;
        }
        if string.is_empty() {
            return Err(ScanError::new_str(
                self.mark,
                "did not find expected alphabetic or numeric character",
            )
            .with_context(context, start_mark));
        }

        let span = Span::new(start_mark, self.mark);
        if alias {
            Ok(Token(span, TokenType::Alias(string)))
        } else {
            Ok(Token(span, TokenType::Anchor(string)))
        }
    }

    fn fetch_flow_collection_start(&mut self, tok: TokenType) -> ScanResult {
        // The indicators '[' and '{' may start a simple key.
        self.save_simple_key()?;

        self.increase_flow_level()?;

        self.simple_key_allowed = true;

        let start_mark = self.mark;
        self.skip_non_blank();

        self.tokens
            .push_back(Token(Span::new(start_mark, self.mark), tok));
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, tok: TokenType) -> ScanResult {
        if self.flow_level == 0 {
            return Err(ScanError::new_str(
                self.mark,
                "unexpected end of flow collection",
            ));
        }
        self.remove_simple_key()?;
        self.decrease_flow_level();

        self.simple_key_allowed = false;

        let start_mark = self.mark;
        self.skip_non_blank();

        self.tokens
            .push_back(Token(Span::new(start_mark, self.mark), tok));
        Ok(())
    }

    /// Push the `FlowEntry` token and skip over the `,`.
    fn fetch_flow_entry(&mut self) -> ScanResult {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;

        let start_mark = self.mark;
        self.skip_non_blank();

        self.tokens
            .push_back(Token(Span::new(start_mark, self.mark), TokenType::FlowEntry));
        Ok(())
    }

    fn increase_flow_level(&mut self) -> ScanResult {
        if self.flow_level >= MAX_FLOW_LEVEL {
            return Err(ScanError::new_str(self.mark, "recursion limit exceeded"));
        }
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
        Ok(())
    }

    fn decrease_flow_level(&mut self) {
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
    }

    /// Push the `Block*` token(s) and skip over the `-`.
    ///
    /// Add an indentation level and push a `BlockSequenceStart` token if needed, then push a
    /// `BlockEntry` token.
    /// This function only skips over the `-` and does not fetch the entry value.
    fn fetch_block_entry(&mut self) -> ScanResult {
        // Check if we are allowed to start a new entry.
        if self.flow_level > 0 || !self.simple_key_allowed {
            return Err(ScanError::new_str(
                self.mark,
                "block sequence entries are not allowed in this context",
            ));
        }

        let mark = self.mark;
        // generate BLOCK-SEQUENCE-START if indented
        self.roll_indent(mark.col, None, TokenType::BlockSequenceStart, mark);

        self.remove_simple_key()?;
        self.simple_key_allowed = true;

        // Skip over the `-`.
        self.skip_non_blank();

        self.tokens
            .push_back(Token(Span::new(mark, self.mark), TokenType::BlockEntry));

        Ok(())
    }

    fn fetch_document_indicator(&mut self, t: TokenType) -> ScanResult {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;

        let mark = self.mark;

        self.skip_n_non_blank(3);

        self.tokens.push_back(Token(Span::new(mark, self.mark), t));
        Ok(())
    }

    fn fetch_block_scalar(&mut self, literal: bool) -> ScanResult {
        // A simple key may follow a block scalar.
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let tok = self.scan_block_scalar(literal)?;

        self.tokens.push_back(tok);
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn scan_block_scalar(&mut self, literal: bool) -> Result<Token, ScanError> {
        let start_mark = self.mark;
        let mut chomping = Chomping::Clip;
        let mut increment: usize = 0;
        let mut indent: usize = 0;
        let mut trailing_blank: bool;
        let mut leading_blank: bool = false;
        let style = if literal {
            ScalarStyle::Literal
        } else {
            ScalarStyle::Folded
        };

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();

        // skip '|' or '>'
        self.skip_non_blank();

        self.input.lookahead(1);
        if self.input.next_char_is('+') || self.input.next_char_is('-') {
            chomping = Chomping::from_indicator(self.input.peek());
            self.skip_non_blank();
            if is_digit(self.input.look_ch()) {
                increment = self.scan_block_scalar_indentation_indicator(start_mark)?;
            }
        } else if is_digit(self.input.peek()) {
            increment = self.scan_block_scalar_indentation_indicator(start_mark)?;
            if self.input.look_ch() == '+' || self.input.peek() == '-' {
                chomping = Chomping::from_indicator(self.input.peek());
                self.skip_non_blank();
            }
        }

        self.skip_ws_to_eol(SkipTabs::Yes)?;

        // Check if we are at the end of the line.
        if !is_breakz(self.input.look_ch()) {
            return Err(ScanError::new_str(
                self.mark,
                "did not find expected comment or line break",
            )
            .with_context("while scanning a block scalar", start_mark));
        }

        // The line break ending the header is not part of the content.
        self.skip_linebreak();

        if increment > 0 {
            indent = if self.indent >= 0 {
                (self.indent + increment as isize) as usize
            } else {
                increment
            }
        }

        // Scan the leading line breaks and determine the indentation level if needed.
        self.skip_block_scalar_indent(&mut indent, increment == 0, &mut trailing_breaks, start_mark)?;

        let mut line_buffer = String::with_capacity(100);
        while self.mark.col == indent && !is_z(self.input.look_ch()) {
            if indent == 0 {
                self.input.lookahead(4);
                if self.input.next_is_document_indicator() {
                    break;
                }
            }

            // We are at the first content character of a content line.
            trailing_blank = is_blank(self.input.peek());
            if !literal && leading_break == "\n" && !leading_blank && !trailing_blank {
                string.push_str(&trailing_breaks);
                if trailing_breaks.is_empty() {
                    string.push(' ');
                }
            } else {
                string.push_str(&leading_break);
                string.push_str(&trailing_breaks);
            }

            leading_break.clear();
            trailing_breaks.clear();

            leading_blank = is_blank(self.input.peek());

            self.scan_block_scalar_content_line(&mut string, &mut line_buffer)?;

            // break on EOF
            if is_z(self.input.look_ch()) {
                break;
            }

            self.read_break(&mut leading_break);

            // Eat the following indentation spaces and line breaks.
            self.skip_block_scalar_indent(&mut indent, false, &mut trailing_breaks, start_mark)?;
        }

        // Chomp the tail.
        if chomping != Chomping::Strip {
            string.push_str(&leading_break);
        }
        if chomping == Chomping::Keep {
            string.push_str(&trailing_breaks);
        }

        Ok(Token(
            Span::new(start_mark, self.mark),
            TokenType::Scalar(style, string),
        ))
    }

    /// Scan the `1-9` indentation indicator of a block scalar header.
    fn scan_block_scalar_indentation_indicator(
        &mut self,
        start_mark: Marker,
    ) -> Result<usize, ScanError> {
        let c = self.input.peek();
        if c == '0' {
            return Err(ScanError::new_str(
                self.mark,
                "found an indentation indicator equal to 0",
            )
            .with_context("while scanning a block scalar", start_mark));
        }
        self.skip_non_blank();
        Ok(c.to_digit(10).map_or(0, |d| d as usize))
    }

    /// Retrieve the contents of the line, parsing it as a block scalar.
    ///
    /// The contents will be appended to `string`. `line_buffer` is used as a temporary buffer to
    /// store bytes before pushing them to `string` and thus avoiding reallocating more than
    /// necessary. `line_buffer` is assumed to be empty upon calling this function. It will be
    /// `clear`ed before the end of the function.
    ///
    /// This function assumed the first character to read is the first content character in the
    /// line. This function does not consume the line break character(s) after the line.
    fn scan_block_scalar_content_line(
        &mut self,
        string: &mut String,
        line_buffer: &mut String,
    ) -> ScanResult {
        // Start by evaluating characters in the buffer.
        while !self.input.buf_is_empty() && !is_breakz(self.input.peek()) {
            let c = self.input.peek();
            self.check_printable(c)?;
            string.push(c);
            // We may technically skip non-blank characters. However, the only distinction is
            // to determine what is leading whitespace and what is not. Here, we read the
            // contents of the line until either eof or a linebreak. We know we will not read
            // `self.leading_whitespace` until the end of the line, where it will be reset.
            // This allows us to call a slightly less expensive function.
            self.skip_blank();
        }

        // All characters that were in the buffer were consumed. We need to check if more
        // follow.
        if self.input.buf_is_empty() {
            // We will read all consecutive non-breakz characters. We push them into a
            // temporary buffer, bypassing the input's lookahead machinery.
            let mut n_chars = 0;
            let mut c = self.input.raw_read_ch();
            while !is_breakz(c) {
                if !is_printable(c) || is_bom(c) {
                    self.mark.index += n_chars;
                    self.mark.col += n_chars;
                    return self.check_printable(c);
                }
                line_buffer.push(c);
                n_chars += 1;
                c = self.input.raw_read_ch();
            }

            // Our last character read is stored in `c`. It is either an EOF or a break. In any
            // case, we need to push it back into the input so it may be properly read after. We
            // must not insert it in `string`.
            self.input.push_back(c);

            // We need to manually update our position; we haven't called a `skip` function.
            self.mark.col += n_chars;
            self.mark.index += n_chars;

            string.push_str(line_buffer);
            // This clears the _contents_ without touching the _capacity_.
            line_buffer.clear();
        }
        Ok(())
    }

    /// Skip the block scalar indentation and empty lines.
    ///
    /// When `detect` is set, the indentation is not known yet: `indent` is set from the first
    /// content line, or from the longest of the leading empty lines if that is longer. It is
    /// never less than one column past the enclosing block indentation.
    fn skip_block_scalar_indent(
        &mut self,
        indent: &mut usize,
        detect: bool,
        breaks: &mut String,
        start_mark: Marker,
    ) -> ScanResult {
        let mut max_indent = 0;
        loop {
            // Consume all spaces. Tabs cannot be used as indentation.
            self.input.lookahead(1);
            while (detect || self.mark.col < *indent) && self.input.peek() == ' ' {
                self.skip_blank();
                self.input.lookahead(1);
            }

            if self.mark.col > max_indent {
                max_indent = self.mark.col;
            }

            if !detect && self.mark.col < *indent && self.input.peek() == '\t' {
                return Err(self.indentation_tab_error(start_mark));
            }

            // If our current line is empty, skip over the break and continue looping.
            if is_break(self.input.peek()) {
                self.read_break(breaks);
            } else {
                // Otherwise, we have a content line. Return control.
                break;
            }
        }

        if detect {
            // A top-level block scalar may start at column 0.
            *indent = max_indent.max((self.indent + 1) as usize);
            // Past the detected indentation, a tab is content.
            if self.mark.col < *indent && self.input.peek() == '\t' {
                return Err(self.indentation_tab_error(start_mark));
            }
        }
        Ok(())
    }

    fn indentation_tab_error(&self, start_mark: Marker) -> ScanError {
        ScanError::new_str(
            self.mark,
            "found a tab character where an indentation space is expected",
        )
        .with_context("while scanning a block scalar", start_mark)
    }

    fn fetch_flow_scalar(&mut self, single: bool) -> ScanResult {
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let tok = self.scan_flow_scalar(single)?;

        self.tokens.push_back(tok);
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn scan_flow_scalar(&mut self, single: bool) -> Result<Token, ScanError> {
        let start_mark = self.mark;
        let context = "while scanning a quoted scalar";

        let mut string = String::new();
        let mut leading_break = String::new();
        let mut trailing_breaks = String::new();
        let mut whitespaces = String::new();
        let mut leading_blanks;

        // Eat the left quote.
        self.skip_non_blank();

        loop {
            // Check for a document indicator.
            self.input.lookahead(4);

            if self.mark.col == 0 && self.input.next_is_document_indicator() {
                return Err(ScanError::new_str(
                    self.mark,
                    "found unexpected document indicator",
                )
                .with_context(context, start_mark));
            }

            if is_z(self.input.peek()) {
                if self.input.next_is_nul_char() {
                    return Err(self.special_character_error());
                }
                return Err(
                    ScanError::new_str(self.mark, "found unexpected end of stream")
                        .with_context(context, start_mark),
                );
            }

            if self.flow_level == 0 && (self.mark.col as isize) < self.indent {
                return Err(
                    ScanError::new_str(self.mark, "invalid indentation in quoted scalar")
                        .with_context(context, start_mark),
                );
            }

            leading_blanks = false;
            self.consume_flow_scalar_non_whitespace_chars(
                single,
                &mut string,
                &mut leading_blanks,
                start_mark,
            )?;

            match self.input.look_ch() {
                '\'' if single => break,
                '"' if !single => break,
                _ => {}
            }

            // Consume blank characters.
            while is_blank(self.input.peek()) || is_break(self.input.peek()) {
                if is_blank(self.input.peek()) {
                    // Consume a space or a tab character.
                    if leading_blanks {
                        self.skip_blank();
                    } else {
                        whitespaces.push(self.input.peek());
                        self.skip_blank();
                    }
                } else {
                    // Check if it is a first line break.
                    if leading_blanks {
                        self.read_break(&mut trailing_breaks);
                    } else {
                        whitespaces.clear();
                        self.read_break(&mut leading_break);
                        leading_blanks = true;
                    }
                }
                self.input.lookahead(1);
            }

            // Join the whitespaces or fold line breaks.
            if leading_blanks {
                fold_breaks(&mut string, &mut leading_break, &mut trailing_breaks);
            } else {
                string.push_str(&whitespaces);
                whitespaces.clear();
            }
        } // loop

        // Eat the right quote.
        self.skip_non_blank();
        let end_mark = self.mark;

        // Ensure there is no invalid trailing content.
        if self.flow_level == 0 {
            self.skip_ws_to_eol(SkipTabs::Yes)?;
            match self.input.peek() {
                // An end-of-line / end-of-stream is fine. No trailing content.
                c if is_breakz(c) => {}
                // ':' can be encountered if our scalar is a key.
                ':' => {}
                _ => {
                    return Err(ScanError::new_str(
                        self.mark,
                        "invalid trailing content after quoted scalar",
                    )
                    .with_context(context, start_mark));
                }
            }
        }

        let style = if single {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        };
        Ok(Token(
            Span::new(start_mark, end_mark),
            TokenType::Scalar(style, string),
        ))
    }

    /// Consume successive non-whitespace characters from a flow scalar.
    ///
    /// This function resolves escape sequences and stops upon encountering a whitespace, the end
    /// of the stream or the closing character for the scalar (`'` for single quoted scalars, `"`
    /// for double quoted scalars).
    ///
    /// # Errors
    /// Return an error if an invalid escape sequence or a non-printable character is found.
    fn consume_flow_scalar_non_whitespace_chars(
        &mut self,
        single: bool,
        string: &mut String,
        leading_blanks: &mut bool,
        start_mark: Marker,
    ) -> ScanResult {
        self.input.lookahead(2);
        while !is_blank_or_breakz(self.input.peek()) {
            match self.input.peek() {
                // Check for an escaped single quote.
                '\'' if self.input.nth_char_is(1, '\'') && single => {
                    string.push('\'');
                    self.skip_n_non_blank(2);
                }
                // Check for the right quote.
                '\'' if single => break,
                '"' if !single => break,
                // Check for an escaped line break.
                '\\' if !single && is_break(self.input.peek_nth(1)) => {
                    self.input.lookahead(3);
                    self.skip_non_blank();
                    self.skip_linebreak();
                    *leading_blanks = true;
                    break;
                }
                // Check for an escape sequence.
                '\\' if !single => {
                    string.push(self.resolve_flow_scalar_escape_sequence(start_mark)?);
                }
                c => {
                    self.check_printable(c)?;
                    string.push(c);
                    self.skip_non_blank();
                }
            }
            self.input.lookahead(2);
        }
        Ok(())
    }

    /// Escape the sequence we encounter in a flow scalar.
    ///
    /// `self.input.peek()` must point to the `\` starting the escape sequence.
    ///
    /// # Errors
    /// Return an error if an invalid escape sequence is found.
    fn resolve_flow_scalar_escape_sequence(&mut self, start_mark: Marker) -> Result<char, ScanError> {
        let mut code_length = 0usize;
        let mut ret = '\0';

        match self.input.peek_nth(1) {
            '0' => ret = '\0',
            'a' => ret = '\x07',
            'b' => ret = '\x08',
            't' | '\t' => ret = '\t',
            'n' => ret = '\n',
            'v' => ret = '\x0b',
            'f' => ret = '\x0c',
            'r' => ret = '\x0d',
            'e' => ret = '\x1b',
            ' ' => ret = '\x20',
            '"' => ret = '"',
            '/' => ret = '/',
            '\\' => ret = '\\',
            // Unicode next line (#x85)
            'N' => ret = '\u{85}',
            // Unicode non-breaking space (#xA0)
            '_' => ret = '\u{a0}',
            // Unicode line separator (#x2028)
            'L' => ret = '\u{2028}',
            // Unicode paragraph separator (#x2029)
            'P' => ret = '\u{2029}',
            'x' => code_length = 2,
            'u' => code_length = 4,
            'U' => code_length = 8,
            _ => {
                return Err(
                    ScanError::new_str(self.mark, "found unknown escape character")
                        .with_context("while scanning a quoted scalar", start_mark),
                )
            }
        }
        self.skip_n_non_blank(2);

        // Consume an arbitrary escape code.
        if code_length > 0 {
            self.input.lookahead(code_length);
            let mut value = 0u32;
            for i in 0..code_length {
                let c = self.input.peek_nth(i);
                if !is_hex(c) {
                    return Err(ScanError::new_str(
                        self.mark,
                        "did not find expected hexadecimal number",
                    )
                    .with_context("while scanning a quoted scalar", start_mark));
                }
                value = (value << 4) + as_hex(c);
            }

            let Some(ch) = char::from_u32(value) else {
                return Err(ScanError::new_str(
                    self.mark,
                    "found invalid Unicode character escape code",
                )
                .with_context("while scanning a quoted scalar", start_mark));
            };
            ret = ch;

            self.skip_n_non_blank(code_length);
        }
        Ok(ret)
    }

    fn fetch_plain_scalar(&mut self) -> ScanResult {
        self.save_simple_key()?;
        self.simple_key_allowed = false;

        let tok = self.scan_plain_scalar()?;

        self.tokens.push_back(tok);
        Ok(())
    }

    /// Scan for a plain scalar.
    ///
    /// Plain scalars are the most readable but restricted style. They may span multiple lines in
    /// some contexts.
    #[allow(clippy::too_many_lines)]
    fn scan_plain_scalar(&mut self) -> Result<Token, ScanError> {
        let indent = self.indent + 1;
        let start_mark = self.mark;
        let mut end_mark = self.mark;

        let mut string = String::with_capacity(32);
        let mut leading_break = String::with_capacity(32);
        let mut trailing_breaks = String::with_capacity(32);
        let mut whitespaces = String::with_capacity(32);
        let mut leading_blanks = false;

        loop {
            self.input.lookahead(4);
            if (self.mark.col == 0 && self.input.next_is_document_indicator())
                || self.input.peek() == '#'
            {
                break;
            }

            while !is_blank_or_breakz(self.input.peek()) {
                if !self.input.next_can_be_plain_scalar(self.flow_level > 0) {
                    break;
                }

                // Join the whitespaces or fold the line breaks seen since the last chunk.
                if leading_blanks {
                    fold_breaks(&mut string, &mut leading_break, &mut trailing_breaks);
                    leading_blanks = false;
                } else if !whitespaces.is_empty() {
                    string.push_str(&whitespaces);
                    whitespaces.clear();
                }

                let c = self.input.peek();
                self.check_printable(c)?;
                string.push(c);
                self.skip_non_blank();
                self.input.lookahead(2);
                end_mark = self.mark;
            }

            // We may reach the end of a plain scalar if:
            //  - We reach eof
            //  - We reach ": "
            //  - We find a flow character in a flow context
            if !(is_blank(self.input.peek()) || is_break(self.input.peek())) {
                break;
            }

            // Process blank characters.
            while is_blank(self.input.look_ch()) || is_break(self.input.peek()) {
                if is_blank(self.input.peek()) {
                    if !leading_blanks {
                        whitespaces.push(self.input.peek());
                        self.skip_blank();
                    } else if (self.mark.col as isize) < indent && self.input.peek() == '\t' {
                        // Tabs in an indentation columns are allowed if and only if the line is
                        // empty. Skip to the end of the line.
                        let tab_mark = self.mark;
                        self.skip_ws_to_eol(SkipTabs::Yes)?;
                        if !is_breakz(self.input.peek()) {
                            return Err(ScanError::new_str(
                                tab_mark,
                                "found a tab character that violates indentation",
                            )
                            .with_context("while scanning a plain scalar", start_mark));
                        }
                    } else {
                        self.skip_blank();
                    }
                } else if leading_blanks {
                    // Check if it is a first line break
                    self.read_break(&mut trailing_breaks);
                } else {
                    whitespaces.clear();
                    self.read_break(&mut leading_break);
                    leading_blanks = true;
                }
            }

            // check indentation level
            if self.flow_level == 0 && (self.mark.col as isize) < indent {
                break;
            }
        }

        if leading_blanks {
            self.simple_key_allowed = true;
        }

        Ok(Token(
            Span::new(start_mark, end_mark),
            TokenType::Scalar(ScalarStyle::Plain, string),
        ))
    }

    fn fetch_key(&mut self) -> ScanResult {
        let start_mark = self.mark;
        if self.flow_level == 0 {
            // Check if we are allowed to start a new key (not necessarily simple).
            if !self.simple_key_allowed {
                return Err(ScanError::new_str(
                    self.mark,
                    "mapping keys are not allowed in this context",
                ));
            }
            self.roll_indent(
                start_mark.col,
                None,
                TokenType::BlockMappingStart,
                start_mark,
            );
        }

        self.remove_simple_key()?;

        self.simple_key_allowed = self.flow_level == 0;

        self.skip_non_blank();
        self.tokens
            .push_back(Token(Span::new(start_mark, self.mark), TokenType::Key));
        Ok(())
    }

    /// Fetch a value from a mapping (after a `:`).
    fn fetch_value(&mut self) -> ScanResult {
        let sk = self.simple_keys[self.flow_level].clone();
        let start_mark = self.mark;

        if sk.possible {
            // insert simple key
            let tok = Token(Span::empty(sk.mark), TokenType::Key);
            self.tokens.insert(sk.token_number - self.tokens_parsed, tok);

            // Add the BLOCK-MAPPING-START token if needed.
            self.roll_indent(
                sk.mark.col,
                Some(sk.token_number),
                TokenType::BlockMappingStart,
                sk.mark,
            );

            self.simple_keys[self.flow_level].possible = false;
            self.simple_key_allowed = false;
        } else {
            // The ':' indicator follows a complex key.
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Err(ScanError::new_str(
                        start_mark,
                        "mapping values are not allowed in this context",
                    ));
                }

                self.roll_indent(
                    start_mark.col,
                    None,
                    TokenType::BlockMappingStart,
                    start_mark,
                );
            }

            self.simple_key_allowed = self.flow_level == 0;
        }

        // Skip over ':'.
        self.skip_non_blank();
        self.tokens
            .push_back(Token(Span::new(start_mark, self.mark), TokenType::Value));

        Ok(())
    }

    /// Add an indentation level to the stack with the given block token, if needed.
    ///
    /// An indentation level is added only if:
    ///   - We are not in a flow-style construct (which don't have indentation per-se).
    ///   - The current column is further indented than the last indent we have registered.
    fn roll_indent(&mut self, col: usize, number: Option<usize>, tok: TokenType, mark: Marker) {
        if self.flow_level > 0 {
            return;
        }

        if self.indent < col as isize {
            self.indents.push(self.indent);
            self.indent = col as isize;
            let tok = Token(Span::empty(mark), tok);
            match number {
                Some(n) => self.tokens.insert(n - self.tokens_parsed, tok),
                None => self.tokens.push_back(tok),
            }
        }
    }

    /// Pop indentation levels from the stack as much as needed.
    ///
    /// Indentation levels are popped from the stack while they are further indented than `col`.
    /// If we are in a flow-style construct (which don't have indentation per-se), this function
    /// does nothing.
    fn unroll_indent(&mut self, col: isize) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > col {
            self.tokens
                .push_back(Token(Span::empty(self.mark), TokenType::BlockEnd));
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    /// Mark the next token to be inserted as a potential simple key.
    fn save_simple_key(&mut self) -> ScanResult {
        if self.simple_key_allowed {
            let required = self.flow_level == 0 && self.indent == (self.mark.col as isize);
            let sk = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_parsed + self.tokens.len(),
                mark: self.mark,
            };

            self.remove_simple_key()?;
            self.simple_keys[self.flow_level] = sk;
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> ScanResult {
        let mark = self.mark;
        let last = &mut self.simple_keys[self.flow_level];
        if last.possible && last.required {
            return Err(ScanError::new_str(mark, "could not find expected ':'")
                .with_context("while scanning a simple key", last.mark));
        }

        last.possible = false;
        Ok(())
    }
}

/// Join the line breaks between two chunks of a flow or plain scalar.
///
/// A lone `\n` folds into a space, and a `\n` followed by more breaks is dropped. LS and PS are
/// always kept.
fn fold_breaks(string: &mut String, leading_break: &mut String, trailing_breaks: &mut String) {
    if leading_break == "\n" {
        if trailing_breaks.is_empty() {
            string.push(' ');
        }
    } else {
        string.push_str(leading_break);
    }
    string.push_str(trailing_breaks);
    leading_break.clear();
    trailing_breaks.clear();
}

/// Chomping, how final line breaks and trailing empty lines are interpreted.
///
/// See YAML spec 8.1.1.2.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Chomping {
    /// The final line break and any trailing empty lines are excluded.
    Strip,
    /// The final line break is preserved, but trailing empty lines are excluded.
    Clip,
    /// The final line break and trailing empty lines are included.
    Keep,
}

impl Chomping {
    /// Map a `+` / `-` block scalar header indicator to its chomping method.
    fn from_indicator(c: char) -> Chomping {
        if c == '+' {
            Chomping::Keep
        } else {
            Chomping::Strip
        }
    }
}
