//! Home to the YAML Parser.
//!
//! The parser takes input from the [`crate::scanner::Scanner`], performs final checks for YAML
//! compliance, and emits a stream of YAML events. This stream can for instance be used to create
//! YAML objects.

use std::fmt;

use hashlink::LinkedHashMap;

use crate::{
    error::ScanError,
    input::{str::StrInput, BufferedInput, Input},
    scanner::{Marker, ScalarStyle, Scanner, Span, Token, TokenType},
};

#[derive(Clone, Copy, PartialEq, Debug, Eq)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// The `%TAG` directives of a document, mapping handles to prefixes in declaration order.
pub type TagDirectives = LinkedHashMap<String, String>;

/// The prefix the `!!` handle expands to unless a `%TAG` directive overrides it.
pub const CORE_SCHEMA_PREFIX: &str = "tag:yaml.org,2002:";

/// An event generated by the YAML parser.
///
/// Events are used in the low-level event-based API (push parser). The API entrypoint is the
/// [`EventReceiver`] trait.
#[derive(Clone, PartialEq, Debug, Eq)]
pub enum Event {
    /// Event generated at the very beginning of parsing.
    StreamStart,
    /// Last event that will be generated by the parser. Signals EOF.
    StreamEnd,
    /// The start of a YAML document.
    DocumentStart {
        /// Whether the document started with a `---` marker.
        explicit: bool,
        /// The version given by a `%YAML` directive, if any.
        version: Option<(u32, u32)>,
        /// The `%TAG` directives declared for this document.
        tags: TagDirectives,
    },
    /// The YAML end document directive.
    DocumentEnd {
        /// Whether the document ended with a `...` marker.
        explicit: bool,
    },
    /// A YAML Alias, referring to the anchor of the given name.
    Alias(String),
    /// A YAML scalar.
    Scalar {
        /// The contents of the scalar, with escapes resolved and lines folded.
        value: String,
        /// The style the scalar was written in.
        style: ScalarStyle,
        /// The anchor of the scalar, if any.
        anchor: Option<String>,
        /// The resolved tag of the scalar, if any.
        tag: Option<Tag>,
        /// Whether the tag of the scalar may be left to the resolver.
        implicit: Implicit,
    },
    /// The start of a YAML sequence (array).
    SequenceStart {
        /// The anchor of the sequence, if any.
        anchor: Option<String>,
        /// The resolved tag of the sequence, if any.
        tag: Option<Tag>,
        /// Whether the sequence is written in flow style (`[a, b]`).
        flow: bool,
    },
    /// The end of a YAML sequence (array).
    SequenceEnd,
    /// The start of a YAML mapping (object, hash).
    MappingStart {
        /// The anchor of the mapping, if any.
        anchor: Option<String>,
        /// The resolved tag of the mapping, if any.
        tag: Option<Tag>,
        /// Whether the mapping is written in flow style (`{a: b}`).
        flow: bool,
    },
    /// The end of a YAML mapping (object, hash).
    MappingEnd,
}

/// A YAML tag.
///
/// After parsing, `handle` holds the prefix the handle resolved to, so that `handle` followed by
/// `suffix` is the full tag. Verbatim tags (`!<...>`) and the non-specific tag `!` have an empty
/// handle.
#[derive(Clone, PartialEq, Debug, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    /// Handle of the tag (`!` included).
    pub handle: String,
    /// The suffix of the tag.
    pub suffix: String,
}

impl Tag {
    /// Return whether this is the non-specific tag `!`.
    #[must_use]
    pub fn is_non_specific(&self) -> bool {
        self.handle.is_empty() && self.suffix == "!"
    }

    /// Return whether the tag belongs to the `tag:yaml.org,2002:` namespace.
    #[must_use]
    pub fn is_yaml_core_schema(&self) -> bool {
        self.handle == CORE_SCHEMA_PREFIX
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.handle, self.suffix)
    }
}

/// Whether a scalar's tag may be omitted when writing it back.
///
/// `plain` is set when the tag may be omitted if the scalar is written plain, `quoted` when it
/// may be omitted if the scalar is written in any other style.
#[derive(Clone, Copy, PartialEq, Debug, Eq, Default, Hash)]
pub struct Implicit {
    /// The tag is implied by a plain rendition of the scalar.
    pub plain: bool,
    /// The tag is implied by a quoted or block rendition of the scalar.
    pub quoted: bool,
}

impl Implicit {
    /// Compute the flags of a scalar written in `style` with the given tag.
    #[must_use]
    pub fn for_scalar(tag: Option<&Tag>, style: ScalarStyle) -> Implicit {
        match tag {
            None if style == ScalarStyle::Plain => Implicit {
                plain: true,
                quoted: false,
            },
            None => Implicit {
                plain: false,
                quoted: true,
            },
            Some(tag) if tag.is_non_specific() => Implicit {
                plain: true,
                quoted: false,
            },
            Some(_) => Implicit::default(),
        }
    }
}

impl Event {
    /// Create an empty scalar.
    fn empty_scalar() -> Event {
        Event::empty_scalar_with_properties(None, None)
    }

    /// Create an empty scalar carrying the given anchor and tag.
    fn empty_scalar_with_properties(anchor: Option<String>, tag: Option<Tag>) -> Event {
        let implicit = Implicit::for_scalar(tag.as_ref(), ScalarStyle::Plain);
        Event::Scalar {
            value: String::new(),
            style: ScalarStyle::Plain,
            anchor,
            tag,
            implicit,
        }
    }
}

/// A YAML parser.
#[derive(Debug)]
pub struct Parser<T> {
    /// The underlying scanner from which we pull tokens.
    scanner: Scanner<T>,
    /// The stack of _previous_ states we were in.
    ///
    /// States are pushed in the context of subobjects to this stack. The top-most element is the
    /// state in which to come back to when exiting the current state.
    states: Vec<State>,
    /// The state in which we currently are.
    state: State,
    /// The start positions of the collections being parsed, used as error contexts.
    marks: Vec<Marker>,
    /// The next token from the scanner.
    token: Option<Token>,
    /// The next YAML event to emit.
    current: Option<(Event, Span)>,
    /// The tag handles in scope, from `%TAG` directives.
    tags: TagDirectives,
    /// Make tags persistent when parsing multiple documents.
    ///
    /// By default, the `%TAG` directives of a document only apply to that document.
    keep_tags: bool,
    /// The first error encountered. Once set, the parser keeps returning it.
    error: Option<ScanError>,
    /// Whether the iterator interface has returned its last item.
    finished: bool,
}

/// Trait to be implemented in order to use the low-level parsing API.
///
/// The low-level parsing API is event-based (a push parser), calling [`EventReceiver::on_event`]
/// for each YAML [`Event`] that occurs.
/// The [`EventReceiver`] trait only receives events. In order to receive both events and their
/// location in the source, use [`SpannedEventReceiver`]. Note that [`EventReceiver`]s implement
/// [`SpannedEventReceiver`] automatically.
///
/// # Event hierarchy
/// The event stream starts with an [`Event::StreamStart`] event followed by an
/// [`Event::DocumentStart`] event. If the YAML document starts with a mapping (an object), an
/// [`Event::MappingStart`] event is emitted. If it starts with a sequence (an array), an
/// [`Event::SequenceStart`] event is emitted. Otherwise, an [`Event::Scalar`] event is emitted.
///
/// In a mapping, key-values are sent as consecutive events. The first event after an
/// [`Event::MappingStart`] will be the key, and following its value. If the mapping contains no
/// sub-mapping or sub-sequence, then even events (starting from 0) will always be keys and odd
/// ones will always be values. The mapping ends when an [`Event::MappingEnd`] event is received.
///
/// In a sequence, values are sent consecutively until the [`Event::SequenceEnd`] event.
///
/// If a value is a sub-mapping or a sub-sequence, an [`Event::MappingStart`] or
/// [`Event::SequenceStart`] event will be sent respectively. Following events until the
/// associated [`Event::MappingEnd`] or [`Event::SequenceEnd`] (beware of nested mappings or
/// sequences) will be part of the value and not another key-value pair or element in the
/// sequence.
///
/// For instance, the following yaml:
/// ```yaml
/// a: b
/// c:
///   d: e
/// f:
///   - g
///   - h
/// ```
/// will emit (indented and commented for visibility):
/// ```text
/// StreamStart, DocumentStart, MappingStart,
///   Scalar("a", ..), Scalar("b", ..)
///   Scalar("c", ..), MappingStart, Scalar("d", ..), Scalar("e", ..), MappingEnd,
///   Scalar("f", ..), SequenceStart, Scalar("g", ..), Scalar("h", ..), SequenceEnd,
/// MappingEnd, DocumentEnd, StreamEnd
/// ```
///
/// # Example
/// ```
/// # use yarrow_parser::{Event, EventReceiver, Parser};
/// #
/// /// Sink of events. Collects them into an array.
/// struct EventSink {
///     events: Vec<Event>,
/// }
///
/// /// Implement `on_event`, pushing into `self.events`.
/// impl EventReceiver for EventSink {
///     fn on_event(&mut self, ev: Event) {
///         self.events.push(ev);
///     }
/// }
///
/// /// Load events from a yaml string.
/// fn str_to_events(yaml: &str) -> Vec<Event> {
///     let mut sink = EventSink { events: Vec::new() };
///     let mut parser = Parser::new_from_str(yaml);
///     // Load events using our sink as the receiver.
///     parser.load(&mut sink, true).unwrap();
///     sink.events
/// }
/// ```
pub trait EventReceiver {
    /// Handler called for each YAML event that is emitted by the parser.
    fn on_event(&mut self, ev: Event);
}

/// Trait to be implemented for using the low-level parsing API.
///
/// Functionally similar to [`EventReceiver`], but receives a [`Span`] as well as the event.
pub trait SpannedEventReceiver {
    /// Handler called for each event that occurs.
    fn on_event(&mut self, ev: Event, span: Span);
}

impl<R: EventReceiver> SpannedEventReceiver for R {
    fn on_event(&mut self, ev: Event, _span: Span) {
        self.on_event(ev);
    }
}

/// A convenience alias for a `Result` of a parser event.
pub type ParseResult = Result<(Event, Span), ScanError>;

impl<'input> Parser<StrInput<'input>> {
    /// Create a new instance of a parser from a &str.
    #[must_use]
    pub fn new_from_str(value: &'input str) -> Self {
        Parser::new(StrInput::new(value))
    }
}

impl<T> Parser<BufferedInput<T>>
where
    T: Iterator<Item = char>,
{
    /// Create a new instance of a parser from an iterator of `char`s.
    #[must_use]
    pub fn new_from_iter(iter: T) -> Self {
        Parser::new(BufferedInput::new(iter))
    }
}

impl<T: Input> Parser<T> {
    /// Create a new instance of a parser from the given input.
    pub fn new(src: T) -> Parser<T> {
        Parser {
            scanner: Scanner::new(src),
            states: Vec::new(),
            state: State::StreamStart,
            marks: Vec::new(),
            token: None,
            current: None,
            tags: TagDirectives::new(),
            keep_tags: false,
            error: None,
            finished: false,
        }
    }

    /// Whether to keep tags across multiple documents when parsing.
    ///
    /// This behavior is non-standard as per the YAML specification but can be encountered in the
    /// wild. This boolean allows enabling this non-standard extension. This would result in the
    /// parser accepting input from [test
    /// QLJ7](https://github.com/yaml/yaml-test-suite/blob/ccfa74e56afb53da960847ff6e6976c0a0825709/src/QLJ7.yaml)
    /// of the yaml-test-suite:
    ///
    /// ```yaml
    /// %TAG !prefix! tag:example.com,2011:
    /// --- !prefix!A
    /// a: b
    /// --- !prefix!B
    /// c: d
    /// --- !prefix!C
    /// e: f
    /// ```
    ///
    /// With `keep_tags` set to `false`, the above YAML is rejected. As per the specification, tags
    /// only apply to the document immediately following them. This would error on `!prefix!B`.
    ///
    /// With `keep_tags` set to `true`, the above YAML is accepted by the parser.
    #[must_use]
    pub fn keep_tags(mut self, value: bool) -> Self {
        self.keep_tags = value;
        self
    }

    /// Try to load the next event and return it, but do not consuming it from `self`.
    ///
    /// Any subsequent call to [`Parser::peek`] will return the same value, until a call to
    /// [`Iterator::next`] or [`Parser::load`].
    ///
    /// # Errors
    /// Returns `ScanError` when loading the next event fails.
    pub fn peek(&mut self) -> Option<Result<&(Event, Span), ScanError>> {
        if self.finished {
            return None;
        }
        if self.current.is_none() {
            match self.next_event_impl() {
                Ok(next) => self.current = Some(next),
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
        self.current.as_ref().map(Ok)
    }

    /// Try to load the next event and return it, consuming it from `self`.
    ///
    /// Returns `None` once [`Event::StreamEnd`] or an error has been returned.
    pub fn next_event(&mut self) -> Option<ParseResult> {
        if self.finished {
            return None;
        }
        let next = self.next_event_impl();
        if matches!(next, Ok((Event::StreamEnd, _)) | Err(_)) {
            self.finished = true;
        }
        Some(next)
    }

    /// Implementation function for [`Self::next_event`] without the `Option`.
    ///
    /// [`Self::next_event`] should conform to the expectations of an [`Iterator`] and return an
    /// option. This burdens the parser code. This function is used internally when an option is
    /// undesirable.
    fn next_event_impl(&mut self) -> ParseResult {
        if let Some(current) = self.current.take() {
            return Ok(current);
        }
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.parse() {
            Ok(next) => Ok(next),
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Peek at the next token from the scanner.
    fn peek_token(&mut self) -> Result<&Token, ScanError> {
        let token = match self.token.take() {
            Some(token) => token,
            None => self.scan_next_token()?,
        };
        Ok(self.token.insert(token))
    }

    /// Extract and return the next token from the scanner.
    ///
    /// This function does _not_ make use of `self.token`.
    fn scan_next_token(&mut self) -> Result<Token, ScanError> {
        match self.scanner.next_token()? {
            Some(token) => {
                debug_print!(
                    "    \x1B[;32m\u{21B3} {:?} \x1B[;36m{:?}\x1B[;m",
                    token.1,
                    token.0
                );
                Ok(token)
            }
            None => Err(ScanError::parser(
                self.scanner.mark(),
                "unexpected end of token stream",
            )),
        }
    }

    fn fetch_token(&mut self) -> Token {
        self.token
            .take()
            .expect("fetch_token needs to be preceded by peek_token")
    }

    /// Skip the next token from the scanner.
    fn skip(&mut self) {
        self.token = None;
    }

    /// Pops the top-most state and make it the current state.
    fn pop_state(&mut self) {
        self.state = self.states.pop().unwrap_or(State::End);
    }

    /// Push a new state atop the state stack.
    fn push_state(&mut self, state: State) {
        self.states.push(state);
    }

    /// Pops the start position of the innermost collection.
    fn pop_mark(&mut self) {
        self.marks.pop();
    }

    /// Return the start position of the innermost collection.
    fn collection_mark(&self) -> Marker {
        self.marks.last().copied().unwrap_or_default()
    }

    fn parse(&mut self) -> ParseResult {
        if self.state == State::End {
            return Ok((Event::StreamEnd, Span::empty(self.scanner.mark())));
        }
        let (ev, span) = self.state_machine()?;
        debug_print!("\x1B[;35m{:?}\x1B[;m {:?}", ev, span);
        Ok((ev, span))
    }

    /// Load the YAML from the stream in `self`, pushing events into `recv`.
    ///
    /// The contents of the stream are parsed and the corresponding events are sent into the
    /// receiver. For detailed explanations about how events work, see [`EventReceiver`].
    ///
    /// If `multi` is set to `true`, the parser will allow parsing of multiple YAML documents
    /// inside the stream.
    ///
    /// Note that any [`EventReceiver`] is also a [`SpannedEventReceiver`], so implementing the
    /// former is enough to call this function.
    /// # Errors
    /// Returns `ScanError` when loading fails.
    pub fn load<R: SpannedEventReceiver>(
        &mut self,
        recv: &mut R,
        multi: bool,
    ) -> Result<(), ScanError> {
        if !self.scanner.stream_started() || matches!(self.current, Some((Event::StreamStart, _)))
        {
            let (ev, span) = self.next_event_impl()?;
            if ev != Event::StreamStart {
                return Err(ScanError::parser(
                    span.start,
                    "did not find expected <stream-start>",
                ));
            }
            recv.on_event(ev, span);
        }

        if self.state == State::End && self.current.is_none() {
            recv.on_event(Event::StreamEnd, Span::empty(self.scanner.mark()));
            return Ok(());
        }
        loop {
            let (ev, span) = self.next_event_impl()?;
            if ev == Event::StreamEnd {
                recv.on_event(ev, span);
                return Ok(());
            }
            self.load_document(ev, span, recv)?;
            if !multi {
                break;
            }
        }
        Ok(())
    }

    fn load_document<R: SpannedEventReceiver>(
        &mut self,
        first_ev: Event,
        span: Span,
        recv: &mut R,
    ) -> Result<(), ScanError> {
        if !matches!(first_ev, Event::DocumentStart { .. }) {
            return Err(ScanError::parser(
                span.start,
                "did not find expected <document start>",
            ));
        }
        recv.on_event(first_ev, span);

        let (ev, span) = self.next_event_impl()?;
        self.load_node(ev, span, recv)?;

        // DOCUMENT-END is expected.
        let (ev, span) = self.next_event_impl()?;
        if !matches!(ev, Event::DocumentEnd { .. }) {
            return Err(ScanError::parser(
                span.start,
                "did not find expected <document end>",
            ));
        }
        recv.on_event(ev, span);

        Ok(())
    }

    /// Forward the events of one node, including all of its children, to `recv`.
    fn load_node<R: SpannedEventReceiver>(
        &mut self,
        first_ev: Event,
        span: Span,
        recv: &mut R,
    ) -> Result<(), ScanError> {
        let (mut ev, mut span) = (first_ev, span);
        let mut depth = 0usize;
        loop {
            match ev {
                Event::SequenceStart { .. } | Event::MappingStart { .. } => depth += 1,
                Event::SequenceEnd | Event::MappingEnd => depth = depth.saturating_sub(1),
                Event::Alias(_) | Event::Scalar { .. } => {}
                _ => {
                    return Err(ScanError::parser(
                        span.start,
                        "did not find expected node content",
                    ))
                }
            }
            recv.on_event(ev, span);
            if depth == 0 {
                return Ok(());
            }
            (ev, span) = self.next_event_impl()?;
        }
    }

    fn state_machine(&mut self) -> ParseResult {
        debug_print!("\n\x1B[;33mParser state: {:?} \x1B[;0m", self.state);

        match self.state {
            State::StreamStart => self.stream_start(),

            State::ImplicitDocumentStart => self.document_start(true),
            State::DocumentStart => self.document_start(false),
            State::DocumentContent => self.document_content(),
            State::DocumentEnd => self.document_end(),

            State::BlockNode => self.parse_node(true, false),
            State::BlockMappingFirstKey => self.block_mapping_key(true),
            State::BlockMappingKey => self.block_mapping_key(false),
            State::BlockMappingValue => self.block_mapping_value(),

            State::BlockSequenceFirstEntry => self.block_sequence_entry(true),
            State::BlockSequenceEntry => self.block_sequence_entry(false),

            State::FlowSequenceFirstEntry => self.flow_sequence_entry(true),
            State::FlowSequenceEntry => self.flow_sequence_entry(false),

            State::FlowMappingFirstKey => self.flow_mapping_key(true),
            State::FlowMappingKey => self.flow_mapping_key(false),
            State::FlowMappingValue => self.flow_mapping_value(false),

            State::IndentlessSequenceEntry => self.indentless_sequence_entry(),

            State::FlowSequenceEntryMappingKey => self.flow_sequence_entry_mapping_key(),
            State::FlowSequenceEntryMappingValue => self.flow_sequence_entry_mapping_value(),
            State::FlowSequenceEntryMappingEnd => self.flow_sequence_entry_mapping_end(),
            State::FlowMappingEmptyValue => self.flow_mapping_value(true),

            /* impossible */
            State::End => unreachable!(),
        }
    }

    fn stream_start(&mut self) -> ParseResult {
        match *self.peek_token()? {
            Token(span, TokenType::StreamStart) => {
                self.state = State::ImplicitDocumentStart;
                self.skip();
                Ok((Event::StreamStart, span))
            }
            Token(span, _) => Err(ScanError::parser(
                span.start,
                "did not find expected <stream-start>",
            )),
        }
    }

    fn document_start(&mut self, implicit: bool) -> ParseResult {
        while let TokenType::DocumentEnd = self.peek_token()?.1 {
            self.skip();
        }

        match *self.peek_token()? {
            Token(span, TokenType::StreamEnd) => {
                self.state = State::End;
                self.skip();
                Ok((Event::StreamEnd, span))
            }
            Token(
                span,
                TokenType::VersionDirective(..)
                | TokenType::TagDirective(..)
                | TokenType::ReservedDirective(..),
            ) if !implicit => Err(ScanError::parser(
                span.start,
                "missing explicit document end marker before directive",
            )),
            Token(
                _,
                TokenType::VersionDirective(..)
                | TokenType::TagDirective(..)
                | TokenType::ReservedDirective(..)
                | TokenType::DocumentStart,
            ) => {
                // explicit document
                self.explicit_document_start()
            }
            Token(span, _) if implicit => {
                self.start_document_scope();
                self.push_state(State::DocumentEnd);
                self.state = State::BlockNode;
                Ok((
                    Event::DocumentStart {
                        explicit: false,
                        version: None,
                        tags: TagDirectives::new(),
                    },
                    Span::empty(span.start),
                ))
            }
            Token(span, _) => Err(ScanError::parser(
                span.start,
                "did not find expected <document start>",
            )),
        }
    }

    /// Reset the tag handles in scope, unless they are kept across documents.
    fn start_document_scope(&mut self) {
        if !self.keep_tags {
            self.tags.clear();
        }
    }

    /// Consume the directives in front of a document.
    ///
    /// Return the `%YAML` version and the `%TAG` directives that were declared.
    fn process_directives(&mut self) -> Result<(Option<(u32, u32)>, TagDirectives), ScanError> {
        let mut version = None;
        let mut declared = TagDirectives::new();
        loop {
            match self.peek_token()? {
                Token(span, TokenType::VersionDirective(major, minor)) => {
                    if version.is_some() {
                        return Err(ScanError::parser(
                            span.start,
                            "found duplicate %YAML directive",
                        ));
                    }
                    version = Some((*major, *minor));
                }
                Token(span, TokenType::TagDirective(handle, prefix)) => {
                    if declared.contains_key(handle) {
                        return Err(ScanError::parser(
                            span.start,
                            "found duplicate %TAG directive",
                        ));
                    }
                    declared.insert(handle.clone(), prefix.clone());
                }
                Token(_, TokenType::ReservedDirective(..)) => {}
                _ => break,
            }
            self.skip();
        }
        for (handle, prefix) in &declared {
            self.tags.insert(handle.clone(), prefix.clone());
        }
        Ok((version, declared))
    }

    fn explicit_document_start(&mut self) -> ParseResult {
        self.start_document_scope();
        let (version, tags) = self.process_directives()?;
        match *self.peek_token()? {
            Token(span, TokenType::DocumentStart) => {
                self.push_state(State::DocumentEnd);
                self.state = State::DocumentContent;
                self.skip();
                Ok((
                    Event::DocumentStart {
                        explicit: true,
                        version,
                        tags,
                    },
                    span,
                ))
            }
            Token(span, _) => Err(ScanError::parser(
                span.start,
                "did not find expected <document start>",
            )),
        }
    }

    fn document_content(&mut self) -> ParseResult {
        match *self.peek_token()? {
            Token(
                span,
                TokenType::VersionDirective(..)
                | TokenType::TagDirective(..)
                | TokenType::ReservedDirective(..)
                | TokenType::DocumentStart
                | TokenType::DocumentEnd
                | TokenType::StreamEnd,
            ) => {
                self.pop_state();
                // empty scalar
                Ok((Event::empty_scalar(), Span::empty(span.start)))
            }
            _ => self.parse_node(true, false),
        }
    }

    fn document_end(&mut self) -> ParseResult {
        let (explicit, span) = match *self.peek_token()? {
            Token(span, TokenType::DocumentEnd) => {
                self.skip();
                (true, span)
            }
            Token(span, _) => (false, Span::empty(span.start)),
        };

        // After an explicit `...`, the next document may omit its `---`.
        self.state = if explicit {
            State::ImplicitDocumentStart
        } else {
            State::DocumentStart
        };
        Ok((Event::DocumentEnd { explicit }, span))
    }

    /// Expand the handle of a tag token using the `%TAG` directives in scope.
    fn resolve_tag(
        &self,
        span: Span,
        handle: String,
        suffix: String,
        node_mark: Marker,
    ) -> Result<Tag, ScanError> {
        if handle.is_empty() {
            return Ok(Tag { handle, suffix });
        }
        if let Some(prefix) = self.tags.get(&handle) {
            return Ok(Tag {
                handle: prefix.clone(),
                suffix,
            });
        }
        match handle.as_str() {
            "!!" => Ok(Tag {
                handle: CORE_SCHEMA_PREFIX.to_owned(),
                suffix,
            }),
            "!" => Ok(Tag { handle, suffix }),
            _ => Err(ScanError::parser(span.start, "found undefined tag handle")
                .with_context("while parsing a node", node_mark)),
        }
    }

    #[allow(clippy::too_many_lines)]
    fn parse_node(&mut self, block: bool, indentless_sequence: bool) -> ParseResult {
        let mut anchor = None;
        let mut tag = None;
        let mut tag_span = Span::default();
        let node_start = self.peek_token()?.0.start;
        let mut properties_end = node_start;

        if let Token(_, TokenType::Alias(_)) = self.peek_token()? {
            self.pop_state();
            if let Token(span, TokenType::Alias(name)) = self.fetch_token() {
                return Ok((Event::Alias(name), span));
            }
            unreachable!()
        }

        // Node properties, in any order, at most one of each.
        loop {
            match self.peek_token()? {
                Token(_, TokenType::Anchor(_)) if anchor.is_none() => {
                    if let Token(span, TokenType::Anchor(name)) = self.fetch_token() {
                        anchor = Some(name);
                        properties_end = span.end;
                    }
                }
                Token(_, TokenType::Tag(..)) if tag.is_none() => {
                    if let Token(span, TokenType::Tag(handle, suffix)) = self.fetch_token() {
                        tag = Some((handle, suffix));
                        tag_span = span;
                        properties_end = span.end;
                    }
                }
                _ => break,
            }
        }

        let tag = match tag {
            Some((handle, suffix)) => Some(self.resolve_tag(tag_span, handle, suffix, node_start)?),
            None => None,
        };

        match *self.peek_token()? {
            Token(span, TokenType::BlockEntry) if indentless_sequence => {
                self.state = State::IndentlessSequenceEntry;
                self.marks.push(span.start);
                Ok((
                    Event::SequenceStart {
                        anchor,
                        tag,
                        flow: false,
                    },
                    Span::new(node_start, span.start),
                ))
            }
            Token(_, TokenType::Scalar(..)) => {
                self.pop_state();
                if let Token(span, TokenType::Scalar(style, value)) = self.fetch_token() {
                    let implicit = Implicit::for_scalar(tag.as_ref(), style);
                    Ok((
                        Event::Scalar {
                            value,
                            style,
                            anchor,
                            tag,
                            implicit,
                        },
                        Span::new(node_start, span.end),
                    ))
                } else {
                    unreachable!()
                }
            }
            Token(span, TokenType::FlowSequenceStart) => {
                self.state = State::FlowSequenceFirstEntry;
                Ok((
                    Event::SequenceStart {
                        anchor,
                        tag,
                        flow: true,
                    },
                    Span::new(node_start, span.end),
                ))
            }
            Token(span, TokenType::FlowMappingStart) => {
                self.state = State::FlowMappingFirstKey;
                Ok((
                    Event::MappingStart {
                        anchor,
                        tag,
                        flow: true,
                    },
                    Span::new(node_start, span.end),
                ))
            }
            Token(span, TokenType::BlockSequenceStart) if block => {
                self.state = State::BlockSequenceFirstEntry;
                Ok((
                    Event::SequenceStart {
                        anchor,
                        tag,
                        flow: false,
                    },
                    Span::new(node_start, span.end),
                ))
            }
            Token(span, TokenType::BlockMappingStart) if block => {
                self.state = State::BlockMappingFirstKey;
                Ok((
                    Event::MappingStart {
                        anchor,
                        tag,
                        flow: false,
                    },
                    Span::new(node_start, span.end),
                ))
            }
            // ex 7.2, an empty scalar can follow a secondary tag
            _ if tag.is_some() || anchor.is_some() => {
                self.pop_state();
                Ok((
                    Event::empty_scalar_with_properties(anchor, tag),
                    Span::new(node_start, properties_end),
                ))
            }
            Token(span, _) => {
                let context = if block {
                    "while parsing a block node"
                } else {
                    "while parsing a flow node"
                };
                Err(
                    ScanError::parser(span.start, "did not find expected node content")
                        .with_context(context, node_start),
                )
            }
        }
    }

    fn block_mapping_key(&mut self, first: bool) -> ParseResult {
        // skip BlockMappingStart
        if first {
            let start = self.peek_token()?.0.start;
            self.marks.push(start);
            self.skip();
        }
        match *self.peek_token()? {
            Token(_, TokenType::Key) => {
                self.skip();
                if let Token(span, TokenType::Key | TokenType::Value | TokenType::BlockEnd) =
                    *self.peek_token()?
                {
                    self.state = State::BlockMappingValue;
                    // empty scalar
                    Ok((Event::empty_scalar(), Span::empty(span.start)))
                } else {
                    self.push_state(State::BlockMappingValue);
                    self.parse_node(true, true)
                }
            }
            // XXX(chenyh): libyaml failed to parse spec 1.2, ex8.18
            Token(span, TokenType::Value) => {
                self.state = State::BlockMappingValue;
                Ok((Event::empty_scalar(), Span::empty(span.start)))
            }
            Token(span, TokenType::BlockEnd) => {
                self.pop_state();
                self.pop_mark();
                self.skip();
                Ok((Event::MappingEnd, span))
            }
            Token(span, _) => Err(ScanError::parser(span.start, "did not find expected key")
                .with_context("while parsing a block mapping", self.collection_mark())),
        }
    }

    fn block_mapping_value(&mut self) -> ParseResult {
        match *self.peek_token()? {
            Token(_, TokenType::Value) => {
                self.skip();
                if let Token(span, TokenType::Key | TokenType::Value | TokenType::BlockEnd) =
                    *self.peek_token()?
                {
                    self.state = State::BlockMappingKey;
                    // empty scalar
                    Ok((Event::empty_scalar(), Span::empty(span.start)))
                } else {
                    self.push_state(State::BlockMappingKey);
                    self.parse_node(true, true)
                }
            }
            Token(span, _) => {
                self.state = State::BlockMappingKey;
                // empty scalar
                Ok((Event::empty_scalar(), Span::empty(span.start)))
            }
        }
    }

    fn flow_mapping_key(&mut self, first: bool) -> ParseResult {
        if first {
            let start = self.peek_token()?.0.start;
            self.marks.push(start);
            self.skip();
        }

        if !matches!(self.peek_token()?.1, TokenType::FlowMappingEnd) {
            if !first {
                match *self.peek_token()? {
                    Token(_, TokenType::FlowEntry) => self.skip(),
                    Token(span, _) => {
                        return Err(ScanError::parser(
                            span.start,
                            "did not find expected ',' or '}'",
                        )
                        .with_context("while parsing a flow mapping", self.collection_mark()));
                    }
                }
            }

            match *self.peek_token()? {
                Token(_, TokenType::Key) => {
                    self.skip();
                    if let Token(
                        span,
                        TokenType::Value | TokenType::FlowEntry | TokenType::FlowMappingEnd,
                    ) = *self.peek_token()?
                    {
                        self.state = State::FlowMappingValue;
                        return Ok((Event::empty_scalar(), Span::empty(span.start)));
                    }
                    self.push_state(State::FlowMappingValue);
                    return self.parse_node(false, false);
                }
                Token(span, TokenType::Value) => {
                    self.state = State::FlowMappingValue;
                    return Ok((Event::empty_scalar(), Span::empty(span.start)));
                }
                Token(_, TokenType::FlowMappingEnd) => (),
                _ => {
                    self.push_state(State::FlowMappingEmptyValue);
                    return self.parse_node(false, false);
                }
            }
        }

        let span = self.peek_token()?.0;
        self.pop_state();
        self.pop_mark();
        self.skip();
        Ok((Event::MappingEnd, span))
    }

    fn flow_mapping_value(&mut self, empty: bool) -> ParseResult {
        let span = self.peek_token()?.0;
        if empty {
            self.state = State::FlowMappingKey;
            return Ok((Event::empty_scalar(), Span::empty(span.start)));
        }

        if let Token(_, TokenType::Value) = self.peek_token()? {
            self.skip();
            match *self.peek_token()? {
                Token(span, TokenType::FlowEntry | TokenType::FlowMappingEnd) => {
                    self.state = State::FlowMappingKey;
                    return Ok((Event::empty_scalar(), Span::empty(span.start)));
                }
                _ => {
                    self.push_state(State::FlowMappingKey);
                    return self.parse_node(false, false);
                }
            }
        }

        self.state = State::FlowMappingKey;
        Ok((Event::empty_scalar(), Span::empty(span.start)))
    }

    fn flow_sequence_entry(&mut self, first: bool) -> ParseResult {
        // skip FlowSequenceStart
        if first {
            let start = self.peek_token()?.0.start;
            self.marks.push(start);
            self.skip();
        }
        match *self.peek_token()? {
            Token(span, TokenType::FlowSequenceEnd) => {
                self.pop_state();
                self.pop_mark();
                self.skip();
                return Ok((Event::SequenceEnd, span));
            }
            Token(_, TokenType::FlowEntry) if !first => {
                self.skip();
            }
            Token(span, _) if !first => {
                return Err(
                    ScanError::parser(span.start, "did not find expected ',' or ']'")
                        .with_context("while parsing a flow sequence", self.collection_mark()),
                );
            }
            _ => { /* next */ }
        }
        match *self.peek_token()? {
            Token(span, TokenType::FlowSequenceEnd) => {
                self.pop_state();
                self.pop_mark();
                self.skip();
                Ok((Event::SequenceEnd, span))
            }
            Token(span, TokenType::Key) => {
                self.state = State::FlowSequenceEntryMappingKey;
                self.skip();
                Ok((
                    Event::MappingStart {
                        anchor: None,
                        tag: None,
                        flow: true,
                    },
                    span,
                ))
            }
            _ => {
                self.push_state(State::FlowSequenceEntry);
                self.parse_node(false, false)
            }
        }
    }

    fn indentless_sequence_entry(&mut self) -> ParseResult {
        match *self.peek_token()? {
            Token(_, TokenType::BlockEntry) => (),
            Token(span, _) => {
                self.pop_state();
                self.pop_mark();
                return Ok((Event::SequenceEnd, Span::empty(span.start)));
            }
        }
        self.skip();
        if let Token(
            span,
            TokenType::BlockEntry | TokenType::Key | TokenType::Value | TokenType::BlockEnd,
        ) = *self.peek_token()?
        {
            self.state = State::IndentlessSequenceEntry;
            Ok((Event::empty_scalar(), Span::empty(span.start)))
        } else {
            self.push_state(State::IndentlessSequenceEntry);
            self.parse_node(true, false)
        }
    }

    fn block_sequence_entry(&mut self, first: bool) -> ParseResult {
        // BLOCK-SEQUENCE-START
        if first {
            let start = self.peek_token()?.0.start;
            self.marks.push(start);
            self.skip();
        }
        match *self.peek_token()? {
            Token(span, TokenType::BlockEnd) => {
                self.pop_state();
                self.pop_mark();
                self.skip();
                Ok((Event::SequenceEnd, span))
            }
            Token(_, TokenType::BlockEntry) => {
                self.skip();
                if let Token(span, TokenType::BlockEntry | TokenType::BlockEnd) =
                    *self.peek_token()?
                {
                    self.state = State::BlockSequenceEntry;
                    Ok((Event::empty_scalar(), Span::empty(span.start)))
                } else {
                    self.push_state(State::BlockSequenceEntry);
                    self.parse_node(true, false)
                }
            }
            Token(span, _) => Err(ScanError::parser(
                span.start,
                "did not find expected '-' indicator",
            )
            .with_context("while parsing a block collection", self.collection_mark())),
        }
    }

    fn flow_sequence_entry_mapping_key(&mut self) -> ParseResult {
        if let Token(
            span,
            TokenType::Value | TokenType::FlowEntry | TokenType::FlowSequenceEnd,
        ) = *self.peek_token()?
        {
            self.state = State::FlowSequenceEntryMappingValue;
            Ok((Event::empty_scalar(), Span::empty(span.start)))
        } else {
            self.push_state(State::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn flow_sequence_entry_mapping_value(&mut self) -> ParseResult {
        match *self.peek_token()? {
            Token(_, TokenType::Value) => {
                self.skip();
                if let Token(span, TokenType::FlowEntry | TokenType::FlowSequenceEnd) =
                    *self.peek_token()?
                {
                    self.state = State::FlowSequenceEntryMappingEnd;
                    Ok((Event::empty_scalar(), Span::empty(span.start)))
                } else {
                    self.push_state(State::FlowSequenceEntryMappingEnd);
                    self.parse_node(false, false)
                }
            }
            Token(span, _) => {
                self.state = State::FlowSequenceEntryMappingEnd;
                Ok((Event::empty_scalar(), Span::empty(span.start)))
            }
        }
    }

    fn flow_sequence_entry_mapping_end(&mut self) -> ParseResult {
        self.state = State::FlowSequenceEntry;
        let start = self.peek_token()?.0.start;
        Ok((Event::MappingEnd, Span::empty(start)))
    }
}

impl<T: Input> Iterator for Parser<T> {
    type Item = Result<(Event, Span), ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}

impl<T: Input> std::iter::FusedIterator for Parser<T> {}

#[cfg(test)]
mod test {
    use super::{Event, Parser, Tag};

    #[test]
    fn test_peek_eq_parse() {
        let s = "
a0 bb: val
a1: &x
    b1: 4
    b2: d
a2: 4
a3: [1, 2, 3]
a4:
    - [a1, a2]
    - 2
a5: *x
";
        let mut p = Parser::new_from_str(s);
        loop {
            let event_peek = p.peek().unwrap().unwrap().clone();
            let event = p.next_event().unwrap().unwrap();
            assert_eq!(event, event_peek);
            if event.0 == Event::StreamEnd {
                break;
            }
        }
        assert!(p.next_event().is_none());
    }

    #[test]
    fn test_keep_tags_across_multiple_documents() {
        let text = r#"
%TAG !t! tag:test,2024:
--- !t!1 &1
foo: "bar"
--- !t!2 &2
baz: "qux"
"#;
        for x in Parser::new_from_str(text).keep_tags(true) {
            let x = x.unwrap();
            if let Event::MappingStart { tag: Some(tag), .. } = x.0 {
                assert_eq!(tag.handle, "tag:test,2024:");
            }
        }

        for x in Parser::new_from_str(text).keep_tags(false) {
            if x.is_err() {
                // Test successful
                return;
            }
        }
        panic!("Test failed, did not encounter error")
    }

    #[test]
    fn tags_are_resolved_against_defaults() {
        let events: Vec<_> = Parser::new_from_str("- !!str a\n- !local b\n- ! c\n- !<x:y> d")
            .map(|ev| ev.unwrap().0)
            .filter_map(|ev| match ev {
                Event::Scalar { tag, implicit, .. } => Some((tag, implicit)),
                _ => None,
            })
            .collect();
        let tag = |handle: &str, suffix: &str| Tag {
            handle: handle.to_owned(),
            suffix: suffix.to_owned(),
        };
        assert_eq!(events[0].0, Some(tag("tag:yaml.org,2002:", "str")));
        assert_eq!(events[1].0, Some(tag("!", "local")));
        assert_eq!(events[2].0, Some(tag("", "!")));
        assert!(events[2].1.plain);
        assert_eq!(events[3].0, Some(tag("", "x:y")));
        assert!(!events[3].1.plain && !events[3].1.quoted);
    }

    #[test]
    fn errors_are_terminal() {
        let mut parser = Parser::new_from_str("[a, b");
        let err = loop {
            match parser.next_event() {
                Some(Ok(_)) => {}
                Some(Err(err)) => break err,
                None => panic!("unterminated flow sequence accepted"),
            }
        };
        assert_eq!(err.info(), "did not find expected ',' or ']'");
        assert!(parser.next_event().is_none());
        assert!(parser.peek().is_none());
    }
}
