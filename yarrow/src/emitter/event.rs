//! Home to the [`EventEmitter`] and its associated types.

use std::{collections::VecDeque, fmt, fmt::Write};

use yarrow_parser::{Event, Implicit, ScalarStyle, Tag, CORE_SCHEMA_PREFIX};

use crate::emitter::{EmitError, EmitResult, EmitterOptions};

/// What the emitter expects next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EmitterState {
    StreamStart,
    DocumentStart,
    DocumentRoot,
    DocumentEnd,
    FlowSequenceFirstItem,
    FlowSequenceItem,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingSimpleValue,
    FlowMappingValue,
    BlockSequenceFirstItem,
    BlockSequenceItem,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingSimpleValue,
    BlockMappingValue,
    End,
}

/// The styles a scalar may be written in, given its contents.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Copy, Debug)]
struct ScalarAnalysis {
    /// Length of the scalar, in characters.
    length: usize,
    empty: bool,
    multiline: bool,
    allow_flow_plain: bool,
    allow_block_plain: bool,
    allow_single_quoted: bool,
    allow_block: bool,
}

/// A YAML serializer that is fed [`Event`]s.
///
/// This serializer is the building block of [`YamlEmitter`]. It takes the same events as the
/// [`Parser`] produces and writes them on the go, which allows to reformat a stream without
/// loading it. Events must follow the order the parser produces them in: a stream start, then
/// documents, then a stream end. Incoherent sequences of events are reported as
/// [`EmitError::Event`].
///
/// The emitter looks a few events ahead to decide how to write collections, so the output of an
/// event may only be written when later events are received.
///
/// # Example
/// ```
/// use yarrow::emitter::{EmitterOptions, EventEmitter};
/// use yarrow::{Event, Parser};
///
/// let mut output = String::new();
/// let mut emitter = EventEmitter::new(&mut output, EmitterOptions::default());
/// for next in Parser::new_from_str("a: [b, c]\nd: 'e'\n") {
///     let (event, _) = next.unwrap();
///     emitter.emit(&event).unwrap();
/// }
/// assert_eq!(output, "a: [b, c]\nd: 'e'\n");
/// ```
///
/// [`YamlEmitter`]: crate::emitter::YamlEmitter
/// [`Parser`]: yarrow_parser::Parser
#[allow(clippy::struct_excessive_bools)]
pub struct EventEmitter<'a> {
    /// The output stream in which we output YAML.
    writer: &'a mut dyn fmt::Write,
    options: EmitterOptions,
    /// How many spaces are added to a nested indentation level.
    best_indent: usize,
    /// The column after which flow collections and scalars are wrapped.
    best_width: usize,
    line_break: &'static str,
    /// The current state of the emitter.
    state: EmitterState,
    /// The states to return to once the current node is written.
    states: Vec<EmitterState>,
    /// Events received but not processed yet.
    events: VecDeque<Event>,
    /// The indentation of the enclosing nodes.
    indents: Vec<Option<usize>>,
    /// The indentation of the current node, `None` at the top level.
    indent: Option<usize>,
    flow_level: usize,
    mapping_context: bool,
    simple_key_context: bool,
    column: usize,
    /// Whether the last character written is a whitespace.
    whitespace: bool,
    /// Whether only indentation and indicators were written on the current line.
    indention: bool,
    /// Whether the last document may continue if more text was appended.
    open_ended: bool,
    /// `(prefix, handle)` of the tag shorthands of the current document.
    tag_prefixes: Vec<(String, String)>,
    /// The analysis of the scalar being written, if computed.
    analysis: Option<ScalarAnalysis>,
}

impl<'a> EventEmitter<'a> {
    /// Create a new emitter serializing into `writer`.
    pub fn new(writer: &'a mut dyn fmt::Write, options: EmitterOptions) -> Self {
        let best_indent = options.get_indent();
        let best_width = if options.get_width() > best_indent * 2 {
            options.get_width()
        } else {
            80
        };
        let line_break = options.get_line_break().as_str();
        Self {
            writer,
            options,
            best_indent,
            best_width,
            line_break,
            state: EmitterState::StreamStart,
            states: vec![],
            events: VecDeque::new(),
            indents: vec![],
            indent: None,
            flow_level: 0,
            mapping_context: false,
            simple_key_context: false,
            column: 0,
            whitespace: true,
            indention: true,
            open_ended: false,
            tag_prefixes: default_tag_prefixes(),
            analysis: None,
        }
    }

    /// Feed a new event into the emitter.
    ///
    /// # Errors
    /// Returns an error if the given event is incoherent with the preceding sequence of events, if
    /// an anchor, a tag or a directive cannot be written or if writing to the output writer
    /// failed.
    pub fn emit(&mut self, event: &Event) -> EmitResult {
        self.events.push_back(event.clone());
        while !self.need_more_events() {
            let Some(event) = self.events.pop_front() else {
                break;
            };
            self.analysis = None;
            self.state_machine(&event)?;
        }
        Ok(())
    }

    /// Whether the event at the front of the queue needs more lookahead to be written.
    fn need_more_events(&self) -> bool {
        let Some(first) = self.events.front() else {
            return true;
        };
        let count = match first {
            Event::DocumentStart { .. } => 1,
            Event::SequenceStart { .. } => 2,
            Event::MappingStart { .. } => 3,
            _ => return false,
        };
        let mut level: isize = 0;
        for event in self.events.iter().skip(1) {
            match event {
                Event::DocumentStart { .. }
                | Event::SequenceStart { .. }
                | Event::MappingStart { .. } => level += 1,
                Event::DocumentEnd { .. } | Event::SequenceEnd | Event::MappingEnd => level -= 1,
                Event::StreamEnd => level = -1,
                _ => {}
            }
            if level < 0 {
                return false;
            }
        }
        self.events.len() < count + 1
    }

    fn state_machine(&mut self, event: &Event) -> EmitResult {
        debug_assert!(self.analysis.is_none());
        match self.state {
            EmitterState::StreamStart => self.expect_stream_start(event),
            EmitterState::DocumentStart => self.expect_document_start(event),
            EmitterState::DocumentRoot => {
                self.states.push(EmitterState::DocumentEnd);
                self.expect_node(event, false, false)
            }
            EmitterState::DocumentEnd => self.expect_document_end(event),
            EmitterState::FlowSequenceFirstItem => self.expect_flow_sequence_item(event, true),
            EmitterState::FlowSequenceItem => self.expect_flow_sequence_item(event, false),
            EmitterState::FlowMappingFirstKey => self.expect_flow_mapping_key(event, true),
            EmitterState::FlowMappingKey => self.expect_flow_mapping_key(event, false),
            EmitterState::FlowMappingSimpleValue => {
                self.write_indicator(":", false, false, false)?;
                self.states.push(EmitterState::FlowMappingKey);
                self.expect_node(event, true, false)
            }
            EmitterState::FlowMappingValue => {
                if self.options.is_canonical() || self.column > self.best_width {
                    self.write_indent()?;
                }
                self.write_indicator(":", true, false, false)?;
                self.states.push(EmitterState::FlowMappingKey);
                self.expect_node(event, true, false)
            }
            EmitterState::BlockSequenceFirstItem => self.expect_block_sequence_item(event, true),
            EmitterState::BlockSequenceItem => self.expect_block_sequence_item(event, false),
            EmitterState::BlockMappingFirstKey => self.expect_block_mapping_key(event, true),
            EmitterState::BlockMappingKey => self.expect_block_mapping_key(event, false),
            EmitterState::BlockMappingSimpleValue => {
                self.write_indicator(":", false, false, false)?;
                self.states.push(EmitterState::BlockMappingKey);
                self.expect_node(event, true, false)
            }
            EmitterState::BlockMappingValue => {
                self.write_indent()?;
                self.write_indicator(":", true, false, true)?;
                self.states.push(EmitterState::BlockMappingKey);
                self.expect_node(event, true, false)
            }
            EmitterState::End => Err(EmitError::Event("expected nothing after the stream end")),
        }
    }

    fn expect_stream_start(&mut self, event: &Event) -> EmitResult {
        if let Event::StreamStart = event {
            self.state = EmitterState::DocumentStart;
            Ok(())
        } else {
            Err(EmitError::Event("expected StreamStart"))
        }
    }

    fn expect_document_start(&mut self, event: &Event) -> EmitResult {
        match event {
            Event::DocumentStart {
                explicit,
                version,
                tags,
            } => {
                let canonical = self.options.is_canonical();
                let version = version.or(self.options.get_version());
                let mut directives = self.options.get_tags().clone();
                for (handle, prefix) in tags {
                    directives.insert(handle.clone(), prefix.clone());
                }

                if (version.is_some() || !directives.is_empty()) && self.open_ended {
                    self.write_indicator("...", true, false, false)?;
                    self.write_indent()?;
                }
                if let Some((major, minor)) = version {
                    if major != 1 {
                        return Err(EmitError::Event("unsupported YAML version"));
                    }
                    self.write_raw(&format!("%YAML {major}.{minor}"))?;
                    self.write_line_break()?;
                }
                self.tag_prefixes = default_tag_prefixes();
                for (handle, prefix) in &directives {
                    check_tag_handle(handle)?;
                    let prefix_text = prepare_tag_prefix(prefix)?;
                    self.tag_prefixes.retain(|(_, h)| h != handle);
                    self.tag_prefixes.push((prefix.clone(), handle.clone()));
                    self.write_raw(&format!("%TAG {handle} {prefix_text}"))?;
                    self.write_line_break()?;
                }

                let implicit = !explicit
                    && !self.options.is_explicit_start()
                    && !canonical
                    && version.is_none()
                    && directives.is_empty()
                    && !self.open_ended
                    && !self.check_empty_document();
                if !implicit {
                    self.write_indent()?;
                    self.write_indicator("---", true, false, false)?;
                    if canonical {
                        self.write_indent()?;
                    }
                }
                self.state = EmitterState::DocumentRoot;
                Ok(())
            }
            Event::StreamEnd => {
                self.state = EmitterState::End;
                Ok(())
            }
            _ => Err(EmitError::Event("expected DocumentStart or StreamEnd")),
        }
    }

    fn expect_document_end(&mut self, event: &Event) -> EmitResult {
        if let Event::DocumentEnd { explicit } = event {
            self.write_indent()?;
            if *explicit || self.options.is_explicit_end() {
                self.write_indicator("...", true, false, false)?;
                self.write_indent()?;
            } else {
                self.open_ended = true;
            }
            self.state = EmitterState::DocumentStart;
            Ok(())
        } else {
            Err(EmitError::Event("expected DocumentEnd"))
        }
    }

    /// Write the properties of a node and start writing its contents.
    fn expect_node(&mut self, event: &Event, mapping: bool, simple_key: bool) -> EmitResult {
        self.mapping_context = mapping;
        self.simple_key_context = simple_key;
        match event {
            Event::Alias(name) => {
                check_anchor(name)?;
                self.write_indicator(&format!("*{name}"), true, false, false)?;
                if self.simple_key_context {
                    // `*a:` would be an alias named `a:`.
                    self.write_raw(" ")?;
                }
                self.pop_state()
            }
            Event::Scalar {
                value,
                style,
                anchor,
                tag,
                implicit,
            } => {
                self.process_anchor(anchor.as_deref())?;
                let style = self.choose_scalar_style(value, *style, *implicit);
                self.process_scalar_tag(tag.as_ref(), *implicit, style)?;
                self.increase_indent(true, false);
                self.process_scalar(value, style)?;
                self.indent = self.indents.pop().flatten();
                self.pop_state()
            }
            Event::SequenceStart { anchor, tag, flow } => {
                self.process_anchor(anchor.as_deref())?;
                self.process_collection_tag(tag.as_ref())?;
                if self.flow_level > 0
                    || self.options.is_canonical()
                    || *flow
                    || self.next_is(&Event::SequenceEnd)
                {
                    self.write_indicator("[", true, true, false)?;
                    self.flow_level += 1;
                    self.increase_indent(true, false);
                    self.state = EmitterState::FlowSequenceFirstItem;
                } else {
                    let indentless = self.mapping_context && !self.indention;
                    self.increase_indent(false, indentless);
                    self.state = EmitterState::BlockSequenceFirstItem;
                }
                Ok(())
            }
            Event::MappingStart { anchor, tag, flow } => {
                self.process_anchor(anchor.as_deref())?;
                self.process_collection_tag(tag.as_ref())?;
                if self.flow_level > 0
                    || self.options.is_canonical()
                    || *flow
                    || self.next_is(&Event::MappingEnd)
                {
                    self.write_indicator("{", true, true, false)?;
                    self.flow_level += 1;
                    self.increase_indent(true, false);
                    self.state = EmitterState::FlowMappingFirstKey;
                } else {
                    self.increase_indent(false, false);
                    self.state = EmitterState::BlockMappingFirstKey;
                }
                Ok(())
            }
            _ => Err(EmitError::Event("expected a node")),
        }
    }

    fn expect_flow_sequence_item(&mut self, event: &Event, first: bool) -> EmitResult {
        if let Event::SequenceEnd = event {
            self.indent = self.indents.pop().flatten();
            self.flow_level -= 1;
            if self.options.is_canonical() && !first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("]", false, false, false)?;
            return self.pop_state();
        }
        if !first {
            self.write_indicator(",", false, false, false)?;
        }
        if self.options.is_canonical() || self.column > self.best_width {
            self.write_indent()?;
        }
        self.states.push(EmitterState::FlowSequenceItem);
        self.expect_node(event, false, false)
    }

    fn expect_flow_mapping_key(&mut self, event: &Event, first: bool) -> EmitResult {
        if let Event::MappingEnd = event {
            self.indent = self.indents.pop().flatten();
            self.flow_level -= 1;
            if self.options.is_canonical() && !first {
                self.write_indicator(",", false, false, false)?;
                self.write_indent()?;
            }
            self.write_indicator("}", false, false, false)?;
            return self.pop_state();
        }
        if !first {
            self.write_indicator(",", false, false, false)?;
        }
        if self.options.is_canonical() || self.column > self.best_width {
            self.write_indent()?;
        }
        if !self.options.is_canonical() && self.check_simple_key(event)? {
            self.states.push(EmitterState::FlowMappingSimpleValue);
            self.expect_node(event, true, true)
        } else {
            self.write_indicator("?", true, false, false)?;
            self.states.push(EmitterState::FlowMappingValue);
            self.expect_node(event, true, false)
        }
    }

    fn expect_block_sequence_item(&mut self, event: &Event, first: bool) -> EmitResult {
        if !first && matches!(event, Event::SequenceEnd) {
            self.indent = self.indents.pop().flatten();
            return self.pop_state();
        }
        self.write_indent()?;
        self.write_indicator("-", true, false, true)?;
        self.states.push(EmitterState::BlockSequenceItem);
        self.expect_node(event, false, false)
    }

    fn expect_block_mapping_key(&mut self, event: &Event, first: bool) -> EmitResult {
        if !first && matches!(event, Event::MappingEnd) {
            self.indent = self.indents.pop().flatten();
            return self.pop_state();
        }
        self.write_indent()?;
        if self.check_simple_key(event)? {
            self.states.push(EmitterState::BlockMappingSimpleValue);
            self.expect_node(event, true, true)
        } else {
            self.write_indicator("?", true, false, true)?;
            self.states.push(EmitterState::BlockMappingValue);
            self.expect_node(event, true, false)
        }
    }

    fn pop_state(&mut self) -> EmitResult {
        self.state = self
            .states
            .pop()
            .ok_or(EmitError::Event("node outside of a document"))?;
        Ok(())
    }

    fn increase_indent(&mut self, flow: bool, indentless: bool) {
        self.indents.push(self.indent);
        match self.indent {
            None => self.indent = Some(if flow { self.best_indent } else { 0 }),
            Some(indent) if !indentless => self.indent = Some(indent + self.best_indent),
            Some(_) => {}
        }
    }

    // ---------- CHECKERS ----------

    /// Whether the next event in the queue is `expected`.
    fn next_is(&self, expected: &Event) -> bool {
        self.events.front() == Some(expected)
    }

    /// Whether the document about to start only holds an empty plain scalar.
    fn check_empty_document(&self) -> bool {
        matches!(
            self.events.front(),
            Some(Event::Scalar { value, anchor: None, tag: None, .. }) if value.is_empty()
        )
    }

    /// Whether the node of `event` may be written as a simple key (`key: value`).
    fn check_simple_key(&mut self, event: &Event) -> Result<bool, EmitError> {
        let mut length = 0;
        let (anchor, tag) = match event {
            Event::Alias(name) => (Some(name.as_str()), None),
            Event::Scalar { anchor, tag, .. }
            | Event::SequenceStart { anchor, tag, .. }
            | Event::MappingStart { anchor, tag, .. } => (anchor.as_deref(), tag.as_ref()),
            _ => (None, None),
        };
        if let Some(anchor) = anchor {
            length += anchor.chars().count();
        }
        if let Some(tag) = tag {
            length += self.prepare_tag(tag)?.chars().count();
        }
        let simple = match event {
            Event::Alias(_) => true,
            Event::Scalar { value, .. } => {
                let analysis = self.analyze(value);
                length += analysis.length;
                !analysis.empty && !analysis.multiline
            }
            Event::SequenceStart { .. } => self.next_is(&Event::SequenceEnd),
            Event::MappingStart { .. } => self.next_is(&Event::MappingEnd),
            _ => false,
        };
        Ok(length < 128 && simple)
    }

    /// Return the analysis of the scalar being processed, computing it if needed.
    fn analyze(&mut self, value: &str) -> ScalarAnalysis {
        if let Some(analysis) = self.analysis {
            return analysis;
        }
        let analysis = analyze_scalar(value, self.options.is_allow_unicode());
        self.analysis = Some(analysis);
        analysis
    }

    // ---------- PROPERTIES AND SCALARS ----------

    fn process_anchor(&mut self, anchor: Option<&str>) -> EmitResult {
        if let Some(anchor) = anchor {
            check_anchor(anchor)?;
            self.write_indicator(&format!("&{anchor}"), true, false, false)?;
        }
        Ok(())
    }

    fn process_scalar_tag(
        &mut self,
        tag: Option<&Tag>,
        implicit: Implicit,
        style: ScalarStyle,
    ) -> EmitResult {
        let implied = if style == ScalarStyle::Plain {
            implicit.plain
        } else {
            implicit.quoted
        };
        if (!self.options.is_canonical() || tag.is_none()) && implied {
            return Ok(());
        }
        let text = match tag {
            Some(tag) => self.prepare_tag(tag)?,
            None if implicit.plain => "!".to_owned(),
            None => return Err(EmitError::Event("scalar tag is not specified")),
        };
        self.write_indicator(&text, true, false, false)
    }

    fn process_collection_tag(&mut self, tag: Option<&Tag>) -> EmitResult {
        if let Some(tag) = tag {
            let text = self.prepare_tag(tag)?;
            self.write_indicator(&text, true, false, false)?;
        }
        Ok(())
    }

    /// Pick the style a scalar is written in.
    ///
    /// The requested style is used if the contents and the context allow it. Otherwise, single
    /// quotes are tried before falling back to double quotes, which can represent anything.
    fn choose_scalar_style(
        &mut self,
        value: &str,
        style: ScalarStyle,
        implicit: Implicit,
    ) -> ScalarStyle {
        let analysis = self.analyze(value);
        if style == ScalarStyle::DoubleQuoted || self.options.is_canonical() {
            return ScalarStyle::DoubleQuoted;
        }
        if style == ScalarStyle::Plain
            && (implicit.plain || !implicit.quoted)
            && !(self.simple_key_context && (analysis.empty || analysis.multiline))
            && ((self.flow_level > 0 && analysis.allow_flow_plain)
                || (self.flow_level == 0 && analysis.allow_block_plain))
        {
            return ScalarStyle::Plain;
        }
        if matches!(style, ScalarStyle::Literal | ScalarStyle::Folded) {
            // The indentation indicator is a single digit.
            let needs_indicator = value.starts_with([' ', '\n']);
            if self.flow_level == 0
                && !self.simple_key_context
                && analysis.allow_block
                && (self.best_indent < 10 || !needs_indicator)
            {
                return style;
            }
        } else if analysis.allow_single_quoted
            && !(self.simple_key_context && analysis.multiline)
        {
            return ScalarStyle::SingleQuoted;
        }
        ScalarStyle::DoubleQuoted
    }

    fn process_scalar(&mut self, value: &str, style: ScalarStyle) -> EmitResult {
        let split = !self.simple_key_context;
        match style {
            ScalarStyle::Plain => self.write_plain(value, split),
            ScalarStyle::SingleQuoted => self.write_single_quoted(value, split),
            ScalarStyle::DoubleQuoted => self.write_double_quoted(value, split),
            ScalarStyle::Literal => self.write_literal(value),
            ScalarStyle::Folded => self.write_folded(value),
        }
    }

    /// Return the shortest form of `tag`, using the shorthands of the current document.
    ///
    /// Tags no shorthand applies to are written verbatim (`!<...>`).
    fn prepare_tag(&self, tag: &Tag) -> Result<String, EmitError> {
        let full = tag.to_string();
        if full.is_empty() {
            return Err(EmitError::Event("tag must not be empty"));
        }
        if full == "!" {
            return Ok(full);
        }
        let mut best: Option<(&str, &str)> = None;
        for (prefix, handle) in &self.tag_prefixes {
            if full.starts_with(prefix.as_str())
                && (prefix == "!" || prefix.len() < full.len())
                && best.map_or(true, |(p, _)| prefix.len() > p.len())
            {
                best = Some((prefix, handle));
            }
        }
        let (handle, suffix) = match best {
            Some((prefix, handle)) => (Some(handle), &full[prefix.len()..]),
            None => (None, full.as_str()),
        };

        let mut text = String::with_capacity(full.len() + 3);
        text.push_str(handle.unwrap_or("!<"));
        for c in suffix.chars() {
            if c.is_ascii_alphanumeric()
                || "-;/?:@&=+$_.~*'()".contains(c)
                || (handle.is_none() && "!,[]".contains(c))
            {
                text.push(c);
            } else {
                percent_encode(c, &mut text)?;
            }
        }
        if handle.is_none() {
            text.push('>');
        }
        Ok(text)
    }

    // ---------- WRITERS ----------

    /// Write text without any check.
    fn write_raw(&mut self, data: &str) -> EmitResult {
        self.column += data.chars().count();
        self.writer.write_str(data)?;
        Ok(())
    }

    fn write_chars(&mut self, data: &[char]) -> EmitResult {
        for &c in data {
            self.writer.write_char(c)?;
        }
        self.column += data.len();
        Ok(())
    }

    fn write_indicator(
        &mut self,
        indicator: &str,
        need_whitespace: bool,
        whitespace: bool,
        indention: bool,
    ) -> EmitResult {
        if !self.whitespace && need_whitespace {
            self.write_raw(" ")?;
        }
        self.write_raw(indicator)?;
        self.whitespace = whitespace;
        self.indention = self.indention && indention;
        self.open_ended = false;
        Ok(())
    }

    fn write_indent(&mut self) -> EmitResult {
        let indent = self.indent.unwrap_or(0);
        if !self.indention
            || self.column > indent
            || (self.column == indent && !self.whitespace)
        {
            self.write_line_break()?;
        }
        if self.column < indent {
            self.whitespace = true;
            for _ in self.column..indent {
                self.writer.write_char(' ')?;
            }
            self.column = indent;
        }
        Ok(())
    }

    fn write_line_break(&mut self) -> EmitResult {
        self.writer.write_str(self.line_break)?;
        self.whitespace = true;
        self.indention = true;
        self.column = 0;
        Ok(())
    }

    fn write_plain(&mut self, text: &str, split: bool) -> EmitResult {
        if text.is_empty() {
            return Ok(());
        }
        if !self.whitespace {
            self.write_raw(" ")?;
        }
        self.whitespace = false;
        self.indention = false;
        // Plain scalars never hold line breaks, only spaces may be turned into a line fold.
        let chars: Vec<char> = text.chars().collect();
        let mut spaces = false;
        let mut start = 0;
        for end in 0..=chars.len() {
            let ch = chars.get(end).copied();
            if spaces {
                if ch != Some(' ') {
                    if start + 1 == end && self.column > self.best_width && split {
                        self.write_indent()?;
                        self.whitespace = false;
                        self.indention = false;
                    } else {
                        self.write_chars(&chars[start..end])?;
                    }
                    start = end;
                }
            } else if ch.map_or(true, |c| c == ' ') {
                self.write_chars(&chars[start..end])?;
                start = end;
            }
            spaces = ch == Some(' ');
        }
        Ok(())
    }

    fn write_single_quoted(&mut self, text: &str, split: bool) -> EmitResult {
        self.write_indicator("'", true, false, false)?;
        let chars: Vec<char> = text.chars().collect();
        let mut spaces = false;
        let mut breaks = false;
        let mut start = 0;
        for end in 0..=chars.len() {
            let ch = chars.get(end).copied();
            if spaces {
                if ch != Some(' ') {
                    if start + 1 == end
                        && self.column > self.best_width
                        && split
                        && start != 0
                        && end != chars.len()
                    {
                        self.write_indent()?;
                    } else {
                        self.write_chars(&chars[start..end])?;
                    }
                    start = end;
                }
            } else if breaks {
                if ch != Some('\n') {
                    // A single line break is folded into a space, write one more.
                    self.write_line_break()?;
                    for _ in start..end {
                        self.write_line_break()?;
                    }
                    self.write_indent()?;
                    start = end;
                }
            } else if ch.map_or(true, |c| matches!(c, ' ' | '\n' | '\'')) && start < end {
                self.write_chars(&chars[start..end])?;
                start = end;
            }
            if ch == Some('\'') {
                self.write_raw("''")?;
                start = end + 1;
            }
            if let Some(c) = ch {
                spaces = c == ' ';
                breaks = c == '\n';
            }
        }
        self.write_indicator("'", false, false, false)
    }

    fn write_double_quoted(&mut self, text: &str, split: bool) -> EmitResult {
        self.write_indicator("\"", true, false, false)?;
        let allow_unicode = self.options.is_allow_unicode();
        let chars: Vec<char> = text.chars().collect();
        let mut start = 0;
        // Whether nothing was written since the last wrap. Wrapping again would write an empty
        // continuation line, whose `\` would escape the next one.
        let mut wrapped = false;
        for end in 0..=chars.len() {
            let ch = chars.get(end).copied();
            if ch.map_or(true, |c| needs_escape(c, allow_unicode)) {
                if start < end {
                    self.write_chars(&chars[start..end])?;
                    start = end;
                    wrapped = false;
                }
                if let Some(c) = ch {
                    self.write_raw(&escape_char(c))?;
                    start = end + 1;
                    wrapped = false;
                }
            }
            // Wrap at a space or right after an escape. `start` may be one past `end`.
            if 0 < end
                && end + 1 < chars.len()
                && !(wrapped && start >= end)
                && (ch == Some(' ') || start >= end)
                && self.column + end > self.best_width + start
                && split
            {
                wrapped = true;
                if start < end {
                    self.write_chars(&chars[start..end])?;
                    start = end;
                }
                self.write_raw("\\")?;
                self.write_indent()?;
                self.whitespace = false;
                self.indention = false;
                if chars[start] == ' ' {
                    // Leading spaces of a continuation line are trimmed unless escaped.
                    self.write_raw("\\")?;
                }
            }
        }
        self.write_indicator("\"", false, false, false)
    }

    /// Return the indentation and chomping indicators of a block scalar.
    fn block_hints(&self, text: &str) -> String {
        let mut hints = String::new();
        if text.starts_with([' ', '\n']) {
            hints.push_str(&self.best_indent.to_string());
        }
        if !text.ends_with('\n') {
            hints.push('-');
        } else if text == "\n" || text.ends_with("\n\n") {
            hints.push('+');
        }
        hints
    }

    fn write_folded(&mut self, text: &str) -> EmitResult {
        let hints = self.block_hints(text);
        self.write_indicator(&format!(">{hints}"), true, false, false)?;
        if hints.ends_with('+') {
            self.open_ended = true;
        }
        self.write_line_break()?;
        let chars: Vec<char> = text.chars().collect();
        let mut leading_space = true;
        let mut spaces = false;
        let mut breaks = true;
        let mut start = 0;
        for end in 0..=chars.len() {
            let ch = chars.get(end).copied();
            if breaks {
                if ch != Some('\n') {
                    if !leading_space && ch.is_some() && ch != Some(' ') && chars[start] == '\n' {
                        self.write_line_break()?;
                    }
                    leading_space = ch == Some(' ');
                    for _ in start..end {
                        self.write_line_break()?;
                    }
                    if ch.is_some() {
                        self.write_indent()?;
                    }
                    start = end;
                }
            } else if spaces {
                if ch != Some(' ') {
                    if start + 1 == end && self.column > self.best_width {
                        self.write_indent()?;
                    } else {
                        self.write_chars(&chars[start..end])?;
                    }
                    start = end;
                }
            } else if ch.map_or(true, |c| c == ' ' || c == '\n') {
                self.write_chars(&chars[start..end])?;
                if ch.is_none() {
                    self.write_line_break()?;
                }
                start = end;
            }
            if let Some(c) = ch {
                breaks = c == '\n';
                spaces = c == ' ';
            }
        }
        Ok(())
    }

    fn write_literal(&mut self, text: &str) -> EmitResult {
        let hints = self.block_hints(text);
        self.write_indicator(&format!("|{hints}"), true, false, false)?;
        if hints.ends_with('+') {
            self.open_ended = true;
        }
        self.write_line_break()?;
        let chars: Vec<char> = text.chars().collect();
        let mut breaks = true;
        let mut start = 0;
        for end in 0..=chars.len() {
            let ch = chars.get(end).copied();
            if breaks {
                if ch != Some('\n') {
                    for _ in start..end {
                        self.write_line_break()?;
                    }
                    if ch.is_some() {
                        self.write_indent()?;
                    }
                    start = end;
                }
            } else if ch.map_or(true, |c| c == '\n') {
                self.write_chars(&chars[start..end])?;
                if ch.is_none() {
                    self.write_line_break()?;
                }
                start = end;
            }
            if let Some(c) = ch {
                breaks = c == '\n';
            }
        }
        Ok(())
    }
}

/// The shorthands every document starts with.
fn default_tag_prefixes() -> Vec<(String, String)> {
    vec![
        ("!".to_owned(), "!".to_owned()),
        (CORE_SCHEMA_PREFIX.to_owned(), "!!".to_owned()),
    ]
}

fn check_anchor(anchor: &str) -> EmitResult {
    if anchor.is_empty() {
        return Err(EmitError::Event("anchor must not be empty"));
    }
    if anchor
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, ',' | '[' | ']' | '{' | '}'))
    {
        return Err(EmitError::Event("invalid character in anchor"));
    }
    Ok(())
}

fn check_tag_handle(handle: &str) -> EmitResult {
    if handle.is_empty() {
        return Err(EmitError::Event("tag handle must not be empty"));
    }
    if !handle.starts_with('!') || !handle.ends_with('!') {
        return Err(EmitError::Event("tag handle must start and end with '!'"));
    }
    let inner = handle.get(1..handle.len().saturating_sub(1)).unwrap_or("");
    if !inner
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(EmitError::Event("invalid character in tag handle"));
    }
    Ok(())
}

fn prepare_tag_prefix(prefix: &str) -> Result<String, EmitError> {
    if prefix.is_empty() {
        return Err(EmitError::Event("tag prefix must not be empty"));
    }
    let mut text = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        if c.is_ascii_alphanumeric() || "-;/?!:@&=+$,_.~*'()[]".contains(c) {
            text.push(c);
        } else {
            percent_encode(c, &mut text)?;
        }
    }
    Ok(text)
}

/// Append the `%XX` escapes of the UTF-8 bytes of `c`.
fn percent_encode(c: char, out: &mut String) -> EmitResult {
    let mut buf = [0; 4];
    for b in c.encode_utf8(&mut buf).bytes() {
        write!(out, "%{b:02X}")?;
    }
    Ok(())
}

/// Whether `c` can be written as is in a double quoted scalar.
fn needs_escape(c: char, allow_unicode: bool) -> bool {
    matches!(
        c,
        '"' | '\\' | '\u{85}' | '\u{2028}' | '\u{2029}' | '\u{FEFF}'
    ) || !(matches!(c, '\x20'..='\x7e') || (allow_unicode && is_unicode_printable(c)))
}

/// Printable characters outside of the ASCII range.
fn is_unicode_printable(c: char) -> bool {
    matches!(
        c,
        '\u{a0}'..='\u{d7ff}' | '\u{e000}'..='\u{fffd}' | '\u{10000}'..='\u{10ffff}'
    )
}

fn escape_char(c: char) -> String {
    let short = match c {
        '\0' => "\\0",
        '\x07' => "\\a",
        '\x08' => "\\b",
        '\t' => "\\t",
        '\n' => "\\n",
        '\x0b' => "\\v",
        '\x0c' => "\\f",
        '\r' => "\\r",
        '\x1b' => "\\e",
        '"' => "\\\"",
        '\\' => "\\\\",
        '\u{85}' => "\\N",
        '\u{a0}' => "\\_",
        '\u{2028}' => "\\L",
        '\u{2029}' => "\\P",
        _ => {
            let code = u32::from(c);
            return if code <= 0xff {
                format!("\\x{code:02x}")
            } else if code <= 0xffff {
                format!("\\u{code:04x}")
            } else {
                format!("\\U{code:08x}")
            };
        }
    };
    short.to_owned()
}

/// Find out which styles may represent `scalar`.
fn analyze_scalar(scalar: &str, allow_unicode: bool) -> ScalarAnalysis {
    let chars: Vec<char> = scalar.chars().collect();
    if chars.is_empty() {
        return ScalarAnalysis {
            length: 0,
            empty: true,
            multiline: false,
            allow_flow_plain: false,
            allow_block_plain: true,
            allow_single_quoted: true,
            allow_block: false,
        };
    }

    let is_space = |c: char| matches!(c, '\0' | ' ' | '\t' | '\r' | '\n');

    let mut block_indicators = false;
    let mut flow_indicators = false;
    let mut line_breaks = false;
    let mut special_characters = false;
    let mut leading_space = false;
    let mut leading_break = false;
    let mut trailing_space = false;
    let mut trailing_break = false;
    let mut break_space = false;
    let mut space_break = false;

    if scalar.starts_with("---") || scalar.starts_with("...") {
        block_indicators = true;
        flow_indicators = true;
    }

    let mut preceded_by_whitespace = true;
    let mut previous_space = false;
    let mut previous_break = false;
    let last = chars.len() - 1;
    for (index, &ch) in chars.iter().enumerate() {
        let followed_by_whitespace = chars.get(index + 1).map_or(true, |&c| is_space(c));
        if index == 0 {
            if "#,[]{}&*!|>'\"%@`".contains(ch) {
                flow_indicators = true;
                block_indicators = true;
            }
            if ch == '?' || ch == ':' {
                flow_indicators = true;
                if followed_by_whitespace {
                    block_indicators = true;
                }
            }
            if ch == '-' && followed_by_whitespace {
                flow_indicators = true;
                block_indicators = true;
            }
        } else {
            if ",?[]{}".contains(ch) {
                flow_indicators = true;
            }
            if ch == ':' {
                flow_indicators = true;
                if followed_by_whitespace {
                    block_indicators = true;
                }
            }
            if ch == '#' && preceded_by_whitespace {
                flow_indicators = true;
                block_indicators = true;
            }
        }

        if ch == '\n' {
            line_breaks = true;
        }
        // LS and PS read back as line breaks, so they are only written escaped.
        if !(ch == '\n' || matches!(ch, '\x20'..='\x7e'))
            && !(allow_unicode
                && is_unicode_printable(ch)
                && !matches!(ch, '\u{FEFF}' | '\u{2028}' | '\u{2029}'))
        {
            special_characters = true;
        }

        if ch == ' ' {
            if index == 0 {
                leading_space = true;
            }
            if index == last {
                trailing_space = true;
            }
            if previous_break {
                break_space = true;
            }
            previous_space = true;
            previous_break = false;
        } else if ch == '\n' {
            if index == 0 {
                leading_break = true;
            }
            if index == last {
                trailing_break = true;
            }
            if previous_space {
                space_break = true;
            }
            previous_space = false;
            previous_break = true;
        } else {
            previous_space = false;
            previous_break = false;
        }

        preceded_by_whitespace = is_space(ch);
    }

    let mut analysis = ScalarAnalysis {
        length: chars.len(),
        empty: false,
        multiline: line_breaks,
        allow_flow_plain: true,
        allow_block_plain: true,
        allow_single_quoted: true,
        allow_block: true,
    };
    if leading_space || leading_break || trailing_space || trailing_break {
        analysis.allow_flow_plain = false;
        analysis.allow_block_plain = false;
    }
    if trailing_space {
        analysis.allow_block = false;
    }
    if break_space {
        analysis.allow_flow_plain = false;
        analysis.allow_block_plain = false;
        analysis.allow_single_quoted = false;
    }
    if space_break || special_characters {
        analysis.allow_flow_plain = false;
        analysis.allow_block_plain = false;
        analysis.allow_single_quoted = false;
        analysis.allow_block = false;
    }
    if line_breaks {
        analysis.allow_flow_plain = false;
        analysis.allow_block_plain = false;
    }
    if flow_indicators {
        analysis.allow_flow_plain = false;
    }
    if block_indicators {
        analysis.allow_block_plain = false;
    }
    analysis
}
