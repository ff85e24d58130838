//! YAML serialization helpers.
//!
//! [`YamlEmitter`] turns [`Yaml`] nodes into events and feeds them to an [`EventEmitter`], which
//! can also be used directly to write a stream of events.

use std::fmt;

use thiserror::Error;
use yarrow_parser::{Event, Implicit, ScalarStyle, Tag, TagDirectives, CORE_SCHEMA_PREFIX};

use crate::{
    resolver::{Resolver, MAP_TAG, SEQ_TAG, STR_TAG},
    Scalar, Yaml,
};

pub mod event;
mod options;

pub use event::EventEmitter;
pub use options::{EmitterOptions, FlowStyle, LineBreak};

/// A convenience alias for emitter functions that may fail without returning a value.
pub type EmitResult = Result<(), EmitError>;

/// An error when emitting YAML.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum EmitError {
    /// A formatting error.
    #[error(transparent)]
    Fmt(#[from] fmt::Error),
    /// An error in the sequence of events the emitter received, or in their contents.
    #[error("{0}")]
    Event(&'static str),
}

/// The YAML serializer.
///
/// Each call to [`dump`] or [`dump_all`] writes a complete stream. Nodes are written without
/// anchors: nodes that were shared through aliases when loading are written once per occurrence.
///
/// ```
/// # use yarrow::{Yaml, YamlEmitter};
/// let input_string = "a: b\nc: [1, 2]";
/// let docs = Yaml::load_from_str(input_string).unwrap();
///
/// let mut output = String::new();
/// YamlEmitter::new(&mut output).dump(&docs[0]).unwrap();
///
/// assert_eq!(output, "a: b\nc: [1, 2]\n");
/// ```
///
/// [`dump`]: YamlEmitter::dump
/// [`dump_all`]: YamlEmitter::dump_all
#[allow(clippy::module_name_repetitions)]
pub struct YamlEmitter<'a> {
    /// The output stream in which we output YAML.
    writer: &'a mut dyn fmt::Write,
    options: EmitterOptions,
}

impl<'a> YamlEmitter<'a> {
    /// Create a new emitter serializing into `writer` with the default options.
    pub fn new(writer: &'a mut dyn fmt::Write) -> Self {
        Self::with_options(writer, EmitterOptions::default())
    }

    /// Create a new emitter serializing into `writer`.
    pub fn with_options(writer: &'a mut dyn fmt::Write, options: EmitterOptions) -> Self {
        YamlEmitter { writer, options }
    }

    /// Return the options of the emitter.
    #[must_use]
    pub fn options(&self) -> &EmitterOptions {
        &self.options
    }

    /// Dump the given YAML node as a stream with a single document.
    ///
    /// # Errors
    /// Returns [`EmitError`] when an error occurs.
    pub fn dump(&mut self, doc: &Yaml) -> EmitResult {
        self.dump_all(std::slice::from_ref(doc))
    }

    /// Dump the given YAML nodes as a stream of documents.
    ///
    /// # Errors
    /// Returns [`EmitError`] when an error occurs.
    pub fn dump_all(&mut self, docs: &[Yaml]) -> EmitResult {
        let mut emitter = EventEmitter::new(&mut *self.writer, self.options.clone());
        emitter.emit(&Event::StreamStart)?;
        for doc in docs {
            emitter.emit(&Event::DocumentStart {
                explicit: false,
                version: None,
                tags: TagDirectives::new(),
            })?;
            represent(&mut emitter, &self.options, doc, None)?;
            emitter.emit(&Event::DocumentEnd { explicit: false })?;
        }
        emitter.emit(&Event::StreamEnd)
    }
}

/// Emit the events of a node.
///
/// `tag` is the tag of the outermost [`Yaml::Tagged`] wrapping `node`, if any.
fn represent(
    emitter: &mut EventEmitter<'_>,
    options: &EmitterOptions,
    node: &Yaml,
    tag: Option<&Tag>,
) -> EmitResult {
    match node {
        Yaml::Value(scalar) => represent_scalar(emitter, options, scalar, tag),
        Yaml::BadValue => represent_scalar(emitter, options, &Scalar::Null, tag),
        Yaml::Sequence(sequence) => {
            emitter.emit(&Event::SequenceStart {
                anchor: None,
                tag: collection_tag(options, tag, SEQ_TAG),
                flow: is_flow(options, sequence.iter().all(is_scalar_node)),
            })?;
            for child in sequence {
                represent(emitter, options, child, None)?;
            }
            emitter.emit(&Event::SequenceEnd)
        }
        Yaml::Mapping(mapping) => {
            let only_scalars = mapping
                .iter()
                .all(|(key, value)| is_scalar_node(key) && is_scalar_node(value));
            emitter.emit(&Event::MappingStart {
                anchor: None,
                tag: collection_tag(options, tag, MAP_TAG),
                flow: is_flow(options, only_scalars),
            })?;
            for (key, value) in mapping {
                represent(emitter, options, key, None)?;
                represent(emitter, options, value, None)?;
            }
            emitter.emit(&Event::MappingEnd)
        }
        Yaml::Tagged(inner_tag, inner) => {
            represent(emitter, options, inner, Some(tag.unwrap_or(inner_tag)))
        }
    }
}

fn represent_scalar(
    emitter: &mut EventEmitter<'_>,
    options: &EmitterOptions,
    scalar: &Scalar,
    tag: Option<&Tag>,
) -> EmitResult {
    let value = scalar.to_string();
    let core = scalar.tag();
    let resolved = Resolver::yaml_1_1().resolve_scalar(
        &value,
        Implicit {
            plain: true,
            quoted: false,
        },
    );
    let tag = tag.cloned().unwrap_or_else(|| core_tag(core));
    let full = tag.to_string();
    let implicit = Implicit {
        plain: resolved == full,
        quoted: full == STR_TAG,
    };
    let style = if let Some(style) = options.get_default_scalar_style() {
        style
    } else if resolved != core {
        // A plain scalar would be read back with another type.
        ScalarStyle::SingleQuoted
    } else if options.is_multiline_strings() && matches!(scalar, Scalar::String(s) if s.contains('\n'))
    {
        ScalarStyle::Literal
    } else {
        ScalarStyle::Plain
    };
    emitter.emit(&Event::Scalar {
        value,
        style,
        anchor: None,
        tag: Some(tag),
        implicit,
    })
}

/// Return the tag written on a collection.
///
/// Collections only carry their own tag in canonical output.
fn collection_tag(options: &EmitterOptions, tag: Option<&Tag>, own_tag: &str) -> Option<Tag> {
    tag.cloned()
        .or_else(|| options.is_canonical().then(|| core_tag(own_tag)))
}

fn is_flow(options: &EmitterOptions, only_scalars: bool) -> bool {
    match options.get_default_flow_style() {
        FlowStyle::Block => false,
        FlowStyle::Flow => true,
        FlowStyle::Auto => only_scalars,
    }
}

fn is_scalar_node(node: &Yaml) -> bool {
    match node {
        Yaml::Value(_) | Yaml::BadValue => true,
        Yaml::Tagged(_, inner) => is_scalar_node(inner),
        Yaml::Sequence(_) | Yaml::Mapping(_) => false,
    }
}

/// Split a full YAML 1.1 tag into the `!!` prefix and its suffix.
fn core_tag(full: &str) -> Tag {
    Tag {
        handle: CORE_SCHEMA_PREFIX.to_owned(),
        suffix: full
            .strip_prefix(CORE_SCHEMA_PREFIX)
            .unwrap_or(full)
            .to_owned(),
    }
}
