//! The default loader.

use std::collections::BTreeMap;

use thiserror::Error;
use yarrow_parser::{Event, Implicit, Input, Marker, Parser, ScalarStyle, ScanError, Span, Tag};

use crate::{
    resolver::{Resolver, MAP_TAG, SEQ_TAG},
    Mapping, Scalar, Yaml,
};

/// An error that happened when loading a YAML document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// An error within the scanner or the parser. This indicates a malformed YAML input.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// An alias refers to an anchor that was not defined earlier in the document.
    #[error("unknown anchor `{name}` at {marker}")]
    UnknownAnchor {
        /// The name of the anchor.
        name: String,
        /// The position of the alias.
        marker: Marker,
    },
    /// An alias refers to a collection that contains it.
    #[error("recursive alias `{name}` at {marker}")]
    RecursiveAlias {
        /// The name of the anchor.
        name: String,
        /// The position of the alias.
        marker: Marker,
    },
}

/// A collection being loaded.
struct Frame {
    /// The collection, with the children loaded so far.
    node: Yaml,
    /// The anchor the collection is registered under once complete.
    anchor: Option<String>,
    /// The tag of the collection, applied once complete.
    tag: Option<Tag>,
}

/// Main structure for loading YAML.
///
/// The loader pulls events from a [`Parser`] and composes one [`Yaml`] node per document. Nesting
/// is tracked with an explicit stack rather than recursion, so that deeply nested documents
/// cannot overflow the call stack.
#[allow(clippy::module_name_repetitions)]
pub struct YamlLoader {
    /// The different YAML documents that are loaded.
    docs: Vec<Yaml>,
    // states
    doc_stack: Vec<Frame>,
    /// The pending key of each mapping in `doc_stack`, `None` while the key is being loaded.
    key_stack: Vec<Option<Yaml>>,
    /// Anchored nodes of the current document.
    anchor_map: BTreeMap<String, Yaml>,
    resolver: &'static Resolver,
}

impl Default for YamlLoader {
    fn default() -> Self {
        Self {
            docs: vec![],
            doc_stack: vec![],
            key_stack: vec![],
            anchor_map: BTreeMap::new(),
            resolver: Resolver::yaml_1_1(),
        }
    }
}

impl YamlLoader {
    /// Load every document `parser` yields.
    ///
    /// # Errors
    /// Returns the first error of the parser, or [`LoadError::UnknownAnchor`] when an alias
    /// cannot be resolved. Documents loaded before the error are kept in `self`.
    pub fn load<I: Input>(&mut self, parser: &mut Parser<I>) -> Result<(), LoadError> {
        while let Some(next) = parser.next_event() {
            let (ev, span) = next?;
            self.on_event(ev, span)?;
        }
        Ok(())
    }

    /// Process a single event.
    ///
    /// # Errors
    /// Returns [`LoadError::UnknownAnchor`] or [`LoadError::RecursiveAlias`] when an alias
    /// cannot be resolved.
    ///
    /// # Panics
    /// Panics if the events do not follow the YAML event grammar, e.g. a `SequenceEnd` with no
    /// sequence open. [`Parser`] never produces such streams.
    pub fn on_event(&mut self, ev: Event, span: Span) -> Result<(), LoadError> {
        match ev {
            Event::StreamStart | Event::StreamEnd => {
                // do nothing
            }
            Event::DocumentStart { .. } => {
                self.anchor_map.clear();
            }
            Event::DocumentEnd { .. } => {
                match self.doc_stack.len() {
                    // empty document
                    0 => self.docs.push(Yaml::Value(Scalar::Null)),
                    1 => self.docs.push(self.doc_stack.pop().unwrap().node),
                    _ => unreachable!(),
                }
            }
            Event::SequenceStart { anchor, tag, .. } => {
                self.doc_stack.push(Frame {
                    node: Yaml::Sequence(Vec::new()),
                    anchor,
                    tag,
                });
            }
            Event::MappingStart { anchor, tag, .. } => {
                self.doc_stack.push(Frame {
                    node: Yaml::Mapping(Mapping::new()),
                    anchor,
                    tag,
                });
                self.key_stack.push(None);
            }
            Event::SequenceEnd => {
                let frame = self.doc_stack.pop().unwrap();
                let node = compose_collection(frame.node, frame.tag, SEQ_TAG);
                self.insert_new_node(node, frame.anchor);
            }
            Event::MappingEnd => {
                self.key_stack.pop().unwrap();
                let frame = self.doc_stack.pop().unwrap();
                let node = compose_collection(frame.node, frame.tag, MAP_TAG);
                self.insert_new_node(node, frame.anchor);
            }
            Event::Scalar {
                value,
                style,
                anchor,
                tag,
                implicit,
            } => {
                let node = self.compose_scalar(&value, style, tag, implicit);
                self.insert_new_node(node, anchor);
            }
            Event::Alias(name) => {
                let node = match self.anchor_map.get(&name) {
                    Some(node) => node.clone(),
                    None if self
                        .doc_stack
                        .iter()
                        .any(|frame| frame.anchor.as_deref() == Some(name.as_str())) =>
                    {
                        return Err(LoadError::RecursiveAlias {
                            name,
                            marker: span.start,
                        })
                    }
                    None => {
                        return Err(LoadError::UnknownAnchor {
                            name,
                            marker: span.start,
                        })
                    }
                };
                self.insert_new_node(node, None);
            }
        }
        Ok(())
    }

    /// Return the document nodes from `self`, consuming it in the process.
    #[must_use]
    pub fn into_documents(self) -> Vec<Yaml> {
        self.docs
    }

    fn insert_new_node(&mut self, node: Yaml, anchor: Option<String>) {
        if let Some(anchor) = anchor {
            self.anchor_map.insert(anchor, node.clone());
        }
        if let Some(parent) = self.doc_stack.last_mut() {
            match &mut parent.node {
                Yaml::Sequence(sequence) => sequence.push(node),
                Yaml::Mapping(mapping) => {
                    let cur_key = self.key_stack.last_mut().unwrap();
                    match cur_key.take() {
                        // current node is a value
                        Some(key) => {
                            mapping.insert(key, node);
                        }
                        // current node is a key
                        None => *cur_key = Some(node),
                    }
                }
                _ => unreachable!(),
            }
        } else {
            self.doc_stack.push(Frame {
                node,
                anchor: None,
                tag: None,
            });
        }
    }

    /// Construct the node of a scalar event.
    ///
    /// Untagged scalars and scalars with the non-specific tag `!` are resolved. Scalars with a
    /// YAML 1.1 scalar tag are constructed accordingly, or become [`Yaml::BadValue`] if their
    /// value does not fit the tag. Other tags wrap the untagged interpretation of the scalar.
    fn compose_scalar(
        &self,
        value: &str,
        style: ScalarStyle,
        tag: Option<Tag>,
        implicit: Implicit,
    ) -> Yaml {
        let resolve = |implicit| {
            let resolved = self.resolver.resolve_scalar(value, implicit);
            Scalar::construct(resolved, value).unwrap_or_else(|| Scalar::String(value.to_owned()))
        };
        match tag {
            None => Yaml::Value(resolve(implicit)),
            Some(tag) if tag.is_non_specific() => Yaml::Value(resolve(implicit)),
            Some(tag) => {
                let full = tag.to_string();
                if Scalar::is_scalar_tag(&full) {
                    Scalar::construct(&full, value).map_or(Yaml::BadValue, Yaml::Value)
                } else if full == SEQ_TAG || full == MAP_TAG {
                    Yaml::BadValue
                } else {
                    let inner = resolve(Implicit::for_scalar(None, style));
                    Yaml::Tagged(tag, Box::new(Yaml::Value(inner)))
                }
            }
        }
    }
}

/// Apply the tag of a completed collection.
///
/// `own_tag` is the tag of the collection's kind, which is the same as having no tag. A scalar
/// tag or the tag of the other kind of collection make it a [`Yaml::BadValue`].
fn compose_collection(node: Yaml, tag: Option<Tag>, own_tag: &str) -> Yaml {
    let Some(tag) = tag else {
        return node;
    };
    if tag.is_non_specific() {
        return node;
    }
    let full = tag.to_string();
    if full == own_tag {
        node
    } else if full == SEQ_TAG || full == MAP_TAG || Scalar::is_scalar_tag(&full) {
        Yaml::BadValue
    } else {
        Yaml::Tagged(tag, Box::new(node))
    }
}
