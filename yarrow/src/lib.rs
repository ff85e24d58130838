// Copyright 2015, Yuheng Chen.
// Copyright 2023, Ethiraric.
// See the LICENSE file at the top-level directory of this distribution.

//! YAML 1.1 implementation in pure Rust.
//!
//! # Usage
//!
//! This crate can be used by adding `yarrow` to the dependencies in your project's `Cargo.toml`:
//! ```toml
//! [dependencies]
//! yarrow = "0.1"
//! ```
//!
//! # Examples
//! Parse a string into `Vec<Yaml>` and then serialize it as a YAML string.
//!
//! ```
//! use yarrow::{Yaml, YamlEmitter};
//!
//! let docs = Yaml::load_from_str("[1, 2, 3]").unwrap();
//! let doc = &docs[0]; // select the first YAML document
//! assert_eq!(doc[0].as_integer().unwrap(), 1); // access elements by index
//!
//! let mut out_str = String::new();
//! let mut emitter = YamlEmitter::new(&mut out_str);
//! emitter.dump(doc).unwrap(); // dump the YAML object to a String
//! assert_eq!(out_str, "[1, 2, 3]\n");
//! ```
//!
//! # Layers
//! Loading goes through three layers, each of which can be used on its own:
//!   - The [`Parser`] (from `yarrow-parser`) turns text into [`Event`]s.
//!   - The [`YamlLoader`] composes events into [`Yaml`] nodes, using the [`Resolver`] to give
//!     untagged scalars their type.
//!   - [`Yaml`] and [`Scalar`] hold the loaded data.
//!
//! Dumping mirrors it: [`YamlEmitter`] turns nodes into events, and the [`EventEmitter`] writes
//! them as text. Both are configured with [`EmitterOptions`].
//!
//! # YAML Tags
//! ## YAML 1.1 tags (`!!str`, `!!int`, `!!float`, ...)
//! Untagged plain scalars are resolved with the YAML 1.1 rules: `yes`, `off` are booleans,
//! `0x1F`, `017`, `1:30` are integers, `~` is null, ... Quoted scalars are always strings.
//!
//! Should a scalar be explicitly tagged with one of the YAML 1.1 scalar tags, `yarrow` will
//! attempt to construct it as the given type. If it fails (e.g.: `!!int foo`), a [`BadValue`]
//! will be returned. The same goes for `!!seq` and `!!map` applied to the wrong kind of node.
//! ```
//! # use yarrow::Yaml;
//! # let parse = |s| Yaml::load_from_str(s).unwrap().into_iter().next().unwrap();
//! #
//! assert_eq!(parse("!!str 12").as_str(), Some("12"));
//! assert_eq!(parse("!!float 12").as_floating_point(), Some(12.0));
//! assert!(parse("!!int foo").is_badvalue());
//! assert!(parse("!!map [a]").is_badvalue());
//! ```
//!
//! ## User-defined tags
//! Other tags are left as-is. They are wrapped in a [`Tagged`] variant where you can freely
//! inspect the tag alongside the tagged node. The tagged node is loaded as an untagged node.
//! ```
//! # use yarrow::Yaml;
//! # let parse = |s| Yaml::load_from_str(s).unwrap().into_iter().next().unwrap();
//! #
//! assert!(matches!(parse("!custom 3"),     Yaml::Tagged(_tag, node) if node.is_integer()));
//! assert!(matches!(parse("!custom '3'"),   Yaml::Tagged(_tag, node) if node.is_string()));
//! assert!(matches!(parse("!custom [foo]"), Yaml::Tagged(_tag, node) if node.is_sequence()));
//! ```
//!
//! # Features
//! #### `debug_prints`
//! Enables the debug logs of the parser, printed to `stderr` when the `YARROW_DEBUG` environment
//! variable is set.
//!
//! [`BadValue`]: Yaml::BadValue
//! [`Tagged`]: Yaml::Tagged

#![warn(missing_docs, clippy::pedantic)]

#[macro_use]
mod macros;

pub mod emitter;
pub mod loader;
pub mod resolver;
mod scalar;
mod yaml;

// Re-export main components.
pub use crate::emitter::{EmitError, EmitterOptions, EventEmitter, YamlEmitter};
pub use crate::loader::{LoadError, YamlLoader};
pub use crate::resolver::Resolver;
pub use crate::scalar::Scalar;
pub use crate::yaml::{Mapping, Sequence, Yaml, YamlIter};

// Re-export the parser types that appear in our public API, so that consumers can inspect them
// without depending on `yarrow-parser` themselves.
pub use yarrow_parser::{
    Event, Implicit, Marker, Parser, ScalarStyle, ScanError, Span, Tag, TagDirectives,
};
