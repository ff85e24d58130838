// Copyright 2015, Yuheng Chen.
// Copyright 2023, Ethiraric.
// See the LICENSE file at the top-level directory of this distribution.

//! YAML 1.1 scanner and event parser in pure Rust.
//!
//! **If you want to load YAML into a tree of nodes or write YAML back, use `yarrow` instead of
//! `yarrow-parser`. This crate contains only the scanner and the parser.**
//!
//! This crate turns a stream of characters into a stream of YAML events (document boundaries,
//! collection boundaries, scalars, anchors, aliases and tags), each tagged with the [`Span`] of
//! source it came from.
//!
//! # Usage
//!
//! ```
//! use yarrow_parser::{Event, Parser};
//!
//! let events: Vec<Event> = Parser::new_from_str("a: [1, 2]")
//!     .map(|ev| ev.map(|(ev, _span)| ev))
//!     .collect::<Result<_, _>>()
//!     .unwrap();
//! assert_eq!(events.len(), 11);
//! ```
//!
//! # Features
//!
//! #### `debug_prints`
//! Enables the `debug` module and usage of debug prints in the scanner and the parser. Traces
//! are written to the error output of debug builds when the `YARROW_DEBUG` environment variable
//! is set. Do not enable if you are consuming the crate rather than working on it as this can
//! significantly decrease performance.

#![warn(missing_docs, clippy::pedantic)]

mod char_traits;
#[macro_use]
mod debug;
mod error;
pub mod input;
mod parser;
mod scanner;

pub use crate::error::{ErrorKind, ScanError};
pub use crate::input::{str::StrInput, BufferedInput, Input};
pub use crate::parser::{
    Event, EventReceiver, Implicit, ParseResult, Parser, SpannedEventReceiver, Tag,
    TagDirectives, CORE_SCHEMA_PREFIX,
};
pub use crate::scanner::{Chomping, Marker, ScalarStyle, Scanner, Span, Token, TokenType};
