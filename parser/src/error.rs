//! The error type shared by the scanner and the parser.

use std::fmt;

use thiserror::Error;

use crate::scanner::Marker;

/// The stage at which an error was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A character that may not appear in a YAML stream was found.
    Encoding,
    /// The character stream could not be split into tokens.
    Scanner,
    /// The token stream does not follow the YAML grammar.
    Parser,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Encoding => "encoding error",
            ErrorKind::Scanner => "scanner error",
            ErrorKind::Parser => "parser error",
        })
    }
}

/// An error that occurred while scanning or parsing.
///
/// Besides the position of the problem, an error may carry a context: what the scanner or the
/// parser was doing when the problem was found and where that started, e.g. "while scanning a
/// quoted scalar" and the position of the opening quote.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{info} at {mark}{suffix}", suffix = ContextSuffix(.context.as_ref()))]
pub struct ScanError {
    kind: ErrorKind,
    /// The position at which the error happened in the source.
    mark: Marker,
    /// Human-readable details about the error.
    info: String,
    /// What was being processed when the error happened, and where it started.
    context: Option<(String, Marker)>,
}

impl ScanError {
    /// Create a new scanner error from a location and an error string.
    #[must_use]
    pub fn new(loc: Marker, info: String) -> ScanError {
        ScanError {
            kind: ErrorKind::Scanner,
            mark: loc,
            info,
            context: None,
        }
    }

    /// Create a new scanner error from a location and an error string.
    #[must_use]
    pub fn new_str(loc: Marker, info: &str) -> ScanError {
        ScanError::new(loc, info.to_owned())
    }

    /// Create a new error of the given kind.
    #[must_use]
    pub fn with_kind(kind: ErrorKind, loc: Marker, info: &str) -> ScanError {
        ScanError {
            kind,
            ..ScanError::new_str(loc, info)
        }
    }

    /// Create a new parser error.
    #[must_use]
    pub fn parser(loc: Marker, info: &str) -> ScanError {
        ScanError::with_kind(ErrorKind::Parser, loc, info)
    }

    /// Attach a context to the error.
    #[must_use]
    pub fn with_context(mut self, context: &str, context_mark: Marker) -> ScanError {
        self.context = Some((context.to_owned(), context_mark));
        self
    }

    /// Return the stage at which the error was detected.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Return the marker pointing to the error in the source.
    #[must_use]
    pub fn marker(&self) -> &Marker {
        &self.mark
    }

    /// Return the information string describing the error that happened.
    #[must_use]
    pub fn info(&self) -> &str {
        self.info.as_ref()
    }

    /// Return the context of the error, if any, and where it started.
    #[must_use]
    pub fn context(&self) -> Option<(&str, &Marker)> {
        self.context.as_ref().map(|(ctx, mark)| (ctx.as_str(), mark))
    }
}

/// Renders the optional context after the main message.
struct ContextSuffix<'a>(Option<&'a (String, Marker)>);

impl fmt::Display for ContextSuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some((context, mark)) => write!(f, " ({context} at {mark})"),
            None => Ok(()),
        }
    }
}
