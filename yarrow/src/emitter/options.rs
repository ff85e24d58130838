//! Settings of the emitters.

use yarrow_parser::{ScalarStyle, TagDirectives};

/// The line break written at the end of each line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineBreak {
    /// `\n`.
    #[default]
    Unix,
    /// `\r\n`.
    Windows,
    /// `\r`.
    Mac,
}

impl LineBreak {
    /// Return the characters of the line break.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LineBreak::Unix => "\n",
            LineBreak::Windows => "\r\n",
            LineBreak::Mac => "\r",
        }
    }
}

/// How collections without a requested style are written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlowStyle {
    /// Always use block collections, unless empty.
    Block,
    /// Always use flow collections (`[a, b]`, `{a: b}`).
    Flow,
    /// Use flow style for collections that only hold scalars, block style otherwise.
    #[default]
    Auto,
}

/// The default indentation step.
const DEFAULT_INDENT: usize = 2;

/// Settings shared by [`EventEmitter`] and [`YamlEmitter`].
///
/// Setters are builder-style:
/// ```
/// # use yarrow::emitter::{EmitterOptions, LineBreak};
/// let options = EmitterOptions::default()
///     .indent(4)
///     .line_break(LineBreak::Windows)
///     .explicit_start(true);
/// assert_eq!(options.get_indent(), 4);
/// ```
///
/// [`EventEmitter`]: crate::emitter::EventEmitter
/// [`YamlEmitter`]: crate::emitter::YamlEmitter
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmitterOptions {
    indent: usize,
    width: usize,
    canonical: bool,
    explicit_start: bool,
    explicit_end: bool,
    line_break: LineBreak,
    allow_unicode: bool,
    version: Option<(u32, u32)>,
    tags: TagDirectives,
    default_flow_style: FlowStyle,
    default_scalar_style: Option<ScalarStyle>,
    multiline_strings: bool,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            width: 80,
            canonical: false,
            explicit_start: false,
            explicit_end: false,
            line_break: LineBreak::Unix,
            allow_unicode: true,
            version: None,
            tags: TagDirectives::new(),
            default_flow_style: FlowStyle::Auto,
            default_scalar_style: None,
            multiline_strings: false,
        }
    }
}

impl EmitterOptions {
    /// Set how many spaces are added to a nested indentation level.
    ///
    /// Values outside of `1..=10` fall back to the default of 2.
    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = if (1..=10).contains(&indent) {
            indent
        } else {
            DEFAULT_INDENT
        };
        self
    }

    /// Get how many spaces are added to a nested indentation level.
    #[must_use]
    pub fn get_indent(&self) -> usize {
        self.indent
    }

    /// Set the preferred width of lines.
    ///
    /// Flow collections and scalars are wrapped after this column when possible. Widths not
    /// larger than twice the indentation fall back to 80.
    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Get the preferred width of lines.
    #[must_use]
    pub fn get_width(&self) -> usize {
        self.width
    }

    /// Write every node in canonical form.
    ///
    /// Canonical output starts every document with `---`, uses flow collections, double quoted
    /// scalars and writes every tag.
    #[must_use]
    pub fn canonical(mut self, canonical: bool) -> Self {
        self.canonical = canonical;
        self
    }

    /// Get whether nodes are written in canonical form.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.canonical
    }

    /// Start every document with `---`.
    #[must_use]
    pub fn explicit_start(mut self, explicit_start: bool) -> Self {
        self.explicit_start = explicit_start;
        self
    }

    /// Get whether every document starts with `---`.
    #[must_use]
    pub fn is_explicit_start(&self) -> bool {
        self.explicit_start
    }

    /// End every document with `...`.
    #[must_use]
    pub fn explicit_end(mut self, explicit_end: bool) -> Self {
        self.explicit_end = explicit_end;
        self
    }

    /// Get whether every document ends with `...`.
    #[must_use]
    pub fn is_explicit_end(&self) -> bool {
        self.explicit_end
    }

    /// Set the line break written at the end of lines.
    #[must_use]
    pub fn line_break(mut self, line_break: LineBreak) -> Self {
        self.line_break = line_break;
        self
    }

    /// Get the line break written at the end of lines.
    #[must_use]
    pub fn get_line_break(&self) -> LineBreak {
        self.line_break
    }

    /// Allow printable non-ASCII characters in scalars.
    ///
    /// When disabled, scalars with non-ASCII characters are double quoted and those characters
    /// escaped.
    #[must_use]
    pub fn allow_unicode(mut self, allow_unicode: bool) -> Self {
        self.allow_unicode = allow_unicode;
        self
    }

    /// Get whether printable non-ASCII characters are written as is.
    #[must_use]
    pub fn is_allow_unicode(&self) -> bool {
        self.allow_unicode
    }

    /// Write a `%YAML` directive with the given version before every document.
    #[must_use]
    pub fn version(mut self, version: Option<(u32, u32)>) -> Self {
        self.version = version;
        self
    }

    /// Get the version written in `%YAML` directives.
    #[must_use]
    pub fn get_version(&self) -> Option<(u32, u32)> {
        self.version
    }

    /// Write `%TAG` directives for the given handles before every document.
    ///
    /// Tags starting with one of the prefixes are written with the matching handle.
    #[must_use]
    pub fn tags(mut self, tags: TagDirectives) -> Self {
        self.tags = tags;
        self
    }

    /// Get the `%TAG` directives written before every document.
    #[must_use]
    pub fn get_tags(&self) -> &TagDirectives {
        &self.tags
    }

    /// Set the style of collections whose style is not requested.
    #[must_use]
    pub fn default_flow_style(mut self, default_flow_style: FlowStyle) -> Self {
        self.default_flow_style = default_flow_style;
        self
    }

    /// Get the style of collections whose style is not requested.
    #[must_use]
    pub fn get_default_flow_style(&self) -> FlowStyle {
        self.default_flow_style
    }

    /// Set the style requested for every scalar, or `None` to pick one per scalar.
    ///
    /// The emitter may still fall back to another style when the requested one cannot
    /// represent the scalar.
    #[must_use]
    pub fn default_scalar_style(mut self, default_scalar_style: Option<ScalarStyle>) -> Self {
        self.default_scalar_style = default_scalar_style;
        self
    }

    /// Get the style requested for every scalar.
    #[must_use]
    pub fn get_default_scalar_style(&self) -> Option<ScalarStyle> {
        self.default_scalar_style
    }

    /// Render strings containing multiple lines in literal style.
    #[must_use]
    pub fn multiline_strings(mut self, multiline_strings: bool) -> Self {
        self.multiline_strings = multiline_strings;
        self
    }

    /// Get whether multiline strings are rendered in literal style.
    #[must_use]
    pub fn is_multiline_strings(&self) -> bool {
        self.multiline_strings
    }
}

#[cfg(test)]
mod test {
    use super::{EmitterOptions, FlowStyle, LineBreak};

    #[test]
    fn test_indent_is_clamped() {
        assert_eq!(EmitterOptions::default().indent(0).get_indent(), 2);
        assert_eq!(EmitterOptions::default().indent(11).get_indent(), 2);
        assert_eq!(EmitterOptions::default().indent(10).get_indent(), 10);
    }

    #[test]
    fn test_defaults() {
        let options = EmitterOptions::default();
        assert_eq!(options.get_width(), 80);
        assert_eq!(options.get_line_break(), LineBreak::Unix);
        assert_eq!(options.get_default_flow_style(), FlowStyle::Auto);
        assert!(options.is_allow_unicode());
        assert!(!options.is_canonical());
        assert!(options.get_default_scalar_style().is_none());
    }
}
