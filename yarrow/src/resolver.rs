//! The YAML 1.1 implicit tag resolver.
//!
//! Untagged plain scalars get their tag from their text: `12` is an integer, `yes` a boolean, `~`
//! a null. Quoted and block scalars are always strings, sequences and mappings get the `seq` and
//! `map` tags.

use std::sync::OnceLock;

use regex::Regex;
use yarrow_parser::Implicit;

/// The tag of YAML 1.1 booleans.
pub const BOOL_TAG: &str = "tag:yaml.org,2002:bool";
/// The tag of YAML 1.1 floating point numbers.
pub const FLOAT_TAG: &str = "tag:yaml.org,2002:float";
/// The tag of YAML 1.1 integers.
pub const INT_TAG: &str = "tag:yaml.org,2002:int";
/// The tag of the YAML 1.1 merge key (`<<`).
pub const MERGE_TAG: &str = "tag:yaml.org,2002:merge";
/// The tag of YAML 1.1 nulls.
pub const NULL_TAG: &str = "tag:yaml.org,2002:null";
/// The tag of YAML 1.1 strings.
pub const STR_TAG: &str = "tag:yaml.org,2002:str";
/// The tag of YAML 1.1 timestamps.
pub const TIMESTAMP_TAG: &str = "tag:yaml.org,2002:timestamp";
/// The tag of the YAML 1.1 value key (`=`).
pub const VALUE_TAG: &str = "tag:yaml.org,2002:value";
/// The tag of sequences.
pub const SEQ_TAG: &str = "tag:yaml.org,2002:seq";
/// The tag of mappings.
pub const MAP_TAG: &str = "tag:yaml.org,2002:map";

/// An implicit resolution rule.
#[derive(Debug)]
struct ImplicitResolver {
    /// The tag given to matching scalars.
    tag: &'static str,
    /// The pattern the whole scalar must match.
    regex: Regex,
    /// The characters a matching scalar may start with. The empty string matches the empty
    /// scalar.
    first: &'static str,
}

/// Assigns tags to nodes that do not carry one.
///
/// Rules are tried in the order they were added. A scalar is only checked against the rules
/// whose first characters include the first character of the scalar.
#[derive(Debug)]
pub struct Resolver {
    implicit: Vec<ImplicitResolver>,
}

impl Resolver {
    /// Create a resolver without any implicit rule.
    ///
    /// Every plain scalar resolves to a string.
    #[must_use]
    pub fn empty() -> Self {
        Self { implicit: vec![] }
    }

    /// Create a resolver with the YAML 1.1 implicit rules.
    #[must_use]
    pub fn new() -> Self {
        let mut resolver = Self::empty();
        for (tag, pattern, first) in YAML_1_1_RULES {
            let regex = Regex::new(pattern).expect("built-in resolver patterns are valid");
            resolver.add_implicit_resolver(tag, regex, first);
        }
        resolver
    }

    /// Return the shared YAML 1.1 resolver.
    #[must_use]
    pub fn yaml_1_1() -> &'static Resolver {
        static RESOLVER: OnceLock<Resolver> = OnceLock::new();
        RESOLVER.get_or_init(Resolver::new)
    }

    /// Add a rule giving `tag` to plain scalars matching `regex`.
    ///
    /// `first` lists the characters a matching scalar may start with. Include an empty string
    /// in the rule by passing `""` for it to be checked against empty scalars.
    pub fn add_implicit_resolver(&mut self, tag: &'static str, regex: Regex, first: &'static str) {
        self.implicit.push(ImplicitResolver { tag, regex, first });
    }

    /// Return the tag of an untagged scalar.
    ///
    /// Only scalars that may be resolved from their plain rendition (see [`Implicit::plain`])
    /// are checked against the implicit rules. Others are strings.
    #[must_use]
    pub fn resolve_scalar(&self, value: &str, implicit: Implicit) -> &'static str {
        if implicit.plain {
            let first = value.chars().next();
            let candidates = self.implicit.iter().filter(|rule| match first {
                Some(c) => rule.first.contains(c),
                None => rule.first.is_empty(),
            });
            for rule in candidates {
                if rule.regex.is_match(value) {
                    return rule.tag;
                }
            }
        }
        STR_TAG
    }

    /// Return the tag of an untagged sequence.
    #[must_use]
    pub fn resolve_sequence(&self) -> &'static str {
        SEQ_TAG
    }

    /// Return the tag of an untagged mapping.
    #[must_use]
    pub fn resolve_mapping(&self) -> &'static str {
        MAP_TAG
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

/// `(tag, regex, first characters)` of the YAML 1.1 types.
const YAML_1_1_RULES: [(&str, &str, &str); 8] = [
    (
        BOOL_TAG,
        r"^(?:yes|Yes|YES|no|No|NO|true|True|TRUE|false|False|FALSE|on|On|ON|off|Off|OFF)$",
        "yYnNtTfFoO",
    ),
    (
        FLOAT_TAG,
        r"^(?:[-+]?(?:[0-9][0-9_]*)\.[0-9_]*(?:[eE][-+][0-9]+)?|\.[0-9][0-9_]*(?:[eE][-+][0-9]+)?|[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+\.[0-9_]*|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
        "-+0123456789.",
    ),
    (
        INT_TAG,
        r"^(?:[-+]?0b[0-1_]+|[-+]?0[0-7_]+|[-+]?(?:0|[1-9][0-9_]*)|[-+]?0x[0-9a-fA-F_]+|[-+]?[1-9][0-9_]*(?::[0-5]?[0-9])+)$",
        "-+0123456789",
    ),
    (MERGE_TAG, r"^(?:<<)$", "<"),
    (NULL_TAG, r"^(?:~|null|Null|NULL)$", "~nN"),
    (NULL_TAG, r"^$", ""),
    (
        TIMESTAMP_TAG,
        r"^(?:[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]|[0-9][0-9][0-9][0-9]-[0-9][0-9]?-[0-9][0-9]?(?:[Tt]|[ \t]+)[0-9][0-9]?:[0-9][0-9]:[0-9][0-9](?:\.[0-9]*)?(?:[ \t]*(?:Z|[-+][0-9][0-9]?(?::[0-9][0-9])?))?)$",
        "0123456789",
    ),
    (VALUE_TAG, r"^(?:=)$", "="),
];
