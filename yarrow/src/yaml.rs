//! YAML objects manipulation utilities.

#![allow(clippy::module_name_repetitions)]

use std::{
    convert::TryFrom,
    ops::{Index, IndexMut},
};

use hashlink::LinkedHashMap;
use yarrow_parser::{BufferedInput, Input, Parser, Tag};

use crate::{
    loader::{LoadError, YamlLoader},
    Scalar,
};

/// A YAML node is stored as this `Yaml` enumeration, which provides an easy way to
/// access your YAML document.
///
/// # Examples
///
/// ```
/// use yarrow::{Scalar, Yaml};
/// let foo = Yaml::value_from_str("-123"); // convert the string to the appropriate YAML type
/// assert_eq!(foo.as_integer().unwrap(), -123);
///
/// // iterate over a sequence
/// let vec = Yaml::Sequence(vec![Yaml::Value(Scalar::Integer(1)), Yaml::Value(Scalar::Integer(2))]);
/// for v in vec.as_sequence().unwrap() {
///     assert!(v.as_integer().is_some());
/// }
/// ```
#[derive(Clone, PartialEq, PartialOrd, Debug, Eq, Ord, Hash)]
pub enum Yaml {
    /// A constructed scalar.
    Value(Scalar),
    /// YAML sequence, can be accessed as a `Vec`.
    Sequence(Sequence),
    /// YAML mapping, can be accessed as a `LinkedHashMap`.
    ///
    /// Iteration order will match the order of insertion into the map.
    Mapping(Mapping),
    /// A node with a tag the loader has no constructor for.
    ///
    /// The inner node is built as if the node had no tag.
    Tagged(Tag, Box<Yaml>),
    /// Accessing a nonexistent node via the Index trait returns `BadValue`. This
    /// simplifies error handling in the calling code. A node whose explicit YAML 1.1 tag does
    /// not accept its value is also loaded as `BadValue`.
    BadValue,
}

/// The type contained in the `Yaml::Sequence` variant. This corresponds to YAML sequences.
pub type Sequence = Vec<Yaml>;
/// The type contained in the `Yaml::Mapping` variant. This corresponds to YAML mappings.
pub type Mapping = LinkedHashMap<Yaml, Yaml>;

impl Yaml {
    /// Load the given string as an array of YAML documents.
    ///
    /// The `source` is interpreted as YAML documents and is parsed. Parsing succeeds if and only
    /// if all documents are parsed successfully. An error in a latter document prevents the former
    /// from being returned.
    ///
    /// Most often, only one document is loaded in a YAML string. In this case, only the first element
    /// of the returned `Vec` will be used. Otherwise, each element in the `Vec` is a document:
    ///
    /// ```
    /// use yarrow::{Scalar, Yaml};
    ///
    /// let docs = Yaml::load_from_str(r#"
    /// First document
    /// ---
    /// - Second document
    /// "#).unwrap();
    /// let first_document = &docs[0]; // Select the first YAML document
    /// // The document is a string containing "First document".
    /// assert_eq!(*first_document, Yaml::Value(Scalar::String("First document".into())));
    ///
    /// let second_document = &docs[1]; // Select the second YAML document
    /// // The document is a sequence containing a single string, "Second document".
    /// assert_eq!(second_document[0].as_str(), Some("Second document"));
    /// ```
    ///
    /// # Errors
    /// Returns `LoadError` when parsing fails or an alias refers to an unknown anchor.
    pub fn load_from_str(source: &str) -> Result<Vec<Self>, LoadError> {
        Self::load_from_iter(source.chars())
    }

    /// Load the contents of the given iterator as an array of YAML documents.
    ///
    /// See [`Self::load_from_str`] for details.
    ///
    /// # Errors
    /// Returns `LoadError` when loading fails.
    pub fn load_from_iter<I: Iterator<Item = char>>(source: I) -> Result<Vec<Self>, LoadError> {
        let mut parser = Parser::new(BufferedInput::new(source));
        Self::load_from_parser(&mut parser)
    }

    /// Load the contents from the specified [`Parser`] as an array of YAML documents.
    ///
    /// See [`Self::load_from_str`] for details.
    ///
    /// # Errors
    /// Returns `LoadError` when loading fails.
    pub fn load_from_parser<I: Input>(parser: &mut Parser<I>) -> Result<Vec<Self>, LoadError> {
        let mut loader = YamlLoader::default();
        loader.load(parser)?;
        Ok(loader.into_documents())
    }

    define_as_pattern!(as_bool, bool => Self::Value(Scalar::Boolean(v)) => Some(v));
    define_as_pattern!(as_integer, i64 => Self::Value(Scalar::Integer(v)) => Some(v));
    define_as_pattern!(as_floating_point, f64 => Self::Value(Scalar::FloatingPoint(v)) => Some(v.into()));
    define_as_ref_pattern!(as_str, &str => Self::Value(Scalar::String(v)) => Some(v.as_str()));

    define_as_ref!(as_sequence, &Sequence, Sequence);
    define_as_ref!(as_mapping, &Mapping, Mapping);
    define_as_ref_mut!(as_sequence_mut, &mut Sequence, Sequence);
    define_as_ref_mut!(as_mapping_mut, &mut Mapping, Mapping);

    define_into_pattern!(into_bool, bool => Self::Value(Scalar::Boolean(v)) => Some(v));
    define_into_pattern!(into_integer, i64 => Self::Value(Scalar::Integer(v)) => Some(v));
    define_into_pattern!(into_floating_point, f64 => Self::Value(Scalar::FloatingPoint(v)) => Some(v.into()));
    define_into_pattern!(into_string, String => Self::Value(Scalar::String(v)) => Some(v));
    define_into!(into_sequence, Sequence, Sequence);
    define_into!(into_mapping, Mapping, Mapping);

    define_is!(is_null, Self::Value(Scalar::Null));
    define_is!(is_boolean, Self::Value(Scalar::Boolean(_)));
    define_is!(is_integer, Self::Value(Scalar::Integer(_)));
    define_is!(is_floating_point, Self::Value(Scalar::FloatingPoint(_)));
    define_is!(is_string, Self::Value(Scalar::String(_)));
    define_is!(is_sequence, Self::Sequence(_));
    define_is!(is_mapping, Self::Mapping(_));
    define_is!(is_tagged, Self::Tagged(..));
    define_is!(is_badvalue, Self::BadValue);

    /// Return the scalar held by this node, if it is one.
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Return the tag and inner node of a [`Yaml::Tagged`] node.
    #[must_use]
    pub fn as_tagged(&self) -> Option<(&Tag, &Yaml)> {
        match self {
            Self::Tagged(tag, node) => Some((tag, node)),
            _ => None,
        }
    }

    /// Convert a string to a [`Yaml`] node, resolving it as an untagged plain scalar.
    ///
    /// This function cannot fail. It falls back to a string if nothing else matches.
    ///
    /// # Examples
    /// ```
    /// # use yarrow::{Scalar, Yaml};
    /// assert!(matches!(Yaml::value_from_str("42"), Yaml::Value(Scalar::Integer(42))));
    /// assert!(matches!(Yaml::value_from_str("0x2A"), Yaml::Value(Scalar::Integer(42))));
    /// assert!(matches!(Yaml::value_from_str("052"), Yaml::Value(Scalar::Integer(42))));
    /// assert!(matches!(Yaml::value_from_str("~"), Yaml::Value(Scalar::Null)));
    /// assert!(matches!(Yaml::value_from_str("yes"), Yaml::Value(Scalar::Boolean(true))));
    /// assert!(matches!(Yaml::value_from_str("3.14"), Yaml::Value(Scalar::FloatingPoint(_))));
    /// assert!(matches!(Yaml::value_from_str("foo"), Yaml::Value(Scalar::String(_))));
    /// ```
    #[must_use]
    pub fn value_from_str(v: &str) -> Self {
        Self::Value(Scalar::parse_from_str(v))
    }

    /// If a value is null or otherwise bad (see variants), consume it and
    /// replace it with a given value `other`. Otherwise, return self unchanged.
    ///
    /// ```
    /// use yarrow::{Scalar, Yaml};
    ///
    /// assert_eq!(Yaml::BadValue.or(Yaml::Value(Scalar::Integer(3))), Yaml::Value(Scalar::Integer(3)));
    /// assert_eq!(Yaml::Value(Scalar::Integer(3)).or(Yaml::BadValue), Yaml::Value(Scalar::Integer(3)));
    /// ```
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::BadValue | Self::Value(Scalar::Null) => other,
            this => this,
        }
    }

    /// See [`Self::or`] for behavior.
    ///
    /// This performs the same operations, but with borrowed values for less linear pipelines.
    #[must_use]
    pub fn borrowed_or<'a>(&'a self, other: &'a Self) -> &'a Self {
        match self {
            Self::BadValue | Self::Value(Scalar::Null) => other,
            this => this,
        }
    }
}

impl From<Scalar> for Yaml {
    fn from(value: Scalar) -> Self {
        Self::Value(value)
    }
}

static BAD_VALUE: Yaml = Yaml::BadValue;

impl<'a> Index<&'a str> for Yaml {
    type Output = Yaml;

    fn index(&self, idx: &'a str) -> &Yaml {
        match self {
            Yaml::Mapping(mapping) => mapping
                .get(&Yaml::Value(Scalar::String(idx.to_owned())))
                .unwrap_or(&BAD_VALUE),
            _ => &BAD_VALUE,
        }
    }
}

impl<'a> IndexMut<&'a str> for Yaml {
    /// Perform indexing if `self` is a mapping.
    ///
    /// # Panics
    /// This function panics if the key given does not exist within `self` (as per [`Index`]).
    ///
    /// This function also panics if `self` is not a [`Yaml::Mapping`].
    fn index_mut(&mut self, idx: &'a str) -> &mut Yaml {
        match self.as_mapping_mut() {
            Some(mapping) => match mapping.get_mut(&Yaml::Value(Scalar::String(idx.to_owned()))) {
                Some(value) => value,
                None => panic!("Key '{idx}' not found in YAML mapping"),
            },
            None => panic!("Not a mapping"),
        }
    }
}

impl Index<usize> for Yaml {
    type Output = Yaml;

    fn index(&self, idx: usize) -> &Self::Output {
        match self {
            Yaml::Sequence(sequence) => sequence.get(idx).unwrap_or(&BAD_VALUE),
            Yaml::Mapping(mapping) => i64::try_from(idx)
                .ok()
                .and_then(|idx| mapping.get(&Yaml::Value(Scalar::Integer(idx))))
                .unwrap_or(&BAD_VALUE),
            _ => &BAD_VALUE,
        }
    }
}

impl IndexMut<usize> for Yaml {
    /// Perform indexing if `self` is a sequence or a mapping.
    ///
    /// # Panics
    /// This function panics if the index given is out of range (as per [`IndexMut`]). If `self` is
    /// a [`Yaml::Sequence`], this is when the index is bigger or equal to the length of the
    /// underlying `Vec`. If `self` is a [`Yaml::Mapping`], this is when the mapping does not
    /// contain an integer key equal to `idx`.
    ///
    /// This function also panics if `self` is not a [`Yaml::Sequence`] nor a [`Yaml::Mapping`].
    fn index_mut(&mut self, idx: usize) -> &mut Yaml {
        match self {
            Yaml::Sequence(sequence) => sequence.index_mut(idx),
            Yaml::Mapping(mapping) => i64::try_from(idx)
                .ok()
                .and_then(|key| mapping.get_mut(&Yaml::Value(Scalar::Integer(key))))
                .unwrap_or_else(|| panic!("Key {idx} not found in YAML mapping")),
            _ => panic!("Attempting to index but `self` is not a sequence nor a mapping"),
        }
    }
}

impl IntoIterator for Yaml {
    type Item = Yaml;
    type IntoIter = YamlIter;

    fn into_iter(self) -> Self::IntoIter {
        YamlIter {
            yaml: self.into_sequence().unwrap_or_default().into_iter(),
        }
    }
}

/// An iterator over the items of a [`Yaml`] sequence.
///
/// Iterating over anything but a sequence yields nothing.
pub struct YamlIter {
    yaml: std::vec::IntoIter<Yaml>,
}

impl Iterator for YamlIter {
    type Item = Yaml;

    fn next(&mut self) -> Option<Yaml> {
        self.yaml.next()
    }
}
