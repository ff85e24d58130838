//! Construction of scalar values from their YAML 1.1 representation.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::resolver::{
    Resolver, BOOL_TAG, FLOAT_TAG, INT_TAG, MERGE_TAG, NULL_TAG, STR_TAG, TIMESTAMP_TAG, VALUE_TAG,
};
use yarrow_parser::Implicit;

/// The constructed value of a scalar YAML node.
///
/// Timestamps and the merge and value keys have no dedicated variant. They are kept as
/// [`Scalar::String`].
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Scalar {
    /// A null value (`~`, `null`, or nothing at all).
    Null,
    /// A boolean value (`true`, `yes`, `on`, `false`, `no`, `off`, in any case).
    Boolean(bool),
    /// An integer value, written in binary, octal, decimal, hexadecimal or base 60.
    Integer(i64),
    /// A floating point value.
    FloatingPoint(OrderedFloat<f64>),
    /// A string.
    ///
    /// This variant is used when representing the node in any other representation fails.
    String(String),
}

impl Scalar {
    define_yaml_scalar_conversion_ops!();

    /// Construct the value of a scalar with the given full tag.
    ///
    /// # Return
    /// Returns [`None`] if the tag is not one of the YAML 1.1 scalar tags (see
    /// [`Scalar::is_scalar_tag`]) or if `value` is not a valid representation for it.
    ///
    /// # Examples
    /// ```
    /// # use yarrow::Scalar;
    /// # use yarrow::resolver::{BOOL_TAG, INT_TAG, STR_TAG};
    /// assert_eq!(Scalar::construct(INT_TAG, "0x_2A"), Some(Scalar::Integer(42)));
    /// assert_eq!(Scalar::construct(INT_TAG, "1:30"), Some(Scalar::Integer(90)));
    /// assert_eq!(Scalar::construct(BOOL_TAG, "Yes"), Some(Scalar::Boolean(true)));
    /// assert_eq!(Scalar::construct(STR_TAG, "12"), Some(Scalar::String("12".into())));
    /// assert_eq!(Scalar::construct(INT_TAG, "twelve"), None);
    /// ```
    #[must_use]
    pub fn construct(tag: &str, value: &str) -> Option<Self> {
        match tag {
            NULL_TAG => construct_null(value).then_some(Self::Null),
            BOOL_TAG => construct_bool(value).map(Self::Boolean),
            INT_TAG => construct_int(value).map(Self::Integer),
            FLOAT_TAG => construct_float(value).map(|f| Self::FloatingPoint(OrderedFloat(f))),
            STR_TAG | TIMESTAMP_TAG | MERGE_TAG | VALUE_TAG => Some(Self::String(value.to_owned())),
            _ => None,
        }
    }

    /// Return whether [`Scalar::construct`] knows how to build values of the given tag.
    #[must_use]
    pub fn is_scalar_tag(tag: &str) -> bool {
        matches!(
            tag,
            NULL_TAG | BOOL_TAG | INT_TAG | FLOAT_TAG | STR_TAG | TIMESTAMP_TAG | MERGE_TAG | VALUE_TAG
        )
    }

    /// Resolve and construct an untagged scalar.
    ///
    /// This function cannot fail. It falls back to [`Scalar::String`] when the resolved type
    /// cannot hold the value, e.g. an integer that does not fit in an `i64`.
    ///
    /// # Examples
    /// ```
    /// # use yarrow::{Implicit, Scalar};
    /// let plain = Implicit { plain: true, quoted: false };
    /// let quoted = Implicit { plain: false, quoted: true };
    /// assert_eq!(Scalar::resolve("0o17", plain), Scalar::String("0o17".into()));
    /// assert_eq!(Scalar::resolve("017", plain), Scalar::Integer(15));
    /// assert_eq!(Scalar::resolve("017", quoted), Scalar::String("017".into()));
    /// assert_eq!(Scalar::resolve("~", plain), Scalar::Null);
    /// ```
    #[must_use]
    pub fn resolve(value: &str, implicit: Implicit) -> Self {
        let tag = Resolver::yaml_1_1().resolve_scalar(value, implicit);
        Self::construct(tag, value).unwrap_or_else(|| Self::String(value.to_owned()))
    }

    /// Resolve and construct a scalar as if it were written plain and untagged.
    #[must_use]
    pub fn parse_from_str(value: &str) -> Self {
        Self::resolve(
            value,
            Implicit {
                plain: true,
                quoted: false,
            },
        )
    }

    /// Return the tag the resolver would give to this value.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Null => NULL_TAG,
            Self::Boolean(_) => BOOL_TAG,
            Self::Integer(_) => INT_TAG,
            Self::FloatingPoint(_) => FLOAT_TAG,
            Self::String(_) => STR_TAG,
        }
    }
}

impl fmt::Display for Scalar {
    /// Write the canonical plain text of the value.
    ///
    /// Strings are written as is, without any quoting.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(true) => f.write_str("true"),
            Self::Boolean(false) => f.write_str("false"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::FloatingPoint(v) => {
                let v = v.into_inner();
                if v.is_nan() {
                    f.write_str(".nan")
                } else if v.is_infinite() {
                    f.write_str(if v.is_sign_positive() { ".inf" } else { "-.inf" })
                } else {
                    let text = v.to_string();
                    if text.contains('.') {
                        f.write_str(&text)
                    } else {
                        write!(f, "{text}.0")
                    }
                }
            }
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::FloatingPoint(OrderedFloat(value))
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

fn construct_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

fn construct_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "true" | "on" => Some(true),
        "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Split the sign off a number, returning whether it is negative.
fn split_sign(value: &str) -> (bool, &str) {
    if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else {
        (false, value.strip_prefix('+').unwrap_or(value))
    }
}

fn construct_int(value: &str) -> Option<i64> {
    let value = value.replace('_', "");
    let (negative, digits) = split_sign(&value);
    if digits.starts_with(['+', '-']) {
        return None;
    }
    if digits.contains(':') {
        let mut total: i64 = 0;
        for part in digits.split(':') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            total = total.checked_mul(60)?.checked_add(part.parse::<i64>().ok()?)?;
        }
        return Some(if negative { -total } else { total });
    }
    let (radix, digits) = if let Some(rest) = digits.strip_prefix("0b") {
        (2, rest)
    } else if let Some(rest) = digits.strip_prefix("0x") {
        (16, rest)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if digits.starts_with(['+', '-']) {
        return None;
    }
    // Parsing with the sign lets `i64::MIN` through.
    if negative {
        i64::from_str_radix(&format!("-{digits}"), radix).ok()
    } else {
        i64::from_str_radix(digits, radix).ok()
    }
}

fn construct_float(value: &str) -> Option<f64> {
    let value = value.replace('_', "").to_ascii_lowercase();
    let (negative, digits) = split_sign(&value);
    let magnitude = match digits {
        ".inf" => f64::INFINITY,
        ".nan" => f64::NAN,
        _ if digits.contains(':') => {
            let mut total = 0.0;
            for part in digits.split(':') {
                total = total * 60.0 + parse_decimal(part)?;
            }
            total
        }
        _ => parse_decimal(digits)?,
    };
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse an unsigned decimal floating point number.
fn parse_decimal(v: &str) -> Option<f64> {
    // Test that `v` contains a digit so as not to pass in strings like `inf`, which rust will
    // parse as a float.
    if v.starts_with(['+', '-']) || !v.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    v.parse::<f64>().ok()
}
