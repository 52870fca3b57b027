//! # Value Parsers
//!
//! `parse(raw) -> Value`, failing with [`MalformedValueError`] when the raw
//! content cannot be converted. Input is either a single string (`str`) or
//! the values of a repeated field (`[String]`).

use paramgate_core::MalformedValueError;
use serde_json::{Number, Value};

use crate::splitter::{SplitterArrayParser, SplitterObjectParser};

/// Converts serialized input into a typed value.
pub trait ValueParser<S: ?Sized>: Send + Sync {
    fn parse(&self, serialized: &S) -> Result<Value, MalformedValueError>;
}

/// Scalar conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveParser {
    /// Pass the raw string through unchanged.
    String,
    /// A 64-bit signed integer.
    Integer,
    /// An integer when the text is integral, otherwise a finite float.
    Number,
    /// Exactly `true` or `false`.
    Boolean,
    /// The raw text parsed as a JSON document.
    Json,
}

impl ValueParser<str> for PrimitiveParser {
    fn parse(&self, serialized: &str) -> Result<Value, MalformedValueError> {
        match self {
            Self::String => Ok(Value::String(serialized.to_string())),
            Self::Integer => serialized.parse::<i64>().map(Value::from).map_err(|_| {
                MalformedValueError::new(format!("expected an integer, got '{serialized}'"))
            }),
            Self::Number => {
                if let Ok(i) = serialized.parse::<i64>() {
                    return Ok(Value::from(i));
                }
                serialized
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| {
                        MalformedValueError::new(format!("expected a number, got '{serialized}'"))
                    })
            }
            Self::Boolean => match serialized {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                other => Err(MalformedValueError::new(format!(
                    "expected 'true' or 'false', got '{other}'"
                ))),
            },
            Self::Json => serde_json::from_str(serialized)
                .map_err(|e| MalformedValueError::new(format!("invalid JSON: {e}"))),
        }
    }
}

/// Parsers for a single raw string.
#[derive(Debug, Clone)]
pub enum StringValueParser {
    Primitive(PrimitiveParser),
    Array(SplitterArrayParser),
    Object(SplitterObjectParser),
}

impl StringValueParser {
    /// The pass-through string parser.
    pub const fn string() -> Self {
        Self::Primitive(PrimitiveParser::String)
    }

    /// Whether this parser keeps the raw string as is. Empty strings are
    /// meaningful to such a parser and are never nullated.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Primitive(PrimitiveParser::String))
    }
}

impl From<PrimitiveParser> for StringValueParser {
    fn from(p: PrimitiveParser) -> Self {
        Self::Primitive(p)
    }
}

impl ValueParser<str> for StringValueParser {
    fn parse(&self, serialized: &str) -> Result<Value, MalformedValueError> {
        match self {
            Self::Primitive(p) => p.parse(serialized),
            Self::Array(p) => p.parse(serialized),
            Self::Object(p) => p.parse(serialized),
        }
    }
}

/// Nullation policy for string-encoded nested elements (array items,
/// object fields): an empty string becomes `null` unless the element
/// parser is the string pass-through.
pub(crate) fn must_nullate_string(serialized: Option<&str>, parser: &StringValueParser) -> bool {
    match serialized {
        None => true,
        Some(s) => s.is_empty() && !parser.is_passthrough(),
    }
}

/// Parse one nested element under the string nullation policy.
pub(crate) fn parse_element(parser: &StringValueParser, raw: &str) -> Result<Value, MalformedValueError> {
    if must_nullate_string(Some(raw), parser) {
        Ok(Value::Null)
    } else {
        parser.parse(raw)
    }
}

/// Parsers for the values of a repeated field (`a=1&a=2`).
#[derive(Debug, Clone)]
pub enum ListValueParser {
    /// The first value through a string parser.
    Single(StringValueParser),
    /// Every value through a string parser, collected into an array.
    Exploded(StringValueParser),
    /// Every raw value as a string array.
    Raw,
}

impl ValueParser<[String]> for ListValueParser {
    fn parse(&self, serialized: &[String]) -> Result<Value, MalformedValueError> {
        match self {
            Self::Single(parser) => match serialized.first() {
                Some(first) => parser.parse(first.as_str()),
                None => Err(MalformedValueError::new("expected a value, got none")),
            },
            Self::Exploded(parser) => serialized
                .iter()
                .map(|raw| parse_element(parser, raw))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Self::Raw => Ok(Value::Array(
                serialized.iter().cloned().map(Value::String).collect(),
            )),
        }
    }
}
