//! # Delimited Array and Object Parsers
//!
//! Composite values packed into one string: `3,4,5`, `3|4|5`,
//! `R,100,G,200`, `R=100,G=200`. The delimiter is a string so that matrix
//! explode (`3;id=4;id=5` once the leading `;id=` is stripped) fits the
//! same parser.

use paramgate_core::MalformedValueError;
use serde_json::{Map, Value};

use crate::object::{ObjectParser, ParserRegistry};
use crate::value::{must_nullate_string, parse_element, StringValueParser, ValueParser};

/// Splits a string on a delimiter and parses every item.
#[derive(Debug, Clone)]
pub struct SplitterArrayParser {
    delimiter: String,
    items: Box<StringValueParser>,
}

impl SplitterArrayParser {
    pub fn new(delimiter: impl Into<String>, items: StringValueParser) -> Self {
        Self {
            delimiter: delimiter.into(),
            items: Box::new(items),
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }
}

impl ValueParser<str> for SplitterArrayParser {
    fn parse(&self, serialized: &str) -> Result<Value, MalformedValueError> {
        // An empty string is one empty item to a string parser and no items
        // to any other.
        if serialized.is_empty() && !self.items.is_passthrough() {
            return Ok(Value::Array(Vec::new()));
        }
        serialized
            .split(self.delimiter.as_str())
            .map(|item| parse_element(&self.items, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

/// Parses `k,v,k,v` pairs, or `k=v` pairs when a key/value separator is
/// configured, through the object parser resolution order.
///
/// Unknown keys fall back to the string pass-through unless an
/// additional-properties parser is declared: the schema decides whether
/// they are allowed.
#[derive(Debug, Clone)]
pub struct SplitterObjectParser {
    parsers: ParserRegistry<StringValueParser>,
    delimiter: String,
    key_value_separator: Option<char>,
    passthrough: Box<StringValueParser>,
}

impl SplitterObjectParser {
    /// Alternating keys and values separated by `delimiter`.
    pub fn new(parsers: ParserRegistry<StringValueParser>, delimiter: impl Into<String>) -> Self {
        Self {
            parsers,
            delimiter: delimiter.into(),
            key_value_separator: None,
            passthrough: Box::new(StringValueParser::string()),
        }
    }

    /// `key{separator}value` entries separated by the delimiter.
    pub fn with_key_value_separator(mut self, separator: char) -> Self {
        self.key_value_separator = Some(separator);
        self
    }

    fn entries<'a>(&self, serialized: &'a str) -> Result<Vec<(&'a str, &'a str)>, MalformedValueError> {
        let tokens = serialized.split(self.delimiter.as_str());
        match self.key_value_separator {
            Some(separator) => tokens
                .map(|entry| {
                    entry.split_once(separator).ok_or_else(|| {
                        MalformedValueError::new(format!(
                            "expected '{separator}' between key and value in '{entry}'"
                        ))
                    })
                })
                .collect(),
            None => {
                let tokens: Vec<&str> = tokens.collect();
                if tokens.len() % 2 != 0 {
                    return Err(MalformedValueError::new(format!(
                        "unbalanced key/value pairs in '{serialized}'"
                    )));
                }
                Ok(tokens.chunks(2).map(|pair| (pair[0], pair[1])).collect())
            }
        }
    }
}

impl ObjectParser for SplitterObjectParser {
    type Serialized = str;
    type Parser = StringValueParser;

    fn parsers(&self) -> &ParserRegistry<StringValueParser> {
        &self.parsers
    }

    fn additional_properties_parser_if_required(&self) -> Option<&StringValueParser> {
        Some(self.parsers.additional().unwrap_or(&*self.passthrough))
    }

    fn must_nullate_value(&self, serialized: Option<&str>, parser: &StringValueParser) -> bool {
        must_nullate_string(serialized, parser)
    }
}

impl ValueParser<str> for SplitterObjectParser {
    fn parse(&self, serialized: &str) -> Result<Value, MalformedValueError> {
        let mut object = Map::new();
        if serialized.is_empty() {
            return Ok(Value::Object(object));
        }
        for (key, raw) in self.entries(serialized)? {
            if let Some((key, value)) = self.parse_field(key, Some(raw))? {
                object.insert(key, value);
            }
        }
        Ok(Value::Object(object))
    }
}
