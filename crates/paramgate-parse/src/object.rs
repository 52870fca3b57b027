//! # Object Parser Base
//!
//! Every object-shaped input (a `k,v` string, exploded query keys,
//! `name[prop]` keys, a form body) resolves each key to exactly one parser:
//!
//! ```text
//! key ──▶ declared property? ──yes──▶ property parser
//!              │ no
//!              ▼
//!         first declared pattern that matches? ──yes──▶ pattern parser
//!              │ no
//!              ▼
//!         additional-properties parser (if the variant requires one)
//!              │ none
//!              ▼
//!         key omitted
//! ```
//!
//! Patterns are tested in declaration order with an unanchored regex
//! search, so with overlapping patterns the first declared one wins.
//! Before invoking the resolved parser, the variant's nullation hook may
//! turn the field into an explicit `null`.

use indexmap::IndexMap;
use paramgate_core::MalformedValueError;
use regex::Regex;
use serde_json::Value;

use crate::value::ValueParser;

/// Per-property, pattern-keyed and additional-properties parsers.
#[derive(Debug, Clone)]
pub struct ParserRegistry<P> {
    properties: IndexMap<String, P>,
    pattern_properties: Vec<(Regex, P)>,
    additional_properties: Option<Box<P>>,
}

impl<P> Default for ParserRegistry<P> {
    fn default() -> Self {
        Self {
            properties: IndexMap::new(),
            pattern_properties: Vec::new(),
            additional_properties: None,
        }
    }
}

impl<P> ParserRegistry<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a parser for an exact property name. Redeclaring a name
    /// replaces its parser.
    pub fn with_property(mut self, name: impl Into<String>, parser: P) -> Self {
        self.properties.insert(name.into(), parser);
        self
    }

    /// Declare a parser for keys matching `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for an invalid pattern.
    pub fn with_pattern_property(self, pattern: &str, parser: P) -> Result<Self, regex::Error> {
        Ok(self.with_compiled_pattern(Regex::new(pattern)?, parser))
    }

    /// Declare a parser for keys matching an already compiled pattern.
    pub fn with_compiled_pattern(mut self, pattern: Regex, parser: P) -> Self {
        self.pattern_properties.push((pattern, parser));
        self
    }

    /// Declare the parser for keys matched by neither a property nor a pattern.
    pub fn with_additional_properties(mut self, parser: P) -> Self {
        self.additional_properties = Some(Box::new(parser));
        self
    }

    pub fn property(&self, name: &str) -> Option<&P> {
        self.properties.get(name)
    }

    /// The parser of the first declared pattern matching `key`.
    pub fn matching_pattern(&self, key: &str) -> Option<&P> {
        self.pattern_properties
            .iter()
            .find(|(pattern, _)| pattern.is_match(key))
            .map(|(_, parser)| parser)
    }

    /// Resolution steps (a) and (b): exact name, then pattern.
    pub fn declared(&self, key: &str) -> Option<&P> {
        self.property(key).or_else(|| self.matching_pattern(key))
    }

    pub fn additional(&self) -> Option<&P> {
        self.additional_properties.as_deref()
    }

    /// Declared property names in declaration order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.pattern_properties.is_empty()
            && self.additional_properties.is_none()
    }
}

/// Key resolution and nullation shared by all object-shaped parsers.
pub trait ObjectParser {
    /// What one field's raw value looks like (`str`, `[String]`).
    type Serialized: ?Sized;
    type Parser: ValueParser<Self::Serialized>;

    fn parsers(&self) -> &ParserRegistry<Self::Parser>;

    /// The parser for keys that match no declared property or pattern.
    /// `None` drops such keys.
    fn additional_properties_parser_if_required(&self) -> Option<&Self::Parser>;

    /// Whether the field becomes an explicit `null` instead of being parsed.
    fn must_nullate_value(&self, serialized: Option<&Self::Serialized>, parser: &Self::Parser) -> bool;

    /// Resolve and parse one field. `Ok(None)` when no parser applies.
    ///
    /// # Errors
    ///
    /// The parser's `MalformedValueError`, carrying `key`.
    fn parse_field(
        &self,
        key: &str,
        serialized: Option<&Self::Serialized>,
    ) -> Result<Option<(String, Value)>, MalformedValueError> {
        let parser = match self.parsers().declared(key) {
            Some(parser) => parser,
            None => match self.additional_properties_parser_if_required() {
                Some(parser) => parser,
                None => return Ok(None),
            },
        };

        if self.must_nullate_value(serialized, parser) {
            return Ok(Some((key.to_string(), Value::Null)));
        }

        match serialized {
            Some(raw) => parser
                .parse(raw)
                .map(|value| Some((key.to_string(), value)))
                .map_err(|e| e.with_key(key)),
            None => Ok(Some((key.to_string(), Value::Null))),
        }
    }
}
