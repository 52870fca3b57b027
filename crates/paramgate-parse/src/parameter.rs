//! # Parameter Parsers
//!
//! Extract one declared parameter from the raw values of its location.
//! `Ok(None)` means the parameter is absent from the request; what that
//! implies (error, default, omission) is decided by the processor.

use paramgate_core::{MalformedValueError, ParamMap};
use serde_json::{Map, Value};

use crate::object::{ObjectParser, ParserRegistry};
use crate::value::{must_nullate_string, parse_element, StringValueParser, ValueParser};

/// Location-aware parsing of one parameter.
pub trait ParameterParser: Send + Sync {
    fn parse_parameter(&self, params: &ParamMap) -> Result<Option<Value>, MalformedValueError>;
}

impl<F> ParameterParser for F
where
    F: Fn(&ParamMap) -> Result<Option<Value>, MalformedValueError> + Send + Sync,
{
    fn parse_parameter(&self, params: &ParamMap) -> Result<Option<Value>, MalformedValueError> {
        self(params)
    }
}

/// The first value of the parameter, optionally behind a required prefix
/// (label `.`, matrix `;name=`), through one string parser.
#[derive(Debug, Clone)]
pub struct SingleValueParameterParser {
    name: String,
    prefix: Option<String>,
    parser: StringValueParser,
}

impl SingleValueParameterParser {
    pub fn new(name: impl Into<String>, parser: StringValueParser) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            parser,
        }
    }

    /// Require and strip `prefix` before parsing.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl ParameterParser for SingleValueParameterParser {
    fn parse_parameter(&self, params: &ParamMap) -> Result<Option<Value>, MalformedValueError> {
        let Some(raw) = params.first(&self.name) else {
            return Ok(None);
        };
        params.check(&self.name)?;
        let raw = match &self.prefix {
            Some(prefix) => raw.strip_prefix(prefix.as_str()).ok_or_else(|| {
                MalformedValueError::new(format!("expected '{raw}' to start with '{prefix}'"))
            })?,
            None => raw,
        };
        self.parser.parse(raw).map(Some)
    }
}

/// Every repeated value of the parameter (`id=3&id=4`) as an array.
#[derive(Debug, Clone)]
pub struct ExplodedArrayParameterParser {
    name: String,
    items: StringValueParser,
}

impl ExplodedArrayParameterParser {
    pub fn new(name: impl Into<String>, items: StringValueParser) -> Self {
        Self {
            name: name.into(),
            items,
        }
    }
}

impl ParameterParser for ExplodedArrayParameterParser {
    fn parse_parameter(&self, params: &ParamMap) -> Result<Option<Value>, MalformedValueError> {
        match params.get_all(&self.name) {
            None | Some([]) => Ok(None),
            Some(values) => {
                params.check(&self.name)?;
                values
                    .iter()
                    .map(|raw| parse_element(&self.items, raw))
                    .collect::<Result<Vec<_>, _>>()
                    .map(|items| Some(Value::Array(items)))
            }
        }
    }
}

/// An object whose properties are spread over top-level keys
/// (`R=100&G=200`). Keys matching no declared property or pattern are
/// ignored unless an additional-properties parser is declared, since the
/// location also carries unrelated parameters.
#[derive(Debug, Clone)]
pub struct ExplodedObjectParameterParser {
    parsers: ParserRegistry<StringValueParser>,
}

impl ExplodedObjectParameterParser {
    pub fn new(parsers: ParserRegistry<StringValueParser>) -> Self {
        Self { parsers }
    }
}

impl ObjectParser for ExplodedObjectParameterParser {
    type Serialized = str;
    type Parser = StringValueParser;

    fn parsers(&self) -> &ParserRegistry<StringValueParser> {
        &self.parsers
    }

    fn additional_properties_parser_if_required(&self) -> Option<&StringValueParser> {
        self.parsers.additional()
    }

    fn must_nullate_value(&self, serialized: Option<&str>, parser: &StringValueParser) -> bool {
        must_nullate_string(serialized, parser)
    }
}

impl ParameterParser for ExplodedObjectParameterParser {
    fn parse_parameter(&self, params: &ParamMap) -> Result<Option<Value>, MalformedValueError> {
        let mut object = Map::new();
        for (key, values) in params.iter() {
            let raw = values.first().map(String::as_str);
            if let Some((property, value)) = self.parse_field(key, raw)? {
                params.check(key).map_err(|e| e.with_key(key))?;
                object.insert(property, value);
            }
        }
        Ok((!object.is_empty()).then_some(Value::Object(object)))
    }
}

/// An object serialized as `name[prop]=value` keys.
#[derive(Debug, Clone)]
pub struct DeepObjectParameterParser {
    key_prefix: String,
    parsers: ParserRegistry<StringValueParser>,
    passthrough: StringValueParser,
}

impl DeepObjectParameterParser {
    pub fn new(name: &str, parsers: ParserRegistry<StringValueParser>) -> Self {
        Self {
            key_prefix: format!("{name}["),
            parsers,
            passthrough: StringValueParser::string(),
        }
    }
}

impl ObjectParser for DeepObjectParameterParser {
    type Serialized = str;
    type Parser = StringValueParser;

    fn parsers(&self) -> &ParserRegistry<StringValueParser> {
        &self.parsers
    }

    // Every bracketed key belongs to this parameter, so unknown properties
    // are kept for the schema to judge.
    fn additional_properties_parser_if_required(&self) -> Option<&StringValueParser> {
        Some(self.parsers.additional().unwrap_or(&self.passthrough))
    }

    fn must_nullate_value(&self, serialized: Option<&str>, parser: &StringValueParser) -> bool {
        must_nullate_string(serialized, parser)
    }
}

impl ParameterParser for DeepObjectParameterParser {
    fn parse_parameter(&self, params: &ParamMap) -> Result<Option<Value>, MalformedValueError> {
        let mut object = Map::new();
        let mut found = false;
        for (key, values) in params.iter() {
            let Some(rest) = key.strip_prefix(self.key_prefix.as_str()) else {
                continue;
            };
            let property = rest.strip_suffix(']').ok_or_else(|| {
                MalformedValueError::new(format!("unterminated deepObject key '{key}'"))
            })?;
            found = true;
            params.check(key).map_err(|e| e.with_key(property))?;
            if let Some((property, value)) = self.parse_field(property, values.first().map(String::as_str))? {
                object.insert(property, value);
            }
        }
        Ok(found.then_some(Value::Object(object)))
    }
}
