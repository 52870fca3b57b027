//! # Parser Inference
//!
//! Chooses parsers for a declared parameter or form body from its schema,
//! style and explode flag. Runs once at route registration.
//!
//! ## Type Selection
//!
//! The schema's `type` selects the parser; with a type array the first
//! non-`null` entry wins. Without `type`, `properties`,
//! `patternProperties` or `additionalProperties` imply an object and
//! `items` implies an array; anything else is parsed as a string.
//! Nested arrays and objects that a single delimited string cannot express
//! are parsed as JSON text.

use std::collections::HashMap;

use paramgate_core::{ParameterLocation, ParameterStyle};
use paramgate_schema::{SchemaDefinitionError, SchemaRepository};
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::object::ParserRegistry;
use crate::parameter::{
    DeepObjectParameterParser, ExplodedArrayParameterParser, ExplodedObjectParameterParser,
    ParameterParser, SingleValueParameterParser,
};
use crate::splitter::{SplitterArrayParser, SplitterObjectParser};
use crate::value::{ListValueParser, PrimitiveParser, StringValueParser};

/// A parameter declaration that cannot be turned into a parser.
#[derive(Error, Debug)]
pub enum ParserConfigError {
    /// The style is not defined for the parameter's location.
    #[error("style '{style}' is not allowed for {location} parameter '{name}'")]
    StyleNotAllowed {
        name: String,
        style: ParameterStyle,
        location: ParameterLocation,
    },

    /// The style cannot serialize values of the schema's type.
    #[error("style '{style}' cannot serialize {schema_type} parameter '{name}'")]
    StyleNotApplicable {
        name: String,
        style: ParameterStyle,
        schema_type: SchemaType,
    },

    /// A `patternProperties` key is not a valid regex.
    #[error("invalid patternProperties regex '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The schema has an unresolvable reference.
    #[error(transparent)]
    Schema(#[from] SchemaDefinitionError),
}

/// The JSON type a parser produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    /// Infer the type of a (resolved) schema.
    pub fn of(schema: &Value) -> Self {
        let declared = match schema.get("type") {
            Some(Value::String(t)) => Some(t.as_str()),
            Some(Value::Array(types)) => types
                .iter()
                .filter_map(Value::as_str)
                .find(|t| *t != "null"),
            _ => None,
        };
        match declared {
            Some("integer") => Self::Integer,
            Some("number") => Self::Number,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            Some(_) => Self::String,
            None if ["properties", "patternProperties", "additionalProperties"]
                .iter()
                .any(|k| schema.get(k).is_some()) =>
            {
                Self::Object
            }
            None if schema.get("items").is_some() => Self::Array,
            None => Self::String,
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        };
        f.write_str(s)
    }
}

/// Builds parsers from schemas, following top-level `$ref`s through the
/// repository.
#[derive(Debug, Clone, Copy)]
pub struct ParserInference<'a> {
    repository: &'a SchemaRepository,
}

impl<'a> ParserInference<'a> {
    pub fn new(repository: &'a SchemaRepository) -> Self {
        Self { repository }
    }

    /// The scalar parser for a schema; arrays and objects become JSON text.
    pub fn primitive(&self, schema: &Value) -> Result<PrimitiveParser, ParserConfigError> {
        let resolved = self.repository.resolve(schema)?;
        Ok(match SchemaType::of(resolved) {
            SchemaType::String => PrimitiveParser::String,
            SchemaType::Integer => PrimitiveParser::Integer,
            SchemaType::Number => PrimitiveParser::Number,
            SchemaType::Boolean => PrimitiveParser::Boolean,
            SchemaType::Array | SchemaType::Object => PrimitiveParser::Json,
        })
    }

    /// Item parser of an array schema; a missing `items` means strings.
    fn items(&self, array_schema: &Value) -> Result<StringValueParser, ParserConfigError> {
        match array_schema.get("items") {
            Some(items) => Ok(self.primitive(items)?.into()),
            None => Ok(StringValueParser::string()),
        }
    }

    /// Property, pattern-property and additional-property parsers of an
    /// object schema, with `make` building each parser from its schema.
    fn registry<P>(
        &self,
        object_schema: &Value,
        mut make: impl FnMut(&str, &Value) -> Result<P, ParserConfigError>,
    ) -> Result<ParserRegistry<P>, ParserConfigError> {
        let mut registry = ParserRegistry::new();
        if let Some(properties) = object_schema.get("properties").and_then(Value::as_object) {
            for (name, schema) in properties {
                registry = registry.with_property(name.clone(), make(name, schema)?);
            }
        }
        if let Some(patterns) = object_schema.get("patternProperties").and_then(Value::as_object) {
            for (pattern, schema) in patterns {
                let regex = Regex::new(pattern).map_err(|source| ParserConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                registry = registry.with_compiled_pattern(regex, make(pattern, schema)?);
            }
        }
        if let Some(additional) = object_schema.get("additionalProperties").filter(|v| v.is_object()) {
            registry = registry.with_additional_properties(make("", additional)?);
        }
        Ok(registry)
    }

    fn string_registry(&self, object_schema: &Value) -> Result<ParserRegistry<StringValueParser>, ParserConfigError> {
        self.registry(object_schema, |_, schema| Ok(self.primitive(schema)?.into()))
    }

    /// The parser for a declared parameter.
    ///
    /// # Errors
    ///
    /// `StyleNotAllowed` for a style undefined at the location,
    /// `StyleNotApplicable` for a style that cannot carry the schema's
    /// type, `InvalidPattern` and `Schema` for broken schemas.
    pub fn parameter_parser(
        &self,
        name: &str,
        location: ParameterLocation,
        style: ParameterStyle,
        explode: bool,
        schema: &Value,
    ) -> Result<Box<dyn ParameterParser>, ParserConfigError> {
        if !style.allowed_in(location) {
            return Err(ParserConfigError::StyleNotAllowed {
                name: name.to_string(),
                style,
                location,
            });
        }

        let resolved = self.repository.resolve(schema)?;
        let schema_type = SchemaType::of(resolved);
        let not_applicable = || ParserConfigError::StyleNotApplicable {
            name: name.to_string(),
            style,
            schema_type,
        };
        let single = |parser: StringValueParser| SingleValueParameterParser::new(name, parser);
        let array = |delimiter: &str| -> Result<StringValueParser, ParserConfigError> {
            Ok(StringValueParser::Array(SplitterArrayParser::new(delimiter, self.items(resolved)?)))
        };
        let pairs = |delimiter: &str| -> Result<SplitterObjectParser, ParserConfigError> {
            Ok(SplitterObjectParser::new(self.string_registry(resolved)?, delimiter))
        };

        let parser: Box<dyn ParameterParser> = match (style, schema_type) {
            (ParameterStyle::DeepObject, SchemaType::Object) => Box::new(DeepObjectParameterParser::new(
                name,
                self.string_registry(resolved)?,
            )),
            (ParameterStyle::DeepObject, _) => return Err(not_applicable()),

            (ParameterStyle::SpaceDelimited | ParameterStyle::PipeDelimited, SchemaType::Array) => {
                if explode {
                    Box::new(ExplodedArrayParameterParser::new(name, self.items(resolved)?))
                } else if style == ParameterStyle::SpaceDelimited {
                    Box::new(single(array(" ")?))
                } else {
                    Box::new(single(array("|")?))
                }
            }
            (ParameterStyle::SpaceDelimited | ParameterStyle::PipeDelimited, _) => {
                return Err(not_applicable())
            }

            (ParameterStyle::Form, SchemaType::Array) if explode => {
                Box::new(ExplodedArrayParameterParser::new(name, self.items(resolved)?))
            }
            (ParameterStyle::Form, SchemaType::Object) if explode => {
                Box::new(ExplodedObjectParameterParser::new(self.string_registry(resolved)?))
            }
            (ParameterStyle::Form | ParameterStyle::Simple, SchemaType::Array) => Box::new(single(array(",")?)),
            (ParameterStyle::Form, SchemaType::Object) => {
                Box::new(single(StringValueParser::Object(pairs(",")?)))
            }
            (ParameterStyle::Simple, SchemaType::Object) => {
                let object = if explode {
                    pairs(",")?.with_key_value_separator('=')
                } else {
                    pairs(",")?
                };
                Box::new(single(StringValueParser::Object(object)))
            }

            (ParameterStyle::Label, SchemaType::Array) => {
                Box::new(single(array(if explode { "." } else { "," })?).with_prefix("."))
            }
            (ParameterStyle::Label, SchemaType::Object) => {
                let object = if explode {
                    pairs(".")?.with_key_value_separator('=')
                } else {
                    pairs(",")?
                };
                Box::new(single(StringValueParser::Object(object)).with_prefix("."))
            }

            (ParameterStyle::Matrix, SchemaType::Array) => {
                let prefix = format!(";{name}=");
                let delimiter = if explode { prefix.as_str() } else { "," };
                Box::new(single(array(delimiter)?).with_prefix(prefix.clone()))
            }
            (ParameterStyle::Matrix, SchemaType::Object) => {
                if explode {
                    let object = pairs(";")?.with_key_value_separator('=');
                    Box::new(single(StringValueParser::Object(object)).with_prefix(";"))
                } else {
                    let object = pairs(",")?;
                    Box::new(single(StringValueParser::Object(object)).with_prefix(format!(";{name}=")))
                }
            }

            (ParameterStyle::Label, _) => Box::new(single(self.primitive(resolved)?.into()).with_prefix(".")),
            (ParameterStyle::Matrix, _) => {
                Box::new(single(self.primitive(resolved)?.into()).with_prefix(format!(";{name}=")))
            }
            (ParameterStyle::Form | ParameterStyle::Simple, _) => Box::new(single(self.primitive(resolved)?.into())),
        };
        Ok(parser)
    }

    /// Field parsers for a form body schema.
    ///
    /// Array properties take every repeated value of their field unless
    /// `explode` maps the property to `false`, in which case the first
    /// value is split on commas. Object properties are JSON text; scalar
    /// properties take the first value.
    pub fn form_body_parsers(
        &self,
        schema: &Value,
        explode: &HashMap<String, bool>,
    ) -> Result<ParserRegistry<ListValueParser>, ParserConfigError> {
        let resolved = self.repository.resolve(schema)?;
        self.registry(resolved, |property, field_schema| {
            let field_schema = self.repository.resolve(field_schema)?;
            Ok(match SchemaType::of(field_schema) {
                SchemaType::Array if explode.get(property).copied().unwrap_or(true) => {
                    ListValueParser::Exploded(self.items(field_schema)?)
                }
                SchemaType::Array => ListValueParser::Single(StringValueParser::Array(
                    SplitterArrayParser::new(",", self.items(field_schema)?),
                )),
                _ => ListValueParser::Single(self.primitive(field_schema)?.into()),
            })
        })
    }
}
