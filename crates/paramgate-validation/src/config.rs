//! # Route Configuration
//!
//! An OpenAPI-shaped description of one route's parameters and request
//! body, loaded from YAML or JSON and turned into a [`ValidationHandler`]:
//!
//! ```yaml
//! parameters:
//!   - name: limit
//!     in: query
//!     schema: { type: integer, maximum: 100, default: 20 }
//!   - name: id
//!     in: path
//!     style: label
//!     schema: { $ref: "pet-id.schema.json" }
//! requestBody:
//!   required: true
//!   content:
//!     application/json:
//!       schema: { $ref: "pet.schema.json" }
//! ```
//!
//! `style` and `explode` default per location (query and cookie: form,
//! exploded; path and header: simple, not exploded). Path parameters are
//! always required.

use std::collections::HashMap;

use indexmap::IndexMap;
use paramgate_core::{ParameterLocation, ParameterStyle};
use paramgate_parse::ParserInference;
use paramgate_schema::{SchemaRepository, SchemaValueValidator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::body::{
    FormBodyProcessor, JsonBodyProcessor, TextPlainBodyProcessor, APPLICATION_JSON, FORM_URLENCODED,
    MULTIPART_FORM_DATA, TEXT_PLAIN,
};
use crate::error::HandlerBuildError;
use crate::handler::ValidationHandler;
use crate::parameter::ParameterProcessor;

/// Validation rules of one route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteValidationSpec {
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodySpec>,
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ParameterStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(default = "any_schema")]
    pub schema: Value,
}

impl ParameterSpec {
    pub fn style(&self) -> ParameterStyle {
        self.style
            .unwrap_or_else(|| ParameterStyle::default_for(self.location))
    }

    pub fn explode(&self) -> bool {
        self.explode.unwrap_or_else(|| self.style().default_explode())
    }

    pub fn is_required(&self) -> bool {
        self.required || self.location == ParameterLocation::Path
    }
}

/// The request body, one schema per media type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBodySpec {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaTypeSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTypeSpec {
    #[serde(default = "any_schema")]
    pub schema: Value,
    /// Per-property serialization of form bodies.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub encoding: IndexMap<String, EncodingSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodingSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
}

fn any_schema() -> Value {
    Value::Object(Default::default())
}

impl RouteValidationSpec {
    /// # Errors
    ///
    /// [`HandlerBuildError::Yaml`] for a malformed document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, HandlerBuildError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// # Errors
    ///
    /// [`HandlerBuildError::Json`] for a malformed document.
    pub fn from_json_str(json: &str) -> Result<Self, HandlerBuildError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Infer parsers, compile schemas and assemble the handler.
    ///
    /// # Errors
    ///
    /// The first parameter or media type that cannot be built.
    pub fn build(&self, repository: &SchemaRepository) -> Result<ValidationHandler, HandlerBuildError> {
        let inference = ParserInference::new(repository);
        let mut builder = ValidationHandler::builder();

        for spec in &self.parameters {
            let parser = inference
                .parameter_parser(&spec.name, spec.location, spec.style(), spec.explode(), &spec.schema)
                .map_err(|source| HandlerBuildError::Parser {
                    name: spec.name.clone(),
                    source,
                })?;
            let validator = compile(repository, &spec.name, &spec.schema)?;
            builder = builder.parameter(ParameterProcessor::boxed(
                spec.name.clone(),
                spec.location,
                spec.is_required(),
                parser,
                Box::new(validator),
            ));
        }

        if let Some(body) = &self.request_body {
            for (media_type, content) in &body.content {
                let validator = compile(repository, media_type, &content.schema)?;
                builder = match media_type.as_str() {
                    FORM_URLENCODED | MULTIPART_FORM_DATA => {
                        let explode: HashMap<String, bool> = content
                            .encoding
                            .iter()
                            .filter_map(|(k, e)| e.explode.map(|x| (k.clone(), x)))
                            .collect();
                        let parsers = inference
                            .form_body_parsers(&content.schema, &explode)
                            .map_err(|source| HandlerBuildError::Parser {
                                name: media_type.clone(),
                                source,
                            })?;
                        builder.body_processor(FormBodyProcessor::new(media_type.clone(), parsers, validator))
                    }
                    APPLICATION_JSON => builder.body_processor(JsonBodyProcessor::new(validator)),
                    TEXT_PLAIN => builder.body_processor(TextPlainBodyProcessor::new(validator)),
                    other => return Err(HandlerBuildError::UnsupportedMediaType(other.to_string())),
                };
            }
            builder = builder.body_required(body.required);
        }

        builder.build()
    }
}

fn compile(
    repository: &SchemaRepository,
    name: &str,
    schema: &Value,
) -> Result<SchemaValueValidator, HandlerBuildError> {
    SchemaValueValidator::new(repository, schema.clone()).map_err(|source| HandlerBuildError::Schema {
        name: name.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramgate_core::RawRequest;
    use serde_json::json;

    const ROUTE: &str = r#"
parameters:
  - name: limit
    in: query
    schema: { type: integer, maximum: 100, default: 20 }
  - name: id
    in: path
    style: label
    schema: { type: integer }
  - name: tags
    in: query
    explode: false
    schema: { type: array, items: { type: string } }
requestBody:
  required: true
  content:
    application/json:
      schema:
        type: object
        required: [name]
"#;

    #[test]
    fn test_parse_yaml() {
        let spec = RouteValidationSpec::from_yaml_str(ROUTE).unwrap();
        assert_eq!(spec.parameters.len(), 3);
        let id = &spec.parameters[1];
        assert_eq!(id.location, ParameterLocation::Path);
        assert_eq!(id.style(), ParameterStyle::Label);
        assert!(id.is_required());
        assert!(!spec.parameters[0].is_required());
        assert!(spec.parameters[0].explode());
        assert!(!spec.parameters[2].explode());
        assert!(spec.request_body.as_ref().unwrap().required);
    }

    #[test]
    fn test_build_and_validate() {
        let handler = RouteValidationSpec::from_yaml_str(ROUTE)
            .unwrap()
            .build(&SchemaRepository::new())
            .unwrap();
        let req = RawRequest::new()
            .with_query_string("tags=a,b")
            .with_path_param("id", ".7")
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"name":"rex"}"#);
        let params = handler.validate(&req).unwrap();
        assert_eq!(params.query_parameter("limit").unwrap().as_i64(), Some(20));
        assert_eq!(params.query_parameter("tags").unwrap().value(), &json!(["a", "b"]));
        assert_eq!(params.path_parameter("id").unwrap().as_i64(), Some(7));
        assert!(params.body().is_some());
    }

    #[test]
    fn test_from_json() {
        let spec = RouteValidationSpec::from_json_str(
            r#"{"parameters": [{"name": "q", "in": "query", "required": true}]}"#,
        )
        .unwrap();
        assert_eq!(spec.parameters[0].schema, json!({}));
        assert!(spec.request_body.is_none());
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            RouteValidationSpec::from_yaml_str("parameters: 3"),
            Err(HandlerBuildError::Yaml(_))
        ));
        assert!(matches!(
            RouteValidationSpec::from_json_str("{"),
            Err(HandlerBuildError::Json(_))
        ));
    }

    #[test]
    fn test_style_location_mismatch_fails_build() {
        let spec = RouteValidationSpec::from_yaml_str(
            "parameters:\n  - name: x\n    in: header\n    style: form\n    schema: { type: string }\n",
        )
        .unwrap();
        let err = spec.build(&SchemaRepository::new()).unwrap_err();
        assert!(matches!(err, HandlerBuildError::Parser { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_unresolvable_schema_fails_build() {
        let spec = RouteValidationSpec::from_json_str(
            r#"{"parameters": [{"name": "p", "in": "query", "schema": {"$ref": "missing.schema.json"}}]}"#,
        )
        .unwrap();
        assert!(spec.build(&SchemaRepository::new()).is_err());
    }

    #[test]
    fn test_unsupported_media_type() {
        let spec = RouteValidationSpec::from_yaml_str(
            "requestBody:\n  content:\n    application/xml:\n      schema: {}\n",
        )
        .unwrap();
        assert!(matches!(
            spec.build(&SchemaRepository::new()),
            Err(HandlerBuildError::UnsupportedMediaType(m)) if m == "application/xml"
        ));
    }

    #[test]
    fn test_form_encoding_explode() {
        let spec = RouteValidationSpec::from_yaml_str(
            r#"
requestBody:
  content:
    application/x-www-form-urlencoded:
      schema:
        type: object
        properties:
          ids: { type: array, items: { type: integer } }
      encoding:
        ids: { explode: false }
"#,
        )
        .unwrap();
        let handler = spec.build(&SchemaRepository::new()).unwrap();
        let req = RawRequest::new()
            .with_header("Content-Type", FORM_URLENCODED)
            .with_form_field("ids", "1,2,3");
        let params = handler.validate(&req).unwrap();
        assert_eq!(params.body().unwrap().value(), &json!({"ids": [1, 2, 3]}));
    }
}
