//! Integration test: form bodies through the handler, including the
//! empty-value-list nullation policy and the raw fallback for unknown
//! fields.

use paramgate_core::{ParamMap, RawRequest};
use paramgate_parse::{ListValueParser, ParserRegistry, PrimitiveParser};
use paramgate_schema::{SchemaRepository, SchemaValueValidator};
use paramgate_validation::{
    BodyProcessorErrorKind, FormBodyProcessor, RequestValidationError, ValidationHandler,
    FORM_URLENCODED, MULTIPART_FORM_DATA,
};
use proptest::prelude::*;
use serde_json::{json, Value};

fn handler(schema: Value, parsers: ParserRegistry<ListValueParser>) -> ValidationHandler {
    let validator = SchemaValueValidator::new(&SchemaRepository::new(), schema).unwrap();
    ValidationHandler::builder()
        .body_processor(FormBodyProcessor::new(FORM_URLENCODED, parsers, validator))
        .build()
        .unwrap()
}

fn form_request(form: ParamMap) -> RawRequest {
    RawRequest::new()
        .with_header("Content-Type", FORM_URLENCODED)
        .with_form(form)
}

#[test]
fn test_empty_value_list_is_nullated() {
    // Single fails on an empty value list; nullation must bypass it.
    let parsers = ParserRegistry::new().with_property("age", ListValueParser::Single(PrimitiveParser::Integer.into()));
    let h = handler(json!({"type": "object"}), parsers);

    let mut form = ParamMap::new();
    form.insert_all("age", Vec::new());
    let params = h.validate(&form_request(form)).unwrap();
    assert_eq!(params.body().unwrap().value(), &json!({"age": null}));
}

#[test]
fn test_nullated_field_is_validated_by_the_schema() {
    let parsers = ParserRegistry::new().with_property("age", ListValueParser::Single(PrimitiveParser::Integer.into()));
    let h = handler(
        json!({"type": "object", "properties": {"age": {"type": "integer"}}}),
        parsers,
    );
    let mut form = ParamMap::new();
    form.insert_all("age", Vec::new());
    let err = h.validate(&form_request(form)).unwrap_err();
    match err {
        RequestValidationError::Body(e) => assert_eq!(e.kind(), BodyProcessorErrorKind::ValidationError),
        other => panic!("expected a body error, got: {other}"),
    }
}

#[test]
fn test_single_schema_covers_all_fields() {
    let h = handler(
        json!({
            "type": "object",
            "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}}
        }),
        ParserRegistry::new(),
    );
    // Unknown fields become raw string arrays, so both properties fail.
    let mut form = ParamMap::new();
    form.append("a", "1");
    form.append("b", "2");
    let err = h.validate(&form_request(form)).unwrap_err();
    let RequestValidationError::Body(body) = err else {
        panic!("expected a body error");
    };
    let violations = body
        .cause()
        .and_then(|c| c.as_schema())
        .and_then(|e| match e {
            paramgate_schema::SchemaEngineError::Validation(v) => Some(v.violations().len()),
            _ => None,
        })
        .unwrap();
    assert_eq!(violations, 2);
}

#[test]
fn test_pattern_property_parsers() {
    let parsers = ParserRegistry::new()
        .with_pattern_property("^n_", ListValueParser::Single(PrimitiveParser::Number.into()))
        .unwrap();
    let h = handler(json!({"type": "object"}), parsers);
    let mut form = ParamMap::new();
    form.append("n_ratio", "0.25");
    form.append("other", "0.25");
    let params = h.validate(&form_request(form)).unwrap();
    assert_eq!(
        params.body().unwrap().value(),
        &json!({"n_ratio": 0.25, "other": ["0.25"]})
    );
}

#[test]
fn test_declared_additional_properties_parser() {
    let parsers = ParserRegistry::new()
        .with_additional_properties(ListValueParser::Single(PrimitiveParser::Boolean.into()));
    let h = handler(json!({"type": "object"}), parsers);
    let mut form = ParamMap::new();
    form.append("enabled", "true");
    let params = h.validate(&form_request(form)).unwrap();
    assert_eq!(params.body().unwrap().value(), &json!({"enabled": true}));
}

#[test]
fn test_multipart_uses_transport_decoded_fields() {
    let validator = SchemaValueValidator::new(&SchemaRepository::new(), json!({"type": "object"})).unwrap();
    let h = ValidationHandler::builder()
        .body_processor(FormBodyProcessor::new(MULTIPART_FORM_DATA, ParserRegistry::new(), validator))
        .build()
        .unwrap();
    let req = RawRequest::new()
        .with_header("Content-Type", "multipart/form-data; boundary=----x")
        .with_form_field("name", "rex");
    let params = h.validate(&req).unwrap();
    assert_eq!(params.body().unwrap().value(), &json!({"name": ["rex"]}));
}

proptest! {
    /// Unknown fields keep every raw value, in order.
    #[test]
    fn unknown_fields_keep_raw_values(values in prop::collection::vec("[ -~]{0,8}", 1..5)) {
        let h = handler(json!({"type": "object"}), ParserRegistry::new());
        let mut form = ParamMap::new();
        for v in &values {
            form.append("field", v.as_str());
        }
        let params = h.validate(&form_request(form)).unwrap();
        prop_assert_eq!(params.body().unwrap().value(), &json!({"field": values}));
    }
}
