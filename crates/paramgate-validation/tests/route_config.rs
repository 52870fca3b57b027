//! Integration test: a route described in YAML, with schemas shared
//! through the repository, validating complete requests.

use paramgate_core::RawRequest;
use paramgate_schema::SchemaRepository;
use paramgate_validation::{ParameterProcessorErrorKind, RequestValidationError, RouteValidationSpec};
use serde_json::json;

const PETS_ROUTE: &str = r#"
parameters:
  - name: petId
    in: path
    schema: { $ref: "pet-id.schema.json" }
  - name: color
    in: query
    style: deepObject
    schema:
      type: object
      properties:
        R: { type: integer, minimum: 0, maximum: 255 }
        G: { type: integer, minimum: 0, maximum: 255 }
  - name: X-Request-Id
    in: header
    required: true
    schema: { type: string, minLength: 4 }
  - name: session
    in: cookie
    schema: { type: string }
requestBody:
  content:
    application/json:
      schema: { $ref: "pet.schema.json" }
    application/x-www-form-urlencoded:
      schema: { $ref: "pet.schema.json" }
"#;

fn repository() -> SchemaRepository {
    SchemaRepository::new()
        .with_schema("pet-id.schema.json", json!({"type": "integer", "minimum": 1}))
        .with_schema(
            "pet.schema.json",
            json!({
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": {"type": "string"},
                    "age": {"type": "integer"},
                    "tags": {"type": "array", "items": {"type": "string"}}
                },
                "additionalProperties": false
            }),
        )
}

fn base_request() -> RawRequest {
    RawRequest::new()
        .with_path_param("petId", "12")
        .with_header("X-Request-Id", "abcd-1")
}

#[test]
fn test_full_request() {
    let handler = RouteValidationSpec::from_yaml_str(PETS_ROUTE)
        .unwrap()
        .build(&repository())
        .unwrap();
    let req = base_request()
        .with_query_string("color[R]=10&color[G]=20")
        .with_cookie_header("session=s1")
        .with_header("Content-Type", "application/json; charset=utf-8")
        .with_body(r#"{"name":"rex","age":3}"#);

    let params = handler.validate(&req).unwrap();
    assert_eq!(params.path_parameter("petId").unwrap().as_i64(), Some(12));
    assert_eq!(params.query_parameter("color").unwrap().value(), &json!({"R": 10, "G": 20}));
    assert_eq!(params.header_parameter("x-request-id").unwrap().as_str(), Some("abcd-1"));
    assert_eq!(params.cookie_parameter("session").unwrap().as_str(), Some("s1"));
    assert_eq!(params.body().unwrap().value(), &json!({"name": "rex", "age": 3}));
}

#[test]
fn test_form_body_uses_inferred_parsers() {
    let handler = RouteValidationSpec::from_yaml_str(PETS_ROUTE)
        .unwrap()
        .build(&repository())
        .unwrap();
    let req = base_request()
        .with_header("Content-Type", "application/x-www-form-urlencoded")
        .with_body("name=rex&age=3&tags=a&tags=b");
    let params = handler.validate(&req).unwrap();
    assert_eq!(
        params.body().unwrap().value(),
        &json!({"name": "rex", "age": 3, "tags": ["a", "b"]})
    );
}

#[test]
fn test_missing_path_parameter() {
    let handler = RouteValidationSpec::from_yaml_str(PETS_ROUTE)
        .unwrap()
        .build(&repository())
        .unwrap();
    let req = RawRequest::new().with_header("X-Request-Id", "abcd-1");
    match handler.validate(&req).unwrap_err() {
        RequestValidationError::Parameter(e) => {
            assert_eq!(e.kind(), ParameterProcessorErrorKind::MissingParameterWhenRequired);
            assert_eq!(e.parameter_name(), "petId");
        }
        other => panic!("expected a parameter error, got: {other}"),
    }
}

#[test]
fn test_referenced_schema_rejects() {
    let handler = RouteValidationSpec::from_yaml_str(PETS_ROUTE)
        .unwrap()
        .build(&repository())
        .unwrap();
    let req = RawRequest::new()
        .with_path_param("petId", "0")
        .with_header("X-Request-Id", "abcd-1");
    let err = handler.validate(&req).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(!err.is_server_fault());
}

#[test]
fn test_deep_object_out_of_range() {
    let handler = RouteValidationSpec::from_yaml_str(PETS_ROUTE)
        .unwrap()
        .build(&repository())
        .unwrap();
    let req = base_request().with_query_string("color[R]=300");
    let RequestValidationError::Parameter(e) = handler.validate(&req).unwrap_err() else {
        panic!("expected a parameter error");
    };
    assert_eq!(e.parameter_name(), "color");
    assert_eq!(e.kind(), ParameterProcessorErrorKind::ValidationError);
}

#[test]
fn test_body_rejected_by_additional_properties() {
    let handler = RouteValidationSpec::from_yaml_str(PETS_ROUTE)
        .unwrap()
        .build(&repository())
        .unwrap();
    let req = base_request()
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"name":"rex","owner":"me"}"#);
    let err = handler.validate(&req).unwrap_err();
    assert!(matches!(err, RequestValidationError::Body(_)));
}

#[test]
fn test_missing_schema_reference_fails_build() {
    let result = RouteValidationSpec::from_yaml_str(PETS_ROUTE)
        .unwrap()
        .build(&SchemaRepository::new());
    assert!(result.is_err());
}
