//! Integration test: schemas loaded from a directory of JSON and YAML files
//! resolve each other's `$ref`s and back value validators.

use std::fs;

use paramgate_schema::{SchemaEngineError, SchemaLoadError, SchemaRepository, SchemaValueValidator, ValueValidator};
use serde_json::json;

fn write_fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("pet.schema.json"),
        r#"{
            "type": "object",
            "properties": {
                "name": {"type": "string", "minLength": 1},
                "kind": {"$ref": "kind.schema.yaml"}
            },
            "required": ["name"],
            "additionalProperties": false
        }"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("kind.schema.yaml"),
        "type: string\nenum: [cat, dog]\ndefault: dog\n",
    )
    .unwrap();
    fs::write(dir.path().join("README.md"), "not a schema").unwrap();
    dir
}

#[test]
fn test_load_json_and_yaml_schemas() {
    let dir = write_fixture_dir();
    let repo = SchemaRepository::from_dir(dir.path()).unwrap();
    assert_eq!(repo.schema_names(), vec!["kind.schema.yaml", "pet.schema.json"]);
    assert_eq!(repo.schema_dir(), Some(dir.path()));
}

#[test]
fn test_cross_format_reference_validates() {
    let dir = write_fixture_dir();
    let repo = SchemaRepository::from_dir(dir.path()).unwrap();
    let validator = SchemaValueValidator::named(&repo, "pet.schema.json").unwrap();

    assert!(validator.validate(json!({"name": "rex", "kind": "dog"})).is_ok());

    let err = validator
        .validate(json!({"name": "rex", "kind": "parrot"}))
        .unwrap_err();
    assert!(matches!(err, SchemaEngineError::Validation(_)));

    let err = validator
        .validate(json!({"name": "rex", "extra": 1}))
        .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_yaml_default_exposed() {
    let dir = write_fixture_dir();
    let repo = SchemaRepository::from_dir(dir.path()).unwrap();
    let validator = SchemaValueValidator::new(&repo, json!({"$ref": "kind.schema.yaml"})).unwrap();
    assert_eq!(validator.default_value(), Some(json!("dog")));
}

#[test]
fn test_invalid_json_schema_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.schema.json"), "{ not json").unwrap();
    let err = SchemaRepository::from_dir(dir.path()).unwrap_err();
    assert!(
        matches!(err, SchemaLoadError::Parse { ref schema_name, .. } if schema_name == "broken.schema.json"),
        "Expected Parse error, got: {err}"
    );
}

#[test]
fn test_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchemaRepository::from_dir(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, SchemaLoadError::Directory { .. }));
}
