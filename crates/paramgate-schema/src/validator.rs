//! # Value Validators
//!
//! The seam between processors and the schema engine. A processor hands a
//! parsed value to its [`ValueValidator`] and gets back either a
//! [`RequestParameter`] or a [`SchemaEngineError`], which it wraps exactly
//! once with location and name context.

use std::fmt;

use jsonschema::Validator;
use paramgate_core::RequestParameter;
use serde_json::Value;

use crate::error::{SchemaDefinitionError, SchemaEngineError, SchemaViolation, Violation};
use crate::repository::{SchemaRepository, INLINE_SCHEMA_NAME};

/// Validates parsed values against one schema.
///
/// Implementations are built once at route registration and must be safe
/// for unsynchronized concurrent use.
pub trait ValueValidator: Send + Sync {
    /// Validate `value`, producing the typed parameter on success.
    fn validate(&self, value: Value) -> Result<RequestParameter, SchemaEngineError>;

    /// The value to validate in place of an absent optional parameter.
    fn default_value(&self) -> Option<Value>;
}

/// [`ValueValidator`] backed by a compiled `jsonschema` validator.
pub struct SchemaValueValidator {
    schema_name: String,
    schema: Value,
    compiled: Validator,
    default: Option<Value>,
}

impl SchemaValueValidator {
    /// Compile an inline schema against `repository`.
    ///
    /// The default value is taken from the schema's `default` keyword,
    /// following a top-level cross-schema `$ref` if the schema is one.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if the schema does not compile.
    pub fn new(repository: &SchemaRepository, schema: Value) -> Result<Self, SchemaDefinitionError> {
        Self::with_name(repository, INLINE_SCHEMA_NAME, schema)
    }

    /// Compile a schema registered in `repository` under `schema_name`.
    pub fn named(repository: &SchemaRepository, schema_name: &str) -> Result<Self, SchemaDefinitionError> {
        let schema = repository.get_schema(schema_name).cloned().ok_or_else(|| {
            SchemaDefinitionError::new(schema_name, "schema not found in repository")
        })?;
        Self::with_name(repository, schema_name, schema)
    }

    fn with_name(
        repository: &SchemaRepository,
        schema_name: &str,
        schema: Value,
    ) -> Result<Self, SchemaDefinitionError> {
        let compiled = repository.compile(schema_name, &schema)?;
        let default = repository.resolve(&schema)?.get("default").cloned();
        Ok(Self {
            schema_name: schema_name.to_string(),
            schema,
            compiled,
            default,
        })
    }

    /// The schema name used in errors.
    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    /// The schema as declared.
    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

impl fmt::Debug for SchemaValueValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValueValidator")
            .field("schema_name", &self.schema_name)
            .field("schema", &self.schema)
            .field("default", &self.default)
            .finish()
    }
}

impl ValueValidator for SchemaValueValidator {
    fn validate(&self, value: Value) -> Result<RequestParameter, SchemaEngineError> {
        let violations: Vec<Violation> = self
            .compiled
            .iter_errors(&value)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(RequestParameter::new(value))
        } else {
            Err(SchemaViolation::new(violations).into())
        }
    }

    fn default_value(&self) -> Option<Value> {
        self.default.clone()
    }
}
