//! # Schema Engine Errors
//!
//! The two failure kinds surfaced by the schema engine. Processors wrap
//! them unchanged as the cause of their own errors.

use std::fmt;

use thiserror::Error;

/// The schema could not be compiled or resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid schema '{schema_name}': {reason}")]
pub struct SchemaDefinitionError {
    /// Schema filename, or `<inline>` for anonymous schemas.
    pub schema_name: String,
    /// What is wrong with the schema.
    pub reason: String,
}

impl SchemaDefinitionError {
    pub fn new(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }
}

/// One failed schema keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer into the value; empty for the value itself.
    pub instance_path: String,
    /// JSON Pointer to the failing keyword in the schema.
    pub schema_path: String,
    pub message: String,
}

impl Violation {
    pub fn new(
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            schema_path: schema_path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = if self.instance_path.is_empty() { "/" } else { &self.instance_path };
        write!(f, "{at}: {} ({})", self.message, self.schema_path)
    }
}

/// The instance does not conform to its schema. Holds every failed
/// keyword, in the order the engine reported them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    violations: Vec<Violation>,
}

impl SchemaViolation {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// A violation with a single entry.
    pub fn single(
        instance_path: impl Into<String>,
        schema_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(vec![Violation::new(instance_path, schema_path, message)])
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "value does not conform to schema")?;
        for v in &self.violations {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}

/// Either kind of failure reported by the schema engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaEngineError {
    /// The schema is broken. Server configuration fault.
    #[error(transparent)]
    Definition(#[from] SchemaDefinitionError),

    /// The value violates the schema. Client request fault.
    #[error(transparent)]
    Validation(#[from] SchemaViolation),
}

impl SchemaEngineError {
    pub fn is_definition(&self) -> bool {
        matches!(self, Self::Definition(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
