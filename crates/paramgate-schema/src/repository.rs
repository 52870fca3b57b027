//! # Schema Repository
//!
//! Named JSON Schemas (Draft 2020-12) available to a set of routes, and the
//! single place where they are compiled into `jsonschema` validators.
//!
//! ## Schema Resolution
//!
//! Schemas are indexed by filename (e.g. `pet.schema.json`) and, when they
//! declare one, by their `$id`. Cross-schema `$ref`s such as
//! `{"$ref": "pet.schema.json"}` are resolved by a local retriever against
//! this index: the last path segment of the referenced URI is looked up
//! by filename. A reference that resolves to nothing is a
//! [`SchemaDefinitionError`], never a permissive fallback.
//!
//! Internal `$ref`s of the form `#/$defs/<name>` are resolved by the
//! jsonschema crate natively.
//!
//! ## Thread Safety
//!
//! The repository is read-only once built. Compiled validators are
//! `Send + Sync` and are shared across concurrently handled requests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;
use thiserror::Error;

use crate::error::SchemaDefinitionError;

/// Name used in errors for schemas declared inline rather than by file.
pub const INLINE_SCHEMA_NAME: &str = "<inline>";

/// Maximum number of `$ref` hops followed by [`SchemaRepository::resolve`].
const MAX_REF_DEPTH: usize = 16;

/// Local retriever that resolves `$ref` URIs to schemas held in memory.
///
/// Prevents the jsonschema crate from making network requests for
/// cross-schema references.
struct LocalSchemaRetriever {
    /// Map from URI string or bare filename to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Err(format!("schema '{uri_str}' is not registered in the repository").into())
    }
}

/// Error while loading schema documents into a repository.
#[derive(Error, Debug)]
pub enum SchemaLoadError {
    /// The schema directory could not be listed.
    #[error("cannot read schema directory '{path}': {reason}")]
    Directory {
        /// Directory that was requested.
        path: String,
        /// Underlying failure.
        reason: String,
    },

    /// A schema file is not valid JSON or YAML.
    #[error("schema load error for '{schema_name}': {reason}")]
    Parse {
        /// Schema filename.
        schema_name: String,
        /// Reason the schema could not be parsed.
        reason: String,
    },

    /// IO error reading a schema file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Named schemas plus the compilation entry point.
#[derive(Debug, Clone, Default)]
pub struct SchemaRepository {
    /// Directory the schemas were loaded from, if any.
    schema_dir: Option<PathBuf>,
    /// Map from schema filename to parsed JSON value.
    schemas: HashMap<String, Value>,
}

impl SchemaRepository {
    /// An empty repository. Inline schemas without cross-schema `$ref`s
    /// compile against it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.schema.json`, `*.schema.yaml` and `*.schema.yml` file
    /// in `schema_dir`, indexed by filename.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError::Directory` when the directory cannot be
    /// listed and `SchemaLoadError::Parse` when a file is not valid JSON
    /// or YAML.
    pub fn from_dir(schema_dir: impl AsRef<Path>) -> Result<Self, SchemaLoadError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let mut schemas = HashMap::new();

        let entries = std::fs::read_dir(&schema_dir).map_err(|e| SchemaLoadError::Directory {
            path: schema_dir.display().to_string(),
            reason: e.to_string(),
        })?;

        for entry in entries {
            let path = entry?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let value: Value = if name.ends_with(".schema.json") {
                let content = std::fs::read_to_string(&path)?;
                serde_json::from_str(&content).map_err(|e| SchemaLoadError::Parse {
                    schema_name: name.to_string(),
                    reason: format!("invalid JSON: {e}"),
                })?
            } else if name.ends_with(".schema.yaml") || name.ends_with(".schema.yml") {
                let content = std::fs::read_to_string(&path)?;
                serde_yaml::from_str(&content).map_err(|e| SchemaLoadError::Parse {
                    schema_name: name.to_string(),
                    reason: format!("invalid YAML: {e}"),
                })?
            } else {
                continue;
            };
            schemas.insert(name.to_string(), value);
        }

        tracing::info!(
            schema_dir = %schema_dir.display(),
            count = schemas.len(),
            "loaded schemas"
        );

        Ok(Self {
            schema_dir: Some(schema_dir),
            schemas,
        })
    }

    /// Register a schema under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, schema: Value) {
        self.schemas.insert(name.into(), schema);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_schema(mut self, name: impl Into<String>, schema: Value) -> Self {
        self.insert(name, schema);
        self
    }

    /// The directory the schemas were loaded from.
    pub fn schema_dir(&self) -> Option<&Path> {
        self.schema_dir.as_deref()
    }

    /// Returns the number of registered schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all registered schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Look up a registered schema by filename.
    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Build `ValidationOptions` with a retriever over every registered
    /// schema, indexed by filename and by `$id`.
    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);

        let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
        for (filename, value) in &self.schemas {
            if let Some(id_str) = value.get("$id").and_then(|v| v.as_str()) {
                schemas_by_uri.insert(id_str.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename.clone(), value.clone());
        }

        opts.with_retriever(LocalSchemaRetriever { schemas_by_uri });
        opts
    }

    /// Compile `schema` into a validator, resolving cross-schema `$ref`s
    /// against this repository.
    ///
    /// # Errors
    ///
    /// Returns `SchemaDefinitionError` if the schema is invalid or
    /// references an unregistered schema.
    pub fn compile(
        &self,
        schema_name: &str,
        schema: &Value,
    ) -> Result<Validator, SchemaDefinitionError> {
        self.build_options()
            .build(schema)
            .map_err(|e| SchemaDefinitionError::new(schema_name, e.to_string()))
    }

    /// Compile a registered schema by filename.
    pub fn compile_named(&self, schema_name: &str) -> Result<Validator, SchemaDefinitionError> {
        let schema = self.schemas.get(schema_name).ok_or_else(|| {
            SchemaDefinitionError::new(schema_name, "schema not found in repository")
        })?;
        self.compile(schema_name, schema)
    }

    /// Follow top-level cross-schema `$ref`s (`pet.schema.json`,
    /// `pet.schema.json#/$defs/tag`) until a schema without one is
    /// reached. Fragment-only references (`#/...`) are returned unchanged
    /// since they are relative to a document this method does not know.
    ///
    /// Parser inference uses this to see the `type` and `properties` of a
    /// parameter declared as a bare reference.
    pub fn resolve<'a>(&'a self, schema: &'a Value) -> Result<&'a Value, SchemaDefinitionError> {
        let mut current = schema;
        for _ in 0..MAX_REF_DEPTH {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                return Ok(current);
            };
            if reference.starts_with('#') {
                return Ok(current);
            }
            let (document, fragment) = match reference.split_once('#') {
                Some((document, fragment)) => (document, Some(fragment)),
                None => (reference, None),
            };
            let filename = document.rsplit('/').next().unwrap_or(document);
            let target = self
                .schemas
                .get(filename)
                .or_else(|| {
                    self.schemas
                        .values()
                        .find(|s| s.get("$id").and_then(Value::as_str) == Some(document))
                })
                .ok_or_else(|| {
                    SchemaDefinitionError::new(
                        filename,
                        format!("unresolvable reference '{reference}'"),
                    )
                })?;
            current = match fragment {
                Some(pointer) if !pointer.is_empty() => target.pointer(pointer).ok_or_else(|| {
                    SchemaDefinitionError::new(
                        filename,
                        format!("reference '{reference}' points at nothing"),
                    )
                })?,
                _ => target,
            };
        }
        Err(SchemaDefinitionError::new(
            INLINE_SCHEMA_NAME,
            format!("more than {MAX_REF_DEPTH} nested references"),
        ))
    }
}
