//! # paramgate-schema — Schema Engine Wrapper
//!
//! paramgate does not implement JSON Schema semantics. It orchestrates
//! calls into the `jsonschema` crate and translates what comes back into
//! two error kinds that must never be conflated:
//!
//! - [`SchemaDefinitionError`]: the schema itself is broken (unresolvable
//!   `$ref`, invalid keyword value). A server configuration fault.
//! - [`SchemaViolation`]: the instance does not conform. A client fault.
//!
//! ## Schema Repository (`repository`)
//!
//! [`SchemaRepository`] holds named schemas (loaded from a directory of
//! `*.schema.json` / `*.schema.yaml` files or inserted programmatically)
//! and compiles validators with a local retriever, so cross-schema `$ref`s
//! never trigger network requests.
//!
//! ## Value Validators (`validator`)
//!
//! [`ValueValidator`] is the seam used by parameter and body processors:
//! validate a parsed value, or hand out the schema's `default`.
//! [`SchemaValueValidator`] is the `jsonschema`-backed implementation,
//! compiled once at route registration and shared read-only afterwards.

pub mod error;
pub mod repository;
pub mod validator;

pub use error::{SchemaDefinitionError, SchemaEngineError, SchemaViolation, Violation};
pub use repository::{SchemaLoadError, SchemaRepository};
pub use validator::{SchemaValueValidator, ValueValidator};
