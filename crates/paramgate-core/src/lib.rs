//! # paramgate-core — Foundational Types for Request Validation
//!
//! The leaf of the paramgate dependency graph. Every other crate in the
//! workspace depends on `paramgate-core`; it depends on nothing internal.
//!
//! ## Key Types
//!
//! 1. **`RequestParameter`.** An immutable, typed JSON value produced by a
//!    validator once a parameter or body has passed its schema.
//!
//! 2. **`RequestParameters`.** The per-request bag of validated values,
//!    keyed by parameter name within each [`ParameterLocation`], plus the
//!    optional body.
//!
//! 3. **`ParamMap` / `RawRequest`.** The string-typed wire data handed over
//!    by the HTTP layer: ordered multimaps for query, headers, path captures,
//!    cookies and decoded form fields, plus the raw body bytes.
//!
//! 4. **`ParameterStyle`.** The serialization conventions for composite
//!    values inside a single wire field (form, simple, label, matrix,
//!    spaceDelimited, pipeDelimited, deepObject).
//!
//! 5. **`MalformedValueError`.** The single failure mode of every value
//!    parser: raw content that cannot be converted under the declared style.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `paramgate-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod location;
pub mod parameter;
pub mod request;
pub mod style;

pub use error::MalformedValueError;
pub use location::ParameterLocation;
pub use parameter::{RequestParameter, RequestParameters};
pub use request::{percent_decode, ParamMap, RawRequest, CONTENT_TYPE};
pub use style::ParameterStyle;
