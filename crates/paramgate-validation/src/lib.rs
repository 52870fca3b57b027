//! # paramgate-validation — Request Validation
//!
//! Turns a [`RawRequest`](paramgate_core::RawRequest) into validated
//! [`RequestParameters`](paramgate_core::RequestParameters), or into the
//! first failure with enough context to say which field was wrong and why.
//!
//! ## Components
//!
//! - **Parameter processor** (`parameter`): parse, default substitution
//!   and validation for one declared parameter.
//! - **Body processors** (`body`): form, JSON and plain-text strategies
//!   selected by `Content-Type` substring match.
//! - **Validation handler** (`handler`): runs every processor of a route
//!   and short-circuits on the first failure.
//! - **Route configuration** (`config`): OpenAPI-shaped YAML/JSON route
//!   descriptions compiled into handlers.
//!
//! Everything here is built once at route registration and is immutable
//! afterwards; `validate` takes `&self` and can be called concurrently.

pub mod body;
pub mod config;
pub mod error;
pub mod handler;
pub mod parameter;

pub use body::{
    media_type, BodyProcessor, FormBodyProcessor, JsonBodyProcessor, TextPlainBodyProcessor,
    APPLICATION_JSON, FORM_URLENCODED, MULTIPART_FORM_DATA, TEXT_PLAIN,
};
pub use config::{EncodingSpec, MediaTypeSpec, ParameterSpec, RequestBodySpec, RouteValidationSpec};
pub use error::{
    BodyProcessorError, BodyProcessorErrorKind, HandlerBuildError, ParameterProcessorError,
    ParameterProcessorErrorKind, ProcessingCause, RequestPredicateError, RequestValidationError,
};
pub use handler::{ValidationHandler, ValidationHandlerBuilder};
pub use parameter::ParameterProcessor;
