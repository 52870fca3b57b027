//! # Validation Error Taxonomy
//!
//! Every failure is wrapped exactly once at a processor boundary:
//!
//! - [`ParameterProcessorError`]: one declared parameter failed. Carries
//!   the kind, the location, the parameter name and the cause (absent only
//!   for a missing required parameter).
//! - [`BodyProcessorError`]: the body failed. Carries the content type
//!   that was observed (parsing) or negotiated (validation).
//! - [`RequestPredicateError`]: a request-level requirement was not met.
//!
//! [`RequestValidationError`] is what the handler returns. Its
//! [`is_server_fault`](RequestValidationError::is_server_fault) separates
//! "this route's schema is broken" from "this request is invalid".

use std::fmt;

use paramgate_core::{MalformedValueError, ParameterLocation};
use paramgate_parse::ParserConfigError;
use paramgate_schema::{SchemaDefinitionError, SchemaEngineError};
use thiserror::Error;

// ─── Causes ─────────────────────────────────────────────────────────

/// The underlying failure wrapped by a processor error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingCause {
    /// The raw content could not be parsed.
    #[error(transparent)]
    Malformed(#[from] MalformedValueError),

    /// The schema engine rejected the value or the schema.
    #[error(transparent)]
    Schema(#[from] SchemaEngineError),
}

impl ProcessingCause {
    pub fn as_malformed(&self) -> Option<&MalformedValueError> {
        match self {
            Self::Malformed(e) => Some(e),
            Self::Schema(_) => None,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaEngineError> {
        match self {
            Self::Schema(e) => Some(e),
            Self::Malformed(_) => None,
        }
    }

    /// A broken schema rather than a bad request.
    pub fn is_definition(&self) -> bool {
        matches!(self, Self::Schema(e) if e.is_definition())
    }
}

// ─── Parameter errors ───────────────────────────────────────────────

/// Why a parameter was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterProcessorErrorKind {
    MissingParameterWhenRequired,
    ParsingError,
    ValidationError,
}

impl ParameterProcessorErrorKind {
    /// Stable code used in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameterWhenRequired => "MISSING_PARAMETER_WHEN_REQUIRED_ERROR",
            Self::ParsingError => "PARSING_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
        }
    }
}

impl fmt::Display for ParameterProcessorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One declared parameter failed processing.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ParameterProcessorError {
    kind: ParameterProcessorErrorKind,
    location: ParameterLocation,
    parameter_name: String,
    #[source]
    cause: Option<ProcessingCause>,
}

impl ParameterProcessorError {
    /// A required parameter is absent from the request.
    pub fn missing(location: ParameterLocation, parameter_name: impl Into<String>) -> Self {
        Self {
            kind: ParameterProcessorErrorKind::MissingParameterWhenRequired,
            location,
            parameter_name: parameter_name.into(),
            cause: None,
        }
    }

    /// The raw value could not be parsed.
    pub fn parsing(
        location: ParameterLocation,
        parameter_name: impl Into<String>,
        cause: MalformedValueError,
    ) -> Self {
        Self {
            kind: ParameterProcessorErrorKind::ParsingError,
            location,
            parameter_name: parameter_name.into(),
            cause: Some(cause.into()),
        }
    }

    /// The validator rejected the parsed or default value.
    pub fn validation(
        location: ParameterLocation,
        parameter_name: impl Into<String>,
        cause: SchemaEngineError,
    ) -> Self {
        Self {
            kind: ParameterProcessorErrorKind::ValidationError,
            location,
            parameter_name: parameter_name.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn kind(&self) -> ParameterProcessorErrorKind {
        self.kind
    }

    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// `None` only for [`MissingParameterWhenRequired`](ParameterProcessorErrorKind::MissingParameterWhenRequired).
    pub fn cause(&self) -> Option<&ProcessingCause> {
        self.cause.as_ref()
    }

    /// Whether the parameter's schema is broken.
    pub fn is_server_fault(&self) -> bool {
        self.cause.as_ref().is_some_and(ProcessingCause::is_definition)
    }
}

impl fmt::Display for ParameterProcessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} for {} parameter '{}'",
            self.kind, self.location, self.parameter_name
        )?;
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

// ─── Body errors ────────────────────────────────────────────────────

/// Why the body was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyProcessorErrorKind {
    ParsingError,
    ValidationError,
    MissingMatchingBodyProcessor,
}

impl BodyProcessorErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ParsingError => "PARSING_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::MissingMatchingBodyProcessor => "MISSING_MATCHING_BODY_PROCESSOR",
        }
    }
}

impl fmt::Display for BodyProcessorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// The request body failed processing.
#[derive(Error, Debug, Clone, PartialEq)]
pub struct BodyProcessorError {
    kind: BodyProcessorErrorKind,
    content_type: Option<String>,
    #[source]
    cause: Option<ProcessingCause>,
}

impl BodyProcessorError {
    /// The body could not be parsed. `content_type` is the raw header.
    pub fn parsing(content_type: Option<&str>, cause: MalformedValueError) -> Self {
        Self {
            kind: BodyProcessorErrorKind::ParsingError,
            content_type: content_type.map(str::to_string),
            cause: Some(cause.into()),
        }
    }

    /// The parsed body was rejected. `media_type` is the negotiated type.
    pub fn validation(media_type: impl Into<String>, cause: SchemaEngineError) -> Self {
        Self {
            kind: BodyProcessorErrorKind::ValidationError,
            content_type: Some(media_type.into()),
            cause: Some(cause.into()),
        }
    }

    /// No configured processor accepts the request's content type.
    pub fn missing_matching_processor(content_type: Option<&str>) -> Self {
        Self {
            kind: BodyProcessorErrorKind::MissingMatchingBodyProcessor,
            content_type: content_type.map(str::to_string),
            cause: None,
        }
    }

    pub fn kind(&self) -> BodyProcessorErrorKind {
        self.kind
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn cause(&self) -> Option<&ProcessingCause> {
        self.cause.as_ref()
    }

    pub fn is_server_fault(&self) -> bool {
        self.cause.as_ref().is_some_and(ProcessingCause::is_definition)
    }
}

impl fmt::Display for BodyProcessorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body {}", self.kind)?;
        if let Some(content_type) = &self.content_type {
            write!(f, " for content type '{content_type}'")?;
        }
        if let Some(cause) = &self.cause {
            write!(f, ": {cause}")?;
        }
        Ok(())
    }
}

// ─── Request-level errors ───────────────────────────────────────────

/// A requirement on the request as a whole.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestPredicateError {
    /// The route requires a body and the request has none.
    #[error("request body is required")]
    BodyRequired,
}

/// The first failure met while validating a request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestValidationError {
    #[error(transparent)]
    Parameter(#[from] ParameterProcessorError),

    #[error(transparent)]
    Body(#[from] BodyProcessorError),

    #[error(transparent)]
    Predicate(#[from] RequestPredicateError),
}

impl RequestValidationError {
    /// Whether the failure comes from a broken schema rather than from
    /// the request.
    pub fn is_server_fault(&self) -> bool {
        match self {
            Self::Parameter(e) => e.is_server_fault(),
            Self::Body(e) => e.is_server_fault(),
            Self::Predicate(_) => false,
        }
    }

    /// The stable error code (`PARSING_ERROR`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parameter(e) => e.kind().code(),
            Self::Body(e) => e.kind().code(),
            Self::Predicate(RequestPredicateError::BodyRequired) => "BODY_REQUIRED",
        }
    }
}

// ─── Build-time errors ──────────────────────────────────────────────

/// A route's validation could not be assembled.
#[derive(Error, Debug)]
pub enum HandlerBuildError {
    /// No parser can be inferred for a parameter.
    #[error("parameter '{name}': {source}")]
    Parser {
        name: String,
        #[source]
        source: ParserConfigError,
    },

    /// A parameter or body schema does not compile.
    #[error("schema for '{name}': {source}")]
    Schema {
        name: String,
        #[source]
        source: SchemaDefinitionError,
    },

    /// The same parameter is declared twice in one location.
    #[error("{location} parameter '{name}' is declared more than once")]
    DuplicateParameter {
        name: String,
        location: ParameterLocation,
    },

    /// A request body media type has no body processor.
    #[error("no body processor for media type '{0}'")]
    UnsupportedMediaType(String),

    /// The route document is not valid YAML.
    #[error("invalid route YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The route document is not valid JSON.
    #[error("invalid route JSON: {0}")]
    Json(#[from] serde_json::Error),
}
