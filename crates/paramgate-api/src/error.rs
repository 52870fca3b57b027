//! # API Error Types
//!
//! Maps request validation failures to HTTP responses with a structured
//! JSON body. Client faults are 400 with the offending field identified;
//! a broken route schema is a 500 that never exposes schema internals.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use paramgate_schema::SchemaEngineError;
use paramgate_validation::{BodyProcessorErrorKind, ProcessingCause, RequestValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "PARSING_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Parameter location (`QUERY`, `PATH`, `HEADER`, `COOKIE`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Parameter name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Content type of a rejected body.
    #[serde(rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Schema violations, present only for client errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Errors surfaced by the validation middleware and extractor.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request failed validation, or the route's schema is broken.
    #[error(transparent)]
    Validation(#[from] RequestValidationError),

    /// The body exceeds the configured limit (413).
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The body stream failed (400).
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(e) if e.is_server_fault() => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SCHEMA_DEFINITION_ERROR")
            }
            Self::Validation(RequestValidationError::Body(e))
                if e.kind() == BodyProcessorErrorKind::MissingMatchingBodyProcessor =>
            {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.kind().code())
            }
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.code()),
            Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::BodyRead(_) => (StatusCode::BAD_REQUEST, "BODY_READ_ERROR"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    fn detail(&self) -> ErrorDetail {
        let (status, code) = self.status_and_code();
        let mut detail = ErrorDetail {
            code: code.to_string(),
            message: self.to_string(),
            location: None,
            parameter: None,
            content_type: None,
            details: None,
        };

        if status.is_server_error() {
            detail.message = "An internal error occurred".to_string();
            return detail;
        }

        let cause = match self {
            Self::Validation(RequestValidationError::Parameter(e)) => {
                detail.location = Some(e.location().to_string());
                detail.parameter = Some(e.parameter_name().to_string());
                e.cause()
            }
            Self::Validation(RequestValidationError::Body(e)) => {
                detail.content_type = e.content_type().map(str::to_string);
                e.cause()
            }
            _ => None,
        };
        detail.details = cause.and_then(violation_details);
        detail
    }
}

fn violation_details(cause: &ProcessingCause) -> Option<serde_json::Value> {
    match cause.as_schema()? {
        SchemaEngineError::Validation(violation) => Some(
            violation
                .violations()
                .iter()
                .map(|v| {
                    serde_json::json!({
                        "path": v.instance_path,
                        "schemaPath": v.schema_path,
                        "message": v.message,
                    })
                })
                .collect(),
        ),
        SchemaEngineError::Definition(_) => None,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, _) = self.status_and_code();

        // Log server-side errors for operator visibility.
        if status.is_server_error() {
            tracing::error!(error = %self, "request validation failed on server side");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let body = ErrorBody {
            error: self.detail(),
        };
        (status, Json(body)).into_response()
    }
}
