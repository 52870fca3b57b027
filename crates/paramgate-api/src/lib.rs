//! # paramgate-api — Axum Integration
//!
//! Wires a [`ValidationHandler`](paramgate_validation::ValidationHandler)
//! into an axum router.
//!
//! ## Architecture
//!
//! - **Middleware** (`middleware`): buffers the body, builds the raw
//!   request view, validates, and stores the result in the extensions.
//! - **Extractor** (`extractors`): [`ValidatedParameters`] hands the result
//!   to route handlers.
//! - **Errors** (`error`): failures become JSON responses. Client faults
//!   are 400, an unsupported body type is 415, an oversized body is 413
//!   and a broken route schema is 500.
//! - **Telemetry** (`telemetry`): subscriber setup and the request
//!   `TraceLayer`.
//!
//! ## Usage
//!
//! ```ignore
//! let handler = RouteValidationSpec::from_yaml_str(ROUTE)?.build(&repository)?;
//! let pets = Router::new().route("/pets/{petId}", get(get_pet));
//! let app = validate_route(pets, ValidationState::new(handler));
//! ```

pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod telemetry;

use axum::Router;

pub use config::{ConfigError, ValidationLayerConfig, DEFAULT_BODY_LIMIT};
pub use error::{ApiError, ErrorBody, ErrorDetail};
pub use extractors::ValidatedParameters;
pub use middleware::{validate_request, ValidationState};
pub use telemetry::{init_tracing, trace_layer};

/// Validate every route of `router` with one handler.
///
/// Applied as a route layer: unmatched paths still produce 404 rather
/// than a validation error.
pub fn validate_route<S>(router: Router<S>, state: ValidationState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(axum::middleware::from_fn_with_state(state, validate_request))
}
