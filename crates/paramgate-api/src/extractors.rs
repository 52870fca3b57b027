//! # Validated Parameters Extractor
//!
//! Route handlers behind the validation middleware receive the parsed and
//! validated parameters through [`ValidatedParameters`].

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use paramgate_core::RequestParameters;

use crate::error::ApiError;

/// The [`RequestParameters`] the validation middleware stored in the
/// request extensions.
#[derive(Debug, Clone)]
pub struct ValidatedParameters(pub RequestParameters);

/// Returns 500 if the middleware did not run for this route.
impl<S: Send + Sync> FromRequestParts<S> for ValidatedParameters {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestParameters>()
            .cloned()
            .map(ValidatedParameters)
            .ok_or_else(|| ApiError::Internal("no validated parameters in request context".into()))
    }
}

impl std::ops::Deref for ValidatedParameters {
    type Target = RequestParameters;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
