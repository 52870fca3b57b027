//! # Validation Middleware
//!
//! Materialises an axum request into a [`RawRequest`], runs the route's
//! [`ValidationHandler`] and either rejects the request or forwards it with
//! the validated [`RequestParameters`](paramgate_core::RequestParameters)
//! in its extensions.
//!
//! The body is buffered up to the configured limit so the handler sees the
//! same bytes the validator saw. Multipart bodies are decoded here when the
//! route declares a multipart processor; file parts are not form fields and
//! are skipped.
//!
//! Header values that are not visible ASCII and path captures that do not
//! decode to UTF-8 are handed over marked malformed, so a declared
//! parameter reading them fails with a parsing error.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{FromRequest, FromRequestParts, MatchedPath, Multipart, RawPathParams, Request, State};
use axum::http::request::Parts;
use axum::http::header::CONTENT_TYPE;
use axum::middleware::Next;
use axum::response::Response;
use http_body_util::LengthLimitError;
use paramgate_core::{percent_decode, MalformedValueError, ParamMap, RawRequest};
use paramgate_validation::{
    media_type, BodyProcessorError, RequestValidationError, ValidationHandler, MULTIPART_FORM_DATA,
};

use crate::config::ValidationLayerConfig;
use crate::error::ApiError;

/// Per-route middleware state.
#[derive(Debug, Clone)]
pub struct ValidationState {
    handler: Arc<ValidationHandler>,
    config: ValidationLayerConfig,
}

impl ValidationState {
    pub fn new(handler: ValidationHandler) -> Self {
        Self::shared(Arc::new(handler))
    }

    /// Share one handler between several routers.
    pub fn shared(handler: Arc<ValidationHandler>) -> Self {
        Self {
            handler,
            config: ValidationLayerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ValidationLayerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn handler(&self) -> &ValidationHandler {
        &self.handler
    }

    pub fn config(&self) -> &ValidationLayerConfig {
        &self.config
    }
}

/// Validate the request against the route's handler.
///
/// Install with `route_layer` so that path captures are available.
pub async fn validate_request(
    State(state): State<ValidationState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = request.into_parts();

    let bytes = axum::body::to_bytes(body, state.config.body_limit)
        .await
        .map_err(|e| {
            if is_length_limit(&e) {
                ApiError::PayloadTooLarge {
                    limit: state.config.body_limit,
                }
            } else {
                ApiError::BodyRead(e.to_string())
            }
        })?;

    let raw = match materialize(&mut parts, &bytes, &state).await {
        Ok(raw) => raw,
        Err(e) => {
            record_failure(&e);
            return Err(e.into());
        }
    };

    let params = match state.handler.validate(&raw) {
        Ok(params) => params,
        Err(e) => {
            record_failure(&e);
            return Err(e.into());
        }
    };

    metrics::counter!("paramgate_requests_validated_total").increment(1);
    tracing::debug!(
        method = %parts.method,
        uri = %parts.uri,
        parameters = params.len(),
        "request validated"
    );

    parts.extensions.insert(params);
    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

async fn materialize(
    parts: &mut Parts,
    bytes: &Bytes,
    state: &ValidationState,
) -> Result<RawRequest, RequestValidationError> {
    let mut raw = RawRequest::new();

    if let Some(query) = parts.uri.query() {
        raw = raw.with_query_string(query);
    }

    for (name, value) in &parts.headers {
        raw = match value.to_str() {
            Ok(value) => raw.with_header(name.as_str(), value),
            Err(_) => {
                tracing::debug!(header = %name, "header value is not visible ASCII");
                raw.with_malformed_header(name.as_str(), String::from_utf8_lossy(value.as_bytes()))
            }
        };
    }

    match RawPathParams::from_request_parts(parts, &()).await {
        Ok(path) => {
            for (name, value) in &path {
                raw = raw.with_path_param(name, value);
            }
        }
        Err(RawPathParamsRejection::InvalidUtf8InPathParam(e)) => {
            tracing::debug!(error = %e, "path capture is not valid UTF-8");
            for (name, decoded) in template_captures(parts) {
                raw = match decoded {
                    Ok(value) => raw.with_path_param(&name, value),
                    Err(lossy) => raw.with_malformed_path_param(&name, lossy),
                };
            }
        }
        Err(e) => tracing::debug!(error = %e, "no path captures for request"),
    }

    if bytes.is_empty() {
        return Ok(raw);
    }

    let content_type = raw.content_type().map(str::to_string);
    if let Some(ct) = content_type.as_deref() {
        if is_multipart(ct) && accepts_multipart(&state.handler) {
            let form = decode_multipart(ct, bytes.clone()).await?;
            raw = raw.with_form(form);
        }
    }

    Ok(raw.with_body(bytes.to_vec()))
}

/// Match the request path against the route template and percent-decode
/// each capture, keeping undecodable ones in lossy form.
fn template_captures(parts: &Parts) -> Vec<(String, Result<String, String>)> {
    let Some(template) = parts.extensions.get::<MatchedPath>() else {
        return Vec::new();
    };
    let mut segments = parts.uri.path().split('/');
    let mut captures = Vec::new();
    for pattern in template.as_str().split('/') {
        let Some(name) = pattern.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
            segments.next();
            continue;
        };
        let raw = match name.strip_prefix('*') {
            Some(_) => segments.by_ref().collect::<Vec<_>>().join("/"),
            None => segments.next().unwrap_or_default().to_string(),
        };
        let name = name.trim_start_matches('*').to_string();
        captures.push((name, percent_decode(&raw)));
    }
    captures
}

fn is_multipart(content_type: &str) -> bool {
    media_type(content_type).eq_ignore_ascii_case(MULTIPART_FORM_DATA)
}

fn accepts_multipart(handler: &ValidationHandler) -> bool {
    handler
        .body_content_types()
        .iter()
        .any(|t| t.eq_ignore_ascii_case(MULTIPART_FORM_DATA))
}

async fn decode_multipart(content_type: &str, bytes: Bytes) -> Result<ParamMap, BodyProcessorError> {
    let malformed = |message: String| {
        BodyProcessorError::parsing(Some(content_type), MalformedValueError::new(message))
    };

    let request = axum::http::Request::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(bytes))
        .map_err(|e| malformed(e.to_string()))?;
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| malformed(e.body_text()))?;

    let mut form = ParamMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| malformed(e.body_text()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field.text().await.map_err(|e| malformed(e.body_text()))?;
        form.append(name, value);
    }
    Ok(form)
}

fn is_length_limit(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.is::<LengthLimitError>() {
            return true;
        }
        current = e.source();
    }
    false
}

fn record_failure(err: &RequestValidationError) {
    metrics::counter!("paramgate_validation_failures_total", "kind" => err.code()).increment(1);
}
