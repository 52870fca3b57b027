//! # Validation Handler
//!
//! Runs every declared parameter of a route, then the body, and returns
//! the validated [`RequestParameters`] or the first failure. Locations are
//! processed in the order query, path, header, cookie; within a location,
//! in declaration order.

use std::fmt;

use paramgate_core::{ParameterLocation, RawRequest, RequestParameters};
use tracing::{debug, info};

use crate::body::BodyProcessor;
use crate::error::{
    BodyProcessorError, HandlerBuildError, RequestPredicateError, RequestValidationError,
};
use crate::parameter::ParameterProcessor;

/// The validation of one route, built once and shared across requests.
pub struct ValidationHandler {
    query: Vec<ParameterProcessor>,
    path: Vec<ParameterProcessor>,
    header: Vec<ParameterProcessor>,
    cookie: Vec<ParameterProcessor>,
    body_processors: Vec<Box<dyn BodyProcessor>>,
    body_required: bool,
}

impl ValidationHandler {
    pub fn builder() -> ValidationHandlerBuilder {
        ValidationHandlerBuilder::default()
    }

    fn processors(&self, location: ParameterLocation) -> &[ParameterProcessor] {
        match location {
            ParameterLocation::Query => &self.query,
            ParameterLocation::Path => &self.path,
            ParameterLocation::Header => &self.header,
            ParameterLocation::Cookie => &self.cookie,
        }
    }

    /// Number of declared parameters across all locations.
    pub fn parameter_count(&self) -> usize {
        ParameterLocation::ALL
            .iter()
            .map(|l| self.processors(*l).len())
            .sum()
    }

    /// Content type tokens of the configured body processors.
    pub fn body_content_types(&self) -> Vec<&str> {
        self.body_processors.iter().map(|p| p.content_type()).collect()
    }

    pub fn is_body_required(&self) -> bool {
        self.body_required
    }

    /// Validate a request.
    ///
    /// # Errors
    ///
    /// The first parameter, body or predicate failure. Nothing after it is
    /// evaluated.
    pub fn validate(&self, request: &RawRequest) -> Result<RequestParameters, RequestValidationError> {
        let mut parameters = RequestParameters::new();

        for location in ParameterLocation::ALL {
            let raw = request.params(location);
            for processor in self.processors(location) {
                if let Some(value) = processor.process(raw)? {
                    parameters.insert(location, processor.name(), value);
                }
            }
        }

        if self.body_processors.is_empty() {
            return Ok(parameters);
        }

        if !request.has_body() {
            if self.body_required {
                return Err(RequestPredicateError::BodyRequired.into());
            }
            return Ok(parameters);
        }

        // A body without a content type matches no processor.
        let content_type = request.content_type();
        let processor = content_type
            .and_then(|ct| self.body_processors.iter().find(|p| p.can_process(ct)))
            .ok_or_else(|| BodyProcessorError::missing_matching_processor(content_type))?;
        debug!(
            content_type = content_type.unwrap_or_default(),
            processor = processor.content_type(),
            "processing body"
        );
        parameters.set_body(processor.process(request)?);

        Ok(parameters)
    }
}

impl fmt::Debug for ValidationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationHandler")
            .field("query", &self.query)
            .field("path", &self.path)
            .field("header", &self.header)
            .field("cookie", &self.cookie)
            .field("body_content_types", &self.body_content_types())
            .field("body_required", &self.body_required)
            .finish()
    }
}

/// Assembles a [`ValidationHandler`].
#[derive(Default)]
pub struct ValidationHandlerBuilder {
    parameters: Vec<ParameterProcessor>,
    body_processors: Vec<Box<dyn BodyProcessor>>,
    body_required: bool,
}

impl ValidationHandlerBuilder {
    pub fn parameter(mut self, processor: ParameterProcessor) -> Self {
        self.parameters.push(processor);
        self
    }

    /// Add a body processor. Processors are tried in the order added.
    pub fn body_processor(mut self, processor: impl BodyProcessor + 'static) -> Self {
        self.body_processors.push(Box::new(processor));
        self
    }

    pub fn boxed_body_processor(mut self, processor: Box<dyn BodyProcessor>) -> Self {
        self.body_processors.push(processor);
        self
    }

    pub fn body_required(mut self, required: bool) -> Self {
        self.body_required = required;
        self
    }

    /// # Errors
    ///
    /// [`HandlerBuildError::DuplicateParameter`] when a name is declared
    /// twice in one location (header names compared case-insensitively).
    pub fn build(self) -> Result<ValidationHandler, HandlerBuildError> {
        let mut handler = ValidationHandler {
            query: Vec::new(),
            path: Vec::new(),
            header: Vec::new(),
            cookie: Vec::new(),
            body_processors: self.body_processors,
            body_required: self.body_required,
        };

        for processor in self.parameters {
            let location = processor.location();
            let same_name = |existing: &ParameterProcessor| match location {
                ParameterLocation::Header => existing.name().eq_ignore_ascii_case(processor.name()),
                _ => existing.name() == processor.name(),
            };
            let slot = match location {
                ParameterLocation::Query => &mut handler.query,
                ParameterLocation::Path => &mut handler.path,
                ParameterLocation::Header => &mut handler.header,
                ParameterLocation::Cookie => &mut handler.cookie,
            };
            if slot.iter().any(same_name) {
                return Err(HandlerBuildError::DuplicateParameter {
                    name: processor.name().to_string(),
                    location,
                });
            }
            slot.push(processor);
        }

        info!(
            parameters = handler.parameter_count(),
            body_processors = handler.body_processors.len(),
            body_required = handler.body_required,
            "validation handler built"
        );
        Ok(handler)
    }
}
