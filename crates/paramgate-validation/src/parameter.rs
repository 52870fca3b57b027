//! # Parameter Processor
//!
//! Parse, default, validate for one declared parameter:
//!
//! ```text
//! START ──parse──▶ PARSED ──────────────────────────▶ validate ──▶ VALIDATED
//!   │                 │ absent, optional, default           │
//!   │                 └──────────▶ DEFAULTED ───────────────┘
//!   │                 │ absent, optional, no default ──▶ omitted
//!   │                 │ absent, required ──▶ FAILED(MISSING_PARAMETER_WHEN_REQUIRED)
//!   └─ malformed ──▶ FAILED(PARSING_ERROR)        validator error ──▶ FAILED(VALIDATION_ERROR)
//! ```
//!
//! A present but empty value is not absent: defaults apply only when the
//! parser finds nothing.

use std::fmt;

use paramgate_core::{ParamMap, ParameterLocation, RequestParameter};
use paramgate_parse::ParameterParser;
use paramgate_schema::ValueValidator;
use tracing::{debug, warn};

use crate::error::ParameterProcessorError;

/// Processes one declared parameter of one location.
pub struct ParameterProcessor {
    name: String,
    location: ParameterLocation,
    required: bool,
    parser: Box<dyn ParameterParser>,
    validator: Box<dyn ValueValidator>,
}

impl ParameterProcessor {
    pub fn new(
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
        parser: impl ParameterParser + 'static,
        validator: impl ValueValidator + 'static,
    ) -> Self {
        Self::boxed(name, location, required, Box::new(parser), Box::new(validator))
    }

    pub fn boxed(
        name: impl Into<String>,
        location: ParameterLocation,
        required: bool,
        parser: Box<dyn ParameterParser>,
        validator: Box<dyn ValueValidator>,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            required,
            parser,
            validator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Run the parameter through parse, default substitution and
    /// validation against the raw values of its location.
    ///
    /// Returns `Ok(None)` for an absent optional parameter without default.
    ///
    /// # Errors
    ///
    /// A [`ParameterProcessorError`] tagged with this parameter's location
    /// and name.
    pub fn process(&self, params: &ParamMap) -> Result<Option<RequestParameter>, ParameterProcessorError> {
        let parsed = self
            .parser
            .parse_parameter(params)
            .map_err(|cause| ParameterProcessorError::parsing(self.location, &self.name, cause))?;

        let value = match parsed {
            Some(value) => value,
            None if self.required => {
                return Err(ParameterProcessorError::missing(self.location, &self.name));
            }
            None => match self.validator.default_value() {
                Some(default) => {
                    debug!(parameter = %self.name, location = %self.location, "substituting default");
                    default
                }
                None => return Ok(None),
            },
        };

        match self.validator.validate(value) {
            Ok(parameter) => Ok(Some(parameter)),
            Err(cause) => {
                if cause.is_definition() {
                    warn!(parameter = %self.name, location = %self.location, error = %cause, "parameter schema is broken");
                }
                Err(ParameterProcessorError::validation(self.location, &self.name, cause))
            }
        }
    }
}

impl fmt::Debug for ParameterProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterProcessor")
            .field("name", &self.name)
            .field("location", &self.location)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}
