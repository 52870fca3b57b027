//! # Validated Request Parameters
//!
//! [`RequestParameter`] is the unit handed to request handlers: a typed
//! JSON value that has already passed its schema. [`RequestParameters`]
//! aggregates them per location, plus the body.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::location::ParameterLocation;

/// An immutable, validated parameter or body value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParameter(Value);

impl RequestParameter {
    /// Wrap a value. Validators call this once the value passed its schema.
    pub fn new(value: impl Into<Value>) -> Self {
        Self(value.into())
    }

    /// The wrapped JSON value.
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Consume the parameter, returning the wrapped value.
    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn is_string(&self) -> bool {
        self.0.is_string()
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    pub fn is_number(&self) -> bool {
        self.0.is_number()
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.0.as_i64()
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.0.as_f64()
    }

    pub fn is_boolean(&self) -> bool {
        self.0.is_boolean()
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.0.as_bool()
    }

    pub fn is_array(&self) -> bool {
        self.0.is_array()
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        self.0.as_array()
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

impl From<Value> for RequestParameter {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// All validated values of one request.
///
/// Keys are unique per location. Parameters that were optional, absent and
/// without a default are simply not present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    query: HashMap<String, RequestParameter>,
    path: HashMap<String, RequestParameter>,
    header: HashMap<String, RequestParameter>,
    cookie: HashMap<String, RequestParameter>,
    body: Option<RequestParameter>,
}

impl RequestParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a validated parameter. A later insert for the same name
    /// and location replaces the earlier one.
    pub fn insert(
        &mut self,
        location: ParameterLocation,
        name: impl Into<String>,
        parameter: RequestParameter,
    ) {
        let mut name = name.into();
        if location == ParameterLocation::Header {
            name.make_ascii_lowercase();
        }
        self.location_mut(location).insert(name, parameter);
    }

    /// Record the validated body.
    pub fn set_body(&mut self, body: RequestParameter) {
        self.body = Some(body);
    }

    /// Look up a parameter by location and name. Header names are matched
    /// case-insensitively.
    pub fn get(&self, location: ParameterLocation, name: &str) -> Option<&RequestParameter> {
        match location {
            ParameterLocation::Header => self.header.get(&name.to_ascii_lowercase()),
            other => self.location(other).get(name),
        }
    }

    pub fn query_parameter(&self, name: &str) -> Option<&RequestParameter> {
        self.get(ParameterLocation::Query, name)
    }

    pub fn path_parameter(&self, name: &str) -> Option<&RequestParameter> {
        self.get(ParameterLocation::Path, name)
    }

    pub fn header_parameter(&self, name: &str) -> Option<&RequestParameter> {
        self.get(ParameterLocation::Header, name)
    }

    pub fn cookie_parameter(&self, name: &str) -> Option<&RequestParameter> {
        self.get(ParameterLocation::Cookie, name)
    }

    /// The validated body, if the route declared one and the request sent one.
    pub fn body(&self) -> Option<&RequestParameter> {
        self.body.as_ref()
    }

    /// All validated parameters of one location.
    pub fn location(&self, location: ParameterLocation) -> &HashMap<String, RequestParameter> {
        match location {
            ParameterLocation::Query => &self.query,
            ParameterLocation::Path => &self.path,
            ParameterLocation::Header => &self.header,
            ParameterLocation::Cookie => &self.cookie,
        }
    }

    fn location_mut(&mut self, location: ParameterLocation) -> &mut HashMap<String, RequestParameter> {
        match location {
            ParameterLocation::Query => &mut self.query,
            ParameterLocation::Path => &mut self.path,
            ParameterLocation::Header => &mut self.header,
            ParameterLocation::Cookie => &mut self.cookie,
        }
    }

    /// Total number of validated parameters, excluding the body.
    pub fn len(&self) -> usize {
        self.query.len() + self.path.len() + self.header.len() + self.cookie.len()
    }

    /// True when no parameter was recorded and there is no body.
    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.body.is_none()
    }
}
