//! # Malformed Value Error
//!
//! Raised by value parsers when raw wire content cannot be converted under
//! the declared type or serialization style. When the failure happens while
//! parsing a field of an object, the offending key is attached so the
//! processor boundary can report exactly which property was malformed.

use std::fmt;

use thiserror::Error;

/// Raw content could not be converted to a typed value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct MalformedValueError {
    message: String,
    key: Option<String>,
}

impl MalformedValueError {
    /// Create a new error with a human-readable description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            key: None,
        }
    }

    /// Attach the object key whose value failed to parse.
    ///
    /// An already attached key is kept: the innermost key is the most
    /// precise attribution.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        if self.key.is_none() {
            self.key = Some(key.into());
        }
        self
    }

    /// The description of what was malformed.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The object key whose value failed to parse, if any.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl fmt::Display for MalformedValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "malformed value for key '{key}': {}", self.message),
            None => write!(f, "malformed value: {}", self.message),
        }
    }
}
