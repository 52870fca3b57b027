//! # Parameter Locations
//!
//! The part of an HTTP request a parameter is drawn from. Attached to every
//! parameter-level error so API consumers can tell `?id=` from a path `{id}`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a parameter originates in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// The URL query string.
    Query,
    /// A request header. Header names compare case-insensitively.
    Header,
    /// A path template capture.
    Path,
    /// A cookie from the `Cookie` header.
    Cookie,
}

impl ParameterLocation {
    /// All locations in the order the validation handler processes them.
    pub const ALL: [ParameterLocation; 4] = [Self::Query, Self::Path, Self::Header, Self::Cookie];

    /// The lowercase OpenAPI name (`query`, `header`, `path`, `cookie`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
            Self::Path => "path",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Query => "QUERY",
            Self::Header => "HEADER",
            Self::Path => "PATH",
            Self::Cookie => "COOKIE",
        };
        f.write_str(s)
    }
}
