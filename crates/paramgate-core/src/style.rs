//! # Serialization Styles
//!
//! The OpenAPI conventions for encoding arrays and objects inside a single
//! string-valued wire field. For `id = [3, 4, 5]` and
//! `color = {R: 100, G: 200}`:
//!
//! ```text
//! style           explode=false            explode=true
//! form            id=3,4,5                 id=3&id=4&id=5
//!                 color=R,100,G,200        R=100&G=200
//! simple          3,4,5                    3,4,5
//!                 R,100,G,200              R=100,G=200
//! label           .3,4,5                   .3.4.5
//!                 .R,100,G,200             .R=100.G=200
//! matrix          ;id=3,4,5                ;id=3;id=4;id=5
//!                 ;color=R,100,G,200       ;R=100;G=200
//! spaceDelimited  id=3 4 5                 (n/a)
//! pipeDelimited   id=3|4|5                 (n/a)
//! deepObject      (n/a)                    color[R]=100&color[G]=200
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::location::ParameterLocation;

/// Serialization style of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterStyle {
    Form,
    Simple,
    Label,
    Matrix,
    SpaceDelimited,
    PipeDelimited,
    DeepObject,
}

impl ParameterStyle {
    /// The default style for a location: `form` for query and cookie,
    /// `simple` for path and header.
    pub fn default_for(location: ParameterLocation) -> Self {
        match location {
            ParameterLocation::Query | ParameterLocation::Cookie => Self::Form,
            ParameterLocation::Path | ParameterLocation::Header => Self::Simple,
        }
    }

    /// The default `explode` flag: `true` only for `form`.
    pub fn default_explode(&self) -> bool {
        matches!(self, Self::Form)
    }

    /// Whether the style may be declared for parameters in `location`.
    pub fn allowed_in(&self, location: ParameterLocation) -> bool {
        match self {
            Self::Form => matches!(location, ParameterLocation::Query | ParameterLocation::Cookie),
            Self::Simple => matches!(location, ParameterLocation::Path | ParameterLocation::Header),
            Self::Label | Self::Matrix => location == ParameterLocation::Path,
            Self::SpaceDelimited | Self::PipeDelimited | Self::DeepObject => {
                location == ParameterLocation::Query
            }
        }
    }
}

impl fmt::Display for ParameterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Form => "form",
            Self::Simple => "simple",
            Self::Label => "label",
            Self::Matrix => "matrix",
            Self::SpaceDelimited => "spaceDelimited",
            Self::PipeDelimited => "pipeDelimited",
            Self::DeepObject => "deepObject",
        };
        f.write_str(s)
    }
}
