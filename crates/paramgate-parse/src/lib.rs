//! # paramgate-parse — Wire-Format Parsers
//!
//! Converts raw, string-typed wire data into typed JSON values according to
//! a declared type and serialization style. Parsers are pure functions of
//! their input, immutable once built, and shared across requests.
//!
//! ## Layers
//!
//! - **Value parsers** (`value`, `splitter`): one raw string, or the list
//!   of raw strings of a repeated field, to one JSON value. A closed set of
//!   variants: [`PrimitiveParser`], [`StringValueParser`],
//!   [`ListValueParser`].
//!
//! - **Object parser** (`object`): the key resolution order shared by
//!   every object-shaped input. Exact property name, then the first
//!   declared matching pattern, then the additional-properties fallback.
//!   Variants supply the fallback and the nullation policy through the
//!   [`ObjectParser`] hooks.
//!
//! - **Parameter parsers** (`parameter`): location-aware extraction of one
//!   declared parameter from a [`ParamMap`](paramgate_core::ParamMap).
//!
//! - **Inference** (`inference`): builds the right parser from a
//!   parameter's schema, style and explode flag at route registration.

pub mod inference;
pub mod object;
pub mod parameter;
pub mod splitter;
pub mod value;

pub use inference::{ParserConfigError, ParserInference, SchemaType};
pub use object::{ObjectParser, ParserRegistry};
pub use parameter::{
    DeepObjectParameterParser, ExplodedArrayParameterParser, ExplodedObjectParameterParser,
    ParameterParser, SingleValueParameterParser,
};
pub use splitter::{SplitterArrayParser, SplitterObjectParser};
pub use value::{ListValueParser, PrimitiveParser, StringValueParser, ValueParser};
