//! # Body Processors
//!
//! One processor per request body content type. The handler picks the
//! first processor whose configured token occurs in the request's
//! `Content-Type` header (case-sensitive substring match, so
//! `application/json; charset=utf-8` matches `application/json`).

use std::borrow::Cow;
use std::fmt;

use paramgate_core::{MalformedValueError, ParamMap, RawRequest, RequestParameter};
use paramgate_parse::{ListValueParser, ObjectParser, ParserRegistry};
use paramgate_schema::ValueValidator;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::BodyProcessorError;

pub const APPLICATION_JSON: &str = "application/json";
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";
pub const TEXT_PLAIN: &str = "text/plain";

/// Extracts, parses and validates a request body of one content type.
pub trait BodyProcessor: Send + Sync {
    /// The content type token this processor handles.
    fn content_type(&self) -> &str;

    /// Whether this processor handles a request with `content_type`.
    fn can_process(&self, content_type: &str) -> bool {
        content_type.contains(self.content_type())
    }

    /// Parse and validate the body of `request`.
    fn process(&self, request: &RawRequest) -> Result<RequestParameter, BodyProcessorError>;
}

/// The media type of a `Content-Type` header: parameters dropped,
/// whitespace trimmed.
pub fn media_type(content_type: &str) -> &str {
    content_type.split(';').next().unwrap_or_default().trim()
}

fn validate(
    validator: &dyn ValueValidator,
    request: &RawRequest,
    value: Value,
) -> Result<RequestParameter, BodyProcessorError> {
    validator.validate(value).map_err(|cause| {
        if cause.is_definition() {
            warn!(error = %cause, "body schema is broken");
        }
        BodyProcessorError::validation(media_type(request.content_type().unwrap_or_default()), cause)
    })
}

// ─── Form ───────────────────────────────────────────────────────────

/// `application/x-www-form-urlencoded` and `multipart/form-data` bodies.
///
/// Each form field is resolved through the object parser order. A field
/// whose value list is empty becomes `null`; unknown fields are kept as
/// arrays of their raw values unless an additional-properties parser is
/// declared. The assembled object is validated in one call.
pub struct FormBodyProcessor {
    content_type: String,
    parsers: ParserRegistry<ListValueParser>,
    raw: ListValueParser,
    validator: Box<dyn ValueValidator>,
}

impl FormBodyProcessor {
    pub fn new(
        content_type: impl Into<String>,
        parsers: ParserRegistry<ListValueParser>,
        validator: impl ValueValidator + 'static,
    ) -> Self {
        Self::boxed(content_type, parsers, Box::new(validator))
    }

    pub fn boxed(
        content_type: impl Into<String>,
        parsers: ParserRegistry<ListValueParser>,
        validator: Box<dyn ValueValidator>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            parsers,
            raw: ListValueParser::Raw,
            validator,
        }
    }

    /// The decoded form fields: from the transport if it decoded them,
    /// otherwise from urlencoded body bytes.
    fn fields<'a>(&self, request: &'a RawRequest) -> Result<Cow<'a, ParamMap>, MalformedValueError> {
        if let Some(form) = request.form() {
            return Ok(Cow::Borrowed(form));
        }
        let body = request.body().unwrap_or_default();
        if self.content_type != FORM_URLENCODED {
            return Err(MalformedValueError::new("form body was not decoded by the transport"));
        }
        let text = std::str::from_utf8(body)
            .map_err(|e| MalformedValueError::new(format!("form body is not UTF-8: {e}")))?;
        Ok(Cow::Owned(ParamMap::from_urlencoded(text)))
    }
}

impl ObjectParser for FormBodyProcessor {
    type Serialized = [String];
    type Parser = ListValueParser;

    fn parsers(&self) -> &ParserRegistry<ListValueParser> {
        &self.parsers
    }

    fn additional_properties_parser_if_required(&self) -> Option<&ListValueParser> {
        Some(self.parsers.additional().unwrap_or(&self.raw))
    }

    fn must_nullate_value(&self, serialized: Option<&[String]>, _: &ListValueParser) -> bool {
        serialized.map_or(true, <[String]>::is_empty)
    }
}

impl BodyProcessor for FormBodyProcessor {
    fn content_type(&self) -> &str {
        &self.content_type
    }

    fn process(&self, request: &RawRequest) -> Result<RequestParameter, BodyProcessorError> {
        let raw_content_type = request.content_type();
        let fields = self
            .fields(request)
            .map_err(|cause| BodyProcessorError::parsing(raw_content_type, cause))?;

        let mut object = Map::new();
        for (key, values) in fields.iter() {
            let field = fields
                .check(key)
                .map_err(|e| e.with_key(key))
                .and_then(|()| self.parse_field(key, Some(values)))
                .map_err(|cause| BodyProcessorError::parsing(raw_content_type, cause))?;
            if let Some((key, value)) = field {
                object.insert(key, value);
            }
        }
        debug!(fields = object.len(), content_type = %self.content_type, "form body parsed");
        validate(self.validator.as_ref(), request, Value::Object(object))
    }
}

impl fmt::Debug for FormBodyProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBodyProcessor")
            .field("content_type", &self.content_type)
            .field("parsers", &self.parsers)
            .finish_non_exhaustive()
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

/// `application/json` bodies.
pub struct JsonBodyProcessor {
    validator: Box<dyn ValueValidator>,
}

impl JsonBodyProcessor {
    pub fn new(validator: impl ValueValidator + 'static) -> Self {
        Self::boxed(Box::new(validator))
    }

    pub fn boxed(validator: Box<dyn ValueValidator>) -> Self {
        Self { validator }
    }
}

impl BodyProcessor for JsonBodyProcessor {
    fn content_type(&self) -> &str {
        APPLICATION_JSON
    }

    fn process(&self, request: &RawRequest) -> Result<RequestParameter, BodyProcessorError> {
        let body = request.body().unwrap_or_default();
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            BodyProcessorError::parsing(
                request.content_type(),
                MalformedValueError::new(format!("invalid JSON body: {e}")),
            )
        })?;
        validate(self.validator.as_ref(), request, value)
    }
}

impl fmt::Debug for JsonBodyProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonBodyProcessor").finish_non_exhaustive()
    }
}

// ─── Plain text ─────────────────────────────────────────────────────

/// `text/plain` bodies, validated as a string.
pub struct TextPlainBodyProcessor {
    validator: Box<dyn ValueValidator>,
}

impl TextPlainBodyProcessor {
    pub fn new(validator: impl ValueValidator + 'static) -> Self {
        Self::boxed(Box::new(validator))
    }

    pub fn boxed(validator: Box<dyn ValueValidator>) -> Self {
        Self { validator }
    }
}

impl BodyProcessor for TextPlainBodyProcessor {
    fn content_type(&self) -> &str {
        TEXT_PLAIN
    }

    fn process(&self, request: &RawRequest) -> Result<RequestParameter, BodyProcessorError> {
        let body = request.body().unwrap_or_default();
        let text = std::str::from_utf8(body).map_err(|e| {
            BodyProcessorError::parsing(
                request.content_type(),
                MalformedValueError::new(format!("text body is not UTF-8: {e}")),
            )
        })?;
        validate(self.validator.as_ref(), request, Value::String(text.to_string()))
    }
}

impl fmt::Debug for TextPlainBodyProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextPlainBodyProcessor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BodyProcessorErrorKind;
    use paramgate_parse::{PrimitiveParser, StringValueParser};
    use paramgate_schema::{SchemaRepository, SchemaValueValidator};
    use serde_json::json;

    fn validator(schema: Value) -> SchemaValueValidator {
        SchemaValueValidator::new(&SchemaRepository::new(), schema).unwrap()
    }

    fn form_processor() -> FormBodyProcessor {
        let parsers = ParserRegistry::new()
            .with_property("age", ListValueParser::Single(PrimitiveParser::Integer.into()))
            .with_property("tags", ListValueParser::Exploded(StringValueParser::string()));
        FormBodyProcessor::new(
            FORM_URLENCODED,
            parsers,
            validator(json!({
                "type": "object",
                "properties": {"age": {"type": ["integer", "null"], "minimum": 0}},
                "required": ["age"]
            })),
        )
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("application/json; charset=utf-8"), "application/json");
        assert_eq!(media_type(" text/plain "), "text/plain");
        assert_eq!(media_type(""), "");
    }

    #[test]
    fn test_can_process_is_substring_and_case_sensitive() {
        let p = JsonBodyProcessor::new(validator(json!({})));
        assert!(p.can_process("application/json"));
        assert!(p.can_process("application/json; charset=utf-8"));
        assert!(!p.can_process("Application/JSON"));
        assert!(!p.can_process("text/plain"));
    }

    #[test]
    fn test_form_fields_from_decoded_form() {
        let req = RawRequest::new()
            .with_header("Content-Type", FORM_URLENCODED)
            .with_form_field("age", "30")
            .with_form_field("tags", "a")
            .with_form_field("tags", "b")
            .with_form_field("extra", "x");
        let body = form_processor().process(&req).unwrap();
        assert_eq!(
            body.value(),
            &json!({"age": 30, "tags": ["a", "b"], "extra": ["x"]})
        );
    }

    #[test]
    fn test_form_fields_from_urlencoded_bytes() {
        let req = RawRequest::new()
            .with_header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
            .with_body("age=4&tags=x");
        let body = form_processor().process(&req).unwrap();
        assert_eq!(body.value(), &json!({"age": 4, "tags": ["x"]}));
    }

    #[test]
    fn test_form_parsing_error_carries_raw_content_type() {
        let raw = "application/x-www-form-urlencoded; charset=utf-8";
        let req = RawRequest::new().with_header("Content-Type", raw).with_form_field("age", "old");
        let err = form_processor().process(&req).unwrap_err();
        assert_eq!(err.kind(), BodyProcessorErrorKind::ParsingError);
        assert_eq!(err.content_type(), Some(raw));
        let malformed = err.cause().and_then(|c| c.as_malformed()).unwrap();
        assert_eq!(malformed.key(), Some("age"));
    }

    #[test]
    fn test_form_field_with_undecodable_bytes() {
        let req = RawRequest::new()
            .with_header("Content-Type", FORM_URLENCODED)
            .with_body("age=4&extra=%FF");
        let err = form_processor().process(&req).unwrap_err();
        assert_eq!(err.kind(), BodyProcessorErrorKind::ParsingError);
        let malformed = err.cause().and_then(|c| c.as_malformed()).unwrap();
        assert_eq!(malformed.key(), Some("extra"));
    }

    #[test]
    fn test_form_validation_error_carries_media_type() {
        let req = RawRequest::new()
            .with_header("Content-Type", "application/x-www-form-urlencoded; charset=utf-8")
            .with_form_field("age", "-1");
        let err = form_processor().process(&req).unwrap_err();
        assert_eq!(err.kind(), BodyProcessorErrorKind::ValidationError);
        assert_eq!(err.content_type(), Some(FORM_URLENCODED));
    }

    #[test]
    fn test_multipart_requires_decoded_form() {
        let p = FormBodyProcessor::new(MULTIPART_FORM_DATA, ParserRegistry::new(), validator(json!({})));
        let req = RawRequest::new()
            .with_header("Content-Type", "multipart/form-data; boundary=x")
            .with_body("--x--");
        let err = p.process(&req).unwrap_err();
        assert_eq!(err.kind(), BodyProcessorErrorKind::ParsingError);
    }

    #[test]
    fn test_json_body() {
        let p = JsonBodyProcessor::new(validator(json!({"type": "object", "required": ["name"]})));
        let ok = RawRequest::new()
            .with_header("Content-Type", APPLICATION_JSON)
            .with_body(r#"{"name":"rex"}"#);
        assert_eq!(p.process(&ok).unwrap().value(), &json!({"name": "rex"}));

        let missing = RawRequest::new().with_header("Content-Type", APPLICATION_JSON).with_body("{}");
        assert_eq!(p.process(&missing).unwrap_err().kind(), BodyProcessorErrorKind::ValidationError);

        let broken = RawRequest::new().with_header("Content-Type", APPLICATION_JSON).with_body("{");
        assert_eq!(p.process(&broken).unwrap_err().kind(), BodyProcessorErrorKind::ParsingError);
    }

    #[test]
    fn test_text_body() {
        let p = TextPlainBodyProcessor::new(validator(json!({"type": "string", "maxLength": 3})));
        let ok = RawRequest::new().with_header("Content-Type", TEXT_PLAIN).with_body("abc");
        assert_eq!(p.process(&ok).unwrap().as_str(), Some("abc"));

        let long = RawRequest::new().with_header("Content-Type", TEXT_PLAIN).with_body("abcd");
        assert_eq!(p.process(&long).unwrap_err().kind(), BodyProcessorErrorKind::ValidationError);

        let binary = RawRequest::new().with_header("Content-Type", TEXT_PLAIN).with_body(vec![0xffu8, 0xfe]);
        assert_eq!(p.process(&binary).unwrap_err().kind(), BodyProcessorErrorKind::ParsingError);
    }
}
