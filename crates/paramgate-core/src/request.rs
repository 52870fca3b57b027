//! # Raw Request Data
//!
//! The string-typed wire data supplied by the HTTP layer for one request.
//! Every location is an insertion-ordered multimap: a name can carry zero,
//! one or many values (`?id=1&id=2`). Header maps fold names to lowercase.
//!
//! Form bodies arrive already decoded by the transport (urlencoded or
//! multipart text fields); other bodies arrive as raw bytes.
//!
//! A value whose bytes do not decode to UTF-8 is kept in lossy form, so the
//! parameter still counts as present, and its name is recorded as
//! malformed. Parsers consult [`ParamMap::check`] before reading a value.

use std::borrow::Cow;

use indexmap::IndexMap;
use percent_encoding::percent_decode_str;

use crate::MalformedValueError;

/// Name of the header used for body processor selection.
pub const CONTENT_TYPE: &str = "content-type";

/// Insertion-ordered multimap of raw string values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: IndexMap<String, Vec<String>>,
    malformed: IndexMap<String, String>,
    case_insensitive: bool,
}

impl ParamMap {
    /// An empty, case-sensitive map.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty map whose names compare case-insensitively (headers).
    pub fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
            ..Self::default()
        }
    }

    /// Decode an `application/x-www-form-urlencoded` string
    /// (a query string or a form body). A leading `?` is ignored.
    ///
    /// Percent escapes that do not form UTF-8 mark the pair malformed
    /// instead of being replaced silently.
    pub fn from_urlencoded(input: &str) -> Self {
        let input = input.strip_prefix('?').unwrap_or(input);
        let mut map = Self::new();
        for pair in input.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let (name, bad_name) = split_decoded(decode_form_component(name));
            let (value, bad_value) = split_decoded(decode_form_component(value));
            if bad_name || bad_value {
                map.mark_malformed(&name, "percent-encoded bytes are not valid UTF-8");
            }
            map.append(name, value);
        }
        map
    }

    /// Parse a `Cookie` header value (`a=1; b=2`). Pairs without `=` are
    /// skipped; values are kept verbatim.
    pub fn from_cookie_header(header: &str) -> Self {
        let mut map = Self::new();
        map.append_cookie_header(header);
        map
    }

    fn append_cookie_header(&mut self, header: &str) {
        for pair in header.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    self.append(name, value.trim());
                }
            }
        }
    }

    fn normalize<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
        if self.case_insensitive {
            std::borrow::Cow::Owned(name.to_ascii_lowercase())
        } else {
            std::borrow::Cow::Borrowed(name)
        }
    }

    /// Append one value for `name`, keeping earlier values.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let key = self.normalize(name.as_ref()).into_owned();
        self.entries.entry(key).or_default().push(value.into());
    }

    /// Record that a value of `name` could not be decoded.
    pub fn mark_malformed(&mut self, name: &str, reason: impl Into<String>) {
        let key = self.normalize(name).into_owned();
        self.malformed.entry(key).or_insert_with(|| reason.into());
    }

    pub fn is_malformed(&self, name: &str) -> bool {
        self.malformed.contains_key(self.normalize(name).as_ref())
    }

    /// Fail if a value of `name` could not be decoded.
    pub fn check(&self, name: &str) -> Result<(), MalformedValueError> {
        match self.malformed.get(self.normalize(name).as_ref()) {
            Some(reason) => Err(MalformedValueError::new(reason.clone())),
            None => Ok(()),
        }
    }

    /// Append every value and malformed mark of `other`.
    pub fn extend(&mut self, other: ParamMap) {
        for (name, reason) in other.malformed {
            self.mark_malformed(&name, reason);
        }
        for (name, values) in other.entries {
            let key = self.normalize(&name).into_owned();
            self.entries.entry(key).or_default().extend(values);
        }
    }

    /// Replace all values of `name`.
    pub fn insert_all(&mut self, name: impl AsRef<str>, values: Vec<String>) {
        let key = self.normalize(name.as_ref()).into_owned();
        self.entries.insert(key, values);
    }

    /// All values of `name`, or `None` when the name never appeared.
    pub fn get_all(&self, name: &str) -> Option<&[String]> {
        self.entries.get(self.normalize(name).as_ref()).map(Vec::as_slice)
    }

    /// The first value of `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get_all(name).and_then(|v| v.first()).map(String::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(self.normalize(name).as_ref())
    }

    /// Names in first-appearance order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(name, values)` pairs in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Strict percent decoding of one URL component. On failure the lossy
/// decoding is returned as the error.
pub fn percent_decode(raw: &str) -> Result<String, String> {
    let decoded = percent_decode_str(raw);
    match decoded.clone().decode_utf8() {
        Ok(text) => Ok(text.into_owned()),
        Err(_) => Err(decoded.decode_utf8_lossy().into_owned()),
    }
}

fn decode_form_component(raw: &str) -> Result<String, String> {
    let raw: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    percent_decode(&raw)
}

fn split_decoded(decoded: Result<String, String>) -> (String, bool) {
    match decoded {
        Ok(text) => (text, false),
        Err(lossy) => (lossy, true),
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.append(k, v);
        }
        map
    }
}

/// Materialized request data for one request.
#[derive(Debug, Clone)]
pub struct RawRequest {
    query: ParamMap,
    headers: ParamMap,
    path: ParamMap,
    cookies: ParamMap,
    form: Option<ParamMap>,
    body: Option<Vec<u8>>,
}

impl Default for RawRequest {
    fn default() -> Self {
        Self {
            query: ParamMap::new(),
            headers: ParamMap::case_insensitive(),
            path: ParamMap::new(),
            cookies: ParamMap::new(),
            form: None,
            body: None,
        }
    }
}

impl RawRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode and append every pair of a raw query string.
    pub fn with_query_string(mut self, query: &str) -> Self {
        self.query.extend(ParamMap::from_urlencoded(query));
        self
    }

    pub fn with_query_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.append(name, value);
        self
    }

    /// Append a header. A `Cookie` header also populates the cookie map.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case("cookie") {
            self.cookies.append_cookie_header(&value);
        }
        self.headers.append(name, value);
        self
    }

    /// Append a header whose bytes are not visible ASCII. The lossy text is
    /// kept and the header is marked malformed.
    pub fn with_malformed_header(mut self, name: &str, lossy_value: impl Into<String>) -> Self {
        self.headers.append(name, lossy_value);
        self.headers.mark_malformed(name, "header value is not visible ASCII");
        self
    }

    pub fn with_cookie_header(self, header: &str) -> Self {
        self.with_header("cookie", header)
    }

    /// Record a path template capture.
    pub fn with_path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path.insert_all(name, vec![value.into()]);
        self
    }

    /// Record a path capture that could not be decoded.
    pub fn with_malformed_path_param(mut self, name: &str, lossy_value: impl Into<String>) -> Self {
        self.path.insert_all(name, vec![lossy_value.into()]);
        self.path.mark_malformed(name, "percent-encoded bytes are not valid UTF-8");
        self
    }

    /// Append one decoded form field.
    pub fn with_form_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.form.get_or_insert_with(ParamMap::new).append(name, value);
        self
    }

    /// Replace the decoded form fields.
    pub fn with_form(mut self, form: ParamMap) -> Self {
        self.form = Some(form);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn query(&self) -> &ParamMap {
        &self.query
    }

    pub fn headers(&self) -> &ParamMap {
        &self.headers
    }

    pub fn path(&self) -> &ParamMap {
        &self.path
    }

    pub fn cookies(&self) -> &ParamMap {
        &self.cookies
    }

    /// The parameters of one location.
    pub fn params(&self, location: crate::ParameterLocation) -> &ParamMap {
        use crate::ParameterLocation as L;
        match location {
            L::Query => &self.query,
            L::Header => &self.headers,
            L::Path => &self.path,
            L::Cookie => &self.cookies,
        }
    }

    /// Decoded form fields, when the transport decoded a form body.
    pub fn form(&self) -> Option<&ParamMap> {
        self.form.as_ref()
    }

    /// Raw body bytes.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The raw `Content-Type` header value.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.first(CONTENT_TYPE)
    }

    /// Whether the request carries a body: decoded form fields or
    /// non-empty body bytes.
    pub fn has_body(&self) -> bool {
        self.form.is_some() || self.body.as_ref().is_some_and(|b| !b.is_empty())
    }
}
