//! A single JSON:API error object.

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Locates the part of the request that caused an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// A JSON pointer (RFC 6901) into the request document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    /// The name of the query parameter that caused the error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl Source {
    /// Creates a source pointing into the request document.
    #[must_use]
    pub fn pointer(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            parameter: None,
        }
    }

    /// Creates a source naming a query parameter.
    #[must_use]
    pub fn parameter(parameter: impl Into<String>) -> Self {
        Self {
            pointer: None,
            parameter: Some(parameter.into()),
        }
    }

    /// Returns `true` if neither member is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pointer.is_none() && self.parameter.is_none()
    }
}

/// One JSON:API error object.
///
/// Every member is optional and absent members are never serialized, so an
/// error built with only a status and title renders as exactly
/// `{"status": "...", "title": "..."}`.
///
/// Errors are assembled with the consuming `with_*` methods. Transformations
/// return new values rather than mutating shared ones.
///
/// ```rust
/// use jsonapi_exceptions::Error;
///
/// let error = Error::new()
///     .with_status(404)
///     .with_title("Not Found");
///
/// assert_eq!(
///     serde_json::to_value(&error).unwrap(),
///     serde_json::json!({ "status": "404", "title": "Not Found" }),
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Error {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_status"
    )]
    status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<Map<String, Value>>,
}

impl Error {
    /// Creates an empty error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an error from a JSON object such as `{"status": 500, "title": "..."}`.
    ///
    /// The status may be given as a string or a number.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object of error members.
    pub fn cast(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Sets the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status.to_string());
        self
    }

    /// Sets the application-specific error code. Empty codes are dropped.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = non_empty(code.into());
        self
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets or clears the title.
    #[must_use]
    pub fn with_optional_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Sets the detail. Empty details are dropped.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = non_empty(detail.into());
        self
    }

    /// Sets the source.
    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = (!source.is_empty()).then_some(source);
        self
    }

    /// Replaces the meta object.
    #[must_use]
    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = (!meta.is_empty()).then_some(meta);
        self
    }

    /// Adds a single meta member.
    #[must_use]
    pub fn with_meta_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// The HTTP status as text.
    #[must_use]
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The HTTP status, if it is set and valid.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.as_deref()?.parse::<u16>().ok().and_then(|s| StatusCode::from_u16(s).ok())
    }

    /// The application-specific error code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// The title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The detail.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// The source.
    #[must_use]
    pub const fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    /// The meta object.
    #[must_use]
    pub const fn meta(&self) -> Option<&Map<String, Value>> {
        self.meta.as_ref()
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

/// Accepts `"404"` as well as `404` for the status member.
fn deserialize_status<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Status {
        Text(String),
        Number(u64),
    }

    Ok(Option::<Status>::deserialize(deserializer)?.map(|status| match status {
        Status::Text(text) => text,
        Status::Number(number) => number.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_members_are_not_serialized() {
        let error = Error::new().with_status(StatusCode::IM_A_TEAPOT.as_u16()).with_title("I'm a teapot");
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({ "status": "418", "title": "I'm a teapot" })
        );
    }

    #[test]
    fn test_empty_detail_is_dropped() {
        let error = Error::new().with_status(405).with_detail("");
        assert_eq!(error.detail(), None);
        assert_eq!(serde_json::to_value(&error).unwrap(), json!({ "status": "405" }));
    }

    #[test]
    fn test_cast_accepts_numeric_status() {
        let error = Error::cast(json!({ "status": 503, "title": "Down" })).unwrap();
        assert_eq!(error.status(), Some("503"));
        assert_eq!(error.status_code(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(error.title(), Some("Down"));
    }

    #[test]
    fn test_cast_rejects_non_objects() {
        assert!(Error::cast(json!("Internal Server Error")).is_err());
    }

    #[test]
    fn test_status_code_ignores_invalid_status() {
        let error = Error::cast(json!({ "status": "teapot" })).unwrap();
        assert_eq!(error.status(), Some("teapot"));
        assert_eq!(error.status_code(), None);
    }

    #[test]
    fn test_meta_entries_and_source() {
        let error = Error::new()
            .with_source(Source::pointer("/data/attributes/email"))
            .with_meta_entry("exception", "Boom")
            .with_meta_entry("line", 12);

        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({
                "source": { "pointer": "/data/attributes/email" },
                "meta": { "exception": "Boom", "line": 12 },
            })
        );
    }

    #[test]
    fn test_optional_title_clears_title() {
        let error = Error::new().with_title("Unprocessable Entity").with_optional_title(None);
        assert_eq!(error.title(), None);
    }
}
