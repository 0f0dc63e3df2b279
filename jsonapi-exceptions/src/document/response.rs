//! Error responses and the documents they render.

use std::fmt::{self, Debug};
use std::sync::Arc;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

use super::{Error, ErrorList, ErrorProvider};
use crate::constants::{JSONAPI_VERSION, MEDIA_TYPE};

/// Body used if a document ever fails to serialize.
const UNSERIALIZABLE_DOCUMENT: &str =
    r#"{"errors":[{"status":"500","title":"Internal Server Error"}],"jsonapi":{"version":"1.0"}}"#;

/// The errors carried by an [`ErrorResponse`].
#[derive(Clone)]
pub enum Errors {
    /// A single error.
    Single(Error),
    /// A collaborator that produces its errors on demand.
    Provider(Arc<dyn ErrorProvider>),
    /// An ordered list of errors.
    List(ErrorList),
}

impl Errors {
    /// Resolves the errors into a list.
    #[must_use]
    pub fn to_list(&self) -> ErrorList {
        match self {
            Self::Single(error) => ErrorList::from(error.clone()),
            Self::Provider(provider) => provider.to_errors(),
            Self::List(list) => list.clone(),
        }
    }
}

impl Debug for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(error) => f.debug_tuple("Single").field(error).finish(),
            Self::Provider(_) => f.debug_tuple("Provider").field(&"<ErrorProvider>").finish(),
            Self::List(list) => f.debug_tuple("List").field(list).finish(),
        }
    }
}

impl From<Error> for Errors {
    fn from(error: Error) -> Self {
        Self::Single(error)
    }
}

impl From<ErrorList> for Errors {
    fn from(list: ErrorList) -> Self {
        Self::List(list)
    }
}

/// The `jsonapi` member of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonApiObject {
    /// The JSON:API version.
    pub version: String,
}

impl Default for JsonApiObject {
    fn default() -> Self {
        Self {
            version: JSONAPI_VERSION.to_owned(),
        }
    }
}

/// A top-level JSON:API error document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDocument {
    /// The errors, in discovery order.
    pub errors: ErrorList,
    /// Protocol information.
    pub jsonapi: JsonApiObject,
}

/// A structured error response, ready to be turned into an HTTP response.
///
/// Produced by exactly one pipe (or the fallback) and converted exactly once
/// by [`ErrorResponse::into_http_response`].
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    errors: Errors,
    headers: HeaderMap,
    status: Option<StatusCode>,
}

impl ErrorResponse {
    /// Creates a response for the given errors.
    #[must_use]
    pub fn new(errors: impl Into<Errors>) -> Self {
        Self {
            errors: errors.into(),
            headers: HeaderMap::new(),
            status: None,
        }
    }

    /// Creates a response for a single error.
    #[must_use]
    pub fn error(error: Error) -> Self {
        Self::new(error)
    }

    /// Creates a response for a list of errors.
    #[must_use]
    pub fn list(errors: ErrorList) -> Self {
        Self::new(errors)
    }

    /// Creates a response whose errors are produced by `provider`.
    #[must_use]
    pub fn provider(provider: impl ErrorProvider + 'static) -> Self {
        Self::new(Errors::Provider(Arc::new(provider)))
    }

    /// Merges `headers` into the response headers.
    ///
    /// Names present in `headers` replace existing values.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Sets a single response header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Forces the HTTP status instead of deriving it from the errors.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// The errors as given.
    #[must_use]
    pub const fn errors(&self) -> &Errors {
        &self.errors
    }

    /// The errors resolved into a list.
    #[must_use]
    pub fn to_list(&self) -> ErrorList {
        self.errors.to_list()
    }

    /// Extra response headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The HTTP status of the response.
    ///
    /// An explicit status wins; otherwise the status of the first error that
    /// carries a valid one; otherwise `500`.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
            .or_else(|| self.to_list().iter().find_map(Error::status_code))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Builds the JSON:API document.
    #[must_use]
    pub fn document(&self) -> ErrorDocument {
        ErrorDocument {
            errors: self.to_list(),
            jsonapi: JsonApiObject::default(),
        }
    }

    /// Converts into an HTTP response with a JSON body and the JSON:API
    /// content type.
    #[must_use]
    pub fn into_http_response(self) -> http::Response<String> {
        let status = self.status();
        let body = serde_json::to_string(&self.document()).unwrap_or_else(|err| {
            #[cfg(feature = "telemetry")]
            tracing::error!(error = %err, "Failed to serialize JSON:API error document");
            #[cfg(not(feature = "telemetry"))]
            drop(err);
            UNSERIALIZABLE_DOCUMENT.to_owned()
        });

        let mut response = http::Response::new(body);
        *response.status_mut() = status;
        let headers = response.headers_mut();
        headers.extend(self.headers);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(MEDIA_TYPE));
        response
    }
}

impl PartialEq for ErrorResponse {
    fn eq(&self, other: &Self) -> bool {
        self.status == other.status
            && self.headers == other.headers
            && self.to_list() == other.to_list()
    }
}
