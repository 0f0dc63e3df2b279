//! The failure taxonomy and cause chains.
//!
//! A [`Failure`] is what the host hands to the parser when request handling
//! goes wrong. Its [`FailureKind`] decides which pipe recognises it; the rest
//! (message, code, type name, location, frames, previous cause) feeds the
//! error objects and the debug diagnostics.

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::panic;
use std::sync::Arc;

use http::header::{ALLOW, RETRY_AFTER};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::document::{Error, ErrorList, ErrorResponse};
use crate::request::RequestContext;
use crate::trace::{self, Frame};
use crate::validation::{self, ValidationFailure};

/// A failure that already knows how to describe itself as a JSON:API
/// response.
///
/// Such failures bypass the pipes entirely and are always renderable.
pub trait PreparesResponse: Send + Sync {
    /// Builds the error response for `request`.
    fn prepare_response(&self, request: &dyn RequestContext) -> ErrorResponse;
}

/// A structured JSON:API failure carrying its own errors and headers.
///
/// ```rust
/// use jsonapi_exceptions::{Error, Failure, JsonApiException};
///
/// let failure = Failure::json_api(JsonApiException::error(
///     Error::new().with_status(418).with_detail("Hello, I'm a teapot."),
/// ));
/// assert!(failure.kind().is_json_api());
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonApiException {
    errors: ErrorList,
    headers: HeaderMap,
    status: Option<StatusCode>,
}

impl JsonApiException {
    /// Creates a failure from a list of errors.
    #[must_use]
    pub fn new(errors: ErrorList) -> Self {
        Self {
            errors,
            headers: HeaderMap::new(),
            status: None,
        }
    }

    /// Creates a failure from a single error.
    #[must_use]
    pub fn error(error: Error) -> Self {
        Self::new(ErrorList::from(error))
    }

    /// Adds response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Forces the response status.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// The errors.
    #[must_use]
    pub const fn errors(&self) -> &ErrorList {
        &self.errors
    }
}

impl PreparesResponse for JsonApiException {
    fn prepare_response(&self, _request: &dyn RequestContext) -> ErrorResponse {
        let response = ErrorResponse::list(self.errors.clone()).with_headers(self.headers.clone());
        match self.status {
            Some(status) => response.with_status(status),
            None => response,
        }
    }
}

/// The category of a failure.
#[derive(Clone)]
#[non_exhaustive]
pub enum FailureKind {
    /// The request is not authenticated.
    Authentication,
    /// A failure that carries its own HTTP status and response headers.
    Http {
        /// The status to respond with.
        status: StatusCode,
        /// Headers to add to the response.
        headers: HeaderMap,
    },
    /// The request itself is structurally invalid.
    BadRequest,
    /// The request body could not be parsed as the expected document.
    UnexpectedDocument,
    /// The request data failed validation.
    Validation(ValidationFailure),
    /// A failure that renders its own JSON:API response.
    JsonApi(Arc<dyn PreparesResponse>),
    /// Anything else.
    Unclassified,
}

impl FailureKind {
    /// Returns `true` for [`FailureKind::JsonApi`].
    #[must_use]
    pub const fn is_json_api(&self) -> bool {
        matches!(self, Self::JsonApi(_))
    }

    const fn type_name(&self) -> &'static str {
        match self {
            Self::Authentication => "AuthenticationFailure",
            Self::Http { .. } => "HttpFailure",
            Self::BadRequest => "BadRequestFailure",
            Self::UnexpectedDocument => "UnexpectedDocumentFailure",
            Self::Validation(_) => "ValidationFailure",
            Self::JsonApi(_) => "JsonApiFailure",
            Self::Unclassified => "Failure",
        }
    }
}

impl Debug for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => f.write_str("Authentication"),
            Self::Http { status, headers } => f
                .debug_struct("Http")
                .field("status", status)
                .field("headers", headers)
                .finish(),
            Self::BadRequest => f.write_str("BadRequest"),
            Self::UnexpectedDocument => f.write_str("UnexpectedDocument"),
            Self::Validation(validation) => f.debug_tuple("Validation").field(validation).finish(),
            Self::JsonApi(_) => f.debug_tuple("JsonApi").field(&"<PreparesResponse>").finish(),
            Self::Unclassified => f.write_str("Unclassified"),
        }
    }
}

/// Where a failure was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Source file.
    pub file: String,
    /// Line in `file`.
    pub line: u32,
}

impl Location {
    /// Creates a location.
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl From<&panic::Location<'_>> for Location {
    fn from(location: &panic::Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

/// A failure raised while handling a request.
///
/// Constructors record the caller's source location. Causes are linked
/// through [`Failure::with_previous`] and walked outermost first by
/// [`Failure::chain`].
#[derive(Debug, Clone)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    code: i64,
    type_name: String,
    location: Option<Location>,
    trace: Vec<Frame>,
    previous: Option<Box<Failure>>,
    error: Option<Arc<dyn StdError + Send + Sync>>,
}

impl Failure {
    /// Creates a failure of the given kind.
    #[must_use]
    #[track_caller]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            type_name: kind.type_name().to_owned(),
            kind,
            message: message.into(),
            code: 0,
            location: Some(Location::from(panic::Location::caller())),
            trace: Vec::new(),
            previous: None,
            error: None,
        }
    }

    /// An unauthenticated request.
    #[must_use]
    #[track_caller]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Authentication, message)
    }

    /// A failure carrying an HTTP status.
    #[must_use]
    #[track_caller]
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(
            FailureKind::Http {
                status,
                headers: HeaderMap::new(),
            },
            message,
        )
    }

    /// No route or resource matched.
    #[must_use]
    #[track_caller]
    pub fn not_found() -> Self {
        Self::http(StatusCode::NOT_FOUND, "")
    }

    /// The route exists but not for this method. Sets the `Allow` header.
    #[must_use]
    #[track_caller]
    pub fn method_not_allowed(allowed: &[Method]) -> Self {
        let allow = allowed
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let failure = Self::http(StatusCode::METHOD_NOT_ALLOWED, "");
        match HeaderValue::from_str(&allow) {
            Ok(value) => failure.with_header(ALLOW, value),
            Err(_) => failure,
        }
    }

    /// The authenticated user may not perform the action.
    #[must_use]
    #[track_caller]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::http(StatusCode::FORBIDDEN, message)
    }

    /// The session's CSRF token did not match (status `419`).
    #[must_use]
    #[track_caller]
    pub fn token_mismatch(message: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(419).unwrap_or(StatusCode::FORBIDDEN);
        Self::http(status, message)
    }

    /// The application is down for maintenance. Sets `Retry-After` when
    /// `retry_after` seconds are given.
    #[must_use]
    #[track_caller]
    pub fn service_unavailable(message: impl Into<String>, retry_after: Option<u64>) -> Self {
        let failure = Self::http(StatusCode::SERVICE_UNAVAILABLE, message);
        match retry_after {
            Some(seconds) => failure.with_header(RETRY_AFTER, HeaderValue::from(seconds)),
            None => failure,
        }
    }

    /// A structurally invalid request.
    #[must_use]
    #[track_caller]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(FailureKind::BadRequest, message)
    }

    /// A request body that is not the expected document.
    #[must_use]
    #[track_caller]
    pub fn unexpected_document(message: impl Into<String>) -> Self {
        Self::new(FailureKind::UnexpectedDocument, message)
    }

    /// A request body that is not valid JSON.
    ///
    /// The parse error becomes the previous cause, so its code and message
    /// surface in the rendered error.
    #[must_use]
    #[track_caller]
    pub fn invalid_json(error: serde_json::Error) -> Self {
        Self::unexpected_document("Expecting JSON to decode.")
            .with_previous(Self::from_json_error(error))
    }

    /// Wraps a JSON parse error.
    #[must_use]
    #[track_caller]
    pub fn from_json_error(error: serde_json::Error) -> Self {
        let code = json_error_code(&error);
        Self::from_error(error).with_code(code)
    }

    /// Request data that failed validation.
    #[must_use]
    #[track_caller]
    pub fn validation(failure: ValidationFailure) -> Self {
        Self::new(FailureKind::Validation(failure), validation::DEFAULT_MESSAGE)
    }

    /// A failure that renders its own JSON:API response.
    #[must_use]
    #[track_caller]
    pub fn json_api(exception: impl PreparesResponse + 'static) -> Self {
        Self::new(FailureKind::JsonApi(Arc::new(exception)), "JSON:API error")
    }

    /// Any other failure.
    #[must_use]
    #[track_caller]
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unclassified, message)
    }

    /// Wraps an arbitrary error as an unclassified failure.
    ///
    /// The error's `source()` chain becomes the chain of previous causes and
    /// the current backtrace is captured (subject to `RUST_BACKTRACE`). The
    /// original error stays reachable through [`Failure::error`].
    #[must_use]
    #[track_caller]
    pub fn from_error<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let mut failure = Self::unclassified(error.to_string())
            .with_type_name(std::any::type_name::<E>())
            .with_trace(trace::capture());
        failure.previous = error.source().map(|source| Box::new(Self::from_source(source)));
        failure.error = Some(Arc::new(error));
        failure
    }

    fn from_source(error: &(dyn StdError + 'static)) -> Self {
        let (type_name, code) = if let Some(json) = error.downcast_ref::<serde_json::Error>() {
            (std::any::type_name::<serde_json::Error>(), json_error_code(json))
        } else if let Some(io) = error.downcast_ref::<std::io::Error>() {
            (
                std::any::type_name::<std::io::Error>(),
                io.raw_os_error().map_or(0, i64::from),
            )
        } else {
            ("dyn core::error::Error", 0)
        };
        Self {
            kind: FailureKind::Unclassified,
            message: error.to_string(),
            code,
            type_name: type_name.to_owned(),
            location: None,
            trace: Vec::new(),
            previous: error.source().map(|source| Box::new(Self::from_source(source))),
            error: None,
        }
    }

    /// Sets the numeric code.
    #[must_use]
    pub const fn with_code(mut self, code: i64) -> Self {
        self.code = code;
        self
    }

    /// Sets the type name reported in debug diagnostics.
    #[must_use]
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = type_name.into();
        self
    }

    /// Sets where the failure was raised.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Replaces the call frames.
    #[must_use]
    pub fn with_trace(mut self, trace: Vec<Frame>) -> Self {
        self.trace = trace;
        self
    }

    /// Appends a call frame.
    #[must_use]
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.trace.push(frame);
        self
    }

    /// Sets the previous cause.
    #[must_use]
    pub fn with_previous(mut self, previous: Self) -> Self {
        self.previous = Some(Box::new(previous));
        self
    }

    /// Adds a response header. Only meaningful for HTTP failures; other kinds
    /// ignore it.
    #[must_use]
    pub fn with_header(mut self, name: http::HeaderName, value: HeaderValue) -> Self {
        if let FailureKind::Http { headers, .. } = &mut self.kind {
            headers.insert(name, value);
        }
        self
    }

    /// The category.
    #[must_use]
    pub const fn kind(&self) -> &FailureKind {
        &self.kind
    }

    /// The message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The numeric code, `0` if none was set.
    #[must_use]
    pub const fn code(&self) -> i64 {
        self.code
    }

    /// The type name reported in debug diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Where the failure was raised.
    #[must_use]
    pub const fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// The call frames, innermost first.
    #[must_use]
    pub fn trace(&self) -> &[Frame] {
        &self.trace
    }

    /// The previous cause.
    #[must_use]
    pub fn previous(&self) -> Option<&Self> {
        self.previous.as_deref()
    }

    /// The wrapped error, for pipes that recognise failures by their
    /// concrete error type.
    #[must_use]
    pub fn error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.error.as_deref()
    }

    /// Downcasts the wrapped error.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.error()?.downcast_ref::<E>()
    }

    /// Returns `true` if this failure wraps a JSON parse error.
    #[must_use]
    pub fn is_json_error(&self) -> bool {
        self.downcast_ref::<serde_json::Error>().is_some()
            || self.type_name == std::any::type_name::<serde_json::Error>()
    }

    /// Iterates over this failure and its previous causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |failure| failure.previous())
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            f.write_str(&self.type_name)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.previous.as_deref().map(|previous| previous as &(dyn StdError + 'static))
    }
}

impl From<ValidationFailure> for Failure {
    #[track_caller]
    fn from(failure: ValidationFailure) -> Self {
        Self::validation(failure)
    }
}

impl From<JsonApiException> for Failure {
    #[track_caller]
    fn from(exception: JsonApiException) -> Self {
        Self::json_api(exception)
    }
}

/// Numeric code for a JSON parse error.
///
/// Syntax and premature-EOF errors report `4`, the conventional code for a
/// JSON syntax error; data and I/O errors report `0`.
fn json_error_code(error: &serde_json::Error) -> i64 {
    match error.classify() {
        serde_json::error::Category::Syntax | serde_json::error::Category::Eof => 4,
        serde_json::error::Category::Data | serde_json::error::Category::Io => 0,
    }
}
