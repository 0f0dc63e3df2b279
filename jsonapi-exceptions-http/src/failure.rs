//! The handler error type and its native rendering.

use std::fmt::{self, Display};
use std::sync::Arc;

use axum_core::body::Body;
use axum_core::response::{IntoResponse, Response};
use http::header::CONTENT_TYPE;
use http::{HeaderValue, StatusCode};
use jsonapi_exceptions::constants::VALIDATION_STATUS;
use jsonapi_exceptions::{Failure, FailureKind, RequestInfo};

/// Error type for axum handlers.
///
/// Converting into a response produces the plain rendering an application
/// would give without JSON:API support and stashes the failure in the
/// response extensions, where [`JsonApiErrorLayer`](crate::JsonApiErrorLayer)
/// picks it up.
#[derive(Debug, Clone)]
pub struct ApiFailure(pub Arc<Failure>);

impl ApiFailure {
    /// Wraps an arbitrary error, keeping its cause chain.
    #[must_use]
    #[track_caller]
    pub fn from_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::from(Failure::from_error(error))
    }

    /// The wrapped failure.
    #[must_use]
    pub fn failure(&self) -> &Failure {
        &self.0
    }

    /// The status of the native rendering.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            FailureKind::Authentication => StatusCode::UNAUTHORIZED,
            FailureKind::Http { status, .. } => *status,
            FailureKind::BadRequest | FailureKind::UnexpectedDocument => StatusCode::BAD_REQUEST,
            FailureKind::Validation(validation) => validation.status().unwrap_or_else(|| {
                StatusCode::from_u16(VALIDATION_STATUS).unwrap_or(StatusCode::BAD_REQUEST)
            }),
            FailureKind::JsonApi(exception) => {
                exception.prepare_response(&RequestInfo::new()).status()
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Failure> for ApiFailure {
    fn from(failure: Failure) -> Self {
        Self(Arc::new(failure))
    }
}

impl Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ApiFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.0.as_ref())
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if self.0.message().is_empty() {
            status.canonical_reason().unwrap_or_default().to_owned()
        } else {
            self.0.message().to_owned()
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        let headers = response.headers_mut();
        if let FailureKind::Http { headers: extra, .. } = self.0.kind() {
            headers.extend(extra.clone());
        }
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response.extensions_mut().insert(self);
        response
    }
}
