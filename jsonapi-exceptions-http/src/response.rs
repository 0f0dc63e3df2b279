//! Axum response wrapper for rendered documents.

use axum_core::body::Body;
use axum_core::response::{IntoResponse, Response};
use jsonapi_exceptions::ErrorResponse;

/// A rendered JSON:API error document.
///
/// Lets handlers return an [`ErrorResponse`] directly, bypassing the parser.
#[derive(Debug)]
pub struct JsonApiResponse(pub http::Response<String>);

impl From<ErrorResponse> for JsonApiResponse {
    fn from(response: ErrorResponse) -> Self {
        Self(response.into_http_response())
    }
}

impl From<http::Response<String>> for JsonApiResponse {
    fn from(response: http::Response<String>) -> Self {
        Self(response)
    }
}

impl IntoResponse for JsonApiResponse {
    fn into_response(self) -> Response {
        self.0.map(Body::from)
    }
}
