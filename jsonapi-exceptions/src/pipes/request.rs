//! The `400 Bad Request` pipe for structurally invalid requests.

use http::StatusCode;

use super::Pipe;
use crate::document::{Error, ErrorResponse};
use crate::failure::{Failure, FailureKind};
use crate::title::TitleResolver;

/// Converts malformed-request failures into `400 Bad Request`.
#[derive(Debug, Clone, Default)]
pub struct RequestHandler {
    titles: TitleResolver,
}

impl RequestHandler {
    /// Creates the pipe.
    #[must_use]
    pub const fn new(titles: TitleResolver) -> Self {
        Self { titles }
    }
}

impl Pipe for RequestHandler {
    fn handle(&self, failure: &Failure) -> Option<ErrorResponse> {
        if !matches!(failure.kind(), FailureKind::BadRequest) {
            return None;
        }
        let status = StatusCode::BAD_REQUEST.as_u16();
        Some(ErrorResponse::error(
            Error::new()
                .with_status(status)
                .with_optional_title(self.titles.resolve(Some(status)))
                .with_detail(self.titles.translate(failure.message())),
        ))
    }
}
