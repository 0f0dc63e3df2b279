//! The pipe for request bodies that are not a readable document.

use http::StatusCode;

use super::Pipe;
use crate::constants::INVALID_JSON_TITLE;
use crate::document::{Error, ErrorResponse};
use crate::failure::{Failure, FailureKind};
use crate::title::TitleResolver;

/// Converts request bodies that could not be read as a document.
///
/// When the failure was caused by a JSON parse error, that error's code and
/// message are reported instead of the wrapper's.
#[derive(Debug, Clone, Default)]
pub struct UnexpectedDocumentHandler {
    titles: TitleResolver,
}

impl UnexpectedDocumentHandler {
    /// Creates the pipe.
    #[must_use]
    pub const fn new(titles: TitleResolver) -> Self {
        Self { titles }
    }
}

impl Pipe for UnexpectedDocumentHandler {
    fn handle(&self, failure: &Failure) -> Option<ErrorResponse> {
        if !matches!(failure.kind(), FailureKind::UnexpectedDocument) {
            return None;
        }
        let error = Error::new()
            .with_status(StatusCode::BAD_REQUEST.as_u16())
            .with_title(self.titles.translate(INVALID_JSON_TITLE));

        let error = match failure.previous().filter(|previous| previous.is_json_error()) {
            Some(json) => error
                .with_code(json.code().to_string())
                .with_detail(self.titles.translate(json.message())),
            None => error.with_detail(self.titles.translate(failure.message())),
        };
        Some(ErrorResponse::error(error))
    }
}
