//! The `401 Unauthorized` pipe.

use http::StatusCode;

use super::Pipe;
use crate::document::{Error, ErrorResponse};
use crate::failure::{Failure, FailureKind};
use crate::title::TitleResolver;

/// Converts authentication failures into `401 Unauthorized`.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationHandler {
    titles: TitleResolver,
}

impl AuthenticationHandler {
    /// Creates the pipe.
    #[must_use]
    pub const fn new(titles: TitleResolver) -> Self {
        Self { titles }
    }
}

impl Pipe for AuthenticationHandler {
    fn handle(&self, failure: &Failure) -> Option<ErrorResponse> {
        if !matches!(failure.kind(), FailureKind::Authentication) {
            return None;
        }
        let status = StatusCode::UNAUTHORIZED.as_u16();
        Some(ErrorResponse::error(
            Error::new()
                .with_status(status)
                .with_optional_title(self.titles.resolve(Some(status)))
                .with_detail(self.titles.translate(failure.message())),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unauthenticated() {
        let response = AuthenticationHandler::default()
            .handle(&Failure::authentication("Unauthenticated."))
            .unwrap();
        assert_eq!(
            serde_json::to_value(response.to_list()).unwrap(),
            json!([{ "status": "401", "title": "Unauthorized", "detail": "Unauthenticated." }])
        );
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_passes_other_failures() {
        assert!(AuthenticationHandler::default().handle(&Failure::bad_request("x")).is_none());
    }
}
