//! The pipe for failures that carry their own HTTP status.

use super::Pipe;
use crate::document::{Error, ErrorResponse};
use crate::failure::{Failure, FailureKind};
use crate::title::TitleResolver;

/// Converts failures that carry an HTTP status.
///
/// The failure's headers (`Allow`, `Retry-After`, ...) are copied onto the
/// response. No other pipe propagates headers.
#[derive(Debug, Clone, Default)]
pub struct HttpHandler {
    titles: TitleResolver,
}

impl HttpHandler {
    /// Creates the pipe.
    #[must_use]
    pub const fn new(titles: TitleResolver) -> Self {
        Self { titles }
    }
}

impl Pipe for HttpHandler {
    fn handle(&self, failure: &Failure) -> Option<ErrorResponse> {
        let FailureKind::Http { status, headers } = failure.kind() else {
            return None;
        };
        let status = status.as_u16();
        let error = Error::new()
            .with_status(status)
            .with_optional_title(self.titles.resolve(Some(status)))
            .with_detail(self.titles.translate(failure.message()));
        Some(ErrorResponse::error(error).with_headers(headers.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::Catalog;
    use http::header::{ALLOW, RETRY_AFTER};
    use http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    fn errors(response: &ErrorResponse) -> serde_json::Value {
        serde_json::to_value(response.to_list()).unwrap()
    }

    #[test]
    fn test_not_found() {
        let response = HttpHandler::default().handle(&Failure::not_found()).unwrap();
        assert_eq!(errors(&response), json!([{ "status": "404", "title": "Not Found" }]));
    }

    #[test]
    fn test_teapot_without_detail() {
        let failure = Failure::http(StatusCode::IM_A_TEAPOT, "");
        let response = HttpHandler::default().handle(&failure).unwrap();
        assert_eq!(errors(&response), json!([{ "status": "418", "title": "I'm a teapot" }]));
    }

    #[test]
    fn test_method_not_allowed_keeps_headers() {
        let failure = Failure::method_not_allowed(&[Method::GET]);
        let response = HttpHandler::default().handle(&failure).unwrap();
        assert_eq!(response.headers()[ALLOW], "GET");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[test]
    fn test_maintenance_mode() {
        let failure = Failure::service_unavailable("We are down for maintenance.", Some(30));
        let response = HttpHandler::default().handle(&failure).unwrap();
        assert_eq!(
            errors(&response),
            json!([{
                "status": "503",
                "title": "Service Unavailable",
                "detail": "We are down for maintenance.",
            }])
        );
        assert_eq!(response.headers()[RETRY_AFTER], "30");
    }

    #[test]
    fn test_token_mismatch_has_no_title() {
        let response = HttpHandler::default()
            .handle(&Failure::token_mismatch("CSRF token mismatch."))
            .unwrap();
        assert_eq!(
            errors(&response),
            json!([{ "status": "419", "detail": "CSRF token mismatch." }])
        );
    }

    #[test]
    fn test_title_and_detail_are_translated() {
        let catalog = Catalog::new()
            .with("Forbidden", "Interdit")
            .with("Not yours.", "Pas à vous.");
        let handler = HttpHandler::new(TitleResolver::new(Arc::new(catalog)));
        let response = handler.handle(&Failure::forbidden("Not yours.")).unwrap();
        assert_eq!(
            errors(&response),
            json!([{ "status": "403", "title": "Interdit", "detail": "Pas à vous." }])
        );
    }
}
