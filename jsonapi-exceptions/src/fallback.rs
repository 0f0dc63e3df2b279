//! The terminal default handler.
//!
//! Failures no pipe recognises end up here and always produce a response.

use http::StatusCode;
use serde_json::{Map, Value};

use crate::document::{Error, ErrorList, ErrorResponse};
use crate::failure::Failure;
use crate::title::TitleResolver;

/// Produces `500 Internal Server Error` responses for unrecognised failures.
///
/// With a default error configured, that error is returned as-is. Otherwise
/// every level of the cause chain, outermost first, becomes one error. Debug
/// mode adds the code, message, type name, location and call frames of each
/// level.
#[derive(Debug, Clone, Default)]
pub struct Fallback {
    titles: TitleResolver,
    default: Option<Error>,
    debug: bool,
}

impl Fallback {
    /// Creates a fallback without a default error and with debug off.
    #[must_use]
    pub const fn new(titles: TitleResolver) -> Self {
        Self {
            titles,
            default: None,
            debug: false,
        }
    }

    /// Uses `error` for every unrecognised failure.
    #[must_use]
    pub fn with_default(mut self, error: Option<Error>) -> Self {
        self.default = error;
        self
    }

    /// Turns diagnostic output on or off.
    #[must_use]
    pub const fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Whether diagnostic output is on.
    #[must_use]
    pub const fn is_debug(&self) -> bool {
        self.debug
    }

    /// Converts `failure`.
    #[must_use]
    pub fn handle(&self, failure: &Failure) -> ErrorResponse {
        if let Some(error) = &self.default {
            return ErrorResponse::error(error.clone());
        }
        let errors: ErrorList = failure.chain().map(|level| self.to_error(level)).collect();
        ErrorResponse::list(errors)
    }

    fn to_error(&self, failure: &Failure) -> Error {
        let status = StatusCode::INTERNAL_SERVER_ERROR.as_u16();
        let error = Error::new()
            .with_status(status)
            .with_optional_title(self.titles.resolve(Some(status)));
        if !self.debug {
            return error;
        }
        error
            .with_code(failure.code().to_string())
            .with_detail(failure.message())
            .with_meta(diagnostics(failure))
    }
}

fn diagnostics(failure: &Failure) -> Map<String, Value> {
    let (file, line) = failure.location().map_or((Value::Null, Value::Null), |location| {
        (location.file.clone().into(), location.line.into())
    });
    let trace = failure
        .trace()
        .iter()
        .map(|frame| Value::Object(frame.without_args()))
        .collect();

    let mut meta = Map::new();
    meta.insert("exception".to_owned(), failure.type_name().into());
    meta.insert("file".to_owned(), file);
    meta.insert("line".to_owned(), line);
    meta.insert("trace".to_owned(), Value::Array(trace));
    meta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Location;
    use crate::trace::Frame;
    use serde_json::json;

    fn chain() -> Failure {
        Failure::unclassified("Boom!")
            .with_code(99)
            .with_type_name("LogicException")
            .with_location(Location::new("src/orders.rs", 12))
            .with_trace(vec![
                Frame::function("app::orders::store")
                    .with("line", 12)
                    .with("args", json!(["password"])),
            ])
            .with_previous(
                Failure::unclassified("Invalid state.")
                    .with_type_name("RuntimeException")
                    .with_previous(Failure::unclassified("Disk full.")),
            )
    }

    #[test]
    fn test_debug_off_hides_diagnostics() {
        let response = Fallback::default().handle(&chain());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            serde_json::to_value(response.to_list()).unwrap(),
            json!([
                { "status": "500", "title": "Internal Server Error" },
                { "status": "500", "title": "Internal Server Error" },
                { "status": "500", "title": "Internal Server Error" },
            ])
        );
    }

    #[test]
    fn test_default_error_wins() {
        let template = Error::new()
            .with_status(500)
            .with_title("Internal Server Error")
            .with_detail("Something went wrong.");
        let response = Fallback::default()
            .with_default(Some(template.clone()))
            .with_debug(true)
            .handle(&chain());
        assert_eq!(response.to_list().into_vec(), vec![template]);
    }

    #[test]
    fn test_debug_on_exposes_every_level() {
        let response = Fallback::default().with_debug(true).handle(&chain());
        let errors = serde_json::to_value(response.to_list()).unwrap();

        assert_eq!(
            errors[0],
            json!({
                "status": "500",
                "code": "99",
                "title": "Internal Server Error",
                "detail": "Boom!",
                "meta": {
                    "exception": "LogicException",
                    "file": "src/orders.rs",
                    "line": 12,
                    "trace": [{ "function": "app::orders::store", "line": 12 }],
                },
            })
        );
        assert_eq!(errors[1]["detail"], "Invalid state.");
        assert_eq!(errors[1]["code"], "0");
        assert_eq!(errors[1]["meta"]["exception"], "RuntimeException");
        assert_eq!(errors[2]["detail"], "Disk full.");
        assert_eq!(errors.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_debug_on_for_error_sources() {
        #[derive(Debug, thiserror::Error)]
        #[error("could not render the receipt")]
        struct ReceiptError(#[source] std::fmt::Error);

        let failure = Failure::from_error(ReceiptError(std::fmt::Error)).with_trace(Vec::new());
        let response = Fallback::default().with_debug(true).handle(&failure);
        let errors = serde_json::to_value(response.to_list()).unwrap();

        assert!(errors[0]["meta"]["file"].is_string());
        assert_eq!(errors[0]["meta"]["trace"], json!([]));
        assert_eq!(errors[1]["meta"]["file"], Value::Null);
        assert_eq!(errors[1]["meta"]["line"], Value::Null);
        assert_eq!(errors[1]["meta"]["exception"], "dyn core::error::Error");
    }
}
