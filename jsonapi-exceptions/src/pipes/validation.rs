//! Validation failures and the factories that turn them into errors.

use std::fmt::{self, Debug};
use std::sync::Arc;

use super::Pipe;
use crate::constants::VALIDATION_STATUS;
use crate::document::{Error, ErrorList, ErrorResponse, Source};
use crate::failure::{Failure, FailureKind};
use crate::title::TitleResolver;
use crate::validation::ValidationFailure;

/// Turns validation messages into JSON:API errors.
pub trait ErrorFactory: Send + Sync {
    /// Produces one or more errors describing `failure`.
    fn create_errors(&self, failure: &ValidationFailure) -> ErrorList;
}

/// The default [`ErrorFactory`].
///
/// Produces one `422` error per field message, pointing at the field through
/// `source.pointer`.
#[derive(Debug, Clone, Default)]
pub struct PointerErrorFactory {
    titles: TitleResolver,
}

impl PointerErrorFactory {
    /// Creates the factory.
    #[must_use]
    pub const fn new(titles: TitleResolver) -> Self {
        Self { titles }
    }
}

impl ErrorFactory for PointerErrorFactory {
    fn create_errors(&self, failure: &ValidationFailure) -> ErrorList {
        let title = self.titles.resolve(Some(VALIDATION_STATUS));
        failure
            .messages()
            .iter()
            .flat_map(|(field, messages)| {
                let pointer = json_pointer(field);
                let title = title.clone();
                messages.iter().map(move |message| {
                    Error::new()
                        .with_status(VALIDATION_STATUS)
                        .with_optional_title(title.clone())
                        .with_detail(message.clone())
                        .with_source(Source::pointer(pointer.clone()))
                })
            })
            .collect()
    }
}

/// Converts a dotted field path into a JSON pointer.
///
/// ```rust
/// use jsonapi_exceptions::pipes::json_pointer;
///
/// assert_eq!(json_pointer("data.attributes.email"), "/data/attributes/email");
/// assert_eq!(json_pointer("meta.a/b"), "/meta/a~1b");
/// assert_eq!(json_pointer(""), "");
/// ```
#[must_use]
pub fn json_pointer(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    path.split('.')
        .map(|segment| format!("/{}", segment.replace('~', "~0").replace('/', "~1")))
        .collect()
}

/// Converts validation failures using an [`ErrorFactory`].
///
/// A status override on the failure replaces the status of every produced
/// error and re-resolves its title; statuses without a canonical title lose
/// the title altogether.
#[derive(Clone)]
pub struct ValidationHandler {
    factory: Arc<dyn ErrorFactory>,
    titles: TitleResolver,
}

impl ValidationHandler {
    /// Creates the pipe.
    #[must_use]
    pub fn new(factory: impl ErrorFactory + 'static, titles: TitleResolver) -> Self {
        Self {
            factory: Arc::new(factory),
            titles,
        }
    }
}

impl Default for ValidationHandler {
    fn default() -> Self {
        let titles = TitleResolver::default();
        Self::new(PointerErrorFactory::new(titles.clone()), titles)
    }
}

impl Debug for ValidationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationHandler")
            .field("factory", &"<ErrorFactory>")
            .field("titles", &self.titles)
            .finish()
    }
}

impl Pipe for ValidationHandler {
    fn handle(&self, failure: &Failure) -> Option<ErrorResponse> {
        let FailureKind::Validation(validation) = failure.kind() else {
            return None;
        };
        let errors = self.factory.create_errors(validation);
        let errors = match validation.status().map(|status| status.as_u16()) {
            Some(status) if status != VALIDATION_STATUS => {
                let title = self.titles.resolve(Some(status));
                errors.map(|error| {
                    error
                        .with_status(status)
                        .with_optional_title(title.clone())
                })
            }
            _ => errors,
        };
        Some(ErrorResponse::list(errors))
    }
}
