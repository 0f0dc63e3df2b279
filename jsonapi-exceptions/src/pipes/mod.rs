//! Failure-category handlers.
//!
//! A pipe is one link of the parser's handler chain. It inspects a
//! [`Failure`] and either produces the [`ErrorResponse`] for it or passes by
//! returning `None`, in which case the next pipe is tried.
//!
//! The default chain, in order:
//!
//! 1. [`AuthenticationHandler`] - `401 Unauthorized`
//! 2. [`HttpHandler`] - the failure's own status and headers
//! 3. [`RequestHandler`] - `400 Bad Request`
//! 4. [`UnexpectedDocumentHandler`] - `400` with an `Invalid JSON` title
//! 5. [`ValidationHandler`] - one `422` error per validation message

mod authentication;
mod status;
mod request;
mod unexpected_document;
mod validation;

pub use authentication::AuthenticationHandler;
pub use status::HttpHandler;
pub use request::RequestHandler;
pub use unexpected_document::UnexpectedDocumentHandler;
pub use validation::{ErrorFactory, PointerErrorFactory, ValidationHandler, json_pointer};

use std::sync::Arc;

use crate::document::ErrorResponse;
use crate::failure::Failure;
use crate::title::TitleResolver;

/// A link in the handler chain.
///
/// Implementations must be cheap to call and side-effect free: the parser may
/// run the same failure through the chain more than once.
pub trait Pipe: Send + Sync {
    /// Converts `failure` if this pipe recognises it.
    fn handle(&self, failure: &Failure) -> Option<ErrorResponse>;

    /// Name used in diagnostics.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl<F> Pipe for F
where
    F: Fn(&Failure) -> Option<ErrorResponse> + Send + Sync,
{
    fn handle(&self, failure: &Failure) -> Option<ErrorResponse> {
        self(failure)
    }
}

/// Builds the default chain.
///
/// The unexpected-document pipe is included only when `unexpected_document`
/// is set.
#[must_use]
pub fn defaults(titles: &TitleResolver, unexpected_document: bool) -> Vec<Arc<dyn Pipe>> {
    let mut pipes: Vec<Arc<dyn Pipe>> = vec![
        Arc::new(AuthenticationHandler::new(titles.clone())),
        Arc::new(HttpHandler::new(titles.clone())),
        Arc::new(RequestHandler::new(titles.clone())),
    ];
    if unexpected_document {
        pipes.push(Arc::new(UnexpectedDocumentHandler::new(titles.clone())));
    }
    pipes.push(Arc::new(ValidationHandler::new(
        PointerErrorFactory::new(titles.clone()),
        titles.clone(),
    )));
    pipes
}
