#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Translate request failures into JSON:API error documents.
//!
//! This crate sits between an application's request handling and its HTTP
//! response layer. Given a [`Failure`] and the originating request it decides
//! whether a JSON:API error response is wanted and, if so, converts the
//! failure into one or more structured error objects.
//!
//! # Overview
//!
//! The [`ExceptionParser`] owns an ordered chain of [`pipes`]. Each pipe
//! recognises one category of failure (authentication, HTTP status,
//! malformed request, unexpected document, validation) and produces an
//! [`ErrorResponse`]. The first pipe that recognises a failure wins. Failures
//! nobody recognises reach the [`fallback`], which produces a generic
//! `500 Internal Server Error`, optionally enriched with diagnostics when
//! debug mode is on.
//!
//! Whether a failure is intercepted at all is governed by the parser's
//! acceptance policy: the request's preferred media type, registered
//! predicates, route middleware, or an always-render switch.
//!
//! ```rust
//! use jsonapi_exceptions::{ExceptionParser, Failure, RequestInfo};
//!
//! let parser = ExceptionParser::new();
//! let request = RequestInfo::new().with_accept(["application/vnd.api+json"]);
//! let failure = Failure::not_found();
//!
//! let response = parser.render(&failure, &request).expect("renderable");
//! assert_eq!(response.status(), 404);
//! ```
//!
//! # Modules
//!
//! - [`constants`] - Media type and protocol version
//! - [`config`] - File and environment based parser configuration
//! - [`document`] - Error objects, error lists and error responses
//! - [`failure`] - The failure taxonomy and cause chains
//! - [`fallback`] - The terminal default handler
//! - [`parser`] - The orchestrating [`ExceptionParser`]
//! - [`pipes`] - Failure-category handlers
//! - [`request`] - The request abstraction used by the acceptance policy
//! - [`title`] - Status code to title resolution
//! - [`trace`] - Call frames for debug diagnostics
//! - [`translation`] - String lookup for titles and details
//! - [`validation`] - Validation message bags
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod config;
pub mod constants;
pub mod document;
pub mod failure;
pub mod fallback;
pub mod parser;
pub mod pipes;
pub mod request;
pub mod title;
pub mod trace;
pub mod translation;
pub mod validation;

pub use config::{ConfigError, ExceptionConfig};
pub use document::{Error, ErrorDocument, ErrorList, ErrorProvider, ErrorResponse, Errors, Source};
pub use failure::{Failure, FailureKind, JsonApiException, Location, PreparesResponse};
pub use parser::{AcceptPredicate, ExceptionParser};
pub use pipes::Pipe;
pub use request::{RequestContext, RequestInfo};
pub use title::TitleResolver;
pub use trace::Frame;
pub use translation::{Catalog, Identity, Translator};
pub use validation::{MessageBag, ValidationFailure};
