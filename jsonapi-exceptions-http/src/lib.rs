#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Axum and tower integration for [`jsonapi_exceptions`].
//!
//! Handlers return [`ApiFailure`] as their error type. On its own an
//! `ApiFailure` renders the way a plain axum application would: a text body
//! with the failure's status. Wrapping the router in [`JsonApiErrorLayer`]
//! lets the parser replace that response with a JSON:API error document
//! whenever the request asks for one.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use jsonapi_exceptions::ExceptionParser;
//! use jsonapi_exceptions_http::JsonApiErrorLayer;
//!
//! let layer = JsonApiErrorLayer::new(Arc::new(ExceptionParser::new().accepts_json()));
//! # let _ = layer;
//! ```
//!
//! # Modules
//!
//! - [`failure`] - The handler error type and its native rendering
//! - [`layer`] - The tower layer that renders failures as JSON:API
//! - [`request`] - `Accept` negotiation and route middleware
//! - [`response`] - Axum response wrapper for rendered documents
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod failure;
pub mod layer;
pub mod request;
pub mod response;

pub use failure::ApiFailure;
pub use layer::{JsonApiErrorLayer, JsonApiErrorService};
pub use request::{HttpRequestContext, RouteMiddleware, acceptable_content_types};
pub use response::JsonApiResponse;
