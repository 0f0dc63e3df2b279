//! The tower layer that renders failures as JSON:API.
//!
//! [`JsonApiErrorLayer`] wraps a router or handler. When the inner service
//! answers with a response carrying an [`ApiFailure`], the layer asks the
//! [`ExceptionParser`] to render it for the original request. If the parser
//! declines, the native response is returned unchanged.
//!
//! A rendered response keeps the native response's extensions and any
//! headers it does not set itself, so headers added by the handler or by
//! inner middleware (request ids, cookies, ...) are not lost. The native
//! `Content-Type` and `Content-Length` always give way to the rendered body.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use jsonapi_exceptions::{ExceptionConfig, ExceptionParser};
//! use jsonapi_exceptions_http::JsonApiErrorLayer;
//!
//! let config = ExceptionConfig::load().expect("valid configuration");
//! let layer = JsonApiErrorLayer::new(Arc::new(ExceptionParser::from_config(&config)));
//! # let _ = layer;
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum_core::extract::Request;
use axum_core::response::{IntoResponse, Response};
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::response::Parts;
use jsonapi_exceptions::ExceptionParser;
use tower::util::BoxCloneSyncService;
use tower::{Layer, Service};

#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::failure::ApiFailure;
use crate::request::HttpRequestContext;
use crate::response::JsonApiResponse;

/// Layer that renders [`ApiFailure`] responses through an [`ExceptionParser`].
#[derive(Debug, Clone)]
pub struct JsonApiErrorLayer {
    parser: Arc<ExceptionParser>,
}

impl JsonApiErrorLayer {
    /// Creates the layer.
    #[must_use]
    pub const fn new(parser: Arc<ExceptionParser>) -> Self {
        Self { parser }
    }

    /// The parser used for rendering.
    #[must_use]
    pub fn parser(&self) -> &ExceptionParser {
        &self.parser
    }
}

impl Default for JsonApiErrorLayer {
    fn default() -> Self {
        Self::new(Arc::new(ExceptionParser::new()))
    }
}

impl<S> Layer<S> for JsonApiErrorLayer
where
    S: Service<Request, Response = Response, Error = Infallible> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
{
    type Service = JsonApiErrorService;

    fn layer(&self, inner: S) -> Self::Service {
        JsonApiErrorService {
            parser: Arc::clone(&self.parser),
            inner: BoxCloneSyncService::new(inner),
        }
    }
}

/// Service produced by [`JsonApiErrorLayer`].
#[derive(Clone)]
#[allow(missing_debug_implementations)] // BoxCloneSyncService does not implement Debug
pub struct JsonApiErrorService {
    /// Renders intercepted failures
    parser: Arc<ExceptionParser>,
    /// The wrapped service
    inner: BoxCloneSyncService<Request, Response, Infallible>,
}

impl Service<Request> for JsonApiErrorService {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let parser = Arc::clone(&self.parser);
        let context = HttpRequestContext::from_request(&req);
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let response = inner.call(req).await?;
            Ok(render(&parser, &context, response))
        })
    }
}

/// Replaces a native failure response with its JSON:API rendering.
#[cfg_attr(
    feature = "telemetry",
    instrument(name = "jsonapi.render_failure", skip_all)
)]
fn render(parser: &ExceptionParser, context: &HttpRequestContext, mut response: Response) -> Response {
    let Some(failure) = response.extensions_mut().remove::<ApiFailure>() else {
        return response;
    };
    match parser.render(failure.failure(), context) {
        Some(rendered) => {
            #[cfg(feature = "telemetry")]
            tracing::debug!(status = %rendered.status(), "Rendered failure as JSON:API");
            let (native, _) = response.into_parts();
            let mut rendered = JsonApiResponse(rendered).into_response();
            carry_over(native, &mut rendered);
            rendered
        }
        None => response,
    }
}

/// Moves the native response's extensions and extra headers onto `rendered`.
fn carry_over(native: Parts, rendered: &mut Response) {
    for name in native.headers.keys() {
        if name == CONTENT_TYPE || name == CONTENT_LENGTH || rendered.headers().contains_key(name) {
            continue;
        }
        for value in native.headers.get_all(name) {
            rendered.headers_mut().append(name.clone(), value.clone());
        }
    }
    rendered.extensions_mut().extend(native.extensions);
}
