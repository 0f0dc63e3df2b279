//! The orchestrating [`ExceptionParser`].
//!
//! The parser decides whether a failure should be rendered as JSON:API and,
//! if so, runs it through the handler chain, falling back to the
//! [`Fallback`] when no pipe recognises it.

use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::config::ExceptionConfig;
use crate::constants::MEDIA_TYPE;
use crate::document::{Error, ErrorResponse};
use crate::failure::{Failure, FailureKind};
use crate::fallback::Fallback;
use crate::pipes::{self, Pipe};
use crate::request::RequestContext;
use crate::title::TitleResolver;
use crate::translation::Translator;

/// Decides whether a failure is rendered as JSON:API.
pub type AcceptPredicate = Arc<dyn Fn(&Failure, &dyn RequestContext) -> bool + Send + Sync>;

/// Converts failures into JSON:API error responses.
///
/// Configuration methods consume the parser, so a parser shared behind an
/// [`Arc`] cannot change under its users.
///
/// ```rust
/// use jsonapi_exceptions::{ExceptionParser, Failure, RequestInfo};
///
/// let parser = ExceptionParser::new().accepts_json().with_debug(false);
///
/// let api = RequestInfo::new().with_accept(["application/json"]);
/// let browser = RequestInfo::new().with_accept(["text/html"]);
/// let failure = Failure::bad_request("Missing page parameter.");
///
/// assert!(parser.is_renderable(&failure, &api));
/// assert!(!parser.is_renderable(&failure, &browser));
/// assert_eq!(parser.parse(&failure, &api).status(), 400);
/// ```
#[derive(Clone)]
pub struct ExceptionParser {
    pipes: Vec<Arc<dyn Pipe>>,
    accept: Vec<AcceptPredicate>,
    always_render: bool,
    fallback: Fallback,
    titles: TitleResolver,
}

impl ExceptionParser {
    /// Creates a parser with the default chain and no acceptance predicates.
    #[must_use]
    pub fn new() -> Self {
        Self::with_titles(TitleResolver::default(), true)
    }

    fn with_titles(titles: TitleResolver, unexpected_document: bool) -> Self {
        Self {
            pipes: pipes::defaults(&titles, unexpected_document),
            accept: Vec::new(),
            always_render: false,
            fallback: Fallback::new(titles.clone()),
            titles,
        }
    }

    /// Creates a parser whose titles and details are translated by
    /// `translator`.
    #[must_use]
    pub fn with_translator(translator: Arc<dyn Translator>) -> Self {
        Self::with_titles(TitleResolver::new(translator), true)
    }

    /// Creates a parser from configuration.
    #[must_use]
    pub fn from_config(config: &ExceptionConfig) -> Self {
        let titles = if config.translations.is_empty() {
            TitleResolver::default()
        } else {
            TitleResolver::new(Arc::new(config.translations.clone()))
        };
        let mut parser = Self::with_titles(titles, config.unexpected_document)
            .with_debug(config.debug);
        if let Some(error) = &config.default_error {
            parser = parser.with_default(error.clone());
        }
        if config.always_render {
            parser = parser.always_render();
        }
        if config.accept_json {
            parser = parser.accepts_json();
        }
        if !config.accept_middleware.is_empty() {
            parser = parser.accepts_middleware(config.accept_middleware.iter().cloned());
        }
        parser
    }

    /// The title resolver shared with the default pipes, for building custom
    /// pipes that title errors the same way.
    #[must_use]
    pub const fn titles(&self) -> &TitleResolver {
        &self.titles
    }

    /// Replaces the whole handler chain.
    #[must_use]
    pub fn using<I>(mut self, pipes: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Pipe>>,
    {
        self.pipes = pipes.into_iter().collect();
        self
    }

    /// Puts `pipe` at the front of the chain.
    #[must_use]
    pub fn prepend(mut self, pipe: impl Pipe + 'static) -> Self {
        self.pipes.insert(0, Arc::new(pipe));
        self
    }

    /// Puts `pipe` at the end of the chain.
    #[must_use]
    pub fn append(mut self, pipe: impl Pipe + 'static) -> Self {
        self.pipes.push(Arc::new(pipe));
        self
    }

    /// Returns `error` for every failure no pipe recognises.
    #[must_use]
    pub fn with_default(mut self, error: Error) -> Self {
        self.fallback = self.fallback.with_default(Some(error));
        self
    }

    /// Registers an acceptance predicate.
    #[must_use]
    pub fn accept<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Failure, &dyn RequestContext) -> bool + Send + Sync + 'static,
    {
        self.accept.push(Arc::new(predicate));
        self
    }

    /// Renders for requests that prefer any JSON media type.
    #[must_use]
    pub fn accepts_json(self) -> Self {
        self.accept(|_, request| request.wants_json())
    }

    /// Renders for requests whose route runs any of the named middleware.
    #[must_use]
    pub fn accepts_middleware<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        self.accept(move |_, request| {
            request
                .route_middleware()
                .is_some_and(|active| active.iter().any(|name| names.contains(name)))
        })
    }

    /// Renders every failure, whatever the request.
    #[must_use]
    pub const fn always_render(mut self) -> Self {
        self.always_render = true;
        self
    }

    /// Turns diagnostics for unrecognised failures on or off.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.fallback = self.fallback.with_debug(debug);
        self
    }

    /// Whether `failure` should be rendered as JSON:API for `request`.
    ///
    /// True if rendering is forced, any predicate accepts (checked in
    /// registration order), the failure is a JSON:API failure, or the
    /// request's most preferred media type is `application/vnd.api+json`.
    #[must_use]
    pub fn is_renderable(&self, failure: &Failure, request: &dyn RequestContext) -> bool {
        self.always_render
            || self.accept.iter().any(|predicate| predicate(failure, request))
            || failure.kind().is_json_api()
            || request
                .acceptable_content_types()
                .first()
                .is_some_and(|media| media == MEDIA_TYPE)
    }

    /// Converts `failure` into an error response.
    ///
    /// JSON:API failures describe themselves. Anything else goes through the
    /// chain; the first pipe to answer wins, and the fallback answers for
    /// failures nobody recognises.
    #[must_use]
    pub fn parse(&self, failure: &Failure, request: &dyn RequestContext) -> ErrorResponse {
        if let FailureKind::JsonApi(exception) = failure.kind() {
            #[cfg(feature = "telemetry")]
            tracing::debug!("JSON:API failure prepared its own response");
            return exception.prepare_response(request);
        }

        for pipe in &self.pipes {
            if let Some(response) = pipe.handle(failure) {
                #[cfg(feature = "telemetry")]
                tracing::debug!(pipe = pipe.name(), status = %response.status(), "Failure converted");
                return response;
            }
        }

        #[cfg(feature = "telemetry")]
        tracing::debug!(
            failure = failure.type_name(),
            debug = self.fallback.is_debug(),
            "No pipe recognised failure, using fallback"
        );
        self.fallback.handle(failure)
    }

    /// Renders `failure` as a JSON:API HTTP response, or returns `None` if
    /// the request does not want one.
    #[must_use]
    pub fn render(
        &self,
        failure: &Failure,
        request: &dyn RequestContext,
    ) -> Option<http::Response<String>> {
        if !self.is_renderable(failure, request) {
            #[cfg(feature = "telemetry")]
            tracing::trace!(failure = failure.type_name(), "Failure not renderable as JSON:API");
            return None;
        }
        Some(self.parse(failure, request).into_http_response())
    }
}

impl Default for ExceptionParser {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for ExceptionParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionParser")
            .field(
                "pipes",
                &self.pipes.iter().map(|pipe| pipe.name()).collect::<Vec<_>>(),
            )
            .field("accept", &self.accept.len())
            .field("always_render", &self.always_render)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ErrorList;
    use crate::failure::{JsonApiException, Location};
    use crate::request::RequestInfo;
    use crate::trace::Frame;
    use crate::translation::Catalog;
    use crate::validation::{MessageBag, ValidationFailure};
    use http::header::{CONTENT_TYPE, HeaderValue};
    use http::{HeaderMap, Method, StatusCode};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn jsonapi() -> RequestInfo {
        RequestInfo::new().with_accept([MEDIA_TYPE])
    }

    fn html() -> RequestInfo {
        RequestInfo::new().with_accept(["text/html", MEDIA_TYPE])
    }

    fn body(response: &http::Response<String>) -> Value {
        serde_json::from_str(response.body()).unwrap()
    }

    #[test]
    fn test_renders_for_jsonapi_accept() {
        let parser = ExceptionParser::new();
        let response = parser.render(&Failure::not_found(), &jsonapi()).unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], MEDIA_TYPE);
        assert_eq!(
            body(&response),
            json!({
                "errors": [{ "status": "404", "title": "Not Found" }],
                "jsonapi": { "version": "1.0" },
            })
        );
    }

    #[test]
    fn test_skips_other_requests() {
        let parser = ExceptionParser::new();
        assert!(parser.render(&Failure::not_found(), &html()).is_none());
        assert!(!parser.is_renderable(&Failure::not_found(), &RequestInfo::new()));
        let json = RequestInfo::new().with_accept(["application/json"]);
        assert!(!parser.is_renderable(&Failure::not_found(), &json));
    }

    #[test]
    fn test_accepts_json() {
        let parser = ExceptionParser::new().accepts_json();
        let json = RequestInfo::new().with_accept(["application/json"]);
        assert!(parser.is_renderable(&Failure::not_found(), &json));
        assert!(!parser.is_renderable(&Failure::not_found(), &html()));
    }

    #[test]
    fn test_accepts_middleware() {
        let parser = ExceptionParser::new().accepts_middleware(["api"]);
        let api = RequestInfo::new().with_route_middleware(["web", "api"]);
        let web = RequestInfo::new().with_route_middleware(["web"]);
        assert!(parser.is_renderable(&Failure::not_found(), &api));
        assert!(!parser.is_renderable(&Failure::not_found(), &web));
        assert!(!parser.is_renderable(&Failure::not_found(), &RequestInfo::new()));
    }

    #[test]
    fn test_predicates_short_circuit() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let parser = ExceptionParser::new()
            .accept(|failure, _| failure.message() == "yes")
            .accept(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            });

        assert!(parser.is_renderable(&Failure::bad_request("yes"), &html()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!parser.is_renderable(&Failure::bad_request("no"), &html()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_always_render() {
        let parser = ExceptionParser::new().always_render();
        assert!(parser.is_renderable(&Failure::not_found(), &html()));
        assert!(parser.is_renderable(&Failure::unclassified("Boom!"), &RequestInfo::new()));
    }

    #[test]
    fn test_method_not_allowed() {
        let parser = ExceptionParser::new();
        let failure = Failure::method_not_allowed(&[Method::GET, Method::HEAD]);
        let response = parser.render(&failure, &jsonapi()).unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "GET, HEAD");
        assert_eq!(
            body(&response)["errors"],
            json!([{ "status": "405", "title": "Method Not Allowed" }])
        );
    }

    #[test]
    fn test_json_api_failure_is_always_rendered() {
        let mut headers = HeaderMap::new();
        headers.insert("x-foo", HeaderValue::from_static("Bar"));
        let failure = Failure::json_api(
            JsonApiException::error(
                Error::new()
                    .with_status(418)
                    .with_title("Teapot")
                    .with_detail("Hello, I'm a teapot."),
            )
            .with_headers(headers),
        );

        let response = ExceptionParser::new().render(&failure, &html()).unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.headers()["x-foo"], "Bar");
        assert_eq!(
            body(&response)["errors"],
            json!([{ "status": "418", "title": "Teapot", "detail": "Hello, I'm a teapot." }])
        );
    }

    #[test]
    fn test_validation() {
        let failure = Failure::validation(ValidationFailure::new(
            MessageBag::new()
                .with("email", "The email field is required.")
                .with("foo.bar", "The foo.bar field must be a string."),
        ));
        let response = ExceptionParser::new().render(&failure, &jsonapi()).unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let pointers: Vec<_> = body(&response)["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|error| error["source"]["pointer"].as_str().unwrap().to_owned())
            .collect();
        assert_eq!(pointers, ["/email", "/foo/bar"]);
    }

    #[test]
    fn test_unrecognised_without_debug() {
        let failure = Failure::unclassified("Boom!")
            .with_previous(Failure::unclassified("Caused by").with_previous(Failure::unclassified("Root")));
        let response = ExceptionParser::new().render(&failure, &jsonapi()).unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body(&response)["errors"],
            json!([
                { "status": "500", "title": "Internal Server Error" },
                { "status": "500", "title": "Internal Server Error" },
                { "status": "500", "title": "Internal Server Error" },
            ])
        );
    }

    #[test]
    fn test_unrecognised_with_default_error() {
        let parser = ExceptionParser::new().with_default(
            Error::cast(json!({ "status": 500, "title": "Unexpected", "detail": "Try again later." })).unwrap(),
        );
        let failure = Failure::unclassified("Boom!").with_previous(Failure::unclassified("Root"));
        let response = parser.render(&failure, &jsonapi()).unwrap();

        assert_eq!(
            body(&response)["errors"],
            json!([{ "status": "500", "title": "Unexpected", "detail": "Try again later." }])
        );
    }

    #[test]
    fn test_unrecognised_with_debug() {
        let failure = Failure::unclassified("Boom!")
            .with_code(99)
            .with_type_name("LogicException")
            .with_location(Location::new("src/orders.rs", 7))
            .with_frame(Frame::function("app::orders::store").with("args", json!(["secret"])))
            .with_previous(Failure::unclassified("Caused by").with_previous(Failure::unclassified("Root")));
        let response = ExceptionParser::new()
            .with_debug(true)
            .render(&failure, &jsonapi())
            .unwrap();

        let errors = body(&response)["errors"].clone();
        let errors = errors.as_array().unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[0]["code"], "99");
        assert_eq!(errors[0]["detail"], "Boom!");
        assert_eq!(errors[0]["meta"]["exception"], "LogicException");
        assert_eq!(errors[0]["meta"]["file"], "src/orders.rs");
        assert_eq!(errors[0]["meta"]["line"], 7);
        assert_eq!(errors[0]["meta"]["trace"], json!([{ "function": "app::orders::store" }]));
        for error in errors {
            assert!(error["meta"]["exception"].is_string());
            assert!(error["meta"]["trace"].is_array());
        }
    }

    #[test]
    fn test_custom_pipes() {
        let teapot = |failure: &Failure| {
            (failure.message() == "tea")
                .then(|| ErrorResponse::error(Error::new().with_status(418)))
        };
        let parser = ExceptionParser::new().prepend(teapot);
        let response = parser.parse(&Failure::bad_request("tea"), &jsonapi());
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);

        let parser = ExceptionParser::new().using(Vec::new());
        let response = parser.parse(&Failure::bad_request("tea"), &jsonapi());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let parser = ExceptionParser::new().using(Vec::new()).append(teapot);
        let response = parser.parse(&Failure::unclassified("tea"), &jsonapi());
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }

    #[test]
    fn test_first_matching_pipe_wins() {
        let parser = ExceptionParser::new()
            .using(Vec::new())
            .append(|_: &Failure| Some(ErrorResponse::error(Error::new().with_status(409))))
            .append(|_: &Failure| Some(ErrorResponse::error(Error::new().with_status(410))));
        let response = parser.parse(&Failure::not_found(), &jsonapi());
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = ExceptionParser::new().with_debug(true);
        let failures = [
            Failure::not_found(),
            Failure::authentication("Unauthenticated."),
            Failure::validation(ValidationFailure::new(MessageBag::new().with("email", "Bad."))),
            Failure::unclassified("Boom!").with_previous(Failure::unclassified("Root")),
        ];
        for failure in &failures {
            assert_eq!(parser.parse(failure, &jsonapi()), parser.parse(failure, &jsonapi()));
        }
    }

    #[test]
    fn test_translator() {
        let catalog = Catalog::new()
            .with("Unauthorized", "Non autorisé")
            .with("Unauthenticated.", "Non authentifié.");
        let parser = ExceptionParser::with_translator(Arc::new(catalog));
        let response = parser.parse(&Failure::authentication("Unauthenticated."), &jsonapi());
        assert_eq!(
            response.to_list(),
            ErrorList::from(
                Error::new()
                    .with_status(401)
                    .with_title("Non autorisé")
                    .with_detail("Non authentifié.")
            )
        );
    }

    #[test]
    fn test_from_config() {
        let config = ExceptionConfig::from_toml_str(
            r#"
            accept_json = true
            unexpected_document = false

            [translations]
            "Not Found" = "Introuvable"
            "#,
        )
        .unwrap();
        let parser = ExceptionParser::from_config(&config);
        let json = RequestInfo::new().with_accept(["application/json"]);

        let response = parser.render(&Failure::not_found(), &json).unwrap();
        assert_eq!(body(&response)["errors"][0]["title"], "Introuvable");

        let response = parser.parse(&Failure::unexpected_document("Not a document."), &json);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
