//! `Accept` negotiation and route middleware.

use http::header::ACCEPT;
use http::{Extensions, HeaderMap, Request};
use jsonapi_exceptions::RequestContext;

/// Names of the middleware active on the matched route.
///
/// Routers that know which middleware groups apply to a route insert this
/// extension into the request; the parser's middleware predicate reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMiddleware(pub Vec<String>);

impl RouteMiddleware {
    /// Creates the extension.
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }
}

/// Parses every `Accept` header into media types, most preferred first.
///
/// Entries are ordered by their `q` parameter (default `1`); equal
/// qualities keep header order. Parameters are dropped and media types are
/// lowercased. Entries with `q=0` are kept at the end of the list, as are
/// entries whose `q` is not a number between `0` and `1`.
#[must_use]
pub fn acceptable_content_types(headers: &HeaderMap) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(parse_entry)
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(media, _)| media).collect()
}

fn parse_entry(entry: &str) -> Option<(String, f32)> {
    let mut parts = entry.split(';');
    let media = parts.next()?.trim();
    if media.is_empty() {
        return None;
    }
    let quality = parts
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
        .map_or(1.0, |(_, value)| parse_quality(value));
    Some((media.to_ascii_lowercase(), quality))
}

fn parse_quality(value: &str) -> f32 {
    value
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|quality| (0.0..=1.0).contains(quality))
        .unwrap_or(0.0)
}

/// The [`RequestContext`] of an HTTP request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequestContext {
    accept: Vec<String>,
    middleware: Option<Vec<String>>,
}

impl HttpRequestContext {
    /// Captures what the parser needs from request headers and extensions.
    #[must_use]
    pub fn new(headers: &HeaderMap, extensions: &Extensions) -> Self {
        Self {
            accept: acceptable_content_types(headers),
            middleware: extensions
                .get::<RouteMiddleware>()
                .map(|middleware| middleware.0.clone()),
        }
    }

    /// Captures the context of `request`.
    #[must_use]
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self::new(request.headers(), request.extensions())
    }

    /// Captures the context of request parts.
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        Self::new(&parts.headers, &parts.extensions)
    }
}

impl RequestContext for HttpRequestContext {
    fn acceptable_content_types(&self) -> Vec<String> {
        self.accept.clone()
    }

    fn route_middleware(&self) -> Option<Vec<String>> {
        self.middleware.clone()
    }
}
