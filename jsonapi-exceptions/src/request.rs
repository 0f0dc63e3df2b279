//! The request abstraction used by the acceptance policy.
//!
//! The parser never touches a concrete HTTP request. Hosts describe the
//! request through [`RequestContext`]; [`RequestInfo`] is a plain value that
//! implements it.

/// What the parser needs to know about the request that failed.
pub trait RequestContext {
    /// Acceptable response media types, most preferred first.
    fn acceptable_content_types(&self) -> Vec<String>;

    /// Whether the client prefers a JSON response.
    ///
    /// By default, `true` when the most preferred media type is a JSON type
    /// (`application/json`, `application/vnd.api+json`, ...).
    fn wants_json(&self) -> bool {
        self.acceptable_content_types()
            .first()
            .is_some_and(|media| media.contains("/json") || media.contains("+json"))
    }

    /// Names of the middleware active on the matched route, if a route
    /// matched.
    fn route_middleware(&self) -> Option<Vec<String>> {
        None
    }
}

/// A request description built from plain values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInfo {
    accept: Vec<String>,
    middleware: Option<Vec<String>>,
}

impl RequestInfo {
    /// Creates a request that accepts nothing in particular.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the acceptable media types, most preferred first.
    #[must_use]
    pub fn with_accept<I, S>(mut self, media_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept = media_types.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the middleware active on the matched route.
    #[must_use]
    pub fn with_route_middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl RequestContext for RequestInfo {
    fn acceptable_content_types(&self) -> Vec<String> {
        self.accept.clone()
    }

    fn route_middleware(&self) -> Option<Vec<String>> {
        self.middleware.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wants_json() {
        assert!(RequestInfo::new().with_accept(["application/json"]).wants_json());
        assert!(RequestInfo::new().with_accept(["application/vnd.api+json"]).wants_json());
        assert!(!RequestInfo::new().with_accept(["text/html", "application/json"]).wants_json());
        assert!(!RequestInfo::new().wants_json());
    }

    #[test]
    fn test_route_middleware() {
        assert_eq!(RequestInfo::new().route_middleware(), None);
        let request = RequestInfo::new().with_route_middleware(["api", "auth"]);
        assert_eq!(
            request.route_middleware(),
            Some(vec!["api".to_owned(), "auth".to_owned()])
        );
    }
}
