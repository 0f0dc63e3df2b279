//! Status code to title resolution.

use std::fmt::{self, Debug};
use std::sync::Arc;

use http::StatusCode;

use crate::translation::{Identity, Translator};

/// Resolves the human-readable title for an HTTP status.
///
/// Titles are the canonical reason phrases (`404` is `"Not Found"`) passed
/// through a [`Translator`]. Shared by every pipe that sets a title.
#[derive(Clone)]
pub struct TitleResolver {
    translator: Arc<dyn Translator>,
}

impl TitleResolver {
    /// Creates a resolver that translates titles with `translator`.
    #[must_use]
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Returns the title for `status`.
    ///
    /// `None` if the status is absent or has no canonical reason phrase,
    /// as is the case for `419`.
    #[must_use]
    pub fn resolve(&self, status: Option<u16>) -> Option<String> {
        let status = StatusCode::from_u16(status?).ok()?;
        status.canonical_reason().map(|reason| self.translator.get(reason))
    }

    /// Translates an arbitrary message, such as a failure's detail.
    #[must_use]
    pub fn translate(&self, key: &str) -> String {
        self.translator.get(key)
    }
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new(Arc::new(Identity))
    }
}

impl Debug for TitleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TitleResolver")
            .field("translator", &"<Translator>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::Catalog;

    #[test]
    fn test_canonical_titles() {
        let titles = TitleResolver::default();
        assert_eq!(titles.resolve(Some(401)).as_deref(), Some("Unauthorized"));
        assert_eq!(titles.resolve(Some(404)).as_deref(), Some("Not Found"));
        assert_eq!(titles.resolve(Some(418)).as_deref(), Some("I'm a teapot"));
        assert_eq!(titles.resolve(Some(422)).as_deref(), Some("Unprocessable Entity"));
        assert_eq!(titles.resolve(Some(500)).as_deref(), Some("Internal Server Error"));
    }

    #[test]
    fn test_unknown_or_absent_status() {
        let titles = TitleResolver::default();
        assert_eq!(titles.resolve(None), None);
        assert_eq!(titles.resolve(Some(0)), None);
        assert_eq!(titles.resolve(Some(419)), None);
        assert_eq!(titles.resolve(Some(1000)), None);
    }

    #[test]
    fn test_titles_are_translated() {
        let catalog = Catalog::new().with("Unauthorized", "Non autorisé");
        let titles = TitleResolver::new(Arc::new(catalog));
        assert_eq!(titles.resolve(Some(401)).as_deref(), Some("Non autorisé"));
        assert_eq!(titles.resolve(Some(403)).as_deref(), Some("Forbidden"));
    }
}
