//! Ordered collections of errors.

use serde::{Deserialize, Serialize};

use super::Error;

/// An ordered list of errors.
///
/// Order is significant: it reflects the order in which causes were
/// discovered, outermost failure first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorList(Vec<Error>);

impl ErrorList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an error.
    pub fn push(&mut self, error: Error) {
        self.0.push(error);
    }

    /// Returns the list with `error` appended.
    #[must_use]
    pub fn with(mut self, error: Error) -> Self {
        self.push(error);
        self
    }

    /// Returns a new list with `f` applied to every error.
    #[must_use]
    pub fn map(self, f: impl FnMut(Error) -> Error) -> Self {
        self.0.into_iter().map(f).collect()
    }

    /// Number of errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list holds no errors.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The first error, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Error> {
        self.0.first()
    }

    /// Iterates over the errors in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }

    /// Consumes the list, returning the errors.
    #[must_use]
    pub fn into_vec(self) -> Vec<Error> {
        self.0
    }
}

impl From<Vec<Error>> for ErrorList {
    fn from(errors: Vec<Error>) -> Self {
        Self(errors)
    }
}

impl From<Error> for ErrorList {
    fn from(error: Error) -> Self {
        Self(vec![error])
    }
}

impl FromIterator<Error> for ErrorList {
    fn from_iter<T: IntoIterator<Item = Error>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Error> for ErrorList {
    fn extend<T: IntoIterator<Item = Error>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ErrorList {
    type Item = Error;
    type IntoIter = std::vec::IntoIter<Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a Error;
    type IntoIter = std::slice::Iter<'a, Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Something that can describe itself as JSON:API errors.
///
/// Implemented by validation adapters and other collaborators that know how
/// to turn their own state into error objects.
pub trait ErrorProvider: Send + Sync {
    /// Produces the errors.
    fn to_errors(&self) -> ErrorList;
}

impl ErrorProvider for Error {
    fn to_errors(&self) -> ErrorList {
        ErrorList::from(self.clone())
    }
}

impl ErrorProvider for ErrorList {
    fn to_errors(&self) -> ErrorList {
        self.clone()
    }
}
