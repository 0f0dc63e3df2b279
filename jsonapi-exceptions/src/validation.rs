//! Validation message bags.
//!
//! Validation itself happens elsewhere. This module only carries its outcome:
//! human-readable messages keyed by dotted field path, in the order the
//! fields were registered.

use http::StatusCode;
use indexmap::IndexMap;

/// Default message of a validation failure.
pub const DEFAULT_MESSAGE: &str = "The given data was invalid.";

/// Messages keyed by dotted field path (`data.attributes.email`).
///
/// Iteration follows field registration order; messages for one field keep
/// the order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageBag(IndexMap<String, Vec<String>>);

impl MessageBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message for `field`.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Returns the bag with a message added for `field`.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(field, message);
        self
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterates over fields and their messages in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Number of fields with messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MessageBag {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut bag = Self::new();
        for (field, message) in iter {
            bag.add(field, message);
        }
        bag
    }
}

/// The outcome of a failed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationFailure {
    messages: MessageBag,
    status: Option<StatusCode>,
}

impl ValidationFailure {
    /// Creates a failure from its messages.
    #[must_use]
    pub fn new(messages: MessageBag) -> Self {
        Self {
            messages,
            status: None,
        }
    }

    /// Overrides the HTTP status, which is otherwise `422`.
    #[must_use]
    pub const fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// The messages.
    #[must_use]
    pub const fn messages(&self) -> &MessageBag {
        &self.messages
    }

    /// The status override, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order_is_kept() {
        let bag: MessageBag = [
            ("name", "Name is required."),
            ("email", "Email is invalid."),
            ("name", "Name is too short."),
        ]
        .into_iter()
        .collect();

        let fields: Vec<_> = bag.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, ["name", "email"]);
        assert_eq!(bag.get("name"), ["Name is required.", "Name is too short."]);
        assert!(bag.get("missing").is_empty());
    }
}
