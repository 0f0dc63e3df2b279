//! String lookup for titles and details.
//!
//! Localisation itself lives outside this crate. All the pipes need is a
//! `key -> string` capability, supplied through [`Translator`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Looks up the display string for a key.
pub trait Translator: Send + Sync {
    /// Returns the translation of `key`, or `key` itself when there is none.
    fn get(&self, key: &str) -> String;
}

/// Returns every key unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Translator for Identity {
    fn get(&self, key: &str) -> String {
        key.to_owned()
    }
}

/// A fixed set of translations, typically loaded from configuration.
///
/// Keys without an entry translate to themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog(HashMap<String, String>);

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a translation.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if the catalog has no translations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl Translator for Catalog {
    fn get(&self, key: &str) -> String {
        self.0.get(key).cloned().unwrap_or_else(|| key.to_owned())
    }
}
