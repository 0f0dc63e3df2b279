//! File and environment based parser configuration.
//!
//! Loads an [`ExceptionConfig`] from a TOML file. Every key is optional.
//!
//! # Example Configuration
//!
//! ```toml
//! debug = false
//! always_render = false
//! accept_json = true
//! accept_middleware = ["api"]
//! unexpected_document = true
//!
//! [default_error]
//! status = "500"
//! title = "Internal Server Error"
//! detail = "Something went wrong."
//!
//! [translations]
//! "Not Found" = "Introuvable"
//! ```
//!
//! # Environment Variables
//!
//! - `JSONAPI_EXCEPTIONS_CONFIG` - Path to the configuration file
//!   (default: `jsonapi-exceptions.toml`)
//! - `APP_DEBUG` - Overrides `debug` (`true`/`1` or `false`/`0`)

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::Error;
use crate::translation::Catalog;

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_VAR: &str = "JSONAPI_EXCEPTIONS_CONFIG";

/// Configuration file read when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "jsonapi-exceptions.toml";

/// Environment variable overriding [`ExceptionConfig::debug`].
pub const DEBUG_VAR: &str = "APP_DEBUG";

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was read.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid configuration TOML.
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionConfig {
    /// Expose diagnostics for unrecognised failures.
    pub debug: bool,

    /// Render every failure as JSON:API regardless of the request.
    pub always_render: bool,

    /// Render for requests that prefer any JSON media type.
    pub accept_json: bool,

    /// Render for requests whose route runs any of these middleware.
    pub accept_middleware: Vec<String>,

    /// Include the unexpected-document pipe in the default chain
    /// (default: `true`).
    pub unexpected_document: bool,

    /// Error returned for every unrecognised failure.
    pub default_error: Option<Error>,

    /// Title and detail translations.
    pub translations: Catalog,
}

impl Default for ExceptionConfig {
    fn default() -> Self {
        Self {
            debug: false,
            always_render: false,
            accept_json: false,
            accept_middleware: Vec::new(),
            unexpected_document: true,
            default_error: None,
            translations: Catalog::new(),
        }
    }
}

impl ExceptionConfig {
    /// Loads configuration from the path in `JSONAPI_EXCEPTIONS_CONFIG`,
    /// falling back to `jsonapi-exceptions.toml` in the current directory.
    ///
    /// A missing file yields the defaults. `APP_DEBUG` overrides the
    /// file's `debug` value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        let mut config = Self::load_from(&path)?;
        config.apply_debug_override(std::env::var(DEBUG_VAR).ok().as_deref());
        Ok(config)
    }

    /// Loads configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if `content` is not valid configuration TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies an `APP_DEBUG` style value. Unrecognised values are ignored.
    pub fn apply_debug_override(&mut self, value: Option<&str>) {
        match value.map(str::trim) {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => self.debug = true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") => self.debug = false,
            _ => {}
        }
    }
}
