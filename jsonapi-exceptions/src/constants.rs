//! JSON:API protocol constants.

/// The JSON:API media type, used for content negotiation and as the
/// `Content-Type` of rendered error documents.
pub const MEDIA_TYPE: &str = "application/vnd.api+json";

/// The JSON:API version advertised in the `jsonapi` member of documents.
pub const JSONAPI_VERSION: &str = "1.0";

/// Status produced by validation failures unless they override it.
pub const VALIDATION_STATUS: u16 = 422;

/// Translation key used as the title of unparseable request documents.
pub const INVALID_JSON_TITLE: &str = "Invalid JSON";
