//! The JSON:API error document model.
//!
//! - [`Error`] - one error object
//! - [`ErrorList`] - errors in discovery order
//! - [`ErrorResponse`] - errors plus headers, convertible to an HTTP response

mod error;
mod list;
mod response;

pub use error::{Error, Source};
pub use list::{ErrorList, ErrorProvider};
pub use response::{ErrorDocument, ErrorResponse, Errors, JsonApiObject};
