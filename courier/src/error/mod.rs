//! Layered error types for the request engine.
//!
//! The error hierarchy mirrors the stages a request passes through:
//! - [`ApiError`] - Top-level error type returned by every client operation
//! - [`ConfigError`] - Invalid client or per-request configuration
//! - [`ConnectionError`] - Transport failures that produced no HTTP status
//! - [`StatusError`] - Non-success HTTP responses, classified by [`StatusKind`]
//! - [`ResponseError`] - Success responses whose body could not be decoded
//! - [`MultipartError`] - Request bodies that cannot be form-encoded
//! - [`PaginationError`] - Misuse of the pagination API
//! - [`CoerceError`] - Loosely typed values that cannot be coerced

mod api_error;
mod coerce_error;
mod config_error;
mod connection_error;
mod multipart_error;
mod pagination_error;
mod response_error;
mod status_error;

pub use api_error::ApiError;
pub use coerce_error::CoerceError;
pub use config_error::{validate_non_negative_integer, ConfigError};
pub use connection_error::ConnectionError;
pub use multipart_error::MultipartError;
pub use pagination_error::PaginationError;
pub use response_error::ResponseError;
pub use status_error::{classify, StatusError, StatusKind};
