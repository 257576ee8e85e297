//! Top-level API error type.

use super::{
    ConfigError, ConnectionError, MultipartError, PaginationError, ResponseError, StatusError,
    StatusKind,
};
use crate::headers::Headers;
use thiserror::Error;

/// Top-level error type for all engine operations.
///
/// ## Examples
///
/// ```rust,ignore
/// use courier::ApiError;
///
/// match client.get::<serde_json::Value>("/cards", Default::default()).await {
///     Ok(cards) => println!("{:?}", *cards),
///     Err(ApiError::Status(e)) => eprintln!("server said {}: {}", e.status, e.message),
///     Err(ApiError::Connection(e)) if e.is_timeout() => eprintln!("timed out"),
///     Err(e) => eprintln!("request failed: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid client or request configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No response was received.
    #[error(transparent)]
    Connection(#[from] ConnectionError),

    /// The server answered with a non-success status.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// A success response could not be decoded.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The request body could not be form-encoded.
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    /// The pagination API was misused.
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

impl ApiError {
    /// The HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status(e) => Some(e.status),
            _ => None,
        }
    }

    /// The status classification, if the server answered.
    pub fn status_kind(&self) -> Option<StatusKind> {
        match self {
            Self::Status(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Response headers of a failed request, if the server answered.
    pub fn headers(&self) -> Option<&Headers> {
        match self {
            Self::Status(e) => Some(&e.headers),
            _ => None,
        }
    }

    /// Returns `true` for transport failures, timeouts included.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if an attempt was aborted by its deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Connection(e) if e.is_timeout())
    }

    /// Returns `true` if the status is one the default retry policy retries
    /// (409, 429, or 5xx).
    pub fn is_retryable_status(&self) -> bool {
        matches!(self.status(), Some(s) if s == 409 || s == 429 || s >= 500)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Response(ResponseError::Decode(err))
    }
}
