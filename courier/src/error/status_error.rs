//! Non-success HTTP responses and their classification.

use serde_json::Value;
use strum::{Display, EnumIter};
use thiserror::Error;

use super::{ApiError, ConnectionError};
use crate::headers::Headers;

/// The family a non-success status code belongs to.
///
/// ## Examples
///
/// ```rust
/// use courier::error::StatusKind;
///
/// assert_eq!(StatusKind::from_status(404), StatusKind::NotFound);
/// assert_eq!(StatusKind::from_status(503), StatusKind::InternalServer);
/// assert_eq!(StatusKind::from_status(418), StatusKind::Other);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum StatusKind {
    /// 400
    BadRequest,
    /// 401
    Authentication,
    /// 403
    PermissionDenied,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 422
    UnprocessableEntity,
    /// 429
    RateLimit,
    /// 500 and above
    InternalServer,
    /// Any other non-success status.
    Other,
}

impl StatusKind {
    /// Maps a status code onto its kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Authentication,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::UnprocessableEntity,
            429 => Self::RateLimit,
            s if s >= 500 => Self::InternalServer,
            _ => Self::Other,
        }
    }
}

/// The server answered with a non-success status.
///
/// Carries everything needed for diagnostics: the status, the error payload
/// (when it was JSON), a human message, and the response headers.
#[derive(Debug, Error)]
#[error("{kind} ({status}): {message}")]
pub struct StatusError {
    /// Classification of `status`.
    pub kind: StatusKind,
    /// The HTTP status code.
    pub status: u16,
    /// The parsed JSON error payload, if the body was JSON.
    pub body: Option<Value>,
    /// The error message; the raw body text when it was not JSON.
    pub message: String,
    /// Response headers.
    pub headers: Headers,
}

/// Maps a failure signal onto the error taxonomy.
///
/// An absent status means the request never got a response and yields a
/// connection error. Otherwise the body is parsed as JSON on a best-effort
/// basis; when that fails the raw text becomes the message.
///
/// ## Examples
///
/// ```rust
/// use courier::error::{classify, ApiError, StatusKind};
/// use courier::Headers;
///
/// let err = classify(Some(429), r#"{"message": "slow down"}"#, Headers::new());
/// assert_eq!(err.status_kind(), Some(StatusKind::RateLimit));
/// assert_eq!(err.to_string(), "RateLimit (429): slow down");
///
/// let err = classify(None, "", Headers::new());
/// assert!(matches!(err, ApiError::Connection(_)));
/// ```
pub fn classify(status: Option<u16>, body: &str, headers: Headers) -> ApiError {
    let parsed = serde_json::from_str::<Value>(body).ok();

    let Some(status) = status else {
        let message = parsed.as_ref().and_then(message_from_json);
        return ConnectionError::failed(message).into();
    };

    let message = match &parsed {
        Some(json) => message_from_json(json).unwrap_or_else(|| json.to_string()),
        None => body.to_string(),
    };

    StatusError {
        kind: StatusKind::from_status(status),
        status,
        body: parsed,
        message,
        headers,
    }
    .into()
}

fn message_from_json(json: &Value) -> Option<String> {
    let message = json
        .get("message")
        .or_else(|| json.get("error").and_then(|e| e.get("message")))
        .or_else(|| json.get("error"))?;
    message.as_str().map(str::to_string)
}
