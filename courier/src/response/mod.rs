//! Decoded success responses.

use std::ops::{Deref, DerefMut};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::headers::Headers;

/// A decoded response body with its headers alongside.
///
/// Derefs to the body, so the headers never show up when the body is
/// inspected or serialized.
///
/// ## Examples
///
/// ```rust
/// use courier::{ApiResponse, Headers};
/// use serde_json::json;
///
/// let response = ApiResponse::new(json!({"token": "abc"}), Headers::new().with("X-Request-Id", "r1"));
/// assert_eq!(response["token"], "abc");
/// assert_eq!(response.headers().get("x-request-id"), Some("r1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    data: T,
    headers: Headers,
}

impl<T> ApiResponse<T> {
    /// Pairs a body with its response headers.
    pub fn new(data: T, headers: Headers) -> Self {
        Self { data, headers }
    }

    /// Response headers, looked up case-insensitively.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// The decoded body.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// Discards the headers.
    pub fn into_inner(self) -> T {
        self.data
    }

    /// Splits into body and headers.
    pub fn into_parts(self) -> (T, Headers) {
        (self.data, self.headers)
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decodes a success body.
    ///
    /// JSON content types are parsed as JSON. Anything else is handed to the
    /// deserializer as a string, so `T = String` (or `serde_json::Value`)
    /// receives the raw text.
    ///
    /// ## Errors
    ///
    /// Returns [`ResponseError::Decode`](crate::error::ResponseError::Decode)
    /// if the body does not match `T`.
    pub fn decode(body: &[u8], headers: Headers) -> Result<Self, ApiError> {
        let is_json = headers
            .get("content-type")
            .is_some_and(|ct| ct.contains("application/json"));
        let data = if is_json {
            serde_json::from_slice(body)?
        } else {
            serde_json::from_value(Value::String(String::from_utf8_lossy(body).into_owned()))?
        };
        Ok(Self::new(data, headers))
    }
}

impl<T> Deref for ApiResponse<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for ApiResponse<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}
