//! Errors decoding successful responses.

use thiserror::Error;

/// A response arrived with a success status but its body was unusable.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The body (or a stream frame) was not the expected JSON.
    #[error("JSON decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A streaming response had no body to iterate over.
    #[error("Attempted to iterate over a response with no body")]
    MissingBody,

    /// Reading the body from the transport failed.
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl ResponseError {
    /// Returns `true` if this is a protocol violation rather than a decode
    /// failure.
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, Self::MissingBody)
    }
}
