//! Transport failures that never produced an HTTP status.

use thiserror::Error;

/// The request never received a response.
///
/// [`ConnectionError::Timeout`] is the deadline-abort subtype: it is still a
/// connection error, and [`ConnectionError::is_timeout`] tells the two apart.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// The attempt was aborted because its deadline expired.
    #[error("Request timed out.")]
    Timeout,

    /// DNS, connect, TLS, or other transport failure.
    #[error("{message}")]
    Failed {
        /// Human readable description, `Connection error.` unless the
        /// failure carried its own message.
        message: String,
        /// The transport error that caused the failure, when there was one.
        #[source]
        source: Option<reqwest::Error>,
    },
}

impl ConnectionError {
    /// Returns `true` for the deadline-abort subtype.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// A connection failure without an underlying transport error.
    pub fn failed(message: Option<String>) -> Self {
        Self::Failed {
            message: message.unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            source: None,
        }
    }
}

const DEFAULT_MESSAGE: &str = "Connection error.";

impl From<reqwest::Error> for ConnectionError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout
        } else {
            Self::Failed {
                message: DEFAULT_MESSAGE.to_string(),
                source: Some(source),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = ConnectionError::Timeout;
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Request timed out.");
    }

    #[tokio::test]
    async fn test_failed_keeps_source() {
        // Port 9 on localhost is reserved for discard and is not listening in tests.
        let source = reqwest::Client::new()
            .get("http://127.0.0.1:9/unreachable")
            .send()
            .await
            .unwrap_err();
        let err = ConnectionError::from(source);
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "Connection error.");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_failed_without_source() {
        let err = ConnectionError::failed(None);
        assert_eq!(err.to_string(), "Connection error.");
        assert!(std::error::Error::source(&err).is_none());

        let err = ConnectionError::failed(Some("socket hang up".to_string()));
        assert_eq!(err.to_string(), "socket hang up");
    }
}
