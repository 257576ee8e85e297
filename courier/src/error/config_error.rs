//! Client and per-request configuration errors.

use serde_json::Number;
use thiserror::Error;

/// Errors in client construction or per-request settings.
///
/// These indicate programmer errors and are never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A count or duration was not a whole number.
    #[error("{name} must be an integer, got {value}")]
    NotInteger {
        /// The setting being validated (e.g. `timeout`).
        name: &'static str,
        /// The rejected value, as written.
        value: String,
    },

    /// A count or duration was negative.
    #[error("{name} must be a positive integer, got {value}")]
    Negative {
        /// The setting being validated (e.g. `maxRetries`).
        name: &'static str,
        /// The rejected value, as written.
        value: String,
    },

    /// The base URL or a request path could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header name or value cannot be sent.
    #[error("Invalid header {name}: {message}")]
    InvalidHeader {
        /// The offending header name.
        name: String,
        /// Why the header was rejected.
        message: String,
    },

    /// The underlying HTTP transport could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl ConfigError {
    /// Creates an invalid header error.
    pub fn invalid_header(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Validates that `value` is a non-negative whole number.
///
/// Integral floating point values such as `2.0` are accepted.
///
/// ## Examples
///
/// ```rust
/// use courier::error::{validate_non_negative_integer, ConfigError};
/// use serde_json::Number;
///
/// assert_eq!(validate_non_negative_integer("maxRetries", &Number::from(2)).unwrap(), 2);
///
/// let negative = validate_non_negative_integer("maxRetries", &Number::from(-1));
/// assert!(matches!(negative, Err(ConfigError::Negative { .. })));
/// ```
///
/// ## Errors
///
/// Returns [`ConfigError::NotInteger`] for fractional values and
/// [`ConfigError::Negative`] for values below zero.
pub fn validate_non_negative_integer(name: &'static str, value: &Number) -> Result<u64, ConfigError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    if value.as_i64().is_some() {
        return Err(ConfigError::Negative {
            name,
            value: value.to_string(),
        });
    }

    let float = value.as_f64().unwrap_or(f64::NAN);
    if !float.is_finite() || float.fract() != 0.0 {
        return Err(ConfigError::NotInteger {
            name,
            value: value.to_string(),
        });
    }
    if float < 0.0 {
        return Err(ConfigError::Negative {
            name,
            value: value.to_string(),
        });
    }
    if float > u64::MAX as f64 {
        return Err(ConfigError::NotInteger {
            name,
            value: value.to_string(),
        });
    }
    Ok(float as u64)
}
