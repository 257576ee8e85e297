//! Client construction and configuration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Number;

use super::logger::{RequestLogger, TracingLogger};
use super::{ApiClient, ClientInner, HeaderValidator};
use crate::error::{validate_non_negative_integer, ApiError, ConfigError};
use crate::headers::Headers;
use crate::platform::VERSION;

/// Default retry budget per logical call.
pub const DEFAULT_MAX_RETRIES: u64 = 2;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Builder for configuring an [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: String,
    max_retries: Number,
    timeout_ms: Number,
    default_headers: Headers,
    auth_headers: Headers,
    idempotency_header: Option<String>,
    client_name: String,
    http: Option<reqwest::Client>,
    logger: Arc<dyn RequestLogger>,
    header_validator: Option<HeaderValidator>,
}

impl fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("timeout_ms", &self.timeout_ms)
            .field("idempotency_header", &self.idempotency_header)
            .field("client_name", &self.client_name)
            .finish_non_exhaustive()
    }
}

impl ApiClientBuilder {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_retries: Number::from(DEFAULT_MAX_RETRIES),
            timeout_ms: Number::from(DEFAULT_TIMEOUT_MS),
            default_headers: Headers::new(),
            auth_headers: Headers::new(),
            idempotency_header: None,
            client_name: "Courier".to_string(),
            http: None,
            logger: Arc::new(TracingLogger),
            header_validator: None,
        }
    }

    /// Sets the default retry budget. Validated in [`build`](Self::build).
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use courier::ApiClient;
    ///
    /// let client = ApiClient::builder("https://api.example.com")
    ///     .max_retries(5)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(client.max_retries(), 5);
    ///
    /// let err = ApiClient::builder("https://api.example.com")
    ///     .max_retries(-1)
    ///     .build()
    ///     .unwrap_err();
    /// assert_eq!(err.to_string(), "maxRetries must be a positive integer, got -1");
    /// ```
    pub fn max_retries(mut self, max_retries: impl Into<Number>) -> Self {
        self.max_retries = max_retries.into();
        self
    }

    /// Sets the default per-attempt timeout in milliseconds.
    pub fn timeout_ms(mut self, timeout_ms: impl Into<Number>) -> Self {
        self.timeout_ms = timeout_ms.into();
        self
    }

    /// Adds a header sent on every request unless overridden per request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// Stops sending one of the standard default headers.
    pub fn suppress_default_header(mut self, name: impl Into<String>) -> Self {
        self.default_headers.suppress(name);
        self
    }

    /// Adds a pre-computed authentication header.
    pub fn auth_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth_headers.insert(name, value);
        self
    }

    /// Enables idempotency keys on non-GET requests under this header name.
    pub fn idempotency_header(mut self, name: impl Into<String>) -> Self {
        self.idempotency_header = Some(name.into());
        self
    }

    /// Name used as the `User-Agent` prefix.
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Uses a preconfigured transport instead of the default one.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Replaces the default [`TracingLogger`].
    pub fn logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Installs a check run over the final headers of every attempt.
    ///
    /// The validator receives the merged headers and the per-request
    /// headers the caller supplied.
    pub fn header_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&Headers, &Headers) -> Result<(), ConfigError> + Send + Sync + 'static,
    {
        self.header_validator = Some(Arc::new(validator));
        self
    }

    /// Builds the [`ApiClient`].
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError`] if the retry budget or timeout is not a
    /// non-negative integer, if the base URL does not parse, or if the
    /// transport cannot be constructed.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let max_retries = validate_non_negative_integer("maxRetries", &self.max_retries)?;
        let timeout_ms = validate_non_negative_integer("timeout", &self.timeout_ms)?;
        url::Url::parse(&self.base_url).map_err(ConfigError::InvalidUrl)?;

        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .pool_max_idle_per_host(10)
                .build()
                .map_err(ConfigError::HttpClient)?,
        };

        let mut default_headers = Headers::new()
            .with("Accept", "application/json")
            .with("Content-Type", "application/json")
            .with("User-Agent", format!("{}/Rust {VERSION}", self.client_name));
        default_headers.merge(&self.default_headers);

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                base_url: self.base_url,
                max_retries,
                timeout_ms,
                default_headers,
                auth_headers: self.auth_headers,
                idempotency_header: self.idempotency_header,
                http,
                logger: self.logger,
                header_validator: self.header_validator,
            }),
        })
    }
}

/// Client settings loadable from any serde format.
///
/// Numbers stay untyped so that out-of-range values are reported by the same
/// validation the builder applies.
///
/// ## Examples
///
/// ```rust
/// use courier::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(
///     r#"{"base_url": "https://api.example.com", "max_retries": 4, "timeout_ms": 1500}"#,
/// ).unwrap();
/// let client = config.into_builder().build().unwrap();
/// assert_eq!(client.timeout_ms(), 1500);
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL relative paths are appended to.
    pub base_url: String,
    /// Retry budget per logical call.
    #[serde(default)]
    pub max_retries: Option<Number>,
    /// Per-attempt timeout in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<Number>,
    /// Header carrying idempotency keys on non-GET requests.
    #[serde(default)]
    pub idempotency_header: Option<String>,
    /// Extra headers sent on every request.
    #[serde(default)]
    pub default_headers: BTreeMap<String, String>,
}

impl ClientConfig {
    /// Feeds the settings into a builder.
    pub fn into_builder(self) -> ApiClientBuilder {
        let mut builder = ApiClientBuilder::new(self.base_url);
        if let Some(max_retries) = self.max_retries {
            builder = builder.max_retries(max_retries);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            builder = builder.timeout_ms(timeout_ms);
        }
        if let Some(header) = self.idempotency_header {
            builder = builder.idempotency_header(header);
        }
        for (name, value) in self.default_headers {
            builder = builder.default_header(name, value);
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let client = ApiClientBuilder::new("https://api.example.com").build().unwrap();
        assert_eq!(client.max_retries(), DEFAULT_MAX_RETRIES);
        assert_eq!(client.timeout_ms(), DEFAULT_TIMEOUT_MS);
        assert_eq!(client.base_url(), "https://api.example.com");
    }

    #[test]
    fn test_rejects_invalid_numbers() {
        let cases = [
            (json!(1.5), "maxRetries must be an integer, got 1.5"),
            (json!(-3), "maxRetries must be a positive integer, got -3"),
        ];
        for (value, message) in cases {
            let Some(number) = value.as_number().cloned() else {
                panic!("not a number");
            };
            let err = ApiClientBuilder::new("https://api.example.com")
                .max_retries(number)
                .build()
                .unwrap_err();
            assert!(matches!(err, ApiError::Config(_)));
            assert_eq!(err.to_string(), message);
        }

        let err = ApiClientBuilder::new("https://api.example.com")
            .timeout_ms(-1)
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), "timeout must be a positive integer, got -1");
    }

    #[test]
    fn test_accepts_all_non_negative_integers() {
        for n in [0u64, 1, 2, 10, 1_000_000] {
            let client = ApiClientBuilder::new("https://api.example.com")
                .max_retries(n)
                .timeout_ms(n)
                .build()
                .unwrap();
            assert_eq!(client.max_retries(), n);
            assert_eq!(client.timeout_ms(), n);
        }
    }

    #[test]
    fn test_rejects_bad_base_url() {
        let err = ApiClientBuilder::new("not a url").build().unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_config_from_json() {
        let config: ClientConfig = serde_json::from_value(json!({
            "base_url": "https://api.example.com/v1",
            "max_retries": 0,
            "idempotency_header": "Idempotency-Key",
            "default_headers": {"X-Team": "payments"}
        }))
        .unwrap();
        let client = config.into_builder().build().unwrap();
        assert_eq!(client.max_retries(), 0);
        assert_eq!(client.timeout_ms(), DEFAULT_TIMEOUT_MS);
        assert_eq!(client.inner.default_headers.get("x-team"), Some("payments"));
        assert_eq!(
            client.inner.idempotency_header.as_deref(),
            Some("Idempotency-Key")
        );
    }

    #[test]
    fn test_config_numbers_are_validated() {
        let config: ClientConfig = serde_json::from_value(json!({
            "base_url": "https://api.example.com",
            "timeout_ms": 2.5
        }))
        .unwrap();
        let err = config.into_builder().build().unwrap_err();
        assert_eq!(err.to_string(), "timeout must be an integer, got 2.5");
    }

    #[test]
    fn test_user_agent_uses_client_name() {
        let client = ApiClientBuilder::new("https://api.example.com")
            .client_name("Lithic")
            .build()
            .unwrap();
        assert_eq!(
            client.inner.default_headers.get("user-agent"),
            Some(format!("Lithic/Rust {VERSION}").as_str())
        );
    }

    #[test]
    fn test_default_header_can_be_suppressed() {
        let client = ApiClientBuilder::new("https://api.example.com")
            .suppress_default_header("Content-Type")
            .build()
            .unwrap();
        assert!(client.inner.default_headers.is_suppressed("content-type"));
    }
}
