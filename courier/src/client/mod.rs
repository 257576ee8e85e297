//! HTTP client module.
//!
//! [`ApiClient`] owns the immutable client configuration and drives every
//! request through the same pipeline:
//!
//! 1. [`ApiClient::prepare_options`] encodes form bodies and fixes the
//!    idempotency key
//! 2. [`ApiClient::build_request`] assembles headers, URL and body for one
//!    attempt
//! 3. the executor sends the attempt under its own deadline and, on failure,
//!    consults [`should_retry`] and [`retry_delay`]
//!
//! ## Examples
//!
//! ```rust,ignore
//! use courier::{ApiClient, RequestOptions};
//! use serde_json::{json, Value};
//!
//! let client = ApiClient::builder("https://api.example.com/v1")
//!     .auth_header("Authorization", "Bearer sk-xxx")
//!     .idempotency_header("Idempotency-Key")
//!     .max_retries(3)
//!     .build()?;
//!
//! let card = client
//!     .post::<Value>("/cards", RequestOptions::new().json(json!({"type": "VIRTUAL"})))
//!     .await?;
//! println!("{} (request id {:?})", card["token"], card.headers().get("x-request-id"));
//! ```

mod builder;
mod executor;
mod logger;
mod request;
mod retry;

use std::fmt;
use std::sync::Arc;

pub use builder::{ApiClientBuilder, ClientConfig, DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
pub use executor::ApiClient;
pub use logger::{NoopLogger, RequestLogger, TracingLogger};
pub use request::{build_url, WireRequest};
pub use retry::{backoff_delay, parse_retry_after, retry_delay, should_retry, SHOULD_RETRY_HEADER};

use crate::error::ConfigError;
use crate::headers::Headers;

/// Check run over `(final headers, per-request headers)` before each attempt.
pub type HeaderValidator = Arc<dyn Fn(&Headers, &Headers) -> Result<(), ConfigError> + Send + Sync>;

/// Configuration shared by every clone of a client; never mutated after
/// construction.
pub(crate) struct ClientInner {
    pub(crate) base_url: String,
    pub(crate) max_retries: u64,
    pub(crate) timeout_ms: u64,
    pub(crate) default_headers: Headers,
    pub(crate) auth_headers: Headers,
    pub(crate) idempotency_header: Option<String>,
    pub(crate) http: reqwest::Client,
    pub(crate) logger: Arc<dyn RequestLogger>,
    pub(crate) header_validator: Option<HeaderValidator>,
}

impl fmt::Debug for ClientInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientInner")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("timeout_ms", &self.timeout_ms)
            .field("idempotency_header", &self.idempotency_header)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}
