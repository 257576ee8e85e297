//! Request execution with retries and tracing instrumentation.
//!
//! This module provides the [`ApiClient`] struct, which sends each attempt
//! under its own deadline and retries failed attempts according to the
//! client's retry budget.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn, Span};

use super::builder::ApiClientBuilder;
use super::retry::{retry_delay, should_retry};
use super::ClientInner;
use crate::error::{classify, validate_non_negative_integer, ApiError, ConnectionError, ResponseError};
use crate::headers::Headers;
use crate::method::HttpMethod;
use crate::options::{FinalRequestOptions, RequestOptions};
use crate::pagination::{PagePromise, Pagination};
use crate::response::ApiResponse;
use crate::streaming::{Stream, StreamController};

/// Async HTTP client shared by every resource wrapper.
///
/// Cloning is cheap: clones share one immutable configuration and one
/// connection pool.
///
/// ## Examples
///
/// ```rust,ignore
/// use courier::{ApiClient, RequestOptions};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Card { token: String }
///
/// let client = ApiClient::builder("https://api.example.com/v1")
///     .auth_header("Authorization", "sk-xxx")
///     .build()?;
///
/// let card = client.get::<Card>("/cards/abc", RequestOptions::new()).await?;
/// println!("{}", card.token);
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl ApiClient {
    /// Creates a new builder for configuring an API client.
    ///
    /// ## Arguments
    ///
    /// * `base_url` - Prefix for every relative request path.
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url)
    }

    /// Creates a new API client with default settings.
    ///
    /// ## Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::builder(base_url).build()
    }

    /// Returns the base URL for this client.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Default retry budget per logical call.
    pub fn max_retries(&self) -> u64 {
        self.inner.max_retries
    }

    /// Default per-attempt timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        self.inner.timeout_ms
    }

    /// Executes a request and decodes the response body.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - the options are invalid ([`ApiError::Config`], [`ApiError::Multipart`])
    /// - every attempt failed without a response ([`ApiError::Connection`])
    /// - the server answered with a non-retryable or final error status
    ///   ([`ApiError::Status`])
    /// - the success body does not decode as `T` ([`ApiError::Response`])
    pub async fn request<T: DeserializeOwned>(
        &self,
        options: FinalRequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        let (response, headers) = self.execute(options).await?;
        let body = response.bytes().await.map_err(ResponseError::Body)?;
        ApiResponse::decode(&body, headers)
    }

    /// Executes a request and returns its body as a lazy event stream.
    ///
    /// ## Errors
    ///
    /// Fails like [`request`](Self::request) for everything up to the
    /// response headers; decode failures surface from the stream itself.
    pub async fn stream<T: DeserializeOwned>(
        &self,
        mut options: FinalRequestOptions,
    ) -> Result<Stream<T>, ApiError> {
        options.stream = true;
        let (response, headers) = self.execute(options).await?;
        let url = response.url().to_string();
        let controller = StreamController::with_abort(move || {
            debug!(http.url = %url, "Released streaming connection");
        });
        Ok(Stream::from_response(response, headers, controller))
    }

    /// Sends a GET request.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(FinalRequestOptions::from_options(HttpMethod::Get, path, options))
            .await
    }

    /// Sends a POST request.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(FinalRequestOptions::from_options(HttpMethod::Post, path, options))
            .await
    }

    /// Sends a PUT request.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(FinalRequestOptions::from_options(HttpMethod::Put, path, options))
            .await
    }

    /// Sends a PATCH request.
    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(FinalRequestOptions::from_options(HttpMethod::Patch, path, options))
            .await
    }

    /// Sends a DELETE request.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(FinalRequestOptions::from_options(HttpMethod::Delete, path, options))
            .await
    }

    /// Starts a paginated GET. Nothing is sent until the promise is awaited
    /// or iterated.
    pub fn get_api_list<P: Pagination>(&self, path: &str, options: RequestOptions) -> PagePromise<P> {
        PagePromise::new(
            self.clone(),
            FinalRequestOptions::from_options(HttpMethod::Get, path, options),
        )
    }

    /// Runs the retry loop and returns the first successful response.
    #[instrument(
        name = "api_request",
        skip(self, options),
        fields(
            http.method = %options.method,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
            retry.count = tracing::field::Empty,
        )
    )]
    async fn execute(
        &self,
        options: FinalRequestOptions,
    ) -> Result<(reqwest::Response, Headers), ApiError> {
        let inner = &self.inner;
        let options = self.prepare_options(options)?;
        let max_retries = match &options.max_retries {
            Some(max_retries) => validate_non_negative_integer("maxRetries", max_retries)?,
            None => inner.max_retries,
        };
        let mut retries_remaining = max_retries;

        loop {
            let wire = self.build_request(&options)?;
            let url = wire.url.to_string();
            let timeout = wire.timeout;
            Span::current().record("http.url", url.as_str());
            Span::current().record("retry.count", max_retries - retries_remaining);
            inner.logger.request(wire.method, &url, &wire.headers);

            let send = wire.into_reqwest(&inner.http)?.send();
            let failure = match tokio::time::timeout(timeout, send).await {
                Err(_) => ConnectionError::Timeout,
                Ok(Err(err)) => ConnectionError::from(err),
                Ok(Ok(response)) => {
                    let status = response.status();
                    let status_code = status.as_u16();
                    let headers = Headers::from_header_map(response.headers());
                    Span::current().record("http.status_code", status_code);
                    inner.logger.response(status_code, &url, &headers);

                    if status.is_success() {
                        Span::current().record("otel.status_code", "OK");
                        return Ok((response, headers));
                    }

                    if retries_remaining > 0 && should_retry(status_code, &headers) {
                        retries_remaining -= 1;
                        let delay = retry_delay(max_retries, retries_remaining, Some(&headers));
                        let reason = format!("status {status_code}");
                        warn!(
                            status = status_code,
                            retries_remaining,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request"
                        );
                        inner.logger.retry(retries_remaining, delay, &reason);
                        tokio::time::sleep(delay).await;
                        continue;
                    }

                    let otel_status = if status.is_server_error() { "ERROR" } else { "UNSET" };
                    Span::current().record("otel.status_code", otel_status);
                    let text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown".to_string());
                    debug!(status = status_code, body = %text, "Request failed");
                    return Err(classify(Some(status_code), &text, headers));
                }
            };

            if retries_remaining > 0 {
                retries_remaining -= 1;
                let delay = retry_delay(max_retries, retries_remaining, None);
                warn!(
                    error = %failure,
                    retries_remaining,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying request"
                );
                inner.logger.retry(retries_remaining, delay, &failure.to_string());
                tokio::time::sleep(delay).await;
                continue;
            }

            Span::current().record("otel.status_code", "ERROR");
            debug!(error = %failure, "Request failed");
            return Err(failure.into());
        }
    }
}
