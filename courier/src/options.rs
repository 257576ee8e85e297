//! Logical request options.

use bytes::Bytes;
use serde_json::{Number, Value};

use crate::form::FormValue;
use crate::headers::Headers;
use crate::method::HttpMethod;

/// The body of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Always sent as JSON.
    Json(Value),
    /// Sent as JSON unless a [`FilePart`](crate::form::FilePart) appears at
    /// any depth, in which case it is sent as `multipart/form-data`.
    Form(FormValue),
    /// Sent verbatim.
    Raw {
        /// The encoded body.
        bytes: Bytes,
        /// Content type of the body, if known.
        content_type: Option<String>,
    },
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<FormValue> for RequestBody {
    fn from(value: FormValue) -> Self {
        Self::Form(value)
    }
}

/// Options a caller may set on any request.
///
/// Method and path are optional here; the verb helpers on
/// [`ApiClient`](crate::ApiClient) fill them in. Values set on the options
/// take precedence over the helper's.
///
/// ## Examples
///
/// ```rust
/// use courier::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::new()
///     .query(json!({"page": 2}))
///     .json(json!({"memo": "rent"}))
///     .header("X-Trace", "abc")
///     .suppress_header("User-Agent")
///     .max_retries(5)
///     .idempotency_key("transfer-42");
///
/// assert_eq!(options.headers.get("x-trace"), Some("abc"));
/// assert!(options.headers.is_suppressed("user-agent"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Option<HttpMethod>,
    /// Path relative to the base URL, or an absolute URL.
    pub path: Option<String>,
    /// Query object, serialized with bracketed nesting.
    pub query: Option<Value>,
    /// Request body.
    pub body: Option<RequestBody>,
    /// Per-request headers; suppressed entries remove lower-precedence
    /// defaults.
    pub headers: Headers,
    /// Retry budget for this call, overriding the client default.
    pub max_retries: Option<Number>,
    /// Per-attempt timeout in milliseconds, overriding the client default.
    pub timeout_ms: Option<Number>,
    /// Idempotency key to send instead of a generated one.
    pub idempotency_key: Option<String>,
    /// Whether the response is consumed as an event stream.
    pub stream: bool,
}

impl RequestOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the query object.
    pub fn query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body.
    pub fn json(self, body: Value) -> Self {
        self.body(RequestBody::Json(body))
    }

    /// Sets a form body that switches to multipart when it carries a file.
    pub fn form(self, body: FormValue) -> Self {
        self.body(RequestBody::Form(body))
    }

    /// Adds a per-request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Omits a header that would otherwise be sent by default.
    pub fn suppress_header(mut self, name: impl Into<String>) -> Self {
        self.headers.suppress(name);
        self
    }

    /// Overrides the retry budget.
    pub fn max_retries(mut self, max_retries: impl Into<Number>) -> Self {
        self.max_retries = Some(max_retries.into());
        self
    }

    /// Overrides the per-attempt timeout.
    pub fn timeout_ms(mut self, timeout_ms: impl Into<Number>) -> Self {
        self.timeout_ms = Some(timeout_ms.into());
        self
    }

    /// Supplies the idempotency key.
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Marks the request as streaming.
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Request options with method and path resolved; the only input the
/// executor accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalRequestOptions {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the base URL, or an absolute URL.
    pub path: String,
    /// Query object.
    pub query: Option<Value>,
    /// Request body.
    pub body: Option<RequestBody>,
    /// Per-request headers.
    pub headers: Headers,
    /// Retry budget override.
    pub max_retries: Option<Number>,
    /// Per-attempt timeout override, in milliseconds.
    pub timeout_ms: Option<Number>,
    /// Idempotency key; once set it is reused on every attempt.
    pub idempotency_key: Option<String>,
    /// Whether the response is consumed as an event stream.
    pub stream: bool,
}

impl FinalRequestOptions {
    /// Options with nothing but a method and path.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self::from_options(method, path, RequestOptions::default())
    }

    /// Resolves `options`, falling back to `method` and `path` where the
    /// options leave them unset.
    pub fn from_options(
        method: HttpMethod,
        path: impl Into<String>,
        options: RequestOptions,
    ) -> Self {
        Self {
            method: options.method.unwrap_or(method),
            path: options.path.unwrap_or_else(|| path.into()),
            query: options.query,
            body: options.body,
            headers: options.headers,
            max_retries: options.max_retries,
            timeout_ms: options.timeout_ms,
            idempotency_key: options.idempotency_key,
            stream: options.stream,
        }
    }

    /// Converts back to the optional form, for passing through the form
    /// encoder.
    pub fn into_options(self) -> RequestOptions {
        RequestOptions {
            method: Some(self.method),
            path: Some(self.path),
            query: self.query,
            body: self.body,
            headers: self.headers,
            max_retries: self.max_retries,
            timeout_ms: self.timeout_ms,
            idempotency_key: self.idempotency_key,
            stream: self.stream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_options_override_helper_defaults() {
        let options = RequestOptions::new().method(HttpMethod::Put).path("/other");
        let resolved = FinalRequestOptions::from_options(HttpMethod::Get, "/cards", options);
        assert_eq!(resolved.method, HttpMethod::Put);
        assert_eq!(resolved.path, "/other");
    }

    #[test]
    fn test_helper_fills_missing_method_and_path() {
        let options = RequestOptions::new().query(json!({"a": 1})).stream(true);
        let resolved = FinalRequestOptions::from_options(HttpMethod::Post, "/cards", options);
        assert_eq!(resolved.method, HttpMethod::Post);
        assert_eq!(resolved.path, "/cards");
        assert_eq!(resolved.query, Some(json!({"a": 1})));
        assert!(resolved.stream);
    }

    #[test]
    fn test_round_trip_through_request_options() {
        let resolved = FinalRequestOptions::new(HttpMethod::Delete, "/cards/1");
        let back = resolved.clone().into_options();
        assert_eq!(
            FinalRequestOptions::from_options(HttpMethod::Get, "/ignored", back),
            resolved
        );
    }
}
