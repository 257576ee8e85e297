//! Assembly of wire-level requests from logical options.

use std::sync::LazyLock;
use std::time::Duration;

use bytes::Bytes;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;
use uuid::Uuid;

use super::ApiClient;
use crate::error::{validate_non_negative_integer, ApiError, ConfigError};
use crate::form::maybe_multipart;
use crate::headers::Headers;
use crate::method::HttpMethod;
use crate::options::{FinalRequestOptions, RequestBody};
use crate::platform::platform_headers;
use crate::query::to_query_string;

/// Scheme-prefixed (`https://`) or protocol-relative (`//`) URLs.
static ABSOLUTE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:[a-z]+:)?//").expect("Invalid absolute URL regex"));

/// One fully assembled attempt, ready to send.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Final URL, query included.
    pub url: Url,
    /// Final headers, suppressed entries removed.
    pub headers: Headers,
    /// Encoded body.
    pub body: Option<Bytes>,
    /// Deadline for this attempt.
    pub timeout: Duration,
}

impl WireRequest {
    /// Converts into a transport request on `http`.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidHeader`] if a header name or value
    /// cannot be sent over HTTP.
    pub fn into_reqwest(self, http: &reqwest::Client) -> Result<reqwest::RequestBuilder, ConfigError> {
        let mut map = HeaderMap::new();
        for (name, value) in self.headers.iter() {
            let header_name = HeaderName::try_from(name)
                .map_err(|e| ConfigError::invalid_header(name, e.to_string()))?;
            let header_value = HeaderValue::try_from(value)
                .map_err(|e| ConfigError::invalid_header(name, e.to_string()))?;
            map.insert(header_name, header_value);
        }
        let mut request = http.request(self.method.to_reqwest(), self.url).headers(map);
        if let Some(body) = self.body {
            request = request.body(body);
        }
        Ok(request)
    }
}

/// Resolves `path` against `base_url` and attaches the serialized query.
///
/// Absolute URLs are used verbatim; protocol-relative ones borrow the base
/// URL's scheme. Anything else is appended to the base URL as a string, so a
/// base path such as `/v1` is kept. A query object replaces any query already
/// present on the path.
///
/// ## Examples
///
/// ```rust
/// use courier::client::build_url;
/// use serde_json::json;
///
/// let url = build_url("https://api.example.com/v1", "/cards", Some(&json!({"page": 2}))).unwrap();
/// assert_eq!(url.as_str(), "https://api.example.com/v1/cards?page=2");
///
/// let url = build_url("https://api.example.com/v1", "https://files.example.com/x", None).unwrap();
/// assert_eq!(url.as_str(), "https://files.example.com/x");
/// ```
///
/// ## Errors
///
/// Returns [`ConfigError::InvalidUrl`] if the result does not parse.
pub fn build_url(base_url: &str, path: &str, query: Option<&Value>) -> Result<Url, ConfigError> {
    let mut url = if ABSOLUTE_URL_RE.is_match(path) {
        if path.starts_with("//") {
            let base = Url::parse(base_url)?;
            Url::parse(&format!("{}:{path}", base.scheme()))?
        } else {
            Url::parse(path)?
        }
    } else {
        Url::parse(&format!("{base_url}{path}"))?
    };

    if let Some(query) = query {
        let serialized = to_query_string(query);
        url.set_query((!serialized.is_empty()).then_some(serialized.as_str()));
    }
    Ok(url)
}

/// A fresh idempotency key.
fn default_idempotency_key() -> String {
    format!("courier-retry-{}", Uuid::new_v4())
}

impl ApiClient {
    /// Readies options for a logical call.
    ///
    /// Form bodies are validated and, when they carry a file, replaced by a
    /// multipart body. On non-GET calls with an idempotency header configured
    /// a key is generated unless the caller supplied one; every attempt of
    /// the call then reuses it.
    ///
    /// ## Errors
    ///
    /// Returns [`MultipartError`](crate::error::MultipartError) if the form
    /// body contains a null.
    pub fn prepare_options(&self, options: FinalRequestOptions) -> Result<FinalRequestOptions, ApiError> {
        let mut options = if matches!(options.body, Some(RequestBody::Form(_))) {
            let (method, path) = (options.method, options.path.clone());
            FinalRequestOptions::from_options(method, path, maybe_multipart(options.into_options())?)
        } else {
            options
        };

        if self.inner.idempotency_header.is_some()
            && options.method.sends_idempotency_key()
            && options.idempotency_key.is_none()
        {
            options.idempotency_key = Some(default_idempotency_key());
        }
        Ok(options)
    }

    /// Assembles one attempt. Performs no I/O.
    ///
    /// Headers are layered with per-request headers over client defaults,
    /// client defaults over platform headers, and platform headers over
    /// authentication headers; entries suppressed at any layer are dropped.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError`] for an invalid timeout, an unparseable URL,
    /// or headers rejected by the configured validator.
    pub fn build_request(&self, options: &FinalRequestOptions) -> Result<WireRequest, ApiError> {
        let inner = &self.inner;
        let timeout_ms = match &options.timeout_ms {
            Some(timeout) => validate_non_negative_integer("timeout", timeout)?,
            None => inner.timeout_ms,
        };

        let (body, content_type) = match &options.body {
            None => (None, None),
            Some(RequestBody::Json(json)) => (Some(Bytes::from(serde_json::to_vec(json)?)), None),
            Some(RequestBody::Form(form)) => (Some(Bytes::from(serde_json::to_vec(form)?)), None),
            Some(RequestBody::Raw {
                bytes,
                content_type,
            }) => (Some(bytes.clone()), content_type.clone()),
        };
        let computed_length = match &options.body {
            Some(RequestBody::Json(_) | RequestBody::Form(_)) => body.as_ref().map(Bytes::len),
            _ => None,
        };

        let mut per_request = options.headers.clone();
        if let Some(name) = &inner.idempotency_header {
            if options.method.sends_idempotency_key() {
                let key = options
                    .idempotency_key
                    .clone()
                    .unwrap_or_else(default_idempotency_key);
                per_request.insert(name.clone(), key);
            }
        }

        let mut headers = Headers::new();
        if let Some(length) = computed_length {
            headers.insert("Content-Length", length.to_string());
        }
        headers.merge(&inner.auth_headers);
        headers.merge(platform_headers());
        headers.merge(&inner.default_headers);
        if let Some(content_type) = content_type {
            headers.insert("Content-Type", content_type);
        }
        headers.merge(&per_request);
        let headers = headers.without_suppressed();

        if let Some(validator) = &inner.header_validator {
            validator(&headers, &per_request)?;
        }

        let url = build_url(&inner.base_url, &options.path, options.query.as_ref())?;

        Ok(WireRequest {
            method: options.method,
            url,
            headers,
            body,
            timeout: Duration::from_millis(timeout_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::{FilePart, FormValue};
    use crate::options::RequestOptions;
    use serde_json::json;

    fn client() -> ApiClient {
        ApiClient::builder("https://api.example.com/v1")
            .idempotency_header("Idempotency-Key")
            .auth_header("Authorization", "Bearer sk-test")
            .build()
            .unwrap()
    }

    fn options(method: HttpMethod, request: RequestOptions) -> FinalRequestOptions {
        FinalRequestOptions::from_options(method, "/cards", request)
    }

    #[test]
    fn test_build_url_relative_keeps_base_path() {
        let url = build_url("https://api.example.com/v1", "/cards/abc", None).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/cards/abc");
    }

    #[test]
    fn test_build_url_absolute_forms() {
        let url = build_url("https://api.example.com", "HTTP://other.test/a", None).unwrap();
        assert_eq!(url.as_str(), "http://other.test/a");

        let url = build_url("https://api.example.com", "//cdn.example.com/a", None).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/a");
    }

    #[test]
    fn test_build_url_query_replaces_existing() {
        let url = build_url(
            "https://api.example.com",
            "/cards?stale=1",
            Some(&json!({"filter": {"state": "OPEN"}})),
        )
        .unwrap();
        assert_eq!(url.query(), Some("filter%5Bstate%5D=OPEN"));

        let url = build_url("https://api.example.com", "/cards?stale=1", Some(&json!({}))).unwrap();
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_standard_headers_present() {
        let client = client();
        let wire = client
            .build_request(&options(HttpMethod::Get, RequestOptions::new()))
            .unwrap();

        assert_eq!(wire.headers.get("accept"), Some("application/json"));
        assert_eq!(wire.headers.get("content-type"), Some("application/json"));
        assert!(wire.headers.get("user-agent").unwrap().starts_with("Courier/Rust "));
        assert_eq!(wire.headers.get("authorization"), Some("Bearer sk-test"));
        assert_eq!(wire.headers.get("x-client-lang"), Some("rust"));
        assert!(wire.headers.get("content-length").is_none());
        assert_eq!(wire.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_header_precedence() {
        let client = ApiClient::builder("https://api.example.com")
            .auth_header("X-Layer", "auth")
            .auth_header("X-Client-Lang", "auth")
            .default_header("X-Layer", "default")
            .build()
            .unwrap();

        let wire = client
            .build_request(&options(HttpMethod::Get, RequestOptions::new()))
            .unwrap();
        assert_eq!(wire.headers.get("x-layer"), Some("default"));
        assert_eq!(wire.headers.get("x-client-lang"), Some("rust"));

        let wire = client
            .build_request(&options(
                HttpMethod::Get,
                RequestOptions::new()
                    .header("x-layer", "request")
                    .suppress_header("User-Agent"),
            ))
            .unwrap();
        assert_eq!(wire.headers.get("X-Layer"), Some("request"));
        assert!(wire.headers.get("user-agent").is_none());
        assert!(wire.headers.iter().all(|(name, _)| !name.eq_ignore_ascii_case("user-agent")));
    }

    #[test]
    fn test_json_body_gets_content_length() {
        let client = client();
        let wire = client
            .build_request(&options(
                HttpMethod::Post,
                RequestOptions::new().json(json!({"memo": "rent"})),
            ))
            .unwrap();
        let body = wire.body.unwrap();
        assert_eq!(&body[..], br#"{"memo":"rent"}"#);
        assert_eq!(
            wire.headers.get("content-length"),
            Some(body.len().to_string().as_str())
        );
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let client = client();
        let err = client
            .build_request(&options(HttpMethod::Get, RequestOptions::new().timeout_ms(-5)))
            .unwrap_err();
        assert_eq!(err.to_string(), "timeout must be a positive integer, got -5");
    }

    #[test]
    fn test_idempotency_key_generated_once_per_call() {
        let client = client();
        let first = client
            .prepare_options(options(HttpMethod::Post, RequestOptions::new()))
            .unwrap();
        let key = first.idempotency_key.clone().unwrap();
        assert!(key.starts_with("courier-retry-"));

        let attempt_one = client.build_request(&first).unwrap();
        let attempt_two = client.build_request(&first).unwrap();
        assert_eq!(attempt_one.headers.get("idempotency-key"), Some(key.as_str()));
        assert_eq!(attempt_two.headers.get("idempotency-key"), Some(key.as_str()));

        let second = client
            .prepare_options(options(HttpMethod::Post, RequestOptions::new()))
            .unwrap();
        assert_ne!(second.idempotency_key, first.idempotency_key);
    }

    #[test]
    fn test_idempotency_key_rules() {
        let client = client();
        let get = client
            .prepare_options(options(HttpMethod::Get, RequestOptions::new()))
            .unwrap();
        assert!(get.idempotency_key.is_none());
        assert!(!client.build_request(&get).unwrap().headers.contains("idempotency-key"));

        let explicit = client
            .prepare_options(options(
                HttpMethod::Delete,
                RequestOptions::new().idempotency_key("mine"),
            ))
            .unwrap();
        assert_eq!(explicit.idempotency_key.as_deref(), Some("mine"));

        let plain = ApiClient::builder("https://api.example.com").build().unwrap();
        let post = plain
            .prepare_options(options(HttpMethod::Post, RequestOptions::new()))
            .unwrap();
        assert!(post.idempotency_key.is_none());
    }

    #[test]
    fn test_idempotency_key_is_uuid_v4() {
        let key = default_idempotency_key();
        let id = key.strip_prefix("courier-retry-").unwrap();
        let parsed = Uuid::parse_str(id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(parsed.hyphenated().to_string(), id);
    }

    #[test]
    fn test_file_body_becomes_multipart() {
        let client = client();
        let body = FormValue::object()
            .field("tags", FormValue::array(["x", "y"]))
            .field("file", FilePart::new(&b"bytes"[..]).file_name("f.bin"));
        let prepared = client
            .prepare_options(options(HttpMethod::Post, RequestOptions::new().form(body)))
            .unwrap();
        let wire = client.build_request(&prepared).unwrap();

        let content_type = wire.headers.get("content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = wire.body.unwrap();
        assert_eq!(
            wire.headers.get("content-length"),
            Some(body.len().to_string().as_str())
        );
    }

    #[test]
    fn test_form_body_without_file_stays_json() {
        let client = client();
        let prepared = client
            .prepare_options(options(
                HttpMethod::Post,
                RequestOptions::new().form(FormValue::from(json!({"tags": ["x", "y"]}))),
            ))
            .unwrap();
        let wire = client.build_request(&prepared).unwrap();
        assert_eq!(wire.headers.get("content-type"), Some("application/json"));
        assert_eq!(&wire.body.unwrap()[..], br#"{"tags":["x","y"]}"#);
    }

    #[test]
    fn test_header_validator_can_reject() {
        let client = ApiClient::builder("https://api.example.com")
            .header_validator(|headers, _custom| {
                if headers.contains("authorization") {
                    Ok(())
                } else {
                    Err(ConfigError::invalid_header("Authorization", "missing API key"))
                }
            })
            .build()
            .unwrap();
        let err = client
            .build_request(&options(HttpMethod::Get, RequestOptions::new()))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid header Authorization: missing API key");
    }

    #[test]
    fn test_into_reqwest_rejects_bad_header() {
        let client = client();
        let mut wire = client
            .build_request(&options(HttpMethod::Get, RequestOptions::new()))
            .unwrap();
        wire.headers.insert("X-Bad", "line\nbreak");
        let err = wire.into_reqwest(&reqwest::Client::new()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader { .. }));
    }
}
