//! Retry policy and delay computation.

use std::time::Duration;

use rand::Rng;

use crate::headers::Headers;

/// Base of the quadratic back-off, in seconds.
const INITIAL_RETRY_DELAY_SECS: f64 = 0.5;

/// Back-off ceiling, in seconds.
const MAX_RETRY_DELAY_SECS: f64 = 2.0;

/// Largest `Retry-After` the client honours verbatim.
const MAX_RETRY_AFTER_SECS: u64 = 60;

/// Non-standard header a server may send to force or forbid a retry.
pub const SHOULD_RETRY_HEADER: &str = "x-should-retry";

/// Decides whether a non-success response is worth retrying.
///
/// An explicit `x-should-retry: true|false` from the server wins. Otherwise
/// lock timeouts (409), rate limits (429) and server errors (5xx) are
/// retried.
pub fn should_retry(status: u16, headers: &Headers) -> bool {
    match headers.get(SHOULD_RETRY_HEADER) {
        Some("true") => return true,
        Some("false") => return false,
        _ => {}
    }
    status == 409 || status == 429 || status >= 500
}

/// Reads a `Retry-After` header given in whole seconds, up to a minute.
///
/// The HTTP-date form is not honoured; it falls back to back-off.
pub fn parse_retry_after(headers: &Headers) -> Option<u64> {
    headers
        .get("retry-after")?
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs <= MAX_RETRY_AFTER_SECS)
}

/// Quadratic back-off for the `retries_used`-th retry with the given jitter
/// (in seconds), clamped at zero.
///
/// ## Examples
///
/// ```rust
/// use courier::client::backoff_delay;
/// use std::time::Duration;
///
/// assert_eq!(backoff_delay(1, 0.0), Duration::ZERO);
/// assert_eq!(backoff_delay(2, 0.0), Duration::from_millis(500));
/// assert_eq!(backoff_delay(5, 0.25), Duration::from_millis(2250));
/// ```
pub fn backoff_delay(retries_used: u64, jitter: f64) -> Duration {
    let exponent = retries_used as f64 - 1.0;
    let base = (INITIAL_RETRY_DELAY_SECS * exponent * exponent).min(MAX_RETRY_DELAY_SECS);
    Duration::from_secs_f64((base + jitter).max(0.0))
}

/// How long to wait before the next attempt.
///
/// `retries_remaining` is the budget left after this retry has been counted.
/// A valid `Retry-After` is used as is; otherwise back-off applies with
/// jitter drawn uniformly from half a second either way.
pub fn retry_delay(max_retries: u64, retries_remaining: u64, headers: Option<&Headers>) -> Duration {
    if let Some(secs) = headers.and_then(parse_retry_after) {
        return Duration::from_secs(secs);
    }
    let retries_used = max_retries.saturating_sub(retries_remaining);
    let jitter = rand::thread_rng().gen::<f64>() - 0.5;
    backoff_delay(retries_used, jitter)
}
