//! Injectable request logging.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::headers::Headers;
use crate::method::HttpMethod;

/// Receives a callback for each stage of a request.
///
/// Every hook defaults to a no-op, so implementors only override what they
/// need. A logger is supplied once at client construction with
/// [`ApiClientBuilder::logger`](crate::ApiClientBuilder::logger).
pub trait RequestLogger: Send + Sync + fmt::Debug {
    /// An attempt is about to be sent.
    fn request(&self, _method: HttpMethod, _url: &str, _headers: &Headers) {}

    /// A response arrived, successful or not.
    fn response(&self, _status: u16, _url: &str, _headers: &Headers) {}

    /// A failed attempt will be retried after `delay`.
    fn retry(&self, _retries_remaining: u64, _delay: Duration, _reason: &str) {}
}

/// Emits `debug!` events through `tracing`. The default logger.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl RequestLogger for TracingLogger {
    fn request(&self, method: HttpMethod, url: &str, headers: &Headers) {
        debug!(
            http.method = %method,
            http.url = url,
            header_count = headers.iter().count(),
            "Sending request"
        );
    }

    fn response(&self, status: u16, url: &str, headers: &Headers) {
        debug!(
            http.status_code = status,
            http.url = url,
            content_type = headers.get("content-type").unwrap_or_default(),
            "Received response"
        );
    }

    fn retry(&self, retries_remaining: u64, delay: Duration, reason: &str) {
        debug!(
            retries_remaining,
            retry.delay_ms = delay.as_millis() as u64,
            reason,
            "Scheduling retry"
        );
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLogger;

impl RequestLogger for NoopLogger {}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    #[traced_test]
    fn test_tracing_logger_emits_debug_events() {
        let logger = TracingLogger;
        logger.request(HttpMethod::Post, "https://api.test/cards", &Headers::new());
        logger.response(201, "https://api.test/cards", &Headers::new());
        logger.retry(1, Duration::from_millis(250), "status 503");

        assert!(logs_contain("Sending request"));
        assert!(logs_contain("Received response"));
        assert!(logs_contain("Scheduling retry"));
        assert!(logs_contain("retry.delay_ms=250"));
    }

    #[test]
    #[traced_test]
    fn test_noop_logger_is_silent() {
        let logger = NoopLogger;
        logger.request(HttpMethod::Get, "https://api.test/cards", &Headers::new());
        assert!(!logs_contain("Sending request"));
    }
}
