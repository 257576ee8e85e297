//! Decoding of individual event-stream frames.

use serde::de::DeserializeOwned;

use crate::error::ResponseError;

/// Prefix carried by event-stream data lines.
const DATA_PREFIX: &str = "data: ";

/// Sentinel that ends the stream.
const DONE_SENTINEL: &str = "[DONE]";

/// The meaning of one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame<T> {
    /// A decoded item.
    Item(T),
    /// The end-of-stream sentinel.
    Done,
    /// A blank line or comment.
    Skip,
}

/// Decodes one line of an event stream.
///
/// ## Examples
///
/// ```rust
/// use courier::streaming::{decode_frame, Frame};
/// use serde_json::{json, Value};
///
/// assert_eq!(decode_frame::<Value>(r#"data: {"a":1}"#).unwrap(), Frame::Item(json!({"a": 1})));
/// assert_eq!(decode_frame::<Value>("data: [DONE]").unwrap(), Frame::Done);
/// assert_eq!(decode_frame::<Value>(": keep-alive").unwrap(), Frame::Skip);
/// ```
///
/// ## Errors
///
/// Returns [`ResponseError::Decode`] if the payload is not valid JSON for
/// `T`.
pub fn decode_frame<T: DeserializeOwned>(line: &str) -> Result<Frame<T>, ResponseError> {
    let line = line.trim_end_matches('\r');
    if line.trim().is_empty() || line.starts_with(':') {
        return Ok(Frame::Skip);
    }
    let payload = line.strip_prefix(DATA_PREFIX).unwrap_or(line);
    if payload.starts_with(DONE_SENTINEL) {
        return Ok(Frame::Done);
    }
    Ok(Frame::Item(serde_json::from_str(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_bare_json_without_prefix() {
        assert_eq!(
            decode_frame::<Value>(r#"{"b":2}"#).unwrap(),
            Frame::Item(json!({"b": 2}))
        );
    }

    #[test]
    fn test_carriage_return_is_ignored() {
        assert_eq!(
            decode_frame::<Value>("data: [1,2]\r").unwrap(),
            Frame::Item(json!([1, 2]))
        );
        assert_eq!(decode_frame::<Value>("\r").unwrap(), Frame::Skip);
    }

    #[test]
    fn test_done_without_prefix() {
        assert_eq!(decode_frame::<Value>("[DONE]").unwrap(), Frame::Done);
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = decode_frame::<Value>("data: {oops").unwrap_err();
        assert!(matches!(err, ResponseError::Decode(_)));
    }
}
