//! Lazy decoding of server-streamed responses.
//!
//! A [`Stream`] reads the response body chunk by chunk. Bytes are buffered
//! until a line is complete, so frames and multi-byte characters may span
//! chunks. Every line is decoded with [`decode_frame`]: `data: `
//! prefixes are stripped, `[DONE]` ends the stream, and anything else is
//! decoded as JSON. The underlying connection is released through the
//! stream's [`StreamController`] exactly once, whether the stream finishes,
//! fails, or is dropped early.
//!
//! ## Examples
//!
//! ```rust,ignore
//! use courier::{FinalRequestOptions, HttpMethod, RequestOptions};
//! use futures::TryStreamExt;
//! use serde_json::Value;
//!
//! let mut events = client
//!     .stream::<Value>(FinalRequestOptions::new(HttpMethod::Get, "/events"))
//!     .await?;
//! while let Some(event) = events.try_next().await? {
//!     println!("{event}");
//! }
//! ```

mod controller;
mod frame;

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;

pub use controller::StreamController;
pub use frame::{decode_frame, Frame};

use crate::error::{ApiError, ResponseError};
use crate::headers::Headers;

/// A body as a sequence of transport chunks.
pub type BodyStream = Pin<Box<dyn futures::Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// A one-pass sequence of decoded events.
pub struct Stream<T> {
    body: Option<BodyStream>,
    buffer: BytesMut,
    pending: VecDeque<String>,
    headers: Headers,
    controller: StreamController,
    exhausted: bool,
    finished: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Stream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("has_body", &self.body.is_some())
            .field("buffered", &self.buffer.len())
            .field("pending", &self.pending.len())
            .field("headers", &self.headers)
            .field("controller", &self.controller)
            .field("finished", &self.finished)
            .finish()
    }
}

impl<T> Stream<T> {
    /// Wraps an open body.
    ///
    /// `body` is `None` when the response has no body; the first poll then
    /// fails with [`ResponseError::MissingBody`].
    pub fn new(body: Option<BodyStream>, headers: Headers, controller: StreamController) -> Self {
        Self {
            body,
            buffer: BytesMut::new(),
            pending: VecDeque::new(),
            headers,
            controller,
            exhausted: false,
            finished: false,
            _item: PhantomData,
        }
    }

    /// Wraps a transport response.
    pub fn from_response(response: reqwest::Response, headers: Headers, controller: StreamController) -> Self {
        let body = match response.content_length() {
            Some(0) => None,
            _ => Some(Box::pin(response.bytes_stream()) as BodyStream),
        };
        Self::new(body, headers, controller)
    }

    /// Headers of the streaming response.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns `true` once the connection has been released.
    pub fn is_aborted(&self) -> bool {
        self.controller.is_aborted()
    }

    /// Stops the stream and releases the connection.
    pub fn abort(&mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.finished = true;
        self.buffer.clear();
        self.pending.clear();
        self.body = None;
        self.controller.abort();
    }

    /// Moves every complete `\n`-terminated line out of the buffer.
    fn split_lines(&mut self) {
        while let Some(idx) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(idx + 1);
            self.pending
                .push_back(String::from_utf8_lossy(&line[..idx]).into_owned());
        }
    }

    /// Flushes an unterminated final line once the body has ended.
    fn flush_remainder(&mut self) {
        if !self.buffer.is_empty() {
            let rest = self.buffer.split();
            self.pending.push_back(String::from_utf8_lossy(&rest).into_owned());
        }
    }
}

impl<T: DeserializeOwned> futures::Stream for Stream<T> {
    type Item = Result<T, ApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        loop {
            if this.finished {
                return Poll::Ready(None);
            }

            if let Some(line) = this.pending.pop_front() {
                match decode_frame::<T>(&line) {
                    Ok(Frame::Item(item)) => return Poll::Ready(Some(Ok(item))),
                    Ok(Frame::Skip) => continue,
                    Ok(Frame::Done) => {
                        this.finish();
                        return Poll::Ready(None);
                    }
                    Err(err) => {
                        this.finish();
                        return Poll::Ready(Some(Err(err.into())));
                    }
                }
            }

            if this.exhausted {
                this.finish();
                return Poll::Ready(None);
            }

            let Some(body) = this.body.as_mut() else {
                this.finish();
                return Poll::Ready(Some(Err(ResponseError::MissingBody.into())));
            };

            match ready!(body.as_mut().poll_next(cx)) {
                Some(Ok(chunk)) => {
                    this.buffer.extend_from_slice(&chunk);
                    this.split_lines();
                }
                Some(Err(err)) => {
                    this.finish();
                    return Poll::Ready(Some(Err(ResponseError::Body(err).into())));
                }
                None => {
                    this.body = None;
                    this.exhausted = true;
                    this.flush_remainder();
                }
            }
        }
    }
}

impl<T> Drop for Stream<T> {
    fn drop(&mut self) {
        self.controller.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_controller() -> (StreamController, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let controller = StreamController::with_abort(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (controller, calls)
    }

    fn byte_body(chunks: &[&'static [u8]]) -> Option<BodyStream> {
        let chunks: Vec<Result<Bytes, reqwest::Error>> =
            chunks.iter().map(|c| Ok(Bytes::from_static(c))).collect();
        Some(Box::pin(futures::stream::iter(chunks)))
    }

    fn body(chunks: &[&'static str]) -> Option<BodyStream> {
        let chunks: Vec<&'static [u8]> = chunks.iter().map(|c| c.as_bytes()).collect();
        byte_body(&chunks)
    }

    #[tokio::test]
    async fn test_done_ends_stream() {
        let (controller, calls) = counting_controller();
        let stream: Stream<Value> = Stream::new(
            body(&["data: {\"a\":1}\n", "data: [DONE]\n", "data: {\"never\":true}\n"]),
            Headers::new(),
            controller,
        );

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), &json!({"a": 1}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_multiple_frames_per_chunk() {
        let (controller, calls) = counting_controller();
        let stream: Stream<Value> = Stream::new(
            body(&["data: 1\n\n: ping\ndata: 2\n", "data: 3"]),
            Headers::new(),
            controller,
        );

        let items: Vec<Value> = stream.map(|item| item.unwrap()).collect().await;
        assert_eq!(items, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_frame_split_across_chunks() {
        let (controller, calls) = counting_controller();
        let stream: Stream<Value> = Stream::new(
            body(&["data: {\"a\":", "1}\n", "\ndata: [DO", "NE]\n"]),
            Headers::new(),
            controller,
        );

        let items: Vec<Value> = stream.map(|item| item.unwrap()).collect().await;
        assert_eq!(items, vec![json!({"a": 1})]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_character_split_across_chunks() {
        let (controller, _calls) = counting_controller();
        let stream: Stream<String> = Stream::new(
            byte_body(&[&b"data: \"caf\xC3"[..], &b"\xA9\"\r\n"[..], &b"data: [DONE]\n"[..]]),
            Headers::new(),
            controller,
        );

        let items: Vec<String> = stream.map(|item| item.unwrap()).collect().await;
        assert_eq!(items, vec!["café".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_body_ends_without_error() {
        let (controller, calls) = counting_controller();
        let mut stream: Stream<Value> = Stream::new(body(&[]), Headers::new(), controller);

        assert!(stream.next().await.is_none());
        assert!(stream.is_aborted());
        drop(stream);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_body_fails_immediately() {
        let (controller, calls) = counting_controller();
        let mut stream: Stream<Value> = Stream::new(None, Headers::new(), controller);

        let first = stream.next().await.unwrap();
        assert!(matches!(
            first,
            Err(ApiError::Response(ResponseError::MissingBody))
        ));
        assert!(stream.next().await.is_none());
        assert!(stream.is_aborted());
        drop(stream);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_decode_error_releases_connection() {
        let (controller, calls) = counting_controller();
        let mut stream: Stream<Value> = Stream::new(
            body(&["data: {\"a\":1}\n", "data: not json\n", "data: {\"b\":2}\n"]),
            Headers::new(),
            controller,
        );

        assert!(stream.next().await.unwrap().is_ok());
        assert!(matches!(
            stream.next().await.unwrap(),
            Err(ApiError::Response(ResponseError::Decode(_)))
        ));
        assert!(stream.next().await.is_none());
        drop(stream);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_early_drop_releases_once() {
        let (controller, calls) = counting_controller();
        let mut stream: Stream<Value> = Stream::new(
            body(&["data: 1\n", "data: 2\n", "data: 3\n"]),
            Headers::new(),
            controller,
        );

        assert_eq!(stream.next().await.unwrap().unwrap(), json!(1));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        drop(stream);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_explicit_abort() {
        let (controller, calls) = counting_controller();
        let mut stream: Stream<Value> = Stream::new(body(&["data: 1"]), Headers::new(), controller);
        stream.abort();
        stream.abort();
        assert!(stream.next().await.is_none());
        drop(stream);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
