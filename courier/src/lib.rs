//! Shared HTTP request/response engine for generated REST API wrappers.
//!
//! The `courier` crate is the layer every resource wrapper calls into. A
//! wrapper supplies a method, a path and a typed body; the engine does the
//! rest.
//!
//! ## Features
//!
//! - **Request building**: layered default, platform and auth headers,
//!   bracketed query strings, JSON or automatic `multipart/form-data` bodies
//! - **Retries**: per-attempt deadlines, server retry hints, `Retry-After`,
//!   and jittered back-off, with one idempotency key per logical call
//! - **Layered error handling**: connection, status and decode errors as
//!   distinct types
//! - **Auto-pagination**: lazy iteration over every item of every page
//! - **Streaming**: event-stream responses as a `futures::Stream` that always
//!   releases its connection
//!
//! ## Example
//!
//! ```rust,ignore
//! use courier::pagination::NumberedPage;
//! use courier::{ApiClient, RequestOptions};
//! use futures::TryStreamExt;
//! use serde_json::{json, Value};
//!
//! let client = ApiClient::builder("https://api.example.com/v1")
//!     .auth_header("Authorization", "sk-xxx")
//!     .idempotency_header("Idempotency-Key")
//!     .build()?;
//!
//! let card = client
//!     .post::<Value>("/cards", RequestOptions::new().json(json!({"type": "VIRTUAL"})))
//!     .await?;
//!
//! let mut cards = client
//!     .get_api_list::<NumberedPage<Value>>("/cards", RequestOptions::new())
//!     .into_items();
//! while let Some(card) = cards.try_next().await? {
//!     println!("{}", card["token"]);
//! }
//! ```

pub mod client;
pub mod coerce;
pub mod error;
pub mod form;
pub mod headers;
pub mod method;
pub mod options;
pub mod pagination;
pub mod platform;
pub mod query;
pub mod resource;
pub mod response;
pub mod streaming;

// Re-exports for convenience
pub use client::{ApiClient, ApiClientBuilder, ClientConfig, NoopLogger, RequestLogger, TracingLogger};
pub use error::{ApiError, ConfigError, ConnectionError, MultipartError, StatusError, StatusKind};
pub use headers::Headers;
pub use method::HttpMethod;
pub use options::{FinalRequestOptions, RequestBody, RequestOptions};
pub use pagination::{Page, PageInfo, PagePromise, Pagination};
pub use resource::ApiResource;
pub use response::ApiResponse;
pub use streaming::Stream;
