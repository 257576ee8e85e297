//! Form bodies and automatic `multipart/form-data` encoding.
//!
//! A [`RequestBody::Form`](crate::RequestBody::Form) is a JSON-like tree
//! ([`FormValue`]) whose leaves may be binary [`FilePart`]s. Before a request
//! is built, [`maybe_multipart`] flattens the tree into bracketed field
//! names; if any field is a file the body is replaced by an encoded
//! [`MultipartForm`] together with matching `Content-Type` and
//! `Content-Length` headers, otherwise the body is sent as JSON.

mod encoder;
mod value;

pub use encoder::{
    flatten_form, maybe_multipart, multipart_form, FieldValue, FormField, MultipartForm,
};
pub use value::{FilePart, FormValue};
