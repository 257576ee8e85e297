//! Flattening of form bodies and `multipart/form-data` encoding.

use bytes::{BufMut, Bytes, BytesMut};
use rand::distributions::Alphanumeric;
use rand::Rng;

use super::value::{FilePart, FormValue};
use crate::error::MultipartError;
use crate::options::{RequestBody, RequestOptions};

/// The value of one flattened form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A scalar rendered as text.
    Text(String),
    /// A binary payload.
    File(FilePart),
}

/// One named entry of a flattened form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    /// The bracketed field name, e.g. `metadata[owner]` or `tags[]`.
    pub name: String,
    /// The field's value.
    pub value: FieldValue,
}

/// Flattens a body tree into form fields.
///
/// - scalars become one field under their key
/// - arrays repeat the field once per element under `key[]`
/// - objects recurse with `parent[child]` keys
/// - `null` anywhere is rejected
///
/// ## Errors
///
/// Returns [`MultipartError::NullValue`] naming the first null found.
pub fn flatten_form(body: &FormValue) -> Result<Vec<FormField>, MultipartError> {
    let mut fields = Vec::new();
    match body {
        FormValue::Object(entries) => {
            for (key, value) in entries {
                flatten_into(&mut fields, key.clone(), value)?;
            }
        }
        other => flatten_into(&mut fields, String::new(), other)?,
    }
    Ok(fields)
}

fn flatten_into(
    fields: &mut Vec<FormField>,
    key: String,
    value: &FormValue,
) -> Result<(), MultipartError> {
    let text = |s: String| FieldValue::Text(s);
    match value {
        FormValue::Null => return Err(MultipartError::NullValue { key }),
        FormValue::Bool(b) => fields.push(FormField {
            name: key,
            value: text(b.to_string()),
        }),
        FormValue::Number(n) => fields.push(FormField {
            name: key,
            value: text(n.to_string()),
        }),
        FormValue::String(s) => fields.push(FormField {
            name: key,
            value: text(s.clone()),
        }),
        FormValue::File(file) => fields.push(FormField {
            name: key,
            value: FieldValue::File(file.clone()),
        }),
        FormValue::Array(items) => {
            for item in items {
                flatten_into(fields, format!("{key}[]"), item)?;
            }
        }
        FormValue::Object(entries) => {
            for (child, item) in entries {
                flatten_into(fields, format!("{key}[{child}]"), item)?;
            }
        }
    }
    Ok(())
}

/// A bounded `multipart/form-data` body.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    fields: Vec<FormField>,
}

impl MultipartForm {
    /// Creates a form with a freshly generated boundary.
    pub fn new(fields: Vec<FormField>) -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(16)
            .map(char::from)
            .collect();
        Self::with_boundary(fields, format!("form-data-boundary-{suffix}"))
    }

    /// Creates a form with a fixed boundary.
    pub fn with_boundary(fields: Vec<FormField>, boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            fields,
        }
    }

    /// The boundary delimiter.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// The flattened fields, in order.
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// The `Content-Type` header value for this form.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Encodes the form into its wire representation.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();
        for field in &self.fields {
            buf.put_slice(format!("--{}\r\n", self.boundary).as_bytes());
            let name = escape_name(&field.name);
            match &field.value {
                FieldValue::Text(text) => {
                    buf.put_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                            .as_bytes(),
                    );
                    buf.put_slice(text.as_bytes());
                }
                FieldValue::File(file) => {
                    let file_name = escape_name(file.file_name.as_deref().unwrap_or("blob"));
                    let content_type = file
                        .content_type
                        .as_deref()
                        .unwrap_or("application/octet-stream");
                    buf.put_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    buf.put_slice(&file.data);
                }
            }
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        buf.freeze()
    }
}

fn escape_name(name: &str) -> String {
    name.replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace('"', "%22")
}

/// Switches a form body to `multipart/form-data` if it carries a file.
///
/// Form bodies are validated in every case, so a `null` fails even when the
/// body ends up JSON-encoded. JSON and raw bodies pass through untouched.
///
/// ## Errors
///
/// Returns [`MultipartError::NullValue`] if the form body contains a null.
pub fn maybe_multipart(options: RequestOptions) -> Result<RequestOptions, MultipartError> {
    let Some(RequestBody::Form(body)) = &options.body else {
        return Ok(options);
    };
    let fields = flatten_form(body)?;
    if !fields.iter().any(|f| matches!(f.value, FieldValue::File(_))) {
        return Ok(options);
    }
    Ok(apply_form(options, MultipartForm::new(fields)))
}

/// Encodes a form body as `multipart/form-data` whether or not it carries a
/// file.
///
/// ## Errors
///
/// Returns [`MultipartError::NullValue`] if the form body contains a null.
pub fn multipart_form(options: RequestOptions) -> Result<RequestOptions, MultipartError> {
    let fields = match &options.body {
        Some(RequestBody::Form(body)) => flatten_form(body)?,
        Some(RequestBody::Json(json)) => flatten_form(&FormValue::from(json.clone()))?,
        _ => return Ok(options),
    };
    Ok(apply_form(options, MultipartForm::new(fields)))
}

fn apply_form(mut options: RequestOptions, form: MultipartForm) -> RequestOptions {
    let encoded = form.encode();
    let content_type = form.content_type();
    options.headers.insert("Content-Type", content_type.clone());
    options
        .headers
        .insert("Content-Length", encoded.len().to_string());
    options.body = Some(RequestBody::Raw {
        bytes: encoded,
        content_type: Some(content_type),
    });
    options
}
