//! Structured request bodies that may carry binary payloads.

use bytes::Bytes;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::{Number, Value};

/// A binary payload inside a request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// File name sent in the `Content-Disposition` header.
    pub file_name: Option<String>,
    /// Content type of the part, `application/octet-stream` when unset.
    pub content_type: Option<String>,
    /// The raw bytes.
    pub data: Bytes,
}

impl FilePart {
    /// Creates a file part from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            file_name: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// Sets the file name.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Sets the content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// A JSON-like body tree whose leaves may also be binary files.
///
/// When a [`RequestBody::Form`](crate::RequestBody::Form) contains a
/// [`FormValue::File`] anywhere, the request is sent as `multipart/form-data`;
/// otherwise it is sent as JSON.
///
/// ## Examples
///
/// ```rust
/// use courier::form::{FilePart, FormValue};
///
/// let body = FormValue::object()
///     .field("purpose", "dispute_evidence")
///     .field("tags", FormValue::array(["x", "y"]))
///     .field("file", FilePart::new(&b"%PDF-1.4"[..]).file_name("receipt.pdf"));
///
/// assert!(body.contains_file());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// Rejected by the form encoder; use the string `"null"` instead.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// An ordered list.
    Array(Vec<FormValue>),
    /// An ordered set of named children.
    Object(Vec<(String, FormValue)>),
    /// A binary payload.
    File(FilePart),
}

impl FormValue {
    /// An empty object, to be filled with [`field`](Self::field).
    pub fn object() -> Self {
        Self::Object(Vec::new())
    }

    /// An array built from anything convertible into form values.
    pub fn array<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FormValue>,
    {
        Self::Array(items.into_iter().map(Into::into).collect())
    }

    /// Adds (or replaces) a child of an object.
    ///
    /// Calling this on anything other than an object turns it into a
    /// one-field object.
    pub fn field(self, key: impl Into<String>, value: impl Into<FormValue>) -> Self {
        let key = key.into();
        let value = value.into();
        let mut entries = match self {
            Self::Object(entries) => entries,
            _ => Vec::new(),
        };
        match entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
        Self::Object(entries)
    }

    /// Returns `true` if a binary payload appears at any depth.
    pub fn contains_file(&self) -> bool {
        match self {
            Self::File(_) => true,
            Self::Array(items) => items.iter().any(Self::contains_file),
            Self::Object(entries) => entries.iter().any(|(_, v)| v.contains_file()),
            _ => false,
        }
    }
}

impl Serialize for FormValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            // Only reachable when a caller serializes a file-bearing body by
            // hand; the engine always routes those through multipart.
            Self::File(file) => match &file.file_name {
                Some(name) => serializer.serialize_str(name),
                None => serializer.serialize_unit(),
            },
        }
    }
}

impl From<Value> for FormValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                Self::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<FilePart> for FormValue {
    fn from(file: FilePart) -> Self {
        Self::File(file)
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for FormValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

macro_rules! form_value_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for FormValue {
                fn from(n: $ty) -> Self {
                    Self::Number(Number::from(n))
                }
            }
        )*
    };
}

form_value_from_integer!(i32, i64, u32, u64);

impl<T: Into<FormValue>> From<Option<T>> for FormValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
