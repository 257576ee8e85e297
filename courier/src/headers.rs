//! Case-insensitive, ordered header map.
//!
//! [`Headers`] is used on both sides of the wire. On the request side an entry
//! may carry `None`, which suppresses a header that a lower-precedence layer
//! (client defaults, platform headers, auth) would otherwise send. On the
//! response side every entry carries a value.

use reqwest::header::HeaderMap;
use tracing::warn;

/// An ordered header map with case-insensitive lookup.
///
/// Inserting a name that already exists (in any casing) replaces the value in
/// place, so the first insertion decides the position and the last one
/// decides the value and the casing that goes on the wire.
///
/// ## Examples
///
/// ```rust
/// use courier::Headers;
///
/// let mut headers = Headers::new();
/// headers.insert("Content-Type", "application/json");
/// headers.suppress("Accept");
///
/// assert_eq!(headers.get("content-type"), Some("application/json"));
/// assert_eq!(headers.get("accept"), None);
/// assert!(headers.is_suppressed("ACCEPT"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, Option<String>)>,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing any existing entry for that name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set(name, Some(value.into()));
    }

    /// Marks `name` as explicitly omitted.
    pub fn suppress(&mut self, name: impl Into<String>) {
        self.set(name, None);
    }

    /// Sets `name` to a value or to an explicit omission.
    pub fn set(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.position(&name) {
            Some(idx) => self.entries[idx] = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value for `name`, ignoring case.
    ///
    /// Suppressed and absent headers both return `None`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .and_then(|idx| self.entries[idx].1.as_deref())
    }

    /// Returns `true` if `name` has a value.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns `true` if `name` was explicitly suppressed.
    pub fn is_suppressed(&self, name: &str) -> bool {
        self.position(name)
            .is_some_and(|idx| self.entries[idx].1.is_none())
    }

    /// Layers `other` on top of `self`; entries in `other` win, including
    /// suppressions.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in &other.entries {
            self.set(name.clone(), value.clone());
        }
    }

    /// Drops every suppressed entry.
    pub fn without_suppressed(mut self) -> Self {
        self.entries.retain(|(_, value)| value.is_some());
        self
    }

    /// Iterates over the headers that carry a value, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(name, value)| value.as_deref().map(|v| (name.as_str(), v)))
    }

    /// Number of entries, suppressed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Collects response headers from a transport header map.
    ///
    /// Names are stored lower-cased. When a header is repeated only the first
    /// value is kept.
    pub fn from_header_map(map: &HeaderMap) -> Self {
        let mut headers = Self::new();
        for name in map.keys() {
            let mut values = map.get_all(name).iter();
            let Some(first) = values.next() else {
                continue;
            };
            let extra = values.count();
            if extra > 0 {
                warn!(
                    header = %name,
                    entries = extra + 1,
                    "Received repeated header, using the first entry"
                );
            }
            match first.to_str() {
                Ok(value) => headers.insert(name.as_str(), value),
                Err(_) => headers.insert(
                    name.as_str(),
                    String::from_utf8_lossy(first.as_bytes()).into_owned(),
                ),
            }
        }
        headers
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}
