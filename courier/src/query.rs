//! Query-string serialization with bracketed nesting.
//!
//! Objects nest as `parent[child]=v` and arrays as `list[0]=v`, the
//! conventional form most web frameworks decode. Keys and values are
//! percent-encoded, brackets included.

use serde_json::Value;
use url::form_urlencoded::Serializer;

/// Serializes a query object.
///
/// A `null` leaf is sent with an empty value. Empty arrays and objects
/// produce no pairs. A non-object top level produces an empty string.
///
/// ## Examples
///
/// ```rust
/// use courier::query::to_query_string;
/// use serde_json::json;
///
/// let query = to_query_string(&json!({"a": {"b": "c"}, "tags": ["x", "y"]}));
/// assert_eq!(query, "a%5Bb%5D=c&tags%5B0%5D=x&tags%5B1%5D=y");
/// ```
pub fn to_query_string(query: &Value) -> String {
    let mut pairs = Vec::new();
    if let Value::Object(map) = query {
        for (key, value) in map {
            collect_pairs(&mut pairs, key.clone(), value);
        }
    }
    let mut serializer = Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn collect_pairs(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Null => pairs.push((key, String::new())),
        Value::Bool(b) => pairs.push((key, b.to_string())),
        Value::Number(n) => pairs.push((key, n.to_string())),
        Value::String(s) => pairs.push((key, s.clone())),
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                collect_pairs(pairs, format!("{key}[{idx}]"), item);
            }
        }
        Value::Object(map) => {
            for (child, item) in map {
                collect_pairs(pairs, format!("{key}[{child}]"), item);
            }
        }
    }
}
