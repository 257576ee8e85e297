//! Lenient conversions for loosely typed values in resource wrappers.

use serde_json::Value;

use crate::error::CoerceError;

fn not_a_number(value: &Value) -> CoerceError {
    let kind = match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    CoerceError::NotANumber {
        value: value.to_string(),
        kind,
    }
}

/// Rounds numbers and parses the leading integer of strings.
///
/// ## Examples
///
/// ```rust
/// use courier::coerce::coerce_integer;
/// use serde_json::json;
///
/// assert_eq!(coerce_integer(&json!(2.6)).unwrap(), 3);
/// assert_eq!(coerce_integer(&json!("42px")).unwrap(), 42);
/// assert!(coerce_integer(&json!(true)).is_err());
/// ```
///
/// ## Errors
///
/// Returns [`CoerceError::NotANumber`] for non-numeric values.
pub fn coerce_integer(value: &Value) -> Result<i64, CoerceError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .ok_or_else(|| not_a_number(value)),
        Value::String(s) => {
            let trimmed = s.trim_start();
            let sign_len = usize::from(trimmed.starts_with(['-', '+']));
            let digits = trimmed[sign_len..]
                .find(|c: char| !c.is_ascii_digit())
                .map_or(trimmed.len(), |idx| idx + sign_len);
            trimmed[..digits]
                .parse::<i64>()
                .map_err(|_| not_a_number(value))
        }
        _ => Err(not_a_number(value)),
    }
}

/// Passes numbers through and parses strings.
///
/// ## Errors
///
/// Returns [`CoerceError::NotANumber`] for non-numeric values.
pub fn coerce_float(value: &Value) -> Result<f64, CoerceError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| not_a_number(value)),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| not_a_number(value)),
        _ => Err(not_a_number(value)),
    }
}

/// Booleans pass through, strings are `true` only when exactly `"true"`,
/// and anything else follows its truthiness.
pub fn coerce_boolean(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s == "true",
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Unwraps a value that must be present.
///
/// ## Errors
///
/// Returns [`CoerceError::Missing`] for `None`.
pub fn ensure_present<T>(value: Option<T>) -> Result<T, CoerceError> {
    value.ok_or(CoerceError::Missing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer(&json!(7)), Ok(7));
        assert_eq!(coerce_integer(&json!(-1.5)), Ok(-2));
        assert_eq!(coerce_integer(&json!(" -12abc")), Ok(-12));
        assert!(coerce_integer(&json!("abc")).is_err());
        assert!(coerce_integer(&json!("")).is_err());
        assert_eq!(
            coerce_integer(&json!(null)).unwrap_err().to_string(),
            "Could not coerce null (type: null) into a number"
        );
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(coerce_float(&json!(1.25)), Ok(1.25));
        assert_eq!(coerce_float(&json!("3.5")), Ok(3.5));
        assert!(coerce_float(&json!([1])).is_err());
    }

    #[test]
    fn test_coerce_boolean() {
        assert!(coerce_boolean(&json!(true)));
        assert!(coerce_boolean(&json!("true")));
        assert!(!coerce_boolean(&json!("TRUE")));
        assert!(!coerce_boolean(&json!(0)));
        assert!(coerce_boolean(&json!(3)));
        assert!(coerce_boolean(&json!({})));
        assert!(!coerce_boolean(&json!(null)));
    }

    #[test]
    fn test_ensure_present() {
        assert_eq!(ensure_present(Some(1)), Ok(1));
        assert_eq!(ensure_present::<u8>(None), Err(CoerceError::Missing));
    }
}
