//! Form encoding errors.

use thiserror::Error;

/// A request body could not be converted into form fields.
#[derive(Debug, Error)]
pub enum MultipartError {
    /// A `null` appeared somewhere in the body.
    #[error(
        "null is not a valid form data value (at `{key}`), if you want to pass null then you need to use the string 'null'"
    )]
    NullValue {
        /// The flattened field name holding the null.
        key: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_value_names_the_field() {
        let err = MultipartError::NullValue {
            key: "metadata[owner]".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("metadata[owner]"));
        assert!(message.contains("the string 'null'"));
    }
}
