//! Value coercion errors.

use thiserror::Error;

/// A loosely typed value could not be coerced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    /// The value is neither a number nor a numeric string.
    #[error("Could not coerce {value} (type: {kind}) into a number")]
    NotANumber {
        /// The rejected value, rendered as JSON.
        value: String,
        /// The JSON type of the value.
        kind: &'static str,
    },

    /// A required value was null or absent.
    #[error("Expected a value to be given but received null instead.")]
    Missing,
}
