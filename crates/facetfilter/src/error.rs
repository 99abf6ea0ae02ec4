//! Error types for facetfilter operations.
//!
//! Errors are synchronous and local: nothing in this crate performs I/O apart
//! from loading configuration, so there is no retry policy. Every fallible
//! engine operation either succeeds fully or leaves the engine untouched.

use thiserror::Error;

/// Result type alias using [`FilterError`].
pub type Result<T> = std::result::Result<T, FilterError>;

/// Errors that can occur while normalizing models or mutating filter state.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The model or a field definition is malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A mutation referenced a field key that is not in the current model.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A mutation referenced an enum option the field does not define.
    #[error("unknown option '{option}' for field '{field}'")]
    UnknownOption {
        /// Field key.
        field: String,
        /// Canonical string form of the option value.
        option: String,
    },

    /// Configuration failed to load or holds an out-of-range value.
    #[error("configuration error: {0}")]
    Config(String),

    /// A raw model could not be parsed from JSON.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FilterError {
    /// Creates a new `Validation` error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a new `UnknownField` error.
    pub fn unknown_field(key: impl Into<String>) -> Self {
        Self::UnknownField(key.into())
    }

    /// Creates a new `UnknownOption` error.
    pub fn unknown_option(field: impl Into<String>, option: impl Into<String>) -> Self {
        Self::UnknownOption {
            field: field.into(),
            option: option.into(),
        }
    }

    /// Creates a new `Config` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<confique::Error> for FilterError {
    fn from(err: confique::Error) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FilterError::validation("field `price`: max must be greater than min");
        assert_eq!(
            err.to_string(),
            "validation error: field `price`: max must be greater than min"
        );

        let err = FilterError::unknown_field("colour");
        assert_eq!(err.to_string(), "unknown field: colour");

        let err = FilterError::unknown_option("status", "archived");
        assert_eq!(
            err.to_string(),
            "unknown option 'archived' for field 'status'"
        );
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FilterError = json_err.into();
        assert!(matches!(err, FilterError::Serialization(_)));
    }
}
