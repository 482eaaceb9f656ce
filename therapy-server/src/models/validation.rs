//! Validation error types

use std::fmt;

/// Longest accepted search term or name prefix
pub const MAX_SEARCH_LEN: usize = 255;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// String doesn't match required format (e.g., numeric id)
    InvalidFormat { field: &'static str, reason: &'static str },
}

impl ValidationError {
    /// Name of the offending field, used to attach messages to form inputs.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::TooLong { field, .. } | Self::InvalidFormat { field, .. } => {
                field
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::TooLong { field, max } => {
                write!(f, "{} exceeds maximum length of {} characters", field, max)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Reject values longer than `max` characters (not bytes).
pub(crate) fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Query-string search input. Rejections surface as 400, not as a form.
pub fn validate_search_term(field: &'static str, value: &str) -> Result<(), ValidationError> {
    check_len(field, value, MAX_SEARCH_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "name",
            max: 255,
        };
        assert_eq!(err.to_string(), "name exceeds maximum length of 255 characters");
    }

    #[test]
    fn field_accessor() {
        assert_eq!(ValidationError::Empty { field: "excerpt" }.field(), "excerpt");
    }

    #[test]
    fn length_counts_chars() {
        // 4 chars, 8 bytes
        assert!(check_len("name", "ąęść", 4).is_ok());
        assert!(check_len("name", "ąęść", 3).is_err());
    }

    #[test]
    fn search_term_limit() {
        assert!(validate_search_term("searchValue", &"ą".repeat(255)).is_ok());
        assert_eq!(
            validate_search_term("searchValue", &"a".repeat(256)),
            Err(ValidationError::TooLong { field: "searchValue", max: 255 })
        );
    }
}
