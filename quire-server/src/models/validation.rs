//! Validation error types

use std::fmt;

/// Validation error for user-supplied fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Field exceeds maximum length
    TooLong { field: &'static str, max: usize },

    /// Field is below minimum length
    TooShort { field: &'static str, min: usize },

    /// String doesn't match the required format
    InvalidFormat { field: &'static str, reason: &'static str },

    /// Two fields that must agree don't (password confirmation)
    Mismatch { field: &'static str },
}

impl ValidationError {
    /// Name of the form field the error belongs to
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field }
            | Self::TooLong { field, .. }
            | Self::TooShort { field, .. }
            | Self::InvalidFormat { field, .. }
            | Self::Mismatch { field } => field,
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
            Self::TooShort { field, min } => {
                write!(f, "{} must contain at least {} characters", field, min)
            }
            Self::InvalidFormat { field, reason } => {
                write!(f, "{}: {}", field, reason)
            }
            Self::Mismatch { field } => write!(f, "the two {} fields didn't match", field),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Reject NUL characters, which PostgreSQL text columns cannot store.
pub(crate) fn reject_nul(field: &'static str, s: &str) -> Result<(), ValidationError> {
    if s.contains('\0') {
        return Err(ValidationError::InvalidFormat {
            field,
            reason: "null characters are not allowed",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 255,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 255 characters"
        );

        let err = ValidationError::Mismatch { field: "password" };
        assert_eq!(err.to_string(), "the two password fields didn't match");
    }

    #[test]
    fn nul_is_invalid_format() {
        assert!(reject_nul("title", "plain text").is_ok());
        let err = reject_nul("title", "a\0b").unwrap_err();
        assert_eq!(err.to_string(), "title: null characters are not allowed");
    }

    #[test]
    fn reports_field() {
        let err = ValidationError::TooShort { field: "password", min: 8 };
        assert_eq!(err.field(), "password");
    }
}
