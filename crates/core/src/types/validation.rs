//! Field-level validation errors shared by the auth and checkout flows.

use crate::EmailError;

/// A required field is missing or malformed.
///
/// Always recoverable: the caller re-prompts and resubmits.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was left empty.
    #[error("{field} is required")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// Password shorter than the registration minimum.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },

    /// Email present but structurally invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),
}

impl ValidationError {
    /// Shorthand for [`ValidationError::MissingField`].
    #[must_use]
    pub const fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}

/// Return `value` trimmed, or a [`ValidationError::MissingField`] if nothing is left.
///
/// # Errors
///
/// Returns `ValidationError::MissingField` when `value` is empty or whitespace.
pub fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::missing(field));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("destination", "  0812 "), Ok("0812"));
    }

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(
            required("destination", " \t"),
            Err(ValidationError::MissingField {
                field: "destination"
            })
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ValidationError::missing("password").to_string(),
            "password is required"
        );
        assert_eq!(
            ValidationError::PasswordTooShort { min: 6 }.to_string(),
            "password must be at least 6 characters"
        );
    }
}
