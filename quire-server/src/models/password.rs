//! Password rules for registration

use super::ValidationError;

/// Minimum password length
const MIN_PASSWORD_LEN: usize = 8;

/// Upper bound so hashing cost stays bounded
const MAX_PASSWORD_LEN: usize = 4096;

/// A password that passed the registration rules. Never logged or displayed.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(String);

impl NewPassword {
    /// Validate a password and its confirmation.
    ///
    /// # Rules
    /// - Both entries identical
    /// - At least 8 characters, at most 4096
    /// - Not entirely numeric
    pub fn new(password: &str, confirmation: &str) -> Result<Self, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }

        if password != confirmation {
            return Err(ValidationError::Mismatch { field: "password" });
        }

        let len = password.chars().count();
        if len < MIN_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LEN,
            });
        }
        if len > MAX_PASSWORD_LEN {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LEN,
            });
        }

        if password.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: "this password is entirely numeric",
            });
        }

        Ok(Self(password.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NewPassword(***)")
    }
}
