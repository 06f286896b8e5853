//! Username validation

use once_cell::sync::Lazy;
use regex::Regex;

use super::validation::reject_nul;
use super::ValidationError;

/// Maximum length for usernames
const MAX_USERNAME_LEN: usize = 150;

/// Letters, digits and @/./+/-/_ only
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("invalid username regex"));

/// Validated username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a new username.
    ///
    /// # Rules
    /// - Non-empty after trimming
    /// - Max 150 characters
    /// - Letters, digits and `@.+-_`
    ///
    /// # Example
    /// ```
    /// use quire_server::models::Username;
    ///
    /// assert!(Username::new("ada.l@home").is_ok());
    /// assert!(Username::new("ada lovelace").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }
        reject_nul("username", trimmed)?;

        if trimmed.chars().count() > MAX_USERNAME_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: MAX_USERNAME_LEN,
            });
        }

        if !USERNAME_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "may contain only letters, numbers, and @/./+/-/_ characters",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the username as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
