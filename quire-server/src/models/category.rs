//! Category title validation

use super::validation::reject_nul;
use super::ValidationError;

/// Maximum length for category titles
const MAX_CATEGORY_LEN: usize = 100;

/// Validated category title
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategoryTitle(String);

impl CategoryTitle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "category" });
        }
        reject_nul("category", trimmed)?;

        if trimmed.chars().count() > MAX_CATEGORY_LEN {
            return Err(ValidationError::TooLong {
                field: "category",
                max: MAX_CATEGORY_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_and_invalid() {
        assert_eq!(CategoryTitle::new(" Rust ").unwrap().as_str(), "Rust");
        assert!(CategoryTitle::new("").is_err());
        assert!(CategoryTitle::new(&"c".repeat(101)).is_err());
        assert!(CategoryTitle::new("Ru\0st").is_err());
    }
}
