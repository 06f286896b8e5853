//! Comment body validation

use super::validation::reject_nul;
use super::ValidationError;

/// Maximum length for comments
const MAX_COMMENT_LEN: usize = 5000;

/// Validated comment body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentContent(String);

impl CommentContent {
    /// Non-empty after trimming, at most 5000 characters.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "content" });
        }
        reject_nul("content", trimmed)?;

        if trimmed.chars().count() > MAX_COMMENT_LEN {
            return Err(ValidationError::TooLong {
                field: "content",
                max: MAX_COMMENT_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
