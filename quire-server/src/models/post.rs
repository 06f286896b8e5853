//! Post title and body validation

use super::validation::reject_nul;
use super::ValidationError;

/// Maximum length for post titles
const MAX_TITLE_LEN: usize = 255;

/// Maximum length for post bodies
const MAX_CONTENT_LEN: usize = 100_000;

/// Validated post title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTitle(String);

impl PostTitle {
    /// Create a new post title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 255 characters
    ///
    /// # Example
    /// ```
    /// use quire_server::models::PostTitle;
    ///
    /// assert!(PostTitle::new("Hello, world").is_ok());
    /// assert!(PostTitle::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        reject_nul("title", trimmed)?;

        if trimmed.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field: "title",
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Get the title as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated post body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    /// Body must hold something besides whitespace. Inner formatting is kept,
    /// trailing whitespace is dropped.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let content = s.trim_end();

        if content.trim_start().is_empty() {
            return Err(ValidationError::Empty { field: "content" });
        }
        reject_nul("content", content)?;

        if content.chars().count() > MAX_CONTENT_LEN {
            return Err(ValidationError::TooLong {
                field: "content",
                max: MAX_CONTENT_LEN,
            });
        }

        Ok(Self(content.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_titles() {
        assert!(PostTitle::new("My Post").is_ok());
        assert!(PostTitle::new("a").is_ok());
    }

    #[test]
    fn trims_title() {
        assert_eq!(PostTitle::new("  hello  ").unwrap().as_str(), "hello");
    }

    #[test]
    fn rejects_blank_title() {
        assert!(matches!(
            PostTitle::new("\t\n").unwrap_err(),
            ValidationError::Empty { field: "title" }
        ));
    }

    #[test]
    fn title_max_length() {
        assert!(PostTitle::new(&"é".repeat(255)).is_ok());
        assert!(matches!(
            PostTitle::new(&"é".repeat(256)).unwrap_err(),
            ValidationError::TooLong { max: 255, .. }
        ));
    }

    #[test]
    fn content_keeps_leading_indent() {
        let body = PostContent::new("    code block\nmore  \n\n").unwrap();
        assert_eq!(body.as_str(), "    code block\nmore");
    }

    #[test]
    fn rejects_nul_characters() {
        assert!(matches!(
            PostTitle::new("a\0b").unwrap_err(),
            ValidationError::InvalidFormat { field: "title", .. }
        ));
        assert!(matches!(
            PostContent::new("hi\0there").unwrap_err(),
            ValidationError::InvalidFormat { field: "content", .. }
        ));
    }

    #[test]
    fn rejects_blank_content() {
        assert!(matches!(
            PostContent::new("   \n ").unwrap_err(),
            ValidationError::Empty { field: "content" }
        ));
    }
}
