//! HTML form payloads and their validation
//!
//! Each form deserializes from `application/x-www-form-urlencoded` and turns
//! into validated domain types, or into `FormErrors` to re-render with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::{Category, NewPost};
use crate::models::{CommentContent, NewPassword, PostContent, PostTitle, Username, ValidationError};

/// Shown for any failed login, whichever part was wrong
pub const LOGIN_FAILED: &str = "Please enter a correct username and password.";

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";

const INVALID_CHOICE: &str = "Select a valid choice.";

/// Errors keyed by form field, plus errors about the form as a whole
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<&'static str, Vec<String>>,
    pub general: Vec<String>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.general.is_empty()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    pub fn add_general(&mut self, message: impl Into<String>) {
        self.general.push(message.into());
    }

    fn record(&mut self, err: &ValidationError) {
        self.add(err.field(), capitalize(&err.to_string()));
    }

    /// `Ok(value)` when nothing was recorded.
    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Sign-in form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub next: Option<String>,
}

/// Sign-up form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(Username, NewPassword), FormErrors> {
        let mut errors = FormErrors::default();

        let username = Username::new(&self.username)
            .map_err(|e| errors.record(&e))
            .ok();

        let password = match NewPassword::new(&self.password1, &self.password2) {
            Ok(password) => Some(password),
            Err(e @ ValidationError::Mismatch { .. }) => {
                errors.add("password2", capitalize(&e.to_string()));
                None
            }
            Err(e) => {
                errors.add("password1", capitalize(&e.to_string()));
                None
            }
        };

        match (username, password) {
            (Some(username), Some(password)) => errors.finish(|| (username, password)),
            _ => Err(errors),
        }
    }
}

/// Create/update post form
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    /// Category id as submitted by the select box
    pub category: String,
}

impl PostForm {
    /// Form pre-filled from an existing post, for the edit page.
    pub fn from_post(post: &crate::db::Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            category: post.category_id.to_string(),
        }
    }

    /// Validate against the categories currently offered.
    pub fn validate(&self, categories: &[Category]) -> Result<NewPost, FormErrors> {
        let mut errors = FormErrors::default();

        let title = PostTitle::new(&self.title).map_err(|e| errors.record(&e)).ok();
        let content = PostContent::new(&self.content)
            .map_err(|e| errors.record(&e))
            .ok();

        let category_id = self
            .category
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| categories.iter().any(|c| c.id == *id));
        if category_id.is_none() {
            if self.category.trim().is_empty() {
                errors.add("category", "This field is required.");
            } else {
                errors.add("category", INVALID_CHOICE);
            }
        }

        match (title, content, category_id) {
            (Some(title), Some(content), Some(category_id)) => errors.finish(|| NewPost {
                title,
                content,
                category_id,
            }),
            _ => Err(errors),
        }
    }
}

/// Comment form on the post page
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CommentForm {
    pub content: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<CommentContent, FormErrors> {
        CommentContent::new(&self.content).map_err(|e| {
            let mut errors = FormErrors::default();
            errors.record(&e);
            errors
        })
    }
}

/// Where to send the user after login. Only same-site paths are honoured.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && !path.chars().any(char::is_control) =>
        {
            path
        }
        _ => "/",
    }
}
