//! HTML templates, compiled into the binary
//!
//! Pages extend `base.html`, which expects `site_title`, `user`,
//! `categories` and `query` in every context. `Page` fills those in.
//! `error.html` stands alone so failures can render without a database.

use std::collections::HashMap;

use axum::response::Html;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};

use crate::db::{Category, SessionUser};

const SOURCES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("_pagination.html", include_str!("../templates/_pagination.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("post_detail.html", include_str!("../templates/post_detail.html")),
    ("post_form.html", include_str!("../templates/post_form.html")),
    ("post_confirm_delete.html", include_str!("../templates/post_confirm_delete.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("registration.html", include_str!("../templates/registration.html")),
    ("user_posts.html", include_str!("../templates/user_posts.html")),
    ("contact.html", include_str!("../templates/contact.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// Every embedded template, parsed on first use
pub static TEMPLATES: Lazy<Templates> =
    Lazy::new(|| Templates::new().expect("embedded templates must parse"));

/// The compiled template set
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Parse every embedded template.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(SOURCES.iter().copied())?;
        tera.register_filter("excerpt", excerpt_filter);
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<Html<String>, tera::Error> {
        self.tera.render(name, context).map(Html)
    }
}

/// `{{ text | excerpt }}` or `{{ text | excerpt(words=10) }}`
fn excerpt_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("excerpt expects a string"))?;
    let words = args
        .get("words")
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .unwrap_or(quire_core::text::EXCERPT_WORDS);
    Ok(Value::String(quire_core::text::excerpt(text, words)))
}

/// Context for one page render, with the values `base.html` needs
pub struct Page {
    context: Context,
}

impl Page {
    pub fn new(site_title: &str, user: Option<&SessionUser>, categories: &[Category]) -> Self {
        let mut context = Context::new();
        context.insert("site_title", site_title);
        context.insert("user", &user);
        context.insert("categories", categories);
        context.insert("query", "");
        Self { context }
    }

    pub fn insert<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{FormErrors, LoginForm};
    use crate::models::{Paginated, Pagination};

    fn page() -> Page {
        let categories = vec![Category { id: 1, title: "General".into() }];
        Page::new("Quire", None, &categories)
    }

    #[test]
    fn all_templates_parse() {
        let templates = Templates::new().unwrap();
        let names: Vec<_> = templates.tera.get_template_names().collect();
        assert_eq!(names.len(), SOURCES.len());
    }

    #[test]
    fn contact_page_renders_navigation() {
        let Html(body) = TEMPLATES.render("contact.html", page().context()).unwrap();
        assert!(body.contains("<title>Contact | Quire</title>"));
        assert!(body.contains(r#"<a href="/category/1">General</a>"#));
        assert!(body.contains(r#"<a href="/login">Log in</a>"#));
    }

    #[test]
    fn logged_in_user_sees_new_post_link() {
        let templates = Templates::new().unwrap();
        let user = SessionUser {
            id: 1,
            username: "ada".into(),
            is_superuser: false,
        };
        let page = Page::new("Quire", Some(&user), &[]);
        let Html(body) = templates.render("contact.html", page.context()).unwrap();
        assert!(body.contains(r#"<a href="/post/new">New post</a>"#));
        assert!(body.contains(r#"<a href="/user/ada">ada</a>"#));
    }

    #[test]
    fn login_errors_are_shown_and_escaped() {
        let templates = Templates::new().unwrap();
        let mut errors = FormErrors::default();
        errors.add_general("Please enter a correct username and password.");
        let form = LoginForm {
            username: "<script>".into(),
            ..LoginForm::default()
        };
        let page = page().insert("form", &form).insert("errors", &errors);

        let Html(body) = templates.render("login.html", page.context()).unwrap();
        assert!(body.contains("Please enter a correct username and password."));
        assert!(body.contains("&lt;script&gt;"));
        assert!(!body.contains("<script>"));
    }

    #[test]
    fn pagination_links_keep_page_size_and_query() {
        let posts = Paginated::<()>::new(Vec::new(), 12, Pagination::new(2, 5));
        let page = page()
            .insert("posts", &posts.items)
            .insert("page", &posts.nav())
            .insert("heading", "")
            .insert("query", "rust lang");

        let Html(body) = TEMPLATES.render("index.html", page.context()).unwrap();
        assert!(body.contains(r#"href="?q=rust%20lang&amp;page=1&amp;per_page=5""#));
        assert!(body.contains(r#"href="?q=rust%20lang&amp;page=3&amp;per_page=5""#));
        assert!(body.contains("Page 2 of 3"));
    }

    #[test]
    fn excerpt_filter_truncates() {
        let long = "word ".repeat(40);
        let value = excerpt_filter(&Value::String(long), &HashMap::new()).unwrap();
        assert!(value.as_str().unwrap().ends_with(" ..."));

        let mut args = HashMap::new();
        args.insert("words".to_string(), Value::from(2));
        let value = excerpt_filter(&Value::from("one two three"), &args).unwrap();
        assert_eq!(value, Value::from("one two ..."));
    }
}
