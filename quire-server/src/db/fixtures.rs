//! Test fixtures for database tests

use sqlx::PgPool;

use super::{CommentRepo, NewPost, PostRepo, User, UserRepo};
use crate::models::{CommentContent, PostContent, PostTitle, Username};

pub(crate) async fn user(pool: &PgPool, name: &str) -> User {
    UserRepo::new(pool)
        .create(&Username::new(name).unwrap(), "not-a-real-hash", false)
        .await
        .expect("fixture user")
}

/// Category id, created on first use
pub(crate) async fn category(pool: &PgPool, title: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO categories (title) VALUES ($1)
        ON CONFLICT (title) DO UPDATE SET title = EXCLUDED.title
        RETURNING id
        "#,
    )
    .bind(title)
    .fetch_one(pool)
    .await
    .expect("fixture category")
}

pub(crate) async fn post(pool: &PgPool, author_id: Option<i64>, title: &str) -> i64 {
    let draft = NewPost {
        title: PostTitle::new(title).unwrap(),
        content: PostContent::new("Lorem ipsum dolor sit amet").unwrap(),
        category_id: category(pool, "General").await,
    };
    PostRepo::new(pool)
        .create(author_id, &draft)
        .await
        .expect("fixture post")
}

pub(crate) async fn comment(pool: &PgPool, post_id: i64, author_id: i64, text: &str) -> i64 {
    CommentRepo::new(pool)
        .create(post_id, author_id, &CommentContent::new(text).unwrap())
        .await
        .expect("fixture comment")
        .id
}
