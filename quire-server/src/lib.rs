//! quire-server: the quire blog as an axum application
//!
//! Posts in categories, comments, like/dislike toggling on both, per-session
//! view counting and cookie-session authentication, backed by PostgreSQL.

pub mod auth;
pub mod db;
pub mod forms;
pub mod http;
pub mod models;
pub mod templates;

pub use db::{create_pool_with_options, migrate, DbError, MIGRATOR};
pub use http::{build_router, run_server, AppState, ServerConfig, ServerError};
