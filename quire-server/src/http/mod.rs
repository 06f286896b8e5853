//! HTTP layer
//!
//! Axum server with:
//! - HTML pages rendered from embedded templates
//! - Cookie sessions resolved by the `Viewer` extractor
//! - Request tracing and graceful shutdown

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::AppError;
pub use extractors::{SignedIn, Viewer};
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError};
