//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C
//! - Periodic purge of expired sessions

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use quire_core::QuireConfig;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::AppError;
use super::extractors::Viewer;
use super::routes;
use crate::auth::SessionSettings;
use crate::db::{CategoryRepo, SessionRepo};
use crate::templates::{Page, TEMPLATES};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from(&QuireConfig::default())
    }
}

impl From<&QuireConfig> for ServerConfig {
    fn from(config: &QuireConfig) -> Self {
        Self {
            bind_addr: config.server.bind,
            cors_permissive: config.server.cors_permissive,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub session: SessionSettings,
    pub site_title: String,
    pub per_page: u32,
}

impl AppState {
    pub fn new(pool: PgPool, config: &QuireConfig) -> Self {
        Self {
            pool,
            session: SessionSettings::from(&config.session),
            site_title: config.site.title.clone(),
            per_page: config.site.per_page,
        }
    }

    /// Start a page context for `viewer`, with the category navigation loaded.
    pub async fn page(&self, viewer: &Viewer) -> Result<Page, AppError> {
        let categories = CategoryRepo::new(&self.pool).list().await?;
        Ok(Page::new(&self.site_title, viewer.user.as_ref(), &categories))
    }

    /// Render a full page template.
    pub fn render(&self, name: &str, page: &Page) -> Result<axum::response::Html<String>, AppError> {
        Ok(TEMPLATES.render(name, page.context())?)
    }
}

/// Build the application router.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        let port = config.bind_addr.port();
        let origins: Vec<HeaderValue> = ["localhost", "127.0.0.1"]
            .iter()
            .filter_map(|host| HeaderValue::from_str(&format!("http://{host}:{port}")).ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
pub async fn run_server(pool: PgPool, config: &QuireConfig) -> Result<(), ServerError> {
    let server = ServerConfig::from(config);
    let app = build_router(AppState::new(pool.clone(), config), &server);

    let listener = TcpListener::bind(server.bind_addr).await?;
    tracing::info!("Server listening on {}", server.bind_addr);

    // dropping stop_tx also ends the purge loop
    let (stop_tx, stop_rx) = watch::channel(false);
    let every = Duration::from_secs(config.session.purge_interval_minutes.max(1).saturating_mul(60));
    let purger = tokio::spawn(purge_sessions_every(pool, every, stop_rx));

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stop_tx.send(true);
        })
        .await;

    if let Err(e) = purger.await {
        tracing::warn!(error = %e, "session purge task failed");
    }
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Delete expired sessions now and then every `every`, until `stop` changes
/// or its sender is dropped.
pub async fn purge_sessions_every(pool: PgPool, every: Duration, mut stop: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match SessionRepo::new(&pool).purge_expired().await {
                    Ok(0) => {}
                    Ok(purged) => tracing::info!(purged, "expired sessions removed"),
                    Err(e) => tracing::warn!(error = %e, "session purge failed"),
                }
            }
            _ = stop.changed() => break,
        }
    }
    tracing::debug!("session purge stopped");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
