//! Configuration for the quire server and CLI
//!
//! Loaded from `~/.quire/config.toml` (or `--config` / `QUIRE_CONFIG`).
//! A missing default file is not an error: every field has a default.
//!
//! String values may reference environment variables as `${NAME}`.
//! `DATABASE_URL` and `QUIRE_BIND` override the file when set.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{QuireError, Result};

/// Env var naming an alternative config file
pub const CONFIG_ENV: &str = "QUIRE_CONFIG";

/// Centralized configuration for quire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuireConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: SocketAddr,
    /// Allow any origin (development only)
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/quire".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Session lifetime, also used as cookie Max-Age
    pub ttl_hours: i64,
    /// Mark the cookie `Secure` (serve over HTTPS only)
    pub secure: bool,
    /// How often the server deletes expired sessions
    pub purge_interval_minutes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "quire_session".to_string(),
            ttl_hours: 24 * 14,
            secure: false,
            purge_interval_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    /// Posts per listing page
    pub per_page: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Quire".to_string(),
            per_page: 20,
        }
    }
}

impl QuireConfig {
    /// Load config from an explicit path, `$QUIRE_CONFIG`, or the default
    /// location, then apply environment overrides.
    ///
    /// An explicitly named file must exist; the default one may be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| env::var(CONFIG_ENV).ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Self::config_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file and expand `${VAR}` references.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&content).map_err(|e| QuireError::config_parse(path, e))?;
        config.expand_variables(|key| env::var(key).ok());
        Ok(config)
    }

    /// Get config file path: ~/.quire/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quire/config.toml")
    }

    /// Apply `DATABASE_URL` / `QUIRE_BIND` style overrides.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.database.url = url;
        }

        if let Some(bind) = lookup("QUIRE_BIND").filter(|v| !v.is_empty()) {
            self.server.bind = bind
                .parse()
                .map_err(|_| QuireError::config(format!("QUIRE_BIND is not a socket address: {bind}")))?;
        }

        Ok(())
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(QuireError::config("database.url cannot be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(QuireError::config("database.max_connections must be at least 1"));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(QuireError::config("session.cookie_name cannot be empty"));
        }
        if self.session.ttl_hours <= 0 {
            return Err(QuireError::config("session.ttl_hours must be positive"));
        }
        if self.session.purge_interval_minutes == 0 {
            return Err(QuireError::config("session.purge_interval_minutes must be at least 1"));
        }
        if !(1..=100).contains(&self.site.per_page) {
            return Err(QuireError::config("site.per_page must be between 1 and 100"));
        }
        Ok(())
    }

    fn expand_variables<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        self.database.url = expand_string(&self.database.url, &lookup);
        self.session.cookie_name = expand_string(&self.session.cookie_name, &lookup);
        self.site.title = expand_string(&self.site.title, &lookup);
    }
}

/// Expand `${NAME}` references; unknown names expand to the empty string.
fn expand_string<F>(s: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                result.push_str(&lookup(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                // unterminated, keep verbatim
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    result.push_str(rest);
    result
}
