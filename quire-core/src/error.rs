//! Structured error types for quire-core.
//!
//! Library consumers get composable errors; the `quire` binary wraps them
//! in `anyhow` with extra context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for quire-core operations
#[derive(Error, Debug)]
pub enum QuireError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file could not be parsed
    #[error("Invalid config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config parsed but holds an unusable value
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for quire-core operations
pub type Result<T> = std::result::Result<T, QuireError>;

impl QuireError {
    /// Create a config parse error
    pub fn config_parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source,
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuireError::config("session ttl must be positive");
        assert_eq!(
            err.to_string(),
            "Configuration error: session ttl must be positive"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: QuireError = io_err.into();

        assert!(matches!(err, QuireError::Io { .. }));
    }
}
