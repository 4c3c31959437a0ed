//! Error types for Linkmill.
//!
//! Library crates use [`LinkmillError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Only [`LinkmillError::Config`] (and setup-time [`LinkmillError::Io`])
//! abort a run. Fetch/decode failures are isolated to their source and
//! recorded in the run report instead of propagating.

use std::path::PathBuf;

/// Top-level error type for all Linkmill operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkmillError {
    /// Missing or invalid run configuration (jobs file absent, bad TOML).
    /// Fatal: aborts the run before any job is processed.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while fetching a URL source.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Base64 or UTF-8 decoding error for a source's content.
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Filesystem I/O error during persistence.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (bad output name, malformed record, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LinkmillError>;

impl LinkmillError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a decode error from any displayable message.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error aborts the whole run rather than one source/job.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::Io { .. })
    }
}
