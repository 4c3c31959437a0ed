//! Shared types, error model, and configuration for Linkmill.
//!
//! This crate is the foundation depended on by all other Linkmill crates.
//! It provides:
//! - [`LinkmillError`] — the unified error type
//! - Domain types ([`JobRecord`], [`ResolvedContent`], [`Artifact`], [`RunReport`])
//! - Configuration ([`AppConfig`], [`RunOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FetchConfig, OutputConfig, RunOptions, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{LinkmillError, Result};
pub use types::{
    Artifact, ArtifactMeta, FailureReason, JobRecord, ResolvedContent, RunId, RunReport,
    SourceFailure, SourceKind,
};
