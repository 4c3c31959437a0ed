//! Application configuration for Linkmill.
//!
//! User config lives at `~/.linkmill/linkmill.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LinkmillError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "linkmill.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".linkmill";

// ---------------------------------------------------------------------------
// Config structs (matching linkmill.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Fetch behavior for URL sources.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Output layout.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default job-definition file path.
    #[serde(default = "default_jobs_file")]
    pub jobs_file: String,

    /// Default output root directory.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Repository identifier (`owner/repo`) used to build absolute index
    /// links. When unset, the index falls back to relative paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            jobs_file: default_jobs_file(),
            output_dir: default_output_dir(),
            repository: None,
        }
    }
}

fn default_jobs_file() -> String {
    "links.txt".into()
}
fn default_output_dir() -> String {
    ".".into()
}

/// `[fetch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Per-request timeout in seconds. Deployment parameter; 10-30s is the
    /// sane range.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum concurrent source resolutions within a job.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// User-Agent header override for fetch requests. When unset, the
    /// fetcher identifies itself as `linkmill/<version>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            concurrency: default_concurrency(),
            user_agent: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_concurrency() -> u32 {
    4
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for raw-text artifacts (`.txt`).
    #[serde(default = "default_raw_dir")]
    pub raw_dir: String,

    /// Directory for Base64 artifacts (`.b64`).
    #[serde(default = "default_encoded_dir")]
    pub encoded_dir: String,

    /// Index document file name.
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_dir: default_raw_dir(),
            encoded_dir: default_encoded_dir(),
            index_file: default_index_file(),
        }
    }
}

fn default_raw_dir() -> String {
    "normal".into()
}
fn default_encoded_dir() -> String {
    "base64".into()
}
fn default_index_file() -> String {
    "README.md".into()
}

// ---------------------------------------------------------------------------
// Run options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline options — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Output root directory.
    pub output_root: PathBuf,
    /// Directory name for raw-text artifacts.
    pub raw_dir: String,
    /// Directory name for Base64 artifacts.
    pub encoded_dir: String,
    /// Index document file name.
    pub index_file: String,
    /// Repository identifier for absolute index links.
    pub repository: Option<String>,
    /// Per-request fetch timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum concurrent source resolutions.
    pub concurrency: u32,
    /// User-Agent header override for fetch requests.
    pub user_agent: Option<String>,
}

impl From<&AppConfig> for RunOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            output_root: PathBuf::from(&config.defaults.output_dir),
            raw_dir: config.output.raw_dir.clone(),
            encoded_dir: config.output.encoded_dir.clone(),
            index_file: config.output.index_file.clone(),
            repository: config.defaults.repository.clone(),
            timeout_secs: config.fetch.timeout_secs,
            concurrency: config.fetch.concurrency,
            user_agent: config.fetch.user_agent.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.linkmill/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LinkmillError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.linkmill/linkmill.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LinkmillError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LinkmillError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LinkmillError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LinkmillError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LinkmillError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
