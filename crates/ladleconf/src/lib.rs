//! Minimal configuration loading for ladle.
//!
//! All runtime choices that cannot change after startup live here: where
//! the collection document is stored, which backend holds it, where the
//! HTTP server binds, and the optional access-gate credentials.
//!
//! # Config File Locations
//!
//! Files are loaded in order (later wins):
//! 1. `/etc/ladle/config.toml` (system)
//! 2. `~/.config/ladle/config.toml` (user)
//! 3. `./ladle.toml` (local override, replaced by `--config` when given)
//! 4. Environment variables (`LADLE_*`)
//!
//! # Example Config
//!
//! ```toml
//! [storage]
//! backend = "local"
//! data_dir = "~/.local/share/ladle"
//!
//! [bind]
//! host = "127.0.0.1"
//! http_port = 3000
//!
//! [telemetry]
//! log_level = "info"
//!
//! [access]
//! username = "cook"
//! password = "secret"
//! ```
//!
//! For the blob backend:
//!
//! ```toml
//! [storage]
//! backend = "blob"
//! blob_url = "https://blobs.example.com/ladle/recipes.json"
//! load_retries = 3
//! retry_backoff_ms = 250
//! ```

pub mod infra;
pub mod loader;

pub use infra::{AccessConfig, BindConfig, StorageBackend, StorageConfig, TelemetryConfig};
pub use loader::{discover_config_files, expand_path, ConfigSources};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete ladle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LadleConfig {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Optional login gate. When absent the login route is not served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<AccessConfig>,
}

impl LadleConfig {
    /// Load configuration from all standard sources.
    pub fn load() -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources(None)?;
        Ok(config)
    }

    /// Load configuration, preferring `config_path` over the local
    /// `./ladle.toml` override when provided.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (config, _sources) = Self::load_with_sources(config_path)?;
        Ok(config)
    }

    /// Load configuration and report where each value came from.
    pub fn load_with_sources(
        config_path: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();
        let files = loader::discover_config_files_with_override(config_path);

        let mut merged = toml::Table::new();
        for file in &files {
            let table = loader::load_table(file)?;
            loader::merge_tables(&mut merged, table);
            sources.files.push(file.clone());
        }

        let mut config: LadleConfig =
            toml::Value::Table(merged)
                .try_into()
                .map_err(|e: toml::de::Error| ConfigError::Parse {
                    path: files.last().cloned().unwrap_or_default(),
                    message: e.to_string(),
                })?;

        loader::apply_env_overrides(&mut config, &mut sources);
        config.validate()?;
        Ok((config, sources))
    }

    /// Reject configurations that cannot work before the server starts.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.backend == StorageBackend::Blob && self.storage.blob_url.is_none() {
            return Err(ConfigError::Invalid(
                "storage.backend = \"blob\" requires storage.blob_url".to_string(),
            ));
        }
        Ok(())
    }

    /// Path of the persisted recipe collection (local backend).
    pub fn recipes_path(&self) -> PathBuf {
        self.storage.data_dir.join("recipes.json")
    }

    /// Path of the companion last-login document (local backend).
    pub fn logins_path(&self) -> PathBuf {
        self.storage.data_dir.join("logins.json")
    }
}
