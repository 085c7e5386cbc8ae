//! Config file discovery, loading, and environment variable overlay.

use crate::{ConfigError, LadleConfig, StorageBackend};
use std::env;
use std::path::{Path, PathBuf};

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files in standard locations.
///
/// Returns paths in load order (system, user, local).
/// Only returns files that exist.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    // System config
    let system = PathBuf::from("/etc/ladle/config.toml");
    if system.exists() {
        files.push(system);
    }

    // User config (XDG_CONFIG_HOME or ~/.config)
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join("ladle/config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    // CLI override takes precedence over local
    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    // Local override (current directory)
    let local = PathBuf::from("ladle.toml");
    if local.exists() {
        files.push(local);
    }

    files
}

/// Read a config file into a raw TOML table.
pub fn load_table(path: &Path) -> Result<toml::Table, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    contents
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Deep-merge `overlay` into `base`. Tables merge recursively, any other
/// value in the overlay replaces the base value.
pub fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                merge_tables(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(config: &mut LadleConfig, sources: &mut ConfigSources) {
    if let Ok(v) = env::var("LADLE_DATA_DIR") {
        config.storage.data_dir = expand_path(&v);
        sources.env_overrides.push("LADLE_DATA_DIR".to_string());
    }
    if let Ok(v) = env::var("LADLE_STORAGE_BACKEND") {
        match v.as_str() {
            "local" => config.storage.backend = StorageBackend::Local,
            "blob" => config.storage.backend = StorageBackend::Blob,
            _ => {}
        }
        sources.env_overrides.push("LADLE_STORAGE_BACKEND".to_string());
    }
    if let Ok(v) = env::var("LADLE_BLOB_URL") {
        config.storage.blob_url = Some(v);
        sources.env_overrides.push("LADLE_BLOB_URL".to_string());
    }
    if let Ok(v) = env::var("LADLE_BLOB_TOKEN") {
        config.storage.blob_token = Some(v);
        sources.env_overrides.push("LADLE_BLOB_TOKEN".to_string());
    }
    if let Ok(v) = env::var("LADLE_HTTP_PORT") {
        if let Ok(port) = v.parse() {
            config.bind.http_port = port;
            sources.env_overrides.push("LADLE_HTTP_PORT".to_string());
        }
    }
    if let Ok(v) = env::var("LADLE_HOST") {
        config.bind.host = v;
        sources.env_overrides.push("LADLE_HOST".to_string());
    }
    if let Ok(v) = env::var("LADLE_LOG_LEVEL") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("LADLE_LOG_LEVEL".to_string());
    }
    // Also support RUST_LOG
    if let Ok(v) = env::var("RUST_LOG") {
        config.telemetry.log_level = v;
        sources.env_overrides.push("RUST_LOG".to_string());
    }
}

/// Expand ~ in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
