//! Configuration sections - things that cannot change at runtime.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which backend holds the persisted collection document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One JSON file on the local filesystem.
    #[default]
    Local,
    /// One named object in a remote blob store, addressed by URL.
    Blob,
}

/// Where and how the collection document is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend selection. Explicit configuration, never inferred per call.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for local documents (recipes.json, logins.json).
    /// Default: ~/.local/share/ladle
    #[serde(default = "StorageConfig::default_data_dir")]
    pub data_dir: PathBuf,

    /// Object URL for the blob backend. Required when backend = "blob".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_url: Option<String>,

    /// Bearer token sent with blob requests, if the store wants one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_token: Option<String>,

    /// How many times a blob load is retried on transport failure.
    /// Default: 3
    #[serde(default = "StorageConfig::default_load_retries")]
    pub load_retries: u32,

    /// Fixed backoff between blob load retries, in milliseconds.
    /// Default: 250
    #[serde(default = "StorageConfig::default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl StorageConfig {
    fn default_data_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".local/share/ladle"))
            .unwrap_or_else(|| PathBuf::from(".local/share/ladle"))
    }

    fn default_load_retries() -> u32 {
        3
    }

    fn default_retry_backoff_ms() -> u64 {
        250
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            data_dir: Self::default_data_dir(),
            blob_url: None,
            blob_token: None,
            load_retries: Self::default_load_retries(),
            retry_backoff_ms: Self::default_retry_backoff_ms(),
        }
    }
}

/// Network bind address for the HTTP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindConfig {
    /// Address to bind. Default: 127.0.0.1
    #[serde(default = "BindConfig::default_host")]
    pub host: String,

    /// HTTP port for the REST API. Default: 3000
    #[serde(default = "BindConfig::default_http_port")]
    pub http_port: u16,
}

impl BindConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_http_port() -> u16 {
        3000
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            http_port: Self::default_http_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level (trace, debug, info, warn, error). Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// Single-pair credential gate for deployments that want one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_defaults() {
        let storage = StorageConfig::default();
        assert_eq!(storage.backend, StorageBackend::Local);
        assert_eq!(storage.load_retries, 3);
        assert_eq!(storage.retry_backoff_ms, 250);
        assert!(storage.blob_url.is_none());
    }

    #[test]
    fn backend_parses_lowercase() {
        let storage: StorageConfig = toml::from_str("backend = \"blob\"").unwrap();
        assert_eq!(storage.backend, StorageBackend::Blob);
    }
}
