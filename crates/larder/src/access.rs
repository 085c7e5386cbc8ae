//! Companion last-login document.
//!
//! Deployments with an access gate keep a small JSON object next to the
//! collection, mapping each username to the timestamp of its last
//! successful login. Purely informational; nothing reads it back at
//! runtime.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::Utc;

use crate::LarderError;

/// Records last-login timestamps in a local JSON document.
#[derive(Debug, Clone)]
pub struct LoginLog {
    path: PathBuf,
}

impl LoginLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Stamp `username` with the current time.
    pub fn record(&self, username: &str) -> Result<(), LarderError> {
        let mut logins = self.read_all()?;
        logins.insert(username.to_string(), Utc::now().to_rfc3339());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| LarderError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let bytes = serde_json::to_vec_pretty(&logins).unwrap_or_default();
        fs::write(&self.path, bytes).map_err(|e| LarderError::Io {
            path: self.path.clone(),
            source: e,
        })
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, LarderError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| LarderError::Corrupt(format!("{}: {e}", self.path.display()))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(LarderError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
