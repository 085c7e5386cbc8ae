//! Platform derivation from recipe links.
//!
//! A platform is never stored; it is always re-derived from the `link`
//! field by substring match on the known hosts. Links that match none of
//! them have no platform and are excluded from platform filtering.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Video platform a linked recipe points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Instagram,
    Tiktok,
}

impl Platform {
    /// Derive the platform from a link, if any.
    pub fn from_link(link: &str) -> Option<Self> {
        if link.contains("youtube.com") || link.contains("youtu.be") {
            Some(Platform::Youtube)
        } else if link.contains("instagram.com") {
            Some(Platform::Instagram)
        } else if link.contains("tiktok.com") {
            Some(Platform::Tiktok)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized platform names in queries and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "youtube" => Ok(Platform::Youtube),
            "instagram" => Ok(Platform::Instagram),
            "tiktok" => Ok(Platform::Tiktok),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}
