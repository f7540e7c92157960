//! Optional user configuration.
//!
//! Read from `~/.config/upq/config.toml` when present. CLI flags and
//! environment variables override anything set here.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, UploadError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Upload endpoint URL.
    pub endpoint: Option<String>,

    /// Maximum simultaneous uploads.
    pub max_concurrent: Option<usize>,
}

impl Config {
    /// Load the user's config file. A missing file is not an error; a
    /// malformed one is.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("upq").join("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|e| UploadError::Config(format!("{}: {e}", path.display())))
    }
}
