//! memfs configuration.
//!
//! Read from a TOML file, by default `$XDG_CONFIG_HOME/memfs/config.toml`.
//! A missing file is not an error: every field has a default.
//!
//! ```toml
//! scheme = "memfs"
//! read_only = false
//! debounce_ms = 5
//! workspace_name = "MemFS - Sample"
//! ```
//!
//! `MEMFS_READ_ONLY=1` (or `true`) forces the read-only flag on.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::vfs::is_valid_scheme;

/// Environment variable that overrides `read_only`.
pub const READ_ONLY_ENV: &str = "MEMFS_READ_ONLY";

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Provider and notifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemfsConfig {
    /// URI scheme the provider registers under.
    pub scheme: String,
    /// Declared read-only capability; host glue rejects mutations when set.
    pub read_only: bool,
    /// Debounce window for change batches, in milliseconds.
    pub debounce_ms: u64,
    /// Display name for the workspace folder.
    pub workspace_name: String,
}

impl Default for MemfsConfig {
    fn default() -> Self {
        Self {
            scheme: "memfs".to_string(),
            read_only: false,
            debounce_ms: 5,
            workspace_name: "MemFS - Sample".to_string(),
        }
    }
}

impl MemfsConfig {
    /// Default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("memfs").join("config.toml"))
    }

    /// Parse TOML text. `origin` is only used in error messages.
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// `None`. A missing file yields defaults. Applies the env override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        let mut config = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                tracing::debug!(path = %path.display(), "loaded memfs config");
                Self::from_toml(&text, &path)?
            }
            _ => Self::default(),
        };

        if env_flag(READ_ONLY_ENV) {
            config.read_only = true;
        }
        Ok(config)
    }

    /// Debounce window as a `Duration`.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_scheme(&self.scheme) {
            return Err(ConfigError::Invalid(format!("bad scheme {:?}", self.scheme)));
        }
        Ok(())
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
