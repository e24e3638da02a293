//! Editor configuration, read from `<config_dir>/manzai/config.ron`.
//!
//! ```ron
//! (
//!     database: "/home/me/.local/share/manzai/manzai.db",
//!     autosave_debounce_ms: 1500,
//!     generator: Some((api_key_env: Some("MY_GEMINI_KEY"), model: "gemini-1.5-pro")),
//! )
//! ```
//!
//! Every field is optional. A missing file means all defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::ProviderConfig;
use crate::store::STORAGE_KEY;

const APP_DIR: &str = "manzai";
const CONFIG_FILE: &str = "config.ron";
const DATABASE_FILE: &str = "manzai.db";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Ron {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// SQLite key-value store path.
    pub database: PathBuf,
    /// Key the script is saved under.
    pub storage_key: String,
    pub autosave_debounce_ms: u64,
    /// Text generation provider. `None` disables generation.
    pub generator: Option<ProviderConfig>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            storage_key: STORAGE_KEY.to_string(),
            autosave_debounce_ms: 1000,
            generator: None,
        }
    }
}

impl EditorConfig {
    /// `<config_dir>/manzai/config.ron`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, or defaults if there is none.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config = Self::parse(&text).map_err(|source| ConfigError::Ron {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(text)
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(DATABASE_FILE)
}
