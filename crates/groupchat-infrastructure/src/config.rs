//! Configuration loading.
//!
//! The configuration lives in a single TOML file. Every section and field has
//! a default, so a missing file or a partial file is fine.
//!
//! # File Location
//!
//! - macOS: `~/Library/Application Support/groupchat/config.toml`
//! - Linux: `~/.config/groupchat/config.toml`
//! - Windows: `%APPDATA%\groupchat\config.toml`
//!
//! # Example
//!
//! ```toml
//! [logging]
//! level = "debug"
//! json = true
//!
//! [auth]
//! restore_on_start = false
//! ```

use std::path::{Path, PathBuf};

use groupchat_core::error::{ChatError, Result};
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "groupchat";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `groupchat_application=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Re-establish the session from the provider's remembered identity at startup
    pub restore_on_start: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            restore_on_start: true,
        }
    }
}

impl ChatConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads the configuration at `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// - `ChatError::Io` if the file exists but cannot be read
    /// - `ChatError::Serialization` if it is not valid TOML for this schema
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}; using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).inspect_err(|e| {
            tracing::error!("Invalid config at {:?}: {}", path, e);
        })
    }

    /// Default config path under the platform config directory.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ChatError::config("Cannot determine config directory"))?;
        Ok(config_dir.join(APP_DIR).join(CONFIG_FILE))
    }

    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path()?)
    }
}
