// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Persistent user configuration.
//!
//! Settings live in `~/.config/smart-shell/config.json`:
//!
//! ```json
//! { "api_key": "...", "default_model": "gemini-2.5-flash", "sudo_password_b64": "..." }
//! ```
//!
//! - **Degrading load**: a missing file yields defaults; a corrupt file is
//!   moved to a timestamped backup and defaults are used
//! - **Atomic writes**: temp-file-then-rename, mode `0o600` on Unix
//! - **Environment override**: `SMART_SHELL_API_KEY` wins over the stored key
//!
//! # Example
//!
//! ```no_run
//! use smart_shell::config::ConfigManager;
//!
//! let mut manager = ConfigManager::load(ConfigManager::default_path());
//! manager.config_mut().default_model = "gemini-2.5-pro".to_string();
//! manager.save()?;
//! # Ok::<(), smart_shell::config::ConfigError>(())
//! ```

mod error;
pub mod storage;

pub use error::ConfigError;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::llm::gemini::DEFAULT_MODEL;

/// Environment variable that overrides the stored API key
pub const API_KEY_ENV: &str = "SMART_SHELL_API_KEY";

const DEFAULT_CONFIG_PATH: &str = "~/.config/smart-shell/config.json";
const DEFAULT_DATA_DIR: &str = "~/.local/share/smart-shell";

/// Config file permissions (owner read/write only)
const CONFIG_MODE: u32 = 0o600;

/// On-disk configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub default_model: String,

    /// Base64-encoded sudo password, only present when the user opted in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sudo_password_b64: Option<String>,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            sudo_password_b64: None,
        }
    }
}

impl AppConfig {
    /// Decodes the stored sudo password, if any
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidSecret` if the stored value is not
    /// base64-encoded UTF-8.
    pub fn sudo_password(&self) -> Result<Option<String>, ConfigError> {
        let Some(encoded) = &self.sudo_password_b64 else {
            return Ok(None);
        };

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| ConfigError::InvalidSecret)?;
        let password = String::from_utf8(bytes).map_err(|_| ConfigError::InvalidSecret)?;

        Ok(Some(password).filter(|p| !p.is_empty()))
    }

    /// Stores (or with `None`, removes) the sudo password
    pub fn set_sudo_password(&mut self, password: Option<&str>) {
        self.sudo_password_b64 = password
            .filter(|p| !p.is_empty())
            .map(|p| STANDARD.encode(p.as_bytes()));
    }

    /// Resolves the API key, preferring a non-empty `env_value`
    pub fn api_key_with_override(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
    }
}

/// Loads and saves [`AppConfig`] at a fixed path.
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigManager {
    /// `~/.config/smart-shell/config.json`, tilde-expanded
    pub fn default_path() -> PathBuf {
        expand_path(DEFAULT_CONFIG_PATH)
    }

    /// `~/.local/share/smart-shell`, tilde-expanded (history and log)
    pub fn default_data_dir() -> PathBuf {
        expand_path(DEFAULT_DATA_DIR)
    }

    /// Loads configuration, never failing
    ///
    /// A missing file gives defaults. An unreadable or corrupt file is
    /// logged as a warning; a corrupt one is moved aside first.
    pub fn load(config_path: PathBuf) -> Self {
        let config = match Self::try_load(&config_path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!("No config at {}, using defaults", config_path.display());
                AppConfig::default()
            }
            Err(ConfigError::Malformed(e)) => {
                warn!("Config {} is malformed: {}", config_path.display(), e);
                if let Err(e) = storage::quarantine(&config_path) {
                    warn!("{}", e);
                }
                AppConfig::default()
            }
            Err(e) => {
                warn!("Could not read config {}: {}", config_path.display(), e);
                AppConfig::default()
            }
        };

        Self {
            config_path,
            config,
        }
    }

    /// Reads and parses the file; `Ok(None)` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` on read failures and
    /// `ConfigError::Malformed` if the JSON does not parse.
    pub fn try_load(config_path: &Path) -> Result<Option<AppConfig>, ConfigError> {
        let content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Writes the configuration atomically with owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::WriteFailed` or `ConfigError::Io` if the file
    /// cannot be written; the previous file stays intact.
    pub fn save(&self) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(&self.config)?;
        storage::write_atomically(&self.config_path, json.as_bytes(), Some(CONFIG_MODE))
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut AppConfig {
        &mut self.config
    }

    /// API key from `SMART_SHELL_API_KEY`, falling back to the stored key
    pub fn api_key(&self) -> Option<String> {
        self.config
            .api_key_with_override(std::env::var(API_KEY_ENV).ok())
    }
}

/// Expands a leading `~` in a user-supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

#[cfg(test)]
mod tests;
