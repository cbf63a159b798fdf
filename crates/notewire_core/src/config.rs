//! Client configuration — `notewire.toml`.
//!
//! # Responsibility
//! - Define the deployment-specific settings: API base URL, request
//!   timeout, storage path, logging, reset-code exposure.
//!
//! # Invariants
//! - A missing or empty config file is equivalent to the defaults.
//! - The reset-code debug aid stays off unless explicitly enabled.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

/// Canonical configuration filename.
pub const CONFIG_FILENAME: &str = "notewire.toml";

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LogConfig,
    #[serde(default)]
    pub reset: ResetConfig,
}

/// Remote API settings. The base URL is fixed per deployment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Durable credential-store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// File-logging settings; logging stays off without a directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Absolute directory for rolling log files.
    #[serde(default)]
    pub dir: Option<String>,
    /// Level override; defaults per build mode when absent.
    #[serde(default)]
    pub level: Option<String>,
}

/// Password-reset development aids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResetConfig {
    /// Surfaces server-echoed reset codes as info notices. Development
    /// deployments only.
    #[serde(default)]
    pub expose_debug_codes: bool,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_storage_path() -> String {
    "notewire.db".to_string()
}

/// Configuration load error.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
        }
    }
}

impl Config {
    /// Parses TOML configuration text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    /// Loads configuration from `path`; a missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }
}
