//! Configuration management for cinedeck
//!
//! Handles config file loading/saving and access token lookup.
//! Config is stored at ~/.config/cinedeck/config.toml; the TMDB access token
//! only ever comes from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::models::DateLocale;

/// Environment variable holding the TMDB v4 read access token
pub const ACCESS_TOKEN_ENV: &str = "TMDB_ACCESS_TOKEN";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TMDB_ACCESS_TOKEN is not set; export a TMDB API read access token")]
    MissingAccessToken,

    #[error("Could not determine config path")]
    NoConfigPath,

    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to write config: {0}")]
    Write(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Language sent with every API request (e.g. en-US, id-ID)
    pub language: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Directory holding the watchlist; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Locale used for rendered dates
    pub date_locale: DateLocale,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            request_timeout_secs: 30,
            data_dir: None,
            date_locale: DateLocale::default(),
        }
    }
}

impl Config {
    /// Get config file path (~/.config/cinedeck/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cinedeck").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Result<Self, ConfigError> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoConfigPath)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Directory the watchlist is stored in
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cinedeck")
        })
    }

    /// TMDB access token from the environment; fails fast when absent
    pub fn access_token() -> Result<String, ConfigError> {
        token_from(std::env::var(ACCESS_TOKEN_ENV).ok())
    }
}

fn token_from(value: Option<String>) -> Result<String, ConfigError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingAccessToken)
}
