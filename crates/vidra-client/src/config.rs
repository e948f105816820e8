//! Configuration management for vidra.
//!
//! Loads configuration from ${VIDRA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod paths {
    //! Path resolution for vidra configuration and data directories.
    //!
    //! VIDRA_HOME resolution order:
    //! 1. VIDRA_HOME environment variable (if set)
    //! 2. ~/.config/vidra (default)

    use std::path::PathBuf;

    /// Returns the vidra home directory.
    pub fn vidra_home() -> PathBuf {
        if let Ok(home) = std::env::var("VIDRA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("vidra"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        vidra_home().join("config.toml")
    }

    /// Returns the directory for CLI log files.
    pub fn logs_dir() -> PathBuf {
        vidra_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the platform API.
    pub base_url: String,

    /// Page size for the stream listing.
    pub page_limit: u64,

    /// Request timeout in seconds (0 disables).
    pub request_timeout_secs: u32,
}

impl Config {
    const DEFAULT_BASE_URL: &str = "https://api.example.com/";
    const DEFAULT_PAGE_LIMIT: u64 = 10;
    /// Default is disabled; the transport's own limits apply.
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 0;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            Config::default()
        };

        // Env var wins over the config file.
        if let Ok(url) = std::env::var("VIDRA_BASE_URL") {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                config.base_url = trimmed.to_string();
            }
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        Ok(())
    }

    /// Base URL normalized to end with a slash, so paths join cleanly.
    pub fn base_url_normalized(&self) -> String {
        if self.base_url.ends_with('/') {
            self.base_url.clone()
        } else {
            format!("{}/", self.base_url)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            page_limit: Self::DEFAULT_PAGE_LIMIT,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
