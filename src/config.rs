//! Environment-driven settings

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::scrapers::Provider;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Runtime settings, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Base URL override for the built-in provider (mirror)
    pub base_url: Option<String>,
    /// JSON provider definition replacing the built-in one
    pub provider_file: Option<PathBuf>,
    pub timeout: Duration,
    pub download_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            provider_file: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            download_dir: std::env::temp_dir(),
        }
    }
}

/// Load `.env` from the current directory, else from the config directory
pub fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        if let Some(config_dir) = dirs::config_dir() {
            let config_env = config_dir.join("zetorrents").join(".env");
            dotenvy::from_path(&config_env).ok();
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            base_url: get("ZETORRENTS_URL"),
            provider_file: get("PROVIDER_FILE").map(PathBuf::from),
            timeout: get("HTTP_TIMEOUT_SECS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            download_dir: get("DOWNLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.download_dir),
        }
    }

    /// The provider to search, after file and URL overrides
    pub fn provider(&self) -> Result<Provider> {
        let provider = match &self.provider_file {
            Some(path) => Provider::from_json(&std::fs::read_to_string(path)?)?,
            None => Provider::zetorrents(),
        };

        Ok(match &self.base_url {
            Some(url) => provider.with_base_url(url),
            None => provider,
        })
    }
}
