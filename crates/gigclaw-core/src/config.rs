//! Configuration for the GigClaw client
//!
//! `GigclawConfig` is read from `~/.gigclaw/config.toml` (never written by
//! this crate) and overlaid with environment variables. It resolves into an
//! immutable `ClientConfig` that a single client instance is built from.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{GigError, Result};

/// Production API endpoint
pub const DEFAULT_API_URL: &str = "https://gigclaw-production.up.railway.app";

pub const ENV_API_URL: &str = "GIGCLAW_API_URL";
pub const ENV_API_KEY: &str = "GIGCLAW_API_KEY";
pub const ENV_DEBUG: &str = "GIGCLAW_DEBUG";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_REFRESH_SECS: u64 = 30;

/// Settings for one client instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Optional bearer credential
    pub api_key: Option<String>,
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Backoff unit; attempt `n` waits `n² × backoff_unit`
    pub backoff_unit: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_unit: Duration::from_secs(1),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let key = api_key.into();
        self.api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_unit(mut self, unit: Duration) -> Self {
        self.backoff_unit = unit;
        self
    }

    /// Reject configurations no request could succeed with
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(GigError::Config(
                "API URL is required. Set --api-url, GIGCLAW_API_URL or api_url in the config file"
                    .to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(GigError::Config(format!(
                "API URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// User-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GigclawConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Dashboard auto-refresh interval
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_refresh_secs() -> u64 {
    DEFAULT_REFRESH_SECS
}

impl Default for GigclawConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl GigclawConfig {
    /// `~/.gigclaw/config.toml`, if a home directory exists
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".gigclaw").join("config.toml"))
    }

    /// Load configuration from `path`, or defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = toml::from_str(&content)?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from an explicit path or the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(GigError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_or_default(path)
            }
            None => match Self::default_path() {
                Some(path) => Self::load_or_default(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Overlay `GIGCLAW_API_URL` and `GIGCLAW_API_KEY`
    pub fn apply_env(self) -> Self {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Overlay variables from an arbitrary lookup
    pub fn apply_vars<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }

    /// Resolve into the settings for one client instance
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.api_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_retries(self.max_retries);
        match &self.api_key {
            Some(key) => config.with_api_key(key.clone()),
            None => config,
        }
    }
}

/// Whether `GIGCLAW_DEBUG=true` is set
pub fn debug_from_env() -> bool {
    std::env::var(ENV_DEBUG)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}
