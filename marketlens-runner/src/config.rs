//! Application configuration: TOML file, then environment overrides.
//!
//! Every field has a default, so an empty file (or no file) is valid. Vendor
//! keys left unset simply disable that vendor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use marketlens_core::risk::DEFAULT_MAX_RISK;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arbiter::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL, DEFAULT_TIMEOUT_SECS};

pub const ENV_ALPHAVANTAGE_KEY: &str = "ALPHAVANTAGE_KEY";
pub const ENV_MARKETSTACK_KEY: &str = "MARKETSTACK_KEY";
pub const ENV_OLLAMA_URL: &str = "OLLAMA_URL";
pub const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorsConfig {
    pub alphavantage_key: Option<String>,
    pub marketstack_key: Option<String>,
    /// Directory of `{SYMBOL}.csv` files, tried after the HTTP vendors.
    pub csv_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningConfig {
    pub url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ReasoningConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub max_risk: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_risk: DEFAULT_MAX_RISK,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub vendors: VendorsConfig,
    pub reasoning: ReasoningConfig,
    pub risk: RiskConfig,
}

impl AppConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Overlay process environment variables.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables from `lookup`. Blank values are ignored.
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_ALPHAVANTAGE_KEY) {
            self.vendors.alphavantage_key = Some(key);
        }
        if let Some(key) = get(ENV_MARKETSTACK_KEY) {
            self.vendors.marketstack_key = Some(key);
        }
        if let Some(url) = get(ENV_OLLAMA_URL) {
            self.reasoning.url = url;
        }
        if let Some(model) = get(ENV_OLLAMA_MODEL) {
            self.reasoning.model = model;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let max_risk = self.risk.max_risk;
        if !(max_risk > 0.0 && max_risk <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "risk.max_risk must be in (0, 1], got {max_risk}"
            )));
        }
        if self.reasoning.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "reasoning.timeout_secs must be at least 1".into(),
            ));
        }
        if self.reasoning.url.trim().is_empty() {
            return Err(ConfigError::Invalid("reasoning.url must not be empty".into()));
        }
        if self.reasoning.model.trim().is_empty() {
            return Err(ConfigError::Invalid("reasoning.model must not be empty".into()));
        }
        Ok(())
    }
}
