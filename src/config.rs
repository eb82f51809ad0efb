//! Configuration for hosts embedding the processors
//!
//! Loaded from a TOML file. Secrets stay out of the file: the CRM API key is
//! named by environment variable and resolved when the client is built.

use crate::crm::RestClientConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Top-level configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    pub crm: CrmSection,
    #[serde(default)]
    pub processors: ProcessorsSection,
}

/// CRM connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrmSection {
    /// Base URL of the CRM's REST API.
    pub base_url: String,
    /// Environment variable containing the API key.
    pub api_key_env: String,
    /// Remote call timeout in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Which processors the host registers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessorsSection {
    #[serde(default = "default_enabled")]
    pub address: bool,
    #[serde(default = "default_enabled")]
    pub website: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for ProcessorsSection {
    fn default() -> Self {
        Self {
            address: true,
            website: true,
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid CRM base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

impl BridgeConfig {
    /// Load configuration from a TOML file and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: BridgeConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the CRM base URL without touching the network.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.crm.base_url)
            .map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {e}", self.crm.base_url)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl(format!(
                "{}: unsupported scheme '{}'",
                self.crm.base_url,
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Resolve the API key from the environment.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.crm.api_key_env)
            .map_err(|_| ConfigError::EnvVarNotFound(self.crm.api_key_env.clone()))
    }

    /// Assemble the REST client configuration, resolving the API key.
    pub fn client_config(&self) -> Result<RestClientConfig, ConfigError> {
        Ok(RestClientConfig {
            base_url: self.crm.base_url.clone(),
            api_key: self.resolve_api_key()?,
            timeout: Duration::from_secs(self.crm.timeout_secs),
        })
    }
}
