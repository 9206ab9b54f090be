//! Flow configuration: target URL, credentials, and pacing.
//!
//! Configuration is resolved from an explicit path, or discovered from
//! `./wardflow.yaml` then `~/.wardflow/config.yaml`, falling back to built-in
//! defaults when neither exists. Every field has a default so a partial file
//! is always valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wardflow_core::Pacing;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_password")]
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: default_password(),
        }
    }
}

fn default_username() -> String {
    "admin".to_string()
}

fn default_password() -> String {
    "admin".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Root URL of the hospital-management application.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub credentials: Credentials,

    #[serde(default)]
    pub pacing: Pacing,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            credentials: Credentials::default(),
            pacing: Pacing::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:9000/".to_string()
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from the first config file found in the search order, or defaults.
    pub async fn load_default() -> Result<FlowConfig, ConfigError> {
        for path in Self::search_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load_from(&path).await;
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok(FlowConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<FlowConfig, ConfigError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config = serde_yaml::from_str(&raw)?;
        Ok(config)
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("wardflow.yaml")];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".wardflow").join("config.yaml"));
        }
        paths
    }
}
