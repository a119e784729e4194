//! Runtime settings.
//!
//! Settings are parsed from a TOML file; every field has a default so the
//! tool also runs without one. External binaries and service endpoints are
//! configured here rather than hard-coded, so tests and deployments can
//! substitute their own.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings parsed from a TOML file.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    /// Node identifiers handed to the enumeration tool, one share-link each
    #[serde(default)]
    pub nodes: Vec<String>,

    /// Binary that enumerates node share-links
    #[serde(default = "default_source_bin")]
    pub source_bin: String,

    /// Binary used for strict config checking
    #[serde(default = "default_validator_bin")]
    pub validator_bin: String,

    /// Base URL of the external conversion service
    #[serde(default = "default_subconverter_url")]
    pub subconverter_url: String,

    /// Seconds allowed for one enumeration or subscription fetch
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Seconds allowed for one validator run
    #[serde(default = "default_validate_timeout")]
    pub validate_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            source_bin: default_source_bin(),
            validator_bin: default_validator_bin(),
            subconverter_url: default_subconverter_url(),
            request_timeout: default_request_timeout(),
            validate_timeout: default_validate_timeout(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(content).context("Failed to parse settings TOML")?;

        if settings.request_timeout == 0 || settings.validate_timeout == 0 {
            anyhow::bail!("Timeouts must be non-zero");
        }

        if !settings.subconverter_url.starts_with("http://")
            && !settings.subconverter_url.starts_with("https://")
        {
            anyhow::bail!(
                "subconverter_url must start with http:// or https://: {}",
                settings.subconverter_url
            );
        }

        Ok(settings)
    }

    /// Load settings from a file path
    pub async fn load(path: &str) -> Result<Self> {
        let content = tokio::fs::read_to_string(Path::new(path))
            .await
            .with_context(|| format!("Failed to read settings from {}", path))?;
        Self::from_toml(&content)
    }
}

fn default_source_bin() -> String {
    "sing-box".to_string()
}

fn default_validator_bin() -> String {
    "mihomo".to_string()
}

fn default_subconverter_url() -> String {
    "http://localhost:25500".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_validate_timeout() -> u64 {
    10
}
