//! Document rendering.
//!
//! Turns a [`ClashConfig`] into the final YAML text, prefixed with a
//! provenance header naming the generator, the generation time and the node
//! count. The timestamp is injected by the caller so rendering stays a pure
//! function and tests can pin it.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::config::ClashConfig;
use crate::get_version;

/// Render the document with its provenance header.
pub fn render(config: &ClashConfig, generated_at: DateTime<Utc>) -> Result<String> {
    let yaml = config
        .to_yaml()
        .context("Failed to serialize config to YAML")?;

    Ok(format!(
        "# Clash configuration\n\
         # Generated by subforge {}\n\
         # Generated at: {}\n\
         # Proxy count: {}\n\
         \n\
         {}",
        get_version(),
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        config.proxies.len(),
        yaml
    ))
}

/// Render with the current wall-clock time.
pub fn render_now(config: &ClashConfig) -> Result<String> {
    render(config, Utc::now())
}
