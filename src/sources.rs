//! Alternate link sources.
//!
//! Besides a local file, batches can come from the external node-enumeration
//! tool (one share-link per configured node identifier) or from a remote
//! subscription URL. Both are collaborators at a boundary: whatever they
//! return is fed to the batch parser like any other raw input.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::error::ConvertError;
use crate::get_version;

/// Scheme prefixes accepted by the extraction filter. Broader than the
/// decodable set on purpose: the filter mirrors what the enumeration tool
/// can print, and the batch parser downstream decides what it can decode.
const EXTRACT_SCHEMES: &[&str] = &[
    "vless://",
    "vmess://",
    "ss://",
    "ssr://",
    "trojan://",
    "hysteria2://",
    "tuic://",
    "wireguard://",
];

/// Minimum plausible share-link length; shorter matches are banner noise.
/// Tuned against observed tool output, do not generalize.
const MIN_LINK_LEN: usize = 20;

// ============================================================================
// Node enumeration
// ============================================================================

/// Result of enumerating the configured nodes
#[derive(Debug, Default)]
pub struct Enumeration {
    /// Extracted share-links, in node order
    pub links: Vec<String>,
    /// Per-node failure descriptions (missing output, timeout, tool error)
    pub errors: Vec<String>,
}

/// Client for the external node-enumeration tool
pub struct NodeSource {
    binary: String,
    timeout: Duration,
}

impl NodeSource {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    /// Probe tool availability with `--version`
    pub async fn available(&self) -> Result<(), ConvertError> {
        let child = Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.unavailable(e.to_string()))?;

        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(()),
            Ok(Ok(output)) => Err(self.unavailable(format!(
                "version probe failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Ok(Err(e)) => Err(self.unavailable(e.to_string())),
            Err(_) => Err(self.unavailable("version probe timed out".to_string())),
        }
    }

    /// Invoke the tool once per node identifier and extract the returned
    /// share-links. Per-node failures are recorded, not fatal; an unusable
    /// tool is fatal before any node runs.
    pub async fn enumerate(&self, nodes: &[String]) -> Result<Enumeration, ConvertError> {
        self.available().await?;

        info!("Enumerating {} node(s) via '{}'", nodes.len(), self.binary);
        let mut enumeration = Enumeration::default();

        for node in nodes {
            match self.node_output(node).await {
                Ok(stdout) => {
                    let links = extract_links(&stdout);
                    if links.is_empty() {
                        enumeration
                            .errors
                            .push(format!("node {node}: output contained no share link"));
                    } else {
                        debug!("node {}: {} link(s)", node, links.len());
                        enumeration.links.extend(links);
                    }
                }
                Err(reason) => enumeration.errors.push(format!("node {node}: {reason}")),
            }
        }

        info!(
            "Enumeration done: {} link(s), {} failure(s)",
            enumeration.links.len(),
            enumeration.errors.len()
        );
        Ok(enumeration)
    }

    async fn node_output(&self, node: &str) -> Result<String, String> {
        let child = Command::new(&self.binary)
            .arg("url")
            .arg(node)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| e.to_string())?;

        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    Err(format!("tool exited with {}", output.status))
                } else {
                    Err(stderr.to_string())
                }
            }
            Ok(Err(e)) => Err(e.to_string()),
            // Distinct timed-out signal, kept apart from other tool errors
            Err(_) => Err("timed out".to_string()),
        }
    }

    fn unavailable(&self, reason: String) -> ConvertError {
        ConvertError::ToolUnavailable {
            tool: self.binary.clone(),
            reason,
        }
    }
}

// ============================================================================
// Link extraction
// ============================================================================

/// Pull plausible share-links out of raw tool output.
///
/// The tool decorates its output with ANSI color and banner text. Each line
/// is stripped of escape sequences and then filtered: allow-listed scheme
/// prefix, both `@` and `:` present, minimum length.
pub fn extract_links(raw: &str) -> Vec<String> {
    strip_ansi(raw)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| EXTRACT_SCHEMES.iter().any(|scheme| line.starts_with(scheme)))
        .filter(|line| line.contains('@') && line.contains(':') && line.len() > MIN_LINK_LEN)
        .map(ToString::to_string)
        .collect()
}

/// Remove CSI escape sequences (`ESC [ ... <letter>`)
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '\u{1b}' && chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// Remote subscription fetch
// ============================================================================

/// Fetch subscription content from a URL, bounded by `fetch_timeout`.
pub async fn fetch_subscription(
    url: &str,
    fetch_timeout: Duration,
) -> Result<String, ConvertError> {
    debug!("Fetching subscription from {}", url);

    let network_error = |reason: String| ConvertError::Network {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .user_agent(format!("subforge/{}", get_version()))
        .timeout(fetch_timeout)
        .build()
        .map_err(|e| network_error(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| network_error(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(network_error(format!("HTTP status {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| network_error(e.to_string()))
}
