//! Proxy groups: named selection policies over proxies or other groups.

use serde::{Deserialize, Serialize};

/// Selection policy of a group
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKind {
    /// Manual selection
    Select,
    /// Automatic selection by latency probe
    UrlTest,
    /// Ordered failover
    Fallback,
    /// Load balancing
    LoadBalance,
}

/// One proxy-group entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProxyGroup {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: GroupKind,

    /// Member names: proxy names, other group names, or the builtin DIRECT
    pub proxies: Vec<String>,

    /// Health-check URL for probing kinds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Health-check interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

impl ProxyGroup {
    /// Manual select group, no health check
    pub fn select(name: impl Into<String>, proxies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind: GroupKind::Select,
            proxies,
            url: None,
            interval: None,
        }
    }

    /// Probing group (url-test, fallback or load-balance)
    pub fn probing(
        name: impl Into<String>,
        kind: GroupKind,
        proxies: Vec<String>,
        url: impl Into<String>,
        interval: u32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            proxies,
            url: Some(url.into()),
            interval: Some(interval),
        }
    }
}
