use serde::{Deserialize, Serialize};

use crate::config::dns::Dns;
use crate::config::group::ProxyGroup;
use crate::config::proxy::Proxy;

pub mod dns;
pub mod group;
pub mod proxy;
pub mod shared;

/// Top-level Clash configuration document.
///
/// Field declaration order is the serialization order. Keep it stable:
/// output must be byte-identical across runs for the same input.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClashConfig {
    /// HTTP proxy listen port
    pub port: u16,

    /// SOCKS5 proxy listen port
    #[serde(rename = "socks-port")]
    pub socks_port: u16,

    /// Accept connections from the LAN
    #[serde(rename = "allow-lan")]
    pub allow_lan: bool,

    /// Routing mode (rule, global, direct)
    pub mode: String,

    /// Client log level
    #[serde(rename = "log-level")]
    pub log_level: String,

    /// RESTful controller listen address
    #[serde(rename = "external-controller")]
    pub external_controller: String,

    /// DNS resolver block
    pub dns: Dns,

    /// Proxy entries, in decode order
    pub proxies: Vec<Proxy>,

    /// Selection-policy groups over the proxies
    #[serde(rename = "proxy-groups")]
    pub proxy_groups: Vec<ProxyGroup>,

    /// Routing rules, last entry is the catch-all
    pub rules: Vec<String>,
}

impl ClashConfig {
    /// Serialize the document to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Deserialize a document from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Names of all proxy entries, in insertion order
    pub fn proxy_names(&self) -> Vec<&str> {
        self.proxies.iter().map(Proxy::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::group::{GroupKind, ProxyGroup};
    use crate::config::proxy::ShadowsocksProxy;

    fn sample_config() -> ClashConfig {
        ClashConfig {
            port: 7890,
            socks_port: 7891,
            allow_lan: false,
            mode: "rule".to_string(),
            log_level: "info".to_string(),
            external_controller: "127.0.0.1:9090".to_string(),
            dns: Dns::default(),
            proxies: vec![Proxy::Shadowsocks(ShadowsocksProxy {
                name: "node-a".to_string(),
                server: "a.example.com".to_string(),
                port: 8388,
                cipher: "aes-128-gcm".to_string(),
                password: "secret".to_string(),
            })],
            proxy_groups: vec![ProxyGroup {
                name: "select".to_string(),
                kind: GroupKind::Select,
                proxies: vec!["node-a".to_string()],
                url: None,
                interval: None,
            }],
            rules: vec!["MATCH,select".to_string()],
        }
    }

    #[test]
    fn test_clash_config_yaml_top_level_keys() {
        let yaml = sample_config().to_yaml().unwrap();
        assert!(yaml.contains("port: 7890"));
        assert!(yaml.contains("socks-port: 7891"));
        assert!(yaml.contains("allow-lan: false"));
        assert!(yaml.contains("mode: rule"));
        assert!(yaml.contains("log-level: info"));
        assert!(yaml.contains("external-controller: 127.0.0.1:9090"));
        assert!(yaml.contains("dns:"));
        assert!(yaml.contains("proxies:"));
        assert!(yaml.contains("proxy-groups:"));
        assert!(yaml.contains("rules:"));
    }

    #[test]
    fn test_clash_config_yaml_is_deterministic() {
        let config = sample_config();
        assert_eq!(config.to_yaml().unwrap(), config.to_yaml().unwrap());
    }

    #[test]
    fn test_clash_config_roundtrip() {
        let original = sample_config();
        let yaml = original.to_yaml().unwrap();
        let parsed = ClashConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_proxy_names_preserve_order() {
        let mut config = sample_config();
        config.proxies.push(Proxy::Shadowsocks(ShadowsocksProxy {
            name: "node-b".to_string(),
            server: "b.example.com".to_string(),
            port: 8389,
            cipher: "aes-256-gcm".to_string(),
            password: "secret".to_string(),
        }));
        assert_eq!(config.proxy_names(), vec!["node-a", "node-b"]);
    }
}
