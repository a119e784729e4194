//! DNS block emitted into every generated document.

use serde::{Deserialize, Serialize};

/// DNS resolver settings. The generated document always carries the same
/// block; `Default` is that block.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Dns {
    pub enable: bool,

    pub listen: String,

    /// Plain resolvers used to bootstrap the DoH upstreams
    #[serde(rename = "default-nameserver")]
    pub default_nameserver: Vec<String>,

    #[serde(rename = "enhanced-mode")]
    pub enhanced_mode: String,

    #[serde(rename = "fake-ip-range")]
    pub fake_ip_range: String,

    pub nameserver: Vec<String>,
}

impl Default for Dns {
    fn default() -> Self {
        Self {
            enable: true,
            listen: "0.0.0.0:53".to_string(),
            default_nameserver: vec!["223.5.5.5".to_string(), "119.29.29.29".to_string()],
            enhanced_mode: "fake-ip".to_string(),
            fake_ip_range: "198.18.0.1/16".to_string(),
            nameserver: vec![
                "https://doh.pub/dns-query".to_string(),
                "https://dns.alidns.com/dns-query".to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dns_default_block() {
        let dns = Dns::default();
        assert!(dns.enable);
        assert_eq!(dns.listen, "0.0.0.0:53");
        assert_eq!(dns.enhanced_mode, "fake-ip");
        assert_eq!(dns.fake_ip_range, "198.18.0.1/16");
        assert_eq!(dns.default_nameserver.len(), 2);
        assert_eq!(dns.nameserver.len(), 2);
    }

    #[test]
    fn test_dns_yaml_keys() {
        let yaml = serde_yaml::to_string(&Dns::default()).unwrap();
        assert!(yaml.contains("enable: true"));
        assert!(yaml.contains("default-nameserver:"));
        assert!(yaml.contains("enhanced-mode: fake-ip"));
        assert!(yaml.contains("fake-ip-range: 198.18.0.1/16"));
        assert!(yaml.contains("nameserver:"));
    }

    #[test]
    fn test_dns_roundtrip() {
        let dns = Dns::default();
        let yaml = serde_yaml::to_string(&dns).unwrap();
        let parsed: Dns = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, dns);
    }
}
