//! Document assembly.
//!
//! [`ConfigBuilder`] turns an ordered list of decoded proxies into the full
//! configuration document: the fixed client block, the DNS block, the
//! six-group selection topology and the fixed rule list. Construction is
//! all-or-nothing; an empty proxy list is a fatal [`ConvertError::EmptyBatch`]
//! because there is nothing meaningful to route.

use tracing::debug;

use crate::config::ClashConfig;
use crate::config::dns::Dns;
use crate::config::group::{GroupKind, ProxyGroup};
use crate::config::proxy::Proxy;
use crate::error::{ConvertError, LineFailure};

// Group names are part of the document contract: the rule list and the
// catch-all group refer to them by name.
pub const GROUP_SELECT: &str = "🚀 节点选择";
pub const GROUP_AUTO: &str = "♻️ 自动选择";
pub const GROUP_FALLBACK: &str = "🔯 故障转移";
pub const GROUP_LOAD_BALANCE: &str = "🔮 负载均衡";
pub const GROUP_DIRECT: &str = "🎯 全球直连";
pub const GROUP_FINAL: &str = "🐟 漏网之鱼";

/// Health-check endpoint shared by all probing groups
pub const PROBE_URL: &str = "http://www.gstatic.com/generate_204";

/// Health-check interval in seconds
pub const PROBE_INTERVAL: u32 = 300;

/// Builder for the routing-configuration document
#[derive(Default)]
pub struct ConfigBuilder;

impl ConfigBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Assemble the document. `failures` is only consulted when the proxy
    /// list is empty, to give the fatal error its diagnostic payload.
    pub fn build(
        &self,
        proxies: Vec<Proxy>,
        failures: &[LineFailure],
    ) -> Result<ClashConfig, ConvertError> {
        if proxies.is_empty() {
            return Err(ConvertError::EmptyBatch {
                failures: failures.to_vec(),
            });
        }

        let names: Vec<String> = proxies.iter().map(|p| p.name().to_string()).collect();
        debug!("Building document for {} prox(ies)", names.len());

        Ok(ClashConfig {
            port: 7890,
            socks_port: 7891,
            allow_lan: false,
            mode: "rule".to_string(),
            log_level: "info".to_string(),
            external_controller: "127.0.0.1:9090".to_string(),
            dns: Dns::default(),
            proxies,
            proxy_groups: build_groups(&names),
            rules: build_rules(),
        })
    }
}

/// The fixed six-group topology over the proxy name list
fn build_groups(names: &[String]) -> Vec<ProxyGroup> {
    let mut select_members = vec![
        GROUP_AUTO.to_string(),
        GROUP_FALLBACK.to_string(),
        GROUP_LOAD_BALANCE.to_string(),
        GROUP_DIRECT.to_string(),
    ];
    select_members.extend(names.iter().cloned());

    vec![
        ProxyGroup::select(GROUP_SELECT, select_members),
        ProxyGroup::probing(
            GROUP_AUTO,
            GroupKind::UrlTest,
            names.to_vec(),
            PROBE_URL,
            PROBE_INTERVAL,
        ),
        ProxyGroup::probing(
            GROUP_FALLBACK,
            GroupKind::Fallback,
            names.to_vec(),
            PROBE_URL,
            PROBE_INTERVAL,
        ),
        ProxyGroup::probing(
            GROUP_LOAD_BALANCE,
            GroupKind::LoadBalance,
            names.to_vec(),
            PROBE_URL,
            PROBE_INTERVAL,
        ),
        ProxyGroup::select(GROUP_DIRECT, vec!["DIRECT".to_string()]),
        ProxyGroup::select(
            GROUP_FINAL,
            vec![
                GROUP_SELECT.to_string(),
                GROUP_DIRECT.to_string(),
                GROUP_AUTO.to_string(),
            ],
        ),
    ]
}

/// Fixed rule list: loopback and private ranges plus the cn zone go DIRECT,
/// everything else falls through to the catch-all group.
fn build_rules() -> Vec<String> {
    vec![
        "DOMAIN-SUFFIX,local,DIRECT".to_string(),
        "IP-CIDR,127.0.0.0/8,DIRECT".to_string(),
        "IP-CIDR,172.16.0.0/12,DIRECT".to_string(),
        "IP-CIDR,192.168.0.0/16,DIRECT".to_string(),
        "IP-CIDR,10.0.0.0/8,DIRECT".to_string(),
        "IP-CIDR,17.0.0.0/8,DIRECT".to_string(),
        "IP-CIDR,100.64.0.0/10,DIRECT".to_string(),
        "DOMAIN-SUFFIX,cn,DIRECT".to_string(),
        "GEOIP,CN,DIRECT".to_string(),
        format!("MATCH,{GROUP_FINAL}"),
    ]
}
