//! Normalized proxy entries.
//!
//! One entry per successfully decoded share-link. The enum tag is the Clash
//! `type` field; each variant struct mirrors that proxy type's wire schema,
//! with transport and TLS settings expressed through the tagged variants in
//! [`crate::config::shared`] so that, say, "VMess over gRPC" and "VMess over
//! WebSocket" cannot coexist in one entry.

use serde::{Deserialize, Serialize};

use crate::config::shared::{Security, Transport};

// ============================================================================
// Proxy Enum
// ============================================================================

/// One decoded proxy node
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum Proxy {
    #[serde(rename = "vmess")]
    VMess(VMessProxy),
    #[serde(rename = "vless")]
    VLess(VLessProxy),
    #[serde(rename = "trojan")]
    Trojan(TrojanProxy),
    #[serde(rename = "hysteria2")]
    Hysteria2(Hysteria2Proxy),
    #[serde(rename = "tuic")]
    Tuic(TuicProxy),
    #[serde(rename = "ss")]
    Shadowsocks(ShadowsocksProxy),
}

impl Proxy {
    /// Display name of the node
    pub fn name(&self) -> &str {
        match self {
            Self::VMess(p) => &p.name,
            Self::VLess(p) => &p.name,
            Self::Trojan(p) => &p.name,
            Self::Hysteria2(p) => &p.name,
            Self::Tuic(p) => &p.name,
            Self::Shadowsocks(p) => &p.name,
        }
    }

    /// Server hostname or IP literal
    pub fn server(&self) -> &str {
        match self {
            Self::VMess(p) => &p.server,
            Self::VLess(p) => &p.server,
            Self::Trojan(p) => &p.server,
            Self::Hysteria2(p) => &p.server,
            Self::Tuic(p) => &p.server,
            Self::Shadowsocks(p) => &p.server,
        }
    }

    /// Server port
    pub fn port(&self) -> u16 {
        match self {
            Self::VMess(p) => p.port,
            Self::VLess(p) => p.port,
            Self::Trojan(p) => p.port,
            Self::Hysteria2(p) => p.port,
            Self::Tuic(p) => p.port,
            Self::Shadowsocks(p) => p.port,
        }
    }

    /// Scheme label, matching the serialized `type` tag
    pub fn protocol(&self) -> &'static str {
        match self {
            Self::VMess(_) => "vmess",
            Self::VLess(_) => "vless",
            Self::Trojan(_) => "trojan",
            Self::Hysteria2(_) => "hysteria2",
            Self::Tuic(_) => "tuic",
            Self::Shadowsocks(_) => "ss",
        }
    }
}

// ============================================================================
// Per-protocol entries
// ============================================================================

/// VMess entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VMessProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub uuid: String,

    #[serde(rename = "alterId")]
    pub alter_id: u32,

    /// Encryption method, "auto" when the link does not say
    pub cipher: String,

    #[serde(flatten)]
    pub transport: Transport,

    #[serde(flatten)]
    pub security: Security,
}

/// VLESS entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct VLessProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub uuid: String,

    /// Flow control (e.g. xtls-rprx-vision)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,

    #[serde(flatten)]
    pub transport: Transport,

    #[serde(flatten)]
    pub security: Security,
}

/// Trojan entry. Trojan is TLS-native, so the TLS keys sit directly on the
/// entry; transport is only emitted for ws/grpc variants.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TrojanProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,

    #[serde(rename = "skip-cert-verify")]
    pub skip_cert_verify: bool,

    #[serde(flatten)]
    pub transport: Option<Transport>,
}

/// Hysteria2 entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Hysteria2Proxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,

    #[serde(rename = "skip-cert-verify")]
    pub skip_cert_verify: bool,

    #[serde(flatten)]
    pub obfs: Option<Obfuscation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
}

/// Salamander-style obfuscation for Hysteria2
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Obfuscation {
    pub obfs: String,

    #[serde(rename = "obfs-password", default, skip_serializing_if = "Option::is_none")]
    pub obfs_password: Option<String>,
}

/// TUIC entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TuicProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub uuid: String,
    pub password: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sni: Option<String>,

    #[serde(rename = "skip-cert-verify")]
    pub skip_cert_verify: bool,

    #[serde(rename = "congestion-controller")]
    pub congestion_controller: String,

    #[serde(rename = "udp-relay-mode")]
    pub udp_relay_mode: String,

    #[serde(rename = "reduce-rtt")]
    pub reduce_rtt: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alpn: Vec<String>,
}

/// Shadowsocks entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ShadowsocksProxy {
    pub name: String,
    pub server: String,
    pub port: u16,
    pub cipher: String,
    pub password: String,
}
