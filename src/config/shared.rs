//! Pieces shared by several proxy kinds: stream transport and TLS settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// Transport
// ============================================================================

/// Stream transport carried by a proxy entry.
///
/// Exactly one variant is active per entry. The `network` tag and the
/// variant's own options key are emitted side by side in the flattened
/// entry, which is the Clash wire shape (`network: ws` next to
/// `ws-opts: {...}`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "network")]
pub enum Transport {
    /// Plain TCP, no extra framing
    #[serde(rename = "tcp")]
    Tcp,

    /// WebSocket framing
    #[serde(rename = "ws")]
    WebSocket {
        #[serde(rename = "ws-opts")]
        opts: WsOpts,
    },

    /// HTTP/2 framing
    #[serde(rename = "h2")]
    Http2 {
        #[serde(rename = "h2-opts")]
        opts: H2Opts,
    },

    /// gRPC framing
    #[serde(rename = "grpc")]
    Grpc {
        #[serde(rename = "grpc-opts")]
        opts: GrpcOpts,
    },
}

impl Transport {
    /// WebSocket transport; a non-empty host becomes the Host header
    pub fn websocket(path: impl Into<String>, host: Option<String>) -> Self {
        let mut headers = HashMap::new();
        if let Some(host) = host
            && !host.is_empty()
        {
            headers.insert("Host".to_string(), host);
        }
        Self::WebSocket {
            opts: WsOpts {
                path: path.into(),
                headers,
            },
        }
    }

    /// HTTP/2 transport
    pub fn http2(host: Vec<String>, path: impl Into<String>) -> Self {
        Self::Http2 {
            opts: H2Opts {
                host,
                path: path.into(),
            },
        }
    }

    /// gRPC transport
    pub fn grpc(service_name: impl Into<String>) -> Self {
        Self::Grpc {
            opts: GrpcOpts {
                service_name: service_name.into(),
            },
        }
    }
}

/// WebSocket transport options
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WsOpts {
    pub path: String,

    /// Extra request headers; only ever holds a single Host entry
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

/// HTTP/2 transport options
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct H2Opts {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub host: Vec<String>,

    pub path: String,
}

/// gRPC transport options
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct GrpcOpts {
    #[serde(rename = "grpc-service-name")]
    pub service_name: String,
}

// ============================================================================
// Security
// ============================================================================

/// TLS layer of a VMess/VLESS entry.
///
/// Variants are mutually exclusive: `None` emits no TLS keys at all, `Tls`
/// emits the conventional trio, and `Reality` extends it with the key
/// material REALITY camouflage needs. Untagged deserialization tries
/// variants in order, so `Reality` (the one with an extra required key)
/// must stay first and `None` last.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Security {
    /// REALITY camouflage; implies TLS
    Reality {
        tls: bool,

        #[serde(rename = "skip-cert-verify")]
        skip_cert_verify: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        servername: Option<String>,

        #[serde(rename = "reality-opts")]
        opts: RealityOpts,

        #[serde(rename = "client-fingerprint")]
        client_fingerprint: String,
    },

    /// Conventional TLS
    Tls {
        tls: bool,

        #[serde(rename = "skip-cert-verify")]
        skip_cert_verify: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        servername: Option<String>,
    },

    /// Plaintext
    None {},
}

/// Fingerprint mimicked when no `fp` parameter is given
const DEFAULT_CLIENT_FINGERPRINT: &str = "chrome";

impl Security {
    pub fn none() -> Self {
        Self::None {}
    }

    pub fn tls(servername: Option<String>, skip_cert_verify: bool) -> Self {
        Self::Tls {
            tls: true,
            skip_cert_verify,
            servername,
        }
    }

    pub fn reality(
        servername: Option<String>,
        opts: RealityOpts,
        client_fingerprint: Option<String>,
    ) -> Self {
        Self::Reality {
            tls: true,
            skip_cert_verify: true,
            servername,
            opts,
            client_fingerprint: client_fingerprint
                .unwrap_or_else(|| DEFAULT_CLIENT_FINGERPRINT.to_string()),
        }
    }

    pub fn is_tls(&self) -> bool {
        !matches!(self, Self::None {})
    }
}

/// REALITY key material
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RealityOpts {
    #[serde(rename = "public-key")]
    pub public_key: String,

    #[serde(rename = "short-id")]
    pub short_id: String,
}
