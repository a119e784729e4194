//! VMess share-link decoder.
//!
//! The entire payload after the scheme is Base64-encoded JSON:
//! `vmess://BASE64({"v":"2","ps":"name","add":"host","port":443,"id":...})`
//! Numeric fields routinely arrive as strings, so port and alterId accept
//! both forms.

use serde::Deserialize;

use crate::config::proxy::{Proxy, VMessProxy};
use crate::config::shared::{Security, Transport};
use crate::error::DecodeError;
use crate::parser::base64::decode_base64_text;

use super::{ProtocolParser, check_port, node_name};

const SCHEME: &str = "vmess";

/// Decoder for `vmess://` links
pub struct VMessParser;

/// Wire shape of the Base64 JSON payload
#[derive(Deserialize, Debug)]
struct VMessPayload {
    /// Remark / display name
    #[serde(default)]
    ps: String,

    /// Server address
    add: String,

    #[serde(deserialize_with = "deserialize_port")]
    port: u16,

    /// User UUID
    id: String,

    #[serde(default, deserialize_with = "deserialize_option_u32")]
    aid: Option<u32>,

    /// Encryption method
    #[serde(default)]
    scy: Option<String>,

    /// Network type: tcp, ws, h2, grpc
    #[serde(default)]
    net: Option<String>,

    /// "tls" when TLS is on
    #[serde(default)]
    tls: Option<String>,

    #[serde(default)]
    sni: Option<String>,

    /// WebSocket/h2 host
    #[serde(default)]
    host: Option<String>,

    /// WebSocket/h2 path; doubles as the gRPC service name
    #[serde(default)]
    path: Option<String>,
}

impl ProtocolParser for VMessParser {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn parse(&self, uri: &str) -> Result<Proxy, DecodeError> {
        let encoded = uri
            .trim()
            .strip_prefix("vmess://")
            .ok_or_else(|| DecodeError::new(SCHEME, "missing vmess:// prefix"))?;

        let decoded = decode_base64_text(encoded)
            .map_err(|e| DecodeError::new(SCHEME, format!("payload is not Base64 JSON: {e}")))?;

        let payload: VMessPayload = serde_json::from_str(&decoded)
            .map_err(|e| DecodeError::new(SCHEME, format!("bad JSON payload: {e}")))?;

        let port = check_port(payload.port, SCHEME)?;

        let name = if payload.ps.is_empty() {
            node_name(None, SCHEME, &payload.add)
        } else {
            payload.ps.clone()
        };

        let security = if payload.tls.as_deref() == Some("tls") {
            Security::tls(payload.sni.clone(), true)
        } else {
            Security::none()
        };

        Ok(Proxy::VMess(VMessProxy {
            name,
            server: payload.add.clone(),
            port,
            uuid: payload.id.clone(),
            alter_id: payload.aid.unwrap_or(0),
            cipher: payload.scy.clone().unwrap_or_else(|| "auto".to_string()),
            transport: build_transport(&payload),
            security,
        }))
    }
}

fn build_transport(payload: &VMessPayload) -> Transport {
    match payload.net.as_deref() {
        Some("ws") | Some("websocket") => Transport::websocket(
            payload.path.clone().unwrap_or_else(|| "/".to_string()),
            payload.host.clone(),
        ),
        Some("h2") => Transport::http2(
            payload
                .host
                .clone()
                .filter(|h| !h.is_empty())
                .map(|h| vec![h])
                .unwrap_or_default(),
            payload.path.clone().unwrap_or_else(|| "/".to_string()),
        ),
        Some("grpc") => Transport::grpc(payload.path.clone().unwrap_or_default()),
        _ => Transport::Tcp,
    }
}

/// Port may be a JSON number or a numeric string
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u16),
        String(String),
    }

    match PortValue::deserialize(deserializer)? {
        PortValue::Number(n) => Ok(n),
        PortValue::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

/// alterId may be a JSON number, a numeric string, or absent
fn deserialize_option_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum U32Value {
        Number(u32),
        String(String),
    }

    match Option::<U32Value>::deserialize(deserializer)? {
        Some(U32Value::Number(n)) => Ok(Some(n)),
        Some(U32Value::String(s)) if s.is_empty() => Ok(None),
        Some(U32Value::String(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
