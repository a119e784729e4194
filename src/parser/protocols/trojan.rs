//! Trojan share-link decoder.
//!
//! Form: `trojan://password@host:port?params#tag`. Trojan is TLS-native; the
//! `sni` parameter falls back to the hostname, and `allowInsecure=1` turns
//! certificate verification off.

use crate::config::proxy::{Proxy, TrojanProxy};
use crate::config::shared::Transport;
use crate::error::DecodeError;

use super::{ProtocolParser, check_port, node_name, percent_decode, query_map};

use std::collections::HashMap;

use url::Url;

const SCHEME: &str = "trojan";

const DEFAULT_PORT: u16 = 443;

/// Decoder for `trojan://` links
pub struct TrojanParser;

impl ProtocolParser for TrojanParser {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn parse(&self, uri: &str) -> Result<Proxy, DecodeError> {
        let url = Url::parse(uri.trim())
            .map_err(|e| DecodeError::new(SCHEME, format!("invalid URI: {e}")))?;

        let password = percent_decode(url.username());
        if password.is_empty() {
            return Err(DecodeError::new(SCHEME, "missing password"));
        }

        let server = url
            .host_str()
            .ok_or_else(|| DecodeError::new(SCHEME, "missing host"))?
            .to_string();

        let port = check_port(url.port().unwrap_or(DEFAULT_PORT), SCHEME)?;

        let params = query_map(&url);
        let name = node_name(url.fragment(), SCHEME, &server);

        let sni = params
            .get("sni")
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| server.clone());

        let skip_cert_verify = params
            .get("allowInsecure")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        Ok(Proxy::Trojan(TrojanProxy {
            name,
            server,
            port,
            password,
            sni: Some(sni),
            skip_cert_verify,
            transport: build_transport(&params),
        }))
    }
}

fn build_transport(params: &HashMap<String, String>) -> Option<Transport> {
    match params.get("type").map(String::as_str) {
        Some("ws") | Some("websocket") => Some(Transport::websocket(
            params.get("path").cloned().unwrap_or_else(|| "/".to_string()),
            params.get("host").cloned(),
        )),
        Some("grpc") => Some(Transport::grpc(
            params.get("serviceName").cloned().unwrap_or_default(),
        )),
        _ => None,
    }
}
