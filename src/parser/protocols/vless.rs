//! VLESS share-link decoder.
//!
//! Standard URI form: `vless://uuid@host:port?params#tag`. Query parameters
//! select flow control, network type and the TLS flavor; `security=reality`
//! implies TLS and brings the `pbk`/`sid` key material with it.

use crate::config::proxy::{Proxy, VLessProxy};
use crate::config::shared::{RealityOpts, Security, Transport};
use crate::error::DecodeError;

use super::{ProtocolParser, check_port, node_name, query_map};

use std::collections::HashMap;

use url::Url;

const SCHEME: &str = "vless";

/// Fallback port when the link carries none
const DEFAULT_PORT: u16 = 443;

/// Decoder for `vless://` links
pub struct VLessParser;

impl ProtocolParser for VLessParser {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn parse(&self, uri: &str) -> Result<Proxy, DecodeError> {
        let url = Url::parse(uri.trim())
            .map_err(|e| DecodeError::new(SCHEME, format!("invalid URI: {e}")))?;

        let uuid = url.username().to_string();
        if uuid.is_empty() {
            return Err(DecodeError::new(SCHEME, "missing uuid"));
        }

        let server = url
            .host_str()
            .ok_or_else(|| DecodeError::new(SCHEME, "missing host"))?
            .to_string();

        let port = check_port(url.port().unwrap_or(DEFAULT_PORT), SCHEME)?;

        let params = query_map(&url);
        let name = node_name(url.fragment(), SCHEME, &server);

        Ok(Proxy::VLess(VLessProxy {
            name,
            server,
            port,
            uuid,
            flow: params.get("flow").filter(|f| !f.is_empty()).cloned(),
            transport: build_transport(&params),
            security: build_security(&params),
        }))
    }
}

fn build_security(params: &HashMap<String, String>) -> Security {
    match params.get("security").map(String::as_str) {
        Some("reality") => Security::reality(
            params.get("sni").cloned(),
            RealityOpts {
                public_key: params.get("pbk").cloned().unwrap_or_default(),
                short_id: params.get("sid").cloned().unwrap_or_default(),
            },
            params.get("fp").cloned(),
        ),
        Some("tls") => Security::tls(params.get("sni").cloned(), true),
        _ => Security::none(),
    }
}

fn build_transport(params: &HashMap<String, String>) -> Transport {
    match params.get("type").map(String::as_str) {
        Some("ws") | Some("websocket") => Transport::websocket(
            params.get("path").cloned().unwrap_or_else(|| "/".to_string()),
            params.get("host").cloned(),
        ),
        Some("grpc") => Transport::grpc(params.get("serviceName").cloned().unwrap_or_default()),
        _ => Transport::Tcp,
    }
}
