//! Per-protocol share-link decoders.
//!
//! Each decoder implements [`ProtocolParser`], turning one URI string into a
//! normalized [`Proxy`] entry or a [`DecodeError`]. Decoders are pure: no
//! I/O, no shared state, same input gives the same output.

mod hysteria2;
mod shadowsocks;
mod trojan;
mod tuic;
mod vless;
mod vmess;

pub use hysteria2::Hysteria2Parser;
pub use shadowsocks::ShadowsocksParser;
pub use trojan::TrojanParser;
pub use tuic::TuicParser;
pub use vless::VLessParser;
pub use vmess::VMessParser;

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::config::proxy::Proxy;
use crate::error::DecodeError;

// ============================================================================
// Protocol Parser Trait
// ============================================================================

/// Trait for decoding a single protocol's URI format
pub trait ProtocolParser: Send + Sync {
    /// Scheme this decoder is registered under (e.g. "ss", "vmess")
    fn scheme(&self) -> &'static str;

    /// Decode a URI string into a proxy entry
    fn parse(&self, uri: &str) -> Result<Proxy, DecodeError>;
}

// ============================================================================
// Protocol Registry
// ============================================================================

/// Registry of protocol decoders, keyed by exact scheme.
///
/// Lookups are case-sensitive: `VMESS://` is an unrecognized scheme, not a
/// sloppy VMess link.
#[derive(Default)]
pub struct ProtocolRegistry {
    parsers: HashMap<&'static str, Arc<dyn ProtocolParser>>,
}

impl ProtocolRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            parsers: HashMap::new(),
        }
    }

    /// Registry with all built-in decoders. `hysteria2://` and `hy2://` are
    /// two spellings of the same decoder.
    pub fn with_builtin_parsers() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VMessParser));
        registry.register(Arc::new(VLessParser));
        registry.register(Arc::new(TrojanParser));
        registry.register(Arc::new(Hysteria2Parser::new("hysteria2")));
        registry.register(Arc::new(Hysteria2Parser::new("hy2")));
        registry.register(Arc::new(TuicParser));
        registry.register(Arc::new(ShadowsocksParser));
        registry
    }

    /// Register a decoder under its scheme
    pub fn register(&mut self, parser: Arc<dyn ProtocolParser>) {
        self.parsers.insert(parser.scheme(), parser);
    }

    /// Decoder for the given scheme, if any
    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn ProtocolParser>> {
        self.parsers.get(scheme)
    }
}

// ============================================================================
// Shared decoding helpers
// ============================================================================

/// Extract the scheme of a URI, without lowering its case
pub fn extract_scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once("://")?;
    if scheme.is_empty() { None } else { Some(scheme) }
}

/// Percent-decode, falling back to the raw input when the encoding is broken
pub fn percent_decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Display name for a node: the percent-decoded URI fragment when present
/// and non-empty, otherwise the deterministic `<protocol>-<server>` form.
pub fn node_name(fragment: Option<&str>, protocol: &str, server: &str) -> String {
    match fragment {
        Some(fragment) if !fragment.is_empty() => percent_decode(fragment),
        _ => format!("{protocol}-{server}"),
    }
}

/// Reject the one port value u16 can hold but no server can listen on
pub fn check_port(port: u16, protocol: &'static str) -> Result<u16, DecodeError> {
    if port == 0 {
        return Err(DecodeError::new(protocol, "port out of range: 0"));
    }
    Ok(port)
}

/// Collect query parameters into a map; later duplicates win
pub fn query_map(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

/// Split an `alpn` query value into its comma-separated entries
pub fn split_alpn(value: Option<&String>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Parse `host:port`, accepting bracketed IPv6 literals
pub fn parse_host_port(hostport: &str) -> Result<(String, u16), String> {
    if let Some(rest) = hostport.strip_prefix('[') {
        let (host, after) = rest
            .split_once(']')
            .ok_or_else(|| "unclosed IPv6 bracket".to_string())?;
        let port_str = after
            .strip_prefix(':')
            .ok_or_else(|| "missing port after IPv6 address".to_string())?;
        let port: u16 = port_str
            .parse()
            .map_err(|_| format!("invalid port: {port_str}"))?;
        return Ok((host.to_string(), port));
    }

    let (host, port_str) = hostport
        .rsplit_once(':')
        .ok_or_else(|| "missing port".to_string())?;
    if host.is_empty() {
        return Err("missing host".to_string());
    }
    let port: u16 = port_str
        .parse()
        .map_err(|_| format!("invalid port: {port_str}"))?;
    Ok((host.to_string(), port))
}
