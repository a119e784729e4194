//! Hysteria2 share-link decoder.
//!
//! Two spellings of the scheme exist in the wild (`hysteria2://`, `hy2://`)
//! and both mean the same thing; one decoder instance is registered under
//! each. Form: `hysteria2://password@host:port?params#tag`.

use crate::config::proxy::{Hysteria2Proxy, Obfuscation, Proxy};
use crate::error::DecodeError;

use super::{ProtocolParser, check_port, node_name, percent_decode, query_map, split_alpn};

use url::Url;

/// Canonical label used for error records and synthesized names, whichever
/// scheme spelling the link used
const LABEL: &str = "hysteria2";

const DEFAULT_PORT: u16 = 443;

/// Decoder for `hysteria2://` and `hy2://` links
pub struct Hysteria2Parser {
    scheme: &'static str,
}

impl Hysteria2Parser {
    pub fn new(scheme: &'static str) -> Self {
        Self { scheme }
    }
}

impl ProtocolParser for Hysteria2Parser {
    fn scheme(&self) -> &'static str {
        self.scheme
    }

    fn parse(&self, uri: &str) -> Result<Proxy, DecodeError> {
        let url = Url::parse(uri.trim())
            .map_err(|e| DecodeError::new(LABEL, format!("invalid URI: {e}")))?;

        let password = percent_decode(url.username());
        if password.is_empty() {
            return Err(DecodeError::new(LABEL, "missing password"));
        }

        let server = url
            .host_str()
            .ok_or_else(|| DecodeError::new(LABEL, "missing host"))?
            .to_string();

        let port = check_port(url.port().unwrap_or(DEFAULT_PORT), LABEL)?;

        let params = query_map(&url);
        let name = node_name(url.fragment(), LABEL, &server);

        let sni = params
            .get("sni")
            .filter(|s| !s.is_empty())
            .cloned()
            .unwrap_or_else(|| server.clone());

        let skip_cert_verify = params
            .get("insecure")
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        let obfs = params
            .get("obfs")
            .filter(|o| !o.is_empty() && o.as_str() != "none")
            .map(|o| Obfuscation {
                obfs: o.clone(),
                obfs_password: params.get("obfs-password").cloned(),
            });

        Ok(Proxy::Hysteria2(Hysteria2Proxy {
            name,
            server,
            port,
            password,
            sni: Some(sni),
            skip_cert_verify,
            obfs,
            alpn: split_alpn(params.get("alpn")),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hysteria2_basic() {
        let uri = "hysteria2://password@host.example:443?sni=sni.example#Hy2%20Node";
        let proxy = Hysteria2Parser::new("hysteria2").parse(uri).unwrap();

        if let Proxy::Hysteria2(hy2) = proxy {
            assert_eq!(hy2.name, "Hy2 Node");
            assert_eq!(hy2.server, "host.example");
            assert_eq!(hy2.port, 443);
            assert_eq!(hy2.password, "password");
            assert_eq!(hy2.sni, Some("sni.example".to_string()));
            assert!(!hy2.skip_cert_verify);
            assert!(hy2.obfs.is_none());
            assert!(hy2.alpn.is_empty());
        } else {
            panic!("Expected Hysteria2 proxy");
        }
    }

    #[test]
    fn test_hy2_alias_decodes_identically() {
        let long = Hysteria2Parser::new("hysteria2")
            .parse("hysteria2://pw@host.example:443#N")
            .unwrap();
        let short = Hysteria2Parser::new("hy2")
            .parse("hy2://pw@host.example:443#N")
            .unwrap();
        assert_eq!(long, short);
    }

    #[test]
    fn test_hysteria2_insecure_maps_to_skip_verify() {
        let uri = "hysteria2://pw@host.example:443?insecure=1#N";
        let proxy = Hysteria2Parser::new("hysteria2").parse(uri).unwrap();

        if let Proxy::Hysteria2(hy2) = proxy {
            assert!(hy2.skip_cert_verify);
        } else {
            panic!("Expected Hysteria2 proxy");
        }
    }

    #[test]
    fn test_hysteria2_obfuscation() {
        let uri = "hysteria2://pw@host.example:443?obfs=salamander&obfs-password=opw#N";
        let proxy = Hysteria2Parser::new("hysteria2").parse(uri).unwrap();

        if let Proxy::Hysteria2(hy2) = proxy {
            let obfs = hy2.obfs.expect("obfuscation expected");
            assert_eq!(obfs.obfs, "salamander");
            assert_eq!(obfs.obfs_password, Some("opw".to_string()));
        } else {
            panic!("Expected Hysteria2 proxy");
        }
    }

    #[test]
    fn test_hysteria2_obfs_none_is_dropped() {
        let uri = "hysteria2://pw@host.example:443?obfs=none#N";
        let proxy = Hysteria2Parser::new("hysteria2").parse(uri).unwrap();

        if let Proxy::Hysteria2(hy2) = proxy {
            assert!(hy2.obfs.is_none());
        } else {
            panic!("Expected Hysteria2 proxy");
        }
    }

    #[test]
    fn test_hysteria2_alpn_list() {
        let uri = "hysteria2://pw@host.example:443?alpn=h3,h2#N";
        let proxy = Hysteria2Parser::new("hysteria2").parse(uri).unwrap();

        if let Proxy::Hysteria2(hy2) = proxy {
            assert_eq!(hy2.alpn, vec!["h3", "h2"]);
        } else {
            panic!("Expected Hysteria2 proxy");
        }
    }

    #[test]
    fn test_hysteria2_name_uses_canonical_label() {
        // Name synthesis uses "hysteria2" even for the short scheme
        let proxy = Hysteria2Parser::new("hy2")
            .parse("hy2://pw@host.example:443")
            .unwrap();
        assert_eq!(proxy.name(), "hysteria2-host.example");
    }

    #[test]
    fn test_hysteria2_sni_defaults_to_host() {
        let proxy = Hysteria2Parser::new("hysteria2")
            .parse("hysteria2://pw@host.example:8443#N")
            .unwrap();

        if let Proxy::Hysteria2(hy2) = proxy {
            assert_eq!(hy2.sni, Some("host.example".to_string()));
        } else {
            panic!("Expected Hysteria2 proxy");
        }
    }

    #[test]
    fn test_hysteria2_missing_password_rejected() {
        assert!(
            Hysteria2Parser::new("hysteria2")
                .parse("hysteria2://@host.example:443#N")
                .is_err()
        );
    }

    #[test]
    fn test_hysteria2_invalid_port_rejected() {
        assert!(
            Hysteria2Parser::new("hysteria2")
                .parse("hysteria2://pw@host.example:0#N")
                .is_err()
        );
    }
}
