//! Shadowsocks share-link decoder.
//!
//! Three forms circulate:
//! - SIP002 with plain userinfo: `ss://cipher:password@host:port#tag`
//! - SIP002 with Base64 userinfo: `ss://BASE64(cipher:password)@host:port#tag`
//! - legacy, everything encoded: `ss://BASE64(cipher:password@host:port)#tag`
//!
//! The URL machinery mangles raw Base64 userinfo, so this decoder works on
//! the string directly instead of going through [`url::Url`].

use crate::config::proxy::{Proxy, ShadowsocksProxy};
use crate::error::DecodeError;
use crate::parser::base64::decode_base64_text;

use super::{ProtocolParser, check_port, node_name, parse_host_port, percent_decode};

const SCHEME: &str = "ss";

/// Decoder for `ss://` links
pub struct ShadowsocksParser;

impl ProtocolParser for ShadowsocksParser {
    fn scheme(&self) -> &'static str {
        SCHEME
    }

    fn parse(&self, uri: &str) -> Result<Proxy, DecodeError> {
        let rest = uri
            .trim()
            .strip_prefix("ss://")
            .ok_or_else(|| DecodeError::new(SCHEME, "missing ss:// prefix"))?;

        let (main, fragment) = match rest.rfind('#') {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };

        if let Some(at_pos) = main.rfind('@') {
            Self::parse_sip002(&main[..at_pos], &main[at_pos + 1..], fragment)
        } else {
            Self::parse_legacy(main, fragment)
        }
    }
}

impl ShadowsocksParser {
    /// SIP002: userinfo is `cipher:password` or Base64 of it
    fn parse_sip002(
        userinfo: &str,
        hostport: &str,
        fragment: Option<&str>,
    ) -> Result<Proxy, DecodeError> {
        let (server, port) =
            parse_host_port(hostport).map_err(|reason| DecodeError::new(SCHEME, reason))?;
        let port = check_port(port, SCHEME)?;

        let (cipher, password) = Self::split_userinfo(userinfo)?;

        Ok(Proxy::Shadowsocks(ShadowsocksProxy {
            name: node_name(fragment, SCHEME, &server),
            server,
            port,
            cipher,
            password,
        }))
    }

    /// Legacy: the whole `cipher:password@host:port` is one Base64 token
    fn parse_legacy(main: &str, fragment: Option<&str>) -> Result<Proxy, DecodeError> {
        let decoded = decode_base64_text(main)
            .map_err(|e| DecodeError::new(SCHEME, format!("bad legacy payload: {e}")))?;

        let at_pos = decoded
            .rfind('@')
            .ok_or_else(|| DecodeError::new(SCHEME, "legacy payload missing '@'"))?;

        Self::parse_sip002(&decoded[..at_pos], &decoded[at_pos + 1..], fragment)
    }

    /// Split userinfo into cipher and password. A literal colon means the
    /// plain form; otherwise the userinfo must be a Base64 token for
    /// `cipher:password`.
    fn split_userinfo(userinfo: &str) -> Result<(String, String), DecodeError> {
        let plain = if userinfo.contains(':') {
            percent_decode(userinfo)
        } else {
            decode_base64_text(userinfo)
                .map_err(|e| DecodeError::new(SCHEME, format!("bad userinfo: {e}")))?
        };

        let (cipher, password) = plain
            .split_once(':')
            .ok_or_else(|| DecodeError::new(SCHEME, "userinfo missing cipher:password"))?;

        Ok((cipher.to_string(), password.to_string()))
    }
}
