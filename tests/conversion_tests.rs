//! End-to-end tests for the share-link → document pipeline.

use std::collections::HashSet;

use subforge::builder::{ConfigBuilder, GROUP_FINAL, PROBE_INTERVAL, PROBE_URL};
use subforge::config::ClashConfig;
use subforge::config::group::GroupKind;
use subforge::config::proxy::Proxy;
use subforge::config::shared::{Security, Transport};
use subforge::convert::Converter;
use subforge::error::ConvertError;
use subforge::parser::LinkParser;
use subforge::validate::Validator;

const SS_A: &str = "ss://YWVzLTEyOC1nY206cGFzc3dvcmQ@host-a.example:8388#Node%20A";
const TROJAN_B: &str = "trojan://secret@host-b.example:443?sni=sni-b.example#Node%20B";
const VLESS_C: &str = "vless://11111111-1111-1111-1111-111111111111@host-c.example:443?type=ws&path=%2Fp&host=cdn.example&security=tls#Node%20C";
const HY2_D: &str = "hysteria2://pw@host-d.example:443?obfs=salamander&obfs-password=opw#Node%20D";
const TUIC_E: &str = "tuic://22222222-2222-2222-2222-222222222222:tp@host-e.example:443?congestion_control=bbr&reduce_rtt=1#Node%20E";

fn vmess_link(name: &str, host: &str) -> String {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    let json = format!(
        r#"{{"v":"2","ps":"{name}","add":"{host}","port":443,"id":"33333333-3333-3333-3333-333333333333","aid":0,"net":"ws","tls":"tls","path":"/ws","host":"cdn.example"}}"#
    );
    format!("vmess://{}", STANDARD.encode(json))
}

fn all_protocol_batch() -> String {
    format!(
        "{SS_A}\n{TROJAN_B}\n{VLESS_C}\n{HY2_D}\n{TUIC_E}\n{}\n",
        vmess_link("Node F", "host-f.example")
    )
}

#[test]
fn all_six_protocols_decode_with_literal_fields() {
    let batch = LinkParser::new().parse_batch(&all_protocol_batch());
    assert!(batch.failures.is_empty(), "failures: {:?}", batch.failures);
    assert_eq!(batch.proxies.len(), 6);

    // Spot-check each protocol against the literal link values
    match &batch.proxies[0] {
        Proxy::Shadowsocks(ss) => {
            assert_eq!(ss.name, "Node A");
            assert_eq!(ss.server, "host-a.example");
            assert_eq!(ss.port, 8388);
            assert_eq!(ss.cipher, "aes-128-gcm");
            assert_eq!(ss.password, "password");
        }
        other => panic!("expected ss first, got {other:?}"),
    }

    match &batch.proxies[2] {
        Proxy::VLess(vless) => {
            assert_eq!(vless.server, "host-c.example");
            assert_eq!(vless.port, 443);
            assert_eq!(vless.uuid, "11111111-1111-1111-1111-111111111111");
            assert_eq!(
                vless.transport,
                Transport::websocket("/p", Some("cdn.example".to_string()))
            );
            assert!(vless.security.is_tls());
            assert_eq!(vless.name, "Node C");
        }
        other => panic!("expected vless third, got {other:?}"),
    }

    match &batch.proxies[4] {
        Proxy::Tuic(tuic) => {
            assert_eq!(tuic.uuid, "22222222-2222-2222-2222-222222222222");
            assert_eq!(tuic.password, "tp");
            assert_eq!(tuic.congestion_controller, "bbr");
            assert_eq!(tuic.udp_relay_mode, "native");
            assert!(tuic.reduce_rtt);
        }
        other => panic!("expected tuic fifth, got {other:?}"),
    }
}

#[test]
fn batch_of_ten_with_three_bad_ports_yields_seven_and_three() {
    let mut lines: Vec<String> = vec![
        SS_A.to_string(),
        TROJAN_B.to_string(),
        VLESS_C.to_string(),
        HY2_D.to_string(),
        TUIC_E.to_string(),
        vmess_link("Node F", "host-f.example"),
        "trojan://pw@host-g.example:8443#Node%20G".to_string(),
    ];
    lines.push("trojan://pw@bad-a.example:0#Bad%20A".to_string());
    lines.push("ss://YWVzLTEyOC1nY206cGFzc3dvcmQ@bad-b.example:70000#Bad%20B".to_string());
    lines.push("vless://u@bad-c.example:port#Bad%20C".to_string());

    let batch = LinkParser::new().parse_batch(&lines.join("\n"));

    assert_eq!(batch.proxies.len(), 7);
    assert_eq!(batch.failures.len(), 3);

    // Successes preserve source order, skipped lines leave no placeholder
    let names: Vec<&str> = batch.proxies.iter().map(Proxy::name).collect();
    assert_eq!(
        names,
        vec!["Node A", "Node B", "Node C", "Node D", "Node E", "Node F", "Node G"]
    );
    for failure in &batch.failures {
        assert!(failure.reason.starts_with("failed: "), "{failure:?}");
    }
}

#[tokio::test]
async fn empty_decode_set_never_reaches_the_builder() {
    let converter = Converter::new(LinkParser::new(), ConfigBuilder::new(), Validator::default());
    let err = converter
        .convert("unknown://x\ngarbage\n", false)
        .await
        .unwrap_err();

    let convert_err = err.downcast_ref::<ConvertError>().expect("ConvertError");
    match convert_err {
        ConvertError::EmptyBatch { failures } => {
            assert_eq!(failures.len(), 2);
            assert!(failures[0].reason.contains("unrecognized scheme"));
        }
        other => panic!("expected EmptyBatch, got {other:?}"),
    }
}

#[tokio::test]
async fn document_structure_and_group_membership_invariant() {
    let converter = Converter::new(LinkParser::new(), ConfigBuilder::new(), Validator::default());
    let outcome = converter
        .convert(&all_protocol_batch(), false)
        .await
        .unwrap();

    // The body after the provenance header parses back into the document
    let body = outcome.document.split_once("\n\n").unwrap().1;
    let config = ClashConfig::from_yaml(body).unwrap();

    assert_eq!(config.proxies.len(), 6);
    assert_eq!(config.proxy_groups.len(), 6);
    assert_eq!(config.rules.last().unwrap(), &format!("MATCH,{GROUP_FINAL}"));

    // Every non-DIRECT, non-group member must name a proxy
    let proxy_names: HashSet<&str> = config.proxy_names().into_iter().collect();
    let group_names: HashSet<&str> = config
        .proxy_groups
        .iter()
        .map(|g| g.name.as_str())
        .collect();
    for group in &config.proxy_groups {
        for member in &group.proxies {
            assert!(
                member == "DIRECT"
                    || group_names.contains(member.as_str())
                    || proxy_names.contains(member.as_str()),
                "group {} references unknown member {}",
                group.name,
                member
            );
        }
    }

    // Probing groups carry the fixed health-check configuration
    for group in config
        .proxy_groups
        .iter()
        .filter(|g| g.kind != GroupKind::Select)
    {
        assert_eq!(group.url.as_deref(), Some(PROBE_URL));
        assert_eq!(group.interval, Some(PROBE_INTERVAL));
    }
}

#[tokio::test]
async fn rendered_document_is_stable_apart_from_timestamp() {
    let converter = Converter::new(LinkParser::new(), ConfigBuilder::new(), Validator::default());
    let first = converter
        .convert(&all_protocol_batch(), false)
        .await
        .unwrap();
    let second = converter
        .convert(&all_protocol_batch(), false)
        .await
        .unwrap();

    let strip_ts = |text: &str| -> String {
        text.lines()
            .filter(|line| !line.starts_with("# Generated at:"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    assert_eq!(strip_ts(&first.document), strip_ts(&second.document));
}

#[test]
fn shadowsocks_userinfo_forms_are_equivalent() {
    let parser = LinkParser::new();
    let plain = parser.parse_batch("ss://aes-128-gcm:password@host.example:8388#N");
    let encoded = parser.parse_batch("ss://YWVzLTEyOC1nY206cGFzc3dvcmQ@host.example:8388#N");

    assert_eq!(plain.proxies.len(), 1);
    assert_eq!(plain.proxies, encoded.proxies);
}

#[test]
fn missing_fragment_names_are_deterministic() {
    let parser = LinkParser::new();
    let batch = "trojan://pw@host.example:443\nhy2://pw@host.example:443\n";
    let first = parser.parse_batch(batch);
    let second = parser.parse_batch(batch);

    let names: Vec<&str> = first.proxies.iter().map(Proxy::name).collect();
    assert_eq!(names, vec!["trojan-host.example", "hysteria2-host.example"]);
    assert_eq!(
        names,
        second.proxies.iter().map(Proxy::name).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn vless_reality_fields_survive_to_the_document() {
    let link = "vless://u@host.example:443?security=reality&sni=sni.example&pbk=public-key-value&sid=ab12&fp=safari&flow=xtls-rprx-vision#R";
    let converter = Converter::new(LinkParser::new(), ConfigBuilder::new(), Validator::default());
    let outcome = converter.convert(link, false).await.unwrap();

    let body = outcome.document.split_once("\n\n").unwrap().1;
    let config = ClashConfig::from_yaml(body).unwrap();

    match &config.proxies[0] {
        Proxy::VLess(vless) => {
            assert_eq!(vless.flow.as_deref(), Some("xtls-rprx-vision"));
            match &vless.security {
                Security::Reality {
                    opts,
                    client_fingerprint,
                    ..
                } => {
                    assert_eq!(opts.public_key, "public-key-value");
                    assert_eq!(opts.short_id, "ab12");
                    assert_eq!(client_fingerprint, "safari");
                }
                other => panic!("expected Reality security, got {other:?}"),
            }
        }
        other => panic!("expected vless, got {other:?}"),
    }
}

#[cfg(unix)]
mod validator_integration {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    fn stub_validator(dir: &tempfile::TempDir, body: &str) -> Validator {
        let path = dir.path().join("checker.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        Validator::new(path.to_string_lossy().into_owned(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn round_trip_through_a_strict_checker_stub() {
        // Stands in for the real checker: demands the structural markers the
        // real one would parse.
        let dir = tempfile::tempdir().unwrap();
        let validator = stub_validator(
            &dir,
            r#"grep -q "^proxies:" "$3" && grep -q "^proxy-groups:" "$3" && grep -q "^rules:" "$3" && grep -q "^dns:" "$3" || { echo "missing top-level key" >&2; exit 1; }"#,
        );
        let converter = Converter::new(LinkParser::new(), ConfigBuilder::new(), validator);

        let outcome = converter.convert(&all_protocol_batch(), true).await.unwrap();
        assert_eq!(outcome.proxy_count, 6);
    }

    #[tokio::test]
    async fn missing_checker_binary_is_tool_unavailable_not_validation() {
        let converter = Converter::new(
            LinkParser::new(),
            ConfigBuilder::new(),
            Validator::new("/no/such/checker", Duration::from_secs(1)),
        );
        let err = converter
            .convert(&all_protocol_batch(), true)
            .await
            .unwrap_err();

        let convert_err = err.downcast_ref::<ConvertError>().expect("ConvertError");
        assert!(matches!(convert_err, ConvertError::ToolUnavailable { .. }));
    }
}
