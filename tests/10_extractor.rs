use gatecheck_api::scan::{extract_reference, MalformedPayload};

#[test]
fn json_payload_yields_reference() {
    assert_eq!(extract_reference(r#"{"tx_ref":"T1"}"#).unwrap(), "T1");
    assert_eq!(extract_reference(r#"{"reference":"T2"}"#).unwrap(), "T2");
    assert_eq!(extract_reference(r#"{"txRef":"T3"}"#).unwrap(), "T3");
}

#[test]
fn json_payload_with_extra_fields() {
    let raw = r#"{"event":"RustConf","tx_ref":"CONF-42","quantity":2}"#;
    assert_eq!(extract_reference(raw).unwrap(), "CONF-42");
}

#[test]
fn url_payload_yields_query_reference() {
    assert_eq!(extract_reference("https://x/y?reference=T2").unwrap(), "T2");
    assert_eq!(
        extract_reference("https://pay.example.com/callback?status=successful&tx_ref=FLW-123")
            .unwrap(),
        "FLW-123"
    );
}

#[test]
fn bare_payload_is_trimmed() {
    assert_eq!(extract_reference("  T3  ").unwrap(), "T3");
    assert_eq!(extract_reference("REF-2024-001").unwrap(), "REF-2024-001");
}

#[test]
fn url_without_reference_falls_back_to_raw() {
    // No alias in the query, so the whole trimmed payload is the reference
    assert_eq!(
        extract_reference("https://x/y?foo=1").unwrap(),
        "https://x/y?foo=1"
    );
}

#[test]
fn empty_and_referenceless_payloads_are_malformed() {
    assert_eq!(extract_reference(""), Err(MalformedPayload));
    assert_eq!(extract_reference("   "), Err(MalformedPayload));
    assert_eq!(extract_reference("{}"), Err(MalformedPayload));
    assert_eq!(extract_reference(r#"{"tx_ref":""}"#), Err(MalformedPayload));
    assert_eq!(extract_reference(r#"{"amount":5000}"#), Err(MalformedPayload));
    // URL with an aliased-but-empty parameter is malformed too, never the
    // whole URL as a reference
    assert_eq!(
        extract_reference("https://x/y?tx_ref="),
        Err(MalformedPayload)
    );
}

#[test]
fn extraction_is_deterministic() {
    let raw = r#"{"tx_ref":"SAME","reference":"OTHER"}"#;
    for _ in 0..3 {
        assert_eq!(extract_reference(raw).unwrap(), "SAME");
    }
}
