use certbind::certificate::{certificate_id_from_filename, CertificatePayload};

#[test]
fn test_parse_key_value_lines() {
    let text = "certificate-id=cert-42\n\
                device-id=abc123\n\
                issued-to=alice@example.com\n\
                parent-id=root-1\n\
                issued-at=2026-01-15\n";
    let payload = CertificatePayload::parse(text);
    assert_eq!(payload.certificate_id(), Some("cert-42"));
    assert_eq!(payload.device_id(), Some("abc123"));
    assert_eq!(payload.issued_to(), Some("alice@example.com"));
    assert_eq!(payload.parent_id(), Some("root-1"));
    assert_eq!(payload.issued_at(), Some("2026-01-15"));
}

#[test]
fn test_malformed_lines_ignored() {
    let text = "garbage line without equals\n\
                =value-without-key\n\
                # a comment\n\
                \n\
                certificate-id = spaced-id \n\
                trailing=with=equals";
    let payload = CertificatePayload::parse(text);
    assert_eq!(payload.certificate_id(), Some("spaced-id"));
    // Value keeps everything after the first '='.
    assert_eq!(payload.get("trailing"), Some("with=equals"));
    assert_eq!(payload.device_id(), None);
}

#[test]
fn test_parse_never_fails_on_arbitrary_input() {
    for text in ["", "\u{0}\u{1}binary-ish", "===", "\n\n\n"] {
        let payload = CertificatePayload::parse(text);
        assert!(payload.certificate_id().is_none());
    }
}

#[test]
fn test_filename_fallback() {
    assert_eq!(
        certificate_id_from_filename("cert-42_certificate.txt").as_deref(),
        Some("cert-42")
    );
    assert_eq!(certificate_id_from_filename("cert-42.txt").as_deref(), Some("cert-42"));
    assert_eq!(certificate_id_from_filename("cert-42").as_deref(), Some("cert-42"));
    // Prefix before the first separator wins.
    assert_eq!(certificate_id_from_filename("a_b_c.txt").as_deref(), Some("a"));
    assert_eq!(certificate_id_from_filename(".txt"), None);
    assert_eq!(certificate_id_from_filename("_x.txt"), None);
}

#[test]
fn test_resolve_prefers_embedded_id() {
    let payload = CertificatePayload::parse("certificate-id=embedded");
    assert_eq!(
        payload.resolve_certificate_id(Some("filename-id.txt")),
        Some("embedded".to_string())
    );

    let payload = CertificatePayload::parse("device-id=abc");
    assert_eq!(
        payload.resolve_certificate_id(Some("filename-id_cert.txt")),
        Some("filename-id".to_string())
    );
    assert_eq!(payload.resolve_certificate_id(None), None);
}
