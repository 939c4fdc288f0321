use siplink_sip_core::prelude::*;

#[test]
fn s1_parse_invite() {
    let raw = b"INVITE sip:a@b SIP/2.0\r\n\
                 Via: SIP/2.0/UDP h:5060;branch=z9hG4bKx\r\n\
                 From: <sip:c@d>;tag=t1\r\n\
                 To: <sip:a@b>\r\n\
                 Call-ID: cid\r\n\
                 CSeq: 1 INVITE\r\n\
                 Content-Length: 0\r\n\
                 \r\n";
    let msg = parse(raw).unwrap();
    let req = msg.as_request().unwrap();
    assert_eq!(req.method, Method::Invite);
    assert_eq!(req.request_uri, "sip:a@b");
    assert_eq!(msg.call_id(), Some("cid"));
    assert_eq!(msg.cseq(), Some("1 INVITE"));
    assert!(msg.body().is_empty());
}

#[test]
fn s2_build_and_parse_uri() {
    assert_eq!(build_sip_uri(Some("u"), "h", Some(5061)), "sip:u@h:5061");
    let parsed = parse_sip_uri("sip:u@h:5061").unwrap();
    assert_eq!(parsed.scheme, Scheme::Sip);
    assert_eq!(parsed.user.as_deref(), Some("u"));
    assert_eq!(parsed.host, "h");
    assert_eq!(parsed.effective_port(), 5061);
    assert_eq!(build_sip_uri(None, "h", None), "sip:h");
}

#[test]
fn codec_round_trip_preserves_header_order() {
    let raw = b"REGISTER sip:d SIP/2.0\r\nVia: SIP/2.0/UDP h\r\nFrom: <sip:u@d>;tag=t\r\nTo: <sip:u@d>\r\nCall-ID: c\r\nCSeq: 2 REGISTER\r\nContact: <sip:u@1.2.3.4:5060>\r\nExpires: 3600\r\nContent-Length: 0\r\n\r\n";
    let msg = parse(raw).unwrap();
    let out = serialize(&msg);
    let reparsed = parse(&out).unwrap();
    assert_eq!(msg, reparsed);
    let names: Vec<&str> = reparsed.headers().iter().map(|(n, _)| n).collect();
    assert_eq!(
        names,
        vec!["Via", "From", "To", "Call-ID", "CSeq", "Contact", "Expires", "Content-Length"]
    );
}

#[test]
fn unknown_status_code_is_preserved_not_rejected() {
    let raw = b"SIP/2.0 420 Bad Extension\r\nCall-ID: c\r\nCSeq: 1 INVITE\r\n\r\n";
    let msg = parse(raw).unwrap();
    let resp = msg.as_response().unwrap();
    assert_eq!(resp.status.code(), 420);

    let raw = b"SIP/2.0 799 Wildly Unknown\r\nCall-ID: c\r\nCSeq: 1 INVITE\r\n\r\n";
    let msg = parse(raw).unwrap();
    let resp = msg.as_response().unwrap();
    assert_eq!(resp.status.code(), 799);
    assert_eq!(resp.status.reason(), "Wildly Unknown");
}

#[test]
fn s5_unknown_method_fails_without_panicking() {
    let raw = b"FOO sip:x@y SIP/2.0\r\nCall-ID: c\r\nCSeq: 1 FOO\r\n\r\n";
    let err = parse(raw).unwrap_err();
    assert!(matches!(err, Error::UnknownMethod(ref m) if m == "FOO"));
}
