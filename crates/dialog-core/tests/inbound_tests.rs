use std::sync::Arc;

use siplink_dialog_core::{AcceptWithSdp, DialogEngine, DialogState};
use siplink_sip_core::{Method, SipRequest};

fn sample_invite() -> SipRequest {
    let mut req = SipRequest::new(Method::Invite, "sip:a@b");
    req.headers.push("Via", "SIP/2.0/UDP h:5060;branch=z9hG4bKx");
    req.headers.push("From", "<sip:c@d>;tag=t1");
    req.headers.push("To", "<sip:a@b>");
    req.headers.push("Call-ID", "cid-1");
    req.headers.push("CSeq", "1 INVITE");
    req
}

#[tokio::test(start_paused = true)]
async fn s4_server_side_trying_ringing_connected() {
    let engine = Arc::new(DialogEngine::new("srv"));

    let engine_for_task = engine.clone();
    let handle = tokio::spawn(async move {
        let invite = sample_invite();
        let policy = AcceptWithSdp { sdp: b"v=0\r\n".to_vec() };
        let mut seen_codes = Vec::new();
        let send = |resp: siplink_sip_core::SipResponse| seen_codes.push(resp.status.code());
        siplink_dialog_core::handle_inbound_invite(
            &engine_for_task,
            &invite,
            "sip:callee@host",
            "sip:caller@host",
            "<sip:callee@host>",
            &policy,
            send,
        )
        .await;
        seen_codes
    });

    tokio::time::advance(std::time::Duration::from_millis(1100)).await;
    let seen_codes = handle.await.unwrap();

    assert_eq!(seen_codes, vec![100, 180, 200]);

    let snapshot = engine.snapshot("cid-1").unwrap();
    assert_eq!(snapshot.state, DialogState::Connected);
    assert!(snapshot.connected_at.is_some());
}
