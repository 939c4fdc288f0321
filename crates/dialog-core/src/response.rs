use siplink_sip_core::{SipRequest, SipResponse, StatusCode};

/// Composes a response to `request` per 4.4.5: copies Via, From, To,
/// Call-ID, CSeq from the matched request, appending `;tag=<local_tag>` to
/// To on the first 1xx/2xx from the UAS if it doesn't already carry one.
/// A 2xx/INVITE additionally carries `Contact` and, when `body` is
/// present, `Content-Type: application/sdp` and `Content-Length`.
pub fn compose_response(
    request: &SipRequest,
    status: StatusCode,
    local_tag: &str,
    contact: Option<&str>,
    body: Option<Vec<u8>>,
) -> SipResponse {
    let mut response = SipResponse::new(status.clone());
    response.original_method = Some(request.method);

    if let Some(via) = request.header("Via") {
        response.headers.push("Via", via.to_string());
    }
    if let Some(from) = request.header("From") {
        response.headers.push("From", from.to_string());
    }
    if let Some(to) = request.header("To") {
        let to_value = if status.is_provisional() || status.is_success() {
            ensure_tag(to, local_tag)
        } else {
            to.to_string()
        };
        response.headers.push("To", to_value);
    }
    if let Some(call_id) = request.header("Call-ID") {
        response.headers.push("Call-ID", call_id.to_string());
    }
    if let Some(cseq) = request.header("CSeq") {
        response.headers.push("CSeq", cseq.to_string());
    }

    let is_invite_2xx = status.is_success() && request.method == siplink_sip_core::Method::Invite;
    if is_invite_2xx {
        if let Some(contact) = contact {
            response.headers.push("Contact", contact.to_string());
        }
    }

    if let Some(body) = body {
        if !body.is_empty() {
            response.headers.push("Content-Type", "application/sdp");
            response.headers.push("Content-Length", body.len().to_string());
            response.body = body;
        } else {
            response.headers.push("Content-Length", "0");
        }
    } else {
        response.headers.push("Content-Length", "0");
    }

    response
}

fn ensure_tag(to_header: &str, local_tag: &str) -> String {
    if to_header.contains("tag=") {
        to_header.to_string()
    } else {
        format!("{to_header};tag={local_tag}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siplink_sip_core::Method;

    fn sample_invite() -> SipRequest {
        let mut req = SipRequest::new(Method::Invite, "sip:a@b");
        req.headers.push("Via", "SIP/2.0/UDP h:5060;branch=z9hG4bKx");
        req.headers.push("From", "<sip:c@d>;tag=t1");
        req.headers.push("To", "<sip:a@b>");
        req.headers.push("Call-ID", "cid");
        req.headers.push("CSeq", "1 INVITE");
        req
    }

    #[test]
    fn adds_tag_on_first_provisional() {
        let req = sample_invite();
        let resp = compose_response(&req, StatusCode::TRYING, "srv1", None, None);
        assert!(resp.header("To").unwrap().contains("tag=srv1"));
        assert_eq!(resp.header("Call-ID"), Some("cid"));
        assert_eq!(resp.header("CSeq"), Some("1 INVITE"));
    }

    #[test]
    fn ok_carries_contact_and_sdp_body() {
        let req = sample_invite();
        let resp = compose_response(
            &req,
            StatusCode::OK,
            "srv1",
            Some("<sip:srv1@host>"),
            Some(b"v=0\r\n".to_vec()),
        );
        assert_eq!(resp.header("Contact"), Some("<sip:srv1@host>"));
        assert_eq!(resp.header("Content-Type"), Some("application/sdp"));
        assert_eq!(resp.header("Content-Length"), Some("5"));
    }
}
