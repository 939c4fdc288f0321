use crate::types::message::SipMessage;

/// Serializes a message deterministically: start-line, headers in
/// insertion order, a blank line, then the body verbatim.
pub fn serialize(message: &SipMessage) -> Vec<u8> {
    let mut out = String::new();

    match message {
        SipMessage::Request(r) => {
            out.push_str(&format!(
                "{} {} {}\r\n",
                r.method.as_str(),
                r.request_uri,
                r.version
            ));
        }
        SipMessage::Response(r) => {
            out.push_str(&format!(
                "{} {} {}\r\n",
                r.version,
                r.status.code(),
                r.status.reason()
            ));
        }
    }

    for (name, value) in message.headers().iter() {
        if name.is_empty() {
            continue;
        }
        out.push_str(name);
        out.push_str(": ");
        out.push_str(value);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");

    let mut bytes = out.into_bytes();
    bytes.extend_from_slice(message.body());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn round_trips_header_order_and_body() {
        let raw = b"INVITE sip:a@b SIP/2.0\r\nVia: SIP/2.0/UDP h:5060;branch=z9hG4bKx\r\nCall-ID: cid\r\nCSeq: 1 INVITE\r\nContent-Length: 0\r\n\r\n";
        let msg = parse(raw).unwrap();
        let out = serialize(&msg);
        let reparsed = parse(&out).unwrap();
        assert_eq!(msg, reparsed);
    }

    #[test]
    fn empty_body_message_survives_round_trip() {
        let raw = b"OPTIONS sip:a@b SIP/2.0\r\nCall-ID: c\r\nCSeq: 1 OPTIONS\r\n\r\n";
        let msg = parse(raw).unwrap();
        let out = serialize(&msg);
        let reparsed = parse(&out).unwrap();
        assert_eq!(msg, reparsed);
        assert!(reparsed.body().is_empty());
    }
}
