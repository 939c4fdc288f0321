use std::net::SocketAddr;

use siplink_sip_core::SipMessage;

/// Delivered from the receive loop to whatever drains the transport's
/// event channel (typically the dialog engine). A parse failure is an
/// event, not a channel close — the receive loop survives a single
/// malformed datagram.
#[derive(Debug)]
pub enum TransportEvent {
    MessageReceived {
        message: Box<SipMessage>,
        source: SocketAddr,
    },
    ParseError {
        source: SocketAddr,
        error: siplink_sip_core::Error,
    },
}
