use std::net::SocketAddr;

use tokio::sync::mpsc;
use tracing::warn;

use crate::error::Result;
use crate::event::TransportEvent;
use crate::udp::UdpTransport;

/// A UDP transport specialized for SIP: the receive loop parses each
/// datagram and delivers a `TransportEvent` rather than raw bytes, so the
/// dialog engine never touches the codec directly.
pub struct SipSocket {
    transport: UdpTransport,
}

impl SipSocket {
    pub async fn bind(local_ip: &str, local_port: u16) -> Result<SipSocket> {
        Ok(SipSocket {
            transport: UdpTransport::bind(local_ip, local_port).await?,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn spawn_receive_loop(&mut self) -> mpsc::UnboundedReceiver<TransportEvent> {
        let mut raw_rx = self.transport.spawn_receive_loop();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some((bytes, source)) = raw_rx.recv().await {
                let event = match siplink_sip_core::parser::parse(&bytes) {
                    Ok(message) => TransportEvent::MessageReceived {
                        message: Box::new(message),
                        source,
                    },
                    Err(error) => {
                        warn!(%source, %error, "dropping malformed datagram");
                        TransportEvent::ParseError { source, error }
                    }
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        rx
    }

    pub async fn send(&self, message: &siplink_sip_core::SipMessage, dest: SocketAddr) -> Result<()> {
        let bytes = siplink_sip_core::serializer::serialize(message);
        self.transport.send_to(&bytes, dest).await
    }

    pub async fn stop(&mut self) {
        self.transport.stop().await;
    }
}
