use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use siplink_sip_transport::UdpTransport;

use crate::error::{Error, Result};
use crate::packet::RtpPacket;

fn time_derived_ssrc() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

struct SessionState {
    seq: u16,
    ts: u32,
    remote: Option<SocketAddr>,
}

/// One RTP session: a bound UDP endpoint plus the monotonic sequence
/// number / timestamp bookkeeping described in §4.7. `ssrc` is fixed at
/// construction from a time-derived value, matching the reference
/// handler's `int(time.time()) & 0xFFFFFFFF`.
pub struct RtpSession {
    transport: UdpTransport,
    state: Mutex<SessionState>,
    ssrc: u32,
    sample_rate: u32,
}

impl RtpSession {
    pub async fn bind(local_ip: &str, local_port: u16) -> Result<RtpSession> {
        let transport = UdpTransport::bind(local_ip, local_port).await?;
        Ok(RtpSession {
            transport,
            state: Mutex::new(SessionState {
                seq: 0,
                ts: 0,
                remote: None,
            }),
            ssrc: time_derived_ssrc(),
            sample_rate: 8000,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn set_sample_rate(&mut self, sample_rate: u32) {
        self.sample_rate = sample_rate;
    }

    pub async fn set_remote(&self, remote: SocketAddr) {
        let mut state = self.state.lock().await;
        state.remote = Some(remote);
        debug!(%remote, "RTP remote endpoint set");
    }

    /// Sends one datagram. Pre-condition: a remote endpoint is configured.
    /// Post-condition: exactly one datagram emitted, `seq` advances by one
    /// (wrapping mod 2^16), `ts` advances by `payload.len()` (a stand-in
    /// for a real codec's frame-size accounting).
    pub async fn send_packet(&self, payload: &[u8], payload_type: u8, marker: bool) -> Result<()> {
        let mut state = self.state.lock().await;
        let remote = state.remote.ok_or(Error::NoRemoteEndpoint)?;

        let mut packet = RtpPacket::new(payload_type, state.seq, state.ts, self.ssrc, payload.to_vec());
        packet.marker = marker;

        let wire = packet.pack();
        self.transport.send_to(&wire, remote).await?;

        state.seq = state.seq.wrapping_add(1);
        state.ts = state.ts.wrapping_add(payload.len() as u32);
        Ok(())
    }

    /// Starts the receive loop, delivering successfully-unpacked packets
    /// on an unbounded channel. Malformed frames are dropped silently with
    /// a WARN log, never propagated as an error.
    pub fn spawn_receive_loop(&mut self) -> mpsc::UnboundedReceiver<RtpPacket> {
        let mut raw_rx = self.transport.spawn_receive_loop();
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some((bytes, source)) = raw_rx.recv().await {
                match RtpPacket::unpack(&bytes) {
                    Ok(packet) => {
                        if tx.send(packet).is_err() {
                            break;
                        }
                    }
                    Err(error) => {
                        warn!(%source, %error, "dropping malformed RTP frame");
                    }
                }
            }
        });

        rx
    }

    pub async fn stop(&mut self) {
        self.transport.stop().await;
    }
}

/// A shared handle used by the dialog/client layers to hold onto a session
/// across tasks without owning it outright.
pub type SharedRtpSession = Arc<tokio::sync::Mutex<RtpSession>>;

pub fn sequence_from(start: u16, count: usize) -> Vec<u16> {
    (0..count as u32)
        .map(|i| start.wrapping_add(i as u16))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::sequence_from;

    #[test]
    fn property5_sequence_monotonicity_wraps() {
        let seq = sequence_from(65534, 4);
        assert_eq!(seq, vec![65534, 65535, 0, 1]);
    }
}
