use std::net::UdpSocket;

use tracing::debug;

/// Resolves the local IP to advertise in Via/Contact/SDP. Order: hostname
/// lookup; on failure, the connected-UDP-socket trick (no packet is ever
/// sent; `connect` on a UDP socket merely has the OS pick a source route)
/// against a well-known external address; final fallback `127.0.0.1`.
/// Order and fallbacks must match the reference behavior exactly.
pub fn resolve_local_ip() -> String {
    if let Ok(hostname) = std::env::var("HOSTNAME") {
        if let Ok(mut addrs) = std::net::ToSocketAddrs::to_socket_addrs(&(hostname.as_str(), 0)) {
            if let Some(addr) = addrs.next() {
                debug!(ip = %addr.ip(), "resolved local IP via hostname");
                return addr.ip().to_string();
            }
        }
    }

    if let Some(ip) = egress_ip_via_connected_socket() {
        debug!(%ip, "resolved local IP via connected-socket trick");
        return ip;
    }

    debug!("falling back to 127.0.0.1 for local IP");
    "127.0.0.1".to_string()
}

fn egress_ip_via_connected_socket() -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|a| a.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_returns_a_nonempty_address() {
        let ip = resolve_local_ip();
        assert!(!ip.is_empty());
    }
}
