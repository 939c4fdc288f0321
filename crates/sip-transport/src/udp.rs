use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{Error, Result};
use crate::event::TransportEvent;

const RECV_BUF_LEN: usize = 4096;
const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

struct UdpTransportInner {
    socket: UdpSocket,
    local_addr: SocketAddr,
    closed: AtomicBool,
}

/// A bound UDP endpoint with a dedicated receive task, mirroring the
/// transport's "one receive context per endpoint" rule (§5). Used both for
/// the SIP signalling socket and for each active RTP session's socket.
pub struct UdpTransport {
    inner: Arc<UdpTransportInner>,
    receive_task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("local_addr", &self.inner.local_addr)
            .field("closed", &self.inner.closed.load(Ordering::Relaxed))
            .finish()
    }
}

impl UdpTransport {
    /// Binds `(local_ip, local_port)` with `SO_REUSEADDR`. When
    /// `local_port == 0` the OS assigns a port, which is read back into
    /// `local_addr()`.
    pub async fn bind(local_ip: &str, local_port: u16) -> Result<UdpTransport> {
        let addr: SocketAddr = format!("{local_ip}:{local_port}")
            .parse()
            .map_err(|_| {
                Error::BindFailed(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "invalid bind address",
                ))
            })?;

        let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
        let socket2 = Socket::new(domain, Type::DGRAM, None).map_err(Error::BindFailed)?;
        socket2.set_reuse_address(true).map_err(Error::BindFailed)?;
        socket2.set_nonblocking(true).map_err(Error::BindFailed)?;
        socket2.bind(&addr.into()).map_err(Error::BindFailed)?;

        let std_socket: std::net::UdpSocket = socket2.into();
        let socket = UdpSocket::from_std(std_socket).map_err(Error::BindFailed)?;
        let local_addr = socket.local_addr().map_err(Error::BindFailed)?;

        debug!(%local_addr, "UDP transport bound");

        Ok(UdpTransport {
            inner: Arc::new(UdpTransportInner {
                socket,
                local_addr,
                closed: AtomicBool::new(false),
            }),
            receive_task: None,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.inner.local_addr
    }

    /// Spawns the receive loop, delivering `(bytes, source)` onto an
    /// unbounded channel. Only the caller of `bind` should call this once;
    /// the returned receiver is the sole event source for this endpoint.
    pub fn spawn_receive_loop(&mut self) -> mpsc::UnboundedReceiver<(Vec<u8>, SocketAddr)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = self.inner.clone();

        let handle = tokio::spawn(async move {
            let mut buf = vec![0u8; RECV_BUF_LEN];
            loop {
                if inner.closed.load(Ordering::Relaxed) {
                    break;
                }
                match inner.socket.recv_from(&mut buf).await {
                    Ok((len, source)) => {
                        if tx.send((buf[..len].to_vec(), source)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        if inner.closed.load(Ordering::Relaxed) {
                            break;
                        }
                        error!(error = %e, "UDP receive error");
                    }
                }
            }
            debug!("UDP receive loop exiting");
        });

        self.receive_task = Some(handle);
        rx
    }

    pub async fn send_to(&self, data: &[u8], dest: SocketAddr) -> Result<()> {
        self.inner
            .socket
            .send_to(data, dest)
            .await
            .map(|_| ())
            .map_err(Error::SendFailed)
    }

    /// Idempotent: closes the socket and joins the receive task with a
    /// bounded timeout. A second call is a no-op.
    pub async fn stop(&mut self) {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.receive_task.take() {
            handle.abort();
            let _ = tokio::time::timeout(STOP_JOIN_TIMEOUT, handle).await;
        }
        debug!(local_addr = %self.inner.local_addr, "UDP transport stopped");
    }
}

/// Resolves `host` to an IP via blocking DNS at the send-site, surfacing
/// `ResolutionFailed` rather than panicking on an unresolvable name.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let target = format!("{host}:{port}");
    match tokio::net::lookup_host(&target).await {
        Ok(mut addrs) => addrs.next().ok_or_else(|| Error::ResolutionFailed {
            host: host.to_string(),
            reason: "no addresses returned".to_string(),
        }),
        Err(e) => {
            warn!(host, error = %e, "DNS resolution failed");
            Err(Error::ResolutionFailed {
                host: host.to_string(),
                reason: e.to_string(),
            })
        }
    }
}
