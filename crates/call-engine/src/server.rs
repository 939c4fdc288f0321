use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use siplink_dialog_core::{AcceptWithSdp, DialogEngine};
use siplink_sip_core::{Method, Sdp, SipMessage, SipRequest, SipResponse, StatusCode};
use siplink_sip_transport::{SipSocket, TransportEvent};

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::registrar::Registrar;

const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(2);
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);
const DEFAULT_RTP_PORT: u16 = 20000;

type IncomingCallCallback = Box<dyn Fn(String, String) + Send + Sync>;

/// The UA-server (§4.6): accepts REGISTER unconditionally, answers INVITE
/// with the 100/180/200 sequence via the shared `dialog_core::inbound`
/// handlers, and responds to OPTIONS/BYE/CANCEL. All responses go back to
/// the request's source address — no `rport`/via-received rewriting.
pub struct Server {
    config: ServerConfig,
    engine: Arc<DialogEngine>,
    registrar: Arc<Registrar>,
    on_incoming_call: Arc<AsyncMutex<Option<IncomingCallCallback>>>,
    socket: Arc<AsyncMutex<Option<SipSocket>>>,
    running: Arc<AtomicBool>,
    receive_task: AsyncMutex<Option<JoinHandle<()>>>,
    sweep_task: AsyncMutex<Option<JoinHandle<()>>>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Server {
        let host_label = config.domain.clone();
        Server {
            config,
            engine: Arc::new(DialogEngine::new(host_label)),
            registrar: Arc::new(Registrar::new()),
            on_incoming_call: Arc::new(AsyncMutex::new(None)),
            socket: Arc::new(AsyncMutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            receive_task: AsyncMutex::new(None),
            sweep_task: AsyncMutex::new(None),
        }
    }

    pub async fn set_on_incoming_call(&self, f: impl Fn(String, String) + Send + Sync + 'static) {
        *self.on_incoming_call.lock().await = Some(Box::new(f));
    }

    pub fn registrar(&self) -> &Arc<Registrar> {
        &self.registrar
    }

    /// The bound address, available once `start()` has completed. Mainly
    /// useful for tests that bind to an ephemeral port.
    pub async fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.socket.lock().await.as_ref().map(|s| s.local_addr())
    }

    pub fn active_calls(&self) -> Vec<String> {
        self.engine.active_calls()
    }

    /// Idempotent: a second call warns and returns without rebinding.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("start() called while already running");
            return Ok(());
        }

        let mut socket = SipSocket::bind(&self.config.local_ip, self.config.local_port)
            .await
            .map_err(ServerError::BindFailed)?;
        let mut events = socket.spawn_receive_loop();
        info!(local_addr = %socket.local_addr(), "server started");
        *self.socket.lock().await = Some(socket);

        let engine = self.engine.clone();
        let registrar = self.registrar.clone();
        let on_incoming_call = self.on_incoming_call.clone();
        let socket_for_task = self.socket.clone();
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    TransportEvent::MessageReceived { message, source } => {
                        if let SipMessage::Request(req) = *message {
                            handle_request(&engine, &registrar, &on_incoming_call, &socket_for_task, &config, req, source).await;
                        }
                    }
                    TransportEvent::ParseError { source, error } => {
                        warn!(%source, %error, "dropped malformed datagram");
                    }
                }
            }
        });
        *self.receive_task.lock().await = Some(handle);

        let registrar_for_sweep = self.registrar.clone();
        let running_for_sweep = self.running.clone();
        let sweep_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                if !running_for_sweep.load(Ordering::Relaxed) {
                    break;
                }
                let swept = registrar_for_sweep.sweep_expired();
                if swept > 0 {
                    info!(swept, "registrar sweep removed expired entries");
                }
            }
        });
        *self.sweep_task.lock().await = Some(sweep_handle);

        Ok(())
    }

    /// Idempotent: closes the socket and joins both background tasks
    /// within `STOP_JOIN_TIMEOUT`. A second call is a no-op.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(mut socket) = self.socket.lock().await.take() {
            socket.stop().await;
        }
        if let Some(handle) = self.receive_task.lock().await.take() {
            handle.abort();
            let _ = tokio::time::timeout(STOP_JOIN_TIMEOUT, handle).await;
        }
        if let Some(handle) = self.sweep_task.lock().await.take() {
            handle.abort();
            let _ = tokio::time::timeout(STOP_JOIN_TIMEOUT, handle).await;
        }
        info!("server stopped");
    }
}

async fn handle_request(
    engine: &Arc<DialogEngine>,
    registrar: &Arc<Registrar>,
    on_incoming_call: &Arc<AsyncMutex<Option<IncomingCallCallback>>>,
    socket: &Arc<AsyncMutex<Option<SipSocket>>>,
    config: &ServerConfig,
    req: SipRequest,
    source: std::net::SocketAddr,
) {
    match req.method {
        Method::Register => handle_register(registrar, socket, &req, source).await,
        Method::Bye => {
            if let Some(resp) = siplink_dialog_core::handle_inbound_bye(engine, &req) {
                send_response(socket, &resp, source).await;
            }
        }
        Method::Cancel => {
            if let Some(resp) = siplink_dialog_core::handle_inbound_cancel(engine, &req) {
                send_response(socket, &resp, source).await;
            }
        }
        Method::Invite => {
            if let (Some(from), Some(to)) = (req.header("From"), req.header("To")) {
                if let Some(cb) = on_incoming_call.lock().await.as_ref() {
                    cb(from.to_string(), to.to_string());
                }
            }

            let engine = engine.clone();
            let socket = socket.clone();
            let domain = config.domain.clone();
            let local_ip = config.local_ip.clone();
            let local_port = config.local_port;
            tokio::spawn(async move {
                let local_uri = format!("sip:server@{domain}");
                let remote_uri = req.header("From").unwrap_or_default().to_string();
                let contact = format!("<sip:server@{local_ip}:{local_port}>");
                let policy = AcceptWithSdp {
                    sdp: Sdp::offer(&local_ip, DEFAULT_RTP_PORT).as_str().as_bytes().to_vec(),
                };
                let mut responses = Vec::new();
                let collect = |resp: SipResponse| responses.push(resp);
                siplink_dialog_core::handle_inbound_invite(&engine, &req, &local_uri, &remote_uri, &contact, &policy, collect).await;
                for resp in responses {
                    send_response(&socket, &resp, source).await;
                }
            });
        }
        Method::Options => {
            let local_tag = siplink_dialog_core::ids::generate_tag();
            let resp = siplink_dialog_core::handle_options(&req, &local_tag);
            send_response(socket, &resp, source).await;
        }
        _ => {
            let local_tag = siplink_dialog_core::ids::generate_tag();
            let resp = siplink_dialog_core::compose_response(&req, StatusCode::NOT_IMPLEMENTED, &local_tag, None, None);
            send_response(socket, &resp, source).await;
        }
    }
}

/// REGISTER always succeeds in this core (§4.6 — no authentication
/// enforced); the `Contact`/`Expires` headers drive the registrar table.
async fn handle_register(registrar: &Arc<Registrar>, socket: &Arc<AsyncMutex<Option<SipSocket>>>, req: &SipRequest, source: std::net::SocketAddr) {
    let username = req
        .header("To")
        .and_then(extract_username)
        .unwrap_or_else(|| "unknown".to_string());
    let expires: u32 = req.header("Expires").and_then(|v| v.parse().ok()).unwrap_or(3600);
    let contact = req.header("Contact").unwrap_or("").trim_matches(['<', '>']).to_string();

    if expires == 0 {
        registrar.unregister(&username);
    } else {
        registrar.register(&username, &contact, source, expires);
    }

    let local_tag = siplink_dialog_core::ids::generate_tag();
    let mut resp = siplink_dialog_core::compose_response(req, StatusCode::OK, &local_tag, None, None);
    resp.headers.push("Expires", expires.to_string());
    send_response(socket, &resp, source).await;
}

fn extract_username(header_value: &str) -> Option<String> {
    let start = header_value.find("sip:")? + 4;
    let rest = &header_value[start..];
    let end = rest.find(|c| c == '@' || c == '>' || c == ';').unwrap_or(rest.len());
    let user_or_host = &rest[..end];
    Some(user_or_host.split('@').next().unwrap_or(user_or_host).to_string())
}

async fn send_response(socket: &Arc<AsyncMutex<Option<SipSocket>>>, resp: &SipResponse, dest: std::net::SocketAddr) {
    if let Some(socket) = socket.lock().await.as_ref() {
        let _ = socket.send(&SipMessage::Response(resp.clone()), dest).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_username_handles_bracketed_and_bare_uris() {
        assert_eq!(extract_username("<sip:alice@example.com>"), Some("alice".to_string()));
        assert_eq!(extract_username("sip:bob@example.com;tag=x"), Some("bob".to_string()));
        assert_eq!(extract_username("<sip:example.com>"), Some("example.com".to_string()));
    }
}
