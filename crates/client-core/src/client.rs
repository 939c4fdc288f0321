use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use siplink_dialog_core::{AcceptWithSdp, ClientOutcome, DialogEngine, DialogState};
use siplink_rtp_core::RtpSession;
use siplink_sip_core::{Method, Sdp, SipMessage, SipRequest, SipResponse, SipUri, StatusCode};
use siplink_sip_transport::{resolve, SipSocket, TransportEvent};

use crate::callbacks::CallbackSet;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

const STOP_JOIN_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_RTP_PORT: u16 = 10000;

/// The SIP UA-client: registers, places and receives calls, and exposes
/// the observable event set of §4.5.
pub struct Client {
    config: ClientConfig,
    engine: Arc<DialogEngine>,
    callbacks: Arc<CallbackSet>,
    socket: Arc<AsyncMutex<Option<SipSocket>>>,
    rtp_sessions: Arc<AsyncMutex<HashMap<String, RtpSession>>>,
    running: Arc<AtomicBool>,
    receive_task: AsyncMutex<Option<JoinHandle<()>>>,
}

impl Client {
    /// Resolves `config.local_ip` via [`crate::local_ip::resolve_local_ip`]
    /// when it is left at the unspecified `"0.0.0.0"` default so Via,
    /// Contact and SDP carry a real advertisable address.
    pub fn new(mut config: ClientConfig) -> Client {
        if config.local_ip == "0.0.0.0" {
            config.local_ip = crate::local_ip::resolve_local_ip();
        }
        let host_label = config.local_ip.clone();
        Client {
            config,
            engine: Arc::new(DialogEngine::new(host_label)),
            callbacks: Arc::new(CallbackSet::new()),
            socket: Arc::new(AsyncMutex::new(None)),
            rtp_sessions: Arc::new(AsyncMutex::new(HashMap::new())),
            running: Arc::new(AtomicBool::new(false)),
            receive_task: AsyncMutex::new(None),
        }
    }

    pub fn set_on_incoming_call(&self, f: impl Fn((String, String)) + Send + Sync + 'static) {
        self.callbacks.set_on_incoming_call(f);
    }
    pub fn set_on_call_trying(&self, f: impl Fn(String) + Send + Sync + 'static) {
        self.callbacks.set_on_call_trying(f);
    }
    pub fn set_on_call_ringing(&self, f: impl Fn(String) + Send + Sync + 'static) {
        self.callbacks.set_on_call_ringing(f);
    }
    pub fn set_on_call_connected(&self, f: impl Fn(String) + Send + Sync + 'static) {
        self.callbacks.set_on_call_connected(f);
    }
    pub fn set_on_call_ended(&self, f: impl Fn(String) + Send + Sync + 'static) {
        self.callbacks.set_on_call_ended(f);
    }

    /// Idempotent: a second call warns and returns `Ok(())` without
    /// rebinding.
    pub async fn start(&self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("start() called while already running");
            return Ok(());
        }

        let mut socket = SipSocket::bind(&self.config.local_ip, self.config.local_port)
            .await
            .map_err(ClientError::BindFailed)?;
        let mut events = socket.spawn_receive_loop();
        info!(local_addr = %socket.local_addr(), "client started");

        *self.socket.lock().await = Some(socket);

        let engine = self.engine.clone();
        let callbacks = self.callbacks.clone();
        let socket_for_task = self.socket.clone();
        let config = self.config.clone();

        let handle = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    TransportEvent::MessageReceived { message, source } => {
                        dispatch(&engine, &callbacks, &socket_for_task, &config, *message, source).await;
                    }
                    TransportEvent::ParseError { source, error } => {
                        warn!(%source, %error, "dropped malformed datagram");
                    }
                }
            }
        });
        *self.receive_task.lock().await = Some(handle);

        Ok(())
    }

    /// Idempotent: closes the socket and joins the receive task within
    /// `STOP_JOIN_TIMEOUT`. A second call is a no-op.
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
        info!("client stopped");
    }

    pub async fn register(&self, expires: u32) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(ClientError::NotRunning);
        }
        let dest = resolve(&self.config.server_host, self.config.server_port)
            .await
            .map_err(ClientError::ResolutionFailed)?;

        let local_uri = SipUri::new(&self.config.domain).with_user(&self.config.username);
        let contact = SipUri::new(&self.config.local_ip)
            .with_user(&self.config.username)
            .with_port(self.local_port().await);

        let mut req = SipRequest::new(Method::Register, format!("sip:{}", self.config.domain));
        let branch = self.engine.generate_branch();
        req.headers.push("Via", format!("SIP/2.0/UDP {}:{};branch={}", self.config.local_ip, self.local_port().await, branch));
        req.headers.push("From", format!("<{local_uri}>;tag={}", siplink_dialog_core::ids::generate_tag()));
        req.headers.push("To", format!("<{local_uri}>"));
        req.headers.push("Call-ID", siplink_dialog_core::ids::generate_call_id(&self.config.local_ip));
        req.headers.push("CSeq", format!("{} REGISTER", self.engine.next_cseq()));
        req.headers.push("Contact", format!("<{contact}>"));
        req.headers.push("Expires", expires.to_string());
        req.headers.push("Content-Length", "0");

        self.send(&SipMessage::Request(req), dest).await
    }

    pub async fn make_call(&self, remote_uri: &str) -> Result<String> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(ClientError::NotRunning);
        }
        let parsed = SipUri::parse(remote_uri).map_err(|e| ClientError::InvalidUri(e.to_string()))?;

        let dest = match resolve(&parsed.host, parsed.effective_port()).await {
            Ok(addr) => addr,
            Err(e) => return Err(ClientError::ResolutionFailed(e)),
        };

        let local_uri = SipUri::new(&self.config.domain).with_user(&self.config.username).to_string();
        let (call_id, local_tag) = self.engine.create_outbound_dialog(&local_uri, remote_uri);

        let local_port = self.local_port().await;
        let rtp_session = RtpSession::bind(&self.config.local_ip, DEFAULT_RTP_PORT)
            .await
            .ok();
        let rtp_port = rtp_session
            .as_ref()
            .map(|s| s.local_addr().port())
            .unwrap_or(DEFAULT_RTP_PORT);
        if let Some(session) = rtp_session {
            self.rtp_sessions.lock().await.insert(call_id.clone(), session);
        }

        let sdp = Sdp::offer(&self.config.local_ip, rtp_port);
        self.engine.with_dialog_mut(&call_id, |d| d.local_sdp = Some(sdp.clone()));

        let mut req = SipRequest::new(Method::Invite, remote_uri.to_string());
        let branch = self.engine.generate_branch();
        req.headers.push("Via", format!("SIP/2.0/UDP {}:{};branch={}", self.config.local_ip, local_port, branch));
        req.headers.push("From", format!("<{local_uri}>;tag={local_tag}"));
        req.headers.push("To", format!("<{remote_uri}>"));
        req.headers.push("Call-ID", call_id.clone());
        req.headers.push("CSeq", format!("{} INVITE", self.engine.next_cseq()));
        req.headers.push(
            "Contact",
            format!("<sip:{}@{}:{}>", self.config.username, self.config.local_ip, local_port),
        );
        req.headers.push("Content-Type", "application/sdp");
        req.headers.push("Content-Length", sdp.as_str().len().to_string());
        req.body = sdp.as_str().as_bytes().to_vec();

        self.send(&SipMessage::Request(req), dest).await?;
        Ok(call_id)
    }

    /// Silent if `call_id` is unknown.
    pub async fn hangup(&self, call_id: &str) {
        let dialog = match self.engine.snapshot(call_id) {
            Some(d) if d.state == DialogState::Connected => d,
            _ => return,
        };
        let remote_host = self.config.server_host.clone();
        let dest = match resolve(&remote_host, self.config.server_port).await {
            Ok(d) => d,
            Err(_) => return,
        };

        let mut req = SipRequest::new(Method::Bye, dialog.remote_uri.clone());
        let mut from = format!("<{}>", dialog.local_uri);
        from.push_str(&format!(";tag={}", dialog.local_tag));
        req.headers.push("From", from);
        let mut to = format!("<{}>", dialog.remote_uri);
        if let Some(tag) = &dialog.remote_tag {
            to.push_str(&format!(";tag={tag}"));
        }
        req.headers.push("To", to);
        req.headers.push("Call-ID", call_id.to_string());
        req.headers.push("CSeq", format!("{} BYE", self.engine.next_cseq()));
        req.headers.push("Content-Length", "0");

        let _ = self.send(&SipMessage::Request(req), dest).await;
        self.engine.terminate(call_id);
        self.callbacks.fire_call_ended(call_id.to_string());
    }

    pub async fn active_calls(&self) -> Vec<String> {
        self.engine.active_calls()
    }

    async fn local_port(&self) -> u16 {
        self.socket
            .lock()
            .await
            .as_ref()
            .map(|s| s.local_addr().port())
            .unwrap_or(self.config.local_port)
    }

    async fn send(&self, message: &SipMessage, dest: std::net::SocketAddr) -> Result<()> {
        let socket = self.socket.lock().await;
        let socket = socket.as_ref().ok_or(ClientError::NotRunning)?;
        socket.send(message, dest).await.map_err(ClientError::SendFailed)
    }
}

async fn dispatch(
    engine: &Arc<DialogEngine>,
    callbacks: &Arc<CallbackSet>,
    socket: &Arc<AsyncMutex<Option<SipSocket>>>,
    config: &ClientConfig,
    message: SipMessage,
    source: std::net::SocketAddr,
) {
    match message {
        SipMessage::Response(resp) => handle_response(engine, callbacks, socket, resp, source).await,
        SipMessage::Request(req) => handle_request(engine, callbacks, socket, config, req, source).await,
    }
}

async fn handle_response(
    engine: &Arc<DialogEngine>,
    callbacks: &Arc<CallbackSet>,
    socket: &Arc<AsyncMutex<Option<SipSocket>>>,
    resp: SipResponse,
    source: std::net::SocketAddr,
) {
    if let Ok(Some(ClientOutcome::Event(event))) = engine.apply_client_response(&resp) {
        dispatch_event(callbacks, event);
    }

    // A 2xx/INVITE always gets an ACK: whether this is the first time the
    // dialog reaches CONNECTED (apply_client_response returned an Event)
    // or a duplicate final response after it already has
    // (ClientOutcome::ResendAck), the ACK itself is identical, so it is
    // sent unconditionally on the status/method pair rather than keyed
    // off the outcome variant.
    if resp.status.is_success() && resp.original_method == Some(Method::Invite) {
        if let Some(call_id) = resp.header("Call-ID") {
            if let Some(dialog) = engine.snapshot(call_id) {
                send_ack(engine, socket, call_id, &dialog, source).await;
                if !resp.body.is_empty() {
                    let sdp = Sdp::from_raw(String::from_utf8_lossy(&resp.body).to_string());
                    engine.with_dialog_mut(call_id, |d| d.remote_sdp = Some(sdp));
                }
            }
        }
    }
}

async fn send_ack(
    engine: &Arc<DialogEngine>,
    socket: &Arc<AsyncMutex<Option<SipSocket>>>,
    call_id: &str,
    dialog: &siplink_dialog_core::Dialog,
    source: std::net::SocketAddr,
) {
    let mut ack = SipRequest::new(Method::Ack, dialog.remote_uri.clone());
    let mut from = format!("<{}>", dialog.local_uri);
    from.push_str(&format!(";tag={}", dialog.local_tag));
    ack.headers.push("From", from);
    let mut to = format!("<{}>", dialog.remote_uri);
    if let Some(tag) = &dialog.remote_tag {
        to.push_str(&format!(";tag={tag}"));
    }
    ack.headers.push("To", to);
    ack.headers.push("Call-ID", call_id.to_string());
    // ACK for a 2xx reuses the INVITE's CSeq number (4.4.4).
    ack.headers.push("CSeq", format!("{} ACK", dialog.cseq_out));
    ack.headers.push("Content-Length", "0");

    if let Some(socket) = socket.lock().await.as_ref() {
        let _ = socket.send(&SipMessage::Request(ack), source).await;
    }
    let _ = engine;
}

fn dispatch_event(callbacks: &Arc<CallbackSet>, event: siplink_dialog_core::DialogEvent) {
    use siplink_dialog_core::DialogEvent::*;
    match event {
        Trying { call_id } => callbacks.fire_call_trying(call_id),
        Ringing { call_id } => callbacks.fire_call_ringing(call_id),
        Connected { call_id } => callbacks.fire_call_connected(call_id),
        Ended { call_id } => callbacks.fire_call_ended(call_id),
        IncomingCall { call_id, from, to } => {
            let _ = call_id;
            callbacks.fire_incoming_call((from, to));
        }
    }
}

async fn handle_request(
    engine: &Arc<DialogEngine>,
    callbacks: &Arc<CallbackSet>,
    socket: &Arc<AsyncMutex<Option<SipSocket>>>,
    config: &ClientConfig,
    req: SipRequest,
    source: std::net::SocketAddr,
) {
    match req.method {
        Method::Bye => {
            if let Some(resp) = siplink_dialog_core::handle_inbound_bye(engine, &req) {
                callbacks.fire_call_ended(req.header("Call-ID").unwrap_or_default().to_string());
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
                callbacks.fire_incoming_call((from.to_string(), to.to_string()));
            }
            // The auto-answer delay sleeps up to AUTO_ANSWER_DELAY; spawned
            // so it never blocks this socket's receive loop.
            let engine = engine.clone();
            let socket = socket.clone();
            let config = config.clone();
            tokio::spawn(async move {
                let local_uri = format!("sip:{}@{}", config.username, config.domain);
                let remote_uri = req.header("From").unwrap_or_default().to_string();
                let contact = format!("<sip:{}@{}:{}>", config.username, config.local_ip, config.local_port);
                let policy = AcceptWithSdp {
                    sdp: Sdp::offer(&config.local_ip, DEFAULT_RTP_PORT).as_str().as_bytes().to_vec(),
                };
                let mut responses = Vec::new();
                let collect = |resp: SipResponse| responses.push(resp);
                siplink_dialog_core::handle_inbound_invite(
                    &engine,
                    &req,
                    &local_uri,
                    &remote_uri,
                    &contact,
                    &policy,
                    collect,
                )
                .await;
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

async fn send_response(socket: &Arc<AsyncMutex<Option<SipSocket>>>, resp: &SipResponse, dest: std::net::SocketAddr) {
    if let Some(socket) = socket.lock().await.as_ref() {
        let _ = socket.send(&SipMessage::Response(resp.clone()), dest).await;
    }
}
