use chrono::{DateTime, Utc};

use siplink_sip_core::Sdp;

/// `INITIATING → TRYING → RINGING → CONNECTED → TERMINATED` is the only
/// permitted forward order; `FAILED` is reachable from any pre-connected
/// state. States may be skipped but never revisited once TERMINATED/FAILED.
///
/// ```text
///           make_call              100 Trying            180 Ringing
///   ----> INITIATING ----------> TRYING ------------> RINGING
///                \                  \                    \
///                 \                  \                    \  200 OK
///                  \  >=400           \  >=400              v
///                   -------------> FAILED <---------- CONNECTED
///                                                            |
///                                                       BYE / hangup
///                                                            v
///                                                       TERMINATED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogState {
    Initiating,
    Trying,
    Ringing,
    Connected,
    Terminated,
    Failed,
}

impl DialogState {
    pub fn is_terminal(self) -> bool {
        matches!(self, DialogState::Terminated | DialogState::Failed)
    }
}

/// Whether this UA originated the INVITE (Outbound) or received it
/// (Inbound). Purely descriptive — carried from the original Python
/// source's `ClientCall.direction` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outbound,
    Inbound,
}

#[derive(Debug, Clone, Default)]
pub struct RtpEndpoint {
    pub ip: String,
    pub port: u16,
}

/// A single call-leg, owned exclusively by the dialog engine. The UA
/// layers hold only `call_id` references and must tolerate the dialog
/// being absent (already terminated and swept, or never existed).
#[derive(Debug, Clone)]
pub struct Dialog {
    pub call_id: String,
    pub local_uri: String,
    pub remote_uri: String,
    pub local_tag: String,
    pub remote_tag: Option<String>,
    /// The CSeq value used on the last request sent for this dialog. The
    /// counter that produces this value is per-UA, not per-dialog — see
    /// the CSeq handling design note.
    pub cseq_out: u32,
    pub state: DialogState,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
    pub connected_at: Option<DateTime<Utc>>,
    pub terminated_at: Option<DateTime<Utc>>,
    pub local_sdp: Option<Sdp>,
    pub remote_sdp: Option<Sdp>,
    pub local_rtp: Option<RtpEndpoint>,
    pub remote_rtp: Option<RtpEndpoint>,
}

impl Dialog {
    pub fn new(
        call_id: String,
        local_uri: String,
        remote_uri: String,
        local_tag: String,
        direction: Direction,
    ) -> Dialog {
        Dialog {
            call_id,
            local_uri,
            remote_uri,
            local_tag,
            remote_tag: None,
            cseq_out: 0,
            state: DialogState::Initiating,
            direction,
            created_at: Utc::now(),
            connected_at: None,
            terminated_at: None,
            local_sdp: None,
            remote_sdp: None,
            local_rtp: None,
            remote_rtp: None,
        }
    }

    /// Transitions to `new_state`, stamping `connected_at`/`terminated_at`
    /// exactly once, on the transition into that state.
    pub fn transition(&mut self, new_state: DialogState) {
        if self.state.is_terminal() {
            return;
        }
        if new_state == DialogState::Connected && self.connected_at.is_none() {
            self.connected_at = Some(Utc::now());
        }
        if new_state.is_terminal() && self.terminated_at.is_none() {
            self.terminated_at = Some(Utc::now());
        }
        self.state = new_state;
    }
}
