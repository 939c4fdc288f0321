use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use siplink_sip_core::{Method, SipResponse};

use crate::error::{Error, Result};
use crate::event::DialogEvent;
use crate::ids::{generate_branch, generate_call_id, generate_tag};
use crate::types::{Dialog, DialogState, Direction};
use crate::util::extract_tag;

/// The `call_id -> Dialog` mapping plus the rules that drive transitions.
/// The table mutex is held only for the duration of a state-machine step
/// and response composition, never across I/O (§5 "Shared-resource
/// policy"); every method here takes the lock, mutates, and releases it
/// before returning — callbacks are dispatched by the caller from the
/// returned `DialogEvent`, outside the lock.
pub struct DialogEngine {
    dialogs: Mutex<HashMap<String, Dialog>>,
    cseq_out: AtomicU32,
    host_label: String,
}

impl DialogEngine {
    pub fn new(host_label: impl Into<String>) -> DialogEngine {
        DialogEngine {
            dialogs: Mutex::new(HashMap::new()),
            cseq_out: AtomicU32::new(0),
            host_label: host_label.into(),
        }
    }

    /// A single per-UA counter, not per-dialog (see the CSeq handling
    /// design note) — every outgoing request increments it before send.
    pub fn next_cseq(&self) -> u32 {
        self.cseq_out.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn generate_branch(&self) -> String {
        generate_branch()
    }

    /// Creates a fresh outbound dialog in `INITIATING`, generating its
    /// Call-ID and local tag. Returns the dialog's Call-ID and local tag
    /// for the caller to compose the initial INVITE.
    pub fn create_outbound_dialog(&self, local_uri: &str, remote_uri: &str) -> (String, String) {
        let call_id = generate_call_id(&self.host_label);
        let local_tag = generate_tag();
        let dialog = Dialog::new(
            call_id.clone(),
            local_uri.to_string(),
            remote_uri.to_string(),
            local_tag.clone(),
            Direction::Outbound,
        );
        self.dialogs.lock().unwrap().insert(call_id.clone(), dialog);
        (call_id, local_tag)
    }

    /// Creates an inbound dialog straight into `TRYING`, per 4.4.2's
    /// "create dialog in TRYING" (no INITIATING wait on the server side).
    pub fn create_inbound_dialog(
        &self,
        call_id: &str,
        local_uri: &str,
        remote_uri: &str,
        remote_tag: Option<String>,
    ) -> Result<()> {
        let mut table = self.dialogs.lock().unwrap();
        if let Some(existing) = table.get(call_id) {
            if existing.state.is_terminal() {
                return Err(Error::UnknownCallId(call_id.to_string()));
            }
        }
        let local_tag = generate_tag();
        let mut dialog = Dialog::new(
            call_id.to_string(),
            local_uri.to_string(),
            remote_uri.to_string(),
            local_tag,
            Direction::Inbound,
        );
        dialog.remote_tag = remote_tag;
        dialog.transition(DialogState::Trying);
        table.insert(call_id.to_string(), dialog);
        Ok(())
    }

    pub fn snapshot(&self, call_id: &str) -> Option<Dialog> {
        self.dialogs.lock().unwrap().get(call_id).cloned()
    }

    /// Call-IDs of dialogs that have not yet reached a terminal state,
    /// satisfying property 6 ("both appear in `active_calls()` until
    /// terminated").
    pub fn active_calls(&self) -> Vec<String> {
        self.dialogs
            .lock()
            .unwrap()
            .values()
            .filter(|d| !d.state.is_terminal())
            .map(|d| d.call_id.clone())
            .collect()
    }

    pub fn with_dialog_mut<R>(&self, call_id: &str, f: impl FnOnce(&mut Dialog) -> R) -> Option<R> {
        let mut table = self.dialogs.lock().unwrap();
        table.get_mut(call_id).map(f)
    }

    /// Applies the UA-client-side state table (4.4.1) to an incoming
    /// response. Returns `Ok(None)` for a response whose Call-ID names no
    /// dialog — silently ignored, per the correlation rule — unless it is
    /// a 200/INVITE duplicate after CONNECTED, in which case the caller is
    /// told to resend ACK.
    pub fn apply_client_response(&self, response: &SipResponse) -> Result<Option<ClientOutcome>> {
        let call_id = match response.header("Call-ID") {
            Some(c) => c.to_string(),
            None => return Ok(None),
        };

        let mut table = self.dialogs.lock().unwrap();
        let dialog = match table.get_mut(&call_id) {
            Some(d) => d,
            None => {
                debug!(%call_id, "response for unknown dialog, ignoring");
                return Ok(None);
            }
        };

        let is_invite_2xx =
            response.status.is_success() && response.original_method == Some(Method::Invite);

        if dialog.state == DialogState::Connected && is_invite_2xx {
            return Ok(Some(ClientOutcome::ResendAck));
        }

        if dialog.state.is_terminal() {
            return Ok(None);
        }

        let code = response.status.code();
        let event = if code == 100 {
            dialog.transition(DialogState::Trying);
            Some(DialogEvent::Trying { call_id: call_id.clone() })
        } else if code == 180 {
            dialog.transition(DialogState::Ringing);
            Some(DialogEvent::Ringing { call_id: call_id.clone() })
        } else if is_invite_2xx {
            if let Some(to) = response.header("To") {
                dialog.remote_tag = extract_tag(to);
            }
            dialog.transition(DialogState::Connected);
            Some(DialogEvent::Connected { call_id: call_id.clone() })
        } else if code >= 400 {
            dialog.transition(DialogState::Failed);
            Some(DialogEvent::Ended { call_id: call_id.clone() })
        } else {
            None
        };

        Ok(event.map(ClientOutcome::Event))
    }

    /// Transitions a connected dialog to TERMINATED on local `hangup()` or
    /// on an incoming BYE. Silent (`Ok(None)`) if the Call-ID is unknown,
    /// matching the silent-on-unknown rule for both cases; an incoming BYE
    /// on an unknown Call-ID is the caller's responsibility to report as
    /// 481 (it has the request to respond to; this engine only owns state).
    pub fn terminate(&self, call_id: &str) -> Option<DialogEvent> {
        let mut table = self.dialogs.lock().unwrap();
        let dialog = table.get_mut(call_id)?;
        if dialog.state.is_terminal() {
            return None;
        }
        dialog.transition(DialogState::Terminated);
        Some(DialogEvent::Ended { call_id: call_id.to_string() })
    }

    pub fn fail(&self, call_id: &str) -> Option<DialogEvent> {
        let mut table = self.dialogs.lock().unwrap();
        let dialog = table.get_mut(call_id)?;
        if dialog.state.is_terminal() {
            return None;
        }
        dialog.transition(DialogState::Failed);
        Some(DialogEvent::Ended { call_id: call_id.to_string() })
    }

    /// Whether a request naming `call_id` should be rejected with 481
    /// because the dialog already reached a terminal state (§3's
    /// "not reopened" invariant).
    pub fn is_reopening_terminated(&self, call_id: &str) -> bool {
        self.dialogs
            .lock()
            .unwrap()
            .get(call_id)
            .map(|d| d.state.is_terminal())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientOutcome {
    Event(DialogEvent),
    /// A 200/INVITE arrived again after CONNECTED: no formal retransmission
    /// timer exists in this core, but a duplicate ACK must still be sent
    /// best-effort (4.4.1's correlation rule).
    ResendAck,
}

#[cfg(test)]
mod tests {
    use super::*;
    use siplink_sip_core::StatusCode;

    fn response_with(call_id: &str, status: StatusCode, original_method: Option<Method>) -> SipResponse {
        let mut r = SipResponse::new(status);
        r.headers.push("Call-ID", call_id.to_string());
        r.headers.push("To", "<sip:a@b>");
        r.original_method = original_method;
        r
    }

    #[test]
    fn property6_dialog_uniqueness() {
        let engine = DialogEngine::new("host1");
        let (id1, _) = engine.create_outbound_dialog("sip:u@d", "sip:r@d");
        let (id2, _) = engine.create_outbound_dialog("sip:u@d", "sip:r@d");
        assert_ne!(id1, id2);
        let active = engine.active_calls();
        assert!(active.contains(&id1));
        assert!(active.contains(&id2));
    }

    #[test]
    fn property7_state_monotonicity_and_no_reopen() {
        let engine = DialogEngine::new("host1");
        let (call_id, _) = engine.create_outbound_dialog("sip:u@d", "sip:r@d");

        engine
            .apply_client_response(&response_with(&call_id, StatusCode::TRYING, Some(Method::Invite)))
            .unwrap();
        engine
            .apply_client_response(&response_with(&call_id, StatusCode::RINGING, Some(Method::Invite)))
            .unwrap();
        let outcome = engine
            .apply_client_response(&response_with(&call_id, StatusCode::OK, Some(Method::Invite)))
            .unwrap();
        assert_eq!(outcome, Some(ClientOutcome::Event(DialogEvent::Connected { call_id: call_id.clone() })));

        let snapshot = engine.snapshot(&call_id).unwrap();
        assert_eq!(snapshot.state, DialogState::Connected);
        assert!(snapshot.connected_at.is_some());

        engine.terminate(&call_id);
        let snapshot = engine.snapshot(&call_id).unwrap();
        assert_eq!(snapshot.state, DialogState::Terminated);
        assert!(snapshot.connected_at.unwrap() <= snapshot.terminated_at.unwrap());

        // No further transitions once terminated.
        engine
            .apply_client_response(&response_with(&call_id, StatusCode::RINGING, Some(Method::Invite)))
            .unwrap();
        let snapshot = engine.snapshot(&call_id).unwrap();
        assert_eq!(snapshot.state, DialogState::Terminated);
    }

    #[test]
    fn unknown_call_id_response_is_silently_ignored() {
        let engine = DialogEngine::new("host1");
        let outcome = engine
            .apply_client_response(&response_with("nonexistent", StatusCode::OK, Some(Method::Invite)))
            .unwrap();
        assert_eq!(outcome, None);
    }

    #[test]
    fn cseq_counter_is_shared_across_dialogs() {
        let engine = DialogEngine::new("host1");
        let first = engine.next_cseq();
        let second = engine.next_cseq();
        assert_eq!(second, first + 1);
    }
}
