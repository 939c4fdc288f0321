use tokio::time::sleep;
use tracing::debug;

use siplink_sip_core::{SipRequest, SipResponse, StatusCode};

use crate::engine::DialogEngine;
use crate::policy::{AnswerDecision, AnswerPolicy, AUTO_ANSWER_DELAY};
use crate::response::compose_response;
use crate::types::DialogState;
use crate::util::extract_tag;

/// Drives the UA-server-side state machine for one inbound INVITE (4.4.2):
/// 100 Trying immediately, then 180 Ringing, then — after the policy delay,
/// cancelled if the dialog already left RINGING — consult `policy` and
/// send the final response.
///
/// `send` is invoked with each composed response in turn; the caller owns
/// actually putting bytes on the wire to the request's source address.
pub async fn handle_inbound_invite<S, P>(
    engine: &DialogEngine,
    invite: &SipRequest,
    local_uri: &str,
    remote_uri: &str,
    contact: &str,
    policy: &P,
    mut send: S,
) where
    S: FnMut(SipResponse),
    P: AnswerPolicy,
{
    let call_id = match invite.header("Call-ID") {
        Some(c) => c.to_string(),
        None => return,
    };

    if engine.is_reopening_terminated(&call_id) {
        let local_tag = engine
            .snapshot(&call_id)
            .map(|d| d.local_tag)
            .unwrap_or_default();
        send(compose_response(
            invite,
            StatusCode::CALL_TRANSACTION_DOES_NOT_EXIST,
            &local_tag,
            None,
            None,
        ));
        return;
    }

    let remote_tag = invite.header("From").and_then(extract_tag);
    if engine
        .create_inbound_dialog(&call_id, local_uri, remote_uri, remote_tag)
        .is_err()
    {
        return;
    }
    let local_tag = engine
        .snapshot(&call_id)
        .map(|d| d.local_tag)
        .unwrap_or_default();

    send(compose_response(invite, StatusCode::TRYING, &local_tag, None, None));

    engine.with_dialog_mut(&call_id, |d| d.transition(DialogState::Ringing));
    send(compose_response(invite, StatusCode::RINGING, &local_tag, None, None));

    sleep(AUTO_ANSWER_DELAY).await;

    let still_ringing = engine
        .snapshot(&call_id)
        .map(|d| d.state == DialogState::Ringing)
        .unwrap_or(false);
    if !still_ringing {
        debug!(%call_id, "dialog left RINGING before auto-answer fired, skipping");
        return;
    }

    match policy.decide(invite) {
        AnswerDecision::Accept { sdp } => {
            engine.with_dialog_mut(&call_id, |d| d.transition(DialogState::Connected));
            send(compose_response(
                invite,
                StatusCode::OK,
                &local_tag,
                Some(contact),
                Some(sdp),
            ));
        }
        AnswerDecision::Reject(status) => {
            engine.fail(&call_id);
            send(compose_response(invite, status, &local_tag, None, None));
        }
        AnswerDecision::Defer => {
            debug!(%call_id, "policy deferred, leaving dialog in RINGING");
        }
    }
}

/// Handles an incoming CANCEL for a dialog in TRYING/RINGING: replies 200
/// OK to the CANCEL itself and marks the dialog TERMINATED.
pub fn handle_inbound_cancel(engine: &DialogEngine, cancel: &SipRequest) -> Option<SipResponse> {
    let call_id = cancel.header("Call-ID")?;
    let local_tag = engine.snapshot(call_id)?.local_tag;
    engine.terminate(call_id);
    Some(compose_response(cancel, StatusCode::OK, &local_tag, None, None))
}

/// Handles an incoming BYE on a CONNECTED dialog: 200 OK, TERMINATED. On
/// an unknown Call-ID, composes the 481 the spec requires for that case.
pub fn handle_inbound_bye(engine: &DialogEngine, bye: &SipRequest) -> Option<SipResponse> {
    let call_id = bye.header("Call-ID")?;
    match engine.snapshot(call_id) {
        Some(dialog) => {
            engine.terminate(call_id);
            Some(compose_response(bye, StatusCode::OK, &dialog.local_tag, None, None))
        }
        None => Some(compose_response(
            bye,
            StatusCode::CALL_TRANSACTION_DOES_NOT_EXIST,
            "",
            None,
            None,
        )),
    }
}

/// OPTIONS always answers with the fixed `Allow` list of 4.4.2, regardless
/// of dialog state.
pub fn handle_options(request: &SipRequest, local_tag: &str) -> SipResponse {
    let mut response = compose_response(request, StatusCode::OK, local_tag, None, None);
    response
        .headers
        .push("Allow", "INVITE, ACK, BYE, CANCEL, REGISTER, OPTIONS");
    response
}
