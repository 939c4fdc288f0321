use std::time::Duration;

use siplink_sip_core::{SipRequest, StatusCode};

/// What an auto-answer policy decided for an incoming INVITE (§9
/// "Auto-answer" design note).
pub enum AnswerDecision {
    Accept { sdp: Vec<u8> },
    Reject(StatusCode),
    Defer,
}

pub trait AnswerPolicy: Send + Sync {
    fn decide(&self, invite: &SipRequest) -> AnswerDecision;
}

/// The default policy: accept every incoming INVITE with a canned SDP
/// body supplied at construction (the engine has no local RTP port of its
/// own to put in a body, so the caller supplies one).
pub struct AcceptWithSdp {
    pub sdp: Vec<u8>,
}

impl AnswerPolicy for AcceptWithSdp {
    fn decide(&self, _invite: &SipRequest) -> AnswerDecision {
        AnswerDecision::Accept { sdp: self.sdp.clone() }
    }
}

/// `1 s in reference behavior; implementer may make this configurable`.
pub const AUTO_ANSWER_DELAY: Duration = Duration::from_secs(1);
