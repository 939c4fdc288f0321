use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid SIP URI: {0}")]
    InvalidUri(String),

    /// Response or request named a Call-ID this engine has no dialog for.
    /// Silent for foreign responses and for `hangup` on an unknown id;
    /// reported to the peer as 481 for an incoming BYE.
    #[error("unknown call id: {0}")]
    UnknownCallId(String),

    #[error("illegal transition from {from:?} on {event}")]
    IllegalTransition { from: String, event: String },
}

pub type Result<T> = std::result::Result<T, Error>;
