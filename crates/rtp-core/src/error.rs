use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("RTP packet too short: {0} bytes, need at least 12")]
    TooShort(usize),

    #[error("no remote endpoint configured for this RTP session")]
    NoRemoteEndpoint,

    #[error(transparent)]
    Transport(#[from] siplink_sip_transport::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
