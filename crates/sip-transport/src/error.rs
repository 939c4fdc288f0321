use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to bind UDP socket: {0}")]
    BindFailed(#[source] std::io::Error),

    #[error("failed to send datagram: {0}")]
    SendFailed(#[source] std::io::Error),

    #[error("failed to resolve {host}: {reason}")]
    ResolutionFailed { host: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
