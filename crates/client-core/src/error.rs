use thiserror::Error;

/// Errors surfaced by the UA-client's public operations. Kept as a single
/// flat enum, mirroring the taxonomy-with-helper-methods shape the rest of
/// the stack uses for its top-level error types.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client is not running; call start() first")]
    NotRunning,

    #[error("invalid SIP URI: {0}")]
    InvalidUri(String),

    #[error("failed to bind UDP socket: {0}")]
    BindFailed(#[source] siplink_sip_transport::Error),

    #[error("failed to resolve host: {0}")]
    ResolutionFailed(#[source] siplink_sip_transport::Error),

    #[error("failed to send message: {0}")]
    SendFailed(#[source] siplink_sip_transport::Error),

    #[error(transparent)]
    Dialog(#[from] siplink_dialog_core::Error),
}

impl ClientError {
    pub fn category(&self) -> &'static str {
        match self {
            ClientError::NotRunning => "lifecycle",
            ClientError::InvalidUri(_) => "uri",
            ClientError::BindFailed(_) => "transport",
            ClientError::ResolutionFailed(_) => "resolution",
            ClientError::SendFailed(_) => "transport",
            ClientError::Dialog(_) => "dialog",
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, ClientError::ResolutionFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
