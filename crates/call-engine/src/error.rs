use thiserror::Error;

/// Errors surfaced by the UA-server's public operations, following the
/// taxonomy-with-helper-methods shape used across the stack.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind UDP socket: {0}")]
    BindFailed(#[source] siplink_sip_transport::Error),

    #[error(transparent)]
    Dialog(#[from] siplink_dialog_core::Error),
}

impl ServerError {
    pub fn category(&self) -> &'static str {
        match self {
            ServerError::BindFailed(_) => "transport",
            ServerError::Dialog(_) => "dialog",
        }
    }

    pub fn is_recoverable(&self) -> bool {
        false
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
