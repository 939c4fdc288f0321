use thiserror::Error;

/// Errors produced while parsing or building SIP messages, URIs, and SDP bodies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed start line: {0}")]
    MalformedStartLine(String),

    #[error("unknown SIP method: {0}")]
    UnknownMethod(String),

    #[error("malformed header at line {line}: {content}")]
    MalformedHeader { line: usize, content: String },

    #[error("body truncated: declared Content-Length {declared} but only {available} bytes available")]
    TruncatedBody { declared: usize, available: usize },

    #[error("empty message")]
    EmptyMessage,

    #[error("malformed SIP URI: {0}")]
    MalformedUri(String),

    #[error("malformed SDP: {0}")]
    MalformedSdp(String),
}

impl Error {
    /// Coarse classification used for log tagging, mirroring the category
    /// helpers the rest of the stack exposes on its error types.
    pub fn category(&self) -> &'static str {
        match self {
            Error::MalformedStartLine(_) => "parse",
            Error::UnknownMethod(_) => "parse",
            Error::MalformedHeader { .. } => "parse",
            Error::TruncatedBody { .. } => "parse",
            Error::EmptyMessage => "parse",
            Error::MalformedUri(_) => "uri",
            Error::MalformedSdp(_) => "sdp",
        }
    }

    /// Whether retrying the same input could plausibly succeed. Parse
    /// errors never do; this exists for symmetry with the other crates'
    /// error enums that do have recoverable variants.
    pub fn is_recoverable(&self) -> bool {
        false
    }
}

pub type Result<T> = std::result::Result<T, Error>;
