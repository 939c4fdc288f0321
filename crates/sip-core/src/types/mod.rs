pub mod header;
pub mod message;
pub mod method;
pub mod sdp;
pub mod status;
pub mod uri;

pub use header::HeaderList;
pub use message::{SipMessage, SipRequest, SipResponse};
pub use method::Method;
pub use sdp::Sdp;
pub use status::{KnownStatus, StatusCode};
pub use uri::{Scheme, SipUri};
