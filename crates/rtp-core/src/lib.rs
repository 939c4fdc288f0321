//! RTP packet codec and per-session send/receive engine.

pub mod error;
pub mod packet;
pub mod session;

pub use error::{Error, Result};
pub use packet::RtpPacket;
pub use session::{RtpSession, SharedRtpSession};
