//! The complete stack, re-exported under one crate: message model and
//! wire codec ([`sip_core`]), UDP transport ([`sip_transport`]), the
//! dialog/transaction engine shared by client and server
//! ([`dialog_core`]), RTP framing ([`rtp_core`]), the UA-client
//! ([`client_core`]), and the UA-server/registrar ([`call_engine`]).
//!
//! Most applications only need [`client_core::Client`] or
//! [`call_engine::Server`]; the rest is exposed for callers building
//! something more specialized on top of the same pieces.

pub use siplink_call_engine as call_engine;
pub use siplink_client_core as client_core;
pub use siplink_dialog_core as dialog_core;
pub use siplink_rtp_core as rtp_core;
pub use siplink_sip_core as sip_core;
pub use siplink_sip_transport as sip_transport;

pub use call_engine::{Server, ServerConfig};
pub use client_core::{Client, ClientConfig};
