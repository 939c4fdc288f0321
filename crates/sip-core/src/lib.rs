//! SIP message model and wire codec: the part of the stack every other
//! `siplink-*` crate builds on. Parses and serializes SIP requests and
//! responses, models SIP URIs, and carries a small SDP mini-codec used to
//! seed RTP endpoints from an offer/answer exchange.

pub mod builder;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod types;

pub use error::{Error, Result};
pub use types::{HeaderList, KnownStatus, Method, Scheme, Sdp, SipMessage, SipRequest, SipResponse, SipUri, StatusCode};

pub mod prelude {
    pub use crate::builder::{build_sip_uri, is_supported_method, parse_sip_uri};
    pub use crate::error::{Error, Result};
    pub use crate::parser::parse;
    pub use crate::serializer::serialize;
    pub use crate::types::{
        HeaderList, KnownStatus, Method, Scheme, Sdp, SipMessage, SipRequest, SipResponse, SipUri,
        StatusCode,
    };
}
