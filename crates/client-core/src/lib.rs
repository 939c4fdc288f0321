//! The SIP UA-client: registers with a registrar, places and receives
//! calls, and exposes the observable event set through [`Client`].

pub mod callbacks;
pub mod client;
pub mod config;
pub mod error;
pub mod local_ip;

pub use callbacks::CallbackSet;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
