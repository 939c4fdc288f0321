//! The UA-server and minimal registrar: answers inbound calls with the
//! shared dialog/transaction state machine, accepts REGISTER
//! unconditionally, and exposes the external-collaborator seams of the
//! dialog-core crate to whatever hosts this server (persistence,
//! real-time fan-out, configuration).

pub mod collab;
pub mod config;
pub mod digest;
pub mod error;
pub mod registrar;
pub mod server;

pub use collab::{CallStore, ConfigSource, DialogHandle, EventSink, NullCallStore, NullEventSink};
pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use registrar::{RegistrationEntry, Registrar};
pub use server::Server;
